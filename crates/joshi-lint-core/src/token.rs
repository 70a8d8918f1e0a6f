//! Morphological tokens and particle-level token operations.
//!
//! The token shape follows the IPADIC part-of-speech scheme: a coarse tag
//! (品詞) plus three sub-classification levels (品詞細分類1〜3). Levels the
//! dictionary leaves unset carry the `*` placeholder rather than being
//! absent, so canonical keys stay total and deterministic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Placeholder for an unset part-of-speech detail level.
pub const DETAIL_PLACEHOLDER: &str = "*";

/// A morphological token as produced by the tokenizer (or by
/// [`merge_adjacent_particles`] for compound particles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Token {
    /// Literal text of the token as it appears in the sentence.
    pub surface: String,
    /// Coarse part-of-speech tag (品詞), e.g. `助詞`. Merged compound
    /// particles carry the concatenated tag (`助詞助詞`).
    pub pos: String,
    /// Sub-classification chain (品詞細分類1〜3), `*` where unset.
    pub details: [String; 3],
    /// 1-based char offset of the token's first character within the
    /// sentence text it was tokenized from.
    pub char_start: usize,
}

impl Token {
    /// Build a token, filling missing detail levels with the placeholder.
    pub fn new(
        surface: impl Into<String>,
        pos: impl Into<String>,
        details: [&str; 3],
        char_start: usize,
    ) -> Self {
        Self {
            surface: surface.into(),
            pos: pos.into(),
            details: details.map(|d| {
                if d.is_empty() {
                    DETAIL_PLACEHOLDER.to_string()
                } else {
                    d.to_string()
                }
            }),
            char_start,
        }
    }

    /// Number of chars in the surface form.
    pub fn surface_len(&self) -> usize {
        self.surface.chars().count()
    }
}

/// Is this token a particle (助詞)?
///
/// Prefix match: merged compound tokens carry a repeated coarse tag.
pub fn is_particle(token: &Token) -> bool {
    token.pos.starts_with("助詞")
}

/// Is this token a pause mark (読点)?
///
/// The surface must be one of the configured comma characters. Dictionaries
/// disagree on the tag for pause marks (、 is 名詞 in some IPADIC builds,
/// 記号 in others), so both coarse tags are accepted.
pub fn is_pause(token: &Token, comma_characters: &[String]) -> bool {
    comma_characters.iter().any(|c| c == &token.surface)
        && (token.pos == "名詞" || token.pos == "記号")
}

/// Is this token an opening or closing bracket (括弧開/括弧閉)?
pub fn is_bracket(token: &Token) -> bool {
    token.pos == "記号" && (token.details[0] == "括弧開" || token.details[0] == "括弧閉")
}

/// Collapse runs of adjacent particles into single compound tokens.
///
/// 連語 particles like には/とは are linguistically one unit; keeping them
/// merged means に+は never groups with a bare に. Surfaces and coarse tags
/// concatenate; the first detail level concatenates with the appended
/// token's *surface* so the compound keys distinctly from its parts. The
/// merged token keeps the first component's position. Non-particles pass
/// through unchanged and order is preserved.
pub fn merge_adjacent_particles(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match merged.last_mut() {
            Some(prev) if is_particle(prev) && is_particle(&token) => {
                prev.details[0].push_str(&token.surface);
                prev.surface.push_str(&token.surface);
                prev.pos.push_str(&token.pos);
            }
            _ => merged.push(token),
        }
    }
    merged
}

/// Build the grouping key for a token: surface plus the full classification
/// chain, e.g. `は:助詞.係助詞.*.*`.
///
/// Two tokens with the same surface but different grammatical senses (と as
/// 格助詞 vs と as 接続助詞) must key differently, so every detail level is
/// included even when it is the placeholder.
pub fn canonical_key(token: &Token) -> String {
    format!(
        "{}:{}.{}.{}.{}",
        token.surface, token.pos, token.details[0], token.details[1], token.details[2]
    )
}

/// Recover the display surface from a canonical key.
pub fn surface_from_key(key: &str) -> &str {
    key.split_once(':').map_or(key, |(surface, _)| surface)
}
