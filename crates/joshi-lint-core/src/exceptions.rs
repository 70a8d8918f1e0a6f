//! Allowed linguistic patterns that suppress a repeated-particle group.
//!
//! Each rule encodes one idiomatic repetition that reads naturally and must
//! not be flagged. Rules are independent predicates over (group, sentence
//! context), evaluated in the fixed order below; the set only applies when
//! strict mode is off.

use crate::token::Token;

/// A single exception pattern.
pub struct ExceptionRule {
    /// Name of the linguistic pattern this rule encodes.
    pub pattern: &'static str,
    matches: fn(group: &[&Token], sentence: &[Token]) -> bool,
}

/// The exception rules, in evaluation order.
pub static EXCEPTION_RULES: &[ExceptionRule] = &[
    ExceptionRule {
        // 既存のコードの利用 — attributive の chains are idiomatic
        pattern: "attributive-no",
        matches: |group, _| group.first().is_some_and(|t| t.details[0] == "連体化"),
    },
    ExceptionRule {
        // オブジェクトを返す関数を公開した — object markers repeat in
        // nested clauses
        pattern: "case-marking-wo",
        matches: |group, _| {
            group
                .first()
                .is_some_and(|t| t.details[0] == "格助詞" && t.surface == "を")
        },
    },
    ExceptionRule {
        // まずは試していただいて — the -te connective chains freely
        pattern: "conjunctive-te",
        matches: |group, _| {
            group
                .first()
                .is_some_and(|t| t.details[0] == "接続助詞" && t.surface == "て")
        },
    },
    ExceptionRule {
        // 登ったり降りたり — paired coordinating particles
        pattern: "coordinating-pair",
        matches: |group, _| {
            group.len() == 2
                && group[0].details[0] == "並立助詞"
                && group[1].details[0] == "並立助詞"
        },
    },
    ExceptionRule {
        // 〜かどうか — fixed idiom, not a repetition
        pattern: "ka-dou-ka",
        matches: |group, sentence| {
            if group.len() != 2 || group[0].surface != "か" || group[1].surface != "か" {
                return false;
            }
            preceding_token(sentence, group[1].char_start)
                .is_some_and(|prev| prev.surface == "どう")
        },
    },
];

/// Does this same-key group match any allowed pattern?
///
/// `sentence` is the raw (unmerged) token stream, used for local lookback.
pub fn matches_exception(group: &[&Token], sentence: &[Token]) -> bool {
    let matched = EXCEPTION_RULES
        .iter()
        .find(|rule| (rule.matches)(group, sentence));
    if let Some(rule) = matched {
        tracing::debug!(pattern = rule.pattern, "group suppressed by exception rule");
        return true;
    }
    false
}

/// The sentence token immediately before the token starting at `char_start`.
///
/// Position-based lookup into the token arena; returns `None` at the
/// sentence head or when no token starts at that offset.
fn preceding_token(sentence: &[Token], char_start: usize) -> Option<&Token> {
    let index = sentence.iter().position(|t| t.char_start == char_start)?;
    index.checked_sub(1).map(|i| &sentence[i])
}
