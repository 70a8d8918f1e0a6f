//! The per-paragraph analysis pipeline.
//!
//! raw text → masking → sentence segmentation → tokenization → compound
//! merging → interval scan → position remapping → diagnostics. The whole
//! pipeline is stateless per call; the tokenizer handle is the only
//! injected service.

use crate::config::RuleConfig;
use crate::diagnostic::{Diagnostic, build_message};
use crate::error::{AnalysisResult, ConfigResult};
use crate::scanner;
use crate::segmenter;
use crate::source::MaskedSource;
use crate::token::{Token, merge_adjacent_particles, surface_from_key};
use crate::tokenizer::MorphologicalTokenizer;

/// Detects repeated particles in Japanese prose.
pub struct ParticleChecker<T: MorphologicalTokenizer> {
    config: RuleConfig,
    tokenizer: T,
}

impl<T: MorphologicalTokenizer> ParticleChecker<T> {
    /// Build a checker from validated options and a tokenizer handle.
    ///
    /// Fails fast on invalid options, before any tokenization happens.
    pub fn new(config: RuleConfig, tokenizer: T) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, tokenizer })
    }

    /// The options this checker runs with.
    pub const fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Check plain text. Offsets in the returned diagnostics are char
    /// offsets into `input`.
    #[tracing::instrument(skip_all, fields(input_len = input.len()))]
    pub fn check_text(&self, input: &str) -> AnalysisResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        self.check_source(&MaskedSource::plain(input), &mut diagnostics)?;
        Ok(diagnostics)
    }

    /// Check a markdown document paragraph by paragraph. Inline code is
    /// masked; headings, code blocks, and block quotes are skipped.
    /// Offsets are char offsets into `input`.
    #[tracing::instrument(skip_all, fields(input_len = input.len()))]
    pub fn check_markdown(&self, input: &str) -> AnalysisResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for source in MaskedSource::paragraphs_from_markdown(input) {
            self.check_source(&source, &mut diagnostics)?;
        }
        Ok(diagnostics)
    }

    /// Analyze one masked paragraph. Diagnostics append in sentence
    /// order; within a sentence, in anchor order (the scanner's output
    /// order).
    fn check_source(
        &self,
        source: &MaskedSource,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> AnalysisResult<()> {
        let sentences =
            segmenter::split_sentences(source.text(), &self.config.separator_characters);
        for sentence in sentences {
            let raw = self.tokenizer.tokenize(&sentence.text)?;
            let merged = merge_adjacent_particles(raw.clone());

            for violation in scanner::scan_sentence(&merged, &raw, &self.config) {
                let current = &merged[violation.current];
                let particle = surface_from_key(&violation.key).to_string();

                let anchor = sentence.start + current.char_start - 1;
                let Some(range) = source.original_range(anchor, current.surface_len()) else {
                    // nothing in the original to point at
                    tracing::warn!(%particle, "dropping diagnostic with unmappable anchor");
                    continue;
                };

                let first =
                    context_with_prev_word(&merged[violation.prev], &raw, source, sentence.start);
                let second = context_with_prev_word(current, &raw, source, sentence.start);
                diagnostics.push(Diagnostic {
                    message: build_message(&particle, &first, &second),
                    particle,
                    start: range.start,
                    end: range.end,
                });
            }
        }
        Ok(())
    }
}

/// Show a particle occurrence together with the word before it:
/// `彼"は"`, or just `"は"` at the sentence head.
///
/// When the preceding word is masked content (an inline code span), its
/// original raw text is shown instead of the placeholder run.
fn context_with_prev_word(
    token: &Token,
    raw: &[Token],
    source: &MaskedSource,
    sentence_start: usize,
) -> String {
    let fallback = || format!("\"{}\"", token.surface);

    // the merged token keeps its first component's position, which is
    // where the run starts in the raw stream
    let Some(index) = raw.iter().position(|t| t.char_start == token.char_start) else {
        return fallback();
    };
    let Some(prev) = index.checked_sub(1).map(|i| &raw[i]) else {
        return fallback();
    };

    let prev_offset = sentence_start + prev.char_start - 1;
    match source.raw_at(prev_offset) {
        Some(original) => format!("{}\"{}\"", original, token.surface),
        None => format!("{}\"{}\"", prev.surface, token.surface),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::FixtureTokenizer;

    fn t(surface: &str, pos: &str, detail1: &str, char_start: usize) -> Token {
        Token::new(surface, pos, [detail1, "*", "*"], char_start)
    }

    fn doubled_wa_tokens() -> Vec<Token> {
        vec![
            t("私", "名詞", "代名詞", 1),
            t("は", "助詞", "係助詞", 2),
            t("彼", "名詞", "代名詞", 3),
            t("は", "助詞", "係助詞", 4),
            t("好き", "名詞", "形容動詞語幹", 5),
            t("だ", "助動詞", "*", 7),
        ]
    }

    fn checker_for(
        text: &str,
        tokens: Vec<Token>,
        config: RuleConfig,
    ) -> ParticleChecker<FixtureTokenizer> {
        let tokenizer = FixtureTokenizer::default().with_sentence(text, tokens);
        ParticleChecker::new(config, tokenizer).unwrap()
    }

    #[test]
    fn invalid_config_fails_before_tokenization() {
        let config = RuleConfig {
            min_interval: 0,
            ..RuleConfig::default()
        };
        assert!(ParticleChecker::new(config, FixtureTokenizer::default()).is_err());
    }

    #[test]
    fn reports_at_the_second_occurrence() {
        let checker = checker_for("私は彼は好きだ", doubled_wa_tokens(), RuleConfig::default());
        let diagnostics = checker.check_text("私は彼は好きだ").unwrap();
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.particle, "は");
        assert_eq!((d.start, d.end), (3, 4));
        assert_eq!(d.line_column("私は彼は好きだ"), (1, 4));
        assert!(d.message.contains("私\"は\""));
        assert!(d.message.contains("彼\"は\""));
    }

    #[test]
    fn sentence_head_particle_has_no_prev_word() {
        let tokens = vec![
            t("は", "助詞", "係助詞", 1),
            t("山", "名詞", "一般", 2),
            t("は", "助詞", "係助詞", 3),
        ];
        let checker = checker_for("は山は", tokens, RuleConfig::default());
        let diagnostics = checker.check_text("は山は").unwrap();
        assert_eq!(diagnostics.len(), 1);
        // the first occurrence has nothing before it
        assert!(diagnostics[0].message.contains("- \"は\"\n"));
        assert!(diagnostics[0].message.contains("- 山\"は\""));
    }

    #[test]
    fn diagnostics_follow_sentence_order() {
        let first = vec![
            t("A", "名詞", "一般", 1),
            t("で", "助詞", "格助詞", 2),
            t("B", "名詞", "一般", 3),
            t("で", "助詞", "格助詞", 4),
            t("。", "記号", "句点", 5),
        ];
        let second = vec![
            t("C", "名詞", "一般", 1),
            t("が", "助詞", "格助詞", 2),
            t("D", "名詞", "一般", 3),
            t("が", "助詞", "格助詞", 4),
            t("。", "記号", "句点", 5),
        ];
        // 。 is a countable spacer but both pairs are back-to-back
        let tokenizer = FixtureTokenizer::default()
            .with_sentence("AでBで。", first)
            .with_sentence("CがDが。", second);
        let checker = ParticleChecker::new(RuleConfig::default(), tokenizer).unwrap();
        let diagnostics = checker.check_text("AでBで。CがDが。").unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].particle, "で");
        assert_eq!(diagnostics[1].particle, "が");
        assert!(diagnostics[0].start < diagnostics[1].start);
        // second sentence offsets are document-relative
        assert_eq!(diagnostics[1].start, 8);
    }

    #[test]
    fn tokenizer_failure_fails_the_whole_paragraph() {
        // fixture knows the first sentence but not the second
        let tokenizer =
            FixtureTokenizer::default().with_sentence("知ってる。", vec![t("知っ", "動詞", "自立", 1)]);
        let checker = ParticleChecker::new(RuleConfig::default(), tokenizer).unwrap();
        assert!(checker.check_text("知ってる。知らない。").is_err());
    }

    #[test]
    fn unmappable_anchor_is_dropped_silently() {
        // the repeated particle sits inside masked inline code, where no
        // original position exists
        let masked_sentence = "Xーーーです。";
        let tokens = vec![
            t("X", "名詞", "一般", 1),
            t("ー", "助詞", "係助詞", 2),
            t("ー", "名詞", "一般", 3),
            t("ー", "助詞", "係助詞", 4),
            t("です", "助動詞", "*", 5),
            t("。", "記号", "句点", 7),
        ];
        let tokenizer = FixtureTokenizer::default().with_sentence(masked_sentence, tokens);
        let checker = ParticleChecker::new(RuleConfig::default(), tokenizer).unwrap();
        let diagnostics = checker.check_markdown("X`はのは`です。").unwrap();
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn masked_prev_word_shows_original_raw_text() {
        // これはーーーーーーーーーーは何をしているかを示します。
        let masked = "これはーーーーーーーーーーは何をしているかを示します。";
        let tokens = vec![
            t("これ", "名詞", "代名詞", 1),
            t("は", "助詞", "係助詞", 3),
            t("ーーーーーーーーーー", "名詞", "一般", 4),
            t("は", "助詞", "係助詞", 14),
            t("何", "名詞", "代名詞", 15),
            t("を", "助詞", "格助詞", 16),
            t("し", "動詞", "自立", 17),
            t("て", "助詞", "接続助詞", 18),
            t("いる", "動詞", "非自立", 19),
            t("か", "助詞", "副助詞／並立助詞／終助詞", 21),
            t("を", "助詞", "格助詞", 22),
            t("示し", "動詞", "自立", 23),
            t("ます", "助動詞", "*", 25),
            t("。", "記号", "句点", 27),
        ];
        let tokenizer = FixtureTokenizer::default().with_sentence(masked, tokens);
        let checker = ParticleChecker::new(RuleConfig::default(), tokenizer).unwrap();
        let input = "これは`obj.method`は何をしているかを示します。";
        let diagnostics = checker.check_markdown(input).unwrap();
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.particle, "は");
        // column 16 in the original, past the backticks
        assert_eq!(d.line_column(input), (1, 16));
        assert!(d.message.contains("`obj.method`\"は\""));
    }

    #[test]
    fn analysis_is_idempotent() {
        let checker = checker_for("私は彼は好きだ", doubled_wa_tokens(), RuleConfig::default());
        let first = checker.check_text("私は彼は好きだ").unwrap();
        let second = checker.check_text("私は彼は好きだ").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_no_diagnostics() {
        let checker =
            ParticleChecker::new(RuleConfig::default(), FixtureTokenizer::default()).unwrap();
        assert!(checker.check_text("").unwrap().is_empty());
        assert!(checker.check_markdown("").unwrap().is_empty());
        assert!(checker.check_text("  \n ").unwrap().is_empty());
    }
}
