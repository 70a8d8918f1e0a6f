//! Sentence segmentation over analysis text.
//!
//! Splits after runs of configured terminator characters and at line
//! breaks. Terminators inside bracket pairs (「」 quotes, parentheses and
//! the like) do not split: an embedded quoted sentence stays inside its
//! host span, and its 句点 later counts as a spacer token in the countable
//! stream instead.

/// One sentence within an analysis text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
    /// The sentence text, terminator run included.
    pub text: String,
    /// 0-based char offset of the sentence's first char in the analysis
    /// text.
    pub start: usize,
}

/// Bracket pairs protected from sentence splitting.
const BRACKET_PAIRS: &[(char, char)] = &[
    ('「', '」'),
    ('『', '』'),
    ('（', '）'),
    ('(', ')'),
    ('【', '】'),
    ('《', '》'),
    ('〈', '〉'),
];

/// Split `text` into sentences on the given terminator characters.
///
/// Whitespace between sentences is skipped, not attached; a sentence with
/// no trailing terminator (end of text, end of line) is still returned.
pub fn split_sentences(text: &str, terminators: &[String]) -> Vec<SentenceSpan> {
    let term_chars: Vec<char> = terminators
        .iter()
        .filter_map(|s| s.chars().next())
        .collect();
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < len {
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }

        let start = i;
        let mut expected_closers: Vec<char> = Vec::new();
        while i < len {
            let c = chars[i];
            if c == '\n' {
                break;
            }
            if let Some(&(_, close)) = BRACKET_PAIRS.iter().find(|&&(open, _)| open == c) {
                expected_closers.push(close);
            } else if expected_closers.last() == Some(&c) {
                expected_closers.pop();
            }
            i += 1;
            if expected_closers.is_empty() && term_chars.contains(&c) {
                while i < len && term_chars.contains(&chars[i]) {
                    i += 1;
                }
                break;
            }
        }

        let sentence: String = chars[start..i].iter().collect();
        if !sentence.trim().is_empty() {
            spans.push(SentenceSpan {
                text: sentence,
                start,
            });
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn split(text: &str) -> Vec<SentenceSpan> {
        split_sentences(text, &RuleConfig::default().separator_characters)
    }

    #[test]
    fn splits_on_kuten() {
        let spans = split("今日は晴れだ。明日は雨だ。");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "今日は晴れだ。");
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[1].text, "明日は雨だ。");
        assert_eq!(spans[1].start, 7);
    }

    #[test]
    fn trailing_text_without_terminator_is_kept() {
        let spans = split("終わった。続きはまだ");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].text, "続きはまだ");
    }

    #[test]
    fn quoted_sentence_stays_embedded() {
        let spans = split("Xは「中の文。続きの文」と言った。");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Xは「中の文。続きの文」と言った。");
    }

    #[test]
    fn nested_brackets_are_tracked() {
        let spans = split("彼は『「内。側」の話。』と書いた。");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn newline_is_a_hard_boundary() {
        let spans = split("一行目の文\n二行目の文。三つ目\n");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "一行目の文");
        assert_eq!(spans[1].text, "二行目の文。");
        assert_eq!(spans[1].start, 6);
        assert_eq!(spans[2].text, "三つ目");
    }

    #[test]
    fn terminator_runs_stay_with_the_sentence() {
        let spans = split("本当に！？そうなの。");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "本当に！？");
    }

    #[test]
    fn custom_terminators_respected() {
        // ．not configured → one sentence
        let spans = split_sentences("これはペンです．これは鉛筆です．", &["。".to_string()]);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn whitespace_between_sentences_is_skipped() {
        let spans = split("前の文。 後の文。");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].start, 5);
        assert_eq!(spans[1].text, "後の文。");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert!(split("").is_empty());
        assert!(split("  \n\n ").is_empty());
    }
}
