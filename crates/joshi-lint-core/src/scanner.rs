//! Interval scanning over the countable token stream.
//!
//! The countable stream is the subsequence of a sentence's merged tokens
//! that counts toward particle distance: particles always; pause marks,
//! brackets, and sentence-terminator characters additionally when strict
//! mode is off (they widen the gap, which is what lets a 読点 relax an
//! otherwise-dense pair). Same-key particles are grouped, filtered through
//! the allow-list and exception rules, and then consecutive occurrences
//! are measured against the configured minimum interval.

use std::collections::HashMap;

use crate::config::RuleConfig;
use crate::exceptions;
use crate::token::{self, Token};

/// Two occurrences of the same particle key closer than the configured
/// interval. Indices point into the merged per-sentence token arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairViolation {
    /// Canonical key of the repeated particle.
    pub key: String,
    /// Arena index of the earlier occurrence.
    pub prev: usize,
    /// Arena index of the later occurrence. Diagnostics anchor here: the
    /// repetition becomes apparent to a reader at the second occurrence.
    pub current: usize,
}

/// Scan one sentence for repeated-particle violations.
///
/// `merged` is the sentence's token stream after compound-particle merging;
/// `raw` is the unmerged stream, used only for exception-rule lookback.
/// Violations come back ordered by anchor position.
#[tracing::instrument(skip_all, fields(tokens = merged.len()))]
pub fn scan_sentence(merged: &[Token], raw: &[Token], config: &RuleConfig) -> Vec<PairViolation> {
    let countable: Vec<usize> = merged
        .iter()
        .enumerate()
        .filter(|(_, t)| is_countable(t, config))
        .map(|(i, _)| i)
        .collect();

    // key → positions within the countable stream, in stream order.
    // Recording countable positions here makes pair distance plain index
    // arithmetic later.
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, &idx) in countable.iter().enumerate() {
        let t = &merged[idx];
        if token::is_particle(t) {
            groups.entry(token::canonical_key(t)).or_default().push(pos);
        }
    }

    let mut violations = Vec::new();
    for (key, positions) in &groups {
        // The allow-list wins over everything, including the exception
        // rules and the group-size shortcut.
        let surface = token::surface_from_key(key);
        if config.allow.iter().any(|allowed| allowed == surface) {
            continue;
        }

        let group: Vec<&Token> = positions.iter().map(|&p| &merged[countable[p]]).collect();
        if !config.strict && exceptions::matches_exception(&group, raw) {
            continue;
        }

        if positions.len() <= 1 {
            continue;
        }

        // Adjacent occurrences only: if any non-adjacent pair were within
        // the interval, the adjacent pair between them would be too.
        for pair in positions.windows(2) {
            let distance = pair[1] - pair[0];
            if distance <= config.min_interval {
                violations.push(PairViolation {
                    key: key.clone(),
                    prev: countable[pair[0]],
                    current: countable[pair[1]],
                });
            }
        }
    }

    violations.sort_by_key(|v| merged[v.current].char_start);
    violations
}

/// Does this token count toward interval distance?
fn is_countable(t: &Token, config: &RuleConfig) -> bool {
    if config.strict {
        return token::is_particle(t);
    }
    // Brackets widen the distance between text inside and outside a
    // parenthetical.
    if token::is_bracket(t) {
        return true;
    }
    // Terminators inside an unsplit span (quoted sentences in 「」) count
    // as well, so repetition across an embedded sentence boundary is not
    // flagged.
    if config.separator_characters.iter().any(|s| s == &t.surface) {
        return true;
    }
    if token::is_pause(t, &config.comma_characters) {
        return true;
    }
    token::is_particle(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::merge_adjacent_particles;

    fn t(surface: &str, pos: &str, detail1: &str, char_start: usize) -> Token {
        Token::new(surface, pos, [detail1, "*", "*"], char_start)
    }

    fn noun(surface: &str, char_start: usize) -> Token {
        t(surface, "名詞", "一般", char_start)
    }

    fn scan(raw: Vec<Token>, config: &RuleConfig) -> Vec<PairViolation> {
        let merged = merge_adjacent_particles(raw.clone());
        scan_sentence(&merged, &raw, config)
    }

    /// 私は彼は好きだ — back-to-back 係助詞 は.
    fn doubled_wa() -> Vec<Token> {
        vec![
            t("私", "名詞", "代名詞", 1),
            t("は", "助詞", "係助詞", 2),
            t("彼", "名詞", "代名詞", 3),
            t("は", "助詞", "係助詞", 4),
            t("好き", "名詞", "形容動詞語幹", 5),
            t("だ", "助動詞", "*", 7),
        ]
    }

    #[test]
    fn adjacent_same_particle_violates() {
        let violations = scan(doubled_wa(), &RuleConfig::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "は:助詞.係助詞.*.*");
    }

    #[test]
    fn violation_anchors_at_later_occurrence() {
        let raw = doubled_wa();
        let merged = merge_adjacent_particles(raw.clone());
        let violations = scan_sentence(&merged, &raw, &RuleConfig::default());
        assert_eq!(merged[violations[0].current].char_start, 4);
        assert_eq!(merged[violations[0].prev].char_start, 2);
    }

    #[test]
    fn distinct_particles_do_not_group() {
        // 私は彼が好きだ
        let raw = vec![
            t("私", "名詞", "代名詞", 1),
            t("は", "助詞", "係助詞", 2),
            t("彼", "名詞", "代名詞", 3),
            t("が", "助詞", "格助詞", 4),
            t("好き", "名詞", "形容動詞語幹", 5),
            t("だ", "助動詞", "*", 7),
        ];
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn same_surface_different_sense_does_not_group() {
        // と as 格助詞 vs と as 接続助詞
        let raw = vec![
            noun("入力", 1),
            t("と", "助詞", "格助詞", 3),
            t("する", "動詞", "自立", 4),
            t("と", "助詞", "接続助詞", 6),
            t("動く", "動詞", "自立", 7),
        ];
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn single_occurrence_never_violates() {
        let raw = vec![noun("猫", 1), t("が", "助詞", "格助詞", 2), noun("好き", 3)];
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn pause_token_widens_distance() {
        // 表情で、小声で — the 、 counts as a spacer by default
        let raw = vec![
            noun("表情", 1),
            t("で", "助詞", "格助詞", 3),
            t("、", "記号", "読点", 4),
            noun("小声", 5),
            t("で", "助詞", "格助詞", 7),
            t("尋ね", "動詞", "自立", 8),
        ];
        assert!(scan(raw.clone(), &RuleConfig::default()).is_empty());

        // strict mode does not count the 、
        let strict = RuleConfig {
            strict: true,
            ..RuleConfig::default()
        };
        let violations = scan(raw, &strict);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn brackets_widen_distance() {
        // xで（yで）z — opening and closing brackets each add one
        let raw = vec![
            noun("x", 1),
            t("で", "助詞", "格助詞", 2),
            t("（", "記号", "括弧開", 3),
            noun("y", 4),
            t("で", "助詞", "格助詞", 5),
            t("）", "記号", "括弧閉", 6),
            noun("z", 7),
        ];
        // countable: で ( で ) — distance で→で is 2
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn embedded_terminator_widens_distance() {
        // 「…。」 keeps one sentence span, so the 。 counts as a spacer
        let raw = vec![
            noun("A", 1),
            t("は", "助詞", "係助詞", 2),
            t("。", "記号", "句点", 3),
            noun("B", 4),
            t("は", "助詞", "係助詞", 5),
        ];
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn min_interval_two_reaches_past_one_token() {
        // 白装束で重力のない足どりで — the の between the two で keeps them
        // apart at the default interval but not at min_interval 2
        let raw = vec![
            noun("白装束", 1),
            t("で", "助詞", "格助詞", 4),
            noun("重力", 5),
            t("の", "助詞", "連体化", 7),
            t("ない", "助動詞", "*", 8),
            noun("足どり", 10),
            t("で", "助詞", "格助詞", 13),
        ];
        // countable: で の で — adjacent で pair distance 2
        assert!(scan(raw.clone(), &RuleConfig::default()).is_empty());

        let wider = RuleConfig {
            min_interval: 2,
            ..RuleConfig::default()
        };
        assert_eq!(scan(raw, &wider).len(), 1);
    }

    #[test]
    fn shrinking_min_interval_never_adds_violations() {
        let raw = doubled_wa();
        let at = |min_interval| {
            scan(
                raw.clone(),
                &RuleConfig {
                    min_interval,
                    ..RuleConfig::default()
                },
            )
            .len()
        };
        assert!(at(1) <= at(2));
        assert!(at(2) <= at(3));
    }

    #[test]
    fn allow_list_wins_over_everything() {
        let config = RuleConfig {
            allow: vec!["は".to_string()],
            ..RuleConfig::default()
        };
        assert!(scan(doubled_wa(), &config).is_empty());

        // also in strict mode
        let strict = RuleConfig {
            strict: true,
            allow: vec!["は".to_string()],
            ..RuleConfig::default()
        };
        assert!(scan(doubled_wa(), &strict).is_empty());
    }

    #[test]
    fn attributive_no_suppressed_unless_strict() {
        // 既存のコードの利用
        let raw = vec![
            noun("既存", 1),
            t("の", "助詞", "連体化", 3),
            noun("コード", 4),
            t("の", "助詞", "連体化", 7),
            noun("利用", 8),
        ];
        assert!(scan(raw.clone(), &RuleConfig::default()).is_empty());

        let strict = RuleConfig {
            strict: true,
            ..RuleConfig::default()
        };
        let violations = scan(raw.clone(), &strict);
        assert_eq!(violations.len(), 1);
        let merged = merge_adjacent_particles(raw);
        assert_eq!(merged[violations[0].current].char_start, 7);
    }

    #[test]
    fn coordinating_pair_suppressed() {
        // 登ったり降りたりする
        let raw = vec![
            t("登っ", "動詞", "自立", 1),
            t("たり", "助詞", "並立助詞", 3),
            t("降り", "動詞", "自立", 5),
            t("たり", "助詞", "並立助詞", 7),
            t("する", "動詞", "自立", 9),
        ];
        assert!(scan(raw, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn compound_particles_group_separately() {
        // 文字列にはそこには問題がある — merged には pairs up, bare に does not
        let raw = vec![
            noun("文字列", 1),
            t("に", "助詞", "格助詞", 4),
            t("は", "助詞", "係助詞", 5),
            t("そこ", "名詞", "代名詞", 6),
            t("に", "助詞", "格助詞", 8),
            t("は", "助詞", "係助詞", 9),
            noun("問題", 10),
            t("が", "助詞", "格助詞", 12),
            t("ある", "動詞", "自立", 13),
        ];
        let merged = merge_adjacent_particles(raw.clone());
        let violations = scan_sentence(&merged, &raw, &RuleConfig::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(crate::token::surface_from_key(&violations[0].key), "には");
        assert_eq!(merged[violations[0].current].char_start, 8);
    }

    #[test]
    fn multiple_pairs_report_in_anchor_order() {
        // でAでBで — two adjacent pairs, both within interval
        let raw = vec![
            noun("X", 1),
            t("で", "助詞", "格助詞", 2),
            noun("Y", 3),
            t("で", "助詞", "格助詞", 4),
            noun("Z", 5),
            t("で", "助詞", "格助詞", 6),
        ];
        let violations = scan(raw, &RuleConfig::default());
        assert_eq!(violations.len(), 2);
        assert!(violations[0].current < violations[1].current);
    }

    #[test]
    fn scan_is_deterministic() {
        let raw = doubled_wa();
        let first = scan(raw.clone(), &RuleConfig::default());
        let second = scan(raw, &RuleConfig::default());
        assert_eq!(first, second);
    }
}
