//! Emitted diagnostics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One repeated-particle finding, located in the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    /// Display surface of the repeated particle (には, で, …).
    pub particle: String,
    /// Full report message, in Japanese.
    pub message: String,
    /// Char offset (inclusive) of the anchor in the original input. The
    /// anchor is the later of the two occurrences.
    pub start: usize,
    /// Char offset (exclusive) of the anchor's end.
    pub end: usize,
}

impl Diagnostic {
    /// 1-based (line, column) of the anchor, both counted in chars.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in source.chars().take(self.start) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

/// Render the report message for a repeated particle.
///
/// `first` and `second` are the two occurrences shown with their preceding
/// word (e.g. `彼"は"`), already rendered by the caller.
pub fn build_message(particle: &str, first: &str, second: &str) -> String {
    format!(
        "一文に二回以上利用されている助詞 \"{particle}\" がみつかりました。\n\
         \n\
         次の助詞が連続しているため、文を読みにくくしています。\n\
         \n\
         - {first}\n\
         - {second}\n\
         \n\
         同じ助詞を連続して利用しない、文の中で順番を入れ替える、文を分割するなどを検討してください。\n"
    )
}
