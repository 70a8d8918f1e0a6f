//! Morphological analysis interface and the lindera-backed implementation.
//!
//! The analyzer only depends on the [`MorphologicalTokenizer`] trait; the
//! concrete backend is injected, so hosts with their own analyzer (or test
//! fixtures) can swap it out. The bundled backend is lindera with the
//! embedded IPADIC dictionary — the same dictionary family the particle
//! classification strings (助詞/係助詞/連体化/…) come from.

use crate::error::{AnalysisError, AnalysisResult};
use crate::token::Token;

/// Turns sentence text into an ordered token stream.
///
/// Positions must be stable 1-based char offsets into the exact string
/// passed in.
pub trait MorphologicalTokenizer {
    /// Tokenize one sentence.
    fn tokenize(&self, text: &str) -> AnalysisResult<Vec<Token>>;
}

impl<T: MorphologicalTokenizer + ?Sized> MorphologicalTokenizer for &T {
    fn tokenize(&self, text: &str) -> AnalysisResult<Vec<Token>> {
        (**self).tokenize(text)
    }
}

#[cfg(feature = "lindera")]
pub use self::lindera_backend::LinderaTokenizer;

#[cfg(feature = "lindera")]
mod lindera_backend {
    use std::sync::OnceLock;

    use lindera::dictionary::load_dictionary;
    use lindera::mode::Mode;
    use lindera::segmenter::Segmenter;
    use lindera::tokenizer::Tokenizer;

    use super::MorphologicalTokenizer;
    use crate::error::{AnalysisError, AnalysisResult};
    use crate::token::{DETAIL_PLACEHOLDER, Token};

    static SHARED: OnceLock<Result<LinderaTokenizer, String>> = OnceLock::new();

    /// Lindera tokenizer over the embedded IPADIC dictionary.
    pub struct LinderaTokenizer {
        inner: Tokenizer,
    }

    impl LinderaTokenizer {
        /// Build a fresh tokenizer. Loading the dictionary is the
        /// expensive part; prefer [`Self::shared`] unless the instance
        /// must be owned.
        pub fn new() -> AnalysisResult<Self> {
            Self::build().map_err(AnalysisError::TokenizerInit)
        }

        /// The process-wide tokenizer, built on first use.
        ///
        /// Initialization happens exactly once; a failed load is cached
        /// and re-reported on every call rather than retried.
        pub fn shared() -> AnalysisResult<&'static Self> {
            SHARED
                .get_or_init(Self::build)
                .as_ref()
                .map_err(|e| AnalysisError::TokenizerInit(e.clone()))
        }

        fn build() -> Result<Self, String> {
            let dictionary =
                load_dictionary("embedded://ipadic").map_err(|e| e.to_string())?;
            let segmenter = Segmenter::new(Mode::Normal, dictionary, None);
            Ok(Self {
                inner: Tokenizer::new(segmenter),
            })
        }
    }

    impl MorphologicalTokenizer for LinderaTokenizer {
        #[tracing::instrument(skip_all, fields(text_len = text.len()))]
        fn tokenize(&self, text: &str) -> AnalysisResult<Vec<Token>> {
            let mut raw = self
                .inner
                .tokenize(text)
                .map_err(|e| AnalysisError::Tokenize(e.to_string()))?;

            let mut tokens = Vec::with_capacity(raw.len());
            // tokens come back in byte order, so char positions accumulate
            // with a forward cursor
            let mut cursor_byte = 0;
            let mut cursor_char = 0;
            for token in raw.iter_mut() {
                let byte_start = token.byte_start;
                if byte_start < cursor_byte {
                    cursor_byte = 0;
                    cursor_char = 0;
                }
                cursor_char += text[cursor_byte..byte_start].chars().count();
                cursor_byte = byte_start;

                let pos = detail_or_placeholder(token.get_detail(0));
                let details = [
                    detail_or_placeholder(token.get_detail(1)),
                    detail_or_placeholder(token.get_detail(2)),
                    detail_or_placeholder(token.get_detail(3)),
                ];
                tokens.push(Token {
                    surface: token.surface.as_ref().to_string(),
                    pos,
                    details,
                    char_start: cursor_char + 1,
                });
            }
            Ok(tokens)
        }
    }

    fn detail_or_placeholder(detail: Option<&str>) -> String {
        match detail {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => DETAIL_PLACEHOLDER.to_string(),
        }
    }

}

/// A fixed token stream, for tests and hosts that tokenize elsewhere.
#[derive(Debug, Default)]
pub struct FixtureTokenizer {
    sentences: Vec<(String, Vec<Token>)>,
}

impl FixtureTokenizer {
    /// Register the token stream to return for a sentence text.
    pub fn with_sentence(mut self, text: impl Into<String>, tokens: Vec<Token>) -> Self {
        self.sentences.push((text.into(), tokens));
        self
    }
}

impl MorphologicalTokenizer for FixtureTokenizer {
    fn tokenize(&self, text: &str) -> AnalysisResult<Vec<Token>> {
        self.sentences
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, tokens)| tokens.clone())
            .ok_or_else(|| AnalysisError::Tokenize(format!("no fixture for {text:?}")))
    }
}
