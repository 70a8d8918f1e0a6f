//! Analysis text with a mapping back to the original document.
//!
//! Inline code spans carry punctuation (`obj.method`) that would otherwise
//! read as sentence structure, so they are replaced with a placeholder run
//! of `ー` of the same char length before tokenization. The segment table
//! built here maps analysis offsets back to original char offsets; offsets
//! inside replaced content have no original counterpart and resolve to
//! `None`, which callers treat as "drop this diagnostic".
//!
//! Markdown is parsed with pulldown-cmark (proper CommonMark handling of
//! nested code spans and delimiters rather than regex stripping); each
//! top-level paragraph or list item becomes one analysis unit. Headings,
//! code blocks, block quotes, and table content are not analyzed.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// One contiguous piece of analysis text and where it came from.
#[derive(Debug, Clone)]
struct Segment {
    /// Char offset of this piece in the analysis text.
    masked_start: usize,
    /// Char length in the analysis text.
    masked_len: usize,
    /// Char offset of the source span in the original document.
    orig_start: usize,
    /// Char length of the source span.
    orig_len: usize,
    /// Original raw text when this piece is a placeholder (inline code and
    /// anything else that could not be mapped 1:1). `None` for verbatim
    /// text.
    raw: Option<String>,
}

/// Analysis text plus the offset mapping to the original document.
#[derive(Debug, Clone)]
pub struct MaskedSource {
    text: String,
    segments: Vec<Segment>,
}

impl MaskedSource {
    /// Identity source for plain-text input: every offset maps to itself.
    pub fn plain(text: &str) -> Self {
        let len = text.chars().count();
        let segments = if len == 0 {
            Vec::new()
        } else {
            vec![Segment {
                masked_start: 0,
                masked_len: len,
                orig_start: 0,
                orig_len: len,
                raw: None,
            }]
        };
        Self {
            text: text.to_string(),
            segments,
        }
    }

    /// Build one source per paragraph-level inline run of a markdown
    /// document. Offsets in the returned sources map into `doc` as char
    /// offsets.
    #[tracing::instrument(skip_all, fields(doc_len = doc.len()))]
    pub fn paragraphs_from_markdown(doc: &str) -> Vec<Self> {
        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
        let parser = Parser::new_ext(doc, options).into_offset_iter();

        let mut sources = Vec::new();
        let mut cursor = CharCursor::new(doc);
        let mut builder: Option<SourceBuilder> = None;
        let mut container_depth: usize = 0;
        let mut skip_depth: usize = 0;

        for (event, range) in parser {
            match event {
                Event::Start(
                    Tag::CodeBlock(_) | Tag::Heading { .. } | Tag::BlockQuote(_) | Tag::Table(_),
                ) => {
                    skip_depth += 1;
                }
                Event::End(
                    TagEnd::CodeBlock | TagEnd::Heading(_) | TagEnd::BlockQuote(_) | TagEnd::Table,
                ) => {
                    skip_depth = skip_depth.saturating_sub(1);
                }

                Event::Start(Tag::Paragraph | Tag::Item) if skip_depth == 0 => {
                    if container_depth == 0 {
                        builder = Some(SourceBuilder::default());
                    }
                    container_depth += 1;
                }
                Event::End(TagEnd::Paragraph | TagEnd::Item) if skip_depth == 0 => {
                    container_depth = container_depth.saturating_sub(1);
                    if container_depth == 0
                        && let Some(done) = builder.take()
                        && !done.text.trim().is_empty()
                    {
                        sources.push(done.finish());
                    }
                }

                Event::Text(text) if skip_depth == 0 => {
                    if let Some(ref mut b) = builder {
                        let (orig_start, orig_len) = cursor.char_range(&range);
                        b.push_text(&text, orig_start, orig_len, doc, &range);
                    }
                }
                Event::Code(code) if skip_depth == 0 => {
                    if let Some(ref mut b) = builder {
                        let (orig_start, orig_len) = cursor.char_range(&range);
                        b.push_masked(
                            code.chars().count(),
                            doc[range.clone()].to_string(),
                            orig_start,
                            orig_len,
                        );
                    }
                }
                Event::SoftBreak | Event::HardBreak if skip_depth == 0 => {
                    if let Some(ref mut b) = builder {
                        let (orig_start, orig_len) = cursor.char_range(&range);
                        b.push_text(" ", orig_start, orig_len, doc, &range);
                    }
                }

                _ => {}
            }
        }

        sources
    }

    /// The analysis text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Map a char offset (and length) in the analysis text to a char range
    /// in the original document.
    ///
    /// Returns `None` when the offset falls inside placeholder content —
    /// there is nothing in the original to point at.
    pub fn original_range(&self, offset: usize, len: usize) -> Option<Range<usize>> {
        let segment = self.segment_at(offset)?;
        if segment.raw.is_some() {
            return None;
        }
        let start = segment.orig_start + (offset - segment.masked_start);
        Some(start..start + len)
    }

    /// Original raw text of the placeholder covering `offset`, e.g. the
    /// `` `obj.method` `` behind a masked code span. `None` over verbatim
    /// text.
    pub fn raw_at(&self, offset: usize) -> Option<&str> {
        self.segment_at(offset)?.raw.as_deref()
    }

    fn segment_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.masked_start <= offset && offset < s.masked_start + s.masked_len)
    }
}

/// Accumulates one paragraph's analysis text and segments.
#[derive(Default)]
struct SourceBuilder {
    text: String,
    chars: usize,
    segments: Vec<Segment>,
}

impl SourceBuilder {
    /// Append verbatim text. Falls back to a placeholder mapping when the
    /// event text does not match the source span char-for-char (entity
    /// references, escapes), so offsets never drift.
    fn push_text(
        &mut self,
        text: &str,
        orig_start: usize,
        orig_len: usize,
        doc: &str,
        range: &Range<usize>,
    ) {
        let masked_len = text.chars().count();
        if masked_len == 0 {
            return;
        }
        let raw = if masked_len == orig_len {
            None
        } else {
            Some(doc[range.clone()].to_string())
        };
        self.segments.push(Segment {
            masked_start: self.chars,
            masked_len,
            orig_start,
            orig_len,
            raw,
        });
        self.text.push_str(text);
        self.chars += masked_len;
    }

    /// Append a placeholder run of `ー` standing in for masked content.
    fn push_masked(&mut self, mask_len: usize, raw: String, orig_start: usize, orig_len: usize) {
        if mask_len == 0 {
            return;
        }
        self.segments.push(Segment {
            masked_start: self.chars,
            masked_len: mask_len,
            orig_start,
            orig_len,
            raw: Some(raw),
        });
        for _ in 0..mask_len {
            self.text.push('ー');
        }
        self.chars += mask_len;
    }

    fn finish(self) -> MaskedSource {
        MaskedSource {
            text: self.text,
            segments: self.segments,
        }
    }
}

/// Converts byte offsets into char offsets with a forward-moving cursor,
/// so in-order event ranges convert without rescanning the document.
struct CharCursor<'a> {
    doc: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    const fn new(doc: &'a str) -> Self {
        Self {
            doc,
            byte: 0,
            chars: 0,
        }
    }

    fn char_at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.doc[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }

    /// (char start, char length) of a byte range.
    fn char_range(&mut self, range: &Range<usize>) -> (usize, usize) {
        let start = self.char_at(range.start);
        let end = self.char_at(range.end);
        (start, end - start)
    }
}
