use serde::Serialize;

/// A single line read out of a source, along with the number of bytes it took
/// up in that source.
///
/// `length` includes the delimiter that ended the line (1 byte for `\n` or a
/// lone `\r`, 2 bytes for `\r\n`, nothing if the source ended first), so
/// summing lengths gives byte offsets into the source.
///
/// The content is built by widening every source byte to one `char`
/// (Latin-1 style). Multi-byte UTF-8 sequences are not decoded, which keeps
/// `length >= content.chars().count()` true for every line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{content}:{length}")]
pub struct Line {
    content: String,
    length: usize,
}

impl Line {
    pub fn new(content: impl Into<String>, length: usize) -> Self {
        Self {
            content: content.into(),
            length,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of delimiter bytes counted in `length`: 0, 1 or 2.
    pub fn delimiter_len(&self) -> usize {
        self.length.saturating_sub(self.content.chars().count())
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
