use std::io::Read;

use crate::{error::LineReaderError, line::Line, line_reader::LineReader};

/// Byte offset of the line that follows a line of `length` bytes starting at
/// `offset`.
pub fn calculate_new_offset(length: usize, offset: u64) -> u64 {
    offset + length as u64
}

/// Pairs every line of a [`LineReader`] with the byte offset it starts at.
/// Offsets are computed purely from line lengths; the source is never read
/// twice.
#[derive(Debug)]
pub struct Offsets<R> {
    reader: LineReader<R>,
    /// Offset of the next line to be read.
    offset: u64,
}

impl<R: Read> Offsets<R> {
    pub(crate) fn new(reader: LineReader<R>) -> Self {
        let offset = reader.position();
        Self { reader, offset }
    }

    pub fn next_offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> LineReader<R> {
        self.reader
    }
}

impl<R: Read> Iterator for Offsets<R> {
    type Item = Result<(u64, Line), LineReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.reader.next()? {
            Ok(line) => line,
            Err(err) => return Some(Err(err)),
        };
        let offset = self.offset;
        self.offset = calculate_new_offset(line.length(), offset);
        Some(Ok((offset, line)))
    }
}
