use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};

use crate::{error::LineReaderError, line::Line, offsets::Offsets};

const LINE_FEED: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';

/// Default size of the scan buffer, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Reads lines out of a byte source through a fixed-size buffer, so memory use
/// stays bounded no matter how large the source is.
///
/// Lines end at `\n`, `\r` or `\r\n`; each yielded [`Line`] records how many
/// source bytes it consumed including its delimiter. A `\r` at the end of the
/// buffer is resolved by refilling before deciding between `\r` and `\r\n`.
///
/// Once the source reports end of input the reader is exhausted for good and
/// never reads from the source again.
#[derive(Debug)]
pub struct LineReader<R> {
    source: R,
    buffer: Box<[u8]>,
    // number of valid bytes in `buffer`
    filled: usize,
    cursor: usize,
    exhausted: bool,
    // bytes handed out as lines so far
    position: u64,
}

impl LineReader<File> {
    /// Opens the file at `path` and reads lines from it. The file is closed
    /// when the reader is dropped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LineReaderError> {
        Self::open_with_capacity(path, DEFAULT_BUFFER_CAPACITY)
    }

    /// Like [`LineReader::open`], with a buffer of `capacity` bytes.
    pub fn open_with_capacity(
        path: impl AsRef<Path>,
        capacity: usize,
    ) -> Result<Self, LineReaderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LineReaderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_capacity(file, capacity)
    }
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Result<Self, LineReaderError> {
        Self::with_capacity(source, DEFAULT_BUFFER_CAPACITY)
    }

    /// Creates a reader with a buffer of `capacity` bytes. A capacity of zero
    /// is bumped to one. The first chunk is read right away.
    pub fn with_capacity(source: R, capacity: usize) -> Result<Self, LineReaderError> {
        let capacity = capacity.max(1);
        let mut reader = Self {
            source,
            buffer: vec![0; capacity].into_boxed_slice(),
            filled: 0,
            cursor: 0,
            exhausted: false,
            position: 0,
        };
        tracing::debug!(capacity, "created line reader");
        reader.refill_if_needed()?;
        Ok(reader)
    }

    /// Whether another line can be read. Never consumes any bytes, but may
    /// block on the source if the buffer has been fully consumed.
    pub fn has_next(&mut self) -> Result<bool, LineReaderError> {
        self.refill_if_needed()
    }

    /// Reads the next line. Fails with [`LineReaderError::Exhausted`] when
    /// there is nothing left to read.
    ///
    /// On [`LineReaderError::Read`] the partly scanned line is dropped and
    /// its bytes are never added to [`LineReader::position`], so the position
    /// no longer matches the source after a read failure.
    pub fn next_line(&mut self) -> Result<Line, LineReaderError> {
        let mut content = String::new();
        let mut length = 0;

        while self.refill_if_needed()? {
            let available = &self.buffer[self.cursor..self.filled];
            match available.iter().position(|&byte| is_line_delimiter(byte)) {
                None => {
                    content.extend(available.iter().copied().map(char::from));
                    length += available.len();
                    self.cursor = self.filled;
                }
                Some(idx) => {
                    content.extend(available[..idx].iter().copied().map(char::from));
                    let delimiter = available[idx];
                    length += idx + 1;
                    self.cursor += idx + 1;
                    // the `\r` is already consumed, so refilling here cannot
                    // lose any bytes
                    if delimiter == CARRIAGE_RETURN
                        && self.refill_if_needed()?
                        && self.buffer[self.cursor] == LINE_FEED
                    {
                        length += 1;
                        self.cursor += 1;
                    }
                    break;
                }
            }
        }

        if length == 0 {
            return Err(LineReaderError::Exhausted);
        }
        self.position += length as u64;
        Ok(Line::new(content, length))
    }

    /// Wraps this reader so every line comes paired with its starting byte
    /// offset in the source.
    pub fn with_offsets(self) -> Offsets<R> {
        Offsets::new(self)
    }

    /// Total number of bytes handed out as lines so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.cursor >= self.filled
    }

    /// Gives back the underlying source. Any buffered but unread bytes are
    /// dropped.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Makes sure there is at least one unread byte in the buffer, reading a
    /// fresh chunk from the source if everything loaded so far has been
    /// consumed. Returns `false` once the source is exhausted.
    fn refill_if_needed(&mut self) -> Result<bool, LineReaderError> {
        if self.cursor < self.filled {
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }

        let bytes_read = loop {
            match self.source.read(&mut self.buffer) {
                Ok(bytes_read) => break bytes_read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.filled = 0;
                    self.cursor = 0;
                    self.exhausted = true;
                    return Err(LineReaderError::Read(err));
                }
            }
        };

        self.filled = bytes_read;
        self.cursor = 0;
        if bytes_read == 0 {
            self.exhausted = true;
            tracing::debug!(position = self.position, "reached end of source");
        } else {
            tracing::trace!(bytes_read, "refilled buffer");
        }
        Ok(bytes_read > 0)
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<Line, LineReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(line) => Some(Ok(line)),
            Err(LineReaderError::Exhausted) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

fn is_line_delimiter(byte: u8) -> bool {
    byte == LINE_FEED || byte == CARRIAGE_RETURN
}
