//! Memory-bounded, pull-based access to the lines of a file.
//!
//! A [`LineReader`] scans its source through a fixed-size buffer and yields
//! [`Line`]s that remember how many bytes they took up in the source,
//! delimiter included, so byte offsets can be rebuilt from line lengths alone.

pub use error::LineReaderError;
pub use line::Line;
pub use line_reader::{LineReader, DEFAULT_BUFFER_CAPACITY};
pub use offsets::{calculate_new_offset, Offsets};

pub mod error;
mod line;
mod line_reader;
mod offsets;
