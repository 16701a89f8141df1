use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum LineReaderError {
    /// `next_line` was called after the last line was handed out.
    #[error("No more lines to read.")]
    Exhausted,
    /// The underlying source failed during a refill. The reader must not be
    /// used again after this.
    #[error("Failed reading from source: {0}")]
    Read(#[from] std::io::Error),
    #[error("Could not open file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LineReaderError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}
