pub mod inflate;
pub mod zip;

use thiserror::Error;

pub use inflate::{inflate, InflateError, Inflater};
pub use zip::{Archive, CentralDirectory, CompressionMethod, ZipEntry};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no end-of-central-directory record found")]
    MissingEndOfCentralDirectory,
    #[error("archive truncated: {what} at offset {offset} runs past {len} bytes")]
    Truncated {
        what: &'static str,
        offset: usize,
        len: usize,
    },
    #[error("entry {name}: local header signature mismatch at offset {offset}")]
    BadLocalHeader { name: String, offset: usize },
    #[error("entry {name}: unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },
    #[error("entry {name}: {source}")]
    Inflate {
        name: String,
        #[source]
        source: InflateError,
    },
    #[error("no worksheet matching sheet1.xml in archive")]
    MissingWorksheet,
}
