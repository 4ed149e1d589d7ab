mod tools;
pub mod hzip;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("corrupt header")]
    CorruptHeader,
    #[error("bitstream ended before expected symbol count")]
    TruncatedBitstream,
    #[error("nothing to encode")]
    EmptyInput,
    #[error("extension exceeds 255 bytes")]
    ExtensionTooLong,
    #[error("file format mismatch")]
    FileFormatMismatch
}

/// Options controlling compression
pub struct Options {
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// size of the working buffer used for chunked reads and writes
    pub chunk_size: usize
}

pub const STD_OPTIONS: Options = Options {
    in_offset: 0,
    out_offset: 0,
    chunk_size: 4096
};
