use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmabError {
    #[error("Opened file is not a CMAB archive.")]
    InvalidMagic,

    #[error("End-of-header sentinel '0xFFFFFFFF' not found.")]
    MissingSentinel,

    #[error("Chunk '{0}' not found at the expected offset.")]
    MissingChunk(&'static str),

    #[error("Fell out of the archive while reading.")]
    TruncatedArchive,

    #[error("Name table entry '{0}' has no matching texture entry.")]
    NameTableOverrun(usize),

    #[error("Unable to decode a texture name.")]
    BadName,

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    DecodeError(#[from] TextureDecodeError),
}

#[derive(Error, Debug)]
pub enum TextureDecodeError {
    #[error("Texture format '0x{0:x}' is not supported.")]
    UnsupportedFormat(u32),

    #[error("Texture data is too short: expected '0x{0:x}' bytes, found '0x{1:x}'.")]
    TruncatedPayload(usize, usize),

    #[error("Dimensions {0}x{1} are not aligned to the format's tile size.")]
    InvalidDimensions(usize, usize),
}
