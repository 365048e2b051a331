//! error.rs
//! Error taxonomy shared by the schema and every format adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A canonical or native-mapped attribute name outside the schema.
    #[error("unknown track attribute `{0}`")]
    UnknownAttribute(String),

    /// A name passed to by-name dispatch that resolves to no operation.
    #[error("unknown track method `{0}`")]
    UnknownMethod(String),

    /// Cover files must be jpg, jpeg or png.
    #[error("unsupported picture format `{0}` (expected jpg, jpeg or png)")]
    WrongPictureFormat(String),

    /// An operation that needs an existing cover found none.
    #[error("no cover found")]
    NoCoverFound,

    /// A tag name with no entry in this format's attribute map.
    #[error("attribute `{0}` is not mapped for this format")]
    UnmappedAttribute(String),

    #[error("failed to stamp cover metadata: {0}")]
    CoverMetadata(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),

    #[error(transparent)]
    Id3(#[from] id3::Error),

    #[error(transparent)]
    Image(#[from] image::error::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
