//! formats/mod.rs
//!
//! One adapter per supported audio format.
//! Public API:
//! - [`FlacTrack`] binds the schema to a FLAC file's Vorbis comments.
//! - [`Mp3Track`] binds it to an MP3 file's ID3v2 tag.

mod flac;
mod mp3;

pub use flac::FlacTrack;
pub use mp3::Mp3Track;

use crate::error::{Error, Result};
use crate::track::TrackField;

/// Static per-format table from canonical field to native tag key.
///
/// The table wraps a total function over [`TrackField`], so every
/// canonical field has a native key by construction; there is no
/// missing-entry case to handle at runtime. Shared read-only by all
/// adapter instances of a format.
pub struct AttributeMap {
    native: fn(TrackField) -> &'static str,
}

impl AttributeMap {
    pub const fn new(native: fn(TrackField) -> &'static str) -> AttributeMap {
        AttributeMap { native }
    }

    /// Native key for a canonical field.
    pub fn native_key(&self, field: TrackField) -> &'static str {
        (self.native)(field)
    }

    /// Resolve a canonical attribute name to its field and native key,
    /// for indexed native access.
    pub fn lookup(&self, name: &str) -> Result<(TrackField, &'static str)> {
        match TrackField::from_name(name) {
            Some(field) => Ok((field, self.native_key(field))),
            None => Err(Error::UnknownAttribute(name.to_string())),
        }
    }

    /// Resolve a name for tag deletion, where an unresolved name is a
    /// mapping miss rather than a schema miss.
    pub fn lookup_for_delete(&self, name: &str) -> Result<&'static str> {
        match TrackField::from_name(name) {
            Some(field) => Ok(self.native_key(field)),
            None => Err(Error::UnmappedAttribute(name.to_string())),
        }
    }
}
