//! Uniform track-metadata and cover-art editing across audio tag formats.
//!
//! Every supported container gets one adapter ([`FlacTrack`],
//! [`Mp3Track`]) that binds the canonical schema ([`TrackTags`]) to a
//! file on disk through that format's native tag store. Reading fills
//! the canonical fields from the mapped native keys, saving pushes them
//! back, and the embedded cover is managed as its own sub-resource
//! (read, replace, resize, export, remove).
//!
//! ```no_run
//! use std::path::Path;
//!
//! use fermata::{CoverCapable, FlacTrack, Savable, Track};
//!
//! fn main() -> fermata::Result<()> {
//!     let mut track = FlacTrack::open("albums/aurora/01 - dawn.flac")?;
//!     track.tags_mut().title = Some("Dawn".to_string());
//!     track.save()?;
//!     track.add_cover(Path::new("albums/aurora/front.png"), "")?;
//!     track.resize_cover(600, None)?;
//!     Ok(())
//! }
//! ```

mod cover;
mod error;
mod formats;
mod track;
mod util;

pub use error::{Error, Result};
pub use formats::{AttributeMap, FlacTrack, Mp3Track};
pub use track::{
    CoverCapable, Readable, Savable, Track, TrackField, TrackOp, TrackTags,
};
