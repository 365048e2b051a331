//! track.rs
//! The format-independent track schema and the capability traits every
//! format adapter implements.
//!
//! Rule of thumb:
//! - [`TrackTags`] is a boring bag of data, no I/O
//! - everything file-shaped lives behind the traits, per format
//!
//! The attribute set is closed: typed code cannot name a field outside
//! [`TrackField`], and the string-keyed entry points (`import_from_dict`,
//! indexed access, by-name dispatch) validate names before touching
//! anything.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{Error, Result};

/// One canonical track attribute. Declaration order is the schema order
/// used by [`TrackTags::export_to_dict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackField {
    Album,
    AlbumArtist,
    Artist,
    Bpm,
    Comment,
    Composer,
    Conductor,
    ContentGroup,
    Copyright,
    Disc,
    EncodedBy,
    Genre,
    InitialKey,
    Isrc,
    Lyricist,
    Lyrics,
    OrigArtist,
    Publisher,
    RemixedBy,
    Subtitle,
    Title,
    TotalDiscs,
    TotalTracks,
    TrackNumber,
    Www,
    Year,
}

impl TrackField {
    /// Every canonical field, in schema order.
    pub const ALL: [TrackField; 26] = [
        TrackField::Album,
        TrackField::AlbumArtist,
        TrackField::Artist,
        TrackField::Bpm,
        TrackField::Comment,
        TrackField::Composer,
        TrackField::Conductor,
        TrackField::ContentGroup,
        TrackField::Copyright,
        TrackField::Disc,
        TrackField::EncodedBy,
        TrackField::Genre,
        TrackField::InitialKey,
        TrackField::Isrc,
        TrackField::Lyricist,
        TrackField::Lyrics,
        TrackField::OrigArtist,
        TrackField::Publisher,
        TrackField::RemixedBy,
        TrackField::Subtitle,
        TrackField::Title,
        TrackField::TotalDiscs,
        TrackField::TotalTracks,
        TrackField::TrackNumber,
        TrackField::Www,
        TrackField::Year,
    ];

    /// Canonical attribute name, as used in dict import/export.
    pub fn name(self) -> &'static str {
        match self {
            TrackField::Album => "album",
            TrackField::AlbumArtist => "albumartist",
            TrackField::Artist => "artist",
            TrackField::Bpm => "bpm",
            TrackField::Comment => "comment",
            TrackField::Composer => "composer",
            TrackField::Conductor => "conductor",
            TrackField::ContentGroup => "contentgroup",
            TrackField::Copyright => "copyright",
            TrackField::Disc => "disc",
            TrackField::EncodedBy => "encodedby",
            TrackField::Genre => "genre",
            TrackField::InitialKey => "initialkey",
            TrackField::Isrc => "isrc",
            TrackField::Lyricist => "lyricist",
            TrackField::Lyrics => "lyrics",
            TrackField::OrigArtist => "origartist",
            TrackField::Publisher => "publisher",
            TrackField::RemixedBy => "remixedby",
            TrackField::Subtitle => "subtitle",
            TrackField::Title => "title",
            TrackField::TotalDiscs => "totaldiscs",
            TrackField::TotalTracks => "totaltracks",
            TrackField::TrackNumber => "track",
            TrackField::Www => "www",
            TrackField::Year => "year",
        }
    }

    /// Resolve a canonical attribute name. `None` for anything outside
    /// the schema.
    pub fn from_name(name: &str) -> Option<TrackField> {
        TrackField::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// Canonical metadata of one audio track, independent of the container
/// format. All values are optional strings; a missing tag is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub artist: Option<String>,
    pub bpm: Option<String>,
    pub comment: Option<String>,
    pub composer: Option<String>,
    pub conductor: Option<String>,
    pub content_group: Option<String>,
    pub copyright: Option<String>,
    pub disc: Option<String>,
    pub encoded_by: Option<String>,
    pub genre: Option<String>,
    pub initial_key: Option<String>,
    pub isrc: Option<String>,
    pub lyricist: Option<String>,
    pub lyrics: Option<String>,
    pub orig_artist: Option<String>,
    pub publisher: Option<String>,
    pub remixed_by: Option<String>,
    pub subtitle: Option<String>,
    pub title: Option<String>,
    pub total_discs: Option<String>,
    pub total_tracks: Option<String>,
    pub track: Option<String>,
    pub www: Option<String>,
    pub year: Option<String>,
}

impl TrackTags {
    /// Current value of a canonical field.
    pub fn get(&self, field: TrackField) -> Option<&str> {
        let value = match field {
            TrackField::Album => &self.album,
            TrackField::AlbumArtist => &self.album_artist,
            TrackField::Artist => &self.artist,
            TrackField::Bpm => &self.bpm,
            TrackField::Comment => &self.comment,
            TrackField::Composer => &self.composer,
            TrackField::Conductor => &self.conductor,
            TrackField::ContentGroup => &self.content_group,
            TrackField::Copyright => &self.copyright,
            TrackField::Disc => &self.disc,
            TrackField::EncodedBy => &self.encoded_by,
            TrackField::Genre => &self.genre,
            TrackField::InitialKey => &self.initial_key,
            TrackField::Isrc => &self.isrc,
            TrackField::Lyricist => &self.lyricist,
            TrackField::Lyrics => &self.lyrics,
            TrackField::OrigArtist => &self.orig_artist,
            TrackField::Publisher => &self.publisher,
            TrackField::RemixedBy => &self.remixed_by,
            TrackField::Subtitle => &self.subtitle,
            TrackField::Title => &self.title,
            TrackField::TotalDiscs => &self.total_discs,
            TrackField::TotalTracks => &self.total_tracks,
            TrackField::TrackNumber => &self.track,
            TrackField::Www => &self.www,
            TrackField::Year => &self.year,
        };
        value.as_deref()
    }

    /// Overwrite a canonical field.
    pub fn set(&mut self, field: TrackField, value: Option<String>) {
        let slot = match field {
            TrackField::Album => &mut self.album,
            TrackField::AlbumArtist => &mut self.album_artist,
            TrackField::Artist => &mut self.artist,
            TrackField::Bpm => &mut self.bpm,
            TrackField::Comment => &mut self.comment,
            TrackField::Composer => &mut self.composer,
            TrackField::Conductor => &mut self.conductor,
            TrackField::ContentGroup => &mut self.content_group,
            TrackField::Copyright => &mut self.copyright,
            TrackField::Disc => &mut self.disc,
            TrackField::EncodedBy => &mut self.encoded_by,
            TrackField::Genre => &mut self.genre,
            TrackField::InitialKey => &mut self.initial_key,
            TrackField::Isrc => &mut self.isrc,
            TrackField::Lyricist => &mut self.lyricist,
            TrackField::Lyrics => &mut self.lyrics,
            TrackField::OrigArtist => &mut self.orig_artist,
            TrackField::Publisher => &mut self.publisher,
            TrackField::RemixedBy => &mut self.remixed_by,
            TrackField::Subtitle => &mut self.subtitle,
            TrackField::Title => &mut self.title,
            TrackField::TotalDiscs => &mut self.total_discs,
            TrackField::TotalTracks => &mut self.total_tracks,
            TrackField::TrackNumber => &mut self.track,
            TrackField::Www => &mut self.www,
            TrackField::Year => &mut self.year,
        };
        *slot = value;
    }

    /// Bulk-import attribute values from a string-keyed map.
    ///
    /// Every key is validated against the schema before anything is
    /// applied, so a failing import leaves the tags untouched. The error
    /// names the first unknown key in the map's iteration order.
    pub fn import_from_dict(&mut self, values: &BTreeMap<String, Option<String>>) -> Result<()> {
        let mut resolved = Vec::with_capacity(values.len());
        for (key, value) in values {
            match TrackField::from_name(key) {
                Some(field) => resolved.push((field, value.clone())),
                None => return Err(Error::UnknownAttribute(key.clone())),
            }
        }
        for (field, value) in resolved {
            self.set(field, value);
        }
        Ok(())
    }

    /// Export every canonical attribute. Map iteration follows schema
    /// order; the track's path and cover are not attributes and never
    /// appear here.
    pub fn export_to_dict(&self) -> BTreeMap<String, Option<String>> {
        TrackField::ALL
            .iter()
            .map(|&field| (field.name().to_string(), self.get(field).map(str::to_owned)))
            .collect()
    }
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

impl fmt::Display for TrackTags {
    /// Fixed diagnostic layout. For printing only, never parsed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tGeneral Info")?;
        writeln!(
            f,
            "Disc Number: {} Disc Total: {}",
            show(&self.disc),
            show(&self.total_discs)
        )?;
        writeln!(
            f,
            "Track Number: {} Track Total: {}",
            show(&self.track),
            show(&self.total_tracks)
        )?;
        writeln!(f, "Title: {}", show(&self.title))?;
        writeln!(f, "Artist: {}", show(&self.artist))?;
        writeln!(f, "Album: {}", show(&self.album))?;
        writeln!(f, "Album Artist: {}", show(&self.album_artist))?;
        writeln!(f, "Year: {}", show(&self.year))?;
        writeln!(f, "Track Genre: {}", show(&self.genre))?;
        writeln!(f, "Comment: {}", show(&self.comment))?;
        writeln!(f, "BPM: {} Key: {}", show(&self.bpm), show(&self.initial_key))?;
        writeln!(f)?;
        writeln!(f, "\tExtended Info")?;
        writeln!(f, "Original Artist: {}", show(&self.orig_artist))?;
        writeln!(f, "Remixer: {}", show(&self.remixed_by))?;
        writeln!(f, "Composer: {}", show(&self.composer))?;
        writeln!(f, "Conductor: {}", show(&self.conductor))?;
        writeln!(f, "Group: {}", show(&self.content_group))?;
        writeln!(f, "Subtitle: {}", show(&self.subtitle))?;
        writeln!(f, "ISRC: {}", show(&self.isrc))?;
        writeln!(f, "Publisher: {}", show(&self.publisher))?;
        writeln!(f, "Copyright: {}", show(&self.copyright))?;
        writeln!(f, "URL: {}", show(&self.www))?;
        writeln!(f, "Encoded By: {}", show(&self.encoded_by))?;
        writeln!(f)?;
        writeln!(f, "\tLyrics")?;
        writeln!(f, "Lyricist: {}", show(&self.lyricist))?;
        write!(f, "Lyrics: {}", show(&self.lyrics))
    }
}

/// Zero-argument track operations, for generic batch callers. By-name
/// dispatch goes through [`TrackOp::from_name`] at the string boundary;
/// everything past that point is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOp {
    Read,
    Save,
    DeleteTags,
    ReadCover,
    RemoveCover,
    ExportCover,
}

impl TrackOp {
    pub fn from_name(name: &str) -> Result<TrackOp> {
        match name {
            "read" => Ok(TrackOp::Read),
            "save" => Ok(TrackOp::Save),
            "delete_tags" => Ok(TrackOp::DeleteTags),
            "read_cover" => Ok(TrackOp::ReadCover),
            "remove_cover" => Ok(TrackOp::RemoveCover),
            "export_cover" => Ok(TrackOp::ExportCover),
            _ => Err(Error::UnknownMethod(name.to_string())),
        }
    }
}

/// Pulls native tag values into the canonical fields.
pub trait Readable {
    /// Re-read every canonical field from the tag store. A missing
    /// native key is a `None` value, never an error.
    fn read(&mut self) -> Result<()>;
}

/// Pushes canonical fields back into the tag store and manages native
/// keys directly.
pub trait Savable {
    /// Write every canonical field to its native key and persist.
    /// Native keys outside the attribute map are left untouched.
    fn save(&mut self) -> Result<()>;

    /// Drop a single native tag, addressed by canonical name. The store
    /// is not persisted.
    fn delete_tag(&mut self, name: &str) -> Result<()>;

    /// Clear the whole native tag namespace (mapped or not) and persist.
    /// Pictures are a separate sub-resource and survive.
    fn delete_tags(&mut self) -> Result<()>;
}

/// Embedded cover art lifecycle.
pub trait CoverCapable {
    /// Decode the store's front picture, cache it, and return it.
    /// `None` when the picture list is empty.
    fn read_cover(&mut self) -> Result<Option<&DynamicImage>>;

    /// Replace the cover with the image file at `path` (jpg, jpeg or
    /// png). The previous cover is removed, not archived.
    fn add_cover(&mut self, path: &Path, description: &str) -> Result<()>;

    /// Downsample the current cover to `width`, keeping aspect ratio.
    /// `extension` forces the stored encoding; omitted, PNG stays PNG
    /// and everything else becomes JPEG.
    fn resize_cover(&mut self, width: u32, extension: Option<&str>) -> Result<()>;

    /// Write the stored picture bytes verbatim to `path`, defaulting to
    /// `cover.<ext>` next to the track. `None` when there is no picture.
    fn export_cover(&self, path: Option<&Path>) -> Result<Option<PathBuf>>;

    /// Clear the picture list and persist. Idempotent.
    fn remove_cover(&mut self) -> Result<()>;

    /// The last decoded cover, if any.
    fn cover(&self) -> Option<&DynamicImage>;
}

/// A format-bound audio track: canonical tags plus one owned tag store.
pub trait Track: Readable + Savable + CoverCapable {
    fn path(&self) -> &Path;
    fn tags(&self) -> &TrackTags;
    fn tags_mut(&mut self) -> &mut TrackTags;

    /// Native value for a canonical name, straight from the store
    /// (bypasses the canonical field cache).
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a native value for a canonical name, straight into the
    /// store (bypasses the canonical field cache; not persisted).
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    fn import_from_dict(&mut self, values: &BTreeMap<String, Option<String>>) -> Result<()> {
        self.tags_mut().import_from_dict(values)
    }

    fn export_to_dict(&self) -> BTreeMap<String, Option<String>> {
        self.tags().export_to_dict()
    }

    fn call(&mut self, op: TrackOp) -> Result<()> {
        match op {
            TrackOp::Read => self.read(),
            TrackOp::Save => self.save(),
            TrackOp::DeleteTags => self.delete_tags(),
            TrackOp::ReadCover => self.read_cover().map(|_| ()),
            TrackOp::RemoveCover => self.remove_cover(),
            TrackOp::ExportCover => self.export_cover(None).map(|_| ()),
        }
    }

    fn call_by_name(&mut self, name: &str) -> Result<()> {
        self.call(TrackOp::from_name(name)?)
    }
}
