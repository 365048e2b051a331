//! formats/flac.rs
//! FLAC-backed track: Vorbis comments plus the FLAC picture list.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use log::debug;

use super::AttributeMap;
use crate::cover::{self, CoverFormat};
use crate::error::{Error, Result};
use crate::track::{CoverCapable, Readable, Savable, Track, TrackField, TrackTags};

/// Vorbis comment names for every canonical field.
fn vorbis_key(field: TrackField) -> &'static str {
    use TrackField as F;
    match field {
        F::Album => "album",
        F::AlbumArtist => "albumartist",
        F::Artist => "artist",
        F::Bpm => "bpm",
        F::Comment => "comment",
        F::Composer => "composer",
        F::Conductor => "conductor",
        F::ContentGroup => "contentgroup",
        F::Copyright => "copyright",
        F::Disc => "discnumber",
        F::EncodedBy => "encodedby",
        F::Genre => "genre",
        F::InitialKey => "initialkey",
        F::Isrc => "isrc",
        F::Lyricist => "lyricist",
        F::Lyrics => "lyrics",
        F::OrigArtist => "origartist",
        F::Publisher => "organization",
        F::RemixedBy => "remixedby",
        F::Subtitle => "subtitle",
        F::Title => "title",
        F::TotalDiscs => "disctotal",
        F::TotalTracks => "tracktotal",
        F::TrackNumber => "tracknumber",
        F::Www => "location",
        F::Year => "date",
    }
}

pub(crate) static VORBIS_MAP: AttributeMap = AttributeMap::new(vorbis_key);

/// One FLAC file's metadata, bound to its path. Owns the Vorbis comment
/// tag exclusively; concurrent instances over the same file are the
/// caller's problem.
pub struct FlacTrack {
    path: PathBuf,
    tags: TrackTags,
    cover: Option<DynamicImage>,
    store: Tag,
}

impl FlacTrack {
    /// Open a FLAC file and populate tags and cover from its store.
    /// A file without a Vorbis comment block starts from an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<FlacTrack> {
        let path = path.into();
        let tagged = Probe::open(&path)?.read()?;
        let store = tagged
            .tag(TagType::VorbisComments)
            .cloned()
            .unwrap_or_else(|| Tag::new(TagType::VorbisComments));
        debug!("opened {}", path.display());

        let mut track = FlacTrack {
            path,
            tags: TrackTags::default(),
            cover: None,
            store,
        };
        track.read()?;
        track.read_cover()?;
        Ok(track)
    }

    fn item_key(native: &str) -> ItemKey {
        ItemKey::from_key(TagType::VorbisComments, native)
    }

    fn front_picture(&self) -> Option<&Picture> {
        self.store.pictures().first()
    }

    fn persist(&self) -> Result<()> {
        self.store.save_to_path(&self.path, WriteOptions::default())?;
        Ok(())
    }
}

impl Readable for FlacTrack {
    fn read(&mut self) -> Result<()> {
        for &field in TrackField::ALL.iter() {
            let key = Self::item_key(VORBIS_MAP.native_key(field));
            let value = self.store.get_string(&key).map(str::to_owned);
            self.tags.set(field, value);
        }
        Ok(())
    }
}

impl Savable for FlacTrack {
    fn save(&mut self) -> Result<()> {
        for &field in TrackField::ALL.iter() {
            let key = Self::item_key(VORBIS_MAP.native_key(field));
            match self.tags.get(field) {
                Some(value) if !value.is_empty() => {
                    self.store.insert_text(key, value.to_string());
                }
                _ => {
                    self.store.remove_key(&key);
                }
            }
        }
        self.persist()?;
        debug!("saved tags to {}", self.path.display());
        Ok(())
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        let native = VORBIS_MAP.lookup_for_delete(name)?;
        self.store.remove_key(&Self::item_key(native));
        Ok(())
    }

    fn delete_tags(&mut self) -> Result<()> {
        let keys: Vec<ItemKey> = self.store.items().map(|item| item.key().clone()).collect();
        for key in keys {
            self.store.remove_key(&key);
        }
        self.persist()
    }
}

impl CoverCapable for FlacTrack {
    fn read_cover(&mut self) -> Result<Option<&DynamicImage>> {
        let bytes = match self.front_picture() {
            Some(picture) => picture.data().to_vec(),
            None => return Ok(None),
        };
        self.cover = Some(cover::decode(&bytes)?);
        Ok(self.cover.as_ref())
    }

    fn add_cover(&mut self, path: &Path, description: &str) -> Result<()> {
        let mime = cover::mime_for_path(path)?;
        let data = fs::read(path)?;
        self.remove_cover()?;

        let mime_type = if mime == cover::MIME_PNG {
            MimeType::Png
        } else {
            MimeType::Jpeg
        };
        let description = (!description.is_empty()).then(|| description.to_string());
        self.store.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(mime_type),
            description,
            data,
        ));
        self.persist()?;
        debug!("replaced cover of {}", self.path.display());
        Ok(())
    }

    fn resize_cover(&mut self, width: u32, extension: Option<&str>) -> Result<()> {
        let requested = extension.map(CoverFormat::from_extension).transpose()?;
        let image = match self.read_cover()? {
            Some(image) => image.clone(),
            None => return Err(Error::NoCoverFound),
        };
        let format = requested.unwrap_or_else(|| {
            match self.front_picture().and_then(|p| p.mime_type()) {
                Some(MimeType::Png) => CoverFormat::Png,
                _ => CoverFormat::Jpeg,
            }
        });

        let dir = self.path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let staged = cover::write_resized_temp(&image, width, format, &dir)?;
        self.add_cover(staged.path(), "")?;
        Ok(())
    }

    fn export_cover(&self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some(picture) = self.front_picture() else {
            return Ok(None);
        };
        let suffix = match picture.mime_type() {
            Some(MimeType::Png) => "png",
            _ => "jpg",
        };
        let destination = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .path
                .parent()
                .unwrap_or(Path::new("."))
                .join(format!("cover.{suffix}")),
        };
        fs::write(&destination, picture.data())?;
        Ok(Some(destination))
    }

    fn remove_cover(&mut self) -> Result<()> {
        while !self.store.pictures().is_empty() {
            self.store.remove_picture(0);
        }
        self.persist()
    }

    fn cover(&self) -> Option<&DynamicImage> {
        self.cover.as_ref()
    }
}

impl Track for FlacTrack {
    fn path(&self) -> &Path {
        &self.path
    }

    fn tags(&self) -> &TrackTags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut TrackTags {
        &mut self.tags
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let (_, native) = VORBIS_MAP.lookup(key)?;
        Ok(self
            .store
            .get_string(&Self::item_key(native))
            .map(str::to_owned))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let (_, native) = VORBIS_MAP.lookup(key)?;
        self.store.insert_text(Self::item_key(native), value.to_string());
        Ok(())
    }
}

impl fmt::Display for FlacTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tags.fmt(f)
    }
}
