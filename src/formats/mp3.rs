//! formats/mp3.rs
//! MP3-backed track: an ID3v2.4 tag addressed by frame ID.
//!
//! ID3 folds track/total and disc/total into single slash-pair frames
//! (TRCK, TPOS), and comment/lyrics/url live in structured frames rather
//! than plain text ones, so reading and saving special-case those.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use id3::frame::{Comment, Content, Frame, Lyrics, Picture, PictureType};
use id3::{Tag, TagLike, Version};
use image::DynamicImage;
use log::debug;

use super::AttributeMap;
use crate::cover::{self, CoverFormat};
use crate::error::{Error, Result};
use crate::track::{CoverCapable, Readable, Savable, Track, TrackField, TrackTags};
use crate::util::parse_slash_pair_u32;

/// ID3v2.4 frame IDs for every canonical field.
fn frame_id(field: TrackField) -> &'static str {
    use TrackField as F;
    match field {
        F::Album => "TALB",
        F::AlbumArtist => "TPE2",
        F::Artist => "TPE1",
        F::Bpm => "TBPM",
        F::Comment => "COMM",
        F::Composer => "TCOM",
        F::Conductor => "TPE3",
        F::ContentGroup => "TIT1",
        F::Copyright => "TCOP",
        F::Disc => "TPOS",
        F::EncodedBy => "TENC",
        F::Genre => "TCON",
        F::InitialKey => "TKEY",
        F::Isrc => "TSRC",
        F::Lyricist => "TEXT",
        F::Lyrics => "USLT",
        F::OrigArtist => "TOPE",
        F::Publisher => "TPUB",
        F::RemixedBy => "TPE4",
        F::Subtitle => "TIT3",
        F::Title => "TIT2",
        F::TotalDiscs => "TPOS",
        F::TotalTracks => "TRCK",
        F::TrackNumber => "TRCK",
        F::Www => "WOAR",
        F::Year => "TDRC",
    }
}

pub(crate) static ID3_MAP: AttributeMap = AttributeMap::new(frame_id);

/// Best-effort string value from a frame id.
/// Intentionally defensive: some "text-ish" frames are not Content::Text.
fn text_frame(tag: &Tag, id: &str) -> Option<String> {
    let frame = tag.get(id)?;
    match frame.content() {
        Content::Text(s) => Some(s.clone()),
        Content::Link(s) => Some(s.clone()),
        _ => None,
    }
}

fn first_comment(tag: &Tag) -> Option<String> {
    for frame in tag.frames() {
        if frame.id() == "COMM" {
            if let Content::Comment(c) = frame.content() {
                return Some(c.text.clone());
            }
        }
    }
    None
}

fn first_lyrics(tag: &Tag) -> Option<String> {
    for frame in tag.frames() {
        if frame.id() == "USLT" {
            if let Content::Lyrics(l) = frame.content() {
                return Some(l.text.clone());
            }
        }
    }
    None
}

/// Set or remove a plain text frame (T***).
fn set_text_opt(tag: &mut Tag, id: &str, value: Option<&str>) {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => tag.set_text(id, s.to_string()),
        _ => {
            let _ = tag.remove(id);
        }
    }
}

/// Write TRCK/TPOS as "n" or "n/total", or drop the frame entirely.
fn set_slash_pair(tag: &mut Tag, id: &str, n: Option<&str>, total: Option<&str>) {
    let n = n.map(str::trim).filter(|s| !s.is_empty());
    let total = total.map(str::trim).filter(|s| !s.is_empty());
    match n {
        None => {
            let _ = tag.remove(id);
        }
        Some(n) => match total {
            Some(t) => tag.set_text(id, format!("{n}/{t}")),
            None => tag.set_text(id, n.to_string()),
        },
    }
}

/// Replace the COMM frame with a single "eng" comment, or drop it.
fn set_comment(tag: &mut Tag, value: Option<&str>) {
    let _ = tag.remove("COMM");
    if let Some(s) = value.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: s.to_string(),
        });
    }
}

/// Replace the USLT frame with a single "eng" lyrics frame, or drop it.
fn set_lyrics(tag: &mut Tag, value: Option<&str>) {
    let _ = tag.remove("USLT");
    if let Some(s) = value.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = tag.add_frame(Lyrics {
            lang: "eng".to_string(),
            description: String::new(),
            text: s.to_string(),
        });
    }
}

/// Set or remove a URL frame (W***).
fn set_link(tag: &mut Tag, id: &str, value: Option<&str>) {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => {
            let _ = tag.add_frame(Frame::with_content(id, Content::Link(s.to_string())));
        }
        _ => {
            let _ = tag.remove(id);
        }
    }
}

/// One MP3 file's metadata, bound to its path. Owns the ID3 tag
/// exclusively; concurrent instances over the same file are the
/// caller's problem.
pub struct Mp3Track {
    path: PathBuf,
    tags: TrackTags,
    cover: Option<DynamicImage>,
    store: Tag,
}

impl Mp3Track {
    /// Open an MP3 file and populate tags and cover from its store.
    /// A file without an ID3 tag starts from an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Mp3Track> {
        let path = path.into();
        let store = match Tag::read_from_path(&path) {
            Ok(tag) => tag,
            Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => Tag::new(),
            Err(err) => return Err(err.into()),
        };
        debug!("opened {}", path.display());

        let mut track = Mp3Track {
            path,
            tags: TrackTags::default(),
            cover: None,
            store,
        };
        track.read()?;
        track.read_cover()?;
        Ok(track)
    }

    /// Raw bytes and mime of the first embedded picture (APIC/PIC).
    fn front_picture(&self) -> Option<(&[u8], &str)> {
        for frame in self.store.frames() {
            if frame.id() != "APIC" && frame.id() != "PIC" {
                continue;
            }
            if let Content::Picture(picture) = frame.content() {
                return Some((picture.data.as_slice(), picture.mime_type.as_str()));
            }
        }
        None
    }

    fn persist(&self) -> Result<()> {
        self.store.write_to_path(&self.path, Version::Id3v24)?;
        Ok(())
    }
}

impl Readable for Mp3Track {
    fn read(&mut self) -> Result<()> {
        use TrackField as F;

        let (track_no, track_total) =
            parse_slash_pair_u32(text_frame(&self.store, "TRCK").as_deref());
        let (disc_no, disc_total) =
            parse_slash_pair_u32(text_frame(&self.store, "TPOS").as_deref());

        for &field in TrackField::ALL.iter() {
            let value = match field {
                F::TrackNumber => track_no.map(|n| n.to_string()),
                F::TotalTracks => track_total.map(|n| n.to_string()),
                F::Disc => disc_no.map(|n| n.to_string()),
                F::TotalDiscs => disc_total.map(|n| n.to_string()),
                F::Comment => first_comment(&self.store),
                F::Lyrics => first_lyrics(&self.store),
                F::Year => text_frame(&self.store, "TDRC")
                    .or_else(|| text_frame(&self.store, "TYER")),
                _ => text_frame(&self.store, ID3_MAP.native_key(field)),
            };
            self.tags.set(field, value);
        }
        Ok(())
    }
}

impl Savable for Mp3Track {
    fn save(&mut self) -> Result<()> {
        use TrackField as F;

        for &field in TrackField::ALL.iter() {
            match field {
                // Written below as slash pairs.
                F::TrackNumber | F::TotalTracks | F::Disc | F::TotalDiscs => {}
                F::Comment => set_comment(&mut self.store, self.tags.get(field)),
                F::Lyrics => set_lyrics(&mut self.store, self.tags.get(field)),
                F::Www => set_link(&mut self.store, "WOAR", self.tags.get(field)),
                _ => set_text_opt(
                    &mut self.store,
                    ID3_MAP.native_key(field),
                    self.tags.get(field),
                ),
            }
        }
        set_slash_pair(
            &mut self.store,
            "TRCK",
            self.tags.get(F::TrackNumber),
            self.tags.get(F::TotalTracks),
        );
        set_slash_pair(
            &mut self.store,
            "TPOS",
            self.tags.get(F::Disc),
            self.tags.get(F::TotalDiscs),
        );

        self.persist()?;
        debug!("saved tags to {}", self.path.display());
        Ok(())
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        let id = ID3_MAP.lookup_for_delete(name)?;
        let _ = self.store.remove(id);
        Ok(())
    }

    fn delete_tags(&mut self) -> Result<()> {
        let ids: Vec<String> = self
            .store
            .frames()
            .map(|frame| frame.id().to_string())
            .filter(|id| id != "APIC" && id != "PIC")
            .collect();
        for id in ids {
            let _ = self.store.remove(&id);
        }
        self.persist()
    }
}

impl CoverCapable for Mp3Track {
    fn read_cover(&mut self) -> Result<Option<&DynamicImage>> {
        let bytes = match self.front_picture() {
            Some((data, _)) => data.to_vec(),
            None => return Ok(None),
        };
        self.cover = Some(cover::decode(&bytes)?);
        Ok(self.cover.as_ref())
    }

    fn add_cover(&mut self, path: &Path, description: &str) -> Result<()> {
        let mime = cover::mime_for_path(path)?;
        let data = fs::read(path)?;
        self.remove_cover()?;

        let _ = self.store.add_frame(Frame::with_content(
            "APIC",
            Content::Picture(Picture {
                mime_type: mime.to_string(),
                picture_type: PictureType::CoverFront,
                description: description.to_string(),
                data,
            }),
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
            self.front_picture()
                .map(|(_, mime)| CoverFormat::from_mime(mime))
                .unwrap_or(CoverFormat::Jpeg)
        });

        let dir = self.path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let staged = cover::write_resized_temp(&image, width, format, &dir)?;
        self.add_cover(staged.path(), "")?;
        Ok(())
    }

    fn export_cover(&self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some((data, mime)) = self.front_picture() else {
            return Ok(None);
        };
        let suffix = cover::suffix_for_mime(mime);
        let destination = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .path
                .parent()
                .unwrap_or(Path::new("."))
                .join(format!("cover.{suffix}")),
        };
        fs::write(&destination, data)?;
        Ok(Some(destination))
    }

    fn remove_cover(&mut self) -> Result<()> {
        let _ = self.store.remove("APIC");
        let _ = self.store.remove("PIC");
        self.persist()
    }

    fn cover(&self) -> Option<&DynamicImage> {
        self.cover.as_ref()
    }
}

impl Track for Mp3Track {
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
        use TrackField as F;
        let (field, id) = ID3_MAP.lookup(key)?;
        Ok(match field {
            F::Comment => first_comment(&self.store),
            F::Lyrics => first_lyrics(&self.store),
            _ => text_frame(&self.store, id),
        })
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        use TrackField as F;
        let (field, id) = ID3_MAP.lookup(key)?;
        match field {
            F::Comment => set_comment(&mut self.store, Some(value)),
            F::Lyrics => set_lyrics(&mut self.store, Some(value)),
            F::Www => set_link(&mut self.store, id, Some(value)),
            _ => set_text_opt(&mut self.store, id, Some(value)),
        }
        Ok(())
    }
}

impl fmt::Display for Mp3Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tags.fmt(f)
    }
}
