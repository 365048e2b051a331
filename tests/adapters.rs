//! End-to-end adapter checks against synthesized fixtures: a minimal
//! FLAC stream, a tagless MP3 byte blob, and generated cover images.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::GenericImageView;
use tempfile::TempDir;

use fermata::{
    CoverCapable, Error, FlacTrack, Mp3Track, Readable, Savable, Track,
};

/// Minimal FLAC stream: magic plus a lone STREAMINFO block, no audio
/// frames. Enough for the tag store to read and rewrite metadata.
fn write_minimal_flac(path: &Path) {
    let mut data = Vec::new();
    data.extend_from_slice(b"fLaC");
    data.push(0x80); // last-metadata-block flag, block type 0 (STREAMINFO)
    data.extend_from_slice(&[0x00, 0x00, 0x22]); // 34-byte block
    data.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    data.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    data.extend_from_slice(&[0x00; 3]); // min frame size (unknown)
    data.extend_from_slice(&[0x00; 3]); // max frame size (unknown)
    // 44.1 kHz, 2 channels, 16 bits per sample, 0 total samples
    data.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(&[0x00; 16]); // MD5 (unset)
    fs::write(path, data).unwrap();
}

fn flac_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("track.flac");
    write_minimal_flac(&path);
    path
}

/// A tagless "MP3": arbitrary non-tag bytes. The adapter starts from an
/// empty store and prepends a tag on save.
fn mp3_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("track.mp3");
    fs::write(&path, [0u8; 512]).unwrap();
    path
}

fn png_fixture(dir: &TempDir, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join("front.png");
    image::RgbImage::from_pixel(width, height, image::Rgb([180, 90, 30]))
        .save(&path)
        .unwrap();
    path
}

fn jpeg_fixture(dir: &TempDir, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join("front.jpg");
    image::RgbImage::from_pixel(width, height, image::Rgb([20, 60, 110]))
        .save(&path)
        .unwrap();
    path
}

/// Any resize leftovers would show up as hidden staging files.
fn staging_leftovers(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".cover-"))
        .collect()
}

#[test]
fn flac_save_read_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);

    let mut track = FlacTrack::open(&path).unwrap();
    assert_eq!(track.tags().title, None);

    track.tags_mut().title = Some("Dawn".to_string());
    track.tags_mut().artist = Some("Nadir".to_string());
    track.tags_mut().album = Some("Aurora".to_string());
    track.tags_mut().track = Some("7".to_string());
    track.tags_mut().total_tracks = Some("12".to_string());
    track.tags_mut().publisher = Some("Night Signal".to_string());
    track.tags_mut().year = Some("2019".to_string());
    track.tags_mut().bpm = Some("128".to_string());
    track.save().unwrap();

    let reopened = FlacTrack::open(&path).unwrap();
    assert_eq!(reopened.tags().title.as_deref(), Some("Dawn"));
    assert_eq!(reopened.tags().artist.as_deref(), Some("Nadir"));
    assert_eq!(reopened.tags().album.as_deref(), Some("Aurora"));
    assert_eq!(reopened.tags().track.as_deref(), Some("7"));
    assert_eq!(reopened.tags().total_tracks.as_deref(), Some("12"));
    assert_eq!(reopened.tags().publisher.as_deref(), Some("Night Signal"));
    assert_eq!(reopened.tags().year.as_deref(), Some("2019"));
    assert_eq!(reopened.tags().bpm.as_deref(), Some("128"));
    // Untouched fields stay empty after the round trip.
    assert_eq!(reopened.tags().composer, None);
    assert_eq!(reopened.tags().lyrics, None);
}

#[test]
fn flac_dict_import_export_through_the_adapter() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);

    let mut track = FlacTrack::open(&path).unwrap();
    let mut values = BTreeMap::new();
    values.insert("title".to_string(), Some("Dawn".to_string()));
    values.insert("genre".to_string(), Some("Ambient".to_string()));
    track.import_from_dict(&values).unwrap();
    track.save().unwrap();

    let reopened = FlacTrack::open(&path).unwrap();
    let exported = reopened.export_to_dict();
    assert_eq!(exported["title"], Some("Dawn".to_string()));
    assert_eq!(exported["genre"], Some("Ambient".to_string()));
    assert_eq!(exported["conductor"], None);

    let mut track = reopened;
    let err = track
        .import_from_dict(&BTreeMap::from([(
            "rating".to_string(),
            Some("5".to_string()),
        )]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownAttribute(key) if key == "rating"));
}

#[test]
fn flac_indexed_access_bypasses_the_field_cache() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);

    let mut track = FlacTrack::open(&path).unwrap();
    track.set_item("publisher", "Night Signal").unwrap();
    // The canonical field is untouched until the next read.
    assert_eq!(track.tags().publisher, None);
    assert_eq!(
        track.get_item("publisher").unwrap().as_deref(),
        Some("Night Signal")
    );

    track.read().unwrap();
    assert_eq!(track.tags().publisher.as_deref(), Some("Night Signal"));

    assert!(matches!(
        track.get_item("loudness"),
        Err(Error::UnknownAttribute(_))
    ));
    assert!(matches!(
        track.set_item("loudness", "-14"),
        Err(Error::UnknownAttribute(_))
    ));
}

#[test]
fn flac_delete_tag_and_delete_tags() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);

    let mut track = FlacTrack::open(&path).unwrap();
    track.tags_mut().title = Some("Dawn".to_string());
    track.tags_mut().genre = Some("Ambient".to_string());
    track.save().unwrap();

    let before = fs::read(&path).unwrap();
    let err = track.delete_tag("loudness").unwrap_err();
    assert!(matches!(err, Error::UnmappedAttribute(name) if name == "loudness"));
    assert_eq!(fs::read(&path).unwrap(), before);

    track.delete_tag("title").unwrap();
    assert_eq!(track.get_item("title").unwrap(), None);

    track.delete_tags().unwrap();
    let reopened = FlacTrack::open(&path).unwrap();
    for (_, value) in reopened.export_to_dict() {
        assert_eq!(value, None);
    }
}

#[test]
fn flac_cover_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);
    let front = png_fixture(&dir, 1200, 800);

    let mut track = FlacTrack::open(&path).unwrap();
    assert!(track.read_cover().unwrap().is_none());

    let err = track
        .add_cover(&dir.path().join("front.gif"), "")
        .unwrap_err();
    assert!(matches!(err, Error::WrongPictureFormat(ext) if ext == "gif"));

    track.add_cover(&front, "").unwrap();
    let decoded = track.read_cover().unwrap().expect("cover was just added");
    assert_eq!(decoded.dimensions(), (1200, 800));

    // Exported bytes are the stored bytes, verbatim.
    let exported = track.export_cover(None).unwrap().expect("cover present");
    assert_eq!(exported, dir.path().join("cover.png"));
    assert_eq!(fs::read(&exported).unwrap(), fs::read(&front).unwrap());
    fs::remove_file(&exported).unwrap();

    track.resize_cover(300, None).unwrap();
    let resized = track.read_cover().unwrap().expect("cover survives resize");
    assert_eq!(resized.dimensions(), (300, 200));
    assert!(staging_leftovers(&dir).is_empty());

    // PNG input stays PNG without an explicit extension.
    let exported = track.export_cover(None).unwrap().expect("cover present");
    assert_eq!(exported, dir.path().join("cover.png"));
    fs::remove_file(&exported).unwrap();

    let err = track.resize_cover(200, Some("webp")).unwrap_err();
    assert!(matches!(err, Error::WrongPictureFormat(ext) if ext == "webp"));

    track.remove_cover().unwrap();
    track.remove_cover().unwrap(); // idempotent
    assert!(track.read_cover().unwrap().is_none());
    assert!(track.export_cover(None).unwrap().is_none());
    assert!(!dir.path().join("cover.png").exists());

    let before = fs::read(&path).unwrap();
    let err = track.resize_cover(300, None).unwrap_err();
    assert!(matches!(err, Error::NoCoverFound));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn flac_cover_survives_persisted_reopen_and_tag_deletion() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);
    let front = png_fixture(&dir, 640, 640);

    let mut track = FlacTrack::open(&path).unwrap();
    track.tags_mut().title = Some("Dawn".to_string());
    track.save().unwrap();
    track.add_cover(&front, "").unwrap();

    let mut reopened = FlacTrack::open(&path).unwrap();
    assert_eq!(
        reopened.read_cover().unwrap().map(|img| img.dimensions()),
        Some((640, 640))
    );

    // Tags and pictures have separate lifecycles.
    reopened.delete_tags().unwrap();
    let mut again = FlacTrack::open(&path).unwrap();
    assert_eq!(again.tags().title, None);
    assert!(again.read_cover().unwrap().is_some());
}

#[test]
fn flac_resize_to_explicit_jpeg() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);
    let front = png_fixture(&dir, 900, 600);

    let mut track = FlacTrack::open(&path).unwrap();
    track.add_cover(&front, "").unwrap();
    track.resize_cover(300, Some("jpg")).unwrap();

    assert_eq!(
        track.read_cover().unwrap().map(|img| img.dimensions()),
        Some((300, 200))
    );
    // The stored mime switched, so the default export name follows.
    let exported = track.export_cover(None).unwrap().expect("cover present");
    assert_eq!(exported, dir.path().join("cover.jpg"));
}

#[test]
fn flac_dispatch_by_name() {
    let dir = TempDir::new().unwrap();
    let path = flac_fixture(&dir);

    let mut track = FlacTrack::open(&path).unwrap();
    track.tags_mut().title = Some("Dawn".to_string());
    track.call_by_name("save").unwrap();

    let reopened = FlacTrack::open(&path).unwrap();
    assert_eq!(reopened.tags().title.as_deref(), Some("Dawn"));

    let err = track.call_by_name("transmogrify").unwrap_err();
    assert!(matches!(err, Error::UnknownMethod(name) if name == "transmogrify"));
}

#[test]
fn mp3_save_read_round_trip_with_slash_pairs() {
    let dir = TempDir::new().unwrap();
    let path = mp3_fixture(&dir);

    let mut track = Mp3Track::open(&path).unwrap();
    assert_eq!(track.tags().title, None);

    track.tags_mut().title = Some("Dawn".to_string());
    track.tags_mut().artist = Some("Nadir".to_string());
    track.tags_mut().track = Some("7".to_string());
    track.tags_mut().total_tracks = Some("12".to_string());
    track.tags_mut().disc = Some("1".to_string());
    track.tags_mut().comment = Some("late night mix".to_string());
    track.tags_mut().lyrics = Some("first light over the bay".to_string());
    track.tags_mut().www = Some("https://nadir.example".to_string());
    track.tags_mut().year = Some("2019".to_string());
    track.save().unwrap();

    let reopened = Mp3Track::open(&path).unwrap();
    assert_eq!(reopened.tags().title.as_deref(), Some("Dawn"));
    assert_eq!(reopened.tags().track.as_deref(), Some("7"));
    assert_eq!(reopened.tags().total_tracks.as_deref(), Some("12"));
    assert_eq!(reopened.tags().disc.as_deref(), Some("1"));
    assert_eq!(reopened.tags().total_discs, None);
    assert_eq!(reopened.tags().comment.as_deref(), Some("late night mix"));
    assert_eq!(
        reopened.tags().lyrics.as_deref(),
        Some("first light over the bay")
    );
    assert_eq!(reopened.tags().www.as_deref(), Some("https://nadir.example"));
    assert_eq!(reopened.tags().year.as_deref(), Some("2019"));

    // Indexed access sees the raw native pair, not the split fields.
    assert_eq!(reopened.get_item("track").unwrap().as_deref(), Some("7/12"));
    assert_eq!(
        reopened.get_item("totaltracks").unwrap().as_deref(),
        Some("7/12")
    );
}

#[test]
fn mp3_delete_tag_and_delete_tags() {
    let dir = TempDir::new().unwrap();
    let path = mp3_fixture(&dir);

    let mut track = Mp3Track::open(&path).unwrap();
    track.tags_mut().title = Some("Dawn".to_string());
    track.tags_mut().genre = Some("Ambient".to_string());
    track.save().unwrap();

    assert!(matches!(
        track.delete_tag("loudness"),
        Err(Error::UnmappedAttribute(_))
    ));

    track.delete_tag("title").unwrap();
    assert_eq!(track.get_item("title").unwrap(), None);

    track.delete_tags().unwrap();
    let reopened = Mp3Track::open(&path).unwrap();
    for (_, value) in reopened.export_to_dict() {
        assert_eq!(value, None);
    }
}

#[test]
fn mp3_cover_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = mp3_fixture(&dir);
    let front = jpeg_fixture(&dir, 600, 400);

    let mut track = Mp3Track::open(&path).unwrap();
    assert!(track.read_cover().unwrap().is_none());
    assert!(track.export_cover(None).unwrap().is_none());
    assert!(!dir.path().join("cover.jpg").exists());

    track.add_cover(&front, "front cover").unwrap();
    assert_eq!(
        track.read_cover().unwrap().map(|img| img.dimensions()),
        Some((600, 400))
    );

    let exported = track.export_cover(None).unwrap().expect("cover present");
    assert_eq!(exported, dir.path().join("cover.jpg"));
    assert_eq!(fs::read(&exported).unwrap(), fs::read(&front).unwrap());
    fs::remove_file(&exported).unwrap();

    track.resize_cover(150, None).unwrap();
    assert_eq!(
        track.read_cover().unwrap().map(|img| img.dimensions()),
        Some((150, 100))
    );
    assert!(staging_leftovers(&dir).is_empty());

    // The replaced cover survives a reopen.
    let mut reopened = Mp3Track::open(&path).unwrap();
    assert_eq!(
        reopened.read_cover().unwrap().map(|img| img.dimensions()),
        Some((150, 100))
    );

    track.remove_cover().unwrap();
    track.remove_cover().unwrap(); // idempotent
    assert!(track.read_cover().unwrap().is_none());
    assert!(matches!(
        track.resize_cover(100, None),
        Err(Error::NoCoverFound)
    ));
}
