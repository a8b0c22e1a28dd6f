// Tests for playlist manifest generation

use spindle::core::manifest::write_playlist_manifest;
use std::fs::{self, File};
use tempfile::TempDir;

#[test]
fn test_manifest_contents_and_ordering() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("b.mp3")).unwrap();
    File::create(temp.path().join("a.m4a")).unwrap();
    File::create(temp.path().join("c.txt")).unwrap();
    File::create(temp.path().join("z.opus")).unwrap();

    let path = write_playlist_manifest(temp.path(), "Road Trip")
        .unwrap()
        .expect("manifest should be written");

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "#EXTM3U");
    assert_eq!(lines[1], "#PLAYLIST:Road Trip");
    assert_eq!(&lines[2..], &["a.m4a", "b.mp3", "z.opus"]);
}

#[test]
fn test_empty_playlist_produces_no_manifest() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("notes.txt")).unwrap();

    assert!(write_playlist_manifest(temp.path(), "Nothing Here")
        .unwrap()
        .is_none());
    assert!(fs::read_dir(temp.path())
        .unwrap()
        .all(|e| e.unwrap().file_name() != "Nothing Here.m3u8"));
}

#[test]
fn test_manifest_filenames_are_relative() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("song.mp3")).unwrap();

    let path = write_playlist_manifest(temp.path(), "Rel").unwrap().unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\nsong.mp3"));
    assert!(!content.contains(&temp.path().to_string_lossy().to_string()));
}
