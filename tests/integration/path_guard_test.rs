// Security tests for the path authorization boundary

use spindle::core::{eraser, path_guard};
use spindle::error::SpindleError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_authorize_accepts_nested_paths() {
    let ok = path_guard::authorize(
        Path::new("/downloads/Artist/Album/track.mp3"),
        Path::new("/downloads"),
    )
    .unwrap();
    assert_eq!(ok, PathBuf::from("/downloads/Artist/Album/track.mp3"));
}

#[test]
fn test_authorize_rejects_classic_traversals() {
    let root = Path::new("/downloads");
    let attacks = [
        "/downloads/../../etc/passwd",
        "/downloads/../music",
        "/downloads/a/../../../root/.ssh/id_rsa",
        "/etc/passwd",
        "/downloadsextra/file.mp3",
    ];

    for attack in attacks {
        let result = path_guard::authorize(Path::new(attack), root);
        assert!(
            matches!(result, Err(SpindleError::InvalidPath(_))),
            "{} should be rejected",
            attack
        );
    }
}

#[test]
fn test_delete_refuses_paths_outside_root() {
    let temp = TempDir::new().unwrap();
    let staging = temp.path().join("downloads");
    fs::create_dir_all(&staging).unwrap();

    let outside = temp.path().join("precious.mp3");
    File::create(&outside).unwrap();

    // The guard fails before erase ever runs
    let result = path_guard::authorize(&outside, &staging);
    assert!(result.is_err());
    assert!(outside.exists());
}

#[test]
fn test_delete_inside_root_goes_through() {
    let temp = TempDir::new().unwrap();
    let staging = temp.path().join("downloads");
    fs::create_dir_all(&staging).unwrap();
    let victim = staging.join("old-album");
    fs::create_dir_all(&victim).unwrap();
    File::create(victim.join("t.mp3")).unwrap();

    let authorized = path_guard::authorize(&victim, &staging).unwrap();
    eraser::erase(&authorized).unwrap();
    assert!(!victim.exists());
}
