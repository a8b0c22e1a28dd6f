//! M3U8 manifest generation for completed playlist downloads.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpindleError};

/// Audio extensions recognized as playlist tracks.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "opus"];

/// Manifest file extension understood by common audio players.
const MANIFEST_EXTENSION: &str = "m3u8";

/// Write `<playlist_name>.m3u8` inside `directory`, listing the audio files
/// found at its top level in lexicographic order.
///
/// Returns the manifest path, or `Ok(None)` when the directory holds no audio
/// files (empty playlists produce no manifest). Only immediate entries are
/// considered; filenames in the manifest are relative.
pub fn write_playlist_manifest(directory: &Path, playlist_name: &str) -> Result<Option<PathBuf>> {
    log::info!(
        "Creating manifest in {} for playlist: {}",
        directory.display(),
        playlist_name
    );

    let entries = fs::read_dir(directory).map_err(|e| SpindleError::io_at(directory, e))?;
    let mut audio_files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| SpindleError::io_at(directory, e))?;
        let name = entry.file_name().to_string_lossy().to_string();

        if is_audio_file(&name) {
            audio_files.push(name);
        }
    }

    if audio_files.is_empty() {
        log::info!("No audio files found in {}", directory.display());
        return Ok(None);
    }

    audio_files.sort();

    let mut content = format!("#EXTM3U\n#PLAYLIST:{}\n", playlist_name);
    content.push_str(&audio_files.join("\n"));

    let manifest_path = directory.join(format!("{}.{}", playlist_name, MANIFEST_EXTENSION));
    fs::write(&manifest_path, content).map_err(|e| SpindleError::io_at(&manifest_path, e))?;

    log::info!("Created manifest: {}", manifest_path.display());
    Ok(Some(manifest_path))
}

fn is_audio_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext))
}
