//! Download job construction and supervision.
//!
//! A job wraps one spotdl invocation: it classifies the query, assembles the
//! argument list, streams the child's output back to the caller and, for
//! playlist downloads, synthesizes an m3u8 manifest once the process exits.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use url::Url;

use crate::core::config::{Config, DEFAULT_FORMAT};
use crate::core::manifest;
use crate::error::{Result, SpindleError};

/// Directory bucket spotdl uses for playlists of compilation-style releases.
///
/// This mirrors the tool's default playlist output template. If the user
/// changes `playlist_output` in config, detection of the completed playlist
/// directory silently stops matching; known limitation.
const VARIOUS_ARTISTS_BUCKET: &str = "Various Artists";

static PLAYLIST_FOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Found \d+ songs in (.*?) \(Playlist\)").unwrap());

/// Kind of download request, as selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Song,
    Album,
    Playlist,
    Artist,
    Search,
    YoutubeMatch,
    Saved,
    AllUserPlaylists,
    AllSavedPlaylists,
    AllUserFollowedArtists,
    AllUserSavedAlbums,
}

impl QueryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "song" => Some(Self::Song),
            "album" => Some(Self::Album),
            "playlist" => Some(Self::Playlist),
            "artist" => Some(Self::Artist),
            "search" => Some(Self::Search),
            "youtube-match" => Some(Self::YoutubeMatch),
            "saved" => Some(Self::Saved),
            "all-user-playlists" => Some(Self::AllUserPlaylists),
            "all-saved-playlists" => Some(Self::AllSavedPlaylists),
            "all-user-followed-artists" => Some(Self::AllUserFollowedArtists),
            "all-user-saved-albums" => Some(Self::AllUserSavedAlbums),
            _ => None,
        }
    }

    /// Bulk account-wide queries require the tool's user authentication.
    pub fn is_bulk(self) -> bool {
        matches!(
            self,
            Self::Saved
                | Self::AllUserPlaylists
                | Self::AllSavedPlaylists
                | Self::AllUserFollowedArtists
                | Self::AllUserSavedAlbums
        )
    }
}

/// One queued download request as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub query: String,
    pub kind: Option<QueryKind>,
    pub format: Option<String>,
    pub bitrate: Option<String>,
    pub cookie_file: Option<PathBuf>,
    pub premium: bool,
}

/// Scoped cookie file: deleted on drop regardless of how the job ends.
#[derive(Debug)]
struct CookieFile(PathBuf);

impl Drop for CookieFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not remove cookie file {}: {}", self.0.display(), e);
            }
        }
    }
}

/// Outcome of one finished job.
#[derive(Debug)]
pub struct JobReport {
    pub exit_code: Option<i32>,
    pub playlist_name: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// One spotdl invocation, built from a request and ready to run.
pub struct DownloadJob {
    args: Vec<String>,
    is_playlist: bool,
    staging_root: PathBuf,
    _cookie_file: Option<CookieFile>,
}

impl DownloadJob {
    /// Validate the request and assemble the spotdl argument list.
    ///
    /// `is_playlist` is derived here, once, and never recomputed mid-run.
    pub fn build(request: DownloadRequest, config: &Config) -> Result<Self> {
        if request.query.trim().is_empty() {
            return Err(SpindleError::EmptyQuery);
        }

        let is_playlist = classify_playlist(&request.query, request.kind);
        let staging_root = config.staging_root();

        let mut args = vec!["download".to_string(), request.query.clone()];

        // The flag is omitted when nothing diverges from the tool's default
        let format = request
            .format
            .clone()
            .or_else(|| Some(config.format.clone()).filter(|f| f != DEFAULT_FORMAT));
        if let Some(format) = format.filter(|f| !f.is_empty()) {
            args.push("--format".to_string());
            args.push(format);
        }

        if let Some(bitrate) = &request.bitrate {
            if bitrate != "auto" {
                args.push("--bitrate".to_string());
                args.push(bitrate.clone());
            }
        }

        let cookie_file = if request.premium {
            request.cookie_file.clone().map(CookieFile)
        } else {
            None
        };
        if let Some(cookie) = &cookie_file {
            args.push("--cookie-file".to_string());
            args.push(cookie.0.to_string_lossy().to_string());
        }

        let template = if is_playlist {
            &config.playlist_output
        } else {
            &config.album_output
        };
        args.push("--output".to_string());
        args.push(staging_root.join(template).to_string_lossy().to_string());

        if config.threads > 0 {
            args.push("--threads".to_string());
            args.push(config.threads.to_string());
        }

        if request.kind.is_some_and(QueryKind::is_bulk) {
            args.push("--user-auth".to_string());
        }

        Ok(Self {
            args,
            is_playlist,
            staging_root,
            _cookie_file: cookie_file,
        })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_playlist(&self) -> bool {
        self.is_playlist
    }

    /// Run the job to completion, forwarding process output to `sink`.
    ///
    /// Output is forwarded verbatim as raw chunks the moment a read returns,
    /// so carriage-return progress updates reach the caller without waiting
    /// for a newline. Stdout and stderr are drained by two independent loops
    /// writing into the same sink; each stream stays internally ordered. A
    /// nonzero exit code is reported, not raised. The cookie file, if any,
    /// is removed on every exit path.
    pub async fn run(
        self,
        program: &Path,
        sink: mpsc::UnboundedSender<String>,
    ) -> Result<JobReport> {
        log::info!("Running spotdl with args: {:?}", self.args);

        let mut child = spawn_piped(program, &self.args)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpindleError::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SpindleError::other("child stderr was not captured"))?;

        let is_playlist = self.is_playlist;
        let staging_root = self.staging_root.clone();
        let err_sink = sink.clone();

        let stdout_loop = async {
            let mut stdout = stdout;
            let mut buf = [0u8; 8192];
            // Text accumulated since the last completed line, so a marker
            // split across reads is still recognized
            let mut pending = String::new();
            let mut playlist_name: Option<String> = None;
            let mut output_directory: Option<PathBuf> = None;

            loop {
                match stdout.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                        if is_playlist && playlist_name.is_none() {
                            pending.push_str(&chunk);
                            // First match wins; the directory is never overwritten
                            if let Some(name) = detect_playlist_name(&pending) {
                                log::info!("Found playlist name: {}", name);
                                output_directory =
                                    Some(staging_root.join(VARIOUS_ARTISTS_BUCKET).join(&name));
                                playlist_name = Some(name);
                                pending.clear();
                            } else if let Some(idx) = pending.rfind('\n') {
                                // Completed lines did not match; keep only the tail
                                pending.drain(..=idx);
                            }
                        }
                        let _ = sink.send(chunk);
                    }
                    Err(e) => {
                        log::warn!("Error reading process stdout: {}", e);
                        break;
                    }
                }
            }

            (playlist_name, output_directory)
        };

        let stderr_loop = forward_raw(stderr, err_sink, "stderr");

        let ((playlist_name, output_directory), ()) = tokio::join!(stdout_loop, stderr_loop);

        let status = child.wait().await?;
        log::info!("spotdl process exited with code: {:?}", status.code());

        let manifest = if is_playlist {
            write_manifest_if_present(playlist_name.as_deref(), output_directory.as_deref())
        } else {
            None
        };

        Ok(JobReport {
            exit_code: status.code(),
            playlist_name,
            output_directory,
            manifest,
        })
    }
}

/// A pass-through spotdl invocation: `save`, `sync`, `meta` or `url`.
///
/// Both streams are forwarded verbatim to the caller and the exit code is
/// reported as-is; there is no playlist detection or manifest step.
pub struct ToolJob {
    args: Vec<String>,
}

impl ToolJob {
    /// `save`: resolve a query and write its metadata to a save file.
    pub fn save(query: &str, save_file: &Path) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(SpindleError::EmptyQuery);
        }
        Ok(Self {
            args: vec![
                "save".to_string(),
                query.to_string(),
                "--save-file".to_string(),
                save_file.to_string_lossy().to_string(),
            ],
        })
    }

    /// `sync`: bring downloads up to date with a previously written save file.
    pub fn sync(save_file: &Path) -> Self {
        Self {
            args: vec![
                "sync".to_string(),
                "--save-file".to_string(),
                save_file.to_string_lossy().to_string(),
            ],
        }
    }

    /// `meta`: fetch and apply metadata for a query.
    pub fn meta(query: &str) -> Result<Self> {
        Self::passthrough("meta", query)
    }

    /// `url`: print the source URLs the tool resolves for a query.
    pub fn url(query: &str) -> Result<Self> {
        Self::passthrough("url", query)
    }

    fn passthrough(operation: &str, query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(SpindleError::EmptyQuery);
        }
        Ok(Self {
            args: vec![operation.to_string(), query.to_string()],
        })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub async fn run(
        self,
        program: &Path,
        sink: mpsc::UnboundedSender<String>,
    ) -> Result<Option<i32>> {
        log::info!("Running spotdl with args: {:?}", self.args);

        let mut child = spawn_piped(program, &self.args)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpindleError::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SpindleError::other("child stderr was not captured"))?;

        let err_sink = sink.clone();
        tokio::join!(
            forward_raw(stdout, sink, "stdout"),
            forward_raw(stderr, err_sink, "stderr")
        );

        let status = child.wait().await?;
        log::info!("spotdl process exited with code: {:?}", status.code());
        Ok(status.code())
    }
}

fn spawn_piped(program: &Path, args: &[String]) -> Result<Child> {
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SpindleError::process_start(format!("{}: {}", program.display(), e)))
}

/// Forward raw output chunks into the sink until EOF.
async fn forward_raw<R>(mut reader: R, sink: mpsc::UnboundedSender<String>, stream: &str)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let _ = sink.send(String::from_utf8_lossy(&buf[..n]).into_owned());
            }
            Err(e) => {
                log::warn!("Error reading process {}: {}", stream, e);
                break;
            }
        }
    }
}

/// Manifest creation is best-effort: a missing directory or a write failure
/// is logged and never fails the job.
fn write_manifest_if_present(
    playlist_name: Option<&str>,
    output_directory: Option<&Path>,
) -> Option<PathBuf> {
    let (name, directory) = match (playlist_name, output_directory) {
        (Some(n), Some(d)) => (n, d),
        _ => {
            log::info!("Could not create manifest: missing directory or playlist name");
            return None;
        }
    };

    if !directory.is_dir() {
        log::warn!("Playlist directory does not exist: {}", directory.display());
        return None;
    }

    match manifest::write_playlist_manifest(directory, name) {
        Ok(path) => path,
        Err(e) => {
            log::error!("Error creating manifest: {}", e);
            None
        }
    }
}

/// Decide once whether a query denotes a playlist: a spotify playlist URL, an
/// explicit playlist kind, or a `playlist:` search prefix.
fn classify_playlist(query: &str, kind: Option<QueryKind>) -> bool {
    if kind == Some(QueryKind::Playlist) || query.starts_with("playlist:") {
        return true;
    }

    if let Ok(url) = Url::parse(query) {
        let spotify_host = url
            .host_str()
            .is_some_and(|h| h == "spotify.com" || h.ends_with(".spotify.com"));
        return spotify_host && url.path().contains("/playlist/");
    }

    false
}

/// Extract the playlist display name from a spotdl progress line.
pub fn detect_playlist_name(line: &str) -> Option<String> {
    PLAYLIST_FOUND
        .captures(line)
        .map(|caps| caps[1].to_string())
}
