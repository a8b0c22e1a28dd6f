// End-to-end job runner tests against a fake spotdl executable
#![cfg(unix)]

use spindle::core::{Config, DownloadJob, DownloadRequest, ToolJob};
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-spotdl.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn staged_config(temp: &TempDir) -> (Config, PathBuf) {
    let staging = temp.path().join("downloads");
    fs::create_dir_all(&staging).unwrap();
    let mut config = Config::default();
    config.staging_path = staging.to_string_lossy().to_string();
    (config, staging)
}

async fn run_job(
    request: DownloadRequest,
    config: &Config,
    program: &Path,
) -> (spindle::error::Result<spindle::core::JobReport>, String) {
    let job = DownloadJob::build(request, config).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let result = job.run(program, tx).await;

    let mut output = String::new();
    while let Ok(chunk) = rx.try_recv() {
        output.push_str(&chunk);
    }
    (result, output)
}

#[tokio::test]
async fn test_playlist_end_to_end_with_manifest() {
    let temp = TempDir::new().unwrap();
    let (config, staging) = staged_config(&temp);
    let playlist_dir = staging.join("Various Artists").join("Road Trip");

    let tool = fake_tool(
        temp.path(),
        &format!(
            "echo \"Processing query\"\n\
             echo \"Found 12 songs in Road Trip (Playlist)\"\n\
             echo \"fetch warning\" >&2\n\
             mkdir -p '{dir}'\n\
             touch '{dir}/b.mp3' '{dir}/a.mp3'",
            dir = playlist_dir.display()
        ),
    );

    let request = DownloadRequest {
        query: "https://open.spotify.com/playlist/XYZ".to_string(),
        ..Default::default()
    };
    let (result, output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    assert_eq!(report.exit_code, Some(0));
    assert_eq!(report.playlist_name.as_deref(), Some("Road Trip"));
    assert_eq!(report.output_directory.as_deref(), Some(playlist_dir.as_path()));

    // Both streams arrived at the caller
    assert!(output.contains("Found 12 songs in Road Trip (Playlist)"));
    assert!(output.contains("fetch warning"));

    let manifest = report.manifest.expect("manifest should be written");
    assert_eq!(manifest, playlist_dir.join("Road Trip.m3u8"));
    let content = fs::read_to_string(&manifest).unwrap();
    assert_eq!(content, "#EXTM3U\n#PLAYLIST:Road Trip\na.mp3\nb.mp3");
}

#[tokio::test]
async fn test_progress_updates_arrive_verbatim_without_newline() {
    let temp = TempDir::new().unwrap();
    let (config, _staging) = staged_config(&temp);
    // Progress-bar style output: a carriage return and no newline, then a
    // pause long enough to expose any line buffering on the read side
    let tool = fake_tool(
        temp.path(),
        "printf 'Downloading 50%%\\r'\nsleep 1\nprintf 'done'",
    );

    let request = DownloadRequest {
        query: "https://open.spotify.com/track/T".to_string(),
        ..Default::default()
    };
    let job = DownloadJob::build(request, &config).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let started = Instant::now();
    let handle = tokio::spawn(async move { job.run(&tool, tx).await });

    let first = rx.recv().await.expect("first chunk");
    assert!(
        started.elapsed() < Duration::from_millis(900),
        "progress update must not wait for a newline"
    );
    assert_eq!(first, "Downloading 50%\r");

    let result = handle.await.unwrap();
    assert!(result.is_ok());

    let mut rest = String::new();
    while let Ok(chunk) = rx.try_recv() {
        rest.push_str(&chunk);
    }
    // Delivered exactly as written: no rewriting, no appended newline
    assert_eq!(rest, "done");
}

#[tokio::test]
async fn test_playlist_marker_split_across_reads_is_detected() {
    let temp = TempDir::new().unwrap();
    let (config, staging) = staged_config(&temp);
    let tool = fake_tool(
        temp.path(),
        "printf 'Found 4 songs in Lon'\nsleep 1\nprintf 'g Haul (Playlist)\\n'",
    );

    let request = DownloadRequest {
        query: "https://open.spotify.com/playlist/L".to_string(),
        ..Default::default()
    };
    let (result, output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    assert_eq!(report.playlist_name.as_deref(), Some("Long Haul"));
    assert_eq!(
        report.output_directory,
        Some(staging.join("Various Artists").join("Long Haul"))
    );
    assert!(output.contains("Found 4 songs in Long Haul (Playlist)"));
}

#[tokio::test]
async fn test_tool_job_streams_both_channels() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "echo \"op:$1 arg:$2\"\necho \"warn\" >&2");

    let job = ToolJob::meta("https://open.spotify.com/track/T").unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let exit_code = job.run(&tool, tx).await.unwrap();

    let mut output = String::new();
    while let Ok(chunk) = rx.try_recv() {
        output.push_str(&chunk);
    }

    assert_eq!(exit_code, Some(0));
    assert!(output.contains("op:meta arg:https://open.spotify.com/track/T"));
    assert!(output.contains("warn"));
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_not_raised() {
    let temp = TempDir::new().unwrap();
    let (config, _staging) = staged_config(&temp);
    let tool = fake_tool(temp.path(), "echo \"something broke\" >&2\nexit 3");

    let request = DownloadRequest {
        query: "https://open.spotify.com/track/T".to_string(),
        ..Default::default()
    };
    let (result, output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    assert_eq!(report.exit_code, Some(3));
    assert!(output.contains("something broke"));
    assert!(report.manifest.is_none());
}

#[tokio::test]
async fn test_marker_is_ignored_for_non_playlist_jobs() {
    let temp = TempDir::new().unwrap();
    let (config, _staging) = staged_config(&temp);
    let tool = fake_tool(
        temp.path(),
        "echo \"Found 5 songs in Decoy (Playlist)\"",
    );

    let request = DownloadRequest {
        query: "https://open.spotify.com/album/A".to_string(),
        ..Default::default()
    };
    let (result, _output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    assert!(report.playlist_name.is_none());
    assert!(report.output_directory.is_none());
    assert!(report.manifest.is_none());
}

#[tokio::test]
async fn test_missing_playlist_directory_skips_manifest() {
    let temp = TempDir::new().unwrap();
    let (config, staging) = staged_config(&temp);
    let tool = fake_tool(
        temp.path(),
        "echo \"Found 2 songs in Ghost (Playlist)\"",
    );

    let request = DownloadRequest {
        query: "https://open.spotify.com/playlist/G".to_string(),
        ..Default::default()
    };
    let (result, _output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    // The name was captured but the directory never appeared on disk
    assert_eq!(report.playlist_name.as_deref(), Some("Ghost"));
    assert!(report.manifest.is_none());
    assert_eq!(report.exit_code, Some(0));
    assert!(!staging.join("Various Artists").join("Ghost").exists());
}

#[tokio::test]
async fn test_first_playlist_match_wins() {
    let temp = TempDir::new().unwrap();
    let (config, staging) = staged_config(&temp);
    let tool = fake_tool(
        temp.path(),
        "echo \"Found 2 songs in First (Playlist)\"\n\
         echo \"Found 9 songs in Second (Playlist)\"",
    );

    let request = DownloadRequest {
        query: "playlist:whatever".to_string(),
        ..Default::default()
    };
    let (result, _output) = run_job(request, &config, &tool).await;
    let report = result.unwrap();

    assert_eq!(report.playlist_name.as_deref(), Some("First"));
    assert_eq!(
        report.output_directory,
        Some(staging.join("Various Artists").join("First"))
    );
}

#[tokio::test]
async fn test_queue_runs_jobs_in_submission_order() {
    let temp = TempDir::new().unwrap();
    let (config, _staging) = staged_config(&temp);
    // The query is the second argument after "download"
    let tool = fake_tool(temp.path(), "echo \"job:$2\"");

    let requests = vec![
        DownloadRequest {
            query: "first".to_string(),
            ..Default::default()
        },
        DownloadRequest {
            query: "".to_string(), // rejected at build time, queue keeps going
            ..Default::default()
        },
        DownloadRequest {
            query: "second".to_string(),
            ..Default::default()
        },
    ];

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let reports = spindle::core::queue::run_queue(requests, &tool, &config, &tx).await;
    drop(tx);

    let mut output = String::new();
    while let Ok(chunk) = rx.try_recv() {
        output.push_str(&chunk);
    }

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_ok());
    assert!(reports[1].is_err());
    assert!(reports[2].is_ok());

    let first = output.find("job:first").expect("first job output");
    let second = output.find("job:second").expect("second job output");
    assert!(first < second, "jobs must run in submission order");
}

#[tokio::test]
async fn test_cookie_file_removed_after_job() {
    let temp = TempDir::new().unwrap();
    let (config, _staging) = staged_config(&temp);
    let cookie = temp.path().join("cookies.txt");
    File::create(&cookie).unwrap();
    let tool = fake_tool(temp.path(), "exit 0");

    let request = DownloadRequest {
        query: "q".to_string(),
        cookie_file: Some(cookie.clone()),
        premium: true,
        ..Default::default()
    };
    let (result, _output) = run_job(request, &config, &tool).await;
    assert!(result.is_ok());
    assert!(!cookie.exists(), "cookie file must be cleaned up");
}
