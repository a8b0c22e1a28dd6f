use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Output template used for playlist downloads when none is configured.
pub const DEFAULT_PLAYLIST_OUTPUT: &str = "{playlist}/{artists} - {title}.{output-ext}";
/// Output template used for album/single downloads when none is configured.
pub const DEFAULT_ALBUM_OUTPUT: &str = "{album}/{artists} - {title}.{output-ext}";
/// Audio format the download tool falls back to on its own.
pub const DEFAULT_FORMAT: &str = "mp3";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Audio output format passed to the download tool
    #[serde(default = "default_format")]
    pub format: String,
    /// Output template for playlist downloads, relative to the staging root
    #[serde(default = "default_playlist_output")]
    pub playlist_output: String,
    /// Output template for album/single downloads, relative to the staging root
    #[serde(default = "default_album_output")]
    pub album_output: String,
    /// Download thread count forwarded to the tool
    #[serde(default = "default_threads")]
    pub threads: u32,
    /// Staging root where new downloads land
    #[serde(default = "default_staging_path")]
    pub staging_path: String,
    /// Curated library root that promoted items move into
    #[serde(default = "default_library_path")]
    pub library_path: String,
    /// Explicit path to the spotdl executable (resolved from PATH when unset)
    #[serde(default)]
    pub spotdl_path: Option<String>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_playlist_output() -> String {
    DEFAULT_PLAYLIST_OUTPUT.to_string()
}

fn default_album_output() -> String {
    DEFAULT_ALBUM_OUTPUT.to_string()
}

fn default_threads() -> u32 {
    4
}

fn default_staging_path() -> String {
    "/downloads".to_string()
}

fn default_library_path() -> String {
    "/music".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: default_format(),
            playlist_output: default_playlist_output(),
            album_output: default_album_output(),
            threads: default_threads(),
            staging_path: default_staging_path(),
            library_path: default_library_path(),
            spotdl_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // First run: persist the defaults so the file is editable by hand
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // If the file is empty or corrupted, return default config
        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|_| Config::default()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(&config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("spindle").join("config.json"))
    }

    pub fn staging_root(&self) -> PathBuf {
        PathBuf::from(&self.staging_path)
    }

    pub fn library_root(&self) -> PathBuf {
        PathBuf::from(&self.library_path)
    }

    /// Get a config value by key, as displayed by `spindle config get`
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "format" => Some(self.format.clone()),
            "playlist_output" => Some(self.playlist_output.clone()),
            "album_output" => Some(self.album_output.clone()),
            "threads" => Some(self.threads.to_string()),
            "staging_path" => Some(self.staging_path.clone()),
            "library_path" => Some(self.library_path.clone()),
            "spotdl_path" => self.spotdl_path.clone(),
            _ => None,
        }
    }

    /// Set a config value by key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "format" => self.format = value.to_string(),
            "playlist_output" => self.playlist_output = value.to_string(),
            "album_output" => self.album_output = value.to_string(),
            "threads" => {
                self.threads = value
                    .parse()
                    .with_context(|| format!("Invalid thread count: {}", value))?
            }
            "staging_path" => self.staging_path = value.to_string(),
            "library_path" => self.library_path = value.to_string(),
            "spotdl_path" => self.spotdl_path = Some(value.to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }
}
