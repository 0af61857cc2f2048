//! Configuration management for mashup

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub audio: AudioConfig,
    pub workspace: WorkspaceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    /// Path to ffprobe binary (auto-detected if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// yt-dlp format selector
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// LAME VBR quality for extracted audio (0 = best, 9 = smallest)
    pub mp3_vbr_quality: u8,
    /// Sample rate for trimmed and merged output
    pub sample_rate: u32,
    /// Channel count for trimmed and merged output
    pub channels: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Parent directory for run workspaces (uses system temp if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Keep run workspaces after the run instead of deleting them
    pub keep: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the web service
    pub bind: String,
    /// Number of worker tasks processing queued jobs
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
                ffprobe: None,
            },
            download: DownloadConfig {
                format: "bestvideo+bestaudio/best".to_string(),
            },
            audio: AudioConfig {
                mp3_vbr_quality: 2,
                sample_rate: 44100,
                channels: 2,
            },
            workspace: WorkspaceConfig {
                root: None,
                keep: false,
            },
            server: ServerConfig {
                bind: "127.0.0.1:5870".to_string(),
                workers: 2,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("mashup/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment.merge(Env::prefixed("MASHUP_").split("_"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg")
                .map_err(|_| ConfigError::InvalidValue("ffmpeg not found in PATH".to_string()))
        }
    }

    /// Get ffprobe path, auto-detecting if not configured
    pub fn ffprobe_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffprobe {
            Ok(path.clone())
        } else {
            which::which("ffprobe")
                .map_err(|_| ConfigError::InvalidValue("ffprobe not found in PATH".to_string()))
        }
    }

    /// Parent directory for run workspaces
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace.root.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pin_cd_quality_audio() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.channels, 2);
        assert_eq!(config.audio.mp3_vbr_quality, 2);
    }

    #[test]
    fn defaults_request_best_available_streams() {
        let config = Config::default();
        assert_eq!(config.download.format, "bestvideo+bestaudio/best");
    }

    #[test]
    fn default_workspace_is_ephemeral() {
        let config = Config::default();
        assert!(config.workspace.root.is_none());
        assert!(!config.workspace.keep);
    }
}
