//! Application-level configuration loading: media uploads, CORS and TV presentation settings.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_SHOW_BACK_CONFIG_PATH";

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_LOGO: &str = "/uploads/game_logo.jpg";
const DEFAULT_MEDIA_TYPES: [&str; 9] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
];

/// Sound files played on the TV for the three countdown cues.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CueSounds {
    pub start: String,
    pub warning: String,
    pub finish: String,
}

impl Default for CueSounds {
    fn default() -> Self {
        Self {
            start: "question_time_start.mp3".into(),
            warning: "question_time_pre_finish.mp3".into(),
            finish: "question_time_finish.mp3".into(),
        }
    }
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory uploaded media is written to and served from.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// MIME types accepted by the upload endpoint.
    pub allowed_media_types: Vec<String>,
    /// Origins allowed by CORS; empty means any origin.
    pub cors_origins: Vec<String>,
    /// Logo shown by the TV when the display status names no media.
    pub default_logo: String,
    pub cue_sounds: CueSounds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_media_types: DEFAULT_MEDIA_TYPES.map(String::from).to_vec(),
            cors_origins: Vec::new(),
            default_logo: DEFAULT_LOGO.into(),
            cue_sounds: CueSounds::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from the resolved path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration at `path`; missing or unreadable files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        upload_dir = %config.upload_dir.display(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether uploads of `mime` are accepted.
    pub fn accepts_media_type(&self, mime: &str) -> bool {
        self.allowed_media_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"upload_dir": "/srv/media", "cue_sounds": {"start": "go.mp3"}}"#)
                .unwrap();

        assert_eq!(config.upload_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.cue_sounds.start, "go.mp3");
        assert_eq!(config.cue_sounds.finish, "question_time_finish.mp3");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from(Path::new("does/not/exist.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn media_types_match_case_insensitively() {
        let config = AppConfig::default();
        assert!(config.accepts_media_type("image/PNG"));
        assert!(config.accepts_media_type("audio/wav"));
        assert!(!config.accepts_media_type("application/pdf"));
    }
}
