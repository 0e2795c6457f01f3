use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::models::TrackSelection;
use crate::workflows::matcher::EpisodePattern;

pub const BATCH_CONFIG_NAME: &str = "subtitle-utils-patterns.json";

const BATCH_CONFIG_TEMPLATE: &str = r#"{
    "origin_video_glob": "*.mkv",
    "sub_lang_by_track": { "ja": 2, "zh-Hans": 3, "zh-Hant": 4, "eng": null },
    "target_video_glob": "*.mp4",
    "origin_video_ep_pattern": ".*\\s(\\d{2})\\s.*",
    "target_video_ep_pattern": ".*\\s(\\d{2})\\s.*",
    "sub_formats": ["ass"],
    "extract_fonts": true,
    "rename": {
        "video_glob": "*.mkv",
        "video_ep_pattern": ".*\\s(\\d{2})[v\\s].*",
        "sub_glob": "*.ass",
        "sub_ep_pattern": ".*\\[(\\d{2})\\].*",
        "sub_lang": ""
    }
}
"#;

/// The batch description as written in the JSON file.
///
/// `origin_video_glob` and `sub_lang_by_track` are only required for
/// extraction; a file used solely with `--rename` may leave them out.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchConfigFile {
    origin_video_glob: Option<String>,
    sub_lang_by_track: Option<TrackSelection>,
    target_video_glob: Option<String>,
    origin_video_ep_pattern: Option<String>,
    target_video_ep_pattern: Option<String>,
    #[serde(default)]
    sub_formats: Vec<String>,
    #[serde(default = "default_true")]
    extract_fonts: bool,
    #[serde(default)]
    rename: RenameConfigFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenameConfigFile {
    video_glob: Option<String>,
    video_ep_pattern: Option<String>,
    sub_glob: Option<String>,
    sub_ep_pattern: Option<String>,
    sub_lang: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Batch settings, validated once at load time.
#[derive(Debug)]
pub struct BatchConfig {
    extraction: Option<ExtractionConfig>,
    pub rename: RenameConfig,
}

#[derive(Debug)]
pub struct ExtractionConfig {
    pub origin_video_glob: String,
    pub tracks: TrackSelection,
    pub target: Option<TargetConfig>,
    /// Empty means: derive the format from each stream's codec.
    pub sub_formats: Vec<String>,
    pub extract_fonts: bool,
}

#[derive(Debug)]
pub struct TargetConfig {
    pub video_glob: String,
    pub origin_ep_pattern: EpisodePattern,
    pub target_ep_pattern: EpisodePattern,
}

#[derive(Debug)]
pub struct RenameConfig {
    pub video_glob: String,
    pub video_ep_pattern: EpisodePattern,
    pub sub_glob: String,
    pub sub_ep_pattern: EpisodePattern,
    pub sub_lang: Option<String>,
}

fn pattern_or_default(pattern: Option<&str>) -> Result<EpisodePattern> {
    match pattern {
        Some(p) => EpisodePattern::new(p),
        None => Ok(EpisodePattern::default()),
    }
}

impl BatchConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let file: BatchConfigFile = serde_json::from_str(content)?;

        // Episode patterns only matter when there is a target collection.
        let target = match file.target_video_glob {
            Some(video_glob) => Some(TargetConfig {
                video_glob,
                origin_ep_pattern: pattern_or_default(file.origin_video_ep_pattern.as_deref())?,
                target_ep_pattern: pattern_or_default(file.target_video_ep_pattern.as_deref())?,
            }),
            None => None,
        };

        let extraction = match (file.origin_video_glob, file.sub_lang_by_track) {
            (Some(origin_video_glob), Some(tracks)) => Some(ExtractionConfig {
                origin_video_glob,
                tracks,
                target,
                sub_formats: file.sub_formats,
                extract_fonts: file.extract_fonts,
            }),
            (None, None) => None,
            (Some(_), None) => bail!("missing field `sub_lang_by_track`"),
            (None, Some(_)) => bail!("missing field `origin_video_glob`"),
        };

        let rename = file.rename;
        Ok(Self {
            extraction,
            rename: RenameConfig {
                video_glob: rename.video_glob.unwrap_or_else(|| "*.mkv".to_string()),
                video_ep_pattern: pattern_or_default(rename.video_ep_pattern.as_deref())?,
                sub_glob: rename.sub_glob.unwrap_or_else(|| "*.ass".to_string()),
                sub_ep_pattern: pattern_or_default(rename.sub_ep_pattern.as_deref())?,
                sub_lang: rename.sub_lang.filter(|lang| !lang.is_empty()),
            },
        })
    }

    /// Extraction settings; an error when the file describes a rename only.
    pub fn extraction(&self) -> Result<&ExtractionConfig> {
        self.extraction.as_ref().context(
            "Subtitle extraction needs `origin_video_glob` and `sub_lang_by_track` in the batch config",
        )
    }

    /// Loads the batch config at `path`. A missing file is replaced by a
    /// template for the user to edit, and the run stops.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            fs::write(path, BATCH_CONFIG_TEMPLATE)
                .with_context(|| format!("Failed to write config template to {path:?}"))?;
            bail!("No batch config found. A template was written to {path:?}; edit it and re-run");
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch config {path:?}"))?;
        Self::from_json(&content).with_context(|| format!("Invalid batch config {path:?}"))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToolConfigFile {
    ffmpeg: Option<String>,
    ffprobe: Option<String>,
}

/// Locations of the external programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Tools {
    /// Environment variables win over the user config file, which wins over
    /// the programs on `PATH`.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path();
        let file: ToolConfigFile = if config_path.exists() {
            tracing::debug!("Using tool config {}", config_path.display());
            let content = fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid tool config {config_path:?}"))?
        } else {
            ToolConfigFile::default()
        };
        Ok(Self::resolve(
            file,
            env::var("SUBTITLE_UTILS_FFMPEG").ok(),
            env::var("SUBTITLE_UTILS_FFPROBE").ok(),
        ))
    }

    fn resolve(file: ToolConfigFile, ffmpeg_env: Option<String>, ffprobe_env: Option<String>) -> Self {
        Self {
            ffmpeg: ffmpeg_env
                .or(file.ffmpeg)
                .unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe: ffprobe_env
                .or(file.ffprobe)
                .unwrap_or_else(|| "ffprobe".to_string()),
        }
    }
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("subtitle-utils"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}
