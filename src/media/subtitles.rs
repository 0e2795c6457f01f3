use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::media::ffmpeg;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<Stream>,
}

#[derive(Debug, Deserialize)]
struct Stream {
    index: u32,
    #[serde(default)]
    codec_name: Option<String>,
}

/// Codec of each subtitle stream in one container, keyed by stream index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubtitleStreams(BTreeMap<u32, Option<String>>);

impl SubtitleStreams {
    pub fn from_json(json_output: &[u8]) -> Result<Self> {
        let info: FfprobeOutput = serde_json::from_slice(json_output)?;
        Ok(Self(
            info.streams
                .into_iter()
                .map(|s| (s.index, s.codec_name))
                .collect(),
        ))
    }

    pub fn codec_name(&self, track_index: u32) -> Result<&str> {
        self.0
            .get(&track_index)
            .with_context(|| format!("No subtitle stream with index {track_index}"))?
            .as_deref()
            .with_context(|| format!("Stream {track_index} reports no codec"))
    }
}

#[cfg(test)]
impl FromIterator<(u32, String)> for SubtitleStreams {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(i, c)| (i, Some(c))).collect())
    }
}

/// Lists the subtitle streams of a container.
pub trait StreamProbe {
    fn subtitle_streams(&self, path: &Path) -> Result<SubtitleStreams>;
}

/// Asks ffprobe for the subtitle streams of each file.
pub struct FfprobeProbe {
    pub program: String,
}

impl StreamProbe for FfprobeProbe {
    fn subtitle_streams(&self, path: &Path) -> Result<SubtitleStreams> {
        let json_output = ffmpeg::get_streams_json(&self.program, path)?;
        SubtitleStreams::from_json(&json_output)
            .with_context(|| format!("Unreadable ffprobe report for {path:?}"))
    }
}

/// Output format for a subtitle codec, when the stream can be copied into a
/// standalone file as-is.
pub fn format_for_codec(codec_name: &str) -> Result<&'static str> {
    match codec_name {
        "subrip" => Ok("srt"),
        "ass" => Ok("ass"),
        other => bail!("Unsupported subtitle codec {other:?}; set sub_formats explicitly"),
    }
}
