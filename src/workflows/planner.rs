use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::models::{FileRef, TrackSelection};
use crate::media::ffmpeg;
use crate::media::subtitles::{self, StreamProbe};
use crate::workflows::executor::PlannedCommand;
use crate::workflows::matcher::{EpisodeMap, EpisodePattern};

/// The other collection extracted subtitles are named after.
pub struct Target<'a> {
    pub episodes: &'a EpisodeMap,
    pub origin_pattern: &'a EpisodePattern,
}

/// Plans one stream-copy command per origin file, selected language and
/// output format, in that nesting order.
///
/// With an empty `formats` list the format of each track is derived from its
/// codec through `probe`, which is queried once per origin file.
pub fn plan_subtitle_extraction(
    ffmpeg_program: &str,
    origin_files: &[FileRef],
    tracks: &TrackSelection,
    formats: &[String],
    target: Option<&Target>,
    probe: &dyn StreamProbe,
) -> Result<Vec<PlannedCommand>> {
    let mut pending = Vec::new();

    for origin in origin_files {
        let stem = output_stem(origin, target);
        let working_dir = origin.path().parent().unwrap_or(Path::new("."));
        let streams = if formats.is_empty() && tracks.selected().next().is_some() {
            Some(probe.subtitle_streams(origin.path())?)
        } else {
            None
        };

        for (lang, track) in tracks.selected() {
            let track_formats: Vec<&str> = if let Some(streams) = &streams {
                let format = streams
                    .codec_name(track)
                    .and_then(subtitles::format_for_codec)
                    .with_context(|| format!("Track {track} of {origin}"))?;
                vec![format]
            } else {
                formats.iter().map(String::as_str).collect()
            };

            for format in track_formats {
                let sub_name = format!("{stem}.{lang}.{format}");
                pending.push(
                    ffmpeg::subtitle_copy_command(ffmpeg_program, origin.path(), track, &sub_name)
                        .in_dir(working_dir),
                );
            }
        }
    }

    tracing::info!("Planned {} subtitle extraction(s)", pending.len());
    Ok(pending)
}

/// Stem for subtitles extracted from `origin`: the matching target video's
/// stem when there is one, the origin's own stem otherwise.
fn output_stem(origin: &FileRef, target: Option<&Target>) -> String {
    let origin_stem = origin.stem();
    let Some(target) = target else {
        return origin_stem;
    };
    let Some(episode) = target.origin_pattern.episode_of(&origin_stem) else {
        return origin_stem;
    };
    match target.episodes.get(&episode) {
        Some(video) => video.stem(),
        None => {
            tracing::warn!(
                "No target video for episode {episode} ({}), keeping the original name",
                origin.name()
            );
            origin_stem
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FontExtractionPlan {
    /// `None` when there was nothing to extract from.
    pub dest_dir: Option<PathBuf>,
    pub commands: Vec<PlannedCommand>,
}

/// Plans attachment dumps for every file into one `fonts-<stem>` directory
/// next to the first file. The directory is not created here.
pub fn plan_font_extraction(ffmpeg_program: &str, files: &[FileRef]) -> Result<FontExtractionPlan> {
    let Some(first) = files.first() else {
        return Ok(FontExtractionPlan::default());
    };
    let dest_dir = first.with_name(&format!("fonts-{}", first.stem()));

    let mut commands = Vec::with_capacity(files.len());
    for file in files {
        let input = std::fs::canonicalize(file.path())
            .with_context(|| format!("Failed to resolve {file}"))?;
        commands.push(ffmpeg::dump_attachments_command(ffmpeg_program, &input, &dest_dir));
    }

    tracing::info!("Planned {} font extraction(s) into {:?}", commands.len(), dest_dir);
    Ok(FontExtractionPlan {
        dest_dir: Some(dest_dir),
        commands,
    })
}

/// Creates the font directory. A pre-existing entry is an error so that
/// earlier extractions are never mixed with this one.
pub fn prepare_font_dir(dest_dir: &Path) -> Result<()> {
    std::fs::create_dir(dest_dir).with_context(|| {
        format!(
            "Failed to create {dest_dir:?}; if it already exists, move or remove it and re-run"
        )
    })
}
