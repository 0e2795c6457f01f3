use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::domain::models::FileRef;
use crate::infra::scanner;
use crate::workflows::confirm::Confirm;
use crate::workflows::matcher::{EpisodeMap, EpisodePattern};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    pub from: FileRef,
    pub new_name: String,
}

/// New subtitle name: the video's stem, then `.{lang}` and the subtitle's
/// final suffix when a language is given, or the subtitle's whole suffix
/// chain when it is not.
pub fn generate_subtitle_name(video: &FileRef, subtitle: &FileRef, language: Option<&str>) -> String {
    let suffix = match language {
        Some(lang) => format!(".{lang}{}", subtitle.suffix()),
        None => subtitle.suffixes().concat(),
    };
    format!("{}{suffix}", video.stem())
}

/// Pairs each subtitle with the video of the same episode. Subtitles without
/// an episode, or whose episode has no video, are left out.
pub fn plan_subtitle_renames(
    episodes: &EpisodeMap,
    subtitles: &[FileRef],
    pattern: &EpisodePattern,
    language: Option<&str>,
) -> Vec<PendingRename> {
    subtitles
        .iter()
        .filter_map(|subtitle| {
            let episode = pattern.episode_of(&subtitle.stem())?;
            let video = episodes.get(&episode)?;
            Some(PendingRename {
                from: subtitle.clone(),
                new_name: generate_subtitle_name(video, subtitle, language),
            })
        })
        .collect()
}

/// Renames the subtitles in `directory` matching `sub_glob` after the videos
/// in `episodes`, once the listing has been confirmed.
pub fn rename_subtitles(
    episodes: &EpisodeMap,
    sub_glob: &str,
    pattern: &EpisodePattern,
    language: Option<&str>,
    directory: &Path,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let subtitles = scanner::collect_files(directory, sub_glob)?;
    let pending = plan_subtitle_renames(episodes, &subtitles, pattern, language);

    println!("Subtitles matched; Subtitles new name:");
    for rename in &pending {
        println!("{};\t{}", rename.from.name(), rename.new_name);
    }

    if pending.is_empty() {
        println!("Nothing to rename.");
        return Ok(());
    }
    if !confirm.confirm("Apply renaming?")? {
        println!("Skipped.");
        return Ok(());
    }

    apply_renames(&pending)
}

fn apply_renames(pending: &[PendingRename]) -> Result<()> {
    let mut renamed = 0;
    for rename in pending {
        let new_path = rename.from.with_name(&rename.new_name);
        if new_path == rename.from.path() {
            println!("{} is already named correctly.", rename.new_name);
            continue;
        }
        if new_path.exists() {
            tracing::warn!("{new_path:?} already exists, not renaming {}", rename.from);
            eprintln!("Warning: {} already exists, skipped", rename.new_name);
            continue;
        }
        fs::rename(rename.from.path(), &new_path)
            .with_context(|| format!("Failed to rename {} to {}", rename.from, rename.new_name))?;
        renamed += 1;
    }
    println!("Renamed {renamed} subtitle(s).");
    Ok(())
}
