use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::BTreeMap;

use crate::domain::models::FileRef;

/// Two digits with whitespace on both sides, e.g. `Show 01 raw`.
pub const DEFAULT_EP_PATTERN: &str = r".*\s(\d{2})\s.*";

/// Episode key -> file. Keys are unique; iteration is by key.
pub type EpisodeMap = BTreeMap<String, FileRef>;

/// A regular expression with exactly one capture group holding the episode key.
///
/// Matching is anchored at the start of the stem but not at its end, so a
/// pattern only has to describe as much of the name as it needs.
#[derive(Debug, Clone)]
pub struct EpisodePattern {
    source: String,
    regex: Regex,
}

impl EpisodePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .with_context(|| format!("Invalid episode pattern {pattern:?}"))?;
        // captures_len counts the implicit whole-match group.
        if regex.captures_len() != 2 {
            bail!(
                "Episode pattern {pattern:?} must have exactly one capture group, found {}",
                regex.captures_len() - 1
            );
        }
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The episode key captured from `stem`, if the pattern matches.
    pub fn episode_of(&self, stem: &str) -> Option<String> {
        self.regex
            .captures(stem)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for EpisodePattern {
    fn default() -> Self {
        Self::new(DEFAULT_EP_PATTERN).expect("default episode pattern is valid")
    }
}

/// Builds the episode map for `files`.
///
/// Files whose stem does not match are left out. When two files yield the
/// same key the later one wins.
pub fn match_episodes(files: &[FileRef], pattern: &EpisodePattern) -> EpisodeMap {
    let mut episodes = EpisodeMap::new();
    for file in files {
        match pattern.episode_of(&file.stem()) {
            Some(key) => {
                tracing::debug!("{} -> episode {}", file.name(), key);
                episodes.insert(key, file.clone());
            }
            None => tracing::debug!("{} does not match {:?}", file.name(), pattern.as_str()),
        }
    }
    episodes
}

pub fn print_episode_map(episodes: &EpisodeMap) {
    println!("Video Ep; Video path:");
    for (key, file) in episodes {
        println!("{key}; {file}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<FileRef> {
        names.iter().map(|n| FileRef::new(format!("/v/{n}"))).collect()
    }

    #[test]
    fn test_default_pattern() {
        let pattern = EpisodePattern::default();
        assert_eq!(pattern.episode_of("Show 01 raw").as_deref(), Some("01"));
        assert_eq!(pattern.episode_of("Show 01"), None);
        assert_eq!(pattern.episode_of("Show 101 raw"), None);
    }

    #[test]
    fn test_pattern_is_anchored_at_start_only() {
        let pattern = EpisodePattern::new(r"Show (\d{2})").unwrap();
        assert_eq!(pattern.episode_of("Show 03 [1080p]").as_deref(), Some("03"));
        assert_eq!(pattern.episode_of("The Show 03"), None);
    }

    #[test]
    fn test_pattern_requires_one_group() {
        assert!(EpisodePattern::new(r".*\s\d{2}\s.*").is_err());
        assert!(EpisodePattern::new(r"(\d)(\d)").is_err());
        assert!(EpisodePattern::new(r"(\d").is_err());
        assert!(EpisodePattern::new(r"(?:S\d+)E(\d+)").is_ok());
    }

    #[test]
    fn test_match_episodes_drops_unmatched() {
        let input = files(&["Show 01 raw.mkv", "fonts.zip", "Show 02 raw.mkv"]);
        let episodes = match_episodes(&input, &EpisodePattern::default());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes["01"].name(), "Show 01 raw.mkv");
        assert_eq!(episodes["02"].name(), "Show 02 raw.mkv");
    }

    #[test]
    fn test_match_episodes_last_one_wins() {
        let input = files(&["Show 01 v1 .mkv", "Show 01 v2 .mkv"]);
        let pattern = EpisodePattern::new(r"Show (\d{2})").unwrap();
        let episodes = match_episodes(&input, &pattern);

        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes["01"].name(), "Show 01 v2 .mkv");
    }

    #[test]
    fn test_match_episodes_is_pure() {
        let input = files(&["Show 02 raw.mkv", "Show 01 raw.mkv"]);
        let before = input.clone();
        let pattern = EpisodePattern::default();

        let first = match_episodes(&input, &pattern);
        let second = match_episodes(&input, &pattern);

        assert_eq!(input, before);
        assert_eq!(first, second);
    }
}
