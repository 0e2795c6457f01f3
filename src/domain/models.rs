use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::path::{Path, PathBuf};

/// A file found by directory enumeration. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileRef {
    path: PathBuf,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its final suffix.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Final suffix including the dot, or an empty string.
    pub fn suffix(&self) -> String {
        self.suffixes().pop().unwrap_or_default()
    }

    /// Every suffix of the name, in order: `a.ja.ass` gives `[".ja", ".ass"]`.
    pub fn suffixes(&self) -> Vec<String> {
        let name = self.name();
        if name.ends_with('.') {
            return Vec::new();
        }
        name.trim_start_matches('.')
            .split('.')
            .skip(1)
            .map(|s| format!(".{s}"))
            .collect()
    }

    pub fn with_name(&self, name: &str) -> PathBuf {
        self.path.with_file_name(name)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Language tag -> stream track, in configured order. A `None` track means
/// the language is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection(Vec<(String, Option<u32>)>);

impl TrackSelection {
    pub fn new(entries: Vec<(String, Option<u32>)>) -> Self {
        Self(entries)
    }

    /// The languages that have a track, with that track.
    pub fn selected(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0
            .iter()
            .filter_map(|(lang, track)| track.map(|t| (lang.as_str(), t)))
    }
}

// Deserialized by hand so the object's key order survives.
impl<'de> Deserialize<'de> for TrackSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TrackSelectionVisitor;

        impl<'de> Visitor<'de> for TrackSelectionVisitor {
            type Value = TrackSelection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language tag to track index or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((lang, track)) = map.next_entry::<String, Option<u32>>()? {
                    entries.push((lang, track));
                }
                Ok(TrackSelection::new(entries))
            }
        }

        deserializer.deserialize_map(TrackSelectionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_selection_keeps_order_and_skips_null() {
        let tracks: TrackSelection =
            serde_json::from_str(r#"{"zh-Hant": 3, "ja": 1, "eng": null, "zh-Hans": 2}"#).unwrap();
        let selected: Vec<(&str, u32)> = tracks.selected().collect();
        assert_eq!(selected, vec![("zh-Hant", 3), ("ja", 1), ("zh-Hans", 2)]);
    }

    #[test]
    fn test_track_selection_rejects_bad_track() {
        assert!(serde_json::from_str::<TrackSelection>(r#"{"ja": -1}"#).is_err());
        assert!(serde_json::from_str::<TrackSelection>(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_stem_and_suffixes() {
        let file = FileRef::new("/videos/Show 01 raw.ja.ass");
        assert_eq!(file.name(), "Show 01 raw.ja.ass");
        assert_eq!(file.stem(), "Show 01 raw.ja");
        assert_eq!(file.suffix(), ".ass");
        assert_eq!(file.suffixes(), vec![".ja", ".ass"]);
    }

    #[test]
    fn test_suffixes_edge_cases() {
        assert!(FileRef::new("noext").suffixes().is_empty());
        assert_eq!(FileRef::new("noext").suffix(), "");
        assert!(FileRef::new("trailing.").suffixes().is_empty());
        assert_eq!(FileRef::new(".hidden.ass").suffixes(), vec![".ass"]);
    }

    #[test]
    fn test_with_name_stays_in_directory() {
        let file = FileRef::new("/subs/[Group][02]Title.ass");
        assert_eq!(file.with_name("Ep02.ass"), PathBuf::from("/subs/Ep02.ass"));
    }
}
