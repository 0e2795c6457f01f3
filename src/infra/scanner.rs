use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::domain::models::FileRef;

/// Collects the files directly inside `dir` whose names match `glob`.
///
/// Only the shell wildcards `*`, `?` and `[...]` (with `[!...]` negation) are
/// understood; the scan is not recursive. Paths are absolute and sorted so
/// that repeated runs over the same directory plan identical batches.
pub fn collect_files(dir: &Path, glob: &str) -> Result<Vec<FileRef>> {
    let matcher = glob_to_regex(glob)?;
    let dir = fs::canonicalize(dir).with_context(|| format!("Failed to resolve directory {dir:?}"))?;
    let entries =
        fs::read_dir(&dir).with_context(|| format!("Failed to read directory {dir:?}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if matcher.is_match(&name.to_string_lossy()) {
            files.push(FileRef::new(path));
        }
    }
    files.sort();

    tracing::debug!("{} file(s) in {:?} match {:?}", files.len(), dir, glob);
    Ok(files)
}

fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::from("(?s)^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            '[' => {
                let mut raw = String::from("[");
                let mut negated = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    negated = true;
                    raw.push('!');
                }
                let mut members = Vec::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    // A leading `]` is a member of the class, not its end.
                    if c == ']' && !members.is_empty() {
                        closed = true;
                        break;
                    }
                    raw.push(c);
                    members.push(c);
                }
                if closed {
                    pattern.push_str(&class_to_regex(&members, negated));
                } else {
                    // An unterminated class is taken literally.
                    pattern.push_str(&regex::escape(&raw));
                }
            }
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).with_context(|| format!("Invalid glob pattern {glob:?}"))
}

/// Translates the members of a `[...]` class. Reversed ranges such as `z-a`
/// match nothing, as in fnmatch.
fn class_to_regex(members: &[char], negated: bool) -> String {
    let mut class = String::new();
    let mut i = 0;
    while i < members.len() {
        let lo = members[i];
        if members.get(i + 1) == Some(&'-') && i + 2 < members.len() {
            let hi = members[i + 2];
            if lo <= hi {
                class.push_str(&regex::escape(&lo.to_string()));
                class.push('-');
                class.push_str(&regex::escape(&hi.to_string()));
            }
            i += 3;
        } else {
            class.push_str(&regex::escape(&lo.to_string()));
            i += 1;
        }
    }

    match (class.is_empty(), negated) {
        (true, false) => r"\b\B".to_string(),
        (true, true) => ".".to_string(),
        (false, false) => format!("[{class}]"),
        (false, true) => format!("[^{class}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("*.mkv").unwrap();
        assert!(re.is_match("Show 01 raw.mkv"));
        assert!(!re.is_match("Show 01 raw.mkv.part"));
        assert!(!re.is_match("Show 01 raw.mp4"));

        let re = glob_to_regex("Ep?.ass").unwrap();
        assert!(re.is_match("Ep1.ass"));
        assert!(!re.is_match("Ep10.ass"));

        let re = glob_to_regex("[[]Group[]]*.ass").unwrap();
        assert!(re.is_match("[Group][02]Title.ass"));

        let re = glob_to_regex("[!a]*.srt").unwrap();
        assert!(re.is_match("b.srt"));
        assert!(!re.is_match("a.srt"));

        let re = glob_to_regex("(1).mkv").unwrap();
        assert!(re.is_match("(1).mkv"));
        assert!(!re.is_match("1.mkv"));
    }

    #[test]
    fn test_glob_class_ranges() {
        let re = glob_to_regex("Ep[0-2].ass").unwrap();
        assert!(re.is_match("Ep1.ass"));
        assert!(!re.is_match("Ep3.ass"));

        let re = glob_to_regex("[a-]x").unwrap();
        assert!(re.is_match("-x"));
        assert!(re.is_match("ax"));
        assert!(!re.is_match("bx"));

        // Reversed ranges are empty instead of an error.
        let re = glob_to_regex("[z-a]*.mkv").unwrap();
        assert!(!re.is_match("m.mkv"));
        assert!(!re.is_match("a.mkv"));

        let re = glob_to_regex("[z-ab]*.mkv").unwrap();
        assert!(re.is_match("b.mkv"));
        assert!(!re.is_match("m.mkv"));

        let re = glob_to_regex("[!z-a].mkv").unwrap();
        assert!(re.is_match("m.mkv"));
    }

    #[test]
    fn test_collect_files_reversed_range() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.mkv")).unwrap();

        assert!(collect_files(temp_dir.path(), "[z-a].mkv").unwrap().is_empty());
    }

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        File::create(dir.join("Show 02 raw.mkv")).unwrap();
        File::create(dir.join("Show 01 raw.mkv")).unwrap();
        File::create(dir.join("Show 01 raw.ass")).unwrap();
        fs::create_dir(dir.join("folder.mkv")).unwrap();

        let files = collect_files(dir, "*.mkv").unwrap();
        let names: Vec<String> = files.iter().map(FileRef::name).collect();
        assert_eq!(names, vec!["Show 01 raw.mkv", "Show 02 raw.mkv"]);
        assert!(files.iter().all(|f| f.path().is_absolute()));
    }

    #[test]
    fn test_collect_files_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_files(&temp_dir.path().join("missing"), "*").is_err());
    }
}
