//! UIA pattern list
//!
//! The UIA variant numbers its pages `1261<NNN>0.md`, one per position in the
//! 253-pattern sequence. The list pairs each position with the page's heading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::corpus::{uia_path, PATTERN_COUNT};
use crate::extract::parse_uia_heading;

/// Name of the generated list
pub const UIA_LIST_FILE: &str = "uia_pattern_list.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiaEntry {
    pub pattern_number: String,
    pub pattern_name: String,
    pub sequence: u16,
}

/// Entries found plus the pages that were missing or unparseable
#[derive(Debug, Default)]
pub struct UiaList {
    pub entries: Vec<UiaEntry>,
    pub missing: Vec<PathBuf>,
}

/// Read every UIA page in `dir`, positions 1..=253
pub fn uia_pattern_list(dir: &Path) -> UiaList {
    let mut list = UiaList::default();

    for sequence in 1..=PATTERN_COUNT {
        let path = uia_path(dir, sequence);
        let heading = fs::read_to_string(&path)
            .ok()
            .and_then(|content| parse_uia_heading(&content));

        match heading {
            Some((pattern_number, pattern_name)) => list.entries.push(UiaEntry {
                pattern_number,
                pattern_name,
                sequence,
            }),
            None => {
                warn!(path = %path.display(), "UIA page missing or without heading");
                list.missing.push(path);
            }
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uia_list() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(
            temp.path().join("12610010.md"),
            "# 12610010 - Independent domains\n\nBody\n",
        )
        .unwrap();
        fs::write(temp.path().join("12610020.md"), "no heading\n").unwrap();

        let list = uia_pattern_list(temp.path());
        assert_eq!(
            list.entries,
            vec![UiaEntry {
                pattern_number: "12610010".to_string(),
                pattern_name: "Independent domains".to_string(),
                sequence: 1,
            }]
        );
        assert_eq!(list.missing.len(), 252);
        assert_eq!(list.missing[0], temp.path().join("12610020.md"));
    }
}
