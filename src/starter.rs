use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::{RankboardError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const STARTER_CONFIG: &str = r#"# Generated by rankboard

[board]
debounce_ms = 150
state_file = ".rankboard/state.json"
grouping = "none"

[scale]
labels = ["Strongly disagree", "Disagree", "Neutral", "Agree", "Strongly agree"]

[[items]]
key = "brand_a"
name = "Brand A"
image = "https://dummyimage.com/60x60/000/fff.png&text=A"

[[items]]
key = "brand_b"
name = "Brand B"
image = "https://dummyimage.com/60x60/333/fff.png&text=B"

[[items]]
key = "brand_c"
name = "Brand C"
image = "https://dummyimage.com/60x60/666/fff.png&text=C"

[[questions]]
text = "How likely are you to recommend this brand?"

[[questions]]
text = "Does this brand meet your expectations?"

[[questions]]
text = "Would you purchase from this brand again?"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitAction {
    Create,
    Overwrite,
    Keep,
}

impl InitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Keep => "keep",
        }
    }
}

/// Writes the starter config into `root`. Nothing is written on a dry run or
/// when the file exists and `no_overwrite` is set.
pub fn write_starter(root: &Path, dry_run: bool, no_overwrite: bool) -> Result<(InitAction, PathBuf)> {
    if !root.exists() {
        return Err(RankboardError::PathNotFound(root.display().to_string()));
    }
    let path = root.join(DEFAULT_CONFIG_FILE);
    let action = match (path.exists(), no_overwrite) {
        (false, _) => InitAction::Create,
        (true, true) => InitAction::Keep,
        (true, false) => InitAction::Overwrite,
    };
    if dry_run || action == InitAction::Keep {
        return Ok((action, path));
    }
    fs::write(&path, STARTER_CONFIG)?;
    Ok((action, path))
}
