//! Placeholder substitution over a materialized tree.
//! Files carrying the marker extension have the four known tokens replaced
//! with user data, are written under the target extension, and the marker
//! file is removed. All other files are left untouched.

use crate::constants::{MARKER_EXTENSION, TARGET_EXTENSION};
use crate::error::Result;
use crate::user_data::UserData;
use log::debug;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// The placeholder tokens understood by the substitution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Name,
    About,
    Experience,
    Skills,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] =
        [Placeholder::Name, Placeholder::About, Placeholder::Experience, Placeholder::Skills];

    /// User data field feeding this placeholder.
    pub fn field(self) -> &'static str {
        match self {
            Placeholder::Name => "name",
            Placeholder::About => "about",
            Placeholder::Experience => "experience",
            Placeholder::Skills => "skills",
        }
    }

    /// Brace-delimited token as it appears in template files.
    pub fn token(self) -> String {
        format!("{{{}}}", self.field())
    }

    /// Text used when the user data lacks the field.
    pub fn default_text(self) -> &'static str {
        match self {
            Placeholder::Name => "Default Name",
            Placeholder::About => "Default About Text",
            Placeholder::Experience => "Default Experience",
            Placeholder::Skills => "Default Skills",
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.field() == field)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{(name|about|experience|skills)\}").expect("token pattern is valid")
    })
}

/// Returns `true` if `content` still holds any of the known tokens.
pub fn has_placeholders(content: &str) -> bool {
    token_pattern().is_match(content)
}

/// Replaces every occurrence of every known token in one pass.
///
/// Substituted values are inserted verbatim and never scanned again.
pub fn substitute(content: &str, user_data: &UserData) -> String {
    token_pattern()
        .replace_all(content, |caps: &Captures| {
            let placeholder = Placeholder::from_field(&caps[1]);
            match placeholder {
                Some(p) => user_data.field_text(p.field()).unwrap_or_else(|| p.default_text().into()),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Checks whether a file name carries the marker extension.
pub fn is_marker_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MARKER_EXTENSION)
}

/// Sibling path with the marker extension swapped for the target extension.
pub fn target_path(path: &Path) -> PathBuf {
    path.with_extension(TARGET_EXTENSION)
}

/// Files rewritten by one substitution pass, as (marker, target) pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub rewritten: Vec<(PathBuf, PathBuf)>,
}

/// Runs the substitution pass over `output_root`.
///
/// Aborts on the first IO failure; files already rewritten stay rewritten.
pub fn substitute_tree(output_root: &Path, user_data: &UserData) -> Result<SubstitutionReport> {
    // Collect first so renames don't disturb the walk.
    let mut marker_files = Vec::new();
    for entry in WalkDir::new(output_root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_marker_file(entry.path()) {
            marker_files.push(entry.into_path());
        }
    }

    let mut report = SubstitutionReport::default();
    for source in marker_files {
        let target = target_path(&source);
        debug!("Rewriting {} -> {}", source.display(), target.display());

        let content = fs::read_to_string(&source)?;
        fs::write(&target, substitute(&content, user_data))?;
        fs::remove_file(&source)?;

        report.rewritten.push((source, target));
    }

    Ok(report)
}
