//! Entry-point injection.
//! Patches the root application file so it accepts the user data and
//! forwards it to every section, and the bootstrap file so it passes the
//! serialized user data to the root application.
//!
//! Each patch is a named insertion point: an exact anchor text and its
//! replacement. Only the first occurrence of an anchor is replaced. Anchors
//! that are absent are reported, not treated as failures.

use crate::constants::{APP_FILE, BOOTSTRAP_FILE, SECTIONS, USER_DATA_PROP};
use crate::error::{Error, Result};
use crate::user_data::UserData;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A single insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub anchor: String,
    pub replacement: String,
}

impl Patch {
    fn new(anchor: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self { anchor: anchor.into(), replacement: replacement.into() }
    }
}

/// An anchor that was not present in its entry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAnchor {
    pub file: PathBuf,
    pub anchor: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InjectionReport {
    pub applied: usize,
    pub missing: Vec<MissingAnchor>,
}

/// Definition line of the root application once patched.
pub fn patched_app_definition() -> String {
    format!("const App = ({{ {USER_DATA_PROP} }}) => {{")
}

/// Patches for the root application file.
pub fn app_patches() -> Vec<Patch> {
    let mut patches = vec![Patch::new("const App = () => {", patched_app_definition())];
    patches.extend(SECTIONS.iter().map(|section| {
        Patch::new(
            format!("<{section} />"),
            format!("<{section} {USER_DATA_PROP}={{{USER_DATA_PROP}}} />"),
        )
    }));
    patches
}

/// Patches for the bootstrap file, embedding `user_data` as a JSON literal.
pub fn bootstrap_patches(user_data: &UserData) -> Result<Vec<Patch>> {
    let literal = user_data.to_json()?;
    Ok(vec![Patch::new("<App />", format!("<App {USER_DATA_PROP}={{{literal}}} />"))])
}

/// Applies `patches` to `content`, returning the new text and the anchors
/// that were not found.
pub fn apply_patches(content: &str, patches: &[Patch]) -> (String, Vec<String>) {
    let mut patched = content.to_string();
    let mut missing = Vec::new();
    for patch in patches {
        if patched.contains(&patch.anchor) {
            patched = patched.replacen(&patch.anchor, &patch.replacement, 1);
        } else {
            missing.push(patch.anchor.clone());
        }
    }
    (patched, missing)
}

/// Injects `user_data` into the entry files of the tree at `output_root`.
///
/// Both files are read and checked before either is written. A file that
/// already carries the user-data prop is rejected with `InjectionError`.
pub fn inject_user_data(output_root: &Path, user_data: &UserData) -> Result<InjectionReport> {
    let app_path = output_root.join(APP_FILE);
    let bootstrap_path = output_root.join(BOOTSTRAP_FILE);

    let app = fs::read_to_string(&app_path)?;
    let bootstrap = fs::read_to_string(&bootstrap_path)?;

    if app.contains(&patched_app_definition()) {
        return Err(Error::InjectionError(format!(
            "'{}' has already been injected",
            app_path.display()
        )));
    }
    if bootstrap.contains(&format!("<App {USER_DATA_PROP}=")) {
        return Err(Error::InjectionError(format!(
            "'{}' has already been injected",
            bootstrap_path.display()
        )));
    }

    let mut report = InjectionReport::default();
    for (path, content, patches) in [
        (&app_path, app, app_patches()),
        (&bootstrap_path, bootstrap, bootstrap_patches(user_data)?),
    ] {
        let (patched, missing) = apply_patches(&content, &patches);
        report.applied += patches.len() - missing.len();
        for anchor in missing {
            warn!("Anchor '{}' not found in {}", anchor, path.display());
            report.missing.push(MissingAnchor { file: path.clone(), anchor });
        }
        debug!("Writing {}", path.display());
        fs::write(path, patched)?;
    }

    Ok(report)
}
