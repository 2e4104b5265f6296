//! File and directory ignore pattern handling for portfolio templates.
//! Processes the optional .portfolioignore file so that matching paths are
//! left out when a template is materialized.

use crate::constants::IGNORE_FILE;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::path::Path;

/// Reads the template's ignore file and compiles its patterns.
///
/// # Notes
/// - If the ignore file doesn't exist, only the ignore file itself is excluded
/// - Each non-empty line not starting with `#` is a glob pattern relative to the
///   template root; a trailing `/` also matches everything below the directory
/// - Invalid patterns result in an `IgnoreError`
///
/// # Example
/// ```ignore
/// # Contents of .portfolioignore:
/// node_modules/
/// *.log
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(template_root: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    add_pattern(&mut builder, IGNORE_FILE)?;

    let ignore_path = template_root.as_ref().join(IGNORE_FILE);
    if ignore_path.exists() {
        let contents = std::fs::read_to_string(&ignore_path)?;
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(dir) = line.strip_suffix('/') {
                add_pattern(&mut builder, dir)?;
                add_pattern(&mut builder, &format!("{dir}/**"))?;
            } else {
                add_pattern(&mut builder, line)?;
            }
        }
    } else {
        debug!("{} does not exist", IGNORE_FILE);
    }

    builder
        .build()
        .map_err(|e| Error::IgnoreError(format!("{IGNORE_FILE} loading failed: {e}")))
}

fn add_pattern(builder: &mut GlobSetBuilder, pattern: &str) -> Result<()> {
    let glob = Glob::new(pattern)
        .map_err(|e| Error::IgnoreError(format!("{IGNORE_FILE} loading failed: {e}")))?;
    builder.add(glob);
    Ok(())
}
