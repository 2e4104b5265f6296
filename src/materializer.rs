//! Template materialization: copies a template tree to the output location.

use crate::error::{Error, Result};
use globset::GlobSet;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a materialization copied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub files: usize,
    pub directories: usize,
    pub ignored: usize,
}

/// Recursively copies `template_root` into `output_root`.
///
/// Relative structure and file bytes are preserved; existing files at the
/// destination are overwritten. Paths matching `ignored` (relative to the
/// template root) are skipped together with everything below them.
///
/// An unreadable template root is an `IoError`. An output location inside
/// the template is refused with `TemplateError` before anything is created.
/// A failure mid-copy leaves the output tree partially written.
pub fn copy_template(
    template_root: &Path,
    output_root: &Path,
    ignored: &GlobSet,
) -> Result<CopyReport> {
    fs::read_dir(template_root)?;
    ensure_outside(template_root, output_root)?;

    debug!("Copying '{}' to '{}'", template_root.display(), output_root.display());
    fs::create_dir_all(output_root)?;

    let mut report = CopyReport::default();
    let mut walker = WalkDir::new(template_root).min_depth(1).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .map_err(|e| Error::TemplateError(e.to_string()))?;

        if ignored.is_match(relative) {
            debug!("Skipping ignored path {}", relative.display());
            report.ignored += 1;
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let target = output_root.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            report.directories += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            report.files += 1;
        }
    }

    Ok(report)
}

fn ensure_outside(template_root: &Path, output_root: &Path) -> Result<()> {
    let template = template_root.canonicalize()?;
    let output = resolve(output_root)?;
    if output.starts_with(&template) {
        return Err(Error::TemplateError(format!(
            "output directory '{}' is inside the template '{}'",
            output_root.display(),
            template_root.display()
        )));
    }
    Ok(())
}

/// Canonical form of a path whose trailing components may not exist yet.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}
