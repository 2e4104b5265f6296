//! Generation phase: materialize, substitute, inject.

use crate::error::{Error, Result};
use crate::ignore::parse_ignore_file;
use crate::injector::{inject_user_data, InjectionReport};
use crate::materializer::{copy_template, CopyReport};
use crate::substitution::{substitute_tree, SubstitutionReport};
use crate::user_data::UserData;
use log::info;
use std::path::{Path, PathBuf};

/// Outcome of a successful generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_root: PathBuf,
    pub copied: CopyReport,
    pub substituted: SubstitutionReport,
    pub injected: InjectionReport,
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Generates a portfolio from `template_root` into `output_root`.
///
/// Steps run strictly in sequence and each must succeed before the next
/// starts. Injection runs only after every marker file has been rewritten.
pub fn generate_portfolio(
    template_root: &Path,
    output_root: &Path,
    user_data: &UserData,
) -> Result<GenerationReport> {
    info!("Generating portfolio at {}", output_root.display());

    let ignored = parse_ignore_file(template_root)?;
    let copied = copy_template(template_root, output_root, &ignored)?;
    info!("Copied {} files", copied.files);

    let substituted = substitute_tree(output_root, user_data)?;
    info!("Rewrote {} template files", substituted.rewritten.len());

    let injected = inject_user_data(output_root, user_data)?;
    info!("Injected user data at {} insertion points", injected.applied);

    Ok(GenerationReport { output_root: output_root.to_path_buf(), copied, substituted, injected })
}
