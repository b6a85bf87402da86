//! Saves an [`Export`] where the user can pick it up.

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;
use weather_query_core::Export;

/// Write `export` to `<dir>/weather_data.<ext>`, creating `dir` if needed.
/// An existing file of the same name is replaced.
pub fn save_export(export: &Export, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(export.file_name());
    fs::write(&path, &export.content)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    info!(
        path = %path.display(),
        mime_type = export.mime_type,
        bytes = export.content.len(),
        "export saved"
    );

    Ok(path)
}

/// Stream the artifact bytes unchanged, e.g. to stdout.
pub fn write_export<W: Write>(export: &Export, mut out: W) -> Result<()> {
    out.write_all(export.content.as_bytes()).context("Failed to write export")?;
    out.flush().context("Failed to flush export")?;
    Ok(())
}
