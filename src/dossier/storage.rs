use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use super::types::Dossier;
use crate::merge::LegalPartial;

/// Load a dossier from a JSON file.
pub fn load_dossier(path: &Path) -> Result<Dossier> {
    read_json(path, "dossier")
}

/// Load a legal/tax partial update from a JSON file.
pub fn load_partial(path: &Path) -> Result<LegalPartial> {
    read_json(path, "partial update")
}

/// Save a dossier atomically, so a crash never leaves a half-written file
/// behind for the next merge to build on.
pub fn save_dossier(path: &Path, dossier: &Dossier) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    write_json(&mut file, dossier).context("Failed to serialize dossier")?;

    file.commit()
        .with_context(|| format!("Failed to save dossier to {}", path.display()))?;

    tracing::debug!(path = %path.display(), tax_id = %dossier.tax_id, "dossier saved");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file at {}", what, path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse {}: invalid JSON in {}", what, path.display()))
}

fn write_json<W: std::io::Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}
