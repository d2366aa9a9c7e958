use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

// Base data directory
pub const DATA_DIR: &str = "data";

pub const EXPORT_FILE_NAME: &str = "performance_disclosure_results.csv";

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Default export location inside `data_dir`.
pub fn default_export_path(data_dir: &Path) -> PathBuf {
    data_dir.join(EXPORT_FILE_NAME)
}
