//! File I/O for native CLI

use anyhow::{Context, Result};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use lesson_core::{generate_outline, Page};

/// Get the ~/.lesson directory path, creating it if needed
pub fn lesson_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let lesson_dir = home.join(".lesson");
    ensure_dir(&lesson_dir)?;
    Ok(lesson_dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// Resolve a command line argument to a page file.
///
/// Anything that looks like a path is used as is; a bare name is looked up
/// in the pages directory.
pub fn resolve_page_path(arg: Option<&str>, pages_dir: &Path) -> PathBuf {
    match arg {
        Some(arg) if arg.contains(std::path::MAIN_SEPARATOR) || arg.ends_with(".json") => {
            PathBuf::from(arg)
        }
        Some(name) => pages_dir.join(format!("{}.json", name)),
        None => pages_dir.join("lesson.json"),
    }
}

/// Load a page file, or start a new page named after it if it does not exist
pub fn load_page(path: &Path) -> Result<Page> {
    if !path.exists() {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        log::info!("starting new page at {}", path.display());
        return Ok(Page::new(title));
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let page = lesson_core::page_from_json(&json)
        .with_context(|| format!("Failed to load page: {}", path.display()))?;
    log::info!("loaded {} ({} blocks)", path.display(), page.block_count());
    Ok(page)
}

/// Write the page as JSON
pub fn save_page(page: &Page, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = lesson_core::to_json(page)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(())
}

/// Write the page outline next to the page file
pub fn export_outline(page: &Page, path: &Path) -> Result<PathBuf> {
    let export_path = path.with_extension("md");
    fs::write(&export_path, generate_outline(page))
        .with_context(|| format!("Failed to write {}", export_path.display()))?;
    Ok(export_path)
}

/// Open the log file for appending
pub fn open_log(lesson_dir: &Path) -> Result<File> {
    let path = lesson_dir.join("lesson.log");
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))
}
