//! File I/O for the native CLI

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use glossa_core::{SegmentedArticle, Store};

/// Get the ~/.glossa directory path, creating it if needed
pub fn glossa_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let glossa_dir = home.join(".glossa");

    if !glossa_dir.exists() {
        fs::create_dir_all(&glossa_dir)
            .with_context(|| format!("Failed to create {}", glossa_dir.display()))?;
    }

    Ok(glossa_dir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(glossa_dir()?.join("store.json"))
}

/// Load the store snapshot, or start empty when none exists yet
pub fn load_store_from(path: &Path) -> Result<Store> {
    if !path.exists() {
        return Ok(Store::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Store::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_store_to(path: &Path, store: &Store) -> Result<()> {
    let json = store.to_json().context("Failed to serialize store")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn load_store() -> Result<Store> {
    load_store_from(&store_path()?)
}

pub fn save_store(store: &Store) -> Result<PathBuf> {
    let path = store_path()?;
    save_store_to(&path, store)?;
    Ok(path)
}

/// Export one article's tree to ~/.glossa/<article-id>.json
pub fn export_article(article: &glossa_core::Article) -> Result<PathBuf> {
    let export_path = glossa_dir()?.join(format!("{}.json", article.id));

    let json = serde_json::to_string_pretty(article).context("Failed to serialize article")?;
    fs::write(&export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    Ok(export_path)
}

/// Load tokenizer output from a JSON file
pub fn load_segmented(path: &str) -> Result<SegmentedArticle> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path))?;
    SegmentedArticle::from_json(&json)
        .with_context(|| format!("Failed to parse tokenizer output in {}", path))
}
