use log::info;
use std::fs;
use std::path::Path;

use crate::arxiv::MetadataCache;
use crate::error::Result;

/// Read a metadata cache written by [`save_cache`].
///
/// A path that does not exist yet is an empty cache, so the first run with
/// `--cache` creates the file instead of failing.
pub fn load_cache(path: &Path) -> Result<MetadataCache> {
    if !path.exists() {
        info!("Cache file {:?} not found, starting from an empty cache", path);
        return Ok(MetadataCache::new());
    }
    let content = fs::read_to_string(path)?;
    let cache: MetadataCache = serde_json::from_str(&content)?;
    info!("Loaded {} cached papers from {:?}", cache.len(), path);
    Ok(cache)
}

/// Overwrite `path` with the full cache.
pub fn save_cache(path: &Path, cache: &MetadataCache) -> Result<()> {
    let content = serde_json::to_string(cache)?;
    fs::write(path, content)?;
    info!("Wrote {} papers to cache {:?}", cache.len(), path);
    Ok(())
}
