use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Paginated, WasteBank, WasteType};

/// Catalog data is considered stale after 5 minutes.
const CACHE_STALE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() >= CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    /// Load a cache entry only if it is still fresh. Unreadable entries are
    /// logged and treated as missing.
    fn load_fresh<T: DeserializeOwned>(&self, name: &str) -> Option<CachedData<T>> {
        match self.load(name) {
            Ok(Some(cached)) if !cached.is_stale() => Some(cached),
            Ok(_) => None,
            Err(e) => {
                debug!(cache = name, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    // ===== Waste Types =====

    pub fn load_waste_types(&self, page: u32) -> Result<Option<CachedData<Paginated<WasteType>>>> {
        self.load(&format!("waste_types_{}", page))
    }

    pub fn fresh_waste_types(&self, page: u32) -> Option<CachedData<Paginated<WasteType>>> {
        self.load_fresh(&format!("waste_types_{}", page))
    }

    pub fn save_waste_types(&self, page: u32, types: &Paginated<WasteType>) -> Result<()> {
        self.save(&format!("waste_types_{}", page), types)
    }

    // ===== Waste Banks =====

    pub fn load_waste_banks(&self, page: u32) -> Result<Option<CachedData<Paginated<WasteBank>>>> {
        self.load(&format!("waste_banks_{}", page))
    }

    pub fn fresh_waste_banks(&self, page: u32) -> Option<CachedData<Paginated<WasteBank>>> {
        self.load_fresh(&format!("waste_banks_{}", page))
    }

    pub fn save_waste_banks(&self, page: u32, banks: &Paginated<WasteBank>) -> Result<()> {
        self.save(&format!("waste_banks_{}", page), banks)
    }

    /// Remove every cached file. Called when the session ends.
    pub fn clear(&self) -> Result<()> {
        let entries = match std::fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cache file: {}", path.display()))?;
            }
        }
        debug!("Cache cleared");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageMeta;
    use chrono::Duration;
    use tempfile::TempDir;

    fn waste_type_page() -> Paginated<WasteType> {
        serde_json::from_value(serde_json::json!({
            "status": "success",
            "message": "ok",
            "data": [{"id": "wt-1", "name": "Plastik", "pricePerKg": 4000}],
            "metadata": {"currentPage": 1, "totalPages": 2, "totalWasteTypes": 8}
        }))
        .unwrap()
    }

    #[test]
    fn test_cached_data_age_display() {
        let mut cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");

        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(150);
        assert_eq!(cached.age_display(), "3h ago");

        cached.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");

        // Clock skew
        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(6);
        assert!(old.is_stale());
    }

    #[test]
    fn test_save_and_load_by_page() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().join("cache")).unwrap();

        cache.save_waste_types(1, &waste_type_page()).unwrap();

        let loaded = cache.load_waste_types(1).unwrap().unwrap();
        assert_eq!(loaded.data.data[0].name, "Plastik");
        assert_eq!(loaded.data.metadata.total, Some(8));
        assert!(cache.load_waste_types(2).unwrap().is_none());
        assert!(cache.fresh_waste_types(1).is_some());
    }

    #[test]
    fn test_stale_entry_is_not_fresh() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let stale = CachedData {
            data: Paginated::<WasteBank> {
                status: String::new(),
                message: String::new(),
                data: Vec::new(),
                metadata: PageMeta {
                    current_page: 1,
                    total_pages: 0,
                    total: None,
                    has_next_page: None,
                    has_prev_page: None,
                },
            },
            cached_at: Utc::now() - Duration::minutes(30),
        };
        std::fs::write(
            dir.path().join("waste_banks_1.json"),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert!(cache.load_waste_banks(1).unwrap().is_some());
        assert!(cache.fresh_waste_banks(1).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("waste_types_1.json"), "{oops").unwrap();

        assert!(cache.load_waste_types(1).is_err());
        assert!(cache.fresh_waste_types(1).is_none());
    }

    #[test]
    fn test_clear_removes_entries() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        cache.save_waste_types(1, &waste_type_page()).unwrap();
        cache.save_waste_types(2, &waste_type_page()).unwrap();
        std::fs::write(dir.path().join("trashvalue.log"), "keep").unwrap();

        cache.clear().unwrap();
        cache.clear().unwrap();

        assert!(cache.load_waste_types(1).unwrap().is_none());
        assert!(cache.load_waste_types(2).unwrap().is_none());
        assert!(dir.path().join("trashvalue.log").exists());
    }
}
