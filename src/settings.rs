use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub paging: Paging,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: Database {
                pool_size: 5,
                busy_timeout_ms: 2000,
            },
            paging: Paging {
                default_page_size: 5,
                max_page_size: 100,
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let override_path = Path::new("settings.ron");

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(override_path) {
                if let Ok(overrides) = ron::from_str::<Settings>(&content) {
                    return overrides;
                }
            }
        }

        Settings::default()
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

/// Validates a page request and returns `(offset, effective_page_size)`.
/// The page size is clamped to the configured cap.
pub(crate) fn page_window(page: i64, page_size: i64) -> Result<(i64, i64)> {
    if page < 0 {
        return Err(Error::Validation("page must not be negative".into()));
    }
    if page_size <= 0 {
        return Err(Error::Validation("page_size must be positive".into()));
    }
    let page_size = page_size.min(settings().paging.max_page_size);
    let offset = page
        .checked_mul(page_size)
        .ok_or_else(|| Error::Validation("page out of range".into()))?;
    Ok((offset, page_size))
}
