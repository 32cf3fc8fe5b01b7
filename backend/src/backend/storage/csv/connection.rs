//! CsvConnection manages the data directory and the file paths every
//! repository works from.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── packages.csv
//! ├── addons.csv
//! ├── customers.csv
//! ├── wizard_draft.json
//! └── subscriptions/
//!     ├── subscription_1702516122000.yaml
//!     └── subscription_1702516200000.yaml
//! ```

use anyhow::{anyhow, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "WASHPLAN_DATA_DIR";

/// Shared handle to the data directory
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<Mutex<PathBuf>>,
}

impl CsvConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
        })
    }

    /// Create a connection in the default location: the `WASHPLAN_DATA_DIR`
    /// environment variable when set, otherwise `~/Documents/WashPlan`.
    pub fn new_default() -> Result<Self> {
        if let Ok(override_dir) = std::env::var(DATA_DIR_ENV) {
            info!("Using data directory from {}: {}", DATA_DIR_ENV, override_dir);
            return Self::new(override_dir);
        }

        let documents_dir = dirs::document_dir()
            .ok_or_else(|| anyhow!("Could not determine the documents directory"))?;
        let data_dir = documents_dir.join("WashPlan");
        info!("Using default data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Current data directory
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.lock().unwrap().clone()
    }

    pub fn packages_file(&self) -> PathBuf {
        self.base_directory().join("packages.csv")
    }

    pub fn addons_file(&self) -> PathBuf {
        self.base_directory().join("addons.csv")
    }

    pub fn customers_file(&self) -> PathBuf {
        self.base_directory().join("customers.csv")
    }

    pub fn draft_file(&self) -> PathBuf {
        self.base_directory().join("wizard_draft.json")
    }

    pub fn subscriptions_directory(&self) -> PathBuf {
        self.base_directory().join("subscriptions")
    }

    /// Create a CSV file with the given header when it does not exist yet
    pub fn ensure_csv_file(&self, path: &Path, header: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(path, format!("{}\n", header))?;
            info!("Created CSV file: {:?}", path);
        }
        Ok(())
    }

    /// Write `contents` to `path` via a temp file and rename, so readers
    /// never observe a half-written file
    pub fn write_atomically(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
