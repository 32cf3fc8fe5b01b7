/// Test utilities for storage-backed tests.
///
/// RAII-based cleanup: the TempDir lives as long as the environment, so
/// test data disappears even when a test panics.
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::CsvConnection;

/// Test environment that owns its temp directory and cleans up on drop
pub struct TestEnvironment {
    /// Kept alive to prevent cleanup until drop
    _temp_dir: TempDir,
    /// CSV connection rooted in the temp directory
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleans_up_on_drop() {
        let base_path;
        {
            let env = TestEnvironment::new().unwrap();
            base_path = env.base_directory().to_path_buf();
            assert!(base_path.exists());

            std::fs::write(base_path.join("probe.txt"), "test data").unwrap();
            assert!(base_path.join("probe.txt").exists());
        }
        assert!(!base_path.exists());
    }
}
