//! # Draft Repository
//!
//! The wizard draft cache: one JSON file, `wizard_draft.json`, holding at
//! most one envelope. The repository is deliberately dumb about expiry;
//! the wizard inspects the envelope's timestamps and tells the repository
//! to clear stale state. Unreadable files are the exception: those are
//! deleted on sight since nobody can do anything with them.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::fs;

use super::connection::CsvConnection;
use crate::backend::domain::models::DraftEnvelope;
use crate::backend::storage::traits::DraftStorage;

/// Single-slot JSON draft cache
#[derive(Clone)]
pub struct DraftRepository {
    connection: CsvConnection,
}

impl DraftRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl DraftStorage for DraftRepository {
    async fn save_draft(&self, envelope: &DraftEnvelope) -> Result<()> {
        let json = serde_json::to_string_pretty(envelope)?;
        self.connection
            .write_atomically(&self.connection.draft_file(), &json)?;
        debug!("Saved wizard draft (expires {})", envelope.expires_at);
        Ok(())
    }

    async fn load_draft(&self) -> Result<Option<DraftEnvelope>> {
        let path = self.connection.draft_file();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        match serde_json::from_str::<DraftEnvelope>(&json) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                warn!("Discarding unreadable wizard draft: {}", e);
                fs::remove_file(&path)?;
                Ok(None)
            }
        }
    }

    async fn clear_draft(&self) -> Result<bool> {
        let path = self.connection.draft_file();
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        info!("Cleared wizard draft");
        Ok(true)
    }
}
