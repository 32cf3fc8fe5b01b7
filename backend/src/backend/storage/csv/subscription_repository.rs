//! # Subscription Repository
//!
//! Submitted subscriptions live under `subscriptions/`, one YAML file per
//! record. YAML keeps the nested line items and wash calendar readable for
//! an operator poking at the data directory, and the per-record files make
//! writes naturally isolated.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::backend::domain::models::Subscription;
use crate::backend::storage::traits::SubscriptionStorage;

/// YAML-file-per-record subscription repository
#[derive(Clone)]
pub struct SubscriptionRepository {
    connection: CsvConnection,
}

impl SubscriptionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// `subscription::<millis>` becomes `subscription_<millis>.yaml`
    fn file_path(&self, subscription_id: &str) -> PathBuf {
        let file_name = format!("{}.yaml", subscription_id.replace("::", "_"));
        self.connection.subscriptions_directory().join(file_name)
    }
}

#[async_trait]
impl SubscriptionStorage for SubscriptionRepository {
    async fn store_subscription(&self, subscription: &Subscription) -> Result<()> {
        let directory = self.connection.subscriptions_directory();
        fs::create_dir_all(&directory)?;

        let yaml_content = serde_yaml::to_string(subscription)?;
        let yaml_path = self.file_path(&subscription.id);
        self.connection.write_atomically(&yaml_path, &yaml_content)?;

        info!("Stored subscription: {}", subscription.id);
        Ok(())
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<Option<Subscription>> {
        let yaml_path = self.file_path(subscription_id);
        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let subscription: Subscription = serde_yaml::from_str(&yaml_content)?;
        Ok(Some(subscription))
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let directory = self.connection.subscriptions_directory();
        if !directory.exists() {
            return Ok(Vec::new());
        }

        let mut subscriptions = Vec::new();
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }

            let yaml_content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Subscription>(&yaml_content) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => warn!("Failed to parse subscription file {:?}: {}. Skipping.", path, e),
            }
        }

        // most recently created first
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!("Listed {} subscriptions", subscriptions.len());
        Ok(subscriptions)
    }
}
