//! # CSV Addon Repository
//!
//! Add-on catalog stored in `addons.csv`, seeded with a starter set on
//! first use. Same shape as the package repository, minus the vehicle
//! dimension.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::backend::domain::models::WashAddon;
use crate::backend::storage::traits::AddonStorage;

/// CSV record structure for add-ons
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddonRecord {
    id: String,
    name: String,
    price: f64,
    description: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl From<WashAddon> for AddonRecord {
    fn from(addon: WashAddon) -> Self {
        AddonRecord {
            id: addon.id,
            name: addon.name,
            price: addon.price,
            description: addon.description,
            is_active: addon.is_active,
            created_at: addon.created_at,
            updated_at: addon.updated_at,
        }
    }
}

impl From<AddonRecord> for WashAddon {
    fn from(record: AddonRecord) -> Self {
        WashAddon {
            id: record.id,
            name: record.name,
            price: record.price,
            description: record.description,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// CSV-based add-on repository
#[derive(Clone)]
pub struct AddonRepository {
    connection: CsvConnection,
}

impl AddonRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn seed_addons(now_millis: u64, now_rfc3339: &str) -> Vec<WashAddon> {
        let seeds: [(&str, f64); 3] = [
            ("Interior Vacuum", 49.0),
            ("Underbody Wash", 99.0),
            ("Ceramic Spray", 149.0),
        ];

        seeds
            .iter()
            .enumerate()
            .map(|(i, (name, price))| WashAddon {
                id: WashAddon::generate_id(now_millis + i as u64),
                name: name.to_string(),
                price: *price,
                description: None,
                is_active: true,
                created_at: now_rfc3339.to_string(),
                updated_at: now_rfc3339.to_string(),
            })
            .collect()
    }

    fn ensure_addons_file(&self) -> Result<()> {
        let path = self.connection.addons_file();
        if path.exists() {
            return Ok(());
        }

        let now = Utc::now();
        let seeds = Self::seed_addons(now.timestamp_millis() as u64, &now.to_rfc3339());
        info!("Seeding add-on catalog with {} add-ons", seeds.len());
        self.write_addons(&seeds)
    }

    fn read_addons(&self) -> Result<Vec<WashAddon>> {
        self.ensure_addons_file()?;

        let file = File::open(self.connection.addons_file())?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut addons = Vec::new();
        for result in csv_reader.deserialize::<AddonRecord>() {
            match result {
                Ok(record) => addons.push(WashAddon::from(record)),
                Err(e) => warn!("Failed to read add-on record: {}. Skipping.", e),
            }
        }

        Ok(addons)
    }

    fn write_addons(&self, addons: &[WashAddon]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        for addon in addons {
            csv_writer.serialize(AddonRecord::from(addon.clone()))?;
        }
        let contents = String::from_utf8(csv_writer.into_inner()?)?;

        self.connection
            .write_atomically(&self.connection.addons_file(), &contents)?;
        debug!("Wrote {} add-ons to addons.csv", addons.len());
        Ok(())
    }
}

#[async_trait]
impl AddonStorage for AddonRepository {
    async fn store_addon(&self, addon: &WashAddon) -> Result<()> {
        let mut addons = self.read_addons()?;
        match addons.iter_mut().find(|a| a.id == addon.id) {
            Some(existing) => *existing = addon.clone(),
            None => addons.push(addon.clone()),
        }
        self.write_addons(&addons)?;
        info!("Stored add-on: {}", addon.id);
        Ok(())
    }

    async fn get_addon(&self, addon_id: &str) -> Result<Option<WashAddon>> {
        let addons = self.read_addons()?;
        Ok(addons.into_iter().find(|a| a.id == addon_id))
    }

    async fn list_addons(&self) -> Result<Vec<WashAddon>> {
        let mut addons: Vec<WashAddon> = self
            .read_addons()?
            .into_iter()
            .filter(|a| a.is_active)
            .collect();
        addons.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(addons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_first_use_seeds_addons() {
        let env = TestEnvironment::new().unwrap();
        let repo = AddonRepository::new(env.connection.clone());

        let addons = repo.list_addons().await.unwrap();
        assert_eq!(addons.len(), 3);
        assert!(addons.iter().any(|a| a.name == "Underbody Wash"));
    }

    #[tokio::test]
    async fn test_store_get_and_upsert() {
        let env = TestEnvironment::new().unwrap();
        let repo = AddonRepository::new(env.connection.clone());

        let mut addon = WashAddon {
            id: "addon::7".to_string(),
            name: "Pet Hair Removal".to_string(),
            price: 129.0,
            description: None,
            is_active: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        repo.store_addon(&addon).await.unwrap();
        assert_eq!(
            repo.get_addon("addon::7").await.unwrap().unwrap().price,
            129.0
        );

        addon.price = 139.0;
        repo.store_addon(&addon).await.unwrap();
        assert_eq!(
            repo.get_addon("addon::7").await.unwrap().unwrap().price,
            139.0
        );
    }

    #[tokio::test]
    async fn test_listing_sorts_by_name_and_hides_inactive() {
        let env = TestEnvironment::new().unwrap();
        let repo = AddonRepository::new(env.connection.clone());

        let retired = WashAddon {
            id: "addon::8".to_string(),
            name: "Aaa Retired".to_string(),
            price: 10.0,
            description: None,
            is_active: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        repo.store_addon(&retired).await.unwrap();

        let addons = repo.list_addons().await.unwrap();
        assert!(!addons.iter().any(|a| a.id == "addon::8"));

        let names: Vec<&str> = addons.iter().map(|a| a.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
