//! # CSV Package Repository
//!
//! Wash-package catalog stored in `packages.csv`. The file is created on
//! first use and seeded with a starter catalog so a fresh install has
//! something to sell.
//!
//! ## CSV Format
//!
//! ```csv
//! id,name,vehicle_type,subscription_price,max_washes_per_month,description,is_active,created_at,updated_at
//! package::1702516122000,Basic Shine,hatchback,399.0,4,,true,2025-01-20T10:00:00Z,2025-01-20T10:00:00Z
//! ```

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::backend::domain::models::WashPackage;
use crate::backend::storage::traits::PackageStorage;
use shared::VehicleType;

/// CSV record structure for packages
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackageRecord {
    id: String,
    name: String,
    vehicle_type: String,
    subscription_price: f64,
    max_washes_per_month: u32,
    description: Option<String>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl From<WashPackage> for PackageRecord {
    fn from(package: WashPackage) -> Self {
        PackageRecord {
            id: package.id,
            name: package.name,
            vehicle_type: package.vehicle_type.as_str().to_string(),
            subscription_price: package.subscription_price,
            max_washes_per_month: package.max_washes_per_month,
            description: package.description,
            is_active: package.is_active,
            created_at: package.created_at,
            updated_at: package.updated_at,
        }
    }
}

impl TryFrom<PackageRecord> for WashPackage {
    type Error = anyhow::Error;

    fn try_from(record: PackageRecord) -> Result<Self> {
        let vehicle_type = record
            .vehicle_type
            .parse::<VehicleType>()
            .map_err(|e| anyhow::anyhow!("Failed to parse vehicle type: {}", e))?;

        Ok(WashPackage {
            id: record.id,
            name: record.name,
            vehicle_type,
            subscription_price: record.subscription_price,
            max_washes_per_month: record.max_washes_per_month,
            description: record.description,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// CSV-based package repository
#[derive(Clone)]
pub struct PackageRepository {
    connection: CsvConnection,
}

impl PackageRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Starter catalog written the first time the file is created
    fn seed_packages(now_millis: u64, now_rfc3339: &str) -> Vec<WashPackage> {
        let seeds: [(&str, VehicleType, f64, u32); 4] = [
            ("Basic Shine", VehicleType::Hatchback, 399.0, 4),
            ("Classic Shine", VehicleType::Sedan, 499.0, 4),
            ("Premium Foam", VehicleType::Suv, 699.0, 4),
            ("Royale Detail", VehicleType::Luxury, 999.0, 6),
        ];

        seeds
            .iter()
            .enumerate()
            .map(|(i, (name, vehicle_type, price, washes))| WashPackage {
                id: WashPackage::generate_id(now_millis + i as u64),
                name: name.to_string(),
                vehicle_type: *vehicle_type,
                subscription_price: *price,
                max_washes_per_month: *washes,
                description: None,
                is_active: true,
                created_at: now_rfc3339.to_string(),
                updated_at: now_rfc3339.to_string(),
            })
            .collect()
    }

    fn ensure_packages_file(&self) -> Result<()> {
        let path = self.connection.packages_file();
        if path.exists() {
            return Ok(());
        }

        let now = Utc::now();
        let seeds = Self::seed_packages(now.timestamp_millis() as u64, &now.to_rfc3339());
        info!("Seeding package catalog with {} packages", seeds.len());
        self.write_packages(&seeds)
    }

    fn read_packages(&self) -> Result<Vec<WashPackage>> {
        self.ensure_packages_file()?;

        let file = File::open(self.connection.packages_file())?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut packages = Vec::new();
        for result in csv_reader.deserialize::<PackageRecord>() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to read package record: {}. Skipping.", e);
                    continue;
                }
            };
            match WashPackage::try_from(record) {
                Ok(package) => packages.push(package),
                Err(e) => warn!("Failed to parse package record: {}. Skipping.", e),
            }
        }

        Ok(packages)
    }

    fn write_packages(&self, packages: &[WashPackage]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        for package in packages {
            csv_writer.serialize(PackageRecord::from(package.clone()))?;
        }
        let contents = String::from_utf8(csv_writer.into_inner()?)?;

        self.connection
            .write_atomically(&self.connection.packages_file(), &contents)?;
        debug!("Wrote {} packages to packages.csv", packages.len());
        Ok(())
    }
}

#[async_trait]
impl PackageStorage for PackageRepository {
    async fn store_package(&self, package: &WashPackage) -> Result<()> {
        let mut packages = self.read_packages()?;
        match packages.iter_mut().find(|p| p.id == package.id) {
            Some(existing) => *existing = package.clone(),
            None => packages.push(package.clone()),
        }
        self.write_packages(&packages)?;
        info!("Stored package: {}", package.id);
        Ok(())
    }

    async fn get_package(&self, package_id: &str) -> Result<Option<WashPackage>> {
        let packages = self.read_packages()?;
        Ok(packages.into_iter().find(|p| p.id == package_id))
    }

    async fn list_packages(&self, vehicle_type: Option<VehicleType>) -> Result<Vec<WashPackage>> {
        let mut packages: Vec<WashPackage> = self
            .read_packages()?
            .into_iter()
            .filter(|p| p.is_active)
            .filter(|p| vehicle_type.map_or(true, |vt| p.vehicle_type == vt))
            .collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }
}
