//! # CSV Customer Repository
//!
//! Customer book stored in `customers.csv`. Created empty on first use;
//! customers arrive through the back office, not seeding.

use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::backend::domain::models::Customer;
use crate::backend::storage::traits::CustomerStorage;

const CUSTOMERS_HEADER: &str = "id,name,phone,email,address,created_at,updated_at";

/// CSV record structure for customers
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomerRecord {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    address: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<Customer> for CustomerRecord {
    fn from(customer: Customer) -> Self {
        CustomerRecord {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
            address: customer.address,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Customer {
            id: record.id,
            name: record.name,
            phone: record.phone,
            email: record.email,
            address: record.address,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// CSV-based customer repository
#[derive(Clone)]
pub struct CustomerRepository {
    connection: CsvConnection,
}

impl CustomerRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_customers(&self) -> Result<Vec<Customer>> {
        self.connection
            .ensure_csv_file(&self.connection.customers_file(), CUSTOMERS_HEADER)?;

        let file = File::open(self.connection.customers_file())?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut customers = Vec::new();
        for result in csv_reader.deserialize::<CustomerRecord>() {
            match result {
                Ok(record) => customers.push(Customer::from(record)),
                Err(e) => warn!("Failed to read customer record: {}. Skipping.", e),
            }
        }

        Ok(customers)
    }

    fn write_customers(&self, customers: &[Customer]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        for customer in customers {
            csv_writer.serialize(CustomerRecord::from(customer.clone()))?;
        }
        let contents = String::from_utf8(csv_writer.into_inner()?)?;

        self.connection
            .write_atomically(&self.connection.customers_file(), &contents)?;
        debug!("Wrote {} customers to customers.csv", customers.len());
        Ok(())
    }
}

#[async_trait]
impl CustomerStorage for CustomerRepository {
    async fn store_customer(&self, customer: &Customer) -> Result<()> {
        let mut customers = self.read_customers()?;
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => customers.push(customer.clone()),
        }
        self.write_customers(&customers)?;
        info!("Stored customer: {}", customer.id);
        Ok(())
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        let customers = self.read_customers()?;
        Ok(customers.into_iter().find(|c| c.id == customer_id))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let mut customers = self.read_customers()?;
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn search_customers(&self, query: &str, limit: usize) -> Result<Vec<Customer>> {
        let mut matches: Vec<Customer> = self
            .read_customers()?
            .into_iter()
            .filter(|c| c.matches_query(query))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(limit);
        Ok(matches)
    }
}
