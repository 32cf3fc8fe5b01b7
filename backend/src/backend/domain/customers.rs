use anyhow::Result;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::domain::commands::customers::{CustomerSearchQuery, CustomerSearchResult};
use crate::backend::domain::models::Customer;
use crate::backend::storage::csv::{CsvConnection, CustomerRepository};
use crate::backend::storage::CustomerStorage;

/// Tuning knobs for the typeahead search
#[derive(Debug, Clone)]
pub struct CustomerSearchConfig {
    /// How long a query sits before storage is hit
    pub debounce: Duration,
    /// Result cap applied when the query does not carry its own
    pub default_limit: usize,
}

impl Default for CustomerSearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            default_limit: 10,
        }
    }
}

/// Service for customer lookups, including the debounced typeahead behind
/// the wizard's customer step.
#[derive(Clone)]
pub struct CustomerService {
    customer_repository: CustomerRepository,
    config: CustomerSearchConfig,
    /// Monotonic ticket counter shared across clones; only the holder of
    /// the newest ticket gets to return results.
    generation: Arc<AtomicU64>,
}

impl CustomerService {
    /// Create a new CustomerService with the default search tuning
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self::with_config(csv_conn, CustomerSearchConfig::default())
    }

    /// Create a CustomerService with explicit search tuning
    pub fn with_config(csv_conn: Arc<CsvConnection>, config: CustomerSearchConfig) -> Self {
        Self {
            customer_repository: CustomerRepository::new((*csv_conn).clone()),
            config,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a customer by ID
    pub async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        let customer = self.customer_repository.get_customer(customer_id).await?;

        if customer.is_none() {
            warn!("Customer not found: {}", customer_id);
        }

        Ok(customer)
    }

    /// List all customers ordered by name
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.customer_repository.list_customers().await
    }

    /// Search immediately, skipping the debounce window. Blank queries
    /// match nobody.
    pub async fn search(&self, query: CustomerSearchQuery) -> Result<Vec<Customer>> {
        let limit = query.limit.unwrap_or(self.config.default_limit);
        let trimmed = query.query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let customers = self
            .customer_repository
            .search_customers(trimmed, limit)
            .await?;

        debug!(
            "🔍 Search '{}' matched {} customers",
            trimmed,
            customers.len()
        );
        Ok(customers)
    }

    /// Debounced search for the typeahead. Each call takes a fresh
    /// generation ticket, sleeps out the debounce window, and abandons the
    /// lookup when a newer call has taken the ticket in the meantime. The
    /// check runs again after storage returns, so the last caller wins
    /// regardless of how long the lookup took.
    pub async fn search_debounced(
        &self,
        query: CustomerSearchQuery,
    ) -> Result<CustomerSearchResult> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.config.debounce).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("🔍 Search '{}' superseded during debounce", query.query);
            return Ok(CustomerSearchResult {
                customers: Vec::new(),
                superseded: true,
            });
        }

        let customers = self.search(query).await?;

        if self.generation.load(Ordering::SeqCst) != ticket {
            return Ok(CustomerSearchResult {
                customers: Vec::new(),
                superseded: true,
            });
        }

        Ok(CustomerSearchResult {
            customers,
            superseded: false,
        })
    }
}
