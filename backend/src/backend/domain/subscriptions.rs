use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::models::Subscription;
use crate::backend::storage::csv::{CsvConnection, SubscriptionRepository};
use crate::backend::storage::SubscriptionStorage;

/// Read-side service for submitted subscriptions. Writes only ever happen
/// through the wizard.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repository: SubscriptionRepository,
}

impl SubscriptionService {
    /// Create a new SubscriptionService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            subscription_repository: SubscriptionRepository::new((*csv_conn).clone()),
        }
    }

    /// Get a subscription by ID
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Option<Subscription>> {
        let subscription = self
            .subscription_repository
            .get_subscription(subscription_id)
            .await?;

        if subscription.is_none() {
            warn!("Subscription not found: {}", subscription_id);
        }

        Ok(subscription)
    }

    /// List all subscriptions, most recently created first
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscription_repository.list_subscriptions().await?;

        info!("Found {} subscriptions", subscriptions.len());
        Ok(subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{PricingTotals, ServiceArea};
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use chrono::NaiveDate;
    use shared::{PaymentStatus, VehicleType};

    fn sample_subscription(id: &str, created_at: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            customer_id: "customer::1".to_string(),
            customer_name: "Asha Verma".to_string(),
            vehicle_type: VehicleType::Sedan,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            months_duration: 1,
            service_area: ServiceArea {
                area: "Indiranagar".to_string(),
                map_url: None,
            },
            notes: None,
            packages: Vec::new(),
            addons: Vec::new(),
            wash_schedules: Vec::new(),
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            amount_paid: 0.0,
            payment_date: None,
            payment_notes: None,
            totals: PricingTotals::default(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    fn setup_test() -> (SubscriptionService, SubscriptionRepository, TestEnvironment) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let service = SubscriptionService::new(Arc::new(env.connection.clone()));
        let repository = SubscriptionRepository::new(env.connection.clone());
        (service, repository, env)
    }

    #[tokio::test]
    async fn test_get_subscription() {
        let (service, repository, _env) = setup_test();

        repository
            .store_subscription(&sample_subscription(
                "subscription::100",
                "2026-02-01T10:00:00Z",
            ))
            .await
            .expect("Failed to store subscription");

        let found = service
            .get_subscription("subscription::100")
            .await
            .expect("Failed to get subscription");
        assert_eq!(found.map(|s| s.customer_name), Some("Asha Verma".to_string()));

        let missing = service
            .get_subscription("subscription::404")
            .await
            .expect("Failed to query subscription");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_subscriptions_newest_first() {
        let (service, repository, _env) = setup_test();

        repository
            .store_subscription(&sample_subscription(
                "subscription::100",
                "2026-02-01T10:00:00Z",
            ))
            .await
            .expect("Failed to store subscription");
        repository
            .store_subscription(&sample_subscription(
                "subscription::200",
                "2026-02-05T10:00:00Z",
            ))
            .await
            .expect("Failed to store subscription");

        let subscriptions = service
            .list_subscriptions()
            .await
            .expect("Failed to list subscriptions");
        assert_eq!(subscriptions.len(), 2);
        assert_eq!(subscriptions[0].id, "subscription::200");
        assert_eq!(subscriptions[1].id, "subscription::100");
    }
}
