use crate::backend::domain::models::Subscription;
use crate::backend::io::rest::mappers::draft_mapper::DraftMapper;
use shared::{SubscriptionDto, SubscriptionListResponse};

pub struct SubscriptionMapper;

impl SubscriptionMapper {
    /// Convert a stored subscription to its wire form
    pub fn to_dto(subscription: &Subscription) -> SubscriptionDto {
        SubscriptionDto {
            id: subscription.id.clone(),
            customer_id: subscription.customer_id.clone(),
            customer_name: subscription.customer_name.clone(),
            vehicle_type: subscription.vehicle_type,
            start_date: DraftMapper::date_to_dto(subscription.start_date),
            months_duration: subscription.months_duration,
            service_area: DraftMapper::service_area_to_dto(&subscription.service_area),
            notes: subscription.notes.clone(),
            packages: subscription
                .packages
                .iter()
                .map(DraftMapper::package_line_to_dto)
                .collect(),
            addons: subscription
                .addons
                .iter()
                .map(DraftMapper::addon_line_to_dto)
                .collect(),
            wash_schedules: subscription
                .wash_schedules
                .iter()
                .map(DraftMapper::slot_to_dto)
                .collect(),
            payment_method: subscription.payment_method,
            payment_status: subscription.payment_status,
            amount_paid: subscription.amount_paid,
            payment_date: subscription.payment_date.map(DraftMapper::date_to_dto),
            payment_notes: subscription.payment_notes.clone(),
            totals: DraftMapper::totals_to_dto(&subscription.totals),
            created_at: subscription.created_at.clone(),
            updated_at: subscription.updated_at.clone(),
        }
    }

    pub fn to_list_response(subscriptions: Vec<Subscription>) -> SubscriptionListResponse {
        SubscriptionListResponse {
            subscriptions: subscriptions.iter().map(Self::to_dto).collect(),
        }
    }
}
