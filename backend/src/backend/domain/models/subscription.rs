use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    AddonApplication, DiscountType, PaymentMethod, PaymentStatus, ScheduleMode, VehicleType,
};

/// One package line in a draft or stored subscription. The price-relevant
/// fields are snapshots taken when the package was added; catalog edits
/// after that point do not reprice existing lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageLineItem {
    pub package_id: String,
    pub package_name: String,
    pub vehicle_type: VehicleType,
    pub quantity: u32,
    pub unit_price: f64,
    pub max_washes_per_month: u32,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: f64,
    pub price: f64,
    pub notes: Option<String>,
}

impl PackageLineItem {
    /// Fresh line for a just-selected package, quantity 1, no discount
    pub fn from_package(package: &super::WashPackage) -> Self {
        Self {
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            vehicle_type: package.vehicle_type,
            quantity: 1,
            unit_price: package.subscription_price,
            max_washes_per_month: package.max_washes_per_month,
            discount_type: DiscountType::Fixed,
            discount_value: 0.0,
            discount_amount: 0.0,
            price: 0.0,
            notes: None,
        }
    }
}

/// One add-on line. `applicable_wash_numbers` holds 1-based wash numbers;
/// for `AllWashes` lines the set is rewritten to the full range on every
/// pricing pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddonLineItem {
    pub addon_id: String,
    pub addon_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub application: AddonApplication,
    pub applicable_wash_numbers: Vec<u32>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: f64,
    pub price: f64,
}

impl AddonLineItem {
    pub fn from_addon(addon: &super::WashAddon) -> Self {
        Self {
            addon_id: addon.id.clone(),
            addon_name: addon.name.clone(),
            quantity: 1,
            unit_price: addon.price,
            application: AddonApplication::AllWashes,
            applicable_wash_numbers: Vec::new(),
            discount_type: DiscountType::Fixed,
            discount_value: 0.0,
            discount_amount: 0.0,
            price: 0.0,
        }
    }
}

/// One slot in the wash calendar. Empty fields are allowed while the
/// operator is still filling the schedule in; validation demands complete
/// slots before the wizard can move past the schedule step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WashSlot {
    pub date: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    /// True only while the slot is untouched rule output. The first manual
    /// edit clears it and nothing sets it back.
    pub is_auto_generated: bool,
}

impl WashSlot {
    pub fn empty() -> Self {
        Self {
            date: None,
            time_from: None,
            time_to: None,
            is_auto_generated: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time_from.is_some() && self.time_to.is_some()
    }
}

/// Recurrence rule for generating wash slots. Weekdays are numbered
/// 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ScheduleRule {
    Weekly {
        weekdays: Vec<u8>,
        time_from: NaiveTime,
        time_to: NaiveTime,
    },
    Interval {
        interval_weeks: u8,
        weekday: u8,
        time_from: NaiveTime,
        time_to: NaiveTime,
    },
}

impl ScheduleRule {
    pub fn validate(&self) -> Result<(), ScheduleRuleError> {
        match self {
            ScheduleRule::Weekly {
                weekdays,
                time_from,
                time_to,
            } => {
                if weekdays.is_empty() {
                    return Err(ScheduleRuleError::EmptyWeekdaySet);
                }
                if let Some(&bad) = weekdays.iter().find(|&&d| d > 6) {
                    return Err(ScheduleRuleError::InvalidWeekday(bad));
                }
                if time_to <= time_from {
                    return Err(ScheduleRuleError::EndNotAfterStart);
                }
                Ok(())
            }
            ScheduleRule::Interval {
                interval_weeks,
                weekday,
                time_from,
                time_to,
            } => {
                if !(1..=4).contains(interval_weeks) {
                    return Err(ScheduleRuleError::InvalidIntervalWeeks(*interval_weeks));
                }
                if *weekday > 6 {
                    return Err(ScheduleRuleError::InvalidWeekday(*weekday));
                }
                if time_to <= time_from {
                    return Err(ScheduleRuleError::EndNotAfterStart);
                }
                Ok(())
            }
        }
    }

    pub fn default_times(&self) -> (NaiveTime, NaiveTime) {
        match self {
            ScheduleRule::Weekly {
                time_from, time_to, ..
            }
            | ScheduleRule::Interval {
                time_from, time_to, ..
            } => (*time_from, *time_to),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleRuleError {
    #[error("Pick at least one weekday")]
    EmptyWeekdaySet,
    #[error("Weekday {0} is out of range (0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(u8),
    #[error("Interval must be between 1 and 4 weeks, got {0}")]
    InvalidIntervalWeeks(u8),
    #[error("End time must be after start time")]
    EndNotAfterStart,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceArea {
    pub area: String,
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentDetails {
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub amount_paid: f64,
    pub payment_date: Option<NaiveDate>,
    pub payment_notes: Option<String>,
}

/// The in-progress subscription the wizard mutates. Serialized as-is into
/// the draft cache so an interrupted session can resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionDraft {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub months_duration: u32,
    pub start_date: Option<NaiveDate>,
    pub service_area: ServiceArea,
    pub notes: Option<String>,
    pub packages: Vec<PackageLineItem>,
    pub addons: Vec<AddonLineItem>,
    pub wash_schedules: Vec<WashSlot>,
    pub schedule_mode: ScheduleMode,
    pub schedule_rule: Option<ScheduleRule>,
    pub payment: PaymentDetails,
}

impl SubscriptionDraft {
    pub fn new() -> Self {
        Self {
            customer_id: None,
            customer_name: None,
            vehicle_type: None,
            months_duration: 1,
            start_date: None,
            service_area: ServiceArea::default(),
            notes: None,
            packages: Vec::new(),
            addons: Vec::new(),
            wash_schedules: Vec::new(),
            schedule_mode: ScheduleMode::Manual,
            schedule_rule: None,
            payment: PaymentDetails::default(),
        }
    }
}

impl Default for SubscriptionDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// What the draft cache persists: the draft plus its expiry bookkeeping.
/// The wizard, not the storage layer, decides whether a loaded envelope is
/// still usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftEnvelope {
    pub draft: SubscriptionDraft,
    /// RFC 3339 timestamp
    pub saved_at: String,
    /// RFC 3339 timestamp; refreshed on every save (rolling expiry)
    pub expires_at: String,
}

impl DraftEnvelope {
    pub fn new(draft: SubscriptionDraft, now: DateTime<Utc>, ttl_hours: i64) -> Self {
        Self {
            draft,
            saved_at: now.to_rfc3339(),
            expires_at: (now + Duration::hours(ttl_hours)).to_rfc3339(),
        }
    }

    /// An unreadable expiry counts as expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expiry) => now >= expiry.with_timezone(&Utc),
            Err(_) => true,
        }
    }
}

/// Money summary for a draft or stored subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PricingTotals {
    pub packages_total: f64,
    pub addons_total: f64,
    pub subtotal: f64,
    pub tax_percentage: f64,
    pub tax_amount: f64,
    pub round_off: f64,
    pub grand_total: f64,
    pub per_month: f64,
}

/// A submitted subscription as persisted. Every wash slot is complete by
/// the time one of these exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub vehicle_type: VehicleType,
    pub start_date: NaiveDate,
    pub months_duration: u32,
    pub service_area: ServiceArea,
    pub notes: Option<String>,
    pub packages: Vec<PackageLineItem>,
    pub addons: Vec<AddonLineItem>,
    pub wash_schedules: Vec<WashSlot>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub amount_paid: f64,
    pub payment_date: Option<NaiveDate>,
    pub payment_notes: Option<String>,
    pub totals: PricingTotals,
    pub created_at: String,
    pub updated_at: String,
}

impl Subscription {
    pub fn generate_id(now_millis: u64) -> String {
        format!("subscription::{}", now_millis)
    }

    /// Wash calendar freezes as soon as any money has moved
    pub fn schedules_locked(&self) -> bool {
        !self.payment_status.is_pending()
    }

    /// Payment details freeze once the subscription is fully settled
    pub fn payment_locked(&self) -> bool {
        !self.payment_status.allows_payment_edit()
    }
}
