//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod wizard {
    use chrono::{NaiveDate, NaiveTime};

    use crate::backend::domain::models::{
        PricingTotals, ScheduleRule, Subscription, SubscriptionDraft,
    };
    use crate::backend::domain::wizard::{WizardMode, WizardStep};
    use shared::{
        AddonApplication, DiscountType, PaymentMethod, PaymentStatus, ValidationErrors,
        VehicleType,
    };

    /// Input for opening the wizard. A subscription ID switches the session
    /// to edit mode; without one the wizard resumes a cached draft or
    /// starts fresh.
    #[derive(Debug, Clone, Default)]
    pub struct OpenWizardCommand {
        pub subscription_id: Option<String>,
    }

    /// One mutation of the open draft. Dates and times arrive here already
    /// parsed; the REST mapper owns the string formats.
    #[derive(Debug, Clone)]
    pub enum DraftAction {
        SetCustomer {
            customer_id: String,
        },
        SetVehicleType {
            vehicle_type: VehicleType,
        },
        SetMonthsDuration {
            months: u32,
        },
        SetStartDate {
            date: NaiveDate,
        },
        SetServiceArea {
            area: String,
            map_url: Option<String>,
        },
        SetNotes {
            notes: Option<String>,
        },
        AddPackage {
            package_id: String,
        },
        UpdatePackage {
            index: usize,
            quantity: Option<u32>,
            discount_type: Option<DiscountType>,
            discount_value: Option<f64>,
            notes: Option<String>,
        },
        RemovePackage {
            index: usize,
        },
        AddAddon {
            addon_id: String,
        },
        SetAddonApplication {
            index: usize,
            application: AddonApplication,
        },
        SetAddonWashNumbers {
            index: usize,
            wash_numbers: Vec<u32>,
        },
        UpdateAddonDiscount {
            index: usize,
            discount_type: DiscountType,
            discount_value: f64,
        },
        RemoveAddon {
            index: usize,
        },
        UseManualSchedules,
        ApplyScheduleRule {
            rule: ScheduleRule,
        },
        UpdateWashSlot {
            index: usize,
            date: Option<NaiveDate>,
            time_from: Option<NaiveTime>,
            time_to: Option<NaiveTime>,
        },
        SetPayment {
            payment_method: Option<PaymentMethod>,
            payment_status: Option<PaymentStatus>,
            amount_paid: Option<f64>,
            payment_date: Option<NaiveDate>,
            payment_notes: Option<String>,
        },
    }

    /// Full view of the open session, rebuilt after every operation so the
    /// REST layer never has to ask twice.
    #[derive(Debug, Clone)]
    pub struct WizardSnapshot {
        pub step: WizardStep,
        pub mode: WizardMode,
        pub draft: SubscriptionDraft,
        pub totals: PricingTotals,
        pub total_required_washes: u32,
        pub wash_numbers_by_month: Vec<Vec<u32>>,
        pub schedules_locked: bool,
        pub payment_locked: bool,
    }

    /// Result of applying a draft action.
    #[derive(Debug, Clone)]
    pub struct ApplyActionResult {
        pub snapshot: WizardSnapshot,
        /// Advisory only, e.g. a recurrence rule that ran out of term.
        pub warning: Option<String>,
    }

    /// Result of a next/back navigation attempt.
    #[derive(Debug, Clone)]
    pub struct AdvanceResult {
        pub advanced: bool,
        pub snapshot: WizardSnapshot,
        pub errors: ValidationErrors,
    }

    /// Result of a submission attempt.
    #[derive(Debug, Clone)]
    pub enum SubmitOutcome {
        /// The subscription was persisted and the session closed.
        Completed(Subscription),
        /// Validation blocked the submission; the session stays open.
        Rejected(ValidationErrors),
    }
}

pub mod customers {
    use crate::backend::domain::models::Customer;

    /// Query parameters for the debounced customer search.
    #[derive(Debug, Clone, Default)]
    pub struct CustomerSearchQuery {
        pub query: String,
        pub limit: Option<usize>,
    }

    /// Result of a customer search.
    #[derive(Debug, Clone)]
    pub struct CustomerSearchResult {
        pub customers: Vec<Customer>,
        /// True when a newer keystroke made this request obsolete; the
        /// customer list is empty in that case.
        pub superseded: bool,
    }
}

pub mod catalog {
    use shared::VehicleType;

    /// Query parameters for listing wash packages.
    #[derive(Debug, Clone, Default)]
    pub struct PackageListQuery {
        pub vehicle_type: Option<VehicleType>,
    }
}
