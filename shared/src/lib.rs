use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Vehicle categories a wash package can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Hatchback,
    Sedan,
    Suv,
    Luxury,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Hatchback => "hatchback",
            VehicleType::Sedan => "sedan",
            VehicleType::Suv => "suv",
            VehicleType::Luxury => "luxury",
        }
    }

    pub fn all() -> [VehicleType; 4] {
        [
            VehicleType::Hatchback,
            VehicleType::Sedan,
            VehicleType::Suv,
            VehicleType::Luxury,
        ]
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hatchback" => Ok(VehicleType::Hatchback),
            "sedan" => Ok(VehicleType::Sedan),
            "suv" => Ok(VehicleType::Suv),
            "luxury" => Ok(VehicleType::Luxury),
            other => Err(format!("Unknown vehicle type: {}", other)),
        }
    }
}

/// How a line-item discount is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Flat amount subtracted from the line subtotal
    Fixed,
    /// Percentage of the line subtotal
    Percentage,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "fixed",
            DiscountType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(DiscountType::Fixed),
            "percentage" => Ok(DiscountType::Percentage),
            other => Err(format!("Unknown discount type: {}", other)),
        }
    }
}

/// Which washes of the subscription an add-on applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonApplication {
    /// Every wash in the subscription; the wash-number set tracks the
    /// required total automatically
    AllWashes,
    /// Only the wash numbers the operator picked
    SpecificWashes,
}

impl AddonApplication {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonApplication::AllWashes => "all_washes",
            AddonApplication::SpecificWashes => "specific_washes",
        }
    }
}

impl fmt::Display for AddonApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AddonApplication {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_washes" => Ok(AddonApplication::AllWashes),
            "specific_washes" => Ok(AddonApplication::SpecificWashes),
            other => Err(format!("Unknown addon application: {}", other)),
        }
    }
}

/// Accepted payment instruments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

/// Lifecycle of the money side of a subscription. The status gates what an
/// operator may still edit: schedules freeze once the status leaves
/// `pending`, payment fields freeze once it leaves `pending`/`partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PaymentStatus::Pending)
    }

    /// Payment details stay editable only while money can still move
    pub fn allows_payment_edit(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Partial)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// Whether the wash calendar is typed in by hand or produced from a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Manual,
    Rule,
}

/// Ordered field -> message map produced by the wizard step validators.
/// Field keys use dotted paths for collection entries, e.g.
/// `schedules.3.date` or `packages.0.quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Package ID in format: "package::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashPackageDto {
    pub id: String,
    pub name: String,
    pub vehicle_type: VehicleType,
    /// Price for one month of this package
    pub subscription_price: f64,
    /// How many washes one month of this package includes
    pub max_washes_per_month: u32,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Addon ID in format: "addon::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashAddonDto {
    pub id: String,
    pub name: String,
    /// Price per wash the add-on is applied to
    pub price: f64,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Customer ID in format: "customer::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Where the washes happen (free text plus an optional map link)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceAreaDto {
    pub area: String,
    pub map_url: Option<String>,
}

/// One package line in the draft. Pricing figures are snapshots taken when
/// the package was added; later catalog edits do not touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageLineItemDto {
    pub package_id: String,
    pub package_name: String,
    pub vehicle_type: VehicleType,
    /// Carried for the record but never multiplied into the price; the
    /// months duration covers repetition
    pub quantity: u32,
    /// Monthly price snapshotted from the catalog
    pub unit_price: f64,
    /// Monthly wash count snapshotted from the catalog
    pub max_washes_per_month: u32,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    /// Computed discount in currency, before the zero floor on price
    pub discount_amount: f64,
    /// unit_price x months - discount, floored at 0
    pub price: f64,
    pub notes: Option<String>,
}

/// One add-on line in the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonLineItemDto {
    pub addon_id: String,
    pub addon_name: String,
    pub quantity: u32,
    /// Per-wash price snapshotted from the catalog
    pub unit_price: f64,
    pub application: AddonApplication,
    /// Wash numbers (1-based) this add-on covers
    pub applicable_wash_numbers: Vec<u32>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: f64,
    /// unit_price x wash count - discount, floored at 0
    pub price: f64,
}

/// One slot in the wash calendar. All fields except the flag are optional
/// while the operator is still filling the schedule in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashSlotDto {
    /// "YYYY-MM-DD"
    pub date: Option<String>,
    /// "HH:MM", 24-hour
    pub time_from: Option<String>,
    /// "HH:MM", 24-hour, strictly after time_from
    pub time_to: Option<String>,
    /// True while the slot is untouched rule output; flips to false forever
    /// on the first manual edit
    pub is_auto_generated: bool,
}

impl WashSlotDto {
    pub fn empty() -> Self {
        Self {
            date: None,
            time_from: None,
            time_to: None,
            is_auto_generated: false,
        }
    }
}

/// Recurrence rule for generating the wash calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleRuleDto {
    /// Wash on each listed weekday, every week. 0 = Sunday .. 6 = Saturday.
    Weekly {
        weekdays: Vec<u8>,
        time_from: String,
        time_to: String,
    },
    /// Wash every N weeks on one anchor weekday. 1 <= interval_weeks <= 4.
    Interval {
        interval_weeks: u8,
        weekday: u8,
        time_from: String,
        time_to: String,
    },
}

/// Payment fields collected on the final wizard step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentDetailsDto {
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub amount_paid: f64,
    /// "YYYY-MM-DD"
    pub payment_date: Option<String>,
    pub payment_notes: Option<String>,
}

/// The whole in-progress subscription as the wizard sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDraftDto {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub months_duration: u32,
    /// "YYYY-MM-DD"
    pub start_date: Option<String>,
    pub service_area: ServiceAreaDto,
    pub notes: Option<String>,
    pub packages: Vec<PackageLineItemDto>,
    pub addons: Vec<AddonLineItemDto>,
    pub wash_schedules: Vec<WashSlotDto>,
    pub schedule_mode: ScheduleMode,
    /// Last rule the operator applied, kept so a resumed draft can re-open
    /// the generator with the same settings
    pub schedule_rule: Option<ScheduleRuleDto>,
    pub payment: PaymentDetailsDto,
}

/// Money summary recomputed after every draft mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PricingTotalsDto {
    pub packages_total: f64,
    pub addons_total: f64,
    pub subtotal: f64,
    pub tax_percentage: f64,
    pub tax_amount: f64,
    /// Signed difference between the rounded grand total and the raw sum;
    /// zero when no rounding happened
    pub round_off: f64,
    pub grand_total: f64,
    /// grand_total / months, informational only
    pub per_month: f64,
}

/// Subscription ID in format: "subscription::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDto {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub vehicle_type: VehicleType,
    /// "YYYY-MM-DD"
    pub start_date: String,
    pub months_duration: u32,
    pub service_area: ServiceAreaDto,
    pub notes: Option<String>,
    pub packages: Vec<PackageLineItemDto>,
    pub addons: Vec<AddonLineItemDto>,
    pub wash_schedules: Vec<WashSlotDto>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub amount_paid: f64,
    /// "YYYY-MM-DD"
    pub payment_date: Option<String>,
    pub payment_notes: Option<String>,
    pub totals: PricingTotalsDto,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

/// Request to open the wizard, fresh or against an existing subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OpenWizardRequest {
    /// When set, the wizard opens in edit mode hydrated from this
    /// subscription and draft auto-save is suppressed
    pub subscription_id: Option<String>,
}

/// Snapshot of the live wizard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardStateResponse {
    /// 1-based step number
    pub step: u8,
    pub step_name: String,
    /// "new" or "edit"
    pub mode: String,
    pub editing_subscription_id: Option<String>,
    pub draft: SubscriptionDraftDto,
    pub totals: PricingTotalsDto,
    /// Sum over package lines of max_washes_per_month x months
    pub total_required_washes: u32,
    /// Wash numbers grouped per calendar month of the term
    pub wash_numbers_by_month: Vec<Vec<u32>>,
    pub schedules_locked: bool,
    pub payment_locked: bool,
}

/// A single mutation of the draft. Every action triggers a full pricing
/// recompute before the new state is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DraftActionRequest {
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
        /// "YYYY-MM-DD"
        date: String,
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
        rule: ScheduleRuleDto,
    },
    UpdateWashSlot {
        index: usize,
        date: Option<String>,
        time_from: Option<String>,
        time_to: Option<String>,
    },
    SetPayment {
        payment_method: Option<PaymentMethod>,
        payment_status: Option<PaymentStatus>,
        amount_paid: Option<f64>,
        payment_date: Option<String>,
        payment_notes: Option<String>,
    },
}

/// Response after applying a draft action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftActionResponse {
    pub state: WizardStateResponse,
    /// Advisory only, e.g. a rule that filled fewer slots than required
    pub warning: Option<String>,
}

/// Response after a next/back navigation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceWizardResponse {
    /// False when validation blocked the transition
    pub advanced: bool,
    pub state: WizardStateResponse,
    pub errors: ValidationErrors,
}

/// Response after a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitWizardResponse {
    pub subscription_id: String,
    pub success_message: String,
}

/// Response after discarding the wizard session and any stored draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardWizardResponse {
    pub success_message: String,
}

/// Response for the package catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageListResponse {
    pub packages: Vec<WashPackageDto>,
}

/// Response for the add-on catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonListResponse {
    pub addons: Vec<WashAddonDto>,
}

/// Response for a debounced customer search. A request that lost the race
/// to a newer keystroke comes back empty with `superseded` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSearchResponse {
    pub customers: Vec<CustomerDto>,
    pub superseded: bool,
}

/// Response for the subscription listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionDto>,
}

/// The bookable time-slot universe, raw and display-formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotsResponse {
    /// "HH:MM", 24-hour
    pub slots: Vec<String>,
    /// Matching 12-hour labels, e.g. "02:30 PM"
    pub display: Vec<String>,
}

impl WashPackageDto {
    /// Generate a package ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("package::{}", epoch_millis)
    }
}

impl WashAddonDto {
    /// Generate an addon ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("addon::{}", epoch_millis)
    }
}

impl CustomerDto {
    /// Generate a customer ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("customer::{}", epoch_millis)
    }
}

impl SubscriptionDto {
    /// Generate a subscription ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("subscription::{}", epoch_millis)
    }

    /// Parse a subscription ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, SubscriptionIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "subscription" {
            return Err(SubscriptionIdError::InvalidFormat);
        }

        parts[1]
            .parse::<u64>()
            .map_err(|_| SubscriptionIdError::InvalidTimestamp)
    }

    /// Extract timestamp from subscription ID for sorting
    pub fn extract_timestamp(&self) -> Result<u64, SubscriptionIdError> {
        Self::parse_id(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for SubscriptionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionIdError::InvalidFormat => write!(f, "Invalid subscription ID format"),
            SubscriptionIdError::InvalidTimestamp => {
                write!(f, "Invalid timestamp in subscription ID")
            }
        }
    }
}

impl std::error::Error for SubscriptionIdError {}

impl SubscriptionDraftDto {
    /// A blank draft parked on sensible defaults: one month, manual
    /// scheduling, nothing selected yet
    pub fn empty() -> Self {
        Self {
            customer_id: None,
            customer_name: None,
            vehicle_type: None,
            months_duration: 1,
            start_date: None,
            service_area: ServiceAreaDto::default(),
            notes: None,
            packages: Vec::new(),
            addons: Vec::new(),
            wash_schedules: Vec::new(),
            schedule_mode: ScheduleMode::Manual,
            schedule_rule: None,
            payment: PaymentDetailsDto::default(),
        }
    }
}
