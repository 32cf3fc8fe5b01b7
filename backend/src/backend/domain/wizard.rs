//! Subscription wizard domain logic.
//!
//! The wizard walks an operator through five steps (customer and duration,
//! packages, add-ons, wash schedules, payment and summary) and owns the one
//! in-progress draft the process allows. Field problems are reported as
//! `ValidationErrors` data and never abort an operation; sequencing problems
//! (no open session, locked schedules, unknown catalog IDs) surface as
//! `WizardError`.
//!
//! New-mode sessions are cached to disk after every navigation so an
//! interrupted session can resume within the expiry window. Edit-mode
//! sessions never touch the cache.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::backend::domain::commands::wizard::{
    AdvanceResult, ApplyActionResult, DraftAction, OpenWizardCommand, SubmitOutcome,
    WizardSnapshot,
};
use crate::backend::domain::models::{
    AddonLineItem, DraftEnvelope, PackageLineItem, PaymentDetails, PricingTotals, ServiceArea,
    Subscription, SubscriptionDraft,
};
use crate::backend::domain::pricing::PricingService;
use crate::backend::domain::schedule::{self, ScheduleService};
use crate::backend::storage::csv::{
    AddonRepository, CsvConnection, CustomerRepository, DraftRepository, PackageRepository,
    SubscriptionRepository,
};
use crate::backend::storage::{
    AddonStorage, CustomerStorage, DraftStorage, PackageStorage, SubscriptionStorage,
};
use shared::{AddonApplication, PaymentStatus, ScheduleMode, ValidationErrors};

/// The five wizard steps, in order. Numbering is 1-based to match the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    CustomerAndDuration,
    Packages,
    Addons,
    Schedules,
    PaymentAndSummary,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::CustomerAndDuration => 1,
            WizardStep::Packages => 2,
            WizardStep::Addons => 3,
            WizardStep::Schedules => 4,
            WizardStep::PaymentAndSummary => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::CustomerAndDuration => "customer_and_duration",
            WizardStep::Packages => "packages",
            WizardStep::Addons => "addons",
            WizardStep::Schedules => "schedules",
            WizardStep::PaymentAndSummary => "payment_and_summary",
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CustomerAndDuration => Some(WizardStep::Packages),
            WizardStep::Packages => Some(WizardStep::Addons),
            WizardStep::Addons => Some(WizardStep::Schedules),
            WizardStep::Schedules => Some(WizardStep::PaymentAndSummary),
            WizardStep::PaymentAndSummary => None,
        }
    }

    fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::CustomerAndDuration => None,
            WizardStep::Packages => Some(WizardStep::CustomerAndDuration),
            WizardStep::Addons => Some(WizardStep::Packages),
            WizardStep::Schedules => Some(WizardStep::Addons),
            WizardStep::PaymentAndSummary => Some(WizardStep::Schedules),
        }
    }
}

/// How the wizard was opened. Edit mode carries the payment status of the
/// stored subscription because both gating rules derive from it.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardMode {
    New,
    Edit {
        subscription_id: String,
        payment_status: PaymentStatus,
    },
}

impl WizardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardMode::New => "new",
            WizardMode::Edit { .. } => "edit",
        }
    }

    pub fn editing_subscription_id(&self) -> Option<&str> {
        match self {
            WizardMode::New => None,
            WizardMode::Edit {
                subscription_id, ..
            } => Some(subscription_id),
        }
    }

    /// Schedules freeze as soon as the edited subscription has taken any
    /// payment.
    pub fn schedules_locked(&self) -> bool {
        match self {
            WizardMode::New => false,
            WizardMode::Edit { payment_status, .. } => !payment_status.is_pending(),
        }
    }

    /// Payment details freeze once the subscription is fully paid or
    /// refunded.
    pub fn payment_locked(&self) -> bool {
        match self {
            WizardMode::New => false,
            WizardMode::Edit { payment_status, .. } => !payment_status.allows_payment_edit(),
        }
    }
}

/// Operator-sequencing failures. Field-level problems are reported as
/// `ValidationErrors` data instead.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("No wizard session is open")]
    NotOpen,
    #[error("Submission is only available on the final step (currently on step {0})")]
    WrongStep(u8),
    #[error("Subscription not found: {0}")]
    UnknownSubscription(String),
    #[error("Customer not found: {0}")]
    UnknownCustomer(String),
    #[error("Package not found: {0}")]
    UnknownPackage(String),
    #[error("Add-on not found: {0}")]
    UnknownAddon(String),
    #[error("No {kind} at index {index}")]
    LineOutOfRange { kind: &'static str, index: usize },
    #[error("Months duration must be between 1 and 12, got {0}")]
    InvalidMonthsDuration(u32),
    #[error("A start date is required before schedules can be generated")]
    MissingStartDate,
    #[error("Wash schedules are locked once payment has been taken")]
    SchedulesLocked,
    #[error("Payment details are locked for this subscription")]
    PaymentLocked,
    #[error("Draft is missing required field: {0}")]
    IncompleteDraft(&'static str),
}

/// Tuning for the interrupted-session draft cache
#[derive(Debug, Clone)]
pub struct DraftCacheConfig {
    /// Hours a cached draft stays resumable; the clock restarts on every save
    pub ttl_hours: i64,
}

impl Default for DraftCacheConfig {
    fn default() -> Self {
        Self { ttl_hours: 24 }
    }
}

/// One open wizard run. The process holds at most one.
#[derive(Debug, Clone)]
struct WizardSession {
    step: WizardStep,
    mode: WizardMode,
    draft: SubscriptionDraft,
    /// Creation stamp of the subscription being edited, preserved across a
    /// resubmit
    editing_created_at: Option<String>,
}

/// Service driving the five-step subscription wizard
#[derive(Clone)]
pub struct WizardService {
    session: Arc<Mutex<Option<WizardSession>>>,
    pricing: PricingService,
    schedule: ScheduleService,
    package_repository: PackageRepository,
    addon_repository: AddonRepository,
    customer_repository: CustomerRepository,
    subscription_repository: SubscriptionRepository,
    draft_repository: DraftRepository,
    config: DraftCacheConfig,
}

impl WizardService {
    /// Create a new WizardService with default pricing and cache tuning
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self::with_config(csv_conn, PricingService::new(), DraftCacheConfig::default())
    }

    /// Create a WizardService with explicit pricing and cache tuning
    pub fn with_config(
        csv_conn: Arc<CsvConnection>,
        pricing: PricingService,
        config: DraftCacheConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            pricing,
            schedule: ScheduleService::new(),
            package_repository: PackageRepository::new((*csv_conn).clone()),
            addon_repository: AddonRepository::new((*csv_conn).clone()),
            customer_repository: CustomerRepository::new((*csv_conn).clone()),
            subscription_repository: SubscriptionRepository::new((*csv_conn).clone()),
            draft_repository: DraftRepository::new((*csv_conn).clone()),
            config,
        }
    }

    /// Open a wizard session, replacing any session already open.
    ///
    /// With a subscription ID the session edits that subscription. Without
    /// one, a cached unexpired draft resumes; otherwise the session starts
    /// from a fresh draft at step 1.
    pub async fn open(&self, command: OpenWizardCommand) -> Result<WizardSnapshot> {
        let (mode, draft, editing_created_at) = match command.subscription_id {
            Some(subscription_id) => {
                let subscription = self
                    .subscription_repository
                    .get_subscription(&subscription_id)
                    .await?
                    .ok_or_else(|| WizardError::UnknownSubscription(subscription_id.clone()))?;
                info!(
                    "🧭 Opening wizard in edit mode for {} (payment status: {})",
                    subscription_id,
                    subscription.payment_status.as_str()
                );
                let mode = WizardMode::Edit {
                    subscription_id,
                    payment_status: subscription.payment_status,
                };
                let created_at = subscription.created_at.clone();
                (mode, draft_from_subscription(subscription), Some(created_at))
            }
            None => {
                let draft = self.resume_or_fresh().await;
                (WizardMode::New, draft, None)
            }
        };

        let mut guard = self.session.lock().unwrap();
        if guard.is_some() {
            warn!("Replacing an already-open wizard session");
        }
        let mut session = WizardSession {
            step: WizardStep::CustomerAndDuration,
            mode,
            draft,
            editing_created_at,
        };
        let snapshot = self.refresh_and_snapshot(&mut session);
        *guard = Some(session);
        Ok(snapshot)
    }

    /// Snapshot of the open session
    pub fn state(&self) -> Result<WizardSnapshot> {
        let mut guard = self.session.lock().unwrap();
        let session = guard.as_mut().ok_or(WizardError::NotOpen)?;
        Ok(self.refresh_and_snapshot(session))
    }

    /// Apply one draft action to the open session. Catalog and customer
    /// lookups run before the session lock is taken; the lock is sync and
    /// never held across an await.
    pub async fn apply(&self, action: DraftAction) -> Result<ApplyActionResult> {
        debug!("🧭 Applying draft action: {:?}", action);

        match action {
            DraftAction::SetCustomer { customer_id } => {
                let customer = self
                    .customer_repository
                    .get_customer(&customer_id)
                    .await?
                    .ok_or_else(|| WizardError::UnknownCustomer(customer_id))?;
                self.mutate(|session| {
                    session.draft.customer_id = Some(customer.id.clone());
                    session.draft.customer_name = Some(customer.name.clone());
                    Ok(None)
                })
            }
            DraftAction::AddPackage { package_id } => {
                let package = self
                    .package_repository
                    .get_package(&package_id)
                    .await?
                    .ok_or_else(|| WizardError::UnknownPackage(package_id))?;
                self.mutate(|session| {
                    session
                        .draft
                        .packages
                        .push(PackageLineItem::from_package(&package));
                    Ok(None)
                })
            }
            DraftAction::AddAddon { addon_id } => {
                let addon = self
                    .addon_repository
                    .get_addon(&addon_id)
                    .await?
                    .ok_or_else(|| WizardError::UnknownAddon(addon_id))?;
                self.mutate(|session| {
                    session.draft.addons.push(AddonLineItem::from_addon(&addon));
                    Ok(None)
                })
            }
            DraftAction::SetVehicleType { vehicle_type } => self.mutate(|session| {
                session.draft.vehicle_type = Some(vehicle_type);
                Ok(None)
            }),
            DraftAction::SetMonthsDuration { months } => self.mutate(|session| {
                if !(1..=12).contains(&months) {
                    return Err(WizardError::InvalidMonthsDuration(months).into());
                }
                session.draft.months_duration = months;
                // A new term length restarts quantity planning from scratch.
                for item in &mut session.draft.packages {
                    item.quantity = 1;
                }
                Ok(None)
            }),
            DraftAction::SetStartDate { date } => self.mutate(|session| {
                session.draft.start_date = Some(date);
                Ok(None)
            }),
            DraftAction::SetServiceArea { area, map_url } => self.mutate(|session| {
                session.draft.service_area = ServiceArea { area, map_url };
                Ok(None)
            }),
            DraftAction::SetNotes { notes } => self.mutate(|session| {
                session.draft.notes = notes;
                Ok(None)
            }),
            DraftAction::UpdatePackage {
                index,
                quantity,
                discount_type,
                discount_value,
                notes,
            } => self.mutate(|session| {
                let item = session.draft.packages.get_mut(index).ok_or(
                    WizardError::LineOutOfRange {
                        kind: "package line",
                        index,
                    },
                )?;
                if let Some(quantity) = quantity {
                    item.quantity = quantity;
                }
                if let Some(discount_type) = discount_type {
                    item.discount_type = discount_type;
                }
                if let Some(discount_value) = discount_value {
                    item.discount_value = discount_value;
                }
                if let Some(notes) = notes {
                    item.notes = Some(notes);
                }
                Ok(None)
            }),
            DraftAction::RemovePackage { index } => self.mutate(|session| {
                if index >= session.draft.packages.len() {
                    return Err(WizardError::LineOutOfRange {
                        kind: "package line",
                        index,
                    }
                    .into());
                }
                session.draft.packages.remove(index);
                Ok(None)
            }),
            DraftAction::SetAddonApplication { index, application } => self.mutate(|session| {
                let addon = session.draft.addons.get_mut(index).ok_or(
                    WizardError::LineOutOfRange {
                        kind: "add-on line",
                        index,
                    },
                )?;
                addon.application = application;
                if application == AddonApplication::SpecificWashes {
                    // The operator re-selects washes from a clean slate;
                    // AllWashes sets are rebuilt by the pricing pass.
                    addon.applicable_wash_numbers.clear();
                }
                Ok(None)
            }),
            DraftAction::SetAddonWashNumbers {
                index,
                mut wash_numbers,
            } => self.mutate(|session| {
                let addon = session.draft.addons.get_mut(index).ok_or(
                    WizardError::LineOutOfRange {
                        kind: "add-on line",
                        index,
                    },
                )?;
                wash_numbers.sort_unstable();
                wash_numbers.dedup();
                addon.applicable_wash_numbers = wash_numbers;
                Ok(None)
            }),
            DraftAction::UpdateAddonDiscount {
                index,
                discount_type,
                discount_value,
            } => self.mutate(|session| {
                let addon = session.draft.addons.get_mut(index).ok_or(
                    WizardError::LineOutOfRange {
                        kind: "add-on line",
                        index,
                    },
                )?;
                addon.discount_type = discount_type;
                addon.discount_value = discount_value;
                Ok(None)
            }),
            DraftAction::RemoveAddon { index } => self.mutate(|session| {
                if index >= session.draft.addons.len() {
                    return Err(WizardError::LineOutOfRange {
                        kind: "add-on line",
                        index,
                    }
                    .into());
                }
                session.draft.addons.remove(index);
                Ok(None)
            }),
            DraftAction::UseManualSchedules => self.mutate(|session| {
                if session.mode.schedules_locked() {
                    return Err(WizardError::SchedulesLocked.into());
                }
                session.draft.schedule_mode = ScheduleMode::Manual;
                Ok(None)
            }),
            DraftAction::ApplyScheduleRule { rule } => self.mutate(|session| {
                if session.mode.schedules_locked() {
                    return Err(WizardError::SchedulesLocked.into());
                }
                let start_date = session
                    .draft
                    .start_date
                    .ok_or(WizardError::MissingStartDate)?;
                let required = schedule::total_required_washes(&session.draft);
                let (slots, shortfall) = self.schedule.generate_from_rule(
                    start_date,
                    session.draft.months_duration,
                    &rule,
                    required,
                )?;
                let produced = slots.len();
                session.draft.wash_schedules = slots;
                session.draft.schedule_mode = ScheduleMode::Rule;
                session.draft.schedule_rule = Some(rule);

                let warning = if shortfall > 0 {
                    Some(format!(
                        "Only {} of {} washes fit before the term ends",
                        produced, required
                    ))
                } else {
                    None
                };
                Ok(warning)
            }),
            DraftAction::UpdateWashSlot {
                index,
                date,
                time_from,
                time_to,
            } => self.mutate(|session| {
                if session.mode.schedules_locked() {
                    return Err(WizardError::SchedulesLocked.into());
                }
                let slot = session.draft.wash_schedules.get_mut(index).ok_or(
                    WizardError::LineOutOfRange {
                        kind: "wash slot",
                        index,
                    },
                )?;
                if let Some(date) = date {
                    slot.date = Some(date);
                }
                if let Some(time_from) = time_from {
                    slot.time_from = Some(time_from);
                }
                if let Some(time_to) = time_to {
                    slot.time_to = Some(time_to);
                }
                slot.is_auto_generated = false;
                Ok(None)
            }),
            DraftAction::SetPayment {
                payment_method,
                payment_status,
                amount_paid,
                payment_date,
                payment_notes,
            } => self.mutate(|session| {
                if session.mode.payment_locked() {
                    return Err(WizardError::PaymentLocked.into());
                }
                let payment = &mut session.draft.payment;
                if let Some(method) = payment_method {
                    payment.payment_method = Some(method);
                }
                if let Some(status) = payment_status {
                    payment.payment_status = Some(status);
                }
                if let Some(amount) = amount_paid {
                    payment.amount_paid = amount;
                }
                if let Some(date) = payment_date {
                    payment.payment_date = Some(date);
                }
                if let Some(notes) = payment_notes {
                    payment.payment_notes = Some(notes);
                }
                Ok(None)
            }),
        }
    }

    /// Validate the current step and advance when it passes. Validation
    /// errors come back as data; the step does not change.
    pub async fn next(&self) -> Result<AdvanceResult> {
        let (result, draft_to_cache) = {
            let mut guard = self.session.lock().unwrap();
            let session = guard.as_mut().ok_or(WizardError::NotOpen)?;

            let errors = self.validate_step(session, session.step);
            let mut advanced = false;
            if errors.is_empty() {
                if let Some(next_step) = session.step.next() {
                    info!(
                        "🧭 Wizard step {} ({}) -> {} ({})",
                        session.step.number(),
                        session.step.name(),
                        next_step.number(),
                        next_step.name()
                    );
                    session.step = next_step;
                    advanced = true;
                }
            } else {
                info!(
                    "Step {} blocked by {} validation errors",
                    session.step.number(),
                    errors.len()
                );
            }

            let snapshot = self.refresh_and_snapshot(session);
            let draft_to_cache = match session.mode {
                WizardMode::New => Some(session.draft.clone()),
                WizardMode::Edit { .. } => None,
            };
            (
                AdvanceResult {
                    advanced,
                    snapshot,
                    errors,
                },
                draft_to_cache,
            )
        };

        if let Some(draft) = draft_to_cache {
            self.cache_draft(&draft).await;
        }

        Ok(result)
    }

    /// Step backwards. Always allowed; nothing is validated.
    pub async fn back(&self) -> Result<AdvanceResult> {
        let (result, draft_to_cache) = {
            let mut guard = self.session.lock().unwrap();
            let session = guard.as_mut().ok_or(WizardError::NotOpen)?;

            let mut advanced = false;
            if let Some(previous) = session.step.previous() {
                session.step = previous;
                advanced = true;
            }

            let snapshot = self.refresh_and_snapshot(session);
            let draft_to_cache = match session.mode {
                WizardMode::New => Some(session.draft.clone()),
                WizardMode::Edit { .. } => None,
            };
            (
                AdvanceResult {
                    advanced,
                    snapshot,
                    errors: ValidationErrors::new(),
                },
                draft_to_cache,
            )
        };

        if let Some(draft) = draft_to_cache {
            self.cache_draft(&draft).await;
        }

        Ok(result)
    }

    /// Submit the finished draft. Only available on the final step; the
    /// schedule and payment validators run once more (honoring locks)
    /// before anything is written. The session closes only after the
    /// subscription is safely stored.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let (subscription, is_new) = {
            let mut guard = self.session.lock().unwrap();
            let session = guard.as_mut().ok_or(WizardError::NotOpen)?;

            if session.step != WizardStep::PaymentAndSummary {
                return Err(WizardError::WrongStep(session.step.number()).into());
            }

            let totals = self.pricing.recompute_draft(&mut session.draft);

            let mut errors = self.validate_step(session, WizardStep::Schedules);
            errors.merge(self.validate_step(session, WizardStep::PaymentAndSummary));
            if !errors.is_empty() {
                warn!("Submission blocked by {} validation errors", errors.len());
                return Ok(SubmitOutcome::Rejected(errors));
            }

            let subscription = build_submission(session, totals, Utc::now())?;
            let is_new = matches!(session.mode, WizardMode::New);
            (subscription, is_new)
        };

        // A storage failure leaves the session and cached draft in place so
        // the operator can retry.
        self.subscription_repository
            .store_subscription(&subscription)
            .await?;

        if is_new {
            if let Err(e) = self.draft_repository.clear_draft().await {
                warn!("Failed to clear the cached draft after submission: {}", e);
            }
        }
        *self.session.lock().unwrap() = None;

        info!(
            "✅ Submitted subscription {} for {}",
            subscription.id, subscription.customer_name
        );
        Ok(SubmitOutcome::Completed(subscription))
    }

    /// Close the session and drop any cached draft. Safe to call when
    /// nothing is open.
    pub async fn discard(&self) -> Result<()> {
        let had_session = self.session.lock().unwrap().take().is_some();
        let removed_draft = self.draft_repository.clear_draft().await?;

        info!(
            "🗑️ Wizard discarded (session was open: {}, cached draft removed: {})",
            had_session, removed_draft
        );
        Ok(())
    }

    /// Run one mutation against the open session and hand back the
    /// refreshed snapshot.
    fn mutate<F>(&self, mutation: F) -> Result<ApplyActionResult>
    where
        F: FnOnce(&mut WizardSession) -> Result<Option<String>>,
    {
        let mut guard = self.session.lock().unwrap();
        let session = guard.as_mut().ok_or(WizardError::NotOpen)?;
        let warning = mutation(session)?;
        let snapshot = self.refresh_and_snapshot(session);
        Ok(ApplyActionResult { snapshot, warning })
    }

    /// Recompute derived state and assemble the outward view. Manual-mode
    /// slot allocation keeps the slot count glued to the required wash
    /// total; rule-generated slots are left alone until the rule is
    /// re-applied.
    fn refresh_and_snapshot(&self, session: &mut WizardSession) -> WizardSnapshot {
        let totals = self.pricing.recompute_draft(&mut session.draft);
        if session.draft.schedule_mode == ScheduleMode::Manual && !session.mode.schedules_locked()
        {
            self.schedule.allocate_manual_slots(&mut session.draft);
        }

        let total_required_washes = schedule::total_required_washes(&session.draft);
        WizardSnapshot {
            step: session.step,
            mode: session.mode.clone(),
            draft: session.draft.clone(),
            totals,
            total_required_washes,
            wash_numbers_by_month: schedule::wash_numbers_by_month(
                total_required_washes,
                session.draft.months_duration,
            ),
            schedules_locked: session.mode.schedules_locked(),
            payment_locked: session.mode.payment_locked(),
        }
    }

    fn validate_step(&self, session: &WizardSession, step: WizardStep) -> ValidationErrors {
        match step {
            WizardStep::CustomerAndDuration => validate_customer_step(session),
            WizardStep::Packages => validate_packages_step(&session.draft),
            WizardStep::Addons => validate_addons_step(&session.draft),
            WizardStep::Schedules => self
                .schedule
                .validate(&session.draft, session.mode.schedules_locked()),
            WizardStep::PaymentAndSummary => validate_payment_step(session),
        }
    }

    async fn resume_or_fresh(&self) -> SubscriptionDraft {
        match self.draft_repository.load_draft().await {
            Ok(Some(envelope)) => {
                if envelope.is_expired(Utc::now()) {
                    info!("🗑️ Cached draft from {} has expired", envelope.saved_at);
                    if let Err(e) = self.draft_repository.clear_draft().await {
                        warn!("Failed to remove the expired draft: {}", e);
                    }
                    SubscriptionDraft::new()
                } else {
                    info!("🧭 Resuming cached draft saved at {}", envelope.saved_at);
                    envelope.draft
                }
            }
            Ok(None) => SubscriptionDraft::new(),
            Err(e) => {
                warn!("Failed to load the cached draft: {}. Starting fresh.", e);
                SubscriptionDraft::new()
            }
        }
    }

    /// Best-effort save of the in-progress draft. A failed save is logged
    /// and never blocks navigation.
    async fn cache_draft(&self, draft: &SubscriptionDraft) {
        let envelope = DraftEnvelope::new(draft.clone(), Utc::now(), self.config.ttl_hours);
        if let Err(e) = self.draft_repository.save_draft(&envelope).await {
            warn!("Failed to cache the wizard draft: {}", e);
        }
    }
}

fn validate_customer_step(session: &WizardSession) -> ValidationErrors {
    let draft = &session.draft;
    let mut errors = ValidationErrors::new();

    if draft.customer_id.is_none() {
        errors.add("customer", "Select a customer");
    }
    if draft.vehicle_type.is_none() {
        errors.add("vehicle_type", "Select a vehicle type");
    }
    if !(1..=12).contains(&draft.months_duration) {
        errors.add("months_duration", "Duration must be between 1 and 12 months");
    }
    match draft.start_date {
        None => errors.add("start_date", "Start date is required"),
        Some(date) => {
            if session.mode == WizardMode::New && date < Local::now().date_naive() {
                errors.add("start_date", "Start date cannot be in the past");
            }
        }
    }
    if draft.service_area.area.trim().is_empty() {
        errors.add("service_area", "Service area is required");
    }

    errors
}

fn validate_packages_step(draft: &SubscriptionDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.packages.is_empty() {
        errors.add("packages", "Select at least one package");
        return errors;
    }
    for (index, item) in draft.packages.iter().enumerate() {
        if item.package_id.is_empty() {
            errors.add(format!("packages.{}.package_id", index), "Package is required");
        }
        if item.quantity < 1 {
            errors.add(
                format!("packages.{}.quantity", index),
                "Quantity must be at least 1",
            );
        }
    }

    errors
}

fn validate_addons_step(draft: &SubscriptionDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (index, addon) in draft.addons.iter().enumerate() {
        if addon.application == AddonApplication::SpecificWashes
            && addon.applicable_wash_numbers.is_empty()
        {
            errors.add(
                format!("addons.{}.wash_numbers", index),
                "Select at least one wash",
            );
        }
    }

    errors
}

fn validate_payment_step(session: &WizardSession) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if session.mode.payment_locked() {
        return errors;
    }

    if session.draft.payment.payment_method.is_none() {
        errors.add("payment_method", "Select a payment method");
    }
    if session.draft.payment.payment_status.is_none() {
        errors.add("payment_status", "Select a payment status");
    }

    errors
}

/// Rehydrate a draft from a stored subscription for edit mode. Schedules
/// come back as manual entries; the original generation rule is not
/// persisted.
fn draft_from_subscription(subscription: Subscription) -> SubscriptionDraft {
    SubscriptionDraft {
        customer_id: Some(subscription.customer_id),
        customer_name: Some(subscription.customer_name),
        vehicle_type: Some(subscription.vehicle_type),
        months_duration: subscription.months_duration,
        start_date: Some(subscription.start_date),
        service_area: subscription.service_area,
        notes: subscription.notes,
        packages: subscription.packages,
        addons: subscription.addons,
        wash_schedules: subscription.wash_schedules,
        schedule_mode: ScheduleMode::Manual,
        schedule_rule: None,
        payment: PaymentDetails {
            payment_method: subscription.payment_method,
            payment_status: Some(subscription.payment_status),
            amount_paid: subscription.amount_paid,
            payment_date: subscription.payment_date,
            payment_notes: subscription.payment_notes,
        },
    }
}

fn build_submission(
    session: &WizardSession,
    totals: PricingTotals,
    now: DateTime<Utc>,
) -> Result<Subscription, WizardError> {
    let draft = &session.draft;
    let customer_id = draft
        .customer_id
        .clone()
        .ok_or(WizardError::IncompleteDraft("customer"))?;
    let customer_name = draft
        .customer_name
        .clone()
        .ok_or(WizardError::IncompleteDraft("customer"))?;
    let vehicle_type = draft
        .vehicle_type
        .ok_or(WizardError::IncompleteDraft("vehicle type"))?;
    let start_date = draft
        .start_date
        .ok_or(WizardError::IncompleteDraft("start date"))?;

    let now_rfc3339 = now.to_rfc3339();
    let (id, created_at) = match &session.mode {
        WizardMode::New => (
            Subscription::generate_id(now.timestamp_millis() as u64),
            now_rfc3339.clone(),
        ),
        WizardMode::Edit {
            subscription_id, ..
        } => (
            subscription_id.clone(),
            session
                .editing_created_at
                .clone()
                .unwrap_or_else(|| now_rfc3339.clone()),
        ),
    };

    Ok(Subscription {
        id,
        customer_id,
        customer_name,
        vehicle_type,
        start_date,
        months_duration: draft.months_duration,
        service_area: draft.service_area.clone(),
        notes: draft.notes.clone(),
        packages: draft.packages.clone(),
        addons: draft.addons.clone(),
        wash_schedules: draft.wash_schedules.clone(),
        payment_method: draft.payment.payment_method,
        payment_status: draft.payment.payment_status.unwrap_or(PaymentStatus::Pending),
        amount_paid: draft.payment.amount_paid,
        payment_date: draft.payment.payment_date,
        payment_notes: draft.payment.payment_notes.clone(),
        totals,
        created_at,
        updated_at: now_rfc3339,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{Customer, ScheduleRule, WashSlot};
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use shared::{PaymentMethod, VehicleType};

    struct WizardFixture {
        service: WizardService,
        customer_id: String,
        basic_package_id: String,
        luxury_package_id: String,
        addon_id: String,
        env: TestEnvironment,
    }

    async fn setup_test() -> WizardFixture {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let service = WizardService::new(Arc::new(env.connection.clone()));

        let customer_repository = CustomerRepository::new(env.connection.clone());
        let customer = Customer {
            id: "customer::7001".to_string(),
            name: "Asha Verma".to_string(),
            phone: "9811122233".to_string(),
            email: None,
            address: None,
            created_at: "2026-01-15T09:00:00+00:00".to_string(),
            updated_at: "2026-01-15T09:00:00+00:00".to_string(),
        };
        customer_repository
            .store_customer(&customer)
            .await
            .expect("Failed to seed customer");

        let packages = PackageRepository::new(env.connection.clone())
            .list_packages(None)
            .await
            .expect("Failed to list packages");
        let basic_package_id = packages
            .iter()
            .find(|p| p.name == "Basic Shine")
            .expect("Missing seeded package")
            .id
            .clone();
        let luxury_package_id = packages
            .iter()
            .find(|p| p.name == "Royale Detail")
            .expect("Missing seeded package")
            .id
            .clone();

        let addons = AddonRepository::new(env.connection.clone())
            .list_addons()
            .await
            .expect("Failed to list addons");
        let addon_id = addons[0].id.clone();

        WizardFixture {
            service,
            customer_id: customer.id,
            basic_package_id,
            luxury_package_id,
            addon_id,
            env,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn upcoming(days: i64) -> NaiveDate {
        Local::now().date_naive() + Duration::days(days)
    }

    /// Drive a fresh session through steps 1-3 with valid data.
    async fn fill_through_addons(fixture: &WizardFixture) {
        let service = &fixture.service;
        service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        service
            .apply(DraftAction::SetCustomer {
                customer_id: fixture.customer_id.clone(),
            })
            .await
            .expect("Failed to set customer");
        service
            .apply(DraftAction::SetVehicleType {
                vehicle_type: VehicleType::Hatchback,
            })
            .await
            .expect("Failed to set vehicle type");
        service
            .apply(DraftAction::SetStartDate { date: upcoming(1) })
            .await
            .expect("Failed to set start date");
        service
            .apply(DraftAction::SetServiceArea {
                area: "Indiranagar".to_string(),
                map_url: None,
            })
            .await
            .expect("Failed to set service area");
        assert!(service.next().await.expect("next failed").advanced);

        service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");
        assert!(service.next().await.expect("next failed").advanced);
        assert!(service.next().await.expect("next failed").advanced);
    }

    /// Complete the manual schedule for the Basic Shine happy path (4
    /// washes in month one).
    async fn fill_schedules(service: &WizardService, slot_count: usize) {
        for index in 0..slot_count {
            service
                .apply(DraftAction::UpdateWashSlot {
                    index,
                    date: Some(upcoming(2 + index as i64)),
                    time_from: Some(time(9, 0)),
                    time_to: Some(time(10, 0)),
                })
                .await
                .expect("Failed to fill slot");
        }
    }

    #[tokio::test]
    async fn test_open_fresh_session() {
        let fixture = setup_test().await;

        let snapshot = fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        assert_eq!(snapshot.step, WizardStep::CustomerAndDuration);
        assert_eq!(snapshot.mode, WizardMode::New);
        assert!(snapshot.draft.customer_id.is_none());
        assert_eq!(snapshot.draft.months_duration, 1);
        assert_eq!(snapshot.totals.grand_total, 0.0);
        assert!(!snapshot.schedules_locked);
        assert!(!snapshot.payment_locked);
    }

    #[tokio::test]
    async fn test_state_requires_open_session() {
        let fixture = setup_test().await;

        let error = fixture.service.state().expect_err("state should fail");
        assert!(error.to_string().contains("No wizard session is open"));
    }

    #[tokio::test]
    async fn test_open_edit_mode_requires_known_subscription() {
        let fixture = setup_test().await;

        let error = fixture
            .service
            .open(OpenWizardCommand {
                subscription_id: Some("subscription::404".to_string()),
            })
            .await
            .expect_err("open should fail");
        assert!(error.to_string().contains("Subscription not found"));
    }

    #[tokio::test]
    async fn test_next_blocks_on_missing_step_one_fields() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        let result = fixture.service.next().await.expect("next failed");

        assert!(!result.advanced);
        assert_eq!(result.snapshot.step, WizardStep::CustomerAndDuration);
        assert_eq!(result.errors.get("customer"), Some("Select a customer"));
        assert_eq!(
            result.errors.get("vehicle_type"),
            Some("Select a vehicle type")
        );
        assert_eq!(
            result.errors.get("start_date"),
            Some("Start date is required")
        );
        assert_eq!(
            result.errors.get("service_area"),
            Some("Service area is required")
        );
        // months_duration defaults to 1, which is valid
        assert!(result.errors.get("months_duration").is_none());
    }

    #[tokio::test]
    async fn test_start_date_in_past_is_rejected_for_new_subscriptions() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        fixture
            .service
            .apply(DraftAction::SetStartDate { date: upcoming(-1) })
            .await
            .expect("Failed to set start date");

        let result = fixture.service.next().await.expect("next failed");
        assert_eq!(
            result.errors.get("start_date"),
            Some("Start date cannot be in the past")
        );
    }

    #[tokio::test]
    async fn test_set_months_duration_rejects_out_of_range() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        for months in [0, 13] {
            let error = fixture
                .service
                .apply(DraftAction::SetMonthsDuration { months })
                .await
                .expect_err("action should fail");
            assert!(error.to_string().contains("between 1 and 12"));
        }
    }

    #[tokio::test]
    async fn test_unknown_catalog_ids_are_rejected() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        let error = fixture
            .service
            .apply(DraftAction::SetCustomer {
                customer_id: "customer::404".to_string(),
            })
            .await
            .expect_err("action should fail");
        assert!(error.to_string().contains("Customer not found"));

        let error = fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: "package::404".to_string(),
            })
            .await
            .expect_err("action should fail");
        assert!(error.to_string().contains("Package not found"));

        let error = fixture
            .service
            .apply(DraftAction::AddAddon {
                addon_id: "addon::404".to_string(),
            })
            .await
            .expect_err("action should fail");
        assert!(error.to_string().contains("Add-on not found"));
    }

    #[tokio::test]
    async fn test_add_package_prices_line_and_allocates_slots() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        let result = fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");
        let snapshot = result.snapshot;

        // Basic Shine: 399.0/month, 4 washes/month, 1 month term
        assert_eq!(snapshot.draft.packages.len(), 1);
        assert_eq!(snapshot.draft.packages[0].unit_price, 399.0);
        assert_eq!(snapshot.draft.packages[0].price, 399.0);
        assert_eq!(snapshot.total_required_washes, 4);
        assert_eq!(snapshot.draft.wash_schedules.len(), 4);
        assert_eq!(snapshot.wash_numbers_by_month, vec![vec![1, 2, 3, 4]]);
        assert_eq!(snapshot.totals.subtotal, 399.0);
        // 399 + 18% tax = 470.82, rounded to 471
        assert_eq!(snapshot.totals.grand_total, 471.0);
    }

    #[tokio::test]
    async fn test_months_change_resets_package_quantities() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");
        fixture
            .service
            .apply(DraftAction::UpdatePackage {
                index: 0,
                quantity: Some(3),
                discount_type: None,
                discount_value: None,
                notes: None,
            })
            .await
            .expect("Failed to update package");

        let result = fixture
            .service
            .apply(DraftAction::SetMonthsDuration { months: 6 })
            .await
            .expect("Failed to set months");

        assert_eq!(result.snapshot.draft.months_duration, 6);
        assert_eq!(result.snapshot.draft.packages[0].quantity, 1);
        // 4 washes/month over 6 months
        assert_eq!(result.snapshot.total_required_washes, 24);
    }

    #[tokio::test]
    async fn test_addon_all_washes_tracks_required_total() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");

        let result = fixture
            .service
            .apply(DraftAction::AddAddon {
                addon_id: fixture.addon_id.clone(),
            })
            .await
            .expect("Failed to add addon");
        assert_eq!(
            result.snapshot.draft.addons[0].applicable_wash_numbers,
            vec![1, 2, 3, 4]
        );

        let result = fixture
            .service
            .apply(DraftAction::SetMonthsDuration { months: 2 })
            .await
            .expect("Failed to set months");
        assert_eq!(
            result.snapshot.draft.addons[0].applicable_wash_numbers,
            (1..=8).collect::<Vec<u32>>()
        );
    }

    #[tokio::test]
    async fn test_specific_washes_selection_is_preserved() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");
        fixture
            .service
            .apply(DraftAction::AddAddon {
                addon_id: fixture.addon_id.clone(),
            })
            .await
            .expect("Failed to add addon");

        let result = fixture
            .service
            .apply(DraftAction::SetAddonApplication {
                index: 0,
                application: AddonApplication::SpecificWashes,
            })
            .await
            .expect("Failed to set application");
        assert!(result.snapshot.draft.addons[0]
            .applicable_wash_numbers
            .is_empty());

        fixture
            .service
            .apply(DraftAction::SetAddonWashNumbers {
                index: 0,
                wash_numbers: vec![3, 1, 3],
            })
            .await
            .expect("Failed to set wash numbers");

        // Changing the term does not touch a specific selection
        let result = fixture
            .service
            .apply(DraftAction::SetMonthsDuration { months: 4 })
            .await
            .expect("Failed to set months");
        assert_eq!(
            result.snapshot.draft.addons[0].applicable_wash_numbers,
            vec![1, 3]
        );
    }

    #[tokio::test]
    async fn test_apply_schedule_rule_generates_slots() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::SetStartDate {
                date: date(2026, 3, 2),
            })
            .await
            .expect("Failed to set start date");
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");

        // Mondays from 2026-03-02 (a Monday): Mar 2, 9, 16, 23
        let result = fixture
            .service
            .apply(DraftAction::ApplyScheduleRule {
                rule: ScheduleRule::Weekly {
                    weekdays: vec![1],
                    time_from: time(9, 0),
                    time_to: time(10, 0),
                },
            })
            .await
            .expect("Failed to apply rule");

        assert!(result.warning.is_none());
        let snapshot = result.snapshot;
        assert_eq!(snapshot.draft.schedule_mode, ScheduleMode::Rule);
        assert!(snapshot.draft.schedule_rule.is_some());
        let dates: Vec<NaiveDate> = snapshot
            .draft
            .wash_schedules
            .iter()
            .map(|s| s.date.unwrap())
            .collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 3, 2),
                date(2026, 3, 9),
                date(2026, 3, 16),
                date(2026, 3, 23)
            ]
        );
        assert!(snapshot.draft.wash_schedules.iter().all(|s| s.is_auto_generated));
    }

    #[tokio::test]
    async fn test_apply_schedule_rule_reports_shortfall() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::SetStartDate {
                date: date(2026, 3, 2),
            })
            .await
            .expect("Failed to set start date");
        // Royale Detail: 6 washes/month
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.luxury_package_id.clone(),
            })
            .await
            .expect("Failed to add package");

        // Sundays between 2026-03-02 and 2026-04-02: Mar 8, 15, 22, 29
        let result = fixture
            .service
            .apply(DraftAction::ApplyScheduleRule {
                rule: ScheduleRule::Weekly {
                    weekdays: vec![0],
                    time_from: time(9, 0),
                    time_to: time(10, 0),
                },
            })
            .await
            .expect("Failed to apply rule");

        assert_eq!(
            result.warning.as_deref(),
            Some("Only 4 of 6 washes fit before the term ends")
        );
        assert_eq!(result.snapshot.draft.wash_schedules.len(), 4);
    }

    #[tokio::test]
    async fn test_update_wash_slot_clears_auto_flag() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::SetStartDate {
                date: date(2026, 3, 2),
            })
            .await
            .expect("Failed to set start date");
        fixture
            .service
            .apply(DraftAction::AddPackage {
                package_id: fixture.basic_package_id.clone(),
            })
            .await
            .expect("Failed to add package");
        fixture
            .service
            .apply(DraftAction::ApplyScheduleRule {
                rule: ScheduleRule::Weekly {
                    weekdays: vec![1],
                    time_from: time(9, 0),
                    time_to: time(10, 0),
                },
            })
            .await
            .expect("Failed to apply rule");

        let result = fixture
            .service
            .apply(DraftAction::UpdateWashSlot {
                index: 0,
                date: Some(date(2026, 3, 3)),
                time_from: None,
                time_to: None,
            })
            .await
            .expect("Failed to update slot");

        let schedules = &result.snapshot.draft.wash_schedules;
        assert!(!schedules[0].is_auto_generated);
        assert_eq!(schedules[0].date, Some(date(2026, 3, 3)));
        // The untouched slots keep their flag
        assert!(schedules[1].is_auto_generated);
    }

    #[tokio::test]
    async fn test_full_walkthrough_submits_subscription() {
        let fixture = setup_test().await;
        fill_through_addons(&fixture).await;

        // Step 4: four manual slots need dates and times
        fill_schedules(&fixture.service, 4).await;
        let result = fixture.service.next().await.expect("next failed");
        assert!(result.advanced, "schedule step blocked: {:?}", result.errors);

        // Step 5: payment
        fixture
            .service
            .apply(DraftAction::SetPayment {
                payment_method: Some(PaymentMethod::Upi),
                payment_status: Some(PaymentStatus::Pending),
                amount_paid: None,
                payment_date: None,
                payment_notes: None,
            })
            .await
            .expect("Failed to set payment");

        let outcome = fixture.service.submit().await.expect("submit failed");
        let subscription = match outcome {
            SubmitOutcome::Completed(subscription) => subscription,
            SubmitOutcome::Rejected(errors) => panic!("submission rejected: {:?}", errors),
        };

        assert_eq!(subscription.customer_name, "Asha Verma");
        assert_eq!(subscription.wash_schedules.len(), 4);
        assert_eq!(subscription.totals.grand_total, 471.0);

        // The record is on disk, the session is closed, the cache is gone
        let stored = SubscriptionRepository::new(fixture.env.connection.clone())
            .get_subscription(&subscription.id)
            .await
            .expect("Failed to read subscription");
        assert!(stored.is_some());
        assert!(fixture.service.state().is_err());
        let cached = DraftRepository::new(fixture.env.connection.clone())
            .load_draft()
            .await
            .expect("Failed to read draft cache");
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_submit_requires_final_step() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        let error = fixture.service.submit().await.expect_err("submit should fail");
        assert!(error
            .to_string()
            .contains("only available on the final step"));
    }

    #[tokio::test]
    async fn test_submit_revalidates_schedules() {
        let fixture = setup_test().await;
        fill_through_addons(&fixture).await;
        fill_schedules(&fixture.service, 4).await;
        assert!(fixture.service.next().await.expect("next failed").advanced);
        fixture
            .service
            .apply(DraftAction::SetPayment {
                payment_method: Some(PaymentMethod::Cash),
                payment_status: Some(PaymentStatus::Pending),
                amount_paid: None,
                payment_date: None,
                payment_notes: None,
            })
            .await
            .expect("Failed to set payment");

        // Duplicate a date after the schedule step already passed
        fixture
            .service
            .apply(DraftAction::UpdateWashSlot {
                index: 1,
                date: Some(upcoming(2)),
                time_from: None,
                time_to: None,
            })
            .await
            .expect("Failed to update slot");

        let outcome = fixture.service.submit().await.expect("submit failed");
        match outcome {
            SubmitOutcome::Rejected(errors) => {
                assert_eq!(errors.get("schedules.0.date"), Some("Duplicate date"));
                assert_eq!(errors.get("schedules.1.date"), Some("Duplicate date"));
            }
            SubmitOutcome::Completed(_) => panic!("submission should have been rejected"),
        }
        // Session survives a rejection
        assert!(fixture.service.state().is_ok());
    }

    #[tokio::test]
    async fn test_submit_failure_retains_session_and_draft() {
        let fixture = setup_test().await;
        fill_through_addons(&fixture).await;
        fill_schedules(&fixture.service, 4).await;
        assert!(fixture.service.next().await.expect("next failed").advanced);
        fixture
            .service
            .apply(DraftAction::SetPayment {
                payment_method: Some(PaymentMethod::Card),
                payment_status: Some(PaymentStatus::Pending),
                amount_paid: None,
                payment_date: None,
                payment_notes: None,
            })
            .await
            .expect("Failed to set payment");

        // A file squatting on the subscriptions directory makes the store
        // fail
        std::fs::write(fixture.env.base_path.join("subscriptions"), "not a dir")
            .expect("Failed to plant blocker");

        let error = fixture.service.submit().await.expect_err("submit should fail");
        assert!(!error.to_string().is_empty());

        assert!(fixture.service.state().is_ok());
        let cached = DraftRepository::new(fixture.env.connection.clone())
            .load_draft()
            .await
            .expect("Failed to read draft cache");
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_draft_resumes_across_services() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture
            .service
            .apply(DraftAction::SetCustomer {
                customer_id: fixture.customer_id.clone(),
            })
            .await
            .expect("Failed to set customer");
        // back() caches the draft even without advancing
        fixture.service.back().await.expect("back failed");

        let second = WizardService::new(Arc::new(fixture.env.connection.clone()));
        let snapshot = second
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to reopen wizard");

        assert_eq!(snapshot.step, WizardStep::CustomerAndDuration);
        assert_eq!(
            snapshot.draft.customer_name.as_deref(),
            Some("Asha Verma")
        );
    }

    #[tokio::test]
    async fn test_expired_draft_is_discarded_on_open() {
        let fixture = setup_test().await;

        let mut draft = SubscriptionDraft::new();
        draft.customer_name = Some("Stale Customer".to_string());
        let envelope = DraftEnvelope::new(draft, Utc::now() - Duration::hours(30), 24);
        let draft_repository = DraftRepository::new(fixture.env.connection.clone());
        draft_repository
            .save_draft(&envelope)
            .await
            .expect("Failed to plant stale draft");

        let snapshot = fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        assert!(snapshot.draft.customer_name.is_none());
        let cached = draft_repository
            .load_draft()
            .await
            .expect("Failed to read draft cache");
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_edit_mode_hydrates_and_stays_out_of_cache() {
        let fixture = setup_test().await;

        // Store a pending subscription to edit
        fill_through_addons(&fixture).await;
        fill_schedules(&fixture.service, 4).await;
        assert!(fixture.service.next().await.expect("next failed").advanced);
        fixture
            .service
            .apply(DraftAction::SetPayment {
                payment_method: Some(PaymentMethod::Cash),
                payment_status: Some(PaymentStatus::Pending),
                amount_paid: None,
                payment_date: None,
                payment_notes: None,
            })
            .await
            .expect("Failed to set payment");
        let outcome = fixture.service.submit().await.expect("submit failed");
        let subscription = match outcome {
            SubmitOutcome::Completed(subscription) => subscription,
            SubmitOutcome::Rejected(errors) => panic!("submission rejected: {:?}", errors),
        };

        let snapshot = fixture
            .service
            .open(OpenWizardCommand {
                subscription_id: Some(subscription.id.clone()),
            })
            .await
            .expect("Failed to open in edit mode");

        assert_eq!(snapshot.mode.as_str(), "edit");
        assert_eq!(
            snapshot.mode.editing_subscription_id(),
            Some(subscription.id.as_str())
        );
        assert_eq!(snapshot.draft.customer_name.as_deref(), Some("Asha Verma"));
        assert_eq!(snapshot.draft.wash_schedules.len(), 4);
        assert!(!snapshot.schedules_locked);
        assert!(!snapshot.payment_locked);

        // Edit-mode navigation never writes the draft cache
        fixture.service.next().await.expect("next failed");
        let cached = DraftRepository::new(fixture.env.connection.clone())
            .load_draft()
            .await
            .expect("Failed to read draft cache");
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_locks_follow_payment_status() {
        let fixture = setup_test().await;

        // Store a paid subscription directly
        let mut draft = SubscriptionDraft::new();
        draft.customer_id = Some("customer::7001".to_string());
        draft.customer_name = Some("Asha Verma".to_string());
        draft.vehicle_type = Some(VehicleType::Sedan);
        draft.start_date = Some(date(2026, 3, 1));
        draft.service_area.area = "Indiranagar".to_string();
        draft.wash_schedules = vec![WashSlot {
            date: Some(date(2026, 3, 2)),
            time_from: Some(time(9, 0)),
            time_to: Some(time(10, 0)),
            is_auto_generated: false,
        }];
        draft.payment.payment_method = Some(PaymentMethod::Card);
        draft.payment.payment_status = Some(PaymentStatus::Paid);
        let session = WizardSession {
            step: WizardStep::PaymentAndSummary,
            mode: WizardMode::New,
            draft,
            editing_created_at: None,
        };
        let subscription =
            build_submission(&session, PricingTotals::default(), Utc::now()).unwrap();
        SubscriptionRepository::new(fixture.env.connection.clone())
            .store_subscription(&subscription)
            .await
            .expect("Failed to store subscription");

        let snapshot = fixture
            .service
            .open(OpenWizardCommand {
                subscription_id: Some(subscription.id.clone()),
            })
            .await
            .expect("Failed to open in edit mode");
        assert!(snapshot.schedules_locked);
        assert!(snapshot.payment_locked);

        let error = fixture
            .service
            .apply(DraftAction::UpdateWashSlot {
                index: 0,
                date: Some(date(2026, 3, 5)),
                time_from: None,
                time_to: None,
            })
            .await
            .expect_err("slot edit should be rejected");
        assert!(error.to_string().contains("locked"));

        let error = fixture
            .service
            .apply(DraftAction::SetPayment {
                payment_method: Some(PaymentMethod::Cash),
                payment_status: None,
                amount_paid: None,
                payment_date: None,
                payment_notes: None,
            })
            .await
            .expect_err("payment edit should be rejected");
        assert!(error.to_string().contains("locked"));
    }

    #[tokio::test]
    async fn test_discard_clears_session_and_cache() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");
        fixture.service.back().await.expect("back failed");

        fixture.service.discard().await.expect("discard failed");

        assert!(fixture.service.state().is_err());
        let cached = DraftRepository::new(fixture.env.connection.clone())
            .load_draft()
            .await
            .expect("Failed to read draft cache");
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_back_from_first_step_is_a_no_op() {
        let fixture = setup_test().await;
        fixture
            .service
            .open(OpenWizardCommand::default())
            .await
            .expect("Failed to open wizard");

        let result = fixture.service.back().await.expect("back failed");
        assert!(!result.advanced);
        assert_eq!(result.snapshot.step, WizardStep::CustomerAndDuration);
    }
}
