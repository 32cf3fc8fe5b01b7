//! Pricing math for subscription drafts: per-line package and add-on
//! prices, tax, rounding, and the derived totals block.

use log::debug;

use crate::backend::domain::models::{
    AddonLineItem, PackageLineItem, PricingTotals, SubscriptionDraft,
};
use crate::backend::domain::schedule;
use shared::{AddonApplication, DiscountType};

/// Knobs for the pricing pipeline
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Flat tax applied to the combined subtotal, in percent
    pub tax_percentage: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { tax_percentage: 18.0 }
    }
}

/// Service for all money math on a draft. Stateless apart from its config;
/// everything flows through [`PricingService::recompute_draft`].
#[derive(Clone)]
pub struct PricingService {
    config: PricingConfig,
}

impl PricingService {
    pub fn new() -> Self {
        Self::with_config(PricingConfig::default())
    }

    pub fn with_config(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn tax_percentage(&self) -> f64 {
        self.config.tax_percentage
    }

    fn discount_amount(subtotal: f64, discount_type: DiscountType, discount_value: f64) -> f64 {
        match discount_type {
            DiscountType::Fixed => discount_value,
            DiscountType::Percentage => subtotal * discount_value / 100.0,
        }
    }

    /// Reprice one package line: unit price times months, minus discount,
    /// floored at zero. Quantity is deliberately not a factor.
    pub fn price_package_item(&self, item: &mut PackageLineItem, months_duration: u32) {
        let subtotal = item.unit_price * months_duration as f64;
        item.discount_amount =
            Self::discount_amount(subtotal, item.discount_type, item.discount_value);
        item.price = (subtotal - item.discount_amount).max(0.0);
    }

    /// Reprice one add-on line: unit price times the number of washes it
    /// applies to, minus discount, floored at zero.
    pub fn price_addon_item(&self, item: &mut AddonLineItem) {
        let wash_count = item.applicable_wash_numbers.len() as f64;
        let subtotal = item.unit_price * wash_count;
        item.discount_amount =
            Self::discount_amount(subtotal, item.discount_type, item.discount_value);
        item.price = (subtotal - item.discount_amount).max(0.0);
    }

    /// Recompute every derived money figure on the draft, in order: package
    /// lines, the required wash total, add-on wash-number sets and lines,
    /// then the totals block. Safe to call after every mutation; running it
    /// twice in a row changes nothing.
    pub fn recompute_draft(&self, draft: &mut SubscriptionDraft) -> PricingTotals {
        let months = draft.months_duration;

        for item in &mut draft.packages {
            self.price_package_item(item, months);
        }

        let required_washes = schedule::total_required_washes(draft);

        for addon in &mut draft.addons {
            if addon.application == AddonApplication::AllWashes {
                addon.applicable_wash_numbers = (1..=required_washes).collect();
            }
            self.price_addon_item(addon);
        }

        let packages_total: f64 = draft.packages.iter().map(|p| p.price).sum();
        let addons_total: f64 = draft.addons.iter().map(|a| a.price).sum();
        let subtotal = packages_total + addons_total;
        let tax_amount = subtotal * self.config.tax_percentage / 100.0;
        let raw_total = subtotal + tax_amount;
        let grand_total = raw_total.round();
        let round_off = if (grand_total - raw_total).abs() < 1e-9 {
            0.0
        } else {
            grand_total - raw_total
        };
        let per_month = grand_total / months.max(1) as f64;

        debug!(
            "💰 Repriced draft: {} packages, {} addons, grand total {:.2}",
            draft.packages.len(),
            draft.addons.len(),
            grand_total
        );

        PricingTotals {
            packages_total,
            addons_total,
            subtotal,
            tax_percentage: self.config.tax_percentage,
            tax_amount,
            round_off,
            grand_total,
            per_month,
        }
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}
