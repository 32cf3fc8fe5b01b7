use chrono::{NaiveDate, NaiveTime};

use crate::backend::domain::commands::wizard::{
    AdvanceResult, ApplyActionResult, DraftAction, WizardSnapshot,
};
use crate::backend::domain::models::{
    AddonLineItem, PackageLineItem, PaymentDetails, PricingTotals, ScheduleRule, ServiceArea,
    SubscriptionDraft, WashSlot,
};
use shared::{
    AddonLineItemDto, AdvanceWizardResponse, DraftActionRequest, DraftActionResponse,
    PackageLineItemDto, PaymentDetailsDto, PricingTotalsDto, ScheduleRuleDto, ServiceAreaDto,
    SubscriptionDraftDto, WashSlotDto, WizardStateResponse,
};

pub struct DraftMapper;

impl DraftMapper {
    /// Parse a "YYYY-MM-DD" wire date
    pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", value))
    }

    /// Parse an "HH:MM" wire time
    pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(value, "%H:%M")
            .map_err(|_| format!("Invalid time '{}': expected HH:MM", value))
    }

    pub fn date_to_dto(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub fn time_to_dto(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    /// Convert an incoming draft action to the domain command, parsing date
    /// and time strings along the way
    pub fn action_to_domain(request: DraftActionRequest) -> Result<DraftAction, String> {
        let action = match request {
            DraftActionRequest::SetCustomer { customer_id } => {
                DraftAction::SetCustomer { customer_id }
            }
            DraftActionRequest::SetVehicleType { vehicle_type } => {
                DraftAction::SetVehicleType { vehicle_type }
            }
            DraftActionRequest::SetMonthsDuration { months } => {
                DraftAction::SetMonthsDuration { months }
            }
            DraftActionRequest::SetStartDate { date } => DraftAction::SetStartDate {
                date: Self::parse_date(&date)?,
            },
            DraftActionRequest::SetServiceArea { area, map_url } => {
                DraftAction::SetServiceArea { area, map_url }
            }
            DraftActionRequest::SetNotes { notes } => DraftAction::SetNotes { notes },
            DraftActionRequest::AddPackage { package_id } => DraftAction::AddPackage { package_id },
            DraftActionRequest::UpdatePackage {
                index,
                quantity,
                discount_type,
                discount_value,
                notes,
            } => DraftAction::UpdatePackage {
                index,
                quantity,
                discount_type,
                discount_value,
                notes,
            },
            DraftActionRequest::RemovePackage { index } => DraftAction::RemovePackage { index },
            DraftActionRequest::AddAddon { addon_id } => DraftAction::AddAddon { addon_id },
            DraftActionRequest::SetAddonApplication { index, application } => {
                DraftAction::SetAddonApplication { index, application }
            }
            DraftActionRequest::SetAddonWashNumbers {
                index,
                wash_numbers,
            } => DraftAction::SetAddonWashNumbers {
                index,
                wash_numbers,
            },
            DraftActionRequest::UpdateAddonDiscount {
                index,
                discount_type,
                discount_value,
            } => DraftAction::UpdateAddonDiscount {
                index,
                discount_type,
                discount_value,
            },
            DraftActionRequest::RemoveAddon { index } => DraftAction::RemoveAddon { index },
            DraftActionRequest::UseManualSchedules => DraftAction::UseManualSchedules,
            DraftActionRequest::ApplyScheduleRule { rule } => DraftAction::ApplyScheduleRule {
                rule: Self::rule_to_domain(rule)?,
            },
            DraftActionRequest::UpdateWashSlot {
                index,
                date,
                time_from,
                time_to,
            } => DraftAction::UpdateWashSlot {
                index,
                date: date.as_deref().map(Self::parse_date).transpose()?,
                time_from: time_from.as_deref().map(Self::parse_time).transpose()?,
                time_to: time_to.as_deref().map(Self::parse_time).transpose()?,
            },
            DraftActionRequest::SetPayment {
                payment_method,
                payment_status,
                amount_paid,
                payment_date,
                payment_notes,
            } => DraftAction::SetPayment {
                payment_method,
                payment_status,
                amount_paid,
                payment_date: payment_date.as_deref().map(Self::parse_date).transpose()?,
                payment_notes,
            },
        };
        Ok(action)
    }

    /// Convert a wire schedule rule to the domain rule
    pub fn rule_to_domain(dto: ScheduleRuleDto) -> Result<ScheduleRule, String> {
        match dto {
            ScheduleRuleDto::Weekly {
                weekdays,
                time_from,
                time_to,
            } => Ok(ScheduleRule::Weekly {
                weekdays,
                time_from: Self::parse_time(&time_from)?,
                time_to: Self::parse_time(&time_to)?,
            }),
            ScheduleRuleDto::Interval {
                interval_weeks,
                weekday,
                time_from,
                time_to,
            } => Ok(ScheduleRule::Interval {
                interval_weeks,
                weekday,
                time_from: Self::parse_time(&time_from)?,
                time_to: Self::parse_time(&time_to)?,
            }),
        }
    }

    /// Convert a domain schedule rule to its wire form
    pub fn rule_to_dto(rule: &ScheduleRule) -> ScheduleRuleDto {
        match rule {
            ScheduleRule::Weekly {
                weekdays,
                time_from,
                time_to,
            } => ScheduleRuleDto::Weekly {
                weekdays: weekdays.clone(),
                time_from: Self::time_to_dto(*time_from),
                time_to: Self::time_to_dto(*time_to),
            },
            ScheduleRule::Interval {
                interval_weeks,
                weekday,
                time_from,
                time_to,
            } => ScheduleRuleDto::Interval {
                interval_weeks: *interval_weeks,
                weekday: *weekday,
                time_from: Self::time_to_dto(*time_from),
                time_to: Self::time_to_dto(*time_to),
            },
        }
    }

    pub fn service_area_to_dto(area: &ServiceArea) -> ServiceAreaDto {
        ServiceAreaDto {
            area: area.area.clone(),
            map_url: area.map_url.clone(),
        }
    }

    pub fn package_line_to_dto(item: &PackageLineItem) -> PackageLineItemDto {
        PackageLineItemDto {
            package_id: item.package_id.clone(),
            package_name: item.package_name.clone(),
            vehicle_type: item.vehicle_type,
            quantity: item.quantity,
            unit_price: item.unit_price,
            max_washes_per_month: item.max_washes_per_month,
            discount_type: item.discount_type,
            discount_value: item.discount_value,
            discount_amount: item.discount_amount,
            price: item.price,
            notes: item.notes.clone(),
        }
    }

    pub fn addon_line_to_dto(item: &AddonLineItem) -> AddonLineItemDto {
        AddonLineItemDto {
            addon_id: item.addon_id.clone(),
            addon_name: item.addon_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            application: item.application,
            applicable_wash_numbers: item.applicable_wash_numbers.clone(),
            discount_type: item.discount_type,
            discount_value: item.discount_value,
            discount_amount: item.discount_amount,
            price: item.price,
        }
    }

    pub fn slot_to_dto(slot: &WashSlot) -> WashSlotDto {
        WashSlotDto {
            date: slot.date.map(Self::date_to_dto),
            time_from: slot.time_from.map(Self::time_to_dto),
            time_to: slot.time_to.map(Self::time_to_dto),
            is_auto_generated: slot.is_auto_generated,
        }
    }

    pub fn payment_to_dto(payment: &PaymentDetails) -> PaymentDetailsDto {
        PaymentDetailsDto {
            payment_method: payment.payment_method,
            payment_status: payment.payment_status,
            amount_paid: payment.amount_paid,
            payment_date: payment.payment_date.map(Self::date_to_dto),
            payment_notes: payment.payment_notes.clone(),
        }
    }

    pub fn totals_to_dto(totals: &PricingTotals) -> PricingTotalsDto {
        PricingTotalsDto {
            packages_total: totals.packages_total,
            addons_total: totals.addons_total,
            subtotal: totals.subtotal,
            tax_percentage: totals.tax_percentage,
            tax_amount: totals.tax_amount,
            round_off: totals.round_off,
            grand_total: totals.grand_total,
            per_month: totals.per_month,
        }
    }

    /// Convert the whole draft to its wire form
    pub fn draft_to_dto(draft: &SubscriptionDraft) -> SubscriptionDraftDto {
        SubscriptionDraftDto {
            customer_id: draft.customer_id.clone(),
            customer_name: draft.customer_name.clone(),
            vehicle_type: draft.vehicle_type,
            months_duration: draft.months_duration,
            start_date: draft.start_date.map(Self::date_to_dto),
            service_area: Self::service_area_to_dto(&draft.service_area),
            notes: draft.notes.clone(),
            packages: draft.packages.iter().map(Self::package_line_to_dto).collect(),
            addons: draft.addons.iter().map(Self::addon_line_to_dto).collect(),
            wash_schedules: draft.wash_schedules.iter().map(Self::slot_to_dto).collect(),
            schedule_mode: draft.schedule_mode,
            schedule_rule: draft.schedule_rule.as_ref().map(Self::rule_to_dto),
            payment: Self::payment_to_dto(&draft.payment),
        }
    }

    /// Convert a wizard snapshot to the REST state response
    pub fn snapshot_to_state(snapshot: WizardSnapshot) -> WizardStateResponse {
        WizardStateResponse {
            step: snapshot.step.number(),
            step_name: snapshot.step.name().to_string(),
            mode: snapshot.mode.as_str().to_string(),
            editing_subscription_id: snapshot
                .mode
                .editing_subscription_id()
                .map(str::to_string),
            draft: Self::draft_to_dto(&snapshot.draft),
            totals: Self::totals_to_dto(&snapshot.totals),
            total_required_washes: snapshot.total_required_washes,
            wash_numbers_by_month: snapshot.wash_numbers_by_month,
            schedules_locked: snapshot.schedules_locked,
            payment_locked: snapshot.payment_locked,
        }
    }

    pub fn apply_result_to_response(result: ApplyActionResult) -> DraftActionResponse {
        DraftActionResponse {
            warning: result.warning,
            state: Self::snapshot_to_state(result.snapshot),
        }
    }

    pub fn advance_to_response(result: AdvanceResult) -> AdvanceWizardResponse {
        AdvanceWizardResponse {
            advanced: result.advanced,
            state: Self::snapshot_to_state(result.snapshot),
            errors: result.errors,
        }
    }
}
