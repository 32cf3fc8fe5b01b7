//! Wash-schedule generation and validation: manual slot allocation, the
//! weekly and interval recurrence rules, and per-month wash numbering.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use log::info;
use std::collections::HashMap;

use crate::backend::domain::models::{ScheduleRule, SubscriptionDraft, WashSlot};
use shared::ValidationErrors;

/// Total washes the subscription must schedule: each package contributes
/// its monthly wash count for every month of the term.
pub fn total_required_washes(draft: &SubscriptionDraft) -> u32 {
    draft
        .packages
        .iter()
        .map(|item| item.max_washes_per_month * draft.months_duration)
        .sum()
}

/// Wash numbers (1-based) grouped by calendar month of the term, using
/// ceiling division: 10 washes over 3 months gives 4 + 4 + 2.
pub fn wash_numbers_by_month(total: u32, months: u32) -> Vec<Vec<u32>> {
    if months == 0 {
        return Vec::new();
    }
    let per_month = total.div_ceil(months);
    (1..=months)
        .map(|month| {
            let lo = (month - 1) * per_month + 1;
            let hi = (month * per_month).min(total);
            if lo > hi {
                Vec::new()
            } else {
                (lo..=hi).collect()
            }
        })
        .collect()
}

/// Service for building and checking the wash calendar. Stateless; the
/// wizard owns the draft and passes it in.
#[derive(Clone)]
pub struct ScheduleService;

impl ScheduleService {
    pub fn new() -> Self {
        Self
    }

    /// Ensure the draft carries exactly the required number of manual
    /// slots. A count mismatch replaces the whole list with empty slots;
    /// a matching count leaves operator-entered dates and times alone.
    pub fn allocate_manual_slots(&self, draft: &mut SubscriptionDraft) {
        let required = total_required_washes(draft) as usize;
        if draft.wash_schedules.len() != required {
            info!(
                "🧽 Reallocating manual wash slots: {} -> {}",
                draft.wash_schedules.len(),
                required
            );
            draft.wash_schedules = (0..required).map(|_| WashSlot::empty()).collect();
        }
    }

    /// Generate slots from a recurrence rule. Walks day by day from
    /// `start_date` to the exclusive term end (`start_date` plus the term
    /// months) and stops early once `required` slots exist. Returns the
    /// slots plus the shortfall when the window could not fill the quota.
    pub fn generate_from_rule(
        &self,
        start_date: NaiveDate,
        months_duration: u32,
        rule: &ScheduleRule,
        required: u32,
    ) -> Result<(Vec<WashSlot>, u32)> {
        rule.validate()?;

        let end_date = start_date
            .checked_add_months(Months::new(months_duration))
            .ok_or_else(|| anyhow!("Term end date is out of calendar range"))?;
        let (time_from, time_to) = rule.default_times();

        let mut dates: Vec<NaiveDate> = Vec::new();
        match rule {
            ScheduleRule::Weekly { weekdays, .. } => {
                let mut current = start_date;
                while current < end_date && (dates.len() as u32) < required {
                    let weekday = current.weekday().num_days_from_sunday() as u8;
                    if weekdays.contains(&weekday) {
                        dates.push(current);
                    }
                    match current.succ_opt() {
                        Some(next) => current = next,
                        None => break,
                    }
                }
            }
            ScheduleRule::Interval {
                interval_weeks,
                weekday,
                ..
            } => {
                let start_weekday = start_date.weekday().num_days_from_sunday() as u8;
                let offset = (*weekday + 7 - start_weekday) % 7;
                let mut current = start_date + Duration::days(offset as i64);
                let step = Duration::days(*interval_weeks as i64 * 7);
                while current < end_date && (dates.len() as u32) < required {
                    dates.push(current);
                    current += step;
                }
            }
        }

        let shortfall = required.saturating_sub(dates.len() as u32);
        if shortfall > 0 {
            info!(
                "🗓️ Rule filled {} of {} washes before the term end",
                dates.len(),
                required
            );
        }

        let slots = dates
            .into_iter()
            .map(|date| WashSlot {
                date: Some(date),
                time_from: Some(time_from),
                time_to: Some(time_to),
                is_auto_generated: true,
            })
            .collect();

        Ok((slots, shortfall))
    }

    /// Validate the wash calendar for submission. `locked` schedules (a
    /// subscription that already took money) pass unconditionally. Both
    /// slots of a duplicated date are flagged so the operator can see the
    /// pair.
    pub fn validate(&self, draft: &SubscriptionDraft, locked: bool) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if locked {
            return errors;
        }

        let required = total_required_washes(draft) as usize;
        let actual = draft.wash_schedules.len();
        if actual != required {
            errors.add(
                "schedules",
                format!("Expected {} washes, found {}", required, actual),
            );
        }

        let mut date_counts: HashMap<NaiveDate, u32> = HashMap::new();
        for slot in &draft.wash_schedules {
            if let Some(date) = slot.date {
                *date_counts.entry(date).or_insert(0) += 1;
            }
        }

        for (index, slot) in draft.wash_schedules.iter().enumerate() {
            match slot.date {
                None => errors.add(format!("schedules.{}.date", index), "Date is required"),
                Some(date) => {
                    if date_counts.get(&date).copied().unwrap_or(0) > 1 {
                        errors.add(format!("schedules.{}.date", index), "Duplicate date");
                    }
                }
            }

            if slot.time_from.is_none() {
                errors.add(
                    format!("schedules.{}.time_from", index),
                    "Start time is required",
                );
            }

            match (slot.time_from, slot.time_to) {
                (_, None) => errors.add(
                    format!("schedules.{}.time_to", index),
                    "End time is required",
                ),
                (Some(from), Some(to)) if to <= from => errors.add(
                    format!("schedules.{}.time_to", index),
                    "End time must be after start time",
                ),
                _ => {}
            }
        }

        errors
    }
}

impl Default for ScheduleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{PackageLineItem, WashPackage};
    use chrono::NaiveTime;
    use shared::{DiscountType, VehicleType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn line_item(max_washes: u32) -> PackageLineItem {
        PackageLineItem::from_package(&WashPackage {
            id: "package::1".to_string(),
            name: "Exterior Shine".to_string(),
            vehicle_type: VehicleType::Sedan,
            subscription_price: 500.0,
            max_washes_per_month: max_washes,
            description: None,
            is_active: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        })
    }

    fn draft(max_washes: u32, months: u32) -> SubscriptionDraft {
        let mut draft = SubscriptionDraft::new();
        draft.months_duration = months;
        draft.packages.push(line_item(max_washes));
        draft
    }

    fn weekly(weekdays: Vec<u8>) -> ScheduleRule {
        ScheduleRule::Weekly {
            weekdays,
            time_from: time(9, 0),
            time_to: time(10, 0),
        }
    }

    #[test]
    fn test_total_required_washes_sums_packages() {
        let mut d = draft(4, 3);
        assert_eq!(total_required_washes(&d), 12);

        d.packages.push(line_item(2));
        assert_eq!(total_required_washes(&d), 18);

        d.packages.clear();
        assert_eq!(total_required_washes(&d), 0);
    }

    #[test]
    fn test_wash_numbers_by_month_uses_ceiling_division() {
        assert_eq!(
            wash_numbers_by_month(10, 3),
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10]]
        );
        assert_eq!(
            wash_numbers_by_month(6, 3),
            vec![vec![1, 2], vec![3, 4], vec![5, 6]]
        );
        assert_eq!(wash_numbers_by_month(5, 1), vec![vec![1, 2, 3, 4, 5]]);
        // sparse terms leave later months empty
        assert_eq!(
            wash_numbers_by_month(2, 4),
            vec![vec![1], vec![2], vec![], vec![]]
        );
        assert!(wash_numbers_by_month(4, 0).is_empty());
    }

    #[test]
    fn test_manual_allocation_replaces_on_count_change() {
        let service = ScheduleService::new();
        let mut d = draft(2, 2);

        service.allocate_manual_slots(&mut d);
        assert_eq!(d.wash_schedules.len(), 4);
        assert!(d.wash_schedules.iter().all(|s| !s.is_complete()));

        d.months_duration = 3;
        service.allocate_manual_slots(&mut d);
        assert_eq!(d.wash_schedules.len(), 6);
    }

    #[test]
    fn test_manual_allocation_preserves_entries_when_count_matches() {
        let service = ScheduleService::new();
        let mut d = draft(2, 2);
        service.allocate_manual_slots(&mut d);

        d.wash_schedules[1].date = Some(date(2026, 3, 8));
        d.wash_schedules[1].time_from = Some(time(9, 0));

        // unrelated recompute path calls this again with the same count
        service.allocate_manual_slots(&mut d);
        assert_eq!(d.wash_schedules[1].date, Some(date(2026, 3, 8)));
        assert_eq!(d.wash_schedules[1].time_from, Some(time(9, 0)));
    }

    #[test]
    fn test_weekly_rule_collects_matching_weekdays() {
        let service = ScheduleService::new();
        // 2026-03-01 is a Sunday
        let (slots, shortfall) = service
            .generate_from_rule(date(2026, 3, 1), 1, &weekly(vec![1, 4]), 4)
            .unwrap();

        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date.unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 3, 2),
                date(2026, 3, 5),
                date(2026, 3, 9),
                date(2026, 3, 12),
            ]
        );
        assert_eq!(shortfall, 0);
        assert!(slots.iter().all(|s| s.is_auto_generated));
        assert!(slots.iter().all(|s| s.time_from == Some(time(9, 0))));
        assert!(slots.iter().all(|s| s.time_to == Some(time(10, 0))));
    }

    #[test]
    fn test_weekly_rule_reports_shortfall() {
        let service = ScheduleService::new();
        // Sundays in March 2026: 1, 8, 15, 22, 29 — five of ten wanted
        let (slots, shortfall) = service
            .generate_from_rule(date(2026, 3, 1), 1, &weekly(vec![0]), 10)
            .unwrap();

        assert_eq!(slots.len(), 5);
        assert_eq!(shortfall, 5);
        assert_eq!(slots[0].date, Some(date(2026, 3, 1)));
        assert_eq!(slots[4].date, Some(date(2026, 3, 29)));
    }

    #[test]
    fn test_interval_rule_steps_by_weeks() {
        let service = ScheduleService::new();
        let rule = ScheduleRule::Interval {
            interval_weeks: 2,
            weekday: 3,
            time_from: time(7, 30),
            time_to: time(8, 30),
        };

        // first Wednesday on/after Sunday 2026-03-01 is 2026-03-04
        let (slots, shortfall) = service
            .generate_from_rule(date(2026, 3, 1), 2, &rule, 5)
            .unwrap();
        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date.unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 3, 4),
                date(2026, 3, 18),
                date(2026, 4, 1),
                date(2026, 4, 15),
                date(2026, 4, 29),
            ]
        );
        assert_eq!(shortfall, 0);
    }

    #[test]
    fn test_interval_rule_anchor_can_be_start_date() {
        let service = ScheduleService::new();
        let rule = ScheduleRule::Interval {
            interval_weeks: 1,
            weekday: 0,
            time_from: time(9, 0),
            time_to: time(10, 0),
        };

        let (slots, _) = service
            .generate_from_rule(date(2026, 3, 1), 1, &rule, 2)
            .unwrap();
        assert_eq!(slots[0].date, Some(date(2026, 3, 1)));
        assert_eq!(slots[1].date, Some(date(2026, 3, 8)));
    }

    #[test]
    fn test_term_end_is_exclusive() {
        let service = ScheduleService::new();
        let rule = ScheduleRule::Interval {
            interval_weeks: 2,
            weekday: 3,
            time_from: time(7, 30),
            time_to: time(8, 30),
        };

        // one-month term ends 2026-04-01 exclusive; 04-01 itself is skipped
        let (slots, shortfall) = service
            .generate_from_rule(date(2026, 3, 1), 1, &rule, 5)
            .unwrap();
        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date.unwrap()).collect();
        assert_eq!(dates, vec![date(2026, 3, 4), date(2026, 3, 18)]);
        assert_eq!(shortfall, 3);
    }

    #[test]
    fn test_rule_generation_rejects_invalid_rules() {
        let service = ScheduleService::new();
        assert!(service
            .generate_from_rule(date(2026, 3, 1), 1, &weekly(vec![]), 4)
            .is_err());
        assert!(service
            .generate_from_rule(date(2026, 3, 1), 1, &weekly(vec![9]), 4)
            .is_err());
    }

    #[test]
    fn test_zero_required_produces_nothing() {
        let service = ScheduleService::new();
        let (slots, shortfall) = service
            .generate_from_rule(date(2026, 3, 1), 1, &weekly(vec![0]), 0)
            .unwrap();
        assert!(slots.is_empty());
        assert_eq!(shortfall, 0);
    }

    #[test]
    fn test_validate_passes_for_complete_schedule() {
        let service = ScheduleService::new();
        let mut d = draft(1, 2);
        d.wash_schedules = vec![
            WashSlot {
                date: Some(date(2026, 3, 2)),
                time_from: Some(time(9, 0)),
                time_to: Some(time(10, 0)),
                is_auto_generated: false,
            },
            WashSlot {
                date: Some(date(2026, 3, 9)),
                time_from: Some(time(9, 0)),
                time_to: Some(time(10, 0)),
                is_auto_generated: false,
            },
        ];
        assert!(service.validate(&d, false).is_empty());
    }

    #[test]
    fn test_validate_flags_count_mismatch() {
        let service = ScheduleService::new();
        let mut d = draft(2, 2);
        d.wash_schedules = vec![WashSlot::empty(), WashSlot::empty()];
        let errors = service.validate(&d, false);
        assert_eq!(errors.get("schedules"), Some("Expected 4 washes, found 2"));
    }

    #[test]
    fn test_validate_flags_incomplete_slots() {
        let service = ScheduleService::new();
        let mut d = draft(1, 1);
        d.wash_schedules = vec![WashSlot {
            date: None,
            time_from: Some(time(9, 0)),
            time_to: None,
            is_auto_generated: false,
        }];
        let errors = service.validate(&d, false);
        assert_eq!(errors.get("schedules.0.date"), Some("Date is required"));
        assert_eq!(errors.get("schedules.0.time_to"), Some("End time is required"));
        assert_eq!(errors.get("schedules.0.time_from"), None);
    }

    #[test]
    fn test_validate_requires_end_after_start() {
        let service = ScheduleService::new();
        let mut d = draft(1, 1);
        d.wash_schedules = vec![WashSlot {
            date: Some(date(2026, 3, 2)),
            time_from: Some(time(10, 0)),
            time_to: Some(time(10, 0)),
            is_auto_generated: false,
        }];
        let errors = service.validate(&d, false);
        assert_eq!(
            errors.get("schedules.0.time_to"),
            Some("End time must be after start time")
        );
    }

    #[test]
    fn test_validate_flags_both_duplicate_dates() {
        let service = ScheduleService::new();
        let mut d = draft(1, 3);
        let duplicate = date(2026, 3, 2);
        d.wash_schedules = vec![
            WashSlot {
                date: Some(duplicate),
                time_from: Some(time(9, 0)),
                time_to: Some(time(10, 0)),
                is_auto_generated: false,
            },
            WashSlot {
                date: Some(date(2026, 3, 9)),
                time_from: Some(time(9, 0)),
                time_to: Some(time(10, 0)),
                is_auto_generated: false,
            },
            WashSlot {
                date: Some(duplicate),
                time_from: Some(time(11, 0)),
                time_to: Some(time(12, 0)),
                is_auto_generated: false,
            },
        ];
        let errors = service.validate(&d, false);
        assert_eq!(errors.get("schedules.0.date"), Some("Duplicate date"));
        assert_eq!(errors.get("schedules.2.date"), Some("Duplicate date"));
        assert_eq!(errors.get("schedules.1.date"), None);
    }

    #[test]
    fn test_validate_skips_locked_schedules() {
        let service = ScheduleService::new();
        let mut d = draft(2, 2);
        d.wash_schedules = vec![WashSlot::empty()];
        assert!(service.validate(&d, true).is_empty());
    }
}
