//! Bookable time-slot universe and display formatting for wash times.

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use once_cell::sync::Lazy;

/// Earliest bookable wash start
pub const DAY_START: &str = "06:00";
/// Latest bookable time, inclusive
pub const DAY_END: &str = "20:00";
pub const SLOT_INTERVAL_MINUTES: u32 = 30;

/// Minimum gap between a wash's start and end time offered to operators
pub const MIN_WASH_DURATION_MINUTES: u32 = 60;

/// The fixed slot universe every schedule picker works from:
/// 06:00 through 20:00 inclusive, every 30 minutes.
pub static DEFAULT_TIME_SLOTS: Lazy<Vec<String>> = Lazy::new(|| {
    generate_time_slots(DAY_START, DAY_END, SLOT_INTERVAL_MINUTES)
        .expect("default slot bounds are valid")
});

/// 12-hour labels matching `DEFAULT_TIME_SLOTS` one to one.
pub static DEFAULT_TIME_SLOT_LABELS: Lazy<Vec<String>> = Lazy::new(|| {
    DEFAULT_TIME_SLOTS
        .iter()
        .map(|slot| format_time_12h(slot).expect("default slots are well-formed"))
        .collect()
});

fn parse_minutes(value: &str) -> Result<u32> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| anyhow!("Invalid time '{}': {}", value, e))?;
    Ok(time.signed_duration_since(NaiveTime::MIN).num_minutes() as u32)
}

fn minutes_to_slot(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Generate "HH:MM" slots from `start` to `end`, both inclusive, stepping
/// by `interval_minutes`. An end before the start yields an empty list.
pub fn generate_time_slots(start: &str, end: &str, interval_minutes: u32) -> Result<Vec<String>> {
    if interval_minutes == 0 {
        return Err(anyhow!("Slot interval must be positive"));
    }

    let start_minutes = parse_minutes(start)?;
    let end_minutes = parse_minutes(end)?;

    let mut slots = Vec::new();
    let mut current = start_minutes;
    while current <= end_minutes {
        slots.push(minutes_to_slot(current));
        current += interval_minutes;
    }

    Ok(slots)
}

/// Render a 24-hour "HH:MM" slot as a 12-hour label, e.g. "02:30 PM".
pub fn format_time_12h(slot: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|e| anyhow!("Invalid time '{}': {}", slot, e))?;
    Ok(time.format("%I:%M %p").to_string())
}

/// Slots from the default universe that can end a wash starting at `from`:
/// everything at least `MIN_WASH_DURATION_MINUTES` later.
pub fn end_slots_after(from: &str) -> Result<Vec<String>> {
    let from_minutes = parse_minutes(from)?;
    let earliest_end = from_minutes + MIN_WASH_DURATION_MINUTES;

    Ok(DEFAULT_TIME_SLOTS
        .iter()
        .filter(|slot| parse_minutes(slot).map(|m| m >= earliest_end).unwrap_or(false))
        .cloned()
        .collect())
}
