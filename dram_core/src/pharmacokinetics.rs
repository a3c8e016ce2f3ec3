//! Pharmacokinetic calculator.
//!
//! Pure functions deriving ethanol mass, Widmark BAC estimates, sobering and
//! driving delays, and classifications. Every result below zero is clamped to
//! zero; nothing here fails.
//!
//! Multi-event BAC is the sum of independently decayed per-event estimates
//! rather than a single shared ethanol pool. Derived outputs depend on that
//! additive model, so it is kept as is.

use crate::{BiologicalSex, ConsumptionEvent, HealthRisk, IntoxicationLevel};
use chrono::{DateTime, Utc};

/// Assumed ethanol density in g/mL
pub const ETHANOL_DENSITY_G_PER_ML: f64 = 0.8;

/// BAC percentage points eliminated per hour
pub const BAC_ELIMINATION_PER_HOUR: f64 = 0.015;

/// Grams of ethanol the liver metabolizes per hour
pub const METABOLISM_GRAMS_PER_HOUR: f64 = 7.0;

/// BAC at or above which driving is considered unsafe
pub const LEGAL_DRIVING_BAC: f64 = 0.03;

/// Grams of pure ethanol in a serving
pub fn pure_alcohol_grams(volume_ml: f64, abv_percent: f64) -> f64 {
    (volume_ml * (abv_percent / 100.0) * ETHANOL_DENSITY_G_PER_ML).max(0.0)
}

/// Widmark estimate of BAC (percent) for one drink after `hours_since_drinking`
///
/// Negative elapsed time is treated as zero; a non-positive body weight yields 0.
pub fn estimate_bac(
    alcohol_grams: f64,
    sex: BiologicalSex,
    weight_kg: f64,
    hours_since_drinking: f64,
) -> f64 {
    let peak = peak_bac(alcohol_grams, sex, weight_kg);
    let hours = hours_since_drinking.max(0.0);
    if hours >= peak / BAC_ELIMINATION_PER_HOUR {
        return 0.0;
    }
    (peak - BAC_ELIMINATION_PER_HOUR * hours).max(0.0)
}

/// BAC immediately after drinking, before any elimination
pub fn peak_bac(alcohol_grams: f64, sex: BiologicalSex, weight_kg: f64) -> f64 {
    let body_water_grams = weight_kg * 1000.0 * sex.distribution_ratio();
    if body_water_grams <= 0.0 {
        return 0.0;
    }
    (alcohol_grams / body_water_grams * 100.0).max(0.0)
}

/// Hours for the liver to clear `remaining_alcohol_grams`
pub fn estimate_sobering_time(remaining_alcohol_grams: f64) -> f64 {
    (remaining_alcohol_grams / METABOLISM_GRAMS_PER_HOUR).max(0.0)
}

/// Hours between two instants, never negative
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    (millis as f64 / 3_600_000.0).max(0.0)
}

/// Grams of an event's ethanol not yet metabolized at `now`
pub fn remaining_alcohol(event: &ConsumptionEvent, now: DateTime<Utc>) -> f64 {
    let grams = event.alcohol_grams();
    let metabolized = (hours_between(event.timestamp, now) * METABOLISM_GRAMS_PER_HOUR).min(grams);
    (grams - metabolized).max(0.0)
}

/// Sum of per-event BAC contributions at `now`
///
/// Events timestamped after `now` are ignored.
pub fn combined_bac<'a, I>(events: I, sex: BiologicalSex, weight_kg: f64, now: DateTime<Utc>) -> f64
where
    I: IntoIterator<Item = &'a ConsumptionEvent>,
{
    events
        .into_iter()
        .filter(|e| e.timestamp <= now)
        .map(|e| {
            estimate_bac(
                e.alcohol_grams(),
                sex,
                weight_kg,
                hours_between(e.timestamp, now),
            )
        })
        .sum()
}

/// Classify a BAC value; intervals are inclusive-lower, exclusive-upper
pub fn intoxication_level(bac: f64) -> IntoxicationLevel {
    if bac < 0.03 {
        IntoxicationLevel::None
    } else if bac < 0.06 {
        IntoxicationLevel::Mild
    } else if bac < 0.10 {
        IntoxicationLevel::Moderate
    } else if bac < 0.15 {
        IntoxicationLevel::Significant
    } else if bac < 0.25 {
        IntoxicationLevel::Severe
    } else {
        IntoxicationLevel::Extreme
    }
}

/// Classify a week's ethanol intake in grams
pub fn health_risk(weekly_alcohol_grams: f64) -> HealthRisk {
    if weekly_alcohol_grams < 70.0 {
        HealthRisk::Low
    } else if weekly_alcohol_grams < 140.0 {
        HealthRisk::Moderate
    } else if weekly_alcohol_grams < 280.0 {
        HealthRisk::High
    } else {
        HealthRisk::VeryHigh
    }
}

/// Hours until BAC from `alcohol_grams` falls to the legal driving threshold
pub fn safe_driving_delay(alcohol_grams: f64, sex: BiologicalSex, weight_kg: f64) -> f64 {
    let initial = peak_bac(alcohol_grams, sex, weight_kg);
    ((initial - LEGAL_DRIVING_BAC) / BAC_ELIMINATION_PER_HOUR).max(0.0)
}
