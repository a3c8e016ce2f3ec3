//! Point-in-time consumption status ("right now" metrics).

use crate::aggregation::Aggregator;
use crate::pharmacokinetics::{
    combined_bac, estimate_sobering_time, health_risk, intoxication_level, remaining_alcohol,
    safe_driving_delay,
};
use crate::{ConsumptionEvent, HealthRisk, IntoxicationLevel, PeriodTotal, UserPhysiology};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Metrics derived for a single instant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionStatus {
    pub at: DateTime<Utc>,
    pub current_bac: f64,
    pub intoxication: IntoxicationLevel,
    pub remaining_grams: f64,
    pub sobering_hours: f64,
    pub driving_delay_hours: f64,
    pub today: PeriodTotal,
    pub week_grams: f64,
    pub health_risk: HealthRisk,
    pub daily_limit_grams: f64,
    pub limit_used_percent: f64,
}

impl ConsumptionStatus {
    /// Compute status at `now`
    ///
    /// Only events on `now`'s local calendar day and not after `now` feed the
    /// BAC and remaining-alcohol figures. The weekly risk uses the 7 days
    /// ending today.
    pub fn compute<Tz: TimeZone>(
        events: &[ConsumptionEvent],
        profile: &UserPhysiology,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        let aggregator = Aggregator::new(events, tz);

        let todays_events: Vec<&ConsumptionEvent> = aggregator
            .events_on(today)
            .into_iter()
            .filter(|e| e.timestamp <= now)
            .collect();

        let current_bac = combined_bac(
            todays_events.iter().copied(),
            profile.biological_sex,
            profile.body_weight_kg,
            now,
        );
        let remaining_grams: f64 = todays_events
            .iter()
            .map(|e| remaining_alcohol(e, now))
            .sum();

        let week_grams: f64 = aggregator
            .week_window(today)
            .iter()
            .map(|b| b.total.alcohol_grams)
            .sum();

        let today_total = aggregator.daily_total(today);
        let daily_limit_grams = profile.daily_limit_grams();
        let limit_used_percent = if daily_limit_grams > 0.0 {
            today_total.alcohol_grams / daily_limit_grams * 100.0
        } else {
            0.0
        };

        tracing::debug!(
            "Status at {}: {} events today, BAC {:.4}, {:.1} g remaining",
            now,
            todays_events.len(),
            current_bac,
            remaining_grams
        );

        Self {
            at: now,
            current_bac,
            intoxication: intoxication_level(current_bac),
            remaining_grams,
            sobering_hours: estimate_sobering_time(remaining_grams),
            driving_delay_hours: safe_driving_delay(
                remaining_grams,
                profile.biological_sex,
                profile.body_weight_kg,
            ),
            today: today_total,
            week_grams,
            health_risk: health_risk(week_grams),
            daily_limit_grams,
            limit_used_percent,
        }
    }

    /// Whether the BAC estimate is under the legal driving threshold
    pub fn safe_to_drive(&self) -> bool {
        self.current_bac < crate::pharmacokinetics::LEGAL_DRIVING_BAC
            && self.driving_delay_hours == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BiologicalSex, DrinkCategory, DrinkingGoal};
    use chrono::Duration;

    fn profile() -> UserPhysiology {
        UserPhysiology {
            biological_sex: BiologicalSex::Male,
            body_weight_kg: 70.0,
            goal: DrinkingGoal::Moderate,
            ..Default::default()
        }
    }

    fn beer(ts: DateTime<Utc>) -> ConsumptionEvent {
        ConsumptionEvent::new(DrinkCategory::Beer, 350.0, Some(5.0), ts)
    }

    #[test]
    fn test_status_with_no_events() {
        crate::logging::init_test();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap();
        let status = ConsumptionStatus::compute(&[], &profile(), now, Utc);

        assert_eq!(status.current_bac, 0.0);
        assert_eq!(status.intoxication, IntoxicationLevel::None);
        assert_eq!(status.remaining_grams, 0.0);
        assert_eq!(status.today, PeriodTotal::default());
        assert_eq!(status.health_risk, HealthRisk::Low);
        assert!(status.safe_to_drive());
    }

    #[test]
    fn test_status_tonight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap();
        let events = vec![
            beer(now - Duration::hours(2)),
            beer(now - Duration::hours(1)),
            // Yesterday: counts toward the week but not toward BAC
            beer(now - Duration::hours(24)),
        ];
        let status = ConsumptionStatus::compute(&events, &profile(), now, Utc);

        let per_drink = 14.0 / (70_000.0 * 0.68) * 100.0;
        let expected_bac = (per_drink - 0.03) + (per_drink - 0.015);
        assert!((status.current_bac - expected_bac).abs() < 1e-9);
        assert_eq!(status.intoxication, IntoxicationLevel::Mild);
        assert!(!status.safe_to_drive());

        // 14 - 14 (2h) + 14 - 7 (1h)
        assert!((status.remaining_grams - 7.0).abs() < 1e-9);
        assert!((status.sobering_hours - 1.0).abs() < 1e-9);
        assert_eq!(status.today.count, 2);
        assert!((status.week_grams - 42.0).abs() < 1e-9);
        assert!((status.limit_used_percent - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_ignores_future_events() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let events = vec![beer(now + Duration::hours(3))];
        let status = ConsumptionStatus::compute(&events, &profile(), now, Utc);
        assert_eq!(status.current_bac, 0.0);
        assert_eq!(status.remaining_grams, 0.0);
        // Still on today's bucket
        assert_eq!(status.today.count, 1);
    }

    #[test]
    fn test_status_heavy_week() {
        let now = Utc.with_ymd_and_hms(2024, 6, 7, 12, 0, 0).unwrap();
        let events: Vec<_> = (1..=6)
            .flat_map(|d| {
                let ts = now - Duration::days(d);
                vec![beer(ts), beer(ts)]
            })
            .collect();
        let status = ConsumptionStatus::compute(&events, &profile(), now, Utc);
        assert!((status.week_grams - 168.0).abs() < 1e-9);
        assert_eq!(status.health_risk, HealthRisk::High);
    }
}
