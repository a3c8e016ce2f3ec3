//! Calendar-bucketed aggregation of consumption events.
//!
//! An [`Aggregator`] borrows a snapshot of events together with the time zone
//! that defines "local calendar day". All views are computed on demand and
//! never touch the source slice. Empty inputs produce zero-valued buckets.
//!
//! Tie-breaks follow [`DrinkCategory::ALL`] order.

use crate::{
    CategoryBreakdown, ConsumptionEvent, DailyBucket, DrinkCategory, HourBucket, MonthlyBucket,
    PeriodTotal, WeeklyBucket,
};
use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone, Timelike};
use std::collections::{BTreeMap, BTreeSet};

/// A span of calendar days to evaluate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayWindow {
    /// 7 days ending at `ending` inclusive
    Week { ending: NaiveDate },
    /// Days of the month containing `containing`, up to `through`
    Month {
        containing: NaiveDate,
        through: NaiveDate,
    },
    /// `start..=end`
    Range { start: NaiveDate, end: NaiveDate },
    /// From the earliest recorded event's day through `through`
    AllTime { through: NaiveDate },
}

/// Read-only aggregation view over an event snapshot
pub struct Aggregator<'a, Tz: TimeZone> {
    events: &'a [ConsumptionEvent],
    tz: Tz,
}

impl<'a, Tz: TimeZone> Aggregator<'a, Tz> {
    pub fn new(events: &'a [ConsumptionEvent], tz: Tz) -> Self {
        Self { events, tz }
    }

    /// Local calendar day an event falls on
    pub fn local_day(&self, event: &ConsumptionEvent) -> NaiveDate {
        event.timestamp.with_timezone(&self.tz).date_naive()
    }

    /// Day of the earliest recorded event
    pub fn earliest_day(&self) -> Option<NaiveDate> {
        self.events.iter().map(|e| self.local_day(e)).min()
    }

    /// Events whose local day lies in `start..=end`
    pub fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&'a ConsumptionEvent> {
        self.events
            .iter()
            .filter(|e| {
                let day = self.local_day(e);
                start <= day && day <= end
            })
            .collect()
    }

    /// Events on one local day
    pub fn events_on(&self, date: NaiveDate) -> Vec<&'a ConsumptionEvent> {
        self.events_between(date, date)
    }

    /// Totals for one local calendar day; time of day is ignored
    pub fn daily_total(&self, date: NaiveDate) -> PeriodTotal {
        self.range_total(date, date)
    }

    /// Totals for `start..=end` at day granularity; a reversed range is empty
    pub fn range_total(&self, start: NaiveDate, end: NaiveDate) -> PeriodTotal {
        let mut total = PeriodTotal::default();
        for event in self.events_between(start, end) {
            total.add(event);
        }
        total
    }

    /// The 7 days ending at `ending`, oldest first
    pub fn week_window(&self, ending: NaiveDate) -> Vec<DailyBucket> {
        let start = ending - Duration::days(6);
        self.daily_buckets(start, ending)
    }

    /// Every day of the month containing `containing`, oldest first
    pub fn month_window(&self, containing: NaiveDate) -> Vec<DailyBucket> {
        let (first, last) = month_bounds(containing);
        self.daily_buckets(first, last)
    }

    /// One bucket per day in `start..=end`
    pub fn daily_buckets(&self, start: NaiveDate, end: NaiveDate) -> Vec<DailyBucket> {
        let by_day = self.totals_by_day();
        days_in(start, end)
            .map(|date| {
                let total = by_day.get(&date).copied().unwrap_or_default();
                DailyBucket {
                    date,
                    total,
                    alcohol_free: total.is_alcohol_free(),
                }
            })
            .collect()
    }

    /// Days in `window` with no recorded event
    ///
    /// An all-time window starts at the earliest event's day and is empty
    /// when there are no events.
    pub fn alcohol_free_day_count(&self, window: DayWindow) -> usize {
        let Some((start, end)) = self.resolve(window) else {
            return 0;
        };
        let drinking_days = self.drinking_days();
        days_in(start, end)
            .filter(|d| !drinking_days.contains(d))
            .count()
    }

    /// Consecutive alcohol-free days ending at `today`
    ///
    /// Days before the earliest event do not count; no events means 0.
    pub fn alcohol_free_streak(&self, today: NaiveDate) -> usize {
        let Some(earliest) = self.earliest_day() else {
            return 0;
        };
        let drinking_days = self.drinking_days();

        let mut streak = 0;
        let mut day = today;
        while day >= earliest && !drinking_days.contains(&day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// `weeks` Monday-aligned calendar weeks, the last containing `ending`
    ///
    /// Days after `ending` are excluded from each bucket.
    pub fn weekly_buckets(&self, ending: NaiveDate, weeks: usize) -> Vec<WeeklyBucket> {
        let last_start = week_start(ending);
        let by_day = self.totals_by_day();

        (0..weeks)
            .rev()
            .map(|i| {
                let start = last_start - Duration::weeks(i as i64);
                let end = (start + Duration::days(6)).min(ending);
                let (total, alcohol_free_days) = sum_days(&by_day, start, end);
                WeeklyBucket {
                    week_start: start,
                    total,
                    alcohol_free_days,
                    alcohol_free: total.is_alcohol_free(),
                }
            })
            .collect()
    }

    /// The 12 calendar months of `year`; days after `through` are excluded
    pub fn monthly_buckets(&self, year: i32, through: NaiveDate) -> Vec<MonthlyBucket> {
        let by_day = self.totals_by_day();

        (1..=12)
            .filter_map(|month| {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let (_, last) = month_bounds(first);
                let (total, alcohol_free_days) = sum_days(&by_day, first, last.min(through));
                Some(MonthlyBucket {
                    year,
                    month,
                    total,
                    alcohol_free_days,
                    alcohol_free: total.is_alcohol_free(),
                })
            })
            .collect()
    }

    /// Count and grams per local hour of day, hours 0 through 23
    pub fn hourly_distribution(&self) -> Vec<HourBucket> {
        let mut buckets: Vec<HourBucket> = (0..24)
            .map(|hour| HourBucket {
                hour,
                ..Default::default()
            })
            .collect();

        for event in self.events {
            let hour = event.timestamp.with_timezone(&self.tz).hour() as usize;
            if let Some(bucket) = buckets.get_mut(hour) {
                bucket.count += 1;
                bucket.alcohol_grams += event.alcohol_grams();
            }
        }
        buckets
    }

    fn resolve(&self, window: DayWindow) -> Option<(NaiveDate, NaiveDate)> {
        match window {
            DayWindow::Week { ending } => Some((ending - Duration::days(6), ending)),
            DayWindow::Month {
                containing,
                through,
            } => {
                let (first, last) = month_bounds(containing);
                Some((first, last.min(through)))
            }
            DayWindow::Range { start, end } => Some((start, end)),
            DayWindow::AllTime { through } => self.earliest_day().map(|first| (first, through)),
        }
    }

    fn totals_by_day(&self) -> BTreeMap<NaiveDate, PeriodTotal> {
        let mut by_day: BTreeMap<NaiveDate, PeriodTotal> = BTreeMap::new();
        for event in self.events {
            by_day.entry(self.local_day(event)).or_default().add(event);
        }
        by_day
    }

    fn drinking_days(&self) -> BTreeSet<NaiveDate> {
        self.events.iter().map(|e| self.local_day(e)).collect()
    }
}

/// Per-category share of alcohol mass and spend, largest mass first
///
/// Equal masses keep enumeration order. Shares are 0 when the period total is 0.
pub fn category_breakdown<'a, I>(events: I) -> Vec<CategoryBreakdown>
where
    I: IntoIterator<Item = &'a ConsumptionEvent>,
{
    let mut per_category: BTreeMap<DrinkCategory, PeriodTotal> = BTreeMap::new();
    for event in events {
        per_category.entry(event.category).or_default().add(event);
    }

    let total_grams: f64 = per_category.values().map(|t| t.alcohol_grams).sum();
    let total_spend: f64 = per_category.values().map(|t| t.spend).sum();

    let mut breakdown: Vec<CategoryBreakdown> = per_category
        .into_iter()
        .map(|(category, total)| CategoryBreakdown {
            category,
            count: total.count,
            alcohol_grams: total.alcohol_grams,
            spend: total.spend,
            share_percent: percent_of(total.alcohol_grams, total_grams),
            spend_share_percent: percent_of(total.spend, total_spend),
        })
        .collect();

    // Stable sort keeps enumeration order among equal masses
    breakdown.sort_by(|a, b| b.alcohol_grams.total_cmp(&a.alcohol_grams));
    breakdown
}

/// Category with the most events; ties go to the earlier category in
/// enumeration order
pub fn most_frequent_category<'a, I>(events: I) -> Option<DrinkCategory>
where
    I: IntoIterator<Item = &'a ConsumptionEvent>,
{
    let mut counts: BTreeMap<DrinkCategory, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.category).or_insert(0) += 1;
    }

    let mut best: Option<(DrinkCategory, usize)> = None;
    for (category, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn days_in(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

fn sum_days(
    by_day: &BTreeMap<NaiveDate, PeriodTotal>,
    start: NaiveDate,
    end: NaiveDate,
) -> (PeriodTotal, usize) {
    let mut total = PeriodTotal::default();
    let mut alcohol_free_days = 0;
    for day in days_in(start, end) {
        match by_day.get(&day) {
            Some(day_total) => total.merge(day_total),
            None => alcohol_free_days += 1,
        }
    }
    (total, alcohol_free_days)
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
