//! Core domain types for dram.
//!
//! This module defines the fundamental types used throughout the system:
//! - Drink categories and their default serving sizes
//! - Consumption events and reusable presets
//! - The user's physiology profile
//! - Classification enums and aggregation outputs

use crate::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Drink Categories
// ============================================================================

/// Closed set of drink categories.
///
/// Declaration order is the enumeration order used for every deterministic
/// tie-break in the aggregation engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DrinkCategory {
    Beer,
    Wine,
    Spirits,
    RiceWine,
    Cocktail,
    Highball,
    ChuHi,
    Other,
}

impl DrinkCategory {
    /// All categories in enumeration order
    pub const ALL: [DrinkCategory; 8] = [
        DrinkCategory::Beer,
        DrinkCategory::Wine,
        DrinkCategory::Spirits,
        DrinkCategory::RiceWine,
        DrinkCategory::Cocktail,
        DrinkCategory::Highball,
        DrinkCategory::ChuHi,
        DrinkCategory::Other,
    ];

    /// Default ABV and serving volume for this category
    pub fn defaults(self) -> CategoryDefaults {
        crate::catalog::category_defaults(self)
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            DrinkCategory::Beer => "Beer",
            DrinkCategory::Wine => "Wine",
            DrinkCategory::Spirits => "Spirits",
            DrinkCategory::RiceWine => "Rice wine",
            DrinkCategory::Cocktail => "Cocktail",
            DrinkCategory::Highball => "Highball",
            DrinkCategory::ChuHi => "Chu-hi",
            DrinkCategory::Other => "Other",
        }
    }

    /// Stable machine key (matches the serde representation)
    pub fn key(self) -> &'static str {
        match self {
            DrinkCategory::Beer => "beer",
            DrinkCategory::Wine => "wine",
            DrinkCategory::Spirits => "spirits",
            DrinkCategory::RiceWine => "rice_wine",
            DrinkCategory::Cocktail => "cocktail",
            DrinkCategory::Highball => "highball",
            DrinkCategory::ChuHi => "chu_hi",
            DrinkCategory::Other => "other",
        }
    }
}

impl fmt::Display for DrinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DrinkCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "beer" => Ok(DrinkCategory::Beer),
            "wine" => Ok(DrinkCategory::Wine),
            "spirits" | "spirit" => Ok(DrinkCategory::Spirits),
            "rice_wine" | "sake" => Ok(DrinkCategory::RiceWine),
            "cocktail" => Ok(DrinkCategory::Cocktail),
            "highball" => Ok(DrinkCategory::Highball),
            "chu_hi" | "chuhi" => Ok(DrinkCategory::ChuHi),
            "other" => Ok(DrinkCategory::Other),
            _ => Err(Error::Validation(format!("Unknown drink category: {}", s))),
        }
    }
}

/// Per-category constants used when the user does not supply a value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryDefaults {
    pub abv_percent: f64,
    pub volume_ml: f64,
}

// ============================================================================
// Consumption Events
// ============================================================================

/// One recorded drink.
///
/// Preconditions (checked by [`ConsumptionEvent::validate`], not by the
/// calculators): `volume_ml > 0`, `0 <= abv_percent < 100`, `price >= 0`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: DrinkCategory,
    pub volume_ml: f64,
    pub abv_percent: f64,
    /// Amount paid. `None` means unknown, not free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl ConsumptionEvent {
    /// Create an event with a fresh id; a missing ABV falls back to the
    /// category default.
    pub fn new(
        category: DrinkCategory,
        volume_ml: f64,
        abv_percent: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            category,
            volume_ml,
            abv_percent: abv_percent.unwrap_or_else(|| category.defaults().abv_percent),
            price: None,
            location: None,
            note: None,
            is_favorite: false,
        }
    }

    /// Create an event from a preset template
    pub fn from_preset(preset: &ConsumptionPreset, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            category: preset.category,
            volume_ml: preset.volume_ml,
            abv_percent: preset.abv_percent,
            price: preset.price,
            location: preset.location.clone(),
            note: preset.note.clone(),
            is_favorite: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    /// Grams of pure ethanol in this drink
    pub fn alcohol_grams(&self) -> f64 {
        crate::pharmacokinetics::pure_alcohol_grams(self.volume_ml, self.abv_percent)
    }

    /// Price with unknown treated as zero, for summing
    pub fn spend(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Check construction preconditions
    pub fn validate(&self) -> Result<()> {
        validate_serving(self.volume_ml, self.abv_percent, self.price)
    }
}

/// A named template used to one-tap-create events
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionPreset {
    pub id: String,
    pub name: String,
    pub category: DrinkCategory,
    pub volume_ml: f64,
    pub abv_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Seeded at first run rather than user-created
    #[serde(default)]
    pub is_default: bool,
}

impl ConsumptionPreset {
    /// Turn a recorded event into a user preset
    pub fn from_event(name: impl Into<String>, event: &ConsumptionEvent) -> Self {
        Self {
            id: format!("user_{}", event.id.simple()),
            name: name.into(),
            category: event.category,
            volume_ml: event.volume_ml,
            abv_percent: event.abv_percent,
            price: event.price,
            location: event.location.clone(),
            note: event.note.clone(),
            is_default: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Preset name must not be empty".into()));
        }
        validate_serving(self.volume_ml, self.abv_percent, self.price)
    }
}

fn validate_serving(volume_ml: f64, abv_percent: f64, price: Option<f64>) -> Result<()> {
    if !volume_ml.is_finite() || volume_ml <= 0.0 {
        return Err(Error::Validation(format!(
            "Volume must be positive, got {} ml",
            volume_ml
        )));
    }
    if !(0.0..100.0).contains(&abv_percent) {
        return Err(Error::Validation(format!(
            "ABV must be in [0, 100), got {}%",
            abv_percent
        )));
    }
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::Validation(format!(
                "Price must be non-negative, got {}",
                price
            )));
        }
    }
    Ok(())
}

// ============================================================================
// User Physiology
// ============================================================================

/// Biological sex, used only to select the Widmark distribution ratio
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BiologicalSex {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl BiologicalSex {
    /// Fraction of body weight the alcohol distributes through
    pub fn distribution_ratio(self) -> f64 {
        match self {
            BiologicalSex::Male => 0.68,
            BiologicalSex::Female => 0.55,
            BiologicalSex::Unspecified => 0.615,
        }
    }

    /// Multiplier applied to the goal's daily limit
    pub fn limit_scale(self) -> f64 {
        match self {
            BiologicalSex::Male => 1.0,
            BiologicalSex::Female => 0.7,
            BiologicalSex::Unspecified => 0.85,
        }
    }
}

impl FromStr for BiologicalSex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(BiologicalSex::Male),
            "female" | "f" => Ok(BiologicalSex::Female),
            "unspecified" | "other" | "none" => Ok(BiologicalSex::Unspecified),
            _ => Err(Error::Validation(format!("Unknown biological sex: {}", s))),
        }
    }
}

/// What the user is aiming for; selects the recommended daily limit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrinkingGoal {
    Reduce,
    #[default]
    Moderate,
    Maintain,
}

impl DrinkingGoal {
    /// Base daily limit in grams of ethanol before sex scaling
    pub fn base_daily_limit_grams(self) -> f64 {
        match self {
            DrinkingGoal::Reduce => 10.0,
            DrinkingGoal::Moderate => 20.0,
            DrinkingGoal::Maintain => 40.0,
        }
    }
}

impl FromStr for DrinkingGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reduce" => Ok(DrinkingGoal::Reduce),
            "moderate" => Ok(DrinkingGoal::Moderate),
            "maintain" => Ok(DrinkingGoal::Maintain),
            _ => Err(Error::Validation(format!("Unknown goal: {}", s))),
        }
    }
}

/// Profile used for pharmacokinetic estimation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPhysiology {
    pub biological_sex: BiologicalSex,
    pub body_weight_kg: f64,
    pub goal: DrinkingGoal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
}

impl Default for UserPhysiology {
    fn default() -> Self {
        Self {
            biological_sex: BiologicalSex::Unspecified,
            body_weight_kg: 60.0,
            goal: DrinkingGoal::Moderate,
            birth_date: None,
            height_cm: None,
        }
    }
}

impl UserPhysiology {
    pub fn distribution_ratio(&self) -> f64 {
        self.biological_sex.distribution_ratio()
    }

    /// Recommended daily limit in grams, scaled by sex
    pub fn daily_limit_grams(&self) -> f64 {
        self.goal.base_daily_limit_grams() * self.biological_sex.limit_scale()
    }

    pub fn weekly_limit_grams(&self) -> f64 {
        self.daily_limit_grams() * 7.0
    }

    /// Age in whole years on `date`; `None` without a birth date or if the
    /// birth date lies after `date`
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if birth > date {
            return None;
        }
        let mut years = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Body mass index; `None` without a positive height
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_cm? / 100.0;
        if height_m <= 0.0 {
            return None;
        }
        Some(self.body_weight_kg / (height_m * height_m))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.body_weight_kg.is_finite() || self.body_weight_kg <= 0.0 {
            return Err(Error::Validation(format!(
                "Body weight must be positive, got {} kg",
                self.body_weight_kg
            )));
        }
        if let Some(height) = self.height_cm {
            if !height.is_finite() || height <= 0.0 {
                return Err(Error::Validation(format!(
                    "Height must be positive, got {} cm",
                    height
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Classifications
// ============================================================================

/// Stepped classification of a BAC value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IntoxicationLevel {
    None,
    Mild,
    Moderate,
    Significant,
    Severe,
    Extreme,
}

impl IntoxicationLevel {
    pub fn label(self) -> &'static str {
        match self {
            IntoxicationLevel::None => "Sober",
            IntoxicationLevel::Mild => "Mild",
            IntoxicationLevel::Moderate => "Moderate",
            IntoxicationLevel::Significant => "Significant",
            IntoxicationLevel::Severe => "Severe",
            IntoxicationLevel::Extreme => "Extreme",
        }
    }
}

/// Health risk classification of a week's consumption
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl HealthRisk {
    pub fn label(self) -> &'static str {
        match self {
            HealthRisk::Low => "Low",
            HealthRisk::Moderate => "Moderate",
            HealthRisk::High => "High",
            HealthRisk::VeryHigh => "Very high",
        }
    }
}

// ============================================================================
// Aggregation Outputs
// ============================================================================

/// Sums over a set of events
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PeriodTotal {
    pub alcohol_grams: f64,
    pub spend: f64,
    pub count: usize,
}

impl PeriodTotal {
    pub fn add(&mut self, event: &ConsumptionEvent) {
        self.alcohol_grams += event.alcohol_grams();
        self.spend += event.spend();
        self.count += 1;
    }

    pub fn merge(&mut self, other: &PeriodTotal) {
        self.alcohol_grams += other.alcohol_grams;
        self.spend += other.spend;
        self.count += other.count;
    }

    pub fn is_alcohol_free(&self) -> bool {
        self.count == 0
    }
}

/// One calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub total: PeriodTotal,
    pub alcohol_free: bool,
}

/// One Monday-aligned calendar week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyBucket {
    pub week_start: NaiveDate,
    pub total: PeriodTotal,
    pub alcohol_free_days: usize,
    pub alcohol_free: bool,
}

/// One calendar month
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub total: PeriodTotal,
    pub alcohol_free_days: usize,
    pub alcohol_free: bool,
}

/// Events and grams falling in one hour of the local day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct HourBucket {
    pub hour: u32,
    pub count: usize,
    pub alcohol_grams: f64,
}

/// A category's share of a period's alcohol mass and spend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: DrinkCategory,
    pub count: usize,
    pub alcohol_grams: f64,
    pub spend: f64,
    pub share_percent: f64,
    pub spend_share_percent: f64,
}
