//! Built-in drink data: per-category defaults and the presets seeded at first run.

use crate::types::*;
use crate::Result;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default presets - built once and reused across all operations
static DEFAULT_PRESETS: Lazy<Vec<ConsumptionPreset>> = Lazy::new(build_default_presets);

/// Default ABV and serving volume for each category
pub fn category_defaults(category: DrinkCategory) -> CategoryDefaults {
    let (abv_percent, volume_ml) = match category {
        DrinkCategory::Beer => (5.0, 350.0),
        DrinkCategory::Wine => (12.0, 150.0),
        DrinkCategory::Spirits => (40.0, 30.0),
        DrinkCategory::RiceWine => (15.0, 180.0),
        DrinkCategory::Cocktail => (10.0, 200.0),
        DrinkCategory::Highball => (7.0, 350.0),
        DrinkCategory::ChuHi => (5.0, 350.0),
        DrinkCategory::Other => (5.0, 200.0),
    };
    CategoryDefaults {
        abv_percent,
        volume_ml,
    }
}

/// Get a reference to the cached default presets
pub fn default_presets() -> &'static [ConsumptionPreset] {
    &DEFAULT_PRESETS
}

/// Builds the presets seeded into a fresh store
///
/// **Note**: prefer `default_presets()` for read-only access. This function
/// returns owned values for seeding user state.
pub fn build_default_presets() -> Vec<ConsumptionPreset> {
    vec![
        preset("default_beer_can", "Beer (can)", DrinkCategory::Beer, 350.0, 5.0),
        preset("default_beer_large", "Beer (large)", DrinkCategory::Beer, 500.0, 5.0),
        preset("default_wine_glass", "Wine (glass)", DrinkCategory::Wine, 150.0, 12.0),
        preset("default_sake_go", "Sake (1 go)", DrinkCategory::RiceWine, 180.0, 15.0),
        preset("default_highball", "Highball", DrinkCategory::Highball, 350.0, 7.0),
        preset("default_chuhi_strong", "Chu-hi (strong)", DrinkCategory::ChuHi, 350.0, 9.0),
        preset("default_spirits_shot", "Shot", DrinkCategory::Spirits, 30.0, 40.0),
    ]
}

fn preset(
    id: &str,
    name: &str,
    category: DrinkCategory,
    volume_ml: f64,
    abv_percent: f64,
) -> ConsumptionPreset {
    ConsumptionPreset {
        id: id.into(),
        name: name.into(),
        category,
        volume_ml,
        abv_percent,
        price: None,
        location: None,
        note: None,
        is_default: true,
    }
}

/// Validate a preset list: every preset well-formed, ids unique
pub fn validate_presets(presets: &[ConsumptionPreset]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for preset in presets {
        if let Err(e) = preset.validate() {
            errors.push(format!("Preset '{}': {}", preset.id, e));
        }
        if !seen.insert(preset.id.as_str()) {
            errors.push(format!("Duplicate preset id '{}'", preset.id));
        }
    }

    errors
}

/// Find a preset by id, falling back to a case-insensitive name match
pub fn find_preset<'a>(
    presets: &'a [ConsumptionPreset],
    key: &str,
) -> Result<&'a ConsumptionPreset> {
    presets
        .iter()
        .find(|p| p.id == key)
        .or_else(|| presets.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| crate::Error::NotFound(format!("preset '{}'", key)))
}
