//! Location payloads.

use crate::config::GeoBounds;
use event_core::LocationPayload;
use rand::Rng;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Lowest and highest one-decimal values inside `[min, max]`, or `None`
/// when the range holds no such value.
pub fn one_decimal_range(min: f64, max: f64) -> Option<(f64, f64)> {
    // The epsilon absorbs representation error such as 0.3 * 10 = 3.0000000000000004.
    let low = ((min * 10.0) - 1e-9).ceil() / 10.0;
    let high = ((max * 10.0) + 1e-9).floor() / 10.0;
    (low <= high).then_some((low, high))
}

/// Generate a location ping inside `bounds`.
///
/// Coordinates are rounded to five decimals (about a metre). Accuracy is
/// drawn between the one-decimal values nearest inside its bounds, so it
/// always has exactly one decimal.
pub fn generate_location<R: Rng>(
    rng: &mut R,
    bounds: &GeoBounds,
    accuracy_min: f64,
    accuracy_max: f64,
) -> LocationPayload {
    let latitude = rng.gen_range(bounds.min_latitude..=bounds.max_latitude);
    let longitude = rng.gen_range(bounds.min_longitude..=bounds.max_longitude);
    let (accuracy_low, accuracy_high) =
        one_decimal_range(accuracy_min, accuracy_max).unwrap_or((accuracy_min, accuracy_max));
    let accuracy = rng.gen_range(accuracy_low..=accuracy_high);

    LocationPayload {
        latitude: round_to(latitude, 5).clamp(bounds.min_latitude, bounds.max_latitude),
        longitude: round_to(longitude, 5).clamp(bounds.min_longitude, bounds.max_longitude),
        accuracy: round_to(accuracy, 1).clamp(accuracy_low, accuracy_high),
    }
}
