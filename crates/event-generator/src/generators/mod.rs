//! Individual generators the event factory is composed of.
//!
//! Every generator takes the caller's RNG as `&mut R` so a single seeded
//! source drives a whole run.

pub mod click;
pub mod identity;
pub mod location;
pub mod timestamp;
pub mod uuid;
pub mod view;

pub use identity::IdentityPool;
pub use timestamp::TimestampSampler;

use crate::config::{GeneratorConfig, GeoBounds};
use event_core::{EventType, Payload};
use rand::Rng;

/// Upper-case the first letter of `s`.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the type-specific payload for an event category.
#[derive(Debug, Clone)]
pub struct PayloadGenerator {
    url_pool: Vec<String>,
    second_identifier_probability: f64,
    bounds: GeoBounds,
    accuracy_min: f64,
    accuracy_max: f64,
}

impl PayloadGenerator {
    /// Create a payload generator; the URL pool is drawn from `rng` here.
    pub fn new<R: Rng>(rng: &mut R, config: &GeneratorConfig) -> Self {
        Self {
            url_pool: view::generate_url_pool(rng, config.url_pool_size),
            second_identifier_probability: config.click_second_identifier_probability,
            bounds: config.location_bounds,
            accuracy_min: config.accuracy_min,
            accuracy_max: config.accuracy_max,
        }
    }

    pub fn url_pool(&self) -> &[String] {
        &self.url_pool
    }

    pub fn generate<R: Rng>(&self, rng: &mut R, event_type: EventType) -> Payload {
        match event_type {
            EventType::View => Payload::View(view::generate_view(rng, &self.url_pool)),
            EventType::Click => Payload::Click(click::generate_click(
                rng,
                self.second_identifier_probability,
            )),
            EventType::Location => Payload::Location(location::generate_location(
                rng,
                &self.bounds,
                self.accuracy_min,
                self.accuracy_max,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_payload_matches_requested_type() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = PayloadGenerator::new(&mut rng, &GeneratorConfig::default());

        for event_type in EventType::ALL {
            let payload = generator.generate(&mut rng, event_type);
            assert_eq!(payload.event_type(), event_type);
        }
    }

    #[test]
    fn test_url_pool_size_from_config() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = GeneratorConfig {
            url_pool_size: 8,
            ..Default::default()
        };
        let generator = PayloadGenerator::new(&mut rng, &config);
        assert_eq!(generator.url_pool().len(), 8);
    }
}
