//! Event factory: composes the identity pool, timestamp sampler and
//! payload generator into complete events.

use crate::config::{ConfigError, EventCount, GeneratorConfig};
use crate::generators::uuid::generate_event_id;
use crate::generators::{IdentityPool, PayloadGenerator, TimestampSampler};
use event_core::{Event, EventType};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Produces seeded, reproducible sequences of events.
///
/// Each generator owns its RNG, so two generators never share random state.
/// Generators built from the same config and seed produce identical events.
pub struct EventGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    identities: IdentityPool,
    timestamps: TimestampSampler,
    payloads: PayloadGenerator,
    type_weights: WeightedIndex<f64>,
    generated: u64,
}

impl EventGenerator {
    /// Create a generator. The identity pool and URL pool are built here,
    /// before any event is generated.
    pub fn new(config: GeneratorConfig, seed: u64) -> Result<Self, GeneratorError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let identities =
            IdentityPool::generate(&mut rng, config.user_pool_size).ok_or(ConfigError::EmptyUserPool)?;
        let payloads = PayloadGenerator::new(&mut rng, &config);
        let timestamps = TimestampSampler::new(config.window);
        let type_weights = WeightedIndex::new(config.weights.as_array())
            .map_err(|e| ConfigError::InvalidWeights(e.to_string()))?;

        debug!(
            "Event generator ready: {} users, {} urls, seed {}",
            identities.len(),
            payloads.url_pool().len(),
            seed
        );

        Ok(Self {
            config,
            rng,
            identities,
            timestamps,
            payloads,
            type_weights,
            generated: 0,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn identities(&self) -> &IdentityPool {
        &self.identities
    }

    /// Number of events produced so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Resolve the configured count policy into a concrete event count.
    pub fn draw_count(&mut self) -> u64 {
        match self.config.event_count {
            EventCount::Fixed(count) => count,
            EventCount::Range { min, max } => self.rng.gen_range(min..=max),
        }
    }

    /// Generate the next event.
    pub fn next_event(&mut self) -> Event {
        let event_type = EventType::ALL[self.type_weights.sample(&mut self.rng)];
        let user_id = self.identities.choose(&mut self.rng).to_string();
        let timestamp = self.timestamps.sample(&mut self.rng);
        let payload = self.payloads.generate(&mut self.rng, event_type);
        let event_id = generate_event_id(&mut self.rng);

        self.generated += 1;
        Event::new(event_id, user_id, timestamp, payload)
    }

    /// Generate `count` events in order.
    pub fn generate(&mut self, count: u64) -> Vec<Event> {
        self.events(count).collect()
    }

    /// Generate one run's worth of events, using the configured count policy.
    pub fn generate_run(&mut self) -> Vec<Event> {
        let count = self.draw_count();
        self.generate(count)
    }

    /// Lazily generate `count` events.
    pub fn events(&mut self, count: u64) -> EventIterator<'_> {
        EventIterator {
            generator: self,
            remaining: count,
        }
    }
}

/// Iterator that lazily generates events.
pub struct EventIterator<'a> {
    generator: &'a mut EventGenerator,
    remaining: u64,
}

impl Iterator for EventIterator<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next_event())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EventIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EventWeights, TimeWindow};
    use event_core::Payload;
    use std::collections::{HashMap, HashSet};

    fn small_config() -> GeneratorConfig {
        GeneratorConfig::default()
            .with_window(TimeWindow::parse("2025-05-01", "2025-05-02").unwrap())
            .with_event_count(10)
    }

    #[test]
    fn test_generate_exact_count() {
        let mut generator = EventGenerator::new(small_config(), 42).unwrap();
        let events = generator.generate(10);

        assert_eq!(events.len(), 10);
        assert_eq!(generator.generated(), 10);
    }

    #[test]
    fn test_deterministic_generation() {
        let mut gen1 = EventGenerator::new(small_config(), 42).unwrap();
        let mut gen2 = EventGenerator::new(small_config(), 42).unwrap();

        assert_eq!(gen1.generate(50), gen2.generate(50));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut gen1 = EventGenerator::new(small_config(), 1).unwrap();
        let mut gen2 = EventGenerator::new(small_config(), 2).unwrap();

        assert_ne!(gen1.generate(5), gen2.generate(5));
    }

    #[test]
    fn test_event_invariants() {
        let config = small_config();
        let window = config.window;
        let mut generator = EventGenerator::new(config, 7).unwrap();
        let events = generator.generate(5_000);

        let ids: HashSet<_> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids.len(), events.len());

        for event in &events {
            assert!(window.contains(&event.timestamp));
            assert!(generator.identities().contains(&event.user_id));
        }
    }

    #[test]
    fn test_type_distribution_converges() {
        let mut generator = EventGenerator::new(small_config(), 2025).unwrap();
        let total = 100_000;

        let mut counts: HashMap<EventType, u64> = HashMap::new();
        for event in generator.events(total) {
            *counts.entry(event.event_type()).or_default() += 1;
        }

        for (event_type, weight) in [
            (EventType::View, 0.6),
            (EventType::Click, 0.3),
            (EventType::Location, 0.1),
        ] {
            let fraction = counts[&event_type] as f64 / total as f64;
            assert!(
                (fraction - weight).abs() < 0.01,
                "{event_type}: {fraction} vs {weight}"
            );
        }
    }

    #[test]
    fn test_click_identifier_mix() {
        let mut generator = EventGenerator::new(small_config(), 99).unwrap();

        let clicks: Vec<_> = generator
            .events(100_000)
            .filter_map(|e| match e.payload {
                Payload::Click(click) => Some(click),
                _ => None,
            })
            .collect();

        assert!(clicks.iter().all(|c| (1..=2).contains(&c.identifier_count())));
        let doubles = clicks.iter().filter(|c| c.identifier_count() == 2).count();
        let rate = doubles as f64 / clicks.len() as f64;
        assert!((rate - 0.4).abs() < 0.02, "two-identifier rate {rate}");
    }

    #[test]
    fn test_zero_weight_type_never_drawn() {
        let config = GeneratorConfig {
            weights: EventWeights {
                view: 1.0,
                click: 0.0,
                location: 0.0,
            },
            ..small_config()
        };
        let mut generator = EventGenerator::new(config, 3).unwrap();
        assert!(generator
            .generate(500)
            .iter()
            .all(|e| e.event_type() == EventType::View));
    }

    #[test]
    fn test_draw_count_respects_range() {
        let config = GeneratorConfig {
            event_count: EventCount::Range { min: 3, max: 6 },
            ..small_config()
        };
        let mut generator = EventGenerator::new(config, 5).unwrap();

        for _ in 0..50 {
            let count = generator.draw_count();
            assert!((3..=6).contains(&count));
        }
        let events = generator.generate_run();
        assert!((3..=6).contains(&(events.len() as u64)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig::default().with_user_pool_size(0);
        let result = EventGenerator::new(config, 1);
        assert!(matches!(
            result,
            Err(GeneratorError::Config(ConfigError::EmptyUserPool))
        ));
    }
}
