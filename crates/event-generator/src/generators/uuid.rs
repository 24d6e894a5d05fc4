//! Event id generator.

use rand::Rng;
use uuid::Uuid;

/// Draw a version 4 UUID from the provided RNG.
///
/// Using the caller's RNG instead of the OS source keeps seeded runs
/// reproducible down to the event ids.
pub fn generate_event_id<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40; // version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // RFC 4122 variant

    Uuid::from_bytes(bytes)
}
