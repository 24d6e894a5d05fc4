//! Click payloads.

use super::capitalize;
use event_core::ClickPayload;
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

/// Element labels that show up as click targets.
pub const ELEMENT_POOL: &[&str] = &[
    "signup-button",
    "cta-primary",
    "search-input",
    "add-to-cart",
    "learn-more",
    "download-btn",
];

fn element<R: Rng>(rng: &mut R) -> String {
    ELEMENT_POOL
        .choose(rng)
        .copied()
        .unwrap_or("cta-primary")
        .to_string()
}

/// Generate a click on a page element.
///
/// One identifying slot (`element_id` or `xpath`) is always filled; with
/// probability `second_identifier_probability` the other slot is filled too.
pub fn generate_click<R: Rng>(rng: &mut R, second_identifier_probability: f64) -> ClickPayload {
    let primary = element(rng);
    let use_element_id = rng.gen_bool(0.5);
    let word: String = Word().fake_with_rng(rng);
    let text = capitalize(&word);

    let second = if rng.gen_bool(second_identifier_probability) {
        Some(element(rng))
    } else {
        None
    };

    let (element_id, xpath) = if use_element_id {
        (Some(primary), second)
    } else {
        (second, Some(primary))
    };

    ClickPayload {
        element_id,
        xpath,
        text,
    }
}
