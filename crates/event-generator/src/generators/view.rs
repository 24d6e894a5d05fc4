//! Page view payloads.

use super::capitalize;
use event_core::ViewPayload;
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::{Sentence, Word, Words};
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

fn domain_name<R: Rng>(rng: &mut R) -> String {
    let name: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("{name}.{suffix}")
}

fn slug<R: Rng>(rng: &mut R) -> String {
    let words: Vec<String> = Words(2..3).fake_with_rng(rng);
    words.join("-")
}

/// A four-word page title, capitalized and ending in a period.
fn title<R: Rng>(rng: &mut R) -> String {
    let sentence: String = Sentence(4..5).fake_with_rng(rng);
    capitalize(&sentence)
}

/// Build a pool of `size` URLs following common site layouts.
pub fn generate_url_pool<R: Rng>(rng: &mut R, size: usize) -> Vec<String> {
    (0..size)
        .map(|i| {
            let domain = domain_name(rng);
            match i % 5 {
                0 => format!("https://{domain}/products"),
                1 => format!("https://{domain}/blog/{}", slug(rng)),
                2 => format!("https://{domain}/contact"),
                3 => format!("https://{domain}/about"),
                _ => format!("https://{domain}/pricing"),
            }
        })
        .collect()
}

pub fn generate_view<R: Rng>(rng: &mut R, url_pool: &[String]) -> ViewPayload {
    let url = match url_pool.choose(rng) {
        Some(url) => url.clone(),
        None => format!("https://{}/", domain_name(rng)),
    };
    ViewPayload {
        url,
        title: title(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_url_pool_layouts() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = generate_url_pool(&mut rng, 5);

        assert_eq!(pool.len(), 5);
        assert!(pool.iter().all(|u| u.starts_with("https://")));
        assert!(pool[0].ends_with("/products"));
        assert!(pool[1].contains("/blog/"));
        assert!(pool[2].ends_with("/contact"));
        assert!(pool[3].ends_with("/about"));
        assert!(pool[4].ends_with("/pricing"));
    }

    #[test]
    fn test_domain_has_suffix() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let domain = domain_name(&mut rng);
            let (name, suffix) = domain.rsplit_once('.').unwrap();
            assert!(!name.is_empty() && !suffix.is_empty(), "{domain}");
        }
    }

    #[test]
    fn test_title_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let title = title(&mut rng);
            assert!(title.ends_with('.'), "{title}");
            assert!(title.chars().next().unwrap().is_uppercase(), "{title}");
            assert_eq!(title.trim_end_matches('.').split(' ').count(), 4, "{title}");
        }
    }

    #[test]
    fn test_same_seed_same_text() {
        let a = generate_url_pool(&mut StdRng::seed_from_u64(3), 5);
        let b = generate_url_pool(&mut StdRng::seed_from_u64(3), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_view_uses_pool() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = generate_url_pool(&mut rng, 5);

        for _ in 0..50 {
            let view = generate_view(&mut rng, &pool);
            assert!(pool.contains(&view.url));
            assert!(view.title.ends_with('.'));
        }
    }
}
