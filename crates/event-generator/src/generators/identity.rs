//! Identity pool: the fixed set of users a run attributes events to.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Distinct synthetic user identifiers, built once per run.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_ids: Vec<String>,
}

impl IdentityPool {
    /// Generate `size` distinct identifiers of the form `user_<8 hex digits>`.
    ///
    /// Returns `None` when `size` is zero, since an empty pool cannot
    /// serve any selection.
    pub fn generate<R: Rng>(rng: &mut R, size: usize) -> Option<Self> {
        if size == 0 {
            return None;
        }

        let mut seen = HashSet::with_capacity(size);
        let mut user_ids = Vec::with_capacity(size);
        while user_ids.len() < size {
            let id = format!("user_{:08x}", rng.gen::<u32>());
            if seen.insert(id.clone()) {
                user_ids.push(id);
            }
        }

        Some(Self { user_ids })
    }

    /// Pick one identifier uniformly at random.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &str {
        // The pool is never empty, see `generate`.
        self.user_ids
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }

    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pool_is_distinct() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = IdentityPool::generate(&mut rng, 150).unwrap();

        assert_eq!(pool.len(), 150);
        let unique: HashSet<&String> = pool.user_ids().iter().collect();
        assert_eq!(unique.len(), 150);
    }

    #[test]
    fn test_identifier_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = IdentityPool::generate(&mut rng, 5).unwrap();

        for id in pool.user_ids() {
            let suffix = id.strip_prefix("user_").expect("missing prefix");
            assert_eq!(suffix.len(), 8);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_choose_stays_in_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        let pool = IdentityPool::generate(&mut rng, 3).unwrap();

        for _ in 0..100 {
            let id = pool.choose(&mut rng).to_string();
            assert!(pool.contains(&id));
        }
    }

    #[test]
    fn test_empty_pool_refused() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(IdentityPool::generate(&mut rng, 0).is_none());
    }
}
