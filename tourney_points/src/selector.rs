//! Uniform random choice over candidate ids.

use crate::errors::{PointsError, PointsResult};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;

/// Uniform selector with an injectable random source
///
/// Production uses an OS-seeded generator; tests pass a fixed seed so every
/// choice is reproducible.
pub struct RandomSelector {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl RandomSelector {
    /// Selector seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic selector
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Selector drawing from any random source
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Pick one candidate uniformly
    ///
    /// # Errors
    ///
    /// * `PointsError::EmptyCandidateSet` - `candidates` is empty; `what` names the set
    pub fn choose<'a, T>(&self, what: &str, candidates: &'a [T]) -> PointsResult<&'a T> {
        if candidates.is_empty() {
            return Err(PointsError::EmptyCandidateSet(what.to_string()));
        }
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = rng.random_range(0..candidates.len());
        Ok(&candidates[index])
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for RandomSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSelector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::collections::HashMap;

    #[test]
    fn test_empty_candidates() {
        let selector = RandomSelector::seeded(1);
        let empty: Vec<String> = Vec::new();
        let err = selector.choose("open tournaments", &empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCandidateSet);
        assert!(err.to_string().contains("open tournaments"));
    }

    #[test]
    fn test_single_candidate() {
        let selector = RandomSelector::seeded(7);
        let only = vec!["T1"];
        for _ in 0..10 {
            assert_eq!(*selector.choose("t", &only).unwrap(), "T1");
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let candidates: Vec<u32> = (0..50).collect();
        let a = RandomSelector::seeded(42);
        let b = RandomSelector::seeded(42);
        let picks_a: Vec<u32> = (0..20).map(|_| *a.choose("n", &candidates).unwrap()).collect();
        let picks_b: Vec<u32> = (0..20).map(|_| *b.choose("n", &candidates).unwrap()).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn test_roughly_uniform() {
        let selector = RandomSelector::seeded(2024);
        let candidates = vec!["A", "B", "C", "D"];
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..4000 {
            *counts.entry(*selector.choose("p", &candidates).unwrap()).or_default() += 1;
        }
        for name in &candidates {
            let hits = counts.get(name).copied().unwrap_or(0);
            assert!(
                (800..1200).contains(&hits),
                "{name} chosen {hits} times out of 4000"
            );
        }
    }
}
