//! Caller-owned memo of category rate lookups.

use std::collections::HashMap;

use crate::config::CategoryRate;
use crate::ledger::LedgerReader;
use crate::EntitlementResult;

/// Memoised `(category, year) -> rate` resolutions.
///
/// Absent rates are memoised too. The generation counter moves on every
/// invalidation so callers can tell whether results predate an edit.
#[derive(Debug, Clone, Default)]
pub struct RateCache {
    entries: HashMap<(String, i32), Option<CategoryRate>>,
    generation: u64,
    hits: u64,
    misses: u64,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<L: LedgerReader + ?Sized>(
        &mut self,
        ledger: &L,
        category: &str,
        year: i32,
    ) -> EntitlementResult<Option<CategoryRate>> {
        let key = (category.to_string(), year);
        if let Some(rate) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*rate);
        }
        self.misses += 1;
        let rate = ledger.category_rate(category, year)?;
        self.entries.insert(key, rate);
        Ok(rate)
    }

    /// Forget everything, e.g. after rates were edited.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn invalidate_year(&mut self, year: i32) {
        self.entries.retain(|(_, y), _| *y != year);
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ledger() -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new();
        ledger.add_category_rate(
            "engineer",
            2024,
            CategoryRate {
                charged_rate: dec!(400),
                production_rate: dec!(500),
                complete_rate: dec!(600),
            },
        );
        ledger
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let ledger = ledger();
        let mut cache = RateCache::new();
        let first = cache.resolve(&ledger, "engineer", 2024).unwrap();
        let second = cache.resolve(&ledger, "engineer", 2024).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_missing_rate_is_memoised() {
        let ledger = ledger();
        let mut cache = RateCache::new();
        assert!(cache.resolve(&ledger, "intern", 2024).unwrap().is_none());
        assert!(cache.resolve(&ledger, "intern", 2024).unwrap().is_none());
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidation_bumps_generation() {
        let ledger = ledger();
        let mut cache = RateCache::new();
        cache.resolve(&ledger, "engineer", 2024).unwrap();
        cache.resolve(&ledger, "engineer", 2025).unwrap();

        cache.invalidate_year(2025);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.generation(), 1);

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 2);
    }
}
