//! Per-evaluation statistics, surfaced to callers the way the
//! predecessor pipeline's trace/stats types were: one entry per stratum,
//! with round counts and timings cheap enough to always collect.

use crate::term::PredicateSym;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StratumStats {
    pub predicates: Vec<PredicateSym>,
    pub rounds: usize,
    pub facts_derived: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct EvalStats {
    pub strata: Vec<StratumStats>,
}

impl EvalStats {
    pub fn total_facts_derived(&self) -> usize {
        self.strata.iter().map(|s| s.facts_derived).sum()
    }

    pub fn total_rounds(&self) -> usize {
        self.strata.iter().map(|s| s.rounds).sum()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.strata.iter().map(|s| s.elapsed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_across_strata() {
        let stats = EvalStats {
            strata: vec![
                StratumStats {
                    predicates: vec![PredicateSym::new("a", 1)],
                    rounds: 2,
                    facts_derived: 5,
                    elapsed: Duration::from_millis(10),
                },
                StratumStats {
                    predicates: vec![PredicateSym::new("b", 1)],
                    rounds: 3,
                    facts_derived: 7,
                    elapsed: Duration::from_millis(20),
                },
            ],
        };
        assert_eq!(stats.total_facts_derived(), 12);
        assert_eq!(stats.total_rounds(), 5);
        assert_eq!(stats.total_elapsed(), Duration::from_millis(30));
    }
}
