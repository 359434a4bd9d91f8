//! Run statistics, owned by a single filtering run.
//!
//! Counters are cumulative per pipeline stage: an address counted as
//! `deliverable` is also counted under `valid_syntax` and `has_mx`, mirroring
//! the short-circuit pipeline. Counters only ever grow; resumed runs restore
//! prior values from the checkpoint and keep incrementing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::Outcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub valid_syntax: u64,
    pub has_mx: u64,
    pub deliverable: u64,
    pub failed: u64,
    /// Failure counts keyed by outcome label, for the end-of-run breakdown.
    #[serde(default)]
    pub failure_reasons: BTreeMap<String, u64>,
}

impl RunStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Deliverable => {
                self.valid_syntax += 1;
                self.has_mx += 1;
                self.deliverable += 1;
            }
            Outcome::NonDeliverable => {
                self.valid_syntax += 1;
                self.has_mx += 1;
                self.count_failure(outcome);
            }
            Outcome::NoMxRecord => {
                self.valid_syntax += 1;
                self.count_failure(outcome);
            }
            Outcome::InvalidSyntax => {
                self.count_failure(outcome);
            }
        }
    }

    fn count_failure(&mut self, outcome: Outcome) {
        self.failed += 1;
        *self
            .failure_reasons
            .entry(outcome.label().to_string())
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliverable_counts_every_stage() {
        let mut stats = RunStats::default();
        stats.record(Outcome::Deliverable);
        assert_eq!(stats.valid_syntax, 1);
        assert_eq!(stats.has_mx, 1);
        assert_eq!(stats.deliverable, 1);
        assert_eq!(stats.failed, 0);
        assert!(stats.failure_reasons.is_empty());
    }

    #[test]
    fn failures_land_in_the_breakdown() {
        let mut stats = RunStats::default();
        stats.record(Outcome::InvalidSyntax);
        stats.record(Outcome::NoMxRecord);
        stats.record(Outcome::NoMxRecord);
        stats.record(Outcome::NonDeliverable);
        assert_eq!(stats.failed, 4);
        assert_eq!(stats.valid_syntax, 3);
        assert_eq!(stats.has_mx, 1);
        assert_eq!(stats.deliverable, 0);
        assert_eq!(stats.failure_reasons.get("no MX record"), Some(&2));
        assert_eq!(stats.failure_reasons.get("invalid syntax"), Some(&1));
        assert_eq!(stats.failure_reasons.get("non-deliverable"), Some(&1));
    }
}
