//! Deliverability classification: syntax, then MX, then the optional probe.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mx::{MxLookup, MxRecord, MxStatus, RetryPolicy, lookup_with_retry};
use crate::probe::{ProbeOptions, ProbeOutcome, probe_recipient};
use crate::syntax;

/// Closed set of classification outcomes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InvalidSyntax,
    NoMxRecord,
    NonDeliverable,
    Deliverable,
}

impl Outcome {
    pub fn is_deliverable(self) -> bool {
        matches!(self, Self::Deliverable)
    }

    /// Stable label used in failure breakdowns and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::InvalidSyntax => "invalid syntax",
            Self::NoMxRecord => "no MX record",
            Self::NonDeliverable => "non-deliverable",
            Self::Deliverable => "deliverable",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seam between classification and the SMTP probe, so tests can inject
/// recording or panicking stubs.
pub trait RecipientProbe {
    fn probe(&self, address: &str, sender: &str, records: &[MxRecord]) -> ProbeOutcome;
}

/// Probe implementation backed by a live SMTP dialogue.
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    pub options: ProbeOptions,
}

impl RecipientProbe for SmtpProber {
    fn probe(&self, address: &str, sender: &str, records: &[MxRecord]) -> ProbeOutcome {
        probe_recipient(address, sender, records, &self.options)
    }
}

/// Runs the three-stage pipeline for one address at a time.
///
/// Stage order is fixed: syntax is free, DNS is cheap, the SMTP round trip is
/// neither. Each stage short-circuits, so a syntactically invalid address
/// never touches the network.
pub struct Classifier<R, P> {
    resolver: R,
    prober: P,
    sender: String,
    retry: RetryPolicy,
    probe_enabled: bool,
}

impl<R: MxLookup, P: RecipientProbe> Classifier<R, P> {
    pub fn new(resolver: R, prober: P, sender: impl Into<String>, probe_enabled: bool) -> Self {
        Self {
            resolver,
            prober,
            sender: sender.into(),
            retry: RetryPolicy::default(),
            probe_enabled,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn classify(&self, address: &str) -> Outcome {
        if !syntax::is_valid_syntax(address) {
            return Outcome::InvalidSyntax;
        }

        // Syntax guarantees a domain is present.
        let Some(domain) = syntax::split_domain(address) else {
            return Outcome::InvalidSyntax;
        };

        let records = match lookup_with_retry(&self.resolver, domain, &self.retry) {
            MxStatus::NoRecords => return Outcome::NoMxRecord,
            MxStatus::Records(records) => records,
        };

        if self.probe_enabled {
            let outcome = self.prober.probe(address, &self.sender, &records);
            if !outcome.accepted() {
                debug!(address, probe = %outcome, "probe did not accept recipient");
                return Outcome::NonDeliverable;
            }
        }

        Outcome::Deliverable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::tests::StubResolver;
    use crate::probe::SmtpReply;

    struct PanicProber;

    impl RecipientProbe for PanicProber {
        fn probe(&self, _: &str, _: &str, _: &[MxRecord]) -> ProbeOutcome {
            panic!("probe must not run for this input");
        }
    }

    struct FixedProber(ProbeOutcome);

    impl RecipientProbe for FixedProber {
        fn probe(&self, _: &str, _: &str, records: &[MxRecord]) -> ProbeOutcome {
            assert!(!records.is_empty(), "probe only runs once MX is known");
            self.0.clone()
        }
    }

    fn panicking_resolver() -> StubResolver {
        StubResolver::new(|_| panic!("DNS must not run for this input"))
    }

    fn resolver_with_records() -> StubResolver {
        StubResolver::new(|domain| {
            assert_eq!(domain, "example.com");
            Ok(vec![MxRecord::new(10, "mx.example.com")])
        })
    }

    fn empty_resolver() -> StubResolver {
        StubResolver::new(|_| Ok(Vec::new()))
    }

    fn reply(code: u16) -> SmtpReply {
        SmtpReply {
            code,
            message: String::new(),
        }
    }

    #[test]
    fn invalid_syntax_short_circuits_before_any_network_call() {
        let classifier = Classifier::new(panicking_resolver(), PanicProber, "s@example.com", true);
        assert_eq!(classifier.classify("not-an-address"), Outcome::InvalidSyntax);
        assert_eq!(classifier.classify("user@nodot"), Outcome::InvalidSyntax);
        assert_eq!(classifier.classify(""), Outcome::InvalidSyntax);
    }

    #[test]
    fn missing_mx_reported_without_probing() {
        let classifier = Classifier::new(empty_resolver(), PanicProber, "s@example.com", true)
            .with_retry(RetryPolicy::immediate(1));
        assert_eq!(classifier.classify("user@example.com"), Outcome::NoMxRecord);
    }

    #[test]
    fn accepted_probe_is_deliverable() {
        let prober = FixedProber(ProbeOutcome::Accepted { reply: reply(250) });
        let classifier = Classifier::new(resolver_with_records(), prober, "s@example.com", true)
            .with_retry(RetryPolicy::immediate(1));
        assert_eq!(classifier.classify("user@example.com"), Outcome::Deliverable);
    }

    #[test]
    fn rejected_probe_is_non_deliverable() {
        let prober = FixedProber(ProbeOutcome::Rejected { reply: reply(550) });
        let classifier = Classifier::new(resolver_with_records(), prober, "s@example.com", true)
            .with_retry(RetryPolicy::immediate(1));
        assert_eq!(
            classifier.classify("user@example.com"),
            Outcome::NonDeliverable
        );
    }

    #[test]
    fn probe_disabled_stops_at_mx() {
        let classifier = Classifier::new(resolver_with_records(), PanicProber, "s@example.com", false)
            .with_retry(RetryPolicy::immediate(1));
        assert_eq!(classifier.classify("user@example.com"), Outcome::Deliverable);
    }
}
