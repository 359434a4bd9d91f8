use std::cell::Cell;

use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::{MxRecord, MxStatus, RetryPolicy, lookup_with_retry, resolver};

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + 'static,
    {
        Self {
            on_lookup: Box::new(f),
        }
    }
}

impl super::MxLookup for StubResolver {
    fn lookup_mx(&self, domain: &str) -> LookupResult {
        (self.on_lookup)(domain)
    }
}

fn timeout_error() -> ResolveError {
    ResolveError::from(ResolveErrorKind::Timeout)
}

#[test]
fn lookup_sorts_and_dedups_records() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MxRecord::new(20, "mx2.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(30, "mx3.example.com"),
        ])
    });

    let status = lookup_with_retry(&stub, "example.com", &RetryPolicy::immediate(1));
    let records = match status {
        MxStatus::Records(records) => records,
        MxStatus::NoRecords => panic!("expected records"),
    };
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], MxRecord::new(10, "mx1.example.com"));
    assert_eq!(records[2].preference, 30);
}

#[test]
fn empty_answer_is_no_records_without_retry() {
    let calls = Cell::new(0u32);
    let stub = StubResolver::new(move |_| {
        calls.set(calls.get() + 1);
        assert_eq!(calls.get(), 1, "successful empty answer must not retry");
        Ok(Vec::new())
    });

    let status = lookup_with_retry(&stub, "example.com", &RetryPolicy::immediate(3));
    assert!(matches!(status, MxStatus::NoRecords));
}

#[test]
fn retries_then_gives_up_on_timeouts() {
    let calls = std::rc::Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let stub = StubResolver::new(move |_| {
        counter.set(counter.get() + 1);
        Err(timeout_error())
    });

    let status = lookup_with_retry(&stub, "flaky.example", &RetryPolicy::immediate(3));
    assert!(matches!(status, MxStatus::NoRecords));
    assert_eq!(calls.get(), 3);
}

#[test]
fn transient_failure_then_answer_recovers() {
    let calls = std::rc::Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let stub = StubResolver::new(move |_| {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            Err(timeout_error())
        } else {
            Ok(vec![MxRecord::new(10, "mx.example.com")])
        }
    });

    let status = lookup_with_retry(&stub, "example.com", &RetryPolicy::immediate(3));
    assert!(status.has_records());
    assert_eq!(calls.get(), 2);
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}
