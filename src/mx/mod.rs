//! DNS MX resolution with retry over public resolver endpoints.
//!
//! The main entry points are [`has_mx_record`] for a plain yes/no answer and
//! [`lookup_with_retry`] when the caller also needs the exchanger list (the
//! SMTP probe does). Lookups never propagate resolver errors to the batch
//! loop: transient failures are retried, everything else collapses to
//! [`MxStatus::NoRecords`] and is logged.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{MxLookup, RetryPolicy, has_mx_record, lookup_with_retry, public_resolver};
pub use types::{MxRecord, MxStatus};

#[cfg(test)]
pub(crate) mod tests;
