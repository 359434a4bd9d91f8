//! Syntax check for candidate addresses.
//!
//! Deliberately narrow: ASCII local part, ASCII domain with at least one dot
//! and an alphabetic top-level label of two or more characters. No quoting,
//! no internationalized domains.

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("address pattern is valid")
});

/// Returns `true` when `address` matches the accepted format.
///
/// Pure and total: no normalization is applied beyond what the caller already
/// did (inputs are expected to be trimmed).
pub fn is_valid_syntax(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// The domain part of `address`, i.e. everything after the last `@`.
///
/// Returns `None` when there is no `@` or the domain would be empty.
pub fn split_domain(address: &str) -> Option<&str> {
    match address.rsplit_once('@') {
        Some((_, domain)) if !domain.is_empty() => Some(domain),
        _ => None,
    }
}
