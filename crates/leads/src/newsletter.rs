use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, NewsletterEmailId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterEmail {
    pub id: NewsletterEmailId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Lowercase and trim an address, rejecting anything without a local part,
/// an `@` and a dotted domain.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(format!("\"{}\" is not a valid email address", raw.trim())));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Pool@Shop.COM ").unwrap(), "pool@shop.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@shop.com", "a@shop", "a@.com", "a@shop.", "a b@shop.com", "a@b@c.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
