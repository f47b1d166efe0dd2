use crate::{MAX_IDENT_LEN, error::SchemaError};
use std::collections::BTreeSet;

/// Ensure an identifier is non-empty, ASCII, bounded, and free of the `.` separator.
pub(crate) fn validate_ident(ident: &str) -> Result<(), SchemaError> {
    let reason = if ident.is_empty() {
        Some("identifier is empty".to_string())
    } else if ident.len() > MAX_IDENT_LEN {
        Some(format!("identifier exceeds max length {MAX_IDENT_LEN}"))
    } else if !ident.is_ascii() {
        Some("identifier must be ASCII".to_string())
    } else if ident.contains('.') {
        Some("identifier must not contain '.'".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SchemaError::InvalidIdent {
            ident: ident.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Return the names that occur more than once, each reported a single time.
pub(crate) fn duplicates<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut dups = Vec::new();

    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            dups.push(name);
        }
    }

    dups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dotted_and_long_idents() {
        assert!(validate_ident("").is_err());
        assert!(validate_ident("a.b").is_err());
        assert!(validate_ident(&"x".repeat(MAX_IDENT_LEN + 1)).is_err());
        assert!(validate_ident("caf\u{e9}").is_err());
    }

    #[test]
    fn accepts_plain_identifier() {
        assert!(validate_ident("order_items").is_ok());
        assert!(validate_ident(&"x".repeat(MAX_IDENT_LEN)).is_ok());
    }

    #[test]
    fn duplicates_are_reported_once_in_first_seen_order() {
        let dups = duplicates(["a", "b", "a", "c", "b", "a"]);
        assert_eq!(dups, vec!["a", "b"]);
    }
}
