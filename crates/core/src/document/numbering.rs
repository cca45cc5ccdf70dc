//! Human-readable document number formatting.
//!
//! Numbers look like `INV-2025-0001`: a prefix, the calendar year, and a
//! per-(organization, kind, year) sequence zero-padded to four digits. The
//! sequence keeps counting past 9999 without truncation.

use super::DocumentKind;

/// The default number prefix for a document kind.
///
/// Organizations may override each prefix independently.
#[must_use]
pub const fn default_prefix(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Invoice => "INV",
        DocumentKind::PurchaseOrder => "PO",
        DocumentKind::Receipt => "KWT",
    }
}

/// Formats a document number from its parts.
#[must_use]
pub fn format_document_number(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_prefixes() {
        assert_eq!(default_prefix(DocumentKind::Invoice), "INV");
        assert_eq!(default_prefix(DocumentKind::PurchaseOrder), "PO");
        assert_eq!(default_prefix(DocumentKind::Receipt), "KWT");
    }

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(format_document_number("INV", 2025, 1), "INV-2025-0001");
        assert_eq!(format_document_number("INV", 2025, 42), "INV-2025-0042");
        assert_eq!(format_document_number("KWT", 2025, 999), "KWT-2025-0999");
    }

    #[test]
    fn test_format_unbounded_beyond_9999() {
        assert_eq!(format_document_number("PO", 2025, 10_000), "PO-2025-10000");
        assert_eq!(
            format_document_number("PO", 2025, 123_456),
            "PO-2025-123456"
        );
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(format_document_number("ACME", 2026, 7), "ACME-2026-0007");
    }

    proptest! {
        /// The formatted number always splits back into prefix, year, and
        /// sequence.
        #[test]
        fn prop_format_is_parseable(
            prefix in "[A-Z]{2,6}",
            year in 2000i32..2100,
            sequence in 1i64..1_000_000,
        ) {
            let number = format_document_number(&prefix, year, sequence);
            let parts: Vec<&str> = number.split('-').collect();

            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], prefix);
            prop_assert_eq!(parts[1].parse::<i32>().unwrap(), year);
            prop_assert_eq!(parts[2].parse::<i64>().unwrap(), sequence);
            prop_assert!(parts[2].len() >= 4);
        }

        /// Within a year, lexicographic order matches sequence order up to
        /// the four-digit padding boundary.
        #[test]
        fn prop_padded_numbers_sort(a in 1i64..9999, b in 1i64..9999) {
            let na = format_document_number("INV", 2025, a);
            let nb = format_document_number("INV", 2025, b);
            prop_assert_eq!(a.cmp(&b), na.cmp(&nb));
        }
    }
}
