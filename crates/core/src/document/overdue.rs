//! The overdue predicate used by the daily sweep.

use chrono::NaiveDate;

use super::DocumentStatus;

/// Whether a document should be flagged overdue as of `today` (UTC calendar
/// date). Only open documents (`draft`, `sent`) with a due date strictly in
/// the past qualify; receipts carry no due date and never match.
#[must_use]
pub fn is_due_for_overdue(
    status: DocumentStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    status.is_open() && due_date.is_some_and(|due| due < today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_sent_due_yesterday_is_overdue() {
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        assert!(is_due_for_overdue(
            DocumentStatus::Sent,
            Some(yesterday),
            today()
        ));
    }

    #[test]
    fn test_draft_due_yesterday_is_overdue() {
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        assert!(is_due_for_overdue(
            DocumentStatus::Draft,
            Some(yesterday),
            today()
        ));
    }

    #[test]
    fn test_due_tomorrow_is_not_overdue() {
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        assert!(!is_due_for_overdue(
            DocumentStatus::Sent,
            Some(tomorrow),
            today()
        ));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        assert!(!is_due_for_overdue(
            DocumentStatus::Sent,
            Some(today()),
            today()
        ));
    }

    #[test]
    fn test_paid_never_goes_overdue() {
        let long_past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(!is_due_for_overdue(
            DocumentStatus::Paid,
            Some(long_past),
            today()
        ));
    }

    #[test]
    fn test_no_due_date_never_matches() {
        assert!(!is_due_for_overdue(DocumentStatus::Sent, None, today()));
    }

    proptest! {
        /// Closed statuses never match, whatever the dates.
        #[test]
        fn prop_closed_statuses_never_overdue(
            days_past in 0u64..3650,
        ) {
            let due = today().checked_sub_days(Days::new(days_past)).unwrap();
            for status in [
                DocumentStatus::Paid,
                DocumentStatus::Overdue,
                DocumentStatus::Cancelled,
            ] {
                prop_assert!(!is_due_for_overdue(status, Some(due), today()));
            }
        }

        /// Open statuses match exactly when the due date is strictly past.
        #[test]
        fn prop_open_statuses_match_strict_past(
            offset in -3650i64..3650,
        ) {
            let due = if offset < 0 {
                today().checked_sub_days(Days::new(offset.unsigned_abs())).unwrap()
            } else {
                today().checked_add_days(Days::new(offset.unsigned_abs())).unwrap()
            };

            let expected = offset < 0;
            prop_assert_eq!(
                is_due_for_overdue(DocumentStatus::Sent, Some(due), today()),
                expected
            );
        }
    }
}
