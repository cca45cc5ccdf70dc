//! Document domain logic: types, numbering, lifecycle, and overdue rules.

mod lifecycle;
mod numbering;
mod overdue;
mod types;

pub use lifecycle::{Lifecycle, LifecycleError};
pub use numbering::{default_prefix, format_document_number};
pub use overdue::is_due_for_overdue;
pub use types::{
    DocumentKind, DocumentStatus, DocumentTotals, LineItem, LineItemError, compute_totals,
    validate_line_items,
};
