//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Domain rules live in `faktura-core`; repositories apply
//! them against persistent state.

pub mod branding;
pub mod convert;
pub mod counter;
pub mod customer;
pub mod document;
pub mod email_log;
pub mod invitation;
pub mod organization;
pub mod session;
pub mod user;

pub use branding::{BrandingError, BrandingRepository, CreateAssetInput};
pub use counter::{CounterRepository, NextNumber};
pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput};
pub use document::{
    CreateDocumentInput, DocumentError, DocumentFilter, DocumentRepository, UpdateDocumentInput,
};
pub use email_log::EmailLogRepository;
pub use invitation::{InvitationError, InvitationRepository};
pub use organization::{OrganizationError, OrganizationRepository, UpdateOrganizationInput};
pub use session::SessionRepository;
pub use user::UserRepository;
