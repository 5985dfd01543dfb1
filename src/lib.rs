//! Rate-limit-aware access layer for exporting Xero contact groups to CSV.
//!
//! The pipeline resolves contact group names to group IDs, expands group
//! membership into a deduplicated contact ID set, and fetches full contact
//! records in bounded-size batches, with every remote call funneled through
//! a linear-backoff [`RetryPolicy`]. The web/OAuth/session layer lives
//! outside this crate and hands a [`Credentials`] value in per call.
//!
//! ```ignore
//! let client = XeroClient::new(&credentials)?;
//! let contacts = ContactGroupQuery::new(&client)
//!     .contacts_in_group_names(&names, None, &NoProgress)
//!     .await?;
//! let rows = export::export_rows(&export::filter_by_region(contacts, Some("VIC")));
//! export::write_csv(&rows, file)?;
//! ```

pub mod error;
pub mod export;
pub mod xero;

pub use error::{AppError, ErrorPresentation};
pub use export::{export_rows, filter_by_region, write_csv, ExportRow};
pub use xero::client::{Credentials, XeroClient};
pub use xero::contact::{Contact, FlatContact};
pub use xero::contacts::{ContactFetcher, NoProgress, Progress};
pub use xero::groups::{GroupExpander, GroupResolver};
pub use xero::retry::RetryPolicy;
pub use xero::service::ContactGroupQuery;
