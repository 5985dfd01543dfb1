//! The one multi-stage workflow: all contacts in a set of named groups.

use crate::error::AppError;
use crate::xero::client::XeroClient;
use crate::xero::contact::Contact;
use crate::xero::contacts::{ContactFetcher, Progress, DEFAULT_CHUNK_SIZE};
use crate::xero::groups::{GroupExpander, GroupResolver};
use crate::xero::retry::RetryPolicy;

// ─────────────────────────────────────────────────────────────────────────────
// ContactGroupQuery
// ─────────────────────────────────────────────────────────────────────────────

/// Facade composing resolve → expand → fetch over a single client and retry
/// policy.
///
/// Stateless per call: no caching, every invocation re-queries Xero. The
/// client's credentials are the only cross-stage state and are read-only.
pub struct ContactGroupQuery<'a> {
    client: &'a XeroClient,
    retry: RetryPolicy,
    chunk_size: usize,
}

impl<'a> ContactGroupQuery<'a> {
    pub fn new(client: &'a XeroClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Overrides the retry policy applied to every remote call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides the batch size used by the fetch stage.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be greater than 0");
        self.chunk_size = chunk_size;
        self
    }

    /// Gets all contacts within the union of the named contact groups,
    /// case-insensitively, capped at `limit` contacts when one is given.
    ///
    /// # Errors
    ///
    /// - `AppError::NoMatchingGroup` - no group matched any requested name
    /// - `AppError::RetryExhausted` - a stage stayed rate limited past the
    ///   attempt budget
    /// - anything else a stage surfaces, unchanged
    pub async fn contacts_in_group_names(
        &self,
        names: &[String],
        limit: Option<usize>,
        progress: &dyn Progress,
    ) -> Result<Vec<Contact>, AppError> {
        let group_ids = GroupResolver::new(self.client, &self.retry)
            .resolve(names)
            .await?;

        let contact_ids = GroupExpander::new(self.client, &self.retry)
            .contact_ids(&group_ids)
            .await?;

        ContactFetcher::new(self.client, &self.retry)
            .with_chunk_size(self.chunk_size)
            .fetch_by_ids(&contact_ids, limit, progress)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
