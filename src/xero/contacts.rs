//! Batched contact retrieval with progress reporting.

use tracing::info;

use crate::error::AppError;
use crate::xero::client::XeroClient;
use crate::xero::contact::Contact;
use crate::xero::retry::RetryPolicy;

/// Number of contact ids packed into a single filter query.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────────────────

/// Observational progress sink for long-running fetches.
///
/// Purely informational; a no-op implementation must not change results.
pub trait Progress {
    /// Called once before fetching starts with the number of ids that will
    /// be covered.
    fn begin(&self, total: usize);
    /// Called after each batch with the number of ids it covered.
    fn inc(&self, covered: usize);
}

/// Default sink that reports nothing.
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&self, _total: usize) {}
    fn inc(&self, _covered: usize) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// ContactFetcher
// ─────────────────────────────────────────────────────────────────────────────

/// Fetches full contact records for a set of contact ids in fixed-size
/// batches, one filter query per batch, through the retry policy.
pub struct ContactFetcher<'a> {
    client: &'a XeroClient,
    retry: &'a RetryPolicy,
    chunk_size: usize,
}

impl<'a> ContactFetcher<'a> {
    pub fn new(client: &'a XeroClient, retry: &'a RetryPolicy) -> Self {
        Self {
            client,
            retry,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Overrides the batch size.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be greater than 0");
        self.chunk_size = chunk_size;
        self
    }

    /// Fetches contacts by id, at most `limit` ids when one is given.
    ///
    /// Ids are consumed in chunks of `min(chunk_size, remaining limit)`;
    /// each chunk becomes one active-status filter query ORing id equality
    /// comparisons. A remaining limit of zero halts before issuing another
    /// call. Inactive contacts are filtered server-side, so fewer records
    /// than ids may come back.
    ///
    /// # Errors
    ///
    /// Whatever the client or retry policy surfaces, unchanged; a batch
    /// failure discards all previously fetched records.
    pub async fn fetch_by_ids(
        &self,
        ids: &[String],
        limit: Option<usize>,
        progress: &dyn Progress,
    ) -> Result<Vec<Contact>, AppError> {
        let total = match limit {
            Some(limit) => ids.len().min(limit),
            None => ids.len(),
        };
        progress.begin(total);

        let mut contacts = Vec::new();
        let mut remaining = limit;
        let mut rest = ids;

        while !rest.is_empty() {
            let take = match remaining {
                Some(0) => break,
                Some(remaining) => self.chunk_size.min(remaining),
                None => self.chunk_size,
            };
            let (chunk, tail) = rest.split_at(take.min(rest.len()));
            rest = tail;

            let filter = active_ids_filter(chunk);
            let raw_contacts = self
                .retry
                .run("contacts", "filter", || self.client.filter_contacts(&filter))
                .await?;

            for raw in raw_contacts {
                contacts.push(Contact::from_raw(raw)?);
            }

            if let Some(remaining) = remaining.as_mut() {
                *remaining -= chunk.len();
            }
            progress.inc(chunk.len());
        }

        info!(
            "[XERO] Fetched {} contact record(s) covering {} id(s)",
            contacts.len(),
            total
        );
        Ok(contacts)
    }
}

/// Filter expression selecting active contacts matching any of the ids.
fn active_ids_filter(ids: &[String]) -> String {
    let clauses: Vec<String> = ids
        .iter()
        .map(|id| format!(r#"ID==Guid("{}")"#, id))
        .collect();
    format!(r#"ContactStatus=="ACTIVE"&&({})"#, clauses.join("||"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
