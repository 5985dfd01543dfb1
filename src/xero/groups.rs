//! Contact group name resolution and membership expansion.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::AppError;
use crate::xero::client::XeroClient;
use crate::xero::retry::RetryPolicy;

// ─────────────────────────────────────────────────────────────────────────────
// GroupResolver
// ─────────────────────────────────────────────────────────────────────────────

/// Maps human-readable group names to Xero's group identifiers.
pub struct GroupResolver<'a> {
    client: &'a XeroClient,
    retry: &'a RetryPolicy,
}

impl<'a> GroupResolver<'a> {
    pub fn new(client: &'a XeroClient, retry: &'a RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Resolves group names to group IDs, case-insensitively, in remote-list
    /// order. One ContactGroups call through the retry policy.
    ///
    /// # Errors
    ///
    /// `AppError::NoMatchingGroup` when zero groups match. A hard
    /// precondition failure, never retried.
    pub async fn resolve(&self, names: &[String]) -> Result<Vec<String>, AppError> {
        let wanted: Vec<String> = names.iter().map(|n| n.to_uppercase()).collect();

        let groups = self
            .retry
            .run("contactgroups", "all", || self.client.list_contact_groups())
            .await?;

        let mut group_ids = Vec::new();
        for group in groups {
            if !wanted.contains(&group.name.to_uppercase()) {
                continue;
            }
            if group.contact_group_id.is_empty() {
                continue;
            }
            group_ids.push(group.contact_group_id);
        }

        if group_ids.is_empty() {
            return Err(AppError::NoMatchingGroup {
                names: names.join(", "),
            });
        }

        debug!(
            "[XERO] Resolved {} group name(s) to {} group id(s)",
            names.len(),
            group_ids.len()
        );
        Ok(group_ids)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GroupExpander
// ─────────────────────────────────────────────────────────────────────────────

/// Expands group identifiers into the deduplicated union of their member
/// contact identifiers.
pub struct GroupExpander<'a> {
    client: &'a XeroClient,
    retry: &'a RetryPolicy,
}

impl<'a> GroupExpander<'a> {
    pub fn new(client: &'a XeroClient, retry: &'a RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// One ContactGroups/{id} call per group through the retry policy;
    /// members shared across groups collapse to a single id. Memberless
    /// groups contribute nothing. The returned order is the set's iteration
    /// order, not a guarantee.
    pub async fn contact_ids(&self, group_ids: &[String]) -> Result<Vec<String>, AppError> {
        let mut contact_ids = BTreeSet::new();

        for group_id in group_ids {
            let group = self
                .retry
                .run("contactgroups", "get", || {
                    self.client.get_contact_group(group_id)
                })
                .await?;

            for member in group.contacts {
                if let Some(id) = member.contact_id {
                    if !id.is_empty() {
                        contact_ids.insert(id);
                    }
                }
            }
        }

        debug!(
            "[XERO] Expanded {} group(s) to {} distinct contact id(s)",
            group_ids.len(),
            contact_ids.len()
        );
        Ok(contact_ids.into_iter().collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
