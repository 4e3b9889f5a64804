//! Merge/eviction policies.
//!
//! On write, each touched cell's previous payload is combined with the
//! incoming pairs. Both policies keep every incoming pair ahead of older
//! entries and drop older entries first; they differ in how they decide what
//! to drop, and the difference is observable, so they stay separate.

use std::collections::HashSet;

/// Result of merging one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome<R> {
    /// New payload, most recent first.
    pub payload: Vec<(String, R)>,
    /// Entries that did not make it into the payload.
    pub dropped: usize,
}

/// Combines a cell's previous payload with newly written pairs.
pub trait MergePolicy: Send + Sync {
    /// Merge `incoming` into `existing` under `cache_limit`.
    fn merge<R>(
        &self,
        existing: Vec<(String, R)>,
        incoming: Vec<(String, R)>,
        cache_limit: usize,
    ) -> MergeOutcome<R>;
}

/// Fixed-cell policy: prepend, then cut the tail.
///
/// The payload is `incoming ++ existing` truncated to `cache_limit`, so the
/// oldest entries go first. Keys are not deduplicated; a key written twice
/// appears twice until its older copy ages out of the tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncatingMerge;

impl MergePolicy for TruncatingMerge {
    fn merge<R>(
        &self,
        existing: Vec<(String, R)>,
        incoming: Vec<(String, R)>,
        cache_limit: usize,
    ) -> MergeOutcome<R> {
        let mut payload = incoming;
        payload.extend(existing);

        let dropped = payload.len().saturating_sub(cache_limit);
        payload.truncate(cache_limit);

        MergeOutcome { payload, dropped }
    }
}

/// Ring policy: replace colliding keys, gate on batch size.
///
/// An existing entry survives only if its key is not among the incoming keys
/// and the number of distinct incoming keys does not exceed `cache_limit`.
/// The incoming batch itself is never truncated, so a single large write can
/// leave the payload above the limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionAwareMerge;

impl MergePolicy for CollisionAwareMerge {
    fn merge<R>(
        &self,
        existing: Vec<(String, R)>,
        incoming: Vec<(String, R)>,
        cache_limit: usize,
    ) -> MergeOutcome<R> {
        let incoming_keys: HashSet<&str> = incoming.iter().map(|(k, _)| k.as_str()).collect();

        if incoming_keys.len() > cache_limit {
            return MergeOutcome {
                dropped: existing.len(),
                payload: incoming,
            };
        }

        let existing_len = existing.len();
        let survivors: Vec<(String, R)> = existing
            .into_iter()
            .filter(|(k, _)| !incoming_keys.contains(k.as_str()))
            .collect();
        let dropped = existing_len - survivors.len();

        let mut payload = incoming;
        payload.extend(survivors);

        MergeOutcome { payload, dropped }
    }
}
