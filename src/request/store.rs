//! # Request record store.
//!
//! [`RequestStore`] maps [`RequestId`] → [`RequestRecord`]. It performs no
//! validation beyond identifier uniqueness; admission rules live in the
//! arbitration loop. Iteration is in **ascending id order**, so global
//! re-evaluation is deterministic.
//!
//! The store is not synchronized. It is owned by the single loop that consumes
//! the event queue.

use std::collections::BTreeMap;

use super::request::{NetworkRequest, RequestId};

/// A live request plus the engine's private view of it.
#[derive(Clone, Debug)]
pub struct RequestRecord {
    request: NetworkRequest,
    score: i32,
    admitted: bool,
}

impl RequestRecord {
    /// Creates a pending record.
    pub fn new(request: NetworkRequest, score: i32) -> Self {
        Self {
            request,
            score,
            admitted: false,
        }
    }

    pub fn request(&self) -> &NetworkRequest {
        &self.request
    }

    pub fn id(&self) -> RequestId {
        self.request.id()
    }

    /// Score of the best network currently known to serve this request.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Whether this engine currently needs a network for the request.
    pub fn is_admitted(&self) -> bool {
        self.admitted
    }

    pub(crate) fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    pub(crate) fn set_admitted(&mut self, admitted: bool) {
        self.admitted = admitted;
    }
}

/// Result of [`RequestStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record existed; a pending one was created.
    Inserted,
    /// A record existed; its score was overwritten.
    Updated,
}

/// Request records keyed by id.
#[derive(Debug, Default)]
pub struct RequestStore {
    records: BTreeMap<RequestId, RequestRecord>,
}

impl RequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RequestId) -> Option<&RequestRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut RequestRecord> {
        self.records.get_mut(&id)
    }

    /// Inserts a pending record, or overwrites the score of an existing one.
    ///
    /// The stored request descriptor is immutable: an update keeps the original.
    pub fn upsert(&mut self, request: NetworkRequest, score: i32) -> Upsert {
        match self.records.get_mut(&request.id()) {
            Some(record) => {
                record.set_score(score);
                Upsert::Updated
            }
            None => {
                self.records
                    .insert(request.id(), RequestRecord::new(request, score));
                Upsert::Inserted
            }
        }
    }

    pub fn remove(&mut self, id: RequestId) -> Option<RequestRecord> {
        self.records.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all ids in ascending order.
    pub fn ids(&self) -> Vec<RequestId> {
        self.records.keys().copied().collect()
    }

    /// Iterates records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.values()
    }

    /// Number of records flagged as admitted.
    pub fn admitted_count(&self) -> usize {
        self.records.values().filter(|r| r.admitted).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::capabilities::{Capabilities, NetCapability};

    fn req(id: u64) -> NetworkRequest {
        NetworkRequest::request(id, Capabilities::new())
    }

    #[test]
    fn test_upsert_inserts_pending_then_updates_score() {
        let mut store = RequestStore::new();
        assert_eq!(store.upsert(req(1), 100), Upsert::Inserted);
        let rec = store.get(RequestId(1)).unwrap();
        assert_eq!(rec.score(), 100);
        assert!(!rec.is_admitted());

        store.get_mut(RequestId(1)).unwrap().set_admitted(true);
        assert_eq!(store.upsert(req(1), 10), Upsert::Updated);
        let rec = store.get(RequestId(1)).unwrap();
        assert_eq!(rec.score(), 10);
        assert!(rec.is_admitted(), "update must not reset admission");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_original_descriptor() {
        let mut store = RequestStore::new();
        store.upsert(req(1), 1);
        let other = NetworkRequest::request(
            1,
            Capabilities::new().with_capability(NetCapability::Mms),
        );
        store.upsert(other, 2);
        assert_eq!(store.get(RequestId(1)).unwrap().request(), &req(1));
    }

    #[test]
    fn test_remove_and_missing() {
        let mut store = RequestStore::new();
        store.upsert(req(3), 0);
        assert!(store.remove(RequestId(4)).is_none());
        assert!(store.remove(RequestId(3)).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_ascending() {
        let mut store = RequestStore::new();
        for id in [30, 2, 17, 5] {
            store.upsert(req(id), 0);
        }
        assert_eq!(
            store.ids(),
            vec![RequestId(2), RequestId(5), RequestId(17), RequestId(30)]
        );
        let iterated: Vec<RequestId> = store.iter().map(RequestRecord::id).collect();
        assert_eq!(iterated, store.ids());
    }

    #[test]
    fn test_admitted_count() {
        let mut store = RequestStore::new();
        for id in 1..=4 {
            store.upsert(req(id), 0);
        }
        store.get_mut(RequestId(2)).unwrap().set_admitted(true);
        store.get_mut(RequestId(4)).unwrap().set_admitted(true);
        assert_eq!(store.admitted_count(), 2);
    }
}
