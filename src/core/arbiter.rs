//! # Arbiter: the admission state machine.
//!
//! Owns every piece of mutable engine state: the [`RequestStore`], the provider
//! score and capability filter, and the [`LinkCounter`]. It is driven one
//! [`Command`] at a time by a single consumer ([`Engine::run`](crate::Engine::run)),
//! or directly by a caller that owns it.
//!
//! ## Per-request states
//! ```text
//!              eligible                      not eligible
//!   PENDING ─────────────► ADMITTED ─────────────────────► PENDING
//!      │                     │  eligible: untouched
//!      └──── cancel ─────────┴──── cancel (evict first) ──► removed
//!
//! eligible(r) = r.score > provider_score
//!            && filter.matches(r.capabilities)
//!            && accept(r.request, r.score)
//! ```
//!
//! ## Rules
//! - Admit increments the link counter; the 0→1 edge calls `LinkControl::activate`.
//! - Evict decrements it; the 1→0 edge calls `LinkControl::deactivate`.
//! - Provider score / filter changes re-evaluate **every** record, ascending by id.
//! - Equal scores are not eligible: a pending record stays pending, an admitted one is evicted.
//! - After every command, `link_count == |admitted records|` or the command fails
//!   with an [`ArbiterError`]. The arbiter then halts: every later mutating call
//!   returns the same error and leaves the store, counter and link untouched.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::core::command::Command;
use crate::core::config::EngineConfig;
use crate::error::{ArbiterError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::link::{Edge, LinkCounter, LinkRef};
use crate::policies::AcceptRef;
use crate::request::{CapabilityFilter, NetworkRequest, RequestId, RequestRecord, RequestStore, Upsert};

/// Admission state machine for one provider.
pub struct Arbiter {
    name: Arc<str>,
    records: RequestStore,
    provider_score: i32,
    filter: CapabilityFilter,
    accept: AcceptRef,
    link: LinkRef,
    counter: LinkCounter,
    bus: Bus,
    halted: Option<ArbiterError>,
}

impl Arbiter {
    /// Creates an arbiter with the configured initial score and filter.
    pub fn new(cfg: &EngineConfig, accept: AcceptRef, link: LinkRef, bus: Bus) -> Self {
        Self {
            name: cfg.name.clone(),
            records: RequestStore::new(),
            provider_score: cfg.initial_score,
            filter: cfg.initial_filter.clone(),
            accept,
            link,
            counter: LinkCounter::new(),
            bus,
            halted: None,
        }
    }

    /// Applies one command to completion.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ArbiterError> {
        match cmd {
            Command::Request { request, score } => self.on_request(request, score),
            Command::Cancel { id } => self.on_cancel(id),
            Command::SetProviderScore { score } => self.on_set_provider_score(score),
            Command::SetCapabilityFilter { filter } => self.on_set_capability_filter(filter),
            Command::Reevaluate => self.reevaluate_all(),
        }
    }

    /// New or updated request: insert pending or overwrite the score, then evaluate it.
    ///
    /// Non-arbitrated kinds (listen, track-default) are ignored.
    pub fn on_request(&mut self, request: NetworkRequest, score: i32) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_request(request, score);
        self.latch(res)
    }

    /// Cancelled request: evict if admitted, then drop the record.
    ///
    /// Unknown ids are a benign race and change nothing.
    pub fn on_cancel(&mut self, id: RequestId) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_cancel(id);
        self.latch(res)
    }

    /// Stores a new provider score and re-evaluates every record.
    pub fn on_set_provider_score(&mut self, score: i32) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_provider_score(score);
        self.latch(res)
    }

    /// Stores a new capability filter and re-evaluates every record.
    pub fn on_set_capability_filter(&mut self, filter: CapabilityFilter) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_capability_filter(filter);
        self.latch(res)
    }

    /// Re-evaluates every record in ascending id order.
    pub fn reevaluate_all(&mut self) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_reevaluate();
        self.latch(res)
    }

    /// Evicts every admitted record (deactivating the link) and drops all records.
    ///
    /// Used when the provider unregisters or the engine stops.
    pub fn release_all(&mut self) -> Result<(), ArbiterError> {
        self.ensure_running()?;
        let res = self.apply_release();
        self.latch(res)
    }

    /// The invariant violation that halted this arbiter, if any.
    ///
    /// Once set, every mutating call returns it and changes nothing.
    pub fn halted(&self) -> Option<&ArbiterError> {
        self.halted.as_ref()
    }

    fn ensure_running(&self) -> Result<(), ArbiterError> {
        match &self.halted {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn latch(&mut self, res: Result<(), ArbiterError>) -> Result<(), ArbiterError> {
        if let Err(e) = &res {
            if self.halted.is_none() {
                error!(provider = %self.name, label = e.as_label(), "arbiter halted: {e}");
            }
            self.halted = Some(e.clone());
        }
        res
    }

    fn apply_request(&mut self, request: NetworkRequest, score: i32) -> Result<(), ArbiterError> {
        let id = request.id();
        let kind = request.kind();
        if !kind.is_arbitrated() {
            debug!(provider = %self.name, request = %id, kind = kind.as_str(), "ignoring non-arbitrated request");
            self.publish(
                Event::new(EventKind::RequestIgnored)
                    .with_request(id)
                    .with_reason(kind.as_str()),
            );
            return Ok(());
        }

        match self.records.upsert(request, score) {
            Upsert::Inserted => debug!(provider = %self.name, request = %id, score, "request added"),
            Upsert::Updated => debug!(provider = %self.name, request = %id, score, "request score updated"),
        }
        self.evaluate(id)?;
        self.check_invariants()
    }

    fn apply_cancel(&mut self, id: RequestId) -> Result<(), ArbiterError> {
        let Some(record) = self.records.get(id) else {
            debug!(provider = %self.name, request = %id, "cancel for unknown request ignored");
            return Ok(());
        };
        if record.is_admitted() {
            self.evict(id)?;
        }
        self.records.remove(id);
        debug!(provider = %self.name, request = %id, "request removed");
        self.publish(Event::new(EventKind::RequestCancelled).with_request(id));
        self.check_invariants()
    }

    fn apply_provider_score(&mut self, score: i32) -> Result<(), ArbiterError> {
        debug!(provider = %self.name, from = self.provider_score, to = score, "provider score changed");
        self.provider_score = score;
        self.publish(Event::new(EventKind::ProviderScoreChanged).with_score(score));
        self.apply_reevaluate()
    }

    fn apply_capability_filter(&mut self, filter: CapabilityFilter) -> Result<(), ArbiterError> {
        debug!(provider = %self.name, filter = %filter, "capability filter changed");
        self.publish(Event::new(EventKind::CapabilityFilterChanged).with_reason(filter.to_string()));
        self.filter = filter;
        self.apply_reevaluate()
    }

    fn apply_reevaluate(&mut self) -> Result<(), ArbiterError> {
        for id in self.records.ids() {
            self.evaluate(id)?;
        }
        self.check_invariants()
    }

    fn apply_release(&mut self) -> Result<(), ArbiterError> {
        for id in self.records.ids() {
            if self.records.get(id).is_some_and(RequestRecord::is_admitted) {
                self.evict(id)?;
            }
            self.records.remove(id);
        }
        self.check_invariants()
    }

    /// Number of live request records.
    pub fn outstanding_request_count(&self) -> usize {
        self.records.len()
    }

    /// Current link activation count (number of admitted requests).
    pub fn link_count(&self) -> usize {
        self.counter.get()
    }

    pub fn provider_score(&self) -> i32 {
        self.provider_score
    }

    pub fn capability_filter(&self) -> &CapabilityFilter {
        &self.filter
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up one record.
    pub fn record(&self, id: RequestId) -> Option<&RequestRecord> {
        self.records.get(id)
    }

    /// Iterates records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.iter()
    }

    /// Human-readable listing of provider state and every record.
    ///
    /// ```text
    /// Provider wifi score=50 filter=<match-all> link_count=1 requests=2
    ///   NetworkRequest [ REQUEST id=1, [ ] ] score=100 admitted=true
    ///   NetworkRequest [ REQUEST id=2, [ ] ] score=20 admitted=false
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Provider {} score={} filter={} link_count={} requests={}",
            self.name,
            self.provider_score,
            self.filter,
            self.counter.get(),
            self.records.len()
        );
        for r in self.records.iter() {
            let _ = writeln!(
                out,
                "  {} score={} admitted={}",
                r.request(),
                r.score(),
                r.is_admitted()
            );
        }
        out
    }

    fn evaluate(&mut self, id: RequestId) -> Result<(), ArbiterError> {
        let Some(record) = self.records.get(id) else {
            return Ok(());
        };
        let eligible = self.is_eligible(record);
        match (record.is_admitted(), eligible) {
            (false, true) => {
                self.admit(id);
                Ok(())
            }
            (true, false) => self.evict(id),
            _ => Ok(()),
        }
    }

    fn is_eligible(&self, record: &RequestRecord) -> bool {
        record.score() > self.provider_score
            && self.filter.matches(record.request().capabilities())
            && self.accepts(record)
    }

    /// Runs the acceptance policy; a panic counts as a rejection.
    fn accepts(&self, record: &RequestRecord) -> bool {
        let accept = &self.accept;
        let verdict = panic::catch_unwind(AssertUnwindSafe(|| {
            accept.accept(record.request(), record.score())
        }));
        match verdict {
            Ok(accepted) => accepted,
            Err(payload) => {
                let info = panic_message(&*payload);
                warn!(
                    provider = %self.name,
                    request = %record.id(),
                    policy = accept.name(),
                    "acceptance policy panicked, treating as reject: {info}"
                );
                self.publish(
                    Event::new(EventKind::PredicatePanicked)
                        .with_request(record.id())
                        .with_reason(info),
                );
                false
            }
        }
    }

    fn admit(&mut self, id: RequestId) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };
        record.set_admitted(true);
        let score = record.score();
        let edge = self.counter.increment();
        let count = self.counter.get();

        debug!(provider = %self.name, request = %id, score, count, "request admitted");
        self.publish(
            Event::new(EventKind::RequestAdmitted)
                .with_request(id)
                .with_score(score)
                .with_count(count),
        );
        if edge == Some(Edge::Activated) {
            info!(provider = %self.name, link = self.link.name(), "activating link");
            self.link.activate();
            self.publish(Event::new(EventKind::LinkActivated).with_count(count));
        }
    }

    fn evict(&mut self, id: RequestId) -> Result<(), ArbiterError> {
        let Some(record) = self.records.get_mut(id) else {
            return Ok(());
        };
        let edge = self.counter.decrement()?;
        record.set_admitted(false);
        let score = record.score();
        let count = self.counter.get();

        debug!(provider = %self.name, request = %id, score, count, "request evicted");
        self.publish(
            Event::new(EventKind::RequestEvicted)
                .with_request(id)
                .with_score(score)
                .with_count(count),
        );
        if edge == Some(Edge::Deactivated) {
            info!(provider = %self.name, link = self.link.name(), "deactivating link");
            self.link.deactivate();
            self.publish(Event::new(EventKind::LinkDeactivated).with_count(count));
        }
        Ok(())
    }

    fn check_invariants(&self) -> Result<(), ArbiterError> {
        let count = self.counter.get();
        let admitted = self.records.admitted_count();
        if count == admitted {
            Ok(())
        } else {
            Err(ArbiterError::CountMismatch { count, admitted })
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_provider(self.name.clone()));
    }

    /// Flips a record's admitted flag without touching the counter.
    #[cfg(test)]
    pub(crate) fn force_admitted(&mut self, id: RequestId, admitted: bool) {
        if let Some(record) = self.records.get_mut(id) {
            record.set_admitted(admitted);
        }
    }
}
