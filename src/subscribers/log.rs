//! # LogWriter: event renderer over `tracing`
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` records
//! under the `netarbiter::events` target. Install any `tracing` subscriber to see them.
//! Absent optional fields render as `-`.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO netarbiter::events: [admitted] provider="wifi" request=7 score=100 count=1
//! INFO netarbiter::events: [link-activated] provider="wifi"
//! INFO netarbiter::events: [evicted] provider="wifi" request=7 score=10 count=0
//! INFO netarbiter::events: [link-deactivated] provider="wifi"
//! WARN netarbiter::events: [predicate-panicked] provider="wifi" request=9 reason="policy bug"
//! ```

use std::fmt::Display;

use async_trait::async_trait;
use tracing::{Level, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "netarbiter::events";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn opt<T: Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders one event as a log level and message line.
fn render(e: &Event) -> (Level, String) {
    let provider = e.provider.as_deref().unwrap_or("-");
    let request = opt(e.request);
    let score = opt(e.score);
    let count = opt(e.count);
    let reason = e.reason.as_deref().unwrap_or("");
    match e.kind {
        EventKind::RequestAdmitted => (
            Level::INFO,
            format!("[admitted] provider={provider:?} request={request} score={score} count={count}"),
        ),
        EventKind::RequestEvicted => (
            Level::INFO,
            format!("[evicted] provider={provider:?} request={request} score={score} count={count}"),
        ),
        EventKind::RequestCancelled => (
            Level::INFO,
            format!("[cancelled] provider={provider:?} request={request}"),
        ),
        EventKind::RequestIgnored => (
            Level::INFO,
            format!("[ignored] provider={provider:?} request={request} kind={reason}"),
        ),
        EventKind::ProviderScoreChanged => (
            Level::INFO,
            format!("[score] provider={provider:?} score={score}"),
        ),
        EventKind::CapabilityFilterChanged => (
            Level::INFO,
            format!("[filter] provider={provider:?} filter={reason}"),
        ),
        EventKind::LinkActivated => (Level::INFO, format!("[link-activated] provider={provider:?}")),
        EventKind::LinkDeactivated => (Level::INFO, format!("[link-deactivated] provider={provider:?}")),
        EventKind::PredicatePanicked => (
            Level::WARN,
            format!("[predicate-panicked] provider={provider:?} request={request} reason={reason:?}"),
        ),
        EventKind::EngineStarted => (Level::INFO, format!("[started] provider={provider:?}")),
        EventKind::EngineStopped => (Level::INFO, format!("[stopped] provider={provider:?}")),
        EventKind::EngineHalted => (
            Level::ERROR,
            format!("[halted] provider={provider:?} reason={reason:?}"),
        ),
        EventKind::SubscriberOverflow => (Level::WARN, format!("[subscriber-overflow] {reason}")),
        EventKind::SubscriberPanicked => (Level::WARN, format!("[subscriber-panicked] {reason}")),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let (level, line) = render(e);
        if level == Level::ERROR {
            error!(target: TARGET, "{line}");
        } else if level == Level::WARN {
            warn!(target: TARGET, "{line}");
        } else {
            info!(target: TARGET, "{line}");
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;
    use crate::request::RequestId;

    #[test]
    fn test_admitted_renders_plain_values() {
        let ev = Event::new(EventKind::RequestAdmitted)
            .with_provider("wifi")
            .with_request(RequestId(7))
            .with_score(100)
            .with_count(1);
        assert_eq!(
            render(&ev),
            (
                Level::INFO,
                "[admitted] provider=\"wifi\" request=7 score=100 count=1".to_string()
            )
        );
    }

    #[test]
    fn test_missing_fields_render_as_dash() {
        let ev = Event::new(EventKind::RequestEvicted).with_request(RequestId(3));
        assert_eq!(
            render(&ev).1,
            "[evicted] provider=\"-\" request=3 score=- count=-"
        );
    }

    #[test]
    fn test_levels_follow_severity() {
        let panicked = Event::new(EventKind::PredicatePanicked)
            .with_provider("wifi")
            .with_request(RequestId(9))
            .with_reason("policy bug");
        assert_eq!(
            render(&panicked),
            (
                Level::WARN,
                "[predicate-panicked] provider=\"wifi\" request=9 reason=\"policy bug\"".to_string()
            )
        );
        assert_eq!(render(&Event::new(EventKind::EngineHalted)).0, Level::ERROR);
        assert_eq!(render(&Event::new(EventKind::LinkActivated)).0, Level::INFO);
    }

    #[tokio::test]
    async fn test_on_event_without_subscriber_is_silent() {
        LogWriter::new()
            .on_event(&Event::new(EventKind::EngineStarted).with_provider("wifi"))
            .await;
    }
}
