//! In-memory event capture for tests
//!
//! Installs a layer that records every event's fields so tests can assert on
//! op start/end events and on the suppression audit trail.

use crate::core_types::schema::{
    EVENT_SUPPRESSED, FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_RESOURCE_TITLE,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event, fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }
}

struct FieldRecorder<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    // numbers and bools print the same under Debug
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    sink: Sink,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        if let Ok(mut events) = self.sink.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                fields,
            });
        }
    }
}

/// Shared handle onto the captured events
#[derive(Clone)]
pub struct TestCapture {
    sink: Sink,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    /// `suppressed` events of `op` (`ignore_match`, `filter_match`) naming
    /// the resource `title`.
    pub fn suppressions(&self, op: &str, title: &str) -> Vec<CapturedEvent> {
        self.events_for_op(op)
            .into_iter()
            .filter(|e| {
                e.event() == Some(EVENT_SUPPRESSED) && e.field(FIELD_RESOURCE_TITLE) == Some(title)
            })
            .collect()
    }

    /// # Panics
    ///
    /// Panics if no event has both `op` and `event`
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events_for_op(op);
        assert!(
            events.iter().any(|e| e.event() == Some(event)),
            "no {}/{} event among {} events for that op",
            op,
            event,
            events.len()
        );
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (first call only) and
/// return the shared handle.
///
/// Every test in a binary shares one handle, so filter by something unique
/// to the test, such as a resource title or an op name.
///
/// ```
/// use catdiff_core::logging_facility::test_capture::init_test_capture;
/// use catdiff_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("my_operation");
/// capture.assert_event_exists("my_operation", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let sink = Sink::default();
            let layer = CaptureLayer { sink: sink.clone() };
            // a subscriber installed elsewhere keeps its place; capture then stays empty
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { sink }
        })
        .clone()
}
