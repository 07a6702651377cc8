#![forbid(unsafe_code)]

//! Structured-logging contract: lifecycle changes and dropped completion
//! tokens show up as tracing events with the fields dashboards key on.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cardmotion_core::geometry::Rect;
use cardmotion_transition::CompletionToken;
use common::Harness;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: Option<String>,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);

        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message");
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn transitions(events: &[CapturedEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter(|e| e.message.as_deref() == Some("transition"))
        .map(|e| (e.fields["from"].clone(), e.fields["to"].clone()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn lifecycle_transitions_are_logged_with_state_names() {
    let events = capture(|| {
        let mut h = Harness::new(Rect::new(20.0, 300.0, 150.0, 220.0));
        h.present(false);
        h.drag(&[0.4, 1.1]);
        h.settle();
    });

    let seen = transitions(&events);
    let expected = [
        ("idle", "presenting"),
        ("presenting", "presented"),
        ("presented", "interactive-dismissing"),
        ("interactive-dismissing", "committing-dismiss"),
        ("committing-dismiss", "dismissed"),
    ];
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    assert_eq!(seen, expected);

    let transition = events
        .iter()
        .find(|e| e.message.as_deref() == Some("transition"))
        .expect("transition event");
    assert_eq!(transition.level, tracing::Level::DEBUG);
    assert!(transition.target.starts_with("cardmotion_transition"));
    assert!(transition.fields.contains_key("event"));

    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::INFO
                && e.message.as_deref() == Some("presenting card")
                && e.fields.get("entity_id").map(String::as_str) == Some("1")),
        "present should log the entity at info"
    );
}

#[test]
fn dropped_completion_token_warns() {
    let reported = Arc::new(Mutex::new(None));
    let events = capture(|| {
        let slot = Arc::clone(&reported);
        let token = CompletionToken::new(move |ok| *slot.lock().unwrap() = Some(ok));
        drop(token);
    });

    assert_eq!(*reported.lock().unwrap(), Some(false));
    let warns: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warns.len(), 1);
    assert!(
        warns[0]
            .message
            .as_deref()
            .is_some_and(|m| m.contains("dropped"))
    );
}

#[test]
fn rejected_drag_is_logged_once() {
    let events = capture(|| {
        let mut h = Harness::new(Rect::new(20.0, 300.0, 150.0, 220.0));
        h.present(true);
        h.drag(&[1.2]);
        h.settle();
    });

    let rejections = events
        .iter()
        .filter(|e| {
            e.message
                .as_deref()
                .is_some_and(|m| m.starts_with("interactive dismiss rejected"))
        })
        .count();
    assert_eq!(rejections, 1);
}
