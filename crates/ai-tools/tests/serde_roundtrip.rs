#![cfg(feature = "serde")]

use ai_tools::{TraceEvent, TraceKind, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, TraceKind::Begin, "idle").with_behavior("humanoid"),
            TraceEvent::new(2, TraceKind::Suspend, "idle")
                .with_other("investigate")
                .with_reason("heard something"),
            TraceEvent::new(5, TraceKind::Resume, "idle").with_other("investigate"),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
