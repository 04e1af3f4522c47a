//! Tests for event encoding.

use fluentgate::encode::{self, encode_with_failures, render_stack_trace, strip_context};
use fluentgate::{CallSite, Level, LogEvent, MetadataEntry, TagSet, Thrown, Value};
use std::fmt;

#[derive(Debug)]
struct Wrapped {
    msg: &'static str,
    inner: Option<Box<Self>>,
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msg)
    }
}

impl std::error::Error for Wrapped {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.as_deref().map(|e| e as _)
    }
}

/// An error whose cause is itself.
#[derive(Debug)]
struct Loop;

impl fmt::Display for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("loop")
    }
}

impl std::error::Error for Loop {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self)
    }
}

/// Wraps an I/O error; its only field sits at the wrapper's own address.
#[derive(Debug)]
struct ReadConfig(std::io::Error);

impl fmt::Display for ReadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("could not read config")
    }
}

impl std::error::Error for ReadConfig {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

fn full_event() -> LogEvent {
    LogEvent::builder()
        .level(Level::Config)
        .message("Hello Foo Bar")
        .timestamp_nanos(1_700_000_000_123_456_789)
        .call_site(
            CallSite {
                class_name: None,
                file_name: Some("src/main.rs".to_string()),
                line_number: 42,
                method_name: None,
            }
            .class_name("app::Main")
            .method_name("run"),
        )
        .tags(
            "tags",
            TagSet::builder()
                .tag("a")
                .tag("b")
                .tag("c")
                .tag_value("d", 1)
                .build(),
        )
        .field("test", "test")
        .repeated("integers", 2)
        .repeated("integers", 3)
        .build()
}

#[test]
fn encodes_fixed_fields() {
    let out = encode::encode(&full_event());

    assert_eq!(out.get("message"), Some(&Value::from("Hello Foo Bar")));
    assert_eq!(out.get("level"), Some(&Value::from("CONFIG")));
    assert_eq!(
        out.get("timestampNanos"),
        Some(&Value::Int(1_700_000_000_123_456_789))
    );
    assert_eq!(out.get("className"), Some(&Value::from("app::Main")));
    assert_eq!(out.get("fileName"), Some(&Value::from("src/main.rs")));
    assert_eq!(out.get("lineNumber"), Some(&Value::Int(42)));
    assert_eq!(out.get("methodName"), Some(&Value::from("run")));
    assert_eq!(out.get("test"), Some(&Value::from("test")));
}

#[test]
fn flattens_tags() {
    let out = encode::encode(&full_event());

    let tags = out.get("tags").and_then(Value::as_list).unwrap();
    assert_eq!(tags.len(), 3);
    for name in ["a", "b", "c"] {
        assert!(tags.contains(&Value::from(name)), "missing tag {name}");
    }
    assert_eq!(out.get("d"), Some(&Value::Int(1)));
}

#[test]
fn repeated_keys_keep_every_value() {
    let out = encode::encode(&full_event());

    let integers = out.get("integers").and_then(Value::as_list).unwrap();
    assert!(integers.contains(&Value::Int(2)));
    assert!(integers.contains(&Value::Int(3)));
    assert_eq!(integers.len(), 2);
}

#[test]
fn single_repeated_value_is_still_a_list() {
    let event = LogEvent::builder().repeated("ids", 7).build();
    let out = encode::encode(&event);
    assert_eq!(out.get("ids"), Some(&Value::List(vec![Value::Int(7)])));
}

#[test]
fn scalar_last_write_wins() {
    let event = LogEvent::builder()
        .field("user", "alice")
        .field("user", "bob")
        .build();
    let out = encode::encode(&event);
    assert_eq!(out.get("user"), Some(&Value::from("bob")));
}

#[test]
fn absent_values_are_skipped() {
    let event = LogEvent::builder()
        .entry(MetadataEntry::Scalar {
            label: "missing".to_string(),
            value: None,
        })
        .entry(MetadataEntry::Repeatable {
            label: "also_missing".to_string(),
            value: None,
        })
        .build();
    let out = encode::encode(&event);
    assert!(!out.contains_key("missing"));
    assert!(!out.contains_key("also_missing"));
}

#[test]
fn encoding_is_idempotent() {
    let event = full_event();
    assert_eq!(encode::encode(&event), encode::encode(&event));
}

#[test]
fn minimal_event_has_only_timestamp() {
    let event = LogEvent::builder().timestamp_nanos(5).build();
    let out = encode::encode(&event);
    assert_eq!(out.len(), 1);
    assert_eq!(out.get("timestampNanos"), Some(&Value::Int(5)));
}

#[test]
fn context_annotation_is_stripped() {
    let event = LogEvent::new(Level::Info, "Hello [CONTEXT x]");
    let out = encode::encode(&event);
    assert_eq!(out.get("message"), Some(&Value::from("Hello")));
}

#[test]
fn context_only_message_is_dropped() {
    let event = LogEvent::new(Level::Info, "[CONTEXT x]");
    let out = encode::encode(&event);
    assert!(!out.contains_key("message"));
}

#[test]
fn strip_context_cases() {
    assert_eq!(strip_context("plain"), Some("plain"));
    assert_eq!(strip_context("a [CONTEXT k=v ]"), Some("a"));
    assert_eq!(strip_context("[CONTEXT k=v ]"), None);
    assert_eq!(strip_context(""), None);
    // Not at the end, so left alone.
    assert_eq!(
        strip_context("a [CONTEXT k=v ] tail"),
        Some("a [CONTEXT k=v ] tail")
    );
}

#[test]
fn thrown_renders_cause_chain() {
    let error = Wrapped {
        msg: "outer",
        inner: Some(Box::new(Wrapped {
            msg: "inner",
            inner: None,
        })),
    };
    let thrown = Thrown::new(error);
    let event = LogEvent::builder()
        .level(Level::Severe)
        .thrown(thrown.clone())
        .build();

    let (out, failures) = encode_with_failures(&event);
    assert!(failures.is_empty());
    assert_eq!(out.get("thrown"), Some(&Value::Error(thrown)));
    assert_eq!(
        out.get("stackTrace"),
        Some(&Value::from("outer\nCaused by: inner\n"))
    );
}

#[test]
fn cyclic_cause_chain_gets_marker() {
    let event = LogEvent::builder().thrown(Thrown::new(Loop)).build();

    let (out, failures) = encode_with_failures(&event);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].field, "stackTrace");
    let marker = out.get("stackTrace").and_then(Value::as_str).unwrap();
    assert!(marker.starts_with("<unrenderable stack trace:"));
    assert!(out.contains_key("thrown"));
}

#[test]
fn render_stack_trace_single_error() {
    let error = Wrapped {
        msg: "only",
        inner: None,
    };
    assert_eq!(render_stack_trace(&error).unwrap(), "only\n");
    assert!(render_stack_trace(&Loop).is_err());
}

#[test]
fn record_serializes_as_flat_object() {
    let out = encode::encode(&full_event());
    let json: serde_json::Value = serde_json::to_value(&out).unwrap();
    assert_eq!(json["level"], "CONFIG");
    assert_eq!(json["d"], 1);
    assert_eq!(json["integers"], serde_json::json!([2, 3]));
}

#[test]
fn newtype_wrapper_is_not_a_cycle() {
    let error = ReadConfig(std::io::Error::other("disk gone"));
    assert_eq!(
        render_stack_trace(&error).unwrap(),
        "could not read config\nCaused by: disk gone\n"
    );

    let event = LogEvent::builder()
        .level(Level::Severe)
        .thrown(Thrown::new(ReadConfig(std::io::Error::other("disk gone"))))
        .build();
    let (out, failures) = encode_with_failures(&event);
    assert!(failures.is_empty());
    assert_eq!(
        out.get("stackTrace"),
        Some(&Value::from("could not read config\nCaused by: disk gone\n"))
    );
}
