//! JSON-line logging to stderr, picked up by CloudWatch Logs.

use serde_json::{json, Value};

pub fn log_record(component: &str, event: &str, details: Value) -> Value {
    json!({
        "component": component,
        "event": event,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "details": details,
    })
}

pub fn log_info(component: &str, event: &str, details: Value) {
    eprintln!("{}", log_record(component, event, details));
}

pub fn log_error(component: &str, event: &str, details: Value) {
    let mut record = log_record(component, event, details);
    if let Some(fields) = record.as_object_mut() {
        fields.insert("level".to_string(), Value::from("error"));
    }
    eprintln!("{record}");
}
