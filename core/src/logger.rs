//! The structured logging capability used by the handler.
//!
//! Callers depend on the [`Logger`] trait; [`TracingLogger`] is the production
//! implementation and emits `tracing` events. The subscriber those events go
//! to is configured in [`crate::telemetry`].

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

/// A caller-supplied key/value pair attached to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: &'static str,
    pub value: Value,
}

impl Field {
    pub fn new(key: &'static str, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Correlation metadata for one request. Members that are set are attached to
/// every record logged for that request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub trace_id: Option<String>,
    pub correlation_id: Option<String>,
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    /// Implementations see the caller's location through
    /// [`Location::caller`].
    #[cfg_attr(not(test), track_caller)]
    fn log(&self, context: &RequestContext, level: Level, message: &str, fields: &[Field]);
}

/// Emits records as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

/// Renders caller fields as one JSON object.
///
/// `tracing` only records primitive values, so the JSON formatter writes this
/// object as a string. Nested values need the unstable `valuable` integration.
struct FieldsJson<'a>(&'a [Field]);

impl fmt::Display for FieldsJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|field| (field.key.to_string(), field.value.clone()))
            .collect();
        write!(f, "{}", Value::Object(map))
    }
}

// `tracing` needs the level at the call site to be a constant.
macro_rules! emit {
    ($level:expr, $context:expr, $message:expr, $fields:expr, $loc:expr, $stack:expr) => {
        tracing::event!(
            $level,
            loc = %$loc,
            stack = $stack.map(tracing::field::display),
            request_id = $context.request_id.as_deref(),
            trace_id = $context.trace_id.as_deref(),
            correlation_id = $context.correlation_id.as_deref(),
            user_id = $context.user_id.as_deref(),
            fields = (!$fields.is_empty()).then(|| tracing::field::display(FieldsJson($fields))),
            "{}",
            $message
        )
    };
}

impl Logger for TracingLogger {
    #[track_caller]
    fn log(&self, context: &RequestContext, level: Level, message: &str, fields: &[Field]) {
        let caller = Location::caller();
        let loc = format!("{}:{}", caller.file(), caller.line());
        // error records carry the stack they were logged from
        let stack = (level == Level::Error).then(Backtrace::force_capture);
        let stack = stack.as_ref();

        match level {
            Level::Trace => emit!(tracing::Level::TRACE, context, message, fields, loc, stack),
            Level::Debug => emit!(tracing::Level::DEBUG, context, message, fields, loc, stack),
            Level::Info => emit!(tracing::Level::INFO, context, message, fields, loc, stack),
            Level::Warn => emit!(tracing::Level::WARN, context, message, fields, loc, stack),
            Level::Error => emit!(tracing::Level::ERROR, context, message, fields, loc, stack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HelloHandler, HelloRequest};
    use crate::telemetry::tests::capture;
    use serde_json::json;

    fn create_test_context() -> RequestContext {
        RequestContext::default()
            .with_request_id("req-001")
            .with_trace_id("trace-002")
            .with_correlation_id("corr-003")
            .with_user_id("user-789")
    }

    #[test]
    fn test_each_level_is_emitted() {
        for (level, expected) in [
            (Level::Trace, "TRACE"),
            (Level::Debug, "DEBUG"),
            (Level::Info, "INFO"),
            (Level::Warn, "WARN"),
            (Level::Error, "ERROR"),
        ] {
            let records = capture(|| {
                TracingLogger::new().log(&RequestContext::default(), level, "a message", &[]);
            });

            assert_eq!(records.len(), 1);
            assert_eq!(records[0]["message"], "a message");
            assert_eq!(records[0]["level"], expected);
        }
    }

    #[test]
    fn test_record_points_at_the_caller() {
        let mut line = 0;
        let records = capture(|| {
            line = line!() + 1;
            TracingLogger::new().log(&RequestContext::default(), Level::Info, "located", &[]);
        });

        assert_eq!(records[0]["loc"], format!("{}:{line}", file!()));
    }

    #[test]
    fn test_handler_records_point_at_the_handler() {
        let request = HelloRequest {
            query_params: [("name".to_string(), "John@Doe".to_string())].into(),
            ..HelloRequest::default()
        };
        let records = capture(|| {
            HelloHandler::new(TracingLogger::new()).handle(&request);
        });

        assert_eq!(records.len(), 2);
        for record in &records {
            let loc = record["loc"].as_str().unwrap();
            assert!(loc.contains("handler.rs:"), "got {loc}");
        }
    }

    #[test]
    fn test_only_error_records_carry_a_stack() {
        let records = capture(|| {
            let logger = TracingLogger::new();
            logger.log(&RequestContext::default(), Level::Warn, "degraded", &[]);
            logger.log(&RequestContext::default(), Level::Error, "failed", &[]);
        });

        assert!(!records[0].as_object().unwrap().contains_key("stack"));
        let stack = records[1]["stack"].as_str().unwrap();
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_context_ids_are_attached() {
        let records = capture(|| {
            TracingLogger::new().log(&create_test_context(), Level::Info, "Complete context", &[]);
        });

        let record = &records[0];
        assert_eq!(record["request_id"], "req-001");
        assert_eq!(record["trace_id"], "trace-002");
        assert_eq!(record["correlation_id"], "corr-003");
        assert_eq!(record["user_id"], "user-789");
    }

    #[test]
    fn test_missing_context_ids_are_omitted() {
        let context = RequestContext::default().with_request_id("req-123-456");
        let records = capture(|| {
            TracingLogger::new().log(&context, Level::Info, "Request processed", &[]);
        });

        let record = records[0].as_object().unwrap();
        assert_eq!(record["request_id"], "req-123-456");
        assert!(!record.contains_key("trace_id"));
        assert!(!record.contains_key("correlation_id"));
        assert!(!record.contains_key("user_id"));
        assert!(!record.contains_key("fields"));
    }

    #[test]
    fn test_fields_are_rendered_as_one_json_object() {
        let records = capture(|| {
            TracingLogger::new().log(
                &RequestContext::default(),
                Level::Warn,
                "Validation failed",
                &[
                    Field::new("name", "John@Doe"),
                    Field::new("attempts", 3),
                ],
            );
        });

        let fields: Value = serde_json::from_str(records[0]["fields"].as_str().unwrap()).unwrap();
        assert_eq!(fields, json!({ "name": "John@Doe", "attempts": 3 }));
    }

    #[test]
    fn test_level_serde_names() {
        let level: Level = serde_yaml::from_str("warn").unwrap();
        assert_eq!(level, Level::Warn);
        assert_eq!(Level::Error.to_string(), "error");
        assert!(Level::Trace < Level::Error);
    }
}
