use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{HelloError, Result};
use crate::greeting::greet;
use crate::logger::{Field, Level, Logger, RequestContext};

pub const JSON_CONTENT_TYPE: &str = "application/json";

const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error","status":"500"}"#;

/// A `GET /hello` request, independent of the transport it arrived on.
#[derive(Debug, Clone, Default)]
pub struct HelloRequest {
    pub http_method: String,
    pub path: String,
    pub query_params: BTreeMap<String, String>,
    pub context: RequestContext,
}

impl HelloRequest {
    /// The `name` query parameter, or an empty string when absent.
    pub fn name(&self) -> &str {
        self.query_params.get("name").map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloResponse {
    pub status_code: u16,
    /// `None` leaves the content type to the transport.
    pub content_type: Option<&'static str>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: String,
}

impl HelloResponse {
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Result<Self> {
        let body = ErrorBody {
            error: message.into(),
            status: status_code.to_string(),
        };

        Ok(Self {
            status_code,
            content_type: Some(JSON_CONTENT_TYPE),
            body: serde_json::to_string(&body)?,
        })
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            content_type: Some(JSON_CONTENT_TYPE),
            body: INTERNAL_ERROR_BODY.to_string(),
        }
    }
}

pub struct HelloHandler<L> {
    logger: L,
}

impl<L: Logger> HelloHandler<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }

    /// Never fails: validation errors become 400 responses, anything else a 500.
    pub fn handle(&self, request: &HelloRequest) -> HelloResponse {
        let context = &request.context;

        self.logger.log(
            context,
            Level::Debug,
            "Request received",
            &[
                Field::new("query_params", json!(request.query_params)),
                Field::new("http_method", request.http_method.as_str()),
                Field::new("path", request.path.as_str()),
            ],
        );

        let name = request.name();
        match greet(name) {
            Ok(greeting) => HelloResponse::text(200, greeting.into_string()),
            Err(err) => {
                self.logger.log(
                    context,
                    Level::Warn,
                    "Validation failed",
                    &[Field::new("name", name), Field::new("error", err.to_string())],
                );
                self.error_response(context, &HelloError::from(err))
            }
        }
    }

    fn error_response(&self, context: &RequestContext, err: &HelloError) -> HelloResponse {
        if !err.is_client_error() {
            self.logger.log(
                context,
                Level::Error,
                "Request failed",
                &[Field::new("error", err.to_string())],
            );
        }

        HelloResponse::error(err.status_code(), err.client_message()).unwrap_or_else(|e| {
            self.logger.log(
                context,
                Level::Error,
                "Failed to build error response",
                &[Field::new("error", e.to_string())],
            );
            HelloResponse::internal_error()
        })
    }
}
