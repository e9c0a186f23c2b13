use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use hello_core::config::{CONFIG_PATH_ENV, load_config};
use hello_core::telemetry::init_tracing;
use hello_core::{HelloHandler, HelloRequest, HelloResponse, Logger, RequestContext};
use tracing::info;

const REQUEST_ID_HEADER: &str = "x-request-id";
const TRACE_ID_HEADER: &str = "x-amzn-trace-id";
const CORRELATION_ID_HEADER: &str = "x-correlation-id";
const USER_ID_HEADER: &str = "x-user-id";

/// Entry point for serving the hello endpoint from a long-running container
/// (ECS, EKS, or locally) instead of Lambda.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    let logger = init_tracing(&config.log)?;

    let address = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, "Running in container mode");

    let app = router(Arc::new(HelloHandler::new(logger)));
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn router<L: Logger + 'static>(handler: Arc<HelloHandler<L>>) -> Router {
    Router::new()
        .route("/hello", get(hello::<L>))
        .with_state(handler)
}

async fn hello<L: Logger + 'static>(
    State(handler): State<Arc<HelloHandler<L>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query_params): Query<BTreeMap<String, String>>,
) -> Response {
    let request = HelloRequest {
        http_method: method.to_string(),
        path: uri.path().to_string(),
        query_params,
        context: request_context(&headers),
    };

    into_http_response(handler.handle(&request))
}

fn request_context(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    RequestContext {
        request_id: header(REQUEST_ID_HEADER),
        trace_id: header(TRACE_ID_HEADER),
        correlation_id: header(CORRELATION_ID_HEADER),
        user_id: header(USER_ID_HEADER),
    }
}

fn into_http_response(response: HelloResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match response.content_type {
        Some(content_type) => {
            (status, [(header::CONTENT_TYPE, content_type)], response.body).into_response()
        }
        None => (status, response.body).into_response(),
    }
}
