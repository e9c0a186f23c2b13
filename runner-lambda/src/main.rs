use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use hello_core::config::{CONFIG_PATH_ENV, load_config};
use hello_core::telemetry::init_tracing;
use hello_core::{HelloHandler, HelloRequest, HelloResponse, Logger, RequestContext};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use lambda_runtime::{Context, Error, LambdaEvent, service_fn};
use tracing::info;

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

pub(crate) async fn lambda_handler<L: Logger>(
    handler: &HelloHandler<L>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (request, context) = event.into_parts();
    let response = handler.handle(&to_hello_request(&request, &context));
    Ok(to_proxy_response(response))
}

fn to_hello_request(request: &ApiGatewayProxyRequest, context: &Context) -> HelloRequest {
    let query_params = request
        .query_string_parameters
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    // API Gateway's id is the one callers see; the invocation id is the fallback
    let request_id = request
        .request_context
        .request_id
        .clone()
        .or_else(|| Some(context.request_id.clone()).filter(|id| !id.is_empty()));

    let correlation_id = request
        .headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    HelloRequest {
        http_method: request.http_method.to_string(),
        path: request.path.clone().unwrap_or_default(),
        query_params,
        context: RequestContext {
            request_id,
            trace_id: context.xray_trace_id.clone(),
            correlation_id,
            user_id: request.request_context.identity.user.clone(),
        },
    }
}

fn to_proxy_response(response: HelloResponse) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = response.content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    let mut proxy_response = ApiGatewayProxyResponse::default();
    proxy_response.status_code = i64::from(response.status_code);
    proxy_response.headers = headers;
    proxy_response.body = Some(Body::Text(response.body));
    proxy_response
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = load_config(config_path.as_deref())?;
    let logger = init_tracing(&config.log)?;

    info!("Running in AWS Lambda environment");

    let handler = HelloHandler::new(logger);
    let handler = &handler;
    lambda_runtime::run(service_fn(move |event| async move {
        lambda_handler(handler, event).await
    }))
    .await
}
