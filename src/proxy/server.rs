//! Main proxy server implementation

use axum::{
    extract::State,
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use super::handler::ProxyHandler;
use crate::config::{AppConfig, Credential};
use crate::upstream::{GeminiClient, UpstreamClient};

/// Shared state for the proxy, immutable after startup
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<AppConfig>,
    /// `None` when the key variable is unset; each request then fails with CONFIG_ERROR
    pub credential: Option<Credential>,
    pub upstream: Arc<dyn UpstreamClient>,
}

impl ProxyState {
    /// Build state with the real Gemini client and the credential from the environment
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let upstream = GeminiClient::from_config(&config.upstream)?;
        let credential = config.upstream.load_credential();

        Ok(Self {
            config: Arc::new(config),
            credential,
            upstream: Arc::new(upstream),
        })
    }
}

/// Build the router: the proxy route, health check, CORS and tracing
pub fn build_router(state: ProxyState) -> Router {
    let path = state.config.server.path.clone();

    Router::new()
        .route("/health", get(health_handler))
        // Every method reaches the handler so it can answer 405 itself
        .route(&path, any(proxy_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the proxy server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = ProxyState::from_config(config.clone())?;
    if state.credential.is_none() {
        tracing::warn!(
            var = %config.upstream.api_key_env,
            "API key environment variable is not set; requests will fail with CONFIG_ERROR"
        );
    }

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("gemini-proxy listening on {}{}", addr, config.server.path);
    tracing::info!(
        default_model = %config.upstream.default_model,
        "Proxying to {}",
        config.upstream.base_url()
    );

    Ok(axum::serve(listener, app).await?)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Proxy handler, one span per request
async fn proxy_handler(State(state): State<ProxyState>, req: axum::extract::Request) -> axum::response::Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("proxy_request", %request_id);

    let handler = ProxyHandler::new(state);
    handler.handle(req).instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state_without_credential() -> ProxyState {
        let config = AppConfig::default();
        let upstream = GeminiClient::from_config(&config.upstream).unwrap();
        ProxyState {
            config: Arc::new(config),
            credential: None,
            upstream: Arc::new(upstream),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_without_credential());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_get_on_proxy_route_is_405() {
        let app = build_router(state_without_credential());
        let response = app
            .oneshot(Request::builder().uri("/api/gemini-proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state_without_credential());
        let response = app
            .oneshot(Request::builder().uri("/v1/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_without_credential_is_config_error() {
        let app = build_router(state_without_credential());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/gemini-proxy")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["proxyError"], "500 - CONFIG_ERROR");
    }
}
