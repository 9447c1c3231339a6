use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folioscope_core::config::{AppConfig, Settings};
use folioscope_core::domain::analysis::AnalysisResult;
use folioscope_core::domain::portfolio::PortfolioLine;
use folioscope_core::domain::quote::Quote;
use folioscope_core::llm::extract::extract;
use folioscope_core::llm::openai::OpenAiCompatClient;
use folioscope_core::llm::prompt::AnalysisRequestBuilder;
use folioscope_core::llm::ChatClient;
use folioscope_core::quotes::{HttpQuoteProvider, TickerResolver};

const API_KEY_HEADER: &str = "x-api-key";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Arc::new(AppConfig::load(std::path::Path::new(&config_path))?);

    let provider = HttpQuoteProvider::from_settings(&settings)?;
    let resolver = Arc::new(TickerResolver::new(Arc::new(provider)));
    let llm: Arc<dyn ChatClient> = Arc::new(OpenAiCompatClient::from_config(&config.model)?);

    let state = AppState {
        resolver,
        llm,
        config,
        fallback_api_key: settings.gemini_api_key.clone(),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stock/:ticker", get(get_stock))
        .route("/api/analyze", post(analyze))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    resolver: Arc<TickerResolver>,
    llm: Arc<dyn ChatClient>,
    config: Arc<AppConfig>,
    fallback_api_key: Option<String>,
}

/// Caller-facing error: a status code plus an `{"error": ...}` JSON body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

async fn get_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    match state.resolver.resolve(&ticker).await {
        Ok(quote) => Ok(Json(quote)),
        Err(not_found) => Err(ApiError::new(StatusCode::NOT_FOUND, not_found.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    stocks: Vec<PortfolioLine>,
    #[serde(default)]
    instructions: String,
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    // Credential check first, then portfolio validation, then the single
    // outbound call. Parse irregularities in the reply never error; the
    // extractor always yields a result.
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| state.fallback_api_key.clone());

    let Some(api_key) = api_key else {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "No API key provided",
        ));
    };

    if req.stocks.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No stocks provided"));
    }

    let prompt =
        AnalysisRequestBuilder::new(&state.config.prompts).build(&req.stocks, &req.instructions);

    match state.llm.complete(&api_key, &prompt).await {
        Ok(raw) => Ok(Json(extract(&raw))),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "chat completion call failed");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{err:#}"),
            ))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folioscope_core::config::{ModelConfig, PromptConfig};
    use folioscope_core::domain::quote::QuoteCandidate;
    use folioscope_core::llm::ChatPrompt;
    use folioscope_core::quotes::QuoteProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubChat {
        calls: Arc<AtomicUsize>,
        reply: String,
    }

    #[async_trait::async_trait]
    impl ChatClient for StubChat {
        async fn complete(&self, _api_key: &str, _prompt: &ChatPrompt) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingChat;

    #[async_trait::async_trait]
    impl ChatClient for FailingChat {
        async fn complete(&self, _api_key: &str, _prompt: &ChatPrompt) -> anyhow::Result<String> {
            Err(folioscope_core::llm::error::LlmCallError {
                stage: "http",
                detail: "status=429 Too Many Requests".to_string(),
                raw_body: Some(r#"{"error":"quota exceeded"}"#.to_string()),
            }
            .into())
        }
    }

    struct UnlistedProvider;

    #[async_trait::async_trait]
    impl QuoteProvider for UnlistedProvider {
        async fn fetch_quote(&self, symbol: &str) -> anyhow::Result<QuoteCandidate> {
            anyhow::bail!("no listing for {symbol}")
        }
    }

    fn test_state(
        reply: &str,
        calls: Arc<AtomicUsize>,
        fallback_api_key: Option<String>,
    ) -> AppState {
        AppState {
            resolver: Arc::new(TickerResolver::new(Arc::new(UnlistedProvider))),
            llm: Arc::new(StubChat {
                calls,
                reply: reply.to_string(),
            }),
            config: Arc::new(AppConfig {
                model: ModelConfig {
                    name: "gemini-2.0-flash".to_string(),
                    temperature: 0.3,
                },
                prompts: PromptConfig {
                    system: "You are a portfolio analyst.".to_string(),
                    analysis_template: "{user_input}".to_string(),
                },
            }),
            fallback_api_key,
        }
    }

    fn one_holding() -> Vec<PortfolioLine> {
        vec![PortfolioLine {
            ticker: "AAPL".to_string(),
            quantity: 10.0,
            price: 150.0,
        }]
    }

    #[tokio::test]
    async fn analyze_without_credential_is_unauthorized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state("{}", calls.clone(), None);

        let err = analyze(
            State(state),
            HeaderMap::new(),
            Json(AnalyzeRequest {
                stocks: one_holding(),
                instructions: String::new(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "No API key provided");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn analyze_with_empty_portfolio_is_rejected_before_any_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state("{}", calls.clone(), Some("env-key".to_string()));

        let err = analyze(
            State(state),
            HeaderMap::new(),
            Json(AnalyzeRequest {
                stocks: vec![],
                instructions: "anything".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No stocks provided");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn analyze_returns_extracted_verdict_from_prose_wrapped_json() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reply = r#"Sure! {"score": 7, "reasoning": "Diversify more."} Thanks."#;
        let state = test_state(reply, calls.clone(), None);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, "header-key".parse().unwrap());

        let Json(result) = analyze(
            State(state),
            headers,
            Json(AnalyzeRequest {
                stocks: one_holding(),
                instructions: "Be blunt.".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.score, 7);
        assert_eq!(result.reasoning, "Diversify more.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upstream_call_failure_maps_to_internal_error_with_detail() {
        let state = AppState {
            llm: Arc::new(FailingChat),
            ..test_state("{}", Arc::new(AtomicUsize::new(0)), None)
        };

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, "header-key".parse().unwrap());

        let err = analyze(
            State(state),
            headers,
            Json(AnalyzeRequest {
                stocks: one_holding(),
                instructions: String::new(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("status=429 Too Many Requests"));
    }

    #[tokio::test]
    async fn unresolvable_ticker_is_not_found_with_uppercased_echo() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state("{}", calls, None);

        let err = get_stock(State(state), Path("xxxxx".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Stock not found: XXXXX");
    }
}
