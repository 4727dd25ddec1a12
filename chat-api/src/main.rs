//! Chat Lambda - proxies portfolio questions to the Gemini API.
//!
//! Flow per invocation: CORS preflight, method gate, optional shared-secret
//! guard, body validation, knowledge-document injection, one model round
//! trip. Model failures degrade to a keyword-matched canned reply or surface
//! as 500, depending on configuration.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shared::config::{Config, FailurePolicy, KnowledgeSource};
use shared::conversation::build_contents;
use shared::fallback::{fallback_reply, lenient_message};
use shared::gemini::GeminiClient;
use shared::http::{error_response, json_response, preflight_response};
use shared::knowledge::{HttpFetcher, KnowledgeProvider};
use shared::models::{ChatReply, ChatRequest};

/// Application state
struct AppState {
    config: Config,
    knowledge: KnowledgeProvider,
    gemini: GeminiClient,
}

impl AppState {
    fn new(config: Config) -> Self {
        let knowledge = match config.knowledge_source {
            KnowledgeSource::Remote => {
                KnowledgeProvider::remote(HttpFetcher::new(config.knowledge_base_url()))
            }
            KnowledgeSource::Embedded => KnowledgeProvider::embedded(),
        };
        let gemini = GeminiClient::new(config.gemini_api_key.clone());

        Self {
            config,
            knowledge,
            gemini,
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match event.method().as_str() {
        "OPTIONS" => return preflight_response(),
        "POST" => {}
        _ => return error_response(405, "Método no permitido"),
    }

    match process(&state, &event).await {
        Ok(reply) => json_response(200, &reply),
        Err(err @ (shared::Error::Unauthorized | shared::Error::Validation(_))) => {
            error_response(err.status_code(), err.to_string())
        }
        Err(err) => degraded_response(&state, &event, err),
    }
}

/// Token guard through model invocation. Guard and validation failures map to
/// their status codes; everything else lands on the degraded path.
async fn process(state: &AppState, event: &Request) -> shared::Result<ChatReply> {
    if let Some(expected) = state.config.access_token.as_deref() {
        let token = event
            .headers()
            .get("x-access-token")
            .and_then(|value| value.to_str().ok());
        if token != Some(expected) {
            return Err(shared::Error::Unauthorized);
        }
    }

    let request: ChatRequest = serde_json::from_slice(event.body().as_ref())?;
    if request.message.trim().is_empty() {
        return Err(shared::Error::Validation(
            "El campo \"message\" es requerido".to_string(),
        ));
    }

    info!(history_len = request.history.len(), "handling chat message");

    let knowledge = state.knowledge.get().await;
    let contents = build_contents(&knowledge.content, &request.history, &request.message);
    let reply = state.gemini.generate(&contents).await?;

    Ok(ChatReply::success(reply))
}

/// Body-parse and model failures: mask behind a canned reply or surface,
/// per configuration.
fn degraded_response(
    state: &AppState,
    event: &Request,
    err: shared::Error,
) -> Result<Response<Body>, Error> {
    error!(error = %err, "chat request failed upstream");

    match state.config.failure_policy {
        FailurePolicy::MaskAs200 => {
            let message = lenient_message(event.body().as_ref());
            json_response(
                200,
                &ChatReply::degraded(fallback_reply(&message), err.to_string()),
            )
        }
        FailurePolicy::SurfaceAs500 => error_response(500, err.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    info!(
        access_token_required = config.access_token.is_some(),
        knowledge_source = ?config.knowledge_source,
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config));
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
