use crate::error::ApiError;
use crate::origin::{cors_layer, origin_guard, AllowedOrigins};
use api_shared::{
    CidSuggestionRes, ErrorRes, HealthRes, HealthService, ModelRes, SuggestCidReq, SuggestCidRes,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use cid_core::SuggestionService;
use std::sync::Arc;
use utoipa::OpenApi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: SuggestionService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_models, suggest_cid),
    components(schemas(
        HealthRes,
        ErrorRes,
        ModelRes,
        SuggestCidReq,
        SuggestCidRes,
        CidSuggestionRes
    ))
)]
pub struct ApiDoc;

/// Builds the REST router.
///
/// The origin guard is the outermost layer, so refused origins never reach CORS handling
/// or a handler.
pub fn router(state: AppState, allowed: AllowedOrigins) -> Router {
    let allowed = Arc::new(allowed);

    Router::new()
        .route("/health", get(health))
        .route("/models", get(list_models))
        .route("/sugerir-cid", post(suggest_cid))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(cors_layer(&allowed))
        .layer(middleware::from_fn_with_state(allowed, origin_guard))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/models",
    responses(
        (status = 200, description = "Models ordered by preference", body = [ModelRes]),
        (status = 500, description = "Model catalog unavailable", body = ErrorRes)
    )
)]
/// List the text models a caller may pick from.
///
/// Served from the catalog cache; the provider is only contacted when the cache is
/// missing or stale.
///
/// # Errors
/// Returns `500 Internal Server Error` if the catalog cannot be refreshed.
#[axum::debug_handler]
async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelRes>>, ApiError> {
    match state.service.catalog().get_available_models().await {
        Ok(models) => Ok(Json(models.iter().map(ModelRes::from).collect())),
        Err(e) => {
            tracing::error!("List models error: {:?}", e);
            Err(ApiError::from_catalog(e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/sugerir-cid",
    request_body = SuggestCidReq,
    responses(
        (status = 200, description = "ICD-10 suggestions", body = SuggestCidRes),
        (status = 400, description = "Invalid or blocked request", body = ErrorRes),
        (status = 500, description = "Provider failure or unusable answer", body = ErrorRes)
    )
)]
/// Suggest ICD-10 codes for a clinical narrative.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not valid JSON, or required fields are missing,
/// - the model is not in the catalog,
/// - the text is blocked locally or by the provider.
///
/// Returns `500 Internal Server Error` if the provider fails, times out or answers with
/// something that is not a suggestion list.
#[axum::debug_handler]
async fn suggest_cid(
    State(state): State<AppState>,
    payload: Result<Json<SuggestCidReq>, JsonRejection>,
) -> Result<Json<SuggestCidRes>, ApiError> {
    let Json(req) = payload?;

    match state.service.suggest(req.into()).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            let api_error = ApiError::from(e);
            if api_error.status().is_server_error() {
                tracing::error!("Suggest CID error: {}", api_error.message());
            }
            Err(api_error)
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        MSG_BLOCKLIST, MSG_CATALOG_FAILED, MSG_INVALID_MODEL, MSG_MALFORMED_BODY,
        MSG_REQUIRED_FIELDS, MSG_UPSTREAM_POLICY,
    };
    use crate::origin::MSG_ORIGIN_NOT_ALLOWED;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use cid_core::upstream::{
        CatalogEntry, Generation, GenerationRequest, ModelSource, TextGenerator,
    };
    use cid_core::{
        Blocklist, ModelCatalog, SuggestConfig, SystemClock, UpstreamError,
    };
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const ANSWER: &str = "```json\n[{\"cid\":\"I20.0\",\"descricao\":\"Angina instável\",\"justificativa\":\"Dor torácica em repouso\"}]\n```";

    struct StaticSource {
        fail: bool,
    }

    #[async_trait]
    impl ModelSource for StaticSource {
        async fn list_models(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
            if self.fail {
                return Err(UpstreamError::Status {
                    code: 403,
                    body: "API key not valid".into(),
                });
            }
            Ok(vec![
                entry("models/gemini-1.0-pro", "Gemini 1.0 Pro"),
                entry("models/gemini-1.5-flash-latest", "Gemini 1.5 Flash Latest"),
                entry("models/gemini-pro-vision-image", "Gemini Vision"),
            ])
        }
    }

    fn entry(name: &str, display_name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.into(),
            display_name: display_name.into(),
            description: format!("{display_name} description"),
            supported_generation_methods: vec!["generateContent".into()],
        }
    }

    struct CannedGenerator {
        answer: Generation,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Generation, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    struct TestApp {
        app: Router,
        generator: Arc<CannedGenerator>,
    }

    fn test_app(answer: Generation, source_fails: bool) -> TestApp {
        let cfg = SuggestConfig::new(
            false,
            true,
            "gemini-1.5-flash-latest",
            10,
            Duration::from_secs(60),
            Duration::from_secs(8),
            Duration::from_secs(30),
        )
        .expect("valid config");
        let catalog = ModelCatalog::new(
            Arc::new(StaticSource { fail: source_fails }),
            Arc::new(SystemClock),
            cfg.catalog_ttl(),
            cfg.catalog_timeout(),
        );
        let generator = Arc::new(CannedGenerator {
            answer,
            calls: AtomicUsize::new(0),
        });
        let service = SuggestionService::new(
            Arc::new(cfg),
            Arc::new(Blocklist::from_tokens(["maria", "silva"])),
            Arc::new(catalog),
            generator.clone(),
        );

        TestApp {
            app: router(
                AppState { service },
                AllowedOrigins::new(["https://fhcflx.github.io", "null"]),
            ),
            generator,
        }
    }

    fn default_app() -> TestApp {
        test_app(Generation::Text(ANSWER.into()), false)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build")
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = res
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let res = default_app().app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["ok"], true);
    }

    #[tokio::test]
    async fn test_models_are_filtered_and_ordered() {
        let res = default_app().app.oneshot(get_request("/models")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        let ids: Vec<&str> = json
            .as_array()
            .expect("array")
            .iter()
            .map(|m| m["id"].as_str().expect("id"))
            .collect();
        assert_eq!(ids, vec!["gemini-1.5-flash-latest", "gemini-1.0-pro"]);
        assert_eq!(json[0]["name"], "Gemini 1.5 Flash Latest");
    }

    #[tokio::test]
    async fn test_models_failure_is_500_with_generic_message() {
        let app = test_app(Generation::Text(ANSWER.into()), true).app;
        let res = app.oneshot(get_request("/models")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(res).await;
        assert_eq!(json["error"], MSG_CATALOG_FAILED);
        assert!(!json.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_suggest_returns_suggestions_and_model() {
        let res = default_app()
            .app
            .oneshot(post_json(
                "/sugerir-cid",
                r#"{"texto":"Dor torácica em repouso há 2 horas","especialidade":"Cardiologia","modelName":"gemini-1.5-flash-latest"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        assert_eq!(json["modelName"], "gemini-1.5-flash-latest");
        assert_eq!(json["suggestions"][0]["cid"], "I20.0");
        assert_eq!(json["suggestions"][0]["descricao"], "Angina instável");
    }

    #[tokio::test]
    async fn test_blocklisted_text_never_reaches_generator() {
        let TestApp { app, generator } = default_app();
        let res = app
            .oneshot(post_json(
                "/sugerir-cid",
                r#"{"texto":"Paciente Maria, 45 anos, com tosse","modelName":"gemini-1.5-flash-latest"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["error"], MSG_BLOCKLIST);
        assert!(!json.to_string().to_lowercase().contains("maria"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_fields_are_400() {
        let res = default_app()
            .app
            .oneshot(post_json("/sugerir-cid", r#"{"especialidade":"Clínica"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], MSG_REQUIRED_FIELDS);
    }

    #[tokio::test]
    async fn test_invalid_json_is_400_with_error_body() {
        let res = default_app()
            .app
            .oneshot(post_json("/sugerir-cid", "{not json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], MSG_MALFORMED_BODY);
    }

    #[tokio::test]
    async fn test_unknown_model_is_400() {
        let TestApp { app, generator } = default_app();
        let res = app
            .oneshot(post_json(
                "/sugerir-cid",
                r#"{"texto":"Febre e tosse produtiva há 3 dias","modelName":"gpt-4o"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], MSG_INVALID_MODEL);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_block_is_400() {
        let app = test_app(
            Generation::Blocked {
                reason: "SAFETY".into(),
            },
            false,
        )
        .app;
        let res = app
            .oneshot(post_json(
                "/sugerir-cid",
                r#"{"texto":"Febre e tosse produtiva há 3 dias","modelName":"gemini-1.5-flash-latest"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], MSG_UPSTREAM_POLICY);
    }

    #[tokio::test]
    async fn test_unusable_answer_is_500() {
        let app = test_app(Generation::Text("Não sei responder.".into()), false).app;
        let res = app
            .oneshot(post_json(
                "/sugerir-cid",
                r#"{"texto":"Febre e tosse produtiva há 3 dias","modelName":"gemini-1.5-flash-latest"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(res).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_origin_is_refused() {
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let res = default_app().app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(res).await["error"], MSG_ORIGIN_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_allowed_origins_get_cors_headers() {
        for origin in ["https://fhcflx.github.io", "null"] {
            let req = Request::builder()
                .uri("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap();
            let res = default_app().app.oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{origin}");
            assert_eq!(
                res.headers()
                    .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                    .and_then(|v| v.to_str().ok()),
                Some(origin)
            );
        }
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let res = default_app()
            .app
            .oneshot(get_request("/api-docs/openapi.json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        assert!(json["paths"]["/sugerir-cid"].is_object());
        assert!(json["paths"]["/models"].is_object());
    }
}
