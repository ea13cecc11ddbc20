//! Origin allow-list.
//!
//! Two layers share one list: `origin_guard` refuses requests carrying an unknown
//! `Origin` header before any handler runs, and `cors_layer` emits the CORS response
//! headers for the origins that are let through. Requests without an `Origin` header
//! (curl, server-to-server, same-origin navigation) pass untouched.

use api_shared::ErrorRes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const MSG_ORIGIN_NOT_ALLOWED: &str = "Origem não permitida.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact match against the list; `null` is only allowed when listed.
    pub fn permits(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.origins
    }
}

/// CORS headers for the allowed origins.
pub fn cors_layer(allowed: &AllowedOrigins) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .as_slice()
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!("ignoring unusable origin {:?}", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Middleware answering 403 to requests from origins outside the allow-list.
pub async fn origin_guard(
    State(allowed): State<Arc<AllowedOrigins>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        let permitted = origin
            .to_str()
            .map(|o| allowed.permits(o))
            .unwrap_or(false);

        if !permitted {
            tracing::warn!("refused request from origin {:?}", origin);
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorRes::new(MSG_ORIGIN_NOT_ALLOWED)),
            )
                .into_response();
        }
    }

    next.run(req).await
}
