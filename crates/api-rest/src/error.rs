//! Mapping from core errors to HTTP answers.
//!
//! User-facing messages are in Portuguese because the browser front end shows them
//! verbatim. Upstream detail stays in the logs.

use api_shared::ErrorRes;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cid_core::{BlockSource, CidError, RequestProblem, UpstreamError};

pub const MSG_REQUIRED_FIELDS: &str = "Texto da HDA e nome do modelo são obrigatórios.";
pub const MSG_SPECIALTY_REQUIRED: &str = "A especialidade é obrigatória.";
pub const MSG_INVALID_MODEL: &str = "Modelo de IA inválido ou não suportado.";
pub const MSG_MALFORMED_BODY: &str = "Requisição inválida: o corpo deve ser um JSON válido.";
pub const MSG_BLOCKLIST: &str =
    "Sua solicitação foi bloqueada por conter possíveis dados de identificação pessoal.";
pub const MSG_UPSTREAM_POLICY: &str = "Sua solicitação foi bloqueada por conter texto que viola nossas políticas de uso. Por favor, reformule o texto e tente novamente.";
pub const MSG_SUGGESTION_FAILED: &str = "Não foi possível processar a sugestão.";
pub const MSG_UPSTREAM_TIMEOUT: &str = "A requisição para a API do Google demorou para responder (timeout). Verifique sua conexão ou firewall.";
pub const MSG_CATALOG_FAILED: &str = "Não foi possível obter a lista de modelos da API do Google. Verifique a chave de API no arquivo .env.";
pub const MSG_INTERNAL: &str = "Erro interno do servidor.";

/// An HTTP error answer with a `{ "error": ... }` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps a failure of `GET /models`.
    ///
    /// Every catalog failure is a 500; only the wording differs between a timeout and
    /// any other provider problem.
    pub fn from_catalog(err: CidError) -> Self {
        match err {
            CidError::UpstreamUnavailable(UpstreamError::Timeout) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_UPSTREAM_TIMEOUT)
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_CATALOG_FAILED),
        }
    }
}

impl From<CidError> for ApiError {
    fn from(err: CidError) -> Self {
        match err {
            CidError::InvalidRequest(problem) => {
                let message = match problem {
                    RequestProblem::MissingText | RequestProblem::MissingModel => {
                        MSG_REQUIRED_FIELDS.to_string()
                    }
                    RequestProblem::TextTooShort { min } => {
                        format!("O texto da HDA deve ter pelo menos {min} caracteres.")
                    }
                    RequestProblem::MissingSpecialty => MSG_SPECIALTY_REQUIRED.to_string(),
                    RequestProblem::UnknownModel(_) => MSG_INVALID_MODEL.to_string(),
                    RequestProblem::Malformed(_) => MSG_MALFORMED_BODY.to_string(),
                };
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            CidError::PolicyBlocked(BlockSource::Blocklist) => {
                Self::new(StatusCode::BAD_REQUEST, MSG_BLOCKLIST)
            }
            CidError::PolicyBlocked(BlockSource::Upstream { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, MSG_UPSTREAM_POLICY)
            }
            CidError::UpstreamUnavailable(UpstreamError::Timeout) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_UPSTREAM_TIMEOUT)
            }
            CidError::UpstreamUnavailable(_) | CidError::UpstreamFormat(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_SUGGESTION_FAILED)
            }
            CidError::BlocklistRead { .. } | CidError::InvalidConfig(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("rejected request body: {}", rejection.body_text());
        Self::new(StatusCode::BAD_REQUEST, MSG_MALFORMED_BODY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_message(err: CidError) -> (StatusCode, String) {
        let api = ApiError::from(err);
        (api.status(), api.message().to_string())
    }

    #[test]
    fn test_invalid_requests_map_to_400() {
        assert_eq!(
            status_and_message(CidError::InvalidRequest(RequestProblem::MissingText)),
            (StatusCode::BAD_REQUEST, MSG_REQUIRED_FIELDS.to_string())
        );
        assert_eq!(
            status_and_message(CidError::InvalidRequest(RequestProblem::UnknownModel(
                "gpt-4o".into()
            ))),
            (StatusCode::BAD_REQUEST, MSG_INVALID_MODEL.to_string())
        );

        let (status, message) =
            status_and_message(CidError::InvalidRequest(RequestProblem::TextTooShort {
                min: 10,
            }));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("10"));
    }

    #[test]
    fn test_policy_blocks_have_distinct_messages() {
        let local = status_and_message(CidError::PolicyBlocked(BlockSource::Blocklist));
        let upstream = status_and_message(CidError::PolicyBlocked(BlockSource::Upstream {
            reason: "SAFETY".into(),
        }));

        assert_eq!(local, (StatusCode::BAD_REQUEST, MSG_BLOCKLIST.to_string()));
        assert_eq!(
            upstream,
            (StatusCode::BAD_REQUEST, MSG_UPSTREAM_POLICY.to_string())
        );
    }

    #[test]
    fn test_upstream_failures_map_to_500_without_detail() {
        let (status, message) = status_and_message(CidError::UpstreamUnavailable(
            UpstreamError::Status {
                code: 403,
                body: "API key not valid".into(),
            },
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, MSG_SUGGESTION_FAILED);
        assert!(!message.contains("API key not valid"));

        assert_eq!(
            status_and_message(CidError::UpstreamFormat("not JSON".into())),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_SUGGESTION_FAILED.to_string()
            )
        );
        assert_eq!(
            status_and_message(CidError::UpstreamUnavailable(UpstreamError::Timeout)),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_UPSTREAM_TIMEOUT.to_string()
            )
        );
    }

    #[test]
    fn test_catalog_failures_distinguish_timeout() {
        let timeout = ApiError::from_catalog(UpstreamError::Timeout.into());
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(timeout.message(), MSG_UPSTREAM_TIMEOUT);

        let other = ApiError::from_catalog(UpstreamError::Transport("dns".into()).into());
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.message(), MSG_CATALOG_FAILED);
    }
}
