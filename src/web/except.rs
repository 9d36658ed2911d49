use crate::erx::{Erx, Layouted, LayoutedC, PreL4};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

const UNKNOWN_MESSAGE: &str = "Hi there! Something unexpected happened, but our engineers have already been notified.";

// Except is used in actions.
// It wraps every error an action can surface and converts straight into a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Except {
    InvalidParam(LayoutedC, String),
    NotFound(LayoutedC, String),
    Internal(LayoutedC),
    Unknown(String),
}

/// error body, `{ "error": message, "code": layouted code }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExceptBody {
    pub error: String,
    pub code: String,
}

impl Except {
    pub fn status(&self) -> StatusCode {
        match self {
            Except::InvalidParam(..) => StatusCode::BAD_REQUEST,
            Except::NotFound(..) => StatusCode::NOT_FOUND,
            Except::Internal(_) | Except::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// response body; internal failures never leak their detail
    pub fn out(&self) -> ExceptBody {
        let (code, error) = match self {
            Except::InvalidParam(code, m) => (code.clone(), if m.is_empty() { "invalid params".to_string() } else { m.clone() }),
            Except::NotFound(code, m) => (code.clone(), if m.is_empty() { "not found".to_string() } else { m.clone() }),
            Except::Internal(code) => (code.clone(), UNKNOWN_MESSAGE.to_string()),
            Except::Unknown(_) => (LayoutedC::new(PreL4::COMM.four(), PreL4::COMM.four(), "9999"), UNKNOWN_MESSAGE.to_string()),
        };
        ExceptBody { error, code: code.into() }
    }
}

impl From<Erx> for Except {
    fn from(erx: Erx) -> Self {
        match erx.domain() {
            PreL4::VALI => Except::InvalidParam(erx.code(), erx.message().to_string()),
            PreL4::NOTF => Except::NotFound(erx.code(), erx.message().to_string()),
            _ => {
                error!("{}", erx.description());
                Except::Internal(erx.code())
            },
        }
    }
}

impl From<JsonRejection> for Except {
    fn from(rejection: JsonRejection) -> Self {
        Except::InvalidParam(Layouted::validation("1001"), rejection.body_text())
    }
}

impl From<QueryRejection> for Except {
    fn from(rejection: QueryRejection) -> Self {
        Except::InvalidParam(Layouted::validation("1002"), rejection.body_text())
    }
}

impl IntoResponse for Except {
    fn into_response(self) -> Response {
        if let Except::Unknown(detail) = &self {
            error!("unknown except: {}", detail);
        }

        let body = serde_json::to_string(&self.out()).unwrap_or_else(|_| String::from("{\"error\":\"json serialization error\"}"));
        (self.status(), [("Content-Type", "application/json")], body).into_response()
    }
}
