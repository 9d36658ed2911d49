use crate::web::except::Except;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const API_HEADERS: [(&str, &str); 2] = [("Content-Type", "application/json"), ("Powered-By", "questioneer")];

/// successful action output, serialized as the bare JSON body
#[derive(Debug)]
pub struct Out<T: Serialize> {
    pub status: StatusCode,
    pub data: T,
}

/// `{ "success": true }`
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Success {
    pub success: bool,
}

impl<T: Serialize> Out<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Out { status, data }
    }

    pub fn ok(data: T) -> Self {
        Out::new(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Out::new(StatusCode::CREATED, data)
    }
}

impl Out<Success> {
    pub fn success() -> Self {
        Out::ok(Success { success: true })
    }
}

impl<T: Serialize> IntoResponse for Out<T> {
    fn into_response(self) -> Response {
        match serde_json::to_string(&self.data) {
            Ok(body) => (self.status, API_HEADERS, body).into_response(),
            Err(err) => Except::Unknown(err.to_string()).into_response(),
        }
    }
}

/// result type of every action
pub type OutResult<T> = Result<Out<T>, Except>;
