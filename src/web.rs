pub mod action;
pub mod api;
pub mod client;
pub mod context;
pub mod except;
pub mod messages;
pub mod route;

use axum::Router;
use std::future::Future;
use tower_http::trace::TraceLayer;
use tower_http::validate_request::ValidateRequestHeaderLayer;
use tracing::info;

use crate::erx::{self, ResultEX};
use crate::web::context::AppState;

/// merge web routes
#[macro_export]
macro_rules! web_route_merge {
    ( $( $x:expr ),* ) => {
        {
            let mut routes = vec![];

            $(
                routes.extend($x);
            )*

            routes
        }
    };
}

/// every action with the json accept guard and request tracing
pub fn make_router(state: AppState) -> Router {
    route::merge_vec(action::all_actions())
        .layer(ValidateRequestHeaderLayer::accept("application/json"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Clone)]
pub struct Web {
    name: String,
    bind: String,
    router: Router,
}

pub fn make_web(name: &str, bind: &str, state: AppState) -> Web {
    Web { name: name.to_string(), bind: bind.to_string(), router: make_router(state) }
}

impl Web {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn bind(&self) -> &str {
        &self.bind
    }

    /// bind and serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> ResultEX
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.bind.as_str()).await.map_err(erx::amp(&format!("[{}] can't bind to {}", self.name, self.bind)))?;
        self.serve_on(listener, shutdown).await
    }

    pub async fn serve_on<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> ResultEX
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr().map_err(erx::smp)?;
        info!("WebMod[ {} ] serving on {}", self.name, addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await.map_err(erx::amp(&format!("WebMod[ {} ] failed", self.name)))?;

        info!("WebMod[ {} ] terminated", self.name);
        Ok(())
    }
}
