use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::conf::{self, Questioneer};
use crate::erx::{self, ResultE, ResultEX};
use crate::model::memory::MemoryStore;
use crate::model::{self, SharedStore};
use crate::web::context::AppState;
use crate::web::{make_web, Web};

pub struct AppBuilder {
    conf: Questioneer,
    store: Option<SharedStore>,
}

/// assembled application, ready to serve
pub struct App {
    name: String,
    store: SharedStore,
    web: Web,
}

impl AppBuilder {
    /// builder over the shared configuration
    pub fn new() -> ResultE<Self> {
        let conf = conf::questioneer().read().map_err(erx::smp)?.clone();
        Ok(Self::with_conf(conf))
    }

    pub fn with_conf(conf: Questioneer) -> Self {
        AppBuilder { conf, store: None }
    }

    /// open the configured backend
    pub async fn use_model(mut self) -> ResultE<Self> {
        let backend = self.conf.model.backend_or_memory();
        self.store = Some(model::open_store(&backend).await?);
        Ok(self)
    }

    pub fn use_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> App {
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let state = AppState::new(store.clone()).with_default_limit(self.conf.listing.default_limit);
        let web = make_web(&self.conf.name, &self.conf.web.bind_addr(), state);
        App { name: self.conf.name, store, web }
    }
}

impl App {
    pub fn router(&self) -> Router {
        self.web.router()
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn run<F>(self, shutdown: F) -> ResultEX
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("{} {} starting on {}", self.name, crate::VERSION, self.web.bind());
        self.web.serve(shutdown).await
    }

    /// serve on an already bound listener
    pub async fn run_on<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> ResultEX
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.web.serve_on(listener, shutdown).await
    }
}
