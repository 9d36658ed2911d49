// Don't change this value, it will be replaced by the version
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod conf;
pub mod erx;
pub mod log;
pub mod model;
pub mod service;
pub mod web;
