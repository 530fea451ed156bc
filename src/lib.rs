pub mod app;
pub mod domain;
pub mod infra;
pub mod ports;
pub mod server;
