pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod http_client;
pub mod model;
pub mod normalizer;
pub mod reducer;
pub mod render;
pub mod session;
pub mod stream;
pub mod telemetry;
pub mod transport;
