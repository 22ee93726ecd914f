//! Handler Module
//!
//! Host side of the service contract:
//! - Handler configuration
//! - Loaded service modules and their ICAP options
//! - Per-request lifecycle (preview, body transfer, end of data)

pub mod config;
#[allow(clippy::module_inception)]
pub mod handler;
pub mod module;
pub mod request;

pub use config::HandlerConfig;
pub use handler::ServiceHandler;
pub use module::{ServiceFactory, ServiceModule, ServiceXData};
pub use request::{IoProgress, ModDecision, RequestData};
