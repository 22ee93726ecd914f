//! # icap-plugin - pluggable ICAP service modules
//!
//! A host routes request bytes through named service modules. This crate
//! provides:
//! - **Service**: the contract every module implements (`initialize`,
//!   `preview`, `service`)
//! - **Handler**: the host side that loads modules and walks requests
//!   through preview, body transfer and end-of-data
//! - **Monitoring**: `tracing`-based structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use icap_plugin::core::{Headers, IcapMethod};
//! use icap_plugin::handler::{HandlerConfig, ModDecision, ServiceHandler};
//! use icap_plugin::service::EchoService;
//!
//! fn main() -> icap_plugin::Result<()> {
//!     let mut handler = ServiceHandler::new(HandlerConfig::default())?;
//!     handler.register_factory("echo", EchoService::new);
//!     let module = handler.load_module("/usr/lib/c_icap/services/echo.service")?;
//!
//!     let mut req = handler.init_request_data(&module, IcapMethod::Reqmod, Headers::new())?;
//!     handler.service_io(&mut req, None, Some(b"hello"), true)?;
//!     assert_eq!(handler.end_of_data(&module, &mut req), ModDecision::Done);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod handler;
pub mod monitoring;
#[cfg(feature = "python")]
pub mod python;
pub mod service;

pub use core::error::{Error, Result};
pub use service::{Service, ServiceError, ServiceResult};
