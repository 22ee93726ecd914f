//! Service Module
//!
//! The contract between a host and its service modules:
//! - Service trait and failure kinds
//! - Async adapter for tokio hosts
//! - Wire envelopes for out-of-process modules

pub mod asynchronous;
pub mod contract;
pub mod wire;

pub use asynchronous::{AsyncService, BlockingService};
pub use contract::{EchoService, FailureKind, Service, ServiceError, ServiceResult};
pub use wire::{Invocation, Reply};
