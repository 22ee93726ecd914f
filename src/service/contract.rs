//! Service contract definition.
//!
//! Defines the interface every service module must implement to be driven
//! by a host.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for contract operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Which contract operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    Initialize,
    Preview,
    Service,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Initialize => write!(f, "initialize"),
            FailureKind::Preview => write!(f, "preview"),
            FailureKind::Service => write!(f, "service"),
        }
    }
}

/// Failure reported by a service module.
///
/// The three variants are distinct so a host can tell a module that never
/// came up from one that rejected a single request. Nothing here says
/// whether a failure is retryable; that is up to the module and the host.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Initialization failed: {0}")]
    Initialize(String),

    #[error("Preview failed: {0}")]
    Preview(String),

    #[error("Service processing failed: {0}")]
    Service(String),
}

impl ServiceError {
    pub fn initialize(message: impl Into<String>) -> Self {
        ServiceError::Initialize(message.into())
    }

    pub fn preview(message: impl Into<String>) -> Self {
        ServiceError::Preview(message.into())
    }

    pub fn service(message: impl Into<String>) -> Self {
        ServiceError::Service(message.into())
    }

    /// Build an error of the given kind.
    pub fn of_kind(kind: FailureKind, message: impl Into<String>) -> Self {
        match kind {
            FailureKind::Initialize => Self::initialize(message),
            FailureKind::Preview => Self::preview(message),
            FailureKind::Service => Self::service(message),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::Initialize(_) => FailureKind::Initialize,
            ServiceError::Preview(_) => FailureKind::Preview,
            ServiceError::Service(_) => FailureKind::Service,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::Initialize(m) | ServiceError::Preview(m) | ServiceError::Service(m) => m,
        }
    }
}

/// Service trait that all service modules must implement.
///
/// A host constructs the module, calls [`Service::initialize`] once, then
/// any number of [`Service::preview`] and [`Service::service`] calls with
/// per-call headers. The ordering is a convention the host follows; the
/// trait does not enforce it. There is no teardown step: dropping the
/// module is the end of its life.
pub trait Service: Send + Sync {
    /// Prepare the module before it handles requests.
    ///
    /// `mod_type` names the kind of module being set up. `headers` is
    /// module-defined metadata and may be empty.
    fn initialize(&mut self, mod_type: &str, headers: &[String]) -> ServiceResult<()>;

    /// Cheap pre-check of request bytes.
    ///
    /// The returned code is opaque: its meaning belongs to the module and
    /// carries no promise about what [`Service::service`] will do later.
    fn preview(&self, data: &[u8], headers: &[String]) -> ServiceResult<i32>;

    /// Transform a request body into a response body.
    ///
    /// `Ok(None)` means the module has no response for this request.
    fn service(&self, body: &[u8], headers: &[String]) -> ServiceResult<Option<Vec<u8>>>;
}

impl<S: Service + ?Sized> Service for Box<S> {
    fn initialize(&mut self, mod_type: &str, headers: &[String]) -> ServiceResult<()> {
        (**self).initialize(mod_type, headers)
    }

    fn preview(&self, data: &[u8], headers: &[String]) -> ServiceResult<i32> {
        (**self).preview(data, headers)
    }

    fn service(&self, body: &[u8], headers: &[String]) -> ServiceResult<Option<Vec<u8>>> {
        (**self).service(body, headers)
    }
}

/// Minimal conforming module: previews as 0 and echoes the body back.
#[derive(Clone, Debug, Default)]
pub struct EchoService {
    mod_type: Option<String>,
}

impl EchoService {
    /// Create a new echo service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Module type given at initialization, if any.
    pub fn mod_type(&self) -> Option<&str> {
        self.mod_type.as_deref()
    }
}

impl Service for EchoService {
    fn initialize(&mut self, mod_type: &str, _headers: &[String]) -> ServiceResult<()> {
        self.mod_type = Some(mod_type.to_string());
        Ok(())
    }

    fn preview(&self, _data: &[u8], _headers: &[String]) -> ServiceResult<i32> {
        Ok(0)
    }

    fn service(&self, body: &[u8], _headers: &[String]) -> ServiceResult<Option<Vec<u8>>> {
        Ok(Some(body.to_vec()))
    }
}
