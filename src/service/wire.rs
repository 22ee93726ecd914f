//! Wire envelopes for invoking a service across a process boundary.
//!
//! Payloads are carried as raw bytes and headers as an ordered list of
//! strings; envelopes are encoded with bincode.

use crate::core::Result;
use crate::service::contract::{FailureKind, Service, ServiceError};
use serde::{Deserialize, Serialize};

/// One contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invocation {
    Initialize { mod_type: String, headers: Vec<String> },
    Preview { data: Vec<u8>, headers: Vec<String> },
    Service { body: Vec<u8>, headers: Vec<String> },
}

impl Invocation {
    /// Operation this invocation targets.
    pub fn kind(&self) -> FailureKind {
        match self {
            Invocation::Initialize { .. } => FailureKind::Initialize,
            Invocation::Preview { .. } => FailureKind::Preview,
            Invocation::Service { .. } => FailureKind::Service,
        }
    }
}

/// Outcome of one contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Initialized,
    Preview(i32),
    Service(Option<Vec<u8>>),
    Failed { kind: FailureKind, message: String },
}

impl Reply {
    /// Turn a `Failed` reply back into the module's error.
    pub fn into_error(self) -> Option<ServiceError> {
        match self {
            Reply::Failed { kind, message } => Some(ServiceError::of_kind(kind, message)),
            _ => None,
        }
    }
}

impl From<ServiceError> for Reply {
    fn from(err: ServiceError) -> Self {
        Reply::Failed {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// Perform one invocation against a service.
pub fn apply(service: &mut dyn Service, invocation: Invocation) -> Reply {
    let result = match invocation {
        Invocation::Initialize { mod_type, headers } => service
            .initialize(&mod_type, &headers)
            .map(|()| Reply::Initialized),
        Invocation::Preview { data, headers } => service.preview(&data, &headers).map(Reply::Preview),
        Invocation::Service { body, headers } => service.service(&body, &headers).map(Reply::Service),
    };

    result.unwrap_or_else(|e| {
        tracing::debug!(operation = %e.kind(), error = %e, "invocation failed");
        Reply::from(e)
    })
}

pub fn encode_invocation(invocation: &Invocation) -> Result<Vec<u8>> {
    Ok(bincode::serialize(invocation)?)
}

pub fn decode_invocation(bytes: &[u8]) -> Result<Invocation> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn encode_reply(reply: &Reply) -> Result<Vec<u8>> {
    Ok(bincode::serialize(reply)?)
}

pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::service::contract::tests::FailingService;
    use crate::service::EchoService;

    #[test]
    fn test_apply_echo() {
        let mut service = EchoService::new();

        let reply = apply(
            &mut service,
            Invocation::Initialize { mod_type: "REQMOD".to_string(), headers: Vec::new() },
        );
        assert_eq!(reply, Reply::Initialized);
        assert_eq!(service.mod_type(), Some("REQMOD"));

        let reply = apply(
            &mut service,
            Invocation::Service { body: b"payload".to_vec(), headers: Vec::new() },
        );
        assert_eq!(reply, Reply::Service(Some(b"payload".to_vec())));
    }

    #[test]
    fn test_apply_folds_failure() {
        let mut service = FailingService { fail: FailureKind::Preview };
        let invocation = Invocation::Preview { data: Vec::new(), headers: Vec::new() };
        assert_eq!(invocation.kind(), FailureKind::Preview);

        let reply = apply(&mut service, invocation);
        let err = reply.into_error().unwrap();
        assert_eq!(err, ServiceError::preview("truncated"));
    }

    #[test]
    fn test_reply_over_the_wire() {
        let mut service = EchoService::new();
        let invocation = Invocation::Service {
            body: vec![0, 1, 2, 255],
            headers: vec!["X-Scan: on".to_string()],
        };

        let request = encode_invocation(&invocation).unwrap();
        let reply = apply(&mut service, decode_invocation(&request).unwrap());
        let decoded = decode_reply(&encode_reply(&reply).unwrap()).unwrap();

        assert_eq!(decoded, Reply::Service(Some(vec![0, 1, 2, 255])));
        assert!(decoded.into_error().is_none());
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_invocation(&[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
