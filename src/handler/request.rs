//! Per-request state.

use crate::core::{now, Headers, IcapMethod, Timestamp};
use crate::service::Service;
use uuid::Uuid;

/// What the host should do next with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModDecision {
    /// Keep sending data
    Continue,
    /// Reply "204 No Content"; the message is left as is
    Allow204,
    /// Processing finished; read the response through `service_io`
    Done,
    /// Processing failed
    Error,
}

/// Bytes moved by one `service_io` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoProgress {
    /// Bytes consumed from the read buffer
    pub read: usize,
    /// Bytes written into the write buffer
    pub written: usize,
    /// The whole response has been handed out; stop polling
    pub eof: bool,
}

/// State of one request flowing through a service.
pub struct RequestData {
    /// Request ID
    pub id: Uuid,
    /// Service handling the request
    pub service_name: String,
    /// ICAP method
    pub method: IcapMethod,
    /// Request headers
    pub headers: Headers,
    /// Code returned by the preview, if one ran
    pub preview_code: Option<i32>,
    /// Start time
    pub started_at: Timestamp,
    pub(crate) instance: Box<dyn Service>,
    pub(crate) body: Vec<u8>,
    pub(crate) response: Option<Vec<u8>>,
    pub(crate) written: usize,
    pub(crate) eof: bool,
}

impl RequestData {
    pub(crate) fn new(
        service_name: &str,
        method: IcapMethod,
        headers: Headers,
        instance: Box<dyn Service>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_name: service_name.to_string(),
            method,
            headers,
            preview_code: None,
            started_at: now(),
            instance,
            body: Vec::new(),
            response: None,
            written: 0,
            eof: false,
        }
    }

    /// Body received so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether the client signalled end of data.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Whether a response is waiting to be read.
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Whether a response exists and every byte of it has been drained.
    ///
    /// False before `end_of_data`, so "not ready" and "finished" differ
    /// even when both write nothing.
    pub fn is_response_complete(&self) -> bool {
        match &self.response {
            Some(response) => self.written == response.len(),
            None => false,
        }
    }

    /// Response bytes not yet handed to the host.
    pub fn pending_response(&self) -> &[u8] {
        match &self.response {
            Some(response) => &response[self.written..],
            None => &[],
        }
    }

    /// Copy as much pending response as fits into `wbuf`.
    pub(crate) fn drain_response(&mut self, wbuf: &mut [u8]) -> usize {
        let pending = self.pending_response();
        let n = pending.len().min(wbuf.len());
        wbuf[..n].copy_from_slice(&pending[..n]);
        self.written += n;
        n
    }
}

impl std::fmt::Debug for RequestData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestData")
            .field("id", &self.id)
            .field("service_name", &self.service_name)
            .field("method", &self.method)
            .field("preview_code", &self.preview_code)
            .field("body_len", &self.body.len())
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}
