//! Async face of the service contract.
//!
//! Lets an async host drive a synchronous module without blocking its
//! executor.

use crate::service::contract::{FailureKind, Service, ServiceError, ServiceResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Async counterpart of [`Service`].
#[async_trait]
pub trait AsyncService: Send + Sync {
    /// Prepare the module before it handles requests.
    async fn initialize(&self, mod_type: String, headers: Vec<String>) -> ServiceResult<()>;

    /// Cheap pre-check of request bytes. The code is module-defined.
    async fn preview(&self, data: Vec<u8>, headers: Vec<String>) -> ServiceResult<i32>;

    /// Transform a request body. `None` means no response.
    async fn service(&self, body: Vec<u8>, headers: Vec<String>) -> ServiceResult<Option<Vec<u8>>>;
}

/// Runs a synchronous [`Service`] on tokio's blocking pool.
///
/// `initialize` holds the write lock; `preview` and `service` share read
/// locks, so they may run side by side once initialization is done.
pub struct BlockingService<S> {
    inner: Arc<RwLock<S>>,
}

impl<S: Service + 'static> BlockingService<S> {
    /// Wrap a service.
    pub fn new(service: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(service)),
        }
    }

    /// Read the wrapped service.
    ///
    /// The read lock is held only while `f` runs, so no guard can outlive
    /// the call and stall a later `initialize`.
    pub async fn with_inner<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.inner.read().await;
        f(&*guard)
    }

    async fn run<T, F>(&self, kind: FailureKind, f: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&RwLock<S>) -> ServiceResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        match tokio::task::spawn_blocking(move || f(&*inner)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(operation = %kind, error = %e, "blocking service task failed");
                Err(ServiceError::of_kind(kind, e.to_string()))
            }
        }
    }
}

impl<S: Service + 'static> Clone for BlockingService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<S: Service + 'static> AsyncService for BlockingService<S> {
    async fn initialize(&self, mod_type: String, headers: Vec<String>) -> ServiceResult<()> {
        self.run(FailureKind::Initialize, move |lock| {
            lock.blocking_write().initialize(&mod_type, &headers)
        })
        .await
    }

    async fn preview(&self, data: Vec<u8>, headers: Vec<String>) -> ServiceResult<i32> {
        self.run(FailureKind::Preview, move |lock| {
            lock.blocking_read().preview(&data, &headers)
        })
        .await
    }

    async fn service(&self, body: Vec<u8>, headers: Vec<String>) -> ServiceResult<Option<Vec<u8>>> {
        self.run(FailureKind::Service, move |lock| {
            lock.blocking_read().service(&body, &headers)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::contract::tests::FailingService;
    use crate::service::EchoService;

    #[tokio::test]
    async fn test_blocking_echo() {
        let service = BlockingService::new(EchoService::new());
        service.initialize("REQMOD".to_string(), Vec::new()).await.unwrap();

        let mod_type = service.with_inner(|s| s.mod_type().map(str::to_string)).await;
        assert_eq!(mod_type.as_deref(), Some("REQMOD"));
        assert_eq!(service.preview(b"abc".to_vec(), Vec::new()).await.unwrap(), 0);
        assert_eq!(
            service.service(b"abc".to_vec(), Vec::new()).await.unwrap(),
            Some(b"abc".to_vec())
        );
    }

    #[tokio::test]
    async fn test_blocking_concurrent_service_calls() {
        let service = BlockingService::new(EchoService::new());
        service.initialize("RESPMOD".to_string(), Vec::new()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.service(vec![i; 4], Vec::new()).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let body = handle.await.unwrap().unwrap();
            assert_eq!(body, Some(vec![i as u8; 4]));
        }
    }

    #[tokio::test]
    async fn test_blocking_propagates_failure_kind() {
        let service = BlockingService::new(FailingService { fail: FailureKind::Initialize });
        let err = service
            .initialize("REQMOD".to_string(), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Initialize);

        let service = BlockingService::new(FailingService { fail: FailureKind::Service });
        let err = service.service(Vec::new(), Vec::new()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Service);
    }

    #[tokio::test]
    async fn test_reinitialize_after_reading_inner() {
        let service = BlockingService::new(EchoService::new());
        service.initialize("REQMOD".to_string(), Vec::new()).await.unwrap();

        let before = service.with_inner(|s| s.mod_type().map(str::to_string)).await;
        let reinit = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            service.initialize("RESPMOD".to_string(), Vec::new()),
        )
        .await
        .expect("initialize must not wait on a reader");
        reinit.unwrap();

        let after = service.with_inner(|s| s.mod_type().map(str::to_string)).await;
        assert_eq!(before.as_deref(), Some("REQMOD"));
        assert_eq!(after.as_deref(), Some("RESPMOD"));
    }

    #[test]
    fn test_blocking_from_sync_context() {
        let service = BlockingService::new(EchoService::new());
        let code = tokio_test::block_on(service.preview(Vec::new(), Vec::new())).unwrap();
        assert_eq!(code, 0);
    }
}
