//! Service handler.
//!
//! Loads service modules by file name and walks each request through
//! preview, body transfer and end-of-data.

use crate::core::{Error, Headers, IcapMethod, Result};
use crate::handler::config::HandlerConfig;
use crate::handler::module::{ServiceFactory, ServiceModule};
use crate::handler::request::{IoProgress, ModDecision, RequestData};
use crate::service::Service;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Host-side handler for a family of service modules.
pub struct ServiceHandler {
    /// Configuration
    config: HandlerConfig,
    /// Factories by service stem
    factories: HashMap<String, ServiceFactory>,
    /// Loaded modules by service name
    modules: HashMap<String, Arc<ServiceModule>>,
}

impl ServiceHandler {
    /// Create a new handler.
    pub fn new(config: HandlerConfig) -> Result<Self> {
        config.validate()?;
        info!(
            handler = %config.handler_name,
            services_dir = %config.services_dir.display(),
            modules_dir = %config.modules_dir.display(),
            "service handler initialized"
        );

        Ok(Self {
            config,
            factories: HashMap::new(),
            modules: HashMap::new(),
        })
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Make a service implementation loadable under `stem`.
    ///
    /// A later `load_module("<dir>/<stem><extension>")` builds instances
    /// with `factory`, one per request.
    pub fn register_factory<S, F>(&mut self, stem: &str, factory: F)
    where
        S: Service + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move || -> Box<dyn Service> { Box::new(factory()) });
        if self.factories.insert(stem.to_string(), factory).is_some() {
            warn!(service = stem, "service factory replaced");
        }
    }

    /// Load a service module from its service file path.
    pub fn load_module(&mut self, service_file: &str) -> Result<Arc<ServiceModule>> {
        let name = Path::new(service_file)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::ModuleNotFound(service_file.to_string()))?;
        let stem = name.strip_suffix(self.config.extension.as_str()).unwrap_or(name);

        if self.modules.contains_key(name) {
            return Err(Error::AlreadyLoaded(name.to_string()));
        }
        if self.modules.len() >= self.config.max_services {
            error!(service = name, max = self.config.max_services, "service table full");
            return Err(Error::CapacityExceeded(self.config.max_services));
        }

        let factory = self.factories.get(stem).cloned().ok_or_else(|| {
            error!(service = service_file, "no implementation registered for service");
            Error::ModuleNotFound(stem.to_string())
        })?;

        let module = Arc::new(ServiceModule::new(name, factory, &self.config));
        self.modules.insert(name.to_string(), Arc::clone(&module));
        info!(service = name, preview = ?module.xdata.preview_size, "service loaded");

        Ok(module)
    }

    /// Unload a module. Requests already running keep their instance.
    pub fn unload_module(&mut self, name: &str) -> Result<()> {
        if self.modules.remove(name).is_none() {
            return Err(Error::ModuleNotFound(name.to_string()));
        }
        debug!(service = name, "service unloaded");
        Ok(())
    }

    /// Get a loaded module by name.
    pub fn module(&self, name: &str) -> Option<Arc<ServiceModule>> {
        self.modules.get(name).cloned()
    }

    /// Names of all loaded modules.
    pub fn modules(&self) -> Vec<&str> {
        self.modules.keys().map(|k| k.as_str()).collect()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Start a request: create a service instance and initialize it with
    /// the request's method and headers.
    pub fn init_request_data(
        &self,
        module: &ServiceModule,
        method: IcapMethod,
        headers: Headers,
    ) -> Result<RequestData> {
        if !module.supports(method) {
            return Err(Error::UnsupportedMethod {
                service: module.name.clone(),
                method: method.to_string(),
            });
        }

        let mut instance = module.new_instance();
        instance.initialize(method.as_str(), headers.as_slice()).map_err(|e| {
            error!(service = %module.name, %method, error = %e, "service initialization failed");
            e
        })?;

        let req = RequestData::new(&module.name, method, headers, instance);
        debug!(service = %module.name, request_id = %req.id, %method, "request started");
        Ok(req)
    }

    /// Feed the preview bytes to the service.
    ///
    /// The preview code is stored on the request and never interpreted.
    /// Preview bytes join the body only when the preview succeeds.
    pub fn check_preview(&self, req: &mut RequestData, preview_data: &[u8]) -> ModDecision {
        if let Err(e) = self.check_body_limit(req, preview_data.len()) {
            warn!(request_id = %req.id, error = %e, "preview rejected");
            return ModDecision::Error;
        }

        match req.instance.preview(preview_data, req.headers.as_slice()) {
            Ok(code) => {
                debug!(request_id = %req.id, bytes = preview_data.len(), code, "preview checked");
                req.body.extend_from_slice(preview_data);
                req.preview_code = Some(code);
                ModDecision::Continue
            }
            Err(e) => {
                warn!(request_id = %req.id, error = %e, "preview failed");
                ModDecision::Error
            }
        }
    }

    fn check_body_limit(&self, req: &RequestData, incoming: usize) -> Result<()> {
        match self.config.max_body {
            Some(limit) if req.body.len().saturating_add(incoming) > limit => {
                Err(Error::BodyTooLarge { limit })
            }
            _ => Ok(()),
        }
    }

    /// Move body bytes in and response bytes out.
    ///
    /// `rbuf` holds body data from the client; `wbuf` receives whatever
    /// part of the response is ready. `eof` in the result turns true once
    /// the response exists and has been fully written out.
    pub fn service_io(
        &self,
        req: &mut RequestData,
        wbuf: Option<&mut [u8]>,
        rbuf: Option<&[u8]>,
        iseof: bool,
    ) -> Result<IoProgress> {
        let mut progress = IoProgress::default();

        if let Some(rbuf) = rbuf.filter(|b| !b.is_empty()) {
            if req.eof {
                return Err(Error::Internal(format!(
                    "request {} received data after end of stream",
                    req.id
                )));
            }
            self.check_body_limit(req, rbuf.len()).map_err(|e| {
                warn!(request_id = %req.id, error = %e, "request body rejected");
                e
            })?;
            req.body.extend_from_slice(rbuf);
            progress.read = rbuf.len();
        }
        if iseof {
            req.eof = true;
        }

        if let Some(wbuf) = wbuf {
            progress.written = req.drain_response(wbuf);
        }
        progress.eof = req.is_response_complete();

        Ok(progress)
    }

    /// Run the service over the whole body.
    pub fn end_of_data(&self, module: &ServiceModule, req: &mut RequestData) -> ModDecision {
        req.eof = true;

        match req.instance.service(&req.body, req.headers.as_slice()) {
            Ok(Some(response)) => {
                debug!(request_id = %req.id, bytes = response.len(), "service produced response");
                req.response = Some(response);
                req.written = 0;
                ModDecision::Done
            }
            Ok(None) if module.xdata.allow_204 => {
                debug!(request_id = %req.id, "no response, allowing 204");
                ModDecision::Allow204
            }
            Ok(None) => {
                req.response = Some(req.body.clone());
                req.written = 0;
                ModDecision::Done
            }
            Err(e) => {
                error!(service = %module.name, request_id = %req.id, error = %e, "service failed");
                ModDecision::Error
            }
        }
    }

    /// Finish a request.
    pub fn release_request_data(&self, req: RequestData) {
        let elapsed = crate::core::now() - req.started_at;
        debug!(
            request_id = %req.id,
            service = %req.service_name,
            elapsed_ms = elapsed.num_milliseconds(),
            "request released"
        );
    }

    /// Unload every module.
    pub fn close(&mut self) {
        let count = self.modules.len();
        self.modules.clear();
        info!(handler = %self.config.handler_name, count, "service handler closed");
    }
}

impl Default for ServiceHandler {
    fn default() -> Self {
        Self {
            config: HandlerConfig::default(),
            factories: HashMap::new(),
            modules: HashMap::new(),
        }
    }
}
