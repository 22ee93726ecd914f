//! Loaded service modules.

use crate::core::{now, IcapMethod, ModTypes, Timestamp};
use crate::handler::config::HandlerConfig;
use crate::service::Service;
use std::fmt;
use std::sync::Arc;

/// Creates a fresh service instance for each request.
pub type ServiceFactory = Arc<dyn Fn() -> Box<dyn Service> + Send + Sync>;

/// Per-service ICAP options advertised to clients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceXData {
    /// Preview size; `None` disables preview
    pub preview_size: Option<usize>,
    /// Whether 204 replies are allowed
    pub allow_204: bool,
    /// Extensions to preview
    pub transfer_preview: Vec<String>,
    /// Extensions to pass through untouched
    pub transfer_ignore: Vec<String>,
    /// Extensions to send whole
    pub transfer_complete: Vec<String>,
}

impl ServiceXData {
    /// Apply the handler defaults for a newly loaded service.
    pub fn init_service(&mut self, config: &HandlerConfig) {
        self.set_preview(config.preview_size);
        if config.allow_204 {
            self.enable_204();
        }
        for ext in &config.transfer_preview {
            self.set_transfer_preview(ext);
        }
    }

    pub fn set_preview(&mut self, size: usize) {
        self.preview_size = Some(size);
    }

    pub fn enable_204(&mut self) {
        self.allow_204 = true;
    }

    pub fn set_transfer_preview(&mut self, ext: &str) {
        push_unique(&mut self.transfer_preview, ext);
    }

    pub fn set_transfer_ignore(&mut self, ext: &str) {
        push_unique(&mut self.transfer_ignore, ext);
    }

    pub fn set_transfer_complete(&mut self, ext: &str) {
        push_unique(&mut self.transfer_complete, ext);
    }
}

fn push_unique(list: &mut Vec<String>, ext: &str) {
    if !list.iter().any(|e| e == ext) {
        list.push(ext.to_string());
    }
}

/// A service loaded into the handler.
pub struct ServiceModule {
    /// Service name (service file basename)
    pub name: String,
    /// Methods the service handles
    pub mod_types: ModTypes,
    /// ICAP options
    pub xdata: ServiceXData,
    /// Load time
    pub loaded_at: Timestamp,
    factory: ServiceFactory,
}

impl ServiceModule {
    pub(crate) fn new(name: &str, factory: ServiceFactory, config: &HandlerConfig) -> Self {
        let mut xdata = ServiceXData::default();
        xdata.init_service(config);

        Self {
            name: name.to_string(),
            mod_types: ModTypes::REQMOD | ModTypes::RESPMOD,
            xdata,
            loaded_at: now(),
            factory,
        }
    }

    /// Whether this service handles a method.
    pub fn supports(&self, method: IcapMethod) -> bool {
        self.mod_types.contains(method)
    }

    /// New, uninitialized service instance.
    pub fn new_instance(&self) -> Box<dyn Service> {
        (self.factory)()
    }
}

impl fmt::Debug for ServiceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceModule")
            .field("name", &self.name)
            .field("mod_types", &self.mod_types)
            .field("xdata", &self.xdata)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}
