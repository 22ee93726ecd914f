use crate::service::{FailureKind, Service, ServiceError, ServiceResult};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyList};

// --- Python-backed services ---

/// A service module written in Python.
///
/// The wrapped object must expose `initialize(mod_type, headers)`,
/// `preview(data, headers) -> int` and `service(body, headers) -> bytes | None`.
pub struct PyService {
    inner: Py<PyAny>,
}

impl PyService {
    pub fn new(inner: Py<PyAny>) -> Self {
        PyService { inner }
    }

    /// Instantiate `module.class_name()` and wrap it.
    pub fn load(module: &str, class_name: &str) -> ServiceResult<Self> {
        Python::with_gil(|py| {
            let obj = py
                .import(module)
                .and_then(|m| m.getattr(class_name))
                .and_then(|cls| cls.call0())
                .map_err(|e| to_service_error(py, FailureKind::Initialize, e))?;
            Ok(PyService::new(obj.into()))
        })
    }
}

fn to_service_error(py: Python<'_>, kind: FailureKind, err: PyErr) -> ServiceError {
    let message = err.value(py).to_string();
    tracing::warn!(operation = %kind, error = %message, "python service raised");
    ServiceError::of_kind(kind, message)
}

fn headers_list<'py>(py: Python<'py>, headers: &[String]) -> &'py PyList {
    PyList::new(py, headers)
}

impl Service for PyService {
    fn initialize(&mut self, mod_type: &str, headers: &[String]) -> ServiceResult<()> {
        Python::with_gil(|py| {
            self.inner
                .call_method1(py, "initialize", (mod_type, headers_list(py, headers)))
                .map(|_| ())
                .map_err(|e| to_service_error(py, FailureKind::Initialize, e))
        })
    }

    fn preview(&self, data: &[u8], headers: &[String]) -> ServiceResult<i32> {
        Python::with_gil(|py| {
            self.inner
                .call_method1(py, "preview", (PyBytes::new(py, data), headers_list(py, headers)))
                .and_then(|code| code.extract::<i32>(py))
                .map_err(|e| to_service_error(py, FailureKind::Preview, e))
        })
    }

    fn service(&self, body: &[u8], headers: &[String]) -> ServiceResult<Option<Vec<u8>>> {
        Python::with_gil(|py| {
            let reply = self
                .inner
                .call_method1(py, "service", (PyBytes::new(py, body), headers_list(py, headers)))
                .map_err(|e| to_service_error(py, FailureKind::Service, e))?;

            if reply.is_none(py) {
                return Ok(None);
            }
            reply
                .extract::<&PyBytes>(py)
                .map(|bytes| Some(bytes.as_bytes().to_vec()))
                .map_err(|e| to_service_error(py, FailureKind::Service, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
class Upper:
    def initialize(self, mod_type, headers):
        if mod_type == "OPTIONS":
            raise ValueError("no options")
        self.mod_type = mod_type

    def preview(self, data, headers):
        return len(headers)

    def service(self, body, headers):
        if not body:
            return None
        return body.upper()
"#;

    fn upper() -> PyService {
        Python::with_gil(|py| {
            let module = PyModule::from_code(py, SOURCE, "upper.py", "upper").unwrap();
            let obj = module.getattr("Upper").unwrap().call0().unwrap();
            PyService::new(obj.into())
        })
    }

    #[test]
    fn test_python_service() {
        let mut service = upper();
        service.initialize("REQMOD", &[]).unwrap();

        let headers = vec!["Host: a".to_string(), "X-B: c".to_string()];
        assert_eq!(service.preview(b"abc", &headers).unwrap(), 2);
        assert_eq!(service.service(b"abc", &headers).unwrap(), Some(b"ABC".to_vec()));
        assert_eq!(service.service(b"", &headers).unwrap(), None);
    }

    #[test]
    fn test_python_exception_maps_to_kind() {
        let mut service = upper();
        let err = service.initialize("OPTIONS", &[]).unwrap_err();
        assert_eq!(err, ServiceError::initialize("no options"));
    }
}
