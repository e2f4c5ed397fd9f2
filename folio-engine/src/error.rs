// error.rs - Engine error taxonomy
//
// Nothing here is fatal to the page. Callers in the browser layer log these
// and fall back; only config parsing is surfaced to the JS host.

use wasm_bindgen::JsValue;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The 3D backend module could not be imported or is malformed.
    #[error("scene backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A scene object could not be constructed or configured.
    #[error("scene construction failed: {0}")]
    Scene(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A required page element is missing.
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    pub fn backend(err: JsValue) -> Self {
        Self::BackendUnavailable(js_err(err))
    }

    pub fn scene(err: JsValue) -> Self {
        Self::Scene(js_err(err))
    }

    pub fn storage(err: JsValue) -> Self {
        Self::Storage(js_err(err))
    }
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort string form of a thrown JS value.
pub fn js_err(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
