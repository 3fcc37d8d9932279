use serde::Serialize;
use serde::de::DeserializeOwned;

/// Wire format used for request and response bodies.
///
/// Picked once per client; every body the client sends or receives goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Xml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid JSON payload: {0}")]
    Json(String),

    #[error("invalid XML payload: {0}")]
    Xml(String),

    #[error("payload is not valid UTF-8")]
    Utf8,
}

impl DataFormat {
    /// Value for the `Accept` and `Content-Type` headers.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Json => "application/json",
        }
    }

    /// Serialize `value`. XML documents use `root` as the document element; JSON bodies are
    /// the bare object.
    pub fn encode<T>(self, root: &str, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Self::Xml => quick_xml::se::to_string_with_root(root, value)
                .map(String::into_bytes)
                .map_err(|err| CodecError::Xml(err.to_string())),
            Self::Json => serde_json::to_vec(value).map_err(|err| CodecError::Json(err.to_string())),
        }
    }

    /// Deserialize a response body. The XML document element name is not checked.
    pub fn decode<T>(self, body: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        match self {
            Self::Xml => {
                let text = std::str::from_utf8(body).map_err(|_| CodecError::Utf8)?;
                quick_xml::de::from_str(text).map_err(|err| CodecError::Xml(err.to_string()))
            }
            Self::Json => {
                serde_json::from_slice(body).map_err(|err| CodecError::Json(err.to_string()))
            }
        }
    }
}
