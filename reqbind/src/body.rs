//! Body-origin fields.
//!
//! Bodies are handed to serde: JSON through `serde_json`, XML through
//! `quick-xml` (feature `xml`). The format comes from the field tag, or from
//! the request `Content-Type` when the tag does not name one.

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::{BodyError, Error};

/// Serialization format of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
}

impl BodyFormat {
    /// Tag token of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::Json => "json",
            BodyFormat::Xml => "xml",
        }
    }

    /// Infers the format from the `Content-Type` header.
    ///
    /// A missing header means JSON. Media type parameters such as `charset`
    /// are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        let Some(value) = headers.get(CONTENT_TYPE) else {
            return Ok(BodyFormat::Json);
        };
        let raw = value.to_str().map_err(|_| {
            Error::UnsupportedBodyFormat(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?;
        Self::from_content_type(raw)
    }

    /// Infers the format from a raw `Content-Type` value.
    pub fn from_content_type(content_type: &str) -> Result<Self, Error> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "" | "application/json" => Ok(BodyFormat::Json),
            "application/xml" | "text/xml" => Ok(BodyFormat::Xml),
            s if s.ends_with("+json") => Ok(BodyFormat::Json),
            s if s.ends_with("+xml") => Ok(BodyFormat::Xml),
            _ => Err(Error::UnsupportedBodyFormat(content_type.to_string())),
        }
    }
}

/// A field populated from the whole request body.
///
/// Implemented for every `DeserializeOwned` type.
pub trait BodyTarget {
    fn decode_body(&mut self, format: BodyFormat, body: &[u8]) -> Result<(), BodyError>;
}

impl<T> BodyTarget for T
where
    T: DeserializeOwned,
{
    fn decode_body(&mut self, format: BodyFormat, body: &[u8]) -> Result<(), BodyError> {
        *self = match format {
            BodyFormat::Json => serde_json::from_slice(body)?,
            #[cfg(feature = "xml")]
            BodyFormat::Xml => quick_xml::de::from_reader(body)?,
            #[cfg(not(feature = "xml"))]
            BodyFormat::Xml => return Err(BodyError::Disabled("xml")),
        };
        Ok(())
    }
}
