//! Error types for request binding.
//!
//! - [`TagError`]: malformed field tag
//! - [`CoerceError`]: raw value could not be converted into the field
//! - [`BodyError`]: request body could not be read or deserialized
//! - [`Error`]: everything a decode call can fail with

use http::StatusCode;
use serde::Serialize;

use crate::tag::Origin;

/// Boxed error returned by custom text decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed or inconsistent field tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("unknown setting `{token}` in tag `{tag}`")]
    UnknownSetting { tag: String, token: String },

    #[error("unsupported body format `{format}` in tag `{tag}`")]
    UnsupportedFormat { tag: String, format: String },

    #[error("tag `{tag}` declares a body origin but the field is not a body target")]
    NotBodyTarget { tag: String },
}

/// Raw value could not be converted into the target field.
#[derive(Debug, thiserror::Error)]
pub enum CoerceError {
    #[error("no value to decode")]
    Missing,

    #[error("invalid boolean `{0}`")]
    InvalidBool(String),

    #[error("invalid integer `{value}`: {source}")]
    Int {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid float `{value}`: {source}")]
    Float {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("invalid character `{value}`: {source}")]
    Char {
        value: String,
        #[source]
        source: std::char::ParseCharError,
    },

    #[error("{0}")]
    Text(#[source] BoxError),

    #[error("unsupported target shape: {0}")]
    Unsupported(&'static str),
}

/// Request body could not be read or deserialized.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("failed to read request body: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xml")]
    #[error("invalid XML body: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("{0} bodies are not enabled in this build")]
    Disabled(&'static str),
}

/// Error returned by a decode call.
///
/// Decoding stops at the first failing field. Fields bound before it keep
/// their new values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The decode target is not a record.
    #[error("decode target must be a record, got {0}")]
    Usage(&'static str),

    #[error("field `{field}`: {source}")]
    Tag {
        field: String,
        #[source]
        source: TagError,
    },

    #[error("query param '{name}' is required")]
    Required { name: String },

    #[error("{origin} param '{name}': {source}")]
    Coerce {
        origin: Origin,
        name: String,
        #[source]
        source: CoerceError,
    },

    #[error("body field `{name}`: {source}")]
    Body {
        name: String,
        #[source]
        source: BodyError,
    },

    #[error("unsupported body format `{0}`")]
    UnsupportedBodyFormat(String),

    #[error("request body already consumed")]
    BodyConsumed,

    #[error("{0}")]
    BodyTooLarge(String),

    #[error("decoding header '{name}' is not implemented")]
    NotImplemented { name: String },
}

impl Error {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Usage(_) => "usage",
            Error::Tag { .. } => "tag",
            Error::Required { .. } => "required",
            Error::Coerce { .. } => "coerce",
            Error::Body { .. } => "body",
            Error::UnsupportedBodyFormat(_) => "unsupported_body_format",
            Error::BodyConsumed => "body_consumed",
            Error::BodyTooLarge(_) => "body_too_large",
            Error::NotImplemented { .. } => "not_implemented",
        }
    }

    /// HTTP status matching the error.
    ///
    /// Bad input from the client maps to 4xx. Mistakes in the declared
    /// record (tags, targets, unimplemented origins) map to 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Required { .. } | Error::Coerce { .. } | Error::Body { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::UnsupportedBodyFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Usage(_)
            | Error::Tag { .. }
            | Error::BodyConsumed
            | Error::NotImplemented { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was caused by the request rather than the record declaration.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// JSON body of an error response.
#[derive(Serialize)]
pub struct ErrorResponseBody<'a> {
    pub code: &'a str,
    pub message: String,
}

impl<'a> From<&'a Error> for ErrorResponseBody<'a> {
    fn from(err: &'a Error) -> Self {
        // server-side faults are not described to the client
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            "internal error".to_string()
        };
        Self {
            code: err.kind(),
            message,
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if !self.is_client_error() {
            tracing::error!(target: "reqbind", error = %self, "request binding failed");
        }
        let status = self.status_code();
        (status, axum::Json(ErrorResponseBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_display() {
        let err = Error::Required {
            name: "field".into(),
        };
        assert_eq!(err.to_string(), "query param 'field' is required");
    }

    #[test]
    fn test_coerce_display_names_origin_and_param() {
        let err = Error::Coerce {
            origin: Origin::Query,
            name: "flag".into(),
            source: CoerceError::InvalidBool("maybe".into()),
        };
        assert_eq!(err.to_string(), "query param 'flag': invalid boolean `maybe`");

        let err = Error::Coerce {
            origin: Origin::Path,
            name: "id".into(),
            source: CoerceError::Missing,
        };
        assert_eq!(err.to_string(), "path param 'id': no value to decode");
    }

    #[test]
    fn test_tag_display() {
        let err = Error::Tag {
            field: "value".into(),
            source: TagError::UnknownSetting {
                tag: "value,expanded".into(),
                token: "expanded".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "field `value`: unknown setting `expanded` in tag `value,expanded`"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::Required { name: "a".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::UnsupportedBodyFormat("text/plain".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            Error::BodyTooLarge("too big".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            Error::Usage("integer").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::NotImplemented { name: "x".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::BodyConsumed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_body_hides_server_faults() {
        let err = Error::NotImplemented {
            name: "x-request-id".into(),
        };
        let json = serde_json::to_value(ErrorResponseBody::from(&err)).unwrap();
        assert_eq!(json["code"], "not_implemented");
        assert_eq!(json["message"], "internal error");

        let err = Error::Required { name: "id".into() };
        let json = serde_json::to_value(ErrorResponseBody::from(&err)).unwrap();
        assert_eq!(json["code"], "required");
        assert_eq!(json["message"], "query param 'id' is required");
    }
}
