//! Decode orchestration.
//!
//! A [`Decoder`] is immutable configuration shared by any number of decode
//! calls. Each call builds its own query index, walks the target record and
//! dispatches every field by origin:
//!
//! | Origin | Source |
//! |--------|--------|
//! | `path` | the path value provider, one value |
//! | `query` | the query index, resolved per style and explode flag |
//! | `body` | the request body, read once |
//! | `header` | not implemented, always an error |
//!
//! Decoding stops at the first failing field.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use http::Request;
use http::request::Parts;

use crate::body::{BodyFormat, BodyTarget};
use crate::coerce::coerce_slot;
use crate::error::{CoerceError, Error, TagError};
use crate::limits::BodyLimits;
use crate::query::QueryIndex;
use crate::record::{BoundField, BoundTarget, Record, walk};
use crate::tag::{Descriptor, Origin, QueryPolicy, Style};
use crate::value::{Bindable, Slot};

type PathValueFn = dyn Fn(&Parts, &str) -> String + Send + Sync;

/// Matched path parameters, stored as a request extension.
///
/// Routers put the values they matched here so the default path value
/// provider can find them. The axum extractor fills it in automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a matched parameter. Earlier entries win on lookup.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Reads a path value from the [`PathParams`] extension. Missing values are empty.
fn path_param(parts: &Parts, name: &str) -> String {
    parts
        .extensions
        .get::<PathParams>()
        .and_then(|params| params.get(name))
        .unwrap_or_default()
        .to_string()
}

/// Binds requests into records.
///
/// # Example
///
/// ```rust
/// use reqbind::{Decoder, Record, Style};
///
/// #[derive(Default, Record)]
/// struct ListOrders {
///     #[bind("filterType,form")]
///     pub filter_type: Vec<String>,
///     #[bind("clientId")]
///     pub client_id: i64,
/// }
///
/// let decoder = Decoder::builder().query_style(Style::Form).build();
/// let request = http::Request::get("/orders?filterType=pending,approved&clientId=4")
///     .body(&b""[..])
///     .unwrap();
///
/// let mut list = ListOrders::default();
/// decoder.decode_request(request, &mut list).unwrap();
/// assert_eq!(list.filter_type, ["pending", "approved"]);
/// assert_eq!(list.client_id, 4);
/// ```
#[derive(Clone)]
pub struct Decoder {
    query: QueryPolicy,
    path_value: Arc<PathValueFn>,
    limits: BodyLimits,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("query", &self.query)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Decoder {
    /// Starts a [`DecoderBuilder`] with the default configuration.
    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    /// Style and explode flag applied to query fields whose tag names none.
    pub fn query_policy(&self) -> QueryPolicy {
        self.query
    }

    /// Size cap applied when buffering body fields.
    pub fn body_limits(&self) -> BodyLimits {
        self.limits
    }

    /// Binds `parts` and `body` into `target`.
    ///
    /// `target` must be a record; anything else fails with
    /// [`Error::Usage`] before the request is looked at.
    pub fn decode<R: Read>(
        &self,
        parts: &Parts,
        body: R,
        target: &mut dyn Bindable,
    ) -> Result<(), Error> {
        let record = match target.slot() {
            Slot::Record(record) => record,
            other => return Err(Error::Usage(other.shape())),
        };

        let query = QueryIndex::from_uri(&parts.uri);
        let mut call = Call {
            decoder: self,
            parts,
            body: Some(body),
        };
        call.record(record, &query, None)
    }

    /// Splits `request` into parts and body, then [`decode`](Self::decode)s it.
    pub fn decode_request<B: Read>(
        &self,
        request: Request<B>,
        target: &mut dyn Bindable,
    ) -> Result<(), Error> {
        let (parts, body) = request.into_parts();
        self.decode(&parts, body, target)
    }
}

/// Binds `request` into `target` with a default [`Decoder`].
pub fn decode<B: Read>(request: Request<B>, target: &mut dyn Bindable) -> Result<(), Error> {
    Decoder::default().decode_request(request, target)
}

/// Builder for [`Decoder`].
pub struct DecoderBuilder {
    query: QueryPolicy,
    path_value: Arc<PathValueFn>,
    limits: BodyLimits,
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderBuilder {
    /// Form style, exploded, path values from [`PathParams`], 4 MiB bodies.
    pub fn new() -> Self {
        Self {
            query: QueryPolicy::default(),
            path_value: Arc::new(path_param),
            limits: BodyLimits::default(),
        }
    }

    /// Default style of query fields whose tag names none.
    pub fn query_style(mut self, style: Style) -> Self {
        self.query.style = style;
        self
    }

    /// Untagged query fields expect repeated keys, `?id=1&id=2`. The default.
    pub fn query_exploded(mut self) -> Self {
        self.query.exploded = true;
        self
    }

    /// Untagged query fields expect one delimited value, `?id=1,2`.
    pub fn query_imploded(mut self) -> Self {
        self.query.exploded = false;
        self
    }

    /// Sets the provider of path-origin values.
    ///
    /// Called once per path field with its binding name.
    pub fn path_value<F>(mut self, provider: F) -> Self
    where
        F: Fn(&Parts, &str) -> String + Send + Sync + 'static,
    {
        self.path_value = Arc::new(provider);
        self
    }

    /// Sets the body size cap, see [`BodyLimits`].
    pub fn body_limits(mut self, limits: BodyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Finishes the immutable [`Decoder`].
    pub fn build(self) -> Decoder {
        Decoder {
            query: self.query,
            path_value: self.path_value,
            limits: self.limits,
        }
    }
}

// ============================================================================
// Per-call state
// ============================================================================

struct Call<'d, R> {
    decoder: &'d Decoder,
    parts: &'d Parts,
    /// Taken by the first body field.
    body: Option<R>,
}

impl<R: Read> Call<'_, R> {
    /// Binds every field of `record` from `query`. Fields of deep objects
    /// are reported under `prefix[name]`.
    fn record(
        &mut self,
        record: &mut dyn Record,
        query: &QueryIndex,
        prefix: Option<&str>,
    ) -> Result<(), Error> {
        for field in walk(record, self.decoder.query)? {
            let name = match prefix {
                Some(prefix) => format!("{prefix}[{}]", field.descriptor.name),
                None => field.descriptor.name.clone(),
            };
            tracing::trace!(
                target: "reqbind",
                field = field.ident,
                name = %name,
                origin = %field.descriptor.origin,
                "binding field"
            );
            self.field(field, name, query)?;
        }
        Ok(())
    }

    fn field(&mut self, field: BoundField<'_>, name: String, query: &QueryIndex) -> Result<(), Error> {
        let BoundField {
            ident,
            tag,
            descriptor,
            target,
        } = field;

        let slot = match target {
            BoundTarget::Body(body) => return self.body(&descriptor, name, body),
            BoundTarget::Slot(slot) => slot,
        };

        match descriptor.origin {
            Origin::Path => {
                let value = (self.decoder.path_value)(self.parts, &descriptor.name);
                coerce_slot(slot, &[value]).map_err(|source| Error::Coerce {
                    origin: Origin::Path,
                    name,
                    source,
                })
            }
            Origin::Query if descriptor.is_deep() => self.deep(&descriptor, name, slot, query),
            Origin::Query => {
                let resolved =
                    query.resolve(&descriptor.name, descriptor.style, descriptor.exploded);
                let Some(values) = resolved else {
                    return required(&descriptor, name);
                };
                coerce_slot(slot, &values).map_err(|source| Error::Coerce {
                    origin: Origin::Query,
                    name,
                    source,
                })
            }
            Origin::Body => Err(Error::Tag {
                field: ident.to_string(),
                source: TagError::NotBodyTarget {
                    tag: tag.to_string(),
                },
            }),
            Origin::Header => Err(Error::NotImplemented { name }),
        }
    }

    fn deep(
        &mut self,
        descriptor: &Descriptor,
        name: String,
        mut slot: Slot<'_>,
        query: &QueryIndex,
    ) -> Result<(), Error> {
        let sub = query.deep(&descriptor.name);
        if sub.is_empty() {
            return required(descriptor, name);
        }

        loop {
            slot = match slot {
                Slot::Pointer(pointer) => pointer.get_or_alloc().slot(),
                Slot::Record(record) => return self.record(record, &sub, Some(name.as_str())),
                other => {
                    return Err(Error::Coerce {
                        origin: Origin::Query,
                        name,
                        source: CoerceError::Unsupported(other.shape()),
                    });
                }
            };
        }
    }

    fn body(
        &mut self,
        descriptor: &Descriptor,
        name: String,
        target: &mut dyn BodyTarget,
    ) -> Result<(), Error> {
        let reader = self.body.take().ok_or(Error::BodyConsumed)?;
        let format = match descriptor.format {
            Some(format) => format,
            None => {
                let format = BodyFormat::from_headers(&self.parts.headers)?;
                tracing::debug!(
                    target: "reqbind",
                    field = %name,
                    format = format.as_str(),
                    "inferred body format from content type"
                );
                format
            }
        };

        let bytes = self.decoder.limits.read_to_end(reader, &name)?;
        target
            .decode_body(format, &bytes)
            .map_err(|source| Error::Body { name, source })
    }
}

fn required(descriptor: &Descriptor, name: String) -> Result<(), Error> {
    if descriptor.required {
        Err(Error::Required { name })
    } else {
        Ok(())
    }
}
