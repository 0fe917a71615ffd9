//! # reqbind
//!
//! Declarative binding of HTTP requests into typed records.
//!
//! Each public field of a record carries a tag saying where its value comes
//! from and how it is serialized. The decoder reads path segments, query
//! parameters and the body accordingly, following the OpenAPI query
//! serialization styles.
//!
//! ## Features
//!
//! - **Query styles:** `form`, `spaceDelimited`, `pipeDelimited` and
//!   `deepObject`, exploded or imploded.
//! - **Typed coercion:** integers of every width, floats, booleans, strings,
//!   raw bytes, optional values, sequences and custom [`TextDecode`] types.
//! - **Bodies:** JSON and XML through serde.
//! - **Axum:** the [`Decoded`] extractor (feature `axum`, on by default).
//!
//! ## Example
//!
//! ```rust
//! use reqbind::{Record, decode};
//!
//! #[derive(Default, Record)]
//! struct ListOrders {
//!     #[bind("filterType,form")]
//!     pub filter_type: Vec<String>,
//!     #[bind("clientId")]
//!     pub client_id: i64,
//!     #[bind("filterClientIds,pipeDelimited")]
//!     pub filter_client_ids: Vec<u32>,
//!     #[bind("-")]
//!     pub internal: String,
//! }
//!
//! let request = http::Request::get(
//!     "/orders?filterType=pending,approved&clientId=4&filterClientIds=1|2|3",
//! )
//! .body(&b""[..])
//! .unwrap();
//!
//! let mut list = ListOrders::default();
//! decode(request, &mut list).unwrap();
//!
//! assert_eq!(list.filter_type, ["pending", "approved"]);
//! assert_eq!(list.client_id, 4);
//! assert_eq!(list.filter_client_ids, [1, 2, 3]);
//! ```

extern crate self as reqbind;

pub mod body;
pub mod coerce;
pub mod decoder;
pub mod error;
#[cfg(feature = "axum")]
pub mod extract;
pub mod limits;
pub mod query;
pub mod record;
pub mod tag;
pub mod value;

pub use body::{BodyFormat, BodyTarget};
pub use coerce::{coerce, coerce_slot, parse_bool};
pub use decoder::{Decoder, DecoderBuilder, PathParams, decode};
pub use error::{BodyError, BoxError, CoerceError, Error, ErrorResponseBody, TagError};
#[cfg(feature = "axum")]
pub use extract::{Decoded, DecoderLayer, DecoderService};
pub use limits::{BodyLimits, DEFAULT_MAX_BODY_SIZE};
pub use query::QueryIndex;
pub use record::{BoundField, BoundTarget, FieldRef, FieldTarget, Record, walk};
pub use tag::{Descriptor, Origin, QueryPolicy, Style};
pub use value::{Bindable, ByteSink, Pointer, Scalar, Sequence, Slot, TextDecode};

/// Derives [`Record`] and [`Bindable`] for a struct.
///
/// Public fields are bound according to their `#[bind("<tag>")]`
/// attribute; fields without one use the lower-cased identifier.
/// `#[bind(rename_all = "camelCase")]` on the struct converts identifiers
/// first. `#[bind(text)]` instead makes the type bind through its
/// [`TextDecode`] impl.
pub use reqbind_macros::Record;

pub mod prelude {
    //! The most common types.
    pub use crate::decoder::{Decoder, PathParams, decode};
    pub use crate::error::Error;
    #[cfg(feature = "axum")]
    pub use crate::extract::{Decoded, DecoderLayer};
    pub use crate::record::Record;
    pub use crate::tag::Style;
    pub use crate::value::{Bindable, Slot, TextDecode};
    pub use reqbind_macros::Record;
}
