//! Axum integration.
//!
//! - [`Decoded`]: extractor binding the whole request into a record
//! - [`DecoderLayer`]: makes a configured [`Decoder`] available to it
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use reqbind::{Decoded, Decoder, DecoderLayer, Record};
//!
//! #[derive(Default, Record)]
//! struct GetOrder {
//!     #[bind("id,path")]
//!     pub id: u64,
//!     #[bind("fields,form")]
//!     pub fields: Vec<String>,
//! }
//!
//! async fn get_order(Decoded(req): Decoded<GetOrder>) -> String {
//!     format!("order {} ({})", req.id, req.fields.join(","))
//! }
//!
//! let app: Router = Router::new()
//!     .route("/orders/{id}", get(get_order))
//!     .layer(DecoderLayer::new(Decoder::default()));
//! ```

use std::task::{Context, Poll};

use axum::extract::{FromRequest, FromRequestParts, RawPathParams, Request};
use tower::{Layer, Service};

use crate::decoder::{Decoder, PathParams};
use crate::error::Error;
use crate::value::Bindable;

/// Record bound from path, query and body of the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoded<T>(pub T);

impl<T> std::ops::Deref for Decoded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Decoded<T>
where
    S: Send + Sync,
    T: Bindable + Default + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        if parts.extensions.get::<PathParams>().is_none() {
            // routes without parameters reject, which simply means no path values
            if let Ok(raw) = RawPathParams::from_request_parts(&mut parts, state).await {
                let params: PathParams = raw.iter().collect();
                parts.extensions.insert(params);
            }
        }

        let decoder = parts
            .extensions
            .get::<Decoder>()
            .cloned()
            .unwrap_or_default();

        let max_size = decoder.body_limits().max_body_size().unwrap_or(usize::MAX);
        let bytes = axum::body::to_bytes(body, max_size)
            .await
            .map_err(|e| Error::BodyTooLarge(format!("failed to read request body: {e}")))?;

        let mut value = T::default();
        decoder.decode(&parts, bytes.as_ref(), &mut value)?;
        Ok(Decoded(value))
    }
}

/// Tower layer inserting a [`Decoder`] into request extensions.
#[derive(Clone, Debug, Default)]
pub struct DecoderLayer {
    decoder: Decoder,
}

impl DecoderLayer {
    /// Layer handing `decoder` to every [`Decoded`] extraction below it.
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }
}

impl<S> Layer<S> for DecoderLayer {
    type Service = DecoderService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DecoderService {
            inner,
            decoder: self.decoder.clone(),
        }
    }
}

/// Service produced by [`DecoderLayer`].
#[derive(Clone, Debug)]
pub struct DecoderService<S> {
    inner: S,
    decoder: Decoder,
}

impl<S, B> Service<http::Request<B>> for DecoderService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        request.extensions_mut().insert(self.decoder.clone());
        self.inner.call(request)
    }
}
