//! HTTP transport trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{HttpResponse, RequestDescriptor};

/// Issues exactly one HTTP request.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; classification and retry happen in
/// [`ResilientClient`](crate::ResilientClient).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
