//! Shared plumbing for the external capabilities consumed by the core.
//!
//! The SDN controller, the session manager, and the HTTP transport are all
//! injected behind traits whose methods return [`CapabilityFuture`]. Boxing
//! keeps the traits object safe and lets test doubles be plain structs.

use std::future::Future;
use std::pin::Pin;

/// Future returned by capability operations.
pub type CapabilityFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
