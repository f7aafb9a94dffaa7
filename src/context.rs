//! Per-request key/value storage and the [`Context`] handed to business code
//!
//! Middleware earlier in the chain (authentication, tenancy lookup, ...)
//! stores values with [`set_key`] on the request extensions. Hooks and
//! business functions read them back through [`Context::get_key`]. The store
//! belongs to a single request, so no locking is involved.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{request::Parts, Extensions, HeaderMap, Method, Uri};
use uuid::Uuid;

/// Identifier assigned to an inbound request by the logging middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// String-keyed values stored in a request's extensions
#[derive(Clone, Default)]
struct KeyStore(HashMap<String, Arc<dyn Any + Send + Sync>>);

/// Store `value` under `key` for the rest of this request.
///
/// A later call with the same key replaces the previous value, whatever its
/// type was.
pub fn set_key<T>(extensions: &mut Extensions, key: impl Into<String>, value: T)
where
    T: Send + Sync + 'static,
{
    if extensions.get::<KeyStore>().is_none() {
        extensions.insert(KeyStore::default());
    }
    if let Some(store) = extensions.get_mut::<KeyStore>() {
        store.0.insert(key.into(), Arc::new(value));
    }
}

/// Fetch the value stored under `key`, or `T::default()` when nothing was set.
///
/// # Panics
///
/// Panics if the stored value is not a `T`. Readers and writers of a key
/// must agree on its type.
pub fn get_key<T>(extensions: &Extensions, key: &str) -> T
where
    T: Clone + Default + 'static,
{
    let Some(value) = extensions.get::<KeyStore>().and_then(|s| s.0.get(key)) else {
        return T::default();
    };
    match value.downcast_ref::<T>() {
        Some(v) => v.clone(),
        None => panic!(
            "invalid type for key {key:?}: expected {}",
            std::any::type_name::<T>()
        ),
    }
}

/// Whether anything has been stored under `key`
pub fn has_key(extensions: &Extensions, key: &str) -> bool {
    extensions
        .get::<KeyStore>()
        .is_some_and(|s| s.0.contains_key(key))
}

/// Owned view of one inbound call
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
}

impl Context {
    /// Snapshot the request head. Uses the [`RequestId`] set by the logging
    /// middleware, or mints one when the middleware is not installed.
    pub fn from_parts(parts: &Parts) -> Self {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_default()
            .0;

        Self {
            request_id,
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            extensions: parts.extensions.clone(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// See [`get_key`]
    pub fn get_key<T>(&self, key: &str) -> T
    where
        T: Clone + Default + 'static,
    {
        get_key(&self.extensions, key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        has_key(&self.extensions, key)
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
