//! Dispatch table from (method, exact path) to [`Endpoint`].
//!
//! Paths are matched literally; there are no templates or wildcards, and any
//! query string must be stripped by the caller.
//!
//! # Example
//!
//! ```rust
//! use ssemock_server::{Endpoint, EndpointRegistry};
//! use http::Method;
//!
//! let registry = EndpointRegistry::standard().unwrap();
//!
//! assert_eq!(registry.resolve(&Method::POST, "/chat"), Some(Endpoint::Chat));
//! assert_eq!(registry.resolve(&Method::GET, "/chat"), None);
//! ```

use std::collections::HashMap;

use http::Method;

use crate::endpoints::Endpoint;
use crate::error::RegistryError;

/// Maps request method and path to an endpoint.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    routes: HashMap<(Method, String), Endpoint>,
    order: Vec<Endpoint>,
}

impl EndpointRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every [`Endpoint`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRoute`] if two endpoints share a
    /// method and path.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for endpoint in Endpoint::ALL {
            registry.register(endpoint)?;
        }
        Ok(registry)
    }

    /// Adds an endpoint under its own method and path.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRoute`] if the key is taken.
    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), RegistryError> {
        let key = (endpoint.method(), endpoint.path().to_string());
        if self.routes.contains_key(&key) {
            return Err(RegistryError::duplicate(key.0, key.1));
        }
        self.routes.insert(key, endpoint);
        self.order.push(endpoint);
        Ok(())
    }

    /// Looks up the endpoint for a request.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<Endpoint> {
        self.routes.get(&(method.clone(), path.to_string())).copied()
    }

    /// Registered endpoints in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.order.iter().copied()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registers_all() {
        let registry = EndpointRegistry::standard().unwrap();
        assert_eq!(registry.len(), Endpoint::ALL.len());
        assert_eq!(registry.endpoints().collect::<Vec<_>>(), Endpoint::ALL);
    }

    #[test]
    fn test_resolve_every_endpoint() {
        let registry = EndpointRegistry::standard().unwrap();
        for endpoint in Endpoint::ALL {
            assert_eq!(
                registry.resolve(&endpoint.method(), endpoint.path()),
                Some(endpoint)
            );
        }
    }

    #[test]
    fn test_method_is_part_of_key() {
        let registry = EndpointRegistry::standard().unwrap();
        assert_eq!(registry.resolve(&Method::POST, "/events"), None);
        assert_eq!(registry.resolve(&Method::GET, "/chat"), None);
    }

    #[test]
    fn test_paths_match_exactly() {
        let registry = EndpointRegistry::standard().unwrap();
        assert_eq!(registry.resolve(&Method::GET, "/events/"), None);
        assert_eq!(registry.resolve(&Method::GET, "/Events"), None);
        assert_eq!(registry.resolve(&Method::GET, "/events-with"), None);
        assert_eq!(registry.resolve(&Method::GET, "/"), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = EndpointRegistry::new();
        registry.register(Endpoint::Rapid).unwrap();

        let err = registry.register(Endpoint::Rapid).unwrap_err();
        assert_eq!(err, RegistryError::duplicate(Method::GET, "/rapid"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = EndpointRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(&Method::GET, "/events"), None);
    }
}
