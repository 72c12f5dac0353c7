//! IP location classification and memoized lookup.
//!
//! Private and loopback addresses map to a fixed label without any external
//! call; public addresses go through the injected [`LocationLookup`]
//! collaborator and the result is memoized for the life of the process.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

/// Label used for loopback and RFC1918 addresses.
pub const LOCAL_NETWORK: &str = "Local network";

/// Label used when a lookup yields nothing.
pub const UNKNOWN_LOCATION: &str = "-";

/// External IP-to-location service.
///
/// Implementations are collaborators outside this subsystem; the default
/// [`NoopLocationLookup`] resolves nothing.
#[async_trait]
pub trait LocationLookup: Send + Sync {
    /// Resolves a public IP address to a human-readable location.
    async fn lookup(&self, ip: &str) -> Option<String>;
}

/// A lookup that never resolves anything.
#[derive(Debug, Clone, Default)]
pub struct NoopLocationLookup;

#[async_trait]
impl LocationLookup for NoopLocationLookup {
    async fn lookup(&self, _ip: &str) -> Option<String> {
        None
    }
}

/// Returns whether an address is loopback or RFC1918 private space.
///
/// Operates on the textual form the event log records; anything empty or
/// unrecognizable is treated as private so it never leaves the process.
pub fn is_private_ip(ip: &str) -> bool {
    if ip.is_empty() || ip == "::1" {
        return true;
    }
    if ip.starts_with("127.") || ip.starts_with("10.") || ip.starts_with("192.168.") {
        return true;
    }
    if let Some(rest) = ip.strip_prefix("172.") {
        if let Some(second) = rest.split('.').next() {
            if let Ok(n) = second.parse::<u8>() {
                return (16..=31).contains(&n);
            }
        }
    }
    false
}

/// Memoizing resolver over a [`LocationLookup`] collaborator.
pub struct LocationResolver {
    /// External lookup for public addresses.
    lookup: Arc<dyn LocationLookup>,
    /// Process-wide memo of resolved labels.
    cache: DashMap<String, String>,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl LocationResolver {
    /// Creates a resolver over the given lookup collaborator.
    pub fn new(lookup: Arc<dyn LocationLookup>) -> Self {
        Self {
            lookup,
            cache: DashMap::new(),
        }
    }

    /// Resolves an IP to a location label.
    ///
    /// Lookup failures degrade to [`UNKNOWN_LOCATION`]; they never abort
    /// the surrounding request.
    pub async fn resolve(&self, ip: &str) -> String {
        if is_private_ip(ip) {
            return LOCAL_NETWORK.to_string();
        }
        if let Some(cached) = self.cache.get(ip) {
            return cached.value().clone();
        }

        let label = self
            .lookup
            .lookup(ip)
            .await
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
        self.cache.insert(ip.to_string(), label.clone());
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_classification() {
        assert!(is_private_ip("::1"));
        assert!(is_private_ip("127.0.0.1"));
        assert!(is_private_ip("10.1.2.3"));
        assert!(is_private_ip("192.168.0.42"));
        assert!(is_private_ip("172.16.0.1"));
        assert!(is_private_ip("172.31.255.255"));
        assert!(is_private_ip(""));

        assert!(!is_private_ip("172.15.0.1"));
        assert!(!is_private_ip("172.32.0.1"));
        assert!(!is_private_ip("8.8.8.8"));
        assert!(!is_private_ip("203.0.113.9"));
    }

    #[tokio::test]
    async fn test_private_ip_never_hits_lookup() {
        struct Panicking;
        #[async_trait]
        impl LocationLookup for Panicking {
            async fn lookup(&self, _ip: &str) -> Option<String> {
                panic!("lookup must not be called for private addresses");
            }
        }

        let resolver = LocationResolver::new(Arc::new(Panicking));
        assert_eq!(resolver.resolve("192.168.1.1").await, LOCAL_NETWORK);
    }

    #[tokio::test]
    async fn test_public_lookup_is_memoized() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(AtomicUsize);
        #[async_trait]
        impl LocationLookup for Counting {
            async fn lookup(&self, _ip: &str) -> Option<String> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Some("Somewhere".to_string())
            }
        }

        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let resolver = LocationResolver::new(counting.clone());

        assert_eq!(resolver.resolve("8.8.8.8").await, "Somewhere");
        assert_eq!(resolver.resolve("8.8.8.8").await, "Somewhere");
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_degrades() {
        let resolver = LocationResolver::new(Arc::new(NoopLocationLookup));
        assert_eq!(resolver.resolve("8.8.8.8").await, UNKNOWN_LOCATION);
    }
}
