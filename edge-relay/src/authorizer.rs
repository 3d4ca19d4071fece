//! Coarse source-address allow-list for the camera ingress.

use std::net::SocketAddr;

/// Admits a frame when its source address contains any allow-listed
/// substring. This is a filter against stray senders, not a security
/// boundary: `"127.0.0.1"` also admits `"127.0.0.10:9"`.
#[derive(Debug, Clone)]
pub struct AddressAuthorizer {
    allowed: Vec<String>,
}

impl AddressAuthorizer {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn admits(&self, source: &str) -> bool {
        self.allowed.iter().any(|entry| source.contains(entry.as_str()))
    }

    pub fn admits_addr(&self, source: &SocketAddr) -> bool {
        self.admits(&source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_only() -> AddressAuthorizer {
        AddressAuthorizer::new(vec!["localhost".into(), "127.0.0.1".into()])
    }

    #[test]
    fn rejects_unlisted_source() {
        assert!(!local_only().admits("192.168.1.5:4000"));
    }

    #[test]
    fn accepts_loopback_source() {
        assert!(local_only().admits("127.0.0.1:6001"));
        assert!(local_only().admits_addr(&"127.0.0.1:6001".parse().unwrap()));
    }

    #[test]
    fn empty_allow_list_admits_nothing() {
        assert!(!AddressAuthorizer::new(Vec::new()).admits("127.0.0.1:1"));
    }
}
