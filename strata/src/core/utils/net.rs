use std::net::{SocketAddr, ToSocketAddrs};

use crate::prelude::*;

/// Resolves a socket address, IPv4 addresses are preferred.
pub(crate) fn resolve_socket_addr(addr: impl ToSocketAddrs) -> Result<SocketAddr> {
    let mut resolved_addr = None;
    for addr in addr.to_socket_addrs()? {
        if resolved_addr.is_none() || addr.is_ipv4() {
            resolved_addr = Some(addr);
        }
        if addr.is_ipv4() {
            break;
        }
    }

    resolved_addr.ok_or_else(|| {
        Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "can't resolve provided socket address",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_addresses_are_resolved() {
        let addr = resolve_socket_addr("127.0.0.1:5600").unwrap();
        assert_eq!(addr.port(), 5600);
        assert!(addr.is_ipv4());

        let addr = resolve_socket_addr(("::1", 5601)).unwrap();
        assert!(addr.is_ipv6());
    }
}
