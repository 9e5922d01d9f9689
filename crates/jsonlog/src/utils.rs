//! Utility functions

use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;

use sysinfo::Networks;

static SERVER_IP: LazyLock<String> = LazyLock::new(resolve_server_ip);

/// Network address of this host, resolved once per process
///
/// [`LogRegistry::get_loggers`](crate::LogRegistry::get_loggers) forces the
/// lookup, so rendering only reads the cached value.
pub fn server_ip() -> &'static str {
    &SERVER_IP
}

/// First external IPv4 address of the host's interfaces, by interface name;
/// loopback if there is none
fn resolve_server_ip() -> String {
    let networks = Networks::new_with_refreshed_list();
    let mut interfaces: Vec<_> = networks
        .iter()
        .map(|(name, network)| {
            let addrs: Vec<IpAddr> = network.ip_networks().iter().map(|net| net.addr).collect();
            (name.as_str(), addrs)
        })
        .collect();
    interfaces.sort_by(|(a, _), (b, _)| a.cmp(b));

    match first_external_ipv4(interfaces.iter().flat_map(|(_, addrs)| addrs.iter().copied())) {
        Some(addr) => addr.to_string(),
        None => {
            tracing::debug!(
                interfaces = interfaces.len(),
                "no external IPv4 address, using loopback"
            );
            Ipv4Addr::LOCALHOST.to_string()
        }
    }
}

fn first_external_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
        _ => None,
    })
}

/// Reduce a `type_name` path of a marker fn nested in a function to that
/// function's name
#[doc(hidden)]
pub fn function_name(marker_path: &'static str) -> &'static str {
    let mut path = marker_path
        .rsplit_once("::")
        .map_or(marker_path, |(parent, _)| parent);
    while let Some(parent) = path.strip_suffix("::{{closure}}") {
        path = parent;
    }
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_ip_is_stable() {
        let first = server_ip();
        assert!(first.parse::<std::net::IpAddr>().is_ok(), "{first}");
        assert!(std::ptr::eq(first, server_ip()));
    }

    #[test]
    fn test_first_external_ipv4_skips_loopback_and_ipv6() {
        let addrs: Vec<IpAddr> = vec![
            "127.0.0.1".parse().unwrap(),
            "::1".parse().unwrap(),
            "fe80::1".parse().unwrap(),
            "192.168.1.20".parse().unwrap(),
            "10.0.0.5".parse().unwrap(),
        ];
        assert_eq!(
            first_external_ipv4(addrs),
            Some(Ipv4Addr::new(192, 168, 1, 20))
        );
        assert_eq!(first_external_ipv4(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]), None);
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("app::handlers::get_user::__marker"), "get_user");
        assert_eq!(
            function_name("app::run::{{closure}}::{{closure}}::__marker"),
            "run"
        );
        assert_eq!(function_name("main::__marker"), "main");
    }
}
