//! Closed vocabularies for peer records: network type, connection direction
//! and geolocation status, plus address helpers.

use crate::{rendering::context::Rgba, MapError, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Ipv4,
    Ipv6,
    Onion,
    I2p,
    Cjdns,
}

impl NetworkType {
    pub const ALL: [NetworkType; 5] = [
        NetworkType::Ipv4,
        NetworkType::Ipv6,
        NetworkType::Onion,
        NetworkType::I2p,
        NetworkType::Cjdns,
    ];

    /// Parses a backend network tag. Unknown tags are an error so callers can
    /// count them instead of silently coloring them as something else.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            "onion" | "tor" => Ok(Self::Onion),
            "i2p" => Ok(Self::I2p),
            "cjdns" => Ok(Self::Cjdns),
            other => Err(MapError::UnknownNetwork(other.to_string())),
        }
    }

    /// Infers the network from a raw `host[:port]` address
    pub fn classify(addr: &str) -> Self {
        if addr.contains(".onion") {
            Self::Onion
        } else if addr.contains(".i2p") {
            Self::I2p
        } else if addr.starts_with("fc") || addr.starts_with("fd") {
            Self::Cjdns
        } else if addr.matches(':').count() > 1 {
            Self::Ipv6
        } else {
            Self::Ipv4
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Onion => "onion",
            Self::I2p => "i2p",
            Self::Cjdns => "cjdns",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ipv4 => "IPv4",
            Self::Ipv6 => "IPv6",
            Self::Onion => "Tor",
            Self::I2p => "I2P",
            Self::Cjdns => "CJDNS",
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            Self::Ipv4 => Rgba::rgb(247, 147, 26),
            Self::Ipv6 => Rgba::rgb(64, 196, 255),
            Self::Onion => Rgba::rgb(178, 102, 255),
            Self::I2p => Rgba::rgb(255, 92, 141),
            Self::Cjdns => Rgba::rgb(57, 217, 138),
        }
    }

    /// Clearnet networks have routable addresses that can be geolocated
    pub fn is_clearnet(&self) -> bool {
        matches!(self, Self::Ipv4 | Self::Ipv6)
    }

    /// Only clearnet peers can be banned by address
    pub fn can_ban(&self) -> bool {
        self.is_clearnet()
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// `"IN"` is inbound; anything else is treated as outbound
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "IN" | "INBOUND" => Self::Inbound,
            _ => Self::Outbound,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbound => "IN",
            Self::Outbound => "OUT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationStatus {
    Ok,
    Private,
    Unavailable,
    Pending,
}

impl LocationStatus {
    /// Unknown or missing tags mean the lookup has not finished
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ok" => Self::Ok,
            "private" => Self::Private,
            "unavailable" => Self::Unavailable,
            _ => Self::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Private => "private",
            Self::Unavailable => "unavailable",
            Self::Pending => "pending",
        }
    }
}

/// Splits `ip:port`, `[v6]:port` or a bare host into host and port.
/// A bare IPv6 address has no port.
pub fn split_host_port(addr: &str) -> (&str, Option<&str>) {
    let addr = addr.trim();
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, tail)) => (host, tail.strip_prefix(':').filter(|p| !p.is_empty())),
            None => (rest, None),
        };
    }
    match addr.matches(':').count() {
        1 => match addr.rsplit_once(':') {
            Some((host, port)) => (host, Some(port).filter(|p| !p.is_empty())),
            None => (addr, None),
        },
        _ => (addr, None),
    }
}

/// Loopback, link-local and RFC 1918 hosts
pub fn is_private_host(host: &str) -> bool {
    if host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    if let Some(rest) = host.strip_prefix("172.") {
        let second = rest.split('.').next().and_then(|s| s.parse::<u8>().ok());
        if matches!(second, Some(16..=31)) {
            return true;
        }
    }
    host.starts_with("127.")
        || host == "localhost"
        || host.to_ascii_lowercase().starts_with("fe80:")
        || host == "::1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_tag() {
        assert_eq!(NetworkType::from_tag("ipv4").unwrap(), NetworkType::Ipv4);
        assert_eq!(NetworkType::from_tag(" Onion ").unwrap(), NetworkType::Onion);
        assert_eq!("cjdns".parse::<NetworkType>().unwrap(), NetworkType::Cjdns);
        match NetworkType::from_tag("carrier-pigeon") {
            Err(MapError::UnknownNetwork(tag)) => assert_eq!(tag, "carrier-pigeon"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_address() {
        assert_eq!(NetworkType::classify("abcdef.onion:8333"), NetworkType::Onion);
        assert_eq!(NetworkType::classify("xyz.b32.i2p:0"), NetworkType::I2p);
        assert_eq!(NetworkType::classify("fc32:17ea::1"), NetworkType::Cjdns);
        assert_eq!(NetworkType::classify("[2001:db8::1]:8333"), NetworkType::Ipv6);
        assert_eq!(NetworkType::classify("203.0.113.5:8333"), NetworkType::Ipv4);
    }

    #[test]
    fn test_colors_are_distinct() {
        let mut colors: Vec<_> = NetworkType::ALL.iter().map(|n| n.color()).collect();
        colors.dedup();
        assert_eq!(colors.len(), NetworkType::ALL.len());
    }

    #[test]
    fn test_ban_eligibility() {
        assert!(NetworkType::Ipv4.can_ban());
        assert!(NetworkType::Ipv6.can_ban());
        assert!(!NetworkType::Onion.can_ban());
        assert!(!NetworkType::I2p.can_ban());
        assert!(!NetworkType::Cjdns.can_ban());
    }

    #[test]
    fn test_direction_and_status_tags() {
        assert_eq!(Direction::from_tag("IN"), Direction::Inbound);
        assert_eq!(Direction::from_tag("OUT"), Direction::Outbound);
        assert_eq!(Direction::from_tag(""), Direction::Outbound);
        assert_eq!(LocationStatus::from_tag("ok"), LocationStatus::Ok);
        assert_eq!(LocationStatus::from_tag("private"), LocationStatus::Private);
        assert_eq!(LocationStatus::from_tag("???"), LocationStatus::Pending);
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("1.2.3.4:8333"), ("1.2.3.4", Some("8333")));
        assert_eq!(split_host_port("[2001:db8::1]:8333"), ("2001:db8::1", Some("8333")));
        assert_eq!(split_host_port("2001:db8::1"), ("2001:db8::1", None));
        assert_eq!(split_host_port("example.onion"), ("example.onion", None));
        assert_eq!(split_host_port(""), ("", None));
    }

    #[test]
    fn test_private_hosts() {
        for host in ["10.0.0.1", "192.168.1.20", "172.16.0.1", "172.31.255.1", "127.0.0.1", "localhost", "fe80::1", "::1"] {
            assert!(is_private_host(host), "{host}");
        }
        for host in ["172.32.0.1", "8.8.8.8", "2001:db8::1", "172.abc"] {
            assert!(!is_private_host(host), "{host}");
        }
    }
}
