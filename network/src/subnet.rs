//! IP address and subnet text parsing.
//!
//! Accepted forms: a bare address (`127.0.0.1`, `fe80::1`), address plus CIDR
//! length (`127.0.0.0/24`) and address plus netmask (`127.0.0.0/255.255.0.0`,
//! `2001:db8::/ffff:fffc::`). The result is truncated to its network address
//! so every subnet has exactly one canonical form.

use ipnet::IpNet;
use std::net::IpAddr;

use crate::error::NetworkError;

/// Parse IP/subnet text into its canonical network.
///
/// A bare address becomes a single-host network (`/32` or `/128`). Ports,
/// hostnames, non-contiguous netmasks and mixed address families are rejected.
pub fn parse_subnet(text: &str) -> Result<IpNet, NetworkError> {
    let invalid = || NetworkError::InvalidSubnet(text.to_string());

    let (addr_text, suffix) = match text.split_once('/') {
        Some((addr, suffix)) => (addr, Some(suffix)),
        None => (text, None),
    };
    let addr: IpAddr = addr_text.parse().map_err(|_| invalid())?;

    let prefix = match suffix {
        None => host_prefix(addr),
        Some(len) if !len.is_empty() && len.bytes().all(|b| b.is_ascii_digit()) => {
            len.parse::<u8>().map_err(|_| invalid())?
        }
        Some(mask) => {
            let mask: IpAddr = mask.parse().map_err(|_| invalid())?;
            netmask_prefix(addr, mask).ok_or_else(invalid)?
        }
    };

    let net = IpNet::new(addr, prefix).map_err(|_| invalid())?;
    Ok(net.trunc())
}

fn host_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Prefix length of a contiguous netmask of the same family as `addr`.
fn netmask_prefix(addr: IpAddr, mask: IpAddr) -> Option<u8> {
    match (addr, mask) {
        (IpAddr::V4(_), IpAddr::V4(mask)) => {
            let bits = u32::from(mask);
            let ones = bits.leading_ones();
            (bits.checked_shl(ones).unwrap_or(0) == 0).then_some(ones as u8)
        }
        (IpAddr::V6(_), IpAddr::V6(mask)) => {
            let bits = u128::from(mask);
            let ones = bits.leading_ones();
            (bits.checked_shl(ones).unwrap_or(0) == 0).then_some(ones as u8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(text: &str) -> String {
        parse_subnet(text).expect("valid subnet").to_string()
    }

    #[test]
    fn bare_addresses_become_host_networks() {
        assert_eq!(canonical("127.0.0.0"), "127.0.0.0/32");
        assert_eq!(
            canonical("FE80:0000:0000:0000:0202:B3FF:FE1E:8329"),
            "fe80::202:b3ff:fe1e:8329/128"
        );
    }

    #[test]
    fn cidr_lengths() {
        assert_eq!(canonical("127.0.0.0/24"), "127.0.0.0/24");
        assert_eq!(
            canonical("2001:4d48:ac57:400:cacf:e9ff:fe1d:9c63/128"),
            "2001:4d48:ac57:400:cacf:e9ff:fe1d:9c63/128"
        );
        assert_eq!(canonical("0.0.0.0/0"), "0.0.0.0/0");
    }

    #[test]
    fn host_bits_are_cleared() {
        assert_eq!(canonical("127.0.0.1/24"), "127.0.0.0/24");
        assert_eq!(canonical("10.1.2.3/8"), "10.0.0.0/8");
    }

    #[test]
    fn netmasks() {
        assert_eq!(canonical("127.0.0.0/255.255.0.0"), "127.0.0.0/16");
        assert_eq!(canonical("2001:db8::/ffff:fffc:0:0:0:0:0:0"), "2001:db8::/30");
        assert_eq!(canonical("1.2.3.4/255.255.255.255"), "1.2.3.4/32");
        assert_eq!(canonical("1.2.3.4/0.0.0.0"), "0.0.0.0/0");
    }

    #[test]
    fn rejects_garbage() {
        for text in [
            "test",
            "",
            "127.0.0.0:8334",
            "127.0.0.0/33",
            "::1/129",
            "127.0.0.0/",
            "127.0.0.0/255.0.255.0",
            "127.0.0.0/ffff::",
            "::/255.0.0.0",
            "127.0.0.0/24/8",
            "256.0.0.1",
        ] {
            assert!(parse_subnet(text).is_err(), "{text:?} should be rejected");
        }
    }
}
