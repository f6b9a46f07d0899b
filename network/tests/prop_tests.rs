use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use ember_network::{parse_subnet, BanList, NetworkError};
use ember_nullables::NullClock;
use proptest::prelude::*;

proptest! {
    /// Once a subnet is banned, no host or narrower subnet inside it can be
    /// added, and every address inside it reports as banned.
    #[test]
    fn banned_range_covers_its_members(
        base in any::<u32>(),
        prefix in 8u8..=32,
        host in any::<u32>(),
        narrower in 0u8..=24,
    ) {
        let bans = BanList::new(Arc::new(NullClock::new(1_000)));
        let net = parse_subnet(&format!("{}/{prefix}", Ipv4Addr::from(base))).expect("subnet");
        bans.add(net, 0, false).expect("first add");

        let mask = u32::MAX << (32 - u32::from(prefix));
        let member = Ipv4Addr::from((base & mask) | (host & !mask));
        prop_assert!(bans.is_banned(IpAddr::V4(member)));

        let inner_prefix = (prefix + narrower).min(32);
        let inner = parse_subnet(&format!("{member}/{inner_prefix}")).expect("subnet");
        prop_assert!(matches!(bans.add(inner, 0, false), Err(NetworkError::AlreadyBanned(_))));
    }

    /// Canonical text parses back to the same network.
    #[test]
    fn canonical_text_is_stable(base in any::<u32>(), prefix in 0u8..=32) {
        let net = parse_subnet(&format!("{}/{prefix}", Ipv4Addr::from(base))).expect("subnet");
        prop_assert_eq!(parse_subnet(&net.to_string()).expect("reparse"), net);
    }
}
