//! Property tests for the LPM table against a reference model.
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use lpm::{canonicalize, AddressFamily, Cidr, Lpm};
use proptest::prelude::*;

/// Reference `HashMap` implementation for LPM over any address width.
struct HashMapLpm {
    map: HashMap<(Vec<u8>, u32), u32>,
    max_len: u32,
}

impl HashMapLpm {
    fn new(max_len: u32) -> Self {
        HashMapLpm { map: HashMap::new(), max_len }
    }

    fn insert(&mut self, addr: &[u8], len: u32, value: u32) -> Option<u32> {
        let key = canonicalize(addr, len).as_bytes().to_vec();
        self.map.insert((key, len), value)
    }

    fn lookup(&self, addr: &[u8]) -> Option<u32> {
        // Check all prefix lengths starting with the longest.
        for len in (0..=self.max_len).rev() {
            let key = canonicalize(addr, len).as_bytes().to_vec();
            if let Some(value) = self.map.get(&(key, len)) {
                return Some(*value);
            }
        }
        None
    }
}

fn ipv4_prefix_strategy() -> impl Strategy<Value = ([u8; 4], u32)> {
    (any::<u32>(), 0u32..=32).prop_map(|(addr, len)| (addr.to_be_bytes(), len))
}

fn ipv6_prefix_strategy() -> impl Strategy<Value = ([u8; 16], u32)> {
    // keep the top bits narrow so lookups hit stored prefixes
    (any::<u8>(), any::<u128>(), 0u32..=128).prop_map(|(top, rest, len)| {
        let mut bytes = rest.to_be_bytes();
        bytes[0] = 0x20;
        bytes[1] = top & 0x03;
        (bytes, len)
    })
}

proptest! {
    #[test]
    fn canonicalize_is_idempotent(addr in any::<u128>(), len in 0u32..=128) {
        let bytes = addr.to_be_bytes();
        let once = canonicalize(&bytes, len);
        let twice = canonicalize(once.as_bytes(), len);
        prop_assert_eq!(once, twice);
        let expected = Ipv6Addr::from(addr & mask128(len)).octets();
        prop_assert_eq!(once.as_bytes(), &expected[..]);
    }

    #[test]
    fn ipv4_matches_reference_model(
        prefixes in prop::collection::vec((ipv4_prefix_strategy(), any::<u32>()), 0..=50),
        lookups in prop::collection::vec(any::<u32>(), 1..=20)
    ) {
        let mut table = Lpm::new(AddressFamily::Inet4);
        let mut reference = HashMapLpm::new(32);

        for ((addr, len), value) in &prefixes {
            let displaced = table.insert(addr, *len, *value).unwrap();
            prop_assert_eq!(displaced, reference.insert(addr, *len, *value));
        }

        // lookups inside stored prefixes as well as arbitrary ones
        let inside = prefixes.iter().map(|((addr, _), _)| *addr);
        for addr in lookups.iter().map(|a| a.to_be_bytes()).chain(inside) {
            let found = table.lookup(&addr).unwrap().copied();
            prop_assert_eq!(found, reference.lookup(&addr), "mismatch for {}", Ipv4Addr::from(addr));
        }
    }

    #[test]
    fn ipv6_matches_reference_model(
        prefixes in prop::collection::vec((ipv6_prefix_strategy(), any::<u32>()), 0..=50),
        lookups in prop::collection::vec(ipv6_prefix_strategy(), 1..=20)
    ) {
        let mut table = Lpm::new(AddressFamily::Inet6);
        let mut reference = HashMapLpm::new(128);

        for ((addr, len), value) in &prefixes {
            let displaced = table.insert(addr, *len, *value).unwrap();
            prop_assert_eq!(displaced, reference.insert(addr, *len, *value));
        }

        let inside = prefixes.iter().map(|((addr, _), _)| *addr);
        for addr in lookups.iter().map(|(addr, _)| *addr).chain(inside) {
            let found = table.lookup(&addr).unwrap().copied();
            prop_assert_eq!(found, reference.lookup(&addr), "mismatch for {}", Ipv6Addr::from(addr));
        }
    }

    #[test]
    fn longer_prefix_wins(addr in any::<u32>(), short in 0u32..32, extra in 1u32..=32) {
        let long = (short + extra).min(32);
        prop_assume!(long > short);
        let addr = addr.to_be_bytes();

        let mut table = Lpm::new(AddressFamily::Inet4);
        table.insert(&addr, short, "short").unwrap();
        table.insert(&addr, long, "long").unwrap();
        prop_assert_eq!(table.longest_match(&addr).unwrap(), Some((long, &"long")));

        table.remove(&addr, long).unwrap();
        prop_assert_eq!(table.longest_match(&addr).unwrap(), Some((short, &"short")));
    }

    #[test]
    fn clear_hands_back_each_value_once(
        prefixes in prop::collection::vec(ipv4_prefix_strategy(), 0..=64)
    ) {
        let mut table = Lpm::new(AddressFamily::Inet4);
        let mut live = HashMap::new();
        for (i, (addr, len)) in prefixes.iter().enumerate() {
            let key = (canonicalize(addr, *len).as_bytes().to_vec(), *len);
            let displaced = table.insert(addr, *len, i).unwrap();
            prop_assert_eq!(displaced, live.insert(key, i));
        }
        prop_assert_eq!(table.len(), live.len());

        let mut cleared = HashMap::new();
        table.clear(|key, len, value| {
            assert!(cleared.insert((key.to_vec(), len), value).is_none());
        });
        prop_assert_eq!(cleared, live);
        for (addr, _) in &prefixes {
            prop_assert_eq!(table.lookup(addr).unwrap(), None);
        }
    }

    #[test]
    fn parsed_prefixes_round_trip(addr in any::<u32>(), len in 0u32..=32) {
        let text = format!("{}/{}", Ipv4Addr::from(addr), len);
        let cidr: Cidr = text.parse().unwrap();
        let expected = addr.to_be_bytes();
        prop_assert_eq!(cidr.addr_bytes(), &expected[..]);
        prop_assert_eq!(cidr.prefix_len(), len);
        prop_assert_eq!(cidr.to_string(), text);
    }
}

fn mask128(len: u32) -> u128 {
    if len == 0 {
        0
    } else {
        !0u128 << (128 - len)
    }
}
