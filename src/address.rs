// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::Error;

/// Number of bytes in the widest supported address.
pub const MAX_ADDR_BYTES: usize = 16;

/// The address family a table is fixed to for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Inet4,
    Inet6,
}

impl AddressFamily {
    /// Longest prefix length representable in this family.
    pub fn max_len(self) -> u32 {
        match self {
            AddressFamily::Inet4 => 32,
            AddressFamily::Inet6 => 128,
        }
    }

    /// Size of a binary address in this family.
    pub fn addr_bytes(self) -> usize {
        match self {
            AddressFamily::Inet4 => 4,
            AddressFamily::Inet6 => 16,
        }
    }
}

/// Maps IP version numbers (4 or 6) to a family.
impl TryFrom<u8> for AddressFamily {
    type Error = Error;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            4 => Ok(AddressFamily::Inet4),
            6 => Ok(AddressFamily::Inet6),
            _ => Err(Error::InvalidArgument("address family must be 4 or 6")),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::Inet4 => f.write_str("IPv4"),
            AddressFamily::Inet6 => f.write_str("IPv6"),
        }
    }
}

/// Canonical key bytes of a prefix: the address with every bit past
/// `prefix_len` cleared. Only the first `addr.len()` bytes are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Prefix {
    bytes: [u8; MAX_ADDR_BYTES],
    len: usize,
}

impl Prefix {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Prefix {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Masks `addr` to its first `prefix_len` bits.
///
/// Applying it twice gives the same result as applying it once. `addr` must be
/// at most 16 bytes long and `prefix_len` is clamped to the address width.
pub fn canonicalize(addr: &[u8], prefix_len: u32) -> Prefix {
    debug_assert!(addr.len() <= MAX_ADDR_BYTES);
    let mut bytes = [0u8; MAX_ADDR_BYTES];
    let wholes = (prefix_len / 8) as usize;
    let remainder = prefix_len % 8;

    if wholes >= addr.len() {
        bytes[..addr.len()].copy_from_slice(addr);
    } else {
        bytes[..wholes].copy_from_slice(&addr[..wholes]);
        if remainder != 0 {
            bytes[wholes] = addr[wholes] & mask(remainder);
        }
    }

    Prefix {
        bytes,
        len: addr.len(),
    }
}

/// A byte with the first n bits set.
const fn mask(n: u32) -> u8 {
    !(0xff_u8 >> n)
}

/// Address trait provides the conversions the typed lookup table needs.
pub trait Address: Copy {
    type Octets: AsRef<[u8]>;
    /// Family every address of this type belongs to.
    const FAMILY: AddressFamily;
    /// Return the address in network byte order.
    fn octets_be(self) -> Self::Octets;
    /// Rebuild an address from network byte order. `bytes` must be full width.
    fn from_octets_be(bytes: &[u8]) -> Self;
    /// Returns self masked to n bits.
    fn mask(self, masklen: u32) -> Self;
}

impl Address for Ipv4Addr {
    type Octets = [u8; 4];
    const FAMILY: AddressFamily = AddressFamily::Inet4;

    fn octets_be(self) -> Self::Octets {
        self.octets()
    }

    fn from_octets_be(bytes: &[u8]) -> Self {
        let mut octets = [0u8; 4];
        octets.copy_from_slice(&bytes[..4]);
        Ipv4Addr::from(octets)
    }

    fn mask(self, masklen: u32) -> Self {
        debug_assert!(masklen <= 32);
        let ip = u32::from(self);
        let masked = match masklen {
            0 => 0,
            n => ip & (!0 << (32 - n)),
        };
        Ipv4Addr::from(masked)
    }
}

impl Address for Ipv6Addr {
    type Octets = [u8; 16];
    const FAMILY: AddressFamily = AddressFamily::Inet6;

    fn octets_be(self) -> Self::Octets {
        self.octets()
    }

    fn from_octets_be(bytes: &[u8]) -> Self {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(&bytes[..16]);
        Ipv6Addr::from(octets)
    }

    fn mask(self, masklen: u32) -> Self {
        debug_assert!(masklen <= 128);
        let ip = u128::from(self);
        let masked = match masklen {
            0 => 0,
            n => ip & (!0 << (128 - n)),
        };
        Ipv6Addr::from(masked)
    }
}
