// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::address::{Address, AddressFamily, MAX_ADDR_BYTES};
use crate::error::{Error, Result};

/// Longest accepted text: a 45 character IPv6 literal followed by `/128`.
pub const MAX_CIDR_LEN: usize = 45 + 4;

/// An address, as parsed from `addr` or `addr/len` text.
///
/// The address keeps its host bits exactly as written; tables clear them on use.
/// Without a `/len` suffix the prefix is a host route of full width.
///
/// # Example
/// ```
/// use lpm::{AddressFamily, Cidr};
///
/// let cidr: Cidr = "10.1.1.0/24".parse().unwrap();
/// assert_eq!(cidr.family(), AddressFamily::Inet4);
/// assert_eq!(cidr.addr_bytes(), &[10, 1, 1, 0]);
/// assert_eq!(cidr.prefix_len(), 24);
///
/// let host = lpm::Cidr::parse("2001:db8::1").unwrap();
/// assert_eq!(host.prefix_len(), 128);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cidr {
    family: AddressFamily,
    addr: [u8; MAX_ADDR_BYTES],
    prefix_len: u32,
}

impl Cidr {
    /// Parses `<ipv4-or-ipv6>[/<decimal length>]`. IPv6 is tried first.
    pub fn parse(text: &str) -> Result<Cidr> {
        if text.len() > MAX_CIDR_LEN {
            return Err(Error::Parse(text.to_owned()));
        }
        let (addr_text, suffix) = match text.find('/') {
            Some(slash) => (&text[..slash], Some(&text[slash + 1..])),
            None => (text, None),
        };

        let mut addr = [0u8; MAX_ADDR_BYTES];
        let family = if let Ok(ip) = Ipv6Addr::from_str(addr_text) {
            addr.copy_from_slice(&ip.octets());
            AddressFamily::Inet6
        } else if let Ok(ip) = Ipv4Addr::from_str(addr_text) {
            addr[..4].copy_from_slice(&ip.octets());
            AddressFamily::Inet4
        } else {
            return Err(Error::Parse(text.to_owned()));
        };

        let prefix_len = match suffix {
            None => family.max_len(),
            Some(digits) => parse_prefix_len(digits, family.max_len())
                .ok_or_else(|| Error::Parse(text.to_owned()))?,
        };

        Ok(Cidr {
            family,
            addr,
            prefix_len,
        })
    }

    /// Builds a prefix from a typed address.
    pub fn from_addr<A: Address>(ip: A, prefix_len: u32) -> Result<Cidr> {
        if prefix_len > A::FAMILY.max_len() {
            return Err(Error::InvalidArgument("prefix length exceeds the address width"));
        }
        let octets = ip.octets_be();
        let octets = octets.as_ref();
        let mut addr = [0u8; MAX_ADDR_BYTES];
        addr[..octets.len()].copy_from_slice(octets);
        Ok(Cidr {
            family: A::FAMILY,
            addr,
            prefix_len,
        })
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Address in network byte order: 4 bytes for IPv4, 16 for IPv6.
    pub fn addr_bytes(&self) -> &[u8] {
        &self.addr[..self.family.addr_bytes()]
    }

    pub fn prefix_len(&self) -> u32 {
        self.prefix_len
    }

    pub fn ip(&self) -> IpAddr {
        match self.family {
            AddressFamily::Inet4 => IpAddr::V4(Ipv4Addr::from_octets_be(self.addr_bytes())),
            AddressFamily::Inet6 => IpAddr::V6(Ipv6Addr::from_octets_be(self.addr_bytes())),
        }
    }
}

/// Accepts 1 to 3 ASCII digits with a value no greater than `width`.
fn parse_prefix_len(digits: &str, width: u32) -> Option<u32> {
    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let len = digits.parse::<u32>().ok()?;
    if len > width {
        return None;
    }
    Some(len)
}

impl FromStr for Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cidr::parse(s)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ip(), self.prefix_len)
    }
}
