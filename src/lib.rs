// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

//! # Longest prefix match table for IPv4/IPv6 prefixes
//!
//! This crate provides a datastructure for IP address lookups: given an address,
//! find the value bound to the most specific stored prefix containing it.
//!
//! Prefixes are kept in one hash table per prefix length, keyed by the address
//! with its host bits cleared. A bitmask of populated lengths lets a lookup
//! probe only the lengths that hold entries, longest first, so a lookup costs
//! at most one hash probe per populated length.
//!
//! [`Lpm`] works on binary addresses in network byte order and is fixed to one
//! [`AddressFamily`] at creation. [`IpLookupTable`] wraps it for
//! `std::net` address types. [`Cidr`] parses textual `addr/len` prefixes.
//!
//! The engine does no locking; share it across threads only behind external
//! synchronisation.

mod address;
mod cidr;
mod error;
mod hash;
mod table;

use std::marker::PhantomData;
use std::net::{Ipv4Addr, Ipv6Addr};

pub use address::{canonicalize, Address, AddressFamily, Prefix};
pub use cidr::{Cidr, MAX_CIDR_LEN};
pub use error::{Error, Result};
pub use table::Lpm;

///The operations defined on the lookup table.
pub trait IpLookupTableOps<Addr, T> {
    /// Insert a value for the prefix designated by ip and masklen. If prefix existed previously, the old value is returned.
    /// Fails if masklen is longer than the address.
    /// # Example
    /// ```
    /// use lpm::{IpLookupTable, IpLookupTableOps};
    /// use std::net::Ipv6Addr;
    ///
    /// let mut table: IpLookupTable<Ipv6Addr,&str> = IpLookupTable::new();
    /// let prefix = Ipv6Addr::new(0x2001, 0xdb8, 0xdead, 0xbeef, 0, 0, 0, 0);
    /// let masklen = 32;
    ///
    /// assert_eq!(table.insert(prefix, masklen, "foo"), Ok(None));
    /// // Insert duplicate
    /// assert_eq!(table.insert(prefix, masklen, "bar"), Ok(Some("foo")));
    /// // Too long
    /// assert!(table.insert(prefix, 129, "baz").is_err());
    /// ```
    fn insert(&mut self, ip: Addr, masklen: u32, value: T) -> Result<Option<T>>;

    /// Remove an entry from the lookup table. If the prefix existed previously, the value is returned.
    /// # Example
    /// ```
    /// use lpm::{IpLookupTable, IpLookupTableOps};
    /// use std::net::Ipv6Addr;
    ///
    /// let mut table: IpLookupTable<Ipv6Addr,&str> = IpLookupTable::new();
    /// let prefix = Ipv6Addr::new(0x2001, 0xdb8, 0xdead, 0xbeef, 0, 0, 0, 0);
    /// let masklen = 32;
    /// table.insert(prefix, masklen, "foo").unwrap();
    ///
    /// assert_eq!(table.remove(prefix, masklen), Some("foo"));
    /// // Remove non-existant
    /// assert_eq!(table.remove(prefix, masklen), None);
    /// ```
    fn remove(&mut self, ip: Addr, masklen: u32) -> Option<T>;

    /// Perform exact match lookup of ```ip```/```masklen``` and return the value.
    /// # Example
    /// ```
    /// use lpm::{IpLookupTable, IpLookupTableOps};
    /// use std::net::Ipv6Addr;
    ///
    /// let mut table: IpLookupTable<Ipv6Addr,&str> = IpLookupTable::new();
    /// let prefix = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0);
    /// let masklen = 32;
    /// table.insert(prefix, masklen, "foo").unwrap();
    ///
    /// assert_eq!(table.exact_match(prefix, masklen), Some(&"foo"));
    /// // differing mask
    /// assert_eq!(table.exact_match(prefix, 48), None);
    /// ```
    fn exact_match(&self, ip: Addr, masklen: u32) -> Option<&T>;

    /// Perform longest match lookup of ```ip``` and return the best matching prefix, designated by ip, masklen, along with its value.
    /// # Example
    /// ```
    /// use lpm::{IpLookupTable, IpLookupTableOps};
    /// use std::net::Ipv6Addr;
    ///
    /// let mut table: IpLookupTable<Ipv6Addr,&str> = IpLookupTable::new();
    /// let less_specific = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0);
    /// let more_specific = Ipv6Addr::new(0x2001, 0xdb8, 0xdead, 0, 0, 0, 0, 0);
    /// table.insert(less_specific, 32, "foo").unwrap();
    /// table.insert(more_specific, 48, "bar").unwrap();
    ///
    /// let lookupip = Ipv6Addr::new(0x2001, 0xdb8, 0xdead, 0xbeef, 0xcafe, 0xbabe, 0, 1);
    /// let result = table.longest_match(lookupip);
    /// assert_eq!(result, Some((more_specific, 48, &"bar")));
    ///
    /// let lookupip = Ipv6Addr::new(0x2001, 0xdb8, 0xcafe, 0xf00, 0xf00, 0xf00, 0, 1);
    /// let result = table.longest_match(lookupip);
    /// assert_eq!(result, Some((less_specific, 32, &"foo")));
    /// ```
    fn longest_match(&self, ip: Addr) -> Option<(Addr, u32, &T)>;
}

/// An IP lookup table typed by its address.
pub struct IpLookupTable<A, T> {
    inner: Lpm<T>,
    _addrtype: PhantomData<A>,
}

impl<A: Address, T> IpLookupTable<A, T> {
    /// Initialize an empty lookup table.
    pub fn new() -> Self {
        IpLookupTable {
            inner: Lpm::new(A::FAMILY),
            _addrtype: PhantomData,
        }
    }

    /// Number of stored prefixes, a default route included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Empties the table, handing each prefix and its value to `destructor`.
    pub fn clear<F>(&mut self, mut destructor: F)
    where
        F: FnMut(A, u32, T),
    {
        self.inner
            .clear(|key, masklen, value| destructor(A::from_octets_be(key), masklen, value));
    }

    /// Iterator over every stored prefix: the default first, then by ascending length.
    pub fn iter(&self) -> impl Iterator<Item = (A, u32, &T)> {
        self.inner
            .iter()
            .map(|(key, masklen, value)| (A::from_octets_be(key), masklen, value))
    }

    /// The underlying byte-oriented table.
    pub fn as_lpm(&self) -> &Lpm<T> {
        &self.inner
    }
}

impl<A: Address, T> Default for IpLookupTable<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_ops {
    ($addr_type:ty) => {
        impl<T: Sized> IpLookupTableOps<$addr_type, T> for IpLookupTable<$addr_type, T> {

            fn insert(&mut self, ip: $addr_type, masklen: u32, value: T) -> Result<Option<T>> {
                self.inner.insert(&ip.octets(), masklen, value)
            }

            fn remove(&mut self, ip: $addr_type, masklen: u32) -> Option<T> {
                self.inner.remove(&ip.octets(), masklen).ok().flatten()
            }

            fn exact_match(&self, ip: $addr_type, masklen: u32) -> Option<&T> {
                self.inner.lookup_exact(&ip.octets(), masklen).ok().flatten()
            }

            fn longest_match(&self, ip: $addr_type) -> Option<($addr_type, u32, &T)> {
                match self.inner.longest_match_unchecked(&ip.octets()) {
                    Some((bits_matched, value)) => Some((ip.mask(bits_matched), bits_matched, value)),
                    None => None
                }
            }
        }
    }
}

impl_ops!(Ipv4Addr);
impl_ops!(Ipv6Addr);
