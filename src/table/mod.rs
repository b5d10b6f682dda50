// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

use std::mem;

use log::{debug, trace};

use crate::address::{canonicalize, AddressFamily, MAX_ADDR_BYTES};
use crate::cidr::Cidr;
use crate::error::{Error, Result};

mod prefix_map;
mod tier_mask;

use self::prefix_map::PrefixMap;
use self::tier_mask::TierMask;

static ZERO_KEY: [u8; MAX_ADDR_BYTES] = [0; MAX_ADDR_BYTES];

/// Longest prefix match table over binary, network byte order addresses.
///
/// Prefixes of each length live in their own hash map, keyed by the canonical
/// (host bits cleared) address. A bitmask of populated lengths lets lookups
/// probe only tiers that hold entries, longest first. The zero-length prefix is
/// kept apart as the table default.
///
/// Values are never inspected. Whenever an operation displaces or removes a
/// value it is handed back exactly once, either as a return value or through
/// the destructor given to [`clear`](Lpm::clear).
///
/// # Example
/// ```
/// use lpm::{AddressFamily, Lpm};
///
/// let mut table = Lpm::new(AddressFamily::Inet4);
/// table.insert(&[10, 1, 1, 0], 24, "office").unwrap();
/// table.insert(&[0, 0, 0, 0], 0, "upstream").unwrap();
///
/// assert_eq!(table.lookup(&[10, 1, 1, 64]).unwrap(), Some(&"office"));
/// assert_eq!(table.lookup(&[192, 0, 2, 1]).unwrap(), Some(&"upstream"));
/// ```
#[derive(Debug)]
pub struct Lpm<T> {
    family: AddressFamily,
    default: Option<T>,
    tiers: TierMask,
    /// `prefix[L - 1]` holds prefixes of length `L`.
    prefix: Vec<PrefixMap<T>>,
}

impl<T> Lpm<T> {
    /// Creates an empty table for `family`.
    pub fn new(family: AddressFamily) -> Self {
        let max_len = family.max_len() as usize;
        let mut prefix = Vec::with_capacity(max_len);
        prefix.resize_with(max_len, PrefixMap::new);
        debug!("created {} lpm table with {} tiers", family, max_len);
        Lpm {
            family,
            default: None,
            tiers: TierMask::new(),
            prefix,
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Number of stored prefixes, the default included.
    pub fn len(&self) -> usize {
        let default = if self.default.is_some() { 1 } else { 0 };
        default + self.prefix.iter().map(PrefixMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.tiers.is_empty()
    }

    fn check_addr(&self, addr: &[u8]) -> Result<()> {
        if addr.len() != self.family.addr_bytes() {
            return Err(Error::InvalidArgument("address length does not match the table family"));
        }
        Ok(())
    }

    fn check_prefix_len(&self, prefix_len: u32) -> Result<()> {
        if prefix_len > self.family.max_len() {
            return Err(Error::InvalidArgument("prefix length exceeds the address width"));
        }
        Ok(())
    }

    /// Binds `value` to `addr/prefix_len`. Host bits of `addr` are ignored.
    ///
    /// Returns the value previously bound to the same prefix, if any. A zero
    /// length sets the table default. On error the table is unchanged.
    pub fn insert(&mut self, addr: &[u8], prefix_len: u32, value: T) -> Result<Option<T>> {
        self.check_addr(addr)?;
        self.check_prefix_len(prefix_len)?;
        self.insert_unchecked(addr, prefix_len, value)
    }

    pub(crate) fn insert_unchecked(&mut self, addr: &[u8], prefix_len: u32, value: T) -> Result<Option<T>> {
        if prefix_len == 0 {
            return Ok(mem::replace(&mut self.default, Some(value)));
        }
        let key = canonicalize(addr, prefix_len);
        let map = &mut self.prefix[prefix_len as usize - 1];

        if let Some(existing) = map.get_mut(key.as_bytes()) {
            return Ok(Some(mem::replace(existing, value)));
        }
        map.insert(key, value)?;
        if !self.tiers.contains(prefix_len) {
            trace!("tier /{} populated", prefix_len);
            self.tiers.set(prefix_len);
        }
        Ok(None)
    }

    /// Exact match on `addr/prefix_len`, ignoring every other length.
    pub fn lookup_exact(&self, addr: &[u8], prefix_len: u32) -> Result<Option<&T>> {
        self.check_addr(addr)?;
        self.check_prefix_len(prefix_len)?;
        Ok(self.lookup_exact_unchecked(addr, prefix_len))
    }

    pub(crate) fn lookup_exact_unchecked(&self, addr: &[u8], prefix_len: u32) -> Option<&T> {
        if prefix_len == 0 {
            return self.default.as_ref();
        }
        if !self.tiers.contains(prefix_len) {
            return None;
        }
        let key = canonicalize(addr, prefix_len);
        self.prefix[prefix_len as usize - 1].get(key.as_bytes())
    }

    /// Longest prefix match of `addr`, falling back to the default.
    pub fn lookup(&self, addr: &[u8]) -> Result<Option<&T>> {
        Ok(self.longest_match(addr)?.map(|(_, value)| value))
    }

    /// Longest prefix match of `addr`, returning the matched length with the value.
    /// A match on the default reports length 0.
    pub fn longest_match(&self, addr: &[u8]) -> Result<Option<(u32, &T)>> {
        self.check_addr(addr)?;
        Ok(self.longest_match_unchecked(addr))
    }

    pub(crate) fn longest_match_unchecked(&self, addr: &[u8]) -> Option<(u32, &T)> {
        for prefix_len in self.tiers.iter_longest_first() {
            let key = canonicalize(addr, prefix_len);
            if let Some(value) = self.prefix[prefix_len as usize - 1].get(key.as_bytes()) {
                return Some((prefix_len, value));
            }
        }
        self.default.as_ref().map(|value| (0, value))
    }

    /// Removes the value bound to `addr/prefix_len` and returns it.
    pub fn remove(&mut self, addr: &[u8], prefix_len: u32) -> Result<Option<T>> {
        self.check_addr(addr)?;
        self.check_prefix_len(prefix_len)?;
        Ok(self.remove_unchecked(addr, prefix_len))
    }

    pub(crate) fn remove_unchecked(&mut self, addr: &[u8], prefix_len: u32) -> Option<T> {
        if prefix_len == 0 {
            return self.default.take();
        }
        let key = canonicalize(addr, prefix_len);
        let map = &mut self.prefix[prefix_len as usize - 1];
        let removed = map.remove(key.as_bytes())?;
        if map.is_empty() {
            trace!("tier /{} emptied", prefix_len);
            self.tiers.unset(prefix_len);
        }
        Some(removed)
    }

    /// Empties the table, handing every stored value to `destructor` together
    /// with its canonical key and prefix length. The default is reported with
    /// length 0 and an all-zero key. Clearing an empty table does nothing.
    pub fn clear<F>(&mut self, mut destructor: F)
    where
        F: FnMut(&[u8], u32, T),
    {
        debug!("clearing {} lpm table with {} entries", self.family, self.len());
        let addr_bytes = self.family.addr_bytes();
        for (i, map) in self.prefix.iter_mut().enumerate() {
            if map.is_empty() && map.capacity() == 0 {
                continue;
            }
            let prefix_len = i as u32 + 1;
            map.clear(|key, value| destructor(key, prefix_len, value));
        }
        if let Some(value) = self.default.take() {
            destructor(&ZERO_KEY[..addr_bytes], 0, value);
        }
        self.tiers.clear();
    }

    /// Visits every stored prefix as `(canonical key, prefix length, value)`:
    /// the default first, then by ascending length.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u32, &T)> {
        let zero = &ZERO_KEY[..self.family.addr_bytes()];
        let default = self.default.iter().map(move |value| (zero, 0, value));
        let tiers = self.prefix.iter().enumerate().flat_map(|(i, map)| {
            let prefix_len = i as u32 + 1;
            map.iter().map(move |(key, value)| (key, prefix_len, value))
        });
        default.chain(tiers)
    }

    /// Parses `cidr` and binds `value` to it. The prefix must belong to the
    /// table's family.
    pub fn insert_cidr(&mut self, cidr: &str, value: T) -> Result<Option<T>> {
        let cidr = self.parse_for_table(cidr)?;
        self.insert_unchecked(cidr.addr_bytes(), cidr.prefix_len(), value)
    }

    /// Parses `cidr` and removes the value bound to exactly that prefix.
    pub fn remove_cidr(&mut self, cidr: &str) -> Result<Option<T>> {
        let cidr = self.parse_for_table(cidr)?;
        Ok(self.remove_unchecked(cidr.addr_bytes(), cidr.prefix_len()))
    }

    /// Parses `addr` and performs a longest prefix match. Any `/len` suffix is
    /// ignored for the match.
    pub fn lookup_str(&self, addr: &str) -> Result<Option<&T>> {
        let cidr = self.parse_for_table(addr)?;
        Ok(self.longest_match_unchecked(cidr.addr_bytes()).map(|(_, value)| value))
    }

    fn parse_for_table(&self, text: &str) -> Result<Cidr> {
        let cidr = Cidr::parse(text)?;
        if cidr.family() != self.family {
            return Err(Error::FamilyMismatch {
                expected: self.family,
                found: cidr.family(),
            });
        }
        Ok(cidr)
    }
}
