// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

use log::trace;

use crate::address::Prefix;
use crate::error::Result;
use crate::hash::fnv1a;

/// Headroom, in entries, the bucket array keeps above the item count.
pub const HASH_STEP: usize = 8;

#[derive(Debug)]
struct Entry<T> {
    key: Prefix,
    value: T,
    next: Option<u32>,
}

/// Chained hash map from canonical prefix bytes to values, one per prefix length.
///
/// Entries live in `slots`; vacated slots are recycled through `freelist`.
/// `buckets` holds the slot index of each chain head and is always empty or a
/// power of two long. It grows but never shrinks, except on `clear`.
#[derive(Debug)]
pub struct PrefixMap<T> {
    buckets: Vec<Option<u32>>,
    slots: Vec<Option<Entry<T>>>,
    freelist: Vec<u32>,
    nitems: usize,
}

impl<T> Default for PrefixMap<T> {
    fn default() -> Self {
        PrefixMap {
            buckets: Vec::new(),
            slots: Vec::new(),
            freelist: Vec::new(),
            nitems: 0,
        }
    }
}

impl<T> PrefixMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nitems
    }

    pub fn is_empty(&self) -> bool {
        self.nitems == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_index(key: &[u8], hashsize: usize) -> usize {
        debug_assert!(hashsize.is_power_of_two());
        fnv1a(key) as usize & (hashsize - 1)
    }

    fn find(&self, key: &[u8]) -> Option<u32> {
        if self.buckets.is_empty() {
            return None;
        }
        let mut cur = self.buckets[Self::bucket_index(key, self.buckets.len())];
        while let Some(idx) = cur {
            let entry = self.slots[idx as usize].as_ref()?;
            if entry.key.as_bytes() == key {
                return Some(idx);
            }
            cur = entry.next;
        }
        None
    }

    pub fn get(&self, key: &[u8]) -> Option<&T> {
        let idx = self.find(key)?;
        self.slots[idx as usize].as_ref().map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut T> {
        let idx = self.find(key)?;
        self.slots[idx as usize].as_mut().map(|e| &mut e.value)
    }

    /// Rebuilds the bucket array with at least `size` buckets, relinking every
    /// entry by its hash. On allocation failure the map is left untouched.
    fn rehash(&mut self, size: usize) -> Result<()> {
        let hashsize = size.next_power_of_two();
        let mut buckets: Vec<Option<u32>> = Vec::new();
        buckets.try_reserve_exact(hashsize)?;
        buckets.resize(hashsize, None);

        for head in self.buckets.iter() {
            let mut cur = *head;
            while let Some(idx) = cur {
                let entry = match self.slots[idx as usize].as_mut() {
                    Some(entry) => entry,
                    None => break,
                };
                cur = entry.next;
                let i = Self::bucket_index(entry.key.as_bytes(), hashsize);
                entry.next = buckets[i];
                buckets[i] = Some(idx);
            }
        }

        trace!("rehash: {} -> {} buckets, {} items", self.buckets.len(), hashsize, self.nitems);
        self.buckets = buckets;
        Ok(())
    }

    /// Links a new entry at the head of its chain.
    ///
    /// Does not deduplicate: the caller checks for an existing key first.
    /// Every allocation happens before the map is modified, so a failure
    /// leaves it as it was.
    pub fn insert(&mut self, key: Prefix, value: T) -> Result<()> {
        if self.freelist.is_empty() {
            self.slots.try_reserve(1)?;
            let wanted = self.slots.len() + 1 - self.freelist.len();
            self.freelist.try_reserve(wanted)?;
        }
        let target = self.nitems + HASH_STEP;
        if self.buckets.len() < target {
            self.rehash(target)?;
        }

        let i = Self::bucket_index(key.as_bytes(), self.buckets.len());
        let entry = Entry {
            key,
            value,
            next: self.buckets[i],
        };
        let idx = match self.freelist.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                (self.slots.len() - 1) as u32
            }
        };
        self.buckets[i] = Some(idx);
        self.nitems += 1;
        Ok(())
    }

    /// Unlinks the entry for `key` and returns its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<T> {
        if self.buckets.is_empty() {
            return None;
        }
        let b = Self::bucket_index(key, self.buckets.len());
        let mut prev: Option<u32> = None;
        let mut cur = self.buckets[b];

        while let Some(idx) = cur {
            let entry = self.slots[idx as usize].as_ref()?;
            let next = entry.next;
            if entry.key.as_bytes() == key {
                match prev {
                    None => self.buckets[b] = next,
                    Some(p) => {
                        if let Some(prev_entry) = self.slots[p as usize].as_mut() {
                            prev_entry.next = next;
                        }
                    }
                }
                let removed = self.slots[idx as usize].take()?;
                self.freelist.push(idx);
                self.nitems -= 1;
                return Some(removed.value);
            }
            prev = cur;
            cur = next;
        }
        None
    }

    /// Hands every entry to `destructor` exactly once, then releases all storage.
    pub fn clear<F>(&mut self, mut destructor: F)
    where
        F: FnMut(&[u8], T),
    {
        for b in 0..self.buckets.len() {
            let mut cur = self.buckets[b].take();
            while let Some(idx) = cur {
                match self.slots[idx as usize].take() {
                    Some(entry) => {
                        cur = entry.next;
                        destructor(entry.key.as_bytes(), entry.value);
                    }
                    None => break,
                }
            }
        }
        self.buckets = Vec::new();
        self.slots = Vec::new();
        self.freelist = Vec::new();
        self.nitems = 0;
    }

    /// Visits entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &T)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|e| (e.key.as_bytes(), &e.value)))
    }
}
