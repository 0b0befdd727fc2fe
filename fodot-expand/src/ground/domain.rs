//! Implements [`Domain`], the finite set of encoded values a ground variable may take.
use either::Either;
use std::{
    convert::TryFrom,
    fmt,
    hash::{Hash, Hasher},
};

const WORD: usize = 64;

/// Is the order in which the values of a domain are tried when branching.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ValueOrder {
    Ascending,
    Descending,
}

impl Default for ValueOrder {
    fn default() -> Self {
        Self::Ascending
    }
}

/// Is a finite set of `i64` values. Dense sets are stored as a bit set over the interval
/// `[offset, offset + capacity)`, sparse sets as a sorted vector.
#[derive(Clone)]
pub struct Domain {
    repr: Repr,
    len: usize,
}

#[derive(Clone)]
enum Repr {
    Bits {
        offset: i64,
        capacity: usize,
        bits: Vec<u64>,
    },
    Sorted(Vec<i64>),
}

// A set is stored as a bit set while its span is at most this many words per value.
const DENSITY: u128 = 2;

impl Domain {
    /// Returns the domain of all values in `[lo, hi]`; empty if `lo > hi`. The caller bounds
    /// the size of the interval: one with more than `usize::MAX` values keeps only its ends.
    pub fn range(lo: i64, hi: i64) -> Self {
        if lo > hi {
            return Self::empty();
        }
        let capacity = match usize::try_from(hi as i128 - lo as i128 + 1) {
            Ok(capacity) => capacity,
            Err(_) => return Self::from_values(vec![lo, hi]),
        };
        let mut bits = vec![u64::MAX; (capacity + WORD - 1) / WORD];
        let tail = capacity % WORD;
        if tail != 0 {
            if let Some(last) = bits.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self {
            repr: Repr::Bits {
                offset: lo,
                capacity,
                bits,
            },
            len: capacity,
        }
    }

    /// Returns the domain of the given values.
    pub fn from_values<I: IntoIterator<Item = i64>>(values: I) -> Self {
        let mut values: Vec<i64> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        let (lo, hi) = match (values.first(), values.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => return Self::empty(),
        };

        let span = (hi as i128 - lo as i128 + 1) as u128;
        let words = (values.len() as u128) * DENSITY + 1;
        if span > words * WORD as u128 {
            let len = values.len();
            return Self {
                repr: Repr::Sorted(values),
                len,
            };
        }

        let mut result = Self::range(lo, hi);
        if let Repr::Bits { bits, .. } = &mut result.repr {
            bits.iter_mut().for_each(|w| *w = 0);
        }
        result.len = 0;
        for v in values {
            result.insert(v);
        }
        result
    }

    pub fn empty() -> Self {
        Self {
            repr: Repr::Sorted(Vec::new()),
            len: 0,
        }
    }

    /// Returns true if the receiver is stored as a sorted vector.
    pub fn is_sparse(&self) -> bool {
        matches!(self.repr, Repr::Sorted(_))
    }

    fn insert(&mut self, value: i64) {
        match &mut self.repr {
            Repr::Bits {
                offset,
                capacity,
                bits,
            } => {
                if let Some(i) = index(*offset, *capacity, value) {
                    if bits[i / WORD] & (1 << (i % WORD)) == 0 {
                        bits[i / WORD] |= 1 << (i % WORD);
                        self.len += 1;
                    }
                }
            }
            Repr::Sorted(values) => {
                if let Err(i) = values.binary_search(&value) {
                    values.insert(i, value);
                    self.len += 1;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: i64) -> bool {
        match &self.repr {
            Repr::Bits {
                offset,
                capacity,
                bits,
            } => index(*offset, *capacity, value).map_or(false, |i| has(bits, i)),
            Repr::Sorted(values) => values.binary_search(&value).is_ok(),
        }
    }

    /// Removes `value` from the receiver and returns true if it was present.
    pub fn remove(&mut self, value: i64) -> bool {
        let removed = match &mut self.repr {
            Repr::Bits {
                offset,
                capacity,
                bits,
            } => match index(*offset, *capacity, value) {
                Some(i) if has(bits, i) => {
                    bits[i / WORD] &= !(1 << (i % WORD));
                    true
                }
                _ => false,
            },
            Repr::Sorted(values) => match values.binary_search(&value) {
                Ok(i) => {
                    values.remove(i);
                    true
                }
                Err(_) => false,
            },
        };
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Keeps only the values for which `f` returns true. Returns true if a value was removed.
    pub fn retain<F: FnMut(i64) -> bool>(&mut self, mut f: F) -> bool {
        let removed: Vec<i64> = self.iter().filter(|v| !f(*v)).collect();
        removed.iter().for_each(|v| {
            self.remove(*v);
        });
        !removed.is_empty()
    }

    /// Reduces the receiver to `{value}`.
    pub fn assign(&mut self, value: i64) {
        self.retain(|v| v == value);
    }

    /// Returns the only value of the receiver if it is a singleton.
    pub fn singleton(&self) -> Option<i64> {
        if self.len == 1 {
            self.min()
        } else {
            None
        }
    }

    pub fn min(&self) -> Option<i64> {
        self.iter().next()
    }

    pub fn max(&self) -> Option<i64> {
        self.iter().next_back()
    }

    /// Returns the values of the receiver in ascending order.
    pub fn iter(&self) -> Values {
        let back = match &self.repr {
            Repr::Bits { capacity, .. } => *capacity,
            Repr::Sorted(values) => values.len(),
        };
        Values {
            domain: self,
            front: 0,
            back,
        }
    }

    /// Returns the values of the receiver in the given order.
    pub fn values(&self, order: ValueOrder) -> impl Iterator<Item = i64> + '_ {
        match order {
            ValueOrder::Ascending => Either::Left(self.iter()),
            ValueOrder::Descending => Either::Right(self.iter().rev()),
        }
    }

    // Returns the value at position `i` of the underlying storage, if present.
    fn at(&self, i: usize) -> Option<i64> {
        match &self.repr {
            Repr::Bits { offset, bits, .. } => {
                if has(bits, i) {
                    Some((*offset as i128 + i as i128) as i64)
                } else {
                    None
                }
            }
            Repr::Sorted(values) => values.get(i).copied(),
        }
    }
}

fn index(offset: i64, capacity: usize, value: i64) -> Option<usize> {
    let index = value as i128 - offset as i128;
    if index >= 0 && index < capacity as i128 {
        Some(index as usize)
    } else {
        None
    }
}

fn has(bits: &[u64], index: usize) -> bool {
    bits[index / WORD] & (1 << (index % WORD)) != 0
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Domain {}

impl Hash for Domain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.iter().for_each(|v| v.hash(state));
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<String> = self.iter().map(|v| v.to_string()).collect();
        write!(f, "{{{}}}", values.join(", "))
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Iterates over the values of a [`Domain`] in ascending order.
pub struct Values<'d> {
    domain: &'d Domain,
    front: usize,
    back: usize,
}

impl<'d> Iterator for Values<'d> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        while self.front < self.back {
            let index = self.front;
            self.front += 1;
            if let Some(value) = self.domain.at(index) {
                return Some(value);
            }
        }
        None
    }
}

impl<'d> DoubleEndedIterator for Values<'d> {
    fn next_back(&mut self) -> Option<i64> {
        while self.front < self.back {
            self.back -= 1;
            if let Some(value) = self.domain.at(self.back) {
                return Some(value);
            }
        }
        None
    }
}
