//! One contiguous allocation subdivided into a fixed-stride region per field.
//!
//! Region `f` occupies `data[f.index() * capacity .. (f.index() + 1) * capacity]`.
//! Regions never overlap, and the only way to get simultaneous read and write
//! access is [`Arena::split_derived`], which hands out every region *before*
//! the written ones as read-only and the written ones as mutable.

use crate::domain::Field;

#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    data: Vec<f64>,
    capacity: usize,
}

impl Arena {
    /// Zero-filled arena holding `capacity` values per field.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity * Field::COUNT],
            capacity,
        }
    }

    /// Like [`Arena::new`], but `None` when `capacity` values per field cannot
    /// be allocated.
    pub fn try_new(capacity: usize) -> Option<Self> {
        let total = capacity.checked_mul(Field::COUNT)?;
        let mut data = Vec::new();
        data.try_reserve_exact(total).ok()?;
        data.resize(total, 0.0);
        Some(Self { data, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn offset(&self, field: Field) -> usize {
        field.index() * self.capacity
    }

    /// Full `capacity`-long region of `field`.
    #[inline]
    pub fn region(&self, field: Field) -> &[f64] {
        let start = self.offset(field);
        &self.data[start..start + self.capacity]
    }

    #[inline]
    pub fn region_mut(&mut self, field: Field) -> &mut [f64] {
        let start = self.offset(field);
        let cap = self.capacity;
        &mut self.data[start..start + cap]
    }

    /// Reallocate with `new_capacity` per field, keeping the first `len`
    /// values of every region.
    pub fn grow(&mut self, new_capacity: usize, len: usize) {
        assert!(new_capacity >= len, "arena cannot shrink below its populated length");
        let mut data = vec![0.0; new_capacity * Field::COUNT];
        for field in Field::ALL {
            let from = self.offset(field);
            let to = field.index() * new_capacity;
            data[to..to + len].copy_from_slice(&self.data[from..from + len]);
        }
        self.data = data;
        self.capacity = new_capacity;
    }

    /// Read access to every field before `first`, write access to the
    /// `count` regions starting at `first`. Both views are cut to `len`.
    pub fn split_derived(
        &mut self,
        first: Field,
        count: usize,
        len: usize,
    ) -> (Columns<'_>, DerivedMut<'_>) {
        assert!(len <= self.capacity, "length {len} exceeds capacity {}", self.capacity);
        assert!(
            first.index() + count <= Field::COUNT,
            "{count} regions from {first} run past the arena"
        );
        let cap = self.capacity;
        let start = self.offset(first);
        let (before, rest) = self.data.split_at_mut(start);
        let (out, _) = rest.split_at_mut(count * cap);
        (
            Columns {
                data: before,
                capacity: cap,
                readable: first.index(),
                len,
            },
            DerivedMut {
                data: out,
                capacity: cap,
                count,
                len,
            },
        )
    }
}

/// Read-only, bounds-checked view of the regions preceding a write target.
#[derive(Debug, Clone, Copy)]
pub struct Columns<'a> {
    data: &'a [f64],
    capacity: usize,
    readable: usize,
    len: usize,
}

impl<'a> Columns<'a> {
    /// Populated values of `field`.
    ///
    /// Panics if `field` is not before the write target.
    #[inline]
    pub fn get(&self, field: Field) -> &'a [f64] {
        assert!(
            field.index() < self.readable,
            "{field} is not readable while writing from region {}",
            self.readable
        );
        let start = field.index() * self.capacity;
        &self.data[start..start + self.len]
    }
}

/// Mutable view of `count` adjacent regions, each cut to the populated length.
#[derive(Debug)]
pub struct DerivedMut<'a> {
    data: &'a mut [f64],
    capacity: usize,
    count: usize,
    len: usize,
}

impl<'a> DerivedMut<'a> {
    pub fn single(self) -> &'a mut [f64] {
        assert_eq!(self.count, 1, "single() on a {}-region view", self.count);
        &mut self.data[..self.len]
    }

    pub fn triple(self) -> [&'a mut [f64]; 3] {
        assert_eq!(self.count, 3, "triple() on a {}-region view", self.count);
        let (first, rest) = self.data.split_at_mut(self.capacity);
        let (second, third) = rest.split_at_mut(self.capacity);
        [
            &mut first[..self.len],
            &mut second[..self.len],
            &mut third[..self.len],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_are_disjoint_and_strided() {
        let mut arena = Arena::new(4);
        arena.region_mut(Field::Close)[3] = 7.0;
        arena.region_mut(Field::Volume)[0] = 9.0;
        assert_eq!(arena.region(Field::Close), &[0.0, 0.0, 0.0, 7.0]);
        assert_eq!(arena.region(Field::Volume), &[9.0, 0.0, 0.0, 0.0]);
        assert_eq!(arena.region(Field::Mfi).len(), 4);
    }

    #[test]
    fn try_new_rejects_unallocatable_sizes() {
        assert!(Arena::try_new(usize::MAX).is_none());
        assert!(Arena::try_new(usize::MAX / Field::COUNT).is_none());
        let arena = Arena::try_new(3).unwrap();
        assert_eq!(arena, Arena::new(3));
    }

    #[test]
    fn grow_preserves_populated_prefix() {
        let mut arena = Arena::new(2);
        for field in Field::ALL {
            let region = arena.region_mut(field);
            region[0] = field.index() as f64;
            region[1] = field.index() as f64 + 0.5;
        }
        arena.grow(5, 2);
        assert_eq!(arena.capacity(), 5);
        for field in Field::ALL {
            let i = field.index() as f64;
            assert_eq!(arena.region(field), &[i, i + 0.5, 0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn split_derived_reads_before_and_writes_target() {
        let mut arena = Arena::new(3);
        arena.region_mut(Field::High).copy_from_slice(&[4.0, 5.0, 6.0]);
        arena.region_mut(Field::Low).copy_from_slice(&[2.0, 3.0, 4.0]);
        let (cols, out) = arena.split_derived(Field::Hl2, 1, 2);
        let (high, low) = (cols.get(Field::High), cols.get(Field::Low));
        let out = out.single();
        assert_eq!(out.len(), 2);
        for i in 0..out.len() {
            out[i] = (high[i] + low[i]) / 2.0;
        }
        assert_eq!(arena.region(Field::Hl2), &[3.0, 4.0, 0.0]);
    }

    #[test]
    fn triple_splits_adjacent_regions() {
        let mut arena = Arena::new(2);
        let (_, out) = arena.split_derived(Field::Hlc3Avg, 3, 2);
        let [avg, upper, lower] = out.triple();
        avg[1] = 1.0;
        upper[1] = 2.0;
        lower[1] = 3.0;
        assert_eq!(arena.region(Field::Hlc3Avg), &[0.0, 1.0]);
        assert_eq!(arena.region(Field::Hlc3Upper), &[0.0, 2.0]);
        assert_eq!(arena.region(Field::Hlc3Lower), &[0.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "not readable")]
    fn reading_the_write_target_panics() {
        let mut arena = Arena::new(2);
        let (cols, _out) = arena.split_derived(Field::Rsi, 1, 2);
        let _ = cols.get(Field::Rsi);
    }
}
