//! Column storage - one byte block per archetype, partitioned into columns.
//!
//! A table with capacity `C` and columns of sizes `s0, s1, ...` owns a
//! single `Vec<u8>` of `C * (s0 + s1 + ...)` bytes. Column `i` occupies the
//! range starting at `C * (s0 + ... + s(i-1))`, so every column is a
//! contiguous array of `C` slots and changing the capacity relocates each
//! column slice.

use std::ops::Range;

use smallvec::SmallVec;

use crate::component::ComponentId;

/// Descriptor of one column inside a [`Table`]'s byte block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    id: ComponentId,
    /// Element size in bytes.
    size: usize,
    /// Byte offset of slot 0 inside the table block.
    offset: usize,
}

impl Column {
    /// Component stored in this column.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Element size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    fn slot(&self, row: usize) -> Range<usize> {
        let start = self.offset + row * self.size;
        start..start + self.size
    }

    /// Bytes covering the first `rows` slots.
    fn prefix(&self, rows: usize) -> Range<usize> {
        self.offset..self.offset + rows * self.size
    }
}

/// Type-erased columnar storage for one archetype.
///
/// Rows `0..len` are live. Growth and shrink policy belongs to the owning
/// archetype; the table only relocates data when told to.
pub struct Table {
    columns: SmallVec<[Column; 8]>,
    data: Vec<u8>,
    /// Sum of all column element sizes.
    row_size: usize,
    capacity: usize,
    len: usize,
}

impl Table {
    /// Create a table for the given `(id, element size)` columns.
    #[must_use]
    pub fn with_capacity(
        columns: impl IntoIterator<Item = (ComponentId, usize)>,
        capacity: usize,
    ) -> Self {
        let mut columns: SmallVec<[Column; 8]> = columns
            .into_iter()
            .map(|(id, size)| Column {
                id,
                size,
                offset: 0,
            })
            .collect();
        let row_size = columns.iter().map(Column::size).sum();
        Self::assign_offsets(&mut columns, capacity);

        Self {
            columns,
            data: vec![0; capacity * row_size],
            row_size,
            capacity,
            len: 0,
        }
    }

    fn assign_offsets(columns: &mut [Column], capacity: usize) {
        let mut offset = 0;
        for column in columns {
            column.offset = offset;
            offset += capacity * column.size;
        }
    }

    /// Number of live rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the table has no live rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated row capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the next push needs a resize.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Size of the backing block in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Column descriptors in signature order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find the column holding `id`.
    ///
    /// A linear scan: archetypes rarely have more than a dozen columns.
    #[must_use]
    pub fn column_index(&self, id: ComponentId) -> Option<usize> {
        self.columns.iter().position(|column| column.id == id)
    }

    /// Bytes of one slot.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()` or `col` is out of range.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> &[u8] {
        assert!(row < self.len, "row {row} out of range (len {})", self.len);
        &self.data[self.columns[col].slot(row)]
    }

    /// Mutable bytes of one slot.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()` or `col` is out of range.
    #[must_use]
    pub fn get_mut(&mut self, col: usize, row: usize) -> &mut [u8] {
        assert!(row < self.len, "row {row} out of range (len {})", self.len);
        let range = self.columns[col].slot(row);
        &mut self.data[range]
    }

    /// Append a zero-filled row and return its index.
    ///
    /// # Panics
    ///
    /// Panics if the table is full; the caller resizes first.
    pub fn push_zeroed(&mut self) -> usize {
        assert!(!self.is_full(), "push into a full table");
        let row = self.len;
        for column in &self.columns {
            self.data[column.slot(row)].fill(0);
        }
        self.len += 1;
        row
    }

    /// Remove `row` by moving the last row into its place.
    ///
    /// Returns `true` if a row was moved, i.e. `row` was not the last one.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    pub fn swap_remove(&mut self, row: usize) -> bool {
        assert!(row < self.len, "row {row} out of range (len {})", self.len);
        let last = self.len - 1;
        if row != last {
            for column in &self.columns {
                let src = column.slot(last);
                self.data.copy_within(src, column.slot(row).start);
            }
        }
        self.len = last;
        row != last
    }

    /// Move every column into a block sized for `new_capacity` rows,
    /// preserving row order, then release the old block.
    ///
    /// # Panics
    ///
    /// Panics if `new_capacity < len()`.
    pub fn resize(&mut self, new_capacity: usize) {
        assert!(
            new_capacity >= self.len,
            "cannot resize to {new_capacity} rows with {} live",
            self.len
        );

        let mut columns = self.columns.clone();
        Self::assign_offsets(&mut columns, new_capacity);

        let mut data = vec![0; new_capacity * self.row_size];
        for (old, new) in self.columns.iter().zip(&columns) {
            data[new.prefix(self.len)].copy_from_slice(&self.data[old.prefix(self.len)]);
        }

        self.columns = columns;
        self.data = data;
        self.capacity = new_capacity;
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns.len())
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}
