use std::collections::{HashMap, HashSet};

use crate::compiler::keys::{Key, StructuralKey};
use crate::compiler::Category;
use crate::error::CompileError;

/// Largest offset an `f32` record field holds exactly
pub const MAX_FLOAT_OFFSET: i32 = 1 << f32::MANTISSA_DIGITS;

/// Structurally distinct elements of `all`, in order of first occurrence
pub fn distinct<T: StructuralKey + Clone>(all: &[T]) -> Vec<T> {
    let mut seen: HashSet<Key> = HashSet::with_capacity(all.len());
    all.iter()
        .filter(|item| seen.insert(item.structural_key()))
        .cloned()
        .collect()
}

/// Maps each distinct entity of one category to its element offset in the
/// compiled array of that category. The offset of an entity is the summed
/// record size of all entities registered before it.
#[derive(Debug)]
pub struct OffsetTable {
    category: Category,
    offsets: HashMap<Key, i32>,
    len: usize,
}

impl OffsetTable {
    pub fn new(category: Category) -> OffsetTable {
        OffsetTable {
            category,
            offsets: HashMap::new(),
            len: 0,
        }
    }

    /// Table over `items` where every record is `record_size` elements long
    pub fn with_fixed_size<T: StructuralKey>(
        category: Category,
        items: &[T],
        record_size: usize,
    ) -> Result<OffsetTable, CompileError> {
        Self::with_sizes(category, items.iter().map(|item| (item, record_size)))
    }

    pub fn with_sizes<T: StructuralKey>(
        category: Category,
        items: impl IntoIterator<Item = (T, usize)>,
    ) -> Result<OffsetTable, CompileError> {
        let mut table = OffsetTable::new(category);
        for (item, size) in items {
            table.insert(&item, size)?;
        }
        Ok(table)
    }

    /// Registers `item` at the current end of the array. Registering an entity
    /// twice keeps its first offset and does not grow the array.
    pub fn insert<T: StructuralKey>(&mut self, item: &T, size: usize) -> Result<i32, CompileError> {
        let key = item.structural_key();
        if let Some(&offset) = self.offsets.get(&key) {
            return Ok(offset);
        }

        let offset = self.to_offset(self.len)?;
        self.to_offset(self.len + size)?;
        self.offsets.insert(key, offset);
        self.len += size;
        Ok(offset)
    }

    pub fn offset_of<T: StructuralKey>(&self, item: &T) -> Result<i32, CompileError> {
        self.offsets
            .get(&item.structural_key())
            .copied()
            .ok_or(CompileError::MissingEntity { category: self.category })
    }

    /// `offset_of` for records stored as floats, where offsets past
    /// `MAX_FLOAT_OFFSET` would round to a neighbouring element
    pub fn float_offset_of<T: StructuralKey>(&self, item: &T) -> Result<f32, CompileError> {
        let offset = self.offset_of(item)?;
        if offset > MAX_FLOAT_OFFSET {
            return Err(CompileError::OffsetOverflow { category: self.category });
        }
        Ok(offset as f32)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of distinct entities registered
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    /// Total element length of the compiled array
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn to_offset(&self, value: usize) -> Result<i32, CompileError> {
        i32::try_from(value).map_err(|_| CompileError::OffsetOverflow { category: self.category })
    }
}
