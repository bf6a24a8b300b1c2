use std::collections::TryReserveError;

/// A 2D row-major grid. Cells outside `width × height` are not addressable.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    /// Create a map filled with `value`, reporting allocation failure instead of aborting.
    pub fn try_new_with(width: usize, height: usize, value: T) -> Result<Self, TryReserveError> {
        let len = width.saturating_mul(height);
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, value);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let mut map = Tilemap::try_new_with(3, 2, 0i32).unwrap();
        for (x, y, cell) in map.iter_mut() {
            *cell = (y * 10 + x) as i32;
        }

        let cells: Vec<_> = map.iter().map(|(x, y, v)| (x, y, *v)).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[3], (0, 1, 10));
        assert_eq!(cells[5], (2, 1, 12));
    }

    #[test]
    fn test_try_new_with_reports_huge_allocations() {
        assert!(Tilemap::try_new_with(usize::MAX / 2, 4, 0u64).is_err());
        let ok = Tilemap::try_new_with(4, 4, 1u8).unwrap();
        assert_eq!(ok.iter().count(), 16);
        assert!(ok.iter().all(|(_, _, v)| *v == 1));
    }
}
