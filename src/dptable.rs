/// A dense dynamic programming table, serialized row by row into a single vector.
#[derive(Debug, Clone)]
pub struct DPTable<T> {
    // Total memory
    mem: Vec<T>,
    rows: usize,
    columns: usize,
}

impl<T: Copy> DPTable<T> {
    /// (rows x columns) table filled with `init`.
    pub fn new(rows: usize, columns: usize, init: T) -> Self {
        Self {
            mem: vec![init; rows * columns],
            rows,
            columns,
        }
    }
    pub fn num_rows(&self) -> usize {
        self.rows
    }
    pub fn num_columns(&self) -> usize {
        self.columns
    }
    fn index(&self, i: usize, j: usize) -> usize {
        assert!(i < self.rows && j < self.columns, "({},{}) out of range", i, j);
        i * self.columns + j
    }
    pub fn get(&self, i: usize, j: usize) -> T {
        self.mem[self.index(i, j)]
    }
    pub fn set(&mut self, i: usize, j: usize, target: T) {
        let index = self.index(i, j);
        self.mem[index] = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn get_set() {
        let mut table = DPTable::new(3, 4, 0u8);
        table.set(2, 3, 5);
        table.set(1, 0, 2);
        assert_eq!(table.get(2, 3), 5);
        assert_eq!(table.get(1, 0), 2);
        assert_eq!(table.get(1, 1), 0);
        assert_eq!(table.get(0, 3), 0);
        assert_eq!((table.num_rows(), table.num_columns()), (3, 4));
    }
    #[test]
    #[should_panic]
    fn out_of_range() {
        let table = DPTable::new(3, 4, 0f64);
        table.get(0, 4);
    }
}
