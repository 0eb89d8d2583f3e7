use hashbrown::HashMap;
use rug::Integer;

/// Sparse heap, addressed by any integer. Unset cells hold 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Heap {
    cells: HashMap<Integer, Integer>,
}

impl Heap {
    #[inline]
    pub fn new() -> Self {
        Heap::default()
    }

    /// Stores `n` at address `addr`. Negative addresses are ordinary cells.
    #[inline]
    pub fn store(&mut self, addr: Integer, n: Integer) {
        self.cells.insert(addr, n);
    }

    #[inline]
    pub fn retrieve(&self, addr: &Integer) -> Integer {
        self.get(addr).cloned().unwrap_or_default()
    }

    /// Returns the value at `addr`, if it has been stored to.
    #[inline]
    pub fn get(&self, addr: &Integer) -> Option<&Integer> {
        self.cells.get(addr)
    }

    /// Number of cells that have been stored to.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_zero() {
        let heap = Heap::new();
        assert_eq!(Integer::ZERO, heap.retrieve(&Integer::from(5)));
        assert_eq!(None, heap.get(&Integer::from(5)));
        assert!(heap.is_empty());
    }

    #[test]
    fn store_overwrites() {
        let mut heap = Heap::new();
        let addr = Integer::from(-3);
        heap.store(addr.clone(), Integer::from(1));
        heap.store(addr.clone(), Integer::from(2));
        let far: Integer = Integer::from(1) << 80;
        heap.store(far.clone(), Integer::from(9));
        assert_eq!(Integer::from(2), heap.retrieve(&addr));
        assert_eq!(Integer::from(9), heap.retrieve(&far));
        assert_eq!(2, heap.len());
    }
}
