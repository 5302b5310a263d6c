use arch::{Addr, Error, Result};

/// Label targets in strictly ascending order. A label's name is its index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Labels {
    addrs: Vec<Addr>,
}

impl Labels {
    pub fn new() -> Self {
        Labels::default()
    }

    /// `Ok(index)` when `addr` is known, otherwise `Err(index)` where it
    /// would be inserted.
    pub fn search(&self, addr: Addr) -> std::result::Result<usize, usize> {
        self.addrs.binary_search(&addr)
    }

    /// Add `addr` if it is new. Returns its current index.
    pub fn insert(&mut self, addr: Addr) -> Result<usize> {
        match self.search(addr) {
            Ok(idx) => Ok(idx),
            Err(idx) => {
                self.addrs
                    .try_reserve(1)
                    .map_err(|_| Error::AllocationFailure("label array".to_string()))?;
                self.addrs.insert(idx, addr);
                Ok(idx)
            }
        }
    }

    pub fn index_of(&self, addr: Addr) -> Option<usize> {
        self.search(addr).ok()
    }

    pub fn get(&self, idx: usize) -> Option<Addr> {
        self.addrs.get(idx).copied()
    }

    pub fn as_slice(&self) -> &[Addr] {
        &self.addrs
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

pub fn name(idx: usize) -> String {
    format!("L{}", idx)
}
