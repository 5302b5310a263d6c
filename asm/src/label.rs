use arch::{Addr, Error, Result};
use indexmap::IndexMap;

const INITIAL_CAPACITY: usize = 100;

/// Handle of a label: its position in the table.
pub type LabelId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// `None` until the label is declared.
    pub addr: Option<Addr>,
    /// Output offsets of the 8-byte slots waiting for `addr`.
    pub uses: Vec<usize>,
    /// Line where the label was first named.
    pub line: usize,
}

#[derive(Debug)]
pub struct Labels {
    labels: IndexMap<String, Label>,
}

impl Labels {
    pub fn new() -> Result<Self> {
        let mut labels = IndexMap::new();
        labels
            .try_reserve(INITIAL_CAPACITY)
            .map_err(|_| Error::AllocationFailure("label table".to_string()))?;
        Ok(Labels { labels })
    }

    fn intern(&mut self, name: &str, line: usize) -> Result<LabelId> {
        if let Some(id) = self.labels.get_index_of(name) {
            return Ok(id);
        }
        if self.labels.len() == self.labels.capacity() {
            let grow = self.labels.capacity().max(INITIAL_CAPACITY);
            self.labels
                .try_reserve(grow)
                .map_err(|_| Error::AllocationFailure("label table".to_string()))?;
        }
        let label = Label {
            addr: None,
            uses: Vec::new(),
            line,
        };
        Ok(self.labels.insert_full(name.to_string(), label).0)
    }

    /// Set the address of `name`. Returns the previous address if the label
    /// had already been declared.
    pub fn declare(&mut self, name: &str, addr: Addr, line: usize) -> Result<Option<Addr>> {
        let id = self.intern(name, line)?;
        let label = &mut self.labels[id];
        Ok(label.addr.replace(addr))
    }

    /// Record that the 8-byte slot at `site` must receive the address of `name`.
    pub fn refer(&mut self, name: &str, site: usize, line: usize) -> Result<LabelId> {
        let id = self.intern(name, line)?;
        let uses = &mut self.labels[id].uses;
        uses.try_reserve(1)
            .map_err(|_| Error::AllocationFailure(format!("uses of label `{}`", name)))?;
        uses.push(site);
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn get_val(&self, name: &str) -> Option<Addr> {
        self.labels.get(name).and_then(|label| label.addr)
    }

    pub fn name(&self, id: LabelId) -> Option<&str> {
        self.labels.get_index(id).map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Label)> {
        self.labels.iter().map(|(name, label)| (name.as_str(), label))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
