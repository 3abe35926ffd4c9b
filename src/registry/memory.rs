use std::io;

use indexmap::IndexMap;

use super::{AccessError, Entry, EntryList, OrderedListStore, fold_name};

/// An in-memory ordered list with the same contract as the registry key.
///
/// New values are appended, overwritten values keep their position and deleted values
/// are removed without disturbing the order of the rest. Names are matched ignoring case
/// and an overwrite keeps the name it was first written with, as in the registry.
/// Operations can be made to fail after a number of successful calls to reproduce a key
/// that is locked halfway through.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    /// Keyed by folded name.
    values: IndexMap<String, Entry>,
    deny_read: bool,
    deletes_left: Option<usize>,
    writes_left: Option<usize>,
}

impl MemoryStore {
    /// Makes every enumeration fail.
    #[cfg(test)]
    #[must_use]
    pub const fn deny_read(mut self) -> Self {
        self.deny_read = true;
        self
    }

    /// Allows `count` deletes to succeed, then denies every following delete.
    #[cfg(test)]
    #[must_use]
    pub const fn fail_deletes_after(mut self, count: usize) -> Self {
        self.deletes_left = Some(count);
        self
    }

    /// Allows `count` writes to succeed, then denies every following write.
    #[cfg(test)]
    #[must_use]
    pub const fn fail_writes_after(mut self, count: usize) -> Self {
        self.writes_left = Some(count);
        self
    }

    pub fn entries(&self) -> EntryList {
        self.values.values().cloned().collect()
    }
}

impl From<EntryList> for MemoryStore {
    fn from(entries: EntryList) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|entry| (fold_name(&entry.name), entry))
                .collect(),
            ..Self::default()
        }
    }
}

fn permission_denied() -> io::Error {
    io::Error::from(io::ErrorKind::PermissionDenied)
}

/// Counts down a failure budget, returning false once it is spent.
fn consume(budget: &mut Option<usize>) -> bool {
    match budget {
        Some(0) => false,
        Some(left) => {
            *left -= 1;
            true
        }
        None => true,
    }
}

impl OrderedListStore for MemoryStore {
    fn read_all(&self) -> Result<EntryList, AccessError> {
        if self.deny_read {
            return Err(AccessError::Enumerate(permission_denied()));
        }
        Ok(self.entries())
    }

    fn delete_value(&mut self, name: &str) -> Result<(), AccessError> {
        if !consume(&mut self.deletes_left) {
            return Err(AccessError::Delete {
                name: name.to_owned(),
                source: permission_denied(),
            });
        }
        match self.values.shift_remove(&fold_name(name)) {
            Some(_) => Ok(()),
            None => Err(AccessError::Delete {
                name: name.to_owned(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn set_value(&mut self, entry: &Entry) -> Result<(), AccessError> {
        if !consume(&mut self.writes_left) {
            return Err(AccessError::Write {
                name: entry.name.clone(),
                source: permission_denied(),
            });
        }
        self.values
            .entry(fold_name(&entry.name))
            .and_modify(|existing| existing.flag = entry.flag.clone())
            .or_insert_with(|| entry.clone());
        Ok(())
    }
}
