use super::{AccessError, Entry, EntryList, OrderedListStore};

/// Stands in for the registry key on platforms without a Windows registry. It can never be
/// opened.
pub enum RegistryStore {}

impl RegistryStore {
    pub fn open(_path: &str) -> Result<Self, AccessError> {
        Err(AccessError::Unsupported)
    }

    pub fn open_read_only(_path: &str) -> Result<Self, AccessError> {
        Err(AccessError::Unsupported)
    }
}

impl OrderedListStore for RegistryStore {
    fn read_all(&self) -> Result<EntryList, AccessError> {
        match *self {}
    }

    fn delete_value(&mut self, _name: &str) -> Result<(), AccessError> {
        match *self {}
    }

    fn set_value(&mut self, _entry: &Entry) -> Result<(), AccessError> {
        match *self {}
    }
}
