use tracing::debug;

use super::{AccessError, Entry, EntryList};

/// An opened registry key whose value names form an ordered list.
///
/// Every operation goes straight to the backing key. Nothing is cached between calls, so
/// a value changed by someone else in between is seen by the next [`read_all`].
///
/// [`read_all`]: OrderedListStore::read_all
pub trait OrderedListStore {
    /// Returns every value in the key in enumeration order.
    fn read_all(&self) -> Result<EntryList, AccessError>;

    fn delete_value(&mut self, name: &str) -> Result<(), AccessError>;

    fn set_value(&mut self, entry: &Entry) -> Result<(), AccessError>;

    /// Deletes every value named in `entries`.
    ///
    /// Stops at the first failure. Values deleted before it stay deleted.
    fn clear(&mut self, entries: &EntryList) -> Result<(), AccessError> {
        for entry in entries {
            debug!(name = %entry.name, "Deleting value");
            self.delete_value(&entry.name)?;
        }
        Ok(())
    }

    /// Writes every entry, in the order given.
    ///
    /// Stops at the first failure. Values written before it stay written.
    fn write_all(&mut self, entries: &EntryList) -> Result<(), AccessError> {
        for entry in entries {
            debug!(name = %entry.name, flag = %entry.flag, "Writing value");
            self.set_value(entry)?;
        }
        Ok(())
    }
}
