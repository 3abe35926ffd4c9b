use std::fmt;

use derive_more::{Deref, From, IntoIterator};
use serde::{Deserialize, Serialize};

use super::Flag;

/// A single value under the implicit API layer key: a manifest path and its flag.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(flatten)]
    pub flag: Flag,
}

impl Entry {
    pub fn new<N: Into<String>>(name: N, flag: Flag) -> Self {
        Self {
            name: name.into(),
            flag,
        }
    }

    pub fn enabled<N: Into<String>>(name: N) -> Self {
        Self::new(name, Flag::enabled())
    }

    /// Whether this entry's name refers to the same registry value as `name`.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Registry value names are case-insensitive, so every lookup by name compares folded names.
pub fn fold_name(name: &str) -> String {
    name.to_uppercase()
}

fn names_match(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right) || fold_name(left) == fold_name(right)
}

/// API layer entries in the order the platform enumerates them, which is the order the
/// OpenXR loader loads them in.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deref, From, IntoIterator, Serialize, Deserialize)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct EntryList(Vec<Entry>);

impl EntryList {
    pub fn push(&mut self, entry: Entry) {
        self.0.push(entry);
    }

    pub fn insert(&mut self, index: usize, entry: Entry) {
        self.0.insert(index, entry);
    }

    /// Removes every entry with the given name, returning how many were removed.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|entry| !entry.is_named(name));
        before - self.0.len()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|entry| entry.is_named(name))
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.0.iter().filter(|entry| entry.is_named(name)).count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.name.as_str())
    }
}

impl FromIterator<Entry> for EntryList {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for EntryList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.0.len().to_string().len();
        for (index, entry) in self.0.iter().enumerate() {
            writeln!(
                f,
                "{position:>width$}. {name} = {flag}",
                position = index + 1,
                name = entry.name,
                flag = entry.flag
            )?;
        }
        Ok(())
    }
}
