use std::fmt;

use clap::ValueEnum;
use strum::Display;
use thiserror::Error;
use tracing::{debug, error};

use crate::registry::{AccessError, Entry, EntryList, OrderedListStore};

/// Where this layer's entry goes relative to every other registered layer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Placement {
    /// Load before every other layer
    First,
    /// Load after every other layer, so their functionality is available to this one
    #[default]
    Last,
}

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("Failed to read the registered API layers")]
    Read(#[source] AccessError),
    /// The clear or rewrite phase was interrupted. Nothing is rolled back, so the key may be
    /// left with values deleted and the new order only partly written.
    #[error(
        "Reordering stopped after deleting {deleted} and rewriting {written} registered API layers"
    )]
    Partial {
        deleted: usize,
        written: usize,
        #[source]
        source: AccessError,
    },
}

impl ReorderError {
    /// Whether the key was modified before the failure.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Partial { deleted, .. } if *deleted > 0)
    }
}

/// Computes the new order: every other entry in its current order with `self_name`
/// registered once, enabled, at `placement`.
pub fn plan(current: &EntryList, self_name: &str, placement: Placement) -> EntryList {
    let mut entries = current.clone();
    entries.remove_all(self_name);
    let entry = Entry::enabled(self_name);
    match placement {
        Placement::First => entries.insert(0, entry),
        Placement::Last => entries.push(entry),
    }
    entries
}

/// Rewrites the key in `store` so that `self_name` is registered at `placement`.
///
/// All values present when the key is read are deleted, then the planned order is written
/// from scratch. The registry offers no transaction spanning several values, so a failure
/// in either phase leaves whatever was done so far in place. Running again reads that
/// state and rewrites it consistently, but values that were deleted and never rewritten
/// are lost.
pub fn reorder<S>(
    store: &mut S,
    self_name: &str,
    placement: Placement,
) -> Result<ReorderOutcome, ReorderError>
where
    S: OrderedListStore + ?Sized,
{
    let before = store.read_all().map_err(ReorderError::Read)?;
    let after = plan(&before, self_name, placement);
    debug!(order = ?after.names().collect::<Vec<_>>(), "Planned API layer order");

    store
        .clear(&before)
        .map_err(|source| {
            let deleted = match &source {
                AccessError::Delete { name, .. } => before.position(name).unwrap_or_default(),
                _ => 0,
            };
            ReorderError::Partial {
                deleted,
                written: 0,
                source,
            }
        })
        .and_then(|()| {
            store.write_all(&after).map_err(|source| {
                let written = match &source {
                    AccessError::Write { name, .. } => after.position(name).unwrap_or_default(),
                    _ => 0,
                };
                ReorderError::Partial {
                    deleted: before.len(),
                    written,
                    source,
                }
            })
        })
        .inspect_err(|err| match err {
            ReorderError::Partial {
                deleted, written, ..
            } if err.is_degraded() => error!(
                deleted,
                written,
                expected = after.len(),
                "API layer registrations are incomplete until the installation is repaired"
            ),
            _ => {}
        })?;

    let outcome = ReorderOutcome {
        name: self_name.to_owned(),
        before,
        after,
    };
    debug!(%outcome);
    Ok(outcome)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReorderOutcome {
    name: String,
    before: EntryList,
    after: EntryList,
}

impl ReorderOutcome {
    #[inline]
    pub const fn before(&self) -> &EntryList {
        &self.before
    }

    #[inline]
    pub const fn after(&self) -> &EntryList {
        &self.after
    }

    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }

    pub fn previous_position(&self) -> Option<usize> {
        self.before.position(&self.name)
    }

    pub fn position(&self) -> usize {
        self.after.position(&self.name).unwrap_or_default()
    }
}

impl fmt::Display for ReorderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let position = self.position() + 1;
        let total = self.after.len();
        match self.previous_position() {
            None => write!(
                f,
                "Registered {name} at position {position} of {total}",
                name = self.name
            )?,
            Some(_) if !self.is_changed() => write!(
                f,
                "{name} is already at position {position} of {total}",
                name = self.name
            )?,
            Some(previous) => write!(
                f,
                "Moved {name} from position {previous} to {position} of {total}",
                name = self.name,
                previous = previous + 1
            )?,
        }
        match self.before.occurrences(&self.name) {
            0 | 1 => Ok(()),
            count => write!(f, " and removed {} duplicate registrations", count - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::{Placement, ReorderError, plan, reorder};
    use crate::registry::{
        AccessError, Entry, EntryList, Flag, MemoryStore, OrderedListStore, ValueKind,
    };

    const SELF: &str = r"C:\Program Files\App\openxr-api-layer.json";

    fn list<const N: usize>(entries: [(&str, u32); N]) -> EntryList {
        entries
            .into_iter()
            .map(|(name, flag)| Entry::new(name, Flag::dword(flag)))
            .collect()
    }

    fn reorder_once(entries: EntryList, name: &str) -> EntryList {
        let mut store = MemoryStore::from(entries);
        reorder(&mut store, name, Placement::Last).unwrap();
        store.entries()
    }

    #[test]
    fn empty_list() {
        assert_eq!(reorder_once(EntryList::default(), SELF), list([(SELF, 0)]));
    }

    #[test]
    fn appends_new_registration() {
        assert_eq!(
            reorder_once(list([("X", 0), ("Y", 1)]), "Z"),
            list([("X", 0), ("Y", 1), ("Z", 0)])
        );
    }

    #[test]
    fn moves_existing_registration_last() {
        assert_eq!(
            reorder_once(list([("X", 0), ("S", 0), ("Y", 1)]), "S"),
            list([("X", 0), ("Y", 1), ("S", 0)])
        );
    }

    #[test]
    fn reinstall_of_sole_registration() {
        assert_eq!(reorder_once(list([("S", 0)]), "S"), list([("S", 0)]));
    }

    #[test]
    fn re_enables_disabled_registration() {
        assert_eq!(
            reorder_once(list([("S", 1), ("X", 3)]), "S"),
            list([("X", 3), ("S", 0)])
        );
    }

    #[rstest]
    #[case(list([]))]
    #[case(list([(SELF, 0)]))]
    #[case(list([("A", 0), ("B", 1), ("C", 0)]))]
    #[case(list([(SELF, 1), ("A", 0), ("B", 1)]))]
    #[case(list([("A", 0), (SELF, 0), ("B", 2), ("C", 0)]))]
    #[case(list([("A", 0), ("B", 0), (SELF, 0)]))]
    #[case(list([(r"c:\program files\app\OPENXR-API-LAYER.JSON", 1), ("Toolkit", 0)]))]
    #[case(EntryList::from(vec![
        Entry::new("A", Flag::new(ValueKind::String, b"0\0".to_vec())),
        Entry::enabled(SELF),
        Entry::new("B", Flag::new(ValueKind::Binary, vec![0xff; 3])),
        Entry::new("C", Flag::new(ValueKind::Dword, vec![1, 2])),
    ]))]
    fn properties(#[case] initial: EntryList) {
        let others = initial
            .iter()
            .filter(|entry| !entry.is_named(SELF))
            .cloned()
            .collect::<EntryList>();

        let once = reorder_once(initial, SELF);

        // Idempotent
        assert_eq!(reorder_once(once.clone(), SELF), once);

        // Registered exactly once, last, and enabled
        assert_eq!(once.occurrences(SELF), 1);
        assert_eq!(once.last(), Some(&Entry::enabled(SELF)));

        // Every other entry keeps its order and its data
        assert_eq!(&once[..once.len() - 1], others.as_slice());
    }

    #[rstest]
    #[case(list([("A", 0), ("B", 1)]), list([(SELF, 0), ("A", 0), ("B", 1)]))]
    #[case(list([("A", 0), (SELF, 0), ("B", 1)]), list([(SELF, 0), ("A", 0), ("B", 1)]))]
    #[case(list([(SELF, 0), ("A", 0)]), list([(SELF, 0), ("A", 0)]))]
    fn first_placement(#[case] initial: EntryList, #[case] expected: EntryList) {
        assert_eq!(plan(&initial, SELF, Placement::First), expected);
    }

    #[test]
    fn replaces_registration_written_in_other_case() {
        let mut store = MemoryStore::from(list([
            (r"C:\PROGRAM FILES\APP\openxr-api-layer.json", 0),
            ("A", 0),
        ]));
        let outcome = reorder(&mut store, SELF, Placement::Last).unwrap();
        assert_eq!(outcome.previous_position(), Some(0));
        assert_eq!(outcome.position(), 1);
        assert_eq!(store.entries(), list([("A", 0), (SELF, 0)]));
    }

    #[test]
    fn removes_duplicates_in_plan() {
        let current = list([(SELF, 0), ("A", 0), (SELF, 1)]);
        assert_eq!(
            plan(&current, SELF, Placement::Last),
            list([("A", 0), (SELF, 0)])
        );
    }

    #[test]
    fn outcome_reports_move() {
        let mut store = MemoryStore::from(list([("A", 0), (SELF, 0), ("B", 1)]));
        let outcome = reorder(&mut store, SELF, Placement::Last).unwrap();
        assert!(outcome.is_changed());
        assert_eq!(outcome.previous_position(), Some(1));
        assert_eq!(outcome.position(), 2);
        assert_eq!(
            outcome.to_string(),
            format!("Moved {SELF} from position 2 to 3 of 3")
        );
    }

    #[rstest]
    #[case(list([]), format!("Registered {SELF} at position 1 of 1"))]
    #[case(list([("A", 0), (SELF, 0)]), format!("{SELF} is already at position 2 of 2"))]
    #[case(
        list([(SELF, 0), ("A", 0)]),
        format!("Moved {SELF} from position 1 to 2 of 2")
    )]
    fn outcome_display(#[case] initial: EntryList, #[case] expected: String) {
        let mut store = MemoryStore::from(initial);
        let outcome = reorder(&mut store, SELF, Placement::Last).unwrap();
        assert_eq!(outcome.to_string(), expected);
    }

    #[test]
    fn read_failure_leaves_key_untouched() {
        let initial = list([("A", 0), ("B", 1)]);
        let mut store = MemoryStore::from(initial.clone()).deny_read();
        let error = reorder(&mut store, SELF, Placement::Last).unwrap_err();
        assert!(matches!(error, ReorderError::Read(AccessError::Enumerate(_))));
        assert!(!error.is_degraded());
        assert_eq!(store.entries(), initial);
    }

    #[test]
    fn denied_delete_aborts_without_writing() {
        let mut store =
            MemoryStore::from(list([("A", 0), ("B", 1), ("C", 0)])).fail_deletes_after(1);
        let error = reorder(&mut store, SELF, Placement::Last).unwrap_err();
        assert!(matches!(
            error,
            ReorderError::Partial {
                deleted: 1,
                written: 0,
                source: AccessError::Delete { ref name, .. },
            } if name == "B"
        ));
        assert!(error.is_degraded());
        assert_eq!(store.entries(), list([("B", 1), ("C", 0)]));
    }

    #[test]
    fn denied_first_delete_is_not_degraded() {
        let initial = list([("A", 0)]);
        let mut store = MemoryStore::from(initial.clone()).fail_deletes_after(0);
        let error = reorder(&mut store, SELF, Placement::Last).unwrap_err();
        assert!(!error.is_degraded());
        assert_eq!(store.entries(), initial);
    }

    #[test]
    fn denied_write_midway_keeps_written_prefix() {
        let mut store =
            MemoryStore::from(list([("A", 0), ("B", 1), ("C", 0)])).fail_writes_after(2);
        let error = reorder(&mut store, SELF, Placement::Last).unwrap_err();
        assert!(matches!(
            error,
            ReorderError::Partial {
                deleted: 3,
                written: 2,
                ..
            }
        ));
        assert_eq!(store.entries(), list([("A", 0), ("B", 1)]));
    }

    #[test]
    fn write_failure_after_clear_loses_entries() {
        let initial = list([("X", 0), ("Y", 1), (SELF, 0)]);
        let mut store = MemoryStore::from(initial).fail_writes_after(0);
        let error = reorder(&mut store, SELF, Placement::Last).unwrap_err();
        let ReorderError::Partial {
            deleted,
            written,
            source: AccessError::Write { name, source },
        } = error
        else {
            panic!("expected an interrupted write");
        };
        assert_eq!((deleted, written), (3, 0));
        assert_eq!(name, "X");
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        assert!(store.entries().is_empty());

        // A later run only sees the empty key, so the other layers stay lost
        let mut recovered = MemoryStore::from(store.read_all().unwrap());
        reorder(&mut recovered, SELF, Placement::Last).unwrap();
        assert_eq!(recovered.entries(), list([(SELF, 0)]));
    }
}
