use winreg::{
    RegKey, RegValue,
    enums::{HKEY_LOCAL_MACHINE, RegType},
};

use super::{AccessError, Entry, EntryList, Flag, OrderedListStore, ValueKind};

/// A key under `HKEY_LOCAL_MACHINE`, opened through the Windows registry API.
pub struct RegistryStore {
    key: RegKey,
}

impl RegistryStore {
    /// Opens the key for reading and writing, creating it if it does not exist yet.
    pub fn open(path: &str) -> Result<Self, AccessError> {
        let (key, _disposition) = RegKey::predef(HKEY_LOCAL_MACHINE)
            .create_subkey(path)
            .map_err(|source| AccessError::Open {
                key: path.to_owned(),
                source,
            })?;
        Ok(Self { key })
    }

    pub fn open_read_only(path: &str) -> Result<Self, AccessError> {
        let key = RegKey::predef(HKEY_LOCAL_MACHINE)
            .open_subkey(path)
            .map_err(|source| AccessError::Open {
                key: path.to_owned(),
                source,
            })?;
        Ok(Self { key })
    }
}

impl OrderedListStore for RegistryStore {
    fn read_all(&self) -> Result<EntryList, AccessError> {
        self.key
            .enum_values()
            .map(|value| {
                let (name, value) = value.map_err(AccessError::Enumerate)?;
                Ok(Entry::new(name, flag_from_value(value)))
            })
            .collect()
    }

    fn delete_value(&mut self, name: &str) -> Result<(), AccessError> {
        self.key
            .delete_value(name)
            .map_err(|source| AccessError::Delete {
                name: name.to_owned(),
                source,
            })
    }

    fn set_value(&mut self, entry: &Entry) -> Result<(), AccessError> {
        self.key
            .set_raw_value(&entry.name, &value_from_flag(&entry.flag))
            .map_err(|source| AccessError::Write {
                name: entry.name.clone(),
                source,
            })
    }
}

fn flag_from_value(value: RegValue) -> Flag {
    let kind = match value.vtype {
        RegType::REG_NONE => ValueKind::None,
        RegType::REG_SZ => ValueKind::String,
        RegType::REG_EXPAND_SZ => ValueKind::ExpandString,
        RegType::REG_BINARY => ValueKind::Binary,
        RegType::REG_DWORD => ValueKind::Dword,
        RegType::REG_DWORD_BIG_ENDIAN => ValueKind::DwordBigEndian,
        RegType::REG_LINK => ValueKind::Link,
        RegType::REG_MULTI_SZ => ValueKind::MultiString,
        RegType::REG_RESOURCE_LIST => ValueKind::ResourceList,
        RegType::REG_FULL_RESOURCE_DESCRIPTOR => ValueKind::FullResourceDescriptor,
        RegType::REG_RESOURCE_REQUIREMENTS_LIST => ValueKind::ResourceRequirementsList,
        RegType::REG_QWORD => ValueKind::Qword,
    };
    Flag::new(kind, value.bytes)
}

fn value_from_flag(flag: &Flag) -> RegValue {
    let vtype = match flag.kind() {
        ValueKind::None => RegType::REG_NONE,
        ValueKind::String => RegType::REG_SZ,
        ValueKind::ExpandString => RegType::REG_EXPAND_SZ,
        ValueKind::Binary => RegType::REG_BINARY,
        ValueKind::Dword => RegType::REG_DWORD,
        ValueKind::DwordBigEndian => RegType::REG_DWORD_BIG_ENDIAN,
        ValueKind::Link => RegType::REG_LINK,
        ValueKind::MultiString => RegType::REG_MULTI_SZ,
        ValueKind::ResourceList => RegType::REG_RESOURCE_LIST,
        ValueKind::FullResourceDescriptor => RegType::REG_FULL_RESOURCE_DESCRIPTOR,
        ValueKind::ResourceRequirementsList => RegType::REG_RESOURCE_REQUIREMENTS_LIST,
        ValueKind::Qword => RegType::REG_QWORD,
    };
    RegValue {
        bytes: flag.data().to_vec(),
        vtype,
    }
}

#[cfg(test)]
mod tests {
    use super::{flag_from_value, value_from_flag};
    use crate::registry::{Flag, ValueKind};

    #[test]
    fn every_value_kind_survives_a_round_trip() {
        let kinds = (0..=11).filter_map(ValueKind::from_repr).collect::<Vec<_>>();
        assert_eq!(kinds.len(), 12);
        for kind in kinds {
            let flag = Flag::new(kind, vec![0x01, 0x00, 0xfe, 0x7f]);
            let value = value_from_flag(&flag);
            assert_eq!(value.bytes, flag.data());
            assert_eq!(flag_from_value(value), flag);
        }
    }
}
