use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumString, FromRepr};

/// The type of data stored in a registry value.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Display,
    EnumString,
    FromRepr,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[repr(u32)]
pub enum ValueKind {
    #[strum(serialize = "REG_NONE")]
    None = 0,
    #[strum(serialize = "REG_SZ")]
    String = 1,
    #[strum(serialize = "REG_EXPAND_SZ")]
    ExpandString = 2,
    #[strum(serialize = "REG_BINARY")]
    Binary = 3,
    #[strum(serialize = "REG_DWORD")]
    Dword = 4,
    #[strum(serialize = "REG_DWORD_BIG_ENDIAN")]
    DwordBigEndian = 5,
    #[strum(serialize = "REG_LINK")]
    Link = 6,
    #[strum(serialize = "REG_MULTI_SZ")]
    MultiString = 7,
    #[strum(serialize = "REG_RESOURCE_LIST")]
    ResourceList = 8,
    #[strum(serialize = "REG_FULL_RESOURCE_DESCRIPTOR")]
    FullResourceDescriptor = 9,
    #[strum(serialize = "REG_RESOURCE_REQUIREMENTS_LIST")]
    ResourceRequirementsList = 10,
    #[strum(serialize = "REG_QWORD")]
    Qword = 11,
}

/// The data stored against an API layer's manifest path.
///
/// The OpenXR loader reads a `REG_DWORD` where `0` means enabled. Any other
/// value, including data of a different type, belongs to the loader or to
/// another layer's installer and is carried around untouched.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Flag {
    kind: ValueKind,
    #[serde(with = "hex")]
    data: Vec<u8>,
}

impl Flag {
    pub const fn new(kind: ValueKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    pub fn dword(value: u32) -> Self {
        Self::new(ValueKind::Dword, value.to_le_bytes().to_vec())
    }

    /// The flag written for this layer's own entry.
    pub fn enabled() -> Self {
        Self::dword(0)
    }

    #[inline]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn as_dword(&self) -> Option<u32> {
        if self.kind != ValueKind::Dword {
            return None;
        }
        self.data.as_slice().try_into().ok().map(u32::from_le_bytes)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_dword() {
            Some(value) => write!(f, "{value}"),
            None => write!(
                f,
                "{kind} {data}",
                kind = self.kind,
                data = base16ct::lower::encode_string(&self.data)
            ),
        }
    }
}

mod hex {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base16ct::lower::encode_string(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base16ct::mixed::decode_vec(&encoded).map_err(D::Error::custom)
    }
}
