mod entry;
mod error;
mod flag;
mod memory;
mod store;
#[cfg(not(windows))]
mod unsupported;
#[cfg(windows)]
mod windows;

pub use entry::{Entry, EntryList, fold_name};
pub use error::AccessError;
pub use flag::Flag;
#[cfg(any(windows, test))]
pub use flag::ValueKind;
pub use memory::MemoryStore;
pub use store::OrderedListStore;
#[cfg(not(windows))]
pub use unsupported::RegistryStore;
#[cfg(windows)]
pub use windows::RegistryStore;

/// The key the OpenXR loader reads implicit API layers from, relative to `HKEY_LOCAL_MACHINE`.
pub const IMPLICIT_API_LAYERS_KEY: &str = r"SOFTWARE\Khronos\OpenXR\1\ApiLayers\Implicit";
