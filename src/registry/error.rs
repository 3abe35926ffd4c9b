use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[cfg_attr(not(windows), expect(dead_code))]
    #[error(r"Failed to open HKEY_LOCAL_MACHINE\{key}")]
    Open {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to enumerate the registered API layers")]
    Enumerate(#[source] io::Error),
    #[error("Failed to delete the registry value {name}")]
    Delete {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write the registry value {name}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },
    #[cfg_attr(windows, expect(dead_code))]
    #[error("The Windows registry is not available on this platform")]
    Unsupported,
}
