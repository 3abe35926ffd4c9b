use derive_more::{Deref, Display};
use thiserror::Error;

/// The file name the layer's JSON manifest is installed under.
pub const MANIFEST_FILE_NAME: &str = "openxr-api-layer.json";

const SEPARATORS: [char; 2] = ['\\', '/'];

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ManifestPathError {
    #[error("The installation directory is empty")]
    EmptyInstallDir,
    #[error("{0} does not have a parent directory")]
    NoParentDirectory(String),
}

/// The absolute path of this layer's manifest, which is also the name of its registry value.
#[derive(Clone, Debug, Deref, Display, Eq, PartialEq)]
pub struct LayerManifestPath(String);

impl LayerManifestPath {
    /// Joins the installation directory and the manifest file name with a backslash.
    ///
    /// Trailing separators on `install_dir` are dropped first, so `C:\App\` and `C:\App`
    /// name the same manifest.
    pub fn from_install_dir(install_dir: &str) -> Result<Self, ManifestPathError> {
        let install_dir = install_dir.trim_end_matches(SEPARATORS);
        if install_dir.is_empty() {
            return Err(ManifestPathError::EmptyInstallDir);
        }
        Ok(Self(format!(r"{install_dir}\{MANIFEST_FILE_NAME}")))
    }

    /// Uses the directory containing an installed file, such as the installer's custom action
    /// assembly, as the installation directory.
    pub fn from_assembly_path(assembly_path: &str) -> Result<Self, ManifestPathError> {
        let (install_dir, _file_name) = assembly_path
            .trim_end_matches(SEPARATORS)
            .rsplit_once(SEPARATORS)
            .ok_or_else(|| ManifestPathError::NoParentDirectory(assembly_path.to_owned()))?;
        Self::from_install_dir(install_dir)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
