use std::fs;

use anstream::{print, println};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use color_eyre::{Result, eyre::WrapErr};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::{
    manifest_path::LayerManifestPath,
    registry::{EntryList, IMPLICIT_API_LAYERS_KEY, MemoryStore, OrderedListStore, RegistryStore},
    reorder::{Placement, ReorderOutcome, reorder},
};

/// Registers the API layer in the implicit layer list, after every other registered layer
///
/// Run by the installer after the layer's files have been copied.
#[derive(Parser)]
pub struct Install {
    #[command(flatten)]
    location: InstallLocation,

    /// Where to place the layer relative to the other registered layers
    #[arg(long, value_enum, default_value_t)]
    placement: Placement,

    /// Show the resulting order without modifying the registry
    #[arg(long)]
    dry_run: bool,

    /// Reorder the entries of a JSON snapshot created by `list --json` instead of the registry
    #[arg(long, requires = "dry_run", value_hint = clap::ValueHint::FilePath)]
    snapshot: Option<Utf8PathBuf>,

    /// Registry key holding the implicit API layers, relative to HKEY_LOCAL_MACHINE
    #[arg(long, env = "OPENXR_LAYER_ORDER_KEY", default_value = IMPLICIT_API_LAYERS_KEY)]
    key: String,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InstallLocation {
    /// Directory the layer was installed to
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    install_dir: Option<Utf8PathBuf>,

    /// Path of a file installed next to the layer manifest, such as the installer's custom
    /// action assembly
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    assembly_path: Option<Utf8PathBuf>,
}

impl InstallLocation {
    fn manifest_path(&self) -> Result<LayerManifestPath> {
        let manifest_path = match (&self.install_dir, &self.assembly_path) {
            (Some(install_dir), _) => LayerManifestPath::from_install_dir(install_dir.as_str())?,
            (None, Some(assembly_path)) => {
                LayerManifestPath::from_assembly_path(assembly_path.as_str())?
            }
            (None, None) => unreachable!("clap requires one of the install locations"),
        };
        Ok(manifest_path)
    }
}

impl Install {
    pub fn run(self) -> Result<()> {
        let manifest_path = self.location.manifest_path()?;
        debug!(%manifest_path, placement = %self.placement);

        if self.dry_run {
            let entries = match &self.snapshot {
                Some(snapshot) => read_snapshot(snapshot)?,
                None => RegistryStore::open_read_only(&self.key)?.read_all()?,
            };
            let mut store = MemoryStore::from(entries);
            let outcome = reorder(&mut store, manifest_path.as_str(), self.placement)?;
            print_outcome(&outcome);
            println!("{}", "No changes were made to the registry".yellow());
            println!("{}", "Current order:".bold());
            print!("{}", outcome.before());
            println!("{}", "New order:".bold());
            print!("{}", outcome.after());
            return Ok(());
        }

        let mut store = RegistryStore::open(&self.key)?;
        let outcome = reorder(&mut store, manifest_path.as_str(), self.placement)?;
        print_outcome(&outcome);
        Ok(())
    }
}

fn read_snapshot(path: &Utf8Path) -> Result<EntryList> {
    let json =
        fs::read_to_string(path).wrap_err_with(|| format!("Failed to read snapshot {path}"))?;
    serde_json::from_str(&json).wrap_err_with(|| format!("{path} is not a valid snapshot"))
}

fn print_outcome(outcome: &ReorderOutcome) {
    let state = if outcome.is_changed() {
        "Updated".green().to_string()
    } else {
        "Unchanged".blue().to_string()
    };
    println!("{state}: {outcome}");
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use indoc::indoc;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::{Install, read_snapshot};
    use crate::{
        registry::{Entry, Flag, IMPLICIT_API_LAYERS_KEY},
        reorder::Placement,
    };

    #[rstest]
    #[case(&["install", "--install-dir", r"C:\App"])]
    #[case(&["install", "--assembly-path", r"C:\App\CustomSetup.dll"])]
    #[case(&["install", "--install-dir", r"C:\App\", "--placement", "last"])]
    fn resolves_manifest_path(#[case] args: &[&str]) {
        let install = Install::try_parse_from(args).unwrap();
        assert_eq!(
            install.location.manifest_path().unwrap().as_str(),
            r"C:\App\openxr-api-layer.json"
        );
        assert_eq!(install.placement, Placement::Last);
        assert_eq!(install.key, IMPLICIT_API_LAYERS_KEY);
    }

    #[rstest]
    #[case(&["install"])]
    #[case(&["install", "--install-dir", r"C:\App", "--assembly-path", r"C:\App\a.dll"])]
    #[case(&["install", "--install-dir", r"C:\App", "--snapshot", "layers.json"])]
    #[case(&["install", "--install-dir", r"C:\App", "--placement", "middle"])]
    fn rejects_invalid_arguments(#[case] args: &[&str]) {
        assert!(Install::try_parse_from(args).is_err());
    }

    #[test]
    fn reads_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            indoc! {r#"
                [
                  { "name": "C:\\Toolkit\\layer.json", "kind": "REG_DWORD", "data": "01000000" },
                  { "name": "C:\\App\\openxr-api-layer.json", "kind": "REG_DWORD", "data": "00000000" }
                ]
            "#}
            .as_bytes(),
        )
        .unwrap();
        let path = camino::Utf8Path::from_path(file.path()).unwrap();
        let entries = read_snapshot(path).unwrap();
        assert_eq!(
            entries.as_slice(),
            [
                Entry::new(r"C:\Toolkit\layer.json", Flag::dword(1)),
                Entry::enabled(r"C:\App\openxr-api-layer.json"),
            ]
        );
    }
}
