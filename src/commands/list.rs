use std::io::Write;

use clap::{Args, Parser};
use color_eyre::Result;
use owo_colors::OwoColorize;

use crate::registry::{IMPLICIT_API_LAYERS_KEY, OrderedListStore, RegistryStore};

/// Lists the registered implicit API layers in the order the OpenXR loader loads them
#[derive(Parser)]
pub struct List {
    #[command(flatten)]
    output_type: OutputType,

    /// Registry key holding the implicit API layers, relative to HKEY_LOCAL_MACHINE
    #[arg(long, env = "OPENXR_LAYER_ORDER_KEY", default_value = IMPLICIT_API_LAYERS_KEY)]
    key: String,
}

#[derive(Args)]
#[group(multiple = false)]
struct OutputType {
    /// Output the layers as a JSON snapshot
    #[arg(long)]
    json: bool,

    /// Output the layers as a prettified JSON snapshot
    #[arg(long)]
    pretty_json: bool,
}

impl List {
    pub fn run(self) -> Result<()> {
        let entries = RegistryStore::open_read_only(&self.key)?.read_all()?;

        let mut stdout_lock = anstream::stdout().lock();
        match self.output_type {
            OutputType {
                pretty_json: true, ..
            } => serde_json::to_writer_pretty(&mut stdout_lock, &entries)?,
            OutputType { json: true, .. } => serde_json::to_writer(&mut stdout_lock, &entries)?,
            _ => {
                write!(stdout_lock, "{entries}")?;
                writeln!(
                    stdout_lock,
                    "There are {} registered API layers",
                    entries.len().blue().bold()
                )?;
            }
        }

        Ok(())
    }
}
