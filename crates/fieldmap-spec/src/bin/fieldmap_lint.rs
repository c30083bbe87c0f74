use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldmap_spec::{LayoutError, LayoutRegistry, generate_schema_json_pretty, load_layout_path};

#[derive(Parser)]
#[command(name = "fieldmap-lint", version, about = "Validate fieldmap layout tables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate one or more layout files.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print the normalized layout after a successful check.
        #[arg(long)]
        normalize: bool,
    },
    /// Print the JSON Schema for layout files.
    Schema,
    /// List the layouts bundled with this build.
    Builtin,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Check { files, normalize } => {
            let mut all_ok = true;
            for file in &files {
                match load_layout_path(file) {
                    Ok(manifest) => {
                        println!("ok: {} ({})", file.display(), manifest.layout.id);
                        if normalize {
                            let yaml = manifest
                                .normalized()
                                .to_yaml()
                                .context("serializing normalized layout")?;
                            print!("{yaml}");
                        }
                    }
                    Err(LayoutError::Invalid { source, .. }) => {
                        all_ok = false;
                        eprintln!("invalid: {}", file.display());
                        for issue in source.issues() {
                            eprintln!("  - {issue}");
                        }
                    }
                    Err(err) => {
                        all_ok = false;
                        eprintln!("invalid: {}: {err}", file.display());
                    }
                }
            }
            Ok(all_ok)
        }
        Command::Schema => {
            println!("{}", generate_schema_json_pretty());
            Ok(true)
        }
        Command::Builtin => {
            let registry = LayoutRegistry::builtin().context("loading bundled layouts")?;
            for manifest in registry.iter() {
                println!("{}\t{}", manifest.layout.id, manifest.layout.name);
            }
            Ok(true)
        }
    }
}
