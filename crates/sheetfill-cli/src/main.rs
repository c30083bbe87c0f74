use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sheetfill::fieldmap_spec::load_layout_path;
use sheetfill::{CsvReadOptions, LayoutRegistry, Manifest, SourceOptions, open_workbook_with};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sheetfill", version, about = "Fill Word templates from spreadsheet data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LayoutArgs {
    /// Id of a built-in layout.
    #[arg(long, conflicts_with = "layout_file", required_unless_present = "layout_file")]
    layout: Option<String>,
    /// Layout table in YAML.
    #[arg(long)]
    layout_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fill a DOCX template with values extracted from a spreadsheet.
    Fill {
        /// Spreadsheet (xlsx, xls, ods, csv).
        #[arg(long)]
        data: PathBuf,
        /// DOCX template with `{{Placeholder}}` tokens.
        #[arg(long)]
        template: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Output path. Defaults to `relatorio.docx` in the current directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the placeholder map a layout extracts, as JSON.
    Extract {
        #[arg(long)]
        data: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Include how each field was resolved.
        #[arg(long)]
        details: bool,
        /// Fail when any field would fall back to the sentinel.
        #[arg(long)]
        strict: bool,
    },
    /// Write every data row of a spreadsheet into a new document.
    Report {
        #[arg(long)]
        data: PathBuf,
        /// Worksheet name. Defaults to the first sheet.
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long, default_value_t = 0)]
        skip_rows: usize,
        /// Header row, counted after the skipped rows.
        #[arg(long)]
        header_row: Option<usize>,
        /// CSV field separator.
        #[arg(long, default_value_t = ',')]
        delimiter: char,
        /// Output path. Defaults to `report.docx` in the current directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the built-in layouts.
    Layouts,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn resolve_layout(args: &LayoutArgs) -> Result<Manifest> {
    if let Some(path) = &args.layout_file {
        return Ok(load_layout_path(path)?);
    }
    let registry = LayoutRegistry::builtin().context("loading bundled layouts")?;
    let id = args.layout.as_deref().unwrap_or_default();
    Ok(registry.require(id)?.clone())
}

fn write_output(out: Option<PathBuf>, default_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = out.unwrap_or_else(|| Path::new(".").join(default_name));
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fill {
            data,
            template,
            layout,
            out,
        } => {
            let manifest = resolve_layout(&layout)?;
            let result = sheetfill::fill_files(&data, &template, &manifest)
                .with_context(|| format!("filling {}", template.display()))?;

            for (token, reason) in result.extract.fallbacks() {
                tracing::warn!(%token, %reason, "placeholder filled with sentinel");
            }
            for token in &result.substitution.unmatched {
                tracing::warn!(%token, "template placeholder has no layout field");
            }

            let path = write_output(out, result.file_name, &result.bytes)?;
            println!(
                "Document generated: {} ({} replacements)",
                path.display(),
                result.substitution.total()
            );
        }
        Command::Extract {
            data,
            layout,
            details,
            strict,
        } => {
            let manifest = resolve_layout(&layout)?;
            let mut runtime = sheetfill::open_for_layout(&data, &manifest)?;
            let outcome = if strict {
                runtime.extract_strict()?
            } else {
                runtime.extract()?
            };
            let json = if details {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome.map)?
            };
            println!("{json}");
        }
        Command::Report {
            data,
            sheet,
            skip_rows,
            header_row,
            delimiter,
            out,
        } => {
            let Some(delimiter) = u8::try_from(delimiter).ok().filter(|b| b.is_ascii()) else {
                bail!("delimiter {delimiter:?} is not a single ASCII character");
            };
            let options = SourceOptions {
                sheet,
                skip_rows,
                header_row,
                csv: CsvReadOptions {
                    delimiter,
                    ..CsvReadOptions::default()
                },
            };
            let reader = open_workbook_with(&data, &options.csv)
                .with_context(|| format!("opening {}", data.display()))?;
            let result = sheetfill::report(reader, &options)?;
            let path = write_output(out, result.file_name, &result.bytes)?;
            println!("Report generated: {}", path.display());
        }
        Command::Layouts => {
            let registry = LayoutRegistry::builtin().context("loading bundled layouts")?;
            for manifest in registry.iter() {
                println!(
                    "{}\t{} ({} fields)",
                    manifest.layout.id,
                    manifest.layout.name,
                    manifest.fields.len()
                );
            }
        }
    }
    Ok(())
}
