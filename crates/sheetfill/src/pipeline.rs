#[cfg(any(feature = "calamine", feature = "csv"))]
use std::path::Path;

use fieldmap_spec::Manifest;
use sheetfill_docx::{
    DOCX_MEDIA_TYPE, DocxError, DocxPackage, REPORT_FILE_NAME, RESULT_FILE_NAME,
    SubstitutionReport, report_bytes,
};
use sheetfill_extract::{ExtractError, ExtractOutcome, LayoutRuntime};
#[cfg(any(feature = "calamine", feature = "csv"))]
use sheetfill_extract::LayoutBindings;
use sheetfill_workbook::{IoError, SourceOptions, SpreadsheetReader, TabularSource};
#[cfg(any(feature = "calamine", feature = "csv"))]
use sheetfill_workbook::{WorkbookSource, open_workbook_with};
use thiserror::Error;

/// Any failure that stops a request. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("could not read spreadsheet: {0}")]
    Workbook(#[from] IoError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("could not read template: {0}")]
    Template(#[from] DocxError),
}

/// A generated document ready to hand back to the caller.
#[derive(Debug, Clone)]
pub struct FillResult {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub media_type: &'static str,
    /// How each placeholder value was obtained.
    pub extract: ExtractOutcome,
    pub substitution: SubstitutionReport,
}

/// Extract the layout's fields from `data` and fill `template` with them.
pub fn fill<R>(data: R, template: &[u8], layout: &Manifest) -> Result<FillResult, FillError>
where
    R: SpreadsheetReader<Error = IoError>,
{
    // Template errors surface before the spreadsheet is read.
    let package = DocxPackage::from_bytes(template)?;
    let runtime = LayoutRuntime::new(data, layout.clone())?;
    fill_package(runtime, package, layout)
}

fn fill_package<R>(
    mut runtime: LayoutRuntime<R>,
    mut package: DocxPackage,
    layout: &Manifest,
) -> Result<FillResult, FillError>
where
    R: SpreadsheetReader<Error = IoError>,
{
    let extract = runtime.extract()?;
    let substitution = package.substitute(&extract.map)?;
    let bytes = package.to_bytes()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        layout = %layout.layout.id,
        resolved = extract.resolved_count(),
        fields = extract.fields.len(),
        replacements = substitution.total(),
        split_runs = substitution.split_runs,
        "filled template"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = layout;

    Ok(FillResult {
        bytes,
        file_name: RESULT_FILE_NAME,
        media_type: DOCX_MEDIA_TYPE,
        extract,
        substitution,
    })
}

/// Validate `layout`, then open `data` with the layout's CSV options.
#[cfg(any(feature = "calamine", feature = "csv"))]
pub fn open_for_layout(
    data: impl AsRef<Path>,
    layout: &Manifest,
) -> Result<LayoutRuntime<WorkbookSource>, FillError> {
    let bindings = LayoutBindings::new(layout.clone())?;
    let reader = open_workbook_with(data, &bindings.source_options().csv)?;
    Ok(LayoutRuntime::from_bindings(reader, bindings)?)
}

/// [`fill`] over files, picking the spreadsheet backend from the extension.
///
/// Checks run in order: template, layout, spreadsheet.
#[cfg(any(feature = "calamine", feature = "csv"))]
pub fn fill_files(
    data: impl AsRef<Path>,
    template: impl AsRef<Path>,
    layout: &Manifest,
) -> Result<FillResult, FillError> {
    let template = std::fs::read(template.as_ref()).map_err(DocxError::from)?;
    let package = DocxPackage::from_bytes(&template)?;
    let runtime = open_for_layout(data, layout)?;
    fill_package(runtime, package, layout)
}

/// Dump every data row of `data` into a new document.
pub fn report<R>(mut data: R, options: &SourceOptions) -> Result<FillResult, FillError>
where
    R: SpreadsheetReader<Error = IoError>,
{
    let source = TabularSource::from_reader(&mut data, options)?;
    let bytes = report_bytes(&source)?;
    Ok(FillResult {
        bytes,
        file_name: REPORT_FILE_NAME,
        media_type: DOCX_MEDIA_TYPE,
        extract: ExtractOutcome::default(),
        substitution: SubstitutionReport::default(),
    })
}
