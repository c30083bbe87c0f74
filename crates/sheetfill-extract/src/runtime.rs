use crate::binding::LayoutBindings;
use crate::context::LayoutContext;
use crate::error::ExtractError;
use crate::extract::{ExtractOutcome, extract_with_outcome};
use fieldmap_spec::Manifest;
use sheetfill_workbook::{IoError, SpreadsheetReader, TabularSource};

/// Runtime container that pairs a bound layout with a concrete workbook reader.
pub struct LayoutRuntime<R: SpreadsheetReader<Error = IoError>> {
    reader: R,
    bindings: LayoutBindings,
}

impl<R: SpreadsheetReader<Error = IoError>> LayoutRuntime<R> {
    /// Validate the layout, bind fields, and check the sheet it names exists.
    pub fn new(reader: R, manifest: Manifest) -> Result<Self, ExtractError> {
        Self::from_bindings(reader, LayoutBindings::new(manifest)?)
    }

    pub fn from_bindings(reader: R, bindings: LayoutBindings) -> Result<Self, ExtractError> {
        if let Some(sheet) = &bindings.source_options().sheet {
            if !reader.sheet_names()?.iter().any(|s| s == sheet) {
                return Err(ExtractError::MissingSheet {
                    layout: bindings.layout_id().to_string(),
                    sheet: sheet.clone(),
                });
            }
        }
        Ok(Self { reader, bindings })
    }

    /// Read and slice the worksheet this layout points at.
    pub fn source(&mut self) -> Result<TabularSource, ExtractError> {
        Ok(TabularSource::from_reader(
            &mut self.reader,
            self.bindings.source_options(),
        )?)
    }

    /// Like [`LayoutRuntime::extract`], but a field that would fall back to
    /// the sentinel is an error.
    pub fn extract_strict(&mut self) -> Result<ExtractOutcome, ExtractError> {
        let source = self.source()?;
        LayoutContext::new(&source).validate(&self.bindings)?;
        Ok(extract_with_outcome(
            &source,
            self.bindings.bindings(),
            self.bindings.extract_options(),
        ))
    }

    /// Read the source and resolve every field.
    pub fn extract(&mut self) -> Result<ExtractOutcome, ExtractError> {
        let source = self.source()?;
        Ok(extract_with_outcome(
            &source,
            self.bindings.bindings(),
            self.bindings.extract_options(),
        ))
    }
}
