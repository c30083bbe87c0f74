use crate::binding::LayoutBindings;
use crate::error::ExtractError;
use crate::extract::{SentinelReason, resolve_column};
use sheetfill_workbook::TabularSource;

/// Checks bound layout fields against a concrete tabular source.
///
/// Extraction itself never fails; this is the strict variant for callers that
/// want a sentinel fallback reported as an error instead.
pub struct LayoutContext<'a> {
    source: &'a TabularSource,
}

impl<'a> LayoutContext<'a> {
    pub fn new(source: &'a TabularSource) -> Self {
        Self { source }
    }

    /// Fails on the first field that would fall back to the sentinel.
    pub fn validate(&self, bindings: &LayoutBindings) -> Result<(), ExtractError> {
        match self.problems(bindings).into_iter().next() {
            Some((token, reason)) => Err(ExtractError::Unresolvable {
                token,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Every field that cannot be resolved, in declaration order.
    pub fn problems(&self, bindings: &LayoutBindings) -> Vec<(String, SentinelReason)> {
        let mut out = Vec::new();
        for binding in bindings.bindings() {
            let locator = &binding.locator;
            if let Err(reason) = resolve_column(self.source, &locator.column) {
                out.push((binding.token.clone(), reason));
                continue;
            }
            if locator.row >= self.source.row_count() {
                out.push((
                    binding.token.clone(),
                    SentinelReason::RowOutOfBounds {
                        row: locator.row,
                        rows: self.source.row_count(),
                    },
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_spec::Manifest;
    use sheetfill_common::CellValue;

    fn bindings() -> LayoutBindings {
        let yaml = r#"
spec: fieldmap
spec_version: "0.1.0"
layout: {id: ctx-test, name: Ctx}
source: {header_row: 0}
fields:
  - {token: "{{Nome}}", row: 0, column: Município}
  - {token: "{{Pop}}", row: 1, column: Valor}
  - {token: "{{Area}}", row: 0, column: Área}
"#;
        LayoutBindings::new(Manifest::from_yaml_str(yaml).unwrap()).unwrap()
    }

    #[test]
    fn reports_each_unresolvable_field() {
        let table = TabularSource::from_rows(
            Some(vec!["Município".into(), "Valor".into()]),
            vec![vec![CellValue::from("Tucano"), CellValue::Int(12345)]],
        );
        let ctx = LayoutContext::new(&table);
        let problems = ctx.problems(&bindings());
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].0, "{{Pop}}");
        assert!(matches!(problems[1].1, SentinelReason::UnknownColumn { .. }));

        match ctx.validate(&bindings()) {
            Err(ExtractError::Unresolvable { token, reason }) => {
                assert_eq!(token, "{{Pop}}");
                assert_eq!(reason, "row 1 out of bounds (1 data rows)");
            }
            other => panic!("expected unresolvable field, got {other:?}"),
        }
    }

    #[test]
    fn complete_source_validates() {
        let table = TabularSource::from_rows(
            Some(vec!["Município".into(), "Valor".into(), "Área".into()]),
            vec![vec![CellValue::from("a")], vec![CellValue::from("b")]],
        );
        LayoutContext::new(&table).validate(&bindings()).unwrap();
    }
}
