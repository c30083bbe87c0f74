use crate::binding::{ColumnRef, FieldBinding};
use fieldmap_spec::DEFAULT_SENTINEL;
use serde::Serialize;
use sheetfill_common::{CellValue, PlaceholderMap};
use sheetfill_workbook::TabularSource;

/// What an empty cell renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCell {
    #[default]
    Blank,
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub sentinel: String,
    pub empty_cell: EmptyCell,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            empty_cell: EmptyCell::Blank,
        }
    }
}

/// Why a field fell back to the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SentinelReason {
    RowOutOfBounds { row: usize, rows: usize },
    UnknownColumn { column: String },
    NoHeader,
}

impl std::fmt::Display for SentinelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentinelReason::RowOutOfBounds { row, rows } => {
                write!(f, "row {row} out of bounds ({rows} data rows)")
            }
            SentinelReason::UnknownColumn { column } => write!(f, "no column {column}"),
            SentinelReason::NoHeader => f.write_str("column names need a header row"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    Resolved { column: usize },
    Empty { column: usize },
    Sentinel(SentinelReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutcome {
    pub token: String,
    pub value: String,
    #[serde(flatten)]
    pub status: FieldStatus,
}

/// The placeholder map plus how each entry was obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractOutcome {
    pub map: PlaceholderMap,
    pub fields: Vec<FieldOutcome>,
}

impl ExtractOutcome {
    /// Fields that fell back to the sentinel.
    pub fn fallbacks(&self) -> impl Iterator<Item = (&str, &SentinelReason)> {
        self.fields.iter().filter_map(|f| match &f.status {
            FieldStatus::Sentinel(reason) => Some((f.token.as_str(), reason)),
            _ => None,
        })
    }

    pub fn resolved_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.status, FieldStatus::Resolved { .. }))
            .count()
    }

    pub fn into_map(self) -> PlaceholderMap {
        self.map
    }
}

/// Resolve every field against `source`. Never fails.
pub fn extract(source: &TabularSource, fields: &[FieldBinding], options: &ExtractOptions) -> PlaceholderMap {
    extract_with_outcome(source, fields, options).into_map()
}

pub fn extract_with_outcome(
    source: &TabularSource,
    fields: &[FieldBinding],
    options: &ExtractOptions,
) -> ExtractOutcome {
    let mut outcome = ExtractOutcome::default();
    for field in fields {
        let (value, status) = resolve_field(source, field, options);

        #[cfg(feature = "tracing")]
        if let FieldStatus::Sentinel(reason) = &status {
            tracing::warn!(token = %field.token, row = field.locator.row, %reason, "field resolved to sentinel");
        }

        outcome.map.insert(field.token.clone(), value.clone());
        outcome.fields.push(FieldOutcome {
            token: field.token.clone(),
            value,
            status,
        });
    }
    outcome
}

/// Column position for `column`, or why there is none.
pub fn resolve_column(source: &TabularSource, column: &ColumnRef) -> Result<usize, SentinelReason> {
    match column {
        ColumnRef::Index(i) if *i < source.width() => Ok(*i),
        ColumnRef::Index(i) => Err(SentinelReason::UnknownColumn {
            column: format!("#{i}"),
        }),
        ColumnRef::Name(_) | ColumnRef::AnyOf(_) if source.headers().is_none() => {
            Err(SentinelReason::NoHeader)
        }
        ColumnRef::Name(name) => source
            .column_index(name)
            .ok_or_else(|| SentinelReason::UnknownColumn {
                column: column.to_string(),
            }),
        ColumnRef::AnyOf(names) => names
            .iter()
            .find_map(|n| source.column_index(n))
            .ok_or_else(|| SentinelReason::UnknownColumn {
                column: column.to_string(),
            }),
    }
}

fn resolve_field(
    source: &TabularSource,
    field: &FieldBinding,
    options: &ExtractOptions,
) -> (String, FieldStatus) {
    let column = match resolve_column(source, &field.locator.column) {
        Ok(c) => c,
        Err(reason) => return (options.sentinel.clone(), FieldStatus::Sentinel(reason)),
    };
    let row = field.locator.row;
    let Some(cell) = source.cell(row, column) else {
        return (
            options.sentinel.clone(),
            FieldStatus::Sentinel(SentinelReason::RowOutOfBounds {
                row,
                rows: source.row_count(),
            }),
        );
    };

    if is_empty(cell) {
        let value = match options.empty_cell {
            EmptyCell::Blank => String::new(),
            EmptyCell::Sentinel => options.sentinel.clone(),
        };
        return (value, FieldStatus::Empty { column });
    }
    (cell.to_string(), FieldStatus::Resolved { column })
}

fn is_empty(cell: &CellValue) -> bool {
    match cell {
        CellValue::Empty => true,
        CellValue::Text(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfill_common::CellErrorKind;

    fn municipio_table() -> TabularSource {
        TabularSource::from_rows(
            Some(vec!["Município".into(), "Valor".into(), "Nota".into()]),
            vec![vec![
                CellValue::from("Tucano"),
                CellValue::Number(12345.0),
                CellValue::Empty,
            ]],
        )
    }

    #[test]
    fn resolves_names_to_canonical_text() {
        let fields = vec![
            FieldBinding::new("{{Nome}}", 0, "Município"),
            FieldBinding::new("{{Pop}}", 0, "Valor"),
        ];
        let map = extract(&municipio_table(), &fields, &ExtractOptions::default());
        assert_eq!(map.get("{{Nome}}"), Some("Tucano"));
        assert_eq!(map.get("{{Pop}}"), Some("12345"));
    }

    #[test]
    fn row_out_of_bounds_is_sentinel() {
        let fields = vec![FieldBinding::new("{{Nome}}", 5, "Município")];
        let outcome = extract_with_outcome(&municipio_table(), &fields, &ExtractOptions::default());
        assert_eq!(outcome.map.get("{{Nome}}"), Some("N/A"));
        assert_eq!(
            outcome.fallbacks().collect::<Vec<_>>(),
            vec![("{{Nome}}", &SentinelReason::RowOutOfBounds { row: 5, rows: 1 })]
        );
    }

    #[test]
    fn unknown_columns_are_sentinel() {
        let fields = vec![
            FieldBinding::new("{{A}}", 0, "Área"),
            FieldBinding::new("{{B}}", 0, 9usize),
            FieldBinding {
                locator: crate::Locator::new(0, ColumnRef::AnyOf(vec![])),
                ..FieldBinding::new("{{C}}", 0, 0usize)
            },
        ];
        let outcome = extract_with_outcome(&municipio_table(), &fields, &ExtractOptions::default());
        assert!(outcome.map.iter().all(|(_, v)| v == "N/A"));
        assert_eq!(outcome.resolved_count(), 0);
        assert_eq!(
            outcome.fields[1].status,
            FieldStatus::Sentinel(SentinelReason::UnknownColumn { column: "#9".into() })
        );
    }

    #[test]
    fn synonyms_take_first_present() {
        let fields = vec![FieldBinding::new(
            "{{Pop}}",
            0,
            ColumnRef::AnyOf(vec!["População".into(), "Valor".into(), "Município".into()]),
        )];
        let map = extract(&municipio_table(), &fields, &ExtractOptions::default());
        assert_eq!(map.get("{{Pop}}"), Some("12345"));
    }

    #[test]
    fn names_without_header_fall_back() {
        let table = TabularSource::from_rows(None, vec![vec![CellValue::from("x")]]);
        let fields = vec![
            FieldBinding::new("{{Nome}}", 0, "Município"),
            FieldBinding::new("{{Pos}}", 0, 0usize),
        ];
        let outcome = extract_with_outcome(&table, &fields, &ExtractOptions::default());
        assert_eq!(outcome.fields[0].status, FieldStatus::Sentinel(SentinelReason::NoHeader));
        assert_eq!(outcome.map.get("{{Pos}}"), Some("x"));
    }

    #[test]
    fn empty_cell_policy() {
        let fields = vec![FieldBinding::new("{{Nota}}", 0, "Nota")];
        let blank = extract(&municipio_table(), &fields, &ExtractOptions::default());
        assert_eq!(blank.get("{{Nota}}"), Some(""));

        let opts = ExtractOptions {
            sentinel: "-".into(),
            empty_cell: EmptyCell::Sentinel,
        };
        let outcome = extract_with_outcome(&municipio_table(), &fields, &opts);
        assert_eq!(outcome.map.get("{{Nota}}"), Some("-"));
        assert_eq!(outcome.fields[0].status, FieldStatus::Empty { column: 2 });
    }

    #[test]
    fn scalar_rendering() {
        let table = TabularSource::from_rows(
            None,
            vec![vec![
                CellValue::Number(62.45),
                CellValue::Boolean(true),
                CellValue::Error(CellErrorKind::Na),
                CellValue::from("  texto  "),
            ]],
        );
        let fields: Vec<FieldBinding> = (0..4usize)
            .map(|i| FieldBinding::new(format!("{{{{F{i}}}}}"), 0, i))
            .collect();
        let map = extract(&table, &fields, &ExtractOptions::default());
        assert_eq!(
            map.iter().map(|(_, v)| v).collect::<Vec<_>>(),
            vec!["62.45", "true", "#N/A", "  texto  "]
        );
    }

    #[test]
    fn outcome_serializes_flat() {
        let fields = vec![
            FieldBinding::new("{{Nome}}", 0, "Município"),
            FieldBinding::new("{{X}}", 3, "Município"),
        ];
        let outcome = extract_with_outcome(&municipio_table(), &fields, &ExtractOptions::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["map"]["{{Nome}}"], "Tucano");
        assert_eq!(json["fields"][0]["status"], "resolved");
        assert_eq!(json["fields"][0]["column"], 0);
        assert_eq!(json["fields"][1]["status"], "sentinel");
        assert_eq!(json["fields"][1]["reason"], "row_out_of_bounds");
    }
}
