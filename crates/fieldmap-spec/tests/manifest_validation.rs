use fieldmap_spec::{ColumnSpec, EmptyCellPolicy, Manifest, generate_schema_value};

fn load_fixture(name: &str) -> Manifest {
    let path = format!("tests/fixtures/{}.yaml", name);
    let text = std::fs::read_to_string(path).expect("failed to read fixture");
    serde_yaml::from_str::<Manifest>(&text).expect("fixture should deserialize")
}

#[test]
fn censo_fixture_validates() {
    let manifest = load_fixture("censo_agro");
    manifest.validate().expect("fixture should validate");
    assert_eq!(manifest.sentinel(), "-");
    assert_eq!(manifest.empty_cell(), EmptyCellPolicy::Sentinel);
    assert_eq!(manifest.source.sheet.as_deref(), Some("Resumo"));
}

#[test]
fn normalized_fixture_is_stable() {
    let once = load_fixture("censo_agro").normalized();
    let twice = once.clone().normalized();
    assert_eq!(once, twice);
    assert_eq!(
        once.layout.tags,
        Some(vec!["agro".to_string(), "censo".to_string(), "ibge".to_string()])
    );
    let municipio = once
        .fields
        .iter()
        .find(|f| f.token == "{{Municipio}}")
        .unwrap();
    assert_eq!(
        municipio.column,
        ColumnSpec::AnyOf(vec!["Município".into(), "Municipio".into()])
    );
}

#[test]
fn broken_layout_reports_every_issue() {
    let manifest = load_fixture("broken");
    let err = manifest.validate().expect_err("validation should fail");
    insta::assert_yaml_snapshot!("broken_layout_issues", err.issues());
}

#[test]
fn names_without_header_row_are_rejected() {
    let mut manifest = load_fixture("censo_agro");
    manifest.source.header_row = None;
    let err = manifest.validate().expect_err("validation should fail");
    let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["fields[0].column", "fields[2].column"]);
}

#[test]
fn nested_braces_are_not_tokens() {
    let mut manifest = load_fixture("censo_agro");
    manifest.fields[0].token = "{{Mun{{icipio}}}}".to_string();
    let err = manifest.validate().expect_err("validation should fail");
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].path, "fields[0].token");
}

#[test]
fn schema_describes_manifest() {
    let value = generate_schema_value();
    assert!(value.is_object(), "schema root should be an object");
    assert_eq!(value["title"], "Fieldmap layout table");
    let required = value["required"].as_array().expect("required list");
    for key in ["spec", "spec_version", "layout", "fields"] {
        assert!(required.iter().any(|v| v == key), "missing required `{key}`");
    }
}

#[test]
fn padded_column_names_are_rejected() {
    let mut manifest = load_fixture("censo_agro");
    manifest.fields[0].column = ColumnSpec::AnyOf(vec!["Município".into(), " Municipio".into()]);
    manifest.fields[2].column = ColumnSpec::Name("Lavoura - plantio direto na palha ".into());
    let err = manifest.validate().expect_err("validation should fail");
    let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["fields[0].column[1]", "fields[2].column"]);
    assert!(err.issues()[1].message.contains("whitespace"));
}

#[test]
fn csv_delimiter_must_be_ascii() {
    let mut manifest = load_fixture("censo_agro");
    manifest.source.csv.delimiter = '¦';
    manifest.source.csv.infer_types = false;
    manifest.source.csv.dates = true;
    let err = manifest.validate().expect_err("validation should fail");
    let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["source.csv.delimiter", "source.csv.dates"]);
}
