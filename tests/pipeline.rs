use data_sweeper::config::SweeperConfig;
use data_sweeper::data::{Cell, CleaningOptions, ColumnKind, DataLoader, Table, UploadedFile};
use data_sweeper::export::{ExportFormat, Exporter, CSV_MIME, XLSX_MIME};
use data_sweeper::stats::NumericSummary;
use data_sweeper::{FileSettings, Pipeline, SweepError};

fn workbook(table: &Table) -> Vec<u8> {
    Exporter::to_xlsx(table, "Sheet1").unwrap()
}

fn sample_table() -> Table {
    Table::from_cells(vec![
        ("a", vec![Cell::Number(1.0), Cell::Number(1.0), Cell::Number(3.0)]),
        ("b", vec![Cell::Number(2.0), Cell::Number(2.0), Cell::Missing]),
    ])
    .unwrap()
}

#[test]
fn xlsx_clean_select_and_convert_to_csv() {
    let pipeline = Pipeline::new(SweeperConfig::default());
    let file = UploadedFile::new("data.xlsx", workbook(&sample_table()));
    let settings = FileSettings {
        cleaning: CleaningOptions {
            deduplicate: true,
            impute_missing: true,
        },
        columns: Some(vec!["a".to_string()]),
        visualize: false,
        export: Some(ExportFormat::Csv),
    };

    let processed = pipeline.run(&file, &settings).unwrap();
    let export = processed.export.unwrap();

    assert_eq!(export.file_name, "data.csv");
    assert_eq!(export.mime, CSV_MIME);
    assert_eq!(String::from_utf8(export.bytes).unwrap(), "a\n1\n3\n");
    assert_eq!(processed.available_columns, vec!["a", "b"]);
}

#[test]
fn csv_converts_to_xlsx_and_reads_back() {
    let pipeline = Pipeline::new(SweeperConfig::default());
    let file = UploadedFile::new(
        "people.CSV",
        b"name,age,city\nann,30,Oslo\nbob,,Rome\ncid,41,\n".to_vec(),
    );
    let settings = FileSettings {
        export: Some(ExportFormat::Xlsx),
        ..FileSettings::default()
    };

    let processed = pipeline.run(&file, &settings).unwrap();
    let export = processed.export.unwrap();
    assert_eq!(export.file_name, "people.xlsx");
    assert_eq!(export.mime, XLSX_MIME);

    let reloaded = DataLoader::ingest(&UploadedFile::new(export.file_name, export.bytes)).unwrap();
    assert_eq!(reloaded, processed.table);
    assert_eq!(reloaded.kind("age"), Some(ColumnKind::Numeric));
    assert_eq!(
        reloaded.column_cells("city").unwrap(),
        vec![Cell::from("Oslo"), Cell::from("Rome"), Cell::Missing]
    );
}

#[test]
fn csv_round_trip_preserves_table() {
    let table = Table::from_cells(vec![
        ("id", vec![Cell::from("x, y"), Cell::from("quote \" here"), Cell::Missing]),
        ("v", vec![Cell::Number(0.5), Cell::Missing, Cell::Number(-2.0)]),
    ])
    .unwrap();
    let bytes = Exporter::to_csv(&table).unwrap();
    let reloaded = DataLoader::read_csv(&bytes).unwrap();
    assert_eq!(reloaded, table);
}

#[test]
fn batch_with_unsupported_file_still_processes_the_rest() {
    let pipeline = Pipeline::new(SweeperConfig::default());
    let files = vec![
        UploadedFile::new("report.pdf", b"%PDF-1.7".to_vec()),
        UploadedFile::new("data.xlsx", workbook(&sample_table())),
        UploadedFile::new("notes.csv", b"word\nhello\n".to_vec()),
    ];
    let outcomes = pipeline.process_batch(&files, |file| FileSettings {
        visualize: true,
        export: file.name().ends_with(".xlsx").then_some(ExportFormat::Csv),
        ..FileSettings::default()
    });

    assert_eq!(outcomes.len(), 3);
    match &outcomes[0].result {
        Err(SweepError::UnsupportedFormat { extension }) => assert_eq!(extension, ".pdf"),
        other => panic!("expected unsupported format, got {:?}", other),
    }
    assert!(outcomes[0].result.as_ref().unwrap_err().to_string().contains(".pdf"));

    let data = outcomes[1].result.as_ref().unwrap();
    assert_eq!(outcomes[1].file_name, "data.xlsx");
    assert_eq!(
        data.summary.as_ref().unwrap().column_names(),
        vec!["a", "b"]
    );
    assert_eq!(data.export.as_ref().unwrap().file_name, "data.csv");

    let notes = outcomes[2].result.as_ref().unwrap();
    assert_eq!(notes.summary, Some(NumericSummary::NoNumericColumns));
    assert!(notes.export.is_none());
}

#[test]
fn corrupt_workbook_is_malformed_input() {
    let pipeline = Pipeline::new(SweeperConfig::default());
    let file = UploadedFile::new("broken.xlsx", b"PK\x03\x04 not really".to_vec());
    let err = pipeline.run(&file, &FileSettings::default()).unwrap_err();
    assert!(matches!(err, SweepError::MalformedInput { .. }));
    assert!(err.is_input_error());
}
