use std::fs;

use omop_ingest::read_csv_table;

#[test]
fn reads_headers_and_trims_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("moca.csv");
    fs::write(
        &path,
        "Institute File number,Test Upload Date,MoCA Total Score\n 1024 ,03/01/2024, 27\n,,\n2048,03/02/2024,22\n",
    )
    .expect("write csv");

    let table = read_csv_table(&path).expect("read table");
    assert_eq!(
        table.headers,
        vec![
            "Institute File number".to_string(),
            "Test Upload Date".to_string(),
            "MoCA Total Score".to_string()
        ]
    );
    // The all-blank record is dropped.
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(0, "Institute File number"), Some("1024"));
    assert_eq!(table.cell(1, "MoCA Total Score"), Some("22"));
}

#[test]
fn short_records_pad_to_header_width() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("short.csv");
    fs::write(&path, "A,B,C\n1,2\n").expect("write csv");

    let table = read_csv_table(&path).expect("read table");
    assert_eq!(table.cell(0, "C"), Some(""));
}
