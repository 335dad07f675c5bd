use omop_ingest::CsvTable;
use omop_model::Interval;
use omop_transform::ranges::{
    NormalRangeTable, RangeTables, Sex, parse_interval_text, resolve_reference_interval,
};
use proptest::prelude::*;

fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
    CsvTable::new(
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect(),
    )
}

const RANGE_COLUMNS: &[&str] = &["Sex", "Age_Low", "Age_High", "Range_Low", "Range_High"];

fn nt_probnp_table() -> NormalRangeTable {
    NormalRangeTable::from_table(&table(
        RANGE_COLUMNS,
        &[
            &["F", "18y", "50y", "0", "130"],
            &["F", "50y", "75y", "0", "249"],
            &["M", "18y", "50y", "0", "85"],
            &["M", "50y", "75y", "0", "161"],
            &["Sex", "Age_Low", "Age_High", "Range_Low", "Range_High"],
        ],
    ))
    .expect("well-formed range table")
}

fn range_tables() -> RangeTables {
    let alp = NormalRangeTable::from_table(&table(
        RANGE_COLUMNS,
        &[
            &["F", "18y", "120y", "35", "104"],
            &["M", "18y", "120y", "40", "129"],
        ],
    ))
    .expect("well-formed range table");
    RangeTables {
        nt_probnp: nt_probnp_table(),
        alkaline_phosphatase: alp,
    }
}

#[test]
fn lookup_requires_exactly_one_matching_band() {
    let table_ = nt_probnp_table();
    assert_eq!(table_.lookup(40.0, Sex::F), Some(Interval::new(0.0, 130.0)));
    // 50 falls in both bands.
    assert_eq!(table_.lookup(50.0, Sex::F), None);
    // Outside every band.
    assert_eq!(table_.lookup(90.0, Sex::M), None);
}

#[test]
fn sexless_range_is_the_superinterval_of_both_sexes() {
    let table_ = nt_probnp_table();
    assert_eq!(table_.sexless_range(40.0), Some(Interval::new(0.0, 130.0)));
    assert_eq!(table_.sexless_range(90.0), None);
}

#[test]
fn annotation_rows_are_dropped_not_fatal() {
    // The repeated-header row in nt_probnp_table has sex "Sex" and is
    // skipped; four data rows remain.
    let table_ = nt_probnp_table();
    assert_eq!(table_.lookup(60.0, Sex::M), Some(Interval::new(0.0, 161.0)));
}

#[test]
fn lookup_backed_tests_resolve_through_their_tables() {
    let tables = range_tables();
    assert_eq!(
        resolve_reference_interval("NT-proBNP", Some("see table"), 40.0, &tables),
        Some(Interval::new(0.0, 130.0))
    );
    assert_eq!(
        resolve_reference_interval("Alkaline Phosphatase", Some("see table"), 40.0, &tables),
        Some(Interval::new(35.0, 129.0))
    );
    // Either sex unresolvable fails the record.
    assert_eq!(
        resolve_reference_interval("NT-proBNP", Some("see table"), 90.0, &tables),
        None
    );
}

#[test]
fn empty_reference_text_means_no_known_range() {
    let tables = range_tables();
    assert_eq!(
        resolve_reference_interval("NT-proBNP", None, 40.0, &tables),
        Some(Interval::UNKNOWN)
    );
    assert_eq!(
        resolve_reference_interval("Glucose", Some("  "), 40.0, &tables),
        Some(Interval::UNKNOWN)
    );
}

#[test]
fn named_test_text_resolves_without_the_grammar() {
    let tables = range_tables();
    assert_eq!(
        resolve_reference_interval("Troponin-T", Some("Female: <11; Male <16"), 40.0, &tables),
        Some(Interval::new(0.0, 16.0))
    );
    assert_eq!(
        resolve_reference_interval("ALT (GPT)", Some("F(7, 33); M <=49y (10, 64), >49y (10, 48)"), 40.0, &tables),
        Some(Interval::new(7.0, 64.0))
    );
    assert_eq!(
        resolve_reference_interval("ALT (GPT)", Some("F(7, 33); M <=49y (10, 64), >49y (10, 48)"), 60.0, &tables),
        Some(Interval::new(7.0, 48.0))
    );
}

// The renal-function text happens to also fit the generic sex-clause
// grammar; both paths must agree so the special case can never drift.
#[test]
fn creatinine_agrees_with_the_generic_grammar() {
    let tables = range_tables();
    let text = "Female: 0.38-1.02, Male: 0.51-1.18";
    let special = resolve_reference_interval("Creatinine", Some(text), 40.0, &tables);
    let generic = resolve_reference_interval("unlisted test", Some(text), 40.0, &tables);
    assert_eq!(special, Some(Interval::new(0.38, 1.18)));
    assert_eq!(special, generic);
}

#[test]
fn one_sided_intervals_put_zero_on_the_unbounded_side() {
    assert_eq!(parse_interval_text("<=5"), Some(Interval::new(0.0, 5.0)));
    assert_eq!(parse_interval_text("<5"), Some(Interval::new(0.0, 5.0)));
    assert_eq!(parse_interval_text(">=1.5"), Some(Interval::new(1.5, 0.0)));
    assert_eq!(parse_interval_text(">1.5"), Some(Interval::new(1.5, 0.0)));
    assert_eq!(parse_interval_text("normal"), None);
}

proptest! {
    #[test]
    fn hyphen_pairs_round_trip(low in 0.0f64..10_000.0, high in 0.0f64..10_000.0) {
        let text = format!("{low}-{high}");
        let parsed = parse_interval_text(&text).expect("hyphen pair parses");
        prop_assert_eq!(parsed, Interval::new(low, high));
    }

    #[test]
    fn superinterval_takes_min_low_max_high(
        a_low in -1_000.0f64..1_000.0,
        a_high in -1_000.0f64..1_000.0,
        b_low in -1_000.0f64..1_000.0,
        b_high in -1_000.0f64..1_000.0,
    ) {
        let a = Interval::new(a_low, a_high);
        let b = Interval::new(b_low, b_high);
        let joined = a.superinterval(b);
        prop_assert_eq!(joined, b.superinterval(a));
        prop_assert_eq!(joined.low, a_low.min(b_low));
        prop_assert_eq!(joined.high, a_high.max(b_high));
    }
}
