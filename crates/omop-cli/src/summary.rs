//! Operator-facing run summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::pipeline::{AssessmentReport, LabsReport};

pub fn print_labs_summary(report: &LabsReport) {
    let mut table = new_table();
    add_count_row(&mut table, "Source workbooks", report.sources, None);
    add_count_row(&mut table, "Sheets processed", report.sheets, None);
    add_count_row(&mut table, "Records normalized", report.normalized, None);
    add_count_row(&mut table, "Rejected", report.rejected, Some(Color::Yellow));
    add_count_row(
        &mut table,
        "Dropped by validity filter",
        report.filtered_out,
        Some(Color::Yellow),
    );
    add_count_row(&mut table, "Appended", report.appended, None);
    table.add_row(vec![
        Cell::new("Append verified"),
        verification_cell(report.verified),
    ]);
    add_count_row(&mut table, "Elapsed (ms)", report.elapsed_ms as usize, None);
    println!("Laboratory run");
    println!("{table}");
}

pub fn print_assessment_summary(report: &AssessmentReport) {
    let mut table = new_table();
    add_count_row(&mut table, "Source exports", report.sources, None);
    add_count_row(&mut table, "Measurements normalized", report.measurements, None);
    add_count_row(&mut table, "Observations normalized", report.observations, None);
    add_count_row(
        &mut table,
        "Blank cells skipped",
        report.skipped,
        Some(Color::DarkGrey),
    );
    add_count_row(
        &mut table,
        "Subjects without a date",
        report.missing_date,
        Some(Color::Yellow),
    );
    add_count_row(
        &mut table,
        "Dropped by validity filter",
        report.filtered_out,
        Some(Color::Yellow),
    );
    add_count_row(
        &mut table,
        "Measurements appended",
        report.appended_measurements,
        None,
    );
    add_count_row(
        &mut table,
        "Observations appended",
        report.appended_observations,
        None,
    );
    add_count_row(&mut table, "Elapsed (ms)", report.elapsed_ms as usize, None);
    println!("Cognitive-assessment run");
    println!("{table}");
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![header_cell("Stage"), header_cell("Count")]);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn add_count_row(table: &mut Table, label: &str, count: usize, highlight: Option<Color>) {
    let cell = match highlight {
        Some(color) if count > 0 => Cell::new(count).fg(color).add_attribute(Attribute::Bold),
        _ => Cell::new(count),
    };
    table.add_row(vec![Cell::new(label), cell]);
}

fn verification_cell(verified: Option<bool>) -> Cell {
    match verified {
        Some(true) => Cell::new("ok").fg(Color::Green),
        Some(false) => Cell::new("MISMATCH")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}
