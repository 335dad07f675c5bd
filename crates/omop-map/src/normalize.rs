/// Normalize a display name for matching source columns against mapping
/// rows: lowercase, truncate at the first `(`, strip spaces.
///
/// Lab exports suffix column names with units in parentheses and the
/// mapping table does not, so truncation is what actually lines the two
/// up. The LDL cholesterol panel appears both as "LDL Cholesterol
/// Calculation" and "LDL Cholesterol (calculated field)"; both collapse to
/// the base name.
pub fn normalize_test_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let truncated = lowered.split('(').next().unwrap_or("");
    let mut normalized: String = truncated.chars().filter(|ch| *ch != ' ').collect();
    if normalized.starts_with("ldlcholesterol") {
        normalized = "ldlcholesterol".to_string();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_units_and_spaces() {
        assert_eq!(normalize_test_name("Glucose (mg/dL)"), "glucose");
        assert_eq!(normalize_test_name("NT-proBNP"), "nt-probnp");
        assert_eq!(normalize_test_name("Alkaline Phosphatase (U/L)"), "alkalinephosphatase");
    }

    #[test]
    fn ldl_variants_collapse_to_base_name() {
        assert_eq!(
            normalize_test_name("LDL Cholesterol (calculated field)"),
            "ldlcholesterol"
        );
        assert_eq!(
            normalize_test_name("LDL Cholesterol Calculation"),
            "ldlcholesterol"
        );
    }
}
