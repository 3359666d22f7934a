//! CSV encode/decode for buyer import and export.
//!
//! The CSV layer is a boundary concern: it maps flat string rows to typed
//! [`CreateBuyer`] candidates (decode) and buyer records back to rows
//! (encode). Field validation proper happens afterwards in
//! [`crate::validation`]; decoding only reports what cannot be typed at
//! all — unknown enum values, non-numeric budgets, missing required cells.
//!
//! Quoting follows the usual rules: values containing comma, quote, or
//! newline are wrapped in double quotes with embedded quotes doubled.
//! Multi-valued `tags` cells are joined with semicolons.

use crate::buyer::{
    Bhk, BuyerRecord, BuyerStatus, City, CreateBuyer, LeadSource, PropertyType, Purpose, Timeline,
};
use crate::validation::{FieldError, RuleKind, ValidationErrors};

/// Column set and order for both export and import templates.
pub const COLUMNS: &[&str] = &[
    "full_name",
    "email",
    "phone",
    "city",
    "property_type",
    "bhk",
    "purpose",
    "budget_min",
    "budget_max",
    "timeline",
    "source",
    "notes",
    "tags",
    "status",
];

/// Separator for multi-valued cells (tags).
const LIST_SEPARATOR: char = ';';

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or
/// newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Encode buyer records as CSV, header row first.
pub fn encode(records: &[BuyerRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(COLUMNS.join(","));

    for record in records {
        let row = [
            csv_escape(&record.full_name),
            csv_escape(opt_str(&record.email)),
            csv_escape(&record.phone),
            record.city.to_string(),
            record.property_type.to_string(),
            record.bhk.map(|b| b.to_string()).unwrap_or_default(),
            record.purpose.to_string(),
            opt_i64(record.budget_min),
            opt_i64(record.budget_max),
            record.timeline.to_string(),
            record.source.to_string(),
            csv_escape(opt_str(&record.notes)),
            csv_escape(&record.tags.join(&LIST_SEPARATOR.to_string())),
            record.status.to_string(),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Parse a single CSV line, handling quoted fields.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote.
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(current.clone());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}

/// One decoded data row: either a typed candidate or the cell-level errors
/// that prevented typing it.
pub type RowCandidate = Result<CreateBuyer, ValidationErrors>;

struct RowReader<'a> {
    headers: &'a [String],
    values: Vec<String>,
    errors: ValidationErrors,
}

impl<'a> RowReader<'a> {
    /// The trimmed cell under `name`, or `None` when the column is missing
    /// or the cell is empty.
    fn cell(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| self.values.get(i))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn missing(&mut self, name: &str) {
        self.errors.push(FieldError::new(
            name,
            format!("{name} is required"),
            RuleKind::Required,
        ));
    }

    fn required(&mut self, name: &str) -> String {
        match self.cell(name) {
            Some(v) => v,
            None => {
                self.missing(name);
                String::new()
            }
        }
    }

    fn required_enum<T>(&mut self, name: &str) -> Option<T>
    where
        T: std::str::FromStr + crate::buyer::EnumSet,
    {
        match self.cell(name) {
            Some(v) => self.parse_enum(name, &v),
            None => {
                self.missing(name);
                None
            }
        }
    }

    fn optional_enum<T>(&mut self, name: &str) -> Option<T>
    where
        T: std::str::FromStr + crate::buyer::EnumSet,
    {
        let value = self.cell(name)?;
        self.parse_enum(name, &value)
    }

    fn parse_enum<T>(&mut self, name: &str, value: &str) -> Option<T>
    where
        T: std::str::FromStr + crate::buyer::EnumSet,
    {
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.errors.push(FieldError::new(
                    name,
                    format!(
                        "Invalid value '{}' for {}. Allowed: {}",
                        value,
                        name,
                        T::allowed_values()
                    ),
                    RuleKind::Enum,
                ));
                None
            }
        }
    }

    fn optional_number(&mut self, name: &str) -> Option<i64> {
        let value = self.cell(name)?;
        match value.parse::<i64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.errors.push(FieldError::new(
                    name,
                    format!("{name} must be a number"),
                    RuleKind::Type,
                ));
                None
            }
        }
    }
}

/// Decode a CSV document into per-row candidates.
///
/// Document-level problems (empty input, no recognizable header) fail the
/// whole decode; cell-level problems are attached to their row so the
/// import pipeline can report every bad row at once. Blank lines are
/// skipped and do not count as rows.
pub fn decode(data: &str) -> Result<Vec<RowCandidate>, String> {
    let mut lines = data.lines();

    let header_line = lines.next().ok_or("CSV is empty")?;
    let headers: Vec<String> = parse_csv_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if let Some(unknown) = headers.iter().find(|h| !COLUMNS.contains(&h.as_str())) {
        return Err(format!("Unknown CSV column: {unknown}"));
    }
    if !headers.iter().any(|h| h == "full_name") {
        return Err("CSV header must include full_name".to_string());
    }

    let mut rows = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let mut reader = RowReader {
            headers: &headers,
            values: parse_csv_line(line),
            errors: ValidationErrors::default(),
        };

        let full_name = reader.required("full_name");
        let email = reader.cell("email");
        let phone = reader.required("phone");
        let city = reader.required_enum::<City>("city");
        let property_type = reader.required_enum::<PropertyType>("property_type");
        let bhk = reader.optional_enum::<Bhk>("bhk");
        let purpose = reader.required_enum::<Purpose>("purpose");
        let budget_min = reader.optional_number("budget_min");
        let budget_max = reader.optional_number("budget_max");
        let timeline = reader.required_enum::<Timeline>("timeline");
        let source = reader.required_enum::<LeadSource>("source");
        let notes = reader.cell("notes");
        let tags = reader.cell("tags").map(|cell| {
            cell.split(LIST_SEPARATOR)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });
        let status = reader.optional_enum::<BuyerStatus>("status");

        match (city, property_type, purpose, timeline, source) {
            (Some(city), Some(property_type), Some(purpose), Some(timeline), Some(source))
                if reader.errors.is_empty() =>
            {
                rows.push(Ok(CreateBuyer {
                    full_name,
                    email,
                    phone,
                    city,
                    property_type,
                    bhk,
                    purpose,
                    budget_min,
                    budget_max,
                    timeline,
                    source,
                    status,
                    notes,
                    tags,
                }));
            }
            _ => rows.push(Err(reader.errors)),
        }
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buyer::BuyerRecord;
    use crate::validation::validate_new;

    fn sample_record() -> BuyerRecord {
        BuyerRecord {
            full_name: "John Doe".into(),
            email: Some("john@example.com".into()),
            phone: "9876543210".into(),
            city: City::Chandigarh,
            property_type: PropertyType::Apartment,
            bhk: Some(Bhk::Two),
            purpose: Purpose::Buy,
            budget_min: Some(5_000_000),
            budget_max: Some(7_000_000),
            timeline: Timeline::WithinThreeMonths,
            source: LeadSource::Website,
            status: BuyerStatus::New,
            notes: Some("Looking for investment".into()),
            tags: vec!["vip".into(), "nri".into()],
        }
    }

    #[test]
    fn encode_starts_with_header() {
        let csv = encode(&[]);
        assert_eq!(csv, COLUMNS.join(","));
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let csv = encode(&[sample_record()]);
        let rows = decode(&csv).unwrap();
        assert_eq!(rows.len(), 1);

        let candidate = rows[0].as_ref().unwrap();
        assert_eq!(candidate.full_name, "John Doe");
        assert_eq!(candidate.city, City::Chandigarh);
        assert_eq!(candidate.budget_min, Some(5_000_000));
        assert_eq!(
            candidate.tags.as_deref(),
            Some(&["vip".to_string(), "nri".to_string()][..])
        );

        let record = validate_new(candidate).unwrap();
        assert_eq!(record, sample_record());
    }

    #[test]
    fn commas_and_quotes_survive_encoding() {
        let mut record = sample_record();
        record.notes = Some("Wants 2BHK, said \"call after 6\"".into());

        let csv = encode(&[record.clone()]);
        let rows = decode(&csv).unwrap();
        let candidate = rows[0].as_ref().unwrap();
        assert_eq!(candidate.notes, record.notes);
    }

    #[test]
    fn decode_parses_multiple_valid_rows() {
        let csv = "full_name,email,phone,city,property_type,bhk,purpose,budget_min,budget_max,timeline,source,status,notes\n\
                   John Doe,john@example.com,9876543210,Chandigarh,Apartment,Two,Buy,5000000,7000000,M0_3m,Website,New,Looking for investment\n\
                   Jane Smith,jane@example.com,9876543211,Mohali,Villa,Three,Buy,8000000,10000000,M3_6m,Referral,Qualified,Family home";

        let rows = decode(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.is_ok()));

        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.full_name, "Jane Smith");
        assert_eq!(second.status, Some(BuyerStatus::Qualified));
    }

    #[test]
    fn empty_cells_become_absent_values() {
        let csv = "full_name,email,phone,city,property_type,bhk,purpose,budget_min,budget_max,timeline,source,status,notes\n\
                   John Doe,,9876543210,Chandigarh,Plot,,Buy,,,M0_3m,Website,New,";

        let rows = decode(csv).unwrap();
        let candidate = rows[0].as_ref().unwrap();
        assert_eq!(candidate.email, None);
        assert_eq!(candidate.bhk, None);
        assert_eq!(candidate.budget_min, None);
        assert_eq!(candidate.notes, None);
    }

    #[test]
    fn invalid_enum_cell_reports_allowed_values() {
        let csv = "full_name,phone,city,property_type,purpose,timeline,source\n\
                   John Doe,9876543210,Atlantis,Apartment,Buy,M0_3m,Website";

        let rows = decode(csv).unwrap();
        let errors = rows[0].as_ref().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "city");
        assert_eq!(errors.0[0].rule, RuleKind::Enum);
        assert!(errors.0[0].message.contains("Allowed: Chandigarh"));
    }

    #[test]
    fn non_numeric_budget_is_a_type_error() {
        let csv = "full_name,phone,city,property_type,bhk,purpose,budget_min,timeline,source\n\
                   John Doe,9876543210,Chandigarh,Apartment,Two,Buy,lots,M0_3m,Website";

        let rows = decode(csv).unwrap();
        let errors = rows[0].as_ref().unwrap_err();
        assert_eq!(errors.0[0].field, "budget_min");
        assert_eq!(errors.0[0].rule, RuleKind::Type);
    }

    #[test]
    fn missing_required_cells_are_collected_together() {
        let csv = "full_name,phone,city,property_type,purpose,timeline,source\n\
                   ,9876543210,,Apartment,Buy,M0_3m,Website";

        let rows = decode(csv).unwrap();
        let errors = rows[0].as_ref().unwrap_err();
        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"full_name"));
        assert!(fields.contains(&"city"));
    }

    #[test]
    fn unknown_column_fails_the_document() {
        let csv = "full_name,phone,shoe_size\nJohn,9876543210,44";
        let err = decode(csv).unwrap_err();
        assert!(err.contains("shoe_size"));
    }

    #[test]
    fn empty_document_fails() {
        assert!(decode("").is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let csv = "full_name,phone,city,property_type,purpose,timeline,source\n\
                   \n\
                   John Doe,9876543210,Chandigarh,Plot,Buy,M0_3m,Website\n\
                   \n";
        let rows = decode(csv).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
