//! Rendering of listing rows for the terminal.

use crate::error::Result;
use crate::record::{ListingRow, StaffRecord};

use super::OutputFormat;

const HEADERS: [&str; 5] = ["DATA ID", "ID", "FULL NAME", "BIRTHDAY", "GENDER"];

/// Render records in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_rows(records: &[StaffRecord], format: OutputFormat) -> Result<String> {
    let rows: Vec<ListingRow> = records.iter().map(StaffRecord::to_row).collect();
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
        OutputFormat::Plain => rows
            .iter()
            .map(|row| cells(row).join("\t"))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => table(&rows),
    })
}

fn cells(row: &ListingRow) -> [&str; 5] {
    [
        &row.data_id,
        &row.id,
        &row.full_name,
        &row.birthday,
        row.gender,
    ]
}

fn table(rows: &[ListingRow]) -> String {
    if rows.is_empty() {
        return "No staff records.".to_string();
    }

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(cells(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: [&str; 5]| {
        values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(HEADERS)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|row| line(cells(row))));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Gender;
    use chrono::NaiveDate;

    fn records() -> Vec<StaffRecord> {
        vec![
            StaffRecord {
                data_id: "a1".to_string(),
                id: "S1".to_string(),
                full_name: "Ann Lee".to_string(),
                birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                gender: Gender::Female,
            },
            StaffRecord {
                data_id: "b2".to_string(),
                id: "S2".to_string(),
                full_name: "Bo Tan".to_string(),
                birthday: NaiveDate::from_ymd_opt(1985, 5, 5).unwrap(),
                gender: Gender::Male,
            },
        ]
    }

    #[test]
    fn test_render_plain() {
        let out = render_rows(&records(), OutputFormat::Plain).unwrap();
        assert_eq!(
            out,
            "a1\tS1\tAnn Lee\t1990-01-01\tFemale\nb2\tS2\tBo Tan\t1985-05-05\tMale"
        );
    }

    #[test]
    fn test_render_table() {
        let out = render_rows(&records(), OutputFormat::Table).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("DATA ID  ID  FULL NAME  BIRTHDAY"));
        assert!(lines[1].starts_with("-------  --  ---------"));
        assert_eq!(lines[2], "a1       S1  Ann Lee    1990-01-01  Female");
        assert_eq!(lines[3], "b2       S2  Bo Tan     1985-05-05  Male");
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(
            render_rows(&[], OutputFormat::Table).unwrap(),
            "No staff records."
        );
    }

    #[test]
    fn test_render_json() {
        let out = render_rows(&records(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["dataId"], "a1");
        assert_eq!(value[0]["fullName"], "Ann Lee");
        assert_eq!(value[0]["genderId"], 2);
        assert_eq!(value[0]["gender"], "Female");
        assert_eq!(value[1]["birthday"], "1985-05-05");
    }
}
