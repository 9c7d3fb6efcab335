//! CSV record output

use crate::output::{ensure_parent_dir, OutputResult};
use crate::record::Record;
use std::io::Write;
use std::path::Path;

/// Column names, in `Record` field order
pub const CSV_HEADER: [&str; 7] = [
    "name",
    "source_url",
    "level",
    "address",
    "city",
    "state",
    "postal_code",
];

/// Writes records to a CSV file, creating parent directories as needed
///
/// The header row is written even when there are no records.
pub fn write_csv(records: &[Record], path: &Path) -> OutputResult<()> {
    ensure_parent_dir(path)?;
    let file = std::fs::File::create(path)?;
    write_csv_to(records, file)
}

/// Writes records as CSV to any writer
pub fn write_csv_to<W: Write>(records: &[Record], writer: W) -> OutputResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    fn render(records: &[Record]) -> String {
        let mut buffer = Vec::new();
        write_csv_to(records, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_input() {
        let output = render(&[]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["name,source_url,level,address,city,state,postal_code"]
        );
    }

    #[test]
    fn test_rows_follow_header() {
        let records = vec![
            Record::new("Infomart", "https://example.com/usa/texas/dallas/infomart/", Level::City)
                .unwrap()
                .with_city(Some("Dallas".to_string()))
                .with_state(Some("Texas".to_string())),
            Record::new("Texas", "https://example.com/usa/texas/", Level::Index).unwrap(),
        ];

        let output = render(&records);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Infomart,https://example.com/usa/texas/dallas/infomart/,city,,Dallas,Texas,"
        );
        assert_eq!(lines[2], "Texas,https://example.com/usa/texas/,index,,,,");
    }

    #[test]
    fn test_quotes_embedded_commas_and_quotes() {
        let records = vec![Record::new(
            r#"Digital Realty, "DFW" Campus"#,
            "https://example.com/x",
            Level::City,
        )
        .unwrap()];

        let output = render(&records);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[1],
            r#""Digital Realty, ""DFW"" Campus",https://example.com/x,city,,,,"#
        );
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let records = vec![Record::new("A", "https://example.com/a", Level::City).unwrap()];

        write_csv(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,source_url,level"));
        assert!(content.contains("A,https://example.com/a,city"));
    }
}
