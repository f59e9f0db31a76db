// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal delimited-table (CSV) support.
//!
//! Shared by the load-test normalizer (reading the stats table) and the
//! history store (its logs are small fixed-header CSV files). Quoting
//! follows RFC 4180: fields containing commas, quotes or newlines are
//! quoted, and quotes are doubled inside quoted fields.

use std::fmt;

/// A parsed delimited table: one header row plus zero or more data rows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    /// The header row, in original order.
    pub headers: Vec<String>,
    /// The data rows, in original order.
    pub rows: Vec<Vec<String>>,
}

/// A table that failed to parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableParseError {
    line: usize,
    detail: String,
}

impl fmt::Display for TableParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.detail)
    }
}

impl std::error::Error for TableParseError {}

/// Parses a comma-delimited table. The first row is the header; an input
/// with no rows at all is an error (a table without a header has no schema
/// to infer against).
pub fn parse(input: &str) -> Result<Table, TableParseError> {
    let mut records = parse_records(input)?;
    if records.is_empty() {
        return Err(TableParseError {
            line: 1,
            detail: "empty table (no header row)".to_owned(),
        });
    }
    let headers = records.remove(0);
    Ok(Table {
        headers,
        rows: records,
    })
}

fn parse_records(input: &str) -> Result<Vec<Vec<String>>, TableParseError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // True once the current record has any content; a trailing newline must
    // not produce a phantom empty record.
    let mut record_started = false;
    let mut line = 1;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                record_started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                record_started = true;
            }
            '\r' => {
                // Swallowed; the '\n' that follows ends the record. A bare
                // '\r' inside a field is preserved.
                if chars.peek() != Some(&'\n') {
                    field.push(c);
                }
            }
            '\n' => {
                if record_started || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                record_started = false;
                line += 1;
            }
            _ => {
                field.push(c);
                record_started = true;
            }
        }
    }

    if in_quotes {
        return Err(TableParseError {
            line,
            detail: "unterminated quoted field".to_owned(),
        });
    }
    if record_started || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Formats one row, quoting fields as needed. No trailing newline.
pub fn format_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let field = field.as_ref();
        if field.contains(['"', ',', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_headers_and_rows() {
        let table = parse(indoc! {r#"
            Name,# requests,# failures
            /,100,2
            /items,50,0
        "#})
        .unwrap();
        assert_eq!(table.headers, vec!["Name", "# requests", "# failures"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["/".to_owned(), "100".to_owned(), "2".to_owned()],
                vec!["/items".to_owned(), "50".to_owned(), "0".to_owned()],
            ]
        );
    }

    #[test]
    fn quoted_fields_with_commas_and_quotes() {
        let table = parse("Name,Note\n\"/items,all\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(table.rows, vec![vec![
            "/items,all".to_owned(),
            "said \"hi\"".to_owned(),
        ]]);
    }

    #[test]
    fn crlf_line_endings() {
        let table = parse("Name,Count\r\n/,1\r\n").unwrap();
        assert_eq!(table.headers, vec!["Name", "Count"]);
        assert_eq!(table.rows, vec![vec!["/".to_owned(), "1".to_owned()]]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = parse("Name\n\"/items\ntruncated").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse("").is_err());
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = parse("Name,Count\n").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn format_row_round_trips_through_parse() {
        let row = format_row(["/items,all", "say \"hi\"", "plain"]);
        assert_eq!(row, "\"/items,all\",\"say \"\"hi\"\"\",plain");
        let parsed = parse(&format!("h1,h2,h3\n{row}\n")).unwrap();
        assert_eq!(parsed.rows[0], vec!["/items,all", "say \"hi\"", "plain"]);
    }
}
