//! Roster file source - project one column of a delimited text file.
//!
//! Handles the plain comma- or tab-delimited rosters that circulate in
//! helpdesk tickets: a header row naming the columns, one target per row,
//! double quotes around fields that contain the delimiter:
//!
//! ```text
//! upn,displayName,department
//! jo@contoso.com,"Bloggs, Jo",Finance
//! sam@contoso.com,Sam Patel,Sales
//! ```

use fanout::{Batch, Identity, IdentitySource, SourceError};
use std::path::{Path, PathBuf};

/// A delimited roster file with a named identity column.
pub struct RosterFile {
    path: PathBuf,
    column: String,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            column: column.into(),
        }
    }
}

impl IdentitySource for RosterFile {
    fn load(&self) -> Result<Batch, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            SourceError::lookup(format!("could not read {}: {e}", self.path.display()))
        })?;
        parse_roster(&content, &self.column, &self.path)
    }
}

/// Parse roster content, projecting `column` from every data row.
///
/// Blank projected values are kept - the driver reports them as skipped so
/// the summary accounts for every row of the input.
fn parse_roster(content: &str, column: &str, path: &Path) -> Result<Batch, SourceError> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| SourceError::format(format!("{} is empty", path.display())))?;
    let delimiter = detect_delimiter(header);

    let columns = split_row(header, delimiter);
    let index = columns
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            SourceError::format(format!(
                "column '{column}' not found in {} (columns: {})",
                path.display(),
                columns.join(", ")
            ))
        })?;

    let mut identities = Vec::new();
    for (line_num, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_row(line, delimiter);
        if fields.len() <= index {
            return Err(SourceError::format(format!(
                "{} line {}: expected at least {} fields, found {}",
                path.display(),
                line_num + 2,
                index + 1,
                fields.len()
            )));
        }

        identities.push(Identity::new(fields[index].trim()));
    }

    Ok(Batch::new(identities))
}

/// A tab anywhere in the header means a tab-delimited roster; otherwise
/// comma.
fn detect_delimiter(header: &str) -> char {
    if header.contains('\t') { '\t' } else { ',' }
}

/// Split one row into fields, honoring double quotes. A doubled quote
/// inside a quoted field is an escaped quote.
fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let line = line.trim_end_matches('\r');
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(content: &str, column: &str) -> Result<Batch, SourceError> {
        parse_roster(content, column, Path::new("users.csv"))
    }

    fn tokens(batch: &Batch) -> Vec<String> {
        batch.iter().map(|i| i.as_str().to_string()).collect()
    }

    #[test]
    fn projects_named_column() {
        let batch = parse(
            "upn,displayName\njo@contoso.com,Jo\nsam@contoso.com,Sam\n",
            "upn",
        )
        .unwrap();
        assert_eq!(tokens(&batch), vec!["jo@contoso.com", "sam@contoso.com"]);
    }

    #[test]
    fn column_match_is_case_insensitive() {
        let batch = parse("UPN,name\njo@contoso.com,Jo\n", "upn").unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn detects_tab_delimiter() {
        let batch = parse("upn\tname\njo@contoso.com\tJo\n", "upn").unwrap();
        assert_eq!(tokens(&batch), vec!["jo@contoso.com"]);
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let batch = parse(
            "name,upn\n\"Bloggs, Jo\",jo@contoso.com\n",
            "name",
        )
        .unwrap();
        assert_eq!(tokens(&batch), vec!["Bloggs, Jo"]);
    }

    #[test]
    fn doubled_quotes_are_escaped() {
        let fields = split_row(r#""say ""hi""",x"#, ',');
        assert_eq!(fields, vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn missing_column_is_format_error() {
        let err = parse("upn,name\njo@contoso.com,Jo\n", "mail").unwrap_err();
        assert!(matches!(err, SourceError::Format { .. }));
        assert!(err.to_string().contains("'mail'"));
    }

    #[test]
    fn short_row_is_format_error() {
        let err = parse("upn,name\njo@contoso.com,Jo\nonly-one-field\n", "name").unwrap_err();
        assert!(matches!(err, SourceError::Format { .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn blank_values_are_preserved_for_the_driver() {
        let batch = parse("upn,name\n,NoUpn\njo@contoso.com,Jo\n", "upn").unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().next().unwrap().is_blank());
    }

    #[test]
    fn blank_lines_are_not_rows() {
        let batch = parse("upn\njo@contoso.com\n\n\nsam@contoso.com\n", "upn").unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn crlf_line_endings() {
        let batch = parse("upn,name\r\njo@contoso.com,Jo\r\n", "upn").unwrap();
        assert_eq!(tokens(&batch), vec!["jo@contoso.com"]);
    }

    #[test]
    fn unreadable_file_is_lookup_error() {
        let source = RosterFile::new("/nonexistent/users.csv", "upn");
        let err = source.load().unwrap_err();
        assert!(matches!(err, SourceError::Lookup { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host,site").unwrap();
        writeln!(file, "dc01,HQ").unwrap();
        writeln!(file, "dc02,Branch").unwrap();

        let source = RosterFile::new(file.path(), "host");
        let batch = source.load().unwrap();
        assert_eq!(tokens(&batch), vec!["dc01", "dc02"]);
    }
}
