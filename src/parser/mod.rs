//! CSV/TSV text to header-keyed records.
//!
//! Field splitting is delegated to the `csv` crate in flexible mode, so
//! ragged rows and sloppy quoting degrade to a best-effort field boundary
//! instead of failing the whole input. An unterminated quote costs only the
//! line it starts on.

use std::sync::Arc;

use csv::{ByteRecord, ReaderBuilder, Trim};

use crate::domain::{HeaderIndex, RawRecord};

/// Parsed table: the header row plus every non-blank data row in input order.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Arc<HeaderIndex>,
    pub records: Vec<RawRecord>,
}

impl CsvTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for CsvTable {
    type Item = RawRecord;
    type IntoIter = std::vec::IntoIter<RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Tab if the first non-blank line has a tab and no comma, otherwise comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    if first_line.contains('\t') && !first_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}

/// Parse raw CSV or TSV text.
///
/// The first non-blank line is the header row. Blank lines are skipped,
/// short rows are padded with empty values and long rows are truncated.
/// Never fails: unreadable rows are logged and dropped.
pub fn parse(raw_text: &str) -> CsvTable {
    let text = normalize_newlines(raw_text.trim_start_matches('\u{feff}'));
    let delimiter = detect_delimiter(&text);

    let mut headers: Option<Arc<HeaderIndex>> = None;
    let mut records = Vec::new();

    for values in read_rows(text.as_bytes(), delimiter) {
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        match &headers {
            None => headers = Some(Arc::new(HeaderIndex::new(values))),
            Some(index) => records.push(RawRecord::new(index.clone(), values)),
        }
    }

    let headers = headers.unwrap_or_default();
    tracing::debug!(
        "Parsed {} records with {} columns (delimiter {:?})",
        records.len(),
        headers.len(),
        delimiter as char
    );

    CsvTable { headers, records }
}

fn reader_builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None);
    builder
}

/// Split `bytes` into rows of decoded fields.
///
/// A quote left open until end of input would otherwise swallow every later
/// row into one field. When that happens the line the broken record starts
/// on is read with quoting disabled and parsing resumes on the next line.
fn read_rows(bytes: &[u8], delimiter: u8) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let mut reader = reader_builder(delimiter).from_reader(rest);
        let mut record = ByteRecord::new();
        let mut resume_at = None;

        loop {
            let start = reader.position().byte() as usize;
            match reader.read_byte_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    let end = reader.position().byte() as usize;
                    if end >= rest.len() && has_open_quote(&rest[start.min(end)..end]) {
                        let line_start = start + rest[start..].iter().take_while(|&&b| b == b'\n').count();
                        let line_end = rest[line_start..]
                            .iter()
                            .position(|&b| b == b'\n')
                            .map_or(rest.len(), |nl| line_start + nl + 1);
                        tracing::warn!(
                            "Unterminated quote in row starting at byte {}; reading that line literally",
                            offset + line_start
                        );
                        rows.extend(read_unquoted(&rest[line_start..line_end], delimiter));
                        resume_at = Some(offset + line_end);
                        break;
                    }
                    rows.push(decode_fields(&record));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable CSV row {}: {}", rows.len() + 1, e);
                }
            }
        }

        match resume_at {
            Some(next) => offset = next,
            None => break,
        }
    }

    rows
}

fn read_unquoted(line: &[u8], delimiter: u8) -> Vec<Vec<String>> {
    let mut builder = reader_builder(delimiter);
    builder.quoting(false);
    builder
        .from_reader(line)
        .into_byte_records()
        .filter_map(|result| result.ok())
        .map(|record| decode_fields(&record))
        .collect()
}

fn has_open_quote(raw: &[u8]) -> bool {
    raw.iter().filter(|&&b| b == b'"').count() % 2 == 1
}

fn decode_fields(row: &ByteRecord) -> Vec<String> {
    row.iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_csv() {
        let table = parse("Title,URL\nFirst,https://example.com/1\nSecond,https://example.com/2\n");
        assert_eq!(table.headers.names(), &["Title", "URL"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("title"), Some("First"));
        assert_eq!(table.records[1].get("url"), Some("https://example.com/2"));
    }

    #[test]
    fn test_crlf_and_lone_cr_are_normalized() {
        let table = parse("Title,URL\r\nA,https://a.test\rB,https://b.test\r\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("url"), Some("https://a.test"));
        assert_eq!(table.records[1].get("title"), Some("B"));
    }

    #[test]
    fn test_tab_delimiter_detected_from_first_line() {
        assert_eq!(detect_delimiter("Title\tURL\nA,B\tC"), b'\t');
        assert_eq!(detect_delimiter("Title,URL\tX"), b',');
        assert_eq!(detect_delimiter("Title"), b',');

        let table = parse("Title\tURL\nA, with comma\thttps://a.test\n");
        assert_eq!(table.records[0].get("title"), Some("A, with comma"));
        assert_eq!(table.records[0].get("url"), Some("https://a.test"));
    }

    #[test]
    fn test_quoted_fields() {
        let text = "Title,Summary\n\"Hello, world\",\"She said \"\"hi\"\"\"\n";
        let table = parse(text);
        assert_eq!(table.records[0].get("title"), Some("Hello, world"));
        assert_eq!(table.records[0].get("summary"), Some("She said \"hi\""));
    }

    #[test]
    fn test_quoted_field_with_embedded_newline() {
        let text = "Title,Summary\r\nA,\"line one\r\nline two\"\r\nB,plain\r\n";
        let table = parse(text);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("summary"), Some("line one\nline two"));
        assert_eq!(table.records[1].get("title"), Some("B"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let table = parse("Title,URL\n\n   \nA,https://a.test\n\n");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ragged_rows_do_not_abort() {
        let table = parse("a,b,c\n1\n1,2,3,4,5\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("c"), Some(""));
        assert_eq!(table.records[1].get("c"), Some("3"));
    }

    #[test]
    fn test_malformed_quote_degrades_gracefully() {
        let table = parse("Title,URL\nok,https://a.test\n\"unterminated,https://b.test\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("title"), Some("ok"));
        assert_eq!(table.records[1].get("url"), Some("https://b.test"));
    }

    #[test]
    fn test_unterminated_quote_does_not_swallow_later_rows() {
        let text = "Title,URL\nFirst,https://x.test/1\n\"Broken,https://x.test/2\nThird,https://x.test/3\nFourth,https://x.test/4\n";
        let table = parse(text);
        let titles: Vec<_> = table.records.iter().map(|r| r.get("title").unwrap_or("")).collect();
        assert_eq!(titles, ["First", "\"Broken", "Third", "Fourth"]);
        assert_eq!(table.records[1].get("url"), Some("https://x.test/2"));
        assert_eq!(table.records[3].get("url"), Some("https://x.test/4"));
    }

    #[test]
    fn test_delimiter_from_first_non_blank_line() {
        assert_eq!(detect_delimiter("\n  \nTitle\tURL\nA, b\tC"), b'\t');

        let table = parse("\nTitle\tURL\nA, b\thttps://x.test/1\n");
        assert_eq!(table.headers.names(), &["Title", "URL"]);
        assert_eq!(table.records[0].get("title"), Some("A, b"));
        assert_eq!(table.records[0].get("url"), Some("https://x.test/1"));
    }

    #[test]
    fn test_headers_trimmed_and_bom_stripped() {
        let table = parse("\u{feff} Title , URL \nA,https://a.test\n");
        assert_eq!(table.headers.names(), &["Title", "URL"]);
        assert_eq!(table.records[0].get("TITLE"), Some("A"));
    }

    #[test]
    fn test_empty_input() {
        let table = parse("");
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }
}
