use crate::models::{ColumnBatch, LogRow};

/// Rows parsed out of one read, plus how many of the input lines they used up.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    pub batch: ColumnBatch,
    /// Lines consumed from `start`, including blank ones.
    pub lines: usize,
}

impl ParsedBatch {
    pub fn rows(&self) -> usize {
        self.batch.len()
    }
}

/// Converts rows `start..` of `lines` into columns, stopping at the first
/// line that is not a complete entry.
pub fn rows_to_columns<'a, I>(lines: I, start: usize) -> ParsedBatch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = ParsedBatch::default();
    for line in lines.into_iter().skip(start) {
        let line = line.trim_end();
        if line.is_empty() {
            parsed.lines += 1;
            continue;
        }
        match parse_row(line) {
            Some(row) => {
                parsed.batch.push(row);
                parsed.lines += 1;
            }
            None => break,
        }
    }
    parsed
}

pub fn parse_row(line: &str) -> Option<LogRow> {
    if !line.ends_with('}') {
        return None;
    }
    serde_json::from_str(line).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    const LINES: [&str; 3] = [
        r#"{"time":"2019-05-14 12:05:52","ip":"10.0.191.219","status_code":303}"#,
        r#"{"time":"2019-05-14 13:00:00","ip":"10.0.0.7","status_code":503}"#,
        r#"{"time":"2019-05-15 01:00:00","ip":"10.0.0.8","status_code":500,"extra":true}"#,
    ];

    #[test]
    fn known_batch_becomes_columns() {
        let parsed = rows_to_columns(LINES, 0);
        assert_that!(parsed.rows()).is_equal_to(3);
        assert_that!(parsed.lines).is_equal_to(3);
        assert_eq!(
            serde_json::to_value(&parsed.batch).unwrap(),
            serde_json::json!({
                "time": ["2019-05-14 12:05:52", "2019-05-14 13:00:00", "2019-05-15 01:00:00"],
                "ip": ["10.0.191.219", "10.0.0.7", "10.0.0.8"],
                "status_code": [303, 503, 500],
            })
        );
    }

    #[test]
    fn start_offset_skips_counted_rows() {
        let parsed = rows_to_columns(LINES, 2);
        assert_that!(parsed.batch.ip().to_vec()).is_equal_to(vec!["10.0.0.8".to_string()]);
    }

    #[test]
    fn partial_trailing_line_is_left_alone() {
        let lines = [LINES[0], r#"{"time":"2019-05-14 13:00:00","ip":"10.0"#];
        let parsed = rows_to_columns(lines, 0);
        assert_that!(parsed.rows()).is_equal_to(1);
        assert_that!(parsed.lines).is_equal_to(1);
    }

    #[test]
    fn malformed_line_ends_the_batch() {
        let lines = [LINES[0], r#"{"time":"never","ip":"x","status_code":1}"#, LINES[1]];
        let parsed = rows_to_columns(lines, 0);
        assert_that!(parsed.rows()).is_equal_to(1);
    }

    #[test]
    fn blank_lines_are_consumed_but_not_rows() {
        let lines = [LINES[0], "", LINES[1]];
        let parsed = rows_to_columns(lines, 0);
        assert_that!(parsed.rows()).is_equal_to(2);
        assert_that!(parsed.lines).is_equal_to(3);
    }

    #[test]
    fn empty_input() {
        let parsed = rows_to_columns(std::iter::empty::<&str>(), 0);
        assert_that!(parsed.batch.is_empty()).is_true();
    }
}
