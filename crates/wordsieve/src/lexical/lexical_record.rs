use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::{
    errors::WSResult,
    types::{Count, Rank},
};

/// Derived statistics for one frequency list token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalRecord {
    /// The token text.
    pub token: String,

    /// 1-based rank in the full frequency list.
    pub rank: Rank,

    /// The token's count.
    pub count: Count,

    /// `count / (sum of all counts)`.
    pub probability: f64,

    /// Is the token in the selected vocabulary?
    pub is_selected: bool,
}

/// Summary of a lexical data write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexicalDataSummary {
    /// The number of records written.
    pub records: usize,

    /// The number of records with `is_selected`.
    pub selected: usize,
}

/// Write lexical records as newline-delimited JSON.
///
/// Stops at the first error; records before it have already been written.
pub fn write_lexical_data<W, I>(
    writer: &mut W,
    records: I,
) -> WSResult<LexicalDataSummary>
where
    W: Write,
    I: IntoIterator<Item = WSResult<LexicalRecord>>,
{
    let mut summary = LexicalDataSummary::default();
    for record in records {
        let record = record?;
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;

        summary.records += 1;
        if record.is_selected {
            summary.selected += 1;
        }
    }
    writer.flush()?;
    Ok(summary)
}

/// Read newline-delimited JSON lexical records.
pub fn read_lexical_data<R: BufRead>(reader: R) -> impl Iterator<Item = WSResult<LexicalRecord>> {
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<LexicalRecord>()
        .map(|r| r.map_err(Into::into))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn record(
        token: &str,
        rank: Rank,
        count: Count,
        probability: f64,
        is_selected: bool,
    ) -> LexicalRecord {
        LexicalRecord {
            token: token.to_string(),
            rank,
            count,
            probability,
            is_selected,
        }
    }

    #[test]
    fn test_jsonl_layout() {
        let records = vec![Ok(record("kissa", 1, 100, 0.5, true)), Ok(record("koira", 2, 100, 0.5, false))];

        let mut buf = Vec::new();
        let summary = write_lexical_data(&mut buf, records).unwrap();
        assert_eq!(summary, LexicalDataSummary { records: 2, selected: 1 });

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            r#"{"token":"kissa","rank":1,"count":100,"probability":0.5,"is_selected":true}"#
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_read_back() {
        let written = vec![record("talo", 3, 80, 0.2962962962962963, true)];

        let mut buf = Vec::new();
        write_lexical_data(&mut buf, written.iter().cloned().map(Ok)).unwrap();

        let read = read_lexical_data(Cursor::new(buf))
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        assert_eq!(read, written);
    }
}
