//! CSV reading and writing utilities.
//!
//! Request logs have no header and a variable number of fields per record,
//! so they are read as raw records rather than deserialized with serde.

use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

use crate::dto::Request;

/// Comment marker in request logs.
pub(crate) const COMMENT: u8 = b'#';

fn request_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .comment(Some(COMMENT))
        .trim(csv::Trim::All);
    builder
}

/// Creates an iterator that reads requests from a request log file.
/// Blank records are skipped.
pub fn read_requests<P>(path: P) -> csv::Result<impl Iterator<Item = csv::Result<Request>>>
where
    P: AsRef<Path>,
{
    Ok(requests_from_reader(
        request_reader_builder().from_path(path)?,
    ))
}

/// Same as [`read_requests`], over any reader.
pub fn read_requests_from<R: Read>(reader: R) -> impl Iterator<Item = csv::Result<Request>> {
    requests_from_reader(request_reader_builder().from_reader(reader))
}

fn requests_from_reader<R: Read>(
    reader: csv::Reader<R>,
) -> impl Iterator<Item = csv::Result<Request>> {
    reader
        .into_records()
        .filter_map(|record| match record {
            Ok(record) => Request::from_fields(record.iter()).map(Ok),
            Err(e) => Some(Err(e)),
        })
}

/// Writes `header` followed by an iterator of records to a CSV writer.
/// Each record must implement Serialize. The header is written even if
/// there are no records.
pub fn write_csv<T, W>(
    writer: W,
    header: &[&str],
    records: impl Iterator<Item = T>,
) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{ResultRow, Status};

    #[test]
    fn test_read_requests() -> csv::Result<()> {
        let requests: Vec<Request> =
            read_requests("data/example_input.csv")?.collect::<Result<_, _>>()?;

        assert_eq!(requests.len(), 9);
        assert_eq!(
            requests[0],
            Request {
                operation: "create".into(),
                args: vec!["alice".into(), "100".into(), "50".into()],
            }
        );
        assert_eq!(
            requests[2],
            Request {
                operation: "transactSavings".into(),
                args: vec!["alice".into(), "-30".into()],
            }
        );
        Ok(())
    }

    #[test]
    fn test_read_requests_trims_and_skips_comments() -> csv::Result<()> {
        let input = "# seed\ncreate, alice ,1,2\n\nquery,alice\n";
        let requests: Vec<Request> =
            read_requests_from(input.as_bytes()).collect::<Result<_, _>>()?;
        assert_eq!(
            requests,
            vec![
                Request {
                    operation: "create".into(),
                    args: vec!["alice".into(), "1".into(), "2".into()],
                },
                Request {
                    operation: "query".into(),
                    args: vec!["alice".into()],
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_write_csv() -> csv::Result<()> {
        let rows = vec![ResultRow {
            seq: 0,
            operation: "query".into(),
            status: Status::Ok,
            savings: Some(1),
            checkings: Some(2),
            error: None,
        }];
        let mut output = Vec::new();
        write_csv(&mut output, &ResultRow::HEADER, rows.into_iter())?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "seq,operation,status,savings,checkings,error\n0,query,ok,1,2,\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_csv_without_rows_keeps_header() -> csv::Result<()> {
        let mut output = Vec::new();
        write_csv(&mut output, &ResultRow::HEADER, std::iter::empty::<ResultRow>())?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "seq,operation,status,savings,checkings,error\n"
        );
        Ok(())
    }

    #[test]
    fn test_read_requests_keeps_nameless_record() -> csv::Result<()> {
        let input = ",alice,1\n,,\n";
        let requests: Vec<Request> =
            read_requests_from(input.as_bytes()).collect::<Result<_, _>>()?;
        assert_eq!(
            requests,
            vec![Request {
                operation: String::new(),
                args: vec!["alice".into(), "1".into()],
            }]
        );
        Ok(())
    }
}
