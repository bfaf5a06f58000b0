use serde::Serialize;

use crate::{Error, Output};

/// One line of a request log: an operation name followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: String,
    pub args: Vec<String>,
}

impl Request {
    /// Builds a request from a raw CSV record. Only blank records, where every
    /// field is empty, yield `None`; a record with an empty operation name but
    /// some argument is kept so the engine rejects it.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut fields = fields.into_iter();
        let operation = fields.next()?.to_owned();
        let args: Vec<String> = fields.map(str::to_owned).collect();
        if operation.is_empty() && args.iter().all(String::is_empty) {
            return None;
        }
        Some(Self { operation, args })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Rejected,
}

/// Outcome of one request, as written to the runner's output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResultRow {
    pub seq: u64,
    pub operation: String,
    pub status: Status,
    pub savings: Option<i64>,
    pub checkings: Option<i64>,
    pub error: Option<String>,
}

impl ResultRow {
    /// Column names, written even when there are no rows.
    pub const HEADER: [&'static str; 6] =
        ["seq", "operation", "status", "savings", "checkings", "error"];

    pub fn new(seq: u64, request: &Request, outcome: &Result<Output, Error>) -> Self {
        let balances = outcome.as_ref().ok().and_then(Output::balances);
        Self {
            seq,
            operation: request.operation.clone(),
            status: if outcome.is_ok() {
                Status::Ok
            } else {
                Status::Rejected
            },
            savings: balances.map(|b| b.savings),
            checkings: balances.map(|b| b.checkings),
            error: outcome.as_ref().err().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Balances;

    fn write_row(row: &ResultRow) -> String {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.serialize(row).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_request_from_fields() {
        assert_eq!(
            Request::from_fields(["sendPayment", "a", "b", "5"]),
            Some(Request {
                operation: "sendPayment".into(),
                args: vec!["a".into(), "b".into(), "5".into()],
            })
        );
        assert_eq!(
            Request::from_fields(["query"]),
            Some(Request {
                operation: "query".into(),
                args: vec![],
            })
        );
    }

    #[test]
    fn test_empty_record_is_skipped() {
        assert_eq!(Request::from_fields(Vec::<&str>::new()), None);
        assert_eq!(Request::from_fields([""]), None);
        assert_eq!(Request::from_fields(["", "", ""]), None);
    }

    #[test]
    fn test_missing_operation_name_is_kept() {
        assert_eq!(
            Request::from_fields(["", "alice", "1"]),
            Some(Request {
                operation: String::new(),
                args: vec!["alice".into(), "1".into()],
            })
        );
    }

    #[test]
    fn test_serialize_query_row() {
        let request = Request::from_fields(["query", "alice"]).unwrap();
        let outcome = Ok(Output::Balances(Balances {
            savings: 70,
            checkings: 50,
        }));
        assert_eq!(
            write_row(&ResultRow::new(3, &request, &outcome)),
            "3,query,ok,70,50,\n"
        );
    }

    #[test]
    fn test_serialize_rejected_row() {
        let request = Request::from_fields(["query", "ghost"]).unwrap();
        let outcome = Err(Error::AccountNotFound("ghost".into()));
        assert_eq!(
            write_row(&ResultRow::new(1, &request, &outcome)),
            "1,query,rejected,,,account `ghost` not found\n"
        );
    }

    #[test]
    fn test_serialize_mutation_row() {
        let request = Request::from_fields(["create", "a", "1", "2"]).unwrap();
        assert_eq!(
            write_row(&ResultRow::new(0, &request, &Ok(Output::Empty))),
            "0,create,ok,,,\n"
        );
    }
}
