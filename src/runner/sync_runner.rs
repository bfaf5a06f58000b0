use anyhow::Result;
use std::io::Write;
use std::path::Path;

use super::RequestProcessor;
use crate::csv_utils::{read_requests, write_csv};
use crate::dto::ResultRow;

/// Runs the ledger engine on the given request log and writes results to the provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing requests
/// * `writer` - Where to write the per-request results (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(input_path: P, writer: W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut processor = RequestProcessor::new();
    let mut rows = Vec::new();

    for request in read_requests(input_path)? {
        // CSV parsing errors are critical - propagate them
        let request = request?;
        // Rejected requests are reported in the output, not propagated
        rows.push(processor.process(&request));
    }

    write_csv(writer, &ResultRow::HEADER, rows.into_iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const EXAMPLE_OUTPUT: &str = "seq,operation,status,savings,checkings,error
0,create,ok,,,
1,create,ok,,,
2,transactSavings,ok,,,
3,query,ok,70,50,
4,transactSavings,rejected,,,\"insufficient funds in `alice`: requested 100, available 70\"
5,sendPayment,ok,,,
6,writeCheck,rejected,,,\"insufficient funds in `bob`: requested 25, available 20\"
7,amalgamate,ok,,,
8,query,ok,0,100,
";

    #[test]
    fn test_example_input() -> Result<()> {
        let mut output = Vec::new();
        run("data/example_input.csv", &mut output)?;
        assert_eq!(String::from_utf8(output)?, EXAMPLE_OUTPUT);
        Ok(())
    }

    #[test]
    fn test_10_accounts() -> Result<()> {
        let mut output = Vec::new();
        run("data/10_accounts.csv", &mut output)?;
        let output = String::from_utf8(output)?;

        // See demos/generator.rs for the maths.
        let n = 10;
        let mut expected_queries = String::new();
        for i in 1..=n {
            let checkings = if i == 1 { 48 + 7 * n } else { 55 * i - 7 };
            let (savings, checkings) = if i % 2 == 1 {
                (0, checkings + 80 * i)
            } else {
                (80 * i, checkings)
            };
            expected_queries.push_str(&format!(",query,ok,{},{},\n", savings, checkings));
        }

        let queries: String = output
            .lines()
            .filter(|line| line.contains(",query,"))
            .map(|line| format!("{}\n", &line[line.find(',').unwrap_or(0)..]))
            .collect();
        assert_eq!(queries, expected_queries);

        let rejected = output.lines().filter(|l| l.contains(",rejected,")).count();
        assert_eq!(rejected, n as usize);
        Ok(())
    }

    #[test]
    fn test_missing_input_file() {
        let mut output = Vec::new();
        assert!(run("data/does_not_exist.csv", &mut output).is_err());
        assert!(output.is_empty());
    }

    fn run_log(contents: &[u8]) -> Result<String> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents)?;
        let mut output = Vec::new();
        run(file.path(), &mut output)?;
        Ok(String::from_utf8(output)?)
    }

    #[test]
    fn test_missing_operation_name_is_rejected() -> Result<()> {
        assert_eq!(
            run_log(b",alice,1\n")?,
            "seq,operation,status,savings,checkings,error\n0,,rejected,,,unknown operation ``\n"
        );
        Ok(())
    }

    #[test]
    fn test_comment_only_log_writes_header() -> Result<()> {
        assert_eq!(
            run_log(b"# nothing to do\n\n")?,
            "seq,operation,status,savings,checkings,error\n"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_aborts_run() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"create,alice,1,2\nquery,\xff\xfe\n")?;

        let mut output = Vec::new();
        assert!(run(file.path(), &mut output).is_err());
        Ok(())
    }
}
