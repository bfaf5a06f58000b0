//! Informational hook called after every successful operation.
//!
//! Observers never influence the outcome of an operation.

use tracing::info;

use crate::codec::{balance_key, BalanceKind};
use crate::operation::OperationKind;

/// Resulting balance of one storage slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub account: String,
    pub kind: BalanceKind,
    pub balance: i64,
}

impl Posting {
    pub fn new(account: &str, kind: BalanceKind, balance: i64) -> Self {
        Self {
            account: account.to_owned(),
            kind,
            balance,
        }
    }

    pub fn key(&self) -> String {
        balance_key(&self.account, self.kind)
    }
}

/// A successfully applied operation.
///
/// `postings` holds every balance the operation changed, or for `query` the
/// balances it read. Operations that change nothing carry none.
#[derive(Debug)]
pub struct Applied<'a> {
    pub operation: OperationKind,
    pub postings: &'a [Posting],
}

pub trait Observer {
    fn applied(&self, event: &Applied<'_>);
}

impl<F> Observer for F
where
    F: Fn(&Applied<'_>),
{
    fn applied(&self, event: &Applied<'_>) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn applied(&self, _event: &Applied<'_>) {}
}

/// Emits one `info` event per posting.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn applied(&self, event: &Applied<'_>) {
        let read = event.operation == OperationKind::Query;
        for posting in event.postings {
            if read {
                info!(
                    operation = %event.operation,
                    account = %posting.account,
                    kind = %posting.kind,
                    balance = posting.balance,
                    "balance read"
                );
            } else {
                info!(
                    operation = %event.operation,
                    account = %posting.account,
                    kind = %posting.kind,
                    balance = posting.balance,
                    "balance written"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(operation: OperationKind, postings: &[Posting]) -> Vec<String> {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            TracingObserver.applied(&Applied {
                operation,
                postings,
            })
        });
        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        output.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_tracing_observer_messages() {
        let postings = [
            Posting::new("alice", BalanceKind::Savings, 70),
            Posting::new("alice", BalanceKind::Checkings, 50),
        ];

        let read = capture(OperationKind::Query, &postings);
        assert_eq!(read.len(), 2);
        for line in &read {
            assert!(line.contains(r#""message":"balance read""#), "{}", line);
            assert!(line.contains(r#""account":"alice""#), "{}", line);
        }
        assert!(read[0].contains(r#""balance":70"#));

        let written = capture(OperationKind::SendPayment, &postings[1..]);
        assert_eq!(written.len(), 1);
        assert!(written[0].contains(r#""message":"balance written""#));
        assert!(written[0].contains(r#""operation":"sendPayment""#));
    }

    #[test]
    fn test_posting_key() {
        assert_eq!(
            Posting::new("bob", BalanceKind::Checkings, 1).key(),
            "bob_checkings"
        );
    }
}
