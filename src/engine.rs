use tracing::debug;

use crate::codec::{balance_key, decode, encode, BalanceKind};
use crate::observer::{Applied, Observer, Posting, TracingObserver};
use crate::operation::{Operation, OperationKind, Seed};
use crate::stores::TransactionContext;
use crate::{Error, Result};

/// Savings and checkings balances of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub savings: i64,
    pub checkings: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Result of every mutating operation.
    Empty,
    /// Result of `query`.
    Balances(Balances),
}

impl Output {
    pub fn balances(&self) -> Option<Balances> {
        match self {
            Output::Empty => None,
            Output::Balances(balances) => Some(*balances),
        }
    }
}

/// Ledger operation engine.
///
/// Stateless between calls: every invocation reads what it needs from the
/// given [`TransactionContext`], validates against those values, and only
/// then stages its writes. A failed invocation stages nothing.
pub struct Engine<O = TracingObserver> {
    observer: O,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            observer: TracingObserver,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Observer> Engine<O> {
    pub fn with_observer(observer: O) -> Self {
        Self { observer }
    }

    /// Parses and executes one request.
    pub fn invoke<C, S>(&self, ctx: &mut C, operation: &str, args: &[S]) -> Result<Output>
    where
        C: TransactionContext + ?Sized,
        S: AsRef<str>,
    {
        let operation = Operation::parse(operation, args)?;
        debug!(?operation, "dispatching");
        self.execute(ctx, &operation)
    }

    /// Executes an already parsed operation.
    ///
    /// If staging a write fails part way, the context may hold some of this
    /// operation's writes; its owner must discard the transaction.
    pub fn execute<C>(&self, ctx: &mut C, operation: &Operation) -> Result<Output>
    where
        C: TransactionContext + ?Sized,
    {
        let kind = operation.kind();
        let (output, postings) = plan(ctx, operation)?;

        if kind != OperationKind::Query {
            for posting in &postings {
                ctx.put(&posting.key(), encode(posting.balance))?;
            }
        }

        self.observer.applied(&Applied {
            operation: kind,
            postings: &postings,
        });
        Ok(output)
    }
}

/// Reads and validates everything the operation needs and returns the
/// balances it would write. Performs no writes.
fn plan<C>(ctx: &mut C, operation: &Operation) -> Result<(Output, Vec<Posting>)>
where
    C: TransactionContext + ?Sized,
{
    use BalanceKind::{Checkings, Savings};

    operation.validate()?;

    let postings: Vec<Posting> = match operation {
        Operation::Initialize { seeds } => {
            for seed in seeds {
                ensure_vacant(ctx, &seed.account)?;
            }
            seeds.iter().flat_map(seed_postings).collect()
        }
        Operation::Create(seed) => {
            ensure_vacant(ctx, &seed.account)?;
            seed_postings(seed).collect()
        }
        Operation::TransactSavings { account, amount } => {
            let savings = require(ctx, account, Savings)?;
            let updated = savings.checked_add(*amount).ok_or_else(|| overflow(account))?;
            if updated < 0 {
                return Err(Error::InsufficientFunds {
                    account: account.clone(),
                    requested: amount.saturating_neg(),
                    available: savings,
                });
            }
            changed(account, Savings, savings, updated).into_iter().collect()
        }
        Operation::DepositChecking { account, amount } => {
            let checkings = require(ctx, account, Checkings)?;
            let updated = checkings
                .checked_add(*amount)
                .ok_or_else(|| overflow(account))?;
            changed(account, Checkings, checkings, updated).into_iter().collect()
        }
        Operation::SendPayment { from, to, amount } => {
            let sender = require(ctx, from, Checkings)?;
            let receiver = require(ctx, to, Checkings)?;
            let debited = withdraw(from, sender, *amount)?;
            let credited = receiver.checked_add(*amount).ok_or_else(|| overflow(to))?;
            [
                changed(from, Checkings, sender, debited),
                changed(to, Checkings, receiver, credited),
            ]
            .into_iter()
            .flatten()
            .collect()
        }
        Operation::WriteCheck { account, amount } => {
            let checkings = require(ctx, account, Checkings)?;
            let updated = withdraw(account, checkings, *amount)?;
            changed(account, Checkings, checkings, updated).into_iter().collect()
        }
        Operation::Amalgamate { account } => {
            let savings = require(ctx, account, Savings)?;
            let checkings = require(ctx, account, Checkings)?;
            let merged = checkings.checked_add(savings).ok_or_else(|| overflow(account))?;
            [
                changed(account, Savings, savings, 0),
                changed(account, Checkings, checkings, merged),
            ]
            .into_iter()
            .flatten()
            .collect()
        }
        Operation::Query { account } => {
            let balances = Balances {
                savings: require(ctx, account, Savings)?,
                checkings: require(ctx, account, Checkings)?,
            };
            let postings = vec![
                Posting::new(account, Savings, balances.savings),
                Posting::new(account, Checkings, balances.checkings),
            ];
            return Ok((Output::Balances(balances), postings));
        }
    };
    Ok((Output::Empty, postings))
}

fn seed_postings(seed: &Seed) -> impl Iterator<Item = Posting> {
    [
        Posting::new(&seed.account, BalanceKind::Savings, seed.savings),
        Posting::new(&seed.account, BalanceKind::Checkings, seed.checkings),
    ]
    .into_iter()
}

/// Posting for a slot whose balance moves from `before` to `after`, if it moves at all.
fn changed(account: &str, kind: BalanceKind, before: i64, after: i64) -> Option<Posting> {
    (before != after).then(|| Posting::new(account, kind, after))
}

/// Fails if either balance slot of `account` is already present.
fn ensure_vacant<C>(ctx: &mut C, account: &str) -> Result<()>
where
    C: TransactionContext + ?Sized,
{
    for kind in [BalanceKind::Savings, BalanceKind::Checkings] {
        if ctx.get(&balance_key(account, kind))?.is_some() {
            return Err(Error::AccountAlreadyExists(account.to_owned()));
        }
    }
    Ok(())
}

fn require<C>(ctx: &mut C, account: &str, kind: BalanceKind) -> Result<i64>
where
    C: TransactionContext + ?Sized,
{
    let key = balance_key(account, kind);
    match ctx.get(&key)? {
        Some(bytes) => decode(&key, &bytes),
        None => Err(Error::AccountNotFound(account.to_owned())),
    }
}

fn withdraw(account: &str, available: i64, amount: i64) -> Result<i64> {
    if amount < 0 {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    if available < amount {
        return Err(Error::InsufficientFunds {
            account: account.to_owned(),
            requested: amount,
            available,
        });
    }
    available
        .checked_sub(amount)
        .ok_or_else(|| overflow(account))
}

fn overflow(account: &str) -> Error {
    Error::BalanceOverflow {
        account: account.to_owned(),
    }
}
