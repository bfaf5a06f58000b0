//! Operation dispatch: turns an operation name plus its string arguments into
//! a validated [`Operation`].
//!
//! Validation order is fixed: operation name, argument count, account ids,
//! integer arguments, sign rules. Nothing here touches the store.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::codec::parse_amount;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Initialize,
    Create,
    TransactSavings,
    DepositChecking,
    SendPayment,
    WriteCheck,
    Amalgamate,
    Query,
}

impl OperationKind {
    pub const ALL: [OperationKind; 8] = [
        OperationKind::Initialize,
        OperationKind::Create,
        OperationKind::TransactSavings,
        OperationKind::DepositChecking,
        OperationKind::SendPayment,
        OperationKind::WriteCheck,
        OperationKind::Amalgamate,
        OperationKind::Query,
    ];

    /// Name used on the wire and in request logs.
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Initialize => "initialize",
            OperationKind::Create => "create",
            OperationKind::TransactSavings => "transactSavings",
            OperationKind::DepositChecking => "depositChecking",
            OperationKind::SendPayment => "sendPayment",
            OperationKind::WriteCheck => "writeCheck",
            OperationKind::Amalgamate => "amalgamate",
            OperationKind::Query => "query",
        }
    }

    /// Expected argument count given the actual one. Only `initialize` is
    /// variadic: it takes one or more `(account, savings, checkings)` triples.
    fn expected_arity(self, actual: usize) -> usize {
        match self {
            OperationKind::Initialize => actual.div_ceil(3).max(1) * 3,
            OperationKind::Create | OperationKind::SendPayment => 3,
            OperationKind::TransactSavings
            | OperationKind::DepositChecking
            | OperationKind::WriteCheck => 2,
            OperationKind::Amalgamate | OperationKind::Query => 1,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| Error::UnknownOperation(name.to_owned()))
    }
}

/// Initial balances of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub account: String,
    pub savings: i64,
    pub checkings: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Initialize {
        seeds: Vec<Seed>,
    },
    Create(Seed),
    TransactSavings {
        account: String,
        /// Negative for a withdrawal.
        amount: i64,
    },
    DepositChecking {
        account: String,
        amount: i64,
    },
    SendPayment {
        from: String,
        to: String,
        amount: i64,
    },
    WriteCheck {
        account: String,
        amount: i64,
    },
    Amalgamate {
        account: String,
    },
    Query {
        account: String,
    },
}

impl Operation {
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Self> {
        let kind: OperationKind = name.parse()?;

        let expected = kind.expected_arity(args.len());
        if args.len() != expected {
            return Err(Error::ArityMismatch {
                expected,
                actual: args.len(),
            });
        }
        let arg = |i: usize| args[i].as_ref();

        let operation = match kind {
            OperationKind::Initialize => {
                let seeds = args
                    .chunks(3)
                    .map(|triple| {
                        parse_seed(triple[0].as_ref(), triple[1].as_ref(), triple[2].as_ref())
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut seen = HashSet::new();
                if let Some(dup) = seeds.iter().find(|seed| !seen.insert(seed.account.as_str())) {
                    return Err(Error::DuplicateAccount(dup.account.clone()));
                }
                Operation::Initialize { seeds }
            }
            OperationKind::Create => Operation::Create(parse_seed(arg(0), arg(1), arg(2))?),
            OperationKind::TransactSavings => Operation::TransactSavings {
                account: account_id(arg(0))?,
                amount: parse_amount(arg(1))?,
            },
            OperationKind::DepositChecking => Operation::DepositChecking {
                account: account_id(arg(0))?,
                amount: non_negative(arg(1))?,
            },
            OperationKind::SendPayment => {
                let from = account_id(arg(0))?;
                let to = account_id(arg(1))?;
                let amount = non_negative(arg(2))?;
                if from == to {
                    return Err(Error::DuplicateAccount(from));
                }
                Operation::SendPayment { from, to, amount }
            }
            OperationKind::WriteCheck => Operation::WriteCheck {
                account: account_id(arg(0))?,
                amount: non_negative(arg(1))?,
            },
            OperationKind::Amalgamate => Operation::Amalgamate {
                account: account_id(arg(0))?,
            },
            OperationKind::Query => Operation::Query {
                account: account_id(arg(0))?,
            },
        };
        Ok(operation)
    }

    /// Checks the argument rules that do not depend on stored state: account
    /// ids present, amounts non-negative where required, accounts distinct.
    ///
    /// Everything [`Operation::parse`] returns passes; hand-built operations
    /// are checked again by the engine before it reads anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Operation::Initialize { seeds } => {
                if seeds.is_empty() {
                    return Err(Error::ArityMismatch {
                        expected: 3,
                        actual: 0,
                    });
                }
                let mut seen = HashSet::new();
                for seed in seeds {
                    check_seed(seed)?;
                    if !seen.insert(seed.account.as_str()) {
                        return Err(Error::DuplicateAccount(seed.account.clone()));
                    }
                }
                Ok(())
            }
            Operation::Create(seed) => check_seed(seed),
            Operation::TransactSavings { account, .. }
            | Operation::Amalgamate { account }
            | Operation::Query { account } => check_account(account),
            Operation::DepositChecking { account, amount }
            | Operation::WriteCheck { account, amount } => {
                check_account(account)?;
                check_non_negative(*amount)
            }
            Operation::SendPayment { from, to, amount } => {
                check_account(from)?;
                check_account(to)?;
                check_non_negative(*amount)?;
                if from == to {
                    return Err(Error::DuplicateAccount(from.clone()));
                }
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Initialize { .. } => OperationKind::Initialize,
            Operation::Create(_) => OperationKind::Create,
            Operation::TransactSavings { .. } => OperationKind::TransactSavings,
            Operation::DepositChecking { .. } => OperationKind::DepositChecking,
            Operation::SendPayment { .. } => OperationKind::SendPayment,
            Operation::WriteCheck { .. } => OperationKind::WriteCheck,
            Operation::Amalgamate { .. } => OperationKind::Amalgamate,
            Operation::Query { .. } => OperationKind::Query,
        }
    }
}

fn parse_seed(account: &str, savings: &str, checkings: &str) -> Result<Seed> {
    Ok(Seed {
        account: account_id(account)?,
        savings: non_negative(savings)?,
        checkings: non_negative(checkings)?,
    })
}

fn check_seed(seed: &Seed) -> Result<()> {
    check_account(&seed.account)?;
    check_non_negative(seed.savings)?;
    check_non_negative(seed.checkings)
}

fn check_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(Error::InvalidAccount(account.to_owned()));
    }
    Ok(())
}

fn check_non_negative(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    Ok(())
}

fn account_id(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::InvalidAccount(raw.to_owned()));
    }
    Ok(raw.to_owned())
}

fn non_negative(raw: &str) -> Result<i64> {
    let amount = parse_amount(raw)?;
    if amount < 0 {
        return Err(Error::InvalidAmount(raw.to_owned()));
    }
    Ok(amount)
}
