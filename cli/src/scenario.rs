//! # Scenario Replay
//!
//! A scenario is a JSON document describing a deployment and an ordered
//! list of timestamped calls against it:
//!
//! ```json
//! {
//!   "deployer": "admin",
//!   "start": "2019-03-11T00:00:00Z",
//!   "steps": [
//!     { "at": "2019-03-11T00:00:00Z", "caller": "admin", "op": "create_tokens_vaults" },
//!     { "caller": "admin", "op": "lock_founders_tokens", "beneficiary": "alice", "amount": "100" }
//!   ]
//! }
//! ```
//!
//! Parties are written as `0x`-prefixed hex, `@contract`, `@<vault label>`
//! (e.g. `@saleTokensVault`), or any other string, which is hashed into a
//! stable address with [`Address::named`]. A step without `at` runs at the
//! previous step's time.
//!
//! Besides the token itself, every run carries a second, plain ledger
//! standing in for an unrelated token. `fund_foreign` mints into it and
//! `recover_erc20_tokens` sweeps the contract's balance there back out.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use faireum_contracts::ledger::Ledger;
use faireum_contracts::{Event, FaireumToken, TokenError, TokenSnapshot, Vault};
use faireum_protocol::amount::{amount_map, amount_str};
use faireum_protocol::config::locks_start_date;
use faireum_protocol::{Address, AddressError, Amount, Clock, ManualClock, TokenConfig};

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

/// An account reference as written in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Party {
    /// A literal address.
    Address(Address),
    /// The token contract's own address.
    Contract,
    /// One of the allocation vaults.
    Vault(Vault),
}

impl Party {
    /// Resolves the reference against a deployed token. Vault references
    /// resolve to the null address until the vaults exist.
    pub fn resolve(&self, token: &FaireumToken<ManualClock>) -> Address {
        match self {
            Party::Address(address) => *address,
            Party::Contract => token.contract_address(),
            Party::Vault(vault) => token.vault_address(*vault),
        }
    }
}

impl TryFrom<String> for Party {
    type Error = PartyError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if let Some(reference) = raw.strip_prefix('@') {
            if reference == "contract" {
                return Ok(Party::Contract);
            }
            return Vault::ALL
                .into_iter()
                .find(|vault| vault.label() == reference)
                .map(Party::Vault)
                .ok_or(PartyError::UnknownReference(raw));
        }
        if raw.starts_with("0x") || raw.starts_with("0X") {
            return Ok(Party::Address(Address::from_hex(&raw)?));
        }
        if raw.is_empty() {
            return Err(PartyError::Empty);
        }
        Ok(Party::Address(Address::named(&raw)))
    }
}

#[derive(Debug, Error)]
pub enum PartyError {
    #[error("empty party name")]
    Empty,
    #[error("unknown reference {0:?}, expected @contract or @<vault label>")]
    UnknownReference(String),
    #[error(transparent)]
    Address(#[from] AddressError),
}

// ---------------------------------------------------------------------------
// Scenario Document
// ---------------------------------------------------------------------------

/// A replayable deployment script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Deploying account; becomes the first authorized address.
    pub deployer: Party,
    /// Initial clock reading. Defaults to the locks start date.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One timestamped call.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Clock reading for this call. Omitted means "same time as before".
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    pub caller: Party,
    #[serde(flatten)]
    pub call: Call,
}

/// The token operation a step performs, tagged by `op`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    CreateTokensVaults,
    LockRewardPoolTokens {
        beneficiary: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    LockFoundersTokens {
        beneficiary: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    LockTeamTokens {
        beneficiary: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    ApproveSaleSpender {
        spender: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    ApproveMarketingSpender {
        spender: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Transfer {
        to: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Approve {
        spender: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    IncreaseAllowance {
        spender: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    DecreaseAllowance {
        spender: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    TransferFrom {
        owner: Party,
        to: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    Burn {
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    BurnFrom {
        owner: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    GrantAuthorization {
        account: Party,
    },
    RenounceAuthorization,
    /// Mints into the side ledger. Not a token operation.
    FundForeign {
        to: Party,
        #[serde(with = "amount_str")]
        amount: Amount,
    },
    RecoverErc20Tokens,
}

impl Call {
    /// The `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Call::CreateTokensVaults => "create_tokens_vaults",
            Call::LockRewardPoolTokens { .. } => "lock_reward_pool_tokens",
            Call::LockFoundersTokens { .. } => "lock_founders_tokens",
            Call::LockTeamTokens { .. } => "lock_team_tokens",
            Call::ApproveSaleSpender { .. } => "approve_sale_spender",
            Call::ApproveMarketingSpender { .. } => "approve_marketing_spender",
            Call::Transfer { .. } => "transfer",
            Call::Approve { .. } => "approve",
            Call::IncreaseAllowance { .. } => "increase_allowance",
            Call::DecreaseAllowance { .. } => "decrease_allowance",
            Call::TransferFrom { .. } => "transfer_from",
            Call::Burn { .. } => "burn",
            Call::BurnFrom { .. } => "burn_from",
            Call::GrantAuthorization { .. } => "grant_authorization",
            Call::RenounceAuthorization => "renounce_authorization",
            Call::FundForeign { .. } => "fund_foreign",
            Call::RecoverErc20Tokens => "recover_erc20_tokens",
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Result of one step, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// 1-based position in the script.
    pub step: usize,
    pub at: DateTime<Utc>,
    pub caller: Address,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    /// Amount swept by `recover_erc20_tokens`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub outcomes: Vec<StepOutcome>,
    pub snapshot: TokenSnapshot,
    /// Balances on the side ledger.
    #[serde(with = "amount_map")]
    pub foreign_balances: BTreeMap<Address, Amount>,
    /// Step at which a fail-fast run stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<usize>,
}

impl Report {
    /// Number of rejected steps.
    pub fn rejected(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("deployer must be a named or hex address, not a contract or vault reference")]
    DeployerReference,
    #[error("deployment failed: {0}")]
    Deploy(#[from] TokenError),
}

/// What a successful call hands back.
enum Applied {
    Events(Vec<Event>),
    Recovered(Amount),
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Deploys a fresh token and replays `scenario` against it.
///
/// Rejected steps are recorded and the run continues, unless `fail_fast`
/// is set, in which case the run stops after the first rejection and
/// [`Report::halted_at`] names the step.
pub fn run(
    scenario: &Scenario,
    config: TokenConfig,
    fail_fast: bool,
) -> Result<Report, ScenarioError> {
    let deployer = match &scenario.deployer {
        Party::Address(address) => *address,
        _ => return Err(ScenarioError::DeployerReference),
    };
    let clock = ManualClock::new(scenario.start.unwrap_or_else(locks_start_date));
    let mut token = FaireumToken::new(deployer, config, clock)?;
    let mut foreign = Ledger::new();
    info!(
        %deployer,
        contract = %token.contract_address(),
        steps = scenario.steps.len(),
        "scenario started"
    );

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    let mut halted_at = None;

    for (index, step) in scenario.steps.iter().enumerate() {
        let number = index + 1;
        if let Some(at) = step.at {
            token.clock().set(at);
        }
        let at = token.clock().now();
        let caller = step.caller.resolve(&token);

        let result = apply(&mut token, &mut foreign, &caller, &step.call);
        let outcome = match result {
            Ok(applied) => {
                info!(step = number, op = step.call.name(), %caller, "step applied");
                let (events, recovered) = match applied {
                    Applied::Events(events) => (events, None),
                    Applied::Recovered(amount) => (Vec::new(), Some(amount.to_string())),
                };
                StepOutcome {
                    step: number,
                    at,
                    caller,
                    op: step.call.name(),
                    ok: true,
                    events,
                    recovered,
                    error: None,
                }
            }
            Err(e) => {
                warn!(step = number, op = step.call.name(), %caller, error = %e, "step rejected");
                StepOutcome {
                    step: number,
                    at,
                    caller,
                    op: step.call.name(),
                    ok: false,
                    events: Vec::new(),
                    recovered: None,
                    error: Some(e.to_string()),
                }
            }
        };
        let rejected = !outcome.ok;
        outcomes.push(outcome);
        if rejected && fail_fast {
            halted_at = Some(number);
            break;
        }
    }

    let foreign_balances = foreign
        .holders()
        .map(|(holder, balance)| (*holder, *balance))
        .collect();

    Ok(Report {
        outcomes,
        snapshot: token.snapshot(),
        foreign_balances,
        halted_at,
    })
}

fn apply(
    token: &mut FaireumToken<ManualClock>,
    foreign: &mut Ledger,
    caller: &Address,
    call: &Call,
) -> Result<Applied, TokenError> {
    let events = match call {
        Call::CreateTokensVaults => token.create_tokens_vaults(caller)?,
        Call::LockRewardPoolTokens { beneficiary, amount } => {
            let beneficiary = beneficiary.resolve(token);
            token.lock_reward_pool_tokens(caller, &beneficiary, *amount)?
        }
        Call::LockFoundersTokens { beneficiary, amount } => {
            let beneficiary = beneficiary.resolve(token);
            token.lock_founders_tokens(caller, &beneficiary, *amount)?
        }
        Call::LockTeamTokens { beneficiary, amount } => {
            let beneficiary = beneficiary.resolve(token);
            token.lock_team_tokens(caller, &beneficiary, *amount)?
        }
        Call::ApproveSaleSpender { spender, amount } => {
            let spender = spender.resolve(token);
            token.approve_sale_spender(caller, &spender, *amount)?
        }
        Call::ApproveMarketingSpender { spender, amount } => {
            let spender = spender.resolve(token);
            token.approve_marketing_spender(caller, &spender, *amount)?
        }
        Call::Transfer { to, amount } => {
            let to = to.resolve(token);
            token.transfer(caller, &to, *amount)?
        }
        Call::Approve { spender, amount } => {
            let spender = spender.resolve(token);
            token.approve(caller, &spender, *amount)?
        }
        Call::IncreaseAllowance { spender, amount } => {
            let spender = spender.resolve(token);
            token.increase_allowance(caller, &spender, *amount)?
        }
        Call::DecreaseAllowance { spender, amount } => {
            let spender = spender.resolve(token);
            token.decrease_allowance(caller, &spender, *amount)?
        }
        Call::TransferFrom { owner, to, amount } => {
            let owner = owner.resolve(token);
            let to = to.resolve(token);
            token.transfer_from(caller, &owner, &to, *amount)?
        }
        Call::Burn { amount } => token.burn(caller, *amount)?,
        Call::BurnFrom { owner, amount } => {
            let owner = owner.resolve(token);
            token.burn_from(caller, &owner, *amount)?
        }
        Call::GrantAuthorization { account } => {
            let account = account.resolve(token);
            token.grant_authorization(caller, &account)?
        }
        Call::RenounceAuthorization => token.renounce_authorization(caller)?,
        Call::FundForeign { to, amount } => {
            let to = to.resolve(token);
            vec![foreign.mint(&to, *amount)?]
        }
        Call::RecoverErc20Tokens => {
            return token.recover_erc20_tokens(caller, foreign).map(Applied::Recovered);
        }
    };
    Ok(Applied::Events(events))
}
