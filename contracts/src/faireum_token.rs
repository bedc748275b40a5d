//! # Faireum Token Contract
//!
//! The top-level state machine. Ties the [`Ledger`] to the vault registry,
//! the lock book and the access set, and exposes the public call surface.
//!
//! ## Lifecycle
//!
//! 1. **Deploy** — the deployer becomes the first authorized address.
//!    Supply is zero and every vault address is null.
//! 2. **Create vaults** — an authorized caller mints the full supply into
//!    the five pool accounts. Runs exactly once.
//! 3. **Distribute** — reward-pool, founders and team tokens leave their
//!    vaults only through lock calls, which credit the beneficiary and
//!    record an equal lock against them. Sale and marketing tokens leave
//!    through spenders approved by an authorized caller.
//! 4. **Trade** — holders transfer, approve and burn freely, except that
//!    no debit may dip below the holder's currently locked amount.
//!
//! ## Atomicity
//!
//! Each call reads the clock once, validates everything, then commits. An
//! `Err` return means no state changed and no events were emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use faireum_protocol::amount::{amount_map, amount_str};
use faireum_protocol::{Address, Amount, Clock, SystemClock, TokenConfig};

use crate::access::AccessSet;
use crate::encumbrance::{LockBook, ReleaseSchedule};
use crate::error::TokenError;
use crate::events::Event;
use crate::ledger::Ledger;
use crate::recovery::{self, ForeignLedger};
use crate::vaults::{Vault, VaultRegistry};

/// Salt for the contract's own address.
const CONTRACT_ADDRESS_SALT: &[u8] = b"faireum-token";

/// The Faireum token.
#[derive(Debug)]
pub struct FaireumToken<C: Clock = SystemClock> {
    config: TokenConfig,
    contract: Address,
    schedule: ReleaseSchedule,
    ledger: Ledger,
    locks: LockBook,
    vaults: VaultRegistry,
    access: AccessSet,
    clock: C,
}

/// Point-in-time view of the token state, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub name: String,
    pub symbol: String,
    pub contract: Address,
    #[serde(with = "amount_str")]
    pub total_supply: Amount,
    /// Vault label to address; empty before vault creation.
    pub vaults: BTreeMap<String, Address>,
    #[serde(with = "amount_map")]
    pub balances: BTreeMap<Address, Amount>,
    /// Nominal accumulated locks.
    #[serde(with = "amount_map")]
    pub locked: BTreeMap<Address, Amount>,
    pub authorized: Vec<Address>,
}

impl FaireumToken<SystemClock> {
    /// Deploys a token that reads wall-clock time.
    pub fn deploy(deployer: Address, config: TokenConfig) -> Result<Self, TokenError> {
        Self::new(deployer, config, SystemClock)
    }
}

impl<C: Clock> FaireumToken<C> {
    /// Deploys a token with an explicit clock.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidSchedule`] if the config's release schedule is
    /// malformed; [`TokenError::InvalidSender`] for a null deployer.
    pub fn new(deployer: Address, config: TokenConfig, clock: C) -> Result<Self, TokenError> {
        if deployer.is_zero() {
            return Err(TokenError::InvalidSender);
        }
        let schedule = ReleaseSchedule::from_config(&config)?;
        let contract = Address::derive(&[CONTRACT_ADDRESS_SALT, deployer.as_bytes()]);
        info!(%deployer, %contract, symbol = %config.symbol, "token deployed");

        Ok(Self {
            config,
            contract,
            schedule,
            ledger: Ledger::new(),
            locks: LockBook::new(),
            vaults: VaultRegistry::new(),
            access: AccessSet::with_admin(deployer),
            clock,
        })
    }

    // -----------------------------------------------------------------------
    // Metadata & Reads
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// The contract's own address; spender of the vault self-allowances
    /// and holder of any recoverable foreign tokens.
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn release_schedule(&self) -> &ReleaseSchedule {
        &self.schedule
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    /// Total amount ever locked for `holder`, regardless of time.
    pub fn locked_balance_of(&self, holder: &Address) -> Amount {
        self.locks.locked_of(holder)
    }

    /// Part of `holder`'s balance that cannot move right now.
    pub fn effective_locked_of(&self, holder: &Address) -> Amount {
        self.encumbered(holder, self.clock.now())
    }

    /// Part of `holder`'s balance that can move right now.
    pub fn unlocked_balance_of(&self, holder: &Address) -> Amount {
        let now = self.clock.now();
        self.ledger.spendable(holder, self.encumbered(holder, now))
    }

    pub fn vaults_created(&self) -> bool {
        self.vaults.is_created()
    }

    /// Address of `vault`, or the null address before vault creation.
    pub fn vault_address(&self, vault: Vault) -> Address {
        self.vaults.address(vault)
    }

    pub fn team_advisors_tokens_vault(&self) -> Address {
        self.vault_address(Vault::TeamAdvisors)
    }

    pub fn reward_pool_tokens_vault(&self) -> Address {
        self.vault_address(Vault::RewardPool)
    }

    pub fn founders_tokens_vault(&self) -> Address {
        self.vault_address(Vault::Founders)
    }

    pub fn marketing_airdrop_tokens_vault(&self) -> Address {
        self.vault_address(Vault::MarketingAirdrop)
    }

    pub fn sale_tokens_vault(&self) -> Address {
        self.vault_address(Vault::Sale)
    }

    pub fn is_authorized(&self, account: &Address) -> bool {
        self.access.is_authorized(account)
    }

    /// Captures balances, locks, vaults and the authorized set.
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            name: self.config.name.clone(),
            symbol: self.config.symbol.clone(),
            contract: self.contract,
            total_supply: self.ledger.total_supply(),
            vaults: self
                .vaults
                .entries()
                .into_iter()
                .map(|(vault, address)| (vault.label().to_string(), address))
                .collect(),
            balances: self.ledger.holders().map(|(a, b)| (*a, *b)).collect(),
            locked: self.locks.entries().map(|(a, l)| (*a, *l)).collect(),
            authorized: self.access.members().copied().collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Vault Creation
    // -----------------------------------------------------------------------

    /// Mints the initial supply into the five vaults.
    ///
    /// Emits one mint `Transfer` per vault, in [`Vault::ALL`] order.
    ///
    /// # Errors
    ///
    /// [`TokenError::Unauthorized`], or [`TokenError::AlreadyInitialized`]
    /// on any call after the first successful one.
    pub fn create_tokens_vaults(&mut self, caller: &Address) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "create_tokens_vaults")?;
        if self.vaults.is_created() {
            return Err(TokenError::AlreadyInitialized);
        }

        let addresses = VaultRegistry::derive_addresses(&self.contract);
        let mut staged = self.ledger.clone();
        let mut events = Vec::with_capacity(Vault::ALL.len());
        for (vault, address) in Vault::ALL.iter().zip(addresses.iter()) {
            events.push(staged.mint(address, vault.allocation())?);
        }

        self.vaults.create(addresses)?;
        self.ledger = staged;
        info!(
            total_supply = %self.ledger.total_supply(),
            "token vaults created"
        );
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Locks
    // -----------------------------------------------------------------------

    /// Moves `amount` from the reward pool to `beneficiary` and locks it.
    pub fn lock_reward_pool_tokens(
        &mut self,
        caller: &Address,
        beneficiary: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "lock_reward_pool_tokens")?;
        self.lock_from_vault(Vault::RewardPool, beneficiary, amount, amount)
    }

    /// Moves `amount` from the founders vault to `beneficiary` and locks it.
    pub fn lock_founders_tokens(
        &mut self,
        caller: &Address,
        beneficiary: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "lock_founders_tokens")?;
        self.lock_from_vault(Vault::Founders, beneficiary, amount, amount)
    }

    /// Releases the first half of a team position.
    ///
    /// `amount` must be even and covered by the team vault. Half of it is
    /// moved to `beneficiary` and locked; the other half stays in the vault
    /// as the vault's remaining allowance to the contract and is delivered
    /// by a later call.
    ///
    /// # Errors
    ///
    /// [`TokenError::OddLockAmount`] for odd amounts, plus everything
    /// [`lock_reward_pool_tokens`](Self::lock_reward_pool_tokens) can return.
    pub fn lock_team_tokens(
        &mut self,
        caller: &Address,
        beneficiary: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "lock_team_tokens")?;
        if amount % 2 != 0 {
            return Err(TokenError::OddLockAmount { amount });
        }
        self.lock_from_vault(Vault::TeamAdvisors, beneficiary, amount, amount / 2)
    }

    /// Shared body of the lock calls: `amount` must be spendable from the
    /// vault, `tranche` of it is moved and locked now. Vaults are never
    /// beneficiaries.
    fn lock_from_vault(
        &mut self,
        vault: Vault,
        beneficiary: &Address,
        amount: Amount,
        tranche: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let vault_address = self.vaults.require(vault)?;
        let now = self.clock.now();
        let floor = self.encumbered(&vault_address, now);

        let spendable = self.ledger.spendable(&vault_address, floor);
        if amount > spendable {
            return Err(TokenError::InsufficientBalance {
                holder: vault_address,
                spendable,
                requested: amount,
            });
        }
        if self.vaults.is_vault(beneficiary) {
            return Err(TokenError::InvalidRecipient);
        }
        let new_locked = self.locks.check_add(beneficiary, tranche)?;
        let transfer = self
            .ledger
            .transfer(&vault_address, beneficiary, tranche, floor)?;

        let residual = amount - tranche;
        self.ledger
            .set_allowance(&vault_address, &self.contract, residual);
        self.locks.commit(beneficiary, new_locked);

        debug!(
            %vault,
            %beneficiary,
            tranche = %tranche,
            locked_total = %new_locked,
            "tokens locked"
        );
        Ok(vec![
            Event::approval(vault_address, self.contract, residual),
            transfer,
        ])
    }

    // -----------------------------------------------------------------------
    // Vault Spenders
    // -----------------------------------------------------------------------

    /// Sets `spender`'s allowance over the sale vault.
    pub fn approve_sale_spender(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "approve_sale_spender")?;
        self.approve_vault_spender(Vault::Sale, spender, amount)
    }

    /// Sets `spender`'s allowance over the marketing/airdrop vault.
    pub fn approve_marketing_spender(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "approve_marketing_spender")?;
        self.approve_vault_spender(Vault::MarketingAirdrop, spender, amount)
    }

    fn approve_vault_spender(
        &mut self,
        vault: Vault,
        spender: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let vault_address = self.vaults.require(vault)?;
        let event = self.ledger.approve(&vault_address, spender, amount)?;
        debug!(%vault, %spender, amount = %amount, "vault spender approved");
        Ok(vec![event])
    }

    // -----------------------------------------------------------------------
    // Holder Operations
    // -----------------------------------------------------------------------

    /// Moves `amount` from `caller` to `to`.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let floor = self.encumbered(caller, self.clock.now());
        let event = self.ledger.transfer(caller, to, amount, floor)?;
        Ok(vec![event])
    }

    /// Sets `spender`'s allowance over `caller`'s tokens to `amount`.
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        Ok(vec![self.ledger.approve(caller, spender, amount)?])
    }

    pub fn increase_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        added: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        Ok(vec![self.ledger.increase_allowance(caller, spender, added)?])
    }

    pub fn decrease_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        Ok(vec![self
            .ledger
            .decrease_allowance(caller, spender, subtracted)?])
    }

    /// Moves `amount` from `owner` to `to` using `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let floor = self.encumbered(owner, self.clock.now());
        self.ledger.transfer_from(spender, owner, to, amount, floor)
    }

    /// Destroys `amount` of `caller`'s unlocked tokens.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> Result<Vec<Event>, TokenError> {
        let floor = self.encumbered(caller, self.clock.now());
        let event = self.ledger.burn(caller, amount, floor)?;
        debug!(holder = %caller, amount = %amount, "tokens burned");
        Ok(vec![event])
    }

    /// Destroys `amount` of `owner`'s unlocked tokens using `spender`'s
    /// allowance.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        amount: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let floor = self.encumbered(owner, self.clock.now());
        self.ledger.burn_from(spender, owner, amount, floor)
    }

    // -----------------------------------------------------------------------
    // Access & Recovery
    // -----------------------------------------------------------------------

    pub fn grant_authorization(
        &mut self,
        caller: &Address,
        account: &Address,
    ) -> Result<Vec<Event>, TokenError> {
        self.authorize(caller, "grant_authorization")?;
        let events = self.access.grant(caller, account)?;
        if !events.is_empty() {
            info!(%caller, %account, "authorization granted");
        }
        Ok(events)
    }

    pub fn renounce_authorization(&mut self, caller: &Address) -> Result<Vec<Event>, TokenError> {
        let events = self.access.renounce(caller);
        if !events.is_empty() {
            info!(%caller, "authorization renounced");
        }
        Ok(events)
    }

    /// Sweeps the contract's balance in `foreign` to `caller`.
    ///
    /// Returns the amount moved.
    pub fn recover_erc20_tokens(
        &mut self,
        caller: &Address,
        foreign: &mut dyn ForeignLedger,
    ) -> Result<Amount, TokenError> {
        self.authorize(caller, "recover_erc20_tokens")?;
        let amount = recovery::sweep(foreign, &self.contract, caller)?;
        info!(%caller, amount = %amount, "foreign tokens recovered");
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn authorize(&self, caller: &Address, operation: &'static str) -> Result<(), TokenError> {
        self.access.ensure(caller).map_err(|e| {
            warn!(%caller, operation, "unauthorized call rejected");
            e
        })
    }

    fn encumbered(&self, holder: &Address, now: DateTime<Utc>) -> Amount {
        self.schedule
            .effective_locked(self.locks.locked_of(holder), now)
    }
}

impl<C: Clock> ForeignLedger for FaireumToken<C> {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(holder)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        FaireumToken::transfer(self, from, to, amount).map(|_| ())
    }
}
