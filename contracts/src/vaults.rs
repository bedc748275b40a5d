//! # Vault Registry
//!
//! The five allocation pools the initial supply is split into. A vault is
//! an ordinary ledger account; the registry only remembers which address
//! belongs to which pool. Addresses are unset (null) until the registry is
//! initialized, and initialization can happen exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;

use faireum_protocol::config::{
    FOUNDERS_ALLOCATION, MARKETING_AIRDROP_ALLOCATION, REWARD_POOL_ALLOCATION, SALE_ALLOCATION,
    TEAM_ADVISORS_ALLOCATION,
};
use faireum_protocol::{Address, Amount};

use crate::error::TokenError;

/// One of the five allocation pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vault {
    /// Team and advisors (10%). Locked in two even tranches.
    TeamAdvisors,
    /// Reward pool (20%). Locked on distribution.
    RewardPool,
    /// Founders (5%). Locked on distribution.
    Founders,
    /// Marketing and airdrop (10%). Distributed through an approved spender.
    MarketingAirdrop,
    /// Public sale (55%). Distributed through an approved spender.
    Sale,
}

impl Vault {
    /// All vaults, in minting order.
    pub const ALL: [Vault; 5] = [
        Vault::TeamAdvisors,
        Vault::RewardPool,
        Vault::Founders,
        Vault::MarketingAirdrop,
        Vault::Sale,
    ];

    /// Amount minted into this vault at creation.
    pub fn allocation(&self) -> Amount {
        match self {
            Vault::TeamAdvisors => TEAM_ADVISORS_ALLOCATION,
            Vault::RewardPool => REWARD_POOL_ALLOCATION,
            Vault::Founders => FOUNDERS_ALLOCATION,
            Vault::MarketingAirdrop => MARKETING_AIRDROP_ALLOCATION,
            Vault::Sale => SALE_ALLOCATION,
        }
    }

    /// Stable label, also used as the address derivation salt.
    pub fn label(&self) -> &'static str {
        match self {
            Vault::TeamAdvisors => "teamAdvisorsTokensVault",
            Vault::RewardPool => "rewardPoolTokensVault",
            Vault::Founders => "foundersTokensVault",
            Vault::MarketingAirdrop => "marketingAirdropTokensVault",
            Vault::Sale => "saleTokensVault",
        }
    }

    fn index(&self) -> usize {
        match self {
            Vault::TeamAdvisors => 0,
            Vault::RewardPool => 1,
            Vault::Founders => 2,
            Vault::MarketingAirdrop => 3,
            Vault::Sale => 4,
        }
    }
}

impl fmt::Display for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vault addresses, set once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultRegistry {
    addresses: Option<[Address; 5]>,
}

impl VaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`create`](Self::create) has run.
    pub fn is_created(&self) -> bool {
        self.addresses.is_some()
    }

    /// Address of `vault`, or the null address before creation.
    pub fn address(&self, vault: Vault) -> Address {
        self.addresses
            .map(|a| a[vault.index()])
            .unwrap_or(Address::ZERO)
    }

    /// Address of `vault`, failing before creation.
    pub fn require(&self, vault: Vault) -> Result<Address, TokenError> {
        self.addresses
            .map(|a| a[vault.index()])
            .ok_or(TokenError::VaultsNotCreated)
    }

    /// Computes the vault addresses for a contract without assigning them.
    ///
    /// Each address is derived from the contract address and the vault
    /// label, so the five are distinct from each other and from any
    /// address derived from a plain label.
    pub fn derive_addresses(contract: &Address) -> [Address; 5] {
        Vault::ALL.map(|v| Address::derive(&[contract.as_bytes(), v.label().as_bytes()]))
    }

    /// Assigns the vault addresses.
    ///
    /// # Errors
    ///
    /// [`TokenError::AlreadyInitialized`] on any call after the first.
    pub(crate) fn create(&mut self, addresses: [Address; 5]) -> Result<(), TokenError> {
        if self.is_created() {
            return Err(TokenError::AlreadyInitialized);
        }
        self.addresses = Some(addresses);
        Ok(())
    }

    /// Returns `true` if `account` is one of the created vaults.
    pub fn is_vault(&self, account: &Address) -> bool {
        self.addresses
            .map(|addresses| addresses.contains(account))
            .unwrap_or(false)
    }

    /// `(vault, address)` pairs, empty before creation.
    pub fn entries(&self) -> Vec<(Vault, Address)> {
        match self.addresses {
            Some(addresses) => Vault::ALL.into_iter().zip(addresses).collect(),
            None => Vec::new(),
        }
    }
}
