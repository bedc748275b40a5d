//! Integration tests for the ledger surface of the token: vault spenders,
//! allowances, supply conservation, authorization and foreign-token
//! recovery.

use chrono::Duration;
use faireum_contracts::ledger::Ledger;
use faireum_contracts::{Event, FaireumToken, TokenError};
use faireum_protocol::config::{locks_start_date, INITIAL_SUPPLY, ONE_TOKEN};
use faireum_protocol::{Address, Amount, ManualClock, TokenConfig};

fn setup() -> (FaireumToken<ManualClock>, Address) {
    let admin = Address::named("admin");
    let clock = ManualClock::new(locks_start_date());
    let mut token = FaireumToken::new(admin, TokenConfig::default(), clock).unwrap();
    token.create_tokens_vaults(&admin).unwrap();
    (token, admin)
}

/// Sum of every balance the snapshot reports.
fn sum_of_balances(token: &FaireumToken<ManualClock>) -> Amount {
    token.snapshot().balances.values().sum()
}

// ---------------------------------------------------------------------------
// Vault Spenders
// ---------------------------------------------------------------------------

#[test]
fn sale_vault_drained_through_approved_spender() {
    let (mut token, admin) = setup();
    let spender = Address::named("sale-desk");
    let buyer = Address::named("buyer");
    let sale = token.sale_tokens_vault();
    let all = token.balance_of(&sale);

    let events = token.approve_sale_spender(&admin, &spender, all).unwrap();
    assert_eq!(events, vec![Event::approval(sale, spender, all)]);
    assert_eq!(token.allowance(&sale, &spender), all);

    let events = token.transfer_from(&spender, &sale, &buyer, all).unwrap();
    assert_eq!(
        events,
        vec![
            Event::approval(sale, spender, 0),
            Event::transfer(sale, buyer, all),
        ]
    );
    assert_eq!(token.balance_of(&sale), 0);
    assert_eq!(token.balance_of(&buyer), all);
    assert_eq!(token.allowance(&sale, &spender), 0);
}

#[test]
fn marketing_spender_distributes_airdrop() {
    let (mut token, admin) = setup();
    let dropper = Address::named("airdrop-bot");
    let marketing = token.marketing_airdrop_tokens_vault();

    token
        .approve_marketing_spender(&admin, &dropper, 300 * ONE_TOKEN)
        .unwrap();
    for i in 0..3 {
        let user = Address::named(&format!("user-{i}"));
        token
            .transfer_from(&dropper, &marketing, &user, 100 * ONE_TOKEN)
            .unwrap();
        assert_eq!(token.unlocked_balance_of(&user), 100 * ONE_TOKEN);
    }
    assert_eq!(token.allowance(&marketing, &dropper), 0);
    assert!(token
        .transfer_from(&dropper, &marketing, &dropper, 1)
        .is_err());
}

#[test]
fn vault_spender_approval_requires_authorization() {
    let (mut token, _) = setup();
    let eve = Address::named("eve");
    assert_eq!(
        token.approve_sale_spender(&eve, &eve, 1),
        Err(TokenError::Unauthorized { caller: eve })
    );
    assert_eq!(
        token.approve_marketing_spender(&eve, &eve, 1),
        Err(TokenError::Unauthorized { caller: eve })
    );
}

#[test]
fn vault_spender_cannot_be_null() {
    let (mut token, admin) = setup();
    assert_eq!(
        token.approve_sale_spender(&admin, &Address::ZERO, 1),
        Err(TokenError::InvalidSpender)
    );
}

// ---------------------------------------------------------------------------
// Allowances
// ---------------------------------------------------------------------------

#[test]
fn approving_more_than_balance_is_legal() {
    let (mut token, _) = setup();
    let alice = Address::named("alice");
    let bob = Address::named("bob");

    token.approve(&alice, &bob, 1_000).unwrap();
    assert_eq!(token.allowance(&alice, &bob), 1_000);
    assert!(matches!(
        token.transfer_from(&bob, &alice, &bob, 1),
        Err(TokenError::InsufficientBalance { .. })
    ));
    assert_eq!(token.allowance(&alice, &bob), 1_000);
}

#[test]
fn allowance_helpers_adjust_relative_to_current_value() {
    let (mut token, _) = setup();
    let alice = Address::named("alice");
    let bob = Address::named("bob");

    token.increase_allowance(&alice, &bob, 40).unwrap();
    token.increase_allowance(&alice, &bob, 2).unwrap();
    token.decrease_allowance(&alice, &bob, 12).unwrap();
    assert_eq!(token.allowance(&alice, &bob), 30);
    assert!(token.decrease_allowance(&alice, &bob, 31).is_err());
    assert_eq!(token.allowance(&alice, &bob), 30);
}

// ---------------------------------------------------------------------------
// Conservation
// ---------------------------------------------------------------------------

#[test]
fn supply_equals_sum_of_balances_through_a_busy_day() {
    let (mut token, admin) = setup();
    let alice = Address::named("alice");
    let bob = Address::named("bob");
    let desk = Address::named("desk");
    let sale = token.sale_tokens_vault();

    assert_eq!(sum_of_balances(&token), token.total_supply());

    token.lock_reward_pool_tokens(&admin, &alice, 10_000).unwrap();
    token.lock_team_tokens(&admin, &bob, 4_000).unwrap();
    token.approve_sale_spender(&admin, &desk, 5_000).unwrap();
    token.transfer_from(&desk, &sale, &alice, 5_000).unwrap();
    token.transfer(&alice, &bob, 2_000).unwrap();
    token.burn(&bob, 0).unwrap();
    assert_eq!(sum_of_balances(&token), token.total_supply());

    token.clock().advance(Duration::days(200));
    token.transfer(&alice, &bob, 7_000).unwrap();
    token.burn(&bob, 1_000).unwrap();
    assert_eq!(token.total_supply(), INITIAL_SUPPLY - 1_000);
    assert_eq!(sum_of_balances(&token), token.total_supply());

    // A rejected call leaves the books as they were.
    let before = token.snapshot();
    assert!(token.transfer(&alice, &bob, Amount::MAX).is_err());
    assert_eq!(token.snapshot(), before);
}

#[test]
fn transfer_to_null_address_rejected() {
    let (mut token, admin) = setup();
    let alice = Address::named("alice");
    token.approve_sale_spender(&admin, &admin, 10).unwrap();
    let sale = token.sale_tokens_vault();
    token.transfer_from(&admin, &sale, &alice, 10).unwrap();

    assert_eq!(
        token.transfer(&alice, &Address::ZERO, 1),
        Err(TokenError::InvalidRecipient)
    );
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[test]
fn granted_address_can_lock_and_renounced_cannot() {
    let (mut token, admin) = setup();
    let ops = Address::named("ops");
    let holder = Address::named("holder");

    assert!(token.lock_founders_tokens(&ops, &holder, 1).is_err());

    let events = token.grant_authorization(&admin, &ops).unwrap();
    assert_eq!(events, vec![Event::AuthorizationGranted { account: ops }]);
    token.lock_founders_tokens(&ops, &holder, 1).unwrap();

    let events = token.renounce_authorization(&ops).unwrap();
    assert_eq!(events, vec![Event::AuthorizationRenounced { account: ops }]);
    assert_eq!(
        token.lock_founders_tokens(&ops, &holder, 1),
        Err(TokenError::Unauthorized { caller: ops })
    );
    assert!(token.is_authorized(&admin));
}

#[test]
fn unauthorized_cannot_grant() {
    let (mut token, _) = setup();
    let eve = Address::named("eve");
    assert_eq!(
        token.grant_authorization(&eve, &eve),
        Err(TokenError::Unauthorized { caller: eve })
    );
    assert!(!token.is_authorized(&eve));
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn recover_sweeps_foreign_ledger_balance_to_caller() {
    let (mut token, admin) = setup();
    let mut foreign = Ledger::new();
    foreign.mint(&token.contract_address(), 5_000).unwrap();
    foreign.mint(&Address::named("someone"), 10).unwrap();

    let recovered = token.recover_erc20_tokens(&admin, &mut foreign).unwrap();
    assert_eq!(recovered, 5_000);
    assert_eq!(foreign.balance_of(&admin), 5_000);
    assert_eq!(foreign.balance_of(&token.contract_address()), 0);
    assert_eq!(foreign.balance_of(&Address::named("someone")), 10);
}

#[test]
fn recover_from_another_faireum_token() {
    let (mut token, admin) = setup();
    let (mut other, other_admin) = {
        let deployer = Address::named("other-admin");
        let clock = ManualClock::new(locks_start_date());
        let mut t = FaireumToken::new(deployer, TokenConfig::default(), clock).unwrap();
        t.create_tokens_vaults(&deployer).unwrap();
        (t, deployer)
    };
    let other_sale = other.sale_tokens_vault();
    other
        .approve_sale_spender(&other_admin, &other_admin, 99)
        .unwrap();
    other
        .transfer_from(&other_admin, &other_sale, &token.contract_address(), 99)
        .unwrap();

    let recovered = token.recover_erc20_tokens(&admin, &mut other).unwrap();
    assert_eq!(recovered, 99);
    assert_eq!(other.balance_of(&admin), 99);
}

#[test]
fn recover_requires_authorization() {
    let (mut token, _) = setup();
    let eve = Address::named("eve");
    let mut foreign = Ledger::new();
    foreign.mint(&token.contract_address(), 1).unwrap();

    assert_eq!(
        token.recover_erc20_tokens(&eve, &mut foreign),
        Err(TokenError::Unauthorized { caller: eve })
    );
    assert_eq!(foreign.balance_of(&token.contract_address()), 1);
}
