//! Bundle lifecycle: creation, reservation, issuing, closure.

#![cfg(test)]

use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, Env, Vec};

use loan_lib::errors::ContractError;
use loan_lib::{BundledAsset, Claimer, LoanState};

use crate::testutils::*;
use crate::LoanClient;

#[test]
fn create_lists_bundle_and_escrows_assets() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 10);

    let loan_id = client.create_loanable_item(&owner, &assets, &1000, &30, &604_800, &None);
    assert_eq!(loan_id, 1);
    assert_eq!(client.total_loan_items(), 1);

    let item = client.get_loan_item(&loan_id).unwrap();
    assert_eq!(item.owner, owner);
    assert_eq!(item.assets, assets);
    assert_eq!(item.upfront_fee, 1000);
    assert_eq!(item.percentage_rewards, 30);
    assert_eq!(item.time_period, 604_800);
    assert_eq!(item.claimer, Claimer::Public);
    assert_eq!(item.loanee, None);
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Listed));

    // Escrow holds every asset and the reverse index points back.
    for asset in assets.iter() {
        assert_eq!(asset_owner(&env, &asset), contract_id);
        assert_eq!(
            client.get_bundle_of(&asset.collection, &asset.id),
            Some(loan_id)
        );
    }
}

#[test]
fn create_requires_asset_ownership() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let stranger = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 3);

    assert_eq!(
        client.try_create_loanable_item(&stranger, &assets, &1000, &30, &604_800, &None),
        Err(Ok(ContractError::NotOwner))
    );
}

#[test]
fn create_validates_time_period() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 2);

    assert_eq!(
        client.try_create_loanable_item(&owner, &assets, &1000, &30, &100, &None),
        Err(Ok(ContractError::InvalidPeriod))
    );
    assert_eq!(
        client.try_create_loanable_item(&owner, &assets, &1000, &30, &605_800, &None),
        Err(Ok(ContractError::InvalidPeriod))
    );
}

#[test]
fn create_validates_percentage_and_assets() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 2);
    let empty: Vec<BundledAsset> = Vec::new(&env);

    assert_eq!(
        client.try_create_loanable_item(&owner, &assets, &1000, &101, &604_800, &None),
        Err(Ok(ContractError::InvalidPercentage))
    );
    assert_eq!(
        client.try_create_loanable_item(&owner, &empty, &1000, &30, &604_800, &None),
        Err(Ok(ContractError::InvalidInput))
    );
}

#[test]
fn create_rejects_unlisted_collection() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, _admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);

    // Registered but never whitelisted.
    let collection = env.register_contract(None, TestAsset);
    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 1);

    assert_eq!(
        client.try_create_loanable_item(&owner, &assets, &1000, &30, &604_800, &None),
        Err(Ok(ContractError::CollectionNotAllowed))
    );
}

#[test]
fn no_double_bundling() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 5);
    client.create_loanable_item(&owner, &assets, &1000, &30, &604_800, &None);

    assert_eq!(
        client.try_create_loanable_item(&owner, &assets, &1000, &30, &604_800, &None),
        Err(Ok(ContractError::AssetAlreadyBundled))
    );
}

#[test]
fn duplicate_asset_within_submission_rejected() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let minted = mint_assets(&env, &collection, &owner, 1);
    let one = minted.get(0).unwrap();
    let doubled = Vec::from_array(&env, [one.clone(), one.clone()]);

    assert_eq!(
        client.try_create_loanable_item(&owner, &doubled, &1000, &30, &604_800, &None),
        Err(Ok(ContractError::AssetAlreadyBundled))
    );
}

#[test]
fn reservation_lifecycle() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let first = Address::generate(&env);
    let second = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 3);

    let loan_id =
        client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &Some(first.clone()));
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Reserved));

    // Only the owner may re-reserve.
    assert_eq!(
        client.try_reserve_loan_item(&first, &loan_id, &Some(second.clone())),
        Err(Ok(ContractError::NotOwner))
    );

    client.reserve_loan_item(&owner, &loan_id, &Some(second.clone()));
    let item = client.get_loan_item(&loan_id).unwrap();
    assert_eq!(item.reserved_to, Some(second.clone()));
    assert_eq!(item.claimer, Claimer::Private);

    // Clearing the reservation reopens the listing.
    client.reserve_loan_item(&owner, &loan_id, &None);
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Listed));
}

#[test]
fn private_loan_only_for_reserved_address() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let reserved = Address::generate(&env);
    let stranger = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 3);
    mint_tokens(&env, &token, &reserved, 1000);

    let loan_id =
        client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &Some(reserved.clone()));

    assert_eq!(
        client.try_loan_item(&stranger, &loan_id),
        Err(Ok(ContractError::PrivateLoan))
    );

    client.loan_item(&reserved, &loan_id);
    let item = client.get_loan_item(&loan_id).unwrap();
    assert_eq!(item.loanee, Some(reserved.clone()));
    assert_eq!(token_balance(&env, &token, &owner), 100);
}

#[test]
fn public_loan_pays_fee_and_grants_access() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let borrower = Address::generate(&env);
    let other = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 10);
    mint_tokens(&env, &token, &borrower, 1000);

    let loan_id = client.create_loanable_item(&owner, &assets, &1000, &30, &604_800, &None);
    client.loan_item(&borrower, &loan_id);

    assert_eq!(token_balance(&env, &token, &borrower), 0);
    assert_eq!(token_balance(&env, &token, &owner), 1000);
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Active));

    let probe = assets.get(0).unwrap();
    assert!(client.has_access_to_nft(&probe.collection, &probe.id, &borrower));
    assert!(!client.has_access_to_nft(&probe.collection, &probe.id, &owner));
    assert!(!client.has_access_to_nft(&probe.collection, &probe.id, &other));
}

#[test]
fn active_loan_cannot_be_reissued_or_rereserved() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let borrower = Address::generate(&env);
    let late = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 2);
    mint_tokens(&env, &token, &borrower, 100);

    let loan_id = client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &None);
    client.loan_item(&borrower, &loan_id);

    assert_eq!(
        client.try_loan_item(&late, &loan_id),
        Err(Ok(ContractError::AlreadyActive))
    );
    assert_eq!(
        client.try_reserve_loan_item(&owner, &loan_id, &Some(late.clone())),
        Err(Ok(ContractError::BundleActive))
    );
}

#[test]
fn access_lapses_once_period_expires() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let borrower = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 1);
    mint_tokens(&env, &token, &borrower, 100);

    let loan_id = client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &None);
    client.loan_item(&borrower, &loan_id);

    let probe = assets.get(0).unwrap();
    assert!(client.has_access_to_nft(&probe.collection, &probe.id, &borrower));

    advance_time(&env, 60_480);
    assert!(!client.has_access_to_nft(&probe.collection, &probe.id, &borrower));
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Expired));
}

#[test]
fn claim_nfts_gated_then_final() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let borrower = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 5);
    mint_tokens(&env, &token, &borrower, 100);

    let loan_id = client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &None);
    client.loan_item(&borrower, &loan_id);

    assert_eq!(
        client.try_claim_nfts(&owner, &loan_id),
        Err(Ok(ContractError::PeriodActive))
    );

    advance_time(&env, 60_480);
    client.claim_nfts(&owner, &loan_id);

    for asset in assets.iter() {
        assert_eq!(asset_owner(&env, &asset), owner);
        assert_eq!(client.get_bundle_of(&asset.collection, &asset.id), None);
    }
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Closed));

    // Closure is final: no reissue, no re-reservation, no second claim.
    assert_eq!(
        client.try_loan_item(&borrower, &loan_id),
        Err(Ok(ContractError::InactiveBundle))
    );
    assert_eq!(
        client.try_reserve_loan_item(&owner, &loan_id, &None),
        Err(Ok(ContractError::InactiveBundle))
    );
    assert_eq!(
        client.try_claim_nfts(&owner, &loan_id),
        Err(Ok(ContractError::InactiveBundle))
    );
}

#[test]
fn closed_bundle_assets_can_be_rebundled_under_new_id() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let borrower = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 3);
    mint_tokens(&env, &token, &borrower, 100);

    let first = client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &None);
    client.loan_item(&borrower, &first);
    advance_time(&env, 60_480);
    client.claim_nfts(&owner, &first);

    let second = client.create_loanable_item(&owner, &assets, &200, &20, &60_480, &None);
    assert_ne!(first, second);
    assert_eq!(second, 2);
    let probe = assets.get(0).unwrap();
    assert_eq!(
        client.get_bundle_of(&probe.collection, &probe.id),
        Some(second)
    );
    // The old record stays inert for audit.
    assert_eq!(client.get_loan_state(&first), Some(LoanState::Closed));
}

#[test]
fn never_loaned_bundle_can_be_delisted_immediately() {
    let env = Env::default();
    env.mock_all_auths();
    let (contract_id, admin, _token) = setup_loan(&env);
    let client = LoanClient::new(&env, &contract_id);
    let collection = setup_collection(&env, &contract_id, &admin);

    let owner = Address::generate(&env);
    let assets = mint_assets(&env, &collection, &owner, 2);

    let loan_id = client.create_loanable_item(&owner, &assets, &100, &13, &60_480, &None);
    client.claim_nfts(&owner, &loan_id);

    for asset in assets.iter() {
        assert_eq!(asset_owner(&env, &asset), owner);
    }
    assert_eq!(client.get_loan_state(&loan_id), Some(LoanState::Closed));
}
