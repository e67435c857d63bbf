use soroban_sdk::{contracttype, Address, BytesN, Env, Symbol, Vec};

use loan_lib::errors::ContractError;
use loan_lib::{
    BundledAsset, LoanableItem, LOAN_COUNTER_KEY, MAX_LOAN_PERIOD_KEY, MIN_LOAN_PERIOD_KEY,
};

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    PaymentToken,
    LoanItem(u64),
    /// Reverse index: (collection, asset id) -> owning bundle id. Covers
    /// principal assets and reward assets alike while they sit in escrow.
    AssetBundle(Address, u64),
    RewardAssets(u64),
    CancelledOffer(BytesN<32>),
    SigningKey(Address),
    AllowedCollection(Address),
}

/* ---------------- PAYMENT TOKEN ---------------- */

pub fn set_payment_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::PaymentToken, token);
}

pub fn get_payment_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::PaymentToken)
        .ok_or(ContractError::NotInitialized)
}

/* ---------------- LOAN PERIOD BOUNDS ---------------- */

pub fn set_loan_period_bounds(env: &Env, min: u64, max: u64) {
    env.storage()
        .instance()
        .set(&Symbol::new(env, MIN_LOAN_PERIOD_KEY), &min);
    env.storage()
        .instance()
        .set(&Symbol::new(env, MAX_LOAN_PERIOD_KEY), &max);
}

pub fn get_loan_period_bounds(env: &Env) -> (u64, u64) {
    let min = env
        .storage()
        .instance()
        .get(&Symbol::new(env, MIN_LOAN_PERIOD_KEY))
        .unwrap_or(loan_lib::DEFAULT_MIN_LOAN_PERIOD);
    let max = env
        .storage()
        .instance()
        .get(&Symbol::new(env, MAX_LOAN_PERIOD_KEY))
        .unwrap_or(loan_lib::DEFAULT_MAX_LOAN_PERIOD);
    (min, max)
}

/* ---------------- LOAN ITEMS ---------------- */

pub fn next_loan_id(env: &Env) -> u64 {
    let key = Symbol::new(env, LOAN_COUNTER_KEY);
    let counter: u64 = env.storage().instance().get(&key).unwrap_or(0);
    let id = counter + 1;
    env.storage().instance().set(&key, &id);
    id
}

pub fn get_loan_counter(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&Symbol::new(env, LOAN_COUNTER_KEY))
        .unwrap_or(0)
}

pub fn set_loan_item(env: &Env, item: &LoanableItem) {
    env.storage()
        .instance()
        .set(&DataKey::LoanItem(item.id), item);
}

pub fn get_loan_item(env: &Env, id: u64) -> Option<LoanableItem> {
    env.storage().instance().get(&DataKey::LoanItem(id))
}

/* ---------------- ASSET INDEX ---------------- */

pub fn index_asset(env: &Env, asset: &BundledAsset, loan_id: u64) {
    env.storage().instance().set(
        &DataKey::AssetBundle(asset.collection.clone(), asset.id),
        &loan_id,
    );
}

pub fn bundle_of(env: &Env, collection: &Address, asset_id: u64) -> Option<u64> {
    env.storage()
        .instance()
        .get(&DataKey::AssetBundle(collection.clone(), asset_id))
}

pub fn unindex_asset(env: &Env, asset: &BundledAsset) {
    env.storage()
        .instance()
        .remove(&DataKey::AssetBundle(asset.collection.clone(), asset.id));
}

/* ---------------- REWARD ASSET POOLS ---------------- */

pub fn get_reward_assets(env: &Env, loan_id: u64) -> Vec<BundledAsset> {
    env.storage()
        .instance()
        .get(&DataKey::RewardAssets(loan_id))
        .unwrap_or(Vec::new(env))
}

pub fn set_reward_assets(env: &Env, loan_id: u64, assets: &Vec<BundledAsset>) {
    env.storage()
        .instance()
        .set(&DataKey::RewardAssets(loan_id), assets);
}

pub fn clear_reward_assets(env: &Env, loan_id: u64) {
    env.storage()
        .instance()
        .remove(&DataKey::RewardAssets(loan_id));
}

/* ---------------- OFFER CANCELLATIONS ---------------- */

// Written once, never cleared.
pub fn mark_offer_cancelled(env: &Env, hash: &BytesN<32>) {
    env.storage()
        .instance()
        .set(&DataKey::CancelledOffer(hash.clone()), &true);
}

pub fn is_offer_cancelled(env: &Env, hash: &BytesN<32>) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::CancelledOffer(hash.clone()))
        .unwrap_or(false)
}

/* ---------------- SIGNING KEYS ---------------- */

pub fn set_signing_key(env: &Env, party: &Address, key: &BytesN<32>) {
    env.storage()
        .instance()
        .set(&DataKey::SigningKey(party.clone()), key);
}

pub fn get_signing_key(env: &Env, party: &Address) -> Option<BytesN<32>> {
    env.storage()
        .instance()
        .get(&DataKey::SigningKey(party.clone()))
}

/* ---------------- COLLECTION WHITELIST ---------------- */

pub fn set_collection_allowed(env: &Env, collection: &Address, allowed: bool) {
    env.storage()
        .instance()
        .set(&DataKey::AllowedCollection(collection.clone()), &allowed);
}

pub fn is_collection_allowed(env: &Env, collection: &Address) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::AllowedCollection(collection.clone()))
        .unwrap_or(false)
}
