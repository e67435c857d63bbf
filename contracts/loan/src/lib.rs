#![no_std]

use soroban_sdk::{
    contract, contractimpl, symbol_short, token, Address, Bytes, BytesN, Env, Symbol, Vec,
};

use loan_lib::admin as access;
use loan_lib::asset::AssetClient;
use loan_lib::errors::ContractError;
use loan_lib::validation;
use loan_lib::{BundledAsset, Claimer, LoanState, LoanableItem, Offer};

mod offers;
mod storage;

use storage::*;

#[contract]
pub struct Loan;

#[contractimpl]
impl Loan {
    /// One-time setup: admin, designated fee/reward token, period bounds.
    pub fn initialize(
        env: Env,
        admin: Address,
        payment_token: Address,
        min_loan_period: u64,
        max_loan_period: u64,
    ) -> Result<(), ContractError> {
        if env
            .storage()
            .instance()
            .has(&Symbol::new(&env, loan_lib::ADMIN_KEY))
        {
            return Err(ContractError::AlreadyInitialized);
        }
        if min_loan_period == 0 || min_loan_period > max_loan_period {
            return Err(ContractError::InvalidPeriod);
        }

        admin.require_auth();
        access::set_admin(&env, &admin);
        set_payment_token(&env, &payment_token);
        set_loan_period_bounds(&env, min_loan_period, max_loan_period);

        env.events().publish((symbol_short!("init"),), admin);
        Ok(())
    }

    /// Hand the admin role to a new address.
    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), ContractError> {
        access::transfer_admin(&env, &admin, &new_admin)?;
        env.events().publish((symbol_short!("admin_set"),), new_admin);
        Ok(())
    }

    pub fn set_payment_token(
        env: Env,
        admin: Address,
        token: Address,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        set_payment_token(&env, &token);
        Ok(())
    }

    pub fn set_loan_period_bounds(
        env: Env,
        admin: Address,
        min_loan_period: u64,
        max_loan_period: u64,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        if min_loan_period == 0 || min_loan_period > max_loan_period {
            return Err(ContractError::InvalidPeriod);
        }
        set_loan_period_bounds(&env, min_loan_period, max_loan_period);
        Ok(())
    }

    /// Whitelist (or delist) a unique-asset collection as acceptable
    /// collateral.
    pub fn allow_collection(
        env: Env,
        admin: Address,
        collection: Address,
        allowed: bool,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        set_collection_allowed(&env, &collection, allowed);
        env.events()
            .publish((symbol_short!("allow_col"),), (collection, allowed));
        Ok(())
    }

    /// Lock a group of unique assets into a new bundle and publish its
    /// rental terms. Supplying `reserved_to` lists the bundle as Private.
    ///
    /// All registry and index writes land before the escrow transfers, so a
    /// reentering collaborator sees every asset as already bundled.
    pub fn create_loanable_item(
        env: Env,
        owner: Address,
        assets: Vec<BundledAsset>,
        upfront_fee: i128,
        percentage_rewards: u32,
        time_period: u64,
        reserved_to: Option<Address>,
    ) -> Result<u64, ContractError> {
        owner.require_auth();
        access::require_not_paused(&env)?;

        validation::validate_asset_list(&assets)?;
        validation::validate_fee(upfront_fee)?;
        validation::validate_percentage(percentage_rewards)?;
        let (min, max) = get_loan_period_bounds(&env);
        validation::validate_loan_period(time_period, min, max)?;

        let loan_id = next_loan_id(&env);

        for asset in assets.iter() {
            if !is_collection_allowed(&env, &asset.collection) {
                return Err(ContractError::CollectionNotAllowed);
            }
            // Index lookup first: an escrowed asset is owned by this
            // contract, and double-bundling must be reported as such.
            if bundle_of(&env, &asset.collection, asset.id).is_some() {
                return Err(ContractError::AssetAlreadyBundled);
            }
            let collection = AssetClient::new(&env, &asset.collection);
            if collection.owner_of(&asset.id) != owner {
                return Err(ContractError::NotOwner);
            }
            // Indexing inside the check loop also rejects duplicates within
            // the submitted list. A later error discards all writes.
            index_asset(&env, &asset, loan_id);
        }

        let claimer = match reserved_to {
            Some(_) => Claimer::Private,
            None => Claimer::Public,
        };
        let item = LoanableItem {
            id: loan_id,
            owner: owner.clone(),
            assets: assets.clone(),
            upfront_fee,
            percentage_rewards,
            time_period,
            reserved_to: reserved_to.clone(),
            claimer,
            loanee: None,
            start_time: None,
            total_rewards: 0,
            loaner_claimed_rewards: 0,
            loanee_claimed_rewards: 0,
            assets_claimed: false,
            created_at: env.ledger().timestamp(),
        };
        set_loan_item(&env, &item);

        let contract = env.current_contract_address();
        for asset in assets.iter() {
            AssetClient::new(&env, &asset.collection).transfer(&owner, &contract, &asset.id);
        }

        env.events().publish(
            (Symbol::new(&env, "loan_created"),),
            (
                loan_id,
                owner,
                upfront_fee,
                percentage_rewards,
                time_period,
                reserved_to,
            ),
        );

        Ok(loan_id)
    }

    /// Overwrite the reservation of a not-yet-active bundle. `None` reopens
    /// it to the public.
    pub fn reserve_loan_item(
        env: Env,
        owner: Address,
        loan_id: u64,
        reserved_to: Option<Address>,
    ) -> Result<(), ContractError> {
        owner.require_auth();
        access::require_not_paused(&env)?;

        let mut item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if item.owner != owner {
            return Err(ContractError::NotOwner);
        }
        if item.assets_claimed {
            return Err(ContractError::InactiveBundle);
        }
        if item.is_active(env.ledger().timestamp()) {
            return Err(ContractError::BundleActive);
        }

        item.claimer = match reserved_to {
            Some(_) => Claimer::Private,
            None => Claimer::Public,
        };
        item.reserved_to = reserved_to.clone();
        set_loan_item(&env, &item);

        env.events()
            .publish((symbol_short!("reserved"),), (loan_id, reserved_to));
        Ok(())
    }

    /// Accept a listed bundle: pay the upfront fee, become the loanee for
    /// the term period. A Private listing accepts only its reserved address.
    pub fn loan_item(env: Env, loanee: Address, loan_id: u64) -> Result<(), ContractError> {
        loanee.require_auth();
        access::require_not_paused(&env)?;

        let mut item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if item.assets_claimed {
            return Err(ContractError::InactiveBundle);
        }
        if item.loanee.is_some() {
            return Err(ContractError::AlreadyActive);
        }
        if item.claimer == Claimer::Private && item.reserved_to != Some(loanee.clone()) {
            return Err(ContractError::PrivateLoan);
        }

        let start = env.ledger().timestamp();
        item.loanee = Some(loanee.clone());
        item.start_time = Some(start);
        set_loan_item(&env, &item);

        // Fee moves only after the loan record is committed.
        if item.upfront_fee > 0 {
            let token_client = token::Client::new(&env, &get_payment_token(&env)?);
            token_client.transfer(&loanee, &item.owner, &item.upfront_fee);
        }

        env.events()
            .publish((Symbol::new(&env, "loan_issued"),), (loan_id, loanee, start));
        Ok(())
    }

    /// True iff the asset sits in an Active bundle loaned to `candidate`.
    /// External asset-consuming logic checks usage rights here, without any
    /// transfer.
    pub fn has_access_to_nft(
        env: Env,
        collection: Address,
        asset_id: u64,
        candidate: Address,
    ) -> bool {
        let Some(loan_id) = bundle_of(&env, &collection, asset_id) else {
            return false;
        };
        let Some(item) = get_loan_item(&env, loan_id) else {
            return false;
        };
        item.is_active(env.ledger().timestamp()) && item.loanee == Some(candidate)
    }

    /// Return the principal assets to the owner after the period elapses and
    /// close the bundle. A never-loaned bundle may be delisted at any time.
    pub fn claim_nfts(env: Env, owner: Address, loan_id: u64) -> Result<(), ContractError> {
        owner.require_auth();
        access::require_not_paused(&env)?;

        let mut item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if item.owner != owner {
            return Err(ContractError::NotOwner);
        }
        if item.assets_claimed {
            return Err(ContractError::InactiveBundle);
        }
        if !item.period_elapsed(env.ledger().timestamp()) {
            return Err(ContractError::PeriodActive);
        }

        item.assets_claimed = true;
        set_loan_item(&env, &item);
        for asset in item.assets.iter() {
            unindex_asset(&env, &asset);
        }

        let contract = env.current_contract_address();
        for asset in item.assets.iter() {
            AssetClient::new(&env, &asset.collection).transfer(&contract, &owner, &asset.id);
        }

        env.events()
            .publish((Symbol::new(&env, "nfts_claimed"),), (loan_id, owner));
        Ok(())
    }

    /* ---------------- REWARD ACCOUNTING ---------------- */

    /// Accrue `amount` of the designated reward token to an Active bundle.
    /// Returns the new running total.
    pub fn add_token_rewards(
        env: Env,
        admin: Address,
        loan_id: u64,
        amount: i128,
    ) -> Result<i128, ContractError> {
        admin.require_auth();
        access::require_not_paused(&env)?;
        access::verify_admin(&env, &admin)?;
        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if !item.is_active(env.ledger().timestamp()) {
            return Err(ContractError::InactiveBundle);
        }

        item.total_rewards += amount;
        set_loan_item(&env, &item);

        let token_client = token::Client::new(&env, &get_payment_token(&env)?);
        token_client.transfer(&admin, &env.current_contract_address(), &amount);

        env.events().publish(
            (symbol_short!("rwd_added"),),
            (loan_id, amount, item.total_rewards),
        );
        Ok(item.total_rewards)
    }

    /// Escrow additional unique assets as a reward pool for an Active
    /// bundle, separate from the principal. An asset of the bundle itself is
    /// rejected.
    pub fn add_nft_rewards(
        env: Env,
        admin: Address,
        loan_id: u64,
        assets: Vec<BundledAsset>,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::require_not_paused(&env)?;
        access::verify_admin(&env, &admin)?;
        validation::validate_asset_list(&assets)?;

        let item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if !item.is_active(env.ledger().timestamp()) {
            return Err(ContractError::InactiveBundle);
        }

        let mut pool = get_reward_assets(&env, loan_id);
        for asset in assets.iter() {
            match bundle_of(&env, &asset.collection, asset.id) {
                Some(id) if id == loan_id => return Err(ContractError::RewardIsBundledAsset),
                Some(_) => return Err(ContractError::AssetAlreadyBundled),
                None => {}
            }
            index_asset(&env, &asset, loan_id);
            pool.push_back(asset);
        }
        set_reward_assets(&env, loan_id, &pool);

        let contract = env.current_contract_address();
        for asset in assets.iter() {
            AssetClient::new(&env, &asset.collection).transfer(&admin, &contract, &asset.id);
        }

        env.events().publish(
            (Symbol::new(&env, "nft_rwd_added"),),
            (loan_id, assets.len()),
        );
        Ok(())
    }

    /// Pay out the caller's accrued token-reward share. The loanee is
    /// entitled to `floor(total * percentage / 100)`, the owner to the
    /// remainder; a zero-accrual claim transfers nothing and succeeds.
    /// Claims stay available after the principal is claimed back.
    pub fn claim_token_rewards(
        env: Env,
        caller: Address,
        loan_id: u64,
    ) -> Result<i128, ContractError> {
        caller.require_auth();
        access::require_not_paused(&env)?;

        let mut item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        let loanee_share = item.total_rewards * (item.percentage_rewards as i128) / 100;

        let payout = if item.loanee == Some(caller.clone()) {
            let payout = loanee_share - item.loanee_claimed_rewards;
            item.loanee_claimed_rewards = loanee_share;
            payout
        } else if item.owner == caller {
            let entitled = item.total_rewards - loanee_share;
            let payout = entitled - item.loaner_claimed_rewards;
            item.loaner_claimed_rewards = entitled;
            payout
        } else {
            return Err(ContractError::NotOwner);
        };
        set_loan_item(&env, &item);

        if payout > 0 {
            let token_client = token::Client::new(&env, &get_payment_token(&env)?);
            token_client.transfer(&env.current_contract_address(), &caller, &payout);
        }

        env.events()
            .publish((symbol_short!("rwd_claim"),), (loan_id, caller, payout));
        Ok(payout)
    }

    /// Transfer the whole reward-asset pool to the owner once the period has
    /// elapsed. Strictly one-shot: with nothing pending the call fails.
    pub fn claim_nft_rewards(env: Env, owner: Address, loan_id: u64) -> Result<(), ContractError> {
        owner.require_auth();
        access::require_not_paused(&env)?;

        let item = get_loan_item(&env, loan_id).ok_or(ContractError::LoanNotFound)?;
        if item.owner != owner {
            return Err(ContractError::NotOwner);
        }
        if !item.period_elapsed(env.ledger().timestamp()) {
            return Err(ContractError::PeriodActive);
        }

        let pool = get_reward_assets(&env, loan_id);
        if pool.is_empty() {
            return Err(ContractError::NoRewardsPending);
        }

        clear_reward_assets(&env, loan_id);
        for asset in pool.iter() {
            unindex_asset(&env, &asset);
        }

        let contract = env.current_contract_address();
        for asset in pool.iter() {
            AssetClient::new(&env, &asset.collection).transfer(&contract, &owner, &asset.id);
        }

        env.events()
            .publish((Symbol::new(&env, "nft_rwd_clm"),), (loan_id, pool.len()));
        Ok(())
    }

    /* ---------------- OFFER SETTLEMENT ---------------- */

    /// Register the ed25519 verifying key a party signs offers with.
    pub fn register_signing_key(
        env: Env,
        party: Address,
        key: BytesN<32>,
    ) -> Result<(), ContractError> {
        party.require_auth();
        set_signing_key(&env, &party, &key);
        env.events().publish((symbol_short!("key_set"),), party);
        Ok(())
    }

    /// Settle a countersigned offer in one call: verify it was never
    /// cancelled and carries the expected party's signature, override the
    /// listing terms with the offer's, then issue the loan to the named
    /// loanee exactly as `loan_item` would.
    ///
    /// A borrower-signed offer is submitted by the bundle owner; an
    /// owner-signed offer by the named loanee. The submitter's auth is the
    /// countersignature.
    pub fn issue_loan(
        env: Env,
        submitter: Address,
        offer: Offer,
        signature: BytesN<64>,
    ) -> Result<(), ContractError> {
        submitter.require_auth();
        access::require_not_paused(&env)?;

        let mut item = get_loan_item(&env, offer.loan_id).ok_or(ContractError::LoanNotFound)?;

        let hash = offers::offer_hash(&env, &offer);
        if is_offer_cancelled(&env, &hash) {
            return Err(ContractError::OfferCancelled);
        }

        let signer = offers::expected_signer(&item, &offer);
        offers::verify_offer_signature(&env, &signer, &offer, &signature)?;
        match offer.claimer {
            Claimer::Public => {
                if submitter != item.owner {
                    return Err(ContractError::NotOwner);
                }
            }
            Claimer::Private => {
                if submitter != offer.loanee {
                    return Err(ContractError::PrivateLoan);
                }
            }
        }

        if item.assets_claimed {
            return Err(ContractError::InactiveBundle);
        }
        if item.loanee.is_some() {
            return Err(ContractError::AlreadyActive);
        }

        let (min, max) = get_loan_period_bounds(&env);
        validation::validate_loan_period(offer.time_period, min, max)?;
        validation::validate_percentage(offer.percentage_rewards)?;
        validation::validate_fee(offer.upfront_fee)?;

        let start = env.ledger().timestamp();
        item.upfront_fee = offer.upfront_fee;
        item.percentage_rewards = offer.percentage_rewards;
        item.time_period = offer.time_period;
        item.reserved_to = Some(offer.loanee.clone());
        item.claimer = Claimer::Private;
        item.loanee = Some(offer.loanee.clone());
        item.start_time = Some(start);
        set_loan_item(&env, &item);

        if item.upfront_fee > 0 {
            let token_client = token::Client::new(&env, &get_payment_token(&env)?);
            token_client.transfer(&offer.loanee, &item.owner, &item.upfront_fee);
        }

        env.events().publish(
            (Symbol::new(&env, "loan_issued"),),
            (offer.loan_id, offer.loanee, start),
        );
        Ok(())
    }

    /// Permanently invalidate one specific offer. Either party to the offer
    /// may cancel, provided the signature is the one the offer would settle
    /// under; the hash stays cancelled forever.
    pub fn cancel_offer(
        env: Env,
        caller: Address,
        offer: Offer,
        signature: BytesN<64>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        access::require_not_paused(&env)?;

        let item = get_loan_item(&env, offer.loan_id).ok_or(ContractError::LoanNotFound)?;
        if caller != item.owner && caller != offer.loanee {
            return Err(ContractError::NotOwner);
        }

        let signer = offers::expected_signer(&item, &offer);
        offers::verify_offer_signature(&env, &signer, &offer, &signature)?;

        let hash = offers::offer_hash(&env, &offer);
        mark_offer_cancelled(&env, &hash);

        env.events()
            .publish((Symbol::new(&env, "offer_cncl"),), (offer.loan_id, hash));
        Ok(())
    }

    /// Canonical signing payload for an offer, so off-ledger signers commit
    /// to byte-identical data.
    pub fn offer_payload(env: Env, offer: Offer) -> Bytes {
        offers::offer_payload(&env, &offer)
    }

    pub fn offer_hash(env: Env, offer: Offer) -> BytesN<32> {
        offers::offer_hash(&env, &offer)
    }

    /* ---------------- PAUSE & RECOVERY ---------------- */

    pub fn pause(env: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        access::set_paused(&env, true);
        env.events().publish((symbol_short!("paused"),), admin);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        access::set_paused(&env, false);
        env.events().publish((symbol_short!("unpaused"),), admin);
        Ok(())
    }

    /// Incident-response escape hatch: while paused, force-move any
    /// custodied assets regardless of bundle membership.
    pub fn emergency_withdrawal(
        env: Env,
        admin: Address,
        assets: Vec<BundledAsset>,
        to: Address,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        if !access::is_paused(&env) {
            return Err(ContractError::NotPaused);
        }

        let contract = env.current_contract_address();
        for asset in assets.iter() {
            AssetClient::new(&env, &asset.collection).transfer(&contract, &to, &asset.id);
        }

        env.events()
            .publish((symbol_short!("emergency"),), (to, assets.len()));
        Ok(())
    }

    /// Recover stray assets that are not part of any open bundle or reward
    /// pool.
    pub fn withdraw_nfts(
        env: Env,
        admin: Address,
        assets: Vec<BundledAsset>,
    ) -> Result<(), ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;

        let contract = env.current_contract_address();
        for asset in assets.iter() {
            if bundle_of(&env, &asset.collection, asset.id).is_some() {
                return Err(ContractError::AssetAlreadyBundled);
            }
            AssetClient::new(&env, &asset.collection).transfer(&contract, &admin, &asset.id);
        }

        env.events()
            .publish((symbol_short!("wd_nfts"),), (admin, assets.len()));
        Ok(())
    }

    /// Sweep a stray token balance to the admin. The designated fee/reward
    /// token is protected: draining it would strip active escrow.
    pub fn withdraw_token(env: Env, admin: Address, token: Address) -> Result<i128, ContractError> {
        admin.require_auth();
        access::verify_admin(&env, &admin)?;
        if token == get_payment_token(&env)? {
            return Err(ContractError::ProtectedToken);
        }

        let token_client = token::Client::new(&env, &token);
        let balance = token_client.balance(&env.current_contract_address());
        if balance > 0 {
            token_client.transfer(&env.current_contract_address(), &admin, &balance);
        }

        env.events()
            .publish((symbol_short!("wd_token"),), (token, balance));
        Ok(balance)
    }

    /* ---------------- VIEWS ---------------- */

    pub fn get_loan_item(env: Env, loan_id: u64) -> Option<LoanableItem> {
        get_loan_item(&env, loan_id)
    }

    pub fn get_loan_state(env: Env, loan_id: u64) -> Option<LoanState> {
        get_loan_item(&env, loan_id).map(|item| item.state(env.ledger().timestamp()))
    }

    pub fn get_bundle_of(env: Env, collection: Address, asset_id: u64) -> Option<u64> {
        bundle_of(&env, &collection, asset_id)
    }

    pub fn get_reward_assets(env: Env, loan_id: u64) -> Vec<BundledAsset> {
        get_reward_assets(&env, loan_id)
    }

    pub fn total_loan_items(env: Env) -> u64 {
        get_loan_counter(&env)
    }

    pub fn collection_allowed(env: Env, collection: Address) -> bool {
        is_collection_allowed(&env, &collection)
    }

    pub fn is_paused(env: Env) -> bool {
        access::is_paused(&env)
    }

    pub fn get_admin_address(env: Env) -> Result<Address, ContractError> {
        access::get_admin(&env)
    }
}


#[cfg(test)]
mod test_bundle;
