//! Offer settlement: canonical payload encoding, hashing, and signature
//! verification against registered ed25519 keys.
//!
//! An offer's payload is the XDR encoding of the typed-data domain followed
//! by the offer itself. The domain carries the contract address and the
//! ledger network id, so a signature never replays across instances or
//! networks. The SHA-256 of the payload keys the permanent cancellation map.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use loan_lib::errors::ContractError;
use loan_lib::{Claimer, LoanableItem, Offer, OfferDomain, OFFER_DOMAIN_NAME, OFFER_DOMAIN_VERSION};

use crate::storage::get_signing_key;

pub fn offer_domain(env: &Env) -> OfferDomain {
    OfferDomain {
        name: Symbol::new(env, OFFER_DOMAIN_NAME),
        version: OFFER_DOMAIN_VERSION,
        contract: env.current_contract_address(),
        network: env.ledger().network_id(),
    }
}

/// Canonical bytes an offer signer commits to.
pub fn offer_payload(env: &Env, offer: &Offer) -> Bytes {
    let mut payload = Bytes::new(env);
    payload.append(&offer_domain(env).to_xdr(env));
    payload.append(&offer.clone().to_xdr(env));
    payload
}

pub fn offer_hash(env: &Env, offer: &Offer) -> BytesN<32> {
    env.crypto().sha256(&offer_payload(env, offer)).to_bytes()
}

/// The party whose signature makes this offer valid: the named loanee for a
/// borrower-signed (`Public`) offer, the bundle owner for an owner-signed
/// (`Private`) one.
pub fn expected_signer(item: &LoanableItem, offer: &Offer) -> Address {
    match offer.claimer {
        Claimer::Public => offer.loanee.clone(),
        Claimer::Private => item.owner.clone(),
    }
}

/// Verify `signature` over the offer's canonical payload against the
/// registered key of `signer`. An unregistered signer fails `InvalidSigner`;
/// a forged signature aborts in the host's ed25519 check.
pub fn verify_offer_signature(
    env: &Env,
    signer: &Address,
    offer: &Offer,
    signature: &BytesN<64>,
) -> Result<(), ContractError> {
    let key = get_signing_key(env, signer).ok_or(ContractError::InvalidSigner)?;
    let payload = offer_payload(env, offer);
    env.crypto().ed25519_verify(&key, &payload, signature);
    Ok(())
}
