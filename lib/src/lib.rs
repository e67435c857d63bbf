#![no_std]
pub mod admin;
pub mod asset;
pub mod errors;
pub mod storage_keys;
pub mod types;
pub mod validation;

pub use storage_keys::*;
pub use types::*;

// Config
pub const ADMIN_KEY: &str = "admin";
pub const MAX_PERCENTAGE_REWARDS: u32 = 100;
pub const MAX_BUNDLE_SIZE: u32 = 64;

// Loan period bounds (seconds). Admin-settable after init.
pub const DEFAULT_MIN_LOAN_PERIOD: u64 = 3600; // 1 hour
pub const DEFAULT_MAX_LOAN_PERIOD: u64 = 604_800; // 7 days

// Offer typed-data domain. Bound to the contract address and network id at
// hash time to prevent cross-instance and cross-network replay.
pub const OFFER_DOMAIN_NAME: &str = "nft_loan";
pub const OFFER_DOMAIN_VERSION: u32 = 1;
