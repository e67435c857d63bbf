use soroban_sdk::contracterror;

/// Named failure conditions. Every one aborts the whole call with no
/// partial effect; clients can distinguish them by code.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAdmin = 3,
    Paused = 4,
    NotPaused = 5,
    LoanNotFound = 6,
    NotOwner = 7,
    InvalidPeriod = 8,
    InvalidPercentage = 9,
    InvalidInput = 10,
    AssetAlreadyBundled = 11,
    CollectionNotAllowed = 12,
    BundleActive = 13,
    AlreadyActive = 14,
    PrivateLoan = 15,
    InactiveBundle = 16,
    PeriodActive = 17,
    RewardIsBundledAsset = 18,
    NoRewardsPending = 19,
    OfferCancelled = 20,
    InvalidSigner = 21,
    ProtectedToken = 22,
}
