use soroban_sdk::{contracttype, Address, BytesN, Symbol, Vec};

/// Who a loan bundle may be issued to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum Claimer {
    Public = 0,
    Private = 1,
}

/// One (collection, asset id) pair held in escrow.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct BundledAsset {
    pub collection: Address,
    pub id: u64,
}

/// A loanable bundle of unique assets and its rental terms.
///
/// Lifecycle state is derived from the fields, never stored: see
/// [`LoanableItem::state`]. Records are retained after closure for audit;
/// `assets_claimed` is the closure marker.
#[derive(Clone, Debug)]
#[contracttype]
pub struct LoanableItem {
    pub id: u64,
    pub owner: Address,
    /// Fixed at creation.
    pub assets: Vec<BundledAsset>,
    pub upfront_fee: i128,
    /// Borrower's share of accrued rewards, 0-100.
    pub percentage_rewards: u32,
    pub time_period: u64,
    pub reserved_to: Option<Address>,
    pub claimer: Claimer,
    pub loanee: Option<Address>,
    pub start_time: Option<u64>,
    /// Monotone non-decreasing accrued token rewards.
    pub total_rewards: i128,
    pub loaner_claimed_rewards: i128,
    pub loanee_claimed_rewards: i128,
    pub assets_claimed: bool,
    pub created_at: u64,
}

/// Derived lifecycle state of a [`LoanableItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum LoanState {
    Listed = 0,
    Reserved = 1,
    Active = 2,
    Expired = 3,
    Closed = 4,
}

impl LoanableItem {
    pub fn is_active(&self, now: u64) -> bool {
        match (self.loanee.as_ref(), self.start_time) {
            (Some(_), Some(start)) => !self.assets_claimed && now < start + self.time_period,
            _ => false,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        match (self.loanee.as_ref(), self.start_time) {
            (Some(_), Some(start)) => !self.assets_claimed && now >= start + self.time_period,
            _ => false,
        }
    }

    pub fn state(&self, now: u64) -> LoanState {
        if self.assets_claimed {
            LoanState::Closed
        } else if self.is_active(now) {
            LoanState::Active
        } else if self.is_expired(now) {
            LoanState::Expired
        } else if self.claimer == Claimer::Private && self.reserved_to.is_some() {
            LoanState::Reserved
        } else {
            LoanState::Listed
        }
    }

    /// Period has elapsed (or the bundle was never loaned at all).
    pub fn period_elapsed(&self, now: u64) -> bool {
        match self.start_time {
            Some(start) => now >= start + self.time_period,
            None => true,
        }
    }
}

/// A signed, off-ledger proposal of rental terms. Ephemeral: only its hash
/// persists, and only once cancelled.
///
/// `claimer = Public` means the named loanee signed it (borrower proposing to
/// accept); `claimer = Private` means the bundle owner signed it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct Offer {
    pub loan_id: u64,
    pub loanee: Address,
    pub upfront_fee: i128,
    pub percentage_rewards: u32,
    pub time_period: u64,
    pub claimer: Claimer,
}

/// Typed-data domain an offer payload is bound to.
#[derive(Clone, Debug)]
#[contracttype]
pub struct OfferDomain {
    pub name: Symbol,
    pub version: u32,
    pub contract: Address,
    pub network: BytesN<32>,
}
