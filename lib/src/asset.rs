use soroban_sdk::{contractclient, Address, Env};

/// Interface of a unique-asset (NFT) collaborator contract.
///
/// The escrow never assumes anything beyond this surface: ownership query
/// and an owner-authorized transfer that fails when unauthorized. Several
/// whitelisted collections may back a single bundle.
#[contractclient(name = "AssetClient")]
pub trait AssetContract {
    fn owner_of(env: Env, id: u64) -> Address;

    fn transfer(env: Env, from: Address, to: Address, id: u64);
}
