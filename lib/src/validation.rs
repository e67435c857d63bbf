use soroban_sdk::Vec;

use crate::{
    errors::ContractError, BundledAsset, MAX_BUNDLE_SIZE, MAX_PERCENTAGE_REWARDS,
};

pub fn validate_loan_period(period: u64, min: u64, max: u64) -> Result<(), ContractError> {
    if period < min || period > max {
        return Err(ContractError::InvalidPeriod);
    }
    Ok(())
}

pub fn validate_percentage(percentage: u32) -> Result<(), ContractError> {
    if percentage > MAX_PERCENTAGE_REWARDS {
        return Err(ContractError::InvalidPercentage);
    }
    Ok(())
}

pub fn validate_asset_list(assets: &Vec<BundledAsset>) -> Result<(), ContractError> {
    if assets.len() == 0 || assets.len() > MAX_BUNDLE_SIZE {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}

pub fn validate_fee(fee: i128) -> Result<(), ContractError> {
    if fee < 0 {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}
