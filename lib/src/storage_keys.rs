use soroban_sdk::{symbol_short, Symbol};

pub const LOAN_COUNTER_KEY: &str = "loan_counter";
pub const MIN_LOAN_PERIOD_KEY: &str = "min_loan_period";
pub const MAX_LOAN_PERIOD_KEY: &str = "max_loan_period";

pub const IS_PAUSED_KEY: Symbol = symbol_short!("is_paused");
