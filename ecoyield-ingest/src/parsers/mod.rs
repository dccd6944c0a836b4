pub mod bank_rates;
pub mod carbon;
pub mod historical;
pub mod market;
pub mod seeds;
pub mod water;
pub mod yields;
