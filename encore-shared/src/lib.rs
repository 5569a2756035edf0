pub mod models;
pub mod pii;

/// Currency every price in the system is quoted in.
pub const CURRENCY: &str = "UGX";
