/// Crate error type.
pub mod error;
/// Gravity keywords and explicit offsets.
pub mod position;
/// `px` / `%` unit expressions.
pub mod units;
