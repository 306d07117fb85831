//! Shared primitive types used across the entire crate.

/// A stable, unique identifier for any record (employee, customer, entry).
pub type EntityId = String;

/// A monetary amount in VND. Whole numbers in practice; f64 because the
/// allocator divides pools into per-head shares.
pub type Money = f64;

/// A share ratio expressed in percent points (100/N for an equal split).
pub type Ratio = f64;
