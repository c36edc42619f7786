//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every persisted record (category, inventory item, sale, change row) is an
/// entity keyed by its primary key. Stores rely on the ordering of `Id` to
/// return records in primary-key order.
pub trait Entity {
    /// Strongly-typed entity identifier (the record's primary key).
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
