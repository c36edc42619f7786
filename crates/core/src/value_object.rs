//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two values with the same attributes are
/// equal. Date periods and update requests are value objects; categories and
/// sales are entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
