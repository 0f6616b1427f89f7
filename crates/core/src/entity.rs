//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every persisted record implements this so repositories can be written once
/// for all resource types.
pub trait Entity {
    /// Strongly-typed entity identifier.
    ///
    /// Ids are time-ordered (UUIDv7), so ordering by id is creation order.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
