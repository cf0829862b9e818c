//! Keyed entity trait

/// An entity with a stable identifier
///
/// Stores key records by this identifier unless configured otherwise.
pub trait Entity {
    /// Stable identifier (an OParl URL in practice)
    fn id(&self) -> &str;
}
