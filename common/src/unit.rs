//! Marker types used to distinguish [`DateTimeOf`] kinds.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker of an entity creation moment.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of a moment after which something stops being valid.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
