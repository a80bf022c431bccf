//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity update.
#[derive(Clone, Copy, Debug)]
pub struct Update;

/// Marker type describing an entity completion.
#[derive(Clone, Copy, Debug)]
pub struct Completion;

/// Marker type describing an entity processing.
#[derive(Clone, Copy, Debug)]
pub struct Processing;

/// Marker type describing an entity scheduling.
#[derive(Clone, Copy, Debug)]
pub struct Scheduling;

/// Marker type describing an entity issuance.
#[derive(Clone, Copy, Debug)]
pub struct Issuance;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
