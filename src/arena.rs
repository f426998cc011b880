//! Arena allocation used by the semantic passes.
//!
//! Scopes and symbols live as long as the arena and are linked to each
//! other by plain references, so every pass observes the same objects.
pub type BumpaloArena = bumpalo::Bump;
pub type BumpaloVec<'a, T> = bumpalo::collections::Vec<'a, T>;
