//! SeaORM entities, one per table created by the `migration` crate.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

/// Human-readable entity name used in `NotFound` errors.
pub trait Labelled {
    const LABEL: &'static str;
}
