//! Pure view-model builders over loaded collections.

pub mod map;
pub mod schedule;
pub mod snapshot;
