// Shared helpers

pub mod encoding;
pub mod io;
pub mod normalize;

pub use normalize::{group_by_id, join_artists, rating_to_stars};
