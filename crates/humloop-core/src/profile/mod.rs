//! The signed-in user's profile, statistics, works and favorites.

mod model;

pub use model::{FavoriteMusic, FavoritePost, Music, PasswordChange, ProfileUpdate, UserProfile, UserStatistics};
