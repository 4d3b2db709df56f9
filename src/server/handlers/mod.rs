//! HTTP request handlers for the web server.

mod api;
mod games;
mod listings;

pub use api::health;
pub use games::game_reviews;
pub use listings::{
    latest_reviewed, latest_reviewed_for_platform, releases, releases_for_platform,
    releases_this_month,
};
