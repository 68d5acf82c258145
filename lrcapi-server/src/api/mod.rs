//! HTTP API handlers for lrcapi

pub mod auth;
pub mod cover;
pub mod health;
pub mod lyrics;
pub mod tag;
pub mod ui;

pub use auth::{login_api, login_page, AuthGate};
pub use cover::get_cover;
pub use health::health_routes;
pub use lyrics::{get_lyrics, get_lyrics_json};
pub use tag::set_tag;
pub use ui::{favicon, redirect_to_ui};
