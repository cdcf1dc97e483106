//! Command-line counterpart of the Swapshop web front-end: log in, manage
//! the wardrobe, browse listings and read the inbox.

pub mod api;
pub mod app;
pub mod error;
pub mod render;
pub mod session;

pub use api::{ApiClient, ListingForm, DEFAULT_API_URL};
pub use app::App;
pub use error::ClientError;
pub use session::{Session, SessionStore};
