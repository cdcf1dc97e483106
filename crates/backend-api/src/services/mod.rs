pub mod eco;
pub mod error;
pub mod geo;
pub mod listing;
pub mod message;
pub mod wardrobe;

pub use error::*;
