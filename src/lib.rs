//! Turnview - response stream controller
//!
//! Turns a live stream of AI response fragments and backend status strings
//! into a navigable history of discrete response turns, revealed with a
//! typewriter effect, with a persisted list of saved favorites.

pub mod config;
pub mod db;
pub mod driver;
pub mod profile;
pub mod runtime;
pub mod saved;
pub mod stream;
pub mod typewriter;

pub use config::ViewConfig;
pub use profile::Profile;
pub use runtime::{ViewEvent, ViewHandle, ViewRuntime};
