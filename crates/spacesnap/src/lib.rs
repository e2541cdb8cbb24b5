//! `spacesnap` - A terminal viewer for NASA's Astronomy Picture of the Day
//!
//! This library provides the image provider client, the file-backed
//! favorites store, and the session and rendering code behind the
//! `spacesnap` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod browse;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod explore;
pub mod favorites;
pub mod logging;
pub mod provider;
pub mod record;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use favorites::FavoritesStore;
pub use logging::init_logging;
pub use provider::{ApodClient, ImageProvider};
pub use record::{FavoriteRecord, ImageRecord};
pub use session::{DateChoice, Session};
