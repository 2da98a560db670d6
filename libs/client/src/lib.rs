//! Fantamatto client
//!
//! Everything a front end needs to drive the `/api` service: the HTTP
//! adapter, the player session, the upload form, cancellable view models
//! for the leaderboard and gallery, and the admin panel. Rendering is left
//! to the caller; blocking notices and confirmations go through
//! [`Prompter`].

pub mod admin;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod prompt;
pub mod session;
pub mod upload;
pub mod views;

pub use admin::{AdminConsole, AdminCredential, AdminSession, Applied, EditModal};
pub use api::ApiClient;
pub use app::App;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use fetch::{Snapshot, ViewModel};
pub use prompt::Prompter;
pub use session::Session;
pub use upload::{Photo, SubmissionForm};
pub use views::{Gallery, GalleryCard, Leaderboard, LeaderboardRow};
