extern crate async_trait;
extern crate log;
extern crate percent_encoding;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate thiserror;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod image;
pub mod model;
pub mod post;
pub mod session;
pub mod transport;
pub mod view;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, FeedError, FeedErrorKind, ValidationError};
pub use feed::{FeedLoader, FeedView};
pub use model::{Comment, Identity, Post, UserRef};
pub use post::PostController;
pub use session::{SessionContext, SessionStore};

pub const SESSION_STORAGE_KEY: &'static str = "user";
pub const DEFAULT_API_BASE: &'static str = "http://127.0.0.1:8000";
pub const CSRF_COOKIE_NAME: &'static str = "csrftoken";
pub const CSRF_HEADER_NAME: &'static str = "X-CSRFToken";
