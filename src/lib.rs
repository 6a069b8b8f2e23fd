pub mod cache;
pub mod config;
pub mod exception;
pub mod mime;
pub mod param;
pub mod request;
pub mod responder;
pub mod response;
pub mod server;
pub mod util;

pub use cache::{DiskSource, PageCache, PageSource};
pub use config::{Args, Config};
pub use exception::{ParseError, ReadError, ServerError};
pub use mime::MimeTable;
pub use request::Request;
pub use responder::Responder;
pub use response::Response;
pub use util::fallback_page;
