// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

pub mod cache;
pub mod config;
pub mod exception;
pub mod handlers;
pub mod header;
pub mod param;
pub mod pattern;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod store;
pub mod util;

pub use config::{Cli, Config};
pub use exception::Exception;
pub use handlers::default_router;
pub use header::HeaderMap;
pub use param::{HttpEncoding, HttpRequestMethod};
pub use request::Request;
pub use response::Response;
pub use router::{Handler, Router};
pub use server::Server;
pub use store::{ByteStore, FileStore};
