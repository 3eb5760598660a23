//! Request plumbing shared by every client and view.
//!
//! # Main Components
//!
//! - [`ApiClient`] / [`HttpActor`] - the transport handle and the task that performs HTTP calls
//! - [`Query`] - query-string building from filter structs
//! - [`QueryStream`] - latest-wins, cancellable data streams
//! - [`ResourceList`] - a filtered collection kept in sync with the server
//! - [`KeyedCache`] - explicit memoization with manual invalidation
//! - [`Blob`] / [`ObjectUrl`] - binary downloads and scoped preview URLs
//! - [`ApiError`] - the error every call returns
//!
//! # Testing
//!
//! See the [`mock`] module for a transport that answers from canned responses.

pub mod blob;
pub mod cache;
pub mod core;
pub mod error;
pub mod list;
pub mod mock;
pub mod params;
pub mod stream;

pub use blob::*;
pub use cache::*;
pub use self::core::*;
pub use error::*;
pub use list::*;
pub use params::*;
pub use stream::*;
