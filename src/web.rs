//! HTTP layer.
//!
//! Handlers work on the crate-owned [`WebRequest`]/[`WebResponse`] pair so
//! the whole application can be driven without a socket; [`server`] adapts
//! them to `may_minihttp`.
//!
//! Redirects are followed inside [`Clinic::handle`]: the target page is
//! rendered directly and carries the flash message of the redirecting
//! handler.

mod owners;
mod pets;
mod request;
mod response;
mod router;
pub mod server;
mod system;
mod vets;
mod views;
mod visits;
mod xml;

pub use request::{Method, Params, WebRequest};
pub use response::{ContentType, Flash, Reply, WebResponse};
pub use router::{error_response, Clinic, Route};
pub use system::CRASH_MESSAGE;
pub use views::escape;
