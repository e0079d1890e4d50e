//! Route handlers.
//!
//! `page` serves the panel (HTML and form posts), `hospitals` the JSON API
//! that `HttpApiStore` consumes, `health` liveness and status.

pub mod health;
pub mod hospitals;
pub mod page;
