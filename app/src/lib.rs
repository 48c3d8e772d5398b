// cartdesk/app/src/lib.rs

//! HTML shell for the cart desk: admin pages, self-service pages and,
//! optionally, an in-memory `/api` backend.

pub mod config;
pub mod errors;
pub mod state;
pub mod web;
