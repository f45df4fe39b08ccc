//! Core library for the tradesxbt dashboard backend.
//!
//! The price feed lives in [`feed`]; [`server`] exposes it over HTTP together
//! with the chat relay, the mock access store and the market analyst.

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod monitor;
pub mod server;
pub mod utils;

#[cfg(test)]
mod testing;
