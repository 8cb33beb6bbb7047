//! Pantry Chef: suggest recipes from the ingredients you already have.
//!
//! The server side lives in [`routes`] and turns a pantry list into a Gemini
//! prompt, then coerces the model's text back into recipe records via
//! [`normalize`]. The client side ([`pantry`], [`client`]) holds the user's
//! ingredients and the resulting view state.

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod models;
pub mod normalize;
pub mod pantry;
pub mod prompt;
pub mod routes;
