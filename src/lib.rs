//! Terminal catalog browser for PokeAPI-style record services.

pub mod action;
pub mod api;
pub mod compare;
pub mod config;
pub mod detail;
pub mod effect;
pub mod error;
pub mod filter;
pub mod logging;
pub mod pagination;
pub mod reducer;
pub mod region;
pub mod request;
pub mod route;
pub mod state;
pub mod ui;
