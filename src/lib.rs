// Library surface shared by the server binary and the integration tests

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod game;
pub mod protocol;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;
