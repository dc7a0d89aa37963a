//! Algo-Sender: submit Algorand TestNet payments, record them, and track them
//! until the network confirms them.
//!
//! The server side is [`api`] on top of [`services`], [`db`] and [`network`].
//! The client side is [`client`], whose poller keeps a local view in step with
//! the server.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod network;
pub mod services;
pub mod utils;
