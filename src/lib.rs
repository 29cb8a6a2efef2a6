pub mod adapter;
pub mod config;
pub mod connection;
pub mod consts;
pub mod host;
pub mod logging;
pub mod nodes;
