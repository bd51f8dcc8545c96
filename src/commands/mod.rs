//! Command implementations - one module per CLI action.

pub mod restart;
pub mod start;
pub mod start_db;
pub mod stop;
pub mod stop_all;
pub mod upload;
