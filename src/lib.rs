pub mod api;
pub mod config;
pub mod course;
pub mod error;
pub mod localstore;
pub mod service;
pub mod store;
pub mod utils;
