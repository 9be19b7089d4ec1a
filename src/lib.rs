pub mod client;
pub mod config;
pub mod demo;
pub mod error;
pub mod hello;
pub mod models;
pub mod signing;
pub mod stubber;
pub mod wrapper;
