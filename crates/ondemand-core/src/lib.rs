pub mod config;
pub mod logging;

pub mod catalog;
pub mod checksum;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod loaders;
pub mod node;
pub mod progress;
pub mod storage;
pub mod url_model;
