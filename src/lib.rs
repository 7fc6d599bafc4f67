pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod storage;
pub mod validate;
