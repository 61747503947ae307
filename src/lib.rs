// src/lib.rs

//! jobwatch: job board crawler with Telegram delivery

pub mod bot;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
