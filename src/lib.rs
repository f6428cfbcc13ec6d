// src/lib.rs

//! Wayback CDX snapshot exporter library

pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
