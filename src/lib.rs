// src/lib.rs

pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod map;
pub mod utils;
