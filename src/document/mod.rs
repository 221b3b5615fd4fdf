// src/document/mod.rs
pub mod document;
pub mod node;

pub use document::Document;
pub use node::Node;
