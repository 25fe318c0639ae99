//! Browser bindings, behind the `wasm` feature

pub mod web;

pub use web::{StorageListener, WebStorage};
