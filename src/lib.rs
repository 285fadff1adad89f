pub mod api;
pub mod config;
pub mod duel;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod matcher;
pub mod spellbook;
