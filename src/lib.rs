pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod editor;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod render;
pub mod session;
pub mod state;
