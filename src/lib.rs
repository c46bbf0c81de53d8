pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod listing;
pub mod model;
pub mod ui;
pub mod view;
