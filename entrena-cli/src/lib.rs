// Library exports for the Entrena CLI
// This allows testing of internal modules

pub mod access;
pub mod api;
pub mod commands;
pub mod config;
pub mod models;
pub mod navigation;
pub mod services;
