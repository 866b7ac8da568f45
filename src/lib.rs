/*
 * Responsibility
 * - crate の module 宣言 (binary / integration tests から使う)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
