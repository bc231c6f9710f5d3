//! `tgdl`: bulk attachment downloader for Telegram groups and channels.
//!
//! This crate provides the core library: attachment filtering, collision-free
//! destination paths, the bounded-concurrency batch downloader, configuration
//! and session handling, and the terminal UI built on top of them.

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod model;
pub mod tui;
