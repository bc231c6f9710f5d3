//! Core data model: chats, attachment-bearing messages and file categories.

pub mod attachment;
pub mod category;
pub mod dialog;
pub mod handle;
