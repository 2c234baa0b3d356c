//! Codepad core library: AI gateway proxy, gateway client, response segmentation, view state,
//! and bookmarks, used by the CLI.

pub mod bookmarks;
pub mod client;
pub mod config;
pub mod editor;
pub mod explainer;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod prompt;
pub mod segment;
pub mod view;
