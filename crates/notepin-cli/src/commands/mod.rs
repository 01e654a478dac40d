pub mod add;
pub mod cloud;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod map;
pub mod show;
