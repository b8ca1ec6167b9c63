pub mod config;
pub mod error;
pub mod notification;
pub mod sweeper;
pub mod tagger;
pub mod volume;
pub mod volume_client;
