pub mod models;
pub mod monitor;
pub mod normalize;
pub mod ops;
pub mod persistence;
pub mod progress;
pub mod remote;
pub mod sqlite;
pub mod timeline;
