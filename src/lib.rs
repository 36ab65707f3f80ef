pub mod config;
pub mod errors;
pub mod exec;
pub mod fixer;
pub mod gerrit;
pub mod history;
pub mod manifest;
pub mod sync;
