pub mod changelog;
pub mod changelog_file;
pub mod config;
pub mod filesystem;

pub mod testing;
