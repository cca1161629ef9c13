pub mod error;
pub mod utils;

pub use error::*;
pub use utils::changelog::{
    Changelog, ChangelogConfig, ChangelogGroup, ChangelogParser, ChangelogVersion,
    HeaderTemplate, initial_changelog, parse_changelog, parse_changelog_str, patch_changelog,
    render_changelog, render_version,
};
pub use utils::changelog_file::ChangelogFile;
pub use utils::config::{ChangelogSettings, ChlogConfig, project_version};
