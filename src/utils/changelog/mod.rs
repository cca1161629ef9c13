// changelog model, parser and renderer

pub mod config;
pub mod parser;
pub mod patch;
pub mod renderer;
pub mod types;

pub use config::{ChangelogConfig, HeaderTemplate, labels_match, normalize_label};
pub use parser::{ChangelogParser, parse_changelog, parse_changelog_str};
pub use patch::{initial_changelog, patch_changelog};
pub use renderer::{header_line, render_changelog, render_version};
pub use types::{Changelog, ChangelogGroup, ChangelogVersion};
