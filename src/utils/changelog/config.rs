// changelog grammar configuration

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_GROUPS: [&str; 6] = [
    "Added",
    "Changed",
    "Deprecated",
    "Removed",
    "Fixed",
    "Security",
];
pub const DEFAULT_HEADER_FORMAT: &str = "[{version}]";
pub const DEFAULT_ITEM_PREFIX: &str = "-";
pub const DEFAULT_UNRELEASED_TERM: &str = "[Unreleased]";
pub const DEFAULT_FILE_NAME: &str = "CHANGELOG.md";
pub const DEFAULT_VERSION: &str = "0.1.0";

// version token inside a header, and the `{date}` stamp
const VERSION_TOKEN_PATTERN: &str = r"[^\s\[\]]+";
const DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";
const VERSION_PLACEHOLDER: char = '\u{0}';
const DATE_PLACEHOLDER: char = '\u{1}';

/// strip whitespace and one pair of surrounding brackets from a version token
pub fn normalize_label(token: &str) -> &str {
    let trimmed = token.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// compare two version labels the way the changelog does (case-insensitive, brackets ignored)
pub fn labels_match(a: &str, b: &str) -> bool {
    normalize_label(a).eq_ignore_ascii_case(normalize_label(b))
}

/// renders the text that follows `## ` in a released version header
#[derive(Clone)]
pub struct HeaderTemplate {
    description: String,
    format: Option<String>,
    render: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl HeaderTemplate {
    /// wrap an arbitrary formatting function
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            description: "<custom>".to_string(),
            format: None,
            render: Arc::new(render),
        }
    }

    /// build a template from a format string.
    ///
    /// `{version}` is replaced by the version label, `{date}` by today's
    /// local date as `YYYY-MM-DD`.
    pub fn from_format(format: impl Into<String>) -> Self {
        let format = format.into();
        let template = format.clone();
        Self {
            description: format.clone(),
            format: Some(format),
            render: Arc::new(move |version: &str| {
                let mut header = template.replace("{version}", version);
                if header.contains("{date}") {
                    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
                    header = header.replace("{date}", &today);
                }
                header
            }),
        }
    }

    pub fn apply(&self, version: &str) -> String {
        (self.render)(version)
    }

    /// regex matching the rendered header text, the version as its only capture group.
    ///
    /// `None` when the template output does not contain the version.
    pub fn version_pattern(&self) -> Option<String> {
        let rendered = match &self.format {
            Some(format) => format
                .replace("{version}", &VERSION_PLACEHOLDER.to_string())
                .replace("{date}", &DATE_PLACEHOLDER.to_string()),
            None => self.apply(&VERSION_PLACEHOLDER.to_string()),
        };

        let (prefix, suffix) = rendered.split_once(VERSION_PLACEHOLDER)?;
        let literal = |text: &str| {
            regex::escape(text)
                .replace(DATE_PLACEHOLDER, DATE_PATTERN)
                .replace(VERSION_PLACEHOLDER, VERSION_TOKEN_PATTERN)
        };

        Some(format!(
            "{}({}){}",
            literal(prefix),
            VERSION_TOKEN_PATTERN,
            literal(suffix)
        ))
    }
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        Self::from_format(DEFAULT_HEADER_FORMAT)
    }
}

impl fmt::Debug for HeaderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeaderTemplate")
            .field(&self.description)
            .finish()
    }
}

/// configuration for reading and writing a changelog
#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    /// group names in rendering order
    pub groups: Vec<String>,

    /// header text for released versions
    pub header_template: HeaderTemplate,

    /// custom header pattern, first capture group is the version token
    pub header_pattern: Option<Regex>,

    /// marker that starts an item line (default: "-")
    pub item_prefix: String,

    /// re-create an empty unreleased section after patching
    pub keep_unreleased_section: bool,

    /// allow patching when the unreleased section has no items
    pub patch_empty: bool,

    /// location of the changelog file
    pub path: PathBuf,

    /// current project version, used when patching without an explicit version
    pub version: String,

    /// header term of the unreleased section (default: "[Unreleased]")
    pub unreleased_term: String,
}

impl ChangelogConfig {
    /// create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups<S: Into<String>>(mut self, groups: impl IntoIterator<Item = S>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn header_template(mut self, template: HeaderTemplate) -> Self {
        self.header_template = template;
        self
    }

    pub fn header_format(mut self, format: impl Into<String>) -> Self {
        self.header_template = HeaderTemplate::from_format(format);
        self
    }

    /// compile and set a custom header pattern
    pub fn header_pattern(mut self, pattern: &str) -> Result<Self> {
        self.header_pattern = Some(compile_header_pattern(pattern)?);
        Ok(self)
    }

    pub fn item_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.item_prefix = prefix.into();
        self
    }

    pub fn keep_unreleased_section(mut self, keep: bool) -> Self {
        self.keep_unreleased_section = keep;
        self
    }

    pub fn patch_empty(mut self, allow: bool) -> Self {
        self.patch_empty = allow;
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn unreleased_term(mut self, term: impl Into<String>) -> Self {
        self.unreleased_term = term.into();
        self
    }

    /// default changelog location inside a project directory
    pub fn default_path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(DEFAULT_FILE_NAME)
    }

    /// check field constraints that the builder cannot enforce
    pub fn validate(&self) -> Result<()> {
        if let Some(group) = self
            .groups
            .iter()
            .find(|g| g.trim().is_empty() || g.contains('\n'))
        {
            return Err(Error::InvalidConfig {
                reason: format!("invalid group name {:?}", group),
            });
        }

        if self.item_prefix.trim().is_empty() {
            return Err(Error::InvalidConfig {
                reason: "item prefix must not be empty".to_string(),
            });
        }

        if normalize_label(&self.unreleased_term).is_empty() {
            return Err(Error::InvalidConfig {
                reason: "unreleased term must not be empty".to_string(),
            });
        }

        if self.version.trim().is_empty() {
            return Err(Error::InvalidConfig {
                reason: "version must not be empty".to_string(),
            });
        }

        if self.header_template.apply(&self.version).contains('\n') {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "header template {:?} must render a single line",
                    self.header_template
                ),
            });
        }

        if let Some(pattern) = &self.header_pattern {
            check_capture_group(pattern)?;
        }

        Ok(())
    }

    /// configured header pattern, or the default one derived from the
    /// unreleased term and the header template.
    ///
    /// the default accepts level-two headings whose text is the unreleased
    /// term, the template output, or a bare or bracketed token. Anything
    /// after the matched text (dates, links) is dropped. The version is the
    /// first capture group that takes part in the match.
    pub fn header_regex(&self) -> Result<Regex> {
        if let Some(pattern) = &self.header_pattern {
            return Ok(pattern.clone());
        }

        let mut alternatives = vec![format!(
            "((?i:{}))",
            regex::escape(self.unreleased_term.trim())
        )];
        if let Some(template) = self.header_template.version_pattern() {
            alternatives.push(template);
        }
        alternatives.push(format!(r"(\[[^\]]+\]|{})", VERSION_TOKEN_PATTERN));

        let pattern = format!(
            r"^##[ \t]+(?:{})(?:[ \t].*)?$",
            alternatives.join("|")
        );
        compile_header_pattern(&pattern)
    }

    /// version token of a header line, `None` when the line is not a header
    pub fn header_token<'a>(regex: &Regex, line: &'a str) -> Option<&'a str> {
        let captures = regex.captures(line)?;
        let token = captures.iter().skip(1).flatten().next()?.as_str();
        (!token.trim().is_empty()).then_some(token)
    }

    /// check whether a header token names the unreleased section
    pub fn is_unreleased_label(&self, label: &str) -> bool {
        labels_match(label, &self.unreleased_term)
    }

    /// position of a group in rendering order; unknown groups sort last
    pub fn group_rank(&self, name: &str) -> usize {
        self.groups
            .iter()
            .position(|g| g == name)
            .unwrap_or(self.groups.len())
    }

    pub fn is_known_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect(),
            header_template: HeaderTemplate::default(),
            header_pattern: None,
            item_prefix: DEFAULT_ITEM_PREFIX.to_string(),
            keep_unreleased_section: true,
            patch_empty: true,
            path: PathBuf::from(DEFAULT_FILE_NAME),
            version: DEFAULT_VERSION.to_string(),
            unreleased_term: DEFAULT_UNRELEASED_TERM.to_string(),
        }
    }
}

fn compile_header_pattern(pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|e| Error::InvalidHeaderPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    check_capture_group(&regex)?;
    Ok(regex)
}

fn check_capture_group(regex: &Regex) -> Result<()> {
    // group 0 is the whole match
    if regex.captures_len() < 2 {
        return Err(Error::InvalidHeaderPattern {
            pattern: regex.as_str().to_string(),
            reason: "pattern needs a capture group for the version".to_string(),
        });
    }
    Ok(())
}
