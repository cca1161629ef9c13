// pre-defined test scenarios

use super::project_builder::{TestProject, TestProjectBuilder};
use crate::error::Result;

/// pre-defined test scenarios
pub enum TestScenario {
    /// project without a changelog file
    Fresh,
    /// unreleased section with a single added item
    UnreleasedOnly,
    /// unreleased section without items, followed by one release
    EmptyUnreleased,
    /// front matter, unreleased items and three releases
    History,
}

impl TestScenario {
    /// changelog content of the scenario, `None` when no file is created
    pub fn changelog(&self) -> Option<&'static str> {
        match self {
            TestScenario::Fresh => None,
            TestScenario::UnreleasedOnly => Some("## [Unreleased]\n### Added\n- foo\n"),
            TestScenario::EmptyUnreleased => {
                Some("## [Unreleased]\n\n## [0.1.0]\n\n### Added\n- initial release\n")
            }
            TestScenario::History => Some(HISTORY),
        }
    }

    /// build a project from a predefined scenario
    pub fn build(self) -> Result<TestProject> {
        let builder = TestProjectBuilder::new().version("1.0.0");
        match self.changelog() {
            Some(content) => builder.changelog(content).build(),
            None => builder.build(),
        }
    }
}

const HISTORY: &str = "# Changelog

All notable changes to this project will be documented in this file.

## [Unreleased]

### Added
- export command

### Fixed
- crash when the input is empty
  (reported twice)

## [0.3.0] - 2024-05-01

### Changed
- faster startup

## [0.2.0] - 2024-03-12

### Added
- config file support

### Security
- update tls dependency

## [0.1.0] - 2024-01-20

### Added
- initial release
";
