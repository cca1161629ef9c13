use anyhow::{Context, Result, bail};
use chlog::{ChangelogFile, ChangelogVersion, ChlogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chlog")]
#[command(version, about = "keep a project's CHANGELOG.md up to date", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// path to the project (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    path: PathBuf,

    /// changelog file, overrides the configured path
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// project version, overrides chlog.toml and Cargo.toml
    #[arg(long, global = true)]
    project_version: Option<String>,

    /// output format (json or human)
    #[arg(short, long, default_value = "human", global = true)]
    format: OutputFormat,

    /// enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Json,
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!(
                "invalid output format: {}, use 'json' or 'human'",
                s
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// create the changelog with an empty unreleased section
    Init,

    /// release the unreleased section
    Patch {
        /// version to release (defaults to the project version)
        #[arg(value_name = "VERSION")]
        target: Option<String>,
    },

    /// print the changelog text of a version
    Get {
        /// version to print (defaults to the project version)
        #[arg(value_name = "VERSION")]
        target: Option<String>,

        /// print the most recent released version
        #[arg(long, conflicts_with_all = ["target", "unreleased", "all"])]
        latest: bool,

        /// print the unreleased section
        #[arg(long, conflicts_with_all = ["target", "all"])]
        unreleased: bool,

        /// print all released versions
        #[arg(long, conflicts_with = "target")]
        all: bool,

        /// omit the version header line
        #[arg(long)]
        no_header: bool,
    },

    /// check whether a version is present (exit code 1 when it is not)
    Has {
        /// version to look up
        #[arg(value_name = "VERSION")]
        target: String,
    },

    /// list released versions
    List {
        /// order by semantic version instead of file order
        #[arg(short, long)]
        sorted: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = open_changelog(&cli)?;

    match &cli.command {
        Commands::Init => handle_init(&file, &cli.format)?,
        Commands::Patch { target } => handle_patch(&file, &cli.format, target.as_deref())?,
        Commands::Get {
            target,
            latest,
            unreleased,
            all,
            no_header,
        } => {
            let selection = if *latest {
                Selection::Latest
            } else if *unreleased {
                Selection::Unreleased
            } else if *all {
                Selection::All
            } else {
                Selection::Version(target.clone())
            };
            handle_get(&file, &cli.format, selection, !*no_header)?;
        }
        Commands::Has { target } => {
            if !handle_has(&file, &cli.format, target)? {
                std::process::exit(1);
            }
        }
        Commands::List { sorted } => handle_list(&file, &cli.format, *sorted)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_changelog(cli: &Cli) -> Result<ChangelogFile> {
    let mut settings = ChlogConfig::load(&cli.path)
        .context("failed to load configuration")?
        .changelog;

    if let Some(version) = &cli.project_version {
        settings.version = Some(version.clone());
    }
    if let Some(file) = &cli.file {
        settings.path = Some(file.clone());
    }

    let config = settings
        .resolve(&cli.path)
        .context("failed to resolve changelog configuration")?;
    tracing::debug!(path = %config.path.display(), version = %config.version, "using changelog");

    Ok(ChangelogFile::new(config)?)
}

fn handle_init(file: &ChangelogFile, format: &OutputFormat) -> Result<()> {
    file.initialize()
        .with_context(|| format!("failed to initialize {}", file.path().display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": file.path(),
                "initialized": true,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!("initialized {}", file.path().display());
        }
    }

    Ok(())
}

fn handle_patch(file: &ChangelogFile, format: &OutputFormat, version: Option<&str>) -> Result<()> {
    let version = version.unwrap_or(file.config().version.as_str());
    let patched = file
        .patch(version)
        .with_context(|| format!("failed to patch {}", file.path().display()))?;

    let Some(released) = patched.latest() else {
        bail!("patched changelog has no released version");
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": file.path(),
                "released": released,
                "kept_unreleased": patched.unreleased.is_some(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!(
                "released {} with {} item(s) in {}",
                released.label,
                released.item_count(),
                file.path().display()
            );
        }
    }

    Ok(())
}

enum Selection {
    Version(Option<String>),
    Latest,
    Unreleased,
    All,
}

fn handle_get(
    file: &ChangelogFile,
    format: &OutputFormat,
    selection: Selection,
    with_header: bool,
) -> Result<()> {
    let sections: Vec<ChangelogVersion> = match selection {
        Selection::Version(version) => {
            let version = version.unwrap_or_else(|| file.config().version.clone());
            vec![file.get(&version)?]
        }
        Selection::Latest => vec![file.get_latest()?],
        Selection::Unreleased => vec![file.get_unreleased()?],
        Selection::All => file.get_all()?,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }
        OutputFormat::Human => {
            let text: Vec<String> = sections
                .iter()
                .map(|s| file.render_section(s, with_header))
                .collect();
            println!("{}", text.join("\n\n"));
        }
    }

    Ok(())
}

fn handle_has(file: &ChangelogFile, format: &OutputFormat, version: &str) -> Result<bool> {
    let found = file.has(version)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "version": version,
                "present": found,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if found {
                println!("{} is present", version);
            } else {
                println!("{} is not present", version);
            }
        }
    }

    Ok(found)
}

fn handle_list(file: &ChangelogFile, format: &OutputFormat, sorted: bool) -> Result<()> {
    let changelog = file.read()?;
    let versions: Vec<&ChangelogVersion> = if sorted {
        changelog.sorted_versions()
    } else {
        changelog.released().iter().collect()
    };

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = versions
                .iter()
                .map(|v| {
                    serde_json::json!({
                        "version": v.label,
                        "items": v.item_count(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if let Some(unreleased) = &changelog.unreleased {
                println!("{:<16} {:>5} item(s)", "unreleased", unreleased.item_count());
            }
            for version in versions {
                println!("{:<16} {:>5} item(s)", version.label, version.item_count());
            }
        }
    }

    Ok(())
}
