//! pkgquery CLI
//!
//! Looks up which installed system package owns a path, using the native
//! package managers (dpkg, rpm, pacman) of the running system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use pkgquery_core::PackageQueryService;
use pkgquery_exec::LocalExecutor;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pkgquery", version)]
#[command(about = "Find the system package owning a file", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List detected package managers
    Managers,
    /// Show the package owning each path
    Owner {
        /// Paths to look up
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List installed packages
    Installed,
    /// List the files of a package
    Files {
        /// Package name
        package: String,
    },
}

#[derive(Serialize)]
struct ManagerOutput {
    name: &'static str,
    role: String,
}

#[derive(Serialize)]
struct OwnerOutput {
    path: PathBuf,
    package: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (config, source) = Config::load_default(cli.config.as_deref())?;

    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &source {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }

    let service = PackageQueryService::detect(&config.query, Arc::new(LocalExecutor::new())).await?;

    match cli.command {
        Commands::Managers => {
            let managers: Vec<ManagerOutput> = service
                .registry()
                .entries()
                .iter()
                .map(|entry| ManagerOutput {
                    name: entry.adapter.name(),
                    role: entry.role.to_string(),
                })
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&managers)?);
            } else if managers.is_empty() {
                println!("no supported package manager found");
            } else {
                for manager in managers {
                    println!("{}\t{}", manager.name, manager.role);
                }
            }
        }
        Commands::Owner { paths } => {
            let cwd = std::env::current_dir()?;
            let queries: Vec<_> = paths
                .iter()
                .map(|path| service.spawn_owning_package(absolute(&cwd, path)))
                .collect();

            let mut owners = Vec::with_capacity(queries.len());
            for query in queries {
                let path = query.path().to_path_buf();
                let package = query.wait().await;
                owners.push(OwnerOutput { path, package });
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&owners)?);
            } else {
                for owner in owners {
                    println!(
                        "{}\t{}",
                        owner.path.display(),
                        owner.package.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Installed => {
            let packages = service.installed_packages().await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&packages)?);
            } else {
                for package in packages {
                    println!("{package}");
                }
            }
        }
        Commands::Files { package } => {
            let files = service.file_list(&package).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                for file in files {
                    println!("{}", file.display());
                }
            }
        }
    }

    Ok(())
}

/// Resolve `path` against `cwd` unless it is already absolute
fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_owner_paths() {
        let cli = Cli::parse_from(["pkgquery", "--json", "owner", "/bin/bash", "lib.so"]);

        assert!(cli.json);
        match cli.command {
            Commands::Owner { paths } => assert_eq!(paths.len(), 2),
            _ => panic!("expected owner command"),
        }
    }

    #[test]
    fn test_absolute() {
        let cwd = Path::new("/home/user");

        assert_eq!(absolute(cwd, Path::new("/bin/bash")), PathBuf::from("/bin/bash"));
        assert_eq!(
            absolute(cwd, Path::new("bin/tool")),
            PathBuf::from("/home/user/bin/tool")
        );
    }
}
