//! Hybrid script engine CLI.
//!
//! Provides the `hybrid` binary for managing and running installed scripts
//! from a shell. It drives the same [`hybrid_engine::Engine`] as the HTTP
//! server, configured from the same environment variables; `--db`
//! overrides `HYBRID_DB_PATH`.
//!
//! Results are printed to stdout as pretty JSON. Logs go to stderr.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value;

use hybrid_core::{ScriptDescriptor, ScriptId};
use hybrid_engine::{CatalogError, Engine, EngineConfig, EngineError};

/// Hybrid script engine tools.
#[derive(Debug, Parser)]
#[command(name = "hybrid", about = "Install, run, and discover hybrid scripts")]
struct Cli {
    /// Path to the script database file (default: $HYBRID_DB_PATH or hybrid.db).
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Install a script from a source file.
    Install {
        id: String,

        /// Script source file.
        #[arg(short, long)]
        file: PathBuf,

        /// Display name (default: the id).
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Function called on run (default: main).
        #[arg(short, long)]
        entry_point: Option<String>,

        /// Package to provision before each run. Repeatable.
        #[arg(short, long = "package")]
        packages: Vec<String>,
    },

    /// Download a script from the catalog and install it.
    InstallCatalog { id: String },

    /// Run an installed script.
    Run {
        id: String,

        /// JSON input passed to the entry point.
        #[arg(short, long, default_value = "{}")]
        input: String,
    },

    /// List installed scripts.
    List,

    /// Remove an installed script.
    Uninstall { id: String },

    /// Search the catalog.
    Search {
        #[arg(default_value = "")]
        query: String,

        #[arg(short, long, default_value = "all")]
        category: String,
    },

    /// Show the most popular catalog entries.
    Popular {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// List packages the runtime has provisioned.
    Packages,
}

/// A failed command: what to print and which exit code to use.
#[derive(Debug)]
struct Failure {
    code: i32,
    message: String,
}

impl Failure {
    fn usage(message: impl Into<String>) -> Self {
        Failure {
            code: 2,
            message: message.into(),
        }
    }

    fn io(message: impl Into<String>) -> Self {
        Failure {
            code: 3,
            message: message.into(),
        }
    }
}

/// Exit codes: 0 = success, 1 = engine or script error, 2 = usage or input
/// error, 3 = storage or I/O error.
impl From<EngineError> for Failure {
    fn from(err: EngineError) -> Self {
        let code = match &err {
            EngineError::InvalidScript(_)
            | EngineError::ScriptNotFound(_)
            | EngineError::Catalog(CatalogError::NotFound(_)) => 2,
            EngineError::Storage(_) => 3,
            _ => 1,
        };
        Failure {
            code,
            message: err.to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }

    match execute(cli.command, &config).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to encode output: {}", e);
                process::exit(1);
            }
        },
        Err(failure) => {
            eprintln!("Error: {}", failure.message);
            process::exit(failure.code);
        }
    }
}

async fn execute(command: Commands, config: &EngineConfig) -> Result<Value, Failure> {
    let engine = Engine::from_config(config).map_err(|e| {
        Failure::io(format!(
            "failed to open database '{}': {}",
            config.db_path, e
        ))
    })?;

    // Commands that touch installed scripts start the runtime. The rest need
    // only the store or the catalog.
    match command {
        Commands::Install {
            id,
            file,
            name,
            description,
            author,
            entry_point,
            packages,
        } => {
            let id = parse_id(&id)?;
            let code = std::fs::read_to_string(&file).map_err(|e| {
                Failure::io(format!("failed to read '{}': {}", file.display(), e))
            })?;
            let descriptor = ScriptDescriptor {
                name,
                description,
                author,
                entry_point,
                packages: Some(packages),
                ..ScriptDescriptor::with_code(code)
            };
            to_json(engine.install_script(&id, descriptor).await?)
        }
        Commands::InstallCatalog { id } => {
            to_json(engine.install_from_catalog(&parse_id(&id)?).await?)
        }
        Commands::Packages => to_json(engine.provisioned_packages().await?),
        Commands::Search { query, category } => {
            to_json(engine.search_catalog(&query, &category).await?)
        }
        Commands::Popular { limit } => to_json(engine.popular_scripts(limit).await?),
        Commands::Run { id, input } => {
            let id = parse_id(&id)?;
            let input = parse_input(&input)?;
            engine.init().await?;
            Ok(engine.run_script(&id, input).await?)
        }
        Commands::List => {
            engine.init().await?;
            to_json(engine.list_scripts().await?)
        }
        Commands::Uninstall { id } => {
            let id = parse_id(&id)?;
            engine.init().await?;
            let success = engine.uninstall_script(&id).await?;
            Ok(serde_json::json!({ "success": success, "id": id }))
        }
    }
}

fn parse_id(raw: &str) -> Result<ScriptId, Failure> {
    ScriptId::new(raw).map_err(|e| Failure::usage(e.to_string()))
}

fn parse_input(raw: &str) -> Result<Value, Failure> {
    serde_json::from_str(raw).map_err(|e| Failure::usage(format!("--input is not valid JSON: {}", e)))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, Failure> {
    serde_json::to_value(value)
        .map_err(|e| Failure::io(format!("failed to encode output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_install_with_repeated_packages() {
        let cli = Cli::try_parse_from([
            "hybrid", "--db", "/tmp/s.db", "install", "csv", "--file", "csv.py", "-p", "pandas",
            "-p", "numpy", "--entry-point", "summarize",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some("/tmp/s.db"));
        match cli.command {
            Commands::Install {
                id,
                packages,
                entry_point,
                ..
            } => {
                assert_eq!(id, "csv");
                assert_eq!(packages, vec!["pandas", "numpy"]);
                assert_eq!(entry_point.as_deref(), Some("summarize"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn run_input_defaults_to_empty_object() {
        let cli = Cli::try_parse_from(["hybrid", "run", "echo"]).unwrap();
        match cli.command {
            Commands::Run { input, .. } => assert_eq!(parse_input(&input).unwrap(), serde_json::json!({})),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn search_defaults() {
        let cli = Cli::try_parse_from(["hybrid", "search"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Search { ref query, ref category } if query.is_empty() && category == "all"
        ));
        let cli = Cli::try_parse_from(["hybrid", "popular"]).unwrap();
        assert!(matches!(cli.command, Commands::Popular { limit: 10 }));
    }

    #[test]
    fn bad_input_json_is_usage_error() {
        assert_eq!(parse_input("{not json").unwrap_err().code, 2);
        assert_eq!(parse_id("").unwrap_err().code, 2);
    }

    #[test]
    fn engine_errors_map_to_exit_codes() {
        assert_eq!(Failure::from(EngineError::NotInitialized).code, 1);
        assert_eq!(Failure::from(EngineError::Script("x".into())).code, 1);
        assert_eq!(Failure::from(EngineError::InvalidScript("x".into())).code, 2);
        assert_eq!(
            Failure::from(EngineError::Catalog(CatalogError::NotFound("x".into()))).code,
            2
        );
        assert_eq!(
            Failure::from(EngineError::Catalog(CatalogError::Unavailable("x".into()))).code,
            1
        );
    }

    fn config_without_interpreter(dir: &tempfile::TempDir) -> EngineConfig {
        EngineConfig {
            db_path: dir.path().join("cli.db").to_string_lossy().into_owned(),
            catalog: hybrid_engine::CatalogMode::Offline,
            runtime: hybrid_engine::RuntimeConfig {
                source_url: "/nonexistent/python".into(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn offline_catalog_commands_skip_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_without_interpreter(&dir);
        let out = execute(Commands::Popular { limit: 2 }, &config).await.unwrap();
        assert_eq!(out.as_array().unwrap().len(), 2);

        let err = execute(Commands::List, &config).await.unwrap_err();
        assert_eq!(err.code, 1);
    }

    #[tokio::test]
    async fn install_commands_skip_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_without_interpreter(&dir);
        let file = dir.path().join("echo.py");
        std::fs::write(&file, "def main(input):\n    return input\n").unwrap();

        let out = execute(
            Commands::Install {
                id: "echo".into(),
                file,
                name: None,
                description: None,
                author: None,
                entry_point: None,
                packages: vec!["requests".into()],
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(out, serde_json::json!({"success": true, "id": "echo"}));

        let out = execute(Commands::InstallCatalog { id: "hello-world".into() }, &config)
            .await
            .unwrap();
        assert_eq!(out["id"], "hello-world");

        let out = execute(Commands::Packages, &config).await.unwrap();
        assert_eq!(out, serde_json::json!([]));

        // The runtime is only needed once a script runs.
        let err = execute(
            Commands::Run {
                id: "echo".into(),
                input: "{}".into(),
            },
            &config,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, 1);
    }

    #[test]
    fn parses_packages() {
        let cli = Cli::try_parse_from(["hybrid", "packages"]).unwrap();
        assert!(matches!(cli.command, Commands::Packages));
    }
}
