//! sqlserver-scripts CLI - DDL scripts for SQL Server tables.

mod interactive;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sqlserver_scripts::config::parse_table_list;
use sqlserver_scripts::{
    export_table, export_tables, Config, ConnectionConfig, DdlEngine, ExportEvent, MssqlCatalog,
    ScriptError, ScriptOptions, TableIdentity,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sqlserver-scripts")]
#[command(about = "Generate DDL scripts for SQL Server tables")]
#[command(version)]
struct Cli {
    /// Log format: text or json
    #[arg(long, default_value = "text", value_parser = ["text", "json"], global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every table in a schema, one file per table
    ExportTables {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Comma-separated subset of tables to export
        #[arg(long)]
        tables: Option<String>,
    },

    /// Export a single table
    ExportTable {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Table name
        #[arg(short, long)]
        table: String,
    },

    /// Prompt for connection details and script tables one at a time
    Interactive {
        /// Path to YAML configuration file used for prompt defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQL Server host [default: localhost]
    #[arg(short, long)]
    server: Option<String>,

    /// SQL Server port [default: 1433]
    #[arg(short, long)]
    port: Option<u16>,

    /// Named instance, resolved through SQL Browser
    #[arg(long)]
    instance: Option<String>,

    /// Database name
    #[arg(short, long)]
    database: Option<String>,

    /// Login user
    #[arg(short, long)]
    user: Option<String>,

    /// Login password
    #[arg(short = 'w', long)]
    password: Option<String>,

    /// Schema to read tables from [default: dbo]
    #[arg(long)]
    schema: Option<String>,

    /// Require an encrypted connection
    #[arg(long)]
    encrypt: bool,

    /// Trust the server certificate without validation [default: true]
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    trust_server_cert: Option<bool>,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory to write .sql files to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Do not script indexes
    #[arg(long)]
    exclude_indexes: bool,

    /// Do not script foreign key constraints
    #[arg(long)]
    exclude_foreign_keys: bool,

    /// Print per-table progress and debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl ConnectionArgs {
    /// Load the config file (if any) and apply command-line overrides.
    fn resolve(self) -> Result<ConnectionConfig, ScriptError> {
        let mut conn = load_defaults(self.config.as_deref())?;

        if let Some(server) = self.server {
            conn.host = server;
        }
        if let Some(port) = self.port {
            conn.port = port;
        }
        // An empty --instance clears one set in the config file.
        if let Some(instance) = self.instance {
            conn.instance_name = Some(instance).filter(|i| !i.trim().is_empty());
        }
        if let Some(database) = self.database {
            conn.database = database;
        }
        if let Some(user) = self.user {
            conn.user = user;
        }
        if let Some(password) = self.password {
            conn.password = password;
        }
        if let Some(schema) = self.schema {
            conn.schema = schema;
        }
        if self.encrypt {
            conn.encrypt = true;
        }
        if let Some(trust) = self.trust_server_cert {
            conn.trust_server_cert = trust;
        }

        conn.validate()?;
        Ok(conn)
    }
}

impl OutputArgs {
    fn script_options(&self) -> ScriptOptions {
        ScriptOptions::default()
            .with_indexes(!self.exclude_indexes)
            .with_foreign_keys(!self.exclude_foreign_keys)
    }
}

fn load_defaults(path: Option<&Path>) -> Result<ConnectionConfig, ScriptError> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            Ok(config.connection)
        }
        None => Ok(ConnectionConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout with success; usage errors exit 1.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), ScriptError> {
    match cli.command {
        Commands::ExportTables {
            connection,
            output,
            tables,
        } => {
            setup_logging(output.verbose, &cli.log_format);
            let conn = connection.resolve()?;
            let options = output.script_options();
            let selected = tables.as_deref().map(parse_table_list).unwrap_or_default();

            if output.verbose {
                println!("Connecting to SQL Server...");
                println!("  Server: {}", conn.server_display());
                println!("  Database: {}", conn.database);
                println!("  Schema: {}", conn.schema);
            }

            let catalog = MssqlCatalog::connect(&conn).await?;
            if output.verbose {
                println!("Successfully connected to SQL Server");
            }
            let mut engine = DdlEngine::new(catalog);

            let selected = if selected.is_empty() {
                let all = engine.list_tables(&conn.schema).await?;
                println!("Found {} tables in schema '{}'", all.len(), conn.schema);
                all
            } else {
                println!(
                    "Exporting {} selected tables from schema '{}'",
                    selected.len(),
                    conn.schema
                );
                selected
            };

            let verbose = output.verbose;
            let summary = export_tables(
                &mut engine,
                &conn.schema,
                Some(selected.as_slice()),
                &options,
                &output.output_dir,
                |event| match event {
                    ExportEvent::Exported(file) => {
                        if verbose {
                            println!("Exported table: {}", file.table.name);
                            println!("  Saved to: {}", absolute(&file.path).display());
                        } else {
                            print!(".");
                            let _ = std::io::stdout().flush();
                        }
                    }
                    ExportEvent::Failed { table, error } => {
                        eprintln!("\nError exporting table '{}': {}", table, error);
                    }
                },
            )
            .await?;

            if !verbose {
                println!();
            }
            println!();
            println!("Export completed:");
            println!("  Tables exported: {}", summary.exported.len());
            if !summary.failures.is_empty() {
                println!("  Errors: {}", summary.failures.len());
            }
            println!("  Output directory: {}", absolute(&summary.output_dir).display());

            engine.into_inner().close().await?;
        }

        Commands::ExportTable {
            connection,
            output,
            table,
        } => {
            setup_logging(output.verbose, &cli.log_format);
            let conn = connection.resolve()?;
            let options = output.script_options();
            let table = TableIdentity::new(conn.schema.clone(), table)?;

            let catalog = MssqlCatalog::connect(&conn).await?;
            if output.verbose {
                println!("Successfully connected to SQL Server");
            }
            let mut engine = DdlEngine::new(catalog);

            let file = export_table(&mut engine, &table, &options, &output.output_dir).await?;

            println!("Table exported successfully:");
            println!("  Table: {}", file.table.full_name());
            println!("  File: {}", absolute(&file.path).display());
            println!("  Size: {} bytes", file.bytes);

            engine.into_inner().close().await?;
        }

        Commands::Interactive { config, verbose } => {
            // Warnings only unless asked; keeps the prompts readable.
            setup_logging(verbose, &cli.log_format);
            let defaults = load_defaults(config.as_deref())?;
            interactive::run_session(defaults, ScriptOptions::default()).await?;
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn setup_logging(verbose: bool, format: &str) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
