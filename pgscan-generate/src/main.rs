//! Scan script generator.
//!
//! This binary reads the catalog of a PostgreSQL database and writes one
//! psql script per batch of tables. Each script searches every column of its
//! tables for the configured substrings and reports matches when an operator
//! runs it.
//!
//! # Security Guarantees
//! - Catalog reads only, on a read-only session
//! - No credentials stored or logged
//! - Table and column names reach the scripts only as quoted literals

use clap::{Args, Parser};
use pgscan_core::{
    BatchEmitter, ConnectionConfig, PgCatalog, Result, ScanConfig, ScriptTemplate,
    emitter::EmittedBatch,
    error::ScanError,
    logging::init_logging,
    partition::batch_count,
    security::Credentials,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pgscan-generate")]
#[command(about = "Generate batched psql scripts that search every table for given substrings")]
#[command(version)]
#[command(long_about = "
pgscan - PostgreSQL table scan script generator

Connects to a database, lists every user table and writes one psql script per
batch of tables. Each script probes every column of its tables for the search
terms, records matches in a temporary table and prints a report.

The generator itself only reads the catalog. Run the scripts with psql when
convenient, one batch at a time.

EXAMPLES:
  pgscan-generate --database shop --user auditor
  pgscan-generate -d shop -t invoice -t receipt --batch-size 50
  pgscan-generate -d shop --config scan.json --template custom_batch.sql
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Directory for generated scripts
    #[arg(short, long, help = "Directory for generated scripts [default: ./batches]")]
    pub output_dir: Option<PathBuf>,

    /// Tables per script
    #[arg(short, long, help = "Number of tables per script [default: 100]")]
    pub batch_size: Option<usize>,

    /// Search terms (repeatable)
    #[arg(
        short = 't',
        long = "search-term",
        help = "Substring to search for; repeat for several terms [default: 訂單, 出貨單]"
    )]
    pub search_terms: Vec<String>,

    /// External script template
    #[arg(long, help = "Script template file; the built-in template is used if it does not exist")]
    pub template: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, help = "JSON file with scan settings; command-line flags take precedence")]
    pub config: Option<PathBuf>,

    /// Script file extension
    #[arg(long, help = "File extension of generated scripts [default: sql]")]
    pub extension: Option<String>,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Database host
    #[arg(long, env = "PGHOST", default_value = "localhost", help = "Database server host")]
    pub host: String,

    /// Database port
    #[arg(short, long, env = "PGPORT", default_value_t = 5432, help = "Database server port")]
    pub port: u16,

    /// Database name
    #[arg(short, long, env = "PGDATABASE", help = "Database to scan")]
    pub database: Option<String>,

    /// Database user
    #[arg(short = 'U', long, env = "PGUSER", default_value = "postgres", help = "Database user")]
    pub user: String,

    /// Database password
    #[arg(
        long,
        env = "PGPASSWORD",
        hide_env_values = true,
        help = "Database password (prompted for when absent)"
    )]
    pub password: Option<String>,

    /// Never prompt for a password
    #[arg(short = 'w', long, help = "Never prompt for a password")]
    pub no_password: bool,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet)?;

    generate(&cli).await.map_err(|e| {
        error!("Script generation failed: {}", e);
        e
    })
}

/// Resolves scan settings: defaults, then the config file, then CLI flags.
fn scan_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };

    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if !cli.search_terms.is_empty() {
        config.search_terms = cli.search_terms.clone();
    }
    if let Some(template) = &cli.template {
        config.template_path = Some(template.clone());
    }
    if let Some(extension) = &cli.extension {
        config.file_extension = extension.trim_start_matches('.').to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Builds the catalog connection settings.
fn connection_config(args: &ConnectionArgs) -> ConnectionConfig {
    let mut config = ConnectionConfig::new(args.host.clone()).with_port(args.port);
    if let Some(database) = &args.database {
        config = config.with_database(database.clone());
    }
    config
}

/// Collects credentials, prompting for the password when none was given.
fn credentials(args: &ConnectionArgs) -> Result<Credentials> {
    let password = match &args.password {
        Some(password) => Some(password.clone()),
        None if args.no_password => None,
        None => {
            let password = rpassword::prompt_password(format!("Password for user {}: ", args.user))
                .map_err(|e| ScanError::io("Failed to read password", e))?;
            Some(password).filter(|p| !p.is_empty())
        }
    };

    Ok(Credentials::new(args.user.clone(), password))
}

/// Connects, plans and writes every batch script.
async fn generate(cli: &Cli) -> Result<()> {
    let config = scan_config(cli)?;
    let template = ScriptTemplate::load(config.template_path.as_deref())?;
    info!("Using {}", template.source());

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| {
            ScanError::io(
                format!("Failed to create {}", config.output_dir.display()),
                e,
            )
        })?;

    let connection = connection_config(&cli.connection);
    let credentials = credentials(&cli.connection)?;

    info!("Connecting to {}", connection);
    let catalog = PgCatalog::connect(&connection, &credentials).await?;
    catalog.test_connection().await?;
    if !cli.global.quiet {
        println!("✓ Connected to {}", connection);
    }

    let emitter = BatchEmitter::with_template(&catalog, config, template);
    let plan = emitter.plan().await?;
    let config = emitter.config();

    if !cli.global.quiet {
        for line in configuration_banner(plan.tables.len(), config) {
            println!("{}", line);
        }
    }

    let total = plan.batches.len();
    let report = emitter
        .emit_all(&plan, |position, batch| {
            if !cli.global.quiet {
                println!("{}", progress_line(position, total, batch));
            }
        })
        .await?;

    catalog.close().await;

    let skipped: usize = report
        .batches
        .iter()
        .map(|b| b.skipped_tables.len())
        .sum();
    info!(
        "✓ Generated {} scripts for {} tables ({} skipped)",
        report.batches.len(),
        report.total_tables,
        skipped
    );

    if !cli.global.quiet {
        let output_dir = absolute_dir(&config.output_dir);
        for line in completion_summary(&report.batches, &output_dir, &cli.connection, config) {
            println!("{}", line);
        }
    }

    Ok(())
}

/// Lines printed once the table list is known.
fn configuration_banner(total_tables: usize, config: &ScanConfig) -> Vec<String> {
    vec![
        String::new(),
        "Configuration:".to_string(),
        format!("  Tables:       {}", total_tables),
        format!("  Batch size:   {}", config.batch_size),
        format!(
            "  Batches:      {}",
            batch_count(total_tables, config.batch_size)
        ),
        format!("  Search terms: {}", config.search_terms.join(", ")),
        format!("  Output:       {}", config.output_dir.display()),
        String::new(),
    ]
}

/// One progress line per written batch.
fn progress_line(position: usize, total: usize, batch: &EmittedBatch) -> String {
    let mut line = format!(
        "Generating batch {}/{} (tables {} - {})... ✓ {}",
        position, total, batch.start_seq, batch.end_seq, batch.file_name
    );
    if !batch.skipped_tables.is_empty() {
        line.push_str(&format!(
            " ({} tables skipped)",
            batch.skipped_tables.len()
        ));
    }
    line
}

/// Final summary with psql invocation hints.
fn completion_summary(
    emitted: &[EmittedBatch],
    output_dir: &Path,
    connection: &ConnectionArgs,
    config: &ScanConfig,
) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Generated {} scripts in {}", emitted.len(), output_dir.display()),
    ];

    let Some(first) = emitted.first() else {
        lines.push("No user tables found; nothing to scan.".to_string());
        return lines;
    };

    let psql = psql_command(connection);
    lines.extend([
        String::new(),
        "Run a single batch:".to_string(),
        format!(
            "  {} -f \"{}\"",
            psql,
            output_dir.join(&first.file_name).display()
        ),
        String::new(),
        "Run every batch in order:".to_string(),
        format!(
            "  for f in \"{}\"/batch_*.{}; do {} -f \"$f\"; done",
            output_dir.display(),
            config.file_extension,
            psql
        ),
    ]);
    lines
}

/// `psql` invocation matching the generator's connection flags.
fn psql_command(connection: &ConnectionArgs) -> String {
    let mut command = format!(
        "psql -h {} -p {} -U {}",
        connection.host, connection.port, connection.user
    );
    if let Some(database) = &connection.database {
        command.push_str(&format!(" -d {}", database));
    }
    command
}

/// Absolute form of `dir` for display, falling back to the path as given.
fn absolute_dir(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PG_ENV: [&str; 5] = ["PGHOST", "PGPORT", "PGDATABASE", "PGUSER", "PGPASSWORD"];

    fn parse(args: &[&str]) -> Cli {
        temp_env::with_vars_unset(PG_ENV, || {
            Cli::try_parse_from(std::iter::once("pgscan-generate").chain(args.iter().copied()))
                .unwrap()
        })
    }

    fn emitted(batch_id: u32, start_seq: u32, end_seq: u32, skipped: usize) -> EmittedBatch {
        let file_name = format!("batch_{:03}_{:04}_{:04}.sql", batch_id, start_seq, end_seq);
        EmittedBatch {
            batch_id,
            start_seq,
            end_seq,
            path: PathBuf::from("/tmp/batches").join(&file_name),
            file_name,
            tables_scanned: 0,
            probe_count: 0,
            skipped_tables: (0..skipped)
                .map(|n| pgscan_core::TableRef::new(start_seq, "public", format!("t{}", n)))
                .collect(),
        }
    }

    #[test]
    fn test_connection_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.connection.host, "localhost");
        assert_eq!(cli.connection.port, 5432);
        assert_eq!(cli.connection.user, "postgres");
        assert!(cli.connection.database.is_none());
        assert!(cli.connection.password.is_none());
        assert_eq!(cli.global.verbose, 0);
    }

    #[test]
    fn test_password_from_environment() {
        let cli = temp_env::with_var("PGPASSWORD", Some("from-env"), || {
            Cli::try_parse_from(["pgscan-generate", "-d", "shop"]).unwrap()
        });
        assert_eq!(cli.connection.password.as_deref(), Some("from-env"));

        let creds = credentials(&cli.connection).unwrap();
        assert!(creds.has_password());
        assert!(!format!("{:?}", creds).contains("from-env"));
    }

    #[test]
    fn test_no_password_skips_prompt() {
        let cli = parse(&["-w", "-U", "auditor"]);
        let creds = credentials(&cli.connection).unwrap();
        assert_eq!(creds.username(), "auditor");
        assert!(!creds.has_password());
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = scan_config(&parse(&[])).unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = parse(&[
            "--batch-size",
            "25",
            "-t",
            "invoice",
            "--search-term",
            "50%",
            "--output-dir",
            "/tmp/scan",
            "--extension",
            ".psql",
        ]);
        let config = scan_config(&cli).unwrap();

        assert_eq!(config.batch_size, 25);
        assert_eq!(config.search_terms, vec!["invoice", "50%"]);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/scan"));
        assert_eq!(config.file_extension, "psql");
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"batch_size": 10, "search_terms": ["from-file"], "file_extension": "txt"}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = scan_config(&parse(&["--config", &path])).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.search_terms, vec!["from-file"]);

        let config = scan_config(&parse(&["--config", &path, "--batch-size", "5"])).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.search_terms, vec!["from-file"]);
        assert_eq!(config.file_extension, "txt");
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(scan_config(&parse(&["--batch-size", "0"])).is_err());
        assert!(scan_config(&parse(&["-t", "a", "-t", "a"])).is_err());
        assert!(scan_config(&parse(&["--config", "/nonexistent/pgscan.json"])).is_err());
    }

    #[test]
    fn test_connection_config_from_args() {
        let cli = parse(&["--host", "db.internal", "-p", "6432", "-d", "shop"]);
        let config = connection_config(&cli.connection);
        assert_eq!(config.to_string(), "ConnectionConfig(db.internal:6432/shop)");
        assert!(config.read_only);
    }

    #[test]
    fn test_configuration_banner() {
        let config = ScanConfig::new().with_batch_size(100);
        let banner = configuration_banner(250, &config).join("\n");
        assert!(banner.contains("Tables:       250"));
        assert!(banner.contains("Batches:      3"));
        assert!(banner.contains("Search terms: 訂單, 出貨單"));
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(1, 3, &emitted(1, 1, 100, 0)),
            "Generating batch 1/3 (tables 1 - 100)... ✓ batch_001_0001_0100.sql"
        );
        assert!(progress_line(3, 3, &emitted(3, 201, 250, 2)).ends_with("(2 tables skipped)"));
    }

    #[test]
    fn test_completion_summary_hints() {
        let cli = parse(&["-U", "auditor", "-d", "shop"]);
        let config = ScanConfig::default();
        let batches = vec![emitted(1, 1, 100, 0), emitted(2, 101, 150, 0)];

        let summary = completion_summary(&batches, Path::new("/tmp/batches"), &cli.connection, &config)
            .join("\n");
        assert!(summary.contains("Generated 2 scripts in /tmp/batches"));
        assert!(summary.contains(
            "psql -h localhost -p 5432 -U auditor -d shop -f \"/tmp/batches/batch_001_0001_0100.sql\""
        ));
        assert!(summary.contains(
            "for f in \"/tmp/batches\"/batch_*.sql; do psql -h localhost -p 5432 -U auditor -d shop -f \"$f\"; done"
        ));
    }

    #[test]
    fn test_completion_summary_without_tables() {
        let cli = parse(&[]);
        let summary =
            completion_summary(&[], Path::new("/tmp/batches"), &cli.connection, &ScanConfig::default());
        assert!(summary.iter().any(|l| l.contains("No user tables found")));
        assert!(!summary.iter().any(|l| l.contains("psql")));
    }
}
