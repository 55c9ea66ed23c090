use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fglatch_api::LatchClient;
use fglatch_registry::{Record, RecordValue, query_records_by_name};
use fglatch_types::{ExecutionStatus, LatchUserApiToken, LatchWorkspaceId, RecordId};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Helpers for the Latch platform: executions, Registry lookups and provenance.
#[derive(Parser)]
#[command(name = "fglatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Latch API token (default: LATCH_API_TOKEN or ~/.latch/token)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Latch workspace ID (default: ~/.latch/workspace)
    #[arg(long, global = true)]
    workspace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List executions in the workspace
    Executions {
        /// Only show executions with this status
        #[arg(long)]
        status: Option<ExecutionStatus>,

        /// Only show executions that have not reached a terminal state
        #[arg(long)]
        active: bool,

        /// Print executions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up Registry records by name across all tables
    Records {
        /// Record names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the values of a Registry record
    Record {
        /// Record ID
        id: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the version of the workflow this process runs under
    WorkflowVersion,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::WorkflowVersion => {
            println!("{}", fglatch_util::workflow_version()?);
            Ok(())
        }
        Commands::Executions { status, active, json } => {
            let client = build_client(cli.token, cli.workspace)?;
            list_executions(&client, status, active, json).await
        }
        Commands::Records { names } => {
            let client = build_client(cli.token, cli.workspace)?;
            let records = query_records_by_name(&client, names).await?;
            for (name, record) in &records {
                println!("{name}\t{}", record.id);
            }
            Ok(())
        }
        Commands::Record { id, json } => {
            let client = build_client(cli.token, cli.workspace)?;
            let record = Record::fetch(&client, &RecordId::new(id)).await?;
            print_record(&record, json)
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_client(token: Option<String>, workspace: Option<String>) -> Result<LatchClient> {
    LatchClient::new(
        token.map(LatchUserApiToken::new),
        workspace.map(LatchWorkspaceId::new),
    )
    .context("create Latch client")
}

async fn list_executions(
    client: &LatchClient,
    status: Option<ExecutionStatus>,
    active: bool,
    json: bool,
) -> Result<()> {
    let executions = client.list_executions().await?;
    debug!(count = executions.len(), ?status, active, "filtering executions");
    if json {
        println!("{}", serde_json::to_string_pretty(&executions)?);
        return Ok(());
    }

    let selected = executions
        .values()
        .filter(|execution| status.is_none_or(|status| execution.status == status))
        .filter(|execution| !active || !execution.status.is_terminal());
    for execution in selected {
        let started = execution.start_time.as_ref().map(|time| time.as_str()).unwrap_or("-");
        println!(
            "{}\t{}\t{}\t{}:{}\t{}",
            execution.id,
            execution.status,
            execution.display_name,
            execution.workflow_name,
            execution.workflow_version,
            started
        );
    }
    Ok(())
}

fn print_record(record: &Record, as_json: bool) -> Result<()> {
    if as_json {
        let mut values = Map::new();
        for (key, value) in &record.values {
            let rendered = match value {
                RecordValue::Value(value) => value.clone(),
                RecordValue::Link(linked) => json!({ "id": linked.id, "name": linked.name }),
                RecordValue::Invalid(raw) => json!({ "invalid": raw }),
            };
            values.insert(key.clone(), rendered);
        }
        let out = json!({
            "id": record.id,
            "name": record.name,
            "table_id": record.table_id,
            "values": Value::Object(values),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} (id={}, table={})", record.name, record.id, record.table_id);
    for (key, value) in &record.values {
        match value {
            RecordValue::Value(value) => println!("  {key}: {value}"),
            RecordValue::Link(linked) => println!("  {key}: {} (id={})", linked.name, linked.id),
            RecordValue::Invalid(raw) => println!("  {key}: <invalid: {raw}>"),
        }
    }
    Ok(())
}
