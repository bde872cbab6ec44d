//! Recall CLI
//!
//! Operational command-line interface for caller memory management.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use recall::context::render_memory_context;
use recall::identity::normalize_phone;
use recall::jobs::MemoryCleanupJob;
use recall::storage::queries;
use recall::{
    CallerInfoUpdate, CallerMemory, CallerMemoryService, NewConversation, SqliteMemoryStore,
    Storage,
};

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Caller Memory Infrastructure CLI")]
#[command(version)]
struct Cli {
    /// Database path
    #[arg(long, env = "RECALL_DB_PATH", default_value = "recall.db")]
    db_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an inbound call (get-or-create for a tenant/phone pair)
    Record {
        /// Tenant id
        tenant: String,
        /// Raw caller phone number
        phone: String,
    },
    /// Update caller profile fields
    Info {
        /// Memory ID
        id: i64,
        /// Caller name
        #[arg(long)]
        name: Option<String>,
        /// Caller company
        #[arg(long)]
        company: Option<String>,
        /// Operator notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Append a conversation summary to a caller's history
    Log {
        /// Memory ID
        id: i64,
        /// Conversation summary
        summary: String,
        /// Topics (comma-separated)
        #[arg(short = 'T', long)]
        topics: Option<String>,
        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<i64>,
    },
    /// Print the rendered context block for a caller
    Context {
        /// Tenant id
        tenant: String,
        /// Raw caller phone number
        phone: String,
    },
    /// Run the expiry sweep now
    Cleanup,
    /// Run the recurring cleanup daemon
    Daemon {
        /// Sweep interval in seconds
        #[arg(long, default_value = "86400")]
        interval_seconds: u64,
    },
    /// Show store statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let storage = Storage::open(&cli.db_path)
        .with_context(|| format!("Failed to open database at {}", cli.db_path))?;
    let store = Arc::new(SqliteMemoryStore::new(storage.clone()));
    let service = Arc::new(CallerMemoryService::new(store));

    match cli.command {
        Commands::Record { tenant, phone } => {
            match service.get_or_create(&tenant, &phone) {
                Some(memory) => print_memory(&memory),
                None => println!("No memory (phone could not be normalized or store error)"),
            }
        }
        Commands::Info {
            id,
            name,
            company,
            notes,
        } => {
            let update = CallerInfoUpdate {
                caller_name: name,
                caller_company: company,
                notes,
            };
            match service.update_caller_info(id, update) {
                Some(memory) => print_memory(&memory),
                None => println!("Caller memory {} not found", id),
            }
        }
        Commands::Log {
            id,
            summary,
            topics,
            duration,
        } => {
            let input = NewConversation {
                summary: Some(summary),
                topics: topics
                    .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                duration_seconds: duration,
                request_details: None,
            };
            match service.add_conversation(id, input) {
                Some(memory) => println!(
                    "Logged conversation ({} entries in history)",
                    memory.conversation_history.len()
                ),
                None => println!("Caller memory {} not found", id),
            }
        }
        Commands::Context { tenant, phone } => {
            // Read-only lookup: must not bump call_count
            let memory = match normalize_phone(&phone) {
                Some(key) => storage
                    .with_connection(|conn| queries::find_by_key(conn, &tenant, &key))?,
                None => None,
            };
            print!("{}", render_memory_context(memory.as_ref()));
        }
        Commands::Cleanup => {
            let job = MemoryCleanupJob::new(service.clone());
            let deleted = job.run_now().context("Expiry sweep failed")?;
            println!("Deleted {} expired caller memories", deleted);
        }
        Commands::Daemon { interval_seconds } => {
            let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
            rt.block_on(async {
                let job = Arc::new(MemoryCleanupJob::new(service.clone()));
                let handle = job.spawn(std::time::Duration::from_secs(interval_seconds));
                handle.await
            })?;
        }
        Commands::Stats => {
            let now = chrono::Utc::now();
            let (total, expired) = storage.with_connection(|conn| {
                Ok((
                    queries::count_memories(conn)?,
                    queries::count_expired(conn, now)?,
                ))
            })?;
            println!("Caller memories: {}", total);
            println!("Past expiry:     {}", expired);
        }
    }

    Ok(())
}

fn print_memory(memory: &CallerMemory) {
    println!("ID:         {}", memory.id);
    println!("Tenant:     {}", memory.tenant_id);
    println!("Phone:      {}", memory.caller_phone);
    if let Some(name) = &memory.caller_name {
        println!("Name:       {}", name);
    }
    if let Some(company) = &memory.caller_company {
        println!("Company:    {}", company);
    }
    println!("Calls:      {}", memory.call_count);
    println!("Last call:  {}", memory.last_call_date.to_rfc3339());
    println!("Expires:    {}", memory.expires_at.to_rfc3339());
    println!("History:    {} entries", memory.conversation_history.len());
    if let Some(notes) = &memory.notes {
        println!("Notes:      {}", notes);
    }
}
