//! CLI interface for punch.
//!
//! One binary plays both roles in the shift-tracking model: mutating
//! subcommands are the primary process — the single writer of the shared
//! record — while `status`, `timeline`, and `companion show` only read it.
//! The read-only commands can run from any number of processes at any
//! cadence; every one derives the same snapshot from the same record.

mod format;

use clap::{Parser, Subcommand};
use jiff::{SignedDuration, Timestamp};

use crate::config::Config;
use crate::earnings;
use crate::model::{JobDescriptor, ShiftStatus};
use crate::store::StateStore;
use crate::sync::{self, CompanionState, SpoolChannel};
use crate::timeline::{TimelinePhase, TimelinePolicy, TimelineScheduler};

/// punch — track your shift.
#[derive(Debug, Parser)]
#[command(name = "punch", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: a day on the clock
  1. punch start --job cafe          (or: punch start --rate 17.50)
  2. punch break start               (--paid for breaks that still accrue pay)
  3. punch break end
  4. punch status                    (from any process, as often as you like)
  5. punch end

Viewers:
  punch timeline --entries 12 --cadence 300
  punch status --json

Companion:
  punch companion pair               (make the companion reachable)
  punch jobs sync
  punch companion show"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a shift. Fails if one is already in progress.
    Start {
        /// Start the shift on a configured job, taking its hourly rate.
        #[arg(long)]
        job: Option<String>,

        /// Hourly rate override for this shift.
        #[arg(long)]
        rate: Option<f64>,

        /// Tax percentage override, 0–100.
        #[arg(long)]
        tax: Option<f64>,

        /// Start instant (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// Start or end a break within the running shift.
    Break {
        #[command(subcommand)]
        command: BreakCommand,
    },

    /// End the shift and print its final summary.
    End {
        /// End instant (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// Show the current snapshot. Read-only.
    Status {
        /// Print the snapshot as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Compute as of this instant (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// Print the snapshot sequence a widget would schedule. Read-only.
    Timeline {
        /// Number of entries to lay out.
        #[arg(long)]
        entries: Option<usize>,

        /// Seconds between entries.
        #[arg(long, value_name = "SECONDS")]
        cadence: Option<i64>,

        /// Activation instant (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// Tracked jobs and companion sync.
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },

    /// The companion device's side of the sync.
    Companion {
        #[command(subcommand)]
        command: CompanionCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum BreakCommand {
    /// Begin a break. Unpaid unless --paid.
    Start {
        /// Paid breaks count toward break time but never reduce worked time.
        #[arg(long)]
        paid: bool,

        /// Break start (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// End the open break.
    End {
        /// Break end (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List configured jobs.
    List,

    /// Push the full job list to the companion.
    Sync,

    /// Push a deletion for one job (after removing it from config).
    Forget {
        /// Job name as it appeared in config.
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CompanionCommand {
    /// Create the companion directory, making it reachable.
    Pair,

    /// Show the companion's replicated view (replays the spool).
    Show,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, store: &StateStore) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start { job, rate, tax, at } => {
            cmd_start(config, store, job.as_deref(), rate, tax, at)
        }
        Command::Break { command } => match command {
            BreakCommand::Start { paid, at } => cmd_break_start(config, store, paid, at),
            BreakCommand::End { at } => cmd_break_end(config, store, at),
        },
        Command::End { at } => cmd_end(config, store, at),
        Command::Status { json, at } => cmd_status(store, json, at),
        Command::Timeline {
            entries,
            cadence,
            at,
        } => cmd_timeline(store, entries, cadence, at),
        Command::Jobs { command } => match command {
            JobsCommand::List => cmd_jobs_list(config),
            JobsCommand::Sync => cmd_jobs_sync(config, store),
            JobsCommand::Forget { name } => cmd_jobs_forget(store, &name),
        },
        Command::Companion { command } => match command {
            CompanionCommand::Pair => cmd_companion_pair(store),
            CompanionCommand::Show => cmd_companion_show(store),
        },
    }
}

fn cmd_start(
    config: &Config,
    store: &StateStore,
    job: Option<&str>,
    rate: Option<f64>,
    tax: Option<f64>,
    at: Option<Timestamp>,
) -> Result<(), String> {
    let job = match job {
        Some(name) => Some(
            config
                .job(name)
                .ok_or_else(|| format!("no job named '{name}' in config"))?,
        ),
        None => None,
    };

    let mut rates = config.rates(job);
    if let Some(rate) = rate {
        if rate < 0.0 {
            return Err("--rate must be at least 0".to_string());
        }
        rates.hourly_rate = rate;
    }
    if let Some(tax) = tax {
        if !(0.0..=100.0).contains(&tax) {
            return Err("--tax must be between 0 and 100".to_string());
        }
        rates.tax_percentage = tax;
    }

    let at = at.unwrap_or_else(Timestamp::now);
    let mut state = store.read();
    state.start(at, rates).map_err(|e| e.to_string())?;
    store
        .write(&state)
        .map_err(|e| format!("failed to write shift record: {e}"))?;
    sync_companion(config, store);

    println!("Shift started at {at}");
    Ok(())
}

fn cmd_break_start(
    config: &Config,
    store: &StateStore,
    paid: bool,
    at: Option<Timestamp>,
) -> Result<(), String> {
    let at = at.unwrap_or_else(Timestamp::now);
    let mut state = store.read();
    state.start_break(at, paid).map_err(|e| e.to_string())?;
    store
        .write(&state)
        .map_err(|e| format!("failed to write shift record: {e}"))?;
    sync_companion(config, store);

    let note = if paid { " (paid)" } else { "" };
    println!("Break started at {at}{note}");
    Ok(())
}

fn cmd_break_end(config: &Config, store: &StateStore, at: Option<Timestamp>) -> Result<(), String> {
    let at = at.unwrap_or_else(Timestamp::now);
    let mut state = store.read();
    let closed = state.end_break(at).map_err(|e| e.to_string())?;
    store
        .write(&state)
        .map_err(|e| format!("failed to write shift record: {e}"))?;
    sync_companion(config, store);

    println!("Break ended after {}", format::duration(closed.duration(at)));
    Ok(())
}

fn cmd_end(config: &Config, store: &StateStore, at: Option<Timestamp>) -> Result<(), String> {
    let at = at.unwrap_or_else(Timestamp::now);
    let mut state = store.read();

    let record = earnings::close_out(&state, at).ok_or("no shift in progress")?;
    state.end().map_err(|e| e.to_string())?;
    store
        .write(&state)
        .map_err(|e| format!("failed to write shift record: {e}"))?;
    sync_companion(config, store);

    println!("Shift ended at {at}");
    println!(
        "Worked {}  (breaks {})",
        format::duration(record.worked),
        format::duration(record.total_break)
    );
    println!(
        "Gross {}, take-home {}",
        format::money(record.gross_pay),
        format::money(record.taxed_pay)
    );
    Ok(())
}

fn cmd_status(store: &StateStore, json: bool, at: Option<Timestamp>) -> Result<(), String> {
    let at = at.unwrap_or_else(Timestamp::now);
    let state = store.read();
    let snapshot = earnings::compute(&state, at);

    if json {
        let out = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("failed to serialize snapshot: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    if state.status() == ShiftStatus::NotStarted {
        println!("No active shift");
        return Ok(());
    }
    if let Some(started_at) = state.started_at() {
        let note = if snapshot.on_break { " — on break" } else { "" };
        println!("On shift since {started_at}{note}");
    }
    println!(
        "Worked {}  (breaks {})",
        format::duration(snapshot.worked),
        format::duration(snapshot.total_break)
    );
    println!(
        "Gross {}, take-home {}",
        format::money(snapshot.gross_pay),
        format::money(snapshot.taxed_pay)
    );
    Ok(())
}

fn cmd_timeline(
    store: &StateStore,
    entries: Option<usize>,
    cadence: Option<i64>,
    at: Option<Timestamp>,
) -> Result<(), String> {
    let now = at.unwrap_or_else(Timestamp::now);

    let mut policy = TimelinePolicy::default();
    if let Some(entries) = entries {
        policy.entries = entries;
    }
    if let Some(secs) = cadence {
        if secs <= 0 {
            return Err("--cadence must be positive".to_string());
        }
        policy.cadence = SignedDuration::from_secs(secs);
    }

    let mut scheduler = TimelineScheduler::new(policy);
    let timeline = scheduler.activate(store, now);
    if scheduler.phase() == TimelinePhase::Expired {
        println!("No active shift");
        return Ok(());
    }

    for entry in timeline {
        println!(
            "{}  {}  {}",
            entry.at,
            format::duration(entry.snapshot.worked),
            format::money(entry.snapshot.taxed_pay)
        );
    }
    Ok(())
}

fn cmd_jobs_list(config: &Config) -> Result<(), String> {
    let jobs = config.job_descriptors();
    if jobs.is_empty() {
        println!("No jobs configured");
        return Ok(());
    }
    for job in &jobs {
        let short_id = &job.id.to_string()[..8];
        println!("{short_id}  {:<16} {}/h", job.name, format::money(job.hourly_rate));
    }
    Ok(())
}

fn cmd_jobs_sync(config: &Config, store: &StateStore) -> Result<(), String> {
    let mut channel = SpoolChannel::new(store.root().join("companion"));
    sync::publish_jobs(&mut channel, &config.job_descriptors())
        .map_err(|e| format!("sync failed: {e}"))?;
    println!("Synced {} job(s)", config.jobs.len());
    Ok(())
}

fn cmd_jobs_forget(store: &StateStore, name: &str) -> Result<(), String> {
    let mut channel = SpoolChannel::new(store.root().join("companion"));
    sync::publish_delete(&mut channel, JobDescriptor::stable_id(name))
        .map_err(|e| format!("delete not delivered: {e}"))?;
    println!("Told companion to forget '{name}'");
    Ok(())
}

fn cmd_companion_pair(store: &StateStore) -> Result<(), String> {
    let channel = SpoolChannel::new(store.root().join("companion"));
    channel.pair().map_err(|e| format!("pairing failed: {e}"))?;
    println!("Companion paired");
    Ok(())
}

fn cmd_companion_show(store: &StateStore) -> Result<(), String> {
    let state = CompanionState::replay(&store.root().join("companion"))
        .map_err(|e| format!("failed to read companion spool: {e}"))?;
    if state.jobs().is_empty() {
        println!("Companion has no jobs");
        return Ok(());
    }
    for job in state.jobs() {
        let title = job.title.as_deref().unwrap_or("-");
        println!("{:<16} {:<12} {}/h", job.name, title, format::money(job.hourly_rate));
    }
    Ok(())
}

/// Best-effort push after a state change.
///
/// Fire-and-forget: failure is logged by the sync layer and the next
/// state-changing event publishes again. It never fails the mutation that
/// triggered it.
fn sync_companion(config: &Config, store: &StateStore) {
    let mut channel = SpoolChannel::new(store.root().join("companion"));
    let _ = sync::publish_jobs(&mut channel, &config.job_descriptors());
}
