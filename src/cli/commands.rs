use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ch", about = concat!("[#] chores v", env!("CARGO_PKG_VERSION"), " - a task list that reschedules itself"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new chores workspace in the current directory
    Init(InitArgs),
    /// List tasks (pending by default; this is also the bare default)
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark a task completed
    Done(DoneArgs),
    /// Put a completed task back on the list
    Reopen(ReopenArgs),
    /// Set or clear a task's due date
    Due(DueArgs),
    /// Set or clear a task's reminder
    Remind(RemindArgs),
    /// Set or clear a task's recurrence rule
    Every(EveryArgs),
    /// Create follow-ups for completed recurring tasks
    Scan(ScanArgs),
    /// Resolve a date phrase and print the result
    Date(DateArgs),
    /// Permanently delete tasks
    Delete(DeleteArgs),
    /// Read or edit config.toml
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Display language for date labels: "en" or "ru"
    #[arg(long)]
    pub locale: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
    /// Show only completed tasks
    #[arg(long)]
    pub completed: bool,
    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Filter by list name
    #[arg(long)]
    pub list: Option<String>,
    /// Skip the recurrence scan that normally runs first
    #[arg(long)]
    pub no_scan: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id
    pub id: u64,
}

#[derive(Args)]
pub struct DateArgs {
    /// Date phrase ("завтра", "in 3 days", "15.03.2024", ...)
    pub expr: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Due date phrase
    #[arg(long)]
    pub due: Option<String>,
    /// Reminder date phrase
    #[arg(long)]
    pub remind: Option<String>,
    /// Recurrence rule ("daily", "2 weeks", ...)
    #[arg(long)]
    pub every: Option<String>,
    /// Recurrence end date phrase (requires --every)
    #[arg(long)]
    pub end: Option<String>,
    /// Note text
    #[arg(long)]
    pub notes: Option<String>,
    /// Tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// List name
    #[arg(long)]
    pub list: Option<String>,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task id
    pub id: u64,
}

#[derive(Args)]
pub struct ReopenArgs {
    /// Task id
    pub id: u64,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task id
    pub id: u64,
    /// Date phrase (omit with --clear)
    pub expr: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Task id
    pub id: u64,
    /// Date phrase (omit with --clear)
    pub expr: Option<String>,
    /// Remove the reminder
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct EveryArgs {
    /// Task id
    pub id: u64,
    /// Recurrence rule (omit with --clear)
    pub rule: Option<String>,
    /// Recurrence end date phrase
    #[arg(long)]
    pub end: Option<String>,
    /// Remove the recurrence rule
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Report what would be created without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ids to delete
    #[arg(required = true)]
    pub ids: Vec<u64>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a config value
    Get(ConfigGetArgs),
    /// Set a config value
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigGetArgs {
    /// Dotted key (e.g. dates.locale)
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key (e.g. dates.locale)
    pub key: String,
    /// New value
    pub value: String,
}
