mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Global override for workspace directory (set by -C flag)
static WORKSPACE_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::WorkspaceLock;
use crate::io::store::{JsonStore, MemoryStore, TaskStore};
use crate::io::workspace::{self, Workspace, WorkspaceError};
use crate::model::config::WorkspaceConfig;
use crate::model::task::{NewTask, Task};
use crate::ops::recurrence::RecurrenceEngine;
use crate::ops::task_ops;
use crate::parse::date_expr;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for load_workspace_cwd()
    if let Some(ref dir) = cli.workspace_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        WORKSPACE_DIR_OVERRIDE.lock().unwrap().replace(abs);
    }

    match cli.command {
        // Bare `ch` lists pending tasks
        None => cmd_list(ListArgs::default(), json),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before workspace discovery
            Commands::Init(args) => cmd_init(args),

            // Read commands
            Commands::List(args) => cmd_list(args, json),
            Commands::Show(args) => cmd_show(args, json),
            Commands::Date(args) => cmd_date(args, json),

            // Write commands
            Commands::Add(args) => cmd_add(args),
            Commands::Done(args) => cmd_done(args),
            Commands::Reopen(args) => cmd_reopen(args),
            Commands::Due(args) => cmd_due(args),
            Commands::Remind(args) => cmd_remind(args),
            Commands::Every(args) => cmd_every(args),
            Commands::Scan(args) => cmd_scan(args, json),
            Commands::Delete(args) => cmd_delete(args),

            // Config
            Commands::Config(args) => cmd_config(args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_workspace_cwd() -> Result<Workspace, WorkspaceError> {
    let start = match WORKSPACE_DIR_OVERRIDE.lock().unwrap().as_ref() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(WorkspaceError::IoError)?,
    };
    let root = workspace::discover(&start)?;
    workspace::load(&root)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve a date phrase or fail with a user-facing message.
fn resolve_date(expr: &str) -> Result<NaiveDateTime, String> {
    let parsed = date_expr::parse(expr);
    match parsed.date {
        Some(date) if parsed.is_valid => Ok(date),
        _ => Err(format!("cannot understand date '{}'", expr)),
    }
}

/// Run the recurrence scan and print what it created.
fn run_scan(store: &mut JsonStore, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let result = RecurrenceEngine::new(store).process_all(now())?;
    if !result.is_empty() && !quiet {
        for line in format_scan_result(&result, false) {
            println!("{}", line);
        }
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let scan_first = ws.config.scan.on_list && !args.no_scan;

    let store = if scan_first {
        let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
        let mut store = ws.open_store()?;
        run_scan(&mut store, json)?;
        store
    } else {
        ws.open_store()?
    };

    let today = today();
    let locale = ws.config.dates.locale;
    let tasks = store.all_tasks()?;
    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            if args.completed {
                t.is_completed
            } else if args.all {
                true
            } else {
                !t.is_completed
            }
        })
        .filter(|t| match args.tag.as_deref() {
            Some(tag) => t.tags.iter().any(|x| x == tag),
            None => true,
        })
        .filter(|t| match args.list.as_deref() {
            Some(list) => t.list.as_deref() == Some(list),
            None => true,
        })
        .collect();

    if json {
        let out = TaskListJson {
            workspace: ws.config.workspace.name.clone(),
            tasks: visible
                .iter()
                .map(|t| task_to_json(t, today, locale))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        if visible.is_empty() {
            println!("(no tasks)");
        }
        for task in &visible {
            println!("{}", format_task_line(task, today, locale));
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let store = ws.open_store()?;
    let task = store.get_task(args.id)?;
    let locale = ws.config.dates.locale;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&task_to_json(&task, today(), locale))?
        );
    } else {
        for line in format_task_detail(&task, today(), locale) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_date(args: DateArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = date_expr::parse(&args.expr);

    if json {
        let out = ParsedDateJson {
            input: args.expr.clone(),
            valid: parsed.is_valid,
            date: parsed.date.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            label: parsed.text.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match parsed.date {
        Some(date) if parsed.is_valid => {
            println!("{}  {}", date.format("%Y-%m-%d %H:%M"), parsed.text);
            Ok(())
        }
        _ => Err(format!("cannot understand date '{}'", args.expr).into()),
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut draft = NewTask::new(args.title);
    draft.notes = args.notes;
    draft.tags = args.tag;
    draft.list = args.list;
    if let Some(ref expr) = args.due {
        draft.due_date = Some(resolve_date(expr)?);
    }
    if let Some(ref expr) = args.remind {
        draft.reminder_date = Some(resolve_date(expr)?);
    }
    match args.every {
        Some(ref rule) => {
            let mut pattern = date_expr::parse_recurrence_rule(rule)
                .ok_or_else(|| format!("cannot understand recurrence rule '{}'", rule))?;
            if let Some(ref expr) = args.end {
                pattern.end_date = Some(resolve_date(expr)?);
            }
            pattern.validate()?;
            draft.recurring = Some(pattern);
        }
        None if args.end.is_some() => {
            return Err("--end requires --every".into());
        }
        None => {}
    }

    let task = store.create_task(draft)?;
    println!("{}", task.id);
    Ok(())
}

fn cmd_done(args: DoneArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut task = store.get_task(args.id)?;
    if !task_ops::complete(&mut task, now()) {
        println!("task {} is already completed", args.id);
        return Ok(());
    }
    store.update_task(&task)?;
    println!("{}", format_task_line(&task, today(), ws.config.dates.locale));
    Ok(())
}

fn cmd_reopen(args: ReopenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut task = store.get_task(args.id)?;
    if !task_ops::reopen(&mut task) {
        println!("task {} is not completed", args.id);
        return Ok(());
    }
    store.update_task(&task)?;
    println!("{}", format_task_line(&task, today(), ws.config.dates.locale));
    Ok(())
}

fn cmd_due(args: DueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut task = store.get_task(args.id)?;
    if args.clear {
        task_ops::set_due(&mut task, None);
    } else if let Some(ref expr) = args.expr {
        task_ops::set_due(&mut task, Some(resolve_date(expr)?));
    } else {
        return Err("expected a date phrase or --clear".into());
    }
    store.update_task(&task)?;
    println!("{}", format_task_line(&task, today(), ws.config.dates.locale));
    Ok(())
}

fn cmd_remind(args: RemindArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut task = store.get_task(args.id)?;
    if args.clear {
        task_ops::set_reminder(&mut task, None);
    } else if let Some(ref expr) = args.expr {
        task_ops::set_reminder(&mut task, Some(resolve_date(expr)?));
    } else {
        return Err("expected a date phrase or --clear".into());
    }
    store.update_task(&task)?;
    println!("{}", format_task_line(&task, today(), ws.config.dates.locale));
    Ok(())
}

fn cmd_every(args: EveryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    let mut task = store.get_task(args.id)?;
    if args.clear {
        if !task_ops::clear_pattern(&mut task) {
            println!("task {} has no recurrence rule", args.id);
            return Ok(());
        }
        store.update_task(&task)?;
        println!("cleared recurrence for {}", args.id);
        return Ok(());
    }

    let rule = args
        .rule
        .as_deref()
        .ok_or("expected a recurrence rule or --clear")?;
    let mut pattern = date_expr::parse_recurrence_rule(rule)
        .ok_or_else(|| format!("cannot understand recurrence rule '{}'", rule))?;
    if let Some(ref expr) = args.end {
        pattern.end_date = Some(resolve_date(expr)?);
    }
    task_ops::set_pattern(&mut task, pattern)?;
    store.update_task(&task)?;

    let described = task
        .recurring
        .as_ref()
        .map(|r| r.describe())
        .unwrap_or_default();
    println!("{} repeats {}", args.id, described);
    Ok(())
}

fn cmd_scan(args: ScanArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = if args.dry_run {
        None
    } else {
        Some(WorkspaceLock::acquire_default(&ws.chores_dir)?)
    };
    let mut store = ws.open_store()?;

    let result = if args.dry_run {
        // Work on a throwaway copy that mirrors the real id sequence
        let mut copy = MemoryStore::seeded(store.all_tasks()?, store.next_id());
        RecurrenceEngine::new(&mut copy).process_all(now())?
    } else {
        RecurrenceEngine::new(&mut store).process_all(now())?
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&scan_to_json(&result, args.dry_run))?
        );
    } else {
        for line in format_scan_result(&result, args.dry_run) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_delete(args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
    let mut store = ws.open_store()?;

    // Validate every id before removing anything
    for id in &args.ids {
        store.get_task(*id)?;
    }
    for id in &args.ids {
        let task = store.delete_task(*id)?;
        println!("deleted {}  {}", task.id, task.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cmd: ConfigCmd) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    match cmd.action {
        ConfigAction::Get(args) => {
            let (_config, doc) = config_io::read_config(&ws.chores_dir)?;
            let value = config_io::get_key(&doc, &args.key)
                .ok_or_else(|| format!("unknown config key '{}'", args.key))?;
            println!("{}", value);
        }
        ConfigAction::Set(args) => {
            let _lock = WorkspaceLock::acquire_default(&ws.chores_dir)?;
            let (_config, mut doc) = config_io::read_config(&ws.chores_dir)?;
            config_io::set_key(&mut doc, &args.key, &args.value)?;
            // The edited document must still parse as a valid config
            toml::from_str::<WorkspaceConfig>(&doc.to_string())
                .map_err(|e| format!("invalid value for '{}': {}", args.key, e))?;
            config_io::write_config(&ws.chores_dir, &doc)?;
        }
    }
    Ok(())
}
