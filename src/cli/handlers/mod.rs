mod recovery;
pub use recovery::cmd_recovery;

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::store_io::{self, LoadSource, LoadedState};
use crate::model::config::CONFIG_KEYS;
use crate::model::task::{Quadrant, now_stamp};
use crate::ops::countdown::Countdown;
use crate::ops::export::{DEFAULT_EXPORT_NAME, export_csv};
use crate::ops::task_ops;

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data = store_io::resolve_data_path(cli.data.as_deref());

    match cli.command {
        None => Err("no subcommand given (run without one to open the board)".into()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&data, args, json),
            Commands::Countdown => cmd_countdown(&data, json),

            // Write commands
            Commands::Add(args) => cmd_add(&data, args, json),
            Commands::Toggle(args) => cmd_toggle(&data, args, json),
            Commands::Rm(args) => cmd_rm(&data, args, json),
            Commands::Mv(args) => cmd_mv(&data, args, json),
            Commands::Transfer(args) => cmd_transfer(&data, args, json),

            Commands::Export(args) => cmd_export(&data, args, json),
            Commands::Config(args) => cmd_config(&data, args, json),
            Commands::Recovery(args) => cmd_recovery(&data, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

/// Load for reading. An unreadable file is reported and treated as empty.
fn read_board(data: &Path) -> LoadedState {
    let loaded = store_io::load(data);
    warn_if_corrupt(data, &loaded);
    loaded
}

/// Load for a change that will be saved. An unreadable file is copied into
/// the recovery log first, since the save replaces it.
fn open_board(data: &Path) -> LoadedState {
    let loaded = store_io::load_or_recover(data);
    warn_if_corrupt(data, &loaded);
    loaded
}

fn warn_if_corrupt(data: &Path, loaded: &LoadedState) {
    if let LoadSource::Corrupt { reason, .. } = &loaded.source {
        eprintln!(
            "warning: {} is unreadable ({}); using an empty board",
            data.display(),
            reason
        );
    }
}

fn save_board(data: &Path, board: &LoadedState) -> CmdResult {
    store_io::save_or_log(data, &board.store, &board.config)?;
    Ok(())
}

/// 1-based CLI position → index, checked against the quadrant
fn task_index(board: &LoadedState, quadrant: Quadrant, position: usize) -> Result<usize, String> {
    let index = position.saturating_sub(1);
    if index >= board.store.len(quadrant) {
        return Err(format!(
            "no task #{} in {} ({} tasks)",
            position,
            quadrant,
            board.store.len(quadrant)
        ));
    }
    Ok(index)
}

fn print_task(
    board: &LoadedState,
    quadrant: Quadrant,
    index: usize,
    verb: &str,
    json: bool,
) -> CmdResult {
    let Some(task) = board.store.task(quadrant, index) else {
        return Ok(());
    };
    if json {
        let out = task_to_json(quadrant, index, task);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {} #{}: {}", verb, quadrant, index + 1, task.content);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data: &Path, args: ListArgs, json: bool) -> CmdResult {
    let board = read_board(data);
    let quadrants: Vec<Quadrant> = match args.quadrant {
        Some(q) => vec![q],
        None => Quadrant::ALL.to_vec(),
    };
    let keep = |done: bool| (!args.done || done) && (!args.open || !done);

    if json {
        let results: Vec<QuadrantJson> = quadrants
            .iter()
            .map(|&q| QuadrantJson {
                quadrant: q,
                alias: q.alias(),
                tasks: board
                    .store
                    .tasks(q)
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| keep(t.is_done()))
                    .map(|(i, t)| task_to_json(q, i, t))
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let mut first = true;
    for q in quadrants {
        if !first {
            println!();
        }
        first = false;
        let tasks = board.store.tasks(q);
        println!("{}", format_quadrant_heading(q, tasks.len()));
        for (i, task) in tasks.iter().enumerate() {
            if keep(task.is_done()) {
                println!("{}", format_task_line(i, task));
            }
        }
    }
    Ok(())
}

fn cmd_countdown(data: &Path, json: bool) -> CmdResult {
    let board = read_board(data);
    let countdown = Countdown::between(Local::now().date_naive(), board.config.target_date);
    if json {
        let out = countdown_to_json(&board.config, countdown);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{}: {} ({})",
            board.config.event_name,
            countdown.label(),
            board.config.target_date.format("%Y-%m-%d")
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data: &Path, args: AddArgs, json: bool) -> CmdResult {
    let mut board = open_board(data);
    task_ops::add_task(&mut board.store, args.quadrant, &args.content, now_stamp())?;
    save_board(data, &board)?;
    let index = board.store.len(args.quadrant) - 1;
    print_task(&board, args.quadrant, index, "added", json)
}

fn cmd_toggle(data: &Path, args: TaskRef, json: bool) -> CmdResult {
    let mut board = open_board(data);
    let index = task_index(&board, args.quadrant, args.position)?;
    let done = task_ops::toggle_task(&mut board.store, args.quadrant, index, now_stamp())?;
    save_board(data, &board)?;
    let verb = if done { "done" } else { "reopened" };
    print_task(&board, args.quadrant, index, verb, json)
}

fn cmd_rm(data: &Path, args: TaskRef, json: bool) -> CmdResult {
    let mut board = open_board(data);
    let index = task_index(&board, args.quadrant, args.position)?;
    let task = task_ops::delete_task(&mut board.store, args.quadrant, index)?;
    save_board(data, &board)?;
    if json {
        let out = task_to_json(args.quadrant, index, &task);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("deleted {} #{}: {}", args.quadrant, args.position, task.content);
    }
    Ok(())
}

fn cmd_mv(data: &Path, args: MvArgs, json: bool) -> CmdResult {
    let mut board = open_board(data);
    let quadrant = args.task.quadrant;
    let index = task_index(&board, quadrant, args.task.position)?;
    let offset = args.direction.offset();
    let new_index = task_ops::move_within_quadrant(&mut board.store, quadrant, index, offset)?;
    save_board(data, &board)?;
    print_task(&board, quadrant, new_index, "moved to", json)
}

fn cmd_transfer(data: &Path, args: TransferArgs, json: bool) -> CmdResult {
    let mut board = open_board(data);
    let source = args.task.quadrant;
    let index = task_index(&board, source, args.task.position)?;
    let dest_index = args
        .at
        .map_or(board.store.len(args.to), |at| at.saturating_sub(1));
    let placed = task_ops::transfer(&mut board.store, source, index, args.to, dest_index)?;
    save_board(data, &board)?;
    print_task(&board, args.to, placed, "moved to", json)
}

fn cmd_export(data: &Path, args: ExportArgs, json: bool) -> CmdResult {
    let board = read_board(data);
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
    let rows = export_csv(&board.store, &path)
        .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
    if json {
        let out = ExportJson {
            path: path.display().to_string(),
            rows,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("exported {} finished tasks to {}", rows, path.display());
    }
    Ok(())
}

fn cmd_config(data: &Path, args: ConfigCmd, json: bool) -> CmdResult {
    match args.action {
        None => {
            let board = read_board(data);
            if json {
                let map: serde_json::Map<String, serde_json::Value> = CONFIG_KEYS
                    .iter()
                    .filter_map(|k| board.config.get(k).map(|v| (k.to_string(), v.into())))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for key in CONFIG_KEYS {
                    if let Some(value) = board.config.get(key) {
                        println!("{} = {}", key, value);
                    }
                }
            }
        }
        Some(ConfigAction::Get { key }) => {
            let board = read_board(data);
            let value = board
                .config
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {}", key))?;
            if json {
                println!("{}", serde_json::to_string(&value)?);
            } else {
                println!("{}", value);
            }
        }
        Some(ConfigAction::Set { key, value }) => {
            let mut board = open_board(data);
            board.config.set(&key, &value)?;
            save_board(data, &board)?;
            let value = board.config.get(&key).unwrap_or(value);
            if json {
                println!("{}", serde_json::to_string(&value)?);
            } else {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}
