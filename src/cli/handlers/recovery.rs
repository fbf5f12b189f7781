use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::commands::{RecoveryAction, RecoveryCmd};
use crate::io::recovery::{prune_recovery, read_recovery_entries, recovery_log_path};

use super::CmdResult;

const DEFAULT_LIMIT: usize = 10;

pub fn cmd_recovery(data: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    match args.action {
        None => list_entries(data, args.limit.unwrap_or(DEFAULT_LIMIT), json),
        Some(RecoveryAction::Path) => {
            let path = recovery_log_path(data);
            let path = std::path::absolute(&path).unwrap_or(path);
            println!("{}", path.display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = prune.before.as_deref().map(parse_cutoff).transpose()?;
            let removed = prune_recovery(data, before, prune.all)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("removed {} entries", removed);
            }
            Ok(())
        }
    }
}

fn list_entries(data: &Path, limit: usize, json: bool) -> CmdResult {
    let entries = read_recovery_entries(data, Some(limit));
    if json {
        let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_markdown());
        }
    }
    Ok(())
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC)
fn parse_cutoff(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| format!("invalid timestamp: {} (expected RFC 3339 or YYYY-MM-DD)", s))
}
