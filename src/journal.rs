use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use common::{Action, ActionKind};
use execution_engine::ExecutionOutcome;
use serde_json::{json, Value};

pub const ACTIONS_DIR: &str = "ACTIONS";

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn resolve_repo_root() -> Option<PathBuf> {
    let mut cursor = std::env::current_dir().ok()?;
    loop {
        if cursor.join(".git").is_dir() {
            return Some(cursor);
        }
        if !cursor.pop() {
            return None;
        }
    }
}

pub fn resolve_actions_dir(configured: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = configured {
        return dir;
    }
    if let Some(root) = resolve_repo_root() {
        return root.join(ACTIONS_DIR);
    }
    PathBuf::from(ACTIONS_DIR)
}

/// One log row per action: what was decided, why, and whether it was applied.
pub fn action_event(ts: &str, run_id: &str, action: &Action, outcome: &ExecutionOutcome) -> Value {
    let mut event = json!({
        "ts": ts,
        "run_id": run_id,
        "kind": "action",
        "campaign_id": action.campaign_id,
        "campaign_name": action.campaign_name,
        "action": action.kind.as_str(),
        "reason": action.reason,
        "rule": action.trigger.rule.as_str(),
        "value": action.trigger.value,
        "threshold": action.trigger.threshold,
        "status": outcome.label(),
    });

    if let ActionKind::IncreaseBudget {
        current_budget_micros,
        new_budget_micros,
    } = action.kind
    {
        event["current_budget_micros"] = json!(current_budget_micros);
        event["new_budget_micros"] = json!(new_budget_micros);
    }
    if let ExecutionOutcome::Failed(error) = outcome {
        event["error"] = json!(error);
    }
    event
}

/// Append-only JSONL log, one file per UTC day.
pub struct ActionJournal {
    dir: PathBuf,
    day_key: String,
    file: File,
}

impl ActionJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        let day_key = Utc::now().format("%Y-%m-%d").to_string();
        let file = Self::open_day_file(&dir, &day_key)?;
        Ok(Self { dir, day_key, file })
    }

    fn open_day_file(dir: &Path, day_key: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("actions-{}.jsonl", day_key)))
    }

    fn rotate_if_needed(&mut self) -> std::io::Result<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        if today != self.day_key {
            self.file = Self::open_day_file(&self.dir, &today)?;
            self.day_key = today;
        }
        Ok(())
    }

    pub fn write_event(&mut self, event: &Value) -> std::io::Result<()> {
        self.rotate_if_needed()?;
        let line = serde_json::to_string(event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join(format!("actions-{}.jsonl", self.day_key))
    }
}
