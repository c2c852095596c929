mod backup;
mod calc;
mod config;
mod db;
mod error;
mod ipc;
mod model;
mod reports;
mod routing;
mod seed;
mod session;
mod storage;

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};

fn main() {
    let cfg = config::Config::parse();
    config::init_logging(&cfg.log_filter);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lisand starting");

    let mut state = ipc::AppState::new(
        storage::Storage::in_memory(),
        &cfg.fragment,
        session::today(),
    );
    if let Some(workspace) = cfg.workspace.as_deref() {
        if let Err(e) = ipc::open_workspace(&mut state, workspace) {
            // Keep serving from memory; the front end can select another workspace.
            tracing::error!(error = %e, workspace = %workspace.to_string_lossy(), "failed to open workspace");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "bad request json");
                let _ = writeln!(
                    stdout,
                    "{}",
                    json!({ "ok": false, "error": { "code": "bad_json", "message": e.to_string() } })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
}
