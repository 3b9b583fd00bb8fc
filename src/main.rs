mod calc;
mod config;
mod db;
mod feedback;
mod gpa;
mod ipc;
mod paste;
mod store;
mod term;

use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cfg = config::DaemonConfig::from_env();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cfg.log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let mut state = ipc::AppState::new(calc::WeightTable::deped());
    if let Some(path) = cfg.workspace.as_ref() {
        // Startup continues without a store; state falls back to defaults.
        if let Err(e) = ipc::select_workspace(&mut state, path) {
            tracing::warn!("could not open workspace {}: {e:?}", path.to_string_lossy());
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; emit an id-less error line.
                tracing::debug!("bad request line: {e}");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
