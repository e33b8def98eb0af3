use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use curriculum_core::protocol;
use curriculum_core::services::config;

fn respond(line: &str) -> String {
    match std::panic::catch_unwind(|| protocol::handle(line)) {
        Ok(resp) => resp,
        Err(_) => serde_json::json!({
            "status": "error",
            "message": "internal core error"
        })
        .to_string(),
    }
}

/// Writes one response line. Workers and the request loop share stdout,
/// so each line is written under the stdout lock.
fn emit(response: &str) -> bool {
    let mut out = io::stdout().lock();
    if writeln!(out, "{response}").is_err() {
        return false;
    }
    out.flush().is_ok()
}

fn main() {
    eprintln!(
        "[curriculum-core] ready (config dir: {})",
        config::config_dir().display()
    );

    let stdin = io::stdin();
    let mut workers: Vec<JoinHandle<()>> = Vec::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("[curriculum-core] stdin closed: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        // Mutations wait on the server; answer them off the request loop so
        // filtering keeps responding. Replies carry the request id.
        if protocol::runs_in_background(&line) {
            workers.retain(|w| !w.is_finished());
            workers.push(thread::spawn(move || {
                emit(&respond(&line));
            }));
            continue;
        }

        if !emit(&respond(&line)) {
            break;
        }
    }

    for w in workers {
        let _ = w.join();
    }
}
