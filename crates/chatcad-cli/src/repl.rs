//! Interactive session loop.
//!
//! Each input line is either a session command (prefixed with `:`) or a
//! JSON operation log that is submitted as one conversation turn. The
//! display surface prints model summaries to stdout.

use anyhow::{Context, Result};
use chatcad_engine::ModelSummary;
use chatcad_export::ExportFormat;
use chatcad_session::{DisplaySurface, JsonPlanner, Session, SessionConfig};
use std::io::{BufRead, Write};
use std::path::Path;

/// Prints each presented registry to stdout.
struct ConsoleSurface;

impl DisplaySurface for ConsoleSurface {
    fn present(&mut self, models: &[ModelSummary]) {
        println!("--- {} model(s) ---", models.len());
        for s in models {
            println!("  {} ({}) - {} triangles", s.id, s.kind, s.triangles);
        }
    }

    fn release(&mut self) {
        println!("--- display closed ---");
    }
}

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let mut session = Session::new(JsonPlanner, ConsoleSurface, config);

    println!("chatcad repl - paste a JSON operation log per line, :help for commands");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            if !handle_command(command, &mut session)? {
                break;
            }
            continue;
        }
        match session.submit_turn(line, true) {
            Ok(outcome) => println!(
                "applied {} operation(s){}",
                outcome.operations,
                if outcome.cache_hit { " (cached)" } else { "" }
            ),
            Err(e) => println!("turn rejected: {e}"),
        }
    }
    Ok(())
}

/// Returns false when the loop should exit.
fn handle_command(
    command: &str,
    session: &mut Session<JsonPlanner, ConsoleSurface>,
) -> Result<bool> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") => return Ok(false),
        Some("clear") => {
            session.clear_session();
            println!("session cleared");
        }
        Some("close") => session.close_display(),
        Some("history") => {
            for (i, turn) in session.get_history().iter().enumerate() {
                println!("  {i}: {} operation(s)", turn.log.len());
            }
        }
        Some("export") => match (parts.next(), parts.next()) {
            (Some(id), Some(path)) => {
                let ext = Path::new(path)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("");
                match ExportFormat::from_extension(ext) {
                    Some(format) => match session.export(id, format) {
                        Ok(bytes) => {
                            std::fs::write(path, bytes)?;
                            println!("exported {id} to {path}");
                        }
                        Err(e) => println!("export failed: {e}"),
                    },
                    None => println!("unknown format: {ext}"),
                }
            }
            _ => println!("usage: :export <model-id> <file.stl|obj|ply>"),
        },
        _ => {
            println!(":quit | :clear | :close | :history | :export <id> <file>");
        }
    }
    Ok(true)
}
