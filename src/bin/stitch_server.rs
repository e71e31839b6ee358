use anyhow::Context;
use log::{debug, info};
use std::io::{self, BufRead, Write};
use via_stitcher::server::{handle_line, ServerState};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env().init();

    info!("[Server] Stitch server started, reading requests from stdin");

    let mut state = ServerState::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request line")?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("[Server] Request: {}", line);

        let response = handle_line(&mut state, &line);
        let json = serde_json::to_string(&response).context("Failed to serialize response")?;
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
    }

    info!("[Server] stdin closed, shutting down");
    Ok(())
}
