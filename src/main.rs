use anyhow::Context;
use curvefill::{init_logging, FillRequest, BUILD_DATE, VERSION};
use std::io::Read;
use tracing::debug;

const USAGE: &str = "Usage: curvefill [request.json]\n\nReads a fill request from the file, or from stdin when no file is given,\nand prints the fill response as JSON.";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let arg = std::env::args().nth(1);
    match arg.as_deref() {
        Some("-h" | "--help") => {
            println!("{USAGE}");
            return Ok(());
        }
        Some("-V" | "--version") => {
            println!("curvefill {VERSION} ({BUILD_DATE})");
            return Ok(());
        }
        _ => {}
    }

    let input = read_request(arg.as_deref())?;
    println!("{}", respond(&input)?);
    Ok(())
}

/// Request text from `file`, or from stdin when no file is given.
fn read_request(file: Option<&str>) -> anyhow::Result<String> {
    let text = match file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read request file {file}"))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            text
        }
    };
    debug!(bytes = text.len(), "Read fill request");
    Ok(text)
}

/// Runs a request and encodes the response as pretty JSON.
fn respond(input: &str) -> anyhow::Result<String> {
    let response = FillRequest::from_json(input)?.run()?;
    serde_json::to_string_pretty(&response).context("Failed to encode response")
}
