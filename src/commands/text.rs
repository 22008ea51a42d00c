use std::io::{self, IsTerminal, Read};
use std::time::Instant;

use clap::Args;

use crate::commands::common::{DispatchArgs, GlobalArgs};
use crate::dispatch::Endpoint;
use crate::dispatch::view::render_text;

#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    #[arg(help = "Text to analyze; read from stdin when omitted")]
    pub text: Option<String>,
    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

pub async fn run(args: TextArgs, global: &GlobalArgs) -> Result<(), String> {
    let settings = args.dispatch.resolve(global)?;
    let text = match args.text {
        Some(text) => text,
        None => read_stdin()?,
    };

    let session = settings.session();
    if settings.dry_run {
        let preview = session
            .dispatcher()
            .preview_text(&text)
            .map_err(|err| err.alert())?;
        return settings.print_dry_run(&preview);
    }

    let progress = settings.watch_progress(&session, Endpoint::Sentiment);
    let started = Instant::now();
    let result = session.analyze_text(&text).await;
    if let Some(progress) = progress {
        progress.abort();
    }

    let analysis = result.map_err(|err| err.alert())?;
    let value = serde_json::to_value(&analysis)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    settings.print_result(|styled| render_text(&analysis, styled), &value, started)
}

fn read_stdin() -> Result<String, String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|err| format!("Failed to read text from stdin: {err}"))?;

    if buffer.ends_with('\n') {
        buffer.pop();
        if buffer.ends_with('\r') {
            buffer.pop();
        }
    }
    Ok(buffer)
}
