use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use crate::config::{self, ProfileConfig};
use crate::dispatch::payload::RequestPreview;
use crate::dispatch::view::{Phase, Session};
use crate::dispatch::{DEFAULT_BASE_URL, Dispatcher, Endpoint};

pub const BASE_URL_ENV: &str = "EMOLENS_BASE_URL";
pub const OUTPUT_ENV: &str = "EMOLENS_OUTPUT";

/// Verbosity flags accepted by every subcommand.
#[derive(Debug, Args, Clone, Copy, Default)]
pub struct GlobalArgs {
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,
    #[arg(short, long, global = true, help = "Suppress logs, progress and timing on stderr")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Flags shared by the `text`, `image` and `video` subcommands.
#[derive(Debug, Args, Clone, Default)]
pub struct DispatchArgs {
    #[arg(long, help = "Analysis service origin [env: EMOLENS_BASE_URL]")]
    pub base_url: Option<String>,
    #[arg(long, help = "Load defaults from a named config profile")]
    pub profile: Option<String>,
    #[arg(long, value_enum, help = "Result format [env: EMOLENS_OUTPUT]")]
    pub output: Option<OutputMode>,
    #[arg(long, help = "Shorthand for --output json")]
    pub json: bool,
    #[arg(long, help = "Validate input and print the request without sending it")]
    pub dry_run: bool,
    #[arg(long, value_name = "PATH", help = "Also write the result to a file")]
    pub save: Option<PathBuf>,
    #[arg(long, help = "Print request latency on stderr")]
    pub show_timing: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub output: OutputMode,
    pub dry_run: bool,
    pub save: Option<PathBuf>,
    pub show_timing: bool,
    pub quiet: bool,
}

impl DispatchArgs {
    /// Merges flags, environment and profile, in that order of precedence.
    pub fn resolve(&self, global: &GlobalArgs) -> Result<Settings, String> {
        let profile = match self.profile.as_deref() {
            Some(name) => config::load_profile(name)?,
            None => ProfileConfig::default(),
        };

        let base_url = self
            .base_url
            .clone()
            .or_else(|| env_value(BASE_URL_ENV))
            .or(profile.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        config::parse_base_url(&base_url)?;

        let output = if self.json {
            OutputMode::Json
        } else if let Some(output) = self.output {
            output
        } else if let Some(raw) = env_value(OUTPUT_ENV) {
            OutputMode::parse(&raw).ok_or_else(|| {
                format!("Invalid {OUTPUT_ENV} '{raw}'. Supported values: text, json.")
            })?
        } else if let Some(raw) = profile.output {
            OutputMode::parse(&raw).ok_or_else(|| {
                format!("Invalid profile output '{raw}'. Supported values: text, json.")
            })?
        } else {
            OutputMode::Text
        };

        Ok(Settings {
            base_url: base_url.trim().to_string(),
            output,
            dry_run: self.dry_run,
            save: self.save.clone(),
            show_timing: self.show_timing || profile.show_timing.unwrap_or(false),
            quiet: global.quiet,
        })
    }
}

impl Settings {
    pub fn session(&self) -> Session {
        Session::new(Dispatcher::new(self.base_url.clone()))
    }

    /// Prints a dry-run request description as one JSON line.
    pub fn print_dry_run(&self, preview: &RequestPreview) -> Result<(), String> {
        let body = json!({
            "dry_run": true,
            "output": self.output,
            "request": preview,
        });
        self.emit(&compact(&body)?)?;
        if self.show_timing && !self.quiet {
            eprintln!("timing: latency_ms=0 (dry-run)");
        }
        Ok(())
    }

    /// Prints a successful result; `render` receives whether to style labels.
    pub fn print_result(
        &self,
        render: impl Fn(bool) -> String,
        value: &Value,
        started: Instant,
    ) -> Result<(), String> {
        if self.show_timing && !self.quiet {
            eprintln!("timing: latency_ms={}", started.elapsed().as_millis());
        }

        match self.output {
            OutputMode::Json => self.emit(&compact(value)?),
            OutputMode::Text => {
                println!("{}", render(io::stdout().is_terminal()));
                if let Some(path) = &self.save {
                    save_output(path, &render(false))?;
                }
                Ok(())
            }
        }
    }

    /// Shows `Analyzing <subject>...` while the endpoint's indicator is in
    /// flight. Only runs for an interactive stderr.
    pub fn watch_progress(&self, session: &Session, endpoint: Endpoint) -> Option<JoinHandle<()>> {
        if self.quiet || !io::stderr().is_terminal() {
            return None;
        }
        let mut phase = session.view().indicator(endpoint).subscribe();
        Some(tokio::spawn(async move {
            while phase.changed().await.is_ok() {
                if *phase.borrow_and_update() == Phase::InFlight {
                    eprintln!("Analyzing {}...", endpoint.subject());
                }
            }
        }))
    }

    fn emit(&self, rendered: &str) -> Result<(), String> {
        println!("{rendered}");
        if let Some(path) = &self.save {
            save_output(path, rendered)?;
        }
        Ok(())
    }
}

fn compact(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string(value).map_err(|err| format!("Failed to serialize output: {err}"))
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn save_output(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, format!("{contents}\n"))
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}
