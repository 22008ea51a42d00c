use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use serde_json::json;

use crate::commands::common::{DispatchArgs, GlobalArgs};
use crate::dispatch::view::{render_expression, render_video};
use crate::dispatch::{Endpoint, MediaFile, MediaKind};

#[derive(Debug, Args, Clone)]
pub struct MediaArgs {
    #[arg(value_name = "FILE", help = "File to upload")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

pub async fn run_image(args: MediaArgs, global: &GlobalArgs) -> Result<(), String> {
    run(MediaKind::Image, args, global).await
}

pub async fn run_video(args: MediaArgs, global: &GlobalArgs) -> Result<(), String> {
    run(MediaKind::Video, args, global).await
}

async fn run(kind: MediaKind, args: MediaArgs, global: &GlobalArgs) -> Result<(), String> {
    let settings = args.dispatch.resolve(global)?;
    let file = args
        .file
        .map(|path| MediaFile::load(&path, kind))
        .transpose()
        .map_err(|err| err.alert())?;

    let session = settings.session();
    if settings.dry_run {
        let preview = session
            .dispatcher()
            .preview_media(kind, file.as_ref())
            .map_err(|err| err.alert())?;
        return settings.print_dry_run(&preview);
    }

    let progress = settings.watch_progress(&session, Endpoint::from(kind));
    let started = Instant::now();
    let result = match kind {
        MediaKind::Image => session.analyze_image(file.as_ref()).await,
        MediaKind::Video => session.analyze_video(file.as_ref()).await,
    };
    if let Some(progress) = progress {
        progress.abort();
    }

    let outcome = result.map_err(|err| err.alert())?;
    match kind {
        MediaKind::Image => settings.print_result(
            |styled| render_expression(&outcome, styled),
            &json!({ "expression": outcome }),
            started,
        ),
        MediaKind::Video => settings.print_result(
            |styled| render_video(&outcome, styled),
            &json!({ "analysis": outcome }),
            started,
        ),
    }
}
