use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use emolens::commands::common::GlobalArgs;
use emolens::commands::config::{self, ConfigArgs};
use emolens::commands::media::{self, MediaArgs};
use emolens::commands::text::{self, TextArgs};
use emolens::logging;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("EMOLENS_GIT_SHA"),
    ", built: ",
    env!("EMOLENS_BUILD_TS"),
    ")"
);

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  emolens text \"I love this place\"\n  echo \"quel beau jour\" | emolens text --json\n  emolens image face.jpg\n  emolens video clip.mp4 --base-url http://127.0.0.1:8000\n  emolens config check\n  emolens completion bash > ~/.local/share/bash-completion/completions/emolens";

const TEXT_HELP_EXAMPLES: &str = "Examples:\n  emolens text \"I love this place\"\n  echo \"quel beau jour\" | emolens text --output json\n  emolens text --dry-run --json \"Is this sent?\"";

const MEDIA_HELP_EXAMPLES: &str = "Examples:\n  emolens image face.png\n  emolens video clip.mov --save results/clip.txt\n  emolens image face.jpg --dry-run";

#[derive(Debug, Parser)]
#[command(
    name = "emolens",
    about = "Send text, images and video to an emotion analysis service",
    version = VERSION,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Analyze the sentiment of a piece of text", after_help = TEXT_HELP_EXAMPLES)]
    Text(TextArgs),
    #[command(about = "Detect the facial expression in an image", after_help = MEDIA_HELP_EXAMPLES)]
    Image(MediaArgs),
    #[command(about = "Analyze the facial expressions in a video", after_help = MEDIA_HELP_EXAMPLES)]
    Video(MediaArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "emolens", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "emolens", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "emolens", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose, cli.global.quiet);

    let result = match cli.command {
        Commands::Text(args) => text::run(args, &cli.global).await,
        Commands::Image(args) => media::run_image(args, &cli.global).await,
        Commands::Video(args) => media::run_video(args, &cli.global).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
