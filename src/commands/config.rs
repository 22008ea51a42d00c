use clap::{Args, Subcommand};

use crate::config;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    #[command(about = "Parse the config file and validate every profile")]
    Check {
        #[arg(long, help = "Also require this profile to exist")]
        profile: Option<String>,
    },
    #[command(about = "Print the resolved config file path")]
    Path,
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref())?;
            println!("config OK: {}", path.display());
        }
        ConfigSubcommand::Path => {
            println!("{}", config::config_path()?.display());
        }
    }
    Ok(())
}
