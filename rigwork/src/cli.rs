//! Root CLI structure for rigwork

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rigwork")]
#[command(about = "Inspect skeletal rigs: bone trees, clips and sampled poses", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rig document operations
    #[command(flatten)]
    Rig(crate::commands::rig::RigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
