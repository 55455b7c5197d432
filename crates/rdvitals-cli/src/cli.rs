use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rdvitals_core::config;

mod commands;

/// Top-level CLI for the rdvitals level downloader.
#[derive(Debug, Parser)]
#[command(name = "rdvitals")]
#[command(about = "Download, unzip, and parse Rhythm Doctor level packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more levels into a directory.
    Download {
        /// Level URLs (.rdzip links or anything with a filename header).
        #[arg(required = true)]
        urls: Vec<String>,

        /// Directory to put the downloaded levels in.
        #[arg(short = 'o', long, default_value = ".")]
        dir: PathBuf,

        /// Explicit filename (single URL only). Overwrites an existing
        /// file of the same name.
        #[arg(long)]
        filename: Option<String>,

        /// Maximum concurrent downloads (defaults to the config value).
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Download a level and unzip it into a directory.
    Unzip {
        /// Level URL.
        url: String,

        /// Directory to unzip into.
        #[arg(short = 'o', long, default_value = ".")]
        dir: PathBuf,

        /// Unzip into a subfolder named after the archive instead of
        /// directly into the directory.
        #[arg(long)]
        subfolder: bool,
    },

    /// Unzip an already-downloaded .rdzip file.
    Extract {
        /// Path to the .rdzip file.
        input: PathBuf,

        /// Directory to unzip into.
        output: PathBuf,
    },

    /// Parse a level and print its JSON document.
    Parse {
        /// Path to an .rdzip / .rdlevel file, or a URL to download.
        target: String,

        /// Parse the separate 2-player document instead of the main one.
        #[arg(long)]
        two_player: bool,
    },

    /// List all levels on the community spreadsheet.
    Sheet {
        /// Only show verified levels.
        #[arg(long)]
        verified: bool,
    },

    /// List the community setlists and their level URLs.
    Setlists {
        /// Keep interior null entries.
        #[arg(long)]
        keep_none: bool,

        /// Trim null padding from the ends of each setlist.
        #[arg(long)]
        trim: bool,
    },

    /// Generate shell completions to stdout.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },

    /// Generate a man page to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Completions and man pages need no config or network.
        match &cli.command {
            CliCommand::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(*shell, &mut cmd, "rdvitals", &mut io::stdout());
                return Ok(());
            }
            CliCommand::Man => {
                let man = clap_mangen::Man::new(Cli::command());
                man.render(&mut io::stdout())?;
                return Ok(());
            }
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let opts = cfg.http_options();

        match cli.command {
            CliCommand::Download {
                urls,
                dir,
                filename,
                jobs,
            } => {
                let jobs = jobs.unwrap_or(cfg.max_concurrent_downloads);
                commands::download::run_download(&opts, &urls, &dir, filename.as_deref(), jobs)
                    .await
            }
            CliCommand::Unzip {
                url,
                dir,
                subfolder,
            } => commands::unzip::run_unzip(&opts, &url, &dir, subfolder).await,
            CliCommand::Extract { input, output } => {
                commands::unzip::run_extract(&input, &output)
            }
            CliCommand::Parse { target, two_player } => {
                commands::parse::run_parse(&opts, &target, two_player).await
            }
            CliCommand::Sheet { verified } => commands::sheet::run_sheet(&opts, verified).await,
            CliCommand::Setlists { keep_none, trim } => {
                commands::sheet::run_setlists(&opts, keep_none, trim).await
            }
            CliCommand::Completions { .. } | CliCommand::Man => unreachable!("handled above"),
        }
    }
}
