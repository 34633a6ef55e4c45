use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clubdesk_client::ExportFormat;
use clubdesk_core::navigation::Screen;
use clubdesk_core::types::DbId;

/// Club administration console.
#[derive(Parser, Debug)]
#[command(
    name = "clubdesk",
    version,
    about = "Administer clubs, players, referees and competitions from the terminal"
)]
pub struct Cli {
    /// Override the API base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print records as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLUBDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Show the sidebar for the signed-in role.
    Nav {
        /// Highlight this screen.
        #[arg(long, value_enum)]
        active: Option<Module>,
        /// Render the collapsed sidebar.
        #[arg(long)]
        collapsed: bool,
    },
    /// Check that the API is reachable.
    Status,
    /// Record counts per module.
    Dashboard,
    /// List one page of a module.
    List {
        #[arg(value_enum)]
        module: Module,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show one record.
    Get {
        #[arg(value_enum)]
        module: Module,
        id: DbId,
    },
    /// Create a record from a JSON draft.
    Create {
        #[arg(value_enum)]
        module: Module,
        /// Draft fields as JSON, or `@path` to read a file.
        #[arg(long)]
        data: String,
    },
    /// Change fields of a record; unspecified fields keep their values.
    Update {
        #[arg(value_enum)]
        module: Module,
        id: DbId,
        /// Changed fields as JSON, or `@path` to read a file.
        #[arg(long)]
        data: String,
    },
    /// Delete a record.
    Delete {
        #[arg(value_enum)]
        module: Module,
        id: DbId,
    },
    /// Suspend a player, or lift the suspension.
    Suspend {
        id: DbId,
        #[arg(long)]
        lift: bool,
    },
    /// Upload a player's Aadhaar card image for verification.
    VerifyAadhar { id: DbId, image: PathBuf },
    /// Download a module export.
    Export {
        #[arg(value_enum)]
        module: Module,
        #[arg(value_enum, default_value = "pdf")]
        format: ExportArg,
        /// Output file; defaults to `<module>.<ext>`.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Players registered for a competition.
    Entries { competition_id: DbId },
    /// Browse the activity log.
    Logs {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        action: Option<String>,
        /// Earliest date, `YYYY-MM-DD`.
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date, `YYYY-MM-DD`.
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Derive the "Under N" category for an eligibility date.
    AgeCategory {
        date: NaiveDate,
        /// Reference date instead of today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Search, sort, paging and filter options shared by list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    #[arg(long)]
    pub search: Option<String>,
    /// Sort column (wire name, e.g. `clubName`).
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Filter as `key=value`; repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Clubs,
    Regions,
    Talukas,
    Groups,
    Players,
    Referees,
    Competitions,
    ActivityLogs,
}

impl Module {
    pub fn screen(self) -> Screen {
        match self {
            Self::Clubs => Screen::Clubs,
            Self::Regions => Screen::Regions,
            Self::Talukas => Screen::Talukas,
            Self::Groups => Screen::Groups,
            Self::Players => Screen::Players,
            Self::Referees => Screen::Referees,
            Self::Competitions => Screen::Competitions,
            Self::ActivityLogs => Screen::ActivityLogs,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportArg {
    Pdf,
    Excel,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Pdf => ExportFormat::Pdf,
            ExportArg::Excel => ExportFormat::Excel,
        }
    }
}
