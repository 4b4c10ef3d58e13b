//! CLI argument definitions for the volunteer administration tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "volontaires",
    version,
    about = "Administration des volontaires, études et rendez-vous",
    long_about = "Manage clinical-study volunteers, studies, appointments and\n\
                  cosmetic-habit questionnaires through the backend REST API.\n\n\
                  Bulk appointment booking distributes selected volunteers and\n\
                  placeholders over date/time slots."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow volunteer personal data (names, contact details) in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Backend base URL (overrides settings and VOLONTAIRES_API_URL).
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides VOLONTAIRES_TOKEN and the stored token).
    #[arg(long = "token", value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Settings file to use instead of the default location.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session token.
    Login(LoginArgs),

    /// Forget the stored session token.
    Logout,

    /// Show or initialize the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Volunteers (volontaires).
    #[command(subcommand, alias = "vol")]
    Volunteers(VolunteerCommand),

    /// Studies (études).
    #[command(subcommand, alias = "etudes")]
    Studies(StudyCommand),

    /// Appointments (rendez-vous).
    #[command(subcommand)]
    Rdvs(RdvCommand),

    /// Cosmetic-habits questionnaires.
    #[command(subcommand, alias = "hc")]
    Habits(HabitsCommand),

    /// Volunteer photos.
    #[command(subcommand)]
    Photos(PhotoCommand),
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Password (prompted from stdin when omitted).
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings.
    Show,
    /// Write a settings file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Search, sort and pagination shared by list commands.
#[derive(Args, Clone)]
pub struct ListArgs {
    /// Case- and accent-insensitive search text.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort column.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort in descending order.
    #[arg(long)]
    pub desc: bool,

    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (default from settings).
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Id,
    Nom,
    Prenom,
    Date,
    Etat,
}

#[derive(Subcommand)]
pub enum VolunteerCommand {
    /// List volunteers.
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Show archived volunteers only.
        #[arg(long, conflicts_with = "all")]
        archived: bool,
        /// Show active and archived volunteers.
        #[arg(long)]
        all: bool,
    },
    /// Volunteer detail with habits and appointments.
    Show { id: i64 },
    /// Edit a volunteer's identity, contact details or comment.
    Edit(VolunteerEditArgs),
    /// Archive a volunteer.
    Archive { id: i64 },
    /// Restore an archived volunteer.
    Unarchive { id: i64 },
    /// Delete a volunteer.
    Delete {
        id: i64,
        /// Do not ask for confirmation.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum StudyCommand {
    /// List studies.
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Study detail with its appointments.
    Show { id: i64 },
    /// Edit a study's reference, title, dates or headcount.
    Edit(StudyEditArgs),
    /// Delete a study.
    Delete {
        id: i64,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Options left out are not changed. An empty string clears an optional
/// field.
#[derive(Args)]
pub struct VolunteerEditArgs {
    pub id: i64,
    #[arg(long)]
    pub nom: Option<String>,
    #[arg(long)]
    pub prenom: Option<String>,
    /// F or M.
    #[arg(long)]
    pub sexe: Option<String>,
    /// Birth date (YYYY-MM-DD).
    #[arg(long)]
    pub naissance: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Mobile phone.
    #[arg(long)]
    pub tel: Option<String>,
    /// Home phone.
    #[arg(long = "tel-domicile")]
    pub tel_domicile: Option<String>,
    #[arg(long)]
    pub adresse: Option<String>,
    #[arg(long = "code-postal")]
    pub code_postal: Option<String>,
    #[arg(long)]
    pub ville: Option<String>,
    /// Fitzpatrick phototype, Roman or Arabic (III or 3).
    #[arg(long)]
    pub phototype: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args)]
pub struct StudyEditArgs {
    pub id: i64,
    /// Reference code, e.g. E2024-017.
    #[arg(long = "ref")]
    pub reference: Option<String>,
    #[arg(long)]
    pub titre: Option<String>,
    /// Study type; an empty string clears it.
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    pub debut: Option<String>,
    /// End date (YYYY-MM-DD).
    #[arg(long)]
    pub fin: Option<String>,
    /// Number of subjects.
    #[arg(long)]
    pub sujets: Option<u32>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand)]
pub enum RdvCommand {
    /// List appointments.
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only appointments of this study.
        #[arg(long)]
        study: Option<i64>,
        /// Only appointments of this volunteer.
        #[arg(long, conflicts_with = "study")]
        volunteer: Option<i64>,
        /// Only appointments with this status (PLANIFIE, CONFIRME, ANNULE, COMPLETE).
        #[arg(long)]
        status: Option<String>,
    },
    /// Appointment detail.
    Show { study: i64, id: i64 },
    /// Edit date, time, volunteer or comment of an appointment.
    Edit(RdvEditArgs),
    /// Mark an appointment as confirmed.
    Confirm { study: i64, id: i64 },
    /// Mark an appointment as cancelled.
    Cancel { study: i64, id: i64 },
    /// Mark an appointment as completed.
    Complete { study: i64, id: i64 },
    /// Delete an appointment.
    Delete {
        study: i64,
        id: i64,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Create appointments in bulk over one or more slots.
    Bulk(BulkArgs),
}

#[derive(Args)]
pub struct RdvEditArgs {
    pub study: i64,
    pub id: i64,
    /// New date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<String>,
    /// New time (HH:MM).
    #[arg(long)]
    pub time: Option<String>,
    /// Assign this volunteer.
    #[arg(long, conflicts_with = "no_volunteer")]
    pub volunteer: Option<i64>,
    /// Detach the volunteer (turns the appointment into a placeholder).
    #[arg(long = "no-volunteer")]
    pub no_volunteer: bool,
    /// New comment; an empty string clears it.
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args)]
pub struct BulkArgs {
    /// Study receiving the appointments.
    #[arg(long)]
    pub study: i64,

    /// Slot as DATE@HH:MM=COUNT, e.g. 2024-05-02@09:00=10. Repeatable.
    #[arg(long = "slot", value_name = "SLOT", required = true)]
    pub slots: Vec<String>,

    /// Volunteer to book, in order. Repeatable or comma-separated.
    #[arg(long = "volunteer", value_delimiter = ',')]
    pub volunteers: Vec<i64>,

    /// Number of placeholder appointments (no volunteer yet).
    #[arg(long, default_value_t = 0)]
    pub placeholders: usize,

    /// Comment for the volunteers' appointments.
    #[arg(long)]
    pub comment: Option<String>,

    /// Show the allocation without creating anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Accept slot dates outside the study's date range.
    #[arg(long = "ignore-window")]
    pub ignore_window: bool,
}

#[derive(Subcommand)]
pub enum HabitsCommand {
    /// Show a volunteer's cosmetic habits, grouped by category.
    Show { volunteer: i64 },
    /// Set or clear answers, creating the questionnaire if needed.
    Edit {
        volunteer: i64,
        /// Answer as FIELD=VALUE, e.g. cremeJour=oui. Repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_answer)]
        set: Vec<(String, String)>,
        /// Field to clear. Repeatable.
        #[arg(long = "unset", value_name = "FIELD")]
        unset: Vec<String>,
    },
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got `{raw}`")),
    }
}

#[derive(Subcommand)]
pub enum PhotoCommand {
    /// List a volunteer's photos.
    List { volunteer: i64 },
    /// Upload a photo for a volunteer.
    Upload {
        volunteer: i64,
        file: PathBuf,
        /// Photo category (e.g. face, profil).
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Download a photo to a file.
    Download { id: i64, output: PathBuf },
    /// Delete a photo.
    Delete {
        id: i64,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
