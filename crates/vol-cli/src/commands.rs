use std::collections::BTreeMap;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::{Attribute, Cell, Table};
use tracing::{Instrument, info, info_span, warn};

use vol_client::config::{clear_token, resolve_token, settings_path, write_token};
use vol_client::{ApiClient, ApiError, LoginRequest, PhotoUpload, Settings};
use vol_core::{
    AppointmentEdit, ArchiveFilter, HabitsEdit, ListQuery, SortKey, StudyEdit, VolunteerChange,
    VolunteerEdit,
};
use vol_model::wire::{parse_date, parse_time};
use vol_model::{AppointmentKey, Phototype, RdvStatus, VolunteerId};

use vol_cli::logging::redact_value;
use vol_cli::render;

use crate::bulk::run_bulk;
use crate::cli::{
    Cli, Command, ConfigCommand, HabitsCommand, ListArgs, LoginArgs, PhotoCommand, RdvCommand,
    RdvEditArgs, SortArg, StudyCommand, StudyEditArgs, VolunteerCommand, VolunteerEditArgs,
};

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran to completion but some of its requests failed.
    PartialFailure,
}

/// Effective settings and credentials for one invocation.
pub struct Session {
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    token: Option<String>,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings_path = cli.config.clone().or_else(settings_path);
        let settings = settings_path
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default()
            .with_env_overrides()
            .with_api_url(cli.api_url.clone());
        let token = resolve_token(cli.token.clone(), &settings).context("read stored token")?;
        Ok(Self {
            settings,
            settings_path,
            token,
        })
    }

    /// Client carrying the session token. Fails with the login hint when
    /// there is none.
    pub fn client(&self) -> Result<ApiClient> {
        let Some(token) = self.token.as_deref() else {
            return Err(ApiError::Unauthorized.into());
        };
        Ok(ApiClient::new(&self.settings, Some(token))?)
    }

    fn anonymous_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(&self.settings, None)?)
    }

    fn query(&self, list: &ListArgs) -> ListQuery {
        let mut query = ListQuery::default().with_page(
            list.page,
            list.page_size.unwrap_or(self.settings.page_size),
        );
        if let Some(search) = list.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.with_search(search);
        }
        if let Some(sort) = list.sort {
            query = query.with_sort(sort_key(sort), list.desc);
        }
        query
    }
}

fn sort_key(arg: SortArg) -> SortKey {
    match arg {
        SortArg::Id => SortKey::Id,
        SortArg::Nom => SortKey::Name,
        SortArg::Prenom => SortKey::FirstName,
        SortArg::Date => SortKey::Date,
        SortArg::Etat => SortKey::Status,
    }
}

pub async fn run(cli: Cli) -> Result<Outcome> {
    let session = Session::from_cli(&cli)?;
    match cli.command {
        Command::Login(args) => run_login(&session, args).await,
        Command::Logout => run_logout(&session),
        Command::Config(command) => run_config(&session, &command),
        Command::Volunteers(command) => run_volunteers(&session, command).await,
        Command::Studies(command) => run_studies(&session, command).await,
        Command::Rdvs(command) => run_rdvs(&session, command).await,
        Command::Habits(command) => run_habits(&session, command).await,
        Command::Photos(command) => run_photos(&session, command).await,
    }
}

async fn run_login(session: &Session, args: LoginArgs) -> Result<Outcome> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_line("Mot de passe: ")?,
    };
    let path = session
        .settings
        .token_path()
        .context("no configuration directory to store the token in")?;
    let request = LoginRequest {
        email: args.email,
        password,
    };
    let token = session
        .anonymous_client()?
        .login(&request)
        .await
        .context("login")?;
    write_token(&path, &token).with_context(|| format!("write token to {}", path.display()))?;
    info!(email = redact_value(&request.email), "logged in");
    println!("Connecté. Jeton enregistré dans {}", path.display());
    Ok(Outcome::Success)
}

fn run_logout(session: &Session) -> Result<Outcome> {
    if let Some(path) = session.settings.token_path() {
        clear_token(&path).with_context(|| format!("remove {}", path.display()))?;
    }
    println!("Déconnecté.");
    Ok(Outcome::Success)
}

fn run_config(session: &Session, command: &ConfigCommand) -> Result<Outcome> {
    match command {
        ConfigCommand::Show => {
            let settings = &session.settings;
            let mut table = Table::new();
            render::apply_table_style(&mut table);
            let path = |p: Option<&Path>| p.map_or_else(|| "-".to_string(), |p| p.display().to_string());
            let rows = [
                ("Fichier", path(session.settings_path.as_deref())),
                ("api_url", settings.api_url.clone()),
                ("timeout_secs", settings.timeout_secs.to_string()),
                ("token_file", path(settings.token_path().as_deref())),
                ("page_size", settings.page_size.to_string()),
                ("placeholder_comment", settings.placeholder_comment.clone()),
                (
                    "Session",
                    if session.token.is_some() { "jeton présent" } else { "non connecté" }
                        .to_string(),
                ),
            ];
            for (key, value) in rows {
                table.add_row(vec![Cell::new(key).add_attribute(Attribute::Bold), Cell::new(value)]);
            }
            println!("{table}");
        }
        ConfigCommand::Init { force } => {
            let path = session
                .settings_path
                .as_deref()
                .context("no configuration directory; pass --config")?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Settings::default()
                .save_to(path)
                .with_context(|| format!("write {}", path.display()))?;
            println!("Configuration écrite dans {}", path.display());
        }
    }
    Ok(Outcome::Success)
}

async fn run_volunteers(session: &Session, command: VolunteerCommand) -> Result<Outcome> {
    let api = session.client()?;
    match command {
        VolunteerCommand::List {
            list,
            archived,
            all,
        } => {
            let filter = if all {
                ArchiveFilter::All
            } else if archived {
                ArchiveFilter::ArchivedOnly
            } else {
                ArchiveFilter::ActiveOnly
            };
            let volunteers: Vec<_> = api
                .list_volunteers()
                .await?
                .into_iter()
                .filter(|v| filter.keeps(v))
                .collect();
            render::print_volunteers(&session.query(&list).apply(volunteers));
        }
        VolunteerCommand::Show { id } => {
            let detail = api
                .volunteer_detail(id)
                .instrument(info_span!("volunteer_detail", volunteer_id = id))
                .await?;
            info!(
                volunteer = redact_value(&detail.volunteer.display_name()),
                appointments = detail.appointments.len(),
                "loaded volunteer"
            );
            render::print_volunteer_detail(&detail);
        }
        VolunteerCommand::Edit(args) => run_volunteer_edit(&api, &args).await?,
        VolunteerCommand::Archive { id } => {
            api.set_volunteer_archived(id, true).await?;
            println!("Volontaire {id} archivé.");
        }
        VolunteerCommand::Unarchive { id } => {
            api.set_volunteer_archived(id, false).await?;
            println!("Volontaire {id} désarchivé.");
        }
        VolunteerCommand::Delete { id, yes } => {
            let volunteer = api.get_volunteer(id).await?;
            let question = format!("Supprimer le volontaire {id} ({}) ?", volunteer.display_name());
            if !confirm(&question, yes)? {
                println!("Annulé.");
                return Ok(Outcome::Success);
            }
            api.delete_volunteer(id).await?;
            println!("Volontaire {id} supprimé.");
        }
    }
    Ok(Outcome::Success)
}

async fn run_studies(session: &Session, command: StudyCommand) -> Result<Outcome> {
    let api = session.client()?;
    match command {
        StudyCommand::List { list } => {
            let studies = api.list_studies().await?;
            render::print_studies(&session.query(&list).apply(studies));
        }
        StudyCommand::Show { id } => {
            let detail = api
                .study_detail(id)
                .instrument(info_span!("study_detail", study_id = id))
                .await?;
            render::print_study_detail(&detail);
        }
        StudyCommand::Edit(args) => run_study_edit(&api, &args).await?,
        StudyCommand::Delete { id, yes } => {
            let study = api.get_study(id).await?;
            let question = format!("Supprimer l'étude {} ?", study.display_name());
            if !confirm(&question, yes)? {
                println!("Annulé.");
                return Ok(Outcome::Success);
            }
            api.delete_study(id).await?;
            println!("Étude {id} supprimée.");
        }
    }
    Ok(Outcome::Success)
}

async fn run_rdvs(session: &Session, command: RdvCommand) -> Result<Outcome> {
    let api = session.client()?;
    match command {
        RdvCommand::List {
            list,
            study,
            volunteer,
            status,
        } => {
            let appointments = async {
                match (study, volunteer) {
                    (Some(study), _) => api.list_study_appointments(study).await,
                    (None, Some(volunteer)) => api.list_volunteer_appointments(volunteer).await,
                    (None, None) => api.list_appointments().await,
                }
            };
            let (mut appointments, volunteers) =
                tokio::try_join!(appointments, api.list_volunteers())?;
            if let Some(status) = status.as_deref() {
                let status = RdvStatus::from_code(status);
                if !status.is_known() {
                    warn!(status = %status, "unknown appointment status filter");
                }
                appointments.retain(|rdv| rdv.etat == status);
            }
            let names: BTreeMap<_, _> = volunteers
                .iter()
                .filter_map(|v| v.id_vol.map(|id| (id, v.display_name())))
                .collect();
            render::print_appointments(&session.query(&list).apply(appointments), &names);
        }
        RdvCommand::Show { study, id } => {
            let context = api.appointment_context(rdv_key(study, id)).await?;
            render::print_appointment(&context);
        }
        RdvCommand::Edit(args) => run_rdv_edit(&api, &args).await?,
        RdvCommand::Confirm { study, id } => {
            set_status(&api, rdv_key(study, id), RdvStatus::Confirmed).await?;
        }
        RdvCommand::Cancel { study, id } => {
            set_status(&api, rdv_key(study, id), RdvStatus::Cancelled).await?;
        }
        RdvCommand::Complete { study, id } => {
            set_status(&api, rdv_key(study, id), RdvStatus::Completed).await?;
        }
        RdvCommand::Delete { study, id, yes } => {
            let key = rdv_key(study, id);
            if !confirm(&format!("Supprimer le rendez-vous {key} ?"), yes)? {
                println!("Annulé.");
                return Ok(Outcome::Success);
            }
            api.delete_appointment(key).await?;
            println!("Rendez-vous {key} supprimé.");
        }
        RdvCommand::Bulk(args) => return run_bulk(session, &args).await,
    }
    Ok(Outcome::Success)
}

fn rdv_key(study_id: i64, appointment_id: i64) -> AppointmentKey {
    AppointmentKey {
        study_id,
        appointment_id,
    }
}

async fn set_status(api: &ApiClient, key: AppointmentKey, status: RdvStatus) -> Result<()> {
    api.set_appointment_status(key, status.clone())
        .await
        .with_context(|| format!("set status of appointment {key}"))?;
    println!("Rendez-vous {key}: {}", status.label());
    Ok(())
}

async fn run_rdv_edit(api: &ApiClient, args: &RdvEditArgs) -> Result<()> {
    let edit = AppointmentEdit {
        date: args.date.as_deref().map(parse_date).transpose()?,
        time: args.time.as_deref().map(parse_time).transpose()?,
        volunteer: match (args.volunteer, args.no_volunteer) {
            (Some(id), _) => Some(VolunteerChange::Assign(id)),
            (None, true) => Some(VolunteerChange::Unassign),
            (None, false) => None,
        },
        comment: args.comment.clone(),
    };
    if edit.is_empty() {
        bail!("nothing to change: pass --date, --time, --volunteer, --no-volunteer or --comment");
    }
    let key = rdv_key(args.study, args.id);
    let current = api.get_appointment(key).await?;
    if let Some(VolunteerChange::Assign(id)) = edit.volunteer {
        api.get_volunteer(id)
            .await
            .with_context(|| format!("volunteer {id}"))?;
    }
    let updated = api
        .update_appointment(&edit.apply(&current))
        .await
        .with_context(|| format!("update appointment {key}"))?;
    info!(appointment = %key, "appointment updated");
    println!("Rendez-vous {} mis à jour.", updated.key());
    Ok(())
}

async fn run_volunteer_edit(api: &ApiClient, args: &VolunteerEditArgs) -> Result<()> {
    let edit = VolunteerEdit {
        nom: args.nom.clone(),
        prenom: args.prenom.clone(),
        sexe: args.sexe.clone(),
        date_naissance: args.naissance.as_deref().map(parse_date).transpose()?,
        email: args.email.clone(),
        tel_portable: args.tel.clone(),
        tel_domicile: args.tel_domicile.clone(),
        adresse: args.adresse.clone(),
        code_postal: args.code_postal.clone(),
        ville: args.ville.clone(),
        phototype: args
            .phototype
            .as_deref()
            .map(str::parse::<Phototype>)
            .transpose()?,
        commentaires: args.comment.clone(),
    };
    if edit.is_empty() {
        bail!("nothing to change: pass at least one field option (see --help)");
    }
    let current = api.get_volunteer(args.id).await?;
    let updated = edit
        .apply(&current)
        .with_context(|| format!("edit volunteer {}", args.id))?;
    api.update_volunteer(args.id, &updated)
        .await
        .with_context(|| format!("update volunteer {}", args.id))?;
    info!(volunteer_id = args.id, "volunteer updated");
    println!("Volontaire {} mis à jour.", args.id);
    Ok(())
}

async fn run_study_edit(api: &ApiClient, args: &StudyEditArgs) -> Result<()> {
    let edit = StudyEdit {
        reference: args.reference.clone(),
        titre: args.titre.clone(),
        kind: args.kind.clone(),
        date_debut: args.debut.as_deref().map(parse_date).transpose()?,
        date_fin: args.fin.as_deref().map(parse_date).transpose()?,
        nb_sujets: args.sujets,
        commentaires: args.comment.clone(),
    };
    if edit.is_empty() {
        bail!("nothing to change: pass at least one field option (see --help)");
    }
    let current = api.get_study(args.id).await?;
    let updated = edit
        .apply(&current)
        .with_context(|| format!("edit study {}", args.id))?;
    let saved = api
        .update_study(args.id, &updated)
        .await
        .with_context(|| format!("update study {}", args.id))?;
    info!(study_id = args.id, "study updated");
    println!("Étude {} mise à jour.", saved.display_name());
    Ok(())
}

async fn run_habits(session: &Session, command: HabitsCommand) -> Result<Outcome> {
    let api = session.client()?;
    match command {
        HabitsCommand::Show { volunteer } => match api.get_habits(volunteer).await? {
            Some(habits) => render::print_habits(&habits),
            None => println!(
                "Aucun questionnaire d'habitudes cosmétiques pour le volontaire {volunteer}."
            ),
        },
        HabitsCommand::Edit {
            volunteer,
            set,
            unset,
        } => {
            let edit = HabitsEdit { set, unset };
            run_habits_edit(&api, volunteer, &edit).await?;
        }
    }
    Ok(Outcome::Success)
}

/// Creates the questionnaire on first edit, updates it afterwards.
async fn run_habits_edit(
    api: &ApiClient,
    volunteer: VolunteerId,
    edit: &HabitsEdit,
) -> Result<()> {
    if edit.is_empty() {
        bail!("nothing to change: pass --set FIELD=VALUE or --unset FIELD");
    }
    let current = api.get_habits(volunteer).await?;
    let updated = edit
        .apply(volunteer, current.as_ref())
        .with_context(|| format!("edit habits of volunteer {volunteer}"))?;
    if current.is_some() {
        api.update_habits(&updated).await?;
        println!("Habitudes cosmétiques du volontaire {volunteer} mises à jour.");
    } else {
        api.create_habits(&updated).await?;
        println!("Questionnaire d'habitudes cosmétiques créé pour le volontaire {volunteer}.");
    }
    info!(volunteer_id = volunteer, created = current.is_none(), "habits saved");
    Ok(())
}

async fn run_photos(session: &Session, command: PhotoCommand) -> Result<Outcome> {
    let api = session.client()?;
    match command {
        PhotoCommand::List { volunteer } => {
            let photos = api.list_photos(volunteer).await?;
            if photos.is_empty() {
                println!("Aucune photo pour le volontaire {volunteer}.");
            } else {
                render::print_photos(&photos);
            }
        }
        PhotoCommand::Upload {
            volunteer,
            file,
            kind,
        } => {
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} is not a file", file.display()))?;
            let photo = api
                .upload_photo(PhotoUpload {
                    volunteer_id: volunteer,
                    file_name,
                    content,
                    kind,
                })
                .await?;
            println!("Photo {} envoyée ({}).", photo.id_photo, photo.nom_fichier);
        }
        PhotoCommand::Download { id, output } => {
            let bytes = api.download_photo(id).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("write {}", output.display()))?;
            println!("Photo {id} enregistrée dans {} ({} octets).", output.display(), bytes.len());
        }
        PhotoCommand::Delete { id, yes } => {
            if !confirm(&format!("Supprimer la photo {id} ?"), yes)? {
                println!("Annulé.");
                return Ok(Outcome::Success);
            }
            api.delete_photo(id).await?;
            println!("Photo {id} supprimée.");
        }
    }
    Ok(Outcome::Success)
}

/// Asks a yes/no question on the terminal. Non-interactive input never
/// confirms a deletion.
fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        bail!("confirmation required: rerun with --yes");
    }
    let answer = prompt_line(&format!("{question} [o/N] "))?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    ))
}

fn prompt_line(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
