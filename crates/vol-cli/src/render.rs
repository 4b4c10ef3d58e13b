//! Terminal rendering of lists, detail views and batch results.

use std::collections::BTreeMap;

use chrono::Local;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vol_client::AppointmentContext;
use vol_core::{AllocationPlan, BatchOutcome, HabitsState, Page, StudyDetail, VolunteerDetail};
use vol_model::format::{
    EMPTY, age_on, format_date, format_date_str, format_opt_date, format_opt_time,
    format_phototype, format_rdv_status, format_sexe, format_time, format_yes_no, or_empty,
};
use vol_model::{Appointment, CosmeticHabits, Photo, RdvStatus, Study, Volunteer};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_detail_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn text_cell(value: Option<&str>) -> Cell {
    match or_empty(value) {
        EMPTY => dim_cell(EMPTY),
        text => Cell::new(text),
    }
}

fn id_cell(id: Option<i64>) -> Cell {
    match id {
        Some(id) => Cell::new(id),
        None => dim_cell(EMPTY),
    }
}

fn status_cell(status: &RdvStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        RdvStatus::Planned => cell.fg(Color::Blue),
        RdvStatus::Confirmed => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        RdvStatus::Cancelled => cell.fg(Color::Red),
        RdvStatus::Completed => cell.fg(Color::DarkGrey),
        RdvStatus::Other(_) => cell.fg(Color::Yellow),
    }
}

fn page_footer<T>(page: &Page<T>) {
    if page.page_count > 1 || page.total == 0 {
        println!(
            "Page {}/{} ({} résultat(s))",
            page.page,
            page.page_count.max(1),
            page.total
        );
    } else {
        println!("{} résultat(s)", page.total);
    }
}

fn kv_row(table: &mut Table, label: &str, value: Cell) {
    table.add_row(vec![
        Cell::new(label).add_attribute(Attribute::Bold),
        value,
    ]);
}

pub fn print_volunteers(page: &Page<Volunteer>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Nom"),
        header_cell("Sexe"),
        header_cell("Naissance"),
        header_cell("Phototype"),
        header_cell("Email"),
        header_cell("Téléphone"),
        header_cell("Archivé"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 7, CellAlignment::Center);
    for volunteer in &page.items {
        table.add_row(vec![
            id_cell(volunteer.id_vol),
            Cell::new(volunteer.display_name()),
            Cell::new(format_sexe(volunteer.sexe.as_deref().unwrap_or_default())),
            Cell::new(format_opt_date(volunteer.date_naissance)),
            Cell::new(format_phototype(
                volunteer.phototype.as_deref().unwrap_or_default(),
            )),
            text_cell(volunteer.email.as_deref()),
            text_cell(volunteer.tel_portable.as_deref()),
            if volunteer.is_archived() {
                Cell::new("oui").fg(Color::Yellow)
            } else {
                dim_cell("non")
            },
        ]);
    }
    println!("{table}");
    page_footer(page);
}

pub fn print_studies(page: &Page<Study>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Réf."),
        header_cell("Titre"),
        header_cell("Type"),
        header_cell("Début"),
        header_cell("Fin"),
        header_cell("Sujets"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    for study in &page.items {
        table.add_row(vec![
            id_cell(study.id_etude),
            Cell::new(&study.reference)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&study.titre),
            text_cell(study.kind.as_deref()),
            Cell::new(format_opt_date(study.date_debut)),
            Cell::new(format_opt_date(study.date_fin)),
            study
                .nb_sujets
                .map_or_else(|| dim_cell(EMPTY), Cell::new),
        ]);
    }
    println!("{table}");
    page_footer(page);
}

/// Appointment rows; `names` resolves volunteer ids when available.
pub fn appointment_table(appointments: &[Appointment], names: &BTreeMap<i64, String>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Étude"),
        header_cell("RDV"),
        header_cell("Date"),
        header_cell("Heure"),
        header_cell("Volontaire"),
        header_cell("État"),
        header_cell("Commentaire"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for rdv in appointments {
        let volunteer = match rdv.id_volontaire {
            Some(id) => Cell::new(
                names
                    .get(&id)
                    .map_or_else(|| format!("#{id}"), |name| format!("{name} (#{id})")),
            ),
            None => Cell::new("à déterminer").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(rdv.id_etude),
            Cell::new(rdv.id_rdv),
            Cell::new(format_opt_date(rdv.date)),
            Cell::new(format_opt_time(rdv.heure)),
            volunteer,
            status_cell(&rdv.etat),
            text_cell(rdv.commentaires.as_deref()),
        ]);
    }
    table
}

pub fn print_appointments(page: &Page<Appointment>, names: &BTreeMap<i64, String>) {
    println!("{}", appointment_table(&page.items, names));
    page_footer(page);
}

pub fn print_appointment(context: &AppointmentContext) {
    let rdv = &context.appointment;
    let mut table = Table::new();
    apply_detail_style(&mut table);
    kv_row(&mut table, "Rendez-vous", Cell::new(rdv.key()));
    kv_row(&mut table, "Étude", Cell::new(context.study.display_name()));
    kv_row(&mut table, "Date", Cell::new(format_opt_date(rdv.date)));
    kv_row(&mut table, "Heure", Cell::new(format_opt_time(rdv.heure)));
    let volunteer = match &context.volunteer {
        Some(volunteer) => Cell::new(volunteer.display_name()),
        None => Cell::new("à déterminer").fg(Color::Yellow),
    };
    kv_row(&mut table, "Volontaire", volunteer);
    kv_row(&mut table, "État", status_cell(&rdv.etat));
    kv_row(&mut table, "Commentaire", text_cell(rdv.commentaires.as_deref()));
    println!("{table}");
}

pub fn print_volunteer_detail(detail: &VolunteerDetail) {
    let volunteer = &detail.volunteer;
    let today = Local::now().date_naive();
    let mut table = Table::new();
    apply_detail_style(&mut table);
    kv_row(&mut table, "Volontaire", id_cell(volunteer.id_vol));
    kv_row(&mut table, "Nom", Cell::new(volunteer.display_name()));
    kv_row(
        &mut table,
        "Sexe",
        Cell::new(format_sexe(volunteer.sexe.as_deref().unwrap_or_default())),
    );
    let birth = match volunteer.date_naissance {
        Some(date) => match age_on(date, today) {
            Some(age) => format!("{} ({age} ans)", format_date(date)),
            None => format_date(date),
        },
        None => EMPTY.to_string(),
    };
    kv_row(&mut table, "Naissance", Cell::new(birth));
    kv_row(
        &mut table,
        "Phototype",
        Cell::new(format_phototype(
            volunteer.phototype.as_deref().unwrap_or_default(),
        )),
    );
    kv_row(
        &mut table,
        "Type de peau",
        text_cell(volunteer.type_peau_visage.as_deref()),
    );
    kv_row(&mut table, "Ethnie", text_cell(volunteer.ethnie.as_deref()));
    kv_row(&mut table, "Email", text_cell(volunteer.email.as_deref()));
    kv_row(
        &mut table,
        "Portable",
        text_cell(volunteer.tel_portable.as_deref()),
    );
    let address = [
        volunteer.adresse.as_deref(),
        volunteer.code_postal.as_deref(),
        volunteer.ville.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join(" ");
    kv_row(&mut table, "Adresse", text_cell(Some(address.as_str())));
    kv_row(
        &mut table,
        "Archivé",
        Cell::new(if volunteer.is_archived() { "oui" } else { "non" }),
    );
    kv_row(
        &mut table,
        "Commentaires",
        text_cell(volunteer.commentaires.as_deref()),
    );
    println!("{table}");

    match &detail.habits {
        HabitsState::Present(habits) => {
            let answered: usize = habits.grouped().iter().map(|g| g.answers.len()).sum();
            println!("Habitudes cosmétiques: {answered} réponse(s) (voir `habits show`)");
        }
        HabitsState::Missing => println!("Habitudes cosmétiques: non renseignées"),
    }

    if let Some(next) = detail.next_appointment(today) {
        println!(
            "Prochain rendez-vous: {} {} (étude {})",
            format_opt_date(next.date),
            format_opt_time(next.heure),
            next.id_etude
        );
    }
    if detail.appointments.is_empty() {
        println!("Aucun rendez-vous.");
    } else {
        println!();
        println!("Rendez-vous:");
        println!("{}", appointment_table(&detail.appointments, &BTreeMap::new()));
    }
}

pub fn print_study_detail(detail: &StudyDetail) {
    let study = &detail.study;
    let mut table = Table::new();
    apply_detail_style(&mut table);
    kv_row(&mut table, "Étude", id_cell(study.id_etude));
    kv_row(&mut table, "Référence", Cell::new(&study.reference));
    kv_row(&mut table, "Titre", Cell::new(&study.titre));
    kv_row(&mut table, "Type", text_cell(study.kind.as_deref()));
    kv_row(
        &mut table,
        "Période",
        Cell::new(format!(
            "{} → {}",
            format_opt_date(study.date_debut),
            format_opt_date(study.date_fin)
        )),
    );
    kv_row(
        &mut table,
        "Sujets",
        study.nb_sujets.map_or_else(|| dim_cell(EMPTY), Cell::new),
    );
    kv_row(
        &mut table,
        "Commentaires",
        text_cell(study.commentaires.as_deref()),
    );
    println!("{table}");

    let counts = detail
        .status_counts()
        .into_iter()
        .map(|(code, count)| format!("{}: {count}", format_rdv_status(&code)))
        .collect::<Vec<_>>();
    println!(
        "{} rendez-vous ({} à attribuer){}{}",
        detail.appointments.len(),
        detail.placeholder_count(),
        if counts.is_empty() { "" } else { " - " },
        counts.join(", ")
    );
    if !detail.appointments.is_empty() {
        let names = detail
            .volunteers_by_id
            .iter()
            .map(|(id, volunteer)| (*id, volunteer.display_name()))
            .collect();
        println!("{}", appointment_table(&detail.appointments, &names));
    }
}

pub fn print_habits(habits: &CosmeticHabits) {
    let groups = habits.grouped();
    if groups.is_empty() {
        println!("Questionnaire vide.");
        return;
    }
    for group in groups {
        let mut table = Table::new();
        table.set_header(vec![header_cell(&group.category), header_cell("Réponse")]);
        apply_table_style(&mut table);
        for answer in &group.answers {
            table.add_row(vec![
                Cell::new(&answer.label),
                Cell::new(format_yes_no(&answer.value)),
            ]);
        }
        println!("{table}");
    }
}

pub fn print_photos(photos: &[Photo]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Fichier"),
        header_cell("Type"),
        header_cell("Date"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for photo in photos {
        table.add_row(vec![
            Cell::new(photo.id_photo),
            Cell::new(&photo.nom_fichier),
            text_cell(photo.type_photo.as_deref()),
            Cell::new(
                photo
                    .date_creation
                    .as_deref()
                    .map_or_else(|| EMPTY.to_string(), format_date_str),
            ),
        ]);
    }
    println!("{table}");
}

pub fn print_plan(plan: &AllocationPlan) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Créneau"),
        header_cell("Date"),
        header_cell("Heure"),
        header_cell("Demandés"),
        header_cell("Attribués"),
        header_cell("Dont à déterminer"),
    ]);
    apply_table_style(&mut table);
    for column in 3..6 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (index, slot) in plan.slots.iter().enumerate() {
        let assigned = plan.assigned_to(index);
        let placeholders = plan
            .assignments
            .iter()
            .filter(|a| a.slot_index == index && a.member.is_placeholder())
            .count();
        let assigned_cell = if assigned < slot.volunteer_count {
            Cell::new(assigned).fg(Color::Yellow)
        } else {
            Cell::new(assigned)
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(format_date(slot.date)),
            Cell::new(format_time(slot.time)),
            Cell::new(slot.volunteer_count),
            assigned_cell,
            Cell::new(placeholders),
        ]);
    }
    println!("{table}");
}

/// What `--dry-run` would have created.
pub fn dry_run_summary(plan: &AllocationPlan) -> String {
    let mut lines = vec![format!(
        "Simulation: {} rendez-vous seraient créés ({} volontaire(s), {} à déterminer).",
        plan.assignments.len(),
        plan.real_count(),
        plan.placeholder_count()
    )];
    for (slot_index, missing) in &plan.unfilled {
        lines.push(format!(
            "  créneau {}: {missing} place(s) non pourvue(s)",
            slot_index + 1
        ));
    }
    lines.join("\n")
}

/// Plain-text tally of a submitted batch.
pub fn batch_summary(outcome: &BatchOutcome) -> String {
    let mut lines = vec![format!(
        "{}/{} rendez-vous créés",
        outcome.created_count(),
        outcome.total()
    )];
    lines.push(format!(
        "  volontaires: {} créé(s), {} échec(s)",
        outcome.created_real, outcome.failed_real
    ));
    lines.push(format!(
        "  à déterminer: {} créé(s), {} échec(s)",
        outcome.created_placeholders, outcome.failed_placeholders
    ));
    for failure in &outcome.failures {
        lines.push(format!(
            "  échec créneau {} ({} {}), {}: {}",
            failure.assignment.slot_index + 1,
            format_date(failure.assignment.date),
            format_time(failure.assignment.time),
            failure.assignment.member,
            failure.message
        ));
    }
    lines.join("\n")
}

pub fn print_batch_summary(outcome: &BatchOutcome) {
    let summary = batch_summary(outcome);
    if outcome.has_failures() {
        eprintln!("{summary}");
    } else {
        println!("{summary}");
    }
}
