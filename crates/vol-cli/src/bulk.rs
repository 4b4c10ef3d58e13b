//! `rdvs bulk`: allocate a volunteer pool over slots and create the
//! appointments.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{Instrument, info, info_span, warn};

use vol_core::{BatchOptions, VolunteerPool, allocate, submit_plan, validate_slots};
use vol_model::{Volunteer, VolunteerId};

use vol_cli::logging::redact_value;
use vol_cli::render;
use vol_cli::slots::parse_slots;

use crate::cli::BulkArgs;
use crate::commands::{Outcome, Session};

pub async fn run_bulk(session: &Session, args: &BulkArgs) -> Result<Outcome> {
    let span = info_span!("bulk", study_id = args.study);
    bulk(session, args).instrument(span).await
}

async fn bulk(session: &Session, args: &BulkArgs) -> Result<Outcome> {
    let drafts = parse_slots(&args.slots)?;
    let api = session.client()?;

    let (study, volunteers) = tokio::try_join!(api.get_study(args.study), api.list_volunteers())
        .with_context(|| format!("load study {}", args.study))?;

    let window = (!args.ignore_window).then(|| study.window());
    let slots = validate_slots(&drafts, window).map_err(|issues| {
        let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
        anyhow!("invalid slots:\n  {}", lines.join("\n  "))
    })?;

    let (pool, archived) = build_pool(&args.volunteers, args.placeholders, &volunteers)?;
    for volunteer in archived {
        warn!(
            volunteer_id = volunteer.id_vol,
            volunteer = redact_value(&volunteer.display_name()),
            "booking an archived volunteer"
        );
    }

    let plan = allocate(&slots, &pool);
    println!("Étude {}", study.display_name());
    render::print_plan(&plan);
    if let Some(warning) = &plan.warning {
        warn!(%warning, "capacity mismatch");
        eprintln!("attention: {warning}");
    }

    if args.dry_run {
        println!("{}", render::dry_run_summary(&plan));
        return Ok(Outcome::Success);
    }

    let options = BatchOptions {
        study_id: args.study,
        comment: args.comment.clone().filter(|c| !c.trim().is_empty()),
        placeholder_comment: session.settings.placeholder_comment.clone(),
    };
    let outcome = submit_plan(&api, &plan, &options).await;
    info!(
        created = outcome.created_count(),
        failed = outcome.failed_count(),
        "bulk booking finished"
    );
    render::print_batch_summary(&outcome);

    Ok(if outcome.has_failures() {
        Outcome::PartialFailure
    } else {
        Outcome::Success
    })
}

/// Builds the pool from the `--volunteer` ids and the placeholder count.
///
/// Every id must exist in `volunteers`. Archived ones are accepted and
/// returned so the caller can warn about them.
fn build_pool<'a>(
    requested: &[VolunteerId],
    placeholders: usize,
    volunteers: &'a [Volunteer],
) -> Result<(VolunteerPool, Vec<&'a Volunteer>)> {
    let selected = dedupe(requested);
    let known: BTreeMap<_, _> = volunteers
        .iter()
        .filter_map(|v| v.id_vol.map(|id| (id, v)))
        .collect();
    let unknown: Vec<String> = selected
        .iter()
        .filter(|id| !known.contains_key(id))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        bail!("unknown volunteer(s): {}", unknown.join(", "));
    }
    let archived = selected
        .iter()
        .filter_map(|id| known.get(id).copied())
        .filter(|volunteer| volunteer.is_archived())
        .collect();

    let pool = VolunteerPool::new(selected, placeholders);
    if pool.is_empty() {
        bail!("nothing to book: pass --volunteer and/or --placeholders");
    }
    Ok((pool, archived))
}

/// Keeps the first occurrence of each id, in order.
fn dedupe(ids: &[VolunteerId]) -> Vec<VolunteerId> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if seen.insert(id) {
            unique.push(id);
        } else {
            warn!(volunteer_id = id, "volunteer listed twice, booking once");
        }
    }
    unique
}
