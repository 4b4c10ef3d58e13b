//! Parsing of `--slot DATE@HH:MM=COUNT` arguments.
//!
//! Missing date or time parts are kept as `None` so that slot validation
//! can report them per slot together with the other field errors.

use anyhow::{Context, Result, bail};

use vol_core::SlotDraft;
use vol_model::wire::{parse_date, parse_time};

pub fn parse_slot(raw: &str) -> Result<SlotDraft> {
    let (when, count) = raw
        .rsplit_once('=')
        .with_context(|| format!("slot `{raw}`: expected DATE@HH:MM=COUNT"))?;
    let volunteer_count: usize = count
        .trim()
        .parse()
        .with_context(|| format!("slot `{raw}`: invalid volunteer count `{count}`"))?;
    let (date, time) = match when.split_once('@') {
        Some((date, time)) => (date.trim(), time.trim()),
        None => (when.trim(), ""),
    };
    let date = if date.is_empty() {
        None
    } else {
        Some(parse_date(date).with_context(|| format!("slot `{raw}`"))?)
    };
    let time = if time.is_empty() {
        None
    } else {
        Some(parse_time(time).with_context(|| format!("slot `{raw}`"))?)
    };
    Ok(SlotDraft {
        date,
        time,
        volunteer_count,
    })
}

pub fn parse_slots(raw: &[String]) -> Result<Vec<SlotDraft>> {
    if raw.is_empty() {
        bail!("at least one --slot is required");
    }
    raw.iter().map(|slot| parse_slot(slot)).collect()
}
