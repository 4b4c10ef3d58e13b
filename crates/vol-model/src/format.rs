//! Display formatting for backend values.
//!
//! All formatters are total: input they do not recognise is returned
//! unchanged, so a new backend code shows up verbatim instead of failing.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde_json::Value;

use crate::appointment::RdvStatus;
use crate::phototype::Phototype;
use crate::wire::{parse_date, parse_time};

/// Placeholder shown for missing values.
pub const EMPTY: &str = "-";

/// `"III"` and `"3"` both give `Phototype III - Peau claire à mate`.
pub fn format_phototype(value: &str) -> String {
    if value.trim().is_empty() {
        return EMPTY.to_string();
    }
    match value.parse::<Phototype>() {
        Ok(phototype) => phototype.label(),
        Err(_) => value.to_string(),
    }
}

/// `"CONFIRME"` gives `Confirmé`; unknown codes pass through.
pub fn format_rdv_status(code: &str) -> String {
    RdvStatus::from_code(code).label().to_string()
}

pub fn format_sexe(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "" => EMPTY.to_string(),
        "M" | "H" | "HOMME" | "MASCULIN" => "Homme".to_string(),
        "F" | "FEMME" | "FEMININ" | "FÉMININ" => "Femme".to_string(),
        _ => code.to_string(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats an ISO date string (time suffix tolerated) as `DD/MM/YYYY`.
pub fn format_date_str(value: &str) -> String {
    if value.trim().is_empty() {
        return EMPTY.to_string();
    }
    parse_date(value).map_or_else(|_| value.to_string(), format_date)
}

pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| EMPTY.to_string(), format_date)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `"09:00:00"` gives `09:00`.
pub fn format_time_str(value: &str) -> String {
    if value.trim().is_empty() {
        return EMPTY.to_string();
    }
    parse_time(value).map_or_else(|_| value.to_string(), format_time)
}

pub fn format_opt_time(time: Option<NaiveTime>) -> String {
    time.map_or_else(|| EMPTY.to_string(), format_time)
}

/// Age in whole years on `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if today < birth {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Yes/no questionnaire answers in their display form.
pub fn format_yes_no(value: &Value) -> String {
    match value {
        Value::Null => EMPTY.to_string(),
        Value::Bool(true) => "Oui".to_string(),
        Value::Bool(false) => "Non".to_string(),
        Value::Number(number) => match number.as_i64() {
            Some(1) => "Oui".to_string(),
            Some(0) => "Non".to_string(),
            _ => number.to_string(),
        },
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "" => EMPTY.to_string(),
            "oui" | "true" | "1" | "yes" => "Oui".to_string(),
            "non" | "false" | "0" | "no" => "Non".to_string(),
            _ => text.clone(),
        },
        other => other.to_string(),
    }
}

/// `Option<&str>` fields, with [`EMPTY`] for missing or blank values.
pub fn or_empty(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phototype_spellings_share_a_label() {
        assert_eq!(format_phototype("III"), format_phototype("3"));
        assert_eq!(format_phototype("III"), "Phototype III - Peau claire à mate");
        assert_eq!(format_phototype("inconnu"), "inconnu");
        assert_eq!(format_phototype(""), EMPTY);
    }

    #[test]
    fn status_labels() {
        assert_eq!(format_rdv_status("CONFIRME"), "Confirmé");
        assert_eq!(format_rdv_status("PLANIFIE"), "Planifié");
        assert_eq!(format_rdv_status("ANNULE"), "Annulé");
        assert_eq!(format_rdv_status("COMPLETE"), "Complété");
        assert_eq!(format_rdv_status("EN_ATTENTE"), "EN_ATTENTE");
    }

    #[test]
    fn dates_and_times() {
        assert_eq!(format_date_str("2024-05-01T00:00:00"), "01/05/2024");
        assert_eq!(format_date_str("bientôt"), "bientôt");
        assert_eq!(format_time_str("09:00:00"), "09:00");
        assert_eq!(format_opt_time(None), EMPTY);
    }

    #[test]
    fn age_counts_whole_years() {
        let birth = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let on = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(age_on(birth, before), Some(33));
        assert_eq!(age_on(birth, on), Some(34));
        assert_eq!(age_on(on, birth), None);
    }

    #[test]
    fn yes_no_forms() {
        assert_eq!(format_yes_no(&json!("oui")), "Oui");
        assert_eq!(format_yes_no(&json!(0)), "Non");
        assert_eq!(format_yes_no(&json!(true)), "Oui");
        assert_eq!(format_yes_no(&json!("quotidien")), "quotidien");
        assert_eq!(format_sexe("f"), "Femme");
    }
}
