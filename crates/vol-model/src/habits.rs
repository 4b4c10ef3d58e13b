//! Cosmetic-habits questionnaire (`habitudes cosmétiques`).
//!
//! The backend record is a wide, flat object of yes/no and categorical
//! answers keyed by field name. The client keeps it as a map and relies on
//! a static catalog to group fields by product category for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::volunteer::VolunteerId;

/// A volunteer's cosmetic-habits record, one-to-one with the volunteer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticHabits {
    pub id_vol: VolunteerId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// A product category and the questionnaire fields that belong to it.
#[derive(Debug, Clone, Copy)]
pub struct HabitCategory {
    pub label: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

/// Category label used for fields absent from [`HABIT_CATALOG`].
pub const OTHER_CATEGORY: &str = "Autres";

pub const HABIT_CATALOG: &[HabitCategory] = &[
    HabitCategory {
        label: "Soins du visage",
        fields: &[
            ("demaquillant", "Démaquillant"),
            ("nettoyantVisage", "Nettoyant visage"),
            ("lotionTonique", "Lotion tonique"),
            ("serum", "Sérum"),
            ("cremeJour", "Crème de jour"),
            ("cremeNuit", "Crème de nuit"),
            ("contourYeux", "Contour des yeux"),
            ("masqueVisage", "Masque visage"),
            ("gommageVisage", "Gommage visage"),
        ],
    },
    HabitCategory {
        label: "Soins du corps",
        fields: &[
            ("laitCorps", "Lait corporel"),
            ("huileCorps", "Huile corporelle"),
            ("cremeMains", "Crème mains"),
            ("cremePieds", "Crème pieds"),
            ("gommageCorps", "Gommage corps"),
            ("anticellulite", "Anticellulite"),
        ],
    },
    HabitCategory {
        label: "Maquillage",
        fields: &[
            ("fondTeint", "Fond de teint"),
            ("poudre", "Poudre"),
            ("blush", "Blush"),
            ("mascara", "Mascara"),
            ("eyeliner", "Eye-liner"),
            ("fardPaupieres", "Fard à paupières"),
            ("rougeLevres", "Rouge à lèvres"),
            ("vernisOngles", "Vernis à ongles"),
        ],
    },
    HabitCategory {
        label: "Soins capillaires",
        fields: &[
            ("shampooing", "Shampooing"),
            ("apresShampooing", "Après-shampooing"),
            ("masqueCapillaire", "Masque capillaire"),
            ("coloration", "Coloration"),
            ("permanente", "Permanente"),
            ("lissage", "Lissage"),
        ],
    },
    HabitCategory {
        label: "Protection solaire",
        fields: &[
            ("protectionSolaireVisage", "Protection solaire visage"),
            ("protectionSolaireCorps", "Protection solaire corps"),
            ("autobronzant", "Autobronzant"),
            ("expositionSoleil", "Exposition au soleil"),
        ],
    },
    HabitCategory {
        label: "Hygiène",
        fields: &[
            ("gelDouche", "Gel douche"),
            ("savon", "Savon"),
            ("deodorant", "Déodorant"),
            ("parfum", "Parfum"),
            ("rasage", "Rasage"),
            ("epilation", "Épilation"),
        ],
    },
];

/// Display label of a questionnaire field, if the catalog knows it.
pub fn habit_label(key: &str) -> Option<&'static str> {
    HABIT_CATALOG
        .iter()
        .flat_map(|category| category.fields)
        .find(|(field, _)| *field == key)
        .map(|(_, label)| *label)
}

/// One answered field, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitAnswer {
    pub key: String,
    pub label: String,
    pub value: Value,
}

/// Answers grouped under one category label.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitGroup {
    pub category: String,
    pub answers: Vec<HabitAnswer>,
}

impl CosmeticHabits {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Groups the answered fields by catalog category, in catalog order.
    ///
    /// Null and empty answers are skipped. Fields unknown to the catalog end
    /// up in a trailing [`OTHER_CATEGORY`] group, sorted by key.
    pub fn grouped(&self) -> Vec<HabitGroup> {
        let mut groups = Vec::new();
        let mut cataloged = std::collections::BTreeSet::new();
        for category in HABIT_CATALOG {
            let mut answers = Vec::new();
            for (key, label) in category.fields {
                cataloged.insert(*key);
                if let Some(value) = self.fields.get(*key).filter(|v| is_answered(v)) {
                    answers.push(HabitAnswer {
                        key: (*key).to_string(),
                        label: (*label).to_string(),
                        value: value.clone(),
                    });
                }
            }
            if !answers.is_empty() {
                groups.push(HabitGroup {
                    category: category.label.to_string(),
                    answers,
                });
            }
        }
        let others: Vec<HabitAnswer> = self
            .fields
            .iter()
            .filter(|(key, value)| !cataloged.contains(key.as_str()) && is_answered(value))
            .filter(|(key, _)| !is_bookkeeping(key))
            .map(|(key, value)| HabitAnswer {
                key: key.clone(),
                label: key.clone(),
                value: value.clone(),
            })
            .collect();
        if !others.is_empty() {
            groups.push(HabitGroup {
                category: OTHER_CATEGORY.to_string(),
                answers: others,
            });
        }
        groups
    }
}

fn is_answered(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    }
}

fn is_bookkeeping(key: &str) -> bool {
    matches!(key, "idHc" | "createdAt" | "updatedAt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn groups_by_catalog_order_and_collects_unknown_fields() {
        let habits: CosmeticHabits = serde_json::from_value(json!({
            "idVol": 5,
            "idHc": 99,
            "mascara": "oui",
            "cremeJour": "non",
            "serum": "",
            "marqueFavorite": "Acme",
            "parfum": null
        }))
        .unwrap();
        let groups = habits.grouped();
        let labels: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(labels, vec!["Soins du visage", "Maquillage", OTHER_CATEGORY]);
        assert_eq!(groups[0].answers.len(), 1);
        assert_eq!(groups[0].answers[0].label, "Crème de jour");
        assert_eq!(groups[2].answers[0].key, "marqueFavorite");
    }

    #[test]
    fn labels_come_from_the_catalog() {
        assert_eq!(habit_label("cremeJour"), Some("Crème de jour"));
        assert_eq!(habit_label("marqueFavorite"), None);
    }
}
