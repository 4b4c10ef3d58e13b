//! Search, sort and pagination over already-fetched lists.
//!
//! The backend returns whole collections; narrowing them down for display
//! happens here. Search is a case- and accent-insensitive substring match
//! against a per-item haystack.

use std::cmp::Ordering;

use vol_model::{Appointment, Study, Volunteer};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Sortable columns shared by the list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
    FirstName,
    Date,
    Status,
}

/// Items that can be searched and sorted in a list view.
pub trait Listable {
    /// Text the search query is matched against.
    fn haystack(&self) -> String;

    /// Compares two items on `key`. Keys that do not apply compare equal.
    fn compare(&self, other: &Self, key: SortKey) -> Ordering;
}

/// Which volunteers to show with respect to the archive flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveFilter {
    #[default]
    ActiveOnly,
    ArchivedOnly,
    All,
}

impl ArchiveFilter {
    pub fn keeps(&self, volunteer: &Volunteer) -> bool {
        match self {
            ArchiveFilter::ActiveOnly => !volunteer.is_archived(),
            ArchiveFilter::ArchivedOnly => volunteer.is_archived(),
            ArchiveFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            descending: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching items across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl ListQuery {
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, key: SortKey, descending: bool) -> Self {
        self.sort = Some(key);
        self.descending = descending;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.max(1);
        self
    }

    /// Filters, sorts (stable) and paginates `items`.
    pub fn apply<T: Listable>(&self, items: Vec<T>) -> Page<T> {
        let needle = self
            .search
            .as_deref()
            .map(fold)
            .filter(|needle| !needle.is_empty());
        let mut matching: Vec<T> = match needle {
            Some(needle) => items
                .into_iter()
                .filter(|item| fold(&item.haystack()).contains(&needle))
                .collect(),
            None => items,
        };
        if let Some(key) = self.sort {
            matching.sort_by(|a, b| {
                let ordering = a.compare(b, key);
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        let total = matching.len();
        let page_size = self.page_size.max(1);
        let page = self.page.max(1);
        let page_count = total.div_ceil(page_size);
        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Page {
            items,
            total,
            page,
            page_count,
        }
    }
}

/// Lowercases and strips French diacritics.
pub fn fold(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
            'ç' => 'c',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' | 'ì' => 'i',
            'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ÿ' => 'y',
            other => other,
        })
        .collect()
}

fn cmp_folded(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b))
}

impl Listable for Volunteer {
    fn haystack(&self) -> String {
        let mut parts = vec![self.nom.clone(), self.prenom.clone()];
        if let Some(id) = self.id_vol {
            parts.push(id.to_string());
        }
        parts.extend(self.email.clone());
        parts.extend(self.tel_portable.clone());
        parts.extend(self.ville.clone());
        parts.join(" ")
    }

    fn compare(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Id => self.id_vol.cmp(&other.id_vol),
            SortKey::Name => cmp_folded(&self.nom, &other.nom)
                .then_with(|| cmp_folded(&self.prenom, &other.prenom)),
            SortKey::FirstName => cmp_folded(&self.prenom, &other.prenom),
            SortKey::Date => self.date_naissance.cmp(&other.date_naissance),
            SortKey::Status => self.archive.cmp(&other.archive),
        }
    }
}

impl Listable for Study {
    fn haystack(&self) -> String {
        let mut parts = vec![self.reference.clone(), self.titre.clone()];
        parts.extend(self.kind.clone());
        parts.join(" ")
    }

    fn compare(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Id => self.id_etude.cmp(&other.id_etude),
            SortKey::Name => cmp_folded(&self.reference, &other.reference),
            SortKey::FirstName => cmp_folded(&self.titre, &other.titre),
            SortKey::Date => self.date_debut.cmp(&other.date_debut),
            SortKey::Status => Ordering::Equal,
        }
    }
}

impl Listable for Appointment {
    fn haystack(&self) -> String {
        let mut parts = vec![
            self.id_etude.to_string(),
            self.id_rdv.to_string(),
            self.etat.code().to_string(),
            self.etat.label().to_string(),
        ];
        if let Some(id) = self.id_volontaire {
            parts.push(id.to_string());
        }
        parts.extend(self.commentaires.clone());
        parts.join(" ")
    }

    fn compare(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Id => self.key().cmp(&other.key()),
            SortKey::Date => (self.date, self.heure).cmp(&(other.date, other.heure)),
            SortKey::Status => self.etat.code().cmp(other.etat.code()),
            SortKey::Name | SortKey::FirstName => self.id_volontaire.cmp(&other.id_volontaire),
        }
    }
}
