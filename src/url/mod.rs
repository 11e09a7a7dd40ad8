//! URL handling module for College-Scout
//!
//! This module builds the canonical URLs used as cache keys: listing pages,
//! institution base pages, and the section views hanging off each institution.

mod canonical;

pub use canonical::{
    institution_url, is_institution_href, listing_url, resolve_next_listing, section_url,
};

/// Sections of an institution profile, each addressed by a fixed fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Academics,
    Tuition,
    StudentBody,
    Visiting,
}

impl Section {
    /// All sections in fetch order
    pub const ALL: [Section; 4] = [
        Section::Academics,
        Section::Tuition,
        Section::StudentBody,
        Section::Visiting,
    ];

    /// The fragment suffix appended to the institution base URL
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Academics => "#!academics",
            Self::Tuition => "#!tuition",
            Self::StudentBody => "#!studentbody",
            Self::Visiting => "#!visiting",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Academics => "academics",
            Self::Tuition => "tuition",
            Self::StudentBody => "studentbody",
            Self::Visiting => "visiting",
        };
        write!(f, "{}", name)
    }
}
