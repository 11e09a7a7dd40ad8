//! Catalog construction from cached pages
//!
//! Walks the link frontier, extracts each institution's profile from its
//! cached pages, optionally geocodes the name, and inserts the institution
//! with its majors and location in one transaction.

use crate::cache::PageCache;
use crate::config::Config;
use crate::crawler::Fetcher;
use crate::extract::{extract_profile, InstitutionProfile, ProfilePages};
use crate::geo::{Coordinates, GeoResolver};
use crate::storage::{Institution, InstitutionRecord, Location, Storage};
use crate::url::{section_url, Section};
use crate::ScoutError;
use std::sync::Arc;

/// Summary of a catalog build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Institutions written to the catalog
    pub inserted: usize,
    /// Institutions whose name was already stored
    pub duplicates: usize,
    /// Institutions skipped because a required fact or page was missing
    pub skipped: usize,
    /// Inserted institutions that received coordinates
    pub geocoded: usize,
}

/// Builds the catalog from the frontier
pub struct CatalogBuilder {
    fetcher: Arc<Fetcher>,
    geocoder: Option<GeoResolver>,
}

impl CatalogBuilder {
    pub fn new(fetcher: Arc<Fetcher>, geocoder: Option<GeoResolver>) -> Self {
        Self { fetcher, geocoder }
    }

    /// Builds a catalog builder from configuration
    ///
    /// Without a `[geocoder]` section institutions are stored without
    /// coordinates.
    pub fn from_config(config: &Config, cache: Arc<PageCache>) -> Result<Self, ScoutError> {
        let fetcher = Arc::new(Fetcher::from_config(
            &config.crawler,
            &config.user_agent,
            cache,
        )?);
        let geocoder = config
            .geocoder
            .as_ref()
            .map(|geocoder| GeoResolver::from_config(Arc::clone(&fetcher), geocoder));

        Ok(Self::new(fetcher, geocoder))
    }

    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Inserts every frontier institution into the catalog
    ///
    /// Pages come from the cache when present and are fetched otherwise.
    /// An institution missing a required fact, or whose page answers with
    /// an HTTP error, is skipped with a warning. Transport failures abort
    /// the build.
    pub async fn build(&self, storage: &mut dyn Storage) -> Result<BuildReport, ScoutError> {
        let frontier = self.fetcher.cache().frontier()?;
        tracing::info!("Building catalog from {} institutions", frontier.len());

        let mut report = BuildReport::default();

        for institution_url in &frontier {
            let profile = match self.load_profile(institution_url).await {
                Ok(profile) => profile,
                Err(e @ (ScoutError::Parse(_) | ScoutError::Http { .. })) => {
                    tracing::warn!("Skipping {}: {}", institution_url, e);
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let coordinates = self.geocode(&profile.admissions.name).await?;
            let record = to_record(profile, coordinates);

            if storage.insert_institution(&record)? {
                report.inserted += 1;
                if coordinates.is_some() {
                    report.geocoded += 1;
                }
                tracing::debug!("Stored {}", record.institution.name);
            } else {
                report.duplicates += 1;
            }
        }

        tracing::info!(
            "Catalog built: {} inserted, {} duplicates, {} skipped, {} geocoded",
            report.inserted,
            report.duplicates,
            report.skipped,
            report.geocoded
        );

        Ok(report)
    }

    /// Deletes every catalog row, then builds again
    ///
    /// The page cache and frontier are left untouched.
    pub async fn rebuild(&self, storage: &mut dyn Storage) -> Result<BuildReport, ScoutError> {
        tracing::info!("Clearing catalog for rebuild");
        storage.clear_all()?;
        self.build(storage).await
    }

    /// Fetches the four profile pages and extracts them
    async fn load_profile(&self, institution_url: &str) -> Result<InstitutionProfile, ScoutError> {
        let pages = ProfilePages {
            admissions: self.fetcher.fetch(institution_url).await?,
            academics: self
                .fetcher
                .fetch(&section_url(institution_url, Section::Academics))
                .await?,
            tuition: self
                .fetcher
                .fetch(&section_url(institution_url, Section::Tuition))
                .await?,
            visiting: self
                .fetcher
                .fetch(&section_url(institution_url, Section::Visiting))
                .await?,
        };

        extract_profile(&pages)
    }

    /// Resolves coordinates, degrading lookup failures to `None`
    async fn geocode(&self, name: &str) -> Result<Option<Coordinates>, ScoutError> {
        let Some(geocoder) = &self.geocoder else {
            return Ok(None);
        };

        match geocoder.resolve(name).await {
            Ok(coordinates) => Ok(coordinates),
            Err(e @ ScoutError::Cache(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Geocoding {} failed: {}", name, e);
                Ok(None)
            }
        }
    }
}

fn to_record(profile: InstitutionProfile, coordinates: Option<Coordinates>) -> InstitutionRecord {
    let name = profile.admissions.name;
    let address = profile.address;

    InstitutionRecord {
        institution: Institution {
            name: name.clone(),
            acceptance_rate: profile.admissions.acceptance_rate,
            tuition: profile.tuition,
            average_gpa: profile.admissions.average_gpa,
            latitude: coordinates.map(|c| c.lat),
            longitude: coordinates.map(|c| c.lng),
        },
        majors: profile.majors,
        location: Location {
            institution_name: name,
            street_address: address.street_address,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
        },
    }
}
