// Sites service: site list, detail lookup with sample fallback, and
// creating or patching sites.

use serde::Deserialize;

use super::{fallback, DataOrigin, Loaded};
use crate::dates::parse_iso_date;
use crate::error::{Advisory, FieldOpsError, Result};
use crate::sample::sample_sites;
use crate::source::{DataSource, SourceKind};
use crate::types::{Coordinates, ServiceFrequency, Site, SitePatch, SiteStatus};

pub const SITES_FALLBACK_MESSAGE: &str =
    "Unable to load sites from Firestore. Showing sample data instead.";
pub const SITE_NOT_FOUND_MESSAGE: &str = "Site not found in Firestore.";
pub const SITE_FALLBACK_MESSAGE: &str =
    "Unable to load site from Firestore. Showing sample data when available.";

pub async fn list_sites(source: &dyn DataSource) -> Loaded<Vec<Site>> {
    let result = source.list_sites().await;
    fallback(source.kind(), "sites", result, sample_sites, SITES_FALLBACK_MESSAGE)
}

fn sample_site(id: &str) -> Option<Site> {
    sample_sites().into_iter().find(|s| s.id == id)
}

fn sample_origin(site: &Option<Site>, kind: SourceKind) -> DataOrigin {
    if site.is_some() {
        DataOrigin::Sample
    } else {
        kind.into()
    }
}

/// Look up one site for the detail page.
///
/// A site missing from the live store, or a failed read, falls back to the
/// sample site with the same id when there is one.
pub async fn site_detail(source: &dyn DataSource, id: &str) -> Loaded<Option<Site>> {
    let kind = source.kind();
    match source.get_site(id).await {
        Ok(Some(site)) => Loaded {
            data: Some(site),
            origin: kind.into(),
            advisory: None,
        },
        Ok(None) if kind == SourceKind::Sample => Loaded::sample(None),
        Ok(None) => {
            let site = sample_site(id);
            Loaded {
                origin: sample_origin(&site, kind),
                data: site,
                advisory: Some(Advisory::not_found(SITE_NOT_FOUND_MESSAGE)),
            }
        }
        Err(e) if e.is_not_configured() => Loaded::sample(sample_site(id)),
        Err(e) => {
            log::warn!("Failed to fetch site {id}: {e}");
            let site = sample_site(id);
            Loaded {
                origin: sample_origin(&site, kind),
                data: site,
                advisory: Some(Advisory::read_fallback(SITE_FALLBACK_MESSAGE)),
            }
        }
    }
}

/// Input for a new site, as captured by the add-site form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSite {
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub service_frequency: ServiceFrequency,
    pub notes: String,
    pub next_visit: String,
    pub status: SiteStatus,
}

impl NewSite {
    /// Trim every field and check the few that must hold a value.
    ///
    /// New sites start at coordinates (0, 0) with no active tasks.
    pub fn into_site(self) -> Result<Site> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(FieldOpsError::Validation("Site name is required.".to_string()));
        }
        let next_visit = self.next_visit.trim().to_string();
        if !next_visit.is_empty() {
            parse_iso_date(&next_visit)?;
        }
        Ok(Site {
            name,
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            contact_phone: self.contact_phone.trim().to_string(),
            service_frequency: self.service_frequency,
            notes: self.notes.trim().to_string(),
            next_visit,
            status: self.status,
            coordinates: Coordinates::default(),
            active_tasks: 0,
            ..Default::default()
        })
    }
}

pub async fn create_site(source: &dyn DataSource, new_site: NewSite) -> Result<Site> {
    let site = new_site.into_site()?;
    match source.create_site(site).await {
        Ok(created) => {
            log::info!("Created site {} ({})", created.id, created.name);
            Ok(created)
        }
        Err(e) => {
            log::error!("Failed to create site: {e}");
            Err(e)
        }
    }
}

pub async fn update_site(source: &dyn DataSource, id: &str, patch: &SitePatch) -> Result<()> {
    if let Some(ref next_visit) = patch.next_visit {
        parse_iso_date(next_visit)?;
    }
    source.update_site(id, patch).await.inspect_err(|e| {
        log::error!("Failed to update site {id}: {e}");
    })
}
