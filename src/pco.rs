//! Planning Center Services client.
//!
//! Only the handful of JSON:API endpoints the board needs: service types,
//! the next (or most recent) plan, its team members and its notes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::PcoError;
use crate::roster::{ServicePlan, TeamMember};
use crate::settings::AppSettings;

pub const BASE_URL: &str = "https://api.planningcenteronline.com/services/v2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: String,
    pub name: String,
}

/// Where plans come from. The board only ever talks to this seam.
#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn fetch_service_types(&self, settings: &AppSettings) -> Result<Vec<ServiceType>, PcoError>;

    /// `Ok(None)` when nothing is configured or the service type has no plans
    async fn fetch_plan(&self, settings: &AppSettings) -> Result<Option<ServicePlan>, PcoError>;
}

/// Routes a request through the configured proxy prefix, if any
pub fn proxy_url(url: &str, proxy: &str) -> String {
    let proxy = proxy.trim();
    let url = url.trim();
    if proxy.is_empty() {
        url.to_string()
    } else if proxy.ends_with('?') || proxy.ends_with('=') {
        format!("{}{}", proxy, urlencoding::encode(url))
    } else {
        format!("{}/{}", proxy, url)
    }
}

#[derive(Debug, Deserialize)]
struct Document<A> {
    #[serde(default)]
    data: Vec<Resource<A>>,
    #[serde(default)]
    included: Vec<Included>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    id: String,
    attributes: Option<A>,
    #[serde(default)]
    relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
struct Relationships {
    person: Option<Relationship>,
    team: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
struct ResourceRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Included {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    #[serde(default)]
    attributes: IncludedAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct IncludedAttributes {
    name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceTypeAttributes {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlanAttributes {
    dates: Option<String>,
    series_title: Option<String>,
    plan_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TeamMemberAttributes {
    team_position_name: Option<String>,
    position_name: Option<String>,
    team_name: Option<String>,
    name: Option<String>,
    first_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NoteAttributes {
    content: Option<String>,
}

/// First non-blank value in order
fn first_filled<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|v| !v.trim().is_empty())
}

impl Document<TeamMemberAttributes> {
    fn included(&self, kind: &str, id: Option<&str>) -> Option<&IncludedAttributes> {
        let id = id?;
        self.included
            .iter()
            .find(|inc| inc.kind == kind && inc.id == id)
            .map(|inc| &inc.attributes)
    }

    /// One `TeamMember` per membership record, falling back field by field
    fn team_members(&self) -> Vec<TeamMember> {
        let empty = TeamMemberAttributes::default();
        self.data
            .iter()
            .map(|item| {
                let attr = item.attributes.as_ref().unwrap_or(&empty);
                let person_ref = item.relationships.person.as_ref().and_then(|r| r.data.as_ref()).map(|d| d.id.as_str());
                let team_ref = item.relationships.team.as_ref().and_then(|r| r.data.as_ref()).map(|d| d.id.as_str());
                let person = self.included("Person", person_ref);
                let team = self.included("Team", team_ref);

                let team_name = first_filled([team.and_then(|t| t.name.as_deref()), attr.team_name.as_deref()])
                    .unwrap_or("Scheduled");
                let role = first_filled([attr.team_position_name.as_deref(), attr.position_name.as_deref()])
                    .unwrap_or(team_name);
                let name = first_filled([
                    person.and_then(|p| p.name.as_deref()),
                    attr.name.as_deref(),
                    attr.first_name.as_deref(),
                ])
                .unwrap_or("Unknown");

                TeamMember {
                    person_id: person_ref.unwrap_or(item.id.as_str()).to_string(),
                    name: name.to_string(),
                    role: Some(role.to_string()),
                    team: Some(team_name.to_string()),
                    photo_url: person.and_then(|p| p.photo_url.clone()).filter(|url| !url.is_empty()),
                }
            })
            .collect()
    }
}

/// HTTP client for the Planning Center Services API
#[derive(Debug, Clone)]
pub struct PcoClient {
    http: reqwest::Client,
    base_url: String,
}

impl PcoClient {
    pub fn new() -> Result<Self, PcoError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PcoError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        settings: &AppSettings,
        path: &str,
        context: &'static str,
    ) -> Result<T, PcoError> {
        let url = proxy_url(&format!("{}{}", self.base_url, path), &settings.cors_proxy);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .basic_auth(settings.pco_app_id.trim(), Some(settings.pco_secret.trim()))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PcoError::Status {
                context,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn plan_details(
        &self,
        settings: &AppSettings,
        plan: Resource<PlanAttributes>,
    ) -> Result<ServicePlan, PcoError> {
        let people_path = format!("/plans/{}/team_members?include=person,team&per_page=100", plan.id);
        let notes_path = format!("/plans/{}/notes?per_page=50", plan.id);

        let (people, notes) = tokio::join!(
            self.get::<Document<TeamMemberAttributes>>(settings, &people_path, "Plan people"),
            self.get::<Document<NoteAttributes>>(settings, &notes_path, "Plan notes"),
        );

        let people = people?.team_members();
        let notes = match notes {
            Ok(doc) => doc
                .data
                .into_iter()
                .map(|note| note.attributes.and_then(|a| a.content).unwrap_or_default())
                .collect(),
            Err(err) => {
                warn!(plan_id = %plan.id, error = %err, "notes unavailable, continuing without them");
                Vec::new()
            }
        };

        let attributes = plan.attributes.unwrap_or_default();
        Ok(ServicePlan {
            id: plan.id,
            date: attributes.dates.unwrap_or_default(),
            title: attributes.plan_title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Service".to_string()),
            series: attributes.series_title.filter(|s| !s.is_empty()).unwrap_or_else(|| "No Series".to_string()),
            people,
            notes,
        })
    }
}

#[async_trait]
impl PlanSource for PcoClient {
    async fn fetch_service_types(&self, settings: &AppSettings) -> Result<Vec<ServiceType>, PcoError> {
        if !settings.has_credentials() {
            return Ok(Vec::new());
        }

        let doc: Document<ServiceTypeAttributes> = self
            .get(settings, "/service_types?per_page=100", "Service types")
            .await?;

        Ok(doc
            .data
            .into_iter()
            .map(|item| ServiceType {
                name: item.attributes.and_then(|a| a.name).unwrap_or_default(),
                id: item.id,
            })
            .collect())
    }

    async fn fetch_plan(&self, settings: &AppSettings) -> Result<Option<ServicePlan>, PcoError> {
        let service_type = settings.service_type_id.trim();
        if !settings.has_credentials() || service_type.is_empty() {
            return Ok(None);
        }

        let upcoming: Document<PlanAttributes> = self
            .get(
                settings,
                &format!("/service_types/{}/plans?filter=future&order=sort_date&per_page=1", service_type),
                "Plan index",
            )
            .await?;

        let selected = match upcoming.data.into_iter().next() {
            Some(plan) => plan,
            None => {
                debug!(service_type, "no upcoming plan, falling back to the latest past plan");
                let past: Document<PlanAttributes> = self
                    .get(
                        settings,
                        &format!("/service_types/{}/plans?order=-sort_date&per_page=1", service_type),
                        "Plan index",
                    )
                    .await?;
                match past.data.into_iter().next() {
                    Some(plan) => plan,
                    None => return Ok(None),
                }
            }
        };

        let plan = self.plan_details(settings, selected).await?;
        info!(plan_id = %plan.id, people = plan.people.len(), notes = plan.notes.len(), "fetched plan");
        Ok(Some(plan))
    }
}
