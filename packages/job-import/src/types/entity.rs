//! Persistence-ready domain entities.
//!
//! These are only ever built by [`crate::normalize`]; every required field
//! is present, trimmed and non-empty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::request::{JOB_TEMPLATE, SESSION_TEMPLATE};

/// Which entity a page is imported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    Session,
}

impl EntityKind {
    /// Named template the service uses for a single page of this kind.
    pub fn default_template(&self) -> &'static str {
        match self {
            Self::Job => JOB_TEMPLATE,
            Self::Session => SESSION_TEMPLATE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "job" | "jobs" => Ok(Self::Job),
            "session" | "sessions" | "event" => Ok(Self::Session),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

/// Job category classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Hospitality,
    Healthcare,
    Retail,
    Construction,
    Technology,
    Education,
    Logistics,
    Agriculture,
    Administration,
}

impl JobCategory {
    /// Declaration order is the inference tie-break order.
    pub const ALL: [JobCategory; 9] = [
        Self::Hospitality,
        Self::Healthcare,
        Self::Retail,
        Self::Construction,
        Self::Technology,
        Self::Education,
        Self::Logistics,
        Self::Agriculture,
        Self::Administration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospitality => "hospitality",
            Self::Healthcare => "healthcare",
            Self::Retail => "retail",
            Self::Construction => "construction",
            Self::Technology => "technology",
            Self::Education => "education",
            Self::Logistics => "logistics",
            Self::Agriculture => "agriculture",
            Self::Administration => "administration",
        }
    }

    /// Lowercase keywords (English, Italian, German stems).
    pub(crate) fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Hospitality => &[
                "hotel", "restaurant", "ristorante", "chef", "cook", "cuoco", "koch", "waiter",
                "cameriere", "kellner", "barista", "bartender", "reception", "housekeeping",
                "gastronom",
            ],
            Self::Healthcare => &[
                "nurse", "infermier", "pflege", "doctor", "medico", "arzt", "caregiver",
                "badante", "pharmac", "farmac", "health", "sanitari",
            ],
            Self::Retail => &[
                "sales", "shop", "store", "negozio", "commess", "verkäuf", "cashier", "cassier",
                "retail",
            ],
            Self::Construction => &[
                "construction", "edil", "carpenter", "falegname", "tischler", "electrician",
                "elettricista", "elektriker", "plumber", "idraulico", "installateur", "muratore",
                "maurer",
            ],
            Self::Technology => &[
                "developer", "software", "programm", "it support", "sviluppatore", "entwickler",
                "sistemist", "devops", "web design",
            ],
            Self::Education => &[
                "teacher", "insegnante", "lehrer", "tutor", "educat", "erzieh", "scuola",
                "schule",
            ],
            Self::Logistics => &[
                "driver", "autista", "fahrer", "warehouse", "magazzin", "lager", "logistic",
                "delivery", "consegn", "forklift",
            ],
            Self::Agriculture => &[
                "farm", "agricol", "landwirt", "harvest", "raccolta", "ernte", "vineyard",
                "vigneto", "orchard", "frutteto",
            ],
            Self::Administration => &[
                "office", "ufficio", "büro", "secretary", "segretari", "sekretär", "accountant",
                "contabil", "buchhalt", "administrative", "amministrativ", "verwaltung",
            ],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == needle)
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session topic classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTopic {
    JobFair,
    ApplicationSkills,
    Languages,
    DigitalSkills,
    Entrepreneurship,
    Orientation,
}

impl SessionTopic {
    pub const ALL: [SessionTopic; 6] = [
        Self::JobFair,
        Self::ApplicationSkills,
        Self::Languages,
        Self::DigitalSkills,
        Self::Entrepreneurship,
        Self::Orientation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobFair => "job_fair",
            Self::ApplicationSkills => "application_skills",
            Self::Languages => "languages",
            Self::DigitalSkills => "digital_skills",
            Self::Entrepreneurship => "entrepreneurship",
            Self::Orientation => "orientation",
        }
    }

    pub(crate) fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::JobFair => &[
                "job fair", "career day", "fiera del lavoro", "jobmesse", "recruiting day",
            ],
            Self::ApplicationSkills => &[
                "curriculum", "cv ", "lebenslauf", "interview", "colloquio",
                "vorstellungsgespräch", "application", "candidatura", "bewerbung",
            ],
            Self::Languages => &[
                "language", "lingua", "sprachkurs", "deutschkurs", "corso di italiano",
                "english course",
            ],
            Self::DigitalSkills => &[
                "digital", "computer", "excel", "informatica", "coding", "software",
            ],
            Self::Entrepreneurship => &[
                "startup", "start-up", "entrepreneur", "imprendit", "unternehm",
                "business plan", "self-employ",
            ],
            Self::Orientation => &[
                "orientation", "orientamento", "berufsberatung", "career guidance",
                "career advice",
            ],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == needle)
    }
}

impl fmt::Display for SessionTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region classifier, resolved from a location's city name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Bolzano,
    Merano,
    Bressanone,
    Brunico,
    Vipiteno,
    Venosta,
    Gardena,
    Laives,
}

impl Region {
    /// Declaration order is the tie-break order for ambiguous matches.
    pub const ALL: [Region; 8] = [
        Self::Bolzano,
        Self::Merano,
        Self::Bressanone,
        Self::Brunico,
        Self::Vipiteno,
        Self::Venosta,
        Self::Gardena,
        Self::Laives,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bolzano => "bolzano",
            Self::Merano => "merano",
            Self::Bressanone => "bressanone",
            Self::Brunico => "brunico",
            Self::Vipiteno => "vipiteno",
            Self::Venosta => "venosta",
            Self::Gardena => "gardena",
            Self::Laives => "laives",
        }
    }

    /// Lowercase city names (Italian and German) belonging to the region.
    pub(crate) fn cities(&self) -> &'static [&'static str] {
        match self {
            Self::Bolzano => &["bolzano", "bozen"],
            Self::Merano => &["merano", "meran", "lana", "scena", "schenna"],
            Self::Bressanone => &["bressanone", "brixen", "chiusa", "klausen"],
            Self::Brunico => &["brunico", "bruneck", "valdaora", "olang"],
            Self::Vipiteno => &["vipiteno", "sterzing"],
            Self::Venosta => &["silandro", "schlanders", "malles", "mals", "val venosta", "vinschgau"],
            Self::Gardena => &["ortisei", "st. ulrich", "selva di val gardena", "wolkenstein", "val gardena", "gröden"],
            Self::Laives => &["laives", "leifers"],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|r| r.as_str() == needle)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub source_url: String,
    pub imported_at: DateTime<Utc>,

    pub title: String,
    pub company: String,
    pub location: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub description: String,
    pub start_date: String,
    pub employment_type: String,

    pub category: JobCategory,
    pub region: Region,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
}

/// A training session, workshop or job fair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub source_url: String,
    pub imported_at: DateTime<Utc>,

    pub title: String,
    pub organizer: String,
    pub location: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub description: String,
    pub start_date: String,
    pub format: String,

    pub topic: SessionTopic,
    pub region: Region,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
}

/// Either entity, as handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedEntity {
    Job(Job),
    Session(Session),
}

impl NormalizedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Job(_) => EntityKind::Job,
            Self::Session(_) => EntityKind::Session,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Job(job) => job.id,
            Self::Session(session) => session.id,
        }
    }

    /// Provenance key used for upserts.
    pub fn source_url(&self) -> &str {
        match self {
            Self::Job(job) => &job.source_url,
            Self::Session(session) => &session.source_url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Job(job) => &job.title,
            Self::Session(session) => &session.title,
        }
    }
}

impl From<Job> for NormalizedEntity {
    fn from(job: Job) -> Self {
        Self::Job(job)
    }
}

impl From<Session> for NormalizedEntity {
    fn from(session: Session) -> Self {
        Self::Session(session)
    }
}
