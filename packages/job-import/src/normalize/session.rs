use chrono::Utc;
use uuid::Uuid;

use super::classify::{infer_region, infer_topic, resolve};
use super::{ClassifierHints, FieldReader};
use crate::error::ValidationErrors;
use crate::types::{Region, Session, SessionTopic, StructuredRecord};

const TITLE: &[&str] = &["title", "session_title", "event_title", "name"];
const ORGANIZER: &[&str] = &["organizer", "organiser", "event_name", "host", "organization", "company"];
const LOCATION: &[&str] = &["location", "venue", "city", "place"];
const PHONE: &[&str] = &["contact_phone", "phone", "telephone", "contact.phone"];
const EMAIL: &[&str] = &["contact_email", "email", "contact.email"];
const DESCRIPTION: &[&str] = &["description", "summary", "details"];
const START_DATE: &[&str] = &["start_date", "date", "start", "event_date"];
const FORMAT: &[&str] = &["format", "session_type", "event_type", "type"];
const TOPIC: &[&str] = &["topic", "category"];
const REGION: &[&str] = &["region", "district"];

/// Build a [`Session`] from an untrusted record, or report every problem with it.
pub fn normalize_session(
    record: &StructuredRecord,
    source_url: &str,
    hints: &ClassifierHints,
) -> Result<Session, ValidationErrors> {
    let mut reader = FieldReader::new(record);

    let title = reader.required("title", TITLE);
    let organizer = reader.required("organizer", ORGANIZER);
    let location = reader.required("location", LOCATION);
    let contact_phone = reader.required("contact_phone", PHONE);
    let contact_email = reader.required("contact_email", EMAIL);
    let description = reader.required("description", DESCRIPTION);
    let start_date = reader.required("start_date", START_DATE);
    let format = reader.required("format", FORMAT);

    let record_topic = reader.optional_text(TOPIC);
    let topic = resolve(
        &[hints.category.as_deref(), record_topic.as_deref()],
        SessionTopic::parse,
        || infer_topic(&title, &description),
    );
    let topic = reader.classifier(
        "topic",
        topic,
        "could not be inferred from title or description".to_string(),
    );

    let record_region = reader.optional_text(REGION);
    let region = resolve(
        &[hints.region.as_deref(), record_region.as_deref()],
        Region::parse,
        || infer_region(&location),
    );
    let region = reader.classifier(
        "region",
        region,
        format!("could not be resolved from location '{}'", location),
    );

    let end_date = reader.optional_text(&["end_date", "end"]);
    let topics = reader.optional_list(&["topics", "tags"]);
    let target_audience = reader.optional_list(&["target_audience", "audience"]);
    let capacity = reader
        .optional_number(&["capacity", "seats", "max_participants"])
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32);
    let price = reader.optional_number(&["price", "cost", "fee"]);
    let is_free = reader.optional_bool(&["is_free", "free"]);
    let online = reader.optional_bool(&["online", "is_online", "virtual"]);
    let registration_url = reader.optional_text(&["registration_url", "signup_url", "register_url"]);

    let (Some(topic), Some(region)) = (topic, region) else {
        return Err(reader.into_errors());
    };
    reader.finish()?;

    Ok(Session {
        id: Uuid::now_v7(),
        source_url: source_url.trim().to_string(),
        imported_at: Utc::now(),
        title,
        organizer,
        location,
        contact_phone,
        contact_email,
        description,
        start_date,
        format,
        topic,
        region,
        end_date,
        topics,
        target_audience,
        capacity,
        price,
        is_free,
        online,
        registration_url,
    })
}
