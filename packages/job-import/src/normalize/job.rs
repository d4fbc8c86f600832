use chrono::Utc;
use uuid::Uuid;

use super::classify::{infer_category, infer_region, resolve};
use super::{ClassifierHints, FieldReader};
use crate::error::ValidationErrors;
use crate::types::{Job, JobCategory, Region, StructuredRecord};

const TITLE: &[&str] = &["title", "job_title", "position", "name"];
const COMPANY: &[&str] = &["company", "company_name", "employer", "organization", "organisation"];
const LOCATION: &[&str] = &["location", "city", "workplace", "place"];
const PHONE: &[&str] = &["contact_phone", "phone", "telephone", "contact.phone"];
const EMAIL: &[&str] = &["contact_email", "email", "contact.email"];
const DESCRIPTION: &[&str] = &["description", "job_description", "summary", "details"];
const START_DATE: &[&str] = &["start_date", "available_from", "availability", "date"];
const EMPLOYMENT_TYPE: &[&str] = &["employment_type", "contract_type", "job_type", "type"];
const CATEGORY: &[&str] = &["category", "sector"];
const REGION: &[&str] = &["region", "district"];

/// Build a [`Job`] from an untrusted record, or report every problem with it.
pub fn normalize_job(
    record: &StructuredRecord,
    source_url: &str,
    hints: &ClassifierHints,
) -> Result<Job, ValidationErrors> {
    let mut reader = FieldReader::new(record);

    let title = reader.required("title", TITLE);
    let company = reader.required("company", COMPANY);
    let location = reader.required("location", LOCATION);
    let contact_phone = reader.required("contact_phone", PHONE);
    let contact_email = reader.required("contact_email", EMAIL);
    let description = reader.required("description", DESCRIPTION);
    let start_date = reader.required("start_date", START_DATE);
    let employment_type = reader.required("employment_type", EMPLOYMENT_TYPE);

    let record_category = reader.optional_text(CATEGORY);
    let category = resolve(
        &[hints.category.as_deref(), record_category.as_deref()],
        JobCategory::parse,
        || infer_category(&title, &description),
    );
    let category = reader.classifier(
        "category",
        category,
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

    let requirements = reader.optional_list(&["requirements", "qualifications"]);
    let benefits = reader.optional_list(&["benefits", "perks"]);
    let languages = reader.optional_list(&["languages", "language_requirements"]);
    let remote = reader.optional_bool(&["remote", "remote_work", "is_remote"]);
    let salary_min = reader.optional_number(&["salary_min", "min_salary"]);
    let salary_max = reader.optional_number(&["salary_max", "max_salary"]);
    let hours_per_week = reader.optional_number(&["hours_per_week", "weekly_hours"]);
    let contact_name = reader.optional_text(&["contact_name", "contact_person", "contact.name"]);
    let website = reader.optional_text(&["website", "apply_url", "application_url"]);
    let application_deadline = reader.optional_text(&["application_deadline", "deadline"]);

    let (Some(category), Some(region)) = (category, region) else {
        return Err(reader.into_errors());
    };
    reader.finish()?;

    Ok(Job {
        id: Uuid::now_v7(),
        source_url: source_url.trim().to_string(),
        imported_at: Utc::now(),
        title,
        company,
        location,
        contact_phone,
        contact_email,
        description,
        start_date,
        employment_type,
        category,
        region,
        requirements,
        benefits,
        languages,
        remote,
        salary_min,
        salary_max,
        hours_per_week,
        contact_name,
        website,
        application_deadline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::job_record;
    use serde_json::json;

    const SOURCE: &str = "https://jobs.example.com/offer/42";

    fn normalize(value: serde_json::Value) -> Result<Job, ValidationErrors> {
        normalize_job(&StructuredRecord::new(value), SOURCE, &ClassifierHints::default())
    }

    #[test]
    fn test_complete_record_keeps_trimmed_values() {
        let mut value = job_record("  Cook  ", " Merano ");
        value["company"] = json!("\tHotel Adler\n");

        let job = normalize(value).unwrap();

        assert_eq!(job.title, "Cook");
        assert_eq!(job.company, "Hotel Adler");
        assert_eq!(job.location, "Merano");
        assert_eq!(job.contact_phone, "+39 0473 123456");
        assert_eq!(job.contact_email, "jobs@adler.example.com");
        assert_eq!(job.description, "Join our kitchen team for the summer season.");
        assert_eq!(job.start_date, "2024-05-01");
        assert_eq!(job.employment_type, "Seasonal");
        assert_eq!(job.category, JobCategory::Hospitality);
        assert_eq!(job.region, Region::Merano);
        assert_eq!(job.source_url, SOURCE);
    }

    #[test]
    fn test_reports_every_missing_field() {
        let value = json!({
            "title": "Cook",
            "location": "Merano",
            "description": "Kitchen work in a hotel",
            "contact_phone": "   "
        });

        let errors = normalize(value).unwrap_err();
        let fields = errors.fields();

        for expected in [
            "company",
            "contact_phone",
            "contact_email",
            "start_date",
            "employment_type",
        ] {
            assert!(fields.contains(&expected), "missing {expected} in {errors}");
            assert!(errors.to_string().contains(expected));
        }
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_blank_title_uses_next_alias() {
        let mut value = job_record("", "Merano");
        value["job_title"] = json!("Sous Chef");

        let job = normalize(value).unwrap();
        assert_eq!(job.title, "Sous Chef");
    }

    #[test]
    fn test_unknown_city_names_region() {
        let errors = normalize(job_record("Cook", "Unknown City")).unwrap_err();

        assert_eq!(errors.fields(), vec!["region"]);
        assert!(errors
            .to_string()
            .contains("region could not be resolved from location 'Unknown City'"));
    }

    #[test]
    fn test_uninferable_category_is_an_error() {
        let mut value = job_record("Team member", "Bolzano");
        value["description"] = json!("Great atmosphere.");

        let errors = normalize(value).unwrap_err();
        assert_eq!(errors.fields(), vec!["category"]);
    }

    #[test]
    fn test_explicit_values_win_when_valid() {
        let mut value = job_record("Cook", "Merano");
        value["category"] = json!("Retail");
        value["region"] = json!("atlantis");

        let job = normalize_job(
            &StructuredRecord::new(value),
            SOURCE,
            &ClassifierHints::default().with_region("brunico"),
        )
        .unwrap();

        // record's category is valid; hint region beats inference
        assert_eq!(job.category, JobCategory::Retail);
        assert_eq!(job.region, Region::Brunico);
    }

    #[test]
    fn test_invalid_explicit_value_falls_back_to_inference() {
        let job = normalize_job(
            &StructuredRecord::new(job_record("Cook", "Merano")),
            SOURCE,
            &ClassifierHints::default().with_category("Kitchen & Food"),
        )
        .unwrap();

        assert_eq!(job.category, JobCategory::Hospitality);
    }

    #[test]
    fn test_optional_coercion() {
        let mut value = job_record("Cook", "Merano");
        value["requirements"] = json!("HACCP, 2 years experience, ");
        value["benefits"] = json!(["Staff room", "Meals"]);
        value["languages"] = json!("");
        value["remote"] = json!("no");
        value["salary_min"] = json!("1800");
        value["salary_max"] = json!("depends");
        value["hours_per_week"] = json!(40);
        value["contact"] = json!({"name": "Anna Gruber"});

        let job = normalize(value).unwrap();

        assert_eq!(
            job.requirements,
            Some(vec!["HACCP".to_string(), "2 years experience".to_string()])
        );
        assert_eq!(
            job.benefits,
            Some(vec!["Staff room".to_string(), "Meals".to_string()])
        );
        assert_eq!(job.languages, None);
        assert_eq!(job.remote, Some(false));
        assert_eq!(job.salary_min, Some(1800.0));
        assert_eq!(job.salary_max, None);
        assert_eq!(job.hours_per_week, Some(40.0));
        assert_eq!(job.contact_name.as_deref(), Some("Anna Gruber"));
    }

    #[test]
    fn test_empty_optional_lists_are_not_serialized() {
        let mut value = job_record("Cook", "Merano");
        value["benefits"] = json!([]);

        let job = normalize(value).unwrap();
        let serialized = serde_json::to_value(&job).unwrap();

        assert!(serialized.get("benefits").is_none());
        assert!(serialized.get("requirements").is_none());
        assert_eq!(serialized["region"], json!("merano"));
    }

    #[test]
    fn test_nested_contact_fields() {
        let mut value = job_record("Cook", "Merano");
        let object = value.as_object_mut().unwrap();
        object.remove("contact_phone");
        object.remove("contact_email");
        object.insert(
            "contact".to_string(),
            json!({"phone": "0473 99 88 77", "email": "hr@example.com"}),
        );

        let job = normalize(value).unwrap();
        assert_eq!(job.contact_phone, "0473 99 88 77");
        assert_eq!(job.contact_email, "hr@example.com");
    }

    #[test]
    fn test_numeric_phone_is_accepted_as_text() {
        let mut value = job_record("Cook", "Merano");
        value["contact_phone"] = json!(390473123456u64);

        let job = normalize(value).unwrap();
        assert_eq!(job.contact_phone, "390473123456");
    }
}
