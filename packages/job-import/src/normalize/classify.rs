//! Classifier resolution: explicit value first, inference second.
//!
//! Inference is a pure function of its input text. Ties go to the first
//! candidate in declaration order.

use crate::types::{JobCategory, Region, SessionTopic};

/// Accept `explicit` values in order if any parses, otherwise run `infer`.
pub(crate) fn resolve<T>(
    explicit: &[Option<&str>],
    parse: fn(&str) -> Option<T>,
    infer: impl FnOnce() -> Option<T>,
) -> Option<T> {
    explicit
        .iter()
        .flatten()
        .find_map(|value| parse(value))
        .or_else(infer)
}

/// Category by keyword: the title alone first, then title and description.
pub(crate) fn infer_category(title: &str, description: &str) -> Option<JobCategory> {
    by_keywords(&JobCategory::ALL, JobCategory::keywords, title, description)
}

pub(crate) fn infer_topic(title: &str, description: &str) -> Option<SessionTopic> {
    by_keywords(&SessionTopic::ALL, SessionTopic::keywords, title, description)
}

/// Region by city name: an exact match anywhere wins over substring matches.
pub(crate) fn infer_region(location: &str) -> Option<Region> {
    let needle = location.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    Region::ALL
        .into_iter()
        .find(|region| region.cities().iter().any(|city| *city == needle))
        .or_else(|| {
            Region::ALL
                .into_iter()
                .find(|region| region.cities().iter().any(|city| needle.contains(city)))
        })
}

fn by_keywords<T: Copy>(
    candidates: &[T],
    keywords: fn(&T) -> &'static [&'static str],
    title: &str,
    description: &str,
) -> Option<T> {
    // Trailing space lets keywords such as "cv " match at the end of a text
    let title = format!("{} ", title.to_lowercase());
    let combined = format!("{}{} ", title, description.to_lowercase());

    [title, combined].iter().find_map(|haystack| {
        candidates
            .iter()
            .copied()
            .find(|candidate| keywords(candidate).iter().any(|k| haystack.contains(k)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_exact_and_substring() {
        assert_eq!(infer_region("Merano"), Some(Region::Merano));
        assert_eq!(infer_region("  bozen "), Some(Region::Bolzano));
        assert_eq!(infer_region("Via Roma 12, 39012 Merano (BZ)"), Some(Region::Merano));
        assert_eq!(infer_region("Unknown City"), None);
        assert_eq!(infer_region(""), None);
    }

    #[test]
    fn test_region_german_names() {
        assert_eq!(infer_region("Brixen"), Some(Region::Bressanone));
        assert_eq!(infer_region("Sterzing"), Some(Region::Vipiteno));
        assert_eq!(infer_region("Lana"), Some(Region::Merano));
    }

    #[test]
    fn test_region_ambiguous_substring_takes_first_declared() {
        // Mentions both Bolzano and Merano; Bolzano is declared first
        assert_eq!(
            infer_region("Between Merano and Bolzano"),
            Some(Region::Bolzano)
        );
    }

    #[test]
    fn test_category_prefers_title() {
        let category = infer_category(
            "Delivery driver",
            "Deliver meals from our restaurant to customers.",
        );
        assert_eq!(category, Some(JobCategory::Logistics));
    }

    #[test]
    fn test_category_falls_back_to_description() {
        let category = infer_category("Team member wanted", "You will support our hotel reception.");
        assert_eq!(category, Some(JobCategory::Hospitality));
        assert_eq!(infer_category("Team member", "Great atmosphere."), None);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let first = infer_category("Cuoco / Koch", "Stagione estiva in hotel");
        for _ in 0..10 {
            assert_eq!(infer_category("Cuoco / Koch", "Stagione estiva in hotel"), first);
        }
    }

    #[test]
    fn test_topic_keyword_at_end_of_text() {
        assert_eq!(
            infer_topic("Write your CV", ""),
            Some(SessionTopic::ApplicationSkills)
        );
    }

    #[test]
    fn test_resolve_prefers_valid_explicit_value() {
        let inferred = || Some(Region::Bolzano);
        assert_eq!(
            resolve(&[Some("merano")], Region::parse, inferred),
            Some(Region::Merano)
        );
        assert_eq!(
            resolve(&[Some("atlantis"), Some("brunico")], Region::parse, inferred),
            Some(Region::Brunico)
        );
        assert_eq!(
            resolve(&[None, Some("atlantis")], Region::parse, inferred),
            Some(Region::Bolzano)
        );
    }
}
