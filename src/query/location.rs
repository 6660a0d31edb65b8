//! Location extraction from free-text queries.

/// Locations whose name appears in `query`.
///
/// `query` must already be lower-cased. A candidate matches when its full
/// lower-cased name is a substring of the query, or, for multi-word names,
/// when its first word is. Matches keep the order of `candidates` and are
/// deduplicated.
pub fn extract_locations(candidates: &[String], query: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for loc in candidates {
        if found.contains(loc) {
            continue;
        }
        if location_matches(loc, query) {
            found.push(loc.clone());
        }
    }
    found
}

fn location_matches(location: &str, query: &str) -> bool {
    let lowered = location.to_lowercase();
    if query.contains(lowered.as_str()) {
        return true;
    }
    let mut parts = lowered.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(first), Some(_)) => query.contains(first),
        _ => false,
    }
}

/// Hint returned when no location in the query could be recognised.
pub fn no_match_hint(available: &[String]) -> String {
    let sample: Vec<&str> = available.iter().take(3).map(String::as_str).collect();
    format!(
        "I couldn't identify any locations. Try asking about: {}...",
        sample.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["Koregaon Park".to_string(), "Wakad".to_string()]
    }

    #[test]
    fn full_name_match() {
        assert_eq!(
            extract_locations(&candidates(), "how is demand in koregaon park"),
            vec!["Koregaon Park"]
        );
    }

    #[test]
    fn single_word_match() {
        assert_eq!(
            extract_locations(&candidates(), "trend in wakad area"),
            vec!["Wakad"]
        );
    }

    #[test]
    fn first_token_of_multi_word_name() {
        assert_eq!(
            extract_locations(&candidates(), "prices around koregaon lately"),
            vec!["Koregaon Park"]
        );
    }

    #[test]
    fn no_match_is_empty() {
        assert!(extract_locations(&candidates(), "show me hinjewadi").is_empty());
    }

    #[test]
    fn several_locations_and_duplicates() {
        let mut cands = candidates();
        cands.push("Wakad".to_string());
        assert_eq!(
            extract_locations(&cands, "compare wakad and koregaon park"),
            vec!["Koregaon Park", "Wakad"]
        );
    }

    #[test]
    fn hint_lists_at_most_three() {
        let available: Vec<String> = ["Aundh", "Baner", "Wakad", "Hinjewadi"]
            .map(String::from)
            .to_vec();
        assert_eq!(
            no_match_hint(&available),
            "I couldn't identify any locations. Try asking about: Aundh, Baner, Wakad..."
        );
    }
}
