//! Keyword matcher — scores and filters raw listings against expanded skill
//! terms. Pure functions, no I/O.

use std::collections::HashMap;

use crate::matching::skill_expander::ExpandedSkillMap;
use crate::models::job::{MatchedListing, RawListing};

/// Minimum number of distinct skills that must match for a listing to pass.
pub const DEFAULT_MIN_SKILL_MATCHES: usize = 3;

/// Cap on the ranked output.
pub const MAX_MATCHED_LISTINGS: usize = 100;

/// Returns, per skill, the related terms occurring as case-insensitive
/// substrings of the description. Skills with no matching term are absent.
pub fn matched_terms(
    description: &str,
    expanded: &ExpandedSkillMap,
) -> HashMap<String, Vec<String>> {
    let description_lower = description.to_lowercase();
    let mut matched = HashMap::new();

    for (skill, related_terms) in expanded {
        let hits: Vec<String> = related_terms
            .iter()
            .filter(|term| {
                !term.trim().is_empty() && description_lower.contains(&term.to_lowercase())
            })
            .cloned()
            .collect();

        if !hits.is_empty() {
            matched.insert(skill.clone(), hits);
        }
    }

    matched
}

/// Filters listings to those matching at least `min_skill_matches` distinct
/// skills, ranks them by total term matches descending, and caps the result.
///
/// The sort key deliberately counts term matches rather than distinct skills:
/// the threshold already gates on skill coverage, so ranking rewards listings
/// that mention more of the user's vocabulary.
pub fn filter_listings(
    listings: Vec<RawListing>,
    expanded: &ExpandedSkillMap,
    min_skill_matches: usize,
) -> Vec<MatchedListing> {
    let mut matched_listings: Vec<MatchedListing> = listings
        .into_iter()
        .filter_map(|listing| {
            let matched = matched_terms(&listing.description, expanded);
            if matched.len() < min_skill_matches {
                return None;
            }
            let match_count = matched.values().map(Vec::len).sum();
            Some(MatchedListing {
                listing,
                matched_terms: matched,
                match_count,
            })
        })
        .collect();

    matched_listings.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    matched_listings.truncate(MAX_MATCHED_LISTINGS);
    matched_listings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(description: &str) -> RawListing {
        RawListing {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            company_url: String::new(),
            location: String::new(),
            description: description.to_string(),
            url: String::new(),
            date_posted: String::new(),
            job_type: String::new(),
            salary: String::new(),
            remote: false,
        }
    }

    fn fixture_map() -> ExpandedSkillMap {
        ExpandedSkillMap::from([
            (
                "Python".to_string(),
                vec!["python".to_string(), "py".to_string()],
            ),
            ("SQL".to_string(), vec!["sql".to_string()]),
            ("Docker".to_string(), vec!["docker".to_string()]),
        ])
    }

    #[test]
    fn test_two_of_three_skills_is_excluded_at_threshold_three() {
        let listings = vec![listing("We use python and sql daily.")];
        let result = filter_listings(listings, &fixture_map(), 3);
        assert!(result.is_empty());
    }

    #[test]
    fn test_all_three_skills_is_included_at_threshold_three() {
        let listings = vec![listing("python, sql and docker experience required")];
        let result = filter_listings(listings, &fixture_map(), 3);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].matched_terms.len(), 3);
    }

    #[test]
    fn test_match_count_sums_term_matches_not_distinct_skills() {
        // "python" and "py" both occur ("py" is a substring of "python"),
        // plus "sql" and "docker": 4 term matches across 3 skills.
        let listings = vec![listing("python sql docker")];
        let result = filter_listings(listings, &fixture_map(), 3);
        assert_eq!(result[0].match_count, 4);
    }

    #[test]
    fn test_ranking_is_descending_by_match_count() {
        let expanded = ExpandedSkillMap::from([
            ("A".to_string(), vec!["alpha".to_string(), "alef".to_string()]),
            ("B".to_string(), vec!["beta".to_string()]),
        ]);
        let listings = vec![
            listing("alpha beta"),
            listing("alpha alef beta"),
        ];
        let result = filter_listings(listings, &expanded, 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].match_count, 3);
        assert_eq!(result[1].match_count, 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let listings = vec![listing("PYTHON, Sql and DoCkEr")];
        let result = filter_listings(listings, &fixture_map(), 3);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_output_capped_at_limit() {
        let expanded = ExpandedSkillMap::from([("A".to_string(), vec!["alpha".to_string()])]);
        let listings: Vec<RawListing> = (0..150).map(|_| listing("alpha")).collect();
        let result = filter_listings(listings, &expanded, 1);
        assert_eq!(result.len(), MAX_MATCHED_LISTINGS);
    }

    #[test]
    fn test_matched_terms_skips_unmatched_skills() {
        let matched = matched_terms("we love sql here", &fixture_map());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched["SQL"], vec!["sql".to_string()]);
    }
}
