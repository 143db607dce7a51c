//! Cross-checks a record's claimed city/state against geocoded address text.
//!
//! Matching is token based rather than raw substring containment. The
//! geocoded text is split on commas into components (`"Pike Street"`,
//! `"Seattle"`, `"WA 98101"`), each component is tokenized on letters and
//! digits, and the claim must equal a whole component after dropping a
//! trailing ZIP (or ZIP+4) and, for the city, a trailing state abbreviation. This
//! rejects `"Miami"` inside `"Miami-Dade County"` and `"Virginia"` inside
//! `"West Virginia"`, and accepts `"FL"` against `"Florida"` through the
//! state table. It still misses spelling variants such as `"St. Louis"`
//! against `"Saint Louis"`.

use std::sync::LazyLock;

use clinicmap_core::StateTable;
use regex::Regex;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid regex"));

/// Outcome of one locality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalityMatch {
    pub city_match: bool,
    pub state_match: bool,
    pub issues: Vec<String>,
}

impl LocalityMatch {
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.city_match && self.state_match
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalityMatcher {
    states: StateTable,
}

impl LocalityMatcher {
    #[must_use]
    pub fn new(states: StateTable) -> Self {
        Self { states }
    }

    #[must_use]
    pub fn states(&self) -> &StateTable {
        &self.states
    }

    /// Compares the claimed locality with `geocoded_text`.
    ///
    /// A missing or blank claim never matches and produces a mismatch issue.
    #[must_use]
    pub fn match_locality(
        &self,
        claimed_city: Option<&str>,
        claimed_state: Option<&str>,
        geocoded_text: &str,
    ) -> LocalityMatch {
        let components: Vec<Vec<String>> = geocoded_text.split(',').map(tokenize).collect();
        let state_forms = claimed_state.map(|s| self.state_forms(s)).unwrap_or_default();

        let mut outcome = LocalityMatch::default();

        match non_blank(claimed_city) {
            Some(city) => {
                let wanted = tokenize(city);
                outcome.city_match = !wanted.is_empty()
                    && components
                        .iter()
                        .any(|c| city_core(c, &state_forms) == wanted.as_slice());
                if !outcome.city_match {
                    outcome.issues.push(format!(
                        "City mismatch: Expected {city}, but geocoded address suggests different city"
                    ));
                }
            }
            None => outcome
                .issues
                .push("City mismatch: record has no city to compare".to_string()),
        }

        match non_blank(claimed_state) {
            Some(state) => {
                outcome.state_match = components
                    .iter()
                    .any(|c| component_names_state(c, &state_forms));
                if !outcome.state_match {
                    outcome.issues.push(format!(
                        "State mismatch: Expected {state}, but geocoded address suggests different state"
                    ));
                }
            }
            None => outcome
                .issues
                .push("State mismatch: record has no state to compare".to_string()),
        }

        outcome
    }

    /// Token forms a claimed state may take in geocoded text: the full name
    /// and the postal abbreviation when the table knows the state, otherwise
    /// the claim itself.
    fn state_forms(&self, claimed: &str) -> Vec<StateForm> {
        match self.states.resolve(claimed) {
            Some((name, abbreviation)) => vec![
                StateForm {
                    tokens: tokenize(name),
                    abbreviated: false,
                },
                StateForm {
                    tokens: tokenize(abbreviation),
                    abbreviated: true,
                },
            ],
            None => {
                let tokens = tokenize(claimed);
                if tokens.is_empty() {
                    Vec::new()
                } else {
                    vec![StateForm {
                        tokens,
                        abbreviated: false,
                    }]
                }
            }
        }
    }
}

struct StateForm {
    tokens: Vec<String>,
    abbreviated: bool,
}

fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_postal_code(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_digits(token: &str, len: usize) -> bool {
    token.len() == len && is_postal_code(token)
}

/// Drops a trailing ZIP or ZIP+4. The tokenizer splits `33101-1234` into
/// `["33101", "1234"]`, so both halves go.
fn without_postal_code(component: &[String]) -> &[String] {
    match component {
        [rest @ .., zip, plus_four] if is_digits(zip, 5) && is_digits(plus_four, 4) => rest,
        [rest @ .., last] if is_postal_code(last) => rest,
        _ => component,
    }
}

/// `"WA 98101"` names Washington via its abbreviation; `"Washington"` names
/// it in full. A full name must fill the whole component, so `"Virginia"`
/// does not match `"West Virginia"`.
fn component_names_state(component: &[String], forms: &[StateForm]) -> bool {
    let component = without_postal_code(component);
    forms.iter().any(|form| {
        if form.abbreviated {
            component.ends_with(&form.tokens)
        } else {
            component == form.tokens.as_slice()
        }
    })
}

/// The component with any trailing ZIP code and state abbreviation removed,
/// so `"Miami FL 33101"` yields `["miami"]`.
fn city_core<'a>(component: &'a [String], forms: &[StateForm]) -> &'a [String] {
    let component = without_postal_code(component);
    forms
        .iter()
        .filter(|form| form.abbreviated)
        .find_map(|form| {
            component
                .strip_suffix(form.tokens.as_slice())
                .filter(|rest| !rest.is_empty())
        })
        .unwrap_or(component)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEATTLE: &str = "Pike Street, Downtown, Seattle, King County, Washington, 98101, United States";
    const MIAMI: &str = "100, Main Street, Miami, Miami-Dade County, Florida, 33101, United States";

    fn matcher() -> LocalityMatcher {
        LocalityMatcher::default()
    }

    #[test]
    fn matches_city_and_full_state_name() {
        let m = matcher().match_locality(Some("Miami"), Some("Florida"), MIAMI);
        assert!(m.is_match());
        assert!(m.issues.is_empty());
    }

    #[test]
    fn abbreviation_matches_full_name_in_text() {
        let m = matcher().match_locality(Some("miami"), Some("fl"), MIAMI);
        assert!(m.city_match);
        assert!(m.state_match);
    }

    #[test]
    fn full_name_matches_abbreviation_with_zip() {
        let m = matcher().match_locality(Some("Seattle"), Some("Washington"), "Seattle, WA 98101");
        assert!(m.is_match(), "{m:?}");
    }

    #[test]
    fn city_and_state_abbreviation_in_one_component() {
        let m = matcher().match_locality(Some("Miami"), Some("FL"), "100 Main St, Miami FL 33101");
        assert!(m.is_match(), "{m:?}");
    }

    #[test]
    fn zip_plus_four_is_dropped_like_a_plain_zip() {
        let m = matcher().match_locality(Some("Miami"), Some("FL"), "100 Main St, Miami, FL 33101-1234");
        assert!(m.is_match(), "{m:?}");

        let m = matcher().match_locality(Some("Miami"), Some("FL"), "100 Main St, Miami FL 33101-1234");
        assert!(m.is_match(), "{m:?}");
        assert!(m.issues.is_empty());
    }

    #[test]
    fn trailing_number_after_state_is_still_dropped() {
        let m = matcher().match_locality(Some("Seattle"), Some("WA"), "Seattle, WA 1234");
        assert!(m.is_match(), "{m:?}");
    }

    #[test]
    fn wrong_city_and_state_produce_two_issues() {
        let m = matcher().match_locality(Some("Miami"), Some("FL"), SEATTLE);
        assert!(!m.city_match);
        assert!(!m.state_match);
        assert_eq!(m.issues.len(), 2);
        assert!(m.issues[0].starts_with("City mismatch: Expected Miami"));
        assert!(m.issues[1].starts_with("State mismatch: Expected FL"));
    }

    #[test]
    fn city_inside_county_name_is_not_a_match() {
        let text = "1 Ocean Dr, Hialeah, Miami-Dade County, Florida, United States";
        let m = matcher().match_locality(Some("Miami"), Some("FL"), text);
        assert!(!m.city_match);
        assert!(m.state_match);
    }

    #[test]
    fn state_inside_longer_state_name_is_not_a_match() {
        let text = "Main Street, Charleston, Kanawha County, West Virginia, United States";
        let m = matcher().match_locality(Some("Charleston"), Some("VA"), text);
        assert!(m.city_match);
        assert!(!m.state_match);
    }

    #[test]
    fn matching_ignores_case_and_spacing() {
        let m = matcher().match_locality(Some("  new   YORK "), Some("new york"), "Broadway, New York, New York, 10001");
        assert!(m.is_match(), "{m:?}");
    }

    #[test]
    fn unknown_state_falls_back_to_literal_tokens() {
        let m = matcher().match_locality(Some("Toronto"), Some("Ontario"), "King St, Toronto, Ontario, Canada");
        assert!(m.is_match());
    }

    #[test]
    fn missing_claims_never_match() {
        let m = matcher().match_locality(None, Some("   "), MIAMI);
        assert!(!m.city_match);
        assert!(!m.state_match);
        assert_eq!(m.issues.len(), 2);
    }

    #[test]
    fn injected_table_drives_state_forms() {
        let table = StateTable::new([("Ontario", "ON")]);
        let m = LocalityMatcher::new(table).match_locality(Some("Toronto"), Some("ON"), "King St, Toronto, Ontario");
        assert!(m.is_match());
    }
}
