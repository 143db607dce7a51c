//! Bidirectional US state name ↔ postal abbreviation lookup.

use std::collections::HashMap;

/// `(full name, postal abbreviation)` for the 50 states, DC and Puerto Rico.
pub const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Case-insensitive state lookup built from a `(name, abbreviation)` table.
///
/// Keys are stored lower-cased with internal whitespace collapsed, so
/// `"new  york"`, `"New York"` and `"NY"` all resolve to the same entry.
#[derive(Debug, Clone)]
pub struct StateTable {
    by_name: HashMap<String, usize>,
    by_abbreviation: HashMap<String, usize>,
    entries: Vec<(String, String)>,
}

impl StateTable {
    pub fn new<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self {
            by_name: HashMap::new(),
            by_abbreviation: HashMap::new(),
            entries: Vec::new(),
        };
        for (name, abbreviation) in entries {
            let idx = table.entries.len();
            table.by_name.insert(normalize_key(name), idx);
            table
                .by_abbreviation
                .insert(normalize_key(abbreviation), idx);
            table
                .entries
                .push((name.to_string(), abbreviation.to_uppercase()));
        }
        table
    }

    #[must_use]
    pub fn us() -> Self {
        Self::new(US_STATES.iter().copied())
    }

    /// Postal abbreviation for a full state name.
    #[must_use]
    pub fn abbreviation(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(&normalize_key(name))
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Full state name for a postal abbreviation.
    #[must_use]
    pub fn full_name(&self, abbreviation: &str) -> Option<&str> {
        self.by_abbreviation
            .get(&normalize_key(abbreviation))
            .map(|&idx| self.entries[idx].0.as_str())
    }

    /// Resolves either form to `(full name, abbreviation)`.
    #[must_use]
    pub fn resolve(&self, state: &str) -> Option<(&str, &str)> {
        let key = normalize_key(state);
        self.by_abbreviation
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .map(|&idx| {
                let (name, abbr) = &self.entries[idx];
                (name.as_str(), abbr.as_str())
            })
    }

    /// Canonical postal abbreviation for either form, falling back to the
    /// trimmed input upper-cased when the state is unknown.
    #[must_use]
    pub fn canonical(&self, state: &str) -> String {
        self.resolve(state).map_or_else(
            || state.trim().to_uppercase(),
            |(_, abbr)| abbr.to_string(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::us()
    }
}

fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
