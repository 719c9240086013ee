//! Turns a free-text term into exactly one location.
//!
//! Match: case-insensitive substring of the term in every metro, county and
//! state name. Narrowing, in order:
//!   one match → it
//!   single namespace, exactly one name starting with the term → it
//!   metros together with counties or states → ambiguous
//!   only metros, or only counties (states aside) → the sole one, or the sole
//!     name starting with the term
//!   only states → the state whose name equals the term
//!   anything else → ambiguous

use super::tables::NameTables;
use super::types::{LocationDescriptor, LocationKind, ResolveError};

/// Resolves search terms against a set of name tables.
pub struct LocationResolver<'a> {
    tables: &'a NameTables,
}

impl<'a> LocationResolver<'a> {
    pub fn new(tables: &'a NameTables) -> Self {
        Self { tables }
    }

    /// Every entry whose name contains `term`, case-insensitively,
    /// in metro, county, state order.
    pub fn search(&self, term: &str) -> Vec<LocationDescriptor> {
        let needle = term.to_lowercase();
        LocationKind::ALL
            .iter()
            .flat_map(|kind| {
                let needle = &needle;
                self.tables
                    .entries(*kind)
                    .iter()
                    .filter(move |(_, name)| name.to_lowercase().contains(needle.as_str()))
                    .map(move |(code, name)| LocationDescriptor::new(*kind, code.as_str(), name.as_str()))
            })
            .collect()
    }

    /// Resolve a term to a single location.
    pub fn resolve(&self, term: &str) -> Result<LocationDescriptor, ResolveError> {
        let mut matches = self.search(term);

        match matches.len() {
            0 => return Err(ResolveError::NotFound { term: term.to_string() }),
            1 => return Ok(matches.remove(0)),
            _ => {}
        }

        let single_kind = matches.iter().all(|m| m.kind == matches[0].kind);
        if single_kind {
            if let Some(m) = sole_prefixed(&matches, term) {
                return Ok(m.clone());
            }
        }

        let of_kind = |kind: LocationKind| -> Vec<&LocationDescriptor> {
            matches.iter().filter(|m| m.kind == kind).collect()
        };
        let metros = of_kind(LocationKind::Metro);
        let counties = of_kind(LocationKind::County);
        let states = of_kind(LocationKind::State);

        let resolved = if !metros.is_empty() && (!counties.is_empty() || !states.is_empty()) {
            None
        } else if !metros.is_empty() {
            narrow(&metros, term)
        } else if !counties.is_empty() {
            narrow(&counties, term)
        } else {
            let exact: Vec<&LocationDescriptor> = states
                .iter()
                .copied()
                .filter(|s| s.name.to_lowercase() == term.to_lowercase())
                .collect();
            match exact.as_slice() {
                [only] => Some(*only),
                _ => None,
            }
        };

        match resolved.cloned() {
            Some(m) => Ok(m),
            None => Err(ResolveError::Ambiguous {
                term: term.to_string(),
                candidates: matches,
            }),
        }
    }

    /// Build a descriptor from an explicit code, naming it from the tables
    /// when the code is known. Unknown codes are still valid.
    pub fn from_code(&self, kind: LocationKind, code: &str) -> LocationDescriptor {
        let name = self.tables.name_of(kind, code).unwrap_or(code);
        LocationDescriptor::new(kind, code, name)
    }
}

/// The only candidate whose name starts with `term`, if exactly one does.
fn sole_prefixed<'m>(
    candidates: impl IntoIterator<Item = &'m LocationDescriptor>,
    term: &str,
) -> Option<&'m LocationDescriptor> {
    let prefix = term.to_lowercase();
    let mut starting = candidates
        .into_iter()
        .filter(|m| m.name.to_lowercase().starts_with(&prefix));
    match (starting.next(), starting.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn narrow<'m>(group: &[&'m LocationDescriptor], term: &str) -> Option<&'m LocationDescriptor> {
    match group {
        [only] => Some(*only),
        _ => sole_prefixed(group.iter().copied(), term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> NameTables {
        let mut t = NameTables::default();
        for (code, name) in [
            ("35620", "New York-Newark-Jersey City, NY-NJ-PA"),
            ("12060", "Atlanta-Sandy Springs-Alpharetta, GA"),
            ("41860", "San Francisco-Oakland-Berkeley, CA"),
            ("41940", "San Jose-Sunnyvale-Santa Clara, CA"),
            ("12420", "Austin-Round Rock-Georgetown, TX"),
            ("31080", "Los Angeles-Long Beach-Anaheim, CA"),
        ] {
            t.metros.insert(code.into(), name.into());
        }
        for (code, name) in [
            ("36061", "New York County (Manhattan), NY"),
            ("06075", "San Francisco County, CA"),
            ("48453", "Travis County, TX"),
            ("13121", "Fulton County, GA"),
            ("53033", "King County, WA"),
            ("06085", "Santa Clara County, CA"),
            ("06087", "Santa Cruz County, CA"),
        ] {
            t.counties.insert(code.into(), name.into());
        }
        for (code, name) in [
            ("36", "New York"),
            ("06", "California"),
            ("48", "Texas"),
            ("53", "Washington"),
            ("11", "District of Columbia"),
            ("54", "West Virginia"),
            ("51", "Virginia"),
            ("20", "Kansas"),
            ("05", "Arkansas"),
        ] {
            t.states.insert(code.into(), name.into());
        }
        t
    }

    fn kinds(err: &ResolveError) -> Vec<LocationKind> {
        err.candidates().iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_search_preserves_namespace() {
        let t = tables();
        let r = LocationResolver::new(&t);
        let found = r.search("new york");
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].kind, LocationKind::Metro);
        assert_eq!(found[1].kind, LocationKind::County);
        assert_eq!(found[2].kind, LocationKind::State);
    }

    #[test]
    fn test_resolve_not_found() {
        let t = tables();
        let err = LocationResolver::new(&t).resolve("Gotham").unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_single_match() {
        let t = tables();
        let r = LocationResolver::new(&t);
        let loc = r.resolve("atlanta").unwrap();
        assert_eq!(loc, LocationDescriptor::new(LocationKind::Metro, "12060", "Atlanta-Sandy Springs-Alpharetta, GA"));

        let loc = r.resolve("TRAVIS").unwrap();
        assert_eq!(loc.kind, LocationKind::County);
        assert_eq!(loc.code, "48453");
    }

    #[test]
    fn test_every_unique_entry_resolves_to_itself() {
        let t = tables();
        let r = LocationResolver::new(&t);
        for kind in LocationKind::ALL {
            for (code, name) in t.entries(kind) {
                if r.search(name).len() == 1 {
                    let loc = r.resolve(name).unwrap();
                    assert_eq!((loc.kind, loc.code.as_str()), (kind, code.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_resolve_metro_and_county_is_ambiguous() {
        let t = tables();
        let err = LocationResolver::new(&t).resolve("New York").unwrap_err();
        match &err {
            ResolveError::Ambiguous { term, candidates } => {
                assert_eq!(term, "New York");
                assert!(candidates.iter().any(|c| c.code == "35620"));
                assert!(candidates.iter().any(|c| c.code == "36061"));
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_metro_and_county_ambiguous_even_with_prefix() {
        // One metro and one county, both starting with the term.
        let t = tables();
        let err = LocationResolver::new(&t).resolve("San Francisco").unwrap_err();
        assert_eq!(kinds(&err), vec![LocationKind::Metro, LocationKind::County]);
    }

    #[test]
    fn test_metro_and_state_is_ambiguous() {
        let mut t = NameTables::default();
        t.metros.insert("1".into(), "Kansas City, MO-KS".into());
        t.states.insert("20".into(), "Kansas".into());
        t.states.insert("05".into(), "Arkansas".into());
        let err = LocationResolver::new(&t).resolve("Kansas").unwrap_err();
        assert_eq!(kinds(&err), vec![LocationKind::Metro, LocationKind::State, LocationKind::State]);
    }

    #[test]
    fn test_single_namespace_prefix_wins() {
        let mut t = NameTables::default();
        t.metros.insert("1".into(), "Portland-Vancouver-Hillsboro, OR-WA".into());
        t.metros.insert("2".into(), "South Portland, ME".into());
        let loc = LocationResolver::new(&t).resolve("portland").unwrap();
        assert_eq!(loc.code, "1");
    }

    #[test]
    fn test_single_namespace_without_unique_prefix_is_ambiguous() {
        let mut t = NameTables::default();
        t.counties.insert("06085".into(), "Santa Clara County, CA".into());
        t.counties.insert("06087".into(), "Santa Cruz County, CA".into());
        let err = LocationResolver::new(&t).resolve("Santa C").unwrap_err();
        assert_eq!(kinds(&err), vec![LocationKind::County, LocationKind::County]);
    }

    #[test]
    fn test_metro_term_inside_other_metro_names() {
        let t = tables();
        // Matches the San Jose metro only; the Santa Clara county does not
        // contain the term.
        let loc = LocationResolver::new(&t).resolve("Sunnyvale").unwrap();
        assert_eq!(loc.code, "41940");

        let err = LocationResolver::new(&t).resolve("Santa Clara").unwrap_err();
        assert_eq!(kinds(&err), vec![LocationKind::Metro, LocationKind::County]);
    }

    #[test]
    fn test_counties_with_states_narrow_on_counties() {
        let mut t = NameTables::default();
        t.counties.insert("53033".into(), "King County, WA".into());
        t.counties.insert("48269".into(), "King County, TX".into());
        t.counties.insert("06031".into(), "Kings County, CA".into());
        t.states.insert("99".into(), "Kingdom".into());
        let err = LocationResolver::new(&t).resolve("King").unwrap_err();
        assert_eq!(err.candidates().len(), 4);

        t.counties.remove("48269");
        t.counties.remove("06031");
        let loc = LocationResolver::new(&t).resolve("King").unwrap();
        assert_eq!(loc.code, "53033");
    }

    #[test]
    fn test_states_unique_prefix() {
        let t = tables();
        // "Virginia" is in both Virginia and West Virginia; only one starts with it.
        let loc = LocationResolver::new(&t).resolve("virginia").unwrap();
        assert_eq!(loc.code, "51");
    }

    #[test]
    fn test_states_exact_name() {
        let mut t = NameTables::default();
        t.states.insert("53".into(), "Washington".into());
        t.states.insert("11".into(), "Washington DC".into());
        let loc = LocationResolver::new(&t).resolve("WASHINGTON").unwrap();
        assert_eq!(loc.code, "53");
    }

    #[test]
    fn test_states_prefix_in_single_namespace() {
        let mut t = NameTables::default();
        t.states.insert("20".into(), "Kansas".into());
        t.states.insert("05".into(), "Arkansas".into());
        let loc = LocationResolver::new(&t).resolve("kansas").unwrap();
        assert_eq!(loc.code, "20");
    }

    #[test]
    fn test_states_without_exact_name_is_ambiguous() {
        let mut t = NameTables::default();
        t.states.insert("1".into(), "North Dakota".into());
        t.states.insert("2".into(), "South Dakota".into());
        let err = LocationResolver::new(&t).resolve("dakota").unwrap_err();
        assert_eq!(kinds(&err), vec![LocationKind::State, LocationKind::State]);
    }

    #[test]
    fn test_from_code() {
        let t = tables();
        let r = LocationResolver::new(&t);
        assert_eq!(r.from_code(LocationKind::State, "48").name, "Texas");
        let unknown = r.from_code(LocationKind::County, "01001");
        assert_eq!(unknown.name, "01001");
        assert_eq!(unknown.kind, LocationKind::County);
    }
}
