//! The ordered response registry.
//!
//! Registration order is dispatch priority. The registry is assembled once at
//! startup and then shared behind an `Arc`; responses are never added or
//! removed afterwards, only toggled and retuned in place.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult, StateError};
use crate::response::Response;

/// One row of the administrative listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSummary {
    pub name: String,
    pub enabled: bool,
    pub state: String,
}

/// An entry a bulk operation did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Outcome of a best-effort bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Names of responses that were updated, in registry spelling.
    pub applied: Vec<String>,
    /// Entries that were ignored, with the reason.
    pub skipped: Vec<SkippedEntry>,
}

impl BulkReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedEntry {
            name: name.into(),
            reason: reason.to_string(),
        });
    }
}

/// Ordered collection of responses.
#[derive(Debug, Default)]
pub struct Registry {
    responses: Vec<Response>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a response at the lowest priority so far.
    pub fn add(&mut self, response: Response) {
        self.responses.push(response);
    }

    /// Appends a response (builder pattern).
    pub fn with(mut self, response: Response) -> Self {
        self.add(response);
        self
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Responses in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.responses.iter().map(Response::name)
    }

    /// First response whose name matches case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.is_named(name))
    }

    /// Like [`lookup`](Self::lookup) but with a not-found error.
    pub fn get(&self, name: &str) -> RegistryResult<&Response> {
        self.lookup(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Sets the state of one response.
    pub fn set_state(&self, name: &str, state: &str) -> RegistryResult<()> {
        self.get(name)?.set_state(state)?;
        Ok(())
    }

    /// Enables or disables one response.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> RegistryResult<()> {
        self.get(name)?.set_enabled(enabled);
        Ok(())
    }

    /// Applies `states` to every response it names, in registry order.
    ///
    /// Responses absent from `states` are untouched. Rejected states and names
    /// matching no response are skipped and reported.
    pub fn bulk_set_states(&self, states: &HashMap<String, String>) -> BulkReport {
        self.bulk_apply(states, |response, state| {
            response.set_state(state).inspect_err(|e| {
                debug!(response = response.name(), state = %state, error = %e, "Skipping state entry");
            })
        })
    }

    /// Applies `flags` to every response it names, in registry order.
    pub fn bulk_set_enabled(&self, flags: &HashMap<String, bool>) -> BulkReport {
        self.bulk_apply(flags, |response, enabled| {
            response.set_enabled(*enabled);
            Ok(())
        })
    }

    /// Tries `state` on every response. Responses that reject it are skipped.
    pub fn set_all_states(&self, state: &str) -> BulkReport {
        let mut report = BulkReport::default();
        for response in &self.responses {
            match response.set_state(state) {
                Ok(()) => report.applied.push(response.name().to_string()),
                Err(e) => report.skip(response.name(), e),
            }
        }
        report
    }

    pub fn set_all_enabled(&self, enabled: bool) {
        for response in &self.responses {
            response.set_enabled(enabled);
        }
    }

    /// Every response's current state, keyed by name.
    pub fn snapshot_states(&self) -> BTreeMap<String, String> {
        self.responses
            .iter()
            .map(|r| (r.name().to_string(), r.state()))
            .collect()
    }

    /// Every response's enabled flag, keyed by name.
    pub fn snapshot_enabled(&self) -> BTreeMap<String, bool> {
        self.responses
            .iter()
            .map(|r| (r.name().to_string(), r.is_enabled()))
            .collect()
    }

    pub fn summaries(&self) -> Vec<ResponseSummary> {
        self.responses
            .iter()
            .map(|r| ResponseSummary {
                name: r.name().to_string(),
                enabled: r.is_enabled(),
                state: r.state(),
            })
            .collect()
    }

    /// Walks the responses, not the entries, so responses sharing a name are
    /// all updated and the outcome never depends on map iteration order.
    fn bulk_apply<V, F>(&self, entries: &HashMap<String, V>, mut apply: F) -> BulkReport
    where
        F: FnMut(&Response, &V) -> Result<(), StateError>,
    {
        let mut report = BulkReport::default();
        for response in &self.responses {
            let Some(value) = entry_for(entries, response.name()) else {
                continue;
            };
            match apply(response, value) {
                Ok(()) => report.applied.push(response.name().to_string()),
                Err(e) => report.skip(response.name(), e),
            }
        }

        let mut unknown: Vec<&String> = entries
            .keys()
            .filter(|name| self.lookup(name).is_none())
            .collect();
        unknown.sort();
        for name in unknown {
            debug!(response = %name, "Skipping entry for unknown response");
            report.skip(name.clone(), RegistryError::NotFound(name.clone()));
        }
        report
    }
}

/// The entry for `name`: the exact key if present, otherwise the smallest
/// key equal to it ignoring case.
fn entry_for<'a, V>(entries: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    if let Some(value) = entries.get(name) {
        return Some(value);
    }
    let folded = name.to_lowercase();
    entries
        .iter()
        .filter(|(key, _)| key.to_lowercase() == folded)
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, value)| value)
}

impl FromIterator<Response> for Registry {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        Self {
            responses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::error::StateError;
    use crate::response::{NO_STATE, ReplyMode};
    use crate::trigger::Trigger;
    use amadeus_core::EmojiId;

    fn toggle(name: &str) -> Response {
        Response::send_or_react(
            name,
            Trigger::contains([name.to_lowercase()]),
            "ok",
            EmojiId(1),
            ReplyMode::Message,
        )
    }

    fn registry() -> Registry {
        Registry::new()
            .with(toggle("A"))
            .with(toggle("B"))
            .with(Response::new(
                "Plain",
                Trigger::exact(["plain"]),
                Action::send("plain"),
            ))
    }

    #[test]
    fn test_lookup_is_case_insensitive_first_match() {
        let reg = Registry::new()
            .with(toggle("Dup"))
            .with(Response::new("dup", Trigger::Or(vec![]), Action::send("x")));

        let found = reg.lookup("DUP").unwrap();
        assert_eq!(found.name(), "Dup");
        assert!(reg.lookup("missing").is_none());
        assert_eq!(
            reg.get("missing").unwrap_err(),
            RegistryError::NotFound("missing".into())
        );
    }

    #[test]
    fn test_set_state_surfaces_errors() {
        let reg = registry();
        reg.set_state("a", "react").unwrap();
        assert_eq!(reg.lookup("A").unwrap().state(), "react");

        assert_eq!(
            reg.set_state("a", "bogus"),
            Err(RegistryError::State(StateError::InvalidMode("bogus".into())))
        );
        assert!(matches!(
            reg.set_state("Z", "react"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_bulk_set_states_is_best_effort() {
        let reg = registry();
        let states = HashMap::from([
            ("A".to_string(), "react".to_string()),
            ("Z".to_string(), "react".to_string()),
        ]);

        let report = reg.bulk_set_states(&states);

        assert_eq!(report.applied, vec!["A".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "Z");
        assert_eq!(reg.lookup("A").unwrap().state(), "react");
        assert_eq!(reg.lookup("B").unwrap().state(), "message");
        assert_eq!(reg.lookup("Plain").unwrap().state(), NO_STATE);
    }

    #[test]
    fn test_bulk_set_states_skips_invalid_values() {
        let reg = registry();
        let states = HashMap::from([
            ("b".to_string(), "sideways".to_string()),
            ("plain".to_string(), "react".to_string()),
        ]);

        let report = reg.bulk_set_states(&states);

        assert!(report.applied.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(reg.lookup("B").unwrap().state(), "message");
    }

    #[test]
    fn test_bulk_updates_every_response_sharing_a_name() {
        let reg = Registry::new().with(toggle("Dup")).with(toggle("Dup"));

        let states = HashMap::from([("Dup".to_string(), "react".to_string())]);
        let report = reg.bulk_set_states(&states);
        assert_eq!(report.applied, ["Dup", "Dup"]);
        assert!(reg.iter().all(|r| r.state() == "react"));

        reg.bulk_set_enabled(&HashMap::from([("dup".to_string(), false)]));
        assert!(reg.iter().all(|r| !r.is_enabled()));
    }

    #[test]
    fn test_bulk_case_variants_resolve_deterministically() {
        for _ in 0..50 {
            let reg = registry();
            let states = HashMap::from([
                ("a".to_string(), "message".to_string()),
                ("A".to_string(), "react".to_string()),
                ("b".to_string(), "react".to_string()),
                ("B ".to_string(), "message".to_string()),
            ]);

            let report = reg.bulk_set_states(&states);

            // The exact spelling wins; otherwise the smallest variant.
            assert_eq!(reg.lookup("A").unwrap().state(), "react");
            assert_eq!(reg.lookup("B").unwrap().state(), "react");
            assert_eq!(report.applied, ["A", "B"]);
            assert_eq!(report.skipped.len(), 1);
            assert_eq!(report.skipped[0].name, "B ");
        }
    }

    #[test]
    fn test_bulk_set_enabled() {
        let reg = registry();
        let flags = HashMap::from([("b".to_string(), false), ("nope".to_string(), false)]);

        let report = reg.bulk_set_enabled(&flags);

        assert_eq!(report.applied, vec!["B".to_string()]);
        assert!(!report.is_clean());
        assert!(reg.lookup("A").unwrap().is_enabled());
        assert!(!reg.lookup("B").unwrap().is_enabled());
    }

    #[test]
    fn test_set_all() {
        let reg = registry();

        let report = reg.set_all_states("react");
        assert_eq!(report.applied, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(report.skipped[0].name, "Plain");

        reg.set_all_enabled(false);
        assert!(reg.iter().all(|r| !r.is_enabled()));
    }

    #[test]
    fn test_snapshots_cover_every_response() {
        let reg = registry();
        reg.set_enabled("plain", false).unwrap();

        let states = reg.snapshot_states();
        assert_eq!(states.len(), 3);
        assert_eq!(states["A"], "message");
        assert_eq!(states["Plain"], NO_STATE);

        let enabled = reg.snapshot_enabled();
        assert_eq!(enabled["Plain"], false);
        assert_eq!(enabled["B"], true);
    }

    #[test]
    fn test_summaries_keep_registry_order() {
        let reg = registry();
        let names: Vec<_> = reg.summaries().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["A", "B", "Plain"]);
    }
}
