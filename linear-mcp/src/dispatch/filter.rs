//! Filter assembly for search intents.
//!
//! Callers supply any subset of independent predicates. Each present predicate
//! contributes exactly one entry to the backend filter object; absent
//! predicates contribute nothing. Presence is explicit (`Option`), so a
//! meaningful falsy value such as `priority = 0` is never lost.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::args::{optional_str, optional_string_list, Args};
use crate::error::{LinearError, LinearResult};

/// `<letters>-<digits>`, e.g. `ENG-42`; the digit group is the issue number.
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+-(\d+)$").unwrap());

/// Extract the issue number from an identifier-shaped query.
pub fn identifier_number(query: &str) -> Option<i64> {
    IDENTIFIER_PATTERN
        .captures(query.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// A comparator on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparator {
    Eq(Value),
    In(Vec<String>),
    ContainsIgnoreCase(String),
    /// Disjunction of sub-criteria
    AnyOf(Vec<FilterCriteria>),
}

impl Comparator {
    fn to_value(&self) -> Value {
        match self {
            Comparator::Eq(v) => json!({ "eq": v }),
            Comparator::In(items) => json!({ "in": items }),
            Comparator::ContainsIgnoreCase(s) => json!({ "containsIgnoreCase": s }),
            Comparator::AnyOf(branches) => {
                Value::Array(branches.iter().map(FilterCriteria::to_value).collect())
            }
        }
    }
}

/// A comparator reached through a path of nested fields, e.g. `id` under
/// `team` for `team: { id: { in: [...] } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub path: &'static [&'static str],
    pub comparator: Comparator,
}

impl Criterion {
    fn to_value(&self) -> Value {
        self.path
            .iter()
            .rev()
            .fold(self.comparator.to_value(), |inner, field| {
                let mut wrapped = Map::new();
                wrapped.insert(field.to_string(), inner);
                Value::Object(wrapped)
            })
    }
}

/// Search predicates, tagged by what they constrain.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Free-text: title contains, or identifier number equals
    Text(String),
    Project(String),
    Teams(Vec<String>),
    Assignees(Vec<String>),
    States(Vec<String>),
    Priority(i64),
    /// Name contains (project search)
    Name(String),
}

impl Predicate {
    /// The top-level filter key this predicate occupies.
    pub fn key(&self) -> &'static str {
        match self {
            Predicate::Text(_) => "or",
            Predicate::Project(_) => "project",
            Predicate::Teams(_) => "team",
            Predicate::Assignees(_) => "assignee",
            Predicate::States(_) => "state",
            Predicate::Priority(_) => "priority",
            Predicate::Name(_) => "name",
        }
    }

    pub fn criterion(&self) -> Criterion {
        match self {
            Predicate::Text(query) => {
                let mut title = FilterCriteria::new();
                title.set(
                    "title",
                    Criterion {
                        path: &[],
                        comparator: Comparator::ContainsIgnoreCase(query.clone()),
                    },
                );
                let mut number = FilterCriteria::new();
                number.set(
                    "number",
                    Criterion {
                        path: &[],
                        comparator: Comparator::Eq(
                            identifier_number(query).map_or(Value::Null, Value::from),
                        ),
                    },
                );
                Criterion {
                    path: &[],
                    comparator: Comparator::AnyOf(vec![title, number]),
                }
            }
            Predicate::Project(id) => Criterion {
                path: &["id"],
                comparator: Comparator::Eq(Value::String(id.clone())),
            },
            Predicate::Teams(ids) | Predicate::Assignees(ids) => Criterion {
                path: &["id"],
                comparator: Comparator::In(ids.clone()),
            },
            Predicate::States(names) => Criterion {
                path: &["name"],
                comparator: Comparator::In(names.clone()),
            },
            Predicate::Priority(p) => Criterion {
                path: &[],
                comparator: Comparator::Eq(Value::from(*p)),
            },
            Predicate::Name(name) => Criterion {
                path: &[],
                comparator: Comparator::ContainsIgnoreCase(name.clone()),
            },
        }
    }
}

/// Backend-shaped filter: predicate key -> criterion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    entries: BTreeMap<&'static str, Criterion>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, key: &'static str, criterion: Criterion) {
        self.entries.insert(key, criterion);
    }

    /// Add a predicate. Each key may be set at most once per request.
    pub fn insert(&mut self, predicate: Predicate) -> LinearResult<()> {
        let key = predicate.key();
        if self.entries.contains_key(key) {
            return Err(LinearError::validation(format!(
                "filter predicate '{}' given more than once",
                key
            )));
        }
        self.entries.insert(key, predicate.criterion());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, criterion)| (key.to_string(), criterion.to_value()))
            .collect();
        Value::Object(map)
    }
}

/// Optional issue-search predicates as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPredicates {
    pub query: Option<String>,
    pub project_id: Option<String>,
    pub team_ids: Option<Vec<String>>,
    pub assignee_ids: Option<Vec<String>>,
    pub states: Option<Vec<String>>,
    pub priority: Option<i64>,
}

impl SearchPredicates {
    /// Read predicates from tool arguments. The project id is taken from the
    /// nested `filter.project.id.eq` path. `priority` counts only when it is a
    /// JSON number.
    pub fn from_args(args: &Args) -> LinearResult<Self> {
        let query = optional_str(args, "query")?.filter(|q| !q.trim().is_empty());

        let project_id = match args.get("filter") {
            None | Some(Value::Null) => None,
            Some(filter @ Value::Object(_)) => match filter.pointer("/project/id/eq") {
                None | Some(Value::Null) => None,
                Some(Value::String(id)) => Some(id.clone()),
                Some(_) => {
                    return Err(LinearError::validation(
                        "'filter.project.id.eq' must be a string",
                    ))
                }
            },
            Some(_) => return Err(LinearError::validation("'filter' must be an object")),
        };

        let priority = match args.get("priority") {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            _ => None,
        };

        Ok(Self {
            query,
            project_id,
            team_ids: optional_string_list(args, "teamIds")?,
            assignee_ids: optional_string_list(args, "assigneeIds")?,
            states: optional_string_list(args, "states")?,
            priority,
        })
    }

    pub fn into_predicates(self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(query) = self.query {
            predicates.push(Predicate::Text(query));
        }
        if let Some(id) = self.project_id {
            predicates.push(Predicate::Project(id));
        }
        if let Some(ids) = self.team_ids {
            predicates.push(Predicate::Teams(ids));
        }
        if let Some(ids) = self.assignee_ids {
            predicates.push(Predicate::Assignees(ids));
        }
        if let Some(names) = self.states {
            predicates.push(Predicate::States(names));
        }
        if let Some(priority) = self.priority {
            predicates.push(Predicate::Priority(priority));
        }
        predicates
    }
}

/// Assemble a filter from independently optional predicates.
pub fn assemble(predicates: impl IntoIterator<Item = Predicate>) -> LinearResult<FilterCriteria> {
    let mut criteria = FilterCriteria::new();
    for predicate in predicates {
        criteria.insert(predicate)?;
    }
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter_for(args: Value) -> Value {
        let args = match args {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let predicates = SearchPredicates::from_args(&args).unwrap();
        assemble(predicates.into_predicates()).unwrap().to_value()
    }

    #[test]
    fn identifier_query_matches_title_or_number() {
        assert_eq!(
            filter_for(json!({ "query": "ENG-42" })),
            json!({
                "or": [
                    { "title": { "containsIgnoreCase": "ENG-42" } },
                    { "number": { "eq": 42 } }
                ]
            })
        );
    }

    #[test]
    fn plain_query_number_comparator_is_null() {
        assert_eq!(
            filter_for(json!({ "query": "login bug" })),
            json!({
                "or": [
                    { "title": { "containsIgnoreCase": "login bug" } },
                    { "number": { "eq": null } }
                ]
            })
        );
    }

    #[test]
    fn identifier_number_requires_full_pattern() {
        assert_eq!(identifier_number("eng-7"), Some(7));
        assert_eq!(identifier_number("ENG-"), None);
        assert_eq!(identifier_number("42"), None);
        assert_eq!(identifier_number("fix ENG-42 soon"), None);
    }

    #[test]
    fn structured_predicates_map_to_backend_shape() {
        assert_eq!(
            filter_for(json!({
                "filter": { "project": { "id": { "eq": "p1" } } },
                "teamIds": ["t1", "t2"],
                "assigneeIds": ["u1"],
                "states": ["Todo", "In Progress"],
                "priority": 2
            })),
            json!({
                "project": { "id": { "eq": "p1" } },
                "team": { "id": { "in": ["t1", "t2"] } },
                "assignee": { "id": { "in": ["u1"] } },
                "state": { "name": { "in": ["Todo", "In Progress"] } },
                "priority": { "eq": 2 }
            })
        );
    }

    #[test]
    fn zero_priority_is_included() {
        assert_eq!(
            filter_for(json!({ "priority": 0 })),
            json!({ "priority": { "eq": 0 } })
        );
    }

    #[test]
    fn non_numeric_priority_is_ignored() {
        assert_eq!(filter_for(json!({ "priority": "2" })), json!({}));
    }

    #[test]
    fn absent_predicates_contribute_nothing() {
        assert_eq!(filter_for(json!({})), json!({}));
        assert_eq!(filter_for(json!({ "query": "  ", "filter": {} })), json!({}));
    }

    #[test]
    fn predicate_keys_are_set_once() {
        let err = assemble(vec![
            Predicate::Teams(vec!["a".into()]),
            Predicate::Teams(vec!["b".into()]),
        ])
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn malformed_filters_are_validation_errors() {
        let args = match json!({ "filter": "p1" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(SearchPredicates::from_args(&args).unwrap_err().is_validation());

        let args = match json!({ "teamIds": "t1" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(SearchPredicates::from_args(&args).is_err());
    }
}
