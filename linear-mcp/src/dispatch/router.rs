//! Operation routing.
//!
//! An [`Intent`] is mapped to exactly one backend operation by [`resolve`],
//! an exhaustive match over (entity, kind, cardinality). The result shape to
//! expect comes from the chosen descriptor, never from probing the response:
//! single create/update read a singular entity field, batch variants read a
//! plural one, and both deletes read `issueDelete`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::args::Args;
use super::filter::FilterCriteria;
use super::page::{OrderBy, PageRequest};
use super::translate::translate;
use crate::error::{LinearError, LinearResult};
use crate::operations::{OperationId, ResultShape};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Issue,
    Project,
    Comment,
    ProjectMilestone,
    Team,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Issue,
        EntityKind::Project,
        EntityKind::Comment,
        EntityKind::ProjectMilestone,
        EntityKind::Team,
        EntityKind::User,
    ];

    pub fn noun(self, cardinality: Cardinality) -> &'static str {
        match (self, cardinality) {
            (EntityKind::Issue, Cardinality::Single) => "issue",
            (EntityKind::Issue, Cardinality::Bulk) => "issues",
            (EntityKind::Project, Cardinality::Single) => "project",
            (EntityKind::Project, Cardinality::Bulk) => "projects",
            (EntityKind::Comment, Cardinality::Single) => "comment",
            (EntityKind::Comment, Cardinality::Bulk) => "comments",
            (EntityKind::ProjectMilestone, Cardinality::Single) => "project milestone",
            (EntityKind::ProjectMilestone, Cardinality::Bulk) => "project milestones",
            (EntityKind::Team, Cardinality::Single) => "team",
            (EntityKind::Team, Cardinality::Bulk) => "teams",
            (EntityKind::User, Cardinality::Single) => "user",
            (EntityKind::User, Cardinality::Bulk) => "users",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Create,
    Update,
    Delete,
    Search,
    Get,
}

impl IntentKind {
    pub const ALL: [IntentKind; 5] = [
        IntentKind::Create,
        IntentKind::Update,
        IntentKind::Delete,
        IntentKind::Search,
        IntentKind::Get,
    ];

    fn verb(self) -> &'static str {
        match self {
            IntentKind::Create => "create",
            IntentKind::Update => "update",
            IntentKind::Delete => "delete",
            IntentKind::Search => "search",
            IntentKind::Get => "get",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Bulk,
}

/// The static routing table.
pub fn resolve(
    entity: EntityKind,
    kind: IntentKind,
    cardinality: Cardinality,
) -> Option<OperationId> {
    use Cardinality::*;
    use EntityKind::*;
    use IntentKind::*;

    match (entity, kind, cardinality) {
        (Issue, Create, Single) => Some(OperationId::IssueCreate),
        (Issue, Create, Bulk) => Some(OperationId::IssueBatchCreate),
        (Issue, Update, Single) => Some(OperationId::IssueUpdate),
        (Issue, Update, Bulk) => Some(OperationId::IssueBatchUpdate),
        (Issue, Delete, Single) => Some(OperationId::IssueDelete),
        (Issue, Delete, Bulk) => Some(OperationId::IssueBatchDelete),
        (Issue, Search, Single) => Some(OperationId::IssueSearch),
        (Issue, Get, Single) => Some(OperationId::IssueGet),
        (Project, Create, Single) => Some(OperationId::ProjectCreate),
        (Project, Update, Single) => Some(OperationId::ProjectUpdate),
        (Project, Search, Single) => Some(OperationId::ProjectSearch),
        (Project, Get, Single) => Some(OperationId::ProjectGet),
        (Comment, Create, Single) => Some(OperationId::CommentCreate),
        (ProjectMilestone, Create, Single) => Some(OperationId::ProjectMilestoneCreate),
        (Team, Search, Single) => Some(OperationId::TeamList),
        (User, Get, Single) => Some(OperationId::Viewer),
        _ => None,
    }
}

/// One logical caller request. Built per call and consumed by dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Create exactly one entity.
    Create { entity: EntityKind, payload: Args },
    /// Bulk entry point: always batch, even for a single payload.
    CreateMany {
        entity: EntityKind,
        payloads: Vec<Args>,
    },
    /// One shared payload applied to every target.
    Update {
        entity: EntityKind,
        ids: Vec<String>,
        payload: Args,
    },
    Delete {
        entity: EntityKind,
        ids: Vec<String>,
    },
    /// Bulk entry point: always batch, even for a single id.
    DeleteMany {
        entity: EntityKind,
        ids: Vec<String>,
    },
    Search {
        entity: EntityKind,
        filter: FilterCriteria,
        page: PageRequest,
        order_by: Option<OrderBy>,
    },
    /// Fetch one entity; `id` is `None` only for the authenticated user.
    Get {
        entity: EntityKind,
        id: Option<String>,
    },
}

impl Intent {
    pub fn entity(&self) -> EntityKind {
        match self {
            Intent::Create { entity, .. }
            | Intent::CreateMany { entity, .. }
            | Intent::Update { entity, .. }
            | Intent::Delete { entity, .. }
            | Intent::DeleteMany { entity, .. }
            | Intent::Search { entity, .. }
            | Intent::Get { entity, .. } => *entity,
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Create { .. } | Intent::CreateMany { .. } => IntentKind::Create,
            Intent::Update { .. } => IntentKind::Update,
            Intent::Delete { .. } | Intent::DeleteMany { .. } => IntentKind::Delete,
            Intent::Search { .. } => IntentKind::Search,
            Intent::Get { .. } => IntentKind::Get,
        }
    }

    pub fn cardinality(&self) -> LinearResult<Cardinality> {
        match self {
            Intent::CreateMany { payloads, .. } if payloads.is_empty() => Err(
                LinearError::validation("at least one entity is required for a batch create"),
            ),
            Intent::CreateMany { .. } => Ok(Cardinality::Bulk),
            Intent::DeleteMany { ids, .. } if ids.is_empty() => Err(LinearError::validation(
                "at least one id is required for a batch delete",
            )),
            Intent::DeleteMany { .. } => Ok(Cardinality::Bulk),
            Intent::Update { ids, .. } | Intent::Delete { ids, .. } => match ids.len() {
                0 => Err(LinearError::validation("at least one id is required")),
                1 => Ok(Cardinality::Single),
                _ => Ok(Cardinality::Bulk),
            },
            Intent::Create { .. } | Intent::Search { .. } | Intent::Get { .. } => {
                Ok(Cardinality::Single)
            }
        }
    }

    /// Caller-facing description of the attempted action, e.g. "update issues".
    pub fn action(&self) -> String {
        let cardinality = match self {
            Intent::Search { .. } => Cardinality::Bulk,
            other => other.cardinality().unwrap_or(Cardinality::Single),
        };
        format!(
            "{} {}",
            self.kind().verb(),
            self.entity().noun(cardinality)
        )
    }
}

/// A fully resolved backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub operation: OperationId,
    pub variables: Map<String, Value>,
    pub action: String,
}

/// Outcome of a batch backend call. The backend either succeeds for the whole
/// set or fails it as a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success: bool,
    pub items: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl BatchOutcome {
    pub fn succeeded(items: Vec<Value>) -> Self {
        Self {
            success: true,
            items,
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            failure_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Single create/update: the entity from the singular result field
    Entity(Value),
    /// Batch create/update
    Batch(BatchOutcome),
    /// Delete, single or batch
    Ack,
    /// Query result, passed through unchanged
    Data(Value),
}

impl Outcome {
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Entity(value) | Outcome::Data(value) => value,
            Outcome::Batch(batch) => json!(batch),
            Outcome::Ack => json!({ "success": true }),
        }
    }

    pub fn into_entity(self) -> LinearResult<Value> {
        match self {
            Outcome::Entity(value) => Ok(value),
            other => Err(LinearError::Unexpected(format!(
                "expected a single entity result, got {:?}",
                other
            ))),
        }
    }

    pub fn into_batch(self) -> LinearResult<BatchOutcome> {
        match self {
            Outcome::Batch(batch) => Ok(batch),
            other => Err(LinearError::Unexpected(format!(
                "expected a batch result, got {:?}",
                other
            ))),
        }
    }
}

/// Maps intents to backend operations and runs them through the translator.
pub struct Router {
    transport: Arc<dyn Transport>,
    default_page_size: u32,
}

impl Router {
    pub fn new(transport: Arc<dyn Transport>, default_page_size: u32) -> Self {
        Self {
            transport,
            default_page_size,
        }
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Resolve an intent to an operation and its variables without calling
    /// the backend.
    pub fn route(&self, intent: Intent) -> LinearResult<Route> {
        let cardinality = intent.cardinality()?;
        let action = intent.action();
        let entity = intent.entity();
        let kind = intent.kind();
        let operation = resolve(entity, kind, cardinality).ok_or_else(|| {
            LinearError::validation(format!("{} is not supported", action))
        })?;
        let declares = |name: &str| {
            operation
                .descriptor()
                .variables
                .iter()
                .any(|decl| decl.name == name)
        };

        let mut variables = Map::new();
        match intent {
            Intent::Create { payload, .. } => {
                variables.insert("input".to_string(), Value::Object(payload));
            }
            Intent::CreateMany { payloads, .. } => {
                let items = payloads.into_iter().map(Value::Object).collect::<Vec<_>>();
                let mut input = Map::new();
                input.insert(entity.noun(Cardinality::Bulk).to_string(), Value::Array(items));
                variables.insert("input".to_string(), Value::Object(input));
            }
            Intent::Update { mut ids, payload, .. } => {
                if cardinality == Cardinality::Single {
                    variables.insert("id".to_string(), Value::String(ids.remove(0)));
                } else {
                    variables.insert("ids".to_string(), json!(ids));
                }
                variables.insert("input".to_string(), Value::Object(payload));
            }
            Intent::Delete { mut ids, .. } => {
                if cardinality == Cardinality::Single {
                    variables.insert("id".to_string(), Value::String(ids.remove(0)));
                } else {
                    variables.insert("ids".to_string(), json!(ids));
                }
            }
            Intent::DeleteMany { ids, .. } => {
                variables.insert("ids".to_string(), json!(ids));
            }
            Intent::Search {
                filter,
                page,
                order_by,
                ..
            } => {
                if !filter.is_empty() {
                    if !declares("filter") {
                        return Err(LinearError::validation(format!(
                            "{} does not accept filters",
                            action
                        )));
                    }
                    variables.insert("filter".to_string(), filter.to_value());
                }
                variables.insert("first".to_string(), json!(page.first));
                if let Some(after) = page.after {
                    variables.insert("after".to_string(), Value::String(after));
                }
                if declares("orderBy") {
                    let order_by = order_by.unwrap_or_default();
                    variables.insert("orderBy".to_string(), json!(order_by.as_str()));
                } else if order_by.is_some() {
                    return Err(LinearError::validation(format!(
                        "{} does not accept orderBy",
                        action
                    )));
                }
            }
            Intent::Get { id, .. } => match (id, declares("id")) {
                (Some(id), true) => {
                    variables.insert("id".to_string(), Value::String(id));
                }
                (None, false) => {}
                (None, true) => {
                    return Err(LinearError::validation("missing required field 'id'"));
                }
                (Some(_), false) => {
                    return Err(LinearError::validation(format!(
                        "{} does not take an id",
                        action
                    )));
                }
            },
        }

        Ok(Route {
            operation,
            variables,
            action,
        })
    }

    /// Route an intent, call the backend once, and shape the result according
    /// to the operation that was chosen.
    pub async fn dispatch(&self, intent: Intent) -> LinearResult<Outcome> {
        let is_get = intent.kind() == IntentKind::Get;
        let target_id = match &intent {
            Intent::Get { id, .. } => id.clone(),
            _ => None,
        };
        let entity = intent.entity();

        let route = self.route(intent)?;
        let mut result = self.execute(&route).await?;

        let outcome = match route.operation.descriptor().shape {
            ResultShape::Entity(field) => match take_field(&mut result, field) {
                Value::Null => {
                    return Err(LinearError::Unexpected(format!(
                        "{} reported success but returned no {}",
                        route.action, field
                    )))
                }
                entity => Outcome::Entity(entity),
            },
            ResultShape::Entities(field) => match take_field(&mut result, field) {
                Value::Array(items) => Outcome::Batch(BatchOutcome::succeeded(items)),
                Value::Null => Outcome::Batch(BatchOutcome::succeeded(Vec::new())),
                _ => return Err(LinearError::upstream(&route.action)),
            },
            ResultShape::Ack => Outcome::Ack,
            ResultShape::Query if is_get && result.is_null() => {
                return Err(LinearError::NotFound {
                    entity: entity.noun(Cardinality::Single).to_string(),
                    id: target_id.unwrap_or_else(|| "viewer".to_string()),
                });
            }
            ResultShape::Query => Outcome::Data(result),
        };
        Ok(outcome)
    }

    async fn execute(&self, route: &Route) -> LinearResult<Value> {
        let descriptor = route.operation.descriptor();
        let variables = descriptor.bind(route.variables.clone())?;
        debug!(operation = descriptor.name, action = %route.action, "dispatching");
        let response = self.transport.execute(descriptor, variables).await;
        translate(descriptor, &route.action, response)
    }
}

fn take_field(result: &mut Value, field: &str) -> Value {
    result.get_mut(field).map(Value::take).unwrap_or(Value::Null)
}
