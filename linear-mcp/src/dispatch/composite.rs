//! Multi-step composite intents.
//!
//! The backend has no cross-entity transaction, so a composite call can end
//! in three distinct states and [`CompositeOutcome`] keeps them apart:
//! both steps done, the first step failed (nothing persisted), or the first
//! step persisted and the second failed. Nothing is rolled back. Steps run
//! strictly in sequence because the second needs the first one's id.

use std::fmt;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::args::Args;
use super::router::{BatchOutcome, EntityKind, Intent, Router};
use crate::error::{LinearError, LinearResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeStep {
    CreateProject,
    CreateIssues,
}

impl fmt::Display for CompositeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeStep::CreateProject => write!(f, "create project"),
            CompositeStep::CreateIssues => write!(f, "create issues"),
        }
    }
}

/// A project to create together with its issues.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWithIssues {
    pub project: Args,
    pub issues: Vec<Args>,
}

#[derive(Debug)]
pub enum CompositeOutcome {
    Completed {
        project: Value,
        issues: BatchOutcome,
    },
    /// Nothing was persisted.
    FirstStepFailed {
        step: CompositeStep,
        error: LinearError,
    },
    /// `project` exists in the backend; its issues do not.
    SecondStepFailed {
        step: CompositeStep,
        project: Value,
        issues: BatchOutcome,
        error: LinearError,
    },
}

impl CompositeOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CompositeOutcome::Completed { .. })
    }

    /// Collapse into one terminal result. Failures name the failed step only;
    /// a persisted project is not mentioned.
    pub fn into_result(self) -> LinearResult<Value> {
        match self {
            CompositeOutcome::Completed { project, issues } => Ok(json!({
                "project": project,
                "issues": issues.items,
            })),
            CompositeOutcome::FirstStepFailed { step, error }
            | CompositeOutcome::SecondStepFailed { step, error, .. } => {
                Err(LinearError::Composite {
                    step: step.to_string(),
                    source: Box::new(error),
                })
            }
        }
    }
}

/// Create a project, then batch-create its issues with `projectId` set.
///
/// Issues without a `teamId` (or with `teamId: null`) inherit the project's
/// first team. An empty issue list completes after the project step without
/// a second backend call.
pub async fn create_project_with_issues(
    router: &Router,
    request: ProjectWithIssues,
) -> CompositeOutcome {
    let ProjectWithIssues { project, issues } = request;
    let default_team = project
        .get("teamIds")
        .and_then(Value::as_array)
        .and_then(|teams| teams.first())
        .cloned();

    let created = router
        .dispatch(Intent::Create {
            entity: EntityKind::Project,
            payload: project,
        })
        .await
        .and_then(|outcome| outcome.into_entity());

    let project = match created {
        Ok(project) => project,
        Err(error) => {
            warn!(step = %CompositeStep::CreateProject, %error, "composite aborted");
            return CompositeOutcome::FirstStepFailed {
                step: CompositeStep::CreateProject,
                error,
            };
        }
    };

    let project_id = match project.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            return CompositeOutcome::FirstStepFailed {
                step: CompositeStep::CreateProject,
                error: LinearError::Unexpected(
                    "project response carried no id".to_string(),
                ),
            };
        }
    };

    if issues.is_empty() {
        return CompositeOutcome::Completed {
            project,
            issues: BatchOutcome::succeeded(Vec::new()),
        };
    }

    let payloads = issues
        .into_iter()
        .map(|mut issue| {
            issue.insert("projectId".to_string(), Value::String(project_id.clone()));
            if issue.get("teamId").map_or(true, Value::is_null) {
                if let Some(team) = &default_team {
                    issue.insert("teamId".to_string(), team.clone());
                }
            }
            issue
        })
        .collect::<Vec<_>>();

    let created = router
        .dispatch(Intent::CreateMany {
            entity: EntityKind::Issue,
            payloads,
        })
        .await
        .and_then(|outcome| outcome.into_batch());

    match created {
        Ok(issues) => {
            info!(project_id = %project_id, issues = issues.items.len(), "created project with issues");
            CompositeOutcome::Completed { project, issues }
        }
        Err(error) => {
            warn!(
                step = %CompositeStep::CreateIssues,
                project_id = %project_id,
                %error,
                "composite failed after project was created"
            );
            CompositeOutcome::SecondStepFailed {
                step: CompositeStep::CreateIssues,
                project,
                issues: BatchOutcome::failed(error.to_string()),
                error,
            }
        }
    }
}
