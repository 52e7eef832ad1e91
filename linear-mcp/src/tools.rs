//! Caller-facing operations.
//!
//! Each method takes raw tool arguments, validates them, normalizes
//! create/update payloads, builds an [`Intent`] and hands it to a [`Router`]
//! bound to a freshly verified session. Results are returned as JSON and are
//! not reshaped beyond picking the entity out of a mutation result.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::auth::SessionProvider;
use crate::dispatch::args::{
    into_object, optional_str, require_ids, require_object, require_object_list, require_str,
    require_string_list, Args,
};
use crate::dispatch::composite::{create_project_with_issues, ProjectWithIssues};
use crate::dispatch::filter::{assemble, Predicate, SearchPredicates};
use crate::dispatch::normalize::normalize_payload;
use crate::dispatch::page::{OrderBy, Page, PageRequest};
use crate::dispatch::router::{EntityKind, Intent, Router};
use crate::error::{LinearError, LinearResult};

pub struct LinearTools {
    sessions: Arc<dyn SessionProvider>,
    default_page_size: u32,
}

impl LinearTools {
    pub fn new(sessions: Arc<dyn SessionProvider>, default_page_size: u32) -> Self {
        Self {
            sessions,
            default_page_size,
        }
    }

    async fn router(&self) -> LinearResult<Router> {
        let transport = self.sessions.session().await?;
        Ok(Router::new(transport, self.default_page_size))
    }

    pub async fn create_issue(&self, args: Value) -> LinearResult<Value> {
        let payload = issue_payload(into_object(args)?)?;
        let router = self.router().await?;
        router
            .dispatch(Intent::Create {
                entity: EntityKind::Issue,
                payload,
            })
            .await?
            .into_entity()
    }

    pub async fn create_issues(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let issues = require_object_list(&args, "issues")?;
        if issues.is_empty() {
            return Err(LinearError::validation(
                "'issues' must contain at least one entry",
            ));
        }
        let payloads = issues
            .into_iter()
            .map(issue_payload)
            .collect::<LinearResult<Vec<_>>>()?;

        let router = self.router().await?;
        let batch = router
            .dispatch(Intent::CreateMany {
                entity: EntityKind::Issue,
                payloads,
            })
            .await?
            .into_batch()?;
        Ok(json!(batch))
    }

    /// Apply one shared update to one or more issues.
    pub async fn update_issues(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let ids = require_ids(&args)?;
        let payload = require_update(&args)?;

        let router = self.router().await?;
        let outcome = router
            .dispatch(Intent::Update {
                entity: EntityKind::Issue,
                ids,
                payload,
            })
            .await?;
        Ok(outcome.into_value())
    }

    pub async fn delete_issue(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let id = require_str(&args, "id")?;
        self.delete(Intent::Delete {
            entity: EntityKind::Issue,
            ids: vec![id.clone()],
        })
        .await?;
        Ok(json!({ "success": true, "deleted": [id] }))
    }

    /// Always one batch delete bound with the full list, even for one id.
    pub async fn delete_issues(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let ids = require_string_list(&args, "ids")?;
        self.delete(Intent::DeleteMany {
            entity: EntityKind::Issue,
            ids: ids.clone(),
        })
        .await?;
        Ok(json!({ "success": true, "deleted": ids }))
    }

    async fn delete(&self, intent: Intent) -> LinearResult<()> {
        let router = self.router().await?;
        router.dispatch(intent).await?;
        Ok(())
    }

    pub async fn search_issues(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let filter = assemble(SearchPredicates::from_args(&args)?.into_predicates())?;
        let page = PageRequest::from_args(&args, self.default_page_size)?;
        let order_by = OrderBy::from_args(&args)?;

        let router = self.router().await?;
        let result = router
            .dispatch(Intent::Search {
                entity: EntityKind::Issue,
                filter,
                page,
                order_by,
            })
            .await?
            .into_value();
        log_page("issues", &result);
        Ok(result)
    }

    pub async fn get_issue(&self, args: Value) -> LinearResult<Value> {
        self.get(EntityKind::Issue, args).await
    }

    pub async fn create_project_with_issues(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let project = project_payload(require_object(&args, "project")?)?;
        let issues = require_object_list(&args, "issues")?
            .into_iter()
            .map(|issue| -> LinearResult<Args> {
                require_str(&issue, "title")?;
                Ok(normalize_payload(issue))
            })
            .collect::<LinearResult<Vec<_>>>()?;

        let router = self.router().await?;
        create_project_with_issues(&router, ProjectWithIssues { project, issues })
            .await
            .into_result()
    }

    pub async fn get_project(&self, args: Value) -> LinearResult<Value> {
        self.get(EntityKind::Project, args).await
    }

    pub async fn search_projects(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let predicates = optional_str(&args, "query")?
            .filter(|q| !q.trim().is_empty())
            .map(Predicate::Name);
        let filter = assemble(predicates)?;
        let page = PageRequest::from_args(&args, self.default_page_size)?;

        let router = self.router().await?;
        let result = router
            .dispatch(Intent::Search {
                entity: EntityKind::Project,
                filter,
                page,
                order_by: None,
            })
            .await?
            .into_value();
        log_page("projects", &result);
        Ok(result)
    }

    pub async fn update_project(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let id = require_str(&args, "id")?;
        let payload = require_update(&args)?;

        let router = self.router().await?;
        router
            .dispatch(Intent::Update {
                entity: EntityKind::Project,
                ids: vec![id],
                payload,
            })
            .await?
            .into_entity()
    }

    pub async fn create_comment(&self, args: Value) -> LinearResult<Value> {
        let payload = into_object(args)?;
        require_str(&payload, "issueId")?;
        require_str(&payload, "body")?;

        let router = self.router().await?;
        router
            .dispatch(Intent::Create {
                entity: EntityKind::Comment,
                payload,
            })
            .await?
            .into_entity()
    }

    pub async fn create_project_milestone(&self, args: Value) -> LinearResult<Value> {
        let payload = into_object(args)?;
        require_str(&payload, "projectId")?;
        require_str(&payload, "name")?;
        optional_str(&payload, "description")?;
        optional_str(&payload, "targetDate")?;

        let router = self.router().await?;
        router
            .dispatch(Intent::Create {
                entity: EntityKind::ProjectMilestone,
                payload,
            })
            .await?
            .into_entity()
    }

    pub async fn get_teams(&self, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let page = PageRequest::from_args(&args, self.default_page_size)?;

        let router = self.router().await?;
        let result = router
            .dispatch(Intent::Search {
                entity: EntityKind::Team,
                filter: Default::default(),
                page,
                order_by: None,
            })
            .await?
            .into_value();
        log_page("teams", &result);
        Ok(result)
    }

    pub async fn get_viewer(&self, _args: Value) -> LinearResult<Value> {
        let router = self.router().await?;
        Ok(router
            .dispatch(Intent::Get {
                entity: EntityKind::User,
                id: None,
            })
            .await?
            .into_value())
    }

    async fn get(&self, entity: EntityKind, args: Value) -> LinearResult<Value> {
        let args = into_object(args)?;
        let id = require_str(&args, "id")?;

        let router = self.router().await?;
        Ok(router
            .dispatch(Intent::Get {
                entity,
                id: Some(id),
            })
            .await?
            .into_value())
    }
}

fn issue_payload(payload: Args) -> LinearResult<Args> {
    require_str(&payload, "title")?;
    require_str(&payload, "teamId")?;
    Ok(normalize_payload(payload))
}

/// The `update` object must name at least one field as given by the caller.
/// Normalization runs afterwards and may drop a malformed `estimate` without
/// failing the request.
fn require_update(args: &Args) -> LinearResult<Args> {
    let update = require_object(args, "update")?;
    if update.is_empty() {
        return Err(LinearError::validation("'update' must set at least one field"));
    }
    Ok(normalize_payload(update))
}

fn project_payload(payload: Args) -> LinearResult<Args> {
    require_str(&payload, "name")?;
    require_string_list(&payload, "teamIds")?;
    Ok(normalize_payload(payload))
}

fn log_page(what: &str, result: &Value) {
    if let Some(page) = Page::from_value(result) {
        debug!(
            what,
            count = page.nodes.len(),
            has_next_page = page.page_info.has_next_page,
            "search page returned"
        );
    }
}
