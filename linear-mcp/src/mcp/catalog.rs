//! The `linear_*` tool catalog.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};

use super::server::{MCPServer, ToolHandler};
use crate::error::LinearResult;
use crate::tools::LinearTools;

/// Wrap a [`LinearTools`] method as a boxed MCP handler.
fn handler<F, Fut>(tools: &Arc<LinearTools>, call: F) -> ToolHandler
where
    F: Fn(Arc<LinearTools>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LinearResult<Value>> + Send + 'static,
{
    let tools = tools.clone();
    Box::new(move |params| {
        let future: Pin<Box<dyn Future<Output = LinearResult<Value>> + Send>> =
            Box::pin(call(tools.clone(), params));
        future
    })
}

fn issue_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "Issue title" },
            "teamId": { "type": "string", "description": "Team that owns the issue" },
            "description": { "type": "string", "description": "Markdown description" },
            "assigneeId": { "type": "string" },
            "stateId": { "type": "string" },
            "projectId": { "type": "string" },
            "labelIds": { "type": "array", "items": { "type": "string" } },
            "priority": {
                "type": "integer",
                "minimum": 0,
                "maximum": 4,
                "description": "0 = none, 1 = urgent, 2 = high, 3 = normal, 4 = low"
            },
            "estimate": { "type": "integer", "description": "Story points" }
        },
        "required": ["title", "teamId"]
    })
}

fn update_input_schema() -> Value {
    json!({
        "type": "object",
        "description": "Fields to change; at least one is required",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "assigneeId": { "type": "string" },
            "stateId": { "type": "string" },
            "projectId": { "type": "string" },
            "priority": { "type": "integer", "minimum": 0, "maximum": 4 },
            "estimate": { "type": "integer" }
        }
    })
}

fn page_properties() -> Value {
    json!({
        "first": { "type": "integer", "minimum": 1, "description": "Page size" },
        "after": { "type": "string", "description": "Cursor from a previous page's endCursor" }
    })
}

fn with_page(mut schema: Value) -> Value {
    if let (Some(props), Value::Object(page)) = (
        schema.get_mut("properties").and_then(Value::as_object_mut),
        page_properties(),
    ) {
        props.extend(page);
    }
    schema
}

/// Register every Linear tool on `server`.
pub fn register_linear_tools(server: &mut MCPServer, tools: Arc<LinearTools>) {
    server.register_tool(
        "linear_create_issue",
        "Create a single issue",
        issue_input_schema(),
        handler(&tools, |t, args| async move { t.create_issue(args).await }),
    );

    server.register_tool(
        "linear_create_issues",
        "Create several issues in one batch call",
        json!({
            "type": "object",
            "properties": {
                "issues": {
                    "type": "array",
                    "minItems": 1,
                    "items": issue_input_schema()
                }
            },
            "required": ["issues"]
        }),
        handler(&tools, |t, args| async move { t.create_issues(args).await }),
    );

    server.register_tool(
        "linear_update_issues",
        "Apply the same update to one or more issues",
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "A single issue id" },
                "ids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Issue ids; ignored when id is given"
                },
                "update": update_input_schema()
            },
            "required": ["update"]
        }),
        handler(&tools, |t, args| async move { t.update_issues(args).await }),
    );

    server.register_tool(
        "linear_delete_issue",
        "Delete one issue",
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" }
            },
            "required": ["id"]
        }),
        handler(&tools, |t, args| async move { t.delete_issue(args).await }),
    );

    server.register_tool(
        "linear_delete_issues",
        "Delete several issues in one call",
        json!({
            "type": "object",
            "properties": {
                "ids": { "type": "array", "minItems": 1, "items": { "type": "string" } }
            },
            "required": ["ids"]
        }),
        handler(&tools, |t, args| async move { t.delete_issues(args).await }),
    );

    server.register_tool(
        "linear_search_issues",
        "Search issues by text, identifier, project, team, assignee, state or priority",
        with_page(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free text or an identifier such as ENG-42"
                },
                "filter": {
                    "type": "object",
                    "description": "Structured filter; only project.id.eq is read",
                    "properties": {
                        "project": {
                            "type": "object",
                            "properties": {
                                "id": {
                                    "type": "object",
                                    "properties": { "eq": { "type": "string" } }
                                }
                            }
                        }
                    }
                },
                "teamIds": { "type": "array", "items": { "type": "string" } },
                "assigneeIds": { "type": "array", "items": { "type": "string" } },
                "states": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Workflow state names"
                },
                "priority": { "type": "integer", "minimum": 0, "maximum": 4 },
                "orderBy": {
                    "type": "string",
                    "enum": ["createdAt", "updatedAt"],
                    "default": "updatedAt"
                }
            }
        })),
        handler(&tools, |t, args| async move { t.search_issues(args).await }),
    );

    server.register_tool(
        "linear_get_issue",
        "Fetch one issue by id or identifier",
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" }
            },
            "required": ["id"]
        }),
        handler(&tools, |t, args| async move { t.get_issue(args).await }),
    );

    server.register_tool(
        "linear_create_project_with_issues",
        "Create a project, then create its issues inside it",
        json!({
            "type": "object",
            "properties": {
                "project": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "teamIds": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string" }
                        },
                        "description": { "type": "string" },
                        "targetDate": { "type": "string" }
                    },
                    "required": ["name", "teamIds"]
                },
                "issues": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "teamId": {
                                "type": "string",
                                "description": "Defaults to the project's first team"
                            },
                            "description": { "type": "string" },
                            "priority": { "type": "integer", "minimum": 0, "maximum": 4 },
                            "estimate": { "type": "integer" }
                        },
                        "required": ["title"]
                    }
                }
            },
            "required": ["project", "issues"]
        }),
        handler(&tools, |t, args| async move {
            t.create_project_with_issues(args).await
        }),
    );

    server.register_tool(
        "linear_get_project",
        "Fetch one project by id",
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" }
            },
            "required": ["id"]
        }),
        handler(&tools, |t, args| async move { t.get_project(args).await }),
    );

    server.register_tool(
        "linear_search_projects",
        "Search projects by name",
        with_page(json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Case-insensitive name fragment" }
            }
        })),
        handler(&tools, |t, args| async move { t.search_projects(args).await }),
    );

    server.register_tool(
        "linear_update_project",
        "Update one project",
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "update": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "state": { "type": "string" },
                        "targetDate": { "type": "string" }
                    }
                }
            },
            "required": ["id", "update"]
        }),
        handler(&tools, |t, args| async move { t.update_project(args).await }),
    );

    server.register_tool(
        "linear_create_comment",
        "Comment on an issue",
        json!({
            "type": "object",
            "properties": {
                "issueId": { "type": "string" },
                "body": { "type": "string", "description": "Markdown body" }
            },
            "required": ["issueId", "body"]
        }),
        handler(&tools, |t, args| async move { t.create_comment(args).await }),
    );

    server.register_tool(
        "linear_create_project_milestone",
        "Add a milestone to a project",
        json!({
            "type": "object",
            "properties": {
                "projectId": { "type": "string" },
                "name": { "type": "string" },
                "description": { "type": "string" },
                "targetDate": { "type": "string", "description": "ISO date, e.g. 2025-03-31" }
            },
            "required": ["projectId", "name"]
        }),
        handler(&tools, |t, args| async move {
            t.create_project_milestone(args).await
        }),
    );

    server.register_tool(
        "linear_get_teams",
        "List teams visible to the API key",
        with_page(json!({
            "type": "object",
            "properties": {}
        })),
        handler(&tools, |t, args| async move { t.get_teams(args).await }),
    );

    server.register_tool(
        "linear_get_viewer",
        "Show the user the API key belongs to",
        json!({
            "type": "object",
            "properties": {}
        }),
        handler(&tools, |t, args| async move { t.get_viewer(args).await }),
    );
}
