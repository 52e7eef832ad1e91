use serde_json::{Map, Value};

use super::documents;
use crate::error::{LinearError, LinearResult};

/// Every backend operation this server can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    IssueCreate,
    IssueBatchCreate,
    IssueUpdate,
    IssueBatchUpdate,
    IssueDelete,
    IssueBatchDelete,
    IssueSearch,
    IssueGet,
    ProjectCreate,
    ProjectUpdate,
    ProjectGet,
    ProjectSearch,
    CommentCreate,
    ProjectMilestoneCreate,
    TeamList,
    Viewer,
}

impl OperationId {
    pub const ALL: [OperationId; 16] = [
        OperationId::IssueCreate,
        OperationId::IssueBatchCreate,
        OperationId::IssueUpdate,
        OperationId::IssueBatchUpdate,
        OperationId::IssueDelete,
        OperationId::IssueBatchDelete,
        OperationId::IssueSearch,
        OperationId::IssueGet,
        OperationId::ProjectCreate,
        OperationId::ProjectUpdate,
        OperationId::ProjectGet,
        OperationId::ProjectSearch,
        OperationId::CommentCreate,
        OperationId::ProjectMilestoneCreate,
        OperationId::TeamList,
        OperationId::Viewer,
    ];

    pub fn descriptor(self) -> &'static OperationDescriptor {
        match self {
            OperationId::IssueCreate => &ISSUE_CREATE,
            OperationId::IssueBatchCreate => &ISSUE_BATCH_CREATE,
            OperationId::IssueUpdate => &ISSUE_UPDATE,
            OperationId::IssueBatchUpdate => &ISSUE_BATCH_UPDATE,
            OperationId::IssueDelete => &ISSUE_DELETE,
            OperationId::IssueBatchDelete => &ISSUE_BATCH_DELETE,
            OperationId::IssueSearch => &ISSUE_SEARCH,
            OperationId::IssueGet => &ISSUE_GET,
            OperationId::ProjectCreate => &PROJECT_CREATE,
            OperationId::ProjectUpdate => &PROJECT_UPDATE,
            OperationId::ProjectGet => &PROJECT_GET,
            OperationId::ProjectSearch => &PROJECT_SEARCH,
            OperationId::CommentCreate => &COMMENT_CREATE,
            OperationId::ProjectMilestoneCreate => &PROJECT_MILESTONE_CREATE,
            OperationId::TeamList => &TEAM_LIST,
            OperationId::Viewer => &VIEWER,
        }
    }
}

/// A variable declared by an operation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDecl {
    pub name: &'static str,
    pub required: bool,
}

const fn required(name: &'static str) -> VariableDecl {
    VariableDecl {
        name,
        required: true,
    }
}

const fn optional(name: &'static str) -> VariableDecl {
    VariableDecl {
        name,
        required: false,
    }
}

/// What lives under an operation's result field.
///
/// Mutations carry a `success` flag next to their payload; queries return the
/// payload directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// `{ success, <field>: Entity }`
    Entity(&'static str),
    /// `{ success, <field>: [Entity] }`
    Entities(&'static str),
    /// `{ success }` only
    Ack,
    /// The result field is the payload itself (no `success` flag)
    Query,
}

impl ResultShape {
    pub fn is_mutation(self) -> bool {
        !matches!(self, ResultShape::Query)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub id: OperationId,
    /// GraphQL `operationName`
    pub name: &'static str,
    pub document: &'static str,
    pub variables: &'static [VariableDecl],
    /// Top-level field of the response `data` object
    pub result_field: &'static str,
    pub shape: ResultShape,
}

impl OperationDescriptor {
    /// Check `variables` against the declaration: every key must be declared,
    /// and every required variable must be present and non-null.
    pub fn bind(&self, variables: Map<String, Value>) -> LinearResult<Map<String, Value>> {
        if let Some(extra) = variables
            .keys()
            .find(|key| !self.variables.iter().any(|decl| decl.name == key.as_str()))
        {
            return Err(LinearError::Binding {
                operation: self.name.to_string(),
                message: format!("undeclared variable '{}'", extra),
            });
        }

        if let Some(missing) = self
            .variables
            .iter()
            .filter(|decl| decl.required)
            .find(|decl| variables.get(decl.name).map_or(true, Value::is_null))
        {
            return Err(LinearError::Binding {
                operation: self.name.to_string(),
                message: format!("missing required variable '{}'", missing.name),
            });
        }

        Ok(variables)
    }
}

static ISSUE_CREATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueCreate,
    name: "IssueCreate",
    document: documents::ISSUE_CREATE,
    variables: &[required("input")],
    result_field: "issueCreate",
    shape: ResultShape::Entity("issue"),
};

static ISSUE_BATCH_CREATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueBatchCreate,
    name: "IssueBatchCreate",
    document: documents::ISSUE_BATCH_CREATE,
    variables: &[required("input")],
    result_field: "issueBatchCreate",
    shape: ResultShape::Entities("issues"),
};

static ISSUE_UPDATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueUpdate,
    name: "IssueUpdate",
    document: documents::ISSUE_UPDATE,
    variables: &[required("id"), required("input")],
    result_field: "issueUpdate",
    shape: ResultShape::Entity("issue"),
};

static ISSUE_BATCH_UPDATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueBatchUpdate,
    name: "IssueBatchUpdate",
    document: documents::ISSUE_BATCH_UPDATE,
    variables: &[required("ids"), required("input")],
    result_field: "issueBatchUpdate",
    shape: ResultShape::Entities("issues"),
};

// Single and batch delete share `issueDelete` as their result field.
static ISSUE_DELETE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueDelete,
    name: "IssueDelete",
    document: documents::ISSUE_DELETE,
    variables: &[required("id")],
    result_field: "issueDelete",
    shape: ResultShape::Ack,
};

static ISSUE_BATCH_DELETE: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueBatchDelete,
    name: "IssueBatchDelete",
    document: documents::ISSUE_BATCH_DELETE,
    variables: &[required("ids")],
    result_field: "issueDelete",
    shape: ResultShape::Ack,
};

static ISSUE_SEARCH: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueSearch,
    name: "IssueSearch",
    document: documents::ISSUE_SEARCH,
    variables: &[
        optional("filter"),
        optional("first"),
        optional("after"),
        optional("orderBy"),
    ],
    result_field: "issues",
    shape: ResultShape::Query,
};

static ISSUE_GET: OperationDescriptor = OperationDescriptor {
    id: OperationId::IssueGet,
    name: "IssueGet",
    document: documents::ISSUE_GET,
    variables: &[required("id")],
    result_field: "issue",
    shape: ResultShape::Query,
};

static PROJECT_CREATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::ProjectCreate,
    name: "ProjectCreate",
    document: documents::PROJECT_CREATE,
    variables: &[required("input")],
    result_field: "projectCreate",
    shape: ResultShape::Entity("project"),
};

static PROJECT_UPDATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::ProjectUpdate,
    name: "ProjectUpdate",
    document: documents::PROJECT_UPDATE,
    variables: &[required("id"), required("input")],
    result_field: "projectUpdate",
    shape: ResultShape::Entity("project"),
};

static PROJECT_GET: OperationDescriptor = OperationDescriptor {
    id: OperationId::ProjectGet,
    name: "ProjectGet",
    document: documents::PROJECT_GET,
    variables: &[required("id")],
    result_field: "project",
    shape: ResultShape::Query,
};

static PROJECT_SEARCH: OperationDescriptor = OperationDescriptor {
    id: OperationId::ProjectSearch,
    name: "ProjectSearch",
    document: documents::PROJECT_SEARCH,
    variables: &[optional("filter"), optional("first"), optional("after")],
    result_field: "projects",
    shape: ResultShape::Query,
};

static COMMENT_CREATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::CommentCreate,
    name: "CommentCreate",
    document: documents::COMMENT_CREATE,
    variables: &[required("input")],
    result_field: "commentCreate",
    shape: ResultShape::Entity("comment"),
};

static PROJECT_MILESTONE_CREATE: OperationDescriptor = OperationDescriptor {
    id: OperationId::ProjectMilestoneCreate,
    name: "ProjectMilestoneCreate",
    document: documents::PROJECT_MILESTONE_CREATE,
    variables: &[required("input")],
    result_field: "projectMilestoneCreate",
    shape: ResultShape::Entity("projectMilestone"),
};

static TEAM_LIST: OperationDescriptor = OperationDescriptor {
    id: OperationId::TeamList,
    name: "TeamList",
    document: documents::TEAM_LIST,
    variables: &[optional("first"), optional("after")],
    result_field: "teams",
    shape: ResultShape::Query,
};

static VIEWER: OperationDescriptor = OperationDescriptor {
    id: OperationId::Viewer,
    name: "Viewer",
    document: documents::VIEWER,
    variables: &[],
    result_field: "viewer",
    shape: ResultShape::Query,
};
