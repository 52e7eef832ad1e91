//! GraphQL documents for every backend operation.
//!
//! Each document is opaque to the dispatch layer; only the operation name,
//! declared variables and result field (see `super::table`) are interpreted.

macro_rules! issue_fields {
    () => {
        "id identifier number title description priority estimate url \
         state { id name type } assignee { id name } team { id key name } \
         project { id name } createdAt updatedAt"
    };
}

macro_rules! project_fields {
    () => {
        "id name description state url targetDate teams { nodes { id key name } } \
         createdAt updatedAt"
    };
}

pub const ISSUE_CREATE: &str = concat!(
    "mutation IssueCreate($input: IssueCreateInput!) { ",
    "issueCreate(input: $input) { success issue { ",
    issue_fields!(),
    " } } }"
);

pub const ISSUE_BATCH_CREATE: &str = concat!(
    "mutation IssueBatchCreate($input: IssueBatchCreateInput!) { ",
    "issueBatchCreate(input: $input) { success issues { ",
    issue_fields!(),
    " } } }"
);

pub const ISSUE_UPDATE: &str = concat!(
    "mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) { ",
    "issueUpdate(id: $id, input: $input) { success issue { ",
    issue_fields!(),
    " } } }"
);

pub const ISSUE_BATCH_UPDATE: &str = concat!(
    "mutation IssueBatchUpdate($ids: [UUID!]!, $input: IssueUpdateInput!) { ",
    "issueBatchUpdate(ids: $ids, input: $input) { success issues { ",
    issue_fields!(),
    " } } }"
);

pub const ISSUE_DELETE: &str =
    "mutation IssueDelete($id: String!) { issueDelete(id: $id) { success } }";

pub const ISSUE_BATCH_DELETE: &str =
    "mutation IssueBatchDelete($ids: [String!]!) { issueDelete(ids: $ids) { success } }";

pub const ISSUE_SEARCH: &str = concat!(
    "query IssueSearch($filter: IssueFilter, $first: Int, $after: String, ",
    "$orderBy: PaginationOrderBy) { ",
    "issues(filter: $filter, first: $first, after: $after, orderBy: $orderBy) { ",
    "nodes { ",
    issue_fields!(),
    " } pageInfo { hasNextPage endCursor } } }"
);

pub const ISSUE_GET: &str = concat!(
    "query IssueGet($id: String!) { issue(id: $id) { ",
    issue_fields!(),
    " comments { nodes { id body user { id name } createdAt } } } }"
);

pub const PROJECT_CREATE: &str = concat!(
    "mutation ProjectCreate($input: ProjectCreateInput!) { ",
    "projectCreate(input: $input) { success project { ",
    project_fields!(),
    " } } }"
);

pub const PROJECT_UPDATE: &str = concat!(
    "mutation ProjectUpdate($id: String!, $input: ProjectUpdateInput!) { ",
    "projectUpdate(id: $id, input: $input) { success project { ",
    project_fields!(),
    " } } }"
);

pub const PROJECT_GET: &str = concat!(
    "query ProjectGet($id: String!) { project(id: $id) { ",
    project_fields!(),
    " projectMilestones { nodes { id name targetDate } } ",
    "issues { nodes { id identifier title } } } }"
);

pub const PROJECT_SEARCH: &str = concat!(
    "query ProjectSearch($filter: ProjectFilter, $first: Int, $after: String) { ",
    "projects(filter: $filter, first: $first, after: $after) { nodes { ",
    project_fields!(),
    " } pageInfo { hasNextPage endCursor } } }"
);

pub const COMMENT_CREATE: &str = "mutation CommentCreate($input: CommentCreateInput!) { \
     commentCreate(input: $input) { success comment { id body url createdAt \
     issue { id identifier } user { id name } } } }";

pub const PROJECT_MILESTONE_CREATE: &str =
    "mutation ProjectMilestoneCreate($input: ProjectMilestoneCreateInput!) { \
     projectMilestoneCreate(input: $input) { success projectMilestone { id name \
     description targetDate project { id name } } } }";

pub const TEAM_LIST: &str = "query TeamList($first: Int, $after: String) { \
     teams(first: $first, after: $after) { nodes { id key name description \
     states { nodes { id name type } } } pageInfo { hasNextPage endCursor } } }";

pub const VIEWER: &str = "query Viewer { viewer { id name email displayName \
     organization { id name urlKey } } }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_expanded_into_documents() {
        assert!(ISSUE_CREATE.contains("issueCreate(input: $input) { success issue { id identifier"));
        assert!(ISSUE_BATCH_CREATE.contains("success issues { id identifier"));
        assert!(PROJECT_CREATE.contains("teams { nodes { id key name } }"));
    }

    #[test]
    fn both_deletes_share_the_result_field() {
        assert!(ISSUE_BATCH_DELETE.contains("issueDelete(ids: $ids)"));
        assert!(ISSUE_DELETE.contains("issueDelete(id: $id)"));
    }
}
