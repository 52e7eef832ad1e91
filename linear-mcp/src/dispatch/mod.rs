//! Intent routing and response translation.

pub mod args;
pub mod composite;
pub mod filter;
pub mod normalize;
pub mod page;
pub mod router;
pub mod translate;

pub use composite::{create_project_with_issues, CompositeOutcome, CompositeStep, ProjectWithIssues};
pub use filter::{assemble, FilterCriteria, Predicate, SearchPredicates};
pub use page::{OrderBy, Page, PageInfo, PageRequest};
pub use router::{
    resolve, BatchOutcome, Cardinality, EntityKind, Intent, IntentKind, Outcome, Route, Router,
};
pub use translate::translate;
