use serde::Serialize;
use thiserror::Error;

/// Failures that stop a build.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Some member is its own ancestor; generation ranks are undefined.
    #[error("cyclic ancestry between members: {}", members.join(", "))]
    CyclicAncestry { members: Vec<String> },
    #[error("invalid dataset: {0}")]
    InvalidDataset(#[from] serde_json::Error),
}

/// Problems in the input that were skipped over. The build still completes
/// for everything that was well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutWarning {
    #[error("relationship #{index} references unknown member {member_id:?}")]
    DanglingReference { index: usize, member_id: String },
    #[error("relationship #{index} has unknown type {value:?}")]
    UnknownRelationshipType { index: usize, value: String },
    #[error("relationship #{index} partners member {member_id:?} with itself")]
    SelfPartnership { index: usize, member_id: String },
    #[error("member {member_id:?} appears more than once; keeping the first record")]
    DuplicateMember { member_id: String },
    #[error("member id {member_id:?} clashes with synthesized node ids; member skipped")]
    ReservedMemberId { member_id: String },
}
