use std::collections::BTreeMap;

use tracing::warn;

use crate::ir::{Dataset, Member, RelationshipKind};

use super::error::LayoutWarning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedRelationship {
    pub kind: RelationshipKind,
    pub member1: String,
    pub member2: String,
}

#[derive(Debug, Default)]
pub(crate) struct Normalized {
    /// Members keyed by canonical id.
    pub members: BTreeMap<String, Member>,
    pub relationships: Vec<NormalizedRelationship>,
}

fn is_reserved(id: &str) -> bool {
    id.starts_with("union-") || id.starts_with("virtual-")
}

/// Canonicalizes ids and drops every relationship that cannot be placed.
pub(crate) fn normalize(dataset: &Dataset, warnings: &mut Vec<LayoutWarning>) -> Normalized {
    let mut out = Normalized::default();

    for member in &dataset.members {
        let id = member.id.canonical();
        if out.members.contains_key(&id) {
            warn!(member = %id, "duplicate member record");
            warnings.push(LayoutWarning::DuplicateMember { member_id: id });
            continue;
        }
        // Would collide with synthesized anchor ids in the output.
        if is_reserved(&id) {
            warn!(member = %id, "member id uses a synthesized prefix");
            warnings.push(LayoutWarning::ReservedMemberId { member_id: id });
            continue;
        }
        out.members.insert(id, member.clone());
    }

    for (index, rel) in dataset.relationships.iter().enumerate() {
        let Some(kind) = rel.kind() else {
            warn!(index, value = %rel.relationship_type, "unknown relationship type");
            warnings.push(LayoutWarning::UnknownRelationshipType {
                index,
                value: rel.relationship_type.clone(),
            });
            continue;
        };
        let member1 = rel.member1_id.canonical();
        let member2 = rel.member2_id.canonical();

        let missing = [&member1, &member2]
            .into_iter()
            .find(|id| !out.members.contains_key(id.as_str()));
        if let Some(missing) = missing {
            warn!(index, member = %missing, "relationship references unknown member");
            warnings.push(LayoutWarning::DanglingReference {
                index,
                member_id: missing.clone(),
            });
            continue;
        }

        // A self parent-child record is kept: the cycle check reports it.
        if kind == RelationshipKind::Partner && member1 == member2 {
            warn!(index, member = %member1, "self partnership");
            warnings.push(LayoutWarning::SelfPartnership {
                index,
                member_id: member1,
            });
            continue;
        }

        out.relationships.push(NormalizedRelationship {
            kind,
            member1,
            member2,
        });
    }

    out
}
