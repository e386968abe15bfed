//! News grouping state machine.
//!
//! Every news row is either a representative (`is_representative = true`,
//! `group_id = NULL`) or a member pointing at a representative. Groups are a
//! single level deep: a member never has members of its own.
//!
//! The functions here only decide *what* must change. They take a snapshot of
//! the rows involved and return the membership each affected row must end up
//! with; `NewsService` loads the snapshot and applies the plan inside one
//! transaction.

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Membership, News, NewsWithRelated};

/// Snapshot of one news row and the ids of the rows grouped under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub id: i32,
    pub membership: Membership,
    pub members: Vec<i32>,
}

/// New membership for a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipChange {
    pub id: i32,
    pub membership: Membership,
}

impl MembershipChange {
    fn new(id: i32, membership: Membership) -> Self {
        Self { id, membership }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingError {
    #[error("News with id {0} not found")]
    NotFound(i32),

    #[error("News {0} is not a representative and cannot be used as a group")]
    InvalidTarget(i32),

    #[error("News {0} cannot be assigned to its own group")]
    SelfAssignment(i32),
}

impl From<GroupingError> for AppError {
    fn from(err: GroupingError) -> Self {
        match err {
            GroupingError::NotFound(_) => AppError::NotFound(err.to_string()),
            GroupingError::InvalidTarget(_) | GroupingError::SelfAssignment(_) => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

/// Plans attaching `item` to the group headed by `group_id`, or detaching it
/// when `group_id` is `None`.
///
/// `target` is the snapshot of the row `group_id` names, `None` if it does not
/// exist. An item that heads its own group takes its members along: they are
/// re-pointed at the new representative so no member is left behind.
pub fn plan_assignment(
    item: &GroupNode,
    group_id: Option<i32>,
    target: Option<&GroupNode>,
) -> Result<Vec<MembershipChange>, GroupingError> {
    let Some(group_id) = group_id else {
        if item.membership.is_representative() {
            return Ok(Vec::new());
        }
        return Ok(vec![MembershipChange::new(
            item.id,
            Membership::Representative,
        )]);
    };

    if group_id == item.id {
        return Err(GroupingError::SelfAssignment(item.id));
    }

    let target = match target {
        Some(t) if t.id == group_id && t.membership.is_representative() => t,
        _ => return Err(GroupingError::InvalidTarget(group_id)),
    };

    if item.membership == Membership::Member(target.id) {
        return Ok(Vec::new());
    }

    let mut changes: Vec<MembershipChange> = item
        .members
        .iter()
        .map(|&member| MembershipChange::new(member, Membership::Member(target.id)))
        .collect();
    changes.push(MembershipChange::new(item.id, Membership::Member(target.id)));

    Ok(changes)
}

/// Plans promoting `item` to representative of the group it belongs to.
///
/// `old_rep` is the snapshot of the current representative. Every other member
/// and the old representative itself end up pointing at `item`. Promoting an
/// item that already is a representative plans nothing.
pub fn plan_promotion(
    item: &GroupNode,
    old_rep: Option<&GroupNode>,
) -> Result<Vec<MembershipChange>, GroupingError> {
    let Membership::Member(old_rep_id) = item.membership else {
        return Ok(Vec::new());
    };

    let old_rep = match old_rep {
        Some(rep) if rep.id == old_rep_id => rep,
        _ => return Err(GroupingError::NotFound(old_rep_id)),
    };

    let new_rep = Membership::Member(item.id);
    let mut changes: Vec<MembershipChange> = old_rep
        .members
        .iter()
        .filter(|&&member| member != item.id)
        .map(|&member| MembershipChange::new(member, new_rep))
        .collect();
    changes.push(MembershipChange::new(old_rep.id, new_rep));
    changes.push(MembershipChange::new(item.id, Membership::Representative));

    Ok(changes)
}

/// Plans the detachments that must happen before `item` is deleted: each of
/// its members becomes an independent representative.
pub fn plan_delete(item: &GroupNode) -> Vec<MembershipChange> {
    item.members
        .iter()
        .map(|&member| MembershipChange::new(member, Membership::Representative))
        .collect()
}

/// Nests published members under their representatives.
///
/// Both inputs are expected in display order; it is preserved. Members whose
/// representative is not in `representatives` are dropped.
pub fn aggregate_groups(representatives: Vec<News>, members: Vec<News>) -> Vec<NewsWithRelated> {
    let mut by_rep: HashMap<i32, Vec<News>> = HashMap::new();
    for member in members {
        if let Membership::Member(rep_id) = member.membership() {
            by_rep.entry(rep_id).or_default().push(member);
        }
    }

    representatives
        .into_iter()
        .filter(|rep| rep.membership().is_representative())
        .map(|rep| {
            let related_news = by_rep.remove(&rep.id).unwrap_or_default();
            NewsWithRelated {
                news: rep,
                related_news,
            }
        })
        .collect()
}
