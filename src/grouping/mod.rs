//! Family pairing and the group board used by the department export.
//!
//! Members are partitioned into their groups, then each group's leaders and
//! non-leaders are folded into families independently: two records form a
//! couple only when each names the other as spouse. Everything else is a
//! single. Nothing is cached; every call recomputes from its input.

use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::{Group, MemberDirectory};

pub const UNASSIGNED_LABEL: &str = "미배정";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Family {
    Couple {
        first: MemberDirectory,
        second: MemberDirectory,
        children_info: Option<String>,
    },
    Single {
        member: MemberDirectory,
        children_info: Option<String>,
    },
}

impl Family {
    pub fn members(&self) -> Vec<&MemberDirectory> {
        match self {
            Family::Couple { first, second, .. } => vec![first, second],
            Family::Single { member, .. } => vec![member],
        }
    }

    pub fn children_info(&self) -> Option<&str> {
        match self {
            Family::Couple { children_info, .. } | Family::Single { children_info, .. } => {
                children_info.as_deref()
            }
        }
    }

    /// "이름 · 배우자" for couples, the bare name otherwise
    pub fn label(&self) -> String {
        match self {
            Family::Couple { first, second, .. } => {
                format!("{} · {}", first.full_name.trim(), second.full_name.trim())
            }
            Family::Single { member, .. } => member.full_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSection {
    pub group_id: Option<Uuid>,
    pub name: String,
    pub leaders: Vec<Family>,
    pub members: Vec<Family>,
    pub headcount: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBoard {
    pub sections: Vec<GroupSection>,
    pub unassigned: GroupSection,
}

impl GroupBoard {
    pub fn headcount(&self) -> usize {
        self.sections.iter().map(|s| s.headcount).sum::<usize>() + self.unassigned.headcount
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Mutual reference: each record names the other as spouse
pub fn are_spouses(a: &MemberDirectory, b: &MemberDirectory) -> bool {
    if a.id == b.id {
        return false;
    }
    match (non_blank(a.spouse_name.as_deref()), non_blank(b.spouse_name.as_deref())) {
        (Some(a_spouse), Some(b_spouse)) => {
            a.full_name.trim() == b_spouse && b.full_name.trim() == a_spouse
        }
        _ => false,
    }
}

/// Drops repeated ids, keeping the first occurrence
fn unique_by_id<'a>(
    members: impl IntoIterator<Item = &'a MemberDirectory>,
) -> Vec<&'a MemberDirectory> {
    let mut ids = HashSet::new();
    members.into_iter().filter(|m| ids.insert(m.id)).collect()
}

/// Fold members into families, in input order. Every distinct record lands in
/// exactly one family.
pub fn pair_families<'a>(members: impl IntoIterator<Item = &'a MemberDirectory>) -> Vec<Family> {
    let members = unique_by_id(members);
    let mut consumed: HashSet<Uuid> = HashSet::with_capacity(members.len());
    let mut families = Vec::with_capacity(members.len());

    for (i, a) in members.iter().enumerate() {
        if !consumed.insert(a.id) {
            continue;
        }

        let partner = members[i + 1..]
            .iter()
            .find(|b| !consumed.contains(&b.id) && are_spouses(a, b));

        // Tie-break when both halves carry children info: the earlier record wins
        let family = match partner {
            Some(b) => {
                consumed.insert(b.id);
                let children_info = non_blank(a.children_info.as_deref())
                    .or_else(|| non_blank(b.children_info.as_deref()))
                    .map(str::to_string);
                Family::Couple {
                    first: (*a).clone(),
                    second: (*b).clone(),
                    children_info,
                }
            }
            None => Family::Single {
                member: (*a).clone(),
                children_info: non_blank(a.children_info.as_deref()).map(str::to_string),
            },
        };
        families.push(family);
    }

    families
}

fn section(group_id: Option<Uuid>, name: String, members: &[&MemberDirectory]) -> GroupSection {
    let (leaders, rest): (Vec<&MemberDirectory>, Vec<&MemberDirectory>) =
        members.iter().copied().partition(|m| m.is_leader());

    GroupSection {
        group_id,
        name,
        leaders: pair_families(leaders),
        members: pair_families(rest),
        headcount: members.len(),
    }
}

/// Partition a department's members into its groups.
///
/// Assignment order: `group_id` naming a known group, then an exact
/// `group_name` match, then an ad-hoc section per unknown `group_name`
/// (after the known groups, first-seen order). Members with neither land in
/// the unassigned section.
pub fn build_board(groups: &[Group], members: &[MemberDirectory]) -> GroupBoard {
    let members = unique_by_id(members);

    let mut buckets: Vec<(Option<Uuid>, String, Vec<&MemberDirectory>)> = groups
        .iter()
        .map(|g| (Some(g.id), g.name.trim().to_string(), Vec::new()))
        .collect();
    let mut unassigned = Vec::new();

    for member in members {
        let by_id = member
            .group_id
            .and_then(|id| buckets.iter().position(|(gid, _, _)| *gid == Some(id)));
        let name = non_blank(member.group_name.as_deref());
        let by_name = || name.and_then(|n| buckets.iter().position(|(_, bname, _)| bname == n));

        match by_id.or_else(by_name) {
            Some(idx) => buckets[idx].2.push(member),
            None => match name {
                Some(n) => buckets.push((None, n.to_string(), vec![member])),
                None => unassigned.push(member),
            },
        }
    }

    GroupBoard {
        sections: buckets
            .into_iter()
            .map(|(id, name, members)| section(id, name, &members))
            .collect(),
        unassigned: section(None, UNASSIGNED_LABEL.to_string(), &unassigned),
    }
}
