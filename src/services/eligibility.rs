use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::tag::Tag;

/// One item of the catalog snapshot the filter runs over: a question or a
/// video clip, reduced to the fields eligibility cares about.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub id: Uuid,
    pub is_active: bool,
    pub is_user_generated: bool,
    pub created_by: Option<Uuid>,
    pub category_slug: Option<String>,
    pub category_type: Option<String>,
    pub tag_ids: HashSet<Uuid>,
}

/// Caller-supplied constraints, straight from the request.
#[derive(Debug, Clone, Default)]
pub struct EligibilityConstraints {
    pub category_slug: Option<String>,
    pub category_type: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

/// Deterministic predicate over catalog items. Requested tags are grouped by
/// their axis: an item must carry at least one requested tag from every
/// constrained axis (OR within an axis, AND across axes). An empty tag set
/// constrains nothing.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    category_slug: Option<String>,
    category_type: Option<String>,
    caller: Uuid,
    axis_groups: HashMap<String, HashSet<Uuid>>,
}

impl EligibilityFilter {
    /// Builds the predicate, validating every requested tag against the tag
    /// registry. Axes are an open set; unknown tag ids are a payload error,
    /// not a silent no-match.
    pub fn new(
        constraints: &EligibilityConstraints,
        registry: &[Tag],
        caller: Uuid,
    ) -> Result<Self> {
        let by_id: HashMap<Uuid, &Tag> = registry.iter().map(|t| (t.id, t)).collect();

        let mut axis_groups: HashMap<String, HashSet<Uuid>> = HashMap::new();
        for tag_id in &constraints.tag_ids {
            let tag = by_id.get(tag_id).ok_or_else(|| {
                Error::InvalidPayload(format!("Unknown tag id: {}", tag_id))
            })?;
            axis_groups
                .entry(tag.axis.clone())
                .or_default()
                .insert(tag.id);
        }

        Ok(Self {
            category_slug: constraints.category_slug.clone(),
            category_type: constraints.category_type.clone(),
            caller,
            axis_groups,
        })
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        if !item.is_active {
            return false;
        }
        if item.is_user_generated && item.created_by != Some(self.caller) {
            return false;
        }
        if let Some(slug) = &self.category_slug {
            if item.category_slug.as_deref() != Some(slug.as_str()) {
                return false;
            }
        }
        if let Some(ty) = &self.category_type {
            if item.category_type.as_deref() != Some(ty.as_str()) {
                return false;
            }
        }
        for wanted in self.axis_groups.values() {
            if item.tag_ids.is_disjoint(wanted) {
                return false;
            }
        }
        true
    }

    /// Eligible ids of a snapshot, in snapshot order.
    pub fn apply(&self, universe: &[CatalogItem]) -> Vec<Uuid> {
        universe
            .iter()
            .filter(|item| self.matches(item))
            .map(|item| item.id)
            .collect()
    }
}
