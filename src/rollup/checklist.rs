//! Checklist reconciliation.
//!
//! Brings a named checklist on a card to hold exactly one item per desired
//! label. The diff is always recomputed from the service's current state, so
//! a call that failed halfway is finished by simply calling again, and a call
//! with an unchanged desired set sends no mutations at all.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::RollupError;
use crate::ports::{BoardService, Card, CheckItem, Checklist};

/// The checklist a plan applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChecklistTarget {
    /// A checklist with a matching name already exists on the card.
    Existing(Checklist),
    /// No checklist matched; one will be created with this exact name.
    Missing {
        /// Name the new checklist is created with.
        name: String,
    },
}

impl ChecklistTarget {
    /// Display name of the target checklist.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Existing(checklist) => &checklist.name,
            Self::Missing { name } => name,
        }
    }
}

/// Mutations needed to make a checklist match a desired label set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistPlan {
    /// Checklist to mutate, or the name of the one to create.
    pub target: ChecklistTarget,
    /// Items whose label is not desired, plus repeated copies of a label.
    pub delete: Vec<CheckItem>,
    /// Desired labels with no item yet, in label order.
    pub create: Vec<String>,
}

impl ChecklistPlan {
    /// Number of requests applying the plan sends.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        usize::from(matches!(self.target, ChecklistTarget::Missing { .. }))
            + self.delete.len()
            + self.create.len()
    }

    /// Whether applying the plan would send no request at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.mutation_count() == 0
    }
}

/// Returns the first checklist whose name equals `name`, ignoring case.
#[must_use]
pub fn find_checklist(checklists: Vec<Checklist>, name: &str) -> Option<Checklist> {
    let wanted = name.to_lowercase();
    checklists.into_iter().find(|checklist| checklist.name.to_lowercase() == wanted)
}

/// Computes the set difference between `existing` items and `desired`.
///
/// Labels are compared exactly; only the checklist name is case-insensitive.
/// When `existing` is `None` every desired label is created on a new
/// checklist called `name`.
#[must_use]
pub fn plan_checklist(
    existing: Option<Checklist>,
    name: &str,
    desired: &BTreeSet<String>,
) -> ChecklistPlan {
    let Some(checklist) = existing else {
        return ChecklistPlan {
            target: ChecklistTarget::Missing { name: name.to_string() },
            delete: Vec::new(),
            create: desired.iter().cloned().collect(),
        };
    };

    let mut current: HashSet<&str> = HashSet::new();
    let mut delete = Vec::new();
    for item in &checklist.items {
        // `insert` is false for a second copy of a label.
        if !desired.contains(&item.label) || !current.insert(item.label.as_str()) {
            delete.push(item.clone());
        }
    }
    let create =
        desired.iter().filter(|label| !current.contains(label.as_str())).cloned().collect();

    ChecklistPlan { target: ChecklistTarget::Existing(checklist), delete, create }
}

/// Fetches the card's checklists and plans the changes for `name`.
///
/// # Errors
///
/// Returns an error if the card's checklists cannot be fetched.
pub async fn plan_for_card(
    service: &dyn BoardService,
    card: &Card,
    name: &str,
    desired: &BTreeSet<String>,
) -> Result<ChecklistPlan, RollupError> {
    let checklists = service
        .fetch_checklists(&card.id)
        .await
        .map_err(|source| RollupError::FetchChecklists { card: card.title.clone(), source })?;
    Ok(plan_checklist(find_checklist(checklists, name), name, desired))
}

/// Sends the mutations of `plan`: create the checklist if missing, then
/// delete unwanted items, then add missing ones.
///
/// Stops at the first failure without undoing earlier mutations.
///
/// # Errors
///
/// Returns an error if any create or delete request fails.
pub async fn apply_plan(
    service: &dyn BoardService,
    card: &Card,
    plan: &ChecklistPlan,
) -> Result<(), RollupError> {
    let checklist_id = match &plan.target {
        ChecklistTarget::Existing(checklist) => checklist.id.clone(),
        ChecklistTarget::Missing { name } => {
            debug!(card = %card.title, checklist = %name, "creating checklist");
            service
                .create_checklist(&card.id, name)
                .await
                .map_err(|source| RollupError::CreateChecklist {
                    card: card.title.clone(),
                    name: name.clone(),
                    source,
                })?
                .id
        }
    };
    let checklist = plan.target.name();

    for item in &plan.delete {
        debug!(card = %card.title, checklist, label = %item.label, "removing item");
        service.delete_check_item(&checklist_id, &item.id).await.map_err(|source| {
            RollupError::DeleteCheckItem {
                checklist: checklist.to_string(),
                label: item.label.clone(),
                source,
            }
        })?;
    }

    for label in &plan.create {
        debug!(card = %card.title, checklist, label = %label, "adding item");
        service.create_check_item(&checklist_id, label).await.map_err(|source| {
            RollupError::CreateCheckItem {
                checklist: checklist.to_string(),
                label: label.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

/// Makes the checklist `name` on `card` hold exactly one item per label in
/// `desired`, and returns the plan that was applied.
///
/// # Errors
///
/// Returns an error on the first failed fetch, create or delete.
pub async fn reconcile(
    service: &dyn BoardService,
    card: &Card,
    name: &str,
    desired: &BTreeSet<String>,
) -> Result<ChecklistPlan, RollupError> {
    let plan = plan_for_card(service, card, name, desired).await?;
    apply_plan(service, card, &plan).await?;
    Ok(plan)
}
