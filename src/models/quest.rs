//! Quest model, lifecycle and bookkeeping rules

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::{
    adventurer::{Adventurer, SortOrder},
    equipment::EquipmentStock,
    reference::NamedRecord,
    user::{Role, UserShort, ANY_ROLE, STAFF},
};

/// Experience gained per day spent on a successful quest
pub const XP_PER_DAY: i64 = 10;

/// Quest lifecycle stage, stored by name in the `statuses` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Waiting,
    Validated,
    Refused,
    Cancelled,
    Started,
    Succeeded,
    Failed,
}

text_enum!(QuestStatus {
    Waiting => "waiting",
    Validated => "validated",
    Refused => "refused",
    Cancelled => "cancelled",
    Started => "started",
    Succeeded => "succeeded",
    Failed => "failed",
});

impl QuestStatus {
    /// Allowed lifecycle moves
    pub fn can_transition_to(self, next: QuestStatus) -> bool {
        use QuestStatus::*;
        matches!(
            (self, next),
            (Waiting, Validated)
                | (Waiting, Refused)
                | (Waiting, Cancelled)
                | (Validated, Started)
                | (Validated, Waiting)
                | (Started, Succeeded)
                | (Started, Failed)
        )
    }

    /// Roles allowed to move a quest into this status. Only cancelling is
    /// open to the quest giver; every other move is staff work.
    pub fn required_roles(self) -> &'static [Role] {
        match self {
            QuestStatus::Cancelled => ANY_ROLE,
            _ => STAFF,
        }
    }

    /// Adventurers, equipment and consumables are frozen once a quest runs
    pub fn allows_assignment_changes(self) -> bool {
        !matches!(self, QuestStatus::Started | QuestStatus::Succeeded | QuestStatus::Failed)
    }

    /// Statuses whose consumable reservations still hold stock
    pub fn holds_reservations(self) -> bool {
        matches!(self, QuestStatus::Waiting | QuestStatus::Validated | QuestStatus::Started)
    }
}

/// Quest row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub final_date: DateTime<Utc>,
    pub reward: i32,
    /// Estimated duration in days
    pub estimated_duration: i32,
    #[serde(rename = "recommendedXP")]
    pub recommended_xp: i32,
    pub status_id: i32,
    pub user_id: i32,
    pub start_date: Option<DateTime<Utc>>,
}

/// Consumable reserved for a quest
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestConsumable {
    pub quest_id: i32,
    pub consumable_id: i32,
    pub name: String,
    pub quantity: i32,
}

/// Quest with its relations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestDetails {
    #[serde(flatten)]
    pub quest: Quest,
    pub status: NamedRecord,
    pub user: Option<UserShort>,
    pub adventurers: Vec<Adventurer>,
    pub equipment_stocks: Vec<EquipmentStock>,
    pub consumables: Vec<QuestConsumable>,
    pub average_experience: f64,
}

/// Create quest request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub final_date: DateTime<Utc>,
    #[validate(range(min = 0, message = "Reward cannot be negative"))]
    pub reward: i32,
    #[validate(range(min = 1, message = "Estimated duration must be at least one day"))]
    pub estimated_duration: i32,
    #[serde(rename = "recommendedXP")]
    #[validate(range(min = 0, message = "Recommended XP cannot be negative"))]
    pub recommended_xp: Option<i32>,
    #[serde(default)]
    pub adventurer_ids: Vec<i32>,
    #[serde(default)]
    pub equipment_stock_ids: Vec<i32>,
}

/// Update quest request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub final_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Reward cannot be negative"))]
    pub reward: Option<i32>,
    #[validate(range(min = 1, message = "Estimated duration must be at least one day"))]
    pub estimated_duration: Option<i32>,
    #[serde(rename = "recommendedXP")]
    #[validate(range(min = 0, message = "Recommended XP cannot be negative"))]
    pub recommended_xp: Option<i32>,
}

/// Generic status change request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestStatus {
    pub status_id: Option<i32>,
    pub status_name: Option<String>,
}

/// List of ids for attach/detach/set
#[derive(Debug, Deserialize, ToSchema)]
pub struct IdsInput {
    pub ids: Vec<i32>,
}

/// One consumable line in a reservation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumableLine {
    pub consumable_id: i32,
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be between 1 and 1000000"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConsumablesInput {
    #[validate(nested)]
    pub consumables: Vec<ConsumableLine>,
}

/// Finish request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishQuest {
    pub is_success: bool,
}

/// Sort key for quest listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum QuestSort {
    Reward,
    FinalDate,
    #[default]
    Id,
    AvgExperience,
}

/// Quest list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestQuery {
    pub reward_min: Option<i32>,
    pub reward_max: Option<i32>,
    pub status_id: Option<i32>,
    pub final_date_from: Option<DateTime<Utc>>,
    pub final_date_to: Option<DateTime<Utc>>,
    pub user_id: Option<i32>,
    pub avg_xp_min: Option<f64>,
    pub avg_xp_max: Option<f64>,
    pub sort_by: Option<QuestSort>,
    pub order: Option<SortOrder>,
}

/// Whole days spent on a quest, rounded up, never less than one
pub fn elapsed_days(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const DAY: i64 = 86_400;
    let seconds = (now - start).num_seconds().max(0);
    ((seconds + DAY - 1) / DAY).max(1)
}

/// Salary owed to one adventurer
pub fn salary(daily_rate: i32, days: i64) -> i64 {
    i64::from(daily_rate) * days
}

/// Mean experience of the assigned adventurers, 0 when none
pub fn average_experience(adventurers: &[Adventurer]) -> f64 {
    if adventurers.is_empty() {
        return 0.0;
    }
    let total: i64 = adventurers.iter().map(|a| i64::from(a.experience)).sum();
    total as f64 / adventurers.len() as f64
}

/// Apply the in-memory part of the quest filters, then sort
pub fn filter_and_sort(mut quests: Vec<QuestDetails>, query: &QuestQuery) -> Vec<QuestDetails> {
    quests.retain(|q| {
        query.avg_xp_min.map_or(true, |min| q.average_experience >= min)
            && query.avg_xp_max.map_or(true, |max| q.average_experience <= max)
    });

    let order = query.order.unwrap_or_default();
    let sort_by = query.sort_by.unwrap_or_default();

    quests.sort_by(|a, b| {
        let ordering = match sort_by {
            QuestSort::Reward => a.quest.reward.cmp(&b.quest.reward),
            QuestSort::FinalDate => a.quest.final_date.cmp(&b.quest.final_date),
            QuestSort::Id => a.quest.id.cmp(&b.quest.id),
            QuestSort::AvgExperience => a
                .average_experience
                .partial_cmp(&b.average_experience)
                .unwrap_or(Ordering::Equal),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    quests
}

/// Ids in `requested` that are absent from `found`
pub fn missing_ids(requested: &[i32], found: &[i32]) -> Vec<i32> {
    requested.iter().copied().filter(|id| !found.contains(id)).collect()
}

/// Requested ids not yet linked, deduplicated, in request order
pub fn ids_to_insert(existing: &[i32], requested: &[i32]) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::new();
    for id in requested {
        if !existing.contains(id) && !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Collapse repeated consumable lines into one per consumable
pub fn merge_lines(lines: &[ConsumableLine]) -> AppResult<Vec<ConsumableLine>> {
    let mut merged: Vec<ConsumableLine> = Vec::new();
    for line in lines {
        match merged.iter_mut().find(|m| m.consumable_id == line.consumable_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                    AppError::BadRequest(format!("Quantity of consumable {} is too large", line.consumable_id))
                })?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}
