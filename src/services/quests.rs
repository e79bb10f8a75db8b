//! Quest lifecycle service
//!
//! Every mutation runs in one database transaction that starts by locking the
//! quest row, so status checks and the writes they guard see the same state.

use chrono::{Duration, Utc};
use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::{
        consumable::ensure_available,
        equipment::{wear, StockStatus},
        quest::{
            average_experience, elapsed_days, filter_and_sort, ids_to_insert, merge_lines, missing_ids, salary,
            ConsumableLine, CreateQuest, Quest, QuestDetails, QuestQuery, QuestStatus, UpdateQuest,
            UpdateQuestStatus, XP_PER_DAY,
        },
        reference::Status,
    },
    repository::{quests::QuestLink, Repository},
};

/// How a set operation combines the request with the current links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Attach,
    Detach,
    Replace,
}

#[derive(Clone)]
pub struct QuestsService {
    repository: Repository,
}

impl QuestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn find_one(&self, id: i32) -> AppResult<QuestDetails> {
        let quest = self.repository.quests_get_by_id(id).await?;
        self.details(quest).await
    }

    pub async fn find_all(&self, query: &QuestQuery) -> AppResult<Vec<QuestDetails>> {
        let quests = self.repository.quests_search(query).await?;
        let mut details = Vec::with_capacity(quests.len());
        for quest in quests {
            details.push(self.details(quest).await?);
        }
        Ok(filter_and_sort(details, query))
    }

    async fn details(&self, quest: Quest) -> AppResult<QuestDetails> {
        // Pool lookups first: the held connection must never wait on the pool
        let status = self.repository.reference_get::<Status>(quest.status_id).await?;
        let user = self.repository.users_get_short(quest.user_id).await?;

        let mut conn = self.repository.pool.acquire().await?;
        let adventurers = self.repository.quests_adventurers(&mut conn, quest.id).await?;
        let equipment_stocks = self.repository.quests_equipment_stocks(&mut conn, quest.id).await?;
        let consumables = self.repository.quests_consumables(&mut conn, quest.id).await?;

        Ok(QuestDetails {
            average_experience: average_experience(&adventurers),
            quest,
            status,
            user,
            adventurers,
            equipment_stocks,
            consumables,
        })
    }

    // =========================================================================
    // Creation and edits
    // =========================================================================

    pub async fn create(&self, user_id: i32, data: &CreateQuest) -> AppResult<QuestDetails> {
        self.ensure_adventurers_exist(&data.adventurer_ids).await?;
        self.ensure_stocks_assignable(&data.equipment_stock_ids).await?;

        let mut tx = self.repository.begin().await?;
        let quest = self.repository.quests_insert(&mut tx, user_id, data).await?;
        self.repository
            .quests_link(&mut tx, QuestLink::Adventurers, quest.id, &data.adventurer_ids)
            .await?;
        self.repository
            .quests_link(&mut tx, QuestLink::EquipmentStocks, quest.id, &data.equipment_stock_ids)
            .await?;
        tx.commit().await?;

        tracing::info!(quest_id = quest.id, user_id, "Quest created");
        self.details(quest).await
    }

    /// Edit a quest; it goes back to `waiting` for a new review
    pub async fn update(&self, id: i32, data: &UpdateQuest) -> AppResult<QuestDetails> {
        let mut tx = self.repository.begin().await?;
        let quest = self.repository.quests_get_locked(&mut tx, id).await?;
        let status = self.repository.quests_status(&mut tx, &quest).await?;
        if !matches!(status, QuestStatus::Waiting | QuestStatus::Validated) {
            return Err(AppError::BadRequest(format!(
                "Quest {} cannot be edited while {}",
                id, status
            )));
        }

        let quest = self.repository.quests_update(&mut tx, id, data).await?;
        tx.commit().await?;
        tracing::info!(quest_id = id, from = %status, "Quest edited, back to waiting");
        self.details(quest).await
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Status named by a generic status change request, by id or by name
    pub async fn status_target(&self, data: &UpdateQuestStatus) -> AppResult<QuestStatus> {
        let target = match (data.status_id, data.status_name.as_deref()) {
            (Some(status_id), _) => {
                let record = self.repository.reference_get::<Status>(status_id).await?;
                record.name.parse::<QuestStatus>().map_err(AppError::BadRequest)?
            }
            (None, Some(name)) => name.parse::<QuestStatus>().map_err(AppError::BadRequest)?,
            (None, None) => {
                return Err(AppError::BadRequest("statusId or statusName is required".to_string()));
            }
        };
        Ok(target)
    }

    /// Generic status change; running states are only reachable through
    /// [`QuestsService::start`] and [`QuestsService::finish`]
    pub async fn update_status(&self, id: i32, target: QuestStatus) -> AppResult<QuestDetails> {
        if matches!(target, QuestStatus::Started | QuestStatus::Succeeded | QuestStatus::Failed) {
            return Err(AppError::BadRequest(format!(
                "Status {} is set by starting or finishing the quest",
                target
            )));
        }

        self.transition(id, target).await
    }

    pub async fn validate(&self, id: i32) -> AppResult<QuestDetails> {
        self.transition(id, QuestStatus::Validated).await
    }

    pub async fn invalidate(&self, id: i32) -> AppResult<QuestDetails> {
        self.transition(id, QuestStatus::Waiting).await
    }

    pub async fn refuse(&self, id: i32) -> AppResult<QuestDetails> {
        self.transition(id, QuestStatus::Refused).await
    }

    pub async fn abandon(&self, id: i32) -> AppResult<QuestDetails> {
        self.transition(id, QuestStatus::Cancelled).await
    }

    async fn transition(&self, id: i32, target: QuestStatus) -> AppResult<QuestDetails> {
        let mut tx = self.repository.begin().await?;
        let quest = self.repository.quests_get_locked(&mut tx, id).await?;
        let current = self.repository.quests_status(&mut tx, &quest).await?;
        ensure_transition(id, current, target)?;

        let quest = self.repository.quests_set_status(&mut tx, id, target).await?;
        tx.commit().await?;

        tracing::info!(quest_id = id, from = %current, to = %target, "Quest status changed");
        self.details(quest).await
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    pub async fn set_adventurers(&self, id: i32, op: SetOp, ids: &[i32]) -> AppResult<QuestDetails> {
        if op != SetOp::Detach {
            self.ensure_adventurers_exist(ids).await?;
        }
        self.apply_links(id, QuestLink::Adventurers, op, ids).await
    }

    pub async fn set_equipment_stocks(&self, id: i32, op: SetOp, ids: &[i32]) -> AppResult<QuestDetails> {
        if op != SetOp::Detach {
            self.ensure_stocks_assignable(ids).await?;
        }
        self.apply_links(id, QuestLink::EquipmentStocks, op, ids).await
    }

    async fn apply_links(&self, id: i32, link: QuestLink, op: SetOp, ids: &[i32]) -> AppResult<QuestDetails> {
        let mut tx = self.repository.begin().await?;
        let quest = self.lock_editable(&mut tx, id).await?;

        match op {
            SetOp::Attach => {
                let existing = self.repository.quests_linked_ids(&mut tx, link, id).await?;
                let new_ids = ids_to_insert(&existing, ids);
                self.repository.quests_link(&mut tx, link, id, &new_ids).await?;
            }
            SetOp::Detach => {
                self.repository.quests_unlink(&mut tx, link, id, ids).await?;
            }
            SetOp::Replace => {
                self.repository.quests_clear_links(&mut tx, link, id).await?;
                self.repository.quests_link(&mut tx, link, id, ids).await?;
            }
        }

        tx.commit().await?;
        tracing::info!(quest_id = id, ?link, ?op, count = ids.len(), "Quest assignments changed");
        self.details(quest).await
    }

    pub async fn set_consumables(&self, id: i32, op: SetOp, lines: &[ConsumableLine]) -> AppResult<QuestDetails> {
        let lines = merge_lines(lines)?;
        let ids: Vec<i32> = lines.iter().map(|l| l.consumable_id).collect();

        let mut tx = self.repository.begin().await?;
        let quest = self.lock_editable(&mut tx, id).await?;

        if op == SetOp::Detach {
            self.repository.quests_remove_consumables(&mut tx, id, &lines).await?;
        } else {
            let consumables = self.repository.consumables_lock(&mut tx, &ids).await?;
            let found: Vec<i32> = consumables.iter().map(|c| c.id).collect();
            if let Some(missing) = missing_ids(&ids, &found).first() {
                return Err(AppError::NotFound(format!("Consumable {} not found", missing)));
            }

            // Replacing drops this quest's own reservations from the count
            let exclude = if op == SetOp::Replace { Some(id) } else { None };
            for line in &lines {
                if let Some(consumable) = consumables.iter().find(|c| c.id == line.consumable_id) {
                    let reserved = self
                        .repository
                        .consumables_reserved(&mut tx, consumable.id, exclude)
                        .await?;
                    ensure_available(consumable, reserved, i64::from(line.quantity))?;
                }
            }

            if op == SetOp::Replace {
                self.repository.quests_clear_consumables(&mut tx, id).await?;
            }
            self.repository.quests_add_consumables(&mut tx, id, &lines).await?;
        }

        tx.commit().await?;
        tracing::info!(quest_id = id, ?op, lines = lines.len(), "Quest consumables changed");
        self.details(quest).await
    }

    // =========================================================================
    // Start and finish
    // =========================================================================

    /// Borrow the equipment, block the adventurers' calendars and start the clock
    pub async fn start(&self, id: i32) -> AppResult<QuestDetails> {
        let mut tx = self.repository.begin().await?;
        let quest = self.repository.quests_get_locked(&mut tx, id).await?;
        let current = self.repository.quests_status(&mut tx, &quest).await?;
        ensure_transition(id, current, QuestStatus::Started)?;

        let stocks = self.repository.equipment_stocks_for_quest_locked(&mut tx, id).await?;
        for stock in &stocks {
            if stock.status != StockStatus::Available {
                return Err(AppError::BadRequest(format!(
                    "Equipment stock {} is {} and cannot be borrowed",
                    stock.id, stock.status
                )));
            }
            stock.ensure_assignable()?;
            self.repository
                .equipment_stock_set_state(&mut tx, stock.id, stock.durability, StockStatus::Borrowed)
                .await?;
        }

        let now = Utc::now();
        let end = now + Duration::days(i64::from(quest.estimated_duration));
        let reason = format!("Quest #{}: {}", quest.id, quest.name);

        let adventurer_ids = self.repository.quests_linked_ids(&mut tx, QuestLink::Adventurers, id).await?;
        let adventurers = self.repository.adventurers_lock(&mut tx, &adventurer_ids).await?;
        for adventurer in &adventurers {
            let conflicts = self
                .repository
                .rests_overlapping_in(&mut tx, adventurer.id, now, end, None)
                .await?;
            if let Some(conflict) = conflicts.first() {
                return Err(AppError::BadRequest(format!(
                    "Adventurer {} is unavailable ({} {} to {})",
                    adventurer.name,
                    conflict.rest_type,
                    conflict.start_date.to_rfc3339(),
                    conflict.end_date.to_rfc3339()
                )));
            }
            self.repository
                .rests_insert_mission(&mut tx, adventurer.id, id, now, end, &reason)
                .await?;
        }

        self.repository.quests_set_start_date(&mut tx, id, now).await?;
        let quest = self.repository.quests_set_status(&mut tx, id, QuestStatus::Started).await?;
        tx.commit().await?;

        tracing::info!(
            quest_id = id,
            adventurers = adventurers.len(),
            stocks = stocks.len(),
            "Quest started"
        );
        self.details(quest).await
    }

    /// Settle a running quest: salaries, experience, wear, consumption, reward
    pub async fn finish(&self, id: i32, is_success: bool) -> AppResult<QuestDetails> {
        let mut tx = self.repository.begin().await?;
        let quest = self.repository.quests_get_locked(&mut tx, id).await?;
        let current = self.repository.quests_status(&mut tx, &quest).await?;
        let target = if is_success { QuestStatus::Succeeded } else { QuestStatus::Failed };
        ensure_transition(id, current, target)?;

        let start = quest
            .start_date
            .ok_or_else(|| AppError::BadRequest(format!("Quest {} has no start date", id)))?;
        let days = elapsed_days(start, Utc::now());

        let adventurers = self.repository.quests_adventurers(&mut tx, id).await?;
        let mut salaries = 0i64;
        for adventurer in &adventurers {
            let pay = salary(adventurer.daily_rate, days);
            if pay > 0 {
                let description = format!(
                    "Salary of {} for quest #{} ({} days)",
                    adventurer.name, quest.id, days
                );
                self.repository.finances_append(&mut tx, -pay, &description).await?;
                salaries += pay;
            }
            if is_success {
                self.repository
                    .adventurers_add_experience(&mut tx, adventurer.id, days * XP_PER_DAY)
                    .await?;
            }
        }

        let stocks = self.repository.equipment_stocks_for_quest_locked(&mut tx, id).await?;
        for stock in &stocks {
            let (durability, status) = wear(stock.durability, days);
            self.repository
                .equipment_stock_set_state(&mut tx, stock.id, durability, status)
                .await?;
        }

        let consumables = self.repository.quests_consumables(&mut tx, id).await?;
        for line in &consumables {
            self.repository
                .consumables_deduct(&mut tx, line.consumable_id, line.quantity)
                .await?;
        }

        self.repository.rests_delete_missions_for_quest(&mut tx, id).await?;

        if is_success && quest.reward > 0 {
            let description = format!("Reward for quest #{}: {}", quest.id, quest.name);
            self.repository
                .finances_append(&mut tx, i64::from(quest.reward), &description)
                .await?;
        }

        let quest = self.repository.quests_set_status(&mut tx, id, target).await?;
        tx.commit().await?;

        tracing::info!(
            quest_id = id,
            status = %target,
            days,
            salaries,
            reward = if is_success { quest.reward } else { 0 },
            "Quest finished"
        );
        self.details(quest).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn lock_editable(&self, conn: &mut PgConnection, id: i32) -> AppResult<Quest> {
        let quest = self.repository.quests_get_locked(conn, id).await?;
        let status = self.repository.quests_status(conn, &quest).await?;
        if !status.allows_assignment_changes() {
            return Err(AppError::BadRequest(format!(
                "Assignments of quest {} are frozen once {}",
                id, status
            )));
        }
        Ok(quest)
    }

    async fn ensure_adventurers_exist(&self, ids: &[i32]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found: Vec<i32> = self
            .repository
            .adventurers_get_many(ids)
            .await?
            .iter()
            .map(|a| a.id)
            .collect();
        match missing_ids(ids, &found).first() {
            Some(missing) => Err(AppError::NotFound(format!("Adventurer {} not found", missing))),
            None => Ok(()),
        }
    }

    async fn ensure_stocks_assignable(&self, ids: &[i32]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let stocks = self.repository.equipment_stocks_get_many(ids).await?;
        let found: Vec<i32> = stocks.iter().map(|s| s.id).collect();
        if let Some(missing) = missing_ids(ids, &found).first() {
            return Err(AppError::NotFound(format!("Equipment stock {} not found", missing)));
        }
        for stock in &stocks {
            stock.ensure_assignable()?;
        }
        Ok(())
    }
}

fn ensure_transition(id: i32, current: QuestStatus, target: QuestStatus) -> AppResult<()> {
    if !current.can_transition_to(target) {
        return Err(AppError::BadRequest(format!(
            "Quest {} cannot move from {} to {}",
            id, current, target
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_is_bad_request() {
        assert!(ensure_transition(1, QuestStatus::Validated, QuestStatus::Started).is_ok());
        assert!(matches!(
            ensure_transition(1, QuestStatus::Waiting, QuestStatus::Started),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            ensure_transition(1, QuestStatus::Succeeded, QuestStatus::Failed),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn refuse_and_abandon_only_from_waiting() {
        for target in [QuestStatus::Refused, QuestStatus::Cancelled] {
            assert!(ensure_transition(1, QuestStatus::Waiting, target).is_ok());
            assert!(ensure_transition(1, QuestStatus::Validated, target).is_err());
            assert!(ensure_transition(1, QuestStatus::Started, target).is_err());
        }
    }
}
