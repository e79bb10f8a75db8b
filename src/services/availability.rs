//! Adventurer availability, schedules and rest periods

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        adventurer::Adventurer,
        rest::{build_schedule, AdventurerRest, Availability, CreateRest, DaySchedule, RestType, UpdateRest},
    },
    repository::Repository,
};

/// Longest range a schedule request may span
const MAX_SCHEDULE_DAYS: i64 = 366;

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Whether an adventurer is free over `[start, end]`, with the blocking events
    pub async fn check_availability(
        &self,
        adventurer_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Availability> {
        ensure_ordered(start, end)?;
        let adventurer = self.repository.adventurers_get_by_id(adventurer_id).await?;
        let events = self.repository.rests_schedule_events(adventurer_id, start, end).await?;

        Ok(Availability {
            adventurer_id,
            adventurer_name: adventurer.name,
            is_available: events.is_empty(),
            events,
        })
    }

    /// Day-by-day calendar of an adventurer
    pub async fn get_schedule(
        &self,
        adventurer_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<DaySchedule>> {
        ensure_ordered(start, end)?;
        if (end - start).num_days() > MAX_SCHEDULE_DAYS {
            return Err(AppError::BadRequest(format!(
                "Schedule range cannot exceed {} days",
                MAX_SCHEDULE_DAYS
            )));
        }

        self.repository.adventurers_get_by_id(adventurer_id).await?;
        let events = self.repository.rests_schedule_events(adventurer_id, start, end).await?;

        Ok(build_schedule(start, end, &events))
    }

    pub async fn find_available_adventurers(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Adventurer>> {
        ensure_ordered(start, end)?;
        self.repository.rests_free_adventurers(start, end).await
    }

    pub async fn find_rests(&self, adventurer_id: i32) -> AppResult<Vec<AdventurerRest>> {
        self.repository.adventurers_get_by_id(adventurer_id).await?;
        self.repository.rests_list_by_adventurer(adventurer_id).await
    }

    pub async fn create_rest(&self, data: &CreateRest) -> AppResult<AdventurerRest> {
        ensure_manual_type(data.rest_type)?;
        ensure_strictly_ordered(data.start_date, data.end_date)?;
        self.repository.adventurers_get_by_id(data.adventurer_id).await?;

        let conflicts = self
            .repository
            .rests_overlapping(data.adventurer_id, data.start_date, data.end_date, None)
            .await?;
        reject_conflicts(&conflicts)?;

        let rest = self.repository.rests_create(data).await?;
        tracing::info!(
            rest_id = rest.id,
            adventurer_id = rest.adventurer_id,
            rest_type = %rest.rest_type,
            "Rest period created"
        );
        Ok(rest)
    }

    pub async fn update_rest(&self, id: i32, data: &UpdateRest) -> AppResult<AdventurerRest> {
        let mut rest = self.repository.rests_get_by_id(id).await?;
        ensure_manual_type(rest.rest_type)?;

        if let Some(start) = data.start_date {
            rest.start_date = start;
        }
        if let Some(end) = data.end_date {
            rest.end_date = end;
        }
        if let Some(ref reason) = data.reason {
            rest.reason = reason.clone();
        }
        if let Some(rest_type) = data.rest_type {
            ensure_manual_type(rest_type)?;
            rest.rest_type = rest_type;
        }

        ensure_strictly_ordered(rest.start_date, rest.end_date)?;

        let conflicts = self
            .repository
            .rests_overlapping(rest.adventurer_id, rest.start_date, rest.end_date, Some(id))
            .await?;
        reject_conflicts(&conflicts)?;

        self.repository.rests_update(&rest).await
    }

    pub async fn delete_rest(&self, id: i32) -> AppResult<()> {
        let rest = self.repository.rests_get_by_id(id).await?;
        ensure_manual_type(rest.rest_type)?;
        self.repository.rests_delete(id).await?;
        tracing::info!(rest_id = id, adventurer_id = rest.adventurer_id, "Rest period deleted");
        Ok(())
    }
}

fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if start > end {
        return Err(AppError::BadRequest("startDate must not be after endDate".to_string()));
    }
    Ok(())
}

fn ensure_strictly_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if start >= end {
        return Err(AppError::BadRequest("startDate must be before endDate".to_string()));
    }
    Ok(())
}

/// Mission blocks belong to running quests
fn ensure_manual_type(rest_type: RestType) -> AppResult<()> {
    if rest_type == RestType::Mission {
        return Err(AppError::BadRequest(
            "Mission periods are managed by quest start and finish".to_string(),
        ));
    }
    Ok(())
}

fn reject_conflicts(conflicts: &[AdventurerRest]) -> AppResult<()> {
    if let Some(first) = conflicts.first() {
        return Err(AppError::BadRequest(format!(
            "Period overlaps rest {} ({} to {})",
            first.id,
            first.start_date.to_rfc3339(),
            first.end_date.to_rfc3339()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(ensure_ordered(at(3), at(3)).is_ok());
        assert!(matches!(ensure_ordered(at(4), at(3)), Err(AppError::BadRequest(_))));
        assert!(ensure_strictly_ordered(at(3), at(3)).is_err());
        assert!(ensure_strictly_ordered(at(3), at(4)).is_ok());
    }

    #[test]
    fn mission_type_is_reserved() {
        assert!(ensure_manual_type(RestType::Rest).is_ok());
        assert!(ensure_manual_type(RestType::MissionRest).is_ok());
        assert!(matches!(ensure_manual_type(RestType::Mission), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn any_conflict_blocks_the_period() {
        assert!(reject_conflicts(&[]).is_ok());

        let existing = AdventurerRest {
            id: 9,
            adventurer_id: 1,
            start_date: at(5),
            end_date: at(10),
            reason: "Recovering".to_string(),
            rest_type: RestType::Rest,
            quest_id: None,
        };
        assert!(matches!(reject_conflicts(&[existing]), Err(AppError::BadRequest(_))));
    }
}
