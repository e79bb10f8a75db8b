//! Adventurer rest periods, availability and schedules

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Kind of unavailability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RestType {
    Rest,
    Unavailable,
    MissionRest,
    /// Created when a quest starts, removed when it finishes
    Mission,
}

text_enum!(RestType {
    Rest => "rest",
    Unavailable => "unavailable",
    MissionRest => "mission_rest",
    Mission => "mission",
});

/// Rest period row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdventurerRest {
    pub id: i32,
    pub adventurer_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub rest_type: RestType,
    pub quest_id: Option<i32>,
}

/// Create rest period request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRest {
    pub adventurer_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
    #[serde(rename = "type")]
    pub rest_type: RestType,
}

/// Update rest period request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Reason cannot be empty"))]
    pub reason: Option<String>,
    #[serde(rename = "type")]
    pub rest_type: Option<RestType>,
}

/// Date range query (`?startDate=...&endDate=...`)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Event blocking an adventurer's calendar; mission events carry their quest
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub event_type: RestType,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest_name: Option<String>,
}

/// Availability check result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub adventurer_id: i32,
    pub adventurer_name: String,
    pub is_available: bool,
    pub events: Vec<ScheduleEvent>,
}

/// Status of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    Mission,
    MissionRest,
    Unavailable,
    Rest,
}

/// One day of an adventurer's schedule
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub events: Vec<ScheduleEvent>,
}

/// Closed-interval overlap: `[start1, end1]` meets `[start2, end2]`
pub fn periods_overlap<T: PartialOrd>(start1: T, end1: T, start2: T, end2: T) -> bool {
    start1 <= end2 && end1 >= start2
}

/// Day status from the events touching that day, by priority
/// `mission > mission_rest > unavailable > rest`.
pub fn classify_day(events: &[ScheduleEvent]) -> DayStatus {
    let has = |kind: RestType| events.iter().any(|e| e.event_type == kind);

    if events.is_empty() {
        DayStatus::Available
    } else if has(RestType::Mission) {
        DayStatus::Mission
    } else if has(RestType::MissionRest) {
        DayStatus::MissionRest
    } else if has(RestType::Unavailable) {
        DayStatus::Unavailable
    } else {
        DayStatus::Rest
    }
}

/// Expand `[start, end]` into one entry per calendar day (UTC)
pub fn build_schedule(start: DateTime<Utc>, end: DateTime<Utc>, events: &[ScheduleEvent]) -> Vec<DaySchedule> {
    let mut days = Vec::new();
    let last = end.date_naive();
    let mut day = start.date_naive();

    while day <= last {
        let day_events: Vec<ScheduleEvent> = events
            .iter()
            .filter(|e| periods_overlap(day, day, e.start_date.date_naive(), e.end_date.date_naive()))
            .cloned()
            .collect();

        days.push(DaySchedule {
            date: day,
            status: classify_day(&day_events),
            events: day_events,
        });

        day += Duration::days(1);
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, 0, 0, 0).unwrap()
    }

    fn event(id: i32, start: DateTime<Utc>, end: DateTime<Utc>, kind: RestType) -> ScheduleEvent {
        ScheduleEvent {
            id,
            start_date: start,
            end_date: end,
            event_type: kind,
            reason: "test".to_string(),
            quest_id: None,
            quest_name: None,
        }
    }

    #[test]
    fn touching_endpoints_overlap() {
        // rest [Feb 5, Feb 10] against query [Feb 10, Feb 12]
        assert!(periods_overlap(at(2, 10), at(2, 12), at(2, 5), at(2, 10)));
    }

    #[test]
    fn disjoint_periods_do_not_overlap() {
        assert!(!periods_overlap(at(2, 11), at(2, 12), at(2, 5), at(2, 10)));
        assert!(!periods_overlap(at(2, 1), at(2, 4), at(2, 5), at(2, 10)));
    }

    #[test]
    fn containing_period_overlaps() {
        assert!(periods_overlap(at(2, 1), at(2, 28), at(2, 5), at(2, 10)));
        assert!(periods_overlap(at(2, 6), at(2, 7), at(2, 5), at(2, 10)));
    }

    #[test]
    fn day_priority_order() {
        let rest = event(1, at(3, 1), at(3, 2), RestType::Rest);
        let unavailable = event(2, at(3, 1), at(3, 2), RestType::Unavailable);
        let mission_rest = event(3, at(3, 1), at(3, 2), RestType::MissionRest);
        let mission = event(4, at(3, 1), at(3, 2), RestType::Mission);

        assert_eq!(classify_day(&[]), DayStatus::Available);
        assert_eq!(classify_day(&[rest.clone()]), DayStatus::Rest);
        assert_eq!(classify_day(&[rest.clone(), unavailable.clone()]), DayStatus::Unavailable);
        assert_eq!(
            classify_day(&[rest.clone(), unavailable.clone(), mission_rest.clone()]),
            DayStatus::MissionRest
        );
        assert_eq!(classify_day(&[rest, unavailable, mission_rest, mission]), DayStatus::Mission);
    }

    #[test]
    fn schedule_has_one_entry_per_day() {
        let events = vec![
            event(1, at(2, 5), at(2, 6), RestType::Rest),
            event(2, at(2, 6), at(2, 7), RestType::Mission),
        ];

        let schedule = build_schedule(at(2, 4), at(2, 8), &events);
        let statuses: Vec<DayStatus> = schedule.iter().map(|d| d.status).collect();

        assert_eq!(
            statuses,
            vec![
                DayStatus::Available,
                DayStatus::Rest,
                DayStatus::Mission,
                DayStatus::Mission,
                DayStatus::Available,
            ]
        );
        assert_eq!(schedule[2].events.len(), 2);
        assert_eq!(schedule[0].date, NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
    }

    #[test]
    fn rest_type_text_mapping() {
        assert_eq!("mission_rest".parse::<RestType>().unwrap(), RestType::MissionRest);
        assert_eq!(RestType::Unavailable.as_str(), "unavailable");
        assert!("holiday".parse::<RestType>().is_err());
    }

    #[test]
    fn mission_event_serializes_its_quest() {
        let mut mission = event(3, at(5, 1), at(5, 4), RestType::Mission);
        mission.quest_id = Some(12);
        mission.quest_name = Some("Clear the crypt".to_string());

        let json = serde_json::to_value(&mission).unwrap();
        assert_eq!(json["type"], "mission");
        assert_eq!(json["questId"], 12);
        assert_eq!(json["questName"], "Clear the crypt");

        let rest = serde_json::to_value(event(4, at(5, 1), at(5, 2), RestType::Rest)).unwrap();
        assert!(rest.get("questName").is_none());
    }
}
