use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 學生資料，由外部目錄服務每次請求時提供
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub grade: String,
    pub plan: MealPlanKind,
    /// 目錄服務回傳的原始方案文字
    pub plan_text: String,
}

impl Student {
    pub fn new(name: impl Into<String>, grade: impl Into<String>, plan_text: impl Into<String>) -> Self {
        let plan_text = plan_text.into();
        Self {
            name: name.into(),
            grade: grade.into(),
            plan: MealPlanKind::classify(&plan_text),
            plan_text,
        }
    }
}

/// The two meal services, in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Snack,
    Lunch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealPlanKind {
    None,
    SnackOnly,
    LunchOnly,
    SnackAndLunch,
}

impl MealPlanKind {
    /// Classifies a free-form plan string by case-insensitive substring match.
    ///
    /// "REFRIGERIO" or "SNACK" grants the snack service, "ALMUERZO" or "LUNCH"
    /// grants lunch. Text matching neither is `None`; it is never an error.
    pub fn classify(plan_text: &str) -> Self {
        let upper = plan_text.to_uppercase();
        let snack = upper.contains("REFRIGERIO") || upper.contains("SNACK");
        let lunch = upper.contains("ALMUERZO") || upper.contains("LUNCH");

        match (snack, lunch) {
            (true, true) => MealPlanKind::SnackAndLunch,
            (true, false) => MealPlanKind::SnackOnly,
            (false, true) => MealPlanKind::LunchOnly,
            (false, false) => MealPlanKind::None,
        }
    }

    pub fn includes(&self, service: Service) -> bool {
        matches!(
            (self, service),
            (MealPlanKind::SnackOnly, Service::Snack)
                | (MealPlanKind::LunchOnly, Service::Lunch)
                | (MealPlanKind::SnackAndLunch, _)
        )
    }

    /// Included services in priority order.
    pub fn services(&self) -> Vec<Service> {
        [Service::Snack, Service::Lunch]
            .into_iter()
            .filter(|s| self.includes(*s))
            .collect()
    }
}

/// A same-day wall-clock range; both ends inclusive at minute granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub service: Service,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub label: String,
}

impl TimeWindow {
    pub fn new(service: Service, start: NaiveTime, end: NaiveTime, label: impl Into<String>) -> Self {
        Self {
            service,
            start,
            end,
            label: label.into(),
        }
    }

    pub fn contains(&self, now: NaiveDateTime) -> bool {
        let minute = minute_of_day(now.time());
        minute_of_day(self.start) <= minute && minute <= minute_of_day(self.end)
    }

    /// The window has not opened yet at `now`.
    pub fn opens_after(&self, now: NaiveDateTime) -> bool {
        minute_of_day(now.time()) < minute_of_day(self.start)
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        minute_of_day(self.start) <= minute_of_day(other.end)
            && minute_of_day(other.start) <= minute_of_day(self.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.label,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Granted,
    NoPlan,
    /// The plan includes a service, but none is open right now.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementDecision {
    pub authorized: bool,
    pub granted_window: Option<TimeWindow>,
    pub reason: DecisionReason,
}

impl EntitlementDecision {
    pub fn granted(window: TimeWindow) -> Self {
        Self {
            authorized: true,
            granted_window: Some(window),
            reason: DecisionReason::Granted,
        }
    }

    pub fn no_plan() -> Self {
        Self {
            authorized: false,
            granted_window: None,
            reason: DecisionReason::NoPlan,
        }
    }

    pub fn pending() -> Self {
        Self {
            authorized: false,
            granted_window: None,
            reason: DecisionReason::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TicketContent {
    pub student_name: String,
    pub service_label: String,
    pub timestamp: NaiveDateTime,
    pub keyword: String,
}

/// Raw printer bytes, handed to a sink once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterCommandStream(Vec<u8>);

impl PrinterCommandStream {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
