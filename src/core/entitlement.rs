use crate::domain::model::{EntitlementDecision, MealPlanKind, Service, TimeWindow};
use chrono::{NaiveDateTime, NaiveTime};

pub const DEFAULT_SNACK_LABEL: &str = "Refrigerio/Snack";
pub const DEFAULT_LUNCH_LABEL: &str = "Almuerzo/Lunch";

/// Maps a meal plan and the current instant to an entitlement decision.
///
/// Stateless: every call is evaluated independently against `now`.
/// When more than one included service is open at once (only possible with a
/// misconfigured, overlapping schedule) the snack window wins and the
/// ambiguity is logged.
#[derive(Debug, Clone)]
pub struct MealWindowResolver {
    snack: TimeWindow,
    lunch: TimeWindow,
}

impl MealWindowResolver {
    pub fn new(snack: TimeWindow, lunch: TimeWindow) -> Self {
        if snack.overlaps(&lunch) {
            tracing::warn!(
                "⚠️ Meal windows overlap: {} and {}; snack takes priority",
                snack,
                lunch
            );
        }
        Self { snack, lunch }
    }

    pub fn window(&self, service: Service) -> &TimeWindow {
        match service {
            Service::Snack => &self.snack,
            Service::Lunch => &self.lunch,
        }
    }

    /// Both windows in priority order.
    pub fn schedule(&self) -> [&TimeWindow; 2] {
        [&self.snack, &self.lunch]
    }

    pub fn resolve(&self, plan: MealPlanKind, now: NaiveDateTime) -> EntitlementDecision {
        let services = plan.services();
        if services.is_empty() {
            return EntitlementDecision::no_plan();
        }

        let active: Vec<&TimeWindow> = services
            .iter()
            .map(|s| self.window(*s))
            .filter(|w| w.contains(now))
            .collect();

        match active.as_slice() {
            [] => EntitlementDecision::pending(),
            [only] => EntitlementDecision::granted((*only).clone()),
            [first, rest @ ..] => {
                tracing::warn!(
                    "⚠️ {} windows open at {}; granting {} over {:?}",
                    active.len(),
                    now.format("%H:%M"),
                    first.label,
                    rest.iter().map(|w| w.label.as_str()).collect::<Vec<_>>()
                );
                EntitlementDecision::granted((*first).clone())
            }
        }
    }

    /// The earliest window of the plan that has not opened yet today.
    pub fn next_window(&self, plan: MealPlanKind, now: NaiveDateTime) -> Option<&TimeWindow> {
        plan.services()
            .into_iter()
            .map(|s| self.window(s))
            .filter(|w| w.opens_after(now))
            .min_by_key(|w| w.start)
    }
}

impl Default for MealWindowResolver {
    fn default() -> Self {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self::new(
            TimeWindow::new(Service::Snack, hm(6, 0), hm(11, 30), DEFAULT_SNACK_LABEL),
            TimeWindow::new(Service::Lunch, hm(11, 40), hm(18, 0), DEFAULT_LUNCH_LABEL),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DecisionReason;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn plan(text: &str) -> MealPlanKind {
        MealPlanKind::classify(text)
    }

    #[test]
    fn test_both_plans_at_seven_grants_snack() {
        let resolver = MealWindowResolver::default();
        let decision = resolver.resolve(plan("REFRIGERIO Y ALMUERZO"), at(7, 0));

        assert!(decision.authorized);
        assert_eq!(decision.reason, DecisionReason::Granted);
        assert_eq!(decision.granted_window.unwrap().service, Service::Snack);
    }

    #[test]
    fn test_dead_gap_is_pending() {
        let resolver = MealWindowResolver::default();
        let decision = resolver.resolve(plan("REFRIGERIO Y ALMUERZO"), at(11, 35));

        assert!(!decision.authorized);
        assert_eq!(decision.reason, DecisionReason::Pending);
        assert!(decision.granted_window.is_none());
    }

    #[test]
    fn test_lunch_only_before_lunch_is_pending() {
        let resolver = MealWindowResolver::default();
        let decision = resolver.resolve(plan("SOLO ALMUERZO"), at(9, 0));

        assert!(!decision.authorized);
        assert_eq!(decision.reason, DecisionReason::Pending);
    }

    #[test]
    fn test_lunch_granted_at_boundaries() {
        let resolver = MealWindowResolver::default();
        for t in [at(11, 40), at(18, 0)] {
            let decision = resolver.resolve(plan("SOLO ALMUERZO"), t);
            assert!(decision.authorized);
            assert_eq!(decision.granted_window.unwrap().service, Service::Lunch);
        }
        assert!(!resolver.resolve(plan("SOLO ALMUERZO"), at(18, 1)).authorized);
    }

    #[test]
    fn test_snack_granted_across_whole_window() {
        let resolver = MealWindowResolver::default();
        for minute in (6 * 60)..=(11 * 60 + 30) {
            let decision = resolver.resolve(plan("SOLO REFRIGERIO"), at(minute / 60, minute % 60));
            assert!(decision.authorized, "minute {} should be inside", minute);
        }
    }

    #[test]
    fn test_outside_both_windows_never_authorizes() {
        let resolver = MealWindowResolver::default();
        let outside = [at(0, 0), at(5, 59), at(11, 31), at(11, 39), at(18, 1), at(23, 59)];
        for t in outside {
            for text in ["SOLO REFRIGERIO", "SOLO ALMUERZO", "REFRIGERIO Y ALMUERZO", ""] {
                assert!(!resolver.resolve(plan(text), t).authorized);
            }
        }
    }

    #[test]
    fn test_no_plan_never_authorizes() {
        let resolver = MealWindowResolver::default();
        for hour in 0..24 {
            let decision = resolver.resolve(plan("SIN PLAN"), at(hour, 0));
            assert!(!decision.authorized);
            assert_eq!(decision.reason, DecisionReason::NoPlan);
        }
    }

    #[test]
    fn test_overlapping_windows_prefer_snack() {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let resolver = MealWindowResolver::new(
            TimeWindow::new(Service::Snack, hm(6, 0), hm(12, 0), "Snack"),
            TimeWindow::new(Service::Lunch, hm(11, 0), hm(18, 0), "Lunch"),
        );

        let decision = resolver.resolve(MealPlanKind::SnackAndLunch, at(11, 30));
        assert!(decision.authorized);
        assert_eq!(decision.granted_window.unwrap().service, Service::Snack);
    }

    #[test]
    fn test_next_window() {
        let resolver = MealWindowResolver::default();
        let both = plan("REFRIGERIO Y ALMUERZO");

        assert_eq!(resolver.next_window(both, at(5, 0)).unwrap().service, Service::Snack);
        assert_eq!(resolver.next_window(both, at(11, 35)).unwrap().service, Service::Lunch);
        assert!(resolver.next_window(both, at(19, 0)).is_none());
        assert!(resolver.next_window(plan("SOLO REFRIGERIO"), at(11, 35)).is_none());
    }
}
