use crate::config::ServiceConfig;
use crate::core::access::GradePolicy;
use crate::core::dispatcher::{DeliveryReport, PrintDispatcher};
use crate::core::entitlement::MealWindowResolver;
use crate::core::keyword::DailyKeyword;
use crate::core::ticket::{self, TicketEncoder};
use crate::domain::model::{
    DecisionReason, EntitlementDecision, MealPlanKind, Student, TicketContent, TimeWindow,
};
use crate::domain::ports::{Clock, PrintSink, StudentDirectory};
use crate::utils::error::{Result, ServiceError};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct PrintedTicket {
    pub window: TimeWindow,
    pub keyword: String,
    /// Background delivery; dropping it detaches the task.
    pub delivery: JoinHandle<DeliveryReport>,
}

#[derive(Debug)]
pub enum ClaimOutcome {
    Printed(PrintedTicket),
    Refused {
        decision: EntitlementDecision,
        message: String,
    },
}

impl ClaimOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, ClaimOutcome::Printed(_))
    }
}

#[derive(Debug)]
pub struct CodeClaim {
    pub student: Student,
    pub outcome: ClaimOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub mode: &'static str,
    pub dry_run: bool,
    pub printer: String,
    pub schedule: Vec<String>,
}

/// Verification → entitlement → ticket → dispatch.
///
/// The decision is computed synchronously; printing happens in the
/// background and its outcome is only logged.
pub struct ClaimService {
    resolver: MealWindowResolver,
    keyword: DailyKeyword,
    encoder: TicketEncoder,
    dispatcher: PrintDispatcher,
    access: GradePolicy,
    directory: Arc<dyn StudentDirectory>,
    clock: Arc<dyn Clock>,
}

impl ClaimService {
    pub fn from_config(
        config: &ServiceConfig,
        sink: Arc<dyn PrintSink>,
        directory: Arc<dyn StudentDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            resolver: MealWindowResolver::new(config.snack_window()?, config.lunch_window()?),
            keyword: DailyKeyword::new(config.ticket.words.clone())?,
            encoder: TicketEncoder::new(config.ticket.max_line_width),
            dispatcher: PrintDispatcher::new(sink, config.staging_dir(), config.printer.dry_run),
            access: GradePolicy::new(config.access.denied_grades.clone()),
            directory,
            clock,
        })
    }

    /// Checks entitlement for an already-identified student and, when
    /// granted, starts printing the ticket.
    pub fn claim(&self, name: &str, plan_text: &str) -> Result<ClaimOutcome> {
        // 名字只有控制字元時，列印前就當作資料不完整
        if !ticket::has_printable_text(name) {
            return Err(ServiceError::InvalidRequest {
                message: "Incomplete data".to_string(),
            });
        }

        let now = self.clock.now();
        let plan = MealPlanKind::classify(plan_text);
        let decision = self.resolver.resolve(plan, now);

        let window = match decision.granted_window.clone() {
            Some(window) if decision.authorized => window,
            _ => {
                let message = self.refusal_message(plan, &decision, now);
                tracing::info!("🚫 Claim refused for {}: {:?}", name, decision.reason);
                return Ok(ClaimOutcome::Refused { decision, message });
            }
        };

        let keyword = self.keyword.keyword_for(now.date());
        let stream = self.encoder.encode(&TicketContent {
            student_name: name.to_string(),
            service_label: window.label.clone(),
            timestamp: now,
            keyword: keyword.clone(),
        })?;

        tracing::info!("🎫 {} claims {} (keyword {})", name, window.label, keyword);
        let delivery = self.dispatcher.dispatch(stream);

        Ok(ClaimOutcome::Printed(PrintedTicket {
            window,
            keyword,
            delivery,
        }))
    }

    /// Full flow starting from a scanned code.
    pub async fn claim_by_code(&self, code: &str) -> Result<CodeClaim> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::InvalidRequest {
                message: "Enter a valid code".to_string(),
            });
        }

        let student = self
            .directory
            .lookup(code)
            .await?
            .ok_or_else(|| ServiceError::UnknownCode {
                code: code.to_string(),
            })?;

        if self.access.is_denied(&student.grade) {
            tracing::warn!("🚫 Grade {} denied for {}", student.grade, student.name);
            return Err(ServiceError::GradeDenied {
                grade: student.grade.clone(),
            });
        }

        let outcome = self.claim(&student.name, &student.plan_text)?;
        Ok(CodeClaim { student, outcome })
    }

    pub fn status(&self) -> ServiceStatus {
        let dry_run = self.dispatcher.is_dry_run();
        ServiceStatus {
            status: "Online",
            mode: if dry_run {
                "TEST MODE (Not printing)"
            } else {
                "PRODUCTION (Printing enabled)"
            },
            dry_run,
            printer: self.dispatcher.sink_description(),
            schedule: self.resolver.schedule().iter().map(|w| w.to_string()).collect(),
        }
    }

    fn refusal_message(
        &self,
        plan: MealPlanKind,
        decision: &EntitlementDecision,
        now: NaiveDateTime,
    ) -> String {
        match decision.reason {
            DecisionReason::NoPlan => {
                "No meal plan registered. Please visit the treasury office.".to_string()
            }
            DecisionReason::Pending => match self.resolver.next_window(plan, now) {
                Some(next) => format!("Not time to claim yet. Next service: {}", next),
                None => format!(
                    "Outside claim hours. Today's schedule: {}",
                    self.resolver
                        .schedule()
                        .iter()
                        .map(|w| w.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
            DecisionReason::Granted => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::sink::RecordingSink;
    use crate::core::dispatcher::DeliveryOutcome;
    use crate::domain::model::Service;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MockDirectory {
        students: HashMap<String, Student>,
    }

    impl MockDirectory {
        fn new(entries: &[(&str, Student)]) -> Self {
            Self {
                students: entries
                    .iter()
                    .map(|(code, s)| (code.to_string(), s.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl StudentDirectory for MockDirectory {
        async fn lookup(&self, code: &str) -> Result<Option<Student>> {
            Ok(self.students.get(code).cloned())
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn service(dir: &TempDir, sink: Arc<RecordingSink>, now: NaiveDateTime) -> ClaimService {
        let mut config = ServiceConfig::default();
        config.printer.dry_run = false;
        config.printer.staging_dir = Some(dir.path().to_path_buf());

        let directory = MockDirectory::new(&[
            ("A1", Student::new("José Pérez", "8", "REFRIGERIO Y ALMUERZO")),
            ("K1", Student::new("Sofía Ruiz", "K3", "SOLO ALMUERZO")),
            ("N1", Student::new("Luis Mora", "9", "SIN PLAN")),
        ]);

        ClaimService::from_config(&config, sink, Arc::new(directory), Arc::new(FixedClock::new(now)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_claim_prints_snack_in_the_morning() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let claims = service(&dir, sink.clone(), at(7, 0));

        let outcome = claims.claim("José Pérez", "REFRIGERIO Y ALMUERZO").unwrap();
        let ClaimOutcome::Printed(ticket) = outcome else {
            panic!("expected a printed ticket");
        };
        assert_eq!(ticket.window.service, Service::Snack);
        assert_eq!(ticket.keyword, "LEARN TO LEARN");

        ticket.delivery.await.unwrap();
        let deliveries = sink.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        let text = String::from_utf8_lossy(&deliveries[0].bytes);
        assert!(text.contains("Jose Perez"));
        assert!(text.contains("(Refrigerio/Snack)"));
        assert!(text.contains("LEARN TO LEARN"));
    }

    #[tokio::test]
    async fn test_claim_in_dead_gap_names_next_window() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let claims = service(&dir, sink.clone(), at(11, 35));

        match claims.claim("José Pérez", "REFRIGERIO Y ALMUERZO").unwrap() {
            ClaimOutcome::Refused { decision, message } => {
                assert_eq!(decision.reason, DecisionReason::Pending);
                assert!(message.contains("Almuerzo/Lunch (11:40 - 18:00)"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(sink.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_claim_after_hours_lists_schedule() {
        let dir = TempDir::new().unwrap();
        let claims = service(&dir, Arc::new(RecordingSink::new()), at(19, 0));

        match claims.claim("Ana", "SOLO REFRIGERIO").unwrap() {
            ClaimOutcome::Refused { message, .. } => {
                assert!(message.contains("Refrigerio/Snack (06:00 - 11:30)"));
                assert!(message.contains("Almuerzo/Lunch (11:40 - 18:00)"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_claim_without_plan() {
        let dir = TempDir::new().unwrap();
        let claims = service(&dir, Arc::new(RecordingSink::new()), at(12, 0));

        match claims.claim("Ana", "").unwrap() {
            ClaimOutcome::Refused { decision, message } => {
                assert_eq!(decision.reason, DecisionReason::NoPlan);
                assert!(message.contains("treasury"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repeated_claims_are_not_deduplicated() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let claims = service(&dir, sink.clone(), at(12, 0));

        for _ in 0..2 {
            if let ClaimOutcome::Printed(ticket) = claims.claim("Ana", "SOLO ALMUERZO").unwrap() {
                ticket.delivery.await.unwrap();
            } else {
                panic!("expected a printed ticket");
            }
        }
        assert_eq!(sink.deliveries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_claim_by_code_flow() {
        let dir = TempDir::new().unwrap();
        let claims = service(&dir, Arc::new(RecordingSink::new()), at(12, 0));

        let claim = claims.claim_by_code(" A1 ").await.unwrap();
        assert_eq!(claim.student.name, "José Pérez");
        assert!(claim.outcome.is_printed());
    }

    #[tokio::test]
    async fn test_claim_by_code_errors() {
        let dir = TempDir::new().unwrap();
        let claims = service(&dir, Arc::new(RecordingSink::new()), at(12, 0));

        assert!(matches!(
            claims.claim_by_code("  ").await,
            Err(ServiceError::InvalidRequest { .. })
        ));
        assert!(matches!(
            claims.claim_by_code("ZZZ").await,
            Err(ServiceError::UnknownCode { .. })
        ));
        assert!(matches!(
            claims.claim_by_code("K1").await,
            Err(ServiceError::GradeDenied { .. })
        ));

        let claim = claims.claim_by_code("N1").await.unwrap();
        assert!(!claim.outcome.is_printed());
    }

    #[tokio::test]
    async fn test_status_reports_mode() {
        let dir = TempDir::new().unwrap();
        let claims = service(&dir, Arc::new(RecordingSink::new()), at(8, 0));

        let status = claims.status();
        assert!(!status.dry_run);
        assert_eq!(status.mode, "PRODUCTION (Printing enabled)");
        assert_eq!(status.printer, "recording");
        assert_eq!(status.schedule.len(), 2);
    }

    #[tokio::test]
    async fn test_claim_rejects_unprintable_name() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let claims = service(&dir, sink.clone(), at(7, 0));

        for name in ["", "   ", "\u{1b}", "\u{301}\u{7}"] {
            assert!(matches!(
                claims.claim(name, "SOLO REFRIGERIO"),
                Err(ServiceError::InvalidRequest { .. })
            ));
        }
        assert!(sink.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_claim_by_code_with_unprintable_directory_name() {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::default();
        config.printer.staging_dir = Some(dir.path().to_path_buf());
        let directory = MockDirectory::new(&[("B1", Student::new("\u{1b}", "8", "SOLO ALMUERZO"))]);
        let claims = ClaimService::from_config(
            &config,
            Arc::new(RecordingSink::new()),
            Arc::new(directory),
            Arc::new(FixedClock::new(at(12, 0))),
        )
        .unwrap();

        assert!(matches!(
            claims.claim_by_code("B1").await,
            Err(ServiceError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_dry_run_claim_stages_ticket_without_printing() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let mut config = ServiceConfig::default();
        config.printer.dry_run = true;
        config.printer.staging_dir = Some(dir.path().to_path_buf());
        let claims = ClaimService::from_config(
            &config,
            sink.clone(),
            Arc::new(MockDirectory::new(&[])),
            Arc::new(FixedClock::new(at(12, 0))),
        )
        .unwrap();

        let ClaimOutcome::Printed(ticket) = claims.claim("Ana", "SOLO ALMUERZO").unwrap() else {
            panic!("expected a printed ticket");
        };
        let report = ticket.delivery.await.unwrap();

        assert_eq!(report.outcome, DeliveryOutcome::DryRun);
        assert!(report.staged_bytes > 0);
        assert!(report.staged.starts_with(dir.path()));
        assert!(!report.staged.exists());
        assert!(sink.deliveries().await.is_empty());
    }
}
