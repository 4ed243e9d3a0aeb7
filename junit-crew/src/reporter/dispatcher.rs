// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes events from the bus to the aggregator and the archiver.

use super::{
    aggregator::{CaseOutcome, ReportAggregator},
    tree::{NonSuccess, ReportTree},
};
use crate::{
    archiver::{ArtifactArchiver, ArtifactStore, FileSystemStore},
    config::CrewConfig,
    errors::DisplayErrorChain,
    stage::{Stage, StageEvents},
};
use junit_crew_events::{Artifact, DomainEvent, ErrorDetails, Outcome, OutcomeKind};
use tracing::{debug, warn};

/// Receives every event announced during a run and acts on the ones it recognizes.
///
/// Lifecycle events are folded into a [`ReportAggregator`]. When the run finishes, the report is
/// rendered and announced as a [`DomainEvent::ArtifactGenerated`] on the [`Stage`]. Generated
/// artifacts (including the report, once it comes back through [`Self::drain`]) are handed to an
/// [`ArtifactArchiver`].
///
/// Events are expected to be delivered one at a time, in order.
#[derive(Debug)]
pub struct EventDispatcher<S = FileSystemStore> {
    aggregator: ReportAggregator,
    archiver: ArtifactArchiver<S>,
    stage: Stage,
    report_name: String,
}

impl EventDispatcher<FileSystemStore> {
    /// Creates a dispatcher that archives into the directory named by the config.
    pub fn from_config(config: &CrewConfig, stage: Stage) -> Self {
        let store = FileSystemStore::new(config.archive().dir());
        Self::new(config, store, stage)
    }
}

impl<S: ArtifactStore> EventDispatcher<S> {
    /// Creates a dispatcher that archives into the given store.
    pub fn new(config: &CrewConfig, store: S, stage: Stage) -> Self {
        let report = config.report();
        Self {
            aggregator: ReportAggregator::new(report.suite_policy(), report.implicit_suite_name()),
            archiver: ArtifactArchiver::new(store, stage.clone(), config.archive().clone()),
            stage,
            report_name: report.name().to_owned(),
        }
    }

    /// Handles a single event.
    ///
    /// Events this dispatcher has no use for, including its own announcements and
    /// [`DomainEvent::Unknown`], are ignored.
    pub fn notify(&mut self, event: DomainEvent) {
        debug!("received {} event", event.type_name());

        match event {
            DomainEvent::TestSuiteStarts { name } => self.aggregator.on_suite_started(&name),
            DomainEvent::TestSuiteFinished { name: _ } => self.aggregator.on_suite_finished(),
            DomainEvent::SceneStarts { name } => self.aggregator.on_case_started(&name),
            DomainEvent::SceneFinished { name: _, outcome } => {
                self.aggregator.on_case_outcome(case_outcome(&outcome));
            }
            DomainEvent::PropertyRecorded { name, value } => {
                self.aggregator.add_property(name, value);
            }
            DomainEvent::ActivityStarts { activity_id, name } => {
                self.aggregator
                    .add_property(format!("activity_{activity_id}"), name);
            }
            DomainEvent::TestRunFinishes { timestamp } => {
                debug!("run finished at {timestamp}, rendering report");
                self.finish_run();
            }
            DomainEvent::ArtifactGenerated { name, artifact } => {
                self.archiver.notify_generated(&name, artifact);
            }
            DomainEvent::AsyncOperationAttempted { .. }
            | DomainEvent::AsyncOperationCompleted { .. }
            | DomainEvent::AsyncOperationFailed { .. }
            | DomainEvent::ArtifactArchived { .. }
            | DomainEvent::Unknown => {}
        }
    }

    /// Feeds the events queued on the bus at the time of the call back through [`Self::notify`].
    ///
    /// Announcements made while handling those events, such as the archiver's progress
    /// announcements, stay queued for the next receiver. Returns the number of events handled.
    pub fn drain(&mut self, events: &mut StageEvents) -> usize {
        let queued = events.drain_ready();
        let count = queued.len();
        for event in queued {
            self.notify(event);
        }
        count
    }

    /// Waits for all outstanding archive writes to finish.
    pub async fn wait_for_pending(&mut self) {
        self.archiver.wait_for_pending().await;
    }

    /// Returns the aggregator.
    pub fn aggregator(&self) -> &ReportAggregator {
        &self.aggregator
    }

    /// Returns the archiver.
    pub fn archiver(&self) -> &ArtifactArchiver<S> {
        &self.archiver
    }

    /// Returns the report accumulated so far.
    pub fn render(&self) -> &ReportTree {
        self.aggregator.render()
    }

    fn finish_run(&mut self) {
        self.aggregator.finish_run();

        match self.aggregator.render().to_xml_string() {
            Ok(xml) => self.stage.announce(DomainEvent::ArtifactGenerated {
                name: self.report_name.clone(),
                artifact: Artifact::xml(xml),
            }),
            Err(error) => {
                warn!(
                    "failed to render report `{}`: {}",
                    self.report_name,
                    DisplayErrorChain::new(&error),
                );
            }
        }
    }
}

fn case_outcome(outcome: &Outcome) -> CaseOutcome {
    match outcome.kind() {
        OutcomeKind::Pass => CaseOutcome::Pass,
        OutcomeKind::Skipped => CaseOutcome::Skipped,
        OutcomeKind::Failure => CaseOutcome::Failure(non_success(outcome)),
        OutcomeKind::Error => CaseOutcome::Error(non_success(outcome)),
    }
}

fn non_success(outcome: &Outcome) -> NonSuccess {
    match outcome.error() {
        Some(ErrorDetails {
            name,
            message,
            stack,
        }) => {
            let non_success = NonSuccess::new(name, message);
            match stack {
                Some(stack) => non_success.with_detail(stack),
                None => non_success,
            }
        }
        // For example, a pending scene with no error attached.
        None => NonSuccess::new(outcome.type_name(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reporter::TestCaseStatus, stage};
    use junit_crew_events::CorrelationId;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    /// A store that accepts every write without touching the filesystem.
    struct NullStore;

    impl ArtifactStore for NullStore {
        async fn store(
            &self,
            relative_path: &camino::Utf8Path,
            _contents: Vec<u8>,
        ) -> Result<camino::Utf8PathBuf, crate::errors::StoreError> {
            Ok(relative_path.to_owned())
        }
    }

    fn dispatcher() -> (EventDispatcher<NullStore>, StageEvents) {
        let (stage, events) = stage::stage();
        let dispatcher = EventDispatcher::new(&CrewConfig::default_config(), NullStore, stage);
        (dispatcher, events)
    }

    fn assertion_error() -> ErrorDetails {
        ErrorDetails::new("AssertionError", "1 != 2").with_stack("at total (cart.js:10)")
    }

    #[test_case(Outcome::ExecutionSuccessful, CaseOutcome::Pass ; "successful")]
    #[test_case(
        Outcome::ExecutionFailedWithAssertionError { error: assertion_error() },
        CaseOutcome::Failure(
            NonSuccess::new("AssertionError", "1 != 2").with_detail("at total (cart.js:10)")
        )
        ; "assertion error")]
    #[test_case(
        Outcome::ExecutionFailedWithError { error: ErrorDetails::new("TypeError", "boom") },
        CaseOutcome::Error(NonSuccess::new("TypeError", "boom"))
        ; "error")]
    #[test_case(
        Outcome::ExecutionCompromised { error: ErrorDetails::new("Error", "db down") },
        CaseOutcome::Error(NonSuccess::new("Error", "db down"))
        ; "compromised")]
    #[test_case(
        Outcome::ImplementationPending { error: None },
        CaseOutcome::Error(NonSuccess::new("ImplementationPending", ""))
        ; "pending without error")]
    #[test_case(Outcome::ExecutionSkipped, CaseOutcome::Skipped ; "skipped")]
    #[test_case(
        Outcome::ExecutionIgnored { error: Some(ErrorDetails::new("Error", "flaky")) },
        CaseOutcome::Skipped
        ; "ignored")]
    fn outcomes_are_classified(outcome: Outcome, expected: CaseOutcome) {
        assert_eq!(case_outcome(&outcome), expected);
    }

    #[test]
    fn lifecycle_events_build_the_report() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.notify(DomainEvent::TestSuiteStarts {
            name: "checkout".to_owned(),
        });
        dispatcher.notify(DomainEvent::PropertyRecorded {
            name: "browser".to_owned(),
            value: "chromium".to_owned(),
        });
        dispatcher.notify(DomainEvent::SceneStarts {
            name: "computes the total".to_owned(),
        });
        dispatcher.notify(DomainEvent::ActivityStarts {
            activity_id: "a1".to_owned(),
            name: "Alice adds an item".to_owned(),
        });
        dispatcher.notify(DomainEvent::SceneFinished {
            name: None,
            outcome: Outcome::ExecutionFailedWithAssertionError {
                error: assertion_error(),
            },
        });
        dispatcher.notify(DomainEvent::TestSuiteFinished { name: None });

        let suite = &dispatcher.render().test_suites[0];
        assert_eq!(suite.name, "checkout");
        assert_eq!((suite.tests, suite.failures), (1, 1));
        let properties: Vec<_> = suite
            .properties
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(
            properties,
            vec![
                ("browser", "chromium"),
                ("activity_a1", "Alice adds an item")
            ]
        );
        assert!(matches!(
            suite.test_cases[0].status,
            TestCaseStatus::Failure(_)
        ));

        // Nothing is announced until the run finishes.
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn run_finished_announces_the_report() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.notify(DomainEvent::TestSuiteStarts {
            name: "S".to_owned(),
        });
        dispatcher.notify(DomainEvent::TestRunFinishes {
            timestamp: "2024-03-01T12:30:00+00:00".parse().unwrap(),
        });

        assert!(!dispatcher.aggregator().has_open_suite());
        let expected_xml = dispatcher.render().to_xml_string().unwrap();

        let announcements = events.drain_ready();
        assert_eq!(
            announcements,
            vec![DomainEvent::ArtifactGenerated {
                name: "result".to_owned(),
                artifact: Artifact::xml(expected_xml),
            }]
        );
    }

    #[test]
    fn unknown_and_announcement_events_are_ignored() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.notify(DomainEvent::TestSuiteStarts {
            name: "S".to_owned(),
        });
        let before = dispatcher.render().to_xml_string().unwrap();

        dispatcher.notify(DomainEvent::Unknown);
        dispatcher.notify(DomainEvent::AsyncOperationCompleted {
            description: "done".to_owned(),
            correlation_id: CorrelationId::new_v4(),
        });
        dispatcher.notify(DomainEvent::ArtifactArchived {
            name: "result".to_owned(),
            kind: junit_crew_events::ArtifactKind::XmlData,
            path: "junit-result-0123456789.xml".to_owned(),
        });

        assert_eq!(dispatcher.render().to_xml_string().unwrap(), before);
        assert!(dispatcher.aggregator().has_open_suite());
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn drained_report_is_archived() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.notify(DomainEvent::TestSuiteStarts {
            name: "S".to_owned(),
        });
        dispatcher.notify(DomainEvent::TestRunFinishes {
            timestamp: "2024-03-01T12:30:00+00:00".parse().unwrap(),
        });

        // The report itself.
        assert_eq!(dispatcher.drain(&mut events), 1);
        dispatcher.wait_for_pending().await;

        let announcements = events.drain_ready();
        let types: Vec<_> = announcements.iter().map(|e| e.type_name()).collect();
        assert_eq!(
            types,
            vec![
                "AsyncOperationAttempted",
                "AsyncOperationCompleted",
                "ArtifactArchived"
            ]
        );

        let (
            DomainEvent::AsyncOperationAttempted {
                correlation_id: attempted_id,
                ..
            },
            DomainEvent::AsyncOperationCompleted {
                correlation_id: completed_id,
                ..
            },
        ) = (&announcements[0], &announcements[1])
        else {
            panic!("unexpected announcements: {announcements:?}");
        };
        assert_eq!(attempted_id, completed_id);
        assert_eq!(dispatcher.archiver().pending_count(), 0);

        // Feeding the announcements back is harmless.
        for event in announcements {
            dispatcher.notify(event);
        }
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn drain_leaves_new_announcements_queued() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.notify(DomainEvent::TestRunFinishes {
            timestamp: "2024-03-01T12:30:00+00:00".parse().unwrap(),
        });

        assert_eq!(dispatcher.drain(&mut events), 1);
        assert!(
            matches!(
                events.try_recv(),
                Some(DomainEvent::AsyncOperationAttempted { .. })
            ),
            "the attempt is left for observers"
        );
        assert_eq!(events.try_recv(), None);

        dispatcher.wait_for_pending().await;
        assert_eq!(dispatcher.drain(&mut events), 2);
        assert_eq!(events.try_recv(), None);
    }
}
