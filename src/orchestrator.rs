//! Test run orchestration.
//!
//! A [`TestRunOrchestrator`] launches one test run on the server and follows
//! it until the server reports completion or the deadline passes:
//!
//! 1. **Create**: `POST /tests` returns a [`TestRunHandle`]
//! 2. **Warm up**: wait [`WARM_UP`] so the server registers the run
//! 3. **Poll**: fetch the status, print a progress line, wait
//!    [`POLL_INTERVAL`] while the run is in progress
//! 4. **Report**: print the link to the results page
//!
//! Remote errors end the run immediately. A run that finishes unsuccessfully
//! or times out is not an error: it is reported through
//! [`TestRunOutcome::exit_code`].
//!
//! # Example
//!
//! ```no_run
//! use microcks_cli::client::{MicrocksClient, TestRunRequest};
//! use microcks_cli::config::ClientConfig;
//! use microcks_cli::orchestrator::TestRunOrchestrator;
//! use microcks_cli::runner::RunnerType;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("http://localhost:8080/api", "cli", "secret");
//!     let client = MicrocksClient::connect(&config).await?;
//!
//!     let request = TestRunRequest::new(
//!         "Beer Catalog API:0.9",
//!         "http://beer-catalog:9000/api/",
//!         RunnerType::OpenApiSchema,
//!         5_000,
//!     );
//!
//!     let orchestrator = TestRunOrchestrator::new(&client, &config);
//!     let outcome = orchestrator.run(&request, &mut std::io::stdout()).await?;
//!     std::process::exit(outcome.exit_code().into());
//! }
//! ```

pub mod poller;

use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{MicrocksApi, TestRunHandle, TestRunRequest};
use crate::config::ClientConfig;
use crate::error::CliError;

pub use poller::{
    DEADLINE_GRACE, POLL_INTERVAL, PollSchedule, PollState, PollTracker, WARM_UP,
};

/// Result of following a test run to completion or timeout.
#[derive(Debug, Clone)]
pub struct TestRunOutcome {
    /// Handle returned when the run was created.
    pub handle: TestRunHandle,

    /// Final poll state, either [`PollState::Completed`] or
    /// [`PollState::TimedOut`].
    pub state: PollState,

    /// Last success flag reported by the server.
    pub success: bool,

    /// Number of status fetches performed.
    pub polls: usize,

    /// Link to the run in the web UI.
    pub results_url: String,
}

impl TestRunOutcome {
    /// Returns `true` if the server reported a successful run.
    ///
    /// A run that timed out counts as failed unless its last status was
    /// already successful.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns the process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

/// Launches a test run and polls it under a deadline.
pub struct TestRunOrchestrator<'a, C: ?Sized> {
    client: &'a C,
    config: ClientConfig,
    schedule: PollSchedule,
}

impl<'a, C> TestRunOrchestrator<'a, C>
where
    C: MicrocksApi + ?Sized,
{
    /// Creates an orchestrator using the default [`PollSchedule`].
    ///
    /// Result links are derived from `config.api_url`.
    pub fn new(client: &'a C, config: &ClientConfig) -> Self {
        Self {
            client,
            config: config.clone(),
            schedule: PollSchedule::default(),
        }
    }

    /// Replaces the poll timings.
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Creates the test run described by `request` and follows it.
    ///
    /// Progress lines and the final results link are written to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Client`] if the creation call or any status
    /// fetch fails, and [`CliError::Io`] if `out` cannot be written.
    pub async fn run<W: Write>(
        &self,
        request: &TestRunRequest,
        out: &mut W,
    ) -> Result<TestRunOutcome, CliError> {
        let handle = self
            .client
            .create_test_result(request)
            .await
            .map_err(CliError::client("creating Test"))?;

        info!("Created test run {}", handle);

        tokio::time::sleep(self.schedule.warm_up).await;

        let deadline = self
            .schedule
            .deadline_from(Instant::now(), request.timeout_millis);
        let mut tracker = PollTracker::new(deadline);

        while tracker.should_poll(Instant::now()) {
            let status = self
                .client
                .get_test_result(&handle)
                .await
                .map_err(CliError::client("check TestResult"))?;

            let state = tracker.observe(&status);
            writeln!(
                out,
                "MicrocksClient got status for test \"{}\" - success: {}, inProgress: {}",
                handle, status.success, status.in_progress
            )?;

            if state == PollState::Completed {
                break;
            }

            writeln!(
                out,
                "MicrocksTester waiting for {} before checking again or exiting.",
                describe_interval(self.schedule.interval)
            )?;
            out.flush()?;
            tokio::time::sleep(self.schedule.interval).await;
        }

        match tracker.state() {
            PollState::TimedOut => warn!(
                "Test run {} still in progress after {} polls, giving up",
                handle,
                tracker.polls()
            ),
            state => debug!(?state, polls = tracker.polls(), "polling finished"),
        }

        let results_url = self.config.test_result_url(handle.as_str());
        writeln!(out, "Full TestResult details are available here: {}", results_url)?;
        out.flush()?;

        Ok(TestRunOutcome {
            handle,
            state: tracker.state(),
            success: tracker.success(),
            polls: tracker.polls(),
            results_url,
        })
    }
}

/// Human form of a poll interval, e.g. `2 seconds`.
fn describe_interval(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 == 0 {
        format!("{} seconds", millis / 1000)
    } else {
        format!("{} milliseconds", millis)
    }
}
