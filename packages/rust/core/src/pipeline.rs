//! End-to-end report pipeline: window → fetch → join → render → email → send.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, info_span, instrument};

use gatewayreport_analytics::{AnalyticsClient, CategoryMap, ReportQuery};
use gatewayreport_mailer::{MailTransport, build_report_message};
use gatewayreport_render::{Report, ReportSection, SectionKind, render_html};
use gatewayreport_shared::{
    EventRecord, GatewayReportError, ReportConfig, Result, RunId, TimeWindow,
};

/// Summary of a delivered report.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub run_id: RunId,
    /// `Message-ID` of the sent email.
    pub message_id: Option<String>,
    /// Rows rendered across all four sections.
    pub rows: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Terminal state of one invocation.
#[derive(Debug)]
pub enum RunOutcome {
    /// The email was handed to the transport.
    Delivered(Delivery),
    /// A step failed; nothing was sent.
    Aborted {
        run_id: RunId,
        error: GatewayReportError,
    },
}

impl RunOutcome {
    /// Turn a pipeline result into an outcome, logging failures.
    ///
    /// This is the catch-and-log boundary: errors stop here and are never
    /// re-raised to the scheduler.
    pub fn settle(run_id: RunId, result: Result<Delivery>) -> Self {
        match result {
            Ok(delivery) => {
                info!(
                    %run_id,
                    message_id = delivery.message_id.as_deref().unwrap_or("-"),
                    rows = delivery.rows,
                    elapsed_ms = delivery.elapsed.as_millis(),
                    "report delivered"
                );
                Self::Delivered(delivery)
            }
            Err(error) => {
                error!(
                    %run_id,
                    kind = error.kind(),
                    error = %error,
                    "report run aborted, no email sent"
                );
                Self::Aborted { run_id, error }
            }
        }
    }

    pub fn run_id(&self) -> RunId {
        match self {
            Self::Delivered(delivery) => delivery.run_id,
            Self::Aborted { run_id, .. } => *run_id,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the invocation has settled.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Everything fetched from upstream for one invocation.
#[derive(Debug, Clone)]
pub struct FetchedData {
    pub blocked_domains: Vec<EventRecord>,
    pub allowed_domains: Vec<EventRecord>,
    pub allowed_categories: Vec<EventRecord>,
    pub blocked_categories: Vec<EventRecord>,
    pub categories: CategoryMap,
}

/// Run one invocation against the current clock and settle it.
pub async fn run_scheduled<M: MailTransport>(
    config: &ReportConfig,
    mailer: &M,
    progress: &dyn ProgressReporter,
) -> RunOutcome {
    let run_id = RunId::new();
    let result = deliver_report(run_id, config, mailer, Utc::now(), progress)
        .instrument(info_span!("report_run", %run_id))
        .await;

    let outcome = RunOutcome::settle(run_id, result);
    progress.done(&outcome);
    outcome
}

/// Run the full pipeline for an invocation starting at `now`.
///
/// 1. Compute the 24-hour window
/// 2. Fetch the four queries and the category listing (fail-fast)
/// 3. Join categories and render HTML
/// 4. Build the email and send it
pub async fn deliver_report<M: MailTransport>(
    run_id: RunId,
    config: &ReportConfig,
    mailer: &M,
    now: DateTime<Utc>,
    progress: &dyn ProgressReporter,
) -> Result<Delivery> {
    let start = Instant::now();

    let report = build_report(config, now, progress).await?;
    let rows = report.row_count();

    progress.phase("Rendering report");
    let html = render_html(&report);

    progress.phase("Building email");
    let message = build_report_message(config, html)?;

    progress.phase("Sending email");
    mailer.send(&message).await?;

    Ok(Delivery {
        run_id,
        message_id: message.message_id().map(str::to_string),
        rows,
        elapsed: start.elapsed(),
    })
}

/// Fetch and join everything for the window ending at `now`, without sending.
pub async fn build_report(
    config: &ReportConfig,
    now: DateTime<Utc>,
    progress: &dyn ProgressReporter,
) -> Result<Report> {
    let window = TimeWindow::trailing(now);
    info!(since = %window.to_iso8601(), "starting report pipeline");

    let client = AnalyticsClient::new(config)?;

    progress.phase("Querying analytics");
    let data = fetch_all(&client, &window).await?;

    progress.phase("Joining category metadata");
    Ok(assemble_report(now, window, &data))
}

/// Render the report HTML without sending anything.
pub async fn preview_report(
    config: &ReportConfig,
    now: DateTime<Utc>,
    progress: &dyn ProgressReporter,
) -> Result<String> {
    let report = build_report(config, now, progress).await?;
    progress.phase("Rendering report");
    Ok(render_html(&report))
}

/// Issue all upstream requests concurrently. The first failure aborts the
/// join; requests still in flight are dropped.
#[instrument(skip_all, fields(since = %window.to_iso8601()))]
pub async fn fetch_all(client: &AnalyticsClient, window: &TimeWindow) -> Result<FetchedData> {
    let (blocked_domains, allowed_domains, allowed_categories, blocked_categories, categories) =
        tokio::try_join!(
            client.fetch_events(ReportQuery::BlockedDomains, window),
            client.fetch_events(ReportQuery::AllowedDomains, window),
            client.fetch_events(ReportQuery::AllowedCategories, window),
            client.fetch_events(ReportQuery::BlockedCategories, window),
            client.fetch_categories(),
        )?;

    Ok(FetchedData {
        blocked_domains,
        allowed_domains,
        allowed_categories,
        blocked_categories,
        categories,
    })
}

/// Join category records with their labels and lay out the four sections.
pub fn assemble_report(now: DateTime<Utc>, window: TimeWindow, data: &FetchedData) -> Report {
    let lookup = |id| data.categories.label(id);

    let sections = vec![
        ReportSection::from_records(SectionKind::TopBlockedDomains, &data.blocked_domains, lookup),
        ReportSection::from_records(SectionKind::TopAllowedDomains, &data.allowed_domains, lookup),
        ReportSection::from_records(
            SectionKind::TopCategoriesAllowed,
            &data.allowed_categories,
            lookup,
        ),
        ReportSection::from_records(
            SectionKind::TopCategoriesBlocked,
            &data.blocked_categories,
            lookup,
        ),
    ];

    Report {
        generated_at: now,
        window,
        sections,
    }
}
