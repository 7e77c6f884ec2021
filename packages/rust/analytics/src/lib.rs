//! Analytics API client for resolver event counts and category metadata.
//!
//! Two endpoints are used, both authenticated with the same bearer token:
//! - `POST <base>/graphql` for the four aggregated resolver queries
//! - `GET <base>/accounts/<account>/gateway/categories` for category names

mod categories;
mod query;
mod response;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use gatewayreport_shared::{EventRecord, GatewayReportError, ReportConfig, Result, TimeWindow};

pub use categories::{CategoryEntry, CategoryMap};
pub use query::{
    ALLOWED_DECISIONS, BLOCKED_DECISIONS, Dataset, Decision, GraphqlRequest, QueryVariables,
    REPORTED_CATEGORY_IDS, RESULT_LIMIT, ReportQuery, ResolverFilter,
};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("gatewayreport/", env!("CARGO_PKG_VERSION"));

/// Longest body excerpt quoted in an HTTP status error.
const ERROR_BODY_EXCERPT: usize = 200;

// ---------------------------------------------------------------------------
// AnalyticsClient
// ---------------------------------------------------------------------------

/// Authenticated client for the analytics and category endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: Client,
    token: String,
    account_id: String,
    graphql_url: Url,
    categories_url: Url,
}

impl AnalyticsClient {
    /// Build a client from the resolved invocation config.
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayReportError::api(format!("failed to build HTTP client: {e}")))?;

        let graphql_url = endpoint(&config.api_base_url, &["graphql"])?;
        let categories_url = endpoint(
            &config.api_base_url,
            &["accounts", &config.account_id, "gateway", "categories"],
        )?;

        Ok(Self {
            http,
            token: config.api_token.clone(),
            account_id: config.account_id.clone(),
            graphql_url,
            categories_url,
        })
    }

    /// Run one report query for the given window.
    #[instrument(skip_all, fields(query = query.label()))]
    pub async fn fetch_events(
        &self,
        query: ReportQuery,
        window: &TimeWindow,
    ) -> Result<Vec<EventRecord>> {
        let request = query.request(&self.account_id, window);
        debug!(since = %request.variables.filter.datetime_gt, "sending analytics query");

        let response = self
            .http
            .post(self.graphql_url.clone())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayReportError::api(format!("{}: {e}", query.label())))?;

        let body = read_success_body(response, query.label()).await?;
        let records = response::parse_events(query, &body)?;

        info!(rows = records.len(), "analytics query complete");
        Ok(records)
    }

    /// Fetch the category listing and index it by id.
    #[instrument(skip_all)]
    pub async fn fetch_categories(&self) -> Result<CategoryMap> {
        let response = self
            .http
            .get(self.categories_url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| GatewayReportError::api(format!("categories: {e}")))?;

        let body = read_success_body(response, "categories").await?;
        let map = categories::parse_categories(&body)?;

        info!(categories = map.len(), "category metadata fetched");
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append path segments to the API root, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayReportError::config(format!("API base URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Read the body, failing on a non-2xx status.
async fn read_success_body(response: reqwest::Response, label: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayReportError::api(format!("{label}: failed to read body: {e}")))?;

    if !status.is_success() {
        let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
        return Err(GatewayReportError::api(format!(
            "{label}: HTTP {status}: {excerpt}"
        )));
    }

    Ok(body)
}
