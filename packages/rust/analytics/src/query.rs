//! Typed GraphQL queries for the resolver analytics datasets.
//!
//! Query documents are static; everything that varies per invocation (account,
//! time bound, decision codes, category ids, limit) travels as GraphQL
//! variables so nothing is spliced into the query text.

use serde::Serialize;

use gatewayreport_shared::TimeWindow;

/// Resolver decisions counted as "blocked".
pub const BLOCKED_DECISIONS: [u8; 4] = [2, 3, 6, 9];

/// Resolver decisions counted as "allowed".
pub const ALLOWED_DECISIONS: [u8; 4] = [1, 4, 5, 10];

/// Content categories tracked by the category sections.
pub const REPORTED_CATEGORY_IDS: [u32; 15] =
    [2, 3, 6, 7, 9, 10, 12, 33, 15, 17, 32, 21, 22, 24, 26];

/// Rows requested per query.
pub const RESULT_LIMIT: u32 = 10;

const RESOLVER_QUERIES_DOCUMENT: &str = r#"query GatewayResolverQueries($accountTag: string!, $filter: AccountGatewayResolverQueriesAdaptiveGroupsFilter_InputObject!, $limit: uint64!) {
  viewer {
    accounts(filter: { accountTag: $accountTag }) {
      gatewayResolverQueriesAdaptiveGroups(filter: $filter, limit: $limit, orderBy: [count_DESC]) {
        count
        dimensions { queryName }
      }
    }
  }
}"#;

const RESOLVER_BY_CATEGORY_DOCUMENT: &str = r#"query GatewayResolverByCategory($accountTag: string!, $filter: AccountGatewayResolverByCategoryAdaptiveGroupsFilter_InputObject!, $limit: uint64!) {
  viewer {
    accounts(filter: { accountTag: $accountTag }) {
      gatewayResolverByCategoryAdaptiveGroups(filter: $filter, limit: $limit, orderBy: [count_DESC]) {
        count
        dimensions { categoryId }
      }
    }
  }
}"#;

// ---------------------------------------------------------------------------
// Query kinds
// ---------------------------------------------------------------------------

/// Which resolver outcomes a query counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Blocked,
    Allowed,
}

impl Decision {
    pub fn codes(&self) -> &'static [u8] {
        match self {
            Self::Blocked => &BLOCKED_DECISIONS,
            Self::Allowed => &ALLOWED_DECISIONS,
        }
    }
}

/// The analytics dataset a query reads, which fixes its grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Grouped by queried domain name.
    ResolverQueries,
    /// Grouped by content category id.
    ResolverByCategory,
}

impl Dataset {
    /// Field name of the dataset under `viewer.accounts[]`.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ResolverQueries => "gatewayResolverQueriesAdaptiveGroups",
            Self::ResolverByCategory => "gatewayResolverByCategoryAdaptiveGroups",
        }
    }

    fn document(&self) -> &'static str {
        match self {
            Self::ResolverQueries => RESOLVER_QUERIES_DOCUMENT,
            Self::ResolverByCategory => RESOLVER_BY_CATEGORY_DOCUMENT,
        }
    }
}

/// The four fixed queries behind the report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportQuery {
    BlockedDomains,
    AllowedDomains,
    AllowedCategories,
    BlockedCategories,
}

impl ReportQuery {
    /// All queries, in report section order.
    pub const ALL: [ReportQuery; 4] = [
        Self::BlockedDomains,
        Self::AllowedDomains,
        Self::AllowedCategories,
        Self::BlockedCategories,
    ];

    pub fn decision(&self) -> Decision {
        match self {
            Self::BlockedDomains | Self::BlockedCategories => Decision::Blocked,
            Self::AllowedDomains | Self::AllowedCategories => Decision::Allowed,
        }
    }

    pub fn dataset(&self) -> Dataset {
        match self {
            Self::BlockedDomains | Self::AllowedDomains => Dataset::ResolverQueries,
            Self::AllowedCategories | Self::BlockedCategories => Dataset::ResolverByCategory,
        }
    }

    /// Stable label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlockedDomains => "blocked_domains",
            Self::AllowedDomains => "allowed_domains",
            Self::AllowedCategories => "allowed_categories",
            Self::BlockedCategories => "blocked_categories",
        }
    }

    /// Build the request body for this query.
    pub fn request(&self, account_id: &str, window: &TimeWindow) -> GraphqlRequest {
        let dataset = self.dataset();
        let category_id_in = match dataset {
            Dataset::ResolverQueries => None,
            Dataset::ResolverByCategory => Some(REPORTED_CATEGORY_IDS.to_vec()),
        };

        GraphqlRequest {
            query: dataset.document(),
            variables: QueryVariables {
                account_tag: account_id.to_string(),
                filter: ResolverFilter {
                    datetime_gt: window.to_iso8601(),
                    resolver_decision_in: self.decision().codes().to_vec(),
                    category_id_in,
                },
                limit: RESULT_LIMIT,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// JSON body POSTed to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: QueryVariables,
}

/// Variables bound into the static query document.
#[derive(Debug, Clone, Serialize)]
pub struct QueryVariables {
    #[serde(rename = "accountTag")]
    pub account_tag: String,
    pub filter: ResolverFilter,
    pub limit: u32,
}

/// Dataset filter object.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverFilter {
    pub datetime_gt: String,
    #[serde(rename = "resolverDecision_in")]
    pub resolver_decision_in: Vec<u8>,
    #[serde(rename = "categoryId_in", skip_serializing_if = "Option::is_none")]
    pub category_id_in: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::trailing(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    }

    #[test]
    fn domain_query_variables() {
        let request = ReportQuery::BlockedDomains.request("acct-1", &window());
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["variables"]["accountTag"], "acct-1");
        assert_eq!(json["variables"]["limit"], 10);
        assert_eq!(json["variables"]["filter"]["datetime_gt"], "2026-10-17T12:00:00Z");
        assert_eq!(
            json["variables"]["filter"]["resolverDecision_in"],
            serde_json::json!([2, 3, 6, 9])
        );
        assert!(json["variables"]["filter"].get("categoryId_in").is_none());
        assert!(json["query"].as_str().unwrap().contains("gatewayResolverQueriesAdaptiveGroups"));
    }

    #[test]
    fn category_query_variables() {
        let request = ReportQuery::AllowedCategories.request("acct-1", &window());
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(
            json["variables"]["filter"]["resolverDecision_in"],
            serde_json::json!([1, 4, 5, 10])
        );
        let categories = json["variables"]["filter"]["categoryId_in"].as_array().unwrap();
        assert_eq!(categories.len(), 15);
        assert!(json["query"].as_str().unwrap().contains("categoryId"));
    }

    #[test]
    fn account_id_never_reaches_query_text() {
        let hostile = r#"x" }) { __typename } #"#;
        let request = ReportQuery::BlockedCategories.request(hostile, &window());
        assert!(!request.query.contains(hostile));
        assert_eq!(request.variables.account_tag, hostile);
    }

    #[test]
    fn query_kinds_cover_both_decisions_and_datasets() {
        let blocked: Vec<_> = ReportQuery::ALL
            .iter()
            .filter(|q| q.decision() == Decision::Blocked)
            .collect();
        assert_eq!(blocked.len(), 2);

        let by_category = ReportQuery::ALL
            .iter()
            .filter(|q| q.dataset() == Dataset::ResolverByCategory)
            .count();
        assert_eq!(by_category, 2);
    }
}
