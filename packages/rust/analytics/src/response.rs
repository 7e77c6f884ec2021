//! GraphQL response decoding.

use serde::Deserialize;

use gatewayreport_shared::{EventDimension, EventRecord, GatewayReportError, Result};

use crate::query::{Dataset, ReportQuery};

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ViewerData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    #[serde(default)]
    accounts: Vec<AccountGroups>,
}

#[derive(Debug, Deserialize)]
struct AccountGroups {
    #[serde(rename = "gatewayResolverQueriesAdaptiveGroups", default)]
    resolver_queries: Option<Vec<AdaptiveGroup>>,
    #[serde(rename = "gatewayResolverByCategoryAdaptiveGroups", default)]
    resolver_by_category: Option<Vec<AdaptiveGroup>>,
}

#[derive(Debug, Deserialize)]
struct AdaptiveGroup {
    count: u64,
    dimensions: GroupDimensions,
}

#[derive(Debug, Deserialize)]
struct GroupDimensions {
    #[serde(rename = "queryName", default)]
    query_name: Option<String>,
    #[serde(rename = "categoryId", default)]
    category_id: Option<u32>,
}

/// Decode a GraphQL response body into event records, preserving row order.
pub(crate) fn parse_events(query: ReportQuery, body: &str) -> Result<Vec<EventRecord>> {
    let label = query.label();
    let response: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| GatewayReportError::api(format!("{label}: response is not valid JSON: {e}")))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(GatewayReportError::api(format!(
            "{label}: GraphQL API error: {}",
            messages.join("; ")
        )));
    }

    let data = response
        .data
        .ok_or_else(|| GatewayReportError::api(format!("{label}: no data returned")))?;

    let account = data.viewer.accounts.into_iter().next().ok_or_else(|| {
        GatewayReportError::api(format!("{label}: account missing from response"))
    })?;

    let dataset = query.dataset();
    let groups = match dataset {
        Dataset::ResolverQueries => account.resolver_queries,
        Dataset::ResolverByCategory => account.resolver_by_category,
    }
    .ok_or_else(|| {
        GatewayReportError::api(format!("{label}: {} missing from response", dataset.field()))
    })?;

    groups
        .into_iter()
        .map(|group| {
            let dimension = match dataset {
                Dataset::ResolverQueries => group.dimensions.query_name.map(EventDimension::Domain),
                Dataset::ResolverByCategory => {
                    group.dimensions.category_id.map(EventDimension::Category)
                }
            }
            .ok_or_else(|| {
                GatewayReportError::api(format!("{label}: row without a grouping dimension"))
            })?;

            Ok(EventRecord {
                count: group.count,
                dimension,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_domain_rows_in_order() {
        let body = r#"{
            "data": {"viewer": {"accounts": [{"gatewayResolverQueriesAdaptiveGroups": [
                {"count": 100, "dimensions": {"queryName": "ads.example.com"}},
                {"count": 50, "dimensions": {"queryName": "tracker.example.net"}}
            ]}]}},
            "errors": null
        }"#;

        let records = parse_events(ReportQuery::BlockedDomains, body).expect("parse");
        assert_eq!(
            records,
            vec![
                EventRecord::domain("ads.example.com", 100),
                EventRecord::domain("tracker.example.net", 50),
            ]
        );
    }

    #[test]
    fn parses_category_rows() {
        let body = r#"{"data": {"viewer": {"accounts": [{"gatewayResolverByCategoryAdaptiveGroups": [
            {"count": 7, "dimensions": {"categoryId": 33}}
        ]}]}}}"#;

        let records = parse_events(ReportQuery::AllowedCategories, body).expect("parse");
        assert_eq!(records, vec![EventRecord::category(33, 7)]);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let body = r#"{"data": {"viewer": {"accounts": [{"gatewayResolverQueriesAdaptiveGroups": []}]}}}"#;
        let records = parse_events(ReportQuery::AllowedDomains, body).expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn reported_errors_fail() {
        let body = r#"{"data": null, "errors": [{"message": "not authorized for that account"}]}"#;
        let err = parse_events(ReportQuery::BlockedDomains, body).unwrap_err();
        assert!(matches!(err, GatewayReportError::Api(_)));
        assert!(err.to_string().contains("not authorized"));
    }

    #[test]
    fn errors_fail_even_with_data() {
        let body = r#"{
            "data": {"viewer": {"accounts": [{"gatewayResolverQueriesAdaptiveGroups": []}]}},
            "errors": [{"message": "quota exceeded"}]
        }"#;
        assert!(parse_events(ReportQuery::BlockedDomains, body).is_err());
    }

    #[test]
    fn missing_data_fails() {
        let err = parse_events(ReportQuery::BlockedDomains, "{}").unwrap_err();
        assert!(err.to_string().contains("no data returned"));
    }

    #[test]
    fn malformed_json_fails() {
        let err = parse_events(ReportQuery::BlockedDomains, "<html>oops</html>").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn missing_account_or_dataset_fails() {
        let no_account = r#"{"data": {"viewer": {"accounts": []}}}"#;
        assert!(parse_events(ReportQuery::BlockedDomains, no_account).is_err());

        let wrong_dataset = r#"{"data": {"viewer": {"accounts": [{"gatewayResolverQueriesAdaptiveGroups": []}]}}}"#;
        let err = parse_events(ReportQuery::BlockedCategories, wrong_dataset).unwrap_err();
        assert!(err.to_string().contains("gatewayResolverByCategoryAdaptiveGroups"));
    }

    #[test]
    fn row_without_dimension_fails() {
        let body = r#"{"data": {"viewer": {"accounts": [{"gatewayResolverQueriesAdaptiveGroups": [
            {"count": 3, "dimensions": {}}
        ]}]}}}"#;
        assert!(parse_events(ReportQuery::BlockedDomains, body).is_err());
    }
}
