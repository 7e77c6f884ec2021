//! Category metadata: id -> name/description lookup.
//!
//! The listing is fetched once per invocation. Ids missing from it are not an
//! error; they resolve to [`CategoryLabel::unknown`] at lookup time.

use std::collections::HashMap;

use serde::Deserialize;

use gatewayreport_shared::{
    CategoryLabel, GatewayReportError, Result, UNKNOWN_CATEGORY_DESCRIPTION,
    UNKNOWN_CATEGORY_NAME,
};

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<ApiMessage>>,
    #[serde(default)]
    result: Option<Vec<CategoryEntry>>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// One entry of the category listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<CategoryEntry>,
}

/// Category metadata held for the duration of one run.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: HashMap<u32, (Option<String>, Option<String>)>,
}

impl CategoryMap {
    /// Build the map from listing entries. Subcategories are indexed too; a
    /// top-level entry wins over a subcategory with the same id.
    pub fn from_entries(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        let mut map = Self::default();
        let mut nested = Vec::new();

        for entry in entries {
            nested.extend(entry.subcategories);
            map.entries.insert(entry.id, (entry.name, entry.description));
        }
        while let Some(entry) = nested.pop() {
            nested.extend(entry.subcategories);
            map.entries
                .entry(entry.id)
                .or_insert((entry.name, entry.description));
        }

        map
    }

    /// Name and description for `id`, falling back to the "Unknown" defaults
    /// for absent ids or blank fields.
    pub fn label(&self, id: u32) -> CategoryLabel {
        let Some((name, description)) = self.entries.get(&id) else {
            return CategoryLabel::unknown();
        };

        CategoryLabel {
            name: non_blank(name).unwrap_or(UNKNOWN_CATEGORY_NAME).to_string(),
            description: non_blank(description)
                .unwrap_or(UNKNOWN_CATEGORY_DESCRIPTION)
                .to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Decode the category listing body.
pub(crate) fn parse_categories(body: &str) -> Result<CategoryMap> {
    let response: CategoriesResponse = serde_json::from_str(body).map_err(|e| {
        GatewayReportError::api(format!("categories: response is not valid JSON: {e}"))
    })?;

    let errors = response.errors.unwrap_or_default();
    if response.success == Some(false) || !errors.is_empty() {
        let messages: Vec<_> = errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{code}: {}", e.message),
                None => e.message.clone(),
            })
            .collect();
        return Err(GatewayReportError::api(format!(
            "categories: API error: {}",
            if messages.is_empty() {
                "request unsuccessful".to_string()
            } else {
                messages.join("; ")
            }
        )));
    }

    let entries = response
        .result
        .ok_or_else(|| GatewayReportError::api("categories: no result returned"))?;

    Ok(CategoryMap::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, name: &str, description: &str) -> CategoryEntry {
        CategoryEntry {
            id,
            name: Some(name.into()),
            description: Some(description.into()),
            subcategories: vec![],
        }
    }

    #[test]
    fn known_id_resolves() {
        let map = CategoryMap::from_entries([entry(9, "Gambling", "Betting and casinos")]);
        let label = map.label(9);
        assert_eq!(label.name, "Gambling");
        assert_eq!(label.description, "Betting and casinos");
    }

    #[test]
    fn unknown_id_gets_defaults() {
        let map = CategoryMap::from_entries([entry(9, "Gambling", "Betting")]);
        assert_eq!(map.label(404), CategoryLabel::unknown());
    }

    #[test]
    fn blank_fields_get_defaults() {
        let map = CategoryMap::from_entries([CategoryEntry {
            id: 3,
            name: Some("Adult Themes".into()),
            description: None,
            subcategories: vec![],
        }]);
        let label = map.label(3);
        assert_eq!(label.name, "Adult Themes");
        assert_eq!(label.description, "Description not available");
    }

    #[test]
    fn subcategories_are_indexed() {
        let mut parent = entry(2, "Ads", "Advertising");
        parent.subcategories.push(entry(66, "Ad Networks", "Ad serving"));
        parent.subcategories.push(entry(2, "Shadowed", "never wins"));
        let map = CategoryMap::from_entries([parent]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.label(66).name, "Ad Networks");
        assert_eq!(map.label(2).name, "Ads");
    }

    #[test]
    fn parses_listing() {
        let body = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [
                {"id": 9, "name": "Gambling", "description": "Betting", "class": "premium"},
                {"id": 33, "name": "Sports", "description": "Sports news"}
            ]
        }"#;
        let map = parse_categories(body).expect("parse");
        assert_eq!(map.len(), 2);
        assert_eq!(map.label(33).name, "Sports");
    }

    #[test]
    fn parses_listing_with_null_errors() {
        let body = r#"{
            "success": true,
            "errors": null,
            "result": [{"id": 9, "name": "Gambling", "description": "Betting"}]
        }"#;
        let map = parse_categories(body).expect("null errors is a success");
        assert_eq!(map.label(9).name, "Gambling");
    }

    #[test]
    fn unsuccessful_listing_fails() {
        let body = r#"{"success": false, "errors": [{"code": 10000, "message": "Authentication error"}], "result": null}"#;
        let err = parse_categories(body).unwrap_err();
        assert!(err.to_string().contains("10000: Authentication error"));
    }

    #[test]
    fn missing_result_fails() {
        assert!(parse_categories(r#"{"success": true, "errors": []}"#).is_err());
        assert!(parse_categories("not json").is_err());
    }
}
