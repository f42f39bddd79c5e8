//! Martindale attorney-search link builder.
//!
//! Turns loose location and practice-area phrases into the facet values the
//! Martindale search page understands, then packs them into the base64
//! `params` query argument. No network access is involved.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use counsel_core::{Tool, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MARTINDALE_SEARCH_URL: &str = "https://www.martindale.com/search/attorneys/";

const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Practice-area facet values accepted by the search page.
pub const PRACTICE_AREAS: &[&str] = &[
    "Real Estate",
    "Divorce",
    "Civil Litigation",
    "Family Law",
    "Wills and Probate",
    "Criminal Law",
    "Estate Planning",
    "Bankruptcy",
    "Landlord and Tenant Law",
    "Trusts and Estates",
    "Immigration",
    "Social Security Disability",
    "Medical Malpractice",
    "Labor and Employment",
    "Personal Injury",
    "Traffic Violations",
    "DUI and DWI",
    "General Practice",
    "Lottery Law",
    "Property Damage",
    "Business Law",
    "Contracts",
    "Employment Law",
    "Intellectual Property",
    "Tax Law",
    "Workers Compensation",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MartindaleArgs {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub geo_location_inputs: Vec<String>,
    #[serde(default)]
    pub area_interest_inputs: Vec<String>,
}

/// The decoded form of the `params` query argument. Field order is the
/// order the page expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub search_type: String,
    pub page: u32,
    pub limit: u32,
    pub pr_overall_score: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_location_facet: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MartindaleSearch {
    pub url: String,
    pub params: SearchParams,
}

fn find_state(input: &str) -> Option<(&'static str, &'static str)> {
    US_STATES.iter().copied().find(|(name, abbr)| {
        input.eq_ignore_ascii_case(name) || input.eq_ignore_ascii_case(abbr)
    })
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a location phrase to a geo facet value.
///
/// A bare state name or abbreviation becomes `"<State>, U.S.A."`. A
/// `"City, ST"` pair becomes `"City, ST"` when the second half names a
/// known state. Anything else yields `None`.
pub fn normalize_location(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some((name, _)) = find_state(input) {
        return Some(format!("{name}, U.S.A."));
    }

    let (city, state) = input.split_once(',')?;
    let (city, state) = (city.trim(), state.trim());
    if city.is_empty() || state.is_empty() {
        return None;
    }

    let (_, abbr) = find_state(state)?;
    Some(format!("{}, {}", title_case(city), abbr))
}

/// Match a practice-area phrase exactly, ignoring case.
pub fn normalize_practice_area(input: &str) -> Option<&'static str> {
    let input = input.trim();
    PRACTICE_AREAS
        .iter()
        .copied()
        .find(|area| area.eq_ignore_ascii_case(input))
}

pub fn build_search(args: &MartindaleArgs) -> Result<MartindaleSearch, ToolError> {
    let locations: Vec<String> = args
        .geo_location_inputs
        .iter()
        .filter_map(|input| normalize_location(input))
        .collect();
    let areas: Vec<String> = args
        .area_interest_inputs
        .iter()
        .filter_map(|input| normalize_practice_area(input))
        .map(str::to_string)
        .collect();
    let term = args.term.trim();

    let params = SearchParams {
        search_type: "people".to_string(),
        page: 1,
        limit: 25,
        pr_overall_score: vec!["4to5".to_string()],
        geo_location_facet: (!locations.is_empty()).then_some(locations),
        practice_areas: (!areas.is_empty()).then_some(areas),
        term: (!term.is_empty()).then(|| term.to_string()),
    };

    let encoded = serde_json::to_vec(&params)
        .map(|bytes| STANDARD.encode(bytes))
        .map_err(|error| ToolError::Execution(format!("Failed to encode search params: {error}")))?;

    Ok(MartindaleSearch {
        url: format!("{MARTINDALE_SEARCH_URL}?params={encoded}"),
        params,
    })
}

pub struct MartindaleUrlTool;

impl MartindaleUrlTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MartindaleUrlTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MartindaleUrlTool {
    fn name(&self) -> &str {
        "generateMartindaleURL"
    }

    fn description(&self) -> &str {
        "Generates a URL for the Martindale search engine to find lawyers based on specific search criteria. Accepts a search term, geographic locations and areas of legal interest."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "term": {
                    "type": "string",
                    "description": "A keyword or phrase used to refine the lawyer search."
                },
                "geoLocationInputs": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of geographic locations (e.g., 'Denver, CO', 'Colorado')."
                },
                "areaInterestInputs": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": format!("List of legal practice areas, e.g. {}.", PRACTICE_AREAS.join(", "))
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: MartindaleArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;

        let search = build_search(&args)?;
        log::debug!("Generated Martindale URL: {}", search.url);

        serde_json::to_value(search).map_err(|error| ToolError::Execution(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(term: &str, locations: &[&str], areas: &[&str]) -> MartindaleArgs {
        MartindaleArgs {
            term: term.to_string(),
            geo_location_inputs: locations.iter().map(|s| s.to_string()).collect(),
            area_interest_inputs: areas.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn decode_params(url: &str) -> Value {
        let encoded = url
            .strip_prefix(&format!("{MARTINDALE_SEARCH_URL}?params="))
            .expect("url should carry params");
        let bytes = STANDARD.decode(encoded).expect("params should be base64");
        serde_json::from_slice(&bytes).expect("params should be JSON")
    }

    #[test]
    fn test_state_names_and_abbreviations() {
        assert_eq!(normalize_location("Colorado").as_deref(), Some("Colorado, U.S.A."));
        assert_eq!(normalize_location(" co ").as_deref(), Some("Colorado, U.S.A."));
        assert_eq!(
            normalize_location("district of columbia").as_deref(),
            Some("District of Columbia, U.S.A.")
        );
    }

    #[test]
    fn test_city_state_pairs() {
        assert_eq!(normalize_location("Denver, co").as_deref(), Some("Denver, CO"));
        assert_eq!(normalize_location("los angeles,CA").as_deref(), Some("Los Angeles, CA"));
        assert_eq!(normalize_location("Austin, Texas").as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn test_unrecognized_locations_are_dropped() {
        assert_eq!(normalize_location("Springfield"), None);
        assert_eq!(normalize_location("Paris, FR"), None);
        assert_eq!(normalize_location(", CO"), None);
        assert_eq!(normalize_location("   "), None);
    }

    #[test]
    fn test_practice_areas_match_exactly() {
        assert_eq!(normalize_practice_area("real estate"), Some("Real Estate"));
        assert_eq!(normalize_practice_area("DUI AND DWI"), Some("DUI and DWI"));
        assert_eq!(normalize_practice_area("estate"), None);
    }

    #[test]
    fn test_build_search_encodes_params_in_order() {
        let search = build_search(&args(
            "landlord dispute",
            &["Denver, CO", "Atlantis"],
            &["landlord and tenant law", "Space Law"],
        ))
        .unwrap();

        let encoded = search.url.split("params=").nth(1).unwrap();
        let raw = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(
            raw,
            r#"{"type":"people","page":1,"limit":25,"prOverallScore":["4to5"],"geoLocationFacet":["Denver, CO"],"practiceAreas":["Landlord and Tenant Law"],"term":"landlord dispute"}"#
        );
        assert_eq!(search.params.geo_location_facet, Some(vec!["Denver, CO".to_string()]));
    }

    #[test]
    fn test_empty_inputs_omit_optional_params() {
        let search = build_search(&args("", &["nowhere"], &[])).unwrap();
        let params = decode_params(&search.url);

        assert_eq!(
            params,
            json!({"type": "people", "page": 1, "limit": 25, "prOverallScore": ["4to5"]})
        );
    }

    #[tokio::test]
    async fn test_execute_returns_url_and_params() {
        let tool = MartindaleUrlTool::new();
        let result = tool
            .execute(json!({"term": "divorce", "geoLocationInputs": ["NY"]}))
            .await
            .unwrap();

        let url = result["url"].as_str().unwrap();
        assert!(url.starts_with(MARTINDALE_SEARCH_URL));
        assert_eq!(result["params"]["geoLocationFacet"], json!(["New York, U.S.A."]));
        assert_eq!(result["params"]["term"], "divorce");
        assert_eq!(decode_params(url), result["params"]);
    }

    #[tokio::test]
    async fn test_execute_rejects_wrong_shapes() {
        let tool = MartindaleUrlTool::new();
        let result = tool.execute(json!({"geoLocationInputs": "Denver"})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
