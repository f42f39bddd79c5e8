use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::types::Message;

const ASSISTANT_INSTRUCTIONS: &str = "You are an AI assistant that helps users find legal resources. \
When using the Martindale URL generator, always explain what the URL will help them find and \
describe the kind of results they can expect. Format every URL as a clickable link and encourage \
users to review several attorneys before choosing one. Keep your answers short and to the point.";

const LINK_NOTES: &str = "NOTES:\n\n- Any time you include a URL in your response, format it as a \
markdown link with short but descriptive anchor text.";

/// Caller-supplied context used to seed a session's system messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedContext {
    /// Free-form user location or locale, e.g. `"en-US"` or `"Denver, CO"`.
    #[serde(default)]
    pub locale: Option<String>,
    /// Full text of the contract under discussion.
    #[serde(default)]
    pub document_text: Option<String>,
    /// A previously generated analysis report.
    #[serde(default)]
    pub prior_report: Option<Value>,
}

/// Build the initial system messages for a new session.
///
/// Everything seeded lands in one system message so budget eviction, which
/// never touches index 0, cannot drop any of it.
pub fn build_seed_messages(seed: &SeedContext, now: DateTime<Utc>) -> Vec<Message> {
    let location = seed
        .locale
        .as_deref()
        .map(str::trim)
        .filter(|locale| !locale.is_empty())
        .unwrap_or("unknown");

    let mut instructions = format!(
        "{ASSISTANT_INSTRUCTIONS} The user is located at: {location}. The current time is: {}.",
        now.format("%Y-%m-%d %H:%M UTC")
    );

    match seed.document_text.as_deref().map(str::trim) {
        Some(document) if !document.is_empty() => {
            instructions.push_str(
                " The user is getting ready to sign the contract included below. \
Help answer any questions they may have about the contract.",
            );
            instructions.push_str("\n\n");
            instructions.push_str(LINK_NOTES);
            instructions.push_str("\n\nCONTRACT TEXT:\n");
            instructions.push_str(document);
        }
        _ => {
            instructions.push_str("\n\n");
            instructions.push_str(LINK_NOTES);
        }
    }

    if let Some(report) = seed.prior_report.as_ref().filter(|report| !report.is_null()) {
        instructions.push_str("\n\nPREVIOUS ANALYSIS REPORT:\n");
        instructions.push_str(&report.to_string());
    }

    vec![Message::system(instructions)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::Role;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap()
    }

    #[test]
    fn seeds_single_invisible_system_message() {
        let messages = build_seed_messages(&SeedContext::default(), fixed_time());

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(!messages[0].visible);
        assert!(messages[0].text().contains("2024-03-09 14:05 UTC"));
        assert!(messages[0].text().contains("located at: unknown"));
    }

    #[test]
    fn includes_locale_and_contract_text() {
        let seed = SeedContext {
            locale: Some("Denver, CO".to_string()),
            document_text: Some("The tenant shall pay rent monthly.".to_string()),
            prior_report: None,
        };

        let text = build_seed_messages(&seed, fixed_time())[0].text();

        assert!(text.contains("located at: Denver, CO"));
        assert!(text.ends_with("CONTRACT TEXT:\nThe tenant shall pay rent monthly."));
    }

    #[test]
    fn prior_report_is_folded_into_system_message() {
        let seed = SeedContext {
            document_text: Some("Lease".to_string()),
            prior_report: Some(json!({"risk": "low"})),
            ..SeedContext::default()
        };

        let messages = build_seed_messages(&seed, fixed_time());

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        let text = messages[0].text();
        assert!(text.contains("CONTRACT TEXT:\nLease"));
        assert!(text.ends_with(r#"PREVIOUS ANALYSIS REPORT:
{"risk":"low"}"#));
    }

    #[test]
    fn null_prior_report_adds_nothing() {
        let seed = SeedContext {
            prior_report: Some(Value::Null),
            ..SeedContext::default()
        };

        let text = build_seed_messages(&seed, fixed_time())[0].text();
        assert!(!text.contains("PREVIOUS ANALYSIS REPORT"));
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let seed: SeedContext =
            serde_json::from_value(json!({"locale": "es-MX", "documentText": "x"})).unwrap();

        assert_eq!(seed.locale.as_deref(), Some("es-MX"));
        assert_eq!(seed.document_text.as_deref(), Some("x"));
        assert!(seed.prior_report.is_none());
    }
}
