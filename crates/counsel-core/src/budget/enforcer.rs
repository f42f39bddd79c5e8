//! FIFO eviction of conversation turns.
//!
//! The oldest non-system message (index 1) is dropped one at a time and the
//! log is re-measured after every removal. The leading system message is never
//! touched, so the log never becomes empty.

use crate::agent::types::Message;
use crate::budget::counter::TokenCounter;
use crate::budget::types::EnforcementReport;

/// Shrink `messages` in place until its estimated size fits `ceiling`.
///
/// If only the system message remains and it is still over the ceiling the
/// pass stops and reports `over_budget`; callers proceed anyway.
pub fn enforce_budget(
    messages: &mut Vec<Message>,
    ceiling: u32,
    counter: &dyn TokenCounter,
) -> EnforcementReport {
    let mut estimated_tokens = counter.count_messages(messages);
    let mut evicted = 0;

    while estimated_tokens > ceiling && messages.len() > 1 {
        messages.remove(1);
        evicted += 1;
        estimated_tokens = counter.count_messages(messages);
    }

    EnforcementReport {
        evicted,
        estimated_tokens,
        ceiling,
        over_budget: estimated_tokens > ceiling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::Role;
    use crate::budget::counter::WordTokenEstimator;
    use crate::store::seed::{build_seed_messages, SeedContext};

    /// Each message costs the integer written in its content.
    struct SyntheticCounter;

    impl TokenCounter for SyntheticCounter {
        fn count_text(&self, text: &str) -> u32 {
            text.trim().parse().unwrap_or(0)
        }

        fn count_messages(&self, messages: &[Message]) -> u32 {
            messages.iter().map(|m| self.count_text(&m.text())).sum()
        }
    }

    fn log(costs: &[(Role, u32)]) -> Vec<Message> {
        costs
            .iter()
            .map(|(role, cost)| match role {
                Role::System => Message::system(cost.to_string()),
                Role::User => Message::user(cost.to_string()),
                Role::Assistant => Message::assistant(cost.to_string()),
                Role::Function => {
                    Message::function_result("tool", serde_json::json!(cost))
                }
            })
            .collect()
    }

    #[test]
    fn evicts_oldest_turns_until_only_system_remains() {
        let mut messages = log(&[
            (Role::System, 40),
            (Role::User, 30),
            (Role::Assistant, 30),
            (Role::User, 30),
        ]);

        let report = enforce_budget(&mut messages, 50, &SyntheticCounter);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(report.evicted, 3);
        assert_eq!(report.estimated_tokens, 40);
        assert!(!report.over_budget);
    }

    #[test]
    fn stops_as_soon_as_log_fits() {
        let mut messages = log(&[
            (Role::System, 10),
            (Role::User, 30),
            (Role::Assistant, 20),
            (Role::User, 15),
        ]);

        let report = enforce_budget(&mut messages, 50, &SyntheticCounter);

        assert_eq!(report.evicted, 1);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].role, Role::User);
    }

    #[test]
    fn proceeds_over_budget_when_system_message_alone_is_too_large() {
        let mut messages = log(&[(Role::System, 60), (Role::User, 5)]);

        let report = enforce_budget(&mut messages, 50, &SyntheticCounter);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(report.over_budget);
        assert_eq!(report.estimated_tokens, 60);
    }

    #[test]
    fn leaves_log_untouched_when_under_ceiling() {
        let mut messages = log(&[(Role::System, 10), (Role::User, 10)]);

        let report = enforce_budget(&mut messages, 50, &SyntheticCounter);

        assert_eq!(report.evicted, 0);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn system_message_survives_any_ceiling() {
        for ceiling in [0, 1, 25, 75, 1_000] {
            let mut messages = log(&[
                (Role::System, 20),
                (Role::User, 30),
                (Role::Function, 40),
                (Role::User, 10),
                (Role::Assistant, 50),
            ]);

            enforce_budget(&mut messages, ceiling, &SyntheticCounter);

            assert!(!messages.is_empty());
            assert_eq!(messages[0].role, Role::System, "ceiling {ceiling}");
        }
    }

    #[test]
    fn seeded_prior_report_outlives_conversation_turns() {
        let seed = SeedContext {
            prior_report: Some(serde_json::json!({"risk": "late fees"})),
            ..SeedContext::default()
        };
        let counter = WordTokenEstimator::for_language(Some("en"));
        let mut messages = build_seed_messages(&seed, chrono::Utc::now());
        messages.push(Message::user("is clause seven fair to me"));
        let ceiling = counter.count_messages(&messages) - 1;

        let report = enforce_budget(&mut messages, ceiling, &counter);

        assert_eq!(report.evicted, 1);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System]);
        assert!(messages[0].text().contains(r#"{"risk":"late fees"}"#));
    }

    #[test]
    fn repeated_enforcement_never_grows_the_estimate() {
        let counter = WordTokenEstimator::for_language(Some("en"));
        let mut messages = vec![Message::system("You help people read contracts.")];
        for i in 0..20 {
            messages.push(Message::user(format!("question {i} about clause {i}")));
            messages.push(Message::assistant(format!("answer {i} with some detail")));
        }

        let mut previous = counter.count_messages(&messages);
        for _ in 0..3 {
            let report = enforce_budget(&mut messages, 120, &counter);
            assert!(report.estimated_tokens <= previous);
            previous = report.estimated_tokens;
        }
        assert_eq!(messages[0].role, Role::System);
    }
}
