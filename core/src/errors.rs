//! Formatting captured failures for the fallback view.

use pokedex_types::RenderError;

pub const FALLBACK_HEADLINE: &str = "There was an error:";
const MAX_MESSAGE_CHARS: usize = 200;
const MAX_CAUSE_CHARS: usize = 160;

/// Display-ready description of a captured failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub headline: &'static str,
    /// One entry per line of the failure message.
    pub message: Vec<String>,
    pub cause: Option<String>,
}

#[must_use]
pub fn failure_report(error: &RenderError) -> FailureReport {
    let trimmed = error.message().trim();
    let message = if trimmed.is_empty() {
        vec!["unknown error".to_string()]
    } else {
        truncate_with_ellipsis(trimmed, MAX_MESSAGE_CHARS)
            .lines()
            .map(ToString::to_string)
            .collect()
    };

    let cause = match error {
        RenderError::Rejected(info) => info
            .cause()
            .map(str::trim)
            .filter(|cause| !cause.is_empty())
            .map(|cause| truncate_with_ellipsis(cause, MAX_CAUSE_CHARS)),
        RenderError::Panicked(_) | RenderError::Failed(_) => None,
    };

    FailureReport {
        headline: FALLBACK_HEADLINE,
        message,
        cause,
    }
}

/// Truncates to at most `max_chars` characters, ending in `...` when shortened.
#[must_use]
pub fn truncate_with_ellipsis(raw: &str, max_chars: usize) -> String {
    if raw.chars().count() <= max_chars {
        return raw.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = raw.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use pokedex_types::FailureInfo;

    use super::*;

    #[test]
    fn report_splits_multiline_graphql_errors() {
        let err = RenderError::Rejected(FailureInfo::new("first problem\nsecond problem"));
        let report = failure_report(&err);
        assert_eq!(report.headline, "There was an error:");
        assert_eq!(report.message, vec!["first problem", "second problem"]);
        assert_eq!(report.cause, None);
    }

    #[test]
    fn report_includes_cause_for_rejections() {
        let err = RenderError::Rejected(
            FailureInfo::new("Network error").with_cause("  connection refused "),
        );
        let report = failure_report(&err);
        assert_eq!(report.cause.as_deref(), Some("connection refused"));
    }

    #[test]
    fn blank_message_gets_placeholder() {
        let report = failure_report(&RenderError::Failed("   ".into()));
        assert_eq!(report.message, vec!["unknown error"]);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_with_ellipsis("pikachu", 10), "pikachu");
        assert_eq!(truncate_with_ellipsis("charizard", 6), "cha...");
        assert_eq!(truncate_with_ellipsis("ポケモンです", 5), "ポケ...");
    }
}
