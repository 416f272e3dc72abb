//! Markdown export of conversations and insights.
//!
//! A conversation export has four fixed sections:
//!
//! ```text
//! # {title}
//!
//! Messages: {message_count}
//! Tags: {tag, tag}
//!
//! Exported on {RFC 3339 timestamp}
//! ```
//!
//! The same document backs both the file download and the share flow.

use thiserror::Error;

use crate::domain::conversation::{normalize_tags, normalize_title, Conversation};
use crate::domain::foundation::{ConversationId, Timestamp};
use crate::domain::insight::Insight;

const TITLE_PREFIX: &str = "# ";
const MESSAGES_PREFIX: &str = "Messages:";
const TAGS_PREFIX: &str = "Tags:";
const EXPORTED_PREFIX: &str = "Exported on ";

/// File name used for insight reports.
pub const INSIGHTS_REPORT_FILE: &str = "ai-insights-report.md";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("export is missing the {0} section")]
    MissingSection(&'static str),

    #[error("export has an invalid {section} section: {reason}")]
    InvalidSection {
        section: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationExport {
    pub title: String,
    pub tags: Vec<String>,
    pub message_count: usize,
    pub exported_at: Timestamp,
}

impl ConversationExport {
    pub fn of(conversation: &Conversation, exported_at: Timestamp) -> Self {
        Self {
            title: normalize_title(&conversation.title),
            tags: normalize_tags(&conversation.tags),
            message_count: conversation.message_count,
            exported_at,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{TITLE_PREFIX}{}\n\n{MESSAGES_PREFIX} {}\n{TAGS_PREFIX} {}\n\n{EXPORTED_PREFIX}{}\n",
            self.title,
            self.message_count,
            self.tags.join(", "),
            self.exported_at.to_rfc3339(),
        )
    }

    /// Recovers an export produced by [`ConversationExport::render`].
    pub fn parse(text: &str) -> Result<Self, ExportError> {
        let mut lines = text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty());

        let title = lines
            .next()
            .and_then(|l| l.strip_prefix(TITLE_PREFIX))
            .ok_or(ExportError::MissingSection("title"))?;

        let count_line = lines
            .next()
            .and_then(|l| l.strip_prefix(MESSAGES_PREFIX))
            .ok_or(ExportError::MissingSection("messages"))?;
        let message_count = count_line
            .trim()
            .parse::<usize>()
            .map_err(|e| ExportError::InvalidSection {
                section: "messages",
                reason: e.to_string(),
            })?;

        let tag_line = lines
            .next()
            .and_then(|l| l.strip_prefix(TAGS_PREFIX))
            .ok_or(ExportError::MissingSection("tags"))?;
        let tags = normalize_tags(tag_line.split(','));

        let stamp = lines
            .next()
            .and_then(|l| l.strip_prefix(EXPORTED_PREFIX))
            .ok_or(ExportError::MissingSection("exported on"))?;
        let exported_at =
            Timestamp::parse_rfc3339(stamp.trim()).map_err(|e| ExportError::InvalidSection {
                section: "exported on",
                reason: e.to_string(),
            })?;

        Ok(Self {
            title: normalize_title(title),
            tags,
            message_count,
            exported_at,
        })
    }

    /// Download name: the title with path-hostile characters replaced.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                c => c,
            })
            .collect();
        let stem = stem.trim().trim_matches('.');
        if stem.is_empty() {
            "conversation.md".to_string()
        } else {
            format!("{stem}.md")
        }
    }
}

/// Public link for a shared conversation.
pub fn share_link(base_url: &str, id: &ConversationId) -> String {
    format!("{}/shared/conversations/{}", base_url.trim_end_matches('/'), id)
}

/// Markdown report of the given insights, one block each.
pub fn insights_report(insights: &[Insight]) -> String {
    let mut report = String::from("# AI Insights Report\n\n");
    for insight in insights {
        report.push_str(&format!(
            "## {}\n{}\nPriority: {}\nAction: {}\n\n",
            insight.title, insight.description, insight.priority, insight.action
        ));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::InsightId;
    use crate::domain::insight::{InsightCategory, Priority};
    use proptest::prelude::*;

    fn export() -> ConversationExport {
        ConversationExport {
            title: "Client Pricing Analysis".to_string(),
            tags: vec!["pricing".to_string(), "business".to_string()],
            message_count: 8,
            exported_at: Timestamp::parse_rfc3339("2026-05-01T10:00:00Z").unwrap(),
        }
    }

    #[test]
    fn render_has_fixed_sections() {
        assert_eq!(
            export().render(),
            "# Client Pricing Analysis\n\nMessages: 8\nTags: pricing, business\n\nExported on 2026-05-01T10:00:00Z\n"
        );
    }

    #[test]
    fn parse_recovers_render() {
        assert_eq!(ConversationExport::parse(&export().render()).unwrap(), export());
    }

    #[test]
    fn parse_accepts_empty_tags() {
        let mut e = export();
        e.tags.clear();
        assert_eq!(ConversationExport::parse(&e.render()).unwrap().tags, Vec::<String>::new());
    }

    fn stored(title: &str, tags: &[&str]) -> Conversation {
        serde_json::from_value(serde_json::json!({
            "id": "c-1",
            "title": title,
            "last_activity": "2026-05-01T10:00:00Z",
            "tags": tags,
            "message_count": 3
        }))
        .unwrap()
    }

    #[test]
    fn comma_in_tag_survives_export() {
        let conversation = stored("Planning", &["q3, q4", "pricing"]);
        let exported = ConversationExport::of(&conversation, Timestamp::now());

        let parsed = ConversationExport::parse(&exported.render()).unwrap();

        assert_eq!(parsed.tags, vec!["q3 q4", "pricing"]);
        assert_eq!(parsed.tags, conversation.tags);
    }

    #[test]
    fn line_break_in_tag_survives_export() {
        let conversation = stored("Planning", &["a\nb"]);
        let exported = ConversationExport::of(&conversation, Timestamp::now());

        let parsed = ConversationExport::parse(&exported.render()).unwrap();

        assert_eq!(parsed.tags, vec!["a b"]);
        assert_eq!(parsed.message_count, 3);
    }

    #[test]
    fn parse_rejects_missing_title() {
        let err = ConversationExport::parse("Messages: 3\n").unwrap_err();
        assert_eq!(err, ExportError::MissingSection("title"));
    }

    #[test]
    fn parse_rejects_bad_count() {
        let text = "# T\n\nMessages: many\nTags: a\n\nExported on 2026-05-01T10:00:00Z";
        assert!(matches!(
            ConversationExport::parse(text),
            Err(ExportError::InvalidSection { section: "messages", .. })
        ));
    }

    #[test]
    fn file_name_is_path_safe() {
        let mut e = export();
        e.title = "Q3/Q4: plans?".to_string();
        assert_eq!(e.file_name(), "Q3-Q4- plans-.md");
        e.title = "..".to_string();
        assert_eq!(e.file_name(), "conversation.md");
    }

    #[test]
    fn share_link_joins_base() {
        let id = ConversationId::new("42").unwrap();
        assert_eq!(
            share_link("https://app.example.com/", &id),
            "https://app.example.com/shared/conversations/42"
        );
    }

    #[test]
    fn insights_report_lists_every_insight() {
        let insights = vec![Insight::new(
            InsightId::new("1").unwrap(),
            "Workflow Optimization",
            "Schedule complex tasks early.",
            InsightCategory::Productivity,
            Priority::Medium,
            "Adjust daily schedule",
        )];
        assert_eq!(
            insights_report(&insights),
            "# AI Insights Report\n\n## Workflow Optimization\nSchedule complex tasks early.\nPriority: medium\nAction: Adjust daily schedule\n\n"
        );
    }

    proptest! {
        #[test]
        fn export_round_trips(
            title in any::<String>(),
            tags in proptest::collection::vec(any::<String>(), 0..5),
            count in 0usize..500,
        ) {
            let conversation: Conversation = serde_json::from_value(serde_json::json!({
                "id": "c-1",
                "title": title,
                "last_activity": "2026-01-01T00:00:00Z",
                "tags": tags,
                "message_count": count
            }))
            .unwrap();
            let exported = ConversationExport::of(
                &conversation,
                Timestamp::parse_rfc3339("2026-01-01T00:00:00Z").unwrap(),
            );

            let parsed = ConversationExport::parse(&exported.render()).unwrap();

            prop_assert_eq!(&parsed.title, &conversation.title);
            prop_assert_eq!(&parsed.tags, &conversation.tags);
            prop_assert_eq!(parsed, exported);
        }
    }
}
