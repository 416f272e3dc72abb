//! Demo data shown to anonymous sessions.

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, InsightId, Timestamp};
use crate::domain::insight::{Insight, InsightCategory, Priority, ProjectAnalysis, GROWTH_HUB_ACTION};

/// Greeting placed at the top of a fresh session.
pub const GREETING: &str = "Hello! I'm your AI Assistant. I can help you optimize your workflow, analyze projects, provide business insights, and answer questions about your freelance business. What would you like to explore today?";

/// Greeting placed at the top of a new conversation.
pub const NEW_CONVERSATION_GREETING: &str = "Hello! How can I help you today?";

pub fn greeting() -> Message {
    Message::assistant(GREETING).with_suggestions([
        "Analyze my current projects",
        "Suggest productivity improvements",
        "Help with client communication",
        "Review my business metrics",
    ])
}

pub fn new_conversation_greeting() -> Message {
    Message::assistant(NEW_CONVERSATION_GREETING)
}

pub fn demo_conversations(now: Timestamp) -> Vec<Conversation> {
    vec![
        Conversation::new(
            ConversationId::from_static("1"),
            "Project Optimization Strategy",
            "How can I improve my project delivery times...",
            now.minus_hours(2),
        )
        .with_tags(["productivity", "optimization"])
        .with_message_count(12),
        Conversation::new(
            ConversationId::from_static("2"),
            "Client Pricing Analysis",
            "What should I charge for web development...",
            now.minus_hours(24),
        )
        .with_tags(["pricing", "business"])
        .with_message_count(8),
        Conversation::new(
            ConversationId::from_static("3"),
            "Marketing Strategy Discussion",
            "Help me create a marketing plan for...",
            now.minus_hours(72),
        )
        .with_tags(["marketing", "growth"])
        .with_message_count(15),
    ]
}

pub fn demo_insights() -> Vec<Insight> {
    vec![
        Insight::new(
            InsightId::from_static("0"),
            "NEW: AI-Powered Growth Engine",
            "Unlock revenue growth with research-backed strategies to optimize pricing, reduce acquisition cost and improve conversions.",
            InsightCategory::Business,
            Priority::High,
            GROWTH_HUB_ACTION,
        ),
        Insight::new(
            InsightId::from_static("1"),
            "Productivity Opportunity",
            "You spend 40% more time on revisions than industry average. Consider implementing structured feedback workflows.",
            InsightCategory::Optimization,
            Priority::High,
            "Implement feedback system",
        ),
        Insight::new(
            InsightId::from_static("2"),
            "Revenue Growth Potential",
            "Your video editing projects have 23% higher profit margins. Consider expanding this service line.",
            InsightCategory::Business,
            Priority::High,
            "Expand video services",
        ),
        Insight::new(
            InsightId::from_static("3"),
            "Client Retention Insight",
            "Clients who use your escrow system have 65% higher retention rates. Promote this feature more.",
            InsightCategory::Opportunity,
            Priority::Medium,
            "Promote escrow system",
        ),
        Insight::new(
            InsightId::from_static("4"),
            "Workflow Optimization",
            "Your most productive hours are 9-11 AM. Schedule complex tasks during this window.",
            InsightCategory::Productivity,
            Priority::Medium,
            "Adjust daily schedule",
        ),
    ]
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn demo_project_analyses() -> Vec<ProjectAnalysis> {
    vec![
        ProjectAnalysis {
            project_name: "E-commerce Redesign".to_string(),
            status: "In Progress".to_string(),
            completion: 75,
            insights: strings([
                "Project is 15% ahead of original timeline",
                "Client feedback response time: 2.3 days average",
                "Design iteration efficiency: 88%",
            ]),
            recommendations: strings([
                "Schedule final review meeting for next week",
                "Prepare comprehensive testing documentation",
                "Create handover documentation early",
            ]),
            next_actions: strings([
                "Complete checkout flow testing",
                "Finalize mobile responsive design",
                "Prepare deployment checklist",
            ]),
        },
        ProjectAnalysis {
            project_name: "Brand Identity Package".to_string(),
            status: "Review".to_string(),
            completion: 90,
            insights: strings([
                "Client approval rate: 92% first-time approval",
                "Revision requests: 23% below average",
                "Timeline adherence: Excellent",
            ]),
            recommendations: strings([
                "Present final brand guidelines document",
                "Offer additional brand applications",
                "Schedule brand implementation consultation",
            ]),
            next_actions: strings([
                "Deliver final logo variations",
                "Complete brand guidelines PDF",
                "Prepare usage examples",
            ]),
        },
    ]
}
