//! Canned prompts: follow-up suggestions and quick actions.

use serde::{Deserialize, Serialize};

use super::message::MAX_SUGGESTIONS;

const PRICING: [&str; 3] = [
    "Create a pricing strategy",
    "Analyze competitor rates",
    "Calculate project ROI",
];
const SCHEDULE: [&str; 3] = [
    "Optimize daily schedule",
    "Set productivity goals",
    "Track time allocation",
];
const CLIENT: [&str; 3] = [
    "Draft client update email",
    "Schedule follow-up tasks",
    "Create project timeline",
];
const ANALYTICS: [&str; 3] = [
    "Show me detailed project analytics",
    "Help with time tracking",
    "Suggest productivity tools",
];

/// Follow-up suggestions for a prompt, chosen by keyword.
///
/// Deterministic: the same prompt always yields the same list.
pub fn suggestions_for(prompt: &str) -> Vec<String> {
    let prompt = prompt.to_lowercase();
    let set: &[&str] = if ["pric", "quote", "invoice"].iter().any(|k| prompt.contains(k)) {
        &PRICING
    } else if ["schedule", "time", "deadline", "calendar"].iter().any(|k| prompt.contains(k)) {
        &SCHEDULE
    } else if ["client", "email", "communicat"].iter().any(|k| prompt.contains(k)) {
        &CLIENT
    } else {
        &ANALYTICS
    };
    set.iter().take(MAX_SUGGESTIONS).map(|s| s.to_string()).collect()
}

/// Shortcut buttons that expand into a full prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickAction {
    AnalyzeProjects,
    OptimizeWorkflow,
    PricingHelp,
    ClientCommunication,
    TimeManagement,
    BusinessInsights,
}

impl QuickAction {
    pub const ALL: [QuickAction; 6] = [
        QuickAction::AnalyzeProjects,
        QuickAction::OptimizeWorkflow,
        QuickAction::PricingHelp,
        QuickAction::ClientCommunication,
        QuickAction::TimeManagement,
        QuickAction::BusinessInsights,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            QuickAction::AnalyzeProjects => "analyze-projects",
            QuickAction::OptimizeWorkflow => "optimize-workflow",
            QuickAction::PricingHelp => "pricing-help",
            QuickAction::ClientCommunication => "client-communication",
            QuickAction::TimeManagement => "time-management",
            QuickAction::BusinessInsights => "business-insights",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::AnalyzeProjects => "Analyze My Projects",
            QuickAction::OptimizeWorkflow => "Optimize Workflow",
            QuickAction::PricingHelp => "Pricing Guidance",
            QuickAction::ClientCommunication => "Client Communication",
            QuickAction::TimeManagement => "Time Management",
            QuickAction::BusinessInsights => "Business Insights",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            QuickAction::AnalyzeProjects => "Can you analyze my current projects and provide insights on performance, timelines, and optimization opportunities?",
            QuickAction::OptimizeWorkflow => "Help me optimize my daily workflow and suggest productivity improvements based on my work patterns.",
            QuickAction::PricingHelp => "I need guidance on pricing my services. Can you analyze market rates and suggest optimal pricing strategies?",
            QuickAction::ClientCommunication => "Help me improve my client communication and create templates for common scenarios.",
            QuickAction::TimeManagement => "Analyze my time allocation and suggest better time management strategies.",
            QuickAction::BusinessInsights => "Provide insights on my business performance and suggest growth opportunities.",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}
