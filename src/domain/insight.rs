//! Business insights and their lifecycle.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InsightId, Timestamp};

/// Action label that means "open the Growth Hub" rather than "record this".
pub const GROWTH_HUB_ACTION: &str = "Explore Growth Hub";

/// Where the Growth Hub action navigates.
pub const GROWTH_HUB_ROUTE: &str = "/dashboard/growth-hub";

/// Insight category. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InsightCategory {
    Productivity,
    Business,
    Optimization,
    Opportunity,
    Growth,
    Other(String),
}

impl InsightCategory {
    pub fn as_str(&self) -> &str {
        match self {
            InsightCategory::Productivity => "productivity",
            InsightCategory::Business => "business",
            InsightCategory::Optimization => "optimization",
            InsightCategory::Opportunity => "opportunity",
            InsightCategory::Growth => "growth",
            InsightCategory::Other(other) => other,
        }
    }
}

impl From<String> for InsightCategory {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "productivity" => InsightCategory::Productivity,
            "business" => InsightCategory::Business,
            "optimization" => InsightCategory::Optimization,
            "opportunity" => InsightCategory::Opportunity,
            "growth" => InsightCategory::Growth,
            _ => InsightCategory::Other(value),
        }
    }
}

impl From<InsightCategory> for String {
    fn from(value: InsightCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightState {
    #[default]
    Active,
    Dismissed,
    Implemented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: InsightId,
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    pub priority: Priority,
    pub action: String,
    #[serde(default)]
    pub state: InsightState,
}

impl Insight {
    pub fn new(
        id: InsightId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: InsightCategory,
        priority: Priority,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category,
            priority,
            action: action.into(),
            state: InsightState::Active,
        }
    }

    pub fn is_growth_hub(&self) -> bool {
        self.action == GROWTH_HUB_ACTION
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsightFilter {
    pub status: InsightState,
}

impl InsightFilter {
    pub fn active() -> Self {
        Self {
            status: InsightState::Active,
        }
    }
}

/// A follow-up scheduled from an insight action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub action: String,
    pub due_at: Timestamp,
    pub created_at: Timestamp,
}

impl Reminder {
    pub const DELAY_HOURS: i64 = 24;

    /// A reminder due [`Reminder::DELAY_HOURS`] after `now`.
    pub fn tomorrow(action: impl Into<String>, now: Timestamp) -> Self {
        Self {
            action: action.into(),
            due_at: now.plus_hours(Self::DELAY_HOURS),
            created_at: now,
        }
    }
}

/// AI-generated status report for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_name: String,
    pub status: String,
    pub completion: u8,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_actions: Vec<String>,
}

/// The active insight list plus the lifecycle of everything it has held.
///
/// Ordering is exactly what the source returned; nothing here re-sorts.
#[derive(Debug, Clone, Default)]
pub struct InsightSet {
    active: Vec<Insight>,
    lifecycle: HashMap<InsightId, InsightState>,
}

impl InsightSet {
    pub fn new(insights: Vec<Insight>) -> Self {
        let mut set = Self::default();
        set.replace_all(insights);
        set
    }

    /// Supersedes the active list with a fresh fetch.
    pub fn replace_all(&mut self, insights: Vec<Insight>) {
        for insight in &insights {
            self.lifecycle.insert(insight.id.clone(), insight.state);
        }
        self.active = insights;
    }

    pub fn active(&self) -> &[Insight] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn get(&self, id: &InsightId) -> Option<&Insight> {
        self.active.iter().find(|i| &i.id == id)
    }

    /// Removes an insight as dismissed, returning it with its former index.
    pub fn dismiss(&mut self, id: &InsightId) -> Option<(usize, Insight)> {
        let index = self.active.iter().position(|i| &i.id == id)?;
        let mut insight = self.active.remove(index);
        insight.state = InsightState::Dismissed;
        self.lifecycle.insert(id.clone(), InsightState::Dismissed);
        Some((index, insight))
    }

    /// Undoes a dismissal, reinserting at `index`.
    pub fn restore(&mut self, index: usize, mut insight: Insight) {
        insight.state = InsightState::Active;
        self.lifecycle.insert(insight.id.clone(), InsightState::Active);
        let index = index.min(self.active.len());
        self.active.insert(index, insight);
    }

    /// Marks an insight implemented. It stays in the active list.
    pub fn mark_implemented(&mut self, id: &InsightId) -> Option<&Insight> {
        let insight = self.active.iter_mut().find(|i| &i.id == id)?;
        insight.state = InsightState::Implemented;
        self.lifecycle.insert(id.clone(), InsightState::Implemented);
        Some(insight)
    }

    pub fn lifecycle(&self, id: &InsightId) -> Option<InsightState> {
        self.lifecycle.get(id).copied()
    }

    pub fn high_priority_count(&self) -> usize {
        self.active.iter().filter(|i| i.priority == Priority::High).count()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&InsightCategory> {
        let mut out: Vec<&InsightCategory> = Vec::new();
        for insight in &self.active {
            if !out.contains(&&insight.category) {
                out.push(&insight.category);
            }
        }
        out
    }
}
