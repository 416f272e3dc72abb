//! The session facade.
//!
//! An [`AssistantSession`] owns one conversation's state (the message store,
//! the insight set, the saved-conversation library) for one identity, and
//! exposes every user-facing flow as a method. Methods take `&mut self`, so
//! a session never has two generation requests awaiting at once.

use std::sync::Arc;

use crate::adapters::gateway::HttpProviderGateway;
use crate::adapters::local::FileLocalStore;
use crate::adapters::notify::TracingNotifier;
use crate::adapters::remote::HttpRemoteStore;
use crate::config::AppConfig;
use crate::domain::conversation::{
    Conversation, ConversationFilter, ConversationStats, ConversationStore, LibraryStats, Message,
    QuickAction, Rating,
};
use crate::domain::foundation::{ConversationId, Identity, InsightId, MessageId, ValidationError};
use crate::domain::insight::{Insight, InsightFilter, InsightState, ProjectAnalysis};
use crate::domain::notification::Notification;
use crate::domain::routing::{default_catalog, TaskRouter};
use crate::domain::seed;
use crate::ports::{LocalStore, Notifier, ProviderGateway, RemoteStore, WriteReceipt};

use super::error::AssistantError;
use super::handlers::{
    ConversationManager, DismissOutcome, ExportFile, FeedbackRecorder, ImplementOutcome,
    InsightLifecycleManager, InsightReport, LoadConversationOutcome, NewConversationOutcome,
    RateOutcome, RefreshOutcome, RegenerateOutcome, SaveOutcome, SendMessageCommand,
    SendMessageHandler, SendMessageResult,
};
use super::persistence::{ChainOutcome, DataSource, TierChain};
use super::reconciliation::ReconciliationPolicy;

const DEFAULT_MODEL: &str = "anthropic";
const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000";

/// What [`AssistantSession::load`] managed to fetch. `None` marks a failed
/// read; the matching state was left as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub conversations: Option<usize>,
    pub insights: Option<usize>,
    pub project_analyses: Option<usize>,
    pub stats: Option<ConversationStats>,
    pub stats_loaded: bool,
}

impl LoadSummary {
    pub fn all_failed(&self) -> bool {
        self.conversations.is_none()
            && self.insights.is_none()
            && self.project_analyses.is_none()
            && !self.stats_loaded
    }

    fn describe(&self) -> String {
        format!(
            "{} conversations, {} insights, {} projects",
            self.conversations.unwrap_or(0),
            self.insights.unwrap_or(0),
            self.project_analyses.unwrap_or(0)
        )
    }
}

pub struct AssistantSession {
    identity: Identity,
    source: DataSource,
    model: String,
    share_base_url: String,
    store: ConversationStore,
    analyses: Vec<ProjectAnalysis>,
    stats: Option<ConversationStats>,
    sender: SendMessageHandler,
    feedback: FeedbackRecorder,
    insights: InsightLifecycleManager,
    library: ConversationManager,
    notifier: Arc<dyn Notifier>,
    chain: TierChain,
}

/// Notifies a validation rejection and hands the result back unchanged.
fn surface<T>(
    notifier: &dyn Notifier,
    result: Result<T, AssistantError>,
) -> Result<T, AssistantError> {
    if let Err(AssistantError::Validation(err)) = &result {
        notifier.notify(Notification::error(err.title()).with_description(err.to_string()));
    }
    result
}

impl AssistantSession {
    pub fn builder(gateway: Arc<dyn ProviderGateway>) -> AssistantSessionBuilder {
        AssistantSessionBuilder::new(gateway)
    }

    /// Wires HTTP and file adapters from configuration.
    ///
    /// The remote tier is only added when `config.remote` is set and the
    /// local tier only when a local store directory is configured.
    pub fn from_config(
        config: &AppConfig,
        identity: Identity,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AssistantError> {
        let gateway = HttpProviderGateway::new(config.gateway.http_config())?;

        let mut builder = Self::builder(Arc::new(gateway))
            .identity(identity)
            .notifier(notifier)
            .model(config.assistant.default_model.clone())
            .share_base_url(config.assistant.share_base_url.clone())
            .reconciliation(config.assistant.reconciliation);

        if let Some(remote) = &config.remote {
            builder = builder.remote(Arc::new(HttpRemoteStore::new(remote.http_config())?));
        }
        if let Some(dir) = &config.persistence.local_store_dir {
            builder = builder.local(
                Arc::new(FileLocalStore::new(dir)),
                config.persistence.key_prefix.clone(),
            );
        }

        builder.build()
    }

    /// Loads conversations, insights, project analyses and stats at once.
    ///
    /// Each read stands alone: whatever succeeded replaces the session's
    /// copy, whatever failed is logged and leaves the old copy in place.
    pub async fn load(&mut self) -> LoadSummary {
        let conversation_filter = ConversationFilter::default();
        let insight_filter = InsightFilter::active();
        let (conversations, insights, analyses, stats) = tokio::join!(
            self.source.conversations(&self.chain, &conversation_filter),
            self.source.insights(&self.chain, &insight_filter),
            self.source.project_analyses(&self.chain),
            self.source.conversation_stats(&self.chain),
        );

        let mut summary = LoadSummary::default();

        match conversations {
            Ok(conversations) => {
                summary.conversations = Some(conversations.len());
                self.library.replace_all(conversations);
            }
            Err(error) => tracing::warn!(error = %error, "failed to load conversations"),
        }
        match insights {
            Ok(insights) => {
                summary.insights = Some(insights.len());
                self.insights.replace_all(insights);
            }
            Err(error) => tracing::warn!(error = %error, "failed to load insights"),
        }
        match analyses {
            Ok(analyses) => {
                summary.project_analyses = Some(analyses.len());
                self.analyses = analyses;
            }
            Err(error) => tracing::warn!(error = %error, "failed to load project analyses"),
        }
        match stats {
            Ok(stats) => {
                if let Some(stats) = &stats {
                    tracing::info!(
                        conversations = stats.total_conversations,
                        messages = stats.total_messages,
                        tokens = stats.total_tokens,
                        "conversation stats loaded"
                    );
                }
                summary.stats_loaded = true;
                summary.stats = stats.clone();
                self.stats = stats;
            }
            Err(error) => tracing::warn!(error = %error, "failed to load conversation stats"),
        }

        if summary.all_failed() {
            self.notifier.notify(
                Notification::error("Failed to load assistant data")
                    .with_description("Please try again later"),
            );
        } else {
            self.notifier.notify(
                Notification::success("Assistant data loaded").with_description(summary.describe()),
            );
        }
        summary
    }

    // Conversation

    pub async fn send(
        &mut self,
        prompt: impl Into<String>,
    ) -> Result<SendMessageResult, AssistantError> {
        let cmd = SendMessageCommand::new(prompt, self.model.clone(), self.identity.clone());
        let result = self.sender.handle(&mut self.store, cmd).await;
        surface(&*self.notifier, result)
    }

    /// Sends the canned prompt behind a quick-action button.
    pub async fn quick_action(
        &mut self,
        action: QuickAction,
    ) -> Result<SendMessageResult, AssistantError> {
        self.send(action.prompt()).await
    }

    pub async fn rate(
        &mut self,
        message_id: MessageId,
        rating: Rating,
    ) -> Result<RateOutcome, AssistantError> {
        let result = self
            .feedback
            .rate(&mut self.store, &self.identity, message_id, rating)
            .await;
        surface(&*self.notifier, result)
    }

    pub async fn regenerate(
        &mut self,
        message_id: MessageId,
    ) -> Result<RegenerateOutcome, AssistantError> {
        let result = self
            .feedback
            .regenerate(&mut self.store, &self.identity, message_id, &self.model)
            .await;
        surface(&*self.notifier, result)
    }

    pub async fn bookmark(
        &mut self,
        message_id: MessageId,
    ) -> Result<ChainOutcome<WriteReceipt>, AssistantError> {
        let result = self
            .feedback
            .bookmark(&self.store, &self.identity, message_id)
            .await;
        surface(&*self.notifier, result)
    }

    /// Empties the conversation. Refused while a response is pending.
    pub fn clear_chat(&mut self) -> Result<(), AssistantError> {
        let result: Result<(), AssistantError> = if self.store.has_pending() {
            Err(ValidationError::RequestInFlight.into())
        } else {
            self.store.clear();
            self.notifier.notify(Notification::info("Chat cleared"));
            Ok(())
        };
        surface(&*self.notifier, result)
    }

    /// Switches the model used by subsequent sends and regenerations.
    pub fn select_model(&mut self, model: impl Into<String>) -> Result<(), AssistantError> {
        let model = model.into();
        let result: Result<(), AssistantError> = if self.sender.router().is_known(&model) {
            tracing::debug!(model = %model, task_type = %self.sender.router().map(&model), "model selected");
            self.model = model;
            Ok(())
        } else {
            Err(ValidationError::UnknownModel(model).into())
        };
        surface(&*self.notifier, result)
    }

    // Insights

    pub async fn refresh_insights(&mut self) -> RefreshOutcome {
        self.insights.refresh(&self.source).await
    }

    pub async fn dismiss_insight(&mut self, id: &InsightId) -> DismissOutcome {
        self.insights.dismiss(&self.identity, id).await
    }

    pub async fn implement_insight(
        &mut self,
        id: &InsightId,
        action: &str,
    ) -> Result<ImplementOutcome, AssistantError> {
        let result = self
            .insights
            .implement(&self.identity, id, action)
            .await
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub async fn schedule_reminder(&mut self, action: &str) -> ChainOutcome<WriteReceipt> {
        self.insights.schedule_reminder(&self.identity, action).await
    }

    pub fn export_insights_report(&self) -> InsightReport {
        self.insights.export_report()
    }

    // Library

    pub async fn save_chat(&mut self, tags: &[String]) -> Result<SaveOutcome, AssistantError> {
        let result = self
            .library
            .save_chat(&self.store, &self.identity, &self.model, tags)
            .await
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub async fn new_conversation(&mut self) -> Result<NewConversationOutcome, AssistantError> {
        let result = self
            .library
            .new_conversation(&mut self.store, &self.identity, &self.model)
            .await;
        surface(&*self.notifier, result)
    }

    pub async fn load_conversation(
        &mut self,
        id: &ConversationId,
    ) -> Result<LoadConversationOutcome, AssistantError> {
        let result = self
            .library
            .load_conversation(&mut self.store, &self.source, id)
            .await;
        surface(&*self.notifier, result)
    }

    pub async fn delete_conversation(
        &mut self,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, AssistantError> {
        let result = self
            .library
            .delete(&self.identity, id)
            .await
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub async fn archive_conversation(
        &mut self,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, AssistantError> {
        let result = self
            .library
            .archive(&self.identity, id)
            .await
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub async fn toggle_pin(
        &mut self,
        id: &ConversationId,
    ) -> Result<ChainOutcome<WriteReceipt>, AssistantError> {
        let result = self
            .library
            .toggle_pin(&self.identity, id)
            .await
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub fn export_conversation(&self, id: &ConversationId) -> Result<ExportFile, AssistantError> {
        let result = self.library.export(id).map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub fn share_conversation(&self, id: &ConversationId) -> Result<String, AssistantError> {
        let result = self
            .library
            .share(&self.share_base_url, id)
            .map_err(AssistantError::from);
        surface(&*self.notifier, result)
    }

    pub fn filter_by_tag(&self, tag: &str) -> Vec<&Conversation> {
        self.library.filter_by_tag(tag)
    }

    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        self.library.search(query)
    }

    pub fn library_stats(&self) -> LibraryStats {
        self.library.stats()
    }

    // Accessors

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn is_busy(&self) -> bool {
        self.store.has_pending()
    }

    pub fn insights(&self) -> &[Insight] {
        self.insights.active()
    }

    pub fn insight_state(&self, id: &InsightId) -> Option<InsightState> {
        self.insights.lifecycle(id)
    }

    pub fn high_priority_insights(&self) -> usize {
        self.insights.high_priority_count()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.library.conversations()
    }

    pub fn project_analyses(&self) -> &[ProjectAnalysis] {
        &self.analyses
    }

    pub fn conversation_stats(&self) -> Option<&ConversationStats> {
        self.stats.as_ref()
    }

    pub fn tier_chain(&self) -> &TierChain {
        &self.chain
    }
}

pub struct AssistantSessionBuilder {
    gateway: Arc<dyn ProviderGateway>,
    identity: Identity,
    remote: Option<Arc<dyn RemoteStore>>,
    local: Option<(Arc<dyn LocalStore>, String)>,
    notifier: Option<Arc<dyn Notifier>>,
    model: String,
    router: Option<TaskRouter>,
    policy: ReconciliationPolicy,
    share_base_url: String,
}

impl AssistantSessionBuilder {
    fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self {
            gateway,
            identity: Identity::Anonymous,
            remote: None,
            local: None,
            notifier: None,
            model: DEFAULT_MODEL.to_string(),
            router: None,
            policy: ReconciliationPolicy::default(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn remote(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(store);
        self
    }

    pub fn local(mut self, store: Arc<dyn LocalStore>, key_prefix: impl Into<String>) -> Self {
        self.local = Some((store, key_prefix.into()));
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn router(mut self, router: TaskRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn reconciliation(mut self, policy: ReconciliationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn share_base_url(mut self, url: impl Into<String>) -> Self {
        self.share_base_url = url.into();
        self
    }

    pub fn build(self) -> Result<AssistantSession, AssistantError> {
        let router = match self.router {
            Some(router) => router,
            None => TaskRouter::validated(default_catalog())?,
        };
        if !router.is_known(&self.model) {
            return Err(ValidationError::UnknownModel(self.model).into());
        }

        let mut chain = TierChain::builder();
        if let Some(remote) = self.remote {
            chain = chain.remote(remote);
        }
        if let Some((local, prefix)) = self.local {
            chain = chain.local(local, prefix);
        }
        let chain = chain.build();

        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>);

        tracing::debug!(
            user = %self.identity.gateway_user(),
            tiers = ?chain.tier_kinds(),
            model = %self.model,
            "assistant session built"
        );

        Ok(AssistantSession {
            source: DataSource::for_identity(&self.identity),
            identity: self.identity,
            model: self.model,
            share_base_url: self.share_base_url,
            store: ConversationStore::with_messages(vec![seed::greeting()]),
            analyses: Vec::new(),
            stats: None,
            sender: SendMessageHandler::new(
                self.gateway.clone(),
                router.clone(),
                notifier.clone(),
            ),
            feedback: FeedbackRecorder::new(self.gateway, router, chain.clone(), notifier.clone())
                .with_policy(self.policy),
            insights: InsightLifecycleManager::new(chain.clone(), notifier.clone())
                .with_policy(self.policy),
            library: ConversationManager::new(chain.clone(), notifier.clone()),
            notifier,
            chain,
        })
    }
}
