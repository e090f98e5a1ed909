//! The turn-by-turn ordering dialog.
//!
//! [`DialogEngine::handle_turn`] takes one caller utterance, advances that
//! call's session through the stage machine and returns exactly one
//! [`ResponseDirective`]. Internal faults never reach the caller: they are
//! logged and the call restarts at the dish-code prompt.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use callorder_core::catalog::Catalog;
use callorder_core::config::DialogConfig;
use callorder_core::matcher::ItemMatcher;
use callorder_core::order::{OrderStore, SelectedOption};

use crate::assembler;
use crate::confirmation::{parse_confirmation, Confirmation};
use crate::directive::ResponseDirective;
use crate::error::DialogError;
use crate::prompts;
use crate::resolver::CatalogResolver;
use crate::session::{CallSession, PendingItem, SessionStore};
use crate::stage::Stage;

/// Handler outcome before it is sized into a directive.
#[derive(Debug)]
enum Reply {
    /// Speak and keep listening.
    Prompt(String),
    /// Speak and hang up.
    Hangup(String),
}

pub struct DialogEngine {
    sessions: Arc<SessionStore>,
    resolver: CatalogResolver,
    orders: Arc<dyn OrderStore>,
    settings: DialogConfig,
}

impl DialogEngine {
    /// Engine with default settings, no AI matcher and a fresh session store.
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            resolver: CatalogResolver::new(),
            orders,
            settings: DialogConfig::default(),
        }
    }

    pub fn with_settings(mut self, settings: DialogConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_resolver(mut self, resolver: CatalogResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Enable the AI fallback for dish names that deterministic matching misses.
    pub fn with_matcher(mut self, matcher: Arc<dyn ItemMatcher>) -> Self {
        self.resolver = self.resolver.with_matcher(matcher);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer a new call with the restaurant greeting.
    ///
    /// A repeated start for a call already in progress does not reset it;
    /// the caller hears the current stage's prompt instead.
    pub async fn start_call(
        &self,
        call_id: &str,
        catalog: &Catalog,
    ) -> Result<ResponseDirective, DialogError> {
        let mut session = self.sessions.lock(call_id, &catalog.id).await?;

        if session.stage != Stage::Init {
            warn!(call_id = %call_id, stage = %session.stage, "Call already started; resuming");
            let reply = match self.stage_prompt(&session) {
                Ok(prompt) => Reply::Prompt(prompt),
                Err(e) => self.recover(&mut session, e),
            };
            return Ok(self.directive(reply, session.stage));
        }

        session.stage = Stage::OrderingId;
        info!(call_id = %call_id, catalog = %catalog.id, "Call started");
        Ok(self.directive(Reply::Prompt(prompts::greeting(&catalog.name)), session.stage))
    }

    /// Run one turn for `call_id`.
    ///
    /// The session stays locked for the whole turn, persistence included, so
    /// overlapping deliveries for the same call are applied one after the
    /// other. The only error is a poisoned session map.
    pub async fn handle_turn(
        &self,
        call_id: &str,
        catalog: &Catalog,
        utterance: &str,
    ) -> Result<ResponseDirective, DialogError> {
        let mut session = self.sessions.lock(call_id, &catalog.id).await?;
        let before = session.stage;
        let directive = self.process(&mut session, catalog, utterance).await;
        debug!(
            call_id = %call_id,
            from = %before,
            to = %session.stage,
            terminal = directive.is_terminal(),
            "Turn handled"
        );
        Ok(directive)
    }

    /// Advance `session` by one utterance, mutating it in place.
    pub async fn process(
        &self,
        session: &mut CallSession,
        catalog: &Catalog,
        utterance: &str,
    ) -> ResponseDirective {
        let text = utterance.trim().to_lowercase();

        if text.is_empty() {
            let reply = self.on_silence(session);
            return self.directive(reply, session.stage);
        }
        session.silence_count = 0;

        if session.stage == Stage::Init {
            session.stage = Stage::OrderingId;
        }

        let result = match session.stage {
            Stage::Init | Stage::OrderingId => self.on_ordering_id(session, catalog, utterance).await,
            Stage::SelectingOption => self.on_selecting_option(session, &text),
            Stage::ConfirmingItem => self.on_confirming_item(session, &text),
            Stage::AskAddMore => self.on_ask_add_more(session, catalog, utterance, &text).await,
            Stage::ConfirmingOrder => self.on_confirming_order(session, catalog, &text).await,
            Stage::Completed => Ok(Reply::Prompt(prompts::NOT_UNDERSTOOD.to_string())),
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => self.recover(session, e),
        };
        debug_assert_eq!(
            session.pending.is_some(),
            session.stage.holds_pending_item(),
            "pending item out of step with stage {}",
            session.stage
        );
        self.directive(reply, session.stage)
    }

    fn on_silence(&self, session: &mut CallSession) -> Reply {
        session.silence_count += 1;

        if session.silence_count >= self.settings.max_silence_turns {
            info!(
                call_id = %session.call_id,
                silent_turns = session.silence_count,
                "Caller silent; hanging up"
            );
            session.clear_pending();
            session.stage = Stage::Completed;
            return Reply::Hangup(prompts::SILENCE_GOODBYE.to_string());
        }

        debug!(
            call_id = %session.call_id,
            silent_turns = session.silence_count,
            "Empty utterance"
        );
        match self.stage_prompt(session) {
            Ok(prompt) => Reply::Prompt(prompts::silence_reprompt(&prompt)),
            Err(e) => self.recover(session, e),
        }
    }

    async fn on_ordering_id(
        &self,
        session: &mut CallSession,
        catalog: &Catalog,
        utterance: &str,
    ) -> Result<Reply, DialogError> {
        let Some(item) = self.resolver.resolve_item(utterance, catalog).await else {
            debug!(call_id = %session.call_id, utterance = %utterance.trim(), "No dish matched");
            return Ok(Reply::Prompt(prompts::ID_NOT_FOUND.to_string()));
        };

        let pending = PendingItem::new(item.clone());
        let prompt = match pending.current_option() {
            Some(option) => {
                session.stage = Stage::SelectingOption;
                prompts::first_option(&pending.item, option)
            }
            None => {
                session.stage = Stage::ConfirmingItem;
                prompts::confirm_item(&pending.describe())
            }
        };
        debug!(call_id = %session.call_id, item_id = %item.id, "Dish picked");
        session.pending = Some(pending);
        Ok(Reply::Prompt(prompt))
    }

    fn on_selecting_option(&self, session: &mut CallSession, text: &str) -> Result<Reply, DialogError> {
        let pending = session
            .pending
            .as_mut()
            .ok_or(DialogError::MissingPendingItem(Stage::SelectingOption))?;
        let option = pending
            .current_option()
            .ok_or_else(|| DialogError::OptionOutOfRange {
                item_id: pending.item.id.clone(),
                index: pending.option_index,
            })?;

        let Some(choice) = self.resolver.resolve_choice(text, option) else {
            return Ok(Reply::Prompt(prompts::INVALID_SELECTION.to_string()));
        };
        let selected = SelectedOption {
            option_name: option.name.clone(),
            choice_name: choice.name.clone(),
            price_extra: choice.price_extra,
        };

        pending.options.push(selected);
        pending.option_index += 1;

        if let Some(next) = pending.current_option() {
            return Ok(Reply::Prompt(prompts::next_option(&pending.item, next)));
        }

        let description = pending.describe();
        session.stage = Stage::ConfirmingItem;
        Ok(Reply::Prompt(prompts::confirm_item(&description)))
    }

    fn on_confirming_item(&self, session: &mut CallSession, text: &str) -> Result<Reply, DialogError> {
        match parse_confirmation(text) {
            Confirmation::Yes => {
                let pending = session
                    .pending
                    .take()
                    .ok_or(DialogError::MissingPendingItem(Stage::ConfirmingItem))?;
                let description = pending.describe();
                session.current_order.push(pending.into_line());
                session.stage = Stage::AskAddMore;
                info!(
                    call_id = %session.call_id,
                    lines = session.current_order.len(),
                    "Item added to order"
                );
                Ok(Reply::Prompt(prompts::item_added(&description)))
            }
            Confirmation::No => {
                session.clear_pending();
                session.stage = Stage::OrderingId;
                Ok(Reply::Prompt(prompts::retry_item()))
            }
            Confirmation::Unclear => Ok(Reply::Prompt(prompts::CONFIRM_ITEM_UNCLEAR.to_string())),
        }
    }

    async fn on_ask_add_more(
        &self,
        session: &mut CallSession,
        catalog: &Catalog,
        utterance: &str,
        text: &str,
    ) -> Result<Reply, DialogError> {
        match parse_confirmation(text) {
            Confirmation::Yes => {
                session.stage = Stage::OrderingId;
                Ok(Reply::Prompt(prompts::continue_ordering()))
            }
            Confirmation::No => {
                session.stage = Stage::ConfirmingOrder;
                Ok(Reply::Prompt(self.summary_prompt(session)))
            }
            // A dish code here means the caller skipped the "yes".
            Confirmation::Unclear if self.resolver.resolve_by_code(text, catalog).is_some() => {
                session.stage = Stage::OrderingId;
                self.on_ordering_id(session, catalog, utterance).await
            }
            Confirmation::Unclear => Ok(Reply::Prompt(prompts::ADD_MORE_UNCLEAR.to_string())),
        }
    }

    async fn on_confirming_order(
        &self,
        session: &mut CallSession,
        catalog: &Catalog,
        text: &str,
    ) -> Result<Reply, DialogError> {
        match parse_confirmation(text) {
            Confirmation::Yes => {
                let order = assembler::finalize(session, catalog);
                self.persist(order).await;
                session.stage = Stage::Completed;
                Ok(Reply::Hangup(prompts::order_placed(&catalog.name)))
            }
            Confirmation::No => {
                info!(call_id = %session.call_id, "Order cancelled by caller");
                session.stage = Stage::Completed;
                Ok(Reply::Hangup(prompts::ORDER_CANCELLED.to_string()))
            }
            Confirmation::Unclear => Ok(Reply::Prompt(prompts::CONFIRM_ORDER_UNCLEAR.to_string())),
        }
    }

    /// Write the order through the store. Failures are logged only; the
    /// caller is still told the order was placed.
    async fn persist(&self, order: callorder_core::order::FinalizedOrder) {
        let order_id = order.order_id.clone();
        let call_id = order.call_id.clone();
        let total = order.total_price;
        let orders = Arc::clone(&self.orders);

        match tokio::task::spawn_blocking(move || orders.save(&order)).await {
            Ok(Ok(())) => {
                info!(call_id = %call_id, order_id = %order_id, total, "Order placed");
            }
            Ok(Err(e)) => {
                error!(call_id = %call_id, order_id = %order_id, "Failed to persist order: {}", e);
            }
            Err(e) => {
                error!(call_id = %call_id, order_id = %order_id, "Order persistence task failed: {}", e);
            }
        }
    }

    /// Reset to the dish-code prompt after an internal fault.
    fn recover(&self, session: &mut CallSession, err: DialogError) -> Reply {
        error!(
            call_id = %session.call_id,
            stage = %session.stage,
            "Turn failed, restarting order entry: {}",
            err
        );
        session.clear_pending();
        session.stage = Stage::OrderingId;
        Reply::Prompt(prompts::recovery())
    }

    /// The prompt that the current stage is waiting on.
    fn stage_prompt(&self, session: &CallSession) -> Result<String, DialogError> {
        let prompt = match session.stage {
            Stage::Init | Stage::OrderingId => prompts::SPECIFY_ID.to_string(),
            Stage::SelectingOption => {
                let pending = session
                    .pending
                    .as_ref()
                    .ok_or(DialogError::MissingPendingItem(session.stage))?;
                let option = pending
                    .current_option()
                    .ok_or_else(|| DialogError::OptionOutOfRange {
                        item_id: pending.item.id.clone(),
                        index: pending.option_index,
                    })?;
                if pending.option_index == 0 {
                    prompts::first_option(&pending.item, option)
                } else {
                    prompts::next_option(&pending.item, option)
                }
            }
            Stage::ConfirmingItem => {
                let pending = session
                    .pending
                    .as_ref()
                    .ok_or(DialogError::MissingPendingItem(session.stage))?;
                prompts::confirm_item(&pending.describe())
            }
            Stage::AskAddMore => prompts::ADD_MORE_UNCLEAR.to_string(),
            Stage::ConfirmingOrder => self.summary_prompt(session),
            Stage::Completed => prompts::NOT_UNDERSTOOD.to_string(),
        };
        Ok(prompt)
    }

    fn summary_prompt(&self, session: &CallSession) -> String {
        prompts::order_summary(
            &assembler::summary_text(&session.current_order),
            assembler::order_total(&session.current_order),
        )
    }

    /// Size a reply for the stage the call is now in.
    fn directive(&self, reply: Reply, stage: Stage) -> ResponseDirective {
        match reply {
            Reply::Prompt(prompt) => ResponseDirective::collect(
                prompt,
                stage,
                self.settings.ordering_digits,
                self.settings.selection_digits,
            ),
            Reply::Hangup(text) => ResponseDirective::terminal(text),
        }
    }
}
