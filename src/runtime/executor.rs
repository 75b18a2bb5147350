//! Turn executor
//!
//! Runs one host turn to completion: feed the event through `transition`,
//! carry out each I/O effect against the collaborators, and feed the outcome
//! back in as the next event until the dialogue responds.

use super::traits::{GatewayConnector, SessionStore};
use crate::credential::Credential;
use crate::prompts::{MessageKey, Renderer};
use crate::quizlet::{DataGateway, GatewayError, ItemId, NavItem, SetDetail};
use crate::state_machine::state::ListSource;
use crate::state_machine::{
    transition, Action, DialogueState, Effect, Event, SessionContext, TurnContext,
};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// One inbound host turn
#[derive(Debug)]
pub struct Turn {
    pub session_id: String,
    pub user_id: String,
    pub credential: Option<Credential>,
    pub event: Event,
    /// Context carried over from the previous turn of this session
    pub context: SessionContext,
}

/// The single outbound action of a turn and the context to carry forward
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub action: Action,
    pub context: SessionContext,
}

/// Dialogue runtime over any session store and gateway connector
pub struct SkillRuntime<S, C>
where
    S: SessionStore + 'static,
    C: GatewayConnector + 'static,
{
    store: Arc<S>,
    connector: Arc<C>,
    renderer: Arc<dyn Renderer>,
    /// Fixed seed for reproducible quizzes
    seed: Option<u64>,
}

impl<S, C> SkillRuntime<S, C>
where
    S: SessionStore + 'static,
    C: GatewayConnector + 'static,
{
    pub fn new(store: S, connector: C, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            store: Arc::new(store),
            connector: Arc::new(connector),
            renderer,
            seed: None,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Process a turn; always yields exactly one action
    pub async fn handle_turn(&self, turn: Turn) -> TurnOutcome {
        let Turn {
            session_id,
            user_id,
            credential,
            event,
            context,
        } = turn;

        let turn_id = Uuid::new_v4();
        tracing::info!(
            turn_id = %turn_id,
            session_id = %session_id,
            user_id = %user_id,
            state = context.state.name(),
            event = event.name(),
            "Turn started"
        );

        let gateway: Arc<dyn DataGateway> = match &credential {
            Some(credential) => self.connector.connect(credential),
            None => Arc::new(UnlinkedGateway),
        };
        let turn_ctx = TurnContext::new(user_id.as_str(), credential, self.renderer.clone());
        let mut rng = self.rng();
        let mut context = context;
        let mut action: Option<Action> = None;
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let event_name = event.name();
            let result = match transition(&context, &turn_ctx, event, &mut rng) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        turn_id = %turn_id,
                        state = context.state.name(),
                        event = event_name,
                        error = %e,
                        "Transition failed"
                    );
                    return self.unexpected(context);
                }
            };

            tracing::debug!(
                turn_id = %turn_id,
                from = context.state.name(),
                to = result.context.state.name(),
                event = event_name,
                "Transition"
            );
            context = result.context;

            for effect in result.effects {
                match effect {
                    Effect::Respond(response) => {
                        if action.is_some() {
                            tracing::warn!(turn_id = %turn_id, "Dropping extra response");
                        } else {
                            action = Some(response);
                        }
                    }
                    effect => {
                        if let Some(next) = self.execute_effect(effect, &user_id, &*gateway).await {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }

        match action {
            Some(action) if !context.state.is_in_flight() => {
                tracing::info!(
                    turn_id = %turn_id,
                    state = context.state.name(),
                    ends_session = action.ends_session(),
                    "Turn completed"
                );
                TurnOutcome { action, context }
            }
            _ => {
                tracing::error!(
                    turn_id = %turn_id,
                    state = context.state.name(),
                    "Turn ended without a response"
                );
                self.unexpected(context)
            }
        }
    }

    /// Perform one I/O effect and report its outcome as an event
    async fn execute_effect(
        &self,
        effect: Effect,
        user_id: &str,
        gateway: &dyn DataGateway,
    ) -> Option<Event> {
        let event = match effect {
            Effect::LookUpLastSet => {
                let result = self.store.get_last_set(user_id).await;
                if let Err(e) = &result {
                    tracing::warn!(user_id, error = %e, "Last set lookup failed");
                }
                Event::LastSetLookedUp { result }
            }
            Effect::FetchLastSet { set_id } => Event::LastSetFetched {
                result: gateway.get_set(set_id).await,
            },
            Effect::FetchList { source } => {
                let result = match source {
                    ListSource::Sets => gateway.list_sets().await,
                    ListSource::Favorites => gateway.list_favorites().await,
                    ListSource::Classes => gateway.list_classes().await,
                    ListSource::ClassSets { class_id } => gateway.list_class_sets(class_id).await,
                };
                Event::ListFetched { result }
            }
            Effect::FetchSetDetail { set_id } => Event::SetDetailFetched {
                result: gateway.get_set(set_id).await,
            },
            Effect::StoreLastSet { set_id } => {
                let result = self.store.put_last_set(user_id, &set_id.to_string()).await;
                if let Err(e) = &result {
                    tracing::warn!(user_id, error = %e, "Storing last set failed");
                }
                Event::LastSetStored { result }
            }
            Effect::CheckFavorite => Event::FavoritesChecked {
                result: gateway.list_favorites().await,
            },
            Effect::UpdateFavorite { set_id, favorite } => Event::FavoriteUpdated {
                result: gateway.set_favorite(set_id, favorite).await,
            },
            Effect::Respond(_) => return None,
        };
        Some(event)
    }

    fn unexpected(&self, mut context: SessionContext) -> TurnOutcome {
        context.state = DialogueState::Ended;
        TurnOutcome {
            action: Action::Tell {
                speech: self.renderer.text(MessageKey::Unexpected),
            },
            context,
        }
    }
}

/// Stand-in gateway for turns without a linked account
struct UnlinkedGateway;

impl UnlinkedGateway {
    fn expired<T>() -> Result<T, GatewayError> {
        Err(GatewayError::auth_expired("No linked account"))
    }
}

#[async_trait]
impl DataGateway for UnlinkedGateway {
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError> {
        Self::expired()
    }

    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError> {
        Self::expired()
    }

    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError> {
        Self::expired()
    }

    async fn list_class_sets(&self, _class_id: ItemId) -> Result<Vec<NavItem>, GatewayError> {
        Self::expired()
    }

    async fn get_set(&self, _set_id: ItemId) -> Result<SetDetail, GatewayError> {
        Self::expired()
    }

    async fn set_favorite(&self, _set_id: ItemId, _favorite: bool) -> Result<(), GatewayError> {
        Self::expired()
    }
}
