//! Mock implementations for testing
//!
//! These mocks enable turn-level testing without real I/O.

use super::traits::*;
use crate::credential::Credential;
use crate::quizlet::{DataGateway, GatewayError, ItemId, NavItem, SetDetail};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Gateway
// ============================================================================

/// In-memory flashcard service
#[allow(dead_code)]
#[derive(Default)]
pub struct MockGateway {
    sets: Mutex<Vec<NavItem>>,
    favorites: Mutex<Vec<NavItem>>,
    classes: Mutex<Vec<NavItem>>,
    class_sets: Mutex<HashMap<ItemId, Vec<NavItem>>>,
    details: Mutex<HashMap<ItemId, SetDetail>>,
    /// Errors returned by the next calls of an operation, oldest first
    failures: Mutex<HashMap<&'static str, VecDeque<GatewayError>>>,
    /// Record of operations called
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set owned by the user
    pub fn with_set(self, detail: SetDetail) -> Self {
        self.sets.lock().unwrap().push(detail.summary());
        self.details.lock().unwrap().insert(detail.id, detail);
        self
    }

    /// Add a set visible only through a class
    pub fn with_class_set(self, class: NavItem, detail: SetDetail) -> Self {
        self.class_sets
            .lock()
            .unwrap()
            .entry(class.id)
            .or_default()
            .push(detail.summary());
        {
            let mut classes = self.classes.lock().unwrap();
            if !classes.iter().any(|c| c.id == class.id) {
                classes.push(class);
            }
        }
        self.details.lock().unwrap().insert(detail.id, detail);
        self
    }

    pub fn with_favorite(self, set_id: ItemId) -> Self {
        let item = self
            .details
            .lock()
            .unwrap()
            .get(&set_id)
            .map(SetDetail::summary)
            .expect("favorite must name a known set");
        self.favorites.lock().unwrap().push(item);
        self
    }

    /// Make the next call of `operation` fail
    pub fn fail_next(&self, operation: &'static str, error: GatewayError) {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn favorite_ids(&self) -> Vec<ItemId> {
        self.favorites.lock().unwrap().iter().map(|f| f.id).collect()
    }

    fn enter(&self, operation: &'static str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(operation.to_string());
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataGateway for MockGateway {
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError> {
        self.enter("list_sets")?;
        Ok(self.sets.lock().unwrap().clone())
    }

    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError> {
        self.enter("list_favorites")?;
        Ok(self.favorites.lock().unwrap().clone())
    }

    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError> {
        self.enter("list_classes")?;
        Ok(self.classes.lock().unwrap().clone())
    }

    async fn list_class_sets(&self, class_id: ItemId) -> Result<Vec<NavItem>, GatewayError> {
        self.enter("list_class_sets")?;
        Ok(self
            .class_sets
            .lock()
            .unwrap()
            .get(&class_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_set(&self, set_id: ItemId) -> Result<SetDetail, GatewayError> {
        self.enter("get_set")?;
        self.details
            .lock()
            .unwrap()
            .get(&set_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("Set {set_id}")))
    }

    async fn set_favorite(&self, set_id: ItemId, favorite: bool) -> Result<(), GatewayError> {
        self.enter("set_favorite")?;
        let summary = self
            .details
            .lock()
            .unwrap()
            .get(&set_id)
            .map(SetDetail::summary)
            .ok_or_else(|| GatewayError::not_found(format!("Set {set_id}")))?;
        let mut favorites = self.favorites.lock().unwrap();
        favorites.retain(|f| f.id != set_id);
        if favorite {
            favorites.push(summary);
        }
        Ok(())
    }
}

/// Hands out one shared mock gateway and records who connected
#[allow(dead_code)]
pub struct MockConnector {
    pub gateway: Arc<MockGateway>,
    pub connections: Mutex<Vec<Credential>>,
}

impl MockConnector {
    pub fn new(gateway: Arc<MockGateway>) -> Self {
        Self {
            gateway,
            connections: Mutex::new(Vec::new()),
        }
    }
}

impl GatewayConnector for MockConnector {
    fn connect(&self, credential: &Credential) -> Arc<dyn DataGateway> {
        self.connections.lock().unwrap().push(credential.clone());
        self.gateway.clone()
    }
}

// ============================================================================
// In-Memory Session Store
// ============================================================================

/// Session store backed by a map
#[allow(dead_code)]
#[derive(Default)]
pub struct InMemorySessionStore {
    tokens: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

#[allow(dead_code)]
impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, user_id: &str, token: &str) -> Self {
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.to_string(), token.to_string());
        self
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn token(&self, user_id: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_last_set(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.token(user_id))
    }

    async fn put_last_set(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::new("write refused"));
        }
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.to_string(), token.to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::prompts::EnglishCatalog;
    use crate::quizlet::Term;
    use crate::runtime::{SkillRuntime, Turn, TurnOutcome};
    use crate::state_machine::{Action, DialogueState, Event, Intent, SessionContext};

    const USER: &str = "amzn1.account.test";

    fn capitals() -> SetDetail {
        SetDetail {
            id: 415,
            title: "US State Capitals".to_string(),
            terms: vec![
                Term::new(0, "Alabama", "Montgomery"),
                Term::new(1, "Alaska", "Juneau"),
                Term::new(2, "Arizona", "Phoenix"),
            ],
        }
    }

    fn elements() -> SetDetail {
        SetDetail {
            id: 7,
            title: "Elements".to_string(),
            terms: vec![Term::new(0, "H", "Hydrogen"), Term::new(1, "He", "Helium")],
        }
    }

    /// Drives a session turn by turn, carrying context forward like the host
    struct Session<S: SessionStore + 'static> {
        runtime: SkillRuntime<S, MockConnector>,
        context: SessionContext,
        credential: Option<Credential>,
    }

    impl<S: SessionStore + 'static> Session<S> {
        fn new(store: S, gateway: Arc<MockGateway>) -> Self {
            Self {
                runtime: SkillRuntime::new(
                    store,
                    MockConnector::new(gateway),
                    Arc::new(EnglishCatalog),
                )
                .with_seed(5),
                context: SessionContext::default(),
                credential: Some(Credential::parse("alice|token")),
            }
        }

        fn unlinked(mut self) -> Self {
            self.credential = None;
            self
        }

        async fn send(&mut self, event: Event) -> TurnOutcome {
            let outcome = self
                .runtime
                .handle_turn(Turn {
                    session_id: "session-1".to_string(),
                    user_id: USER.to_string(),
                    credential: self.credential.clone(),
                    event,
                    context: self.context.clone(),
                })
                .await;
            self.context = outcome.context.clone();
            outcome
        }

        async fn say(&mut self, name: &str) -> TurnOutcome {
            self.send(Event::Intent(Intent::from_name(name))).await
        }
    }

    #[tokio::test]
    async fn test_launch_without_link_asks_to_link() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = Session::new(InMemorySessionStore::new(), gateway.clone()).unlinked();
        let outcome = session.send(Event::Launch).await;
        assert!(matches!(
            outcome.action,
            Action::TellWithLinkAccount { .. }
        ));
        assert!(gateway.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_new_user_lands_on_main_menu() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let mut session = Session::new(InMemorySessionStore::new(), gateway);
        let outcome = session.send(Event::Launch).await;
        assert!(matches!(outcome.action, Action::Ask { .. }));
        assert!(outcome
            .action
            .speech()
            .starts_with("Welcome to Quizlexa. You can ask me to find a favorite set"));
        assert_eq!(outcome.context.state, DialogueState::MainMenu);
    }

    #[tokio::test]
    async fn test_intent_on_new_session_runs_entry() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = Session::new(InMemorySessionStore::new(), gateway);
        let outcome = session.say("SelectSetIntent").await;
        assert_eq!(outcome.context.state, DialogueState::MainMenu);
    }

    #[tokio::test]
    async fn test_selecting_single_set_loads_it() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let store = Arc::new(InMemorySessionStore::new());
        let mut session = Session::new(store.clone(), gateway.clone());

        session.send(Event::Launch).await;
        let outcome = session.say("SelectSetIntent").await;
        assert_eq!(outcome.context.state, DialogueState::Confirm);
        assert!(outcome
            .action
            .speech()
            .contains("The Quizlet set name is US State Capitals."));

        let outcome = session.say("AMAZON.YesIntent").await;
        assert_eq!(outcome.context.state, DialogueState::SetMenu);
        assert!(outcome
            .action
            .speech()
            .starts_with("You have chosen the set named US State Capitals. This set has 3 terms. "));
        assert_eq!(store.token(USER).as_deref(), Some("415"));
        assert_eq!(
            gateway.recorded_calls(),
            vec!["list_sets", "get_set", "list_favorites"]
        );
    }

    #[tokio::test]
    async fn test_last_set_round_trip_offers_same_title() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let db = Database::open_in_memory().unwrap();

        let mut first = Session::new(DatabaseSessionStore::new(db.clone()), gateway.clone());
        first.send(Event::Launch).await;
        first.say("SelectSetIntent").await;
        first.say("AMAZON.YesIntent").await;
        first.say("AMAZON.StopIntent").await;

        let mut second = Session::new(DatabaseSessionStore::new(db), gateway);
        let outcome = second.send(Event::Launch).await;
        assert_eq!(outcome.context.state, DialogueState::Confirm);
        assert!(outcome
            .action
            .speech()
            .contains("The last Quizlet set you used is named US State Capitals."));

        let outcome = second.say("AMAZON.YesIntent").await;
        assert_eq!(outcome.context.state, DialogueState::SetMenu);
    }

    #[tokio::test]
    async fn test_auth_expired_during_favorite_check_links_account() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let mut session = Session::new(InMemorySessionStore::new(), gateway.clone());
        session.send(Event::Launch).await;
        session.say("SelectSetIntent").await;

        gateway.fail_next("list_favorites", GatewayError::auth_expired("401 Unauthorized"));
        let outcome = session.say("AMAZON.YesIntent").await;
        assert!(matches!(
            outcome.action,
            Action::TellWithLinkAccount { .. }
        ));
        assert!(outcome.action.ends_session());
    }

    #[tokio::test]
    async fn test_server_error_is_fatal_service_error() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let mut session = Session::new(InMemorySessionStore::new(), gateway.clone());
        session.send(Event::Launch).await;

        gateway.fail_next("list_sets", GatewayError::server("HTTP 500"));
        let outcome = session.say("SelectSetIntent").await;
        assert_eq!(
            outcome.action,
            Action::Tell {
                speech: "There was an error communicating with Quizlet. Please try again later! "
                    .to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_store_write_failure_is_unexpected_error() {
        let gateway = Arc::new(MockGateway::new().with_set(capitals()));
        let store = Arc::new(InMemorySessionStore::new());
        let mut session = Session::new(store.clone(), gateway);
        session.send(Event::Launch).await;
        session.say("SelectSetIntent").await;

        store.fail_writes();
        let outcome = session.say("AMAZON.YesIntent").await;
        assert!(matches!(outcome.action, Action::Tell { .. }));
        assert!(outcome.action.speech().contains("unexpected error"));
    }

    #[tokio::test]
    async fn test_class_drill_down_and_favorite_toggle() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_set(capitals())
                .with_class_set(NavItem::new(30, "Chemistry"), elements()),
        );
        let mut session = Session::new(InMemorySessionStore::new(), gateway.clone());
        session.send(Event::Launch).await;

        let outcome = session.say("SelectClassIntent").await;
        assert!(outcome.action.speech().contains("The class name is Chemistry."));

        let outcome = session.say("AMAZON.YesIntent").await;
        assert!(outcome.action.speech().starts_with("You have one set in this class. "));

        session.say("AMAZON.YesIntent").await;
        let outcome = session.say("ToggleFavoriteIntent").await;
        assert!(outcome
            .action
            .speech()
            .starts_with("Great! I have marked this set as a favorite. "));
        assert_eq!(gateway.favorite_ids(), vec![7]);

        let outcome = session.say("ToggleFavoriteIntent").await;
        assert!(outcome
            .action
            .speech()
            .starts_with("I have unmarked this set as a favorite. "));
        assert!(gateway.favorite_ids().is_empty());
    }

    #[tokio::test]
    async fn test_terms_quiz_to_completion() {
        let gateway = Arc::new(MockGateway::new().with_set(elements()));
        let mut session = Session::new(InMemorySessionStore::new(), gateway);
        session.send(Event::Launch).await;
        session.say("SelectSetIntent").await;
        session.say("AMAZON.YesIntent").await;
        session.say("QuizMeIntent").await;

        let mut outcome = session.say("TermsQuizIntent").await;
        let mut asked = 0;
        while let DialogueState::QuizActive { quiz } = &outcome.context.state {
            asked += 1;
            let matches = match quiz.current() {
                Some(crate::quiz::Question::TrueFalse { matches, .. }) => *matches,
                other => panic!("Unexpected question {other:?}"),
            };
            let reply = if matches { "AMAZON.YesIntent" } else { "AMAZON.NoIntent" };
            outcome = session.say(reply).await;
        }

        assert_eq!(asked, 2);
        assert_eq!(outcome.context.state, DialogueState::SetMenu);
        assert!(outcome
            .action
            .speech()
            .contains("You got 2 out of 2 questions right. Great work! "));
    }

    #[tokio::test]
    async fn test_unknown_intent_echoes_reprompt() {
        let gateway = Arc::new(MockGateway::new());
        let mut session = Session::new(InMemorySessionStore::new(), gateway);
        session.send(Event::Launch).await;
        let outcome = session.say("OrderPizzaIntent").await;
        assert_eq!(
            outcome.action,
            Action::Ask {
                speech: "Sorry, I don't quite understand what you mean. You can ask me to find a favorite set, find a set, or find a class, or say help me. ".to_string(),
                reprompt: "For instructions on what you can say, please say help me. ".to_string(),
            }
        );
        assert_eq!(outcome.context.state, DialogueState::MainMenu);
    }
}
