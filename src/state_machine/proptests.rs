//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::effect::{Action, Effect};
use super::event::{Event, Intent};
use super::pagination::PAGE_SIZE;
use super::state::*;
use super::transition::*;
use crate::credential::Credential;
use crate::prompts::EnglishCatalog;
use crate::quiz::{Praise, Question, Quiz, QuizMode, MAX_QUESTIONS};
use crate::quizlet::{GatewayError, NavItem, SetDetail, Term};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_turn() -> TurnContext {
    TurnContext::new(
        "prop-user",
        Some(Credential::parse("owner|token")),
        Arc::new(EnglishCatalog),
    )
}

fn items(n: usize) -> Vec<NavItem> {
    (0..n)
        .map(|i| NavItem::new(i as u64 + 1, format!("Item {}", i + 1)))
        .collect()
}

fn terms(n: usize) -> Vec<Term> {
    (0..n as u32)
        .map(|r| Term::new(r, format!("term{r}"), format!("def{r}")))
        .collect()
}

fn browsing(kind: NavKind, len: usize, pages: usize) -> SessionContext {
    let mut nav = Navigation::new(kind, items(len));
    nav.cursor = (pages * PAGE_SIZE).min(nav.items.len().saturating_sub(1));
    SessionContext {
        state: DialogueState::ListBrowse,
        navigation: Some(nav),
        active_set: None,
        reprompt: Some("choose".to_string()),
    }
}

fn responses(effects: &[Effect]) -> Vec<&Action> {
    effects.iter().filter_map(Effect::action).collect()
}

/// Answer an I/O effect the way a healthy backend would
fn complete(effect: &Effect, list_len: usize, term_count: usize) -> Option<Event> {
    match effect {
        Effect::LookUpLastSet => Some(Event::LastSetLookedUp {
            result: Ok(Some("1".to_string())),
        }),
        Effect::FetchLastSet { set_id } => Some(Event::LastSetFetched {
            result: Ok(SetDetail {
                id: *set_id,
                title: "Resumed".to_string(),
                terms: terms(term_count),
            }),
        }),
        Effect::FetchList { .. } => Some(Event::ListFetched {
            result: Ok(items(list_len)),
        }),
        Effect::FetchSetDetail { set_id } => Some(Event::SetDetailFetched {
            result: Ok(SetDetail {
                id: *set_id,
                title: "Loaded".to_string(),
                terms: terms(term_count),
            }),
        }),
        Effect::StoreLastSet { .. } => Some(Event::LastSetStored { result: Ok(()) }),
        Effect::CheckFavorite => Some(Event::FavoritesChecked {
            result: Ok(items(2)),
        }),
        Effect::UpdateFavorite { .. } => Some(Event::FavoriteUpdated { result: Ok(()) }),
        Effect::Respond(_) => None,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_ordinal() -> impl Strategy<Value = usize> {
    1usize..=4
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::SelectFavoriteSet),
        Just(Intent::SelectSet),
        Just(Intent::SelectClass),
        Just(Intent::Yes),
        Just(Intent::No),
        Just(Intent::Repeat),
        Just(Intent::Help),
        Just(Intent::StartOver),
        Just(Intent::Next),
        arb_ordinal().prop_map(Intent::SetOrdinal),
        arb_ordinal().prop_map(Intent::ClassOrdinal),
        arb_ordinal().prop_map(Intent::Ordinal),
        Just(Intent::Review),
        Just(Intent::QuizMe),
        Just(Intent::ToggleFavorite),
        Just(Intent::ReviewByTerm),
        Just(Intent::ReviewByDefinition),
        Just(Intent::TermsQuiz),
        Just(Intent::DefinitionsQuiz),
        "[A-Z][a-z]{3,8}Intent".prop_map(Intent::Unknown),
    ]
}

fn arb_set_kind() -> impl Strategy<Value = NavKind> {
    prop_oneof![
        Just(NavKind::Set),
        Just(NavKind::FavoriteSet),
        Just(NavKind::ClassSet),
    ]
}

fn arb_source() -> impl Strategy<Value = ListSource> {
    prop_oneof![
        Just(ListSource::Sets),
        Just(ListSource::Favorites),
        Just(ListSource::Classes),
        (1u64..50).prop_map(|class_id| ListSource::ClassSets { class_id }),
    ]
}

/// An in-flight state together with an auth failure for the call it awaits
fn arb_in_flight_auth_failure() -> impl Strategy<Value = (DialogueState, Event)> {
    let expired = || GatewayError::auth_expired("token revoked");
    prop_oneof![
        Just((
            DialogueState::ResumingLastSet,
            Event::LastSetFetched {
                result: Err(expired())
            }
        )),
        arb_source().prop_map(move |source| (
            DialogueState::FetchingList { source },
            Event::ListFetched {
                result: Err(expired())
            }
        )),
        Just((
            DialogueState::LoadingSet {
                step: SetLoadStep::FetchDetail
            },
            Event::SetDetailFetched {
                result: Err(expired())
            }
        )),
        Just((
            DialogueState::LoadingSet {
                step: SetLoadStep::CheckFavorite
            },
            Event::FavoritesChecked {
                result: Err(expired())
            }
        )),
        any::<bool>().prop_map(move |favorite| (
            DialogueState::TogglingFavorite { favorite },
            Event::FavoriteUpdated {
                result: Err(expired())
            }
        )),
    ]
}

// ============================================================================
// Invariant Checks
// ============================================================================

fn context_is_valid(ctx: &SessionContext) -> bool {
    let cursor_ok = ctx
        .navigation
        .as_ref()
        .map_or(true, |n| n.cursor <= n.items.len() && n.items.len() <= n.kind.max_items());
    let terms_ok = ctx
        .active_set
        .as_ref()
        .map_or(true, |a| !a.terms.is_empty());
    let state_ok = match &ctx.state {
        DialogueState::Confirm | DialogueState::ListBrowse => ctx.navigation.is_some(),
        DialogueState::SetMenu
        | DialogueState::ReviewMenu
        | DialogueState::Reviewing { .. }
        | DialogueState::QuizMenu => ctx.active_set.is_some(),
        DialogueState::QuizActive { quiz } => {
            ctx.active_set
                .as_ref()
                .is_some_and(|a| quiz.total() <= a.terms.len())
                && quiz.total() <= MAX_QUESTIONS
        }
        DialogueState::MainMenu => ctx.navigation.is_none() && ctx.active_set.is_none(),
        _ => true,
    };
    cursor_ok && terms_ok && state_ok
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Single candidate confirms, several browse
    #[test]
    fn prop_single_vs_multiple(source in arb_source(), len in 1usize..60) {
        let ctx = SessionContext {
            state: DialogueState::FetchingList { source },
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = transition(&ctx, &test_turn(), Event::ListFetched { result: Ok(items(len)) }, &mut rng).unwrap();
        if len == 1 {
            prop_assert_eq!(&result.context.state, &DialogueState::Confirm);
        } else {
            prop_assert_eq!(&result.context.state, &DialogueState::ListBrowse);
        }
        prop_assert_eq!(responses(&result.effects).len(), 1);
    }

    // A page reads min(4, remaining) items and hints "next" only when more remain
    #[test]
    fn prop_page_rendering(kind in arb_set_kind(), len in 2usize..45, pages in 0usize..12) {
        let ctx = browsing(kind, len, pages);
        let nav = ctx.navigation.clone().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let result = transition(&ctx, &test_turn(), Event::Intent(Intent::Repeat), &mut rng).unwrap();
        let speech = responses(&result.effects)[0].speech().to_string();

        let remaining = nav.items.len() - nav.cursor;
        prop_assert_eq!(speech.matches("<say-as").count(), remaining.min(PAGE_SIZE));
        prop_assert_eq!(speech.contains("Say next for more sets."), remaining > PAGE_SIZE);
    }

    // Next moves exactly one page forward, or is rejected without moving
    #[test]
    fn prop_next_advances_by_page(kind in arb_set_kind(), len in 2usize..45, pages in 0usize..12) {
        let ctx = browsing(kind, len, pages);
        let before = ctx.navigation.as_ref().unwrap().cursor;
        let remaining = ctx.navigation.as_ref().unwrap().items.len() - before;
        let mut rng = StdRng::seed_from_u64(0);
        let result = transition(&ctx, &test_turn(), Event::Intent(Intent::Next), &mut rng).unwrap();
        let after = result.context.navigation.as_ref().unwrap().cursor;

        if remaining > PAGE_SIZE {
            prop_assert_eq!(after, before + PAGE_SIZE);
        } else {
            prop_assert_eq!(after, before);
            prop_assert!(responses(&result.effects)[0].speech().starts_with("Sorry"));
        }
    }

    // Ordinal n succeeds iff n items remain past the cursor
    #[test]
    fn prop_ordinal_selection(len in 2usize..45, pages in 0usize..12, n in arb_ordinal()) {
        let ctx = browsing(NavKind::Set, len, pages);
        let nav = ctx.navigation.clone().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let result = transition(&ctx, &test_turn(), Event::Intent(Intent::SetOrdinal(n)), &mut rng).unwrap();

        if nav.items.len() - nav.cursor >= n {
            let expected = nav.items[nav.cursor + n - 1].id;
            prop_assert_eq!(result.effects, vec![Effect::FetchSetDetail { set_id: expected }]);
        } else {
            prop_assert_eq!(&result.context, &ctx);
        }
    }

    // Set ordinals never select classes and class ordinals never select sets
    #[test]
    fn prop_cross_kind_ordinals_rejected(len in 2usize..20, n in arb_ordinal()) {
        let mut rng = StdRng::seed_from_u64(0);
        let sets = browsing(NavKind::Set, len, 0);
        let result = transition(&sets, &test_turn(), Event::Intent(Intent::ClassOrdinal(n)), &mut rng).unwrap();
        prop_assert_eq!(&result.context, &sets);

        let classes = browsing(NavKind::Class, len, 0);
        let result = transition(&classes, &test_turn(), Event::Intent(Intent::SetOrdinal(n)), &mut rng).unwrap();
        prop_assert_eq!(&result.context, &classes);
    }

    // Quiz size is min(10, terms) and questions never repeat a term
    #[test]
    fn prop_quiz_size_and_distinct(count in 2usize..40, seed in any::<u64>(), definitions in any::<bool>()) {
        let mode = if definitions { QuizMode::Definitions } else { QuizMode::Terms };
        let mut rng = StdRng::seed_from_u64(seed);
        let quiz = Quiz::generate(mode, &terms(count), &mut rng).unwrap();
        prop_assert_eq!(quiz.total(), count.min(MAX_QUESTIONS));
        let ranks: HashSet<u32> = quiz.questions.iter().map(Question::rank).collect();
        prop_assert_eq!(ranks.len(), quiz.total());
    }

    // A "false" true/false question never offers the term's own definition
    #[test]
    fn prop_distractor_is_another_term(count in 2usize..30, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let quiz = Quiz::generate(QuizMode::Terms, &terms(count), &mut rng).unwrap();
        for question in &quiz.questions {
            if let Question::TrueFalse { rank, offered_rank, matches } = question {
                prop_assert_eq!(*matches, rank == offered_rank);
            }
        }
    }

    // Multiple-choice candidates hold the answer exactly once, at correct_index
    #[test]
    fn prop_choices_contain_answer(count in 1usize..30, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let quiz = Quiz::generate(QuizMode::Definitions, &terms(count), &mut rng).unwrap();
        for question in &quiz.questions {
            if let Question::MultipleChoice { rank, choices, correct_index } = question {
                prop_assert_eq!(choices.len(), count.min(3));
                prop_assert_eq!(choices.iter().filter(|r| *r == rank).count(), 1);
                prop_assert_eq!(choices[*correct_index], *rank);
                let distinct: HashSet<&u32> = choices.iter().collect();
                prop_assert_eq!(distinct.len(), choices.len());
            }
        }
    }

    // Praise tier follows the score ratio
    #[test]
    fn prop_praise_tiers(total in 1usize..=10, correct in 0usize..=10) {
        let score = correct.min(total);
        let praise = Praise::for_score(score, total);
        if score == total {
            prop_assert_eq!(praise, Praise::GreatWork);
        } else if score * 10 >= total * 7 {
            prop_assert_eq!(praise, Praise::GoodJob);
        } else {
            prop_assert_eq!(praise, Praise::None);
        }
    }

    // An expired credential anywhere mid-turn ends in the link-account action
    #[test]
    fn prop_auth_expired_links_account((state, event) in arb_in_flight_auth_failure(), term_count in 1usize..5) {
        let ctx = SessionContext {
            state,
            navigation: Some(Navigation::new(NavKind::Set, items(3))),
            active_set: Some(ActiveSet::from_detail(SetDetail {
                id: 1,
                title: "Loaded".to_string(),
                terms: terms(term_count),
            })),
            reprompt: None,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = transition(&ctx, &test_turn(), event, &mut rng).unwrap();
        let actions = responses(&result.effects);
        prop_assert_eq!(actions.len(), 1);
        prop_assert!(
            matches!(actions[0], Action::TellWithLinkAccount { .. }),
            "expected link-account action, got {:?}",
            actions[0]
        );
        prop_assert_eq!(result.context.state, DialogueState::Ended);
    }

    // Driving whole sessions: every turn ends resting or ended with exactly one response
    #[test]
    fn prop_every_turn_responds_once(
        intents in proptest::collection::vec(arb_intent(), 1..25),
        list_len in 1usize..12,
        term_count in 1usize..15,
        seed in any::<u64>(),
    ) {
        let turn = test_turn();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = SessionContext::default();
        let mut first = true;

        for intent in intents {
            let mut queue = vec![if first { Event::Launch } else { Event::Intent(intent) }];
            first = false;
            let mut spoken = 0;

            while let Some(event) = queue.pop() {
                let result = transition(&ctx, &turn, event, &mut rng).unwrap();
                ctx = result.context;
                prop_assert!(context_is_valid(&ctx), "Invalid context: {:?}", ctx);
                for effect in &result.effects {
                    match complete(effect, list_len, term_count) {
                        Some(next) => queue.push(next),
                        None => spoken += 1,
                    }
                }
            }

            prop_assert_eq!(spoken, 1);
            prop_assert!(!ctx.state.is_in_flight());
            if ctx.state.is_terminal() {
                break;
            }
        }
    }
}
