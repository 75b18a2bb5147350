//! Pure state transition function
//!
//! Given the session context, the turn's inputs and one event, produce the
//! next context plus the effects the runtime must carry out. Every path that
//! rests the dialogue also emits exactly one `Effect::Respond`.

use super::effect::Effect;
use super::event::{Event, Intent};
use super::state::{
    ActiveSet, DialogueState, ListSource, NavKind, Navigation, SessionContext, SetLoadStep,
    TurnContext,
};
use crate::prompts::{escape_ssml, MessageKey as K};
use crate::quiz::{Answer, Praise, Question, Quiz, QuizError, QuizMode};
use crate::quizlet::{GatewayError, ItemId, NavItem};
use rand::Rng;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub context: SessionContext,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Session is missing its {0}")]
    MissingContext(&'static str),
}

/// Pure transition function
pub fn transition<R: Rng + ?Sized>(
    context: &SessionContext,
    turn: &TurnContext,
    event: Event,
    rng: &mut R,
) -> Result<TransitionResult, TransitionError> {
    let mut ctx = context.clone();

    match (&context.state, event) {
        // ============================================================
        // Entry resolution
        // ============================================================
        (_, Event::Launch) | (DialogueState::EntryResolution, Event::Intent(_)) => {
            Ok(begin_entry(turn))
        }

        (DialogueState::LookingUpLastSet, Event::LastSetLookedUp { result }) => match result {
            Ok(token) => match token.and_then(|t| t.trim().parse::<ItemId>().ok()) {
                Some(set_id) => {
                    ctx.state = DialogueState::ResumingLastSet;
                    Ok(TransitionResult::new(ctx).with_effect(Effect::FetchLastSet { set_id }))
                }
                None => Ok(main_menu(ctx, turn, &welcome(turn))),
            },
            Err(_) => Ok(fatal(ctx, turn, K::Unexpected)),
        },

        (DialogueState::ResumingLastSet, Event::LastSetFetched { result }) => match result {
            Ok(detail) => {
                ctx.navigation = Some(Navigation::new(NavKind::LastSet, vec![detail.summary()]));
                confirm(ctx, turn, &welcome(turn))
            }
            Err(e) if e.is_auth_expired() => Ok(link_account(ctx, turn)),
            // Stale or deleted last set: start fresh
            Err(_) => Ok(main_menu(ctx, turn, &welcome(turn))),
        },

        // ============================================================
        // Browsing
        // ============================================================
        (DialogueState::FetchingList { source }, Event::ListFetched { result }) => match result {
            Ok(items) if items.is_empty() => {
                Ok(main_menu(ctx, turn, &turn.text(source.empty_message())))
            }
            Ok(items) => {
                ctx.navigation = Some(Navigation::new(source.kind(), items));
                present_choices(ctx, turn)
            }
            Err(e) => Ok(gateway_failure(ctx, turn, &e)),
        },

        // ============================================================
        // Set load: detail, remember, favorite check
        // ============================================================
        (
            DialogueState::LoadingSet {
                step: SetLoadStep::FetchDetail,
            },
            Event::SetDetailFetched { result },
        ) => match result {
            Ok(detail) => {
                let active = ActiveSet::from_detail(detail);
                if active.terms.is_empty() {
                    let prefix = turn.render(K::EmptySet, &[&escape_ssml(&active.title)]);
                    return Ok(main_menu(ctx, turn, &prefix));
                }
                let set_id = active.id;
                ctx.navigation = None;
                ctx.active_set = Some(active);
                ctx.state = DialogueState::LoadingSet {
                    step: SetLoadStep::StoreLastUsed,
                };
                Ok(TransitionResult::new(ctx).with_effect(Effect::StoreLastSet { set_id }))
            }
            Err(e) => Ok(gateway_failure(ctx, turn, &e)),
        },

        (
            DialogueState::LoadingSet {
                step: SetLoadStep::StoreLastUsed,
            },
            Event::LastSetStored { result },
        ) => match result {
            Ok(()) => {
                ctx.state = DialogueState::LoadingSet {
                    step: SetLoadStep::CheckFavorite,
                };
                Ok(TransitionResult::new(ctx).with_effect(Effect::CheckFavorite))
            }
            Err(_) => Ok(fatal(ctx, turn, K::Unexpected)),
        },

        (
            DialogueState::LoadingSet {
                step: SetLoadStep::CheckFavorite,
            },
            Event::FavoritesChecked { result },
        ) => match result {
            Ok(favorites) => {
                let active = ctx
                    .active_set
                    .as_mut()
                    .ok_or(TransitionError::MissingContext("active set"))?;
                active.is_favorite = favorites.iter().any(|f| f.id == active.id);
                let prefix = format!(
                    "{}{}",
                    turn.render(K::ChosenSet, &[&escape_ssml(&active.title)]),
                    turn.render(K::SetHasTerms, &[&active.terms.len().to_string()])
                );
                set_menu(ctx, turn, &prefix)
            }
            Err(e) => Ok(gateway_failure(ctx, turn, &e)),
        },

        (DialogueState::TogglingFavorite { favorite }, Event::FavoriteUpdated { result }) => {
            match result {
                Ok(()) => {
                    let favorite = *favorite;
                    ctx.active_set
                        .as_mut()
                        .ok_or(TransitionError::MissingContext("active set"))?
                        .is_favorite = favorite;
                    let prefix = turn.text(if favorite {
                        K::MarkedFavorite
                    } else {
                        K::UnmarkedFavorite
                    });
                    set_menu(ctx, turn, &prefix)
                }
                Err(e) => Ok(gateway_failure(ctx, turn, &e)),
            }
        }

        // ============================================================
        // User intents in resting states
        // ============================================================
        (state, Event::Intent(Intent::Cancel | Intent::Stop)) if state.is_resting() => {
            Ok(goodbye(ctx, turn))
        }

        (DialogueState::MainMenu, Event::Intent(intent)) => Ok(main_menu_intent(ctx, turn, intent)),
        (DialogueState::Confirm, Event::Intent(intent)) => confirm_intent(ctx, turn, intent),
        (DialogueState::ListBrowse, Event::Intent(intent)) => list_intent(ctx, turn, intent),
        (DialogueState::SetMenu, Event::Intent(intent)) => set_menu_intent(ctx, turn, intent),
        (DialogueState::ReviewMenu, Event::Intent(intent)) => review_menu_intent(ctx, turn, intent),
        (DialogueState::Reviewing { by_term, index }, Event::Intent(intent)) => {
            let (by_term, index) = (*by_term, *index);
            reviewing_intent(ctx, turn, by_term, index, intent)
        }
        (DialogueState::QuizMenu, Event::Intent(intent)) => {
            quiz_menu_intent(ctx, turn, intent, rng)
        }
        (DialogueState::QuizActive { quiz }, Event::Intent(intent)) => {
            let quiz = quiz.clone();
            quiz_intent(ctx, turn, quiz, intent)
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            state.name(),
            event.name()
        ))),
    }
}

// ============================================================================
// Per-state intent handlers
// ============================================================================

fn main_menu_intent(ctx: SessionContext, turn: &TurnContext, intent: Intent) -> TransitionResult {
    match intent {
        Intent::SelectFavoriteSet => fetch_list(ctx, ListSource::Favorites),
        Intent::SelectSet => fetch_list(ctx, ListSource::Sets),
        Intent::SelectClass => fetch_list(ctx, ListSource::Classes),
        Intent::Repeat | Intent::StartOver => main_menu(ctx, turn, ""),
        Intent::Help => {
            let speech = turn.render(K::HelpMainMenu, &[&turn.text(K::HowCanIHelp)]);
            help(ctx, turn, speech)
        }
        _ => unhandled(ctx, turn),
    }
}

fn confirm_intent(
    ctx: SessionContext,
    turn: &TurnContext,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    let nav = ctx
        .navigation
        .as_ref()
        .ok_or(TransitionError::MissingContext("navigation"))?;
    match intent {
        Intent::Yes => {
            let item = nav
                .current()
                .cloned()
                .ok_or(TransitionError::MissingContext("navigation item"))?;
            Ok(choose(ctx, item))
        }
        Intent::No | Intent::StartOver => Ok(main_menu(ctx, turn, "")),
        Intent::Repeat => confirm(ctx, turn, ""),
        Intent::Help => {
            let key = if nav.kind.is_class() {
                K::HelpUseClass
            } else {
                K::HelpUseSet
            };
            let speech = turn.render(key, &[&turn.text(K::HowCanIHelp)]);
            Ok(help(ctx, turn, speech))
        }
        _ => Ok(unhandled(ctx, turn)),
    }
}

fn list_intent(
    mut ctx: SessionContext,
    turn: &TurnContext,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    let nav = ctx
        .navigation
        .as_mut()
        .ok_or(TransitionError::MissingContext("navigation"))?;
    let is_class = nav.kind.is_class();

    let ordinal = match intent {
        Intent::SetOrdinal(n) if !is_class => Some(n),
        Intent::ClassOrdinal(n) if is_class => Some(n),
        Intent::Ordinal(n) => Some(n),
        Intent::Next => {
            return if nav.next_page() {
                list_browse(ctx, turn)
            } else {
                Ok(unhandled(ctx, turn))
            };
        }
        Intent::Repeat => return list_browse(ctx, turn),
        Intent::StartOver => return Ok(main_menu(ctx, turn, "")),
        Intent::Help => {
            let (key, more) = page_keys(nav);
            let more = if nav.has_next_page() {
                turn.text(more)
            } else {
                String::new()
            };
            let speech = turn.render(key, &[&more, &turn.text(K::HowCanIHelp)]);
            return Ok(help(ctx, turn, speech));
        }
        _ => None,
    };

    match ordinal.and_then(|n| nav.select(n).cloned()) {
        Some(item) => Ok(choose(ctx, item)),
        None => Ok(unhandled(ctx, turn)),
    }
}

fn set_menu_intent(
    mut ctx: SessionContext,
    turn: &TurnContext,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    let active = ctx
        .active_set
        .as_ref()
        .ok_or(TransitionError::MissingContext("active set"))?;
    match intent {
        Intent::Review => Ok(review_menu(ctx, turn)),
        Intent::QuizMe => Ok(quiz_menu(ctx, turn, "")),
        Intent::ToggleFavorite | Intent::SelectFavoriteSet => {
            let favorite = !active.is_favorite;
            let set_id = active.id;
            ctx.state = DialogueState::TogglingFavorite { favorite };
            Ok(TransitionResult::new(ctx).with_effect(Effect::UpdateFavorite { set_id, favorite }))
        }
        Intent::Repeat => set_menu(ctx, turn, ""),
        Intent::StartOver => Ok(main_menu(ctx, turn, "")),
        Intent::Help => {
            let toggle = turn.text(favorite_toggle_key(active.is_favorite));
            let speech = turn.render(
                K::HelpSetMenu,
                &[&toggle, &turn.text(K::HowCanIHelp)],
            );
            Ok(help(ctx, turn, speech))
        }
        _ => Ok(unhandled(ctx, turn)),
    }
}

fn review_menu_intent(
    ctx: SessionContext,
    turn: &TurnContext,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    match intent {
        Intent::ReviewByTerm => review_item(ctx, turn, true, 0),
        Intent::ReviewByDefinition => review_item(ctx, turn, false, 0),
        Intent::Repeat => Ok(review_menu(ctx, turn)),
        Intent::StartOver => set_menu(ctx, turn, ""),
        Intent::Help => {
            let speech = turn.render(K::HelpReviewMenu, &[&turn.text(K::HowCanIHelp)]);
            Ok(help(ctx, turn, speech))
        }
        _ => Ok(unhandled(ctx, turn)),
    }
}

fn reviewing_intent(
    ctx: SessionContext,
    turn: &TurnContext,
    by_term: bool,
    index: usize,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    match intent {
        Intent::Next => review_item(ctx, turn, by_term, index + 1),
        Intent::Repeat => review_item(ctx, turn, by_term, index),
        Intent::StartOver => set_menu(ctx, turn, ""),
        Intent::Help => {
            let speech = turn.render(K::HelpReviewing, &[&turn.text(K::HowCanIHelp)]);
            Ok(help(ctx, turn, speech))
        }
        _ => Ok(unhandled(ctx, turn)),
    }
}

fn quiz_menu_intent<R: Rng + ?Sized>(
    ctx: SessionContext,
    turn: &TurnContext,
    intent: Intent,
    rng: &mut R,
) -> Result<TransitionResult, TransitionError> {
    let mode = match intent {
        Intent::TermsQuiz => QuizMode::Terms,
        Intent::DefinitionsQuiz => QuizMode::Definitions,
        Intent::Repeat => return Ok(quiz_menu(ctx, turn, "")),
        Intent::StartOver => return set_menu(ctx, turn, ""),
        Intent::Help => {
            let speech = turn.render(K::HelpQuizMenu, &[&turn.text(K::HowCanIHelp)]);
            return Ok(help(ctx, turn, speech));
        }
        _ => return Ok(unhandled(ctx, turn)),
    };

    let terms = &ctx
        .active_set
        .as_ref()
        .ok_or(TransitionError::MissingContext("active set"))?
        .terms;
    match Quiz::generate(mode, terms, rng) {
        Ok(quiz) => ask_question(ctx, turn, quiz, ""),
        Err(QuizError::TooFewTerms { .. }) => {
            let prefix = turn.text(K::QuizNeedsTwoTerms);
            Ok(quiz_menu(ctx, turn, &prefix))
        }
        Err(QuizError::NoTerms) => Err(TransitionError::MissingContext("terms")),
    }
}

fn quiz_intent(
    ctx: SessionContext,
    turn: &TurnContext,
    mut quiz: Quiz,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    let answer = match intent {
        Intent::Yes => Answer::Yes,
        Intent::No => Answer::No,
        Intent::Ordinal(n) => Answer::Choice(n),
        Intent::Repeat => return ask_question(ctx, turn, quiz, ""),
        Intent::StartOver => return set_menu(ctx, turn, ""),
        Intent::Help => {
            let key = match quiz.mode {
                QuizMode::Terms => K::HelpTrueFalse,
                QuizMode::Definitions => K::HelpMultipleChoice,
            };
            let speech = turn.render(key, &[&turn.text(K::HowCanIHelp)]);
            return Ok(help(ctx, turn, speech));
        }
        _ => return Ok(unhandled(ctx, turn)),
    };

    let question = quiz
        .current()
        .cloned()
        .ok_or(TransitionError::MissingContext("quiz question"))?;
    let Some(correct) = quiz.answer(answer) else {
        return Ok(unhandled(ctx, turn));
    };

    let feedback = if correct {
        turn.text(K::Correct)
    } else {
        incorrect_feedback(&ctx, turn, &question)?
    };

    if !quiz.is_complete() {
        return ask_question(ctx, turn, quiz, &feedback);
    }

    let praise = match quiz.praise() {
        Praise::GreatWork => turn.text(K::GreatWork),
        Praise::GoodJob => turn.text(K::GoodJob),
        Praise::None => String::new(),
    };
    let summary = format!(
        "{feedback}{}{praise}",
        turn.render(
            K::QuizComplete,
            &[&quiz.score.to_string(), &quiz.total().to_string()]
        )
    );
    set_menu(ctx, turn, &summary)
}

// ============================================================================
// Transitions shared across states
// ============================================================================

fn begin_entry(turn: &TurnContext) -> TransitionResult {
    let ctx = SessionContext::default();
    if turn.credential.is_none() {
        return link_account(ctx, turn);
    }
    TransitionResult::new(SessionContext {
        state: DialogueState::LookingUpLastSet,
        ..ctx
    })
    .with_effect(Effect::LookUpLastSet)
}

fn fetch_list(mut ctx: SessionContext, source: ListSource) -> TransitionResult {
    ctx.state = DialogueState::FetchingList { source };
    TransitionResult::new(ctx).with_effect(Effect::FetchList { source })
}

/// A confirmed or selected navigation item: drill into a class, or load a set
fn choose(mut ctx: SessionContext, item: NavItem) -> TransitionResult {
    let is_class = ctx.navigation.as_ref().is_some_and(|n| n.kind.is_class());
    if is_class {
        if let Some(nav) = ctx.navigation.as_mut() {
            nav.class_id = Some(item.id);
        }
        return fetch_list(ctx, ListSource::ClassSets { class_id: item.id });
    }

    ctx.state = DialogueState::LoadingSet {
        step: SetLoadStep::FetchDetail,
    };
    TransitionResult::new(ctx).with_effect(Effect::FetchSetDetail { set_id: item.id })
}

fn present_choices(
    ctx: SessionContext,
    turn: &TurnContext,
) -> Result<TransitionResult, TransitionError> {
    let single = ctx
        .navigation
        .as_ref()
        .ok_or(TransitionError::MissingContext("navigation"))?
        .is_single();
    if single {
        confirm(ctx, turn, "")
    } else {
        list_browse(ctx, turn)
    }
}

fn gateway_failure(ctx: SessionContext, turn: &TurnContext, error: &GatewayError) -> TransitionResult {
    if error.is_auth_expired() {
        link_account(ctx, turn)
    } else {
        fatal(ctx, turn, K::ServiceError)
    }
}

// ============================================================================
// Renderers
// ============================================================================

fn welcome(turn: &TurnContext) -> String {
    turn.render(K::Welcome, &[&turn.text(K::SkillName)])
}

fn favorite_toggle_key(is_favorite: bool) -> K {
    if is_favorite {
        K::UnmarkFavorite
    } else {
        K::MarkFavorite
    }
}

/// Help and prompt keys for a list page, by kind
fn page_keys(nav: &Navigation) -> (K, K) {
    if nav.kind.is_class() {
        (K::HelpChooseClass, K::SayNextMoreClasses)
    } else {
        (K::HelpChooseSet, K::SayNextMoreSets)
    }
}

/// Ask and remember the reprompt
fn prompt(mut ctx: SessionContext, speech: String, reprompt: String) -> TransitionResult {
    ctx.reprompt = Some(reprompt.clone());
    TransitionResult::new(ctx).with_effect(Effect::ask(speech, reprompt))
}

fn help(ctx: SessionContext, turn: &TurnContext, speech: String) -> TransitionResult {
    let reprompt = turn.text(K::HelpMe);
    TransitionResult::new(ctx).with_effect(Effect::ask(speech, reprompt))
}

fn unhandled(ctx: SessionContext, turn: &TurnContext) -> TransitionResult {
    let speech = format!(
        "{}{}",
        turn.text(K::NoUnderstand),
        ctx.reprompt.as_deref().unwrap_or_default()
    );
    help(ctx, turn, speech)
}

fn goodbye(mut ctx: SessionContext, turn: &TurnContext) -> TransitionResult {
    ctx.state = DialogueState::Ended;
    TransitionResult::new(ctx).with_effect(Effect::tell(turn.text(K::Stop)))
}

fn fatal(mut ctx: SessionContext, turn: &TurnContext, key: K) -> TransitionResult {
    ctx.state = DialogueState::Ended;
    TransitionResult::new(ctx).with_effect(Effect::tell(turn.text(key)))
}

fn link_account(mut ctx: SessionContext, turn: &TurnContext) -> TransitionResult {
    ctx.state = DialogueState::Ended;
    TransitionResult::new(ctx).with_effect(Effect::link_account(turn.text(K::LinkAccount)))
}

fn main_menu(mut ctx: SessionContext, turn: &TurnContext, prefix: &str) -> TransitionResult {
    ctx.state = DialogueState::MainMenu;
    ctx.navigation = None;
    ctx.active_set = None;
    let speech = format!(
        "{prefix}{}{}",
        turn.text(K::MainMenu),
        turn.text(K::HowCanIHelp)
    );
    prompt(ctx, speech, turn.text(K::MainMenuReprompt))
}

fn confirm(
    mut ctx: SessionContext,
    turn: &TurnContext,
    prefix: &str,
) -> Result<TransitionResult, TransitionError> {
    let nav = ctx
        .navigation
        .as_ref()
        .ok_or(TransitionError::MissingContext("navigation"))?;
    let item = nav
        .current()
        .ok_or(TransitionError::MissingContext("navigation item"))?;
    let title = escape_ssml(&item.title);

    let (intro, name, question, reprompt) = match nav.kind {
        NavKind::Set => (K::OneSet, K::SetNameIs, K::UseSet, K::UseSetReprompt),
        NavKind::FavoriteSet => (K::OneFavoriteSet, K::SetNameIs, K::UseSet, K::UseSetReprompt),
        NavKind::ClassSet => (K::OneClassSet, K::SetNameIs, K::UseSet, K::UseSetReprompt),
        NavKind::Class => (K::OneClass, K::ClassNameIs, K::UseClass, K::UseClassReprompt),
        NavKind::LastSet => {
            let speech = format!(
                "{prefix}{}{}",
                turn.render(K::LastSet, &[&title]),
                turn.text(K::UseSet)
            );
            ctx.state = DialogueState::Confirm;
            return Ok(prompt(ctx, speech, turn.text(K::UseSetReprompt)));
        }
    };
    let speech = format!(
        "{prefix}{}{}{}",
        turn.text(intro),
        turn.render(name, &[&title]),
        turn.text(question)
    );
    ctx.state = DialogueState::Confirm;
    Ok(prompt(ctx, speech, turn.text(reprompt)))
}

fn list_browse(
    mut ctx: SessionContext,
    turn: &TurnContext,
) -> Result<TransitionResult, TransitionError> {
    let nav = ctx
        .navigation
        .as_ref()
        .ok_or(TransitionError::MissingContext("navigation"))?;

    let (heading, label, reprompt_key) = if nav.kind.is_class() {
        (K::ChooseClass, K::ClassLabel, K::ChooseClassReprompt)
    } else {
        (K::ChooseSet, K::SetLabel, K::ChooseSetReprompt)
    };
    let (_, more_key) = page_keys(nav);
    let more = if nav.has_next_page() {
        turn.text(more_key)
    } else {
        String::new()
    };

    let label = turn.text(label);
    let mut speech = format!("{}<break time=\"1s\"/>", turn.text(heading));
    for (i, item) in nav.page().iter().enumerate() {
        speech.push_str(&format!(
            "{label}<say-as interpret-as=\"cardinal\">{}</say-as>. {}<break time=\"1s\"/>",
            i + 1,
            escape_ssml(&item.title)
        ));
    }
    speech.push_str(&more);
    let reprompt = turn.render(reprompt_key, &[&more]);

    ctx.state = DialogueState::ListBrowse;
    Ok(prompt(ctx, speech, reprompt))
}

fn set_menu(
    mut ctx: SessionContext,
    turn: &TurnContext,
    prefix: &str,
) -> Result<TransitionResult, TransitionError> {
    let is_favorite = ctx
        .active_set
        .as_ref()
        .ok_or(TransitionError::MissingContext("active set"))?
        .is_favorite;
    let toggle = turn.text(favorite_toggle_key(is_favorite));
    let speech = format!("{prefix}{}", turn.render(K::SetMenu, &[&toggle]));
    let reprompt = turn.render(K::SetMenuReprompt, &[&toggle]);
    ctx.state = DialogueState::SetMenu;
    Ok(prompt(ctx, speech, reprompt))
}

fn review_menu(mut ctx: SessionContext, turn: &TurnContext) -> TransitionResult {
    ctx.state = DialogueState::ReviewMenu;
    prompt(
        ctx,
        turn.text(K::ReviewMenu),
        turn.text(K::ReviewMenuReprompt),
    )
}

/// Read one pair; the last pair closes the review and returns to the set menu
fn review_item(
    mut ctx: SessionContext,
    turn: &TurnContext,
    by_term: bool,
    index: usize,
) -> Result<TransitionResult, TransitionError> {
    let terms = &ctx
        .active_set
        .as_ref()
        .ok_or(TransitionError::MissingContext("active set"))?
        .terms;
    let term = terms
        .get(index)
        .ok_or(TransitionError::MissingContext("review term"))?;
    let number = (index + 1).to_string();
    let pair = if by_term {
        turn.render(K::ReviewByTerm, &[&number, &escape_ssml(&term.term), &escape_ssml(&term.definition)])
    } else {
        turn.render(K::ReviewByDefinition, &[&number, &escape_ssml(&term.definition), &escape_ssml(&term.term)])
    };

    if index + 1 >= terms.len() {
        let prefix = format!("{pair}{}", turn.text(K::ReviewComplete));
        return set_menu(ctx, turn, &prefix);
    }

    ctx.state = DialogueState::Reviewing { by_term, index };
    let speech = format!("{pair}{}", turn.text(K::ReviewNext));
    Ok(prompt(ctx, speech, turn.text(K::ReviewReprompt)))
}

fn quiz_menu(mut ctx: SessionContext, turn: &TurnContext, prefix: &str) -> TransitionResult {
    ctx.state = DialogueState::QuizMenu;
    let speech = format!("{prefix}{}", turn.text(K::QuizMenu));
    prompt(ctx, speech, turn.text(K::QuizMenuReprompt))
}

fn ask_question(
    mut ctx: SessionContext,
    turn: &TurnContext,
    quiz: Quiz,
    prefix: &str,
) -> Result<TransitionResult, TransitionError> {
    let active = ctx
        .active_set
        .as_ref()
        .ok_or(TransitionError::MissingContext("active set"))?;
    let question = quiz
        .current()
        .ok_or(TransitionError::MissingContext("quiz question"))?;
    let number = quiz.number().to_string();
    let lookup = |rank: u32| {
        active
            .term_by_rank(rank)
            .ok_or(TransitionError::MissingContext("quiz term"))
    };

    let (speech, reprompt) = match question {
        Question::TrueFalse {
            rank, offered_rank, ..
        } => {
            let term = lookup(*rank)?;
            let offered = lookup(*offered_rank)?;
            (
                turn.render(
                    K::TrueFalseQuestion,
                    &[&number, &escape_ssml(&term.term), &escape_ssml(&offered.definition)],
                ),
                turn.text(K::TrueFalseReprompt),
            )
        }
        Question::MultipleChoice { rank, choices, .. } => {
            let term = lookup(*rank)?;
            let label = turn.text(K::ChoiceLabel);
            let mut speech = turn.render(K::MultipleChoiceQuestion, &[&number, &escape_ssml(&term.definition)]);
            for (i, choice) in choices.iter().enumerate() {
                speech.push_str(&format!(
                    "{label}<say-as interpret-as=\"cardinal\">{}</say-as>. {}<break time=\"1s\"/>",
                    i + 1,
                    escape_ssml(&lookup(*choice)?.term)
                ));
            }
            (speech, turn.text(K::MultipleChoiceReprompt))
        }
    };

    ctx.state = DialogueState::QuizActive { quiz };
    Ok(prompt(ctx, format!("{prefix}{speech}"), reprompt))
}

fn incorrect_feedback(
    ctx: &SessionContext,
    turn: &TurnContext,
    question: &Question,
) -> Result<String, TransitionError> {
    let term = ctx
        .active_set
        .as_ref()
        .and_then(|a| a.term_by_rank(question.rank()))
        .ok_or(TransitionError::MissingContext("quiz term"))?;
    Ok(match question {
        Question::TrueFalse { .. } => {
            turn.render(K::IncorrectTrueFalse, &[&escape_ssml(&term.term), &escape_ssml(&term.definition)])
        }
        Question::MultipleChoice { .. } => turn.render(K::IncorrectChoice, &[&escape_ssml(&term.term)]),
    })
}
