//! Quiz generation and scoring
//!
//! Questions reference terms by rank, never by position, so a quiz stays valid
//! however the term list is ordered.

use crate::quizlet::Term;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on questions per quiz
pub const MAX_QUESTIONS: usize = 10;

/// Upper bound on candidate terms per multiple-choice question
pub const MAX_CHOICES: usize = 3;

/// Minimum terms for a true/false quiz (a false answer needs a distractor)
pub const MIN_TERMS_FOR_TRUE_FALSE: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("Set has no terms")]
    NoTerms,
    #[error("Quiz needs at least {needed} terms, set has {available}")]
    TooFewTerms { needed: usize, available: usize },
}

/// Quiz flavour chosen from the quiz menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// "Does term T mean definition D?" answered yes/no
    Terms,
    /// "Which term matches definition D?" answered by number
    Definitions,
}

/// A generated question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    TrueFalse {
        rank: u32,
        /// Rank whose definition is offered
        offered_rank: u32,
        /// Whether the offered definition belongs to the term
        matches: bool,
    },
    MultipleChoice {
        /// Rank whose definition is read out
        rank: u32,
        /// Candidate term ranks, spoken as 1..=k
        choices: Vec<u32>,
        correct_index: usize,
    },
}

impl Question {
    /// Rank of the term being asked about
    pub fn rank(&self) -> u32 {
        match self {
            Question::TrueFalse { rank, .. } | Question::MultipleChoice { rank, .. } => *rank,
        }
    }
}

/// A user's answer to the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// One-based numbered choice
    Choice(usize),
}

/// Praise tier of the completion summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Praise {
    GreatWork,
    GoodJob,
    None,
}

impl Praise {
    /// 100% earns great work, 70% or better good job
    pub fn for_score(score: usize, total: usize) -> Self {
        if total > 0 && score == total {
            Praise::GreatWork
        } else if score * 10 >= total * 7 {
            Praise::GoodJob
        } else {
            Praise::None
        }
    }
}

/// Quiz in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub mode: QuizMode,
    pub questions: Vec<Question>,
    pub index: usize,
    pub score: usize,
}

impl Quiz {
    /// Draw `min(MAX_QUESTIONS, terms)` distinct terms and build a question for each
    pub fn generate<R: Rng + ?Sized>(
        mode: QuizMode,
        terms: &[Term],
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if terms.is_empty() {
            return Err(QuizError::NoTerms);
        }
        if mode == QuizMode::Terms && terms.len() < MIN_TERMS_FOR_TRUE_FALSE {
            return Err(QuizError::TooFewTerms {
                needed: MIN_TERMS_FOR_TRUE_FALSE,
                available: terms.len(),
            });
        }

        let count = terms.len().min(MAX_QUESTIONS);
        let questions = index::sample(rng, terms.len(), count)
            .into_iter()
            .map(|position| match mode {
                QuizMode::Terms => true_false_question(terms, position, rng),
                QuizMode::Definitions => multiple_choice_question(terms, position, rng),
            })
            .collect();

        Ok(Self {
            mode,
            questions,
            index: 0,
            score: 0,
        })
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// One-based number of the current question
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Grade and consume the current question.
    ///
    /// Returns `None` without advancing when the answer does not fit the
    /// question (yes/no to a numbered question, a choice that was not offered).
    pub fn answer(&mut self, answer: Answer) -> Option<bool> {
        let correct = match (self.current()?, answer) {
            (Question::TrueFalse { matches, .. }, Answer::Yes) => *matches,
            (Question::TrueFalse { matches, .. }, Answer::No) => !*matches,
            (
                Question::MultipleChoice {
                    choices,
                    correct_index,
                    ..
                },
                Answer::Choice(n),
            ) if n >= 1 && n <= choices.len() => n - 1 == *correct_index,
            _ => return None,
        };

        if correct {
            self.score += 1;
        }
        self.index += 1;
        Some(correct)
    }

    pub fn praise(&self) -> Praise {
        Praise::for_score(self.score, self.total())
    }
}

fn true_false_question<R: Rng + ?Sized>(terms: &[Term], position: usize, rng: &mut R) -> Question {
    let rank = terms[position].rank;
    if rng.gen_bool(0.5) {
        return Question::TrueFalse {
            rank,
            offered_rank: rank,
            matches: true,
        };
    }

    // Uniform over the terms with a different rank, so the distractor is never the answer
    let distractors: Vec<u32> = terms
        .iter()
        .map(|t| t.rank)
        .filter(|r| *r != rank)
        .collect();
    if distractors.is_empty() {
        return Question::TrueFalse {
            rank,
            offered_rank: rank,
            matches: true,
        };
    }
    Question::TrueFalse {
        rank,
        offered_rank: distractors[rng.gen_range(0..distractors.len())],
        matches: false,
    }
}

fn multiple_choice_question<R: Rng + ?Sized>(
    terms: &[Term],
    position: usize,
    rng: &mut R,
) -> Question {
    let rank = terms[position].rank;
    let amount = terms.len().min(MAX_CHOICES);
    let mut choices: Vec<u32> = index::sample(rng, terms.len(), amount)
        .into_iter()
        .map(|i| terms[i].rank)
        .collect();

    let correct_index = match choices.iter().position(|r| *r == rank) {
        Some(i) => i,
        None => {
            let slot = rng.gen_range(0..choices.len());
            choices[slot] = rank;
            slot
        }
    };

    Question::MultipleChoice {
        rank,
        choices,
        correct_index,
    }
}
