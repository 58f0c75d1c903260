//! Question bank and scheduling
//!
//! The scheduler owns the question sequence. Every draw starts a new
//! *cycle*; carriers remember the cycle they were spawned in so answers can
//! always be judged against the question that is current right now.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{SelectionPolicy, WeightTuning};
use crate::error::EngineError;

/// A multiple-choice question (immutable once drawn)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn new<S: Into<String>>(
        prompt: impl Into<String>,
        answers: impl IntoIterator<Item = S>,
        correct_index: usize,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            answers: answers.into_iter().map(Into::into).collect(),
            correct_index,
        }
    }

    #[inline]
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_index
    }

    fn check(&self, index: usize) -> Result<(), EngineError> {
        if self.answers.len() < 2 {
            return Err(EngineError::InvalidQuestion {
                index,
                reason: format!("needs at least 2 answers, has {}", self.answers.len()),
            });
        }
        if self.correct_index >= self.answers.len() {
            return Err(EngineError::InvalidQuestion {
                index,
                reason: format!(
                    "correct_index {} out of range for {} answers",
                    self.correct_index,
                    self.answers.len()
                ),
            });
        }
        Ok(())
    }
}

/// Check every entry of a bank; an empty bank is an error
pub fn validate_bank(questions: &[Question]) -> Result<(), EngineError> {
    if questions.is_empty() {
        return Err(EngineError::EmptyQuestionBank);
    }
    questions
        .iter()
        .enumerate()
        .try_for_each(|(i, q)| q.check(i))
}

/// Parse a JSON array of questions and validate it
pub fn load_bank(json: &str) -> Result<Vec<Question>, EngineError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    validate_bank(&questions)?;
    Ok(questions)
}

/// Owns the question sequence and selection policy
#[derive(Debug, Clone)]
pub struct QuestionScheduler {
    questions: Vec<Question>,
    policy: SelectionPolicy,
    tuning: WeightTuning,
    /// Shuffle policy: permutation being consumed
    order: Vec<usize>,
    cursor: usize,
    /// Weighted policy: per-question weight
    weights: Vec<f32>,
    current: usize,
    cycle: u64,
}

impl QuestionScheduler {
    pub fn new<R: Rng>(
        questions: Vec<Question>,
        policy: SelectionPolicy,
        tuning: WeightTuning,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        validate_bank(&questions)?;
        let len = questions.len();
        let mut scheduler = Self {
            questions,
            policy,
            tuning,
            order: (0..len).collect(),
            cursor: 0,
            weights: vec![1.0; len],
            current: 0,
            cycle: 0,
        };
        scheduler.reset(rng);
        Ok(scheduler)
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.current]
    }

    /// Bank index of the current question
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of draws since the last reset
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Move to the next question and return it
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> &Question {
        self.current = match self.policy {
            SelectionPolicy::Shuffle => {
                self.cursor += 1;
                if self.cursor >= self.order.len() {
                    self.order.shuffle(rng);
                    self.cursor = 0;
                }
                self.order[self.cursor]
            }
            SelectionPolicy::Weighted => self.pick_weighted(rng),
        };
        self.cycle += 1;
        log::debug!(
            "Question cycle {} -> bank index {}",
            self.cycle,
            self.current
        );
        &self.questions[self.current]
    }

    /// Restart the sequence with fresh weights
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.weights.iter_mut().for_each(|w| *w = 1.0);
        self.cycle = 0;
        self.current = match self.policy {
            SelectionPolicy::Shuffle => {
                self.order.shuffle(rng);
                self.cursor = 0;
                self.order[0]
            }
            SelectionPolicy::Weighted => self.pick_weighted(rng),
        };
    }

    /// Adjust a question's weight after an answer (Weighted policy only)
    pub fn reinforce(&mut self, index: usize, correct: bool) {
        if self.policy != SelectionPolicy::Weighted {
            return;
        }
        let Some(weight) = self.weights.get_mut(index) else {
            return;
        };
        let factor = if correct {
            self.tuning.correct_factor
        } else {
            self.tuning.wrong_factor
        };
        *weight = (*weight * factor).clamp(self.tuning.min, self.tuning.max);
    }

    fn pick_weighted<R: Rng>(&self, rng: &mut R) -> usize {
        match WeightedIndex::new(&self.weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.random_range(0..self.questions.len()),
        }
    }
}
