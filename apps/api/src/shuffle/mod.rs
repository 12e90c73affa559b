//! Set randomization.
//!
//! Each set gets its own RNG. Options are shuffled through an index permutation
//! so the bank itself is never mutated and the correct answer can be traced from
//! its original position to its new letter without string comparison.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::errors::AppError;
use crate::models::question::option_letter;
use crate::models::{ExamSet, Question, SetName, ShuffledQuestion};

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derives the RNG seed for the set at `set_index` from a batch base seed.
///
/// Neighbouring indices produce unrelated streams (SplitMix64 finalizer), so
/// sets never share a random sequence.
pub fn derive_set_seed(base_seed: u64, set_index: usize) -> u64 {
    let mut z = base_seed.wrapping_add(SEED_STRIDE.wrapping_mul(set_index as u64 + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub struct ShuffleEngine<R: Rng> {
    rng: R,
}

impl ShuffleEngine<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ShuffleEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Builds one set's question list.
    ///
    /// 1. Per question: uniform permutation of the options, recording the new
    ///    letter of the original answer.
    /// 2. Uniform permutation of the question order.
    pub fn build_set(&mut self, bank: &[Question]) -> Result<Vec<ShuffledQuestion>, AppError> {
        let mut shuffled = bank
            .iter()
            .enumerate()
            .map(|(index, question)| self.shuffle_options(index, question))
            .collect::<Result<Vec<_>, _>>()?;

        shuffled.shuffle(&mut self.rng);
        Ok(shuffled)
    }

    fn shuffle_options(
        &mut self,
        original_index: usize,
        question: &Question,
    ) -> Result<ShuffledQuestion, AppError> {
        let answer_index = question.answer_index().ok_or_else(|| {
            AppError::Validation(format!(
                "questions[{original_index}]: answer '{}' is not one of the choices",
                question.answer
            ))
        })?;

        let mut order: Vec<usize> = (0..question.choices.len()).collect();
        order.shuffle(&mut self.rng);

        let new_position = order
            .iter()
            .position(|&i| i == answer_index)
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "answer index {answer_index} lost during option permutation"
                ))
            })?;

        Ok(ShuffledQuestion {
            original_index,
            text: question.question.clone(),
            shuffled_choices: order.iter().map(|&i| question.choices[i].clone()).collect(),
            correct_letter: option_letter(new_position),
        })
    }
}

/// Shuffles the bank for one named set using that set's private seed.
pub fn build_exam_set(name: SetName, bank: &[Question], seed: u64) -> Result<ExamSet, AppError> {
    let questions = ShuffleEngine::seeded(seed).build_set(bank)?;
    debug!(set = %name, seed, questions = questions.len(), "Set shuffled");
    Ok(ExamSet { name, questions })
}
