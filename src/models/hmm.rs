use std::io;

use crate::lang::{TagId, WordId};
use crate::tensor::Tensor;

/// First-order hidden Markov model over discrete observations.
///
/// Cells hold raw counts until [`normalize`] turns both tensors into
/// log-space distributions; decoding is exact Viterbi. A reserved service
/// state brackets every sequence, standing in for both "before the first
/// token" and "after the last token".
///
/// References:
/// - https://ieeexplore.ieee.org/document/18626
///
/// [`normalize`]: #method.normalize
#[derive(Debug, Clone, PartialEq)]
pub struct HMM {
    transition: Tensor<f32, TagId, 2>,
    emission: Tensor<f32, WordId, 2>,
}

impl Default for HMM {
    fn default() -> Self {
        HMM {
            transition: Tensor::new(0.0, [0, 0]),
            emission: Tensor::new(0.0, [0, 0]),
        }
    }
}

impl HMM {
    pub fn new(num_states: TagId, num_observations: WordId) -> Self {
        HMM {
            transition: Tensor::new(0.0, [num_states, num_states]),
            emission: Tensor::new(0.0, [num_states as WordId, num_observations]),
        }
    }

    /// Reshapes the model and zeroes every count.
    pub fn resize(&mut self, num_states: TagId, num_observations: WordId) {
        self.transition.resize(0.0, [num_states, num_states]);
        self.emission.resize(0.0, [num_states as WordId, num_observations]);
    }

    #[inline]
    pub fn num_states(&self) -> TagId {
        self.transition.size_at(0)
    }

    #[inline]
    pub fn num_observations(&self) -> WordId {
        self.emission.size_at(1)
    }

    #[inline]
    pub fn transitions(&self) -> &Tensor<f32, TagId, 2> {
        &self.transition
    }

    #[inline]
    pub fn emissions(&self) -> &Tensor<f32, WordId, 2> {
        &self.emission
    }

    pub fn add_transition(&mut self, src: TagId, dest: TagId) {
        *self.transition.at_mut([src, dest]) += 1.0;
    }

    pub fn add_emission(&mut self, state: TagId, observation: WordId) {
        *self.emission.at_mut([state as WordId, observation]) += 1.0;
    }

    /// Counts one `(state, observation)` sequence bracketed by the service
    /// state on both ends; the service state emits `service_word` once per
    /// sequence. Empty sequences are skipped.
    pub fn train_sentence(
        &mut self,
        service_state: TagId,
        service_word: WordId,
        pairs: &[(TagId, WordId)],
    ) {
        if pairs.is_empty() {
            return;
        }
        self.add_transition(service_state, pairs[0].0);
        self.add_emission(pairs[0].0, pairs[0].1);
        for w in pairs.windows(2) {
            self.add_transition(w[0].0, w[1].0);
            self.add_emission(w[1].0, w[1].1);
        }
        self.add_transition(pairs[pairs.len() - 1].0, service_state);
        self.add_emission(service_state, service_word);
    }

    /// Turns the counts into smoothed log distributions, grouped by source
    /// state for transitions and by state for emissions.
    pub fn normalize(&mut self, smoothing: f32) {
        self.transition.normalize_log(smoothing, 0);
        self.emission.normalize_log(smoothing, 0);
    }

    /// Decodes the most likely state sequence for `observations`.
    ///
    /// Viterbi over the full lattice; ties keep the lowest state index.
    /// The sequence is assumed to start from and return to the service
    /// state. An empty input decodes to an empty output.
    pub fn predict(&self, service_state: TagId, observations: &[WordId]) -> Vec<TagId> {
        if observations.is_empty() {
            return Vec::new();
        }
        let num_states = self.transition.size_at(0) as usize;
        let len = observations.len();
        let mut prob: Tensor<f32, usize, 2> =
            Tensor::new(f32::NEG_INFINITY, [len, num_states]);
        let mut prev: Tensor<TagId, usize, 2> = Tensor::new(0, [len, num_states]);

        for to in 0..num_states {
            let t = to as TagId;
            *prob.at_mut([0, to]) = *self.transition.at([service_state, t])
                + *self.emission.at([t as WordId, observations[0]]);
        }
        for i in 1..len {
            for to in 0..num_states {
                for from in 0..num_states {
                    let p = *prob.at([i - 1, from])
                        + *self.transition.at([from as TagId, to as TagId])
                        + *self.emission.at([to as WordId, observations[i]]);
                    if p > *prob.at([i, to]) {
                        *prob.at_mut([i, to]) = p;
                        *prev.at_mut([i, to]) = from as TagId;
                    }
                }
            }
        }

        let mut result = vec![0 as TagId; len];
        result[len - 1] = service_state;
        let mut best = f32::NEG_INFINITY;
        for from in 0..num_states {
            let p = *prob.at([len - 1, from])
                + *self.transition.at([from as TagId, service_state]);
            if p > best {
                best = p;
                result[len - 1] = from as TagId;
            }
        }
        for i in (1..len).rev() {
            result[i - 1] = *prev.at([i, result[i] as usize]);
        }
        result
    }

    /// Writes the transition and emission tensors back-to-back.
    pub fn save_binary<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.transition.save_binary(writer)?;
        self.emission.save_binary(writer)
    }

    /// Reads the two tensors back-to-back, replacing the model.
    pub fn load_binary<R: io::Read>(&mut self, reader: &mut R) -> io::Result<()> {
        self.transition.load_binary(reader)?;
        self.emission.load_binary(reader)
    }
}
