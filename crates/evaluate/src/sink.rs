//! Per-pass accumulator fed by the projector output.

use ascent_num::{KahanSum, Real, Summation};
use tracing::debug;

use crate::error::EvaluateError;
use crate::evaluation::Evaluation;

/// Accumulates per-example statistics for one evaluation pass.
///
/// Each example contributes the rank of its ground-truth class (number of
/// classes scored strictly higher) to a histogram, plus primal/dual loss
/// terms folded through the accumulation policy (compensated by default;
/// objective terms are the accuracy-critical path). [`finish`] turns the
/// histogram into top-k accuracies for every k at once.
///
/// # Example
///
/// ```
/// use ascent_evaluate::EvalSink;
///
/// let mut sink = EvalSink::<f64>::begin(3).unwrap();
/// sink.record(&[0.1, 0.7, 0.2], 1, 0.3, 0.1).unwrap();
/// sink.record(&[0.5, 0.3, 0.2], 2, 0.9, 0.4).unwrap();
/// let eval = sink.finish(0.25);
///
/// assert_eq!(eval.accuracy.len(), 3);
/// assert!((eval.accuracy[0] - 0.5).abs() < 1e-12);
/// assert!((eval.accuracy[2] - 1.0).abs() < 1e-12);
/// ```
///
/// [`finish`]: EvalSink::finish
#[derive(Debug, Clone)]
pub struct EvalSink<T, S = KahanSum> {
    num_classes: usize,
    rank_counts: Vec<usize>,
    num_examples: usize,
    primal_loss: T,
    primal_comp: T,
    dual_loss: T,
    dual_comp: T,
    sum: S,
}

impl<T: Real> EvalSink<T, KahanSum> {
    /// Starts an evaluation pass over `num_classes` classes.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::NoClasses`] when `num_classes` is zero.
    pub fn begin(num_classes: usize) -> Result<Self, EvaluateError> {
        if num_classes == 0 {
            return Err(EvaluateError::NoClasses);
        }
        Ok(Self {
            num_classes,
            rank_counts: vec![0; num_classes],
            num_examples: 0,
            primal_loss: T::zero(),
            primal_comp: T::zero(),
            dual_loss: T::zero(),
            dual_comp: T::zero(),
            sum: KahanSum,
        })
    }
}

impl<T: Real, S: Summation<T>> EvalSink<T, S> {
    /// Replaces the accumulation strategy.
    pub fn with_summation<S2: Summation<T>>(self, sum: S2) -> EvalSink<T, S2> {
        EvalSink {
            num_classes: self.num_classes,
            rank_counts: self.rank_counts,
            num_examples: self.num_examples,
            primal_loss: self.primal_loss,
            primal_comp: self.primal_comp,
            dual_loss: self.dual_loss,
            dual_comp: self.dual_comp,
            sum,
        }
    }

    /// Number of classes this pass was started with.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Number of recorded examples.
    pub fn num_examples(&self) -> usize {
        self.num_examples
    }

    /// Records one example.
    ///
    /// `scores` holds the per-class predictions, `label` the ground-truth
    /// class; the loss terms come from the enclosing solver's objective.
    /// Ties count in the example's favor: only classes scored strictly
    /// higher than the ground truth worsen its rank.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::ScoresDimensionMismatch`] or
    /// [`EvaluateError::LabelOutOfRange`] on malformed input.
    pub fn record(
        &mut self,
        scores: &[T],
        label: usize,
        primal_loss: T,
        dual_loss: T,
    ) -> Result<(), EvaluateError> {
        if scores.len() != self.num_classes {
            return Err(EvaluateError::ScoresDimensionMismatch {
                scores: scores.len(),
                num_classes: self.num_classes,
            });
        }
        if label >= self.num_classes {
            return Err(EvaluateError::LabelOutOfRange {
                label,
                num_classes: self.num_classes,
            });
        }

        let target = scores[label];
        let rank = scores.iter().filter(|&&s| s > target).count();
        self.rank_counts[rank] += 1;

        self.sum
            .add(primal_loss, &mut self.primal_loss, &mut self.primal_comp);
        self.sum
            .add(dual_loss, &mut self.dual_loss, &mut self.dual_comp);
        self.num_examples += 1;
        Ok(())
    }

    /// Finalizes the pass.
    ///
    /// Prefix-sums the rank histogram into top-k accuracies scaled by
    /// `1 / num_examples`, and assembles the objective terms around the
    /// supplied regularizer value: `primal = regularizer + primal_loss`,
    /// `dual = dual_loss - regularizer`. Zero recorded examples yield
    /// all-zero accuracies.
    pub fn finish(self, regularizer: T) -> Evaluation<T> {
        let mut accuracy = Vec::with_capacity(self.num_classes);
        if self.num_examples == 0 {
            accuracy.resize(self.num_classes, T::zero());
        } else {
            let coeff = T::one() / T::of_usize(self.num_examples);
            let mut running = 0usize;
            for &count in &self.rank_counts {
                running += count;
                accuracy.push(T::of_usize(running) * coeff);
            }
        }

        let eval = Evaluation {
            primal: regularizer + self.primal_loss,
            dual: self.dual_loss - regularizer,
            primal_loss: self.primal_loss,
            dual_loss: self.dual_loss,
            regularizer,
            accuracy,
        };
        debug!(
            examples = self.num_examples,
            primal = %eval.primal,
            dual = %eval.dual,
            top1 = %eval.top1_accuracy(),
            "evaluation pass complete"
        );
        eval
    }
}
