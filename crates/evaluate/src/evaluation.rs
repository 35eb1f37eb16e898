//! Finished evaluation record: objective terms and top-k accuracies.

use ascent_num::Real;

/// Objective terms and top-k accuracies of one evaluation pass.
///
/// `accuracy[j]` is the fraction of recorded examples whose ground-truth
/// class ranked within the top j+1 scores, so the entries are
/// non-decreasing and `accuracy[num_classes - 1]` is 1 whenever any example
/// was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<T> {
    /// Primal objective: regularizer plus averaged primal loss.
    pub primal: T,
    /// Dual objective: averaged dual loss minus the regularizer.
    pub dual: T,
    /// Accumulated primal loss term.
    pub primal_loss: T,
    /// Accumulated dual loss term.
    pub dual_loss: T,
    /// Regularizer value shared by both objectives.
    pub regularizer: T,
    /// Top-k accuracy for every k from 1 to the number of classes.
    pub accuracy: Vec<T>,
}

impl<T: Real> Evaluation<T> {
    /// Duality gap of the pass.
    pub fn duality_gap(&self) -> T {
        self.primal - self.dual
    }

    /// Top-1 accuracy, or zero when no classes exist.
    pub fn top1_accuracy(&self) -> T {
        self.accuracy.first().copied().unwrap_or_else(T::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duality_gap() {
        let eval = Evaluation {
            primal: 1.5_f64,
            dual: 1.2,
            primal_loss: 1.0,
            dual_loss: 1.7,
            regularizer: 0.5,
            accuracy: vec![0.8, 1.0],
        };
        assert_relative_eq!(eval.duality_gap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(eval.top1_accuracy(), 0.8);
    }

    #[test]
    fn test_top1_empty() {
        let eval = Evaluation::<f64> {
            primal: 0.0,
            dual: 0.0,
            primal_loss: 0.0,
            dual_loss: 0.0,
            regularizer: 0.0,
            accuracy: vec![],
        };
        assert_eq!(eval.top1_accuracy(), 0.0);
    }
}
