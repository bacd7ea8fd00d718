//! Evaluation frequency gate.

/// How often evaluation runs, in global steps.
///
/// `EvalFrequency(0)` evaluates only at epoch boundaries. Any other value
/// evaluates at step 0, at every multiple of the frequency and at every epoch
/// end. The decision depends only on the step counter, so every worker of a
/// distributed job reaches the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalFrequency(pub u64);

impl EvalFrequency {
    /// Evaluate only when an epoch ends.
    pub const EPOCH_END: EvalFrequency = EvalFrequency(0);

    #[inline]
    pub fn should_eval(self, step: u64, epoch_end: bool) -> bool {
        if epoch_end {
            return true;
        }
        match self.0 {
            0 => false,
            freq => step == 0 || step % freq == 0,
        }
    }
}
