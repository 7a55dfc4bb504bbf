use crate::error::Result;
use eyre::bail;

/// The CPU-visible side of a GPU fence on a command queue.
pub trait GpuFence {
    /// Enqueues a signal of `value` on the queue.
    fn signal(&self, value: u64) -> Result<()>;

    /// Highest value the GPU has reached so far.
    fn completed_value(&self) -> u64;

    /// Blocks the calling thread until the GPU reaches `value`.
    fn wait_for(&self, value: u64) -> Result<()>;
}

/// A fence together with the last value signaled on it.
pub struct FrameFence<F> {
    fence: F,
    value: u64,
}

impl<F: GpuFence> FrameFence<F> {
    pub fn new(fence: F) -> Self {
        Self { fence, value: 0 }
    }

    /// Last value signaled by [`FrameFence::flush`].
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn inner(&self) -> &F {
        &self.fence
    }

    /// Signals the next value and waits until the GPU has passed it.
    ///
    /// This is a full pipeline stall: every command submitted before the call has finished
    /// when it returns.
    pub fn flush(&mut self) -> Result<u64> {
        self.value += 1;
        self.fence.signal(self.value)?;

        if self.fence.completed_value() < self.value {
            self.fence.wait_for(self.value)?;
            let completed = self.fence.completed_value();
            if completed < self.value {
                bail!(
                    "fence wait returned at {completed} before reaching {}",
                    self.value
                );
            }
        }
        Ok(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Completes a signal either as soon as it is enqueued or only once someone waits on it.
    struct SimulatedFence {
        immediate: bool,
        signaled: Cell<u64>,
        completed: Cell<u64>,
        waits: Cell<u32>,
    }

    impl SimulatedFence {
        fn new(immediate: bool) -> Self {
            Self {
                immediate,
                signaled: Cell::new(0),
                completed: Cell::new(0),
                waits: Cell::new(0),
            }
        }
    }

    impl GpuFence for SimulatedFence {
        fn signal(&self, value: u64) -> Result<()> {
            self.signaled.set(value);
            if self.immediate {
                self.completed.set(value);
            }
            Ok(())
        }

        fn completed_value(&self) -> u64 {
            self.completed.get()
        }

        fn wait_for(&self, value: u64) -> Result<()> {
            self.waits.set(self.waits.get() + 1);
            assert!(self.signaled.get() >= value, "waiting on a value never signaled");
            self.completed.set(self.signaled.get());
            Ok(())
        }
    }

    #[test]
    fn flush_returns_only_after_the_signaled_value_completes() {
        let mut fence = FrameFence::new(SimulatedFence::new(false));

        for expected in 1..=3 {
            let value = fence.flush().unwrap();
            assert_eq!(value, expected);
            assert!(fence.inner().completed_value() >= value);
        }
        assert_eq!(fence.inner().waits.get(), 3);
    }

    #[test]
    fn flush_does_not_wait_when_the_fence_is_already_complete() {
        let mut fence = FrameFence::new(SimulatedFence::new(true));

        fence.flush().unwrap();
        fence.flush().unwrap();

        assert_eq!(fence.value(), 2);
        assert_eq!(fence.inner().waits.get(), 0);
    }

    #[test]
    fn wait_that_leaves_the_fence_behind_is_an_error() {
        struct Stalled;
        impl GpuFence for Stalled {
            fn signal(&self, _value: u64) -> Result<()> {
                Ok(())
            }
            fn completed_value(&self) -> u64 {
                0
            }
            fn wait_for(&self, _value: u64) -> Result<()> {
                Ok(())
            }
        }

        let mut fence = FrameFence::new(Stalled);
        let error = fence.flush().unwrap_err();
        assert_eq!(error.to_string(), "fence wait returned at 0 before reaching 1");
    }

    #[test]
    fn failed_signal_is_reported() {
        struct Lost;
        impl GpuFence for Lost {
            fn signal(&self, _value: u64) -> Result<()> {
                Err(eyre::eyre!("device removed"))
            }
            fn completed_value(&self) -> u64 {
                0
            }
            fn wait_for(&self, _value: u64) -> Result<()> {
                unreachable!("no wait after a failed signal")
            }
        }

        let mut fence = FrameFence::new(Lost);
        assert!(fence.flush().is_err());
    }
}
