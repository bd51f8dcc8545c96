//! Transfer progress accounting for artifact uploads.

/// Running byte counter for a single transfer.
///
/// `advance` never moves backwards and never reports more than the total,
/// whatever the caller feeds it.
#[derive(Debug, Clone, Copy)]
pub struct TransferProgress {
    done: u64,
    total: u64,
}

impl TransferProgress {
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self { done: 0, total }
    }

    /// Record `bytes` more transferred. Returns `(done, total)`.
    pub fn advance(&mut self, bytes: u64) -> (u64, u64) {
        self.done = self.done.saturating_add(bytes).min(self.total);
        (self.done, self.total)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::TransferProgress;

    proptest! {
        #[test]
        fn advance_is_monotonic_and_capped(
            total in 0u64..(1 << 40),
            chunks in proptest::collection::vec(0u64..(1 << 32), 0..64),
        ) {
            let mut progress = TransferProgress::new(total);
            let mut previous = 0;
            for chunk in chunks {
                let (done, reported_total) = progress.advance(chunk);
                prop_assert_eq!(reported_total, total);
                prop_assert!(done >= previous);
                prop_assert!(done <= total);
                previous = done;
            }
        }
    }
}
