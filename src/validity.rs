use crossbeam_utils::atomic::AtomicCell;

/// Monotone three-state cache: `unchecked -> {valid, invalid}`, never reverts.
///
/// Concurrent callers may race to resolve an `unchecked` cache; the compute
/// closure is allowed to run more than once in that case since it is
/// idempotent, and the cache just settles on whichever deterministic answer
/// lands last.
#[derive(Debug, Default)]
pub(crate) struct ValidityCache(AtomicCell<Option<bool>>);

impl ValidityCache {
    pub(crate) fn get_or_init(&self, compute: impl FnOnce() -> bool) -> bool {
        match self.0.load() {
            Some(result) => result,
            None => {
                let result = compute();
                self.0.store(Some(result));
                result
            }
        }
    }
}
