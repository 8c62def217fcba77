// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user serialization of cascade runs.
//!
//! Two cascades for the same user must not interleave their month-by-month
//! writes; cascades for different users never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;

static USER_LOCKS: Lazy<Mutex<HashMap<i64, Arc<Mutex<()>>>>> = Lazy::new(Default::default);

fn lock_for(user_id: i64) -> Arc<Mutex<()>> {
    let mut map = USER_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(map.entry(user_id).or_default())
}

/// Runs `f` while holding `user_id`'s cascade lock. Not reentrant.
pub fn with_user_lock<T>(user_id: i64, f: impl FnOnce() -> T) -> T {
    let lock = lock_for(user_id);
    // The lock guards no data, so a panic in another holder leaves nothing to repair.
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_user_runs_are_never_concurrent() {
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    with_user_lock(9_001, || {
                        let n = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(n, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_users_do_not_share_a_lock() {
        let a = lock_for(1_001);
        let b = lock_for(1_002);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &lock_for(1_001)));
    }
}
