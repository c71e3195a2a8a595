// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cooperative waiting for the object counters.
//!
//! A waiting caller suspends on the counter's release [`Notify`] and is woken by the
//! next off-ramp, so a parked task never holds a worker thread. `Notify` needs no
//! runtime driver: the same wait works on a tokio runtime with or without timers
//! and under any other executor, such as `futures::executor::block_on`.

use tokio::sync::Notify;

/// Re-evaluate `ready` after every release signalled on `releases` until it
/// returns true.
pub(crate) async fn park_until<F>(mut ready: F, releases: &Notify)
where
    F: FnMut() -> bool,
{
    loop {
        // Created before the check so a release between the check and the await is
        // still delivered.
        let released = releases.notified();
        if ready() {
            return;
        }
        released.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn waits_for_a_release_without_polling() {
        let releases = Notify::new();
        let polls = AtomicUsize::new(0);
        let open = AtomicBool::new(false);

        let waiter = park_until(
            || {
                polls.fetch_add(1, Ordering::SeqCst);
                open.load(Ordering::SeqCst)
            },
            &releases,
        );
        let releaser = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            assert_eq!(polls.load(Ordering::SeqCst), 1);
            open.store(true, Ordering::SeqCst);
            releases.notify_waiters();
        };
        tokio::join!(waiter, releaser);

        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn works_without_a_runtime() {
        let releases = Arc::new(Notify::new());
        let open = Arc::new(AtomicBool::new(false));

        let releaser = {
            let releases = releases.clone();
            let open = open.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                open.store(true, Ordering::SeqCst);
                releases.notify_waiters();
            })
        };

        futures::executor::block_on(park_until(|| open.load(Ordering::SeqCst), &releases));
        assert!(open.load(Ordering::SeqCst));
        releaser.join().unwrap();
    }
}
