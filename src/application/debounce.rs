use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default quiet interval before a changed input value propagates
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(300);

/// Debounces a stream of raw text into a stream of settled values
///
/// The output updates at most once per quiet interval, measured from the
/// most recent input change. A new value arriving inside the interval
/// cancels the pending emission and restarts the timer; intermediate values
/// are never emitted. The initial output equals the input's current value at
/// spawn time.
///
/// One timer task runs per controller; dropping the controller aborts it, so
/// nothing is emitted after teardown. A value still pending when the input
/// closes is discarded: nothing reaches the output without sitting out a
/// full quiet interval.
pub struct Debouncer {
    output: watch::Receiver<String>,
    timer: JoinHandle<()>,
}

impl Debouncer {
    pub fn spawn(input: watch::Receiver<String>, quiet_interval: Duration) -> Self {
        let initial = input.borrow().clone();
        let (tx, rx) = watch::channel(initial);
        let timer = tokio::spawn(run_timer(input, tx, quiet_interval));

        Self { output: rx, timer }
    }

    /// A receiver for the debounced values
    pub fn output(&self) -> watch::Receiver<String> {
        self.output.clone()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

async fn run_timer(
    mut input: watch::Receiver<String>,
    tx: watch::Sender<String>,
    quiet_interval: Duration,
) {
    loop {
        if input.changed().await.is_err() {
            return;
        }
        input.borrow_and_update();

        // Input is dirty; emit once it stays quiet for a full interval.
        loop {
            let sleep = tokio::time::sleep(quiet_interval);
            tokio::pin!(sleep);

            tokio::select! {
                _ = &mut sleep => {
                    let latest = input.borrow().clone();
                    if tx.send(latest).is_err() {
                        return;
                    }
                    break;
                }
                changed = input.changed() => {
                    // A value still pending when the input closes is
                    // discarded; it never sat out a full quiet interval.
                    if changed.is_err() {
                        return;
                    }
                    // Superseded before the interval elapsed; restart it.
                    input.borrow_and_update();
                }
            }
        }
    }
}
