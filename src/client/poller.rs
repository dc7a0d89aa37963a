//! Client-side confirmation polling.
//!
//! The poller owns nothing global: callers hand it a [`TransactionView`] and a
//! callback, and get the view back when the poller is cancelled. Every change
//! to the view is a wholesale replacement with the server's list.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::api_client::{ClientError, StatusApi};
use crate::models::{TransactionRecord, TransactionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// One-shot user notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Writes notifications to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success | NotificationKind::Info => info!("{}", message),
            NotificationKind::Error => error!("{}", message),
        }
    }
}

/// The client's ordered copy of the server's transaction list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionView {
    transactions: Vec<TransactionRecord>,
}

impl TransactionView {
    pub fn new(transactions: Vec<TransactionRecord>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn pending(&self) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.transactions.iter().filter(|tx| tx.is_pending())
    }

    pub fn replace(&mut self, transactions: Vec<TransactionRecord>) {
        self.transactions = transactions;
    }
}

pub fn confirmation_message(tx: &TransactionRecord) -> String {
    format!("Transaction {}... confirmed!", tx.short_tx_id())
}

/// Run one polling cycle over the pending entries of `view`.
///
/// Returns the freshly fetched list when at least one pending transaction was
/// reported confirmed, `None` otherwise. Per-transaction failures are logged
/// and never stop the other checks. Every request, the refresh included, is
/// bounded by `check_timeout`.
pub async fn poll_cycle(
    api: &dyn StatusApi,
    view: &TransactionView,
    notifier: &dyn Notifier,
    check_timeout: Duration,
) -> Option<Vec<TransactionRecord>> {
    let pending: Vec<&TransactionRecord> = view.pending().collect();
    if pending.is_empty() {
        return None;
    }
    debug!("Checking {} pending transaction(s)", pending.len());

    let checks = pending.iter().map(|tx| async move {
        let result = tokio::time::timeout(check_timeout, api.check_transaction_status(&tx.tx_id))
            .await
            .unwrap_or_else(|_| Err(ClientError::Timeout(check_timeout.as_millis())));
        (*tx, result)
    });

    let mut needs_refresh = false;
    for (tx, result) in join_all(checks).await {
        match result {
            Ok(updated) if updated.status == TransactionStatus::Confirmed => {
                needs_refresh = true;
                notifier.notify(NotificationKind::Success, &confirmation_message(tx));
            }
            Ok(_) => {}
            Err(e) => warn!("Error checking confirmation for {}: {}", tx.tx_id, e),
        }
    }

    if !needs_refresh {
        return None;
    }

    let refreshed = tokio::time::timeout(check_timeout, api.fetch_all_transactions())
        .await
        .unwrap_or_else(|_| Err(ClientError::Timeout(check_timeout.as_millis())));
    match refreshed {
        Ok(fresh) => Some(fresh),
        Err(e) => {
            warn!("Failed to refresh transactions: {}", e);
            None
        }
    }
}

/// Periodic driver for [`poll_cycle`]
pub struct ConfirmationPoller {
    api: Arc<dyn StatusApi>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    check_timeout: Duration,
}

impl ConfirmationPoller {
    pub fn new(
        api: Arc<dyn StatusApi>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        check_timeout: Duration,
    ) -> Self {
        Self {
            api,
            notifier,
            interval,
            check_timeout,
        }
    }

    /// Poll until `shutdown` is cancelled, then hand the view back.
    ///
    /// Cycles never overlap: a tick that comes due while a cycle is still
    /// running is skipped. On cancellation a running cycle is left to finish
    /// on its own and its result is dropped.
    pub async fn run<F>(
        &self,
        mut view: TransactionView,
        mut on_replace: F,
        shutdown: CancellationToken,
    ) -> TransactionView
    where
        F: FnMut(&TransactionView) + Send,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick is immediate; the first cycle runs one period in
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let api = self.api.clone();
            let notifier = self.notifier.clone();
            let snapshot = view.clone();
            let check_timeout = self.check_timeout;
            let mut cycle = tokio::spawn(async move {
                poll_cycle(api.as_ref(), &snapshot, notifier.as_ref(), check_timeout).await
            });

            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Poller cancelled during a cycle, discarding its result");
                    break;
                }
                joined = &mut cycle => match joined {
                    Ok(Some(fresh)) => {
                        view.replace(fresh);
                        on_replace(&view);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Poll cycle task failed: {}", e),
                },
            }
        }

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn record(tx_id: &str, status: TransactionStatus) -> TransactionRecord {
        let mut record = TransactionRecord::pending(
            tx_id.to_string(),
            "SENDER".to_string(),
            "RECEIVER".to_string(),
            100_000,
            String::new(),
        );
        if status == TransactionStatus::Confirmed {
            record.confirm(42);
        }
        record
    }

    #[derive(Default)]
    struct MockApi {
        statuses: Mutex<HashMap<String, Result<TransactionRecord, ClientError>>>,
        list: Mutex<Option<Result<Vec<TransactionRecord>, ClientError>>>,
        delay: Mutex<Option<Duration>>,
        hang_on_fetch: AtomicBool,
        status_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockApi {
        fn set_status(&self, tx_id: &str, result: Result<TransactionRecord, ClientError>) {
            self.statuses.lock().unwrap().insert(tx_id.to_string(), result);
        }

        fn set_list(&self, result: Result<Vec<TransactionRecord>, ClientError>) {
            *self.list.lock().unwrap() = Some(result);
        }

        fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusApi for MockApi {
        async fn fetch_all_transactions(&self) -> Result<Vec<TransactionRecord>, ClientError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_on_fetch.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.list
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn check_transaction_status(
            &self,
            tx_id: &str,
        ) -> Result<TransactionRecord, ClientError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .get(tx_id)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ClientError::Http {
                        status: 404,
                        message: "Transaction not found in database".to_string(),
                    })
                })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(NotificationKind, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NotificationKind, message: &str) {
            self.messages.lock().unwrap().push((kind, message.to_string()));
        }
    }

    const CHECK_TIMEOUT: Duration = Duration::from_secs(8);

    #[tokio::test]
    async fn test_no_pending_means_no_requests() {
        let api = MockApi::default();
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![record("A", TransactionStatus::Confirmed)]);
        let empty = TransactionView::default();

        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());
        assert!(poll_cycle(&api, &empty, &notifier, CHECK_TIMEOUT).await.is_none());
        assert_eq!(api.status_calls(), 0);
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_still_refreshes() {
        let api = MockApi::default();
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![
            record("FAILINGTX", TransactionStatus::Pending),
            record("CONFIRMEDTX", TransactionStatus::Pending),
            record("STILLPENDINGTX", TransactionStatus::Pending),
        ]);
        api.set_status(
            "FAILINGTX",
            Err(ClientError::Http {
                status: 503,
                message: "unavailable".to_string(),
            }),
        );
        api.set_status(
            "CONFIRMEDTX",
            Ok(record("CONFIRMEDTX", TransactionStatus::Confirmed)),
        );
        api.set_status(
            "STILLPENDINGTX",
            Ok(record("STILLPENDINGTX", TransactionStatus::Pending)),
        );
        let fresh = vec![
            record("FAILINGTX", TransactionStatus::Pending),
            record("CONFIRMEDTX", TransactionStatus::Confirmed),
            record("STILLPENDINGTX", TransactionStatus::Pending),
        ];
        api.set_list(Ok(fresh.clone()));

        let result = poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await;

        assert_eq!(result, Some(fresh));
        assert_eq!(api.status_calls(), 3);
        assert_eq!(api.fetch_calls(), 1);
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, NotificationKind::Success);
        assert_eq!(messages[0].1, "Transaction CONFIRME... confirmed!");
    }

    #[tokio::test]
    async fn test_no_transition_no_refresh() {
        let api = MockApi::default();
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![record("A", TransactionStatus::Pending)]);
        api.set_status("A", Ok(record("A", TransactionStatus::Pending)));

        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());
        assert_eq!(api.status_calls(), 1);
        assert_eq!(api.fetch_calls(), 0);
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_view() {
        let api = MockApi::default();
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![record("A", TransactionStatus::Pending)]);
        api.set_status("A", Ok(record("A", TransactionStatus::Confirmed)));
        api.set_list(Err(ClientError::Request("connection refused".to_string())));

        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_times_out() {
        let api = MockApi::default();
        *api.delay.lock().unwrap() = Some(Duration::from_secs(60));
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![record("A", TransactionStatus::Pending)]);
        api.set_status("A", Ok(record("A", TransactionStatus::Confirmed)));

        let started = tokio::time::Instant::now();
        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_checks_run_concurrently() {
        let api = MockApi::default();
        *api.delay.lock().unwrap() = Some(Duration::from_secs(2));
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![
            record("A", TransactionStatus::Pending),
            record("B", TransactionStatus::Pending),
            record("C", TransactionStatus::Pending),
            record("D", TransactionStatus::Confirmed),
        ]);
        for tx_id in ["A", "B", "C"] {
            api.set_status(tx_id, Ok(record(tx_id, TransactionStatus::Pending)));
        }

        let started = tokio::time::Instant::now();
        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());

        assert_eq!(api.status_calls(), 3);
        assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_refresh_times_out() {
        let api = MockApi::default();
        api.hang_on_fetch.store(true, Ordering::SeqCst);
        let notifier = RecordingNotifier::default();
        let view = TransactionView::new(vec![record("A", TransactionStatus::Pending)]);
        api.set_status("A", Ok(record("A", TransactionStatus::Confirmed)));

        let started = tokio::time::Instant::now();
        assert!(poll_cycle(&api, &view, &notifier, CHECK_TIMEOUT).await.is_none());
        assert!(started.elapsed() >= CHECK_TIMEOUT);
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_refresh_does_not_stall_later_cycles() {
        let api = Arc::new(MockApi::default());
        api.hang_on_fetch.store(true, Ordering::SeqCst);
        api.set_status("A", Ok(record("A", TransactionStatus::Confirmed)));
        api.set_status("B", Ok(record("B", TransactionStatus::Pending)));
        let poller = ConfirmationPoller::new(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_secs(5),
            CHECK_TIMEOUT,
        );
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            poller
                .run(
                    TransactionView::new(vec![
                        record("A", TransactionStatus::Pending),
                        record("B", TransactionStatus::Pending),
                    ]),
                    |_: &TransactionView| {},
                    token,
                )
                .await
        });

        tokio::time::sleep(Duration::from_secs(600)).await;
        shutdown.cancel();
        let view = handle.await.unwrap();

        // Each cycle takes one period plus the refresh bound, so dozens run
        assert!(api.status_calls() > 20);
        assert!(api.fetch_calls() > 10);
        assert_eq!(view.pending().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_replaces_view_and_stops_polling_confirmed() {
        let api = Arc::new(MockApi::default());
        api.set_status("TX42", Ok(record("TX42", TransactionStatus::Confirmed)));
        api.set_list(Ok(vec![record("TX42", TransactionStatus::Confirmed)]));
        let poller = ConfirmationPoller::new(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_secs(5),
            CHECK_TIMEOUT,
        );
        let shutdown = CancellationToken::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            poller
                .run(
                    TransactionView::new(vec![record("TX42", TransactionStatus::Pending)]),
                    move |view: &TransactionView| {
                        let _ = tx.send(view.clone());
                    },
                    token,
                )
                .await
        });

        let replaced = rx.recv().await.unwrap();
        assert_eq!(replaced.transactions()[0].confirmed_round, Some(42));
        assert_eq!(replaced.pending().count(), 0);

        // Several more periods: nothing is pending, so nothing is asked
        tokio::time::sleep(Duration::from_secs(30)).await;
        shutdown.cancel();
        let view = handle.await.unwrap();

        assert_eq!(view, replaced);
        assert_eq!(api.status_calls(), 1);
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_do_not_overlap() {
        let api = Arc::new(MockApi::default());
        *api.delay.lock().unwrap() = Some(Duration::from_secs(7));
        api.set_status("SLOW", Ok(record("SLOW", TransactionStatus::Pending)));
        let poller = ConfirmationPoller::new(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_secs(5),
            Duration::from_secs(30),
        );
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            poller
                .run(
                    TransactionView::new(vec![record("SLOW", TransactionStatus::Pending)]),
                    |_: &TransactionView| {},
                    token,
                )
                .await
        });

        tokio::time::sleep(Duration::from_secs(40)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(api.status_calls() >= 2);
        assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let api = Arc::new(MockApi::default());
        let poller = ConfirmationPoller::new(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            Duration::from_secs(5),
            CHECK_TIMEOUT,
        );
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let initial = TransactionView::new(vec![record("A", TransactionStatus::Pending)]);
        let view = poller.run(initial.clone(), |_: &TransactionView| {}, shutdown).await;

        assert_eq!(view, initial);
        assert_eq!(api.status_calls(), 0);
    }
}
