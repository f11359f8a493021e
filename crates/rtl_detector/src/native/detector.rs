//! Keeps a shared [`Dom`] in sync with its language.
//!
//! On start the detector waits for the document to finish loading if needed,
//! applies the current direction once, and then follows two independent
//! sources of change:
//!
//! - a mutation observer on the root element's `lang` attribute;
//! - a poll for the translation widget which, once the widget shows up,
//!   attaches a `change` listener that re-applies after the settle delay.
//!
//! When either observer falls behind the document's broadcast it treats the
//! gap as a change and recomputes.
//!
//! All work happens in tokio tasks tracked by the returned [`DetectorHandle`].

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use dom::{Dom, MutationKind, MutationObserver, MutationRecord, NodeKey, ObserverOptions, ReadyState, SharedDom};
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

use crate::classify::Direction;
use crate::config::DetectorConfig;
use crate::update::update_text_direction;

#[derive(Default)]
struct DetectorShared {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
    initialized: AtomicBool,
    polling: AtomicBool,
    widget_attached: AtomicBool,
    updates: AtomicU64,
}

/// Drives direction updates for one document.
#[derive(Clone)]
pub struct RtlDetector {
    dom: SharedDom,
    config: Arc<DetectorConfig>,
    shared: Arc<DetectorShared>,
}

/// Handle to a started detector.
#[derive(Clone)]
pub struct DetectorHandle {
    shared: Arc<DetectorShared>,
}

impl RtlDetector {
    /// # Errors
    /// Returns an error if the configuration does not validate.
    pub fn new(dom: SharedDom, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dom,
            config: Arc::new(config),
            shared: Arc::new(DetectorShared::default()),
        })
    }

    /// Start following the document. Must be called from within a tokio runtime.
    ///
    /// While the document is still loading, initialization is deferred until
    /// the end-of-document signal; otherwise it runs before this returns.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn start(self) -> Result<DetectorHandle> {
        let handle = DetectorHandle {
            shared: Arc::clone(&self.shared),
        };
        let deferred = {
            let dom = self.lock()?;
            (dom.ready_state() == ReadyState::Loading)
                .then(|| dom.observe(NodeKey::ROOT, ObserverOptions::document_ready()))
        };
        match deferred {
            Some(mut ready) => {
                debug!("document still loading; deferring direction detection");
                let detector = self.clone();
                self.spawn(async move {
                    while let Some(records) = ready.next_records().await {
                        if !detector.document_ready(&records) {
                            continue;
                        }
                        if let Err(err) = detector.initialize() {
                            warn!("direction detection failed to start: {err:#}");
                        }
                        break;
                    }
                });
            }
            None => self.initialize()?,
        }
        Ok(handle)
    }

    /// A lag record only means the signal may have been missed; the ready
    /// state decides.
    fn document_ready(&self, records: &[MutationRecord]) -> bool {
        records.iter().any(|record| match record.kind {
            MutationKind::EndOfDocument => true,
            MutationKind::Lagged { .. } => self
                .lock()
                .is_ok_and(|dom| dom.ready_state() != ReadyState::Loading),
            MutationKind::Attribute { .. } | MutationKind::Event { .. } => false,
        })
    }

    fn initialize(&self) -> Result<()> {
        let lang_observer = {
            let mut dom = self.lock()?;
            let observer = dom
                .index()
                .document_element()
                .map(|root| dom.observe(root, ObserverOptions::attributes(&["lang"])));
            self.update_locked(&mut dom);
            observer
        };
        match lang_observer {
            Some(observer) => self.spawn(self.clone().watch_language(observer)),
            None => warn!("document has no root element; lang changes will not be observed"),
        }
        self.shared.polling.store(true, Ordering::SeqCst);
        self.spawn(self.clone().poll_widget());
        self.shared.initialized.store(true, Ordering::SeqCst);
        info!("direction detection started");
        Ok(())
    }

    /// Recompute and apply the direction now.
    pub fn update(&self) -> Option<Direction> {
        match self.lock() {
            Ok(mut dom) => self.update_locked(&mut dom),
            Err(err) => {
                warn!("{err:#}");
                None
            }
        }
    }

    fn update_locked(&self, dom: &mut Dom) -> Option<Direction> {
        self.shared.updates.fetch_add(1, Ordering::SeqCst);
        match update_text_direction(dom, &self.config) {
            Ok(direction) => Some(direction),
            Err(err) => {
                warn!("direction update incomplete: {err}");
                None
            }
        }
    }

    async fn watch_language(self, mut observer: MutationObserver) {
        while let Some(records) = observer.next_records().await {
            debug!("root lang may have changed ({} records)", records.len());
            self.update();
        }
    }

    async fn poll_widget(self) {
        let period = self.config.widget_poll_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;
        loop {
            ticker.tick().await;
            attempts = attempts.saturating_add(1);
            match self.find_widget() {
                Ok(Some(listener)) => {
                    info!("translation widget found after {attempts} checks");
                    self.shared.widget_attached.store(true, Ordering::SeqCst);
                    self.spawn(self.clone().listen_widget(listener));
                    break;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("stopped looking for the translation widget: {err:#}");
                    break;
                }
            }
            if self
                .config
                .widget_poll_max_attempts
                .is_some_and(|max| attempts >= max)
            {
                debug!("translation widget not found after {attempts} checks; giving up");
                break;
            }
        }
        self.shared.polling.store(false, Ordering::SeqCst);
    }

    fn find_widget(&self) -> Result<Option<MutationObserver>> {
        let dom = self.lock()?;
        Ok(dom
            .index()
            .query_selector(&self.config.widget_selector)
            .map(|widget| dom.observe(widget, ObserverOptions::events(&["change"]))))
    }

    async fn listen_widget(self, mut listener: MutationObserver) {
        let delay = self.config.widget_settle_delay();
        while let Some(records) = listener.next_records().await {
            for _ in records {
                let detector = self.clone();
                self.spawn(async move {
                    sleep(delay).await;
                    detector.update();
                });
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        if self.shared.shut_down.load(Ordering::SeqCst) {
            handle.abort();
            return;
        }
        match self.shared.tasks.lock() {
            Ok(mut tasks) => {
                tasks.retain(|existing| !existing.is_finished());
                tasks.push(handle);
            }
            Err(_) => handle.abort(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dom>> {
        self.dom.lock().map_err(|_| anyhow!("DOM mutex poisoned"))
    }
}

impl DetectorHandle {
    /// Stop every task of the detector. Later mutations are ignored.
    pub fn shutdown(&self) {
        self.shared.shut_down.store(true, Ordering::SeqCst);
        self.shared.polling.store(false, Ordering::SeqCst);
        if let Ok(mut tasks) = self.shared.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }

    /// Whether the initial update ran (immediately, or after the document loaded).
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::SeqCst)
    }

    /// Whether the detector is still looking for the translation widget.
    pub fn is_polling(&self) -> bool {
        self.shared.polling.load(Ordering::SeqCst)
    }

    pub fn widget_attached(&self) -> bool {
        self.shared.widget_attached.load(Ordering::SeqCst)
    }

    /// Number of times the direction was recomputed.
    pub fn update_count(&self) -> u64 {
        self.shared.updates.load(Ordering::SeqCst)
    }
}
