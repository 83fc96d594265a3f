use arc_swap::ArcSwapOption;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering},
        Arc,
    },
};

use crate::{
    utils::{
        call,
        tracing::{debug, trace},
    },
    Error, Message, Sink,
};

/// Per-sink delivery state of a demand-driven source.
///
/// Created once per handshake. The sink drives it through its talkback with
/// [`Message::Request`] and [`Message::Terminate`]; it answers with [`Message::Data`] and at most
/// one terminal [`Message::Terminate`] or [`Message::Error`].
///
/// Delivery happens synchronously inside [`request`](Subscription::request). Whoever moves the
/// outstanding demand away from zero owns the drain loop until the demand is back at zero, so a
/// sink requesting more from inside its own `Data` handler only deposits demand and never
/// recurses.
pub(crate) struct Subscription<T> {
    items: Arc<[Option<T>]>,
    sink: ArcSwapOption<Sink<T>>,
    /// Only written by the drain owner.
    cursor: AtomicUsize,
    /// Outstanding demand, saturating at `u64::MAX`.
    requested: AtomicU64,
    /// Set on cancellation and on either terminal signal.
    cancelled: AtomicBool,
    /// Failure waiting for the drain owner to deliver it.
    error: ArcSwapOption<Error>,
}

impl<
        #[cfg(not(feature = "tracing"))] T: 'static,
        #[cfg(feature = "tracing")] T: fmt::Debug + 'static,
    > Subscription<T>
where
    T: Clone + Send + Sync,
{
    pub(crate) fn new(items: Arc<[Option<T>]>, sink: Arc<Sink<T>>) -> Self {
        Subscription {
            items,
            sink: ArcSwapOption::from(Some(sink)),
            cursor: AtomicUsize::new(0),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            error: ArcSwapOption::from(None),
        }
    }

    /// Adds `n` to the outstanding demand and, unless a drain is already running, delivers items
    /// until the demand or the source is exhausted.
    ///
    /// A non-positive `n` cancels the subscription and sends [`Error::InvalidDemand`] to the sink.
    /// Does nothing once cancelled or terminated.
    pub(crate) fn request(&self, n: i64) {
        if self.is_cancelled() {
            trace!("request({n}) ignored: subscription is over");
            return;
        }

        let n = match u64::try_from(n) {
            Ok(n) if n > 0 => n,
            _ => {
                self.fail(Error::InvalidDemand { requested: n });
                return;
            },
        };

        let previous = self.deposit(n);
        if previous != 0 {
            trace!("request({n}) deposited onto {previous} outstanding");
            return;
        }

        self.drain();
    }

    /// Stops delivery. Observed by a running drain before its next item; sends nothing.
    pub(crate) fn cancel(&self) {
        if !self.cancelled.swap(true, AtomicOrdering::AcqRel) {
            trace!("cancelled at index {}", self.cursor.load(AtomicOrdering::Relaxed));
        }
        self.sink.store(None);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }

    /// Returns the demand outstanding before `n` was added.
    fn deposit(&self, n: u64) -> u64 {
        let (Ok(previous) | Err(previous)) = self.requested.fetch_update(
            AtomicOrdering::AcqRel,
            AtomicOrdering::Acquire,
            |requested| Some(requested.saturating_add(n)),
        );
        previous
    }

    /// Only the drain owner sends terminal signals. A failure raised by anyone else is parked
    /// and a unit of demand deposited, so the owner (or this caller, if it becomes the owner)
    /// picks it up at its next iteration boundary.
    fn fail(&self, error: Error) {
        if self.error.load().is_none() {
            self.error.store(Some(Arc::new(error)));
        }
        if self.deposit(1) != 0 {
            trace!("{error} parked for the running drain");
            return;
        }
        self.drain();
    }

    /// Checked by the drain owner before every delivery and before giving up ownership.
    fn is_over(&self) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.error.swap(None) {
            Some(error) => {
                self.emit_error(*error);
                true
            },
            None => false,
        }
    }

    fn drain(&self) {
        let mut demand = self.requested.load(AtomicOrdering::Acquire);
        let mut sent = 0;
        loop {
            while sent < demand {
                if self.is_over() {
                    return;
                }
                let index = self.cursor.load(AtomicOrdering::Relaxed);
                let item = match self.items.get(index) {
                    Some(Some(item)) => item,
                    Some(None) => {
                        self.emit_error(Error::NullElement { index });
                        return;
                    },
                    None => break,
                };
                self.cursor.store(index + 1, AtomicOrdering::Relaxed);
                sent += 1;
                let sink = self.sink.load();
                if let Some(sink) = sink.as_ref() {
                    call!(sink, Message::Data(item.clone()), "to sink: {message:?}");
                }
            }

            if self.is_over() {
                return;
            }
            if self.cursor.load(AtomicOrdering::Relaxed) == self.items.len() {
                self.complete();
                return;
            }

            // Demand deposited by the sink while we were delivering keeps this loop going.
            demand = self.requested.fetch_sub(sent, AtomicOrdering::AcqRel) - sent;
            sent = 0;
            if demand == 0 {
                return;
            }
        }
    }

    fn complete(&self) {
        if self.cancelled.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        if let Some(sink) = self.sink.swap(None) {
            call!(sink, Message::Terminate, "to sink: {message:?}");
        }
    }

    fn emit_error(&self, error: Error) {
        if self.cancelled.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        debug!(error = error.as_label(), "{error}");
        if let Some(sink) = self.sink.swap(None) {
            call!(sink, Message::Error(Arc::new(error)), "to sink: {message:?}");
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("len", &self.items.len())
            .field("cursor", &self.cursor.load(AtomicOrdering::Relaxed))
            .field("requested", &self.requested.load(AtomicOrdering::Relaxed))
            .field("cancelled", &self.cancelled.load(AtomicOrdering::Relaxed))
            .field("error", &self.error.load().as_deref().copied())
            .finish()
    }
}
