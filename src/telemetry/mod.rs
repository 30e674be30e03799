//! Explicit logging context passed into pipeline components.
//!
//! Components never rely on a process-wide subscriber. Each one owns a
//! [`Telemetry`] and runs its work inside [`Telemetry::scope`], which installs
//! the wrapped [`Dispatch`] for the current thread only. The default dispatch
//! discards everything.

use tracing::Dispatch;
use tracing::subscriber::NoSubscriber;

/// Handle to the `tracing` dispatcher a component should log through.
#[derive(Debug, Clone)]
pub struct Telemetry {
    dispatch: Dispatch,
}

impl Telemetry {
    /// Telemetry that discards all events.
    pub fn noop() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Telemetry that logs through `dispatch`.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Captures the dispatcher that is current on this thread (usually the
    /// global subscriber installed by a binary).
    pub fn from_global() -> Self {
        tracing::dispatcher::get_default(|dispatch| Self {
            dispatch: dispatch.clone(),
        })
    }

    /// Returns `true` if events are discarded.
    pub fn is_noop(&self) -> bool {
        self.dispatch.is::<NoSubscriber>()
    }

    /// Runs `f` with this telemetry's dispatcher installed.
    #[inline]
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Metadata, Subscriber};

    use super::Telemetry;

    /// Subscriber that only counts events.
    pub(crate) struct CountingSubscriber {
        events: Arc<AtomicUsize>,
    }

    impl Subscriber for CountingSubscriber {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _span: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _span: &Id, _values: &Record<'_>) {}

        fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

        fn event(&self, _event: &Event<'_>) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }

        fn enter(&self, _span: &Id) {}

        fn exit(&self, _span: &Id) {}
    }

    /// Returns a dispatch backed by a [`CountingSubscriber`] and its counter.
    pub(crate) fn counting_dispatch() -> (tracing::Dispatch, Arc<AtomicUsize>) {
        let events = Arc::new(AtomicUsize::new(0));
        let subscriber = CountingSubscriber {
            events: Arc::clone(&events),
        };
        (tracing::Dispatch::new(subscriber), events)
    }

    /// Returns telemetry backed by a [`CountingSubscriber`] and its counter.
    pub(crate) fn counting_telemetry() -> (Telemetry, Arc<AtomicUsize>) {
        let (dispatch, events) = counting_dispatch();
        (Telemetry::new(dispatch), events)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{counting_dispatch, counting_telemetry};
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_default_is_noop() {
        assert!(Telemetry::default().is_noop());
        assert!(Telemetry::noop().is_noop());
    }

    #[test]
    fn test_scope_routes_events_to_dispatch() {
        let (telemetry, events) = counting_telemetry();
        assert!(!telemetry.is_noop());

        telemetry.scope(|| {
            tracing::info!("first");
            tracing::warn!(value = 3, "second");
        });

        assert_eq!(events.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scope_returns_closure_value() {
        let value = Telemetry::noop().scope(|| 7 * 6);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_events_outside_scope_are_not_counted() {
        let (telemetry, events) = counting_telemetry();
        tracing::info!("outside");
        telemetry.scope(|| tracing::debug!("inside"));
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_global_captures_current_default() {
        let (dispatch, events) = counting_dispatch();
        let telemetry = tracing::dispatcher::with_default(&dispatch, Telemetry::from_global);
        assert!(!telemetry.is_noop());

        telemetry.scope(|| tracing::info!("captured"));
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_global_without_subscriber_is_noop() {
        assert!(Telemetry::from_global().is_noop());
    }
}
