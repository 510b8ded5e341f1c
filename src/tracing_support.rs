//! Span timing for tests and benchmarks.
//!
//! The algorithms always emit `tracing` spans and events.  With the
//! `tracing` feature enabled, [`init_tracing`] installs a subscriber that
//! totals the time spent in every span per thread, and optionally prints
//! events when `GRAPHFLOW_LOG` names a level (`trace`, `debug`, ...).
//! Without the feature every function here is a no-op.

#[cfg(feature = "tracing")]
mod enabled {
    use std::{
        cell::RefCell,
        collections::{BTreeMap, HashMap},
        sync::Once,
        time::{Duration, Instant},
    };

    use tracing_subscriber::{
        Layer, Registry, filter::LevelFilter, fmt, layer::Context, layer::SubscriberExt,
        registry::LookupSpan, util::SubscriberInitExt,
    };

    type ScopeTotals = BTreeMap<&'static str, (Duration, usize)>;

    thread_local! {
        static SPAN_TOTALS: RefCell<HashMap<TimingScope, ScopeTotals>> =
            RefCell::new(HashMap::new());
        static TIMING_SCOPE: RefCell<TimingScope> = const { RefCell::new(TimingScope::Test) };
    }

    /// Bucket that closed spans are charged to.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum TimingScope {
        Test,
        Invariants,
    }

    pub struct TimingScopeGuard {
        previous: TimingScope,
    }

    impl Drop for TimingScopeGuard {
        fn drop(&mut self) {
            TIMING_SCOPE.with(|scope| {
                *scope.borrow_mut() = self.previous;
            });
        }
    }

    /// Charges spans closed on this thread to `scope` until the guard drops.
    pub fn set_timing_scope(scope: TimingScope) -> TimingScopeGuard {
        let previous = TIMING_SCOPE.with(|current| current.replace(scope));
        TimingScopeGuard { previous }
    }

    struct TimingLayer;

    impl<S> Layer<S> for TimingLayer
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            _attrs: &tracing::span::Attributes<'_>,
            id: &tracing::Id,
            ctx: Context<'_, S>,
        ) {
            if let Some(span) = ctx.span(id) {
                span.extensions_mut().insert(Instant::now());
            }
        }

        fn on_close(&self, id: tracing::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let name = span.metadata().name();
            let Some(start) = span.extensions().get::<Instant>().copied() else {
                return;
            };
            let scope = TIMING_SCOPE.with(|scope| *scope.borrow());
            SPAN_TOTALS.with(|totals| {
                let mut totals = totals.borrow_mut();
                let entry = totals
                    .entry(scope)
                    .or_default()
                    .entry(name)
                    .or_insert((Duration::ZERO, 0));
                entry.0 += start.elapsed();
                entry.1 += 1;
            });
        }
    }

    /// Installs the global subscriber once per process.
    pub fn init_tracing() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let log = std::env::var("GRAPHFLOW_LOG")
                .ok()
                .and_then(|level| level.parse::<LevelFilter>().ok())
                .map(|level| fmt::layer().with_test_writer().with_filter(level));
            let _ = Registry::default().with(TimingLayer).with(log).try_init();
        });
    }

    /// Gets the number of closed spans named `name` in `scope` on this
    /// thread since the last reset.
    pub fn span_count(scope: TimingScope, name: &str) -> usize {
        SPAN_TOTALS.with(|totals| {
            totals
                .borrow()
                .get(&scope)
                .and_then(|entries| entries.get(name))
                .map_or(0, |(_, count)| *count)
        })
    }

    #[doc(hidden)]
    pub fn dump_span_timings() {
        dump_scope_timings(TimingScope::Test);
        dump_scope_timings(TimingScope::Invariants);
    }

    #[doc(hidden)]
    pub fn reset_span_timings() {
        init_tracing();
        SPAN_TOTALS.with(|totals| totals.borrow_mut().clear());
    }

    fn dump_scope_timings(scope: TimingScope) {
        SPAN_TOTALS.with(|totals| {
            let totals = totals.borrow();
            eprintln!("{scope:?} timings (desc):");
            let Some(entries) = totals.get(&scope) else {
                return;
            };
            let mut entries: Vec<_> = entries.iter().collect();
            entries.sort_by(|a, b| b.1.0.cmp(&a.1.0));
            for (name, (duration, count)) in entries {
                eprintln!("  {name}: {:?} ({}x)", duration, count);
            }
        });
    }
}

#[cfg(not(feature = "tracing"))]
mod disabled {
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum TimingScope {
        Test,
        Invariants,
    }

    pub struct TimingScopeGuard;

    pub fn set_timing_scope(_scope: TimingScope) -> TimingScopeGuard {
        TimingScopeGuard
    }

    pub fn init_tracing() {}

    pub fn span_count(_scope: TimingScope, _name: &str) -> usize {
        0
    }

    #[doc(hidden)]
    pub fn dump_span_timings() {}

    #[doc(hidden)]
    pub fn reset_span_timings() {}
}

#[cfg(feature = "tracing")]
pub use enabled::*;

#[cfg(not(feature = "tracing"))]
pub use disabled::*;
