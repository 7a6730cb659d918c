use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write;
use std::io::{stdout, Write as IoWrite};
use std::num::NonZeroU64;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use thread_local::ThreadLocal;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_core::Interest;

struct SpanInfo {
    depth: usize,
    handles: usize,
    metadata: &'static Metadata<'static>,
    description: String
}

///
/// A simple [`Subscriber`] that prints the progress of the algorithms of this crate to stdout.
///
/// Spans up to depth `max_depth` are printed when they are entered and exited, together with
/// the time they took. Events are printed, indented according to the depth of the span they
/// occur in, as long as this depth does not exceed `max_depth`.
///
pub struct LogAlgorithmSubscriber {
    next_id: AtomicU64,
    spans: Mutex<HashMap<Id, SpanInfo>>,
    entered: ThreadLocal<RefCell<Vec<(Id, Instant)>>>,
    levels: RangeInclusive<Level>,
    max_depth: usize
}

impl LogAlgorithmSubscriber {

    fn new(levels: RangeInclusive<Level>, max_depth: usize) -> Self {
        LogAlgorithmSubscriber {
            next_id: AtomicU64::new(1),
            spans: Mutex::new(HashMap::new()),
            entered: ThreadLocal::new(),
            levels: levels,
            max_depth: max_depth
        }
    }

    ///
    /// Installs the subscriber as global default. Panics if there already is a global default.
    ///
    pub fn init(levels: RangeInclusive<Level>, max_depth: usize) {
        tracing::subscriber::set_global_default(Self::new(levels, max_depth)).unwrap()
    }

    ///
    /// Installs the subscriber for tests, unless another test has already installed one.
    ///
    pub fn init_test() {
        _ = tracing::subscriber::set_global_default(Self::new(Level::INFO..=Level::INFO, 2));
    }

    fn spans<'a>(&'a self) -> MutexGuard<'a, HashMap<Id, SpanInfo>> {
        self.spans.lock().unwrap()
    }

    fn entered_stack(&self) -> &RefCell<Vec<(Id, Instant)>> {
        self.entered.get_or(|| RefCell::new(Vec::new()))
    }

    fn current_depth(&self) -> usize {
        let stack = self.entered_stack().borrow();
        match stack.last() {
            Some((id, _)) => self.spans().get(id).map(|span| span.depth + 1).unwrap_or(0),
            None => 0
        }
    }

    fn print_line(depth: usize, line: &str) {
        let mut out = stdout().lock();
        _ = writeln!(out, "{:width$}{}", "", line, width = 2 * depth);
        _ = out.flush();
    }
}

struct FieldRecorder {
    message: Option<String>,
    fields: String
}

impl FieldRecorder {

    fn new() -> Self {
        FieldRecorder { message: None, fields: String::new() }
    }

    fn finish(self, name: &str) -> String {
        let mut result = self.message.unwrap_or_else(|| name.to_owned());
        if !self.fields.is_empty() {
            _ = write!(&mut result, "({})", self.fields);
        }
        return result;
    }
}

impl Visit for FieldRecorder {

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            if !self.fields.is_empty() {
                self.fields.push_str(", ");
            }
            _ = write!(&mut self.fields, "{}={:?}", field.name(), value);
        }
    }
}

impl Subscriber for LogAlgorithmSubscriber {

    fn register_callsite(&self, metadata: &'static Metadata<'static>) -> Interest {
        if metadata.is_span() || self.levels.contains(metadata.level()) {
            Interest::always()
        } else {
            Interest::never()
        }
    }

    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_span() || self.levels.contains(metadata.level())
    }

    fn current_span(&self) -> tracing_core::span::Current {
        let stack = self.entered_stack().borrow();
        match stack.last() {
            Some((id, _)) => match self.spans().get(id) {
                Some(span) => tracing_core::span::Current::new(id.clone(), span.metadata),
                None => tracing_core::span::Current::none()
            },
            None => tracing_core::span::Current::none()
        }
    }

    fn new_span(&self, attributes: &Attributes<'_>) -> Id {
        let id = Id::from_non_zero_u64(NonZeroU64::new(self.next_id.fetch_add(1, Ordering::Relaxed)).unwrap());
        let parent = attributes.parent().cloned().or_else(|| self.entered_stack().borrow().last().map(|(id, _)| id.clone()));
        let mut description = FieldRecorder::new();
        attributes.record(&mut description);
        let mut spans = self.spans();
        let depth = parent.as_ref().and_then(|parent| spans.get(parent)).map(|span| span.depth + 1).unwrap_or(0);
        spans.insert(id.clone(), SpanInfo {
            depth: depth,
            handles: 1,
            metadata: attributes.metadata(),
            description: description.finish(attributes.metadata().name())
        });
        return id;
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let depth = self.current_depth();
        if depth <= self.max_depth {
            let mut recorder = FieldRecorder::new();
            event.record(&mut recorder);
            Self::print_line(depth, &recorder.finish("event"));
        }
    }

    fn enter(&self, span: &Id) {
        if let Some(info) = self.spans().get(span) {
            if info.depth < self.max_depth {
                Self::print_line(info.depth, &info.description);
            }
        }
        self.entered_stack().borrow_mut().push((span.clone(), Instant::now()));
    }

    fn exit(&self, span: &Id) {
        let mut stack = self.entered_stack().borrow_mut();
        let position = stack.iter().rposition(|(id, _)| id == span);
        let removed = position.map(|i| stack.remove(i));
        drop(stack);
        if let Some((_, start)) = removed {
            if let Some(info) = self.spans().get(span) {
                if info.depth < self.max_depth {
                    Self::print_line(info.depth, &format!("{} done ({}us)", info.metadata.name(), start.elapsed().as_micros()));
                }
            }
        }
    }

    fn clone_span(&self, id: &Id) -> Id {
        if let Some(info) = self.spans().get_mut(id) {
            info.handles += 1;
        }
        return id.clone();
    }

    fn try_close(&self, id: Id) -> bool {
        let mut spans = self.spans();
        let closed = match spans.get_mut(&id) {
            Some(info) => {
                info.handles -= 1;
                info.handles == 0
            },
            None => false
        };
        if closed {
            spans.remove(&id);
        }
        return closed;
    }
}

#[cfg(test)]
use tracing::{event, instrument};

#[cfg(test)]
#[instrument(skip_all, level = "trace")]
fn traced_sum(values: &[i64]) -> i64 {
    let result: i64 = values.iter().sum();
    event!(Level::INFO, len = values.len(), result = result);
    return result;
}

#[test]
fn test_field_recorder() {
    let recorder = FieldRecorder { message: None, fields: "rank=3, rounds=2".to_owned() };
    assert_eq!("calculate_rank(rank=3, rounds=2)", recorder.finish("calculate_rank"));
    let recorder = FieldRecorder { message: Some("done".to_owned()), fields: String::new() };
    assert_eq!("done", recorder.finish("calculate_rank"));
}

#[test]
fn test_subscriber_tracks_spans() {
    let subscriber = LogAlgorithmSubscriber::new(Level::INFO..=Level::INFO, 1);
    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(6, traced_sum(&[1, 2, 3]));
        assert_eq!(0, traced_sum(&[]));
    });
}

#[test]
fn test_current_span() {
    let subscriber = LogAlgorithmSubscriber::new(Level::INFO..=Level::INFO, 0);
    tracing::subscriber::with_default(subscriber, || {
        assert!(tracing::Span::current().is_none());
        let span = tracing::span!(Level::TRACE, "outer");
        let _guard = span.enter();
        assert_eq!(Some("outer"), tracing::Span::current().metadata().map(|metadata| metadata.name()));
    });
}
