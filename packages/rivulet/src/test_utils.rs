//! Testing utilities shared by the unit tests in this crate.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::Event;

/// Records every event delivered to a subscriber, for later inspection.
#[derive(Debug)]
pub(crate) struct EventLog<T> {
    entries: Arc<Mutex<Vec<Event<T>>>>,
}

impl<T> EventLog<T>
where
    T: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A subscriber callback that appends to this log.
    pub(crate) fn sink(&self) -> impl Fn(Event<T>) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        move |event| entries.lock().push(event)
    }

    pub(crate) fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn failures(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Failed(error) => Some(error.to_string()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn completions(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|event| matches!(event, Event::Completed))
            .count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T> Clone for EventLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}
