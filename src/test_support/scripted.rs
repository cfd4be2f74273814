//! Scripted [`LogSource`] for exercising retry and fallback ordering.
//!
//! Each day has a queue of archive responses; the last one repeats once the
//! queue is drained. Unscripted days answer 404 from both sources.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::date_range::DaySlot;
use crate::fetch::{FetchError, HttpErrorKind, LogSource, SourceOutcome};

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Http(HttpErrorKind),
    Timeout,
    Transport,
}

impl Reply {
    fn render(&self, url: &str) -> SourceOutcome {
        match self {
            Self::Body(body) => Ok(body.clone()),
            Self::Http(kind) => Err(FetchError::http(url, *kind)),
            Self::Timeout => Err(FetchError::timeout(url)),
            Self::Transport => Err(FetchError::transport(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    archive: Mutex<HashMap<NaiveDate, VecDeque<Reply>>>,
    api: Mutex<HashMap<NaiveDate, Reply>>,
    archive_calls: AtomicUsize,
    api_calls: AtomicUsize,
}

#[allow(clippy::unwrap_used)]
impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_archive(self, day: DaySlot, reply: Reply) -> Self {
        self.archive
            .lock()
            .unwrap()
            .entry(day.date())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn archive_ok(self, day: DaySlot, body: &str) -> Self {
        self.push_archive(day, Reply::Body(body.to_string()))
    }

    pub(crate) fn archive_err(self, day: DaySlot, kind: HttpErrorKind) -> Self {
        self.push_archive(day, Reply::Http(kind))
    }

    pub(crate) fn archive_timeout(self, day: DaySlot) -> Self {
        self.push_archive(day, Reply::Timeout)
    }

    pub(crate) fn archive_transport(self, day: DaySlot) -> Self {
        self.push_archive(day, Reply::Transport)
    }

    pub(crate) fn api_ok(self, day: DaySlot, body: &str) -> Self {
        self.api
            .lock()
            .unwrap()
            .insert(day.date(), Reply::Body(body.to_string()));
        self
    }

    pub(crate) fn api_err(self, day: DaySlot, kind: HttpErrorKind) -> Self {
        self.api.lock().unwrap().insert(day.date(), Reply::Http(kind));
        self
    }

    pub(crate) fn archive_calls(&self) -> usize {
        self.archive_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.archive_calls() + self.api_calls()
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl LogSource for ScriptedSource {
    async fn fetch_archive_day(&self, day: DaySlot) -> SourceOutcome {
        self.archive_calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("scripted://archive/{day}.txt");
        let reply = {
            let mut archive = self.archive.lock().unwrap();
            match archive.get_mut(&day.date()) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        reply.unwrap_or(Reply::Http(HttpErrorKind::NotFound)).render(&url)
    }

    async fn fetch_api_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> SourceOutcome {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("scripted://api?from={start}&to={end}");
        let reply = self.api.lock().unwrap().get(&start.date_naive()).cloned();
        reply.unwrap_or(Reply::Http(HttpErrorKind::NotFound)).render(&url)
    }
}
