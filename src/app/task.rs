// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned by message handlers
//!
//! A [`Task`] is a batch of futures. Each future resolves to an optional
//! follow-up [`Message`] that the [`Runtime`](super::runtime::Runtime) feeds
//! back into [`CameraController::update`](super::CameraController::update).

use crate::app::state::Message;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::time::Duration;

/// Work produced by a handler
#[must_use = "tasks do nothing unless handed to the runtime"]
pub struct Task {
    futures: Vec<BoxFuture<'static, Option<Message>>>,
}

impl Task {
    /// No follow-up work
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Deliver `message` on the next runtime turn
    pub fn done(message: Message) -> Self {
        Self::future(async move { message })
    }

    /// Run `future` and deliver the message it resolves to
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Message> + Send + 'static,
    {
        Self {
            futures: vec![future.map(Some).boxed()],
        }
    }

    /// Run `future` and map its output to a message
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Message + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Self::future(future.map(map))
    }

    /// Run `future` for its side effects only
    pub fn discard<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            futures: vec![future.map(|()| None).boxed()],
        }
    }

    /// Deliver `message` after `duration`
    pub fn delay(duration: Duration, message: Message) -> Self {
        Self::future(async move {
            tokio::time::sleep(duration).await;
            message
        })
    }

    /// Combine several tasks into one
    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub(crate) fn into_futures(self) -> Vec<BoxFuture<'static, Option<Message>>> {
        self.futures
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_flattens() {
        let task = Task::batch([
            Task::none(),
            Task::done(Message::ToggleMenu),
            Task::batch([Task::done(Message::ToggleMenu), Task::discard(async {})]),
        ]);
        assert_eq!(task.len(), 3);
        assert!(Task::none().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_waits_on_virtual_time() {
        let start = tokio::time::Instant::now();
        let mut futures = Task::delay(Duration::from_millis(250), Message::ToggleMenu).into_futures();
        let message = futures.remove(0).await;
        assert!(matches!(message, Some(Message::ToggleMenu)));
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
