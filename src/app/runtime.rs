// SPDX-License-Identifier: GPL-3.0-only

//! Cooperative event loop
//!
//! Owns the controller and every outstanding task future. Futures resolve
//! one at a time and their messages go back through
//! [`CameraController::update`], so handlers never run concurrently.

use crate::app::state::{CameraController, Message};
use tracing::{info, warn};
use crate::app::task::Task;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tokio::time::Instant;

pub struct Runtime {
    controller: CameraController,
    pending: FuturesUnordered<BoxFuture<'static, Option<Message>>>,
}

impl Runtime {
    pub fn new(controller: CameraController) -> Self {
        Self {
            controller,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    /// Handle `message` now and queue the work it produced
    pub fn dispatch(&mut self, message: Message) {
        let task = self.controller.update(message);
        self.spawn(task);
    }

    pub fn spawn(&mut self, task: Task) {
        for future in task.into_futures() {
            self.pending.push(future);
        }
    }

    /// Outstanding futures (delays and capability calls)
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait for the next future and handle its message
    ///
    /// Returns `false` when nothing is pending.
    pub async fn step(&mut self) -> bool {
        match self.pending.next().await {
            Some(Some(message)) => {
                self.dispatch(message);
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Run until no work is pending
    ///
    /// Never returns while a recording timer is ticking; use
    /// [`run_for`](Self::run_for) then.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Process work for `duration`, then return with the rest still pending
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            if self.pending.is_empty() {
                tokio::time::sleep_until(deadline).await;
                return;
            }
            match tokio::time::timeout_at(deadline, self.pending.next()).await {
                Ok(Some(Some(message))) => self.dispatch(message),
                Ok(Some(None)) | Ok(None) => {}
                Err(_) => return,
            }
        }
    }

    /// Stop any recording and finish captures still in flight
    ///
    /// Returns `false` if work was still unsaved when `grace` ran out.
    pub async fn shutdown(&mut self, grace: Duration) -> bool {
        if !self.controller.recording().is_idle() {
            self.dispatch(Message::StopRecording);
        }
        let deadline = Instant::now() + grace;
        while self.controller.has_unsaved_work() {
            match tokio::time::timeout_at(deadline, self.pending.next()).await {
                Ok(Some(Some(message))) => self.dispatch(message),
                Ok(Some(None)) => {}
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        busy = self.controller.is_busy(),
                        "Shutdown grace period elapsed with captures unsaved"
                    );
                    return false;
                }
            }
        }
        info!("Captures drained");
        !self.controller.has_unsaved_work()
    }
}
