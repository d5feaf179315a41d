// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document thread.
//!
//! The live document is not thread safe and every host mutation must happen
//! on the thread that owns it. [`DocThread`] owns the document on a
//! dedicated OS thread and executes submitted closures there one at a time;
//! callers await the closure's result over a oneshot channel. Command
//! serialization falls out of the single consumer, no locking involved.

use std::fmt;
use std::sync::mpsc;
use std::thread::JoinHandle;

use tokio::sync::oneshot;
use tracing::debug;

use crate::doc::Document;

type Job = Box<dyn FnOnce(&mut Document) + Send>;

pub struct DocThread {
    sender: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocThreadStopped;

impl fmt::Display for DocThreadStopped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("document thread is not running")
    }
}

impl std::error::Error for DocThreadStopped {}

impl DocThread {
    /// Move the document onto its own thread and start serving jobs.
    pub fn spawn(doc: Document) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let handle = std::thread::Builder::new()
            .name("proteus-doc".to_owned())
            .spawn(move || {
                let mut doc = doc;
                while let Ok(job) = receiver.recv() {
                    job(&mut doc);
                }
                debug!("document thread draining complete");
            })?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Run a closure against the document and await its result.
    pub async fn run<R, F>(&self, f: F) -> Result<R, DocThreadStopped>
    where
        F: FnOnce(&mut Document) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let job: Job = Box::new(move |doc| {
            let _ = reply.send(f(doc));
        });
        self.sender
            .as_ref()
            .ok_or(DocThreadStopped)?
            .send(job)
            .map_err(|_| DocThreadStopped)?;
        result.await.map_err(|_| DocThreadStopped)
    }
}

impl Drop for DocThread {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
