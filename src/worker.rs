//! Single display worker.
//!
//! The panel cannot take overlapping commands, so every request goes through
//! one bounded FIFO drained by one thread. When the queue is full new
//! requests are rejected with [`DisplayError::Busy`] instead of blocking the
//! caller.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::DisplayError;
use crate::session::{EpaperDisplay, TextRequest};

const QUEUED: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// What a caller can ask the worker to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRequest {
    Image(PathBuf),
    Text(TextRequest),
}

struct Job {
    request: DisplayRequest,
    status: Arc<AtomicU8>,
    reply: mpsc::Sender<Result<(), DisplayError>>,
}

enum Message {
    Job(Job),
    Stop,
}

/// Result of a submitted request
#[derive(Debug)]
pub struct Ticket {
    status: Arc<AtomicU8>,
    reply: Receiver<Result<(), DisplayError>>,
}

impl Ticket {
    /// Block until the worker has run (or skipped) the request
    pub fn wait(self) -> Result<(), DisplayError> {
        self.reply
            .recv()
            .unwrap_or(Err(DisplayError::WorkerStopped))
    }

    /// Withdraw the request if the worker has not started it yet.
    /// Returns `false` once the panel is already being driven.
    pub fn cancel(&self) -> bool {
        self.status
            .compare_exchange(QUEUED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Cheap, cloneable way to submit requests to a [`DisplayWorker`]
#[derive(Clone)]
pub struct DisplayHandle {
    queue: SyncSender<Message>,
}

impl DisplayHandle {
    /// Queue `request` without waiting for it to run
    pub fn submit(&self, request: DisplayRequest) -> Result<Ticket, DisplayError> {
        let status = Arc::new(AtomicU8::new(QUEUED));
        let (reply, rx) = mpsc::channel();
        let job = Job {
            request,
            status: status.clone(),
            reply,
        };

        match self.queue.try_send(Message::Job(job)) {
            Ok(()) => Ok(Ticket { status, reply: rx }),
            Err(TrySendError::Full(_)) => {
                log::warn!("Display queue full, rejecting request");
                Err(DisplayError::Busy)
            }
            Err(TrySendError::Disconnected(_)) => Err(DisplayError::WorkerStopped),
        }
    }

    /// Queue a bitmap and wait for the session to finish
    pub fn display_image(&self, path: impl Into<PathBuf>) -> Result<(), DisplayError> {
        self.submit(DisplayRequest::Image(path.into()))?.wait()
    }

    /// Queue text and wait for the session to finish
    pub fn display_text(&self, request: TextRequest) -> Result<(), DisplayError> {
        self.submit(DisplayRequest::Text(request))?.wait()
    }
}

/// Owns the thread that drives the display
pub struct DisplayWorker {
    handle: DisplayHandle,
    thread: Option<JoinHandle<()>>,
}

impl DisplayWorker {
    /// Start the worker. `capacity` requests may wait behind the running one.
    pub fn spawn(display: EpaperDisplay, capacity: usize) -> std::io::Result<Self> {
        let (queue, rx) = mpsc::sync_channel(capacity.max(1));
        let thread = std::thread::Builder::new()
            .name("epaper-worker".into())
            .spawn(move || run(display, rx))?;

        Ok(DisplayWorker {
            handle: DisplayHandle { queue },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> DisplayHandle {
        self.handle.clone()
    }

    /// Finish everything queued so far, then stop the thread. Requests
    /// submitted afterwards fail with [`DisplayError::WorkerStopped`].
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            // blocks while the queue is full
            if self.handle.queue.send(Message::Stop).is_err() {
                log::debug!("Display worker already gone");
            }
            if thread.join().is_err() {
                log::error!("Display worker panicked");
            }
        }
    }
}

impl Drop for DisplayWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut display: EpaperDisplay, rx: Receiver<Message>) {
    log::info!("Display worker started ({} backend)", display.backend());

    while let Ok(Message::Job(job)) = rx.recv() {
        let result = if job
            .status
            .compare_exchange(QUEUED, STARTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            match &job.request {
                DisplayRequest::Image(path) => display.display_image(path),
                DisplayRequest::Text(request) => display.display_text(request),
            }
        } else {
            log::info!("Skipping cancelled request");
            Err(DisplayError::Cancelled)
        };

        if job.reply.send(result).is_err() {
            log::debug!("Ticket dropped before the result arrived");
        }
    }

    log::info!("Display worker stopped");
}
