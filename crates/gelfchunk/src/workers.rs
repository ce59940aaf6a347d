//! Fan-out of write requests across a fixed set of threads.
//!
//! Every worker owns a [`BufWriter`] over the same shared sink and pulls
//! requests from one queue. Each request is written and flushed before its
//! result is reported, so with a [`gelfchunk_client::Client`] sink one
//! request becomes one message.

use std::io::{self, BufWriter, Write};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

struct Request {
    bytes: Vec<u8>,
    reply: SyncSender<io::Result<usize>>,
}

/// Adapts an `Arc<S>` to an owned writer for any sink written through `&S`.
struct SharedSink<S>(Arc<S>);

impl<S> Write for SharedSink<S>
where
    for<'a> &'a S: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

/// A fixed number of writer threads sharing one request queue.
///
/// Dropping the pool closes the queue and joins the workers.
pub struct WorkerPool {
    queue: Option<Sender<Request>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `capacity` workers writing to `sink`. A capacity of zero is
    /// treated as one.
    pub fn new<S>(capacity: usize, sink: Arc<S>) -> Self
    where
        S: Send + Sync + 'static,
        for<'a> &'a S: Write,
    {
        let capacity = capacity.max(1);
        let (queue, requests) = mpsc::channel();
        let requests = Arc::new(Mutex::new(requests));

        let workers = (0..capacity)
            .map(|worker| {
                let requests = Arc::clone(&requests);
                let sink = SharedSink(Arc::clone(&sink));
                thread::spawn(move || work(worker, &requests, sink))
            })
            .collect();
        debug!(capacity, "started worker pool");

        Self {
            queue: Some(queue),
            workers,
        }
    }

    /// Number of worker threads still attached to the pool.
    pub fn capacity(&self) -> usize {
        self.workers.len()
    }

    /// Hand `bytes` to the next free worker and wait for its result.
    ///
    /// Returns the number of bytes written, which is always `bytes.len()`
    /// on success.
    pub fn submit(&self, bytes: &[u8]) -> io::Result<usize> {
        let queue = self.queue.as_ref().ok_or_else(closed)?;
        let (reply, response) = mpsc::sync_channel(1);
        queue
            .send(Request {
                bytes: bytes.to_vec(),
                reply,
            })
            .map_err(|_| closed())?;
        response.recv().map_err(|_| closed())?
    }

    /// Stop accepting requests and wait for every worker to exit.
    pub fn close(&mut self) {
        if self.queue.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        debug!("closed worker pool");
    }
}

impl Write for &WorkerPool {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for WorkerPool {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.workers.len())
            .field("closed", &self.queue.is_none())
            .finish()
    }
}

fn work<W: Write>(worker: usize, requests: &Mutex<Receiver<Request>>, sink: W) {
    let mut writer = BufWriter::new(sink);
    loop {
        // Hold the queue lock only while waiting for the next request.
        let next = requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        let Ok(request) = next else {
            break;
        };

        let result = writer
            .write_all(&request.bytes)
            .and_then(|()| writer.flush())
            .map(|()| request.bytes.len());
        if let Err(err) = &result {
            debug!(worker, %err, "discarding buffered bytes after failed write");
            let (sink, _discarded) = writer.into_parts();
            writer = BufWriter::new(sink);
        }
        // The submitter may have gone away; nothing to report to.
        let _ = request.reply.send(result);
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "worker pool is closed")
}
