//! Asynchronous binary capture for `binary` attributes.
//!
//! A pick request reads the selected file on the worker pool, encodes it as
//! a base64 data URL and ships the outcome back over a channel. The UI thread
//! drains finished reads once per frame with [`BinaryLoader::poll`].
//!
//! Ordering: every request for a node gets a fresh ticket. Only the result
//! carrying the newest ticket for that node is delivered; slower reads for an
//! earlier selection are dropped, so the last *selected* file always wins.
//!
//! Removing a nested entry shifts the indices of its later siblings. The app
//! reports removals through [`BinaryLoader::on_entry_removed`] so outstanding
//! reads keep pointing at the node that asked for them.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::workers::Workers;
use crate::entities::NodePath;
use crate::entities::data_url;

#[derive(Debug, Error)]
pub enum BinaryReadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a file and encode it as `data:<mime>;base64,<payload>`.
pub fn read_as_data_url(path: &Path) -> Result<String, BinaryReadError> {
    let bytes = std::fs::read(path).map_err(|source| BinaryReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mime = data_url::mime_for_path(path);
    trace!("Read {} bytes from {} ({})", bytes.len(), path.display(), mime);
    Ok(data_url::encode(&bytes, mime))
}

/// Target of a read: root attribute index + path below it.
pub type BinaryTarget = (usize, NodePath);

/// Finished read, ready to be folded into the document.
#[derive(Debug)]
pub struct BinaryLoaded {
    pub root: usize,
    pub path: NodePath,
    pub file: PathBuf,
    pub result: Result<String, BinaryReadError>,
}

struct Completed {
    ticket: u64,
    loaded: BinaryLoaded,
}

pub struct BinaryLoader {
    workers: Arc<Workers>,
    tx: Sender<Completed>,
    rx: Receiver<Completed>,
    /// Outstanding tickets and the node each one currently targets.
    /// At most one ticket per target; a newer request replaces the older one.
    outstanding: HashMap<u64, BinaryTarget>,
    next_ticket: u64,
}

impl BinaryLoader {
    pub fn new(workers: Arc<Workers>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            workers,
            tx,
            rx,
            outstanding: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Start reading `file` for the node at `path` under root `root`.
    /// Supersedes any outstanding read for the same node. Returns the ticket.
    pub fn request(&mut self, root: usize, path: NodePath, file: PathBuf) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let target = (root, path.clone());
        self.outstanding.retain(|prev, t| {
            let superseded = *t == target;
            if superseded {
                debug!("Read {} for root {} {} superseded by {}", prev, root, path, ticket);
            }
            !superseded
        });
        self.outstanding.insert(ticket, target);

        let tx = self.tx.clone();
        self.workers.execute(move || {
            let result = read_as_data_url(&file);
            let loaded = BinaryLoaded {
                root,
                path,
                file,
                result,
            };
            // Receiver gone means the app is shutting down
            let _ = tx.send(Completed { ticket, loaded });
        });
        ticket
    }

    /// Drain finished reads, dropping superseded or cancelled ones.
    ///
    /// Delivered reads carry the node's current location, which differs from
    /// the requested one if entries were removed in between.
    pub fn poll(&mut self) -> Vec<BinaryLoaded> {
        let mut ready = Vec::new();
        for Completed { ticket, mut loaded } in self.rx.try_iter() {
            match self.outstanding.remove(&ticket) {
                Some((root, path)) => {
                    if root != loaded.root || path != loaded.path {
                        debug!(
                            "Read {} moved from root {} {} to root {} {}",
                            ticket, loaded.root, loaded.path, root, path
                        );
                    }
                    loaded.root = root;
                    loaded.path = path;
                    ready.push(loaded);
                }
                None => {
                    trace!(
                        "Dropping stale read {} of {} for root {} {}",
                        ticket,
                        loaded.file.display(),
                        loaded.root,
                        loaded.path
                    );
                }
            }
        }
        ready
    }

    /// Outstanding reads.
    pub fn pending(&self) -> usize {
        self.outstanding.len()
    }

    /// Paths under `root` with an outstanding read.
    pub fn pending_paths(&self, root: usize) -> Vec<NodePath> {
        self.outstanding
            .values()
            .filter(|(r, _)| *r == root)
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Root indices with at least one outstanding read, ascending.
    pub fn pending_roots(&self) -> Vec<usize> {
        let mut roots: Vec<usize> = self.outstanding.values().map(|(root, _)| *root).collect();
        roots.sort_unstable();
        roots.dedup();
        roots
    }

    /// Entry `index` of the node at `parent` was removed.
    ///
    /// Reads targeting the removed entry or anything beneath it are cancelled;
    /// reads under later siblings follow their node to its new index.
    pub fn on_entry_removed(&mut self, root: usize, parent: &NodePath, index: usize) {
        let depth = parent.depth();
        let mut cancelled = 0;
        self.outstanding.retain(|ticket, (r, path)| {
            if *r != root || path.depth() <= depth || !path.starts_with(parent) {
                return true;
            }
            let step = path.steps()[depth].index;
            if step == index {
                trace!("Cancelling read {} for removed root {} {}", ticket, root, path);
                cancelled += 1;
                false
            } else {
                if step > index {
                    *path = path.with_index_at(depth, step - 1);
                }
                true
            }
        });
        if cancelled > 0 {
            warn!("Cancelled {} binary read(s) under removed entry", cancelled);
        }
    }

    /// Forget all outstanding reads; their results will be dropped on arrival.
    /// Used whenever root indices shift or the document is replaced.
    pub fn cancel_all(&mut self) {
        if !self.outstanding.is_empty() {
            warn!("Cancelling {} outstanding binary read(s)", self.outstanding.len());
        }
        self.outstanding.clear();
    }
}
