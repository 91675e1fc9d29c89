//! Batch preview generation against an object store.
//!
//! Every original `<category>/<file>` gets a preview at
//! `0_preview/<category>/<base>.webp`, scaled to fit inside the configured
//! box without enlargement. Generation is split in two steps:
//!
//! 1. [`plan_previews`]: a pure function over the key listing that decides
//!    which previews are missing and which previews have lost their original.
//! 2. [`generate_previews`]: runs the plan against a store and an image
//!    backend, in parallel with [rayon](https://docs.rs/rayon).
//!
//! A failed image does not abort the run; it is reported and counted. Store
//! errors while pruning do abort, since they usually mean the store itself is
//! unreachable.
//!
//! ## Progress
//!
//! Pass a [`Sender`] to receive one [`PreviewEvent`] per image as it finishes.
//! Events arrive in completion order, not list order.

use crate::imaging::{BackendError, ImageBackend, PreviewConfig, create_preview};
use crate::keys::{self, OriginalKey};
use crate::store::{ObjectStore, StoreError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewJob {
    pub original_key: String,
    pub preview_key: String,
    pub category: String,
}

impl PreviewJob {
    fn new(original_key: &str, parsed: &OriginalKey) -> Self {
        Self {
            original_key: original_key.to_string(),
            preview_key: parsed.preview_key(),
            category: parsed.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewPlan {
    /// Originals whose preview must be (re)generated, in key order.
    pub jobs: Vec<PreviewJob>,
    /// Preview keys with no matching original.
    pub orphans: Vec<String>,
    /// Originals that already have a preview and were left alone.
    pub up_to_date: usize,
}

/// Decide what to generate from a full key listing.
///
/// With `force`, every original is regenerated.
pub fn plan_previews<S: AsRef<str>>(keys: &[S], force: bool) -> PreviewPlan {
    let existing: HashSet<&str> = keys
        .iter()
        .map(|k| k.as_ref())
        .filter(|k| keys::parse_preview_key(k).is_some())
        .collect();

    let mut plan = PreviewPlan::default();
    let mut expected = HashSet::new();
    for key in keys.iter().map(|k| k.as_ref()) {
        let Some(parsed) = keys::parse_original_key(key) else {
            continue;
        };
        let job = PreviewJob::new(key, &parsed);
        // Two originals differing only in extension share a preview.
        if !expected.insert(job.preview_key.clone()) {
            log::warn!("{key} shares preview {} with another original", job.preview_key);
            continue;
        }
        if force || !existing.contains(job.preview_key.as_str()) {
            plan.jobs.push(job);
        } else {
            plan.up_to_date += 1;
        }
    }

    let mut orphans: Vec<String> = existing
        .into_iter()
        .filter(|k| !expected.contains(*k))
        .map(String::from)
        .collect();
    orphans.sort();
    plan.orphans = orphans;
    plan
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    Generated {
        original_key: String,
        preview_key: String,
        width: u32,
        height: u32,
    },
    Failed {
        original_key: String,
        error: String,
    },
    Pruned {
        preview_key: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewReport {
    pub generated: usize,
    pub failed: usize,
    pub pruned: usize,
    pub up_to_date: usize,
}

impl std::fmt::Display for PreviewReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} generated, {} up to date, {} failed, {} pruned",
            self.generated, self.up_to_date, self.failed, self.pruned
        )
    }
}

/// Run a plan. Orphans are deleted only when `prune` is set.
pub fn generate_previews(
    store: &impl ObjectStore,
    backend: &impl ImageBackend,
    plan: &PreviewPlan,
    config: &PreviewConfig,
    prune: bool,
    progress: Option<Sender<PreviewEvent>>,
) -> Result<PreviewReport, PreviewError> {
    let emit = |event: PreviewEvent| {
        if let Some(tx) = &progress {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };

    let outcomes: Vec<bool> = plan
        .jobs
        .par_iter()
        .map(|job| match generate_one(store, backend, job, config) {
            Ok((width, height)) => {
                log::debug!("generated {} ({width}x{height})", job.preview_key);
                emit(PreviewEvent::Generated {
                    original_key: job.original_key.clone(),
                    preview_key: job.preview_key.clone(),
                    width,
                    height,
                });
                true
            }
            Err(e) => {
                log::warn!("preview for {} failed: {e}", job.original_key);
                emit(PreviewEvent::Failed {
                    original_key: job.original_key.clone(),
                    error: e.to_string(),
                });
                false
            }
        })
        .collect();

    let generated = outcomes.iter().filter(|ok| **ok).count();
    let mut report = PreviewReport {
        generated,
        failed: outcomes.len() - generated,
        pruned: 0,
        up_to_date: plan.up_to_date,
    };

    if prune && !plan.orphans.is_empty() {
        store.delete(&plan.orphans)?;
        for key in &plan.orphans {
            emit(PreviewEvent::Pruned {
                preview_key: key.clone(),
            });
        }
        report.pruned = plan.orphans.len();
        log::info!("pruned {} orphaned previews", report.pruned);
    }

    Ok(report)
}

fn generate_one(
    store: &impl ObjectStore,
    backend: &impl ImageBackend,
    job: &PreviewJob,
    config: &PreviewConfig,
) -> Result<(u32, u32), PreviewError> {
    let source = store.get(&job.original_key)?;
    let preview = create_preview(backend, &source, config)?;
    store.put(&job.preview_key, &preview.bytes, preview.content_type)?;
    Ok((preview.width, preview.height))
}
