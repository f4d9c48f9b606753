//! Background build/deploy trigger
//!
//! After a successful mutation the handler calls [`BuildTrigger::trigger`],
//! which runs the configured steps on a detached task and returns at once.
//! Steps run in order; the first failure ends the run. Outcomes are logged
//! and never reported to the HTTP caller.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

use songbook_common::config::{BuildConfig, BuildStep};
use songbook_common::{index, SongStore};
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Build step failures
#[derive(Debug, Error)]
pub enum BuildError {
    /// Program could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program exited unsuccessfully
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    /// Built-in index step failed
    #[error("Index build failed: {0}")]
    Index(#[from] songbook_common::Error),
}

struct Inner {
    config: BuildConfig,
    base_dir: PathBuf,
    songs: SongStore,
}

/// Fire-and-forget runner for the build pipeline
#[derive(Clone)]
pub struct BuildTrigger {
    inner: Arc<Inner>,
}

impl BuildTrigger {
    pub fn new(config: BuildConfig, base_dir: impl Into<PathBuf>, songs: SongStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                base_dir: base_dir.into(),
                songs,
            }),
        }
    }

    /// Trigger that never runs anything
    pub fn disabled(songs: SongStore) -> Self {
        let config = BuildConfig {
            enabled: false,
            steps: Vec::new(),
        };
        Self::new(config, ".", songs)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled && !self.inner.config.steps.is_empty()
    }

    /// Start the pipeline on a detached task.
    ///
    /// Returns `None` when building is disabled. Callers are free to drop
    /// the handle.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            info!("Build trigger disabled, skipping");
            return None;
        }

        let this = self.clone();
        Some(tokio::spawn(async move {
            match this.run().await {
                Ok(()) => info!("Build pipeline finished successfully"),
                Err(e) => error!("Build pipeline failed: {}", e),
            }
        }))
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self) -> Result<(), BuildError> {
        for step in &self.inner.config.steps {
            self.run_step(step).await?;
        }
        Ok(())
    }

    async fn run_step(&self, step: &BuildStep) -> Result<(), BuildError> {
        match step {
            BuildStep::Command { program, args } => {
                info!("Running build step: {} {}", program, args.join(" "));
                let status = Command::new(program)
                    .args(args)
                    .current_dir(&self.inner.base_dir)
                    .status()
                    .await
                    .map_err(|source| BuildError::Spawn {
                        program: program.clone(),
                        source,
                    })?;

                if !status.success() {
                    return Err(BuildError::Failed {
                        program: program.clone(),
                        status,
                    });
                }
                info!("Build step {} succeeded", program);
            }
            BuildStep::Index { output_dir } => {
                let output_dir = self.resolve(output_dir);
                info!("Building songs index into {}", output_dir.display());
                index::build_index(&self.inner.songs, &self.inner.base_dir, &output_dir).await?;
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.inner.base_dir.join(path)
    }
}
