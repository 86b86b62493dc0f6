use std::sync::Arc;

use serde::Serialize;
use shared::{
    codec::{decode_collection, decode_roll_result, encode_payload},
    domain::Spell,
    protocol::{
        BookmarkRequest, BuildRequest, DiceRequest, DiceRoll, ServiceKind, SortRequest,
        SpellFields,
    },
};
use tracing::{debug, info, warn};

pub mod catalog;
pub mod config;
pub mod error;
pub mod transport;

pub use catalog::{CatalogClient, CatalogError};
pub use config::ClientSettings;
pub use error::ClientError;
pub use transport::{TcpWorkerTransport, WorkerTransport};

/// One transport per worker service.
#[derive(Clone)]
pub struct WorkerHandles {
    pub sort: Arc<dyn WorkerTransport>,
    pub bookmark: Arc<dyn WorkerTransport>,
    pub builder: Arc<dyn WorkerTransport>,
    pub dice: Arc<dyn WorkerTransport>,
}

impl WorkerHandles {
    pub fn tcp(settings: &ClientSettings) -> Self {
        let timeout = settings.request_timeout();
        let handle = |service: ServiceKind| -> Arc<dyn WorkerTransport> {
            Arc::new(
                TcpWorkerTransport::new(service, settings.worker_addr(service))
                    .with_timeout(timeout),
            )
        };
        Self {
            sort: handle(ServiceKind::Sort),
            bookmark: handle(ServiceKind::Bookmark),
            builder: handle(ServiceKind::SpellBuilder),
            dice: handle(ServiceKind::Dice),
        }
    }

    pub fn get(&self, service: ServiceKind) -> &Arc<dyn WorkerTransport> {
        match service {
            ServiceKind::Sort => &self.sort,
            ServiceKind::Bookmark => &self.bookmark,
            ServiceKind::SpellBuilder => &self.builder,
            ServiceKind::Dice => &self.dice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    ByLevel { descending: bool },
    ByName,
    ByClass { class_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Sorted(Vec<Spell>),
    /// The collection is non-empty but no spell is castable by the class.
    ClassNotFound,
    NoSpells,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Replaced,
    /// The worker sent an empty reply; the collection was kept.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSpec {
    Create { fields: SpellFields },
    Edit { target: Spell, fields: SpellFields },
}

/// Proof that the user answered "yes" twice to a removal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalConfirmation(());

impl RemovalConfirmation {
    pub fn from_answers(first: bool, second: bool) -> Option<Self> {
        (first && second).then_some(Self(()))
    }
}

#[derive(Debug, Default)]
pub struct ShutdownReport {
    pub acknowledged: Vec<ServiceKind>,
    pub failed: Vec<(ServiceKind, ClientError)>,
    /// Set when the sentinels had already been sent by an earlier call.
    pub already_stopped: bool,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the bookmark collection and issues every worker call, one at a time.
pub struct SpellbookSession {
    workers: WorkerHandles,
    bookmarks: Vec<Spell>,
    stopped: bool,
}

impl SpellbookSession {
    pub fn new(workers: WorkerHandles) -> Self {
        Self::with_bookmarks(workers, Vec::new())
    }

    pub fn with_bookmarks(workers: WorkerHandles, bookmarks: Vec<Spell>) -> Self {
        Self {
            workers,
            bookmarks,
            stopped: false,
        }
    }

    pub fn bookmarks(&self) -> &[Spell] {
        &self.bookmarks
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Level and name sorts reorder the collection in place; class sorts
    /// return a filtered view and leave it as is.
    pub async fn sort(&mut self, spec: SortSpec) -> Result<SortOutcome, ClientError> {
        if self.bookmarks.is_empty() {
            return Ok(SortOutcome::NoSpells);
        }

        let spells = self.bookmarks.clone();
        let (request, reorders) = match spec {
            SortSpec::ByLevel { descending } => (SortRequest::ByLevel { descending, spells }, true),
            SortSpec::ByName => (SortRequest::ByName { spells }, true),
            SortSpec::ByClass { class_name } => (SortRequest::ByClass { class_name, spells }, false),
        };

        let reply = self.call(ServiceKind::Sort, &request).await?;
        let sorted = decode_collection(&reply).map_err(|source| ClientError::Protocol {
            service: ServiceKind::Sort,
            source,
        })?;

        match (sorted, reorders) {
            (Some(sorted), _) if !sorted.is_empty() => {
                if reorders {
                    self.bookmarks = sorted.clone();
                }
                Ok(SortOutcome::Sorted(sorted))
            }
            (_, false) => Ok(SortOutcome::ClassNotFound),
            (_, true) => {
                warn!("sort worker returned no spells; keeping current order");
                Ok(SortOutcome::Sorted(self.bookmarks.clone()))
            }
        }
    }

    pub async fn add_bookmark(&mut self, spell: Spell) -> Result<MutationOutcome, ClientError> {
        debug!(slug = %spell.index, "bookmarking spell");
        let request = BookmarkRequest::Add {
            bookmarks: self.bookmarks.clone(),
            spell,
        };
        let reply = self.call(ServiceKind::Bookmark, &request).await?;
        self.replace_bookmarks(ServiceKind::Bookmark, &reply)
    }

    pub async fn remove_bookmark(
        &mut self,
        spell: &Spell,
        _confirmed: RemovalConfirmation,
    ) -> Result<MutationOutcome, ClientError> {
        debug!(slug = %spell.index, "removing bookmark");
        let request = BookmarkRequest::Remove {
            bookmarks: self.bookmarks.clone(),
            spell: spell.clone(),
        };
        let reply = self.call(ServiceKind::Bookmark, &request).await?;
        self.replace_bookmarks(ServiceKind::Bookmark, &reply)
    }

    pub async fn build_spell(&mut self, spec: BuildSpec) -> Result<MutationOutcome, ClientError> {
        let bookmarks = self.bookmarks.clone();
        let request = match spec {
            BuildSpec::Create { fields } => BuildRequest::Create { bookmarks, fields },
            BuildSpec::Edit { target, fields } => BuildRequest::Edit {
                bookmarks,
                target,
                fields,
            },
        };
        let reply = self.call(ServiceKind::SpellBuilder, &request).await?;
        self.replace_bookmarks(ServiceKind::SpellBuilder, &reply)
    }

    pub async fn roll_dice(&mut self, roll: DiceRoll) -> Result<i64, ClientError> {
        let reply = self.call(ServiceKind::Dice, &DiceRequest::Roll(roll)).await?;
        decode_roll_result(&reply).map_err(|source| ClientError::Protocol {
            service: ServiceKind::Dice,
            source,
        })
    }

    /// Sends every worker its shutdown sentinel, in a fixed order, waiting for
    /// each acknowledgment. Later calls do nothing.
    pub async fn shutdown_all(&mut self) -> ShutdownReport {
        if self.stopped {
            return ShutdownReport {
                already_stopped: true,
                ..ShutdownReport::default()
            };
        }
        self.stopped = true;

        let mut report = ShutdownReport::default();
        for service in ServiceKind::SHUTDOWN_ORDER {
            let result = match service {
                ServiceKind::SpellBuilder => self.call(service, &BuildRequest::Shutdown).await,
                ServiceKind::Bookmark => self.call(service, &BookmarkRequest::Shutdown).await,
                ServiceKind::Sort => self.call(service, &SortRequest::Shutdown).await,
                ServiceKind::Dice => self.call(service, &DiceRequest::Shutdown).await,
            };
            match result {
                Ok(_) => {
                    info!(%service, "worker acknowledged shutdown");
                    report.acknowledged.push(service);
                }
                Err(error) => {
                    warn!(%service, %error, "worker shutdown failed");
                    report.failed.push((service, error));
                }
            }
        }
        report
    }

    async fn call<T: Serialize>(
        &self,
        service: ServiceKind,
        request: &T,
    ) -> Result<Vec<u8>, ClientError> {
        let payload =
            encode_payload(request).map_err(|source| ClientError::Encode { service, source })?;
        debug!(%service, bytes = payload.len(), "sending request");
        self.workers.get(service).round_trip(payload).await
    }

    fn replace_bookmarks(
        &mut self,
        service: ServiceKind,
        reply: &[u8],
    ) -> Result<MutationOutcome, ClientError> {
        let decoded =
            decode_collection(reply).map_err(|source| ClientError::Protocol { service, source })?;
        match decoded {
            Some(bookmarks) => {
                debug!(%service, count = bookmarks.len(), "bookmarks replaced");
                self.bookmarks = bookmarks;
                Ok(MutationOutcome::Replaced)
            }
            None => {
                info!(%service, "worker left bookmarks unchanged");
                Ok(MutationOutcome::Unchanged)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
