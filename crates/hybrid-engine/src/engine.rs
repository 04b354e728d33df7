//! The execution coordinator.
//!
//! [`Engine`] owns its collaborators explicitly: a [`ScriptStore`], a
//! [`Catalog`], and a [`RuntimeLoader`] that produces the one runtime every
//! run goes through.
//!
//! State machine: `Uninitialized -> Initializing -> (Ready | Failed)`.
//! `Failed` is terminal; build a new engine to retry. Observers can follow
//! transitions through [`Engine::subscribe`].
//!
//! Runs are serialized: the runtime sits behind an async mutex that is held
//! from package provisioning through the entry-point call, so two runs never
//! interleave writes to the runtime's execution context. Waiters are served
//! in FIFO order.
//!
//! Once a run holds the lock, its work moves to a spawned task that owns the
//! guard. Dropping the caller's future (a disconnected HTTP client, a
//! timeout) abandons the result but not the run, which still completes its
//! exchange with the runtime before releasing it. There is no timeout; a
//! hung script blocks later runs.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tracing::Instrument;
use uuid::Uuid;

use hybrid_core::{CatalogEntry, ScriptDescriptor, ScriptId, ScriptRecord};
use hybrid_storage::{ProvisionedPackage, ScriptStore, SqliteStore};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::outcome::ScriptOutcome;
use crate::runtime::{PythonLoader, RuntimeConfig, RuntimeError, RuntimeLoader, ScriptRuntime};

/// Reserved global the run input is bound to.
pub const INPUT_GLOBAL: &str = "_input";

/// Lifecycle of an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    /// Initialization failed for the given reason. Terminal.
    Failed(String),
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReceipt {
    pub success: bool,
    pub id: ScriptId,
}

type SharedStore = Arc<Mutex<Box<dyn ScriptStore + Send>>>;
type SharedRuntime = Arc<Mutex<Option<Box<dyn ScriptRuntime>>>>;

pub struct Engine {
    runtime_config: RuntimeConfig,
    store: SharedStore,
    catalog: Arc<dyn Catalog>,
    loader: Option<Arc<dyn RuntimeLoader>>,
    runtime: SharedRuntime,
    state: watch::Sender<EngineState>,
}

impl Engine {
    /// Creates an uninitialized engine with no runtime loader.
    ///
    /// Without [`Engine::with_loader`], [`Engine::init`] fails.
    pub fn new(
        runtime_config: RuntimeConfig,
        store: Box<dyn ScriptStore + Send>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        let (state, _) = watch::channel(EngineState::Uninitialized);
        Engine {
            runtime_config,
            store: Arc::new(Mutex::new(store)),
            catalog,
            loader: None,
            runtime: Arc::new(Mutex::new(None)),
            state,
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn RuntimeLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Builds an engine from configuration: SQLite store at `db_path`, the
    /// configured catalog, and the Python process runtime.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let store = SqliteStore::new(&config.db_path)?;
        Ok(Engine::new(config.runtime.clone(), Box::new(store), config.build_catalog())
            .with_loader(Arc::new(PythonLoader)))
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// Resolves once the engine is `Ready`, or fails once it is `Failed`.
    pub async fn wait_ready(&self) -> Result<(), EngineError> {
        let mut rx = self.state.subscribe();
        let state = rx
            .wait_for(|s| matches!(s, EngineState::Ready | EngineState::Failed(_)))
            .await
            .map_err(|_| EngineError::NotInitialized)?
            .clone();
        match state {
            EngineState::Failed(reason) => Err(EngineError::InitFailed(reason)),
            _ => Ok(()),
        }
    }

    /// Loads the runtime and provisions preinstalled packages.
    ///
    /// Calling `init` on a ready engine is a no-op; calling it while another
    /// `init` is in flight waits for that one.
    pub async fn init(&self) -> Result<(), EngineError> {
        let mut previous = EngineState::Uninitialized;
        let started = self.state.send_if_modified(|state| {
            previous = state.clone();
            if *state == EngineState::Uninitialized {
                *state = EngineState::Initializing;
                true
            } else {
                false
            }
        });
        if !started {
            return match previous {
                EngineState::Ready => Ok(()),
                EngineState::Failed(reason) => Err(EngineError::InitFailed(reason)),
                _ => self.wait_ready().await,
            };
        }

        tracing::info!("initializing hybrid engine");
        match self.bring_up().await {
            Ok(runtime) => {
                *self.runtime.lock().await = Some(runtime);
                self.state.send_replace(EngineState::Ready);
                tracing::info!("hybrid engine ready");
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::error!(error = %reason, "engine initialization failed");
                self.state.send_replace(EngineState::Failed(reason.clone()));
                Err(EngineError::InitFailed(reason))
            }
        }
    }

    async fn bring_up(&self) -> Result<Box<dyn ScriptRuntime>, RuntimeError> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| RuntimeError::Init("runtime loader not found".to_string()))?;

        tracing::debug!(source = %self.runtime_config.source_url, "loading runtime");
        let mut runtime = loader.load(&self.runtime_config).await?;

        for package in &self.runtime_config.preinstalled_packages {
            runtime.install_package(package).await?;
            tracing::debug!(package = %package, "preinstalled package ready");
        }
        Ok(runtime)
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        match *self.state.borrow() {
            EngineState::Ready => Ok(()),
            _ => Err(EngineError::NotInitialized),
        }
    }

    // -------------------------------------------------------------------
    // Install / run
    // -------------------------------------------------------------------

    /// Validates `descriptor`, applies defaults, and saves it under `id`.
    ///
    /// Reinstalling replaces every field; only the original install time is
    /// kept. `descriptor.id` is ignored in favor of `id`.
    ///
    /// Needs only the store, which is attached at construction, so this works
    /// in every state without bringing the runtime up.
    pub async fn install_script(
        &self,
        id: &ScriptId,
        descriptor: ScriptDescriptor,
    ) -> Result<InstallReceipt, EngineError> {
        let fields = descriptor
            .into_fields(id)
            .map_err(|e| EngineError::InvalidScript(e.to_string()))?;

        let key = self.store.lock().await.save(id, &fields)?;
        tracing::info!(script = %key, packages = fields.packages.len(), "script installed");
        Ok(InstallReceipt {
            success: true,
            id: key,
        })
    }

    /// Runs an installed script and returns its folded result: the entry
    /// point's return value, or `{"error": "<message>"}` if it raised.
    pub async fn run_script(&self, id: &ScriptId, input: Value) -> Result<Value, EngineError> {
        self.ensure_ready()?;
        let span = tracing::info_span!("run", script = %id, run_id = %Uuid::new_v4());
        async {
            // Cancellable: nothing has reached the runtime while queued.
            let guard = Arc::clone(&self.runtime).lock_owned().await;
            let run = run_locked(guard, Arc::clone(&self.store), id.clone(), input);
            match tokio::spawn(run.in_current_span()).await {
                Ok(result) => result,
                Err(e) => Err(RuntimeError::Protocol(format!("run task failed: {}", e)).into()),
            }
        }
        .instrument(span)
        .await
    }

    /// Like [`Engine::run_script`], but tags script failures.
    pub async fn run(&self, id: &ScriptId, input: Value) -> Result<ScriptOutcome, EngineError> {
        let payload = self.run_script(id, input).await?;
        Ok(ScriptOutcome::from_payload(payload))
    }

    // -------------------------------------------------------------------
    // Store pass-throughs
    // -------------------------------------------------------------------

    pub async fn list_scripts(&self) -> Result<Vec<ScriptRecord>, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.lock().await.get_all()?)
    }

    /// Removes a script. Returns `true` even if it was not installed.
    pub async fn uninstall_script(&self, id: &ScriptId) -> Result<bool, EngineError> {
        self.ensure_ready()?;
        let removed = self.store.lock().await.delete(id)?;
        tracing::info!(script = %id, "script uninstalled");
        Ok(removed)
    }

    pub async fn is_installed(&self, id: &ScriptId) -> Result<bool, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.lock().await.exists(id))
    }

    pub async fn get_script(&self, id: &ScriptId) -> Result<Option<ScriptRecord>, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.lock().await.load(id)?)
    }

    /// Case-insensitive search over installed scripts' name, author, and
    /// description.
    pub async fn search_scripts(&self, query: &str) -> Result<Vec<ScriptRecord>, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.lock().await.search(query)?)
    }

    /// Packages the runtime has provisioned successfully, sorted by name.
    ///
    /// Store-only, like [`Engine::install_script`].
    pub async fn provisioned_packages(&self) -> Result<Vec<ProvisionedPackage>, EngineError> {
        Ok(self.store.lock().await.list_packages()?)
    }

    // -------------------------------------------------------------------
    // Catalog flows
    // -------------------------------------------------------------------

    pub async fn search_catalog(
        &self,
        query: &str,
        category: &str,
    ) -> Result<Vec<CatalogEntry>, EngineError> {
        Ok(self.catalog.search(query, category).await?)
    }

    pub async fn popular_scripts(&self, limit: usize) -> Result<Vec<CatalogEntry>, EngineError> {
        Ok(self.catalog.popular(limit).await?)
    }

    /// Downloads a catalog entry and installs it under its catalog id.
    pub async fn install_from_catalog(&self, id: &ScriptId) -> Result<InstallReceipt, EngineError> {
        let descriptor = self.catalog.download(id).await?;
        self.install_script(id, descriptor).await
    }
}

/// Steps of one run, executed while `guard` is held.
///
/// Owns everything it touches so it can finish on its own task after the
/// caller has gone away.
async fn run_locked(
    mut guard: OwnedMutexGuard<Option<Box<dyn ScriptRuntime>>>,
    store: SharedStore,
    id: ScriptId,
    input: Value,
) -> Result<Value, EngineError> {
    let runtime = guard.as_mut().ok_or(EngineError::NotInitialized)?;

    // Loaded under the runtime lock so a run always sees the latest save.
    let record = store
        .lock()
        .await
        .load(&id)?
        .ok_or_else(|| EngineError::ScriptNotFound(id.clone()))?;

    provision(runtime.as_mut(), &store, &record).await;

    tracing::debug!(entry_point = %record.entry_point(), "executing script");
    runtime.execute(record.code()).await?;
    runtime.bind_global(INPUT_GLOBAL, &input).await?;
    let text = runtime.call(record.entry_point(), INPUT_GLOBAL).await?;
    drop(guard);

    let result: Value =
        serde_json::from_str(&text).map_err(|e| EngineError::MalformedResult(e.to_string()))?;
    if result.get("error").is_some() {
        tracing::info!("script raised; error folded into result");
    }
    Ok(result)
}

/// Installs the record's packages in order. Failures are logged and
/// skipped.
async fn provision(runtime: &mut dyn ScriptRuntime, store: &SharedStore, record: &ScriptRecord) {
    for package in record.packages() {
        match runtime.install_package(package).await {
            Ok(()) => {
                if let Err(err) = store.lock().await.record_package(package) {
                    tracing::warn!(package = %package, error = %err, "failed to record provisioned package");
                }
            }
            Err(err) => {
                tracing::warn!(package = %package, error = %err, "package install failed; continuing");
            }
        }
    }
}
