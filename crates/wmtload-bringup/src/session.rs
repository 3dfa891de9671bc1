use std::sync::atomic::{AtomicBool, Ordering};

use wmtload_ioctl::{ControlCommand, ControlDevice, IoctlArg, SharedDevice};
use wmtload_patch::PatchStore;

use crate::config::LauncherConfig;
use crate::error::{BringupError, Result};
use crate::identity::ChipIdentity;

/// State shared by the launcher's workers.
///
/// Lives from launcher configuration until process exit.
pub struct BringupSession<D> {
    device: SharedDevice<D>,
    identity: ChipIdentity,
    config: LauncherConfig,
    store: PatchStore,
    patch_count_sent: AtomicBool,
}

impl<D: ControlDevice> BringupSession<D> {
    pub fn new(device: SharedDevice<D>, identity: ChipIdentity, config: LauncherConfig) -> Self {
        let store = PatchStore::new(&config.firmware_dir);
        Self {
            device,
            identity,
            config,
            store,
            patch_count_sent: AtomicBool::new(false),
        }
    }

    pub fn device(&self) -> &SharedDevice<D> {
        &self.device
    }

    pub fn identity(&self) -> &ChipIdentity {
        &self.identity
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    /// Whether the RAM patch count has been told to the driver.
    pub fn patch_count_sent(&self) -> bool {
        self.patch_count_sent.load(Ordering::Acquire)
    }

    pub(crate) fn mark_patch_count_sent(&self) {
        self.patch_count_sent.store(true, Ordering::Release);
    }

    /// Issue a control call whose failure ends the current step.
    pub(crate) fn call(
        &self,
        step: &'static str,
        command: ControlCommand,
        arg: IoctlArg<'_>,
    ) -> Result<i64> {
        self.device
            .invoke(command, arg)
            .map_err(|source| BringupError::Os { step, source })
    }
}

impl<D> std::fmt::Debug for BringupSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BringupSession")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("patch_count_sent", &self.patch_count_sent)
            .finish_non_exhaustive()
    }
}
