use std::sync::Arc;

use tracing::{debug, info};

use crate::db::models::{ControlState, Mode};
use crate::error::Result;
use crate::store::ControlRegister;

/// Orchestrates the control register: mode switches, manual pump requests
/// and the one-shot calibration handshake.
///
/// Every operation is a single atomic `ControlRegister::update`, so
/// concurrent device polls and operator writes serialize on the document
/// and no request can be lost between a read and its write-back.
#[derive(Clone)]
pub struct ControlService {
    register: Arc<dyn ControlRegister>,
}

impl ControlService {
    pub fn new(register: Arc<dyn ControlRegister>) -> Self {
        Self { register }
    }

    /// Switch the pump to automatic operation.
    pub async fn set_auto(&self) -> Result<ControlState> {
        let swap = self
            .register
            .update(Box::new(|s| s.mode = Mode::Auto))
            .await?;
        info!(mode = %swap.after.mode, "Control mode set");
        Ok(swap.after)
    }

    /// Switch to manual operation with the operator's desired pump state.
    pub async fn set_manual(&self, pump_request: bool) -> Result<ControlState> {
        let swap = self
            .register
            .update(Box::new(move |s| {
                s.mode = Mode::Manual;
                s.manual_pump_request = pump_request;
            }))
            .await?;
        info!(
            mode = %swap.after.mode,
            pump_request = swap.after.manual_pump_request,
            "Control mode set"
        );
        Ok(swap.after)
    }

    /// Latch a calibration request for the device's next poll.
    ///
    /// Idempotent while pending: repeated requests keep the latch set, they
    /// do not queue multiple calibrations.
    pub async fn request_calibration(&self) -> Result<ControlState> {
        let swap = self
            .register
            .update(Box::new(|s| s.calibration_pending = true))
            .await?;
        info!(
            already_pending = swap.before.calibration_pending,
            "Calibration requested"
        );
        Ok(swap.after)
    }

    /// Device poll: snapshot the control state and clear the calibration
    /// latch in the same atomic step.
    ///
    /// Returns the pre-clear snapshot, so exactly one poll observes a
    /// pending calibration as `true`; every later poll (absent a new
    /// request) observes `false`.
    pub async fn poll_for_device(&self) -> Result<ControlState> {
        let swap = self
            .register
            .update(Box::new(|s| s.calibration_pending = false))
            .await?;
        if swap.before.calibration_pending {
            info!("Calibration delivered to device");
        } else {
            debug!(mode = %swap.before.mode, "Device poll");
        }
        Ok(swap.before)
    }
}
