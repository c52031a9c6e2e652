//! Background sweeps: perk expiry and risk evaluation.
//!
//! Both jobs are idempotent, so any cadence is safe and overlapping
//! with live requests is fine - they are ordinary writer jobs.

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Initial delay before the first sweep, to let the server settle.
const INITIAL_DELAY_SECS: u64 = 30;

pub fn start_sweeps(state: Arc<AppState>) {
    start_perk_expiry_sweep(state.clone());
    start_risk_sweep(state);
}

fn start_perk_expiry_sweep(state: Arc<AppState>) {
    let period = state.config.perk_sweep_interval;
    tokio::spawn(async move {
        info!("perk expiry sweep scheduled every {:?}", period);
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            match state.subscription_service.expire_due_perks().await {
                Ok(0) => debug!("perk sweep: nothing to expire"),
                Ok(cleared) => info!("perk sweep cleared {} perks", cleared),
                Err(err) => warn!("perk sweep failed: {}", err),
            }
        }
    });
}

fn start_risk_sweep(state: Arc<AppState>) {
    let period = state.config.risk_sweep_interval;
    tokio::spawn(async move {
        info!("risk sweep scheduled every {:?}", period);
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            match state.risk_service.sweep().await {
                Ok(0) => debug!("risk sweep: no flags"),
                Ok(flagged) => info!("risk sweep flagged {} users", flagged),
                Err(err) => warn!("risk sweep failed: {}", err),
            }
        }
    });
}
