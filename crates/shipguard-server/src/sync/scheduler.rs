//! Worker scheduler
//!
//! Registers the three periodic reconciliation workers on an apalis
//! monitor, each driven by its own cron stream. Cadences are nominal
//! (daily / every 5 hours); overlapping runs are safe because every
//! mutation is idempotent and keyed per order.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use apalis::prelude::*;
use apalis_cron::{CronStream, Tick};
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{workers, SyncContext};
use crate::config::SchedulerConfig;

/// Cron tick payload handed to the worker functions.
#[derive(Clone, Debug)]
pub struct ReconcileTick(pub DateTime<Utc>);

impl From<DateTime<Utc>> for ReconcileTick {
    fn from(t: DateTime<Utc>) -> Self {
        ReconcileTick(t)
    }
}

/// Worker scheduler
pub struct SyncScheduler {
    config: SchedulerConfig,
    ctx: Arc<SyncContext>,
}

impl SyncScheduler {
    /// Create a new scheduler over the shared sync context
    pub fn new(config: SchedulerConfig, ctx: Arc<SyncContext>) -> Self {
        Self { config, ctx }
    }

    /// Start the scheduler
    ///
    /// Parses the three cron expressions, registers one worker per entry
    /// point, and spawns the monitor into its own task.
    pub async fn start(self) -> Result<JoinHandle<()>> {
        let missing_orders = Schedule::from_str(&self.config.missing_orders_cron)?;
        let missing_shipments = Schedule::from_str(&self.config.missing_shipments_cron)?;
        let webhook_validator = Schedule::from_str(&self.config.webhook_validator_cron)?;

        info!(
            missing_orders = %self.config.missing_orders_cron,
            missing_shipments = %self.config.missing_shipments_cron,
            webhook_validator = %self.config.webhook_validator_cron,
            "starting reconciliation workers"
        );

        let ctx = self.ctx;
        let handle = tokio::spawn(async move {
            let monitor = Monitor::new()
                .register({
                    let ctx = ctx.clone();
                    move |_index| {
                        WorkerBuilder::new("missing-orders-worker")
                            .backend(CronStream::new(missing_orders.clone()))
                            .data(ctx.clone())
                            .build(run_missing_orders)
                    }
                })
                .register({
                    let ctx = ctx.clone();
                    move |_index| {
                        WorkerBuilder::new("missing-shipments-worker")
                            .backend(CronStream::new(missing_shipments.clone()))
                            .data(ctx.clone())
                            .build(run_missing_shipments)
                    }
                })
                .register({
                    let ctx = ctx.clone();
                    move |_index| {
                        WorkerBuilder::new("webhook-validator-worker")
                            .backend(CronStream::new(webhook_validator.clone()))
                            .data(ctx.clone())
                            .build(run_webhook_validator)
                    }
                });

            if let Err(e) = monitor.run().await {
                error!("worker monitor error: {:?}", e);
            }
            info!("reconciliation workers stopped");
        });

        Ok(handle)
    }
}

async fn run_missing_orders(_tick: Tick<Utc>, ctx: Data<Arc<SyncContext>>) -> Result<()> {
    workers::missing_orders_pass(&ctx).await?;
    Ok(())
}

async fn run_missing_shipments(_tick: Tick<Utc>, ctx: Data<Arc<SyncContext>>) -> Result<()> {
    workers::missing_shipments_pass(&ctx).await?;
    Ok(())
}

async fn run_webhook_validator(_tick: Tick<Utc>, ctx: Data<Arc<SyncContext>>) -> Result<()> {
    workers::webhook_validator_pass(&ctx).await?;
    Ok(())
}
