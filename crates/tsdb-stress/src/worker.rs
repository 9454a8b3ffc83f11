//! Worker dispatch: N independent workers, each looping over generator passes.

use crate::config::{Config, TrafficShape};
use crate::context::RunContext;
use crate::error::{ConfigError, TransportError};
use crate::point::DataList;
use crate::transport::{build_transport, Transport};
use crate::workload::{run_pass, submissions_per_pass};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Spawns and supervises the workers of a run.
pub struct Dispatcher {
    config: Arc<Config>,
    ctx: Arc<RunContext>,
}

impl Dispatcher {
    /// Validates `config`; nothing is started on failure.
    pub fn new(config: Config, ctx: RunContext) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            ctx: Arc::new(ctx),
        })
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Starts every worker and waits for all of them.
    ///
    /// Workers only stop once `shutdown` is cancelled, after finishing the
    /// pass in progress. Without cancellation this never returns.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), TransportError> {
        let servers: Arc<[String]> = self.config.servers.clone().into();

        let mut transports = Vec::with_capacity(self.config.workers);
        for worker_id in 1..=self.config.workers {
            transports.push(build_transport(
                self.config.protocol,
                worker_id,
                Arc::clone(&servers),
                self.config.port,
            )?);
        }

        info!(
            "Starting {} worker(s) using {} against {} server(s) on port {}, {} submission(s) per pass",
            self.config.workers,
            self.config.protocol,
            servers.len(),
            self.config.port,
            submissions_per_pass(&self.config.shape)
        );

        let mut workers = JoinSet::new();
        for (worker_id, transport) in (1..).zip(transports) {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&self.ctx),
                self.config.shape.clone(),
                transport,
                shutdown.clone(),
            ));
        }

        let mut total_passes = 0;
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(passes) => total_passes += passes,
                Err(e) => error!("Worker task failed: {}", e),
            }
        }

        info!("All workers stopped after {} pass(es)", total_passes);
        Ok(())
    }
}

/// Runs generator passes until `shutdown` is cancelled. Returns the number
/// of completed passes.
///
/// A shape with no hosts or no services produces no traffic; the worker
/// then returns at once without running any pass.
pub async fn run_worker<T: Transport>(
    worker_id: usize,
    ctx: Arc<RunContext>,
    shape: TrafficShape,
    transport: T,
    shutdown: CancellationToken,
) -> u64 {
    if shape.host_count == 0 || shape.service_count == 0 {
        error!(
            worker = worker_id,
            hosts = shape.host_count,
            services = shape.service_count,
            "Host and service counts must be greater than zero, worker not started"
        );
        return 0;
    }

    debug!("Starting worker: {}", worker_id);
    let mut data = DataList::new(&ctx, shape.dataset_size);

    let mut passes = 0;
    while !shutdown.is_cancelled() {
        run_pass(&ctx, &shape, &transport, &mut data).await;
        passes += 1;
        tokio::task::yield_now().await;
    }

    debug!(worker = worker_id, passes, "Worker stopped");
    passes
}
