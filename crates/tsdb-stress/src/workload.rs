//! Generator pass over the host × service combinations.

use crate::config::TrafficShape;
use crate::context::RunContext;
use crate::point::DataList;
use crate::transport::Transport;
use rand::Rng;
use tracing::{error, warn};

/// Host ids visited by a pass starting at offset `start`.
///
/// Yields `host_count + 1` ids in `1..=host_count`, wrapping around, so the
/// first id is visited again as the last one.
pub fn host_sequence(start: u64, host_count: u64) -> impl Iterator<Item = u64> {
    (0..=host_count).map(move |delta| ((start + delta) % host_count) + 1)
}

/// Number of submissions one pass performs.
pub fn submissions_per_pass(shape: &TrafficShape) -> u64 {
    (shape.host_count + 1) * shape.service_count
}

/// Runs one pass from a random host offset.
pub async fn run_pass<T: Transport + ?Sized>(
    ctx: &RunContext,
    shape: &TrafficShape,
    transport: &T,
    data: &mut DataList,
) {
    if shape.host_count == 0 {
        warn!("Host count is zero, nothing to send");
        return;
    }
    let start = rand::thread_rng().gen_range(0..shape.host_count);
    run_pass_from(start, ctx, shape, transport, data).await;
}

/// Runs one pass from host offset `start`.
///
/// For every (host, service) pair the whole buffer is retagged and
/// re-randomized, then submitted. Failed submissions are logged and the
/// pass moves on to the next pair.
pub async fn run_pass_from<T: Transport + ?Sized>(
    start: u64,
    ctx: &RunContext,
    shape: &TrafficShape,
    transport: &T,
    data: &mut DataList,
) {
    if shape.host_count == 0 {
        return;
    }

    for host_id in host_sequence(start, shape.host_count) {
        let host = ctx.host_tag(host_id);
        for service_id in 1..=shape.service_count {
            let service = ctx.service_tag(service_id);
            data.refresh(&host, &service, &shape.keyspace, &mut rand::thread_rng());

            if let Err(e) = transport.submit(data).await {
                error!(host = host_id, service = service_id, "Error: {}", e);
            }
        }
    }
}
