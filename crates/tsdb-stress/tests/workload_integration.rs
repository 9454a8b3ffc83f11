use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tsdb_stress::{
    host_sequence, run_pass, run_pass_from, Config, DataList, DataPoint, Dispatcher, Protocol,
    RunContext, TrafficShape, Transport,
};

/// Keeps a copy of every submitted list.
#[derive(Default)]
struct RecordingTransport {
    submitted: Mutex<Vec<DataList>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn submit(&self, data: &DataList) -> tsdb_stress::Result<()> {
        self.submitted.lock().unwrap().push(data.clone());
        Ok(())
    }
}

fn small_shape() -> TrafficShape {
    TrafficShape {
        dataset_size: 2,
        host_count: 2,
        service_count: 2,
        keyspace: "stats".to_string(),
    }
}

#[tokio::test]
async fn two_by_two_pass_issues_six_submissions() {
    let ctx = RunContext::with_nonce("run1");
    let shape = small_shape();
    let transport = RecordingTransport::default();
    let mut data = DataList::new(&ctx, shape.dataset_size);

    run_pass_from(0, &ctx, &shape, &transport, &mut data).await;

    let submitted = transport.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 6);

    let expected = [
        ("host-run1-1", "service-run1-1"),
        ("host-run1-1", "service-run1-2"),
        ("host-run1-2", "service-run1-1"),
        ("host-run1-2", "service-run1-2"),
        ("host-run1-1", "service-run1-1"),
        ("host-run1-1", "service-run1-2"),
    ];

    for (list, (host, service)) in submitted.iter().zip(expected) {
        assert_eq!(list.len(), 2);
        for (index, point) in list.iter().enumerate() {
            assert_eq!(point.metric, format!("testing.metric.run-run1.index-{}", index));
            assert_eq!(point.tags["host"], host);
            assert_eq!(point.tags["service"], service);
            assert_eq!(point.tags["ksid"], "stats");
            assert!(point.value >= 0);
        }
    }
}

#[tokio::test]
async fn random_pass_revisits_first_host_at_the_end() {
    let ctx = RunContext::with_nonce("run2");
    let shape = TrafficShape {
        dataset_size: 1,
        host_count: 4,
        service_count: 3,
        keyspace: "stats".to_string(),
    };
    let transport = RecordingTransport::default();
    let mut data = DataList::new(&ctx, shape.dataset_size);

    run_pass(&ctx, &shape, &transport, &mut data).await;

    let submitted = transport.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 15);

    let hosts: Vec<&str> = submitted
        .iter()
        .step_by(3)
        .map(|list| list.first().unwrap().tags["host"].as_str())
        .collect();
    assert_eq!(hosts.len(), 5);
    assert_eq!(hosts.first(), hosts.last());

    let mut distinct = hosts.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 4);
}

#[tokio::test]
async fn buffer_keeps_unrelated_tags_across_passes() {
    let ctx = RunContext::with_nonce("run3");
    let shape = small_shape();
    let transport = RecordingTransport::default();
    let mut data = DataList::new(&ctx, shape.dataset_size);
    for point in data.iter_mut() {
        point.tags.insert("dc".to_string(), "west".to_string());
    }

    run_pass_from(1, &ctx, &shape, &transport, &mut data).await;

    let submitted = transport.submitted.lock().unwrap();
    assert!(submitted
        .iter()
        .flat_map(|list| list.iter())
        .all(|p| p.tags["dc"] == "west" && p.tags.len() == 4));
}

#[test]
fn host_sequence_matches_pass_order() {
    let ids: Vec<u64> = host_sequence(1, 2).collect();
    assert_eq!(ids, vec![2, 1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatcher_runs_until_cancelled() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let config = Config {
        servers: vec!["127.0.0.1".to_string()],
        port: receiver.local_addr().unwrap().port(),
        protocol: Protocol::Udp,
        workers: 2,
        shape: TrafficShape {
            dataset_size: 1,
            host_count: 1,
            service_count: 1,
            keyspace: "stats".to_string(),
        },
    };
    let dispatcher = Dispatcher::new(config, RunContext::with_nonce("run4")).unwrap();

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let handle = tokio::spawn(async move { dispatcher.run(token).await });

    let mut buf = vec![0u8; 64 * 1024];
    for _ in 0..10 {
        let len = tokio::time::timeout(Duration::from_secs(5), receiver.recv(&mut buf))
            .await
            .expect("no traffic from workers")
            .unwrap();
        let point: DataPoint = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(point.metric, "testing.metric.run-run4.index-0");
        assert_eq!(point.tags["host"], "host-run4-1");
    }

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("workers did not stop")
        .unwrap();
    assert!(result.is_ok());
}
