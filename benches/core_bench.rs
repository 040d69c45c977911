//! Benchmarks for virl-packet core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use virl_packet::core::types::Verbosity;
use virl_packet::core::userdata::{CloudConfig, UserdataOptions};
use virl_packet::poller::{address, decide};

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    let cases = [
        ("unchanged", "running", "Installing VIRL", Some("Installing VIRL")),
        ("changed", "running", "Installing VIRL", Some("Provisioning")),
        ("terminal", "succeeded", "Provisioned 147.75.1.9", Some("Installing VIRL")),
    ];
    for mode in [Verbosity::Normal, Verbosity::IpOnly, Verbosity::Silent] {
        for (name, state, body, last) in cases {
            let id = format!("{:?}/{}", mode, name);
            group.bench_with_input(BenchmarkId::from_parameter(id), &mode, |b, &mode| {
                b.iter(|| black_box(decide(black_box(state), black_box(body), last, mode)));
            });
        }
    }
    group.finish();
}

fn bench_extract_ipv4(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_ipv4");
    for pad in [0, 256, 4096] {
        let body = format!("{}Deployment complete, IP 10.0.0.5 assigned", "x".repeat(pad));
        group.bench_with_input(BenchmarkId::from_parameter(pad), &body, |b, body| {
            b.iter(|| black_box(address::extract_ipv4(black_box(body))));
        });
    }
    group.finish();
}

fn bench_cloud_config(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("cloud_config_render");
    for lines in [0, 30, 300] {
        let license = if lines == 0 {
            None
        } else {
            let path = dir.path().join(format!("bench-{lines}.virl.info.pem"));
            let pem: String = (0..lines).map(|i| format!("MIIE{i:060}\n")).collect();
            std::fs::write(&path, pem).unwrap();
            Some(path)
        };
        let opts = UserdataOptions {
            virl_password: Some("virl".to_string()),
            uwm_password: Some("uwm".to_string()),
            guest_password: Some("guest".to_string()),
            license_file: license,
        };
        let cc = CloudConfig::from_options(&opts).unwrap().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(lines), &cc, |b, cc| {
            b.iter(|| black_box(cc.render().unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decide, bench_extract_ipv4, bench_cloud_config);
criterion_main!(benches);
