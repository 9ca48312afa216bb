use std::hint::black_box;
use std::time::Instant;

use rand_core::OsRng;

use tscmp::application::Settings;
use tscmp::secure_eq;
use tscmp::timing::{measure, TimingGroup};

const ROUNDS: usize = 200_000;

fn main() {
    for len in [16usize, 64, 256, 1024, 4096] {
        let a = vec![0x5au8; len];
        let b = vec![0x5au8; len];
        let start = Instant::now();
        for _ in 0..ROUNDS {
            black_box(secure_eq(black_box(a.as_slice()), black_box(b.as_slice())));
        }
        let ns = start.elapsed().as_nanos() as f64 / ROUNDS as f64;
        println!("secure_eq {:>5} bytes: {:>9.1} ns/op {:>6.2} GB/s", len, ns, len as f64 / ns);
    }

    let settings = Settings::default();
    let report = match measure(&settings, &mut OsRng) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("timing harness failed: {}", e);
            std::process::exit(1);
        }
    };
    for g in TimingGroup::ALL {
        let s = report.group(g);
        println!(
            "{:<16} median {:>9.1} ns  mean {:>9.1} ns  sd {:>8.1} ns  ({} samples)",
            format!("{:?}", g),
            s.median_ns,
            s.mean_ns,
            s.std_dev_ns,
            s.samples
        );
    }
    for (x, y, t) in report.welch_t() {
        println!("welch t {:?} vs {:?}: {:.2}", x, y, t);
    }
    println!(
        "max |t| {:.2} (limit {:.2}), relative spread {:.3} (limit {:.3}): {}",
        report.max_abs_t(),
        settings.max_abs_t,
        report.relative_spread,
        settings.max_relative_spread,
        if report.passed { "PASS" } else { "FAIL" }
    );
}
