//! Demonstrates the flattened per-name aggregation.
//!
//! The same region name can occur at several positions of the call tree; the
//! flattened view groups all of them into a single row, which is the view you
//! want for "where does the time go overall?" questions.
//!
//! Run with: `cargo run --example nested_time_flattened`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::hint::black_box;

use nested_time::Session;

fn checksum(len: u64) -> u64 {
    let mut sum = 0_u64;
    for i in 0..len {
        sum = sum.rotate_left(3).wrapping_add(i);
    }
    sum
}

fn main() -> Result<(), nested_time::Error> {
    let session = Session::new();

    // "checksum" appears both under "load" and under "store".
    for _ in 0..4 {
        let _request = session.measure("request")?;

        {
            let _load = session.measure("load")?;
            let _checksum = session.measure("checksum")?;
            black_box(checksum(50_000));
        }

        {
            let _store = session.measure("store")?;
            let _checksum = session.measure("checksum")?;
            black_box(checksum(150_000));
        }
    }

    let mut report = session.to_report();

    println!("Call tree:");
    for row in report.top_down() {
        println!("  {row}");
    }
    println!();

    println!("Flattened by name:");
    let mut summaries: Vec<_> = report.flattened()?.into_iter().collect();
    summaries.sort_by(|a, b| b.1.duration().cmp(&a.1.duration()));
    for (name, summary) in summaries {
        println!(
            "  {name}: {} activations, {:?} total, {} ns exclusive",
            summary.count(),
            summary.duration(),
            summary.exclusive_nanos()
        );
    }

    Ok(())
}
