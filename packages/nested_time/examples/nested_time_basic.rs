//! Simplified example demonstrating key `nested_time` types working together.
//!
//! This example instruments a mock render loop with nested regions and prints
//! the resulting call tree.
//!
//! Run with: `cargo run --example nested_time_basic`.
#![expect(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    reason = "this is example code that does not need production-level safety"
)]

use std::hint::black_box;

use nested_time::Session;

fn main() -> Result<(), nested_time::Error> {
    println!("=== Region Timing Example ===");
    println!();

    // One session per logical thread of control.
    let session = Session::new();

    for frame in 0..8 {
        let _frame = session.measure("frame")?;

        {
            let _layout = session.measure("layout")?;
            // Simulate layout work.
            let mut sum = 0_u64;
            for i in 0..20_000_u64 {
                sum = sum.wrapping_mul(31).wrapping_add(i * frame);
            }
            black_box(sum);
        }

        {
            let _paint = session.measure("paint")?;
            {
                let _text = session.measure("text")?;
                let mut line = String::new();
                for glyph in 0..2_000_u32 {
                    line.push(char::from(b'a' + (glyph % 26) as u8));
                }
                black_box(line);
            }
            {
                let _shapes = session.measure("shapes")?;
                let mut area = 0.0_f64;
                for i in 1..5_000_u32 {
                    area += f64::from(i).sqrt();
                }
                black_box(area);
            }
        }
    }

    // Print the call tree: children sorted by duration descending, with
    // "(Unaccounted)" rows showing each region's own time.
    session.print_to_stdout();

    Ok(())
}
