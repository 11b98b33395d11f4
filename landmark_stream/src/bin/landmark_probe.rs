//! Print what a hand detector is sending: index-tip position and pinch
//! distance per frame.  Point it at a recording or pipe a live detector in.
//!
//! ```text
//! python3 detect_hands.py | landmark_probe --threshold 0.05
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use landmark_stream::{DetectorMessage, FrameReader};

#[derive(Parser, Debug)]
#[command(name = "landmark_probe", version, about = "Inspect a hand-detector NDJSON stream")]
struct Args {
    /// Recording to read; stdin when omitted
    input: Option<PathBuf>,

    /// Pinch distance (normalized) below which the hand counts as pinching
    #[arg(short, long, default_value_t = 0.05)]
    threshold: f32,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut frames = 0usize;
    let mut pinches = 0usize;
    let mut was_pinching = false;

    for msg in FrameReader::new(reader) {
        match msg {
            Ok(DetectorMessage::Ready) => println!("  ── detector ready ──"),
            Ok(DetectorMessage::Fault(reason)) => {
                println!("  ✗ detector fault: {}", reason);
                break;
            }
            Ok(DetectorMessage::Frame(frame)) => {
                frames += 1;
                match frame.primary() {
                    Some(hand) => {
                        let tip = hand.index_tip();
                        let d = hand.pinch_distance();
                        let pinching = d < args.threshold;
                        if pinching && !was_pinching {
                            pinches += 1;
                        }
                        was_pinching = pinching;
                        println!(
                            "  [{:>5}] hands={} {:<5}  tip=({:.3}, {:.3})  pinch={:.3}{}",
                            frames,
                            frame.hands.len(),
                            hand.handedness.map_or("?", |h| h.as_str()),
                            tip.x,
                            tip.y,
                            d,
                            if pinching { "  ●" } else { "" },
                        );
                    }
                    None => println!("  [{:>5}] no hand", frames),
                }
            }
            Err(e) => eprintln!("  ⚠  {}", e),
        }

        if args.limit.is_some_and(|n| frames >= n) {
            break;
        }
    }

    println!();
    println!("  {} frames, {} pinch closes", frames, pinches);
    Ok(())
}
