use ndarray::prelude::*;
use seglineage::{Connectivity, Lineage, LineageBuilder, LineageConfig};

/// Two cells drifting right; the second divides halfway through.
fn synthetic(depth: usize, height: usize, width: usize) -> Array3<u16> {
    let mut ids = Array3::<u16>::zeros((depth, height, width));
    let split_at = depth / 2;

    for z in 0..depth {
        let x = (z * 2).min(width.saturating_sub(4));
        let mut frame = ids.index_axis_mut(Axis(0), z);

        frame.slice_mut(s![1..4, x..x + 3]).fill(1);

        if z < split_at {
            frame.slice_mut(s![height - 5..height - 1, x..x + 4]).fill(2);
        } else {
            frame.slice_mut(s![height - 8..height - 6, x..x + 4]).fill(2);
            frame.slice_mut(s![height - 3..height - 1, x..x + 4]).fill(2);
        }
    }

    ids
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let connectivity = match args.next().as_deref() {
        Some("c8") => Connectivity::C8,
        _ => Connectivity::C4,
    };

    let ids = synthetic(8, 16, 24);
    let graph = LineageBuilder::new(LineageConfig::new(connectivity)).build(ids.view())?;

    for track in &graph.tracks {
        eprintln!("{}", track);
        println!("{}", serde_json::to_string(track)?);
    }

    for (parent, children) in graph.splits() {
        eprintln!("split: {} -> {:?}", parent, children);
    }

    Ok(())
}
