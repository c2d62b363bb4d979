//! Vertex group writer (`VTXG`).
//!
//! One chunk per group. Weights are stored sparsely as runs of consecutive
//! assigned vertices:
//!
//! ```text
//! str name, u16 active, u32 range_count,
//!   per range: u32 start, u32 end (inclusive), f32 weight * (end - start + 1)
//! ```

use std::collections::BTreeMap;
use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::scene::VertexGroup;
use crate::util::Result;

pub const VERSION: u32 = 1;

/// Run of consecutive vertices with assigned weights.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRange {
    pub start: u32,
    pub end: u32,
    pub weights: Vec<f32>,
}

/// Split sparse weights into inclusive runs. Later duplicates win.
pub fn weight_ranges(weights: &[(u32, f32)]) -> Vec<WeightRange> {
    let sorted: BTreeMap<u32, f32> = weights.iter().copied().collect();

    let mut ranges: Vec<WeightRange> = Vec::new();
    for (vertex, weight) in sorted {
        match ranges.last_mut() {
            Some(run) if run.end.checked_add(1) == Some(vertex) => {
                run.end = vertex;
                run.weights.push(weight);
            }
            _ => ranges.push(WeightRange { start: vertex, end: vertex, weights: vec![weight] }),
        }
    }
    ranges
}

/// Write the `VTXG` payload of one group.
pub fn write_vertex_group<W: Write + Seek>(
    out: &mut OStream<W>,
    group: &VertexGroup,
    active: bool,
) -> Result<()> {
    let ranges = weight_ranges(&group.weights);
    out.write_string(&group.name)?;
    out.write_flag(active)?;
    out.write_u32(ranges.len() as u32)?;
    for range in ranges {
        out.write_u32(range.start)?;
        out.write_u32(range.end)?;
        for w in range.weights {
            out.write_f32(w)?;
        }
    }
    Ok(())
}
