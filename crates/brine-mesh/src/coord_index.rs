//! Exact-match coordinate index, built once and shared by broadcast.

use std::collections::HashMap;

use brine_core::{Communicator, CoordKey, NodeId, Point};

use crate::error::MeshError;
use crate::topology::MeshTopology;

/// Maps bit-exact coordinates back to archive node numbering.
///
/// Rank 0 builds the index from the node table, encodes it to a byte
/// frame, and broadcasts; all ranks decode the identical frame, so the
/// shared index is bit-for-bit the same everywhere. Lookups are exact:
/// a coordinate is found only if its components match a node's stored
/// bits exactly.
///
/// If two nodes carry identical coordinates the later node wins, as in
/// a plain dictionary build over the node table.
#[derive(Clone, Debug)]
pub struct CoordinateIndex {
    map: HashMap<CoordKey, u32>,
    encoded: Vec<u8>,
}

impl CoordinateIndex {
    /// Build the index locally from a node table.
    pub fn build(topology: &MeshTopology) -> Self {
        let nodes = topology.nodes();
        let mut map = HashMap::with_capacity(nodes.len());
        for (i, p) in nodes.iter().enumerate() {
            map.insert(CoordKey::new(*p), i as u32);
        }
        Self {
            map,
            encoded: encode_nodes(nodes),
        }
    }

    /// Build on rank 0 and broadcast to the group.
    pub fn build_and_share(
        topology: &MeshTopology,
        comm: &dyn Communicator,
    ) -> Result<Self, MeshError> {
        let frame = if comm.rank() == 0 {
            encode_nodes(topology.nodes())
        } else {
            Vec::new()
        };
        let frame = comm.broadcast(0, frame)?;
        Self::decode(&frame)
    }

    /// Decode a broadcast frame.
    pub fn decode(frame: &[u8]) -> Result<Self, MeshError> {
        if frame.len() < 8 {
            return Err(MeshError::MalformedIndexFrame);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&frame[..8]);
        let count = u64::from_le_bytes(buf) as usize;
        if frame.len() != 8 + count * 16 {
            return Err(MeshError::MalformedIndexFrame);
        }
        let mut map = HashMap::with_capacity(count);
        for i in 0..count {
            let at = 8 + i * 16;
            let mut bits = [0u64; 2];
            for (axis, chunk) in frame[at..at + 16].chunks_exact(8).enumerate() {
                buf.copy_from_slice(chunk);
                bits[axis] = u64::from_le_bytes(buf);
            }
            map.insert(CoordKey::from_bits(bits), i as u32);
        }
        Ok(Self {
            map,
            encoded: frame.to_vec(),
        })
    }

    /// The canonical byte frame this index was built from or decoded
    /// out of. Identical across ranks after a share.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Exact-match lookup of a coordinate.
    pub fn lookup(&self, point: Point) -> Option<NodeId> {
        self.map.get(&CoordKey::new(point)).map(|&n| NodeId(n))
    }

    /// Number of distinct indexed coordinates.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Frame layout: node count (LE u64), then per node the two coordinate
/// bit patterns (LE u64 each) in node order.
fn encode_nodes(nodes: &[Point]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(8 + nodes.len() * 16);
    frame.extend_from_slice(&(nodes.len() as u64).to_le_bytes());
    for p in nodes {
        let key = CoordKey::new(*p);
        for bits in key.bits() {
            frame.extend_from_slice(&bits.to_le_bytes());
        }
    }
    frame
}
