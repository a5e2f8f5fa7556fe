//! The rank communicator: an explicit object every distributed
//! operation goes through.
//!
//! The group is SPMD: all ranks call the same collectives in the same
//! order, and every collective blocks until the group completes it.
//! Payloads are opaque byte frames; callers own their encoding.
//!
//! Two implementations are provided: [`SoloComm`] for single-rank runs
//! (collectives degenerate to copies) and [`ThreadComm`] for a fixed
//! in-process group wired with bounded crossbeam channels, used by the
//! distributed test suites.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::CommError;

/// A fixed group of cooperating ranks.
///
/// Rank and size are constant for the life of the group. Collectives
/// must be entered by every rank; there is no cancellation or retry.
pub trait Communicator: Send {
    /// This rank's index within the group.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Distribute `root`'s payload to every rank. Non-root payloads are
    /// ignored; every rank returns the root's bytes.
    fn broadcast(&self, root: usize, payload: Vec<u8>) -> Result<Vec<u8>, CommError>;

    /// Collect one payload per rank at `root`, in rank order. Returns
    /// `Some(parts)` on the root and `None` elsewhere.
    fn gather(&self, root: usize, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CommError>;

    /// Collect one payload per rank, in rank order, on every rank.
    fn all_gather(&self, payload: Vec<u8>) -> Result<Vec<Vec<u8>>, CommError> {
        let frame = match self.gather(0, payload)? {
            Some(parts) => self.broadcast(0, encode_parts(&parts))?,
            None => self.broadcast(0, Vec::new())?,
        };
        decode_parts(&frame)
    }

    /// Block until every rank has arrived.
    fn barrier(&self) -> Result<(), CommError> {
        self.all_gather(Vec::new()).map(|_| ())
    }
}

/// Frame a list of payloads for broadcast: a count, then each part
/// length-prefixed. Lengths are little-endian u64.
fn encode_parts(parts: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| 8 + p.len()).sum();
    let mut frame = Vec::with_capacity(8 + total);
    frame.extend_from_slice(&(parts.len() as u64).to_le_bytes());
    for part in parts {
        frame.extend_from_slice(&(part.len() as u64).to_le_bytes());
        frame.extend_from_slice(part);
    }
    frame
}

fn decode_parts(frame: &[u8]) -> Result<Vec<Vec<u8>>, CommError> {
    let mut pos = 0usize;
    let count = read_u64(frame, &mut pos)? as usize;
    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_u64(frame, &mut pos)? as usize;
        let end = pos.checked_add(len).ok_or(CommError::MalformedFrame)?;
        if end > frame.len() {
            return Err(CommError::MalformedFrame);
        }
        parts.push(frame[pos..end].to_vec());
        pos = end;
    }
    if pos != frame.len() {
        return Err(CommError::MalformedFrame);
    }
    Ok(parts)
}

fn read_u64(frame: &[u8], pos: &mut usize) -> Result<u64, CommError> {
    let end = pos.checked_add(8).ok_or(CommError::MalformedFrame)?;
    if end > frame.len() {
        return Err(CommError::MalformedFrame);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&frame[*pos..end]);
    *pos = end;
    Ok(u64::from_le_bytes(buf))
}

/// The single-rank group. Every collective completes immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoloComm;

impl Communicator for SoloComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast(&self, root: usize, payload: Vec<u8>) -> Result<Vec<u8>, CommError> {
        if root != 0 {
            return Err(CommError::RankOutOfRange { rank: root, size: 1 });
        }
        Ok(payload)
    }

    fn gather(&self, root: usize, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CommError> {
        if root != 0 {
            return Err(CommError::RankOutOfRange { rank: root, size: 1 });
        }
        Ok(Some(vec![payload]))
    }
}

/// One rank's endpoint in an in-process thread group.
///
/// [`ThreadComm::group`] wires a full mesh of bounded channels between
/// the ranks; each endpoint is then moved onto its own thread. The
/// matched-order SPMD discipline keeps the bounded buffers from
/// deadlocking.
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    /// `senders[j]` transmits to rank j; the own slot is `None`.
    senders: Vec<Option<Sender<Vec<u8>>>>,
    /// `receivers[j]` receives from rank j; the own slot is `None`.
    receivers: Vec<Option<Receiver<Vec<u8>>>>,
}

impl ThreadComm {
    /// Create a wired group of `size` endpoints, indexed by rank.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let mut senders: Vec<Vec<Option<Sender<Vec<u8>>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut receivers: Vec<Vec<Option<Receiver<Vec<u8>>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        for from in 0..size {
            for to in 0..size {
                if from == to {
                    continue;
                }
                let (tx, rx) = bounded(1);
                senders[from][to] = Some(tx);
                receivers[to][from] = Some(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (senders, receivers))| ThreadComm {
                rank,
                size,
                senders,
                receivers,
            })
            .collect()
    }

    fn send_to(&self, peer: usize, payload: Vec<u8>) -> Result<(), CommError> {
        match &self.senders[peer] {
            Some(tx) => tx
                .send(payload)
                .map_err(|_| CommError::PeerDisconnected { rank: peer }),
            None => Err(CommError::PeerDisconnected { rank: peer }),
        }
    }

    fn recv_from(&self, peer: usize) -> Result<Vec<u8>, CommError> {
        match &self.receivers[peer] {
            Some(rx) => rx
                .recv()
                .map_err(|_| CommError::PeerDisconnected { rank: peer }),
            None => Err(CommError::PeerDisconnected { rank: peer }),
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast(&self, root: usize, payload: Vec<u8>) -> Result<Vec<u8>, CommError> {
        if root >= self.size {
            return Err(CommError::RankOutOfRange {
                rank: root,
                size: self.size,
            });
        }
        if self.rank == root {
            for peer in 0..self.size {
                if peer != self.rank {
                    self.send_to(peer, payload.clone())?;
                }
            }
            Ok(payload)
        } else {
            self.recv_from(root)
        }
    }

    fn gather(&self, root: usize, payload: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CommError> {
        if root >= self.size {
            return Err(CommError::RankOutOfRange {
                rank: root,
                size: self.size,
            });
        }
        if self.rank == root {
            let mut own = Some(payload);
            let mut parts = Vec::with_capacity(self.size);
            for peer in 0..self.size {
                if peer == self.rank {
                    if let Some(p) = own.take() {
                        parts.push(p);
                    }
                } else {
                    parts.push(self.recv_from(peer)?);
                }
            }
            Ok(Some(parts))
        } else {
            self.send_to(root, payload)?;
            Ok(None)
        }
    }
}
