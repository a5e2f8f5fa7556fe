//! Payload store reader and writer.
//!
//! A store carries one field across one checkpoint: a header naming
//! the field and its kind, the shared mesh once, then one dataset
//! record per snapshot listed in the companion index document.

use std::io::{Read, Write};

use indexmap::IndexMap;

use brine_core::FieldKind;
use brine_mesh::MeshTopology;

use crate::codec::{
    decode_dataset, decode_field_kind, decode_preamble, encode_dataset, encode_field_kind,
    encode_preamble, read_f64_le, read_length_prefixed_str, read_u32_le, read_u64_le,
    write_f64_le, write_length_prefixed_str, write_u32_le, write_u64_le,
};
use crate::error::ArchiveError;

/// Writes a payload store to any `Write` sink.
///
/// Generic over `W: Write` so tests can target `Vec<u8>` and archive
/// producers a `BufWriter<File>`. The header and mesh are written on
/// construction.
pub struct PayloadWriter<W: Write> {
    writer: W,
    frame_len: usize,
    datasets_written: u64,
}

impl<W: Write> PayloadWriter<W> {
    /// Start a store for `field`, immediately writing header and mesh.
    pub fn new(
        mut writer: W,
        field: &str,
        kind: FieldKind,
        topology: &MeshTopology,
    ) -> Result<Self, ArchiveError> {
        encode_preamble(&mut writer)?;
        write_length_prefixed_str(&mut writer, field)?;
        encode_field_kind(&mut writer, kind)?;
        write_u64_le(&mut writer, topology.n_nodes() as u64)?;
        write_u64_le(&mut writer, topology.n_elements() as u64)?;
        for p in topology.nodes() {
            write_f64_le(&mut writer, p[0])?;
            write_f64_le(&mut writer, p[1])?;
        }
        for element in topology.elements() {
            for &node in element {
                write_u32_le(&mut writer, node)?;
            }
        }
        Ok(Self {
            writer,
            frame_len: topology.n_nodes() * kind.components() as usize,
            datasets_written: 0,
        })
    }

    /// Append one dataset record.
    pub fn write_dataset(&mut self, name: &str, values: &[f64]) -> Result<(), ArchiveError> {
        if values.len() != self.frame_len {
            return Err(ArchiveError::FrameLengthMismatch {
                dataset: name.to_string(),
                expected: self.frame_len,
                found: values.len(),
            });
        }
        encode_dataset(&mut self.writer, name, values)?;
        self.datasets_written += 1;
        Ok(())
    }

    /// Number of datasets written so far.
    pub fn datasets_written(&self) -> u64 {
        self.datasets_written
    }
}

/// Reads a payload store from any `Read` source.
pub struct PayloadReader<R: Read> {
    reader: R,
    field: String,
    kind: FieldKind,
    topology: MeshTopology,
    frame_len: usize,
}

impl<R: Read> PayloadReader<R> {
    /// Open a store, decoding the header and mesh block.
    pub fn open(mut reader: R) -> Result<Self, ArchiveError> {
        decode_preamble(&mut reader)?;
        let field = read_length_prefixed_str(&mut reader)?;
        let kind = decode_field_kind(&mut reader)?;
        let n_nodes = read_u64_le(&mut reader)? as usize;
        let n_elements = read_u64_le(&mut reader)? as usize;
        let mut nodes = Vec::with_capacity(n_nodes);
        for _ in 0..n_nodes {
            let x = read_f64_le(&mut reader)?;
            let y = read_f64_le(&mut reader)?;
            nodes.push([x, y]);
        }
        let mut elements = Vec::with_capacity(n_elements);
        for _ in 0..n_elements {
            let mut element = [0u32; 3];
            for slot in &mut element {
                *slot = read_u32_le(&mut reader)?;
            }
            elements.push(element);
        }
        let topology = MeshTopology::new(nodes, elements)?;
        let frame_len = topology.n_nodes() * kind.components() as usize;
        Ok(Self {
            reader,
            field,
            kind,
            topology,
            frame_len,
        })
    }

    /// The field this store carries.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The mesh block.
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// Decode the next dataset record, validating its length.
    ///
    /// Returns `Ok(None)` at the clean end of the record stream.
    pub fn next_dataset(&mut self) -> Result<Option<(String, Vec<f64>)>, ArchiveError> {
        match decode_dataset(&mut self.reader)? {
            Some((name, values)) => {
                if values.len() != self.frame_len {
                    return Err(ArchiveError::FrameLengthMismatch {
                        dataset: name,
                        expected: self.frame_len,
                        found: values.len(),
                    });
                }
                Ok(Some((name, values)))
            }
            None => Ok(None),
        }
    }

    /// Decode all remaining datasets into a name-keyed directory.
    pub fn read_all(mut self) -> Result<(MeshTopology, IndexMap<String, Vec<f64>>), ArchiveError> {
        let mut datasets = IndexMap::new();
        while let Some((name, values)) = self.next_dataset()? {
            datasets.insert(name, values);
        }
        Ok((self.topology, datasets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> MeshTopology {
        MeshTopology::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn store_round_trips() {
        let mesh = square();
        let mut buf = Vec::new();
        let mut writer =
            PayloadWriter::new(&mut buf, "phi", FieldKind::Scalar, &mesh).unwrap();
        writer.write_dataset("phi/0", &[1.0, -1.0, 1.0, -1.0]).unwrap();
        writer.write_dataset("phi/1", &[0.5, -0.5, 0.5, -0.5]).unwrap();
        assert_eq!(writer.datasets_written(), 2);
        drop(writer);

        let mut reader = PayloadReader::open(buf.as_slice()).unwrap();
        assert_eq!(reader.field(), "phi");
        assert_eq!(reader.kind(), FieldKind::Scalar);
        assert_eq!(reader.topology(), &mesh);
        let (name, values) = reader.next_dataset().unwrap().unwrap();
        assert_eq!(name, "phi/0");
        assert_eq!(values, vec![1.0, -1.0, 1.0, -1.0]);
        let (name, _) = reader.next_dataset().unwrap().unwrap();
        assert_eq!(name, "phi/1");
        assert!(reader.next_dataset().unwrap().is_none());
    }

    #[test]
    fn vector_frame_length_is_enforced() {
        let mesh = square();
        let mut buf = Vec::new();
        let mut writer =
            PayloadWriter::new(&mut buf, "u", FieldKind::Vector { dims: 2 }, &mesh).unwrap();
        let err = writer.write_dataset("u/0", &[1.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::FrameLengthMismatch {
                expected: 8,
                found: 4,
                ..
            }
        ));
        writer.write_dataset("u/0", &[1.0; 8]).unwrap();
    }

    #[test]
    fn truncated_store_errors() {
        let mesh = square();
        let mut buf = Vec::new();
        let mut writer = PayloadWriter::new(&mut buf, "phi", FieldKind::Scalar, &mesh).unwrap();
        writer.write_dataset("phi/0", &[0.0; 4]).unwrap();
        drop(writer);
        buf.truncate(buf.len() - 3);
        let mut reader = PayloadReader::open(buf.as_slice()).unwrap();
        assert!(reader.next_dataset().is_err());
    }
}
