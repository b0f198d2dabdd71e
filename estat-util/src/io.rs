//! Raw wire encoding of a potential field.
//!
//! The layout consumed by the renderer is contiguous little-endian
//! float32, `nx·ny·4` bytes, no header.

use std::io;

pub fn phi_to_le_bytes(phi: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(phi.len() * 4);
    for value in phi {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

pub fn phi_from_le_bytes(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect(),
    )
}

pub fn write_phi<W>(writer: &mut W, phi: &[f32]) -> io::Result<()>
where
    W: io::Write,
{
    for value in phi {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}
