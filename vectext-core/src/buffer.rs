//! Growable scratch storage for the vertices of the record being decoded.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::Vertex;

/// Number of vertices added to the buffer capacity on each growth step.
pub const GROWTH_CHUNK: usize = 1000;

/// Raised when the buffer cannot obtain more memory.
#[derive(Debug, Error)]
#[error("failed to grow coordinate buffer beyond {capacity} vertices")]
pub struct BufferError {
    /// Capacity at the time of the failed reservation.
    pub capacity: usize,
    #[source]
    source: TryReserveError,
}

/// Three parallel ordinate sequences with chunked growth.
///
/// Capacity grows by [`GROWTH_CHUNK`] vertices at a time, so appending `n`
/// vertices reallocates at most `n / GROWTH_CHUNK + 1` times. A buffer is
/// owned by one decode pass and reused for every record of that pass.
///
/// # Examples
/// ```
/// use vectext_core::{CoordinateBuffer, Vertex};
///
/// # fn main() -> Result<(), vectext_core::BufferError> {
/// let mut buffer = CoordinateBuffer::new();
/// buffer.push(Vertex::planar(1.0, 2.0))?;
/// buffer.push(Vertex::new(3.0, 4.0, 5.0))?;
/// let vertices = buffer.drain_vertices();
/// assert_eq!(vertices.len(), 2);
/// assert!(buffer.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CoordinateBuffer {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    growths: usize,
}

impl CoordinateBuffer {
    /// Create an empty buffer. No memory is reserved until the first push.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            growths: 0,
        }
    }

    /// Append a vertex, growing capacity by one chunk when full.
    pub fn push(&mut self, vertex: Vertex) -> Result<(), BufferError> {
        if self.x.len() == self.capacity() {
            self.grow()?;
        }
        self.x.push(vertex.x);
        self.y.push(vertex.y);
        self.z.push(vertex.z);
        Ok(())
    }

    fn grow(&mut self) -> Result<(), BufferError> {
        let capacity = self.capacity();
        for ordinates in [&mut self.x, &mut self.y, &mut self.z] {
            ordinates
                .try_reserve_exact(GROWTH_CHUNK)
                .map_err(|source| BufferError { capacity, source })?;
        }
        self.growths += 1;
        Ok(())
    }

    /// Number of stored vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the buffer holds no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Vertices that fit before the next growth step.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.x.capacity().min(self.y.capacity()).min(self.z.capacity())
    }

    /// Number of growth steps performed so far.
    #[must_use]
    pub const fn growths(&self) -> usize {
        self.growths
    }

    /// Iterate over the stored vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| Vertex::new(*x, *y, *z))
    }

    /// Copy the stored vertices out and reset the length, keeping capacity.
    pub fn drain_vertices(&mut self) -> Vec<Vertex> {
        let vertices = self.iter().collect();
        self.clear();
        vertices
    }

    /// Forget all stored vertices, keeping capacity.
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
    }
}
