//! Facilities for working with paths within schemas or validated instances.
use std::fmt::Write;
use std::{cell::RefCell, fmt, ops::Deref};

/// JSON Pointer as a wrapper around individual path components.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JsonPointer(Vec<PathChunk>);

impl JsonPointer {
    /// JSON pointer as a vector of strings. Each component is casted to `String`.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
            .iter()
            .map(|item| match item {
                PathChunk::Name(value) => value.clone(),
                PathChunk::Index(idx) => idx.to_string(),
            })
            .collect()
    }

    pub(crate) fn as_slice(&self) -> &[PathChunk] {
        &self.0
    }

    /// A new pointer with `chunks` appended after the current components.
    pub(crate) fn extend_with(&self, chunks: &[PathChunk]) -> Self {
        let mut buf = Vec::with_capacity(self.0.len() + chunks.len());
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(chunks);
        JsonPointer(buf)
    }

    pub(crate) fn with_chunk(&self, chunk: impl Into<PathChunk>) -> Self {
        let mut buf = Vec::with_capacity(self.0.len() + 1);
        buf.extend_from_slice(&self.0);
        buf.push(chunk.into());
        JsonPointer(buf)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_char('/')?;
            match chunk {
                PathChunk::Name(value) => f.write_str(value)?,
                PathChunk::Index(idx) => {
                    let mut buffer = itoa::Buffer::new();
                    f.write_str(buffer.format(*idx))?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum PathChunk {
    Name(String),
    Index(usize),
}

impl From<String> for PathChunk {
    #[inline]
    fn from(value: String) -> Self {
        PathChunk::Name(value)
    }
}

impl From<&str> for PathChunk {
    #[inline]
    fn from(value: &str) -> Self {
        PathChunk::Name(value.to_string())
    }
}

impl From<usize> for PathChunk {
    #[inline]
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

pub(crate) type InstancePathInner = RefCell<Vec<PathChunk>>;

/// The dynamic location within the validated document.
///
/// Pushed and popped as the evaluator descends; snapshots become `JsonPointer`s
/// inside error nodes.
#[derive(Debug, Default)]
pub(crate) struct InstancePath(InstancePathInner);

impl InstancePath {
    pub(crate) fn new() -> Self {
        Self(RefCell::new(Vec::with_capacity(8)))
    }

    #[inline]
    pub(crate) fn push(&self, value: impl Into<PathChunk>) {
        self.borrow_mut().push(value.into())
    }

    #[inline]
    pub(crate) fn pop(&self) {
        self.borrow_mut().pop();
    }
}

impl Deref for InstancePath {
    type Target = InstancePathInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&InstancePath> for JsonPointer {
    #[inline]
    fn from(path: &InstancePath) -> Self {
        JsonPointer(path.0.borrow().clone())
    }
}

impl From<&[&str]> for JsonPointer {
    #[inline]
    fn from(path: &[&str]) -> Self {
        JsonPointer(
            path.iter()
                .map(|item| PathChunk::Name((*item).to_string()))
                .collect(),
        )
    }
}

impl From<&Vec<String>> for JsonPointer {
    #[inline]
    fn from(path: &Vec<String>) -> Self {
        JsonPointer(path.iter().map(|item| PathChunk::Name(item.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let pointer = JsonPointer::default()
            .with_chunk("properties")
            .with_chunk("a")
            .with_chunk(3usize);
        assert_eq!(pointer.to_string(), "/properties/a/3");
        assert_eq!(JsonPointer::default().to_string(), "");
    }

    #[test]
    fn instance_path_snapshot() {
        let path = InstancePath::new();
        path.push("next");
        path.push(0usize);
        assert_eq!(JsonPointer::from(&path).to_string(), "/next/0");
        path.pop();
        assert_eq!(JsonPointer::from(&path).to_string(), "/next");
    }

    #[test]
    fn extend_with() {
        let base = JsonPointer::default().with_chunk("$ref");
        let tail = JsonPointer::default().with_chunk("type");
        let combined = base.extend_with(tail.as_slice());
        assert_eq!(combined.to_string(), "/$ref/type");
    }
}
