//! Ordered accumulation and serialization of built resource documents.

/// Line written before every document in the output stream.
pub const YAML_SEPARATOR: &str = "---\n";

/// A single serialized resource document, always newline-terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(Vec<u8>);

impl Manifest {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let mut bytes = bytes.into();
        if !bytes.ends_with(b"\n") {
            bytes.push(b'\n');
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Splits a multi-document YAML stream on `---` lines.
///
/// Documents that contain nothing but whitespace are dropped, so a leading
/// separator or a trailing empty document does not produce empty manifests.
pub fn split_documents(stream: &[u8]) -> Vec<Manifest> {
    let mut documents = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for line in stream.split_inclusive(|b| *b == b'\n') {
        if is_separator(line) {
            push_document(&mut documents, std::mem::take(&mut current));
        } else {
            current.extend_from_slice(line);
        }
    }
    push_document(&mut documents, current);

    documents
}

fn is_separator(line: &[u8]) -> bool {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line == b"---"
}

fn push_document(documents: &mut Vec<Manifest>, bytes: Vec<u8>) {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return;
    }
    documents.push(Manifest::new(bytes));
}

/// Append-only list of documents, kept in directory discovery order.
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    manifests: Vec<Manifest>,
}

impl ManifestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the documents built for one directory.
    pub fn extend(&mut self, manifests: impl IntoIterator<Item = Manifest>) {
        self.manifests.extend(manifests);
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Serializes the whole set, every document preceded by
    /// [`YAML_SEPARATOR`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for manifest in &self.manifests {
            buf.extend_from_slice(YAML_SEPARATOR.as_bytes());
            buf.extend_from_slice(manifest.as_bytes());
        }
        buf
    }
}
