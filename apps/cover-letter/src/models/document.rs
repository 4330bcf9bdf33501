use bytes::Bytes;

/// An uploaded resume: the raw file bytes plus the name it was uploaded under.
#[derive(Clone)]
pub struct ResumeDocument {
    pub filename: String,
    pub data: Bytes,
}

impl ResumeDocument {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for ResumeDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeDocument")
            .field("filename", &self.filename)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}
