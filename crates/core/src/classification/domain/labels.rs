/// Ordered class labels used to turn an argmax index into a readable name.
#[derive(Debug, Clone, Default)]
pub struct LabelList {
    labels: Vec<String>,
}

impl LabelList {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse a JSON array of strings, e.g. `["angry","happy","sad"]`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            labels: serde_json::from_slice(bytes)?,
        })
    }

    /// Label for a class index.
    ///
    /// Indices past the end of the list get a synthetic `class_<index>` name
    /// instead of failing, so a model with more outputs than configured
    /// labels still produces a usable result.
    pub fn label_for(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{index}"))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
