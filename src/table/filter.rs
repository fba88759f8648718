use super::Record;

/// Case-insensitive substring match against one designated field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    field: &'static str,
    text: String,
    needle: String,
}

impl FilterPredicate {
    pub fn new(field: &'static str, text: &str) -> Self {
        Self {
            field,
            text: text.to_string(),
            needle: text.to_lowercase(),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        record
            .field(self.field)
            .unwrap_or_default()
            .to_lowercase()
            .contains(&self.needle)
    }

    pub fn apply<'a, R, I>(&self, records: I) -> Vec<&'a R>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        records.into_iter().filter(|r| self.matches(*r)).collect()
    }
}
