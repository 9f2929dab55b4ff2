use super::cell::CellValue;

/// One normalized row: ordered `column → value` pairs with unique column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite, keeping the original position of an existing column.
    pub fn set<S: Into<String>>(&mut self, column: S, value: CellValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        let pos = self.fields.iter().position(|(c, _)| c == column)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text of a column, `None` when absent or blank.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(CellValue::to_text)
    }
}

impl<S: Into<String>> FromIterator<(S, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (S, CellValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (c, v) in iter {
            record.set(c, v);
        }
        record
    }
}
