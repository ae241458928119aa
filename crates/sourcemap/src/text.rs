//! Line/column addressing in UTF-16 code units, as sourcemap columns are

pub(crate) struct LineIndex {
    lines: Vec<Vec<u16>>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).encode_utf16().collect())
            .collect();
        Self { lines }
    }

    /// A position is addressable if the line exists and the column is at most
    /// one past its last unit.
    pub(crate) fn contains(&self, line: u32, column: u32) -> bool {
        self.lines
            .get(line as usize)
            .is_some_and(|units| column as usize <= units.len())
    }

    pub(crate) fn starts_with_at(&self, line: u32, column: u32, needle: &str) -> bool {
        let Some(units) = self.lines.get(line as usize) else {
            return false;
        };
        let Some(rest) = units.get(column as usize..) else {
            return false;
        };
        let needle: Vec<u16> = needle.encode_utf16().collect();
        rest.starts_with(&needle)
    }
}
