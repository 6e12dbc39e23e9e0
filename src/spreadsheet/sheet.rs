use crate::spreadsheet::cell::Cell;

/// Cells collected from one worksheet, with the bounds of the data they cover.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells in (row, col) order once finished
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, widening the data range.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|upper| upper < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Sorts cells into row-major order; a later cell at the same position replaces an earlier one.
    pub(super) fn finish(&mut self) {
        self.cells.sort_by_key(|cell| (cell.row, cell.col));
        let mut deduplicated: Vec<Cell> = Vec::with_capacity(self.cells.len());
        for cell in self.cells.drain(..) {
            match deduplicated.last_mut() {
                Some(last) if last.row == cell.row && last.col == cell.col => *last = cell,
                _ => deduplicated.push(cell),
            }
        }
        self.cells = deduplicated;
    }

    /// Lays the cells out as a dense grid from the first used row to the last,
    /// spanning column A to the right-most used column. Gaps are `None`.
    pub(crate) fn records(&self) -> Vec<Vec<Option<&Cell>>> {
        let (Some(row_lower), Some(row_upper), Some(col_upper)) =
            (self.row_lower_bound, self.row_upper_bound, self.col_upper_bound)
        else {
            return Vec::new();
        };
        let mut records: Vec<Vec<Option<&Cell>>> = (row_lower..=row_upper)
            .map(|_| vec![None; col_upper + 1])
            .collect();
        for cell in &self.cells {
            records[cell.row - row_lower][cell.col] = Some(cell);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("Sheet1");

        assert!(sheet.is_empty());
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.row_upper_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert!(sheet.records().is_empty());
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 3, 1, "d");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, "b");
        push(&mut sheet, 3, 3, "e");
        sheet.finish();

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_upper_bound, Some(3));
        assert_eq!(sheet.cells[0].value, "a");
    }

    #[test]
    fn sheet_records_keep_gaps() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 3, 2, "b");
        sheet.finish();

        let records = sheet.records();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.len() == 3));
        assert_eq!(records[0][1].map(|cell| cell.value.as_str()), Some("a"));
        assert!(records[1].iter().all(Option::is_none));
        assert_eq!(records[2][2].map(|cell| cell.value.as_str()), Some("b"));
        assert!(records[0][0].is_none());
    }

    #[test]
    fn sheet_later_cell_wins() {
        let mut sheet = Sheet::new("Sheet1");
        push(&mut sheet, 0, 0, "first");
        push(&mut sheet, 0, 0, "second");
        sheet.finish();

        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].value, "second");
    }
}
