//! Human-readable rendering of responses.
//!
//! `show` responses become bordered tables; everything else (add, update and
//! every failure) is shown as the response message on its own line.

use crate::domain::{Command, InventoryRecord, Response, Target, Verb};

const NAME_HEADER: &str = "Vegetable Name";
const PRICE_HEADER: &str = "Unit Price";
const STOCK_HEADER: &str = "Stocks(kg)";

/// A small bordered ASCII table.  Headers are printed upper-cased.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.  Missing cells render empty, extra cells are dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let headers: Vec<String> = self.headers.iter().map(|h| h.to_uppercase()).collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let border = {
            let mut line = String::from("+");
            for w in &widths {
                line.push_str(&"-".repeat(w + 2));
                line.push('+');
            }
            line
        };
        let line = |cells: &[String]| {
            let mut out = String::from("|");
            for (cell, w) in cells.iter().zip(&widths) {
                let pad = w - cell.chars().count();
                out.push(' ');
                out.push_str(cell);
                out.push_str(&" ".repeat(pad + 1));
                out.push('|');
            }
            out
        };

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(border.clone());
        out.push(line(&headers));
        out.push(border.clone());
        for row in &self.rows {
            out.push(line(row));
        }
        if !self.rows.is_empty() {
            out.push(border);
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

/// Renders `response` for display, using `command` to pick the columns.
pub fn render_response(command: &Command, response: &Response) -> String {
    if !response.ok || command.verb != Verb::Show {
        return format!("{}\n", response.message);
    }

    let table = match command.target {
        Target::Price => field_table(PRICE_HEADER, &response.records, |r| &r.unit_price),
        Target::Stocks => field_table(STOCK_HEADER, &response.records, |r| &r.stock_kg),
        Target::Vegetable | Target::All => records_table(&response.records),
    };
    table.render()
}

/// The full three-column view of `records`.
pub fn records_table(records: &[InventoryRecord]) -> Table {
    let mut table = Table::new([NAME_HEADER, PRICE_HEADER, STOCK_HEADER]);
    for r in records {
        table.push_row([r.name.as_str(), r.unit_price.as_str(), r.stock_kg.as_str()]);
    }
    table
}

fn field_table(header: &str, records: &[InventoryRecord], value: fn(&InventoryRecord) -> &String) -> Table {
    let mut table = Table::new([NAME_HEADER, header]);
    for r in records {
        table.push_row([r.name.as_str(), value(r).as_str()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(target: Target) -> Command {
        Command::new(Verb::Show, target, vec!["carrot".into()])
    }

    #[test]
    fn test_full_table_layout() {
        // Arrange
        let response = Response::records(vec![InventoryRecord::new("carrot", "2.50", "100")]);

        // Act
        let text = render_response(&show(Target::All), &response);

        // Assert
        let expected = "\
+----------------+------------+------------+
| VEGETABLE NAME | UNIT PRICE | STOCKS(KG) |
+----------------+------------+------------+
| carrot         | 2.50       | 100        |
+----------------+------------+------------+
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_price_view_has_two_columns() {
        let response = Response::records(vec![InventoryRecord::new("carrot", "2.50", "100")]);

        let text = render_response(&show(Target::Price), &response);

        assert!(text.contains("| VEGETABLE NAME | UNIT PRICE |\n"));
        assert!(!text.contains("STOCKS"));
        assert!(text.contains("| carrot         | 2.50       |"));
    }

    #[test]
    fn test_stocks_view_shows_stock_column() {
        let response = Response::records(vec![InventoryRecord::new("carrot", "2.50", "100")]);

        let text = render_response(&show(Target::Stocks), &response);

        assert!(text.contains("STOCKS(KG)"));
        assert!(!text.contains("UNIT PRICE"));
    }

    #[test]
    fn test_wide_cells_stretch_the_column() {
        let response = Response::records(vec![InventoryRecord::new("butternut squash", "1", "2")]);

        let text = render_response(&show(Target::All), &response);

        assert!(text.contains("| butternut squash | 1          | 2          |"));
    }

    #[test]
    fn test_failures_render_the_message() {
        let response = Response::failure("Vegetable 'kale' is not found!");
        assert_eq!(
            render_response(&show(Target::Vegetable), &response),
            "Vegetable 'kale' is not found!\n"
        );
    }

    #[test]
    fn test_add_renders_the_message() {
        let cmd = Command::new(Verb::Add, Target::Vegetable, vec![]);
        assert_eq!(
            render_response(&cmd, &Response::added("leek")),
            "Vegetable 'leek' is added successfully!\n"
        );
    }

    #[test]
    fn test_empty_collection_renders_header_only() {
        let text = render_response(&show(Target::All), &Response::records(vec![]));
        assert_eq!(text.lines().count(), 3);
    }
}
