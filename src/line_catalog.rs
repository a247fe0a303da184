use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::druid::GroupByRow;

pub const LINE_DIMENSION: &str = "line";
pub const ORDER_DIMENSION: &str = "order";

/// Bus line -> the orders (vehicles) seen on that line during one day.
///
/// Lines iterate in ascending order. Each line's orders keep the order in
/// which the query engine returned them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineCatalog {
    lines: BTreeMap<String, Vec<String>>,
}

/// A dropdown entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl LineCatalog {
    pub fn new() -> Self {
        LineCatalog {
            lines: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, line: &str, order: &str) {
        self.lines
            .entry(line.to_string())
            .or_default()
            .push(order.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    pub fn orders(&self, line: &str) -> Option<&[String]> {
        self.lines.get(line).map(Vec::as_slice)
    }

    pub fn line_options(&self) -> Vec<SelectOption> {
        self.lines()
            .map(|line| SelectOption {
                label: line_label(line).to_string(),
                value: line.to_string(),
            })
            .collect()
    }

    /// Unknown lines have no orders.
    pub fn order_options(&self, line: &str) -> Vec<SelectOption> {
        self.orders(line)
            .unwrap_or_default()
            .iter()
            .map(|order| SelectOption {
                label: order.clone(),
                value: order.clone(),
            })
            .collect()
    }
}

impl<L: Into<String>, O: Into<String>> FromIterator<(L, Vec<O>)> for LineCatalog {
    fn from_iter<T: IntoIterator<Item = (L, Vec<O>)>>(iter: T) -> Self {
        LineCatalog {
            lines: iter
                .into_iter()
                .map(|(line, orders)| {
                    let orders = orders.into_iter().map(Into::into).collect::<Vec<String>>();
                    (line.into(), orders)
                })
                .collect(),
        }
    }
}

/// Line ids are stored as floats upstream (`485.0`); users know them as `485`.
pub fn line_label(line: &str) -> &str {
    line.strip_suffix(".0").unwrap_or(line)
}

/// Groups `(line, order)` rows by line. Rows missing either dimension are
/// skipped.
pub fn build_line_catalog(rows: &[GroupByRow]) -> LineCatalog {
    let mut catalog = LineCatalog::new();
    for row in rows {
        match (row.dimension(LINE_DIMENSION), row.dimension(ORDER_DIMENSION)) {
            (Some(line), Some(order)) => catalog.push(line, order),
            _ => warn!("skipping groupBy row without line/order: {:?}", row.event),
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_drop_float_suffix() {
        assert_eq!(line_label("485.0"), "485");
        assert_eq!(line_label("SV485"), "SV485");
        assert_eq!(line_label("10.05"), "10.05");
    }

    #[test]
    fn serializes_as_plain_mapping() {
        let catalog: LineCatalog = [("485.0", vec!["B31019", "B31020"])].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&catalog).unwrap(),
            r#"{"485.0":["B31019","B31020"]}"#
        );
    }

    #[test]
    fn unknown_line_has_no_orders() {
        let catalog: LineCatalog = [("485.0", vec!["B31019"])].into_iter().collect();
        assert!(catalog.order_options("999.0").is_empty());
        assert_eq!(catalog.orders("999.0"), None);
    }
}
