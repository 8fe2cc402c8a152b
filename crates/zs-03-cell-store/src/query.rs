//! # Data Points
//!
//! Read model over the store: every cell joined with its theme text,
//! statement text and organ name. This is the view cache consumers read.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::domain::{Organ, OrganId, StoreError};
use crate::ports::CellStore;

/// Sample payload of a data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataValues {
    Numerical { values: Vec<f64> },
    Categorical { categories: Vec<String>, allowed_categories: Vec<String> },
}

/// One cell as presented to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub x_index: u64,
    pub y_index: u64,
    pub theme: String,
    pub statement: String,
    pub organ: String,
    pub data: DataValues,
}

/// Join every stored cell with its headers and organ.
///
/// Numerical cells come first, then categorical, each in key order. Cells
/// whose theme, statement or organ is missing are skipped with a warning.
pub fn data_points(store: &dyn CellStore) -> Result<Vec<DataPoint>, StoreError> {
    let themes: HashMap<(bool, u64), String> = store
        .themes()?
        .into_iter()
        .map(|t| ((t.is_categorical, t.x_index), t.text))
        .collect();
    let statements: HashMap<(bool, u64), String> = store
        .statements()?
        .into_iter()
        .map(|s| ((s.is_categorical, s.y_index), s.text))
        .collect();
    let organs: HashMap<OrganId, Organ> = store.organs()?.into_iter().map(|o| (o.id, o)).collect();

    let join = |categorical: bool, x: u64, y: u64, organ_id: OrganId, data: DataValues| {
        let theme = themes.get(&(categorical, x));
        let statement = statements.get(&(categorical, y));
        let organ = organs.get(&organ_id);
        match (theme, statement, organ) {
            (Some(theme), Some(statement), Some(organ)) => Some(DataPoint {
                x_index: x,
                y_index: y,
                theme: theme.clone(),
                statement: statement.clone(),
                organ: organ.name.clone(),
                data,
            }),
            _ => {
                warn!(x, y, categorical, organ_id = %organ_id, "Skipping cell with dangling reference");
                None
            }
        }
    };

    let mut points = Vec::new();
    for cell in store.numerical_cells()? {
        points.extend(join(
            false,
            cell.x_index,
            cell.y_index,
            cell.organ_id,
            DataValues::Numerical { values: cell.values },
        ));
    }
    for cell in store.categorical_cells()? {
        points.extend(join(
            true,
            cell.x_index,
            cell.y_index,
            cell.organ_id,
            DataValues::Categorical {
                categories: cell.categories,
                allowed_categories: cell.allowed_categories,
            },
        ));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCellStore;
    use crate::domain::{NumericalCell, Statement, Theme};
    use primitive_types::H256;

    #[test]
    fn test_join_resolves_headers_and_organ() {
        let store = InMemoryCellStore::new();
        let organ = store
            .insert_organ_if_absent(Organ::new(H256::repeat_byte(5), "77.КОН"))
            .unwrap();
        store
            .upsert_theme(Theme {
                x_index: 0,
                is_categorical: false,
                text: "Economy".into(),
            })
            .unwrap();
        store
            .upsert_statement(Statement {
                y_index: 0,
                is_categorical: false,
                text: "Approval".into(),
            })
            .unwrap();
        store
            .upsert_numerical_cell(NumericalCell {
                x_index: 0,
                y_index: 0,
                values: vec![75.0],
                organ_id: organ.id,
            })
            .unwrap();

        let points = data_points(&store).unwrap();
        assert_eq!(
            points,
            vec![DataPoint {
                x_index: 0,
                y_index: 0,
                theme: "Economy".into(),
                statement: "Approval".into(),
                organ: "77.КОН".into(),
                data: DataValues::Numerical { values: vec![75.0] },
            }]
        );
    }

    #[test]
    fn test_cell_without_theme_is_skipped() {
        let store = InMemoryCellStore::new();
        store
            .upsert_numerical_cell(NumericalCell {
                x_index: 9,
                y_index: 9,
                values: vec![],
                organ_id: OrganId(1),
            })
            .unwrap();
        assert!(data_points(&store).unwrap().is_empty());
    }
}
