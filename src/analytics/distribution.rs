//! Equipment type distribution: row counts and whole-number shares

use crate::types::{DatasetSummary, EquipmentRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One equipment type's share of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShare {
    pub equipment_type: String,
    pub count: u64,
    /// round(count / total × 100)
    pub percentage: u32,
}

/// Share of each equipment type in a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDistribution {
    pub shares: Vec<TypeShare>,
    pub total: u64,
}

impl TypeDistribution {
    /// Prefer the backend's reported counts; derive from rows when absent.
    pub fn for_summary(summary: &DatasetSummary) -> Self {
        match &summary.type_distribution {
            Some(counts) if !counts.is_empty() => Self::from_counts(counts),
            _ => Self::from_rows(&summary.rows),
        }
    }

    /// Count rows per type, keeping first-appearance order.
    pub fn from_rows(rows: &[EquipmentRow]) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for row in rows {
            let count = counts.entry(row.equipment_type.as_str()).or_insert(0);
            if *count == 0 {
                order.push(row.equipment_type.as_str());
            }
            *count += 1;
        }
        Self::build(order.into_iter().map(|ty| (ty.to_string(), counts[ty])))
    }

    pub fn from_counts(counts: &BTreeMap<String, u64>) -> Self {
        Self::build(counts.iter().map(|(ty, c)| (ty.clone(), *c)))
    }

    fn build(entries: impl Iterator<Item = (String, u64)>) -> Self {
        let entries: Vec<(String, u64)> = entries.collect();
        let total: u64 = entries.iter().map(|(_, c)| c).sum();
        let shares = entries
            .into_iter()
            .map(|(equipment_type, count)| TypeShare {
                percentage: percentage_of(count, total),
                equipment_type,
                count,
            })
            .collect();
        Self { shares, total }
    }

    pub fn get(&self, equipment_type: &str) -> Option<&TypeShare> {
        self.shares.iter().find(|s| s.equipment_type == equipment_type)
    }
}

fn percentage_of(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Averages;

    fn rows(types: &[&str]) -> Vec<EquipmentRow> {
        types
            .iter()
            .enumerate()
            .map(|(i, ty)| EquipmentRow::new(format!("E-{i}"), *ty, 1.0, 1.0, 1.0))
            .collect()
    }

    #[test]
    fn test_from_rows_keeps_first_appearance_order() {
        let dist = TypeDistribution::from_rows(&rows(&["Valve", "Pump", "Valve", "Pump", "Valve", "Reactor"]));
        let order: Vec<&str> = dist.shares.iter().map(|s| s.equipment_type.as_str()).collect();
        assert_eq!(order, vec!["Valve", "Pump", "Reactor"]);
        assert_eq!(dist.total, 6);
        assert_eq!(dist.get("Valve").map(|s| s.count), Some(3));
        assert_eq!(dist.get("Valve").map(|s| s.percentage), Some(50));
        assert_eq!(dist.get("Pump").map(|s| s.percentage), Some(33));
        assert_eq!(dist.get("Reactor").map(|s| s.percentage), Some(17));
    }

    #[test]
    fn test_empty_rows() {
        let dist = TypeDistribution::from_rows(&[]);
        assert!(dist.shares.is_empty());
        assert_eq!(dist.total, 0);
    }

    #[test]
    fn test_backend_counts_preferred() {
        let mut summary = DatasetSummary::new(rows(&["Pump"]), Averages::default());
        summary.type_distribution = Some(BTreeMap::from([
            ("Pump".to_string(), 3),
            ("Valve".to_string(), 1),
        ]));
        let dist = TypeDistribution::for_summary(&summary);
        assert_eq!(dist.total, 4);
        assert_eq!(dist.get("Pump").map(|s| s.percentage), Some(75));
        assert_eq!(dist.get("Valve").map(|s| s.percentage), Some(25));
    }

    #[test]
    fn test_zero_counts_do_not_divide_by_zero() {
        let counts = BTreeMap::from([("Pump".to_string(), 0)]);
        let dist = TypeDistribution::from_counts(&counts);
        assert_eq!(dist.shares[0].percentage, 0);
    }
}
