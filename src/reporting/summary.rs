use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::mapping::EnrichedRow;

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub total: usize,
    pub disclosing: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureSummary {
    pub share_classes: usize,
    pub disclosing: usize,
    /// Only available when the reference table names entities.
    pub entities: Option<EntitySummary>,
}

impl DisclosureSummary {
    pub fn class_percent(&self) -> f64 {
        percent(self.disclosing, self.share_classes)
    }

    pub fn entity_percent(&self) -> Option<f64> {
        self.entities.as_ref().map(|e| percent(e.disclosing, e.total))
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

pub fn summarize(rows: &[EnrichedRow]) -> DisclosureSummary {
    let disclosing = rows.iter().filter(|r| r.row.has_performance_data).count();

    let mut by_entity: BTreeMap<&str, bool> = BTreeMap::new();
    for row in rows {
        if let Some(entity) = row.entity_name() {
            *by_entity.entry(entity).or_default() |= row.row.has_performance_data;
        }
    }
    let entities = (!by_entity.is_empty()).then(|| EntitySummary {
        total: by_entity.len(),
        disclosing: by_entity.values().filter(|d| **d).count(),
    });

    DisclosureSummary {
        share_classes: rows.len(),
        disclosing,
        entities,
    }
}

/// Number of disclosing share classes per entity, largest first.
pub fn performance_by_entity(rows: &[EnrichedRow]) -> Vec<(String, usize)> {
    rows.iter()
        .filter(|r| r.row.has_performance_data)
        .filter_map(|r| r.entity_name())
        .counts()
        .into_iter()
        .map(|(entity, count)| (entity.to_string(), count))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingFilter {
    pub max_expense: f64,
    pub min_performance: f64,
    pub top_n: usize,
}

impl Default for RankingFilter {
    fn default() -> Self {
        Self {
            max_expense: 100.0,
            min_performance: 0.0,
            top_n: 10,
        }
    }
}

/// Rows with both a numeric expense amount and performance inside the filter.
fn ranked<'a>(rows: &'a [EnrichedRow], filter: &RankingFilter) -> Vec<(f64, f64, &'a EnrichedRow)> {
    rows.iter()
        .filter_map(|r| {
            let expense = r.row.expense_amt.as_ref()?.as_f64()?;
            let performance = r.row.performance_pct.as_ref()?.as_f64()?;
            Some((expense, performance, r))
        })
        .filter(|(expense, performance, _)| {
            *expense <= filter.max_expense && *performance >= filter.min_performance
        })
        .collect()
}

pub fn lowest_expense<'a>(rows: &'a [EnrichedRow], filter: &RankingFilter) -> Vec<&'a EnrichedRow> {
    ranked(rows, filter)
        .into_iter()
        .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .take(filter.top_n)
        .map(|(_, _, r)| r)
        .collect()
}

pub fn highest_performance<'a>(
    rows: &'a [EnrichedRow],
    filter: &RankingFilter,
) -> Vec<&'a EnrichedRow> {
    ranked(rows, filter)
        .into_iter()
        .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        .take(filter.top_n)
        .map(|(_, _, r)| r)
        .collect()
}
