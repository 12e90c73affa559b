//! Cross-set answer key.
//!
//! Rows are indexed by position within each set's own order: row 3 holds the
//! letter of whatever question each set printed third, which is a different
//! bank question in every set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ExamSet, SetName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// 1-based.
    pub position_in_set: usize,
    pub original_index: usize,
    pub correct_letter: char,
}

/// Header row plus one row per position, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Default, Clone)]
pub struct AnswerKeyAggregator {
    /// Sets in first-recorded order, entries keyed by position.
    sets: Vec<(SetName, BTreeMap<usize, AnswerKeyEntry>)>,
}

impl AnswerKeyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one answer. Recording the same position twice keeps the last.
    pub fn record(
        &mut self,
        set_name: SetName,
        position_in_set: usize,
        original_index: usize,
        correct_letter: char,
    ) {
        let entry = AnswerKeyEntry {
            position_in_set,
            original_index,
            correct_letter,
        };
        match self.sets.iter_mut().find(|(name, _)| *name == set_name) {
            Some((_, entries)) => {
                entries.insert(position_in_set, entry);
            }
            None => {
                let mut entries = BTreeMap::new();
                entries.insert(position_in_set, entry);
                self.sets.push((set_name, entries));
            }
        }
    }

    /// Records every question of a set, numbered 1..N in printed order.
    pub fn record_set(&mut self, set: &ExamSet) {
        for (i, question) in set.questions.iter().enumerate() {
            self.record(set.name, i + 1, question.original_index, question.correct_letter);
        }
    }

    pub fn to_table(&self) -> AnswerKeyTable {
        let mut header = Vec::with_capacity(self.sets.len() + 1);
        header.push("Question Number".to_string());
        header.extend(self.sets.iter().map(|(name, _)| name.label()));

        let max_position = self
            .sets
            .iter()
            .filter_map(|(_, entries)| entries.keys().next_back().copied())
            .max()
            .unwrap_or(0);

        let rows = (1..=max_position)
            .map(|position| {
                let mut row = Vec::with_capacity(header.len());
                row.push(position.to_string());
                row.extend(self.sets.iter().map(|(_, entries)| {
                    entries
                        .get(&position)
                        .map(|e| e.correct_letter.to_string())
                        .unwrap_or_default()
                }));
                row
            })
            .collect();

        AnswerKeyTable { header, rows }
    }

    pub fn to_csv(&self) -> String {
        self.to_table().to_csv()
    }
}

impl AnswerKeyTable {
    /// Comma-separated rows joined by newlines.
    pub fn to_csv(&self) -> String {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|row| row.iter().map(|cell| csv_field(cell)).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn csv_field(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
impl AnswerKeyAggregator {
    pub fn set_names(&self) -> Vec<SetName> {
        self.sets.iter().map(|(name, _)| *name).collect()
    }

    pub fn entries(&self, set_name: SetName) -> Vec<AnswerKeyEntry> {
        self.sets
            .iter()
            .find(|(name, _)| *name == set_name)
            .map(|(_, entries)| entries.values().copied().collect())
            .unwrap_or_default()
    }
}
