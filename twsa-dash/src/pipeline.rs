//! Aggregation pipeline
//!
//! Turns a snapshot of stored records into the three derived views the
//! dashboard charts are drawn from:
//! - category counts: sentiment label → number of records
//! - time series: calendar date × sentiment label → number of records
//! - corpus: every non-empty text, space-joined, for the word cloud
//!
//! Views are recomputed from scratch on every call. Nothing is cached.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use twsa_common::time::parse_calendar_date;
use twsa_common::{Record, Sentiment};

/// Aggregation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// No records left after fetching and filtering
    #[error("No records to aggregate")]
    EmptyDataset,

    /// Input exceeds the configured cap; nothing was computed
    ///
    /// `count` is a lower bound when the caller fetched only `limit + 1` records
    #[error("Dataset too large: more than {limit} records")]
    DatasetTooLarge { count: usize, limit: usize },
}

/// Resource limits applied to every aggregation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_records: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_records: twsa_common::config::DEFAULT_MAX_RECORDS,
        }
    }
}

/// Sentiment label → record count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryCounts(BTreeMap<Sentiment, usize>);

impl CategoryCounts {
    pub fn get(&self, label: &Sentiment) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sentiment, usize)> {
        self.0.iter().map(|(label, count)| (label, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl FromIterator<(Sentiment, usize)> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = (Sentiment, usize)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (label, count) in iter {
            *counts.entry(label).or_insert(0) += count;
        }
        Self(counts)
    }
}

/// Per-date, per-label record counts
///
/// Every row carries every label in `labels`, zero-filled, so each label
/// plots as a continuous line. Rows are in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    labels: Vec<Sentiment>,
    rows: BTreeMap<NaiveDate, BTreeMap<Sentiment, usize>>,
}

impl TimeSeries {
    /// Build from (date, label) observations
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Sentiment)>,
    {
        let mut rows: BTreeMap<NaiveDate, BTreeMap<Sentiment, usize>> = BTreeMap::new();
        let mut labels = BTreeSet::new();

        for (date, label) in observations {
            labels.insert(label.clone());
            *rows.entry(date).or_default().entry(label).or_insert(0) += 1;
        }

        for counts in rows.values_mut() {
            for label in &labels {
                counts.entry(label.clone()).or_insert(0);
            }
        }

        Self {
            labels: labels.into_iter().collect(),
            rows,
        }
    }

    /// Labels seen on any date, in category order
    pub fn labels(&self) -> &[Sentiment] {
        &self.labels
    }

    /// Dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.rows.keys()
    }

    pub fn count(&self, date: &NaiveDate, label: &Sentiment) -> usize {
        self.rows
            .get(date)
            .and_then(|counts| counts.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// Counts for one label across all dates, zeros included
    pub fn series(&self, label: &Sentiment) -> Vec<(NaiveDate, usize)> {
        self.rows
            .iter()
            .map(|(date, counts)| (*date, counts.get(label).copied().unwrap_or(0)))
            .collect()
    }

    pub fn row(&self, date: &NaiveDate) -> Option<&BTreeMap<Sentiment, usize>> {
        self.rows.get(date)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum over every cell
    pub fn total(&self) -> usize {
        self.rows.values().flat_map(|counts| counts.values()).sum()
    }

    /// Largest single cell, used to scale the y axis
    pub fn max_count(&self) -> usize {
        self.rows
            .values()
            .flat_map(|counts| counts.values())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// Space-joined text of every record, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Corpus(String);

impl Corpus {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// The three derived views of one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedViews {
    pub category_counts: CategoryCounts,
    pub time_series: TimeSeries,
    #[serde(skip)]
    pub corpus: Corpus,
    /// Records that survived the keyword filter
    pub record_count: usize,
    /// Records left out of the time series for lack of a parseable timestamp
    pub undated: usize,
}

/// True if `record` passes the keyword filter
///
/// `needle` must already be lowercased. Records without text never match a
/// keyword.
fn matches_keyword(record: &Record, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => record
            .text
            .as_deref()
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false),
    }
}

/// Compute the derived views of `records`
///
/// `keyword`, when non-blank after trimming, keeps only records whose text
/// contains it ignoring case. The record cap is checked before anything else.
pub fn aggregate(
    records: &[Record],
    keyword: Option<&str>,
    limits: Limits,
) -> Result<DerivedViews, AggregateError> {
    if records.len() > limits.max_records {
        return Err(AggregateError::DatasetTooLarge {
            count: records.len(),
            limit: limits.max_records,
        });
    }

    let needle = keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);
    let selected: Vec<&Record> = records
        .iter()
        .filter(|record| matches_keyword(record, needle.as_deref()))
        .collect();

    if selected.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }

    let category_counts = selected
        .iter()
        .map(|record| (record.sentiment(), 1))
        .collect::<CategoryCounts>();

    let dated: Vec<(NaiveDate, Sentiment)> = selected
        .iter()
        .filter_map(|record| {
            let date = record.timestamp.as_deref().and_then(parse_calendar_date)?;
            Some((date, record.sentiment()))
        })
        .collect();
    let undated = selected.len() - dated.len();
    let time_series = TimeSeries::from_observations(dated);

    let corpus = Corpus::new(
        selected
            .iter()
            .filter_map(|record| record.non_empty_text())
            .collect::<Vec<_>>()
            .join(" "),
    );

    Ok(DerivedViews {
        category_counts,
        time_series,
        corpus,
        record_count: selected.len(),
        undated,
    })
}
