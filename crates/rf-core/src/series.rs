//! Date-indexed daily series.
//!
//! A `DailySeries` is a contiguous run of values, one per calendar day,
//! starting at a fixed date. Every series in the engine (inflow, rule curve,
//! release, storage) is one of these, parameterised by its unit type.

use chrono::{Duration, NaiveDate};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailySeries<T> {
    start: NaiveDate,
    values: Vec<T>,
}

impl<T: Copy> DailySeries<T> {
    pub fn new(start: NaiveDate, values: Vec<T>) -> Self {
        Self { start, values }
    }

    /// Build a series over the inclusive range `[start, end]`.
    ///
    /// Returns an empty series starting at `start` when `end < start`.
    pub fn from_fn(start: NaiveDate, end: NaiveDate, mut f: impl FnMut(NaiveDate) -> T) -> Self {
        let values = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(&mut f)
            .collect();
        Self { start, values }
    }

    /// Fallible variant of [`DailySeries::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(
        start: NaiveDate,
        end: NaiveDate,
        mut f: impl FnMut(NaiveDate) -> Result<T, E>,
    ) -> Result<Self, E> {
        let values = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(&mut f)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self { start, values })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date covered, or `None` when empty.
    pub fn end(&self) -> Option<NaiveDate> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.date_at(self.values.len() - 1))
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn first(&self) -> Option<T> {
        self.values.first().copied()
    }

    pub fn date_at(&self, offset: usize) -> NaiveDate {
        self.start + Duration::days(offset as i64)
    }

    /// Offset of `date` from the start, if it falls inside the series.
    pub fn offset_of(&self, date: NaiveDate) -> Option<usize> {
        let days = (date - self.start).num_days();
        if days < 0 || days as usize >= self.values.len() {
            None
        } else {
            Some(days as usize)
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<T> {
        self.offset_of(date).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.date_at(i), *v))
    }

    /// Keep only dates on or after `date`.
    pub fn truncate_before(&self, date: NaiveDate) -> Self {
        if date <= self.start {
            return self.clone();
        }
        let skip = (date - self.start).num_days() as usize;
        Self {
            start: date,
            values: self.values.iter().skip(skip).copied().collect(),
        }
    }

    /// Sub-series of `len` days starting at `start`; `None` unless fully covered.
    pub fn window(&self, start: NaiveDate, len: usize) -> Option<Self> {
        if len == 0 {
            return Some(Self {
                start,
                values: Vec::new(),
            });
        }
        let first = self.offset_of(start)?;
        let last = first.checked_add(len - 1)?;
        if last >= self.values.len() {
            return None;
        }
        Some(Self {
            start,
            values: self.values[first..=last].to_vec(),
        })
    }

    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> DailySeries<U> {
        DailySeries {
            start: self.start,
            values: self.values.iter().copied().map(f).collect(),
        }
    }

    /// Element-wise combination of two series over the same dates.
    pub fn zip_with<U: Copy, V: Copy>(
        &self,
        other: &DailySeries<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> Option<DailySeries<V>> {
        if self.start != other.start || self.len() != other.len() {
            return None;
        }
        Some(DailySeries {
            start: self.start,
            values: self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }
}
