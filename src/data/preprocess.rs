//! Raw frame -> clean close-price series

use crate::core::{HedgeError, HedgeResult, PriceFrame, PriceSeries};

/// Reduces a raw OHLC frame to a clean close-price series.
///
/// Only the close is kept. Rows whose close is missing or non-finite are
/// dropped, never imputed; gaps in open/high/low/adj-close/volume do not
/// remove a row. The remaining rows are ordered by date; a repeated date is
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesPreprocessor;

impl SeriesPreprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, frame: &PriceFrame) -> HedgeResult<PriceSeries> {
        let mut rows: Vec<_> = frame
            .bars
            .iter()
            .filter_map(|bar| bar.usable_close().map(|close| (bar.date, close)))
            .collect();

        let dropped = frame.len() - rows.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} rows without a close for {}", dropped, frame.symbol);
        }

        if rows.is_empty() {
            return Err(HedgeError::empty_data(format!(
                "no usable price observations for {}",
                frame.symbol
            )));
        }

        rows.sort_by_key(|(date, _)| *date);
        let series = PriceSeries::from_pairs(rows)?;

        tracing::info!("Preprocessed {}: {} close prices", frame.symbol, series.len());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PriceBar;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_drops_rows_without_close() {
        let mut gap = PriceBar::flat(d(2), 101.0);
        gap.close = None;
        let frame = PriceFrame::new(
            "TEST",
            vec![PriceBar::flat(d(1), 100.0), gap, PriceBar::flat(d(3), 102.0)],
        );

        let series = SeriesPreprocessor::new().process(&frame).unwrap();
        assert_eq!(series.values(), &[100.0, 102.0]);
        assert_eq!(series.dates(), &[d(1), d(3)]);
    }

    #[test]
    fn test_other_fields_do_not_drop_rows() {
        let mut no_open = PriceBar::flat(d(3), 102.0);
        no_open.open = None;
        let mut bars = vec![PriceBar::flat(d(1), 100.0), PriceBar::flat(d(2), 101.0), no_open];
        for bar in &mut bars {
            bar.adj_close = None;
        }
        let frame = PriceFrame::new("TEST", bars);

        let series = SeriesPreprocessor::new().process(&frame).unwrap();
        assert_eq!(series.values(), &[100.0, 101.0, 102.0]);
    }

    #[test]
    fn test_sorts_by_date() {
        let frame = PriceFrame::new(
            "TEST",
            vec![PriceBar::flat(d(3), 3.0), PriceBar::flat(d(1), 1.0)],
        );
        let series = SeriesPreprocessor::new().process(&frame).unwrap();
        assert_eq!(series.values(), &[1.0, 3.0]);
    }

    #[test]
    fn test_empty_after_cleaning() {
        let mut bar = PriceBar::flat(d(1), 100.0);
        bar.close = None;
        let frame = PriceFrame::new("TEST", vec![bar]);

        assert!(matches!(
            SeriesPreprocessor::new().process(&frame),
            Err(HedgeError::EmptyData(_))
        ));
        assert!(matches!(
            SeriesPreprocessor::new().process(&PriceFrame::new("TEST", vec![])),
            Err(HedgeError::EmptyData(_))
        ));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let frame = PriceFrame::new(
            "TEST",
            vec![PriceBar::flat(d(1), 1.0), PriceBar::flat(d(1), 2.0)],
        );
        assert!(matches!(
            SeriesPreprocessor::new().process(&frame),
            Err(HedgeError::InvalidInput(_))
        ));
    }
}
