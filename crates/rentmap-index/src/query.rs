//! Tract time series across years.

use rentmap_core::Record;

use crate::index::StratifiedIndex;

/// Records for one (place, tract name), ascending by year.
///
/// Years where the place has data but the tract does not are skipped. An
/// unknown place or tract yields an empty series rather than an error.
///
/// ```
/// use rentmap_index::{StratifiedIndex, tract_series};
///
/// let index = StratifiedIndex::default();
/// assert!(tract_series(&index, "Long Beach", "Census Tract 5701").is_empty());
/// ```
pub fn tract_series<'a>(
    index: &'a StratifiedIndex,
    place: &str,
    tract_name: &str,
) -> Vec<&'a Record> {
    index
        .available_years(place)
        .into_iter()
        .filter_map(|year| index.record(year, place, tract_name))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::IndexBuilder;
    use rentmap_ingest::Dataset;

    #[test]
    fn test_series_skips_missing_years() {
        let mut dataset = Dataset::default();
        for year in [2014, 2015, 2016] {
            let mut rows = vec![Record::new(year, "Long Beach", "Census Tract 2", "g2")];
            if year != 2015 {
                rows.push(
                    Record::new(year, "Long Beach", "Census Tract 1", "g1")
                        .with_estimates(Some(f64::from(year) - 1000.0), None, None),
                );
            }
            dataset.insert_year(year, rows, vec![]);
        }
        let (index, _) = IndexBuilder::new().build(dataset).unwrap();

        let series = tract_series(&index, "Long Beach", "Census Tract 1");
        let years: Vec<_> = series.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2014, 2016]);
        assert_eq!(series[1].display.median, "$1016");

        assert!(tract_series(&index, "Long Beach", "Census Tract 9").is_empty());
        assert!(tract_series(&index, "Pasadena", "Census Tract 1").is_empty());
    }
}
