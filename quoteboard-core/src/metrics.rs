//! Deterministic aggregation of a quote window into a metrics report.
//!
//! The reduction is a fold over every offer in the window into per-carrier
//! `(count, price_sum)` tallies plus the global price extremes. The parallel
//! strategy partitions the window into chunks, folds each chunk into its own
//! accumulator and merges them; the carrier list is ordered by a `BTreeMap`,
//! so the report layout never depends on how the work was split.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use rayon::prelude::*;

use crate::model::{CarrierMetrics, CarrierOffer, MetricsReport, PriceExtremes, QuoteRecord};

/// How [`aggregate_with`] walks the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregationStrategy {
    /// Single pass on the calling thread.
    #[default]
    Sequential,
    /// Partition-and-merge on the rayon thread pool.
    Parallel {
        /// Number of quote records folded per task.
        chunk_size: NonZeroUsize,
    },
}

impl AggregationStrategy {
    /// Parallel strategy for the given chunk size, or sequential when it is zero.
    #[must_use]
    pub fn parallel_or_sequential(chunk_size: usize) -> Self {
        NonZeroUsize::new(chunk_size)
            .map_or(Self::Sequential, |chunk_size| Self::Parallel { chunk_size })
    }
}

/// Aggregate a quote window sequentially.
#[must_use]
pub fn aggregate(window: &[QuoteRecord]) -> MetricsReport {
    aggregate_with(window, AggregationStrategy::Sequential)
}

/// Aggregate a quote window with the given strategy.
///
/// Both strategies yield the same carriers, counts and extremes; price sums may
/// differ only by floating-point summation order.
#[must_use]
pub fn aggregate_with(window: &[QuoteRecord], strategy: AggregationStrategy) -> MetricsReport {
    if window.is_empty() {
        return MetricsReport::default();
    }

    let accumulator = match strategy {
        AggregationStrategy::Sequential => Accumulator::from_window(window),
        AggregationStrategy::Parallel { chunk_size } => window
            .par_chunks(chunk_size.get())
            .map(Accumulator::from_window)
            .reduce(Accumulator::default, Accumulator::merge),
    };

    accumulator.finish()
}

#[derive(Debug, Clone, Copy, Default)]
struct CarrierTally {
    count: u64,
    price_sum: f64,
}

impl CarrierTally {
    fn add(&mut self, count: u64, price_sum: f64) {
        self.count += count;
        self.price_sum += price_sum;
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    carriers: BTreeMap<String, CarrierTally>,
    // None until the first offer is seen.
    cheapest: Option<f64>,
    most_expensive: f64,
}

impl Accumulator {
    fn from_window(window: &[QuoteRecord]) -> Self {
        let mut accumulator = Self::default();
        for offer in window.iter().flat_map(|record| &record.carriers) {
            accumulator.observe(offer);
        }
        accumulator
    }

    fn observe(&mut self, offer: &CarrierOffer) {
        if let Some(tally) = self.carriers.get_mut(&offer.name) {
            tally.add(1, offer.price);
        } else {
            self.carriers.insert(
                offer.name.clone(),
                CarrierTally {
                    count: 1,
                    price_sum: offer.price,
                },
            );
        }
        self.observe_extremes(Some(offer.price), offer.price);
    }

    fn observe_extremes(&mut self, cheapest: Option<f64>, most_expensive: f64) {
        self.cheapest = match (self.cheapest, cheapest) {
            (Some(current), Some(candidate)) => Some(current.min(candidate)),
            (current, candidate) => current.or(candidate),
        };
        self.most_expensive = self.most_expensive.max(most_expensive);
    }

    fn merge(mut self, other: Self) -> Self {
        for (name, tally) in other.carriers {
            self.carriers
                .entry(name)
                .or_default()
                .add(tally.count, tally.price_sum);
        }
        self.observe_extremes(other.cheapest, other.most_expensive);
        self
    }

    fn finish(self) -> MetricsReport {
        let carrier_metrics = self
            .carriers
            .into_iter()
            .map(|(carrier_name, tally)| CarrierMetrics {
                carrier_name,
                total_quotes: tally.count,
                total_shipping_price: tally.price_sum,
                average_shipping_price: average(tally),
            })
            .collect();

        MetricsReport {
            carrier_metrics,
            cheapest_and_most_expensive: PriceExtremes {
                cheapest_shipping: self.cheapest.unwrap_or_default(),
                most_expensive_shipping: self.most_expensive,
            },
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "offer counts stay far below 2^52"
)]
fn average(tally: CarrierTally) -> f64 {
    if tally.count == 0 {
        0.0
    } else {
        tally.price_sum / tally.count as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::model::QuoteId;

    fn offer(name: &str, price: f64) -> CarrierOffer {
        CarrierOffer {
            name: name.to_owned(),
            service: "Normal".to_owned(),
            deadline: "3".to_owned(),
            price,
        }
    }

    fn record(offers: Vec<CarrierOffer>) -> QuoteRecord {
        let created_at = Utc
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        QuoteRecord::from_parts(QuoteId::new(), created_at, offers)
    }

    fn metric(name: &str, count: u64, sum: f64, avg: f64) -> CarrierMetrics {
        CarrierMetrics {
            carrier_name: name.to_owned(),
            total_quotes: count,
            total_shipping_price: sum,
            average_shipping_price: avg,
        }
    }

    fn assert_close(left: f64, right: f64) {
        let tolerance = 1e-9 * left.abs().max(right.abs()).max(1.0);
        assert!(
            (left - right).abs() <= tolerance,
            "{left} and {right} differ by more than {tolerance}"
        );
    }

    fn assert_reports_match(left: &MetricsReport, right: &MetricsReport) {
        assert_eq!(
            left.carrier_metrics.len(),
            right.carrier_metrics.len(),
            "carrier lists differ in length"
        );
        for (lhs, rhs) in left.carrier_metrics.iter().zip(&right.carrier_metrics) {
            assert_eq!(lhs.carrier_name, rhs.carrier_name, "carrier order differs");
            assert_eq!(lhs.total_quotes, rhs.total_quotes, "counts differ");
            assert_close(lhs.total_shipping_price, rhs.total_shipping_price);
            assert_close(lhs.average_shipping_price, rhs.average_shipping_price);
        }
        assert_eq!(
            left.cheapest_and_most_expensive, right.cheapest_and_most_expensive,
            "extremes differ"
        );
    }

    #[test]
    fn empty_window_yields_zeroed_report() {
        let report = aggregate(&[]);
        assert!(report.carrier_metrics.is_empty());
        assert_eq!(report.cheapest_and_most_expensive, PriceExtremes::default());
    }

    #[test]
    fn window_without_offers_yields_zeroed_report() {
        let window = vec![record(Vec::new()), record(Vec::new())];
        let report = aggregate(&window);
        assert!(report.carrier_metrics.is_empty());
        assert_eq!(report.cheapest_and_most_expensive, PriceExtremes::default());
    }

    #[test]
    fn single_record_with_two_carriers() {
        let window = vec![record(vec![offer("A", 10.0), offer("B", 30.0)])];

        let report = aggregate(&window);

        assert_eq!(
            report,
            MetricsReport {
                carrier_metrics: vec![metric("A", 1, 10.0, 10.0), metric("B", 1, 30.0, 30.0)],
                cheapest_and_most_expensive: PriceExtremes {
                    cheapest_shipping: 10.0,
                    most_expensive_shipping: 30.0,
                },
            }
        );
    }

    #[test]
    fn repeated_carrier_accumulates_across_records() {
        let window = vec![
            record(vec![offer("X", 15.0)]),
            record(vec![offer("X", 20.0)]),
            record(vec![offer("Y", 25.0)]),
        ];

        let report = aggregate(&window);

        assert_eq!(
            report,
            MetricsReport {
                carrier_metrics: vec![metric("X", 2, 35.0, 17.5), metric("Y", 1, 25.0, 25.0)],
                cheapest_and_most_expensive: PriceExtremes {
                    cheapest_shipping: 15.0,
                    most_expensive_shipping: 25.0,
                },
            }
        );
    }

    #[test]
    fn carrier_names_sort_case_sensitively() {
        let window = vec![record(vec![
            offer("correios", 5.0),
            offer("Correios", 6.0),
            offer("BTU", 7.0),
        ])];

        let names: Vec<_> = aggregate(&window)
            .carrier_metrics
            .into_iter()
            .map(|metrics| metrics.carrier_name)
            .collect();

        assert_eq!(names, ["BTU", "Correios", "correios"]);
    }

    #[test]
    fn free_offer_is_the_cheapest() {
        let window = vec![record(vec![offer("A", 0.0), offer("B", 12.0)])];
        let extremes = aggregate(&window).cheapest_and_most_expensive;
        assert_eq!(extremes.cheapest_shipping, 0.0);
        assert_eq!(extremes.most_expensive_shipping, 12.0);
    }

    #[test]
    fn parallel_strategy_matches_on_empty_records_between_offers() {
        let window = vec![
            record(Vec::new()),
            record(vec![offer("A", 3.5)]),
            record(Vec::new()),
            record(vec![offer("A", 1.5), offer("B", 9.0)]),
        ];
        let strategy = AggregationStrategy::parallel_or_sequential(1);

        assert_reports_match(&aggregate_with(&window, strategy), &aggregate(&window));
    }

    #[test]
    fn zero_chunk_size_falls_back_to_sequential() {
        assert_eq!(
            AggregationStrategy::parallel_or_sequential(0),
            AggregationStrategy::Sequential
        );
    }

    const CARRIERS: [&str; 5] = ["Correios", "EXPRESSO FR", "Jadlog", "btu", "Azul Cargo"];

    fn window_strategy() -> impl Strategy<Value = Vec<QuoteRecord>> {
        let offer_strategy =
            (0..CARRIERS.len(), 0.0..2_000.0_f64).prop_map(|(carrier, price)| {
                offer(CARRIERS.get(carrier).copied().unwrap_or("Correios"), price)
            });
        proptest::collection::vec(
            proptest::collection::vec(offer_strategy, 0..6).prop_map(record),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn report_is_invariant_under_permutation(window in window_strategy(), shift in 0usize..40) {
            let mut permuted = window.clone();
            permuted.reverse();
            if !permuted.is_empty() {
                let len = permuted.len();
                permuted.rotate_left(shift % len);
            }

            assert_reports_match(&aggregate(&permuted), &aggregate(&window));
        }

        #[test]
        fn carriers_are_sorted_and_unique(window in window_strategy()) {
            let report = aggregate(&window);
            for pair in report.carrier_metrics.windows(2) {
                if let [first, second] = pair {
                    prop_assert!(first.carrier_name < second.carrier_name);
                }
            }
        }

        #[test]
        fn counts_and_averages_are_consistent(window in window_strategy()) {
            let report = aggregate(&window);
            for metrics in &report.carrier_metrics {
                let offers: Vec<f64> = window
                    .iter()
                    .flat_map(|record| &record.carriers)
                    .filter(|offer| offer.name == metrics.carrier_name)
                    .map(|offer| offer.price)
                    .collect();

                prop_assert_eq!(metrics.total_quotes, offers.len() as u64);
                prop_assert!(metrics.total_quotes > 0);
                assert_close(metrics.total_shipping_price, offers.iter().sum());
                assert_close(
                    metrics.average_shipping_price,
                    metrics.total_shipping_price / metrics.total_quotes as f64,
                );
            }
        }

        #[test]
        fn extremes_bound_every_offer(window in window_strategy()) {
            let report = aggregate(&window);
            let extremes = report.cheapest_and_most_expensive;
            let mut prices = window
                .iter()
                .flat_map(|record| &record.carriers)
                .map(|offer| offer.price)
                .peekable();

            if prices.peek().is_none() {
                prop_assert_eq!(extremes, PriceExtremes::default());
            }
            for price in prices {
                prop_assert!(extremes.cheapest_shipping <= price);
                prop_assert!(extremes.most_expensive_shipping >= price);
            }
        }

        #[test]
        fn parallel_matches_sequential(window in window_strategy(), chunk_size in 1usize..8) {
            let strategy = AggregationStrategy::parallel_or_sequential(chunk_size);
            assert_reports_match(&aggregate_with(&window, strategy), &aggregate(&window));
        }
    }
}
