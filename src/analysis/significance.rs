//! Significance tests across country groups.
//!
//! Runs the Kruskal-Wallis H test (rank based) and one-way ANOVA (variance
//! based) on the non-missing values of one metric, one group per country.
//! p-values come from the chi-squared and F distributions in `statrs`.

use crate::constants::SIGNIFICANCE_LEVEL;
use crate::dataset::CombinedDataset;
use crate::error::{Result, SolarError};
use crate::models::{StatisticalComparison, TestKind, TestResult};

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};
use tracing::debug;

/// Run both tests on `metric` at the default significance level
pub fn compare(dataset: &CombinedDataset, metric: &str) -> Result<StatisticalComparison> {
    compare_with_level(dataset, metric, SIGNIFICANCE_LEVEL)
}

/// Alias used by the presentation layer
pub fn perform_statistical_test(
    dataset: &CombinedDataset,
    metric: &str,
) -> Result<StatisticalComparison> {
    compare(dataset, metric)
}

/// Run both tests, flagging p-values below `significance_level`
pub fn compare_with_level(
    dataset: &CombinedDataset,
    metric: &str,
    significance_level: f64,
) -> Result<StatisticalComparison> {
    let groups: Vec<Vec<f64>> = dataset.grouped_values(metric)?.into_values().collect();

    let (h_statistic, p_kruskal) = kruskal_wallis(metric, &groups)?;
    let (f_statistic, p_anova) = one_way_anova(metric, &groups)?;

    debug!(
        "{}: H={:.4} (p={:.6}), F={:.4} (p={:.6}) over {} groups",
        metric,
        h_statistic,
        p_kruskal,
        f_statistic,
        p_anova,
        groups.len()
    );

    Ok(StatisticalComparison {
        kruskal_wallis: TestResult::new(
            TestKind::KruskalWallis,
            h_statistic,
            p_kruskal,
            significance_level,
        ),
        anova: TestResult::new(TestKind::Anova, f_statistic, p_anova, significance_level),
    })
}

/// Kruskal-Wallis H statistic with tie correction and its p-value
pub fn kruskal_wallis(metric: &str, groups: &[Vec<f64>]) -> Result<(f64, f64)> {
    check_groups(metric, groups)?;

    let mut pooled: Vec<(f64, usize)> = groups
        .iter()
        .enumerate()
        .flat_map(|(group, values)| values.iter().map(move |&v| (v, group)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pooled.len() as f64;
    let mut rank_sums = vec![0.0; groups.len()];
    let mut tie_term = 0.0;

    // Tied runs share the average of the ranks they span
    let mut start = 0;
    while start < pooled.len() {
        let mut end = start + 1;
        while end < pooled.len() && pooled[end].0 == pooled[start].0 {
            end += 1;
        }

        let average_rank = (start + 1 + end) as f64 / 2.0;
        for &(_, group) in &pooled[start..end] {
            rank_sums[group] += average_rank;
        }

        let tied = (end - start) as f64;
        tie_term += tied.powi(3) - tied;
        start = end;
    }

    let correction = 1.0 - tie_term / (n.powi(3) - n);
    if correction <= 0.0 {
        return Err(SolarError::insufficient_data(
            metric,
            "all observations are identical",
        ));
    }

    let weighted: f64 = rank_sums
        .iter()
        .zip(groups)
        .map(|(sum, values)| sum * sum / values.len() as f64)
        .sum();
    let h = ((12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0)) / correction).max(0.0);

    let degrees = (groups.len() - 1) as f64;
    let distribution = ChiSquared::new(degrees)
        .map_err(|e| SolarError::insufficient_data(metric, e.to_string()))?;

    Ok((h, distribution.sf(h)))
}

/// One-way ANOVA F statistic and its p-value
pub fn one_way_anova(metric: &str, groups: &[Vec<f64>]) -> Result<(f64, f64)> {
    check_groups(metric, groups)?;

    let k = groups.len() as f64;
    let n: f64 = groups.iter().map(|g| g.len() as f64).sum();
    let grand_mean = groups.iter().flatten().sum::<f64>() / n;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for values in groups {
        let size = values.len() as f64;
        let group_mean = values.iter().sum::<f64>() / size;
        ss_between += size * (group_mean - grand_mean).powi(2);
        ss_within += values.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = k - 1.0;
    let df_within = n - k;

    if ss_within == 0.0 {
        if ss_between == 0.0 {
            return Err(SolarError::insufficient_data(
                metric,
                "all observations are identical",
            ));
        }
        // No spread inside any group: the groups are perfectly separated
        return Ok((f64::INFINITY, 0.0));
    }

    let f = (ss_between / df_between) / (ss_within / df_within);
    let distribution = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| SolarError::insufficient_data(metric, e.to_string()))?;

    Ok((f, distribution.sf(f)))
}

fn check_groups(metric: &str, groups: &[Vec<f64>]) -> Result<()> {
    if groups.len() < 2 {
        return Err(SolarError::insufficient_data(
            metric,
            format!(
                "at least 2 countries with observations are required, found {}",
                groups.len()
            ),
        ));
    }

    if let Some(smallest) = groups.iter().map(Vec::len).min() {
        if smallest < 2 {
            return Err(SolarError::insufficient_data(
                metric,
                "every country needs at least 2 observations",
            ));
        }
    }

    Ok(())
}
