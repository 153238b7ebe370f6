//! Descriptive statistics over the gold table.

use log::debug;
use polars::frame::DataFrame;
use polars::prelude::*;
use serde::Serialize;

use crate::features::round_half_even;

pub const GROUP_COLUMN: &str = "has_cardio_disease";

pub const DESCRIBE_COLUMNS: [&str; 9] = [
    "age_years",
    "height_cm",
    "weight_kg",
    "systolic_bp",
    "diastolic_bp",
    "bmi",
    "pulse_pressure",
    "cholesterol_level",
    "glucose_level",
];

pub const GROUP_COLUMNS: [&str; 5] = [
    "age_years",
    "systolic_bp",
    "diastolic_bp",
    "bmi",
    "pulse_pressure",
];

pub const CORRELATION_COLUMNS: [&str; 11] = [
    "age_years",
    "systolic_bp",
    "diastolic_bp",
    "bmi",
    "pulse_pressure",
    "cholesterol_level",
    "glucose_level",
    "smokes",
    "drinks_alcohol",
    "physically_active",
    "has_cardio_disease",
];

fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Series> {
    df.column(name)?.cast(&DataType::Float64)
}

fn round2(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| round_half_even(v, 2))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Count, mean, sample std, min, quartiles and max of each column.
pub fn describe(df: &DataFrame, columns: &[&str]) -> PolarsResult<Vec<ColumnSummary>> {
    columns
        .iter()
        .map(|&name| -> PolarsResult<ColumnSummary> {
            let series = float_column(df, name)?;
            let ca = series.f64()?;
            Ok(ColumnSummary {
                column: name.to_string(),
                count: ca.len() - ca.null_count(),
                mean: round2(ca.mean()),
                std: round2(ca.std(1)),
                min: round2(ca.min()),
                q25: round2(ca.quantile(0.25, QuantileInterpolOptions::Linear)?),
                median: round2(ca.median()),
                q75: round2(ca.quantile(0.75, QuantileInterpolOptions::Linear)?),
                max: round2(ca.max()),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub column: String,
    pub has_cardio_disease: bool,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
}

fn stat_name(column: &str, stat: &str) -> String {
    format!("{}_{}", column, stat)
}

fn cell(df: &DataFrame, name: &str, row: Option<usize>) -> PolarsResult<Option<f64>> {
    Ok(match row {
        Some(row) if row < df.height() => float_column(df, name)?.f64()?.get(row),
        _ => None,
    })
}

/// Mean, median and standard deviation of each column, split by the target label.
///
/// Both labels are always reported; a label with no rows gets a zero count.
pub fn group_comparison(df: &DataFrame, columns: &[&str]) -> PolarsResult<Vec<GroupStats>> {
    let aggs: Vec<Expr> = columns
        .iter()
        .flat_map(|&name| {
            [
                col(name).count().alias(&stat_name(name, "count")),
                col(name).mean().alias(&stat_name(name, "mean")),
                col(name).median().alias(&stat_name(name, "median")),
                col(name).std(1).alias(&stat_name(name, "std")),
            ]
        })
        .collect();

    let grouped = df
        .clone()
        .lazy()
        .groupby([col(GROUP_COLUMN)])
        .agg(aggs)
        .collect()?;
    debug!("{} groups by {}", grouped.height(), GROUP_COLUMN);

    let labels: Vec<Option<bool>> = grouped.column(GROUP_COLUMN)?.bool()?.into_iter().collect();
    let mut stats = Vec::with_capacity(columns.len() * 2);
    for label in [false, true] {
        let row = labels.iter().position(|l| *l == Some(label));
        for &name in columns {
            let count = cell(&grouped, &stat_name(name, "count"), row)?;
            stats.push(GroupStats {
                column: name.to_string(),
                has_cardio_disease: label,
                count: count.map_or(0, |c| c as usize),
                mean: round2(cell(&grouped, &stat_name(name, "mean"), row)?),
                median: round2(cell(&grouped, &stat_name(name, "median"), row)?),
                std: round2(cell(&grouped, &stat_name(name, "std"), row)?),
            });
        }
    }
    Ok(stats)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values.get(i)?.get(j).copied().flatten()
    }
}

/// Pearson correlation of every column pair. Pairs where a column has no
/// variance come back as `None`.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> PolarsResult<CorrelationMatrix> {
    let n = columns.len();
    let pairs: Vec<Expr> = (0..n * n)
        .map(|k| {
            let (a, b) = (columns[k / n], columns[k % n]);
            pearson_corr(
                col(a).cast(DataType::Float64),
                col(b).cast(DataType::Float64),
                1,
            )
            .alias(&format!("r{}", k))
        })
        .collect();

    let corr = df.clone().lazy().select(pairs).collect()?;

    let mut values = vec![vec![None; n]; n];
    for k in 0..n * n {
        let r = cell(&corr, &format!("r{}", k), Some(0))?;
        values[k / n][k % n] = r.filter(|v| v.is_finite());
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub descriptive: Vec<ColumnSummary>,
    pub groups: Vec<GroupStats>,
    pub correlation: CorrelationMatrix,
}

pub fn summarize(df: &DataFrame) -> PolarsResult<Statistics> {
    Ok(Statistics {
        descriptive: describe(df, &DESCRIBE_COLUMNS)?,
        groups: group_comparison(df, &GROUP_COLUMNS)?,
        correlation: correlation_matrix(df, &CORRELATION_COLUMNS)?,
    })
}
