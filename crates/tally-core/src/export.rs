//! CSV export of category summaries and drill-down listings

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::models::{CategorySummary, TransactionDetail};

const SUMMARY_HEADER: [&str; 5] = ["Category", "Count", "Total", "Average", "Percentage"];
const BUDGET_HEADER: [&str; 2] = ["Budget", "Deviation"];
const DETAIL_HEADER: [&str; 3] = ["Date", "Description", "Amount"];

#[derive(Serialize)]
struct SummaryRow<'a> {
    category: &'a str,
    count: usize,
    total: f64,
    average: f64,
    percentage: f64,
}

#[derive(Serialize)]
struct BudgetSummaryRow<'a> {
    category: &'a str,
    count: usize,
    total: f64,
    average: f64,
    percentage: f64,
    budget: Option<f64>,
    deviation: Option<f64>,
}

#[derive(Serialize)]
struct DetailRow<'a> {
    date: &'a str,
    description: &'a str,
    amount: f64,
}

/// Write category summaries as CSV in the order given
///
/// With `include_budget`, `Budget` and `Deviation` columns follow; they are
/// left empty for categories without a budget. Returns the number of rows.
pub fn export_summary_csv<W: Write>(
    writer: W,
    summaries: &[CategorySummary],
    include_budget: bool,
) -> Result<usize> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    if include_budget {
        wtr.write_record(SUMMARY_HEADER.iter().chain(BUDGET_HEADER.iter()))?;
    } else {
        wtr.write_record(SUMMARY_HEADER)?;
    }

    for s in summaries {
        if include_budget {
            wtr.serialize(BudgetSummaryRow {
                category: &s.category,
                count: s.count,
                total: s.total,
                average: s.average,
                percentage: s.percentage,
                budget: s.budget,
                deviation: s.deviation,
            })?;
        } else {
            wtr.serialize(SummaryRow {
                category: &s.category,
                count: s.count,
                total: s.total,
                average: s.average,
                percentage: s.percentage,
            })?;
        }
    }

    wtr.flush()?;
    info!("Exported {} category summaries", summaries.len());
    Ok(summaries.len())
}

/// Write a drill-down listing as CSV
pub fn export_details_csv<W: Write>(writer: W, details: &[TransactionDetail]) -> Result<usize> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(DETAIL_HEADER)?;

    for d in details {
        wtr.serialize(DetailRow {
            date: &d.date,
            description: &d.description,
            amount: d.amount,
        })?;
    }

    wtr.flush()?;
    info!("Exported {} transactions", details.len());
    Ok(details.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(category: &str, total: f64, budget: Option<f64>) -> CategorySummary {
        CategorySummary {
            category: category.to_string(),
            count: 2,
            total,
            raw_total: -total,
            average: -total / 2.0,
            percentage: 50.0,
            budget,
            deviation: budget.map(|b| b - total),
        }
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_csv() {
        let mut buf = Vec::new();
        let rows = export_summary_csv(
            &mut buf,
            &[summary("Gas", 30.0, None), summary("Food, Drink", 30.0, None)],
            false,
        )
        .unwrap();

        assert_eq!(rows, 2);
        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Category,Count,Total,Average,Percentage");
        assert_eq!(lines[1], "Gas,2,30.0,-15.0,50.0");
        assert_eq!(lines[2], "\"Food, Drink\",2,30.0,-15.0,50.0");
    }

    #[test]
    fn test_summary_csv_with_budget_columns() {
        let mut buf = Vec::new();
        export_summary_csv(
            &mut buf,
            &[summary("Restaurants", 50.0, Some(40.0)), summary("Gas", 30.0, None)],
            true,
        )
        .unwrap();

        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "Category,Count,Total,Average,Percentage,Budget,Deviation"
        );
        assert_eq!(lines[1], "Restaurants,2,50.0,-25.0,50.0,40.0,-10.0");
        assert_eq!(lines[2], "Gas,2,30.0,-15.0,50.0,,");
    }

    #[test]
    fn test_empty_summary_still_has_header() {
        let mut buf = Vec::new();
        assert_eq!(export_summary_csv(&mut buf, &[], false).unwrap(), 0);
        assert_eq!(to_string(buf), "Category,Count,Total,Average,Percentage\n");
    }

    #[test]
    fn test_details_csv() {
        let mut buf = Vec::new();
        let details = vec![
            TransactionDetail {
                date: "2024-01-01".into(),
                description: "SHELL".into(),
                amount: -12.5,
            },
            TransactionDetail {
                date: "2024-01-02".into(),
                description: "EXXON".into(),
                amount: -20.0,
            },
        ];
        export_details_csv(&mut buf, &details).unwrap();

        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![
            "Date,Description,Amount",
            "2024-01-01,SHELL,-12.5",
            "2024-01-02,EXXON,-20.0",
        ]);
    }
}
