use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{MonthlyRevenue, ReportFilter, RevenueInvoice, ServiceRevenue};

/// Half-open `[start, end)` window selected by the filter. A year wins over
/// an explicit range; either end of the range may be left open.
pub fn date_window(
    filter: &ReportFilter,
) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), AppError> {
    if let Some(year) = filter.year {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        return match (start, end) {
            (Some(start), Some(end)) => Ok((Some(start), Some(end))),
            _ => Err(AppError::BadRequest(format!("invalid year: {year}"))),
        };
    }

    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::BadRequest("from must not be after to".to_string()));
        }
    }
    Ok(dates::day_bounds(filter.from, filter.to))
}

pub fn load_successful_invoices(
    conn: &Connection,
    filter: &ReportFilter,
) -> Result<Vec<RevenueInvoice>, AppError> {
    let (start, end) = date_window(filter)?;
    let invoices =
        queries::successful_invoices(conn, start.as_ref(), end.as_ref(), filter.employee_id)?;
    Ok(invoices)
}

/// Count and total per `YYYY-MM` of invoice date, oldest month first.
pub fn monthly_revenue(invoices: &[RevenueInvoice]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for invoice in invoices {
        let entry = months
            .entry(invoice.invoice_date.format("%Y-%m").to_string())
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += invoice.total_amount;
    }

    months
        .into_iter()
        .map(|(month, (count, total))| MonthlyRevenue { month, count, total })
        .collect()
}

/// Splits each invoice evenly over the distinct services of its booking,
/// regardless of the services' own prices. Highest total first.
///
/// With `only_service` set, shares of other services are dropped but the
/// split still counts every service on the booking.
pub fn service_revenue(invoices: &[RevenueInvoice], only_service: Option<i64>) -> Vec<ServiceRevenue> {
    let mut by_service: HashMap<i64, ServiceRevenue> = HashMap::new();

    for invoice in invoices {
        if invoice.services.is_empty() {
            continue;
        }
        let share = invoice.total_amount / invoice.services.len() as f64;

        for (service_id, name) in &invoice.services {
            if only_service.is_some_and(|wanted| wanted != *service_id) {
                continue;
            }
            let entry = by_service.entry(*service_id).or_insert_with(|| ServiceRevenue {
                service_id: *service_id,
                service: name.clone(),
                count: 0,
                total: 0.0,
            });
            entry.count += 1;
            entry.total += share;
        }
    }

    let mut rows: Vec<ServiceRevenue> = by_service.into_values().collect();
    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.service.cmp(&b.service))
            .then_with(|| a.service_id.cmp(&b.service_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn invoice(date: &str, amount: f64, services: &[(i64, &str)]) -> RevenueInvoice {
        RevenueInvoice {
            invoice_date: dates::parse_input(date).unwrap(),
            total_amount: amount,
            services: services.iter().map(|(id, n)| (*id, n.to_string())).collect(),
        }
    }

    #[test]
    fn test_monthly_groups_and_sorts_ascending() {
        let invoices = vec![
            invoice("2025-03-10", 100.0, &[]),
            invoice("2025-01-05", 50.0, &[]),
            invoice("2025-03-28T18:00:00", 25.0, &[]),
        ];
        let months = monthly_revenue(&invoices);
        assert_eq!(
            months,
            vec![
                MonthlyRevenue { month: "2025-01".to_string(), count: 1, total: 50.0 },
                MonthlyRevenue { month: "2025-03".to_string(), count: 2, total: 125.0 },
            ]
        );
    }

    #[test]
    fn test_even_split_ignores_service_prices() {
        let invoices = vec![invoice(
            "2025-02-01",
            300_000.0,
            &[(1, "Cut"), (2, "Wash"), (3, "Massage")],
        )];
        let rows = service_revenue(&invoices, None);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.total, 100_000.0);
            assert_eq!(row.count, 1);
        }
    }

    #[test]
    fn test_service_table_sorted_by_total_desc() {
        let invoices = vec![
            invoice("2025-02-01", 200.0, &[(1, "Cut"), (2, "Wash")]),
            invoice("2025-02-02", 300.0, &[(2, "Wash")]),
        ];
        let rows = service_revenue(&invoices, None);
        assert_eq!(rows[0].service, "Wash");
        assert_eq!(rows[0].total, 400.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].service, "Cut");
        assert_eq!(rows[1].total, 100.0);
    }

    #[test]
    fn test_service_filter_keeps_split_by_all_services() {
        let invoices = vec![invoice("2025-02-01", 200.0, &[(1, "Cut"), (2, "Wash")])];
        let rows = service_revenue(&invoices, Some(2));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].service_id, 2);
        assert_eq!(rows[0].total, 100.0);
    }

    #[test]
    fn test_invoices_without_services_are_skipped() {
        let invoices = vec![invoice("2025-02-01", 200.0, &[])];
        assert!(service_revenue(&invoices, None).is_empty());
        assert_eq!(monthly_revenue(&invoices)[0].total, 200.0);
    }

    #[test]
    fn test_year_window_covers_whole_year() {
        let filter = ReportFilter {
            year: Some(2024),
            from: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        let (start, end) = date_window(&filter).unwrap();
        assert_eq!(dates::to_db(&start.unwrap()), "2024-01-01 00:00:00");
        assert_eq!(dates::to_db(&end.unwrap()), "2025-01-01 00:00:00");
    }

    #[test]
    fn test_out_of_range_year_is_rejected() {
        for year in [i32::MAX, i32::MIN, 300_000] {
            let filter = ReportFilter {
                year: Some(year),
                ..Default::default()
            };
            assert!(matches!(date_window(&filter), Err(AppError::BadRequest(_))), "{year}");
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let filter = ReportFilter {
            from: NaiveDate::from_ymd_opt(2025, 5, 1),
            to: NaiveDate::from_ymd_opt(2025, 4, 1),
            ..Default::default()
        };
        assert!(matches!(date_window(&filter), Err(AppError::BadRequest(_))));
    }

    fn arb_invoice() -> impl Strategy<Value = RevenueInvoice> {
        (
            1u32..=12,
            1u32..=28,
            0u32..10_000_000,
            prop::collection::btree_set(1i64..20, 0..6),
        )
            .prop_map(|(month, day, amount, ids)| RevenueInvoice {
                invoice_date: NaiveDate::from_ymd_opt(2025, month, day)
                    .and_then(|d| d.and_hms_opt(12, 0, 0))
                    .unwrap(),
                total_amount: amount as f64,
                services: ids.into_iter().map(|id| (id, format!("svc-{id}"))).collect(),
            })
    }

    proptest! {
        /// Month totals add up to the sum of every invoice amount.
        #[test]
        fn monthly_totals_sum_to_invoice_totals(
            invoices in prop::collection::vec(arb_invoice(), 0..40)
        ) {
            let expected: f64 = invoices.iter().map(|i| i.total_amount).sum();
            let months = monthly_revenue(&invoices);
            let actual: f64 = months.iter().map(|m| m.total).sum();
            prop_assert!((expected - actual).abs() <= 1e-6 * expected.max(1.0));

            let count: i64 = months.iter().map(|m| m.count).sum();
            prop_assert_eq!(count, invoices.len() as i64);
            prop_assert!(months.windows(2).all(|w| w[0].month < w[1].month));
        }

        /// The shares of one invoice add back up to its amount.
        #[test]
        fn service_shares_reproduce_invoice_amount(invoice in arb_invoice()) {
            prop_assume!(!invoice.services.is_empty());
            let rows = service_revenue(std::slice::from_ref(&invoice), None);
            prop_assert_eq!(rows.len(), invoice.services.len());
            let sum: f64 = rows.iter().map(|r| r.total).sum();
            prop_assert!((sum - invoice.total_amount).abs() <= 1e-6 * invoice.total_amount.max(1.0));
        }
    }
}
