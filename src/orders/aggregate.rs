//! Per-company feature aggregation.

use std::collections::HashMap;

use serde::Serialize;

use super::loader::OrderRecord;

/// Order status codes that mark an order as return-to-origin prone.
pub const RTO_STATUSES: [i64; 2] = [15, 16];
/// Pincodes flagged as logistically remote.
pub const REMOTE_PINCODES: [&str; 3] = ["173212", "796007", "431002"];
/// Payment method (compared lower-cased) counted as cash-on-delivery.
pub const COD_PAYMENT_METHOD: &str = "cod";

/// Number of numeric features per company row.
pub const FEATURE_COUNT: usize = 5;

/// Feature names in feature-row order, paired with a short description.
pub const FEATURE_DESCRIPTIONS: [(&str, &str); FEATURE_COUNT] = [
    ("avg_total", "Average order value"),
    ("cod_ratio", "Ratio of COD orders"),
    ("rto_ratio", "RTO-prone order status ratio"),
    ("remote_ratio", "Remote pincode ratio"),
    ("order_count", "Total order volume"),
];

/// Aggregated order behaviour for one company.
///
/// Ratios lie in `[0, 1]` and `order_count` is at least 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyFeatures {
    pub company_id: String,
    pub avg_total: f64,
    pub cod_ratio: f64,
    pub rto_ratio: f64,
    pub remote_ratio: f64,
    pub order_count: usize,
}

impl CompanyFeatures {
    /// Numeric features in `FEATURE_DESCRIPTIONS` order.
    pub fn feature_row(&self) -> Vec<f64> {
        vec![
            self.avg_total,
            self.cod_ratio,
            self.rto_ratio,
            self.remote_ratio,
            self.order_count as f64,
        ]
    }
}

#[derive(Debug, Default)]
struct CompanyTally {
    total_sum: f64,
    cod: usize,
    rto: usize,
    remote: usize,
    orders: usize,
}

impl CompanyTally {
    fn add(&mut self, record: &OrderRecord) {
        self.total_sum += record.total;
        if is_cod(&record.payment_method) {
            self.cod += 1;
        }
        if RTO_STATUSES.contains(&record.status) {
            self.rto += 1;
        }
        if REMOTE_PINCODES.contains(&record.customer_pincode.as_str()) {
            self.remote += 1;
        }
        self.orders += 1;
    }

    fn finish(self, company_id: String) -> CompanyFeatures {
        let n = self.orders as f64;
        CompanyFeatures {
            company_id,
            avg_total: self.total_sum / n,
            cod_ratio: self.cod as f64 / n,
            rto_ratio: self.rto as f64 / n,
            remote_ratio: self.remote as f64 / n,
            order_count: self.orders,
        }
    }
}

fn is_cod(payment_method: &str) -> bool {
    payment_method.to_lowercase() == COD_PAYMENT_METHOD
}

/// Group orders by company and compute one feature row per company.
///
/// Rows come out in the order each company first appears in `records`.
pub fn aggregate_companies(records: &[OrderRecord]) -> Vec<CompanyFeatures> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, CompanyTally)> = Vec::new();
    for record in records {
        let slot = *index.entry(record.company_id.as_str()).or_insert_with(|| {
            groups.push((record.company_id.as_str(), CompanyTally::default()));
            groups.len() - 1
        });
        groups[slot].1.add(record);
    }
    groups
        .into_iter()
        .map(|(company_id, tally)| tally.finish(company_id.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(company: &str, total: f64, method: &str, status: i64, pincode: &str) -> OrderRecord {
        OrderRecord {
            company_id: company.into(),
            total,
            payment_method: method.into(),
            status,
            customer_pincode: pincode.into(),
            channel_order_id: format!("{company}-{total}"),
        }
    }

    #[test]
    fn average_total_is_exact_mean() {
        let records = vec![
            order("acme", 100.0, "prepaid", 1, "110001"),
            order("acme", 300.0, "prepaid", 1, "110001"),
            order("acme", 500.0, "prepaid", 1, "110001"),
        ];
        let companies = aggregate_companies(&records);
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].avg_total, 300.0);
        assert_eq!(companies[0].order_count, 3);
    }

    #[test]
    fn ratios_count_cod_rto_and_remote_orders() {
        let records = vec![
            order("acme", 10.0, "COD", 15, "173212"),
            order("acme", 10.0, "Cod", 16, "110001"),
            order("acme", 10.0, "prepaid", 7, "796007"),
            order("acme", 10.0, "card", 14, "431002"),
        ];
        let acme = &aggregate_companies(&records)[0];
        assert_eq!(acme.cod_ratio, 0.5);
        assert_eq!(acme.rto_ratio, 0.5);
        assert_eq!(acme.remote_ratio, 0.75);
    }

    #[test]
    fn cod_match_is_exact_after_lowercasing() {
        let records = vec![
            order("acme", 10.0, "cod ", 1, "1"),
            order("acme", 10.0, "COD-partial", 1, "1"),
        ];
        assert_eq!(aggregate_companies(&records)[0].cod_ratio, 0.0);
    }

    #[test]
    fn single_order_yields_degenerate_ratios() {
        let records = vec![order("solo", 42.0, "cod", 15, "999999")];
        let solo = &aggregate_companies(&records)[0];
        assert_eq!(solo.cod_ratio, 1.0);
        assert_eq!(solo.rto_ratio, 1.0);
        assert_eq!(solo.remote_ratio, 0.0);
        assert_eq!(solo.order_count, 1);
    }

    #[test]
    fn companies_keep_first_appearance_order() {
        let records = vec![
            order("zeta", 1.0, "cod", 1, "1"),
            order("alpha", 1.0, "cod", 1, "1"),
            order("zeta", 1.0, "cod", 1, "1"),
            order("mid", 1.0, "cod", 1, "1"),
        ];
        let ids: Vec<String> = aggregate_companies(&records)
            .into_iter()
            .map(|c| c.company_id)
            .collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_order_ids_are_counted() {
        let mut first = order("acme", 10.0, "cod", 1, "1");
        first.channel_order_id = "dup".into();
        let second = first.clone();
        assert_eq!(aggregate_companies(&[first, second])[0].order_count, 2);
    }

    #[test]
    fn ratios_stay_within_unit_interval() {
        let methods = ["cod", "COD", "prepaid", "card"];
        let pincodes = ["173212", "110001", "796007", "560001", "431002"];
        let mut records = Vec::new();
        for i in 0..60usize {
            records.push(order(
                &format!("c{}", i % 7),
                (i * 37 % 1000) as f64,
                methods[i % methods.len()],
                (i % 20) as i64,
                pincodes[i % pincodes.len()],
            ));
        }
        let companies = aggregate_companies(&records);
        assert_eq!(companies.len(), 7);
        for company in companies {
            for ratio in [company.cod_ratio, company.rto_ratio, company.remote_ratio] {
                assert!((0.0..=1.0).contains(&ratio), "{ratio} out of range");
            }
            assert!(company.order_count >= 1);
        }
    }

    #[test]
    fn empty_input_yields_no_companies() {
        assert!(aggregate_companies(&[]).is_empty());
    }

    #[test]
    fn feature_row_follows_descriptions_order() {
        let records = vec![order("acme", 200.0, "cod", 15, "173212")];
        let row = aggregate_companies(&records)[0].feature_row();
        assert_eq!(row.len(), FEATURE_DESCRIPTIONS.len());
        assert_eq!(row, vec![200.0, 1.0, 1.0, 1.0, 1.0]);
    }
}
