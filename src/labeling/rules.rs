//! Fixed threshold rules mapping company features to recommendation labels.
//!
//! Every comparison is strict: a value equal to its threshold does not
//! trigger the recommendation.

use serde::Serialize;

use super::{Label, LabelVector};
use crate::orders::CompanyFeatures;

pub const RULESET_VERSION: i64 = 1;

/// Insurance upsell when the average order value exceeds this.
pub const INSURANCE_MIN_AVG_TOTAL: f64 = 500.0;
/// Engagement product when the COD share exceeds this.
pub const ENGAGE_MIN_COD_RATIO: f64 = 0.5;
/// RTO alert when `rto_ratio + remote_ratio` exceeds this.
pub const RTO_ALERT_MIN_RISK: f64 = 0.05;
/// Capital offer when `avg_total * order_count` exceeds this.
pub const CAPITAL_MIN_ORDER_VALUE: f64 = 100_000.0;

/// A company's features together with its rule labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCompany {
    pub features: CompanyFeatures,
    pub labels: LabelVector,
}

/// Human-readable form of one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDescription {
    pub label: Label,
    pub expression: &'static str,
    pub threshold: f64,
}

/// Evaluate one rule against a company.
pub fn rule_fires(label: Label, features: &CompanyFeatures) -> bool {
    match label {
        Label::Insurance => features.avg_total > INSURANCE_MIN_AVG_TOTAL,
        Label::Engage => features.cod_ratio > ENGAGE_MIN_COD_RATIO,
        Label::RtoAlert => features.rto_ratio + features.remote_ratio > RTO_ALERT_MIN_RISK,
        // Total order value is not stored; always the product.
        Label::Capital => {
            features.avg_total * features.order_count as f64 > CAPITAL_MIN_ORDER_VALUE
        }
    }
}

pub fn label_company(features: &CompanyFeatures) -> LabelVector {
    LabelVector::from_fn(|label| rule_fires(label, features))
}

/// Attach rule labels to every company, preserving order.
pub fn label_companies(companies: Vec<CompanyFeatures>) -> Vec<LabeledCompany> {
    companies
        .into_iter()
        .map(|features| {
            let labels = label_company(&features);
            LabeledCompany { features, labels }
        })
        .collect()
}

pub fn describe_rules() -> [RuleDescription; 4] {
    [
        RuleDescription {
            label: Label::Insurance,
            expression: "avg_total > 500",
            threshold: INSURANCE_MIN_AVG_TOTAL,
        },
        RuleDescription {
            label: Label::Engage,
            expression: "cod_ratio > 0.5",
            threshold: ENGAGE_MIN_COD_RATIO,
        },
        RuleDescription {
            label: Label::RtoAlert,
            expression: "(rto_ratio + remote_ratio) > 0.05",
            threshold: RTO_ALERT_MIN_RISK,
        },
        RuleDescription {
            label: Label::Capital,
            expression: "avg_total * order_count > 100000",
            threshold: CAPITAL_MIN_ORDER_VALUE,
        },
    ]
}
