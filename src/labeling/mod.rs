//! Recommendation labels and the threshold rules that produce them.
//!
//! Rule labels are the ground truth the classifier is fitted against; the
//! classifier's output uses the same four labels.

use std::fmt;

use serde::Serialize;

pub mod rules;

pub use rules::{
    CAPITAL_MIN_ORDER_VALUE, ENGAGE_MIN_COD_RATIO, INSURANCE_MIN_AVG_TOTAL, LabeledCompany,
    RTO_ALERT_MIN_RISK, RULESET_VERSION, RuleDescription, describe_rules, label_companies,
    label_company,
};

/// One of the four independent recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    Insurance,
    Engage,
    RtoAlert,
    Capital,
}

impl Label {
    /// Every label, in column order.
    pub const ALL: [Label; 4] = [
        Label::Insurance,
        Label::Engage,
        Label::RtoAlert,
        Label::Capital,
    ];

    /// Column name of the rule-derived label.
    pub fn label_column(self) -> &'static str {
        match self {
            Label::Insurance => "recommend_insurance",
            Label::Engage => "recommend_engage",
            Label::RtoAlert => "recommend_rto_alert",
            Label::Capital => "recommend_capital",
        }
    }

    /// Column name of the model prediction.
    pub fn prediction_column(self) -> &'static str {
        match self {
            Label::Insurance => "pred_insurance",
            Label::Engage => "pred_engage",
            Label::RtoAlert => "pred_rto_alert",
            Label::Capital => "pred_capital",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Insurance => write!(f, "Insurance"),
            Label::Engage => write!(f, "Engage360"),
            Label::RtoAlert => write!(f, "RTO Alert"),
            Label::Capital => write!(f, "Capital"),
        }
    }
}

/// Rule-derived recommendations for one company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LabelVector {
    pub recommend_insurance: bool,
    pub recommend_engage: bool,
    pub recommend_rto_alert: bool,
    pub recommend_capital: bool,
}

impl LabelVector {
    pub fn from_fn(mut f: impl FnMut(Label) -> bool) -> Self {
        Self {
            recommend_insurance: f(Label::Insurance),
            recommend_engage: f(Label::Engage),
            recommend_rto_alert: f(Label::RtoAlert),
            recommend_capital: f(Label::Capital),
        }
    }

    pub fn get(&self, label: Label) -> bool {
        match label {
            Label::Insurance => self.recommend_insurance,
            Label::Engage => self.recommend_engage,
            Label::RtoAlert => self.recommend_rto_alert,
            Label::Capital => self.recommend_capital,
        }
    }
}

/// Model-predicted recommendations for one company. May disagree with the
/// rule labels on any field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PredictionVector {
    pub pred_insurance: bool,
    pub pred_engage: bool,
    pub pred_rto_alert: bool,
    pub pred_capital: bool,
}

impl PredictionVector {
    pub fn from_fn(mut f: impl FnMut(Label) -> bool) -> Self {
        Self {
            pred_insurance: f(Label::Insurance),
            pred_engage: f(Label::Engage),
            pred_rto_alert: f(Label::RtoAlert),
            pred_capital: f(Label::Capital),
        }
    }

    pub fn get(&self, label: Label) -> bool {
        match label {
            Label::Insurance => self.pred_insurance,
            Label::Engage => self.pred_engage,
            Label::RtoAlert => self.pred_rto_alert,
            Label::Capital => self.pred_capital,
        }
    }
}
