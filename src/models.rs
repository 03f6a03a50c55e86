// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    None,
    Daily,
    Weekdays,
    Weekly,
    Monthly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekdays => "weekdays",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "none" => RecurrenceType::None,
            "daily" => RecurrenceType::Daily,
            "weekdays" => RecurrenceType::Weekdays,
            "weekly" => RecurrenceType::Weekly,
            "monthly" => RecurrenceType::Monthly,
            _ => bail!(
                "Invalid recurrence '{}', expected none|daily|weekdays|weekly|monthly",
                s
            ),
        })
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, RecurrenceType::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    Simple,
    Compound,
}

impl InterestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Simple => "simple",
            InterestType::Compound => "compound",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "simple" => InterestType::Simple,
            "compound" => InterestType::Compound,
            _ => bail!("Invalid interest type '{}', expected simple|compound", s),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String, // #RRGGBB
    pub icon: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal, // positive magnitude
    pub currency: String,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    // Limits in effect when the expense was recorded; informational only.
    pub daily_limit_at: Option<Decimal>,
    pub monthly_limit_at: Option<Decimal>,
    // Display-time rate: 1 unit of `currency` = rate units of the default currency.
    pub exchange_rate: Option<Decimal>,
    pub recurrence: RecurrenceType,
    pub recurrence_end: Option<NaiveDate>,
    pub recurrence_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialPlan {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_months: u32,
    pub monthly_income: Decimal,
    pub manual_monthly_expenses: Decimal,
    pub use_historical: bool,
    pub apply_inflation: bool,
    pub inflation_rate: Decimal, // annual %, also drives income growth
    pub apply_interest: bool,
    pub interest_rate: Decimal, // annual %, stored but not folded into breakdowns
    pub interest_type: InterestType,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FinancialPlan {
    pub fn end_date(&self) -> NaiveDate {
        crate::utils::add_months(self.start_date, self.duration_months as i32)
    }

    /// Strictly between start and end.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start_date < today && today < self.end_date()
    }

    /// Whole months from start to `today`, counting the first partial month
    /// as 1. Clamped to the plan duration.
    pub fn months_elapsed(&self, today: NaiveDate) -> u32 {
        if today <= self.start_date {
            return 0;
        }
        let whole = crate::utils::whole_months_between(self.start_date, today);
        (whole + 1).min(self.duration_months)
    }

    pub fn progress(&self, today: NaiveDate) -> f64 {
        if self.duration_months == 0 {
            return 0.0;
        }
        let frac = self.months_elapsed(today) as f64 / self.duration_months as f64;
        frac.clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), PlanValidationError> {
        validate_plan_fields(
            &self.name,
            self.duration_months,
            self.monthly_income,
            self.apply_inflation,
            self.inflation_rate,
            self.apply_interest,
            self.interest_rate,
        )
    }
}

/// Input validation shared by stored plans and not-yet-stored plan input;
/// checked before anything is written.
pub fn validate_plan_fields(
    name: &str,
    duration_months: u32,
    monthly_income: Decimal,
    apply_inflation: bool,
    inflation_rate: Decimal,
    apply_interest: bool,
    interest_rate: Decimal,
) -> Result<(), PlanValidationError> {
    if name.trim().is_empty() {
        return Err(PlanValidationError::BlankName);
    }
    if duration_months == 0 || duration_months > 120 {
        return Err(PlanValidationError::BadDuration(duration_months));
    }
    if monthly_income <= Decimal::ZERO {
        return Err(PlanValidationError::NonPositiveIncome(monthly_income));
    }
    if apply_inflation && !rate_in_range(inflation_rate) {
        return Err(PlanValidationError::RateOutOfRange {
            kind: "inflation",
            value: inflation_rate,
        });
    }
    if apply_interest && !rate_in_range(interest_rate) {
        return Err(PlanValidationError::RateOutOfRange {
            kind: "interest",
            value: interest_rate,
        });
    }
    Ok(())
}

fn rate_in_range(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::from(100)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanValidationError {
    #[error("Plan name must not be blank")]
    BlankName,
    #[error("Plan duration must be between 1 and 120 months, got {0}")]
    BadDuration(u32),
    #[error("Monthly income must be positive, got {0}")]
    NonPositiveIncome(Decimal),
    #[error("{kind} rate must be between 0 and 100, got {value}")]
    RateOutOfRange { kind: &'static str, value: Decimal },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanBreakdown {
    pub id: i64,
    pub plan_id: i64,
    pub month_index: u32, // 0-based from plan start
    pub income: Decimal,
    // Legacy display split: manual plans fill `fixed_expenses` with the
    // manual figure; historical plans fill it with the recurring component
    // and `average_expenses` with the one-time average.
    pub fixed_expenses: Decimal,
    pub average_expenses: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
    pub cumulative_net: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanPosition {
    pub plan_id: i64,
    pub months_elapsed: u32,
    pub expected_cumulative_net: Decimal,
    pub actual_net: Decimal,
    pub variance: Decimal,
    pub on_track: bool,
}
