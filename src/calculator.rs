//! Dividend reinvestment growth simulation
//!
//! Month by month: the deposit lands first, the position grows at the
//! monthly-compounded equivalent of the annual growth rate, then the month's
//! dividend is paid net of withholding tax and reinvested.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthInputs {
    pub principal: f64,
    pub monthly_deposit: f64,
    /// Annual dividend yield, percent
    pub dividend_yield_pct: f64,
    /// Annual price growth, percent
    pub growth_pct: f64,
    pub years: u32,
    /// Fraction withheld from each dividend
    pub tax_rate: f64,
}

impl GrowthInputs {
    pub fn validate(&self) -> anyhow::Result<()> {
        let amounts = [
            ("principal", self.principal),
            ("monthly deposit", self.monthly_deposit),
            ("dividend yield", self.dividend_yield_pct),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", name, value);
            }
        }
        if !self.growth_pct.is_finite() || self.growth_pct <= -100.0 {
            anyhow::bail!("growth must be above -100%, got {}", self.growth_pct);
        }
        if !(0.0..1.0).contains(&self.tax_rate) {
            anyhow::bail!("tax rate must be in [0, 1), got {}", self.tax_rate);
        }
        Ok(())
    }
}

/// Cumulative totals at the end of a year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSnapshot {
    pub year: u32,
    pub principal: f64,
    pub capital_gains: f64,
    pub dividends: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthProjection {
    pub final_total: f64,
    pub total_dividends: f64,
    pub total_principal: f64,
    pub capital_gains: f64,
    pub roi_pct: f64,
    pub years: Vec<YearSnapshot>,
}

pub fn simulate(inputs: &GrowthInputs) -> GrowthProjection {
    let monthly_growth = (1.0 + inputs.growth_pct / 100.0).powf(1.0 / 12.0) - 1.0;
    let monthly_yield = inputs.dividend_yield_pct / 100.0 / 12.0;
    let net = 1.0 - inputs.tax_rate;

    let mut total = inputs.principal;
    let mut principal = inputs.principal;
    let mut gains = 0.0;
    let mut dividends = 0.0;
    let mut years = Vec::with_capacity(inputs.years as usize);

    for month in 1..=inputs.years * 12 {
        total += inputs.monthly_deposit;
        principal += inputs.monthly_deposit;

        let growth = total * monthly_growth;
        gains += growth;
        total += growth;

        let dividend = total * monthly_yield * net;
        dividends += dividend;
        total += dividend;

        if month % 12 == 0 {
            years.push(YearSnapshot {
                year: month / 12,
                principal,
                capital_gains: gains,
                dividends,
                total,
            });
        }
    }

    let roi_pct = if principal > 0.0 {
        (total - principal) / principal * 100.0
    } else {
        0.0
    };

    GrowthProjection {
        final_total: total,
        total_dividends: dividends,
        total_principal: principal,
        capital_gains: gains,
        roi_pct,
        years,
    }
}
