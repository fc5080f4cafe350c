//! Read-only financial report shapes.
//!
//! Aggregation happens in the backend; these types only mirror what it
//! returns. Totals the backend omits are summed from the rows for display.

use serde::{Deserialize, Serialize};

use super::money::{self, format_decimal};

/// Whether a report covers a period or a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodMode {
    Range,
    AsOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ProfitAndLoss,
    BalanceSheet,
    TrialBalance,
    Revenue,
    CashBalance,
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[
            ReportKind::ProfitAndLoss,
            ReportKind::BalanceSheet,
            ReportKind::TrialBalance,
            ReportKind::Revenue,
            ReportKind::CashBalance,
        ]
    }

    /// Path segment used by both the portal and the backend.
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::ProfitAndLoss => "profit-and-loss",
            ReportKind::BalanceSheet => "balance-sheet",
            ReportKind::TrialBalance => "trial-balance",
            ReportKind::Revenue => "revenue",
            ReportKind::CashBalance => "cash-balance",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::ProfitAndLoss => "Profit & Loss",
            ReportKind::BalanceSheet => "Balance Sheet",
            ReportKind::TrialBalance => "Trial Balance",
            ReportKind::Revenue => "Revenue",
            ReportKind::CashBalance => "Cash Balance",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            ReportKind::ProfitAndLoss => "Income against expenses for a period.",
            ReportKind::BalanceSheet => "Assets, liabilities and equity at a date.",
            ReportKind::TrialBalance => "Debit and credit balances of every account.",
            ReportKind::Revenue => "Revenue earned over a period.",
            ReportKind::CashBalance => "Cash and bank account balances at a date.",
        }
    }

    pub fn period_mode(&self) -> PeriodMode {
        match self {
            ReportKind::ProfitAndLoss | ReportKind::Revenue => PeriodMode::Range,
            ReportKind::BalanceSheet | ReportKind::TrialBalance | ReportKind::CashBalance => {
                PeriodMode::AsOf
            }
        }
    }

    pub fn is_range(&self) -> bool {
        self.period_mode() == PeriodMode::Range
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(alias = "account_name", alias = "label")]
    pub name: String,
    #[serde(
        default,
        alias = "balance",
        alias = "total",
        deserialize_with = "money::deserialize_cents"
    )]
    pub amount: i64,
}

fn sum(lines: &[ReportLine]) -> i64 {
    lines.iter().map(|l| l.amount).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfitAndLoss {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, alias = "revenue")]
    pub income: Vec<ReportLine>,
    #[serde(default, alias = "expense")]
    pub expenses: Vec<ReportLine>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_income: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_expenses: Option<i64>,
    #[serde(
        default,
        alias = "net_income",
        deserialize_with = "money::deserialize_optional_cents"
    )]
    pub net_profit: Option<i64>,
}

impl ProfitAndLoss {
    pub fn income_total(&self) -> i64 {
        self.total_income.unwrap_or_else(|| sum(&self.income))
    }

    pub fn expense_total(&self) -> i64 {
        self.total_expenses.unwrap_or_else(|| sum(&self.expenses))
    }

    pub fn net(&self) -> i64 {
        self.net_profit
            .unwrap_or_else(|| self.income_total() - self.expense_total())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BalanceSheet {
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReportLine>,
    #[serde(default)]
    pub liabilities: Vec<ReportLine>,
    #[serde(default)]
    pub equity: Vec<ReportLine>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_assets: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_liabilities: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_equity: Option<i64>,
}

impl BalanceSheet {
    pub fn assets_total(&self) -> i64 {
        self.total_assets.unwrap_or_else(|| sum(&self.assets))
    }

    pub fn liabilities_total(&self) -> i64 {
        self.total_liabilities
            .unwrap_or_else(|| sum(&self.liabilities))
    }

    pub fn equity_total(&self) -> i64 {
        self.total_equity.unwrap_or_else(|| sum(&self.equity))
    }

    pub fn liabilities_and_equity(&self) -> i64 {
        self.liabilities_total() + self.equity_total()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(alias = "account_name")]
    pub name: String,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub debit: i64,
    #[serde(default, deserialize_with = "money::deserialize_cents")]
    pub credit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrialBalance {
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default, alias = "accounts")]
    pub rows: Vec<TrialBalanceRow>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_debit: Option<i64>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total_credit: Option<i64>,
}

impl TrialBalance {
    pub fn debit_total(&self) -> i64 {
        self.total_debit
            .unwrap_or_else(|| self.rows.iter().map(|r| r.debit).sum())
    }

    pub fn credit_total(&self) -> i64 {
        self.total_credit
            .unwrap_or_else(|| self.rows.iter().map(|r| r.credit).sum())
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RevenueReport {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, alias = "items", alias = "lines")]
    pub rows: Vec<ReportLine>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total: Option<i64>,
}

impl RevenueReport {
    pub fn grand_total(&self) -> i64 {
        self.total.unwrap_or_else(|| sum(&self.rows))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CashBalanceReport {
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub accounts: Vec<ReportLine>,
    #[serde(default, deserialize_with = "money::deserialize_optional_cents")]
    pub total: Option<i64>,
}

impl CashBalanceReport {
    pub fn grand_total(&self) -> i64 {
        self.total.unwrap_or_else(|| sum(&self.accounts))
    }
}

/// A rendered report ready for a page or a CSV export.
#[derive(Debug, Clone)]
pub enum Report {
    ProfitAndLoss(ProfitAndLoss),
    BalanceSheet(BalanceSheet),
    TrialBalance(TrialBalance),
    Revenue(RevenueReport),
    CashBalance(CashBalanceReport),
}

fn section_rows(out: &mut Vec<Vec<String>>, section: &str, lines: &[ReportLine]) {
    for line in lines {
        out.push(vec![
            section.to_string(),
            line.code.clone().unwrap_or_default(),
            line.name.clone(),
            format_decimal(line.amount),
        ]);
    }
}

fn total_row(label: &str, amount: i64) -> Vec<String> {
    vec![
        "Total".to_string(),
        String::new(),
        label.to_string(),
        format_decimal(amount),
    ]
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::ProfitAndLoss(_) => ReportKind::ProfitAndLoss,
            Report::BalanceSheet(_) => ReportKind::BalanceSheet,
            Report::TrialBalance(_) => ReportKind::TrialBalance,
            Report::Revenue(_) => ReportKind::Revenue,
            Report::CashBalance(_) => ReportKind::CashBalance,
        }
    }

    /// Header row for the CSV export.
    pub fn csv_headers(&self) -> Vec<&'static str> {
        match self {
            Report::TrialBalance(_) => vec!["Code", "Account", "Debit", "Credit"],
            _ => vec!["Section", "Code", "Name", "Amount"],
        }
    }

    /// Data rows for the CSV export, totals last.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        match self {
            Report::ProfitAndLoss(r) => {
                section_rows(&mut out, "Income", &r.income);
                section_rows(&mut out, "Expenses", &r.expenses);
                out.push(total_row("Total income", r.income_total()));
                out.push(total_row("Total expenses", r.expense_total()));
                out.push(total_row("Net profit", r.net()));
            }
            Report::BalanceSheet(r) => {
                section_rows(&mut out, "Assets", &r.assets);
                section_rows(&mut out, "Liabilities", &r.liabilities);
                section_rows(&mut out, "Equity", &r.equity);
                out.push(total_row("Total assets", r.assets_total()));
                out.push(total_row("Total liabilities", r.liabilities_total()));
                out.push(total_row("Total equity", r.equity_total()));
            }
            Report::TrialBalance(r) => {
                for row in &r.rows {
                    out.push(vec![
                        row.code.clone().unwrap_or_default(),
                        row.name.clone(),
                        format_decimal(row.debit),
                        format_decimal(row.credit),
                    ]);
                }
                out.push(vec![
                    String::new(),
                    "Total".to_string(),
                    format_decimal(r.debit_total()),
                    format_decimal(r.credit_total()),
                ]);
            }
            Report::Revenue(r) => {
                section_rows(&mut out, "Revenue", &r.rows);
                out.push(total_row("Total revenue", r.grand_total()));
            }
            Report::CashBalance(r) => {
                section_rows(&mut out, "Cash", &r.accounts);
                out.push(total_row("Total cash", r.grand_total()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for kind in ReportKind::all() {
            assert_eq!(ReportKind::from_slug(kind.slug()), Some(*kind));
        }
        assert_eq!(ReportKind::from_slug("cash-flow"), None);
    }

    #[test]
    fn test_profit_and_loss_totals_from_lines() {
        let pl: ProfitAndLoss = serde_json::from_str(
            r#"{
                "revenue": [{"name": "Loan interest", "amount": "12000.00"}],
                "expenses": [{"account_name": "Salaries", "balance": 7000}]
            }"#,
        )
        .unwrap();
        assert_eq!(pl.income_total(), 1_200_000);
        assert_eq!(pl.expense_total(), 700_000);
        assert_eq!(pl.net(), 500_000);
    }

    #[test]
    fn test_backend_totals_take_precedence() {
        let pl: ProfitAndLoss = serde_json::from_str(
            r#"{"income": [{"name": "Fees", "amount": 10}], "total_income": "99.00"}"#,
        )
        .unwrap();
        assert_eq!(pl.income_total(), 9900);
    }

    #[test]
    fn test_trial_balance_csv_rows() {
        let tb: TrialBalance = serde_json::from_str(
            r#"{"accounts": [
                {"code": "1000", "name": "Cash", "debit": "150.00", "credit": 0},
                {"code": "3000", "name": "Share capital", "debit": 0, "credit": 150}
            ]}"#,
        )
        .unwrap();
        assert!(tb.is_balanced());
        let report = Report::TrialBalance(tb);
        let rows = report.csv_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["1000", "Cash", "150.00", "0.00"]);
        assert_eq!(rows[2][2], "150.00");
        assert_eq!(report.csv_headers()[0], "Code");
    }
}
