pub mod account;
pub mod coa;
pub mod division;
pub mod journal;
pub mod money;
pub mod partner;
pub mod report;
pub mod user;

pub use account::{Account, AccountPayload};
pub use coa::{ChartOfAccount, CoaCategory, CoaPayload};
pub use division::{Division, DivisionPayload};
pub use journal::{
    Journal, JournalLine, JournalStatus, JournalType, JournalTypePayload, NewJournal,
    NewJournalLine,
};
pub use partner::{Partner, PartnerPayload, PartnerType, PartnerTypePayload};
pub use report::{
    BalanceSheet, CashBalanceReport, PeriodMode, ProfitAndLoss, Report, ReportKind, ReportLine,
    RevenueReport, TrialBalance, TrialBalanceRow,
};
pub use user::{Role, User};
