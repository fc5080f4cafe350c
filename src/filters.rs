//! Money formatting for templates. Amounts arrive as integer cents and are
//! rendered as currency symbol plus digits with locale separators.

use std::borrow::Borrow;

/// Currency and locale used by templates to render amounts.
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    pub currency: String,
    pub locale: String,
}

impl MoneyFormat {
    pub fn new(currency: &str, locale: &str) -> Self {
        Self {
            currency: currency.to_string(),
            locale: locale.to_string(),
        }
    }

    /// Unsigned amount, used for debit/credit columns and balances.
    pub fn neutral(&self, cents: impl Borrow<i64>) -> String {
        format_money_neutral(*cents.borrow(), &self.currency, &self.locale)
    }

    /// Amount with a leading minus for negatives only.
    pub fn amount(&self, cents: impl Borrow<i64>) -> String {
        let cents = *cents.borrow();
        let neutral = format_money_neutral(cents, &self.currency, &self.locale);
        if cents < 0 {
            format!("-{}", neutral)
        } else {
            neutral
        }
    }

    /// Signed, colored HTML span.
    pub fn colored(&self, cents: impl Borrow<i64>) -> String {
        format_money(*cents.borrow(), &self.currency, &self.locale)
    }
}

/// Signed amount wrapped in a span whose class follows the sign.
pub fn format_money(cents: i64, currency: &str, locale: &str) -> String {
    let class = match cents.signum() {
        1 => "amount-positive",
        -1 => "amount-negative",
        _ => "amount-zero",
    };
    format!(
        r#"<span class="{}">{}</span>"#,
        class,
        signed_text(cents, currency, locale)
    )
}

/// Format cents as plain text without sign prefix.
pub fn format_money_neutral(cents: i64, currency: &str, locale: &str) -> String {
    let abs_cents = cents.unsigned_abs();
    let whole = abs_cents / 100;
    let fractional = abs_cents % 100;

    let (thousands_sep, decimal_sep) = locale_separators(locale);
    let whole_str = format_with_thousands(whole, thousands_sep);
    let symbol = currency_symbol(currency);

    format!("{}{}{}{:02}", symbol, whole_str, decimal_sep, fractional)
}

fn signed_text(cents: i64, currency: &str, locale: &str) -> String {
    let neutral = format_money_neutral(cents, currency, locale);
    match cents.signum() {
        1 => format!("+{}", neutral),
        -1 => format!("-{}", neutral),
        _ => neutral,
    }
}

/// Get thousands and decimal separators based on locale.
fn locale_separators(locale: &str) -> (char, char) {
    match locale {
        "de-DE" | "de-AT" | "de-CH" | "fr-FR" | "fr-BE" | "es-ES" | "it-IT" | "pt-BR"
        | "pt-PT" | "nl-NL" | "nl-BE" | "id-ID" | "tr-TR" => ('.', ','),
        _ => (',', '.'),
    }
}

/// Format a number with thousands separators.
fn format_with_thousands(n: u64, sep: char) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }

    result
}

/// Get currency symbol for a currency code.
fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_uppercase().as_str() {
        "KES" => "KSh\u{00a0}",
        "UGX" => "USh\u{00a0}",
        "TZS" => "TSh\u{00a0}",
        "RWF" => "FRw\u{00a0}",
        "NGN" => "\u{20a6}",
        "GHS" => "GH\u{20b5}",
        "ZAR" => "R\u{00a0}",
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{00a3}",
        "INR" => "\u{20b9}",
        _ => "",
    }
}
