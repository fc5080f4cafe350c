//! One-shot toast notifications carried across a redirect in a cookie.

use axum::response::Redirect;
use tower_cookies::{Cookie, Cookies};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashKind::Success),
            "error" => Some(FlashKind::Error),
            "info" => Some(FlashKind::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }

    /// Class for the toast container.
    pub fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "toast-success",
            FlashKind::Error => "toast-error",
            FlashKind::Info => "toast-info",
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}:{}",
            self.kind.as_str(),
            urlencoding::encode(&self.message)
        )
    }

    pub fn decode(value: &str) -> Option<Self> {
        let (kind, message) = value.split_once(':')?;
        let kind = FlashKind::parse(kind)?;
        let message = urlencoding::decode(message).ok()?.into_owned();
        Some(Self { kind, message })
    }
}

pub fn set_flash(cookies: &Cookies, flash: &Flash) {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Lax)
        .build();
    cookies.add(cookie);
}

/// Read the pending flash, if any, and clear it so it shows only once.
pub fn take_flash(cookies: &Cookies) -> Option<Flash> {
    let value = cookies.get(FLASH_COOKIE)?.value().to_string();
    cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    Flash::decode(&value)
}

pub fn redirect_with(cookies: &Cookies, to: &str, flash: Flash) -> Redirect {
    set_flash(cookies, &flash);
    Redirect::to(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let flash = Flash::error("Division 'HQ' could not be deleted: in use; retry?");
        let decoded = Flash::decode(&flash.encode()).unwrap();
        assert_eq!(decoded, flash);
        assert_eq!(decoded.kind, FlashKind::Error);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Flash::decode("nonsense").is_none());
        assert!(Flash::decode("warning:hi").is_none());
    }

    #[test]
    fn test_encoded_value_is_cookie_safe() {
        let encoded = Flash::success("Saved; thanks, Grace").encode();
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
    }
}
