//! Request locale
//!
//! The locale comes from the `lang` query parameter, then the `tev_lang`
//! cookie, then [`DEFAULT_LOCALE`]. A `lang` parameter is remembered in the
//! cookie so later requests keep the choice.

use axum::{
    extract::{Query, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const LOCALE_COOKIE: &str = "tev_lang";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(String);

impl Locale {
    /// Accepts tags such as `en`, `en-US` or `fr_CA`
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let valid = !tag.is_empty()
            && tag.len() <= 35
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Locale(tag.replace('_', "-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, lower-cased
    pub fn language(&self) -> String {
        self.0
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    pub fn text(&self, key: MessageKey) -> &'static str {
        match self.language().as_str() {
            "fr" => french(key),
            _ => english(key),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

/// Messages shown to the user by the admin tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    MarkedAllRead,
    MarkedAllUnread,
    ImagesCleaned,
    ImagesImported,
    ImagesExported,
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::MarkedAllRead => "Marked {count} posts as read",
        MessageKey::MarkedAllUnread => "Marked {count} posts as unread",
        MessageKey::ImagesCleaned => "Removed {count} unused image files",
        MessageKey::ImagesImported => "Imported {count} image files",
        MessageKey::ImagesExported => "Exported {count} image files",
    }
}

fn french(key: MessageKey) -> &'static str {
    match key {
        MessageKey::MarkedAllRead => "{count} articles marqués comme lus",
        MessageKey::MarkedAllUnread => "{count} articles marqués comme non lus",
        MessageKey::ImagesCleaned => "{count} fichiers image inutilisés supprimés",
        MessageKey::ImagesImported => "{count} fichiers image importés",
        MessageKey::ImagesExported => "{count} fichiers image exportés",
    }
}

/// Localized message with `{count}` filled in
pub fn message(locale: &Locale, key: MessageKey, count: usize) -> String {
    locale.text(key).replace("{count}", &count.to_string())
}

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

fn locale_from_cookie(req: &Request) -> Option<Locale> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == LOCALE_COOKIE)
        .and_then(|(_, value)| Locale::parse(value))
}

/// Resolve the locale, expose it to handlers and echo it in the response
pub async fn locale_middleware(mut req: Request, next: Next) -> Response {
    let requested = Query::<LangQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.lang)
        .and_then(|lang| Locale::parse(&lang));

    let locale = requested
        .clone()
        .or_else(|| locale_from_cookie(&req))
        .unwrap_or_default();

    req.extensions_mut().insert(locale.clone());
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(locale.as_str()) {
        headers.insert(header::CONTENT_LANGUAGE, value);
    }
    if let Some(chosen) = requested {
        let cookie = format!("{}={}; Path=/; SameSite=Lax", LOCALE_COOKIE, chosen.as_str());
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    response
}
