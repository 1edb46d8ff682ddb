//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, TimeZone};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats publication dates for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    locale: Locale,
    timezone: Option<Tz>,
}

impl DateFormatter {
    /// Create a formatter from a date-fns pattern and a language tag
    pub fn new(pattern: &str, language: &str) -> Self {
        let locale = resolve_locale(language).unwrap_or_else(|| {
            tracing::warn!("Unsupported language {:?}, dates fall back to pt-BR", language);
            Locale::pt_BR
        });
        Self {
            pattern: date_fns_to_chrono_format(pattern),
            locale,
            timezone: None,
        }
    }

    /// Create a formatter from site settings
    pub fn from_config(config: &SiteConfig) -> Self {
        let formatter = Self::new(&config.date_format, &config.language);
        if config.timezone.is_empty() {
            return formatter;
        }
        match config.timezone.parse::<Tz>() {
            Ok(tz) => formatter.with_timezone(tz),
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, dates keep their offset", config.timezone);
                formatter
            }
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Format a date; a missing date yields `None`
    pub fn format(&self, date: Option<&DateTime<FixedOffset>>) -> Option<String> {
        let date = date?;
        let formatted = match self.timezone {
            Some(tz) => format_date(&date.with_timezone(&tz), &self.pattern, self.locale),
            None => format_date(date, &self.pattern, self.locale),
        };
        Some(formatted)
    }
}

/// Format a date with a chrono pattern in the given locale
pub fn format_date<Tz2: TimeZone>(date: &DateTime<Tz2>, chrono_format: &str, locale: Locale) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format_localized(chrono_format, locale).to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Map a language tag (`pt-BR`, `en`, `es_ES`...) to a chrono locale
pub fn resolve_locale(language: &str) -> Option<Locale> {
    let normalized = language.trim().replace('-', "_").to_lowercase();
    let locale = match normalized.as_str() {
        "pt_br" | "pt" => Locale::pt_BR,
        "pt_pt" => Locale::pt_PT,
        "en" | "en_us" => Locale::en_US,
        "en_gb" => Locale::en_GB,
        "es" | "es_es" => Locale::es_ES,
        "fr" | "fr_fr" => Locale::fr_FR,
        "de" | "de_de" => Locale::de_DE,
        "it" | "it_it" => Locale::it_IT,
        "ja" | "ja_jp" => Locale::ja_JP,
        "zh" | "zh_cn" => Locale::zh_CN,
        _ => return None,
    };
    Some(locale)
}

/// Convert a date-fns format string to a chrono format string
///
/// Letters are read as runs (`yyyy`, `MMM`, `dd`); text inside single quotes
/// is copied literally, as date-fns does.
fn date_fns_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut result, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('E', 4) => "%A",
            ('E', _) => "%a",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('a', _) => "%p",
            _ => "",
        };

        if spec.is_empty() {
            for _ in 0..run {
                push_literal(&mut result, c);
            }
        } else {
            result.push_str(spec);
        }
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::timestamp;

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("yyyy-MM-dd"), "%Y-%m-%d");
        assert_eq!(date_fns_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
        assert_eq!(date_fns_to_chrono_format("d 'de' MMMM"), "%-d de %B");
        assert_eq!(date_fns_to_chrono_format("100%"), "100%%");
    }

    #[test]
    fn test_format_pt_br() {
        let date = timestamp::parse("2021-03-15T19:25:28+0000").unwrap();
        let formatter = DateFormatter::new("dd MMM yyyy", "pt-BR");
        assert_eq!(formatter.format(Some(&date)).as_deref(), Some("15 mar 2021"));
    }

    #[test]
    fn test_format_en() {
        let date = timestamp::parse("2021-03-15T19:25:28+0000").unwrap();
        let formatter = DateFormatter::new("dd MMM yyyy", "en");
        assert_eq!(formatter.format(Some(&date)).as_deref(), Some("15 Mar 2021"));
    }

    #[test]
    fn test_missing_date() {
        let formatter = DateFormatter::new("dd MMM yyyy", "pt-BR");
        assert_eq!(formatter.format(None), None);
    }

    #[test]
    fn test_timezone_shifts_day() {
        let date = timestamp::parse("2021-03-15T01:00:00+0000").unwrap();
        let formatter =
            DateFormatter::new("dd/MM/yyyy", "pt-BR").with_timezone(chrono_tz::America::Sao_Paulo);
        assert_eq!(formatter.format(Some(&date)).as_deref(), Some("14/03/2021"));
    }

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale("pt-BR"), Some(Locale::pt_BR));
        assert_eq!(resolve_locale("EN"), Some(Locale::en_US));
        assert_eq!(resolve_locale("tlh"), None);
    }

    #[test]
    fn test_date_xml() {
        let date = timestamp::parse("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(date_xml(&date), "2021-03-15T19:25:28+00:00");
    }
}
