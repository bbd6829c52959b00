use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

lazy_static! {
    /// "Oct 12, 2025", "October 12 2025", "Sept. 3rd, 2024".
    static ref MONTH_DAY_YEAR: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    )
    .unwrap();
}

/// Structured date attributes, highest priority first.
pub const DATE_ATTRIBUTE_SOURCES: &[(&str, &str)] = &[
    ("time[datetime]", "datetime"),
    ("meta[property='article:published_time']", "content"),
    ("meta[name='date']", "content"),
];

/// Elements whose text never renders.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Where a resolved date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Attribute(&'static str),
    VisibleText,
    RawMarkup,
    ProcessingTime,
}

/// Parses one candidate string into a UTC timestamp, or `None` if it is not a real date.
pub fn parse_date_candidate(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    find_month_day_year(s)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)?.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Returns the first month-name/day/year date in `text` that is a real calendar day.
pub fn find_month_day_year(text: &str) -> Option<DateTime<Utc>> {
    MONTH_DAY_YEAR.captures_iter(text).find_map(|caps| {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = caps.get(2)?.as_str().parse().ok()?;
        let year = caps.get(3)?.as_str().parse().ok()?;
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&naive))
    })
}

fn attribute_date(document: &Html, selector: &str, attr: &str) -> Option<DateTime<Utc>> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .find_map(parse_date_candidate)
}

/// Rendered text of the page, one space between text nodes.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

/// Resolves the publish date, reporting which source produced it.
pub fn resolve_with_source(
    document: &Html,
    raw_markup: Option<&str>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateSource) {
    for (selector, attr) in DATE_ATTRIBUTE_SOURCES {
        if let Some(date) = attribute_date(document, selector, attr) {
            return (date, DateSource::Attribute(*selector));
        }
    }

    let visible = visible_text(document);
    if let Some(date) = find_month_day_year(&visible) {
        return (date, DateSource::VisibleText);
    }

    if let Some(date) = raw_markup.and_then(find_month_day_year) {
        return (date, DateSource::RawMarkup);
    }

    (now, DateSource::ProcessingTime)
}

/// Resolves the publish date of a memo page. Never fails: with nothing
/// recoverable in the page the processing time `now` is returned.
pub fn resolve_published_at(document: &Html, raw_markup: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let (date, source) = resolve_with_source(document, raw_markup, now);
    debug!("Publish date {} resolved from {:?}", date, source);
    date
}
