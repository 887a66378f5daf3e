use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

use crate::model::config::Locale;
use crate::model::task::{RecurrenceKind, RecurrencePattern};
use crate::util::calendar;

/// Result of parsing a date phrase
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDate {
    /// Resolved moment. Phrases land at midnight, explicit dates at noon.
    pub date: Option<NaiveDateTime>,
    /// Canonical display label, or the raw input when parsing failed.
    pub text: String,
    pub is_valid: bool,
}

impl ParsedDate {
    fn valid(date: NaiveDateTime, text: String) -> ParsedDate {
        ParsedDate {
            date: Some(date),
            text,
            is_valid: true,
        }
    }

    fn invalid(input: &str) -> ParsedDate {
        ParsedDate {
            date: None,
            text: input.to_string(),
            is_valid: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a free-text date phrase against the current local date.
pub fn parse(input: &str) -> ParsedDate {
    parse_at(input, Local::now().date_naive())
}

/// Parse a free-text date phrase against an explicit reference date.
/// English and Russian phrases are both accepted, whatever the
/// configured locale. More specific rules win over looser ones, so
/// the chain below is ordered.
pub fn parse_at(input: &str, today: NaiveDate) -> ParsedDate {
    let phrase = input.trim().to_lowercase();
    if phrase.is_empty() {
        return ParsedDate::invalid(input);
    }

    if let Some(parsed) = parse_exact_offset(&phrase, today) {
        return parsed;
    }
    if let Some(parsed) = parse_day_count(&phrase, today) {
        return parsed;
    }
    if let Some(parsed) = parse_fixed_span(&phrase, today) {
        return parsed;
    }
    if let Some(parsed) = parse_weekday_name(&phrase, today) {
        return parsed;
    }
    if let Some(parsed) = parse_period_bound(&phrase, today) {
        return parsed;
    }
    if let Some(parsed) = parse_formatted(input.trim()) {
        return parsed;
    }

    ParsedDate::invalid(input)
}

// ---------------------------------------------------------------------------
// Phrase rules
// ---------------------------------------------------------------------------

fn parse_exact_offset(phrase: &str, today: NaiveDate) -> Option<ParsedDate> {
    let (days, label) = match phrase {
        "today" => (0, "Today"),
        "сегодня" => (0, "Сегодня"),
        "tomorrow" => (1, "Tomorrow"),
        "завтра" => (1, "Завтра"),
        "yesterday" => (-1, "Yesterday"),
        "вчера" => (-1, "Вчера"),
        "day after tomorrow" => (2, "Day after tomorrow"),
        "послезавтра" => (2, "Послезавтра"),
        _ => return None,
    };
    Some(ParsedDate::valid(
        midnight(today + Duration::days(days)),
        label.to_string(),
    ))
}

/// "через 3 дня", "in 3 days", or a bare "3 days". The label follows
/// the input language, with the Russian noun declined for the count.
fn parse_day_count(phrase: &str, today: NaiveDate) -> Option<ParsedDate> {
    let re = Regex::new(r"^(?:через\s+|in\s+)?(\d{1,3})\s+(день|дня|дней|day|days)$").ok()?;
    let caps = re.captures(phrase)?;
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();

    let date = midnight(today + Duration::days(n));
    let label = if unit.is_ascii() {
        format!("In {} {}", n, if n == 1 { "day" } else { "days" })
    } else {
        format!("Через {} {}", n, ru_day_noun(n))
    };
    Some(ParsedDate::valid(date, label))
}

fn parse_fixed_span(phrase: &str, today: NaiveDate) -> Option<ParsedDate> {
    let anchor = midnight(today);
    let (date, label) = match phrase {
        "next week" => (anchor + Duration::days(7), "Next week"),
        "через неделю" => (anchor + Duration::days(7), "Через неделю"),
        "next month" => (calendar::add_months(anchor, 1), "Next month"),
        "через месяц" => (calendar::add_months(anchor, 1), "Через месяц"),
        "next year" => (calendar::add_years(anchor, 1), "Next year"),
        "через год" => (calendar::add_years(anchor, 1), "Через год"),
        _ => return None,
    };
    Some(ParsedDate::valid(date, label.to_string()))
}

const WEEKDAY_NAMES: [(&str, Weekday); 21] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("понедельник", Weekday::Mon),
    ("вторник", Weekday::Tue),
    ("среда", Weekday::Wed),
    ("четверг", Weekday::Thu),
    ("пятница", Weekday::Fri),
    ("суббота", Weekday::Sat),
    ("воскресенье", Weekday::Sun),
    ("пн", Weekday::Mon),
    ("вт", Weekday::Tue),
    ("ср", Weekday::Wed),
    ("чт", Weekday::Thu),
    ("пт", Weekday::Fri),
    ("сб", Weekday::Sat),
    ("вс", Weekday::Sun),
];

/// A weekday name resolves to the next such day strictly after today.
fn parse_weekday_name(phrase: &str, today: NaiveDate) -> Option<ParsedDate> {
    let target = WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| *name == phrase)
        .map(|&(_, weekday)| weekday)?;
    let locale = if phrase.is_ascii() {
        Locale::En
    } else {
        Locale::Ru
    };
    let date = calendar::next_weekday(today, target);
    Some(ParsedDate::valid(
        midnight(date),
        weekday_label(target, locale).to_string(),
    ))
}

fn parse_period_bound(phrase: &str, today: NaiveDate) -> Option<ParsedDate> {
    let (date, label) = match phrase {
        // End of week is the Monday after the current week, not Sunday.
        "end of week" => (calendar::start_of_week(today) + Duration::days(7), "End of week"),
        "конец недели" => (
            calendar::start_of_week(today) + Duration::days(7),
            "Конец недели",
        ),
        // Start of month always lands in the next month, even on the 1st.
        "start of month" => (calendar::first_of_next_month(today), "Start of month"),
        "начало месяца" => (calendar::first_of_next_month(today), "Начало месяца"),
        "end of month" => (calendar::last_of_month(today), "End of month"),
        "конец месяца" => (calendar::last_of_month(today), "Конец месяца"),
        _ => return None,
    };
    Some(ParsedDate::valid(midnight(date), label.to_string()))
}

const DATE_FORMATS: [&str; 5] = ["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Explicit dates are tried against the format list in order; the
/// first format that yields a real calendar date wins, so "01/02/2024"
/// reads day-first. The result sits at noon rather than midnight.
fn parse_formatted(input: &str) -> Option<ParsedDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            let label = date.format("%d.%m.%Y").to_string();
            return Some(ParsedDate::valid(noon(date), label));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Canonical label for a stored date: named offsets for -1..=2 days,
/// the weekday name up to a week out, dd.MM.yyyy otherwise.
pub fn format_for_display(date: NaiveDateTime, today: NaiveDate, locale: Locale) -> String {
    let offset = (date.date() - today).num_days();
    let label = match (offset, locale) {
        (0, Locale::En) => "Today",
        (0, Locale::Ru) => "Сегодня",
        (1, Locale::En) => "Tomorrow",
        (1, Locale::Ru) => "Завтра",
        (-1, Locale::En) => "Yesterday",
        (-1, Locale::Ru) => "Вчера",
        (2, Locale::En) => "Day after tomorrow",
        (2, Locale::Ru) => "Послезавтра",
        _ if (3..=7).contains(&offset) => weekday_label(date.date().weekday(), locale),
        _ => return date.format("%d.%m.%Y").to_string(),
    };
    label.to_string()
}

fn weekday_label(weekday: Weekday, locale: Locale) -> &'static str {
    match locale {
        Locale::En => match weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        },
        Locale::Ru => match weekday {
            Weekday::Mon => "Понедельник",
            Weekday::Tue => "Вторник",
            Weekday::Wed => "Среда",
            Weekday::Thu => "Четверг",
            Weekday::Fri => "Пятница",
            Weekday::Sat => "Суббота",
            Weekday::Sun => "Воскресенье",
        },
    }
}

/// Russian noun form for a day count (1 день, 2 дня, 5 дней).
fn ru_day_noun(n: i64) -> &'static str {
    let rem = n % 100;
    if (11..=14).contains(&rem) {
        return "дней";
    }
    match n % 10 {
        1 => "день",
        2..=4 => "дня",
        _ => "дней",
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Recurrence rules
// ---------------------------------------------------------------------------

/// Parse a recurrence rule like "daily", "2 weeks", or "every 3 days".
/// The caller is expected to run `validate` after filling in any end
/// date, so "0 days" parses here and fails there.
pub fn parse_recurrence_rule(input: &str) -> Option<RecurrencePattern> {
    let rule = input.trim().to_lowercase();
    let rule = rule.strip_prefix("every ").unwrap_or(&rule);

    let (kind, interval) = match rule {
        "daily" | "day" => (RecurrenceKind::Daily, 1),
        "weekly" | "week" => (RecurrenceKind::Weekly, 1),
        "monthly" | "month" => (RecurrenceKind::Monthly, 1),
        "yearly" | "year" | "annually" => (RecurrenceKind::Yearly, 1),
        _ => {
            let re =
                Regex::new(r"^(\d{1,3})\s+(day|days|week|weeks|month|months|year|years)$").ok()?;
            let caps = re.captures(rule)?;
            let n: u32 = caps.get(1)?.as_str().parse().ok()?;
            let kind = match caps.get(2)?.as_str() {
                "day" | "days" => RecurrenceKind::Daily,
                "week" | "weeks" => RecurrenceKind::Weekly,
                "month" | "months" => RecurrenceKind::Monthly,
                _ => RecurrenceKind::Yearly,
            };
            (kind, n)
        }
    };
    Some(RecurrencePattern::new(kind, interval))
}
