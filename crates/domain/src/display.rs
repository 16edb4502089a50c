use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub fn long_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%A %B %-d, %Y %-I:%M %p").to_string()
}

pub fn long_date(date: NaiveDate) -> String {
    date.format("%A %B %-d, %Y").to_string()
}

// Calendar-year difference, matching how the contract period has always
// been displayed (2020-01-01 to 2023-01-01 is "3 year(s)").
pub fn period_years_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} year(s)", end.year() - start.year())
}

pub fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
