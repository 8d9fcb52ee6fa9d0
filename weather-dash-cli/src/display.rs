//! Plain-text rendering of a weather report.

use std::fmt::Write;

use chrono::{Local, NaiveDate, Utc};
use weather_dash_core::{
    CurrentWeatherPayload, DayBucket, TrendPoint, Units, WeatherReport, daily_outlook,
    group_by_day, group_by_day_in, round_half_up, temperature_trend,
};

/// Day buckets for the report, plus "today" in the same zone.
///
/// Days are cut in the forecast location's own zone when the provider sends
/// its offset, otherwise in the local zone.
pub fn day_buckets(report: &WeatherReport) -> (Vec<DayBucket>, NaiveDate) {
    let samples = report.forecast.samples();
    match report.forecast.city_offset() {
        Some(offset) => (
            group_by_day_in(&samples, &offset),
            Utc::now().with_timezone(&offset).date_naive(),
        ),
        None => (group_by_day(&samples), Local::now().date_naive()),
    }
}

pub fn render_report(report: &WeatherReport, units: Units, days: usize) -> String {
    let (buckets, today) = day_buckets(report);
    let mut out = render_current(&report.current, units, today);
    out.push('\n');
    out.push_str(&render_outlook(daily_outlook(&buckets, days), units, today));
    out.push('\n');
    out.push_str(&render_trend(&temperature_trend(&buckets, days), units));
    out
}

pub fn render_current(current: &CurrentWeatherPayload, units: Units, today: NaiveDate) -> String {
    let condition = current.condition();
    let unit = temp_unit(units);
    let mut out = String::new();

    let _ = writeln!(out, "{}", current.location_label());
    let _ = writeln!(out, "{}", today.format("%A, %B %-d, %Y"));
    let _ = writeln!(out, "{}", capitalize_first(&condition.description));
    let _ = writeln!(
        out,
        "  Temperature  {}{unit} (feels like {}{unit})",
        round_half_up(current.main.temp),
        round_half_up(current.main.feels_like),
    );
    let _ = writeln!(out, "  Humidity     {}%", current.main.humidity);
    let _ = writeln!(out, "  Wind         {}", wind_text(current.wind.speed, units));
    let _ = writeln!(out, "  Pressure     {} hPa", round_half_up(current.main.pressure));
    out
}

pub fn render_outlook(buckets: &[DayBucket], units: Units, today: NaiveDate) -> String {
    let unit = temp_unit(units);
    let mut out = String::from("Forecast\n");

    if buckets.is_empty() {
        out.push_str("  (no forecast data)\n");
        return out;
    }

    for day in buckets {
        let temps = format!("{}{unit} / {}{unit}", day.max_temp(), day.min_temp());
        let _ = writeln!(
            out,
            "  {:<12} {:<14} {}",
            day_label(day.date, today),
            temps,
            capitalize_first(&day.condition.description),
        );
    }
    out
}

const TREND_WIDTH: usize = 30;

/// One row per day: the min..max span drawn on a shared scale, `●` at the mean.
pub fn render_trend(points: &[TrendPoint], units: Units) -> String {
    let unit = temp_unit(units);
    let mut out = String::from("Temperature trend\n");

    let (Some(lo), Some(hi)) = (
        points.iter().map(|p| p.min).min(),
        points.iter().map(|p| p.max).max(),
    ) else {
        return out;
    };

    let span = (hi - lo).max(1) as f64;
    let column = |t: i64| (((t - lo) as f64 / span) * (TREND_WIDTH - 1) as f64).round() as usize;

    for p in points {
        let (from, to, mid) = (column(p.min), column(p.max), column(p.avg));
        let bar: String = (0..TREND_WIDTH)
            .map(|i| match i {
                _ if i == mid => '●',
                _ if i >= from && i <= to => '━',
                _ => '·',
            })
            .collect();
        let _ = writeln!(
            out,
            "  {:<7} {bar}  {}{unit} / {}{unit} / {}{unit}",
            p.date.format("%b %-d"),
            p.min,
            p.avg,
            p.max,
        );
    }
    out
}

pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%a, %b %-d").to_string()
    }
}

pub fn temp_unit(units: Units) -> &'static str {
    match units {
        Units::Metric => "°C",
        Units::Imperial => "°F",
        Units::Standard => "K",
    }
}

/// Metric and standard report m/s, shown as km/h; imperial reports mph.
pub fn wind_text(speed: f64, units: Units) -> String {
    match units {
        Units::Imperial => format!("{} mph", round_half_up(speed)),
        Units::Metric | Units::Standard => format!("{} km/h", round_half_up(speed * 3.6)),
    }
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
