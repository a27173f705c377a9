use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{ColorMap, ramp};
use crate::dashboard::format_usd;
use crate::forecast::ForecastPoint;
use crate::forecast::pipeline::ForecastReport;

const CHART_HEIGHT: f32 = 260.0;
const ACTUAL_COLOR: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
const YHAT_COLOR: Color32 = Color32::from_rgb(0x00, 0x72, 0xb2);
const BOUND_COLOR: Color32 = Color32::from_rgb(0x7f, 0xb6, 0xe0);
const CITY_COLOR: Color32 = Color32::from_rgb(0x60, 0xfc, 0x37);

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Plot x coordinate for a date.
fn date_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn x_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    x_date(mark.value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_label(name: &str, point: &PlotPoint) -> String {
    let date = x_date(point.x)
        .map(|d| d.to_string())
        .unwrap_or_default();
    if name.is_empty() {
        format!("{date}\n{:.0}", point.y)
    } else {
        format!("{name}\n{date}\n{:.0}", point.y)
    }
}

/// Label integer ticks with category names; other ticks stay blank.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// One bar: axis label, height, fill and hover text.
struct BarItem {
    label: String,
    value: f64,
    color: Color32,
    hover: String,
}

/// Vertical bars, one per category, laid out left to right.
fn bar_chart(ui: &mut Ui, id: &str, y_label: &str, items: Vec<BarItem>) {
    let labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();
    let bars: Vec<Bar> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Bar::new(i as f64, item.value)
                .name(item.hover)
                .fill(item.color)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn funding_item(label: &str, sum: f64, color: Color32) -> BarItem {
    BarItem {
        label: label.to_string(),
        value: sum,
        color,
        hover: format!("{label}: {}", format_usd(sum)),
    }
}

// ---------------------------------------------------------------------------
// Descriptive charts
// ---------------------------------------------------------------------------

/// Funding per industry, coloured by industry.
pub fn industry_distribution(ui: &mut Ui, totals: &[(String, f64)], colors: &ColorMap) {
    let items = totals
        .iter()
        .map(|(industry, sum)| funding_item(industry, *sum, colors.color_for(industry)))
        .collect();
    bar_chart(ui, "industry_distribution", "Amount in USD", items);
}

/// One line per industry through its dated amounts.
pub fn investment_over_time(
    ui: &mut Ui,
    series: &BTreeMap<String, Vec<(NaiveDate, f64)>>,
    colors: &ColorMap,
) {
    Plot::new("investment_over_time")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Amount in USD")
        .x_axis_formatter(date_axis)
        .label_formatter(date_label)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (industry, points) in series {
                let color = colors.color_for(industry);
                let coords: Vec<[f64; 2]> =
                    points.iter().map(|&(d, amount)| [date_x(d), amount]).collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(industry)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(industry)
                        .color(color)
                        .radius(2.0),
                );
            }
        });
}

pub fn top_cities(ui: &mut Ui, cities: &[(String, f64)]) {
    let items = cities
        .iter()
        .map(|(city, sum)| funding_item(city, *sum, CITY_COLOR))
        .collect();
    bar_chart(ui, "top_cities", "Amount in USD", items);
}

/// Rounds per year, shaded by count. Hover shows the year's funding.
pub fn growth_over_years(ui: &mut Ui, per_year: &[(i32, usize)], funding: &[(i32, f64)]) {
    let items = per_year.iter().map(|(year, n)| {
        let sum = funding
            .iter()
            .find(|(y, _)| y == year)
            .map_or(0.0, |(_, s)| *s);
        (year.to_string(), *n, sum)
    });
    bar_chart(ui, "growth_over_years", "Startup Count", counted(items));
}

/// Most frequent investor values, shaded by count. Hover shows their funding.
pub fn top_investors(ui: &mut Ui, ranking: &[(String, usize)], funding: &[(String, f64)]) {
    let items = ranking.iter().map(|(name, n)| {
        let sum = funding
            .iter()
            .find(|(inv, _)| inv == name)
            .map_or(0.0, |(_, s)| *s);
        (name.clone(), *n, sum)
    });
    bar_chart(ui, "top_investors", "Number of Investments", counted(items));
}

fn counted(items: impl Iterator<Item = (String, usize, f64)>) -> Vec<BarItem> {
    let items: Vec<(String, f64, f64)> = items.map(|(label, n, sum)| (label, n as f64, sum)).collect();
    let min = items.iter().map(|(_, v, _)| *v).fold(f64::INFINITY, f64::min);
    let max = items.iter().map(|(_, v, _)| *v).fold(f64::NEG_INFINITY, f64::max);
    items
        .into_iter()
        .map(|(label, v, sum)| BarItem {
            hover: format!("{label}: {v:.0} rounds, {}", format_usd(sum)),
            color: ramp(v, min, max),
            label,
            value: v,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Forecast plot
// ---------------------------------------------------------------------------

/// Observed daily totals with the fitted / forecast line and its interval.
pub fn forecast_plot(ui: &mut Ui, report: &ForecastReport) {
    let actual: PlotPoints = report
        .history
        .iter()
        .map(|h| [date_x(h.date), h.total])
        .collect();
    let series = |f: fn(&ForecastPoint) -> f64| -> PlotPoints {
        report.points.iter().map(|p| [date_x(p.date), f(p)]).collect()
    };

    Plot::new("forecast_plot")
        .height(CHART_HEIGHT + 60.0)
        .legend(Legend::default())
        .x_axis_label("ds")
        .y_axis_label("y")
        .x_axis_formatter(date_axis)
        .label_formatter(date_label)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(actual).name("Actual").color(ACTUAL_COLOR).radius(2.0));
            plot_ui.line(Line::new(series(|p| p.yhat_lower)).name("Lower bound").color(BOUND_COLOR));
            plot_ui.line(Line::new(series(|p| p.yhat_upper)).name("Upper bound").color(BOUND_COLOR));
            plot_ui.line(Line::new(series(|p| p.yhat)).name("Predicted").color(YHAT_COLOR).width(2.0));
        });
}
