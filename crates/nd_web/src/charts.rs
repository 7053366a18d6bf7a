//! Inline SVG charts for the dashboard.

use chrono::NaiveDate;
use std::f64::consts::PI;

use crate::render::escape_html;

/// Plotly's qualitative "Pastel" sequence.
pub const PASTEL: [&str; 11] = [
    "rgb(102, 197, 204)",
    "rgb(246, 207, 113)",
    "rgb(248, 156, 116)",
    "rgb(220, 176, 242)",
    "rgb(135, 197, 95)",
    "rgb(158, 185, 243)",
    "rgb(254, 136, 177)",
    "rgb(201, 219, 116)",
    "rgb(139, 224, 164)",
    "rgb(180, 151, 231)",
    "rgb(179, 179, 179)",
];

pub const POSITIVE_COLOR: &str = "#2ecc40";
pub const NEGATIVE_COLOR: &str = "#ff4136";
pub const NEUTRAL_COLOR: &str = "#ffdc00";
const LINE_COLOR: &str = "#0072C6";

/// Card color for a sentiment label, case-insensitive; anything unknown is
/// shown as neutral.
pub fn sentiment_color(sentiment: &str) -> &'static str {
    match sentiment.to_lowercase().as_str() {
        "positive" => POSITIVE_COLOR,
        "negative" => NEGATIVE_COLOR,
        _ => NEUTRAL_COLOR,
    }
}

/// Slice color in the donut: exact labels get their fixed color.
fn slice_color(label: &str, index: usize) -> &'static str {
    match label {
        "Positive" => POSITIVE_COLOR,
        "Negative" => NEGATIVE_COLOR,
        "Neutral" => NEUTRAL_COLOR,
        _ => PASTEL[index % PASTEL.len()],
    }
}

/// Tick step giving at most five intervals up to `max`.
fn tick_step(max: usize) -> usize {
    ((max + 4) / 5).max(1)
}

fn svg_open(out: &mut String, width: u32, height: u32, title: &str) {
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"100%\" role=\"img\" aria-label=\"{t}\">\n",
        w = width,
        h = height,
        t = escape_html(title)
    ));
    if !title.is_empty() {
        out.push_str(&format!(
            "<text x=\"10\" y=\"20\" font-size=\"16\" font-weight=\"bold\" fill=\"#333\">{}</text>\n",
            escape_html(title)
        ));
    }
}

fn y_axis(out: &mut String, max: usize, left: f64, top: f64, plot_h: f64, plot_w: f64, label: &str) {
    let step = tick_step(max);
    let top_value = (max.div_ceil(step) * step).max(step);
    let mut value = 0;
    while value <= top_value {
        let y = top + plot_h - plot_h * value as f64 / top_value as f64;
        out.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#ccc\" stroke-width=\"0.5\"/>\n",
            left, y, left + plot_w, y
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\" fill=\"#555\">{}</text>\n",
            left - 6.0,
            y + 4.0,
            value
        ));
        value += step;
    }
    out.push_str(&format!(
        "<text x=\"14\" y=\"{:.1}\" font-size=\"12\" fill=\"#333\" transform=\"rotate(-90 14 {:.1})\" text-anchor=\"middle\">{}</text>\n",
        top + plot_h / 2.0,
        top + plot_h / 2.0,
        escape_html(label)
    ));
}

fn scale_max(counts: impl Iterator<Item = usize>) -> usize {
    let max = counts.max().unwrap_or(0).max(1);
    let step = tick_step(max);
    max.div_ceil(step) * step
}

/// "Articles by Category": one pastel bar per category with its count on top.
pub fn bar_chart(counts: &[(String, usize)]) -> String {
    let (width, height) = (640u32, 360u32);
    let (left, top, bottom, right) = (56.0, 36.0, 64.0, 10.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;

    let mut out = String::new();
    svg_open(&mut out, width, height, "Articles by Category");
    out.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#000000\"/>\n",
        left, top, plot_w, plot_h
    ));

    let max = scale_max(counts.iter().map(|(_, c)| *c));
    y_axis(&mut out, max, left, top, plot_h, plot_w, "Number of Articles");

    let slot = plot_w / counts.len().max(1) as f64;
    for (i, (category, count)) in counts.iter().enumerate() {
        let bar_h = plot_h * *count as f64 / max as f64;
        let x = left + slot * i as f64 + slot * 0.1;
        let y = top + plot_h - bar_h;
        let center = x + slot * 0.4;
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{}: {}</title></rect>\n",
            x,
            y,
            slot * 0.8,
            bar_h,
            PASTEL[i % PASTEL.len()],
            escape_html(category),
            count
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" fill=\"#fff\">{}</text>\n",
            center,
            (y + 14.0).min(top + plot_h - 2.0),
            count
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" fill=\"#333\">{}</text>\n",
            center,
            top + plot_h + 16.0,
            escape_html(category)
        ));
    }
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\" fill=\"#333\">Category</text>\n",
        left + plot_w / 2.0,
        height - 8
    ));
    out.push_str("</svg>\n");
    out
}

/// "Sentiment Distribution": a donut with label and percent inside each slice.
pub fn donut_chart(counts: &[(String, usize)]) -> String {
    let (width, height) = (360u32, 360u32);
    let (cx, cy) = (180.0, 195.0);
    let outer = 130.0;
    let ring = outer / 2.0;
    let radius = outer - ring / 2.0;
    let circumference = 2.0 * PI * radius;
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let mut out = String::new();
    svg_open(&mut out, width, height, "Sentiment Distribution");
    if total == 0 {
        out.push_str("</svg>\n");
        return out;
    }

    let mut offset = 0.0;
    for (i, (label, count)) in counts.iter().enumerate() {
        let share = *count as f64 / total as f64;
        let length = share * circumference;
        out.push_str(&format!(
            "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r:.2}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{w:.2}\" \
             stroke-dasharray=\"{len:.3} {c:.3}\" stroke-dashoffset=\"{off:.3}\" transform=\"rotate(-90 {cx} {cy})\">\
             <title>{label}: {count}</title></circle>\n",
            cx = cx,
            cy = cy,
            r = radius,
            color = slice_color(label, i),
            w = ring,
            len = length,
            c = circumference,
            off = -offset,
            label = escape_html(label),
            count = count
        ));

        // label at the middle of the arc, clockwise from 12 o'clock
        let angle = 2.0 * PI * (offset / circumference + share / 2.0) - PI / 2.0;
        let (lx, ly) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" fill=\"#222\">\
             <tspan x=\"{:.1}\" dy=\"-2\">{}</tspan><tspan x=\"{:.1}\" dy=\"13\">{:.1}%</tspan></text>\n",
            lx,
            ly,
            lx,
            escape_html(label),
            lx,
            share * 100.0
        ));
        offset += length;
    }
    out.push_str("</svg>\n");
    out
}

/// "Articles Over Time": articles per publication date, with markers.
pub fn line_chart(per_date: &[(NaiveDate, usize)]) -> String {
    let (width, height) = (960u32, 320u32);
    let (left, top, bottom, right) = (56.0, 20.0, 56.0, 24.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;

    let mut out = String::new();
    svg_open(&mut out, width, height, "");
    out.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#f8f9fa\"/>\n",
        left, top, plot_w, plot_h
    ));
    let max = scale_max(per_date.iter().map(|(_, c)| *c));
    y_axis(&mut out, max, left, top, plot_h, plot_w, "Number of Articles");

    let (Some(first), Some(last)) = (per_date.first(), per_date.last()) else {
        out.push_str("</svg>\n");
        return out;
    };
    let span = (last.0 - first.0).num_days().max(0) as f64;
    let x_of = |date: NaiveDate| {
        if span == 0.0 {
            left + plot_w / 2.0
        } else {
            left + plot_w * (date - first.0).num_days() as f64 / span
        }
    };
    let y_of = |count: usize| top + plot_h - plot_h * count as f64 / max as f64;

    let points: Vec<String> = per_date
        .iter()
        .map(|(date, count)| format!("{:.1},{:.1}", x_of(*date), y_of(*count)))
        .collect();
    out.push_str(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        points.join(" "),
        LINE_COLOR
    ));

    let label_every = per_date.len().div_ceil(10).max(1);
    for (i, (date, count)) in per_date.iter().enumerate() {
        let (x, y) = (x_of(*date), y_of(*count));
        out.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"><title>{}: {}</title></circle>\n",
            x, y, LINE_COLOR, date, count
        ));
        if i % label_every == 0 {
            out.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" fill=\"#333\">{}</text>\n",
                x,
                top + plot_h + 16.0,
                date.format("%b %d, %Y")
            ));
        }
    }
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\" fill=\"#333\">Date</text>\n",
        left + plot_w / 2.0,
        height - 8
    ));
    out.push_str("</svg>\n");
    out
}
