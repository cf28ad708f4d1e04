//! Static PNG dashboard
//!
//! Nine panels on a 3×3 grid:
//!
//! | | | |
//! |---|---|---|
//! | stockout risk pie | movement by category | monthly revenue trend |
//! | supplier on-time delivery | inventory value by category | revenue by category (stacked) |
//! | supplier defect rate | days-of-stock histogram | supplier performance score |
//!
//! Text is set in DejaVu Sans, embedded in the binary and registered with
//! plotters on first render, so no system font lookup is involved.

use plotters::coord::{CoordTranslate, Shift};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

use crate::{
    errors::AnalyticsError,
    models::{Category, MovementType, Rating, StockoutRisk},
    services::analytics::Analysis,
};

pub const PRIMARY: RGBColor = RGBColor(0x2E, 0x75, 0xB6);
pub const SECONDARY: RGBColor = RGBColor(0xED, 0x7D, 0x31);
pub const SUCCESS: RGBColor = RGBColor(0x70, 0xAD, 0x47);
pub const DANGER: RGBColor = RGBColor(0xFF, 0x00, 0x00);
pub const WARNING: RGBColor = RGBColor(0xFF, 0xC0, 0x00);
pub const NEUTRAL: RGBColor = RGBColor(0xA5, 0xA5, 0xA5);

const CATEGORY_COLORS: [RGBColor; 5] = [PRIMARY, SECONDARY, SUCCESS, WARNING, NEUTRAL];

/// On-time delivery target, percent
const OTD_TARGET: f64 = 85.0;
/// Defect rate target, percent
const DEFECT_TARGET: f64 = 3.0;
const HISTOGRAM_BINS: usize = 20;
const FONT: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

type PanelResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSize {
    pub width: u32,
    pub height: u32,
}

pub struct DashboardRenderer {
    size: DashboardSize,
}

/// Registers the embedded font as plotters' `sans-serif` family. Idempotent.
pub fn register_fonts() -> Result<(), AnalyticsError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_BYTES).is_ok());
    if ok {
        Ok(())
    } else {
        Err(AnalyticsError::render("embedded dashboard font could not be loaded"))
    }
}

impl DashboardRenderer {
    pub fn new(size: DashboardSize) -> Self {
        Self { size }
    }

    /// Renders the dashboard to a PNG at `path`, replacing any existing file.
    #[instrument(skip(self, analysis), fields(path = %path.display()))]
    pub fn render(&self, analysis: &Analysis, path: &Path) -> Result<(), AnalyticsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        register_fonts()?;

        let root = BitMapBackend::new(path, (self.size.width, self.size.height)).into_drawing_area();
        self.draw(&root, analysis).map_err(AnalyticsError::render)?;
        root.present().map_err(AnalyticsError::render)?;
        Ok(())
    }

    /// Draws all panels onto any backend. Call [`register_fonts`] first.
    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        analysis: &Analysis,
    ) -> PanelResult<DB> {
        let caption = (self.size.height / 80).max(12);

        root.fill(&WHITE)?;
        let panels = root
            .titled("Supply Chain Analytics Dashboard", (FONT, caption * 2))?
            .split_evenly((3, 3));

        risk_pie(&panels[0], analysis, caption)?;
        movement_by_category(&panels[1], analysis, caption)?;
        revenue_trend(&panels[2], analysis, caption)?;
        supplier_otd(&panels[3], analysis, caption)?;
        value_by_category(&panels[4], analysis, caption)?;
        stacked_revenue(&panels[5], analysis, caption)?;
        supplier_defects(&panels[6], analysis, caption)?;
        days_of_stock_histogram(&panels[7], analysis, caption)?;
        performance_scores(&panels[8], analysis, caption)?;

        debug!("Nine panels drawn");
        Ok(())
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Axis upper bound with headroom; never an empty range.
fn headroom(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn label_at(labels: &[String], position: f64) -> String {
    if position < 0.0 {
        return String::new();
    }
    labels.get(position as usize).cloned().unwrap_or_default()
}

fn thousands(value: &f64) -> String {
    format!("{:.0}k", value / 1000.0)
}

fn risk_color(risk: StockoutRisk) -> RGBColor {
    match risk {
        StockoutRisk::High => DANGER,
        StockoutRisk::Medium => WARNING,
        StockoutRisk::Low => SUCCESS,
    }
}

fn movement_color(movement: MovementType) -> RGBColor {
    match movement {
        MovementType::Fast => SUCCESS,
        MovementType::Medium => PRIMARY,
        MovementType::Slow => WARNING,
    }
}

fn rating_color(rating: Rating) -> RGBColor {
    match rating {
        Rating::Excellent => SUCCESS,
        Rating::Good => WARNING,
        Rating::NeedsImprovement => DANGER,
    }
}

/// On-time delivery tiers: on target, within ten points, below.
fn otd_color(otd: f64) -> RGBColor {
    if otd >= OTD_TARGET {
        SUCCESS
    } else if otd >= OTD_TARGET - 10.0 {
        WARNING
    } else {
        DANGER
    }
}

/// Defect tiers: under target, under five percent, above.
fn defect_color(defect: f64) -> RGBColor {
    if defect < DEFECT_TARGET {
        SUCCESS
    } else if defect < 5.0 {
        WARNING
    } else {
        DANGER
    }
}

/// Chart builder with margins, caption and label areas.
fn chart_on<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    caption: u32,
    y_label_width: u32,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .caption(title, (FONT, caption))
        .x_label_area_size(caption * 3)
        .y_label_area_size(y_label_width);
    builder
}

fn draw_legend<'a, DB: DrawingBackend + 'a, CT: CoordTranslate>(
    chart: &mut ChartContext<'a, DB, CT>,
    position: SeriesLabelPosition,
) -> PanelResult<DB> {
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
}

/// Pie slice outline from `start` sweeping `sweep` radians clockwise.
pub fn slice_points(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.abs() / (PI / 90.0)).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let theta = start + sweep * step as f64 / steps as f64;
        points.push((
            center.0 + (radius * theta.cos()).round() as i32,
            center.1 + (radius * theta.sin()).round() as i32,
        ));
    }
    points
}

fn risk_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let area = area.titled("Stockout Risk Distribution", (FONT, caption))?;
    let totals = analysis.report.inventory.risk_totals();
    let total = totals.total() as f64;
    if total == 0.0 {
        return Ok(());
    }

    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = w.min(h) as f64 * 0.35;

    // Start at twelve o'clock
    let mut start = -PI / 2.0;
    for risk in StockoutRisk::iter() {
        let count = totals.get(risk);
        if count == 0 {
            continue;
        }
        let sweep = 2.0 * PI * count as f64 / total;
        let color = risk_color(risk);
        area.draw(&Polygon::new(
            slice_points(center, radius, start, sweep),
            color.filled(),
        ))?;

        let mid = start + sweep / 2.0;
        let at = (
            center.0 + (radius * 1.15 * mid.cos()) as i32,
            center.1 + (radius * 1.15 * mid.sin()) as i32,
        );
        let label = format!("{} {} ({:.1}%)", risk, count, count as f64 / total * 100.0);
        area.draw(&Text::new(label, at, (FONT, caption * 3 / 4)))?;
        start += sweep;
    }
    Ok(())
}

fn movement_by_category<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let categories: Vec<Category> = Category::iter().collect();
    let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    let by_category = &analysis.report.inventory.movement_by_category;
    let max = by_category
        .values()
        .flat_map(|c| [c.fast, c.medium, c.slow])
        .max()
        .unwrap_or(0) as f64;

    let mut chart = chart_on(area, "Movement Type by Category", caption, caption * 3)
        .build_cartesian_2d(0f64..categories.len() as f64, 0f64..headroom(max))?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    mesh.x_labels(categories.len())
        .x_label_formatter(&x_fmt)
        .y_desc("SKUs");
    mesh.draw()?;

    let width = 0.8 / 3.0;
    for (offset, movement) in MovementType::iter().enumerate() {
        let color = movement_color(movement);
        chart
            .draw_series(categories.iter().enumerate().map(|(i, category)| {
                let count = by_category
                    .get(category)
                    .map(|c| c.get(movement))
                    .unwrap_or(0) as f64;
                let x0 = i as f64 + 0.1 + offset as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, count)], color.filled())
            }))?
            .label(movement.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

fn revenue_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let monthly = &analysis.report.sales.monthly;
    let points: Vec<(f64, f64)> = monthly
        .values()
        .enumerate()
        .map(|(i, revenue)| (i as f64, to_f64(*revenue)))
        .collect();
    let labels: Vec<String> = monthly.keys().map(|m| m.to_string()).collect();
    let max = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let last = (points.len().max(2) - 1) as f64;

    let mut chart = chart_on(area, "Monthly Revenue Trend", caption, caption * 5)
        .build_cartesian_2d(0f64..last, 0f64..headroom(max))?;

    let x_fmt = |x: &f64| label_at(&labels, x.round());
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(points.len().max(2))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&thousands)
        .y_desc("Revenue");
    mesh.draw()?;

    chart.draw_series(
        AreaSeries::new(points.iter().copied(), 0.0, PRIMARY.mix(0.2)).border_style(PRIMARY),
    )?;
    chart.draw_series(LineSeries::new(points.iter().copied(), PRIMARY.stroke_width(3)))?;
    chart.draw_series(points.iter().map(|p| Circle::new(*p, 4, PRIMARY.filled())))?;
    Ok(())
}

/// Horizontal bars, one per supplier, with a dashed target line.
fn supplier_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    bars: &[(String, f64, RGBColor)],
    x_max: f64,
    target: f64,
    caption: u32,
) -> PanelResult<DB> {
    let labels: Vec<String> = bars.iter().map(|b| b.0.clone()).collect();
    let rows = bars.len().max(1) as f64;

    let mut chart =
        chart_on(area, title, caption, caption * 5).build_cartesian_2d(0f64..x_max, 0f64..rows)?;

    let y_fmt = |y: &f64| label_at(&labels, *y);
    let x_fmt = |x: &f64| format!("{:.0}%", x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_y_mesh();
    mesh.y_labels(bars.len().max(1))
        .y_label_formatter(&y_fmt)
        .x_label_formatter(&x_fmt);
    mesh.draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value, color))| {
        let y = i as f64;
        Rectangle::new([(0.0, y + 0.15), (value.max(0.0), y + 0.85)], color.filled())
    }))?;

    let dashes = 20;
    chart
        .draw_series((0..dashes).step_by(2).map(|d| {
            let y0 = rows * d as f64 / dashes as f64;
            let y1 = rows * (d + 1) as f64 / dashes as f64;
            PathElement::new(vec![(target, y0), (target, y1)], DANGER.stroke_width(2))
        }))?
        .label(format!("Target {:.0}%", target))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], DANGER.stroke_width(2)));

    draw_legend(&mut chart, SeriesLabelPosition::LowerRight)
}

fn supplier_otd<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let bars: Vec<(String, f64, RGBColor)> = analysis
        .scorecards
        .iter()
        .map(|s| {
            let otd = s.avg_otd_rate.unwrap_or(0.0);
            (s.supplier.clone(), otd, otd_color(otd))
        })
        .collect();
    supplier_bars(area, "Supplier On-Time Delivery", &bars, 100.0, OTD_TARGET, caption)
}

fn supplier_defects<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let bars: Vec<(String, f64, RGBColor)> = analysis
        .scorecards
        .iter()
        .map(|s| {
            let defect = s.avg_defect_rate.unwrap_or(0.0);
            (s.supplier.clone(), defect, defect_color(defect))
        })
        .collect();
    let max = bars.iter().map(|b| b.1).fold(DEFECT_TARGET, f64::max);
    supplier_bars(area, "Supplier Defect Rate", &bars, headroom(max), DEFECT_TARGET, caption)
}

fn value_by_category<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let values: Vec<(String, f64)> = Category::iter()
        .map(|c| {
            let value = analysis
                .report
                .inventory
                .value_by_category
                .get(&c)
                .copied()
                .unwrap_or(Decimal::ZERO);
            (c.to_string(), to_f64(value))
        })
        .collect();
    let labels: Vec<String> = values.iter().map(|v| v.0.clone()).collect();
    let max = values.iter().map(|v| v.1).fold(0.0, f64::max);

    let mut chart = chart_on(area, "Inventory Value by Category", caption, caption * 5)
        .build_cartesian_2d(0f64..values.len() as f64, 0f64..headroom(max))?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    mesh.x_labels(values.len())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&thousands);
    mesh.draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, (_, value))| {
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *value)],
            PRIMARY.filled(),
        )
    }))?;
    Ok(())
}

fn stacked_revenue<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let months = &analysis.report.sales.by_month_and_category;
    let labels: Vec<String> = months.keys().map(|m| m.to_string()).collect();
    let max = analysis
        .report
        .sales
        .monthly
        .values()
        .map(|v| to_f64(*v))
        .fold(0.0, f64::max);

    let mut chart = chart_on(area, "Revenue by Category", caption, caption * 5)
        .build_cartesian_2d(0f64..months.len().max(1) as f64, 0f64..headroom(max))?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    mesh.x_labels(months.len().max(1))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&thousands);
    mesh.draw()?;

    let mut base = vec![0.0; months.len()];
    for (category, color) in Category::iter().zip(CATEGORY_COLORS) {
        let segments: Vec<Rectangle<(f64, f64)>> = months
            .values()
            .enumerate()
            .map(|(i, by_category)| {
                let value = by_category.get(&category).copied().map(to_f64).unwrap_or(0.0);
                let bottom = base[i];
                base[i] += value;
                Rectangle::new(
                    [(i as f64 + 0.1, bottom), (i as f64 + 0.9, bottom + value)],
                    color.filled(),
                )
            })
            .collect();

        chart
            .draw_series(segments)?
            .label(category.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    draw_legend(&mut chart, SeriesLabelPosition::UpperLeft)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub width: f64,
    pub counts: Vec<usize>,
}

/// `bins` equal-width bins over `[0, max]` of the finite, non-negative
/// values. Unbounded cover is left out.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let finite: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    let max = finite.iter().copied().fold(0.0, f64::max);
    let width = if max > 0.0 { max / bins as f64 } else { 1.0 };

    let mut counts = vec![0; bins];
    for v in finite {
        let idx = ((v / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram { width, counts }
}

fn days_of_stock_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let days: Vec<f64> = analysis.inventory.iter().map(|r| r.days_of_stock).collect();
    let hist = histogram(&days, HISTOGRAM_BINS);
    let thresholds = analysis.report.thresholds;
    let x_max = (hist.counts.len() as f64 * hist.width).max(thresholds.reorder_days + 1.0);
    let y_max = headroom(hist.counts.iter().copied().max().unwrap_or(0) as f64);

    let mut chart = chart_on(area, "Days of Stock Distribution", caption, caption * 3)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Days of stock").y_desc("SKUs");
    mesh.draw()?;

    chart.draw_series(hist.counts.iter().enumerate().map(|(i, count)| {
        let x0 = i as f64 * hist.width;
        Rectangle::new(
            [(x0, 0.0), (x0 + hist.width, *count as f64)],
            PRIMARY.mix(0.7).filled(),
        )
    }))?;

    for (days, color, label) in [
        (thresholds.critical_days, DANGER, "Critical"),
        (thresholds.reorder_days, WARNING, "Reorder"),
    ] {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(days, 0.0), (days, y_max)],
                color.stroke_width(3),
            )))?
            .label(format!("{} ({:.0} days)", label, days))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(3)));
    }

    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

fn performance_scores<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    analysis: &Analysis,
    caption: u32,
) -> PanelResult<DB> {
    let labels: Vec<String> = analysis
        .scorecards
        .iter()
        .map(|s| s.supplier.clone())
        .collect();
    let max = analysis
        .scorecards
        .iter()
        .map(|s| s.performance_score)
        .fold(0.0, f64::max);

    let mut chart = chart_on(area, "Supplier Performance Score", caption, caption * 3)
        .build_cartesian_2d(0f64..labels.len().max(1) as f64, 0f64..headroom(max))?;

    let x_fmt = |x: &f64| label_at(&labels, *x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    mesh.x_labels(labels.len().max(1))
        .x_label_formatter(&x_fmt)
        .y_desc("Score");
    mesh.draw()?;

    chart.draw_series(analysis.scorecards.iter().enumerate().map(|(i, s)| {
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, s.performance_score)],
            rating_color(s.rating).filled(),
        )
    }))?;
    Ok(())
}
