//! Economic charts rendered to SVG.
//!
//! A [`Canvas`] collects curves, points, reference lines and shaded areas,
//! then draws them all with `plotters`. Anything implementing [`Plottable`]
//! can be drawn, including the market curves, closures and precomputed data.

use crate::{
    market::{equilibrium, Curve, Demand, Supply},
    Error,
};
use plotters::prelude::*;
use std::{ops::Range, path::Path};

pub type Point = euclid::default::Point2D<f64>;

pub const CRIMSON: RGBColor = RGBColor(0xE6, 0x39, 0x46);
pub const NAVY: RGBColor = RGBColor(0x1D, 0x35, 0x57);
pub const TEAL: RGBColor = RGBColor(0x2A, 0x9D, 0x8F);
pub const SAND: RGBColor = RGBColor(0xF4, 0xA2, 0x61);
pub const CORAL: RGBColor = RGBColor(0xE7, 0x6F, 0x51);
pub const PURPLE: RGBColor = RGBColor(0x6A, 0x4C, 0x93);
pub const AZURE: RGBColor = RGBColor(0x06, 0xAE, 0xD5);
pub const ROSE: RGBColor = RGBColor(0xFF, 0x00, 0x6E);

const GRAY: RGBColor = RGBColor(0x80, 0x80, 0x80);
const DEFAULT_RANGE: (f64, f64) = (0.0, 100.0);

/// Anything which can be drawn as `y = f(x)`.
pub trait Plottable {
    /// The value at `x`, or `None` where it isn't defined.
    fn evaluate_at(&self, x: f64) -> Option<f64>;

    fn sample(&self, range: Range<f64>, samples: usize) -> Vec<Point> {
        linspace(range, samples)
            .filter_map(|x| {
                self.evaluate_at(x)
                    .filter(|y| y.is_finite())
                    .map(|y| Point::new(x, y))
            })
            .collect()
    }

    /// The legend entry used when none is given.
    fn default_label(&self) -> Option<String> { None }
}

impl<P: Plottable + ?Sized> Plottable for &P {
    fn evaluate_at(&self, x: f64) -> Option<f64> { (**self).evaluate_at(x) }

    fn sample(&self, range: Range<f64>, samples: usize) -> Vec<Point> {
        (**self).sample(range, samples)
    }

    fn default_label(&self) -> Option<String> { (**self).default_label() }
}

/// Market curves are drawn the economist's way, with the quantity along the
/// x axis and the price up the y axis.
impl Plottable for Curve {
    fn evaluate_at(&self, quantity: f64) -> Option<f64> {
        self.price_at(quantity)
    }

    fn default_label(&self) -> Option<String> {
        Some(self.kind().to_string())
    }
}

impl Plottable for Demand {
    fn evaluate_at(&self, quantity: f64) -> Option<f64> {
        Curve::evaluate_at(self, quantity)
    }

    fn default_label(&self) -> Option<String> { Curve::default_label(self) }
}

impl Plottable for Supply {
    fn evaluate_at(&self, quantity: f64) -> Option<f64> {
        Curve::evaluate_at(self, quantity)
    }

    fn default_label(&self) -> Option<String> { Curve::default_label(self) }
}

/// A plain function, `y = f(x)`.
#[derive(Debug, Copy, Clone)]
pub struct FunctionPlot<F>(pub F);

impl<F> Plottable for FunctionPlot<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate_at(&self, x: f64) -> Option<f64> {
        Some((self.0)(x)).filter(|y| y.is_finite())
    }
}

/// Precomputed `(x, y)` pairs, joined by straight lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    points: Vec<Point>,
}

impl PointSeries {
    pub fn new<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points: Vec<Point> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| Point::new(x, y))
            .collect();
        points.sort_by(|a, b| a.x.total_cmp(&b.x));

        PointSeries { points }
    }

    pub fn points(&self) -> &[Point] { &self.points }
}

impl Plottable for PointSeries {
    fn evaluate_at(&self, x: f64) -> Option<f64> {
        let after = self.points.iter().position(|p| p.x >= x)?;
        let right = self.points[after];

        if right.x == x {
            return Some(right.y);
        }

        let left = self.points[after.checked_sub(1)?];
        let t = (x - left.x) / (right.x - left.x);

        Some(left.lerp(right, t).y)
    }

    /// The data is already sampled, so it's drawn as-is.
    fn sample(&self, range: Range<f64>, _samples: usize) -> Vec<Point> {
        self.points
            .iter()
            .copied()
            .filter(|p| p.x >= range.start && p.x <= range.end)
            .collect()
    }
}

fn linspace(range: Range<f64>, samples: usize) -> impl Iterator<Item = f64> {
    let samples = samples.max(2);
    let step = (range.end - range.start) / (samples - 1) as f64;

    (0..samples).map(move |i| range.start + step * i as f64)
}

/// Colors, line widths and fonts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Colors handed out, in order, to items without one.
    pub palette: Vec<RGBColor>,
    pub line_width: u32,
    pub axis_width: u32,
    pub axis_color: RGBColor,
    pub grid_alpha: f64,
    pub fill_alpha: f64,
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub legend_size: u32,
    /// Width and height in pixels.
    pub figure_size: (u32, u32),
    /// How many points are evaluated along each curve.
    pub samples: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            palette: vec![CRIMSON, NAVY, TEAL, SAND, CORAL, PURPLE, AZURE, ROSE],
            line_width: 3,
            axis_width: 2,
            axis_color: RGBColor(0x2C, 0x3E, 0x50),
            grid_alpha: 0.25,
            fill_alpha: 0.3,
            font_family: String::from("serif"),
            title_size: 24,
            label_size: 20,
            tick_size: 16,
            legend_size: 16,
            figure_size: (1100, 770),
            samples: 500,
        }
    }
}

/// Which part of the plane is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Quadrants {
    /// Only `x >= 0` and `y >= 0`, where prices and quantities live.
    #[default]
    First,
    All,
}

/// How a curve should be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub color: Option<RGBColor>,
    pub width: Option<u32>,
    pub dashed: bool,
    /// Overrides the canvas's x range for this curve.
    pub range: Option<(f64, f64)>,
}

impl Series {
    pub fn labelled<S: Into<String>>(label: S) -> Self {
        Series {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn color(self, color: RGBColor) -> Self {
        Series {
            color: Some(color),
            ..self
        }
    }

    pub fn width(self, width: u32) -> Self {
        Series {
            width: Some(width),
            ..self
        }
    }

    pub fn dashed(self) -> Self {
        Series {
            dashed: true,
            ..self
        }
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        Series {
            range: Some((min, max)),
            ..self
        }
    }
}

enum Item<'a> {
    Curve {
        plot: Box<dyn Plottable + 'a>,
        label: Option<String>,
        color: RGBColor,
        width: u32,
        dashed: bool,
        range: Option<(f64, f64)>,
    },
    Point {
        at: Point,
        label: Option<String>,
        color: RGBColor,
        size: u32,
    },
    VerticalLine {
        x: f64,
        label: Option<String>,
        color: RGBColor,
    },
    HorizontalLine {
        y: f64,
        label: Option<String>,
        color: RGBColor,
    },
    Fill {
        upper: Box<dyn Plottable + 'a>,
        lower: Option<Box<dyn Plottable + 'a>>,
        range: Option<(f64, f64)>,
        label: Option<String>,
        color: RGBColor,
    },
}

impl<'a> Item<'a> {
    /// Items in lower layers are drawn first.
    fn layer(&self) -> u8 {
        match self {
            Item::Fill { .. } => 1,
            Item::VerticalLine { .. } | Item::HorizontalLine { .. } => 2,
            Item::Curve { .. } => 3,
            Item::Point { .. } => 5,
        }
    }
}

/// Geometry in data coordinates, ready to be drawn.
enum Shape {
    Line {
        points: Vec<Point>,
        style: ShapeStyle,
        dashed: bool,
        label: Option<String>,
    },
    Marker {
        at: Point,
        style: ShapeStyle,
        size: u32,
        label: Option<String>,
    },
    Area {
        outline: Vec<Point>,
        style: ShapeStyle,
        label: Option<String>,
    },
    Vertical {
        x: f64,
        style: ShapeStyle,
        label: Option<String>,
    },
    Horizontal {
        y: f64,
        style: ShapeStyle,
        label: Option<String>,
    },
}

/// A builder for economic charts.
pub struct Canvas<'a> {
    style: ChartStyle,
    quadrants: Quadrants,
    title: Option<String>,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    items: Vec<Item<'a>>,
    next_color: usize,
}

impl<'a> Default for Canvas<'a> {
    fn default() -> Self { Canvas::with_style(ChartStyle::default()) }
}

impl<'a> Canvas<'a> {
    pub fn new() -> Self { Canvas::default() }

    pub fn with_style(style: ChartStyle) -> Self {
        Canvas {
            style,
            quadrants: Quadrants::default(),
            title: None,
            x_label: String::from("x"),
            y_label: String::from("y"),
            x_range: None,
            y_range: None,
            items: Vec::new(),
            next_color: 0,
        }
    }

    /// Plot several curves with default labels and colors.
    pub fn quick(plots: &[&'a dyn Plottable]) -> Self {
        plots
            .iter()
            .fold(Canvas::new(), |canvas, plot| {
                canvas.curve(*plot, Series::default())
            })
    }

    pub fn quadrants(mut self, quadrants: Quadrants) -> Self {
        self.quadrants = quadrants;
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn labels<X, Y>(mut self, x_label: X, y_label: Y) -> Self
    where
        X: Into<String>,
        Y: Into<String>,
    {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some((min, max));
        self
    }

    pub fn curve<P>(mut self, plot: P, series: Series) -> Self
    where
        P: Plottable + 'a,
    {
        let color = series.color.unwrap_or_else(|| self.next_color());

        self.items.push(Item::Curve {
            label: series.label.or_else(|| plot.default_label()),
            plot: Box::new(plot),
            color,
            width: series.width.unwrap_or(self.style.line_width),
            dashed: series.dashed,
            range: series.range,
        });
        self
    }

    pub fn point(mut self, x: f64, y: f64, label: Option<&str>) -> Self {
        let color = self.next_color();

        self.items.push(Item::Point {
            at: Point::new(x, y),
            label: label.map(String::from),
            color,
            size: 6,
        });
        self
    }

    pub fn vertical_line(mut self, x: f64, label: Option<&str>) -> Self {
        self.items.push(Item::VerticalLine {
            x,
            label: label.map(String::from),
            color: GRAY,
        });
        self
    }

    pub fn horizontal_line(mut self, y: f64, label: Option<&str>) -> Self {
        self.items.push(Item::HorizontalLine {
            y,
            label: label.map(String::from),
            color: GRAY,
        });
        self
    }

    /// Shade the area between two curves, e.g. a consumer surplus.
    pub fn fill_between<U, L>(
        mut self,
        upper: U,
        lower: L,
        range: Option<(f64, f64)>,
        label: Option<&str>,
    ) -> Self
    where
        U: Plottable + 'a,
        L: Plottable + 'a,
    {
        let color = self.next_color();

        self.items.push(Item::Fill {
            upper: Box::new(upper),
            lower: Some(Box::new(lower)),
            range,
            label: label.map(String::from),
            color,
        });
        self
    }

    /// Shade the area between a curve and the x axis.
    pub fn fill_under<U>(
        mut self,
        upper: U,
        range: Option<(f64, f64)>,
        label: Option<&str>,
    ) -> Self
    where
        U: Plottable + 'a,
    {
        let color = self.next_color();

        self.items.push(Item::Fill {
            upper: Box::new(upper),
            lower: None,
            range,
            label: label.map(String::from),
            color,
        });
        self
    }

    fn next_color(&mut self) -> RGBColor {
        let palette = &self.style.palette;
        let color = palette
            .get(self.next_color % palette.len().max(1))
            .copied()
            .unwrap_or(BLACK);
        self.next_color += 1;

        color
    }

    fn default_x_range(&self) -> (f64, f64) {
        self.x_range.unwrap_or(DEFAULT_RANGE)
    }

    /// Turn every item into data-space geometry, lowest layer first.
    fn shapes(&self) -> Vec<Shape> {
        let mut items: Vec<&Item<'a>> = self.items.iter().collect();
        items.sort_by_key(|item| item.layer());

        let (x_min, x_max) = self.default_x_range();
        let samples = self.style.samples;

        items
            .into_iter()
            .filter_map(|item| match item {
                Item::Curve {
                    plot,
                    label,
                    color,
                    width,
                    dashed,
                    range,
                } => {
                    let (lo, hi) = range.unwrap_or((x_min, x_max));

                    Some(Shape::Line {
                        points: plot.sample(lo..hi, samples),
                        style: color.stroke_width(*width),
                        dashed: *dashed,
                        label: label.clone(),
                    })
                },
                Item::Point {
                    at,
                    label,
                    color,
                    size,
                } => Some(Shape::Marker {
                    at: *at,
                    style: color.filled(),
                    size: *size,
                    label: label.clone(),
                }),
                Item::VerticalLine { x, label, color } => {
                    Some(Shape::Vertical {
                        x: *x,
                        style: color.mix(0.6).stroke_width(2),
                        label: label.clone(),
                    })
                },
                Item::HorizontalLine { y, label, color } => {
                    Some(Shape::Horizontal {
                        y: *y,
                        style: color.mix(0.6).stroke_width(2),
                        label: label.clone(),
                    })
                },
                Item::Fill {
                    upper,
                    lower,
                    range,
                    label,
                    color,
                } => {
                    let (lo, hi) = range.unwrap_or((x_min, x_max));
                    let outline = area_outline(
                        &**upper,
                        lower.as_deref(),
                        lo..hi,
                        samples,
                    );

                    if outline.len() < 3 {
                        log::warn!("Skipping a shaded area with no extent");
                        return None;
                    }

                    Some(Shape::Area {
                        outline,
                        style: color.mix(self.style.fill_alpha).filled(),
                        label: label.clone(),
                    })
                },
            })
            .collect()
    }

    /// The axis ranges, either set explicitly or large enough to show
    /// everything.
    fn bounds(&self, shapes: &[Shape]) -> (Range<f64>, Range<f64>) {
        let (x_min, x_max) = self.default_x_range();
        let x_min = match self.quadrants {
            Quadrants::First => x_min.max(0.0),
            Quadrants::All => x_min,
        };

        let y = match self.y_range {
            Some((lo, hi)) => lo..hi,
            None => {
                let ys = shapes.iter().flat_map(|shape| -> Vec<f64> {
                    match shape {
                        Shape::Line { points, .. }
                        | Shape::Area {
                            outline: points, ..
                        } => points.iter().map(|p| p.y).collect(),
                        Shape::Marker { at, .. } => vec![at.y],
                        Shape::Horizontal { y, .. } => vec![*y],
                        Shape::Vertical { .. } => Vec::new(),
                    }
                });
                let (lo, hi) = ys.fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), y| (lo.min(y), hi.max(y)),
                );

                if lo.is_finite() && hi.is_finite() {
                    let padding = ((hi - lo) * 0.05).max(1.0);
                    let lo = match self.quadrants {
                        Quadrants::First => 0.0,
                        Quadrants::All => lo - padding,
                    };
                    lo..(hi + padding).max(lo + 1.0)
                } else {
                    DEFAULT_RANGE.0..DEFAULT_RANGE.1
                }
            },
        };

        (x_min..x_max, y)
    }

    /// Draw the chart, returning the SVG document.
    pub fn render_svg(&self) -> Result<String, Error> {
        let shapes = self.shapes();
        let (x_range, y_range) = self.bounds(&shapes);

        if x_range.start >= x_range.end || y_range.start >= y_range.end {
            return Err(Error::Graph {
                message: format!(
                    "the axis ranges {:?} and {:?} are empty",
                    x_range, y_range
                ),
            });
        }

        let style = &self.style;
        let font = style.font_family.as_str();
        let mut svg = String::new();

        {
            let root = SVGBackend::with_string(&mut svg, style.figure_size)
                .into_drawing_area();
            root.fill(&WHITE).map_err(Error::graph)?;

            let mut builder = ChartBuilder::on(&root);
            builder
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60);
            if let Some(title) = &self.title {
                builder.caption(title, (font, style.title_size));
            }

            let mut chart = builder
                .build_cartesian_2d(x_range.clone(), y_range.clone())
                .map_err(Error::graph)?;

            chart
                .configure_mesh()
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .axis_desc_style((font, style.label_size))
                .label_style((font, style.tick_size))
                .bold_line_style(BLACK.mix(style.grid_alpha))
                .light_line_style(BLACK.mix(style.grid_alpha * 0.4))
                .axis_style(style.axis_color.stroke_width(style.axis_width))
                .draw()
                .map_err(Error::graph)?;

            if self.quadrants == Quadrants::All {
                let axis = style.axis_color.stroke_width(style.axis_width);
                let origin_axes = [
                    vec![(0.0, y_range.start), (0.0, y_range.end)],
                    vec![(x_range.start, 0.0), (x_range.end, 0.0)],
                ];
                chart
                    .draw_series(
                        origin_axes
                            .into_iter()
                            .map(|line| PathElement::new(line, axis)),
                    )
                    .map_err(Error::graph)?;
            }

            let mut has_legend = false;

            for shape in shapes {
                match shape {
                    Shape::Line {
                        points,
                        style,
                        dashed,
                        label,
                    } => {
                        let segments = if dashed {
                            dashed_polyline(&points)
                        } else {
                            vec![points]
                        };
                        let anno = chart
                            .draw_series(segments.into_iter().map(|segment| {
                                PathElement::new(to_tuples(&segment), style)
                            }))
                            .map_err(Error::graph)?;

                        if let Some(label) = label {
                            has_legend = true;
                            anno.label(label).legend(move |(x, y)| {
                                PathElement::new(vec![(x, y), (x + 20, y)], style)
                            });
                        }
                    },
                    Shape::Marker {
                        at,
                        style,
                        size,
                        label,
                    } => {
                        let anno = chart
                            .draw_series(std::iter::once(Circle::new(
                                (at.x, at.y),
                                size,
                                style,
                            )))
                            .map_err(Error::graph)?;

                        if let Some(label) = label {
                            has_legend = true;
                            anno.label(label).legend(move |(x, y)| {
                                Circle::new((x + 10, y), 4, style)
                            });
                        }
                    },
                    Shape::Area {
                        outline,
                        style,
                        label,
                    } => {
                        let anno = chart
                            .draw_series(std::iter::once(Polygon::new(
                                to_tuples(&outline),
                                style,
                            )))
                            .map_err(Error::graph)?;

                        if let Some(label) = label {
                            has_legend = true;
                            anno.label(label).legend(move |(x, y)| {
                                Rectangle::new([(x, y - 5), (x + 20, y + 5)], style)
                            });
                        }
                    },
                    Shape::Vertical { x, style, label } => {
                        let segments = dashes(
                            Point::new(x, y_range.start),
                            Point::new(x, y_range.end),
                        );
                        let anno = chart
                            .draw_series(segments.into_iter().map(|segment| {
                                PathElement::new(to_tuples(&segment), style)
                            }))
                            .map_err(Error::graph)?;

                        if let Some(label) = label {
                            has_legend = true;
                            anno.label(label).legend(move |(x, y)| {
                                PathElement::new(vec![(x, y), (x + 20, y)], style)
                            });
                        }
                    },
                    Shape::Horizontal { y, style, label } => {
                        let segments = dashes(
                            Point::new(x_range.start, y),
                            Point::new(x_range.end, y),
                        );
                        let anno = chart
                            .draw_series(segments.into_iter().map(|segment| {
                                PathElement::new(to_tuples(&segment), style)
                            }))
                            .map_err(Error::graph)?;

                        if let Some(label) = label {
                            has_legend = true;
                            anno.label(label).legend(move |(x, y)| {
                                PathElement::new(vec![(x, y), (x + 20, y)], style)
                            });
                        }
                    },
                }
            }

            if has_legend {
                chart
                    .configure_series_labels()
                    .label_font((font, style.legend_size))
                    .background_style(&WHITE.mix(0.9))
                    .border_style(&BLACK)
                    .position(SeriesLabelPosition::UpperRight)
                    .draw()
                    .map_err(Error::graph)?;
            }

            root.present().map_err(Error::graph)?;
        }

        Ok(svg)
    }

    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let svg = self.render_svg()?;

        std::fs::write(path, svg).map_err(|e| Error::Graph {
            message: format!("unable to save \"{}\": {}", path.display(), e),
        })?;
        log::debug!("Saved a chart to \"{}\"", path.display());

        Ok(())
    }
}

fn to_tuples(points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.y)).collect()
}

/// The closed outline of the area between `upper` and `lower` (or the x
/// axis).
fn area_outline(
    upper: &dyn Plottable,
    lower: Option<&dyn Plottable>,
    range: Range<f64>,
    samples: usize,
) -> Vec<Point> {
    let pairs: Vec<(Point, Point)> = linspace(range, samples)
        .filter_map(|x| {
            let top = upper.evaluate_at(x)?;
            let bottom = match lower {
                Some(lower) => lower.evaluate_at(x)?,
                None => 0.0,
            };

            if top.is_finite() && bottom.is_finite() {
                Some((Point::new(x, top), Point::new(x, bottom)))
            } else {
                None
            }
        })
        .collect();

    pairs
        .iter()
        .map(|(top, _)| *top)
        .chain(pairs.iter().rev().map(|(_, bottom)| *bottom))
        .collect()
}

const DASH_COUNT: usize = 40;
const DASH_POINTS: usize = 8;

/// A straight dashed line from `start` to `end`.
fn dashes(start: Point, end: Point) -> Vec<Vec<Point>> {
    let pieces = DASH_COUNT * 2 - 1;

    (0..pieces)
        .step_by(2)
        .map(|i| {
            let from = start.lerp(end, i as f64 / pieces as f64);
            let to = start.lerp(end, (i + 1) as f64 / pieces as f64);
            vec![from, to]
        })
        .collect()
}

/// Every other run of points along a sampled curve.
fn dashed_polyline(points: &[Point]) -> Vec<Vec<Point>> {
    points
        .chunks(DASH_POINTS)
        .step_by(2)
        .filter(|chunk| chunk.len() > 1)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// The classic supply and demand diagram: both curves, the equilibrium,
/// dashed guides to the axes, and the shaded surpluses.
pub fn market_chart<'a>(
    supply: &'a Supply,
    demand: &'a Demand,
) -> Result<Canvas<'a>, Error> {
    let eq = equilibrium(supply, demand)?;
    let (price, quantity) = (eq.price, eq.quantity);
    let at_price = move |_: f64| price;

    let x_max = if quantity > 0.0 { quantity * 2.0 } else { 100.0 };

    Ok(Canvas::new()
        .title("Market equilibrium")
        .labels("Quantity (Q)", "Price (P)")
        .x_range(0.0, x_max)
        .fill_between(
            demand,
            FunctionPlot(at_price),
            Some((0.0, quantity)),
            Some("Consumer surplus"),
        )
        .fill_between(
            FunctionPlot(at_price),
            supply,
            Some((0.0, quantity)),
            Some("Producer surplus"),
        )
        .curve(demand, Series::labelled("Demand").color(CRIMSON))
        .curve(supply, Series::labelled("Supply").color(NAVY))
        .vertical_line(quantity, None)
        .horizontal_line(price, None)
        .point(quantity, price, Some("Equilibrium")))
}
