use std::collections::{HashMap, VecDeque};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use serde::Deserialize;
use tracing::debug;

use crate::error::ChartError;
use crate::glyphs::{self, GLYPH_HEIGHT};
use crate::models::MAX_HOURS;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 500;
pub const CHART_TITLE: &str = "Estudos da Semana";
pub const AXIS_LABEL: &str = "Horas Estudadas";

const MARGIN_LEFT: u32 = 90;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 70;
const GRID_STEP_HOURS: f64 = 2.0;
pub const CHART_CACHE_CAPACITY: usize = 8;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BAR: Rgb<u8> = Rgb([135, 206, 235]);
const GRID: Rgb<u8> = Rgb([225, 228, 232]);
const INK: Rgb<u8> = Rgb([40, 44, 52]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartBackend {
    #[default]
    Static,
    Interactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub png: Vec<u8>,
    pub html: Option<String>,
}

impl RenderedChart {
    /// Writes the PNG to `path` and, when present, the HTML page next to it.
    pub fn write_to(&self, path: &Path) -> Result<Vec<PathBuf>, ChartError> {
        let mut written = Vec::new();
        write_file(path, self.png.as_slice())?;
        written.push(path.to_path_buf());

        if let Some(html) = &self.html {
            let html_path = path.with_extension("html");
            write_file(&html_path, html.as_bytes())?;
            written.push(html_path);
        }

        Ok(written)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ChartError> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    parent
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|_| std::fs::write(path, bytes))
        .map_err(|source| ChartError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer {
    backend: ChartBackend,
}

impl ChartRenderer {
    pub fn new(backend: ChartBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> ChartBackend {
        self.backend
    }

    pub fn render(&self, labels: &[&str], hours: &[f64]) -> Result<RenderedChart, ChartError> {
        if labels.len() != hours.len() {
            return Err(ChartError::Mismatched {
                labels: labels.len(),
                values: hours.len(),
            });
        }

        let png = encode_png(&draw_bars(labels, hours))?;
        let html = match self.backend {
            ChartBackend::Static => None,
            ChartBackend::Interactive => Some(interactive_page(labels, hours)),
        };

        Ok(RenderedChart { png, html })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChartKey {
    labels: Vec<String>,
    hours: Vec<u64>,
}

impl ChartKey {
    fn new(labels: &[&str], hours: &[f64]) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
            hours: hours.iter().map(|value| value.to_bits()).collect(),
        }
    }
}

/// Keeps the most recently used charts, up to a fixed capacity.
#[derive(Debug)]
pub struct ChartCache {
    capacity: usize,
    entries: HashMap<ChartKey, RenderedChart>,
    recency: VecDeque<ChartKey>,
}

impl Default for ChartCache {
    fn default() -> Self {
        Self::with_capacity(CHART_CACHE_CAPACITY)
    }
}

impl ChartCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn get_or_render(
        &mut self,
        renderer: &ChartRenderer,
        labels: &[&str],
        hours: &[f64],
    ) -> Result<RenderedChart, ChartError> {
        let key = ChartKey::new(labels, hours);
        if let Some(chart) = self.entries.get(&key) {
            debug!("chart cache hit");
            let chart = chart.clone();
            self.touch(&key);
            return Ok(chart);
        }

        let chart = renderer.render(labels, hours)?;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.recency.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.recency.push_back(key.clone());
        self.entries.insert(key, chart.clone());
        Ok(chart)
    }

    fn touch(&mut self, key: &ChartKey) {
        if let Some(position) = self.recency.iter().position(|cached| cached == key) {
            if let Some(key) = self.recency.remove(position) {
                self.recency.push_back(key);
            }
        }
    }

    pub fn cached_charts(&self) -> usize {
        self.entries.len()
    }
}

struct PlotArea {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl PlotArea {
    fn standard() -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn bottom(&self) -> u32 {
        self.top + self.height
    }

    fn y_for(&self, hours: f64) -> u32 {
        let ratio = (hours / MAX_HOURS).clamp(0.0, 1.0);
        self.bottom() - (ratio * self.height as f64).round() as u32
    }

    fn slot(&self, index: usize, count: usize) -> (u32, u32) {
        let width = self.width / count.max(1) as u32;
        (self.left + index as u32 * width, width)
    }
}

fn draw_bars(labels: &[&str], hours: &[f64]) -> RgbImage {
    let mut image = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
    let area = PlotArea::standard();

    let mut tick = 0.0;
    while tick <= MAX_HOURS {
        let y = area.y_for(tick);
        fill_rect(&mut image, area.left, y, area.width, 1, GRID);
        let label = format!("{tick:.0}");
        let label_x = area.left - 10 - glyphs::text_width(&label, 2);
        glyphs::draw_text(&mut image, label_x, y.saturating_sub(GLYPH_HEIGHT), &label, 2, INK);
        tick += GRID_STEP_HOURS;
    }

    for (index, (label, value)) in labels.iter().zip(hours.iter()).enumerate() {
        let (slot_left, slot_width) = area.slot(index, labels.len());
        let bar_width = slot_width * 3 / 5;
        let bar_left = slot_left + (slot_width - bar_width) / 2;
        let bar_top = area.y_for(*value);
        fill_rect(&mut image, bar_left, bar_top, bar_width, area.bottom() - bar_top, BAR);

        let scale = if glyphs::text_width(label, 2) <= slot_width { 2 } else { 1 };
        let text_width = glyphs::text_width(label, scale);
        let text_left = slot_left + slot_width.saturating_sub(text_width) / 2;
        glyphs::draw_text(&mut image, text_left, area.bottom() + 14, label, scale, INK);
    }

    fill_rect(&mut image, area.left, area.top, 2, area.height + 1, INK);
    fill_rect(&mut image, area.left, area.bottom(), area.width, 2, INK);

    let title_width = glyphs::text_width(CHART_TITLE, 3);
    glyphs::draw_text(
        &mut image,
        (CHART_WIDTH - title_width) / 2,
        18,
        CHART_TITLE,
        3,
        INK,
    );

    let axis_width = glyphs::text_width(AXIS_LABEL, 2);
    glyphs::draw_text_vertical(
        &mut image,
        16,
        area.top + (area.height + axis_width) / 2,
        AXIS_LABEL,
        2,
        INK,
    );

    image
}

fn fill_rect(image: &mut RgbImage, left: u32, top: u32, width: u32, height: u32, color: Rgb<u8>) {
    let right = (left + width).min(image.width());
    let bottom = (top + height).min(image.height());
    for y in top..bottom {
        for x in left..right {
            image.put_pixel(x, y, color);
        }
    }
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ChartError> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.write_header()?.write_image_data(image.as_raw())?;
    }
    Ok(buffer)
}

fn interactive_page(labels: &[&str], hours: &[f64]) -> String {
    let area = PlotArea::standard();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{CHART_WIDTH}' height='{CHART_HEIGHT}' viewBox='0 0 {CHART_WIDTH} {CHART_HEIGHT}'>"
    );
    let _ = writeln!(
        svg,
        "  <text x='{}' y='36' text-anchor='middle' font-size='22'>{}</text>",
        CHART_WIDTH / 2,
        escape(CHART_TITLE)
    );

    let mut tick = 0.0;
    while tick <= MAX_HOURS {
        let y = area.y_for(tick);
        let _ = writeln!(
            svg,
            "  <line x1='{}' x2='{}' y1='{y}' y2='{y}' stroke='#e1e4e8'/><text x='{}' y='{}' text-anchor='end' font-size='12'>{tick:.0}</text>",
            area.left,
            area.left + area.width,
            area.left - 8,
            y + 4
        );
        tick += GRID_STEP_HOURS;
    }

    for (index, (label, value)) in labels.iter().zip(hours.iter()).enumerate() {
        let (slot_left, slot_width) = area.slot(index, labels.len());
        let bar_width = slot_width * 3 / 5;
        let bar_left = slot_left + (slot_width - bar_width) / 2;
        let bar_top = area.y_for(*value);
        let label = escape(label);
        let _ = writeln!(
            svg,
            "  <rect class='bar' x='{bar_left}' y='{bar_top}' width='{bar_width}' height='{}'><title>{label}: {value:.1} horas</title></rect>",
            area.bottom() - bar_top
        );
        let _ = writeln!(
            svg,
            "  <text x='{}' y='{}' text-anchor='middle' font-size='13'>{label}</text>",
            slot_left + slot_width / 2,
            area.bottom() + 24
        );
    }

    let _ = writeln!(
        svg,
        "  <text transform='translate(24 {}) rotate(-90)' text-anchor='middle' font-size='14'>{}</text>",
        area.top + area.height / 2,
        escape(AXIS_LABEL)
    );
    let _ = write!(svg, "</svg>");

    format!(
        "<!DOCTYPE html>\n<html lang='pt-BR'>\n<head>\n<meta charset='utf-8'>\n<title>{title}</title>\n<style>\nbody {{ font-family: sans-serif; }}\n.bar {{ fill: skyblue; }}\n.bar:hover {{ fill: steelblue; }}\n</style>\n</head>\n<body>\n{svg}\n</body>\n</html>\n",
        title = escape(CHART_TITLE)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}
