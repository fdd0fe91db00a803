use std::io::Cursor;

use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::debug;

use crate::error::ReportError;
use crate::report::ReportContent;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;
pub const LINE_HEIGHT_MM: f32 = 10.0;
pub const FONT_SIZE_PT: f32 = 12.0;
pub const CHART_LEFT_MM: f32 = 30.0;
pub const CHART_WIDTH_MM: f32 = 150.0;

const LAYER_NAME: &str = "Relatorio";
const MM_PER_PT: f32 = 25.4 / 72.0;
const AVERAGE_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Clone)]
pub enum FontSource {
    /// Built-in Helvetica; only ASCII renders correctly.
    Builtin,
    /// Bytes of a TrueType font to embed.
    TrueType(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element<'a> {
    Text(&'a str),
    Chart,
}

/// One element positioned on a page, measured in millimetres from the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed<'a> {
    pub page: usize,
    pub x: f32,
    pub top: f32,
    pub height: f32,
    pub element: Element<'a>,
}

pub fn estimated_text_width_mm(text: &str) -> f32 {
    text.chars().count() as f32 * FONT_SIZE_PT * AVERAGE_GLYPH_EM * MM_PER_PT
}

/// Breaks `text` on spaces so every piece fits between the page margins.
/// Words wider than a whole line are cut at the margin.
pub fn wrap_line(text: &str) -> Vec<String> {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    if estimated_text_width_mm(text) <= usable {
        return vec![text.to_string()];
    }
    let max_chars = ((usable / estimated_text_width_mm("M")).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            let piece: String = piece.iter().collect();
            let candidate = if current.is_empty() {
                piece.clone()
            } else {
                format!("{current} {piece}")
            };
            if estimated_text_width_mm(&candidate) > usable && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current = piece;
            } else {
                current = candidate;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Positions the centred title, each text line and finally the chart,
/// starting a new page whenever the next element would cross the bottom margin.
pub fn layout<'a>(title: &'a str, lines: &'a [String], chart_height_mm: f32) -> Vec<Placed<'a>> {
    let mut placed = Vec::new();
    let mut page = 0;
    let mut top = MARGIN_MM;

    let mut place = |element: Element<'a>, x: f32, height: f32| {
        if top + height > PAGE_HEIGHT_MM - MARGIN_MM && top > MARGIN_MM {
            page += 1;
            top = MARGIN_MM;
        }
        placed.push(Placed {
            page,
            x,
            top,
            height,
            element,
        });
        top += height;
    };

    let title_x = ((PAGE_WIDTH_MM - estimated_text_width_mm(title)) / 2.0).max(MARGIN_MM);
    place(Element::Text(title), title_x, LINE_HEIGHT_MM);

    for line in lines {
        place(Element::Text(line.as_str()), MARGIN_MM, LINE_HEIGHT_MM);
    }

    place(Element::Chart, CHART_LEFT_MM, chart_height_mm);
    placed
}

pub fn compose(
    content: &ReportContent,
    chart_png: &[u8],
    font: &FontSource,
) -> Result<Vec<u8>, ReportError> {
    let decoder = PngDecoder::new(Cursor::new(chart_png))
        .map_err(|err| ReportError::Image(err.to_string()))?;
    let image = Image::try_from(decoder).map_err(|err| ReportError::Image(err.to_string()))?;

    let pixel_width = image.image.width.0 as f32;
    let pixel_height = image.image.height.0 as f32;
    if pixel_width == 0.0 || pixel_height == 0.0 {
        return Err(ReportError::Image("chart image has no pixels".to_string()));
    }
    let dpi = pixel_width * 25.4 / CHART_WIDTH_MM;
    let chart_height_mm = CHART_WIDTH_MM * pixel_height / pixel_width;

    let lines: Vec<String> = content.lines.iter().flat_map(|line| wrap_line(line)).collect();
    let placements = layout(&content.title, &lines, chart_height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(
        content.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font_ref = load_font(&doc, font)?;
    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];

    let mut chart = Some(image);
    for placed in placements {
        let layer = layer_for(&doc, &mut layers, placed.page);
        match placed.element {
            Element::Text(text) if text.is_empty() => {}
            Element::Text(text) => {
                let baseline = PAGE_HEIGHT_MM - placed.top - LINE_HEIGHT_MM * 0.7;
                layer.use_text(text, FONT_SIZE_PT, Mm(placed.x), Mm(baseline), &font_ref);
            }
            Element::Chart => {
                if let Some(image) = chart.take() {
                    image.add_to_layer(
                        layer,
                        ImageTransform {
                            translate_x: Some(Mm(placed.x)),
                            translate_y: Some(Mm(PAGE_HEIGHT_MM - placed.top - placed.height)),
                            dpi: Some(dpi),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    debug!(pages = layers.len(), "composed report document");
    doc.save_to_bytes().map_err(|err| ReportError::Pdf(err.to_string()))
}

fn load_font(
    doc: &PdfDocumentReference,
    font: &FontSource,
) -> Result<IndirectFontRef, ReportError> {
    let loaded = match font {
        FontSource::Builtin => doc.add_builtin_font(BuiltinFont::Helvetica),
        FontSource::TrueType(bytes) => doc.add_external_font(Cursor::new(bytes.as_slice())),
    };
    loaded.map_err(|err| ReportError::Pdf(err.to_string()))
}

fn layer_for(
    doc: &PdfDocumentReference,
    layers: &mut Vec<PdfLayerReference>,
    page: usize,
) -> PdfLayerReference {
    while layers.len() <= page {
        let (page_index, layer_index) =
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        layers.push(doc.get_page(page_index).get_layer(layer_index));
    }
    layers[page].clone()
}
