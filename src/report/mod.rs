//! Prescription report rendering.
//!
//! Split into a pure layout stage and a paint stage. `layout` walks the
//! report top to bottom with a descending cursor and emits an ordered list
//! of text operations in PDF points; `render` paints that list onto a
//! single A4 page with printpdf's built-in Helvetica faces. The layout
//! stage is deterministic, so identical input always produces the same
//! operation list.
//!
//! Known limitation, kept from the original service: output is a single
//! page, and content longer than the page walks off the bottom edge.

pub mod metrics;

use std::io::BufWriter;

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Pt, Rgb};
use thiserror::Error;

use crate::models::{Diagnosis, PatientRecord};
use metrics::{text_width, wrap, FontStyle};

/// A4 in PDF points.
pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

const MARGIN: f32 = 60.0;
const MAX_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_HEIGHT: f32 = 22.0;
/// Bullet lines sit one step deeper than labeled fields.
const BULLET_INDENT: f32 = MARGIN + 15.0;
const FOOTER_Y: f32 = 40.0;

const BRAND: &str = "Smart Skin Health";
const HEADING: &str =
    "Prescription and Diet Recommendation for AI-Based Skin Disease Detection";
const FOOTER: &str = "Generated by Smart Skin Health | For clinical guidance only";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF write error: {0}")]
    Write(String),
}

/// Fill colors used by the report, one per text role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    /// Brand label, green.
    Brand,
    /// Heading, dark blue.
    Heading,
    /// Body text, black.
    Body,
    /// Footer disclaimer, gray.
    Footer,
}

impl Ink {
    fn rgb(self) -> (f32, f32, f32) {
        match self {
            Ink::Brand => (0.0, 0.502, 0.0),
            Ink::Heading => (0.0, 0.0, 0.545),
            Ink::Body => (0.0, 0.0, 0.0),
            Ink::Footer => (0.502, 0.502, 0.502),
        }
    }
}

/// One positioned line of text. `y` is measured from the bottom edge, like
/// the PDF coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub ink: Ink,
}

/// Lay the report out as an ordered list of text operations.
///
/// Order is fixed: brand, heading, patient fields, disease, description
/// bullets, medication, diet, footer. All body layout is driven by a single
/// descending cursor; only the footer sits at a fixed position.
pub fn layout(patient: &PatientRecord, diagnosis: &Diagnosis) -> Vec<TextOp> {
    let mut ops = Vec::new();

    ops.push(TextOp {
        text: BRAND.to_string(),
        x: MARGIN,
        y: PAGE_HEIGHT - 60.0,
        size: 14.0,
        style: FontStyle::Bold,
        ink: Ink::Brand,
    });

    let mut y = PAGE_HEIGHT - 100.0;

    for line in wrap(HEADING, FontStyle::Bold, 16.0, MAX_WIDTH) {
        let line_width = text_width(FontStyle::Bold, 16.0, &line);
        ops.push(TextOp {
            x: (PAGE_WIDTH - line_width) / 2.0,
            y,
            text: line,
            size: 16.0,
            style: FontStyle::Bold,
            ink: Ink::Heading,
        });
        y -= LINE_HEIGHT;
    }
    y -= 20.0;

    labeled_field(&mut ops, &mut y, "Patient Name", &patient.name);
    labeled_field(&mut ops, &mut y, "Age", &patient.age.to_string());
    labeled_field(&mut ops, &mut y, "Gender", &patient.gender);
    labeled_field(
        &mut ops,
        &mut y,
        "WhatsApp",
        patient.whatsapp.as_deref().unwrap_or(""),
    );
    labeled_field(&mut ops, &mut y, "Disease", &diagnosis.disease);

    labeled_field(&mut ops, &mut y, "Description", "");
    bullet_list(&mut ops, &mut y, &diagnosis.description);

    labeled_field(&mut ops, &mut y, "Medication", "");
    bullet_list(&mut ops, &mut y, std::slice::from_ref(&diagnosis.medication));

    labeled_field(&mut ops, &mut y, "Diet Plan", "");
    bullet_list(&mut ops, &mut y, std::slice::from_ref(&diagnosis.diet));

    let footer_width = text_width(FontStyle::Oblique, 10.0, FOOTER);
    ops.push(TextOp {
        text: FOOTER.to_string(),
        x: (PAGE_WIDTH - footer_width) / 2.0,
        y: FOOTER_Y,
        size: 10.0,
        style: FontStyle::Oblique,
        ink: Ink::Footer,
    });

    ops
}

/// `"Label: value"` (or `"Label:"` when the value is empty), wrapped at the
/// bold metrics, one op per line, then a small gap.
fn labeled_field(ops: &mut Vec<TextOp>, y: &mut f32, label: &str, value: &str) {
    let text = if value.is_empty() {
        format!("{label}:")
    } else {
        format!("{label}: {value}")
    };

    for line in wrap(&text, FontStyle::Bold, 12.0, MAX_WIDTH) {
        ops.push(TextOp {
            text: line,
            x: MARGIN,
            y: *y,
            size: 12.0,
            style: FontStyle::Bold,
            ink: Ink::Body,
        });
        *y -= LINE_HEIGHT;
    }
    *y -= 5.0;
}

/// Each item prefixed with a bullet glyph and wrapped independently at the
/// deeper indent; continuation lines carry no bullet. One gap after the
/// whole list.
fn bullet_list(ops: &mut Vec<TextOp>, y: &mut f32, items: &[String]) {
    for item in items {
        for line in wrap(&format!("\u{B7} {item}"), FontStyle::Regular, 12.0, MAX_WIDTH) {
            ops.push(TextOp {
                text: line,
                x: BULLET_INDENT,
                y: *y,
                size: 12.0,
                style: FontStyle::Regular,
                ink: Ink::Body,
            });
            *y -= LINE_HEIGHT;
        }
    }
    *y -= 10.0;
}

/// Render a patient record and diagnosis into single-page PDF bytes.
pub fn render(patient: &PatientRecord, diagnosis: &Diagnosis) -> Result<Vec<u8>, ReportError> {
    let ops = layout(patient, diagnosis);

    let (doc, page1, layer1) =
        PdfDocument::new("Skin Disease Prescription", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    for op in &ops {
        let font = match op.style {
            FontStyle::Regular => &regular,
            FontStyle::Bold => &bold,
            FontStyle::Oblique => &oblique,
        };
        let (r, g, b) = op.ink.rgb();
        layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        layer.use_text(&op.text, op.size, Mm::from(Pt(op.x)), Mm::from(Pt(op.y)), font);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Write(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Write(e.to_string()))
}
