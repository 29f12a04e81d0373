//! # Client Presentation Report
//!
//! Renders an estimate as a client-facing PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via placeholder replacement before compilation
//! - User-supplied strings are escaped so they render literally
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use buildout_core::pdf::render_estimate_pdf;
//! use buildout_core::calculations::{compute_project_costs, ProjectInput, SliderValues};
//! use buildout_core::config::CostConfig;
//!
//! let config = CostConfig::default();
//! let input = ProjectInput::new("Suite 400", 25_000.0, 1, "New York, NY");
//! let output = compute_project_costs(&config, &input, &SliderValues::new(), None).unwrap();
//!
//! let pdf = render_estimate_pdf(&input, &output, "Jane Estimator").unwrap();
//! std::fs::write("suite_400.pdf", pdf).unwrap();
//! ```

use chrono::{Datelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{ProjectInput, ProjectOutput};
use crate::errors::{CostError, CostResult};
use crate::units::{Dollars, DollarsPerRsf, Rsf};

// ============================================================================
// Typst World
// ============================================================================

/// Single in-memory document, bundled fonts, no file access.
struct ReportWorld {
    source: Source,
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl ReportWorld {
    fn new(markup: String) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        ReportWorld {
            source: Source::detached(markup),
            library: LazyHash::new(Library::default()),
            book: LazyHash::new(FontBook::from_fonts(&fonts)),
            fonts,
        }
    }

    fn not_found(id: FileId) -> FileError {
        FileError::NotFound(id.vpath().as_rootless_path().into())
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(Self::not_found(id))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(Self::not_found(id))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let today = Utc::now().date_naive();
        Datetime::from_ymd(today.year(), u8::try_from(today.month()).ok()?, u8::try_from(today.day()).ok()?)
    }
}

// ============================================================================
// Template
// ============================================================================

const ESTIMATE_TEMPLATE: &str = r##"
#set page(
  paper: "us-letter",
  margin: (top: 1in, bottom: 1in, left: 0.9in, right: 0.9in),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Build-Out Cost Estimate]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[{{PROJECT_NAME}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(size: 10.5pt)

#align(center)[
  #block(width: 100%, fill: rgb("#eef2f5"), inset: 14pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{{PROJECT_NAME}}]
    #v(4pt)
    #text(size: 12pt)[Preliminary Build-Out Budget]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Location:], [{{LOCATION}}],
      [Size:], [{{PROJECT_SIZE}}],
      [Floors:], [{{FLOORS}}],
    )
  ],
  [
    *Prepared*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [By:], [{{PREPARED_BY}}],
      [Date:], [{{DATE}}],
      [Project factor:], [{{UPF}}],
    )
  ]
)

#v(14pt)

== Cost Breakdown

#table(
  columns: (1fr, auto, auto, auto),
  inset: 7pt,
  stroke: 0.5pt,
  align: (left, right, right, right),
  table.header([*Category*], [*Factor*], [*Cost / RSF*], [*Total*]),
{{CATEGORY_ROWS}}
  [*Subtotal*], [], [], [*{{SUBTOTAL}}*],
  [Contingency ({{CONTINGENCY_PCT}})], [], [], [{{CONTINGENCY}}],
  [*Grand Total*], [], [*{{GRAND_TOTAL_PER_RSF}}*], [*{{GRAND_TOTAL}}*],
)

#v(14pt)

== Client Investment

#table(
  columns: (1fr, auto, auto),
  inset: 7pt,
  stroke: 0.5pt,
  align: (left, right, right),
  table.header([], [*Per RSF*], [*Total*]),
  [Grand Total], [{{GRAND_TOTAL_PER_RSF}}], [{{GRAND_TOTAL}}],
  [Less TI Allowance], [{{TI_PER_RSF}}], [{{TI_TOTAL}}],
  [*Client Total*], [*{{CLIENT_TOTAL_PER_RSF}}*], [*{{CLIENT_TOTAL}}*],
)

#v(24pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

#text(size: 9pt, fill: gray)[
  Preliminary budget for planning purposes only. Figures are parametric
  estimates based on project size, floor count, location and selected
  quality levels, and will change as design develops.
]
"##;

/// Escape text for literal use inside Typst markup.
fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '#' | '[' | ']' | '$' | '*' | '_' | '<' | '>' | '@' | '`' | '~' | '/' | '=' | '-' | '+') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Render an estimate to a client-facing PDF.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CostError::Internal)` - If Typst compilation or rendering fails
pub fn render_estimate_pdf(input: &ProjectInput, output: &ProjectOutput, prepared_by: &str) -> CostResult<Vec<u8>> {
    let source = estimate_source(input, output, prepared_by);
    let world = ReportWorld::new(source);

    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CostError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CostError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(project = %input.project_name, bytes = pdf_bytes.len(), "Rendered estimate PDF");
    Ok(pdf_bytes)
}

/// Fill the template. Kept separate from compilation so the markup can be
/// checked without running Typst.
fn estimate_source(input: &ProjectInput, output: &ProjectOutput, prepared_by: &str) -> String {
    let money = |value: f64| escape_markup(&Dollars(value).to_string());
    let rate = |value: f64| escape_markup(&DollarsPerRsf(value).to_string());

    let category_rows: String = output
        .categories
        .iter()
        .map(|c| {
            format!(
                "  [{}], [{:.3}], [{}], [{}],\n",
                escape_markup(&c.category),
                c.adjusted_factor,
                rate(c.cost_per_rsf),
                money(c.total_cost),
            )
        })
        .collect();

    let ti_total = if output.ti_allowance_total > 0.0 {
        format!("\\-{}", money(output.ti_allowance_total))
    } else {
        money(0.0)
    };

    fill_placeholders(
        ESTIMATE_TEMPLATE,
        &[
            ("CATEGORY_ROWS", category_rows),
            ("PROJECT_NAME", escape_markup(&input.project_name)),
            ("LOCATION", escape_markup(&input.location)),
            ("PREPARED_BY", escape_markup(prepared_by)),
            ("PROJECT_SIZE", Rsf(input.project_size).to_string()),
            ("FLOORS", input.floors.to_string()),
            ("DATE", Utc::now().format("%Y-%m-%d").to_string()),
            ("UPF", format!("{:.3}", output.unique_project_factor)),
            ("SUBTOTAL", money(output.subtotal)),
            ("CONTINGENCY_PCT", format!("{:.1}%", output.contingency_percent * 100.0)),
            ("CONTINGENCY", money(output.contingency)),
            ("GRAND_TOTAL", money(output.grand_total)),
            ("GRAND_TOTAL_PER_RSF", rate(output.grand_total_per_rsf)),
            ("TI_PER_RSF", rate(output.ti_allowance_per_sf)),
            ("TI_TOTAL", ti_total),
            ("CLIENT_TOTAL", money(output.client_total)),
            ("CLIENT_TOTAL_PER_RSF", rate(output.client_total_per_rsf)),
        ],
    )
}

/// Substitute `{{KEY}}` markers in one pass over `template`.
///
/// Inserted values are never rescanned. Unknown markers are left as is.
fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut filled = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after
            .find("}}")
            .and_then(|close| values.iter().find(|(key, _)| *key == &after[..close]).map(|(_, v)| (close, v)));
        match value {
            Some((close, value)) => {
                filled.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                filled.push_str("{{");
                rest = after;
            }
        }
    }
    filled.push_str(rest);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{compute_project_costs, SliderValues};
    use crate::config::CostConfig;

    fn sample() -> (ProjectInput, ProjectOutput) {
        let input = ProjectInput::new("Suite #400 [East]", 25_000.0, 1, "New York, NY").with_ti_allowance(10.0);
        let output = compute_project_costs(&CostConfig::default(), &input, &SliderValues::new(), None).unwrap();
        (input, output)
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("$1,000"), "\\$1,000");
        assert_eq!(escape_markup("A #1 [x]"), "A \\#1 \\[x\\]");
        assert_eq!(escape_markup("plain text"), "plain text");
    }

    #[test]
    fn test_source_has_no_unfilled_placeholders() {
        let (input, output) = sample();
        let source = estimate_source(&input, &output, "Jane_Doe");
        assert!(!source.contains("{{"), "unfilled placeholder in template");
        assert!(source.contains("Suite \\#400 \\[East\\]"));
        assert!(source.contains("Jane\\_Doe"));
        assert!(source.contains("FF&E\\/Appliances"));
        assert!(source.contains("\\$6,290,970"));
    }

    #[test]
    fn test_user_text_is_not_expanded() {
        let input = ProjectInput::new("{{LOCATION}}", 25_000.0, 1, "{{SUBTOTAL}} {{FLOORS}}");
        let output = compute_project_costs(&CostConfig::default(), &input, &SliderValues::new(), None).unwrap();
        let source = estimate_source(&input, &output, "{{UPF}}");

        assert!(source.contains("[{{SUBTOTAL}} {{FLOORS}}]"));
        assert!(source.contains("[{{LOCATION}}]"));
        assert!(source.contains("[{{UPF}}]"));
    }

    #[test]
    fn test_fill_placeholders_single_pass() {
        let values = [("A", "{{B}}".to_string()), ("B", "b".to_string())];
        assert_eq!(fill_placeholders("x {{A}} {{B}} {{C}}", &values), "x {{B}} b {{C}}");
        assert_eq!(fill_placeholders("open {{A", &values), "open {{A");
    }

    #[test]
    fn test_render_estimate_pdf() {
        let (input, output) = sample();
        let pdf = render_estimate_pdf(&input, &output, "Test Estimator");

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
