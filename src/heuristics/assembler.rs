//! Line Assembler: groups spans into visual lines.

use crate::model::{BBox, Line, Page, PageSpans, Span};

use super::OutlineConfig;

/// Assemble the spans of one page into lines in reading order.
pub fn assemble_page(page: PageSpans, config: &OutlineConfig) -> Page {
    let lines = group_spans_into_lines(page.spans, config);
    log::debug!("Page {}: assembled {} lines", page.index, lines.len());

    Page {
        index: page.index,
        width: page.width,
        height: page.height,
        lines,
    }
}

/// Group spans of a single page into lines.
///
/// Spans are first clustered into rows by vertical overlap; each row is then
/// split left-to-right wherever the horizontal gap is too wide to be a word
/// space. Spans without area or without text are dropped.
pub fn group_spans_into_lines(spans: Vec<Span>, config: &OutlineConfig) -> Vec<Line> {
    let mut spans: Vec<Span> = spans
        .into_iter()
        .filter(|s| {
            !s.bbox.is_degenerate()
                && s.font_size.is_finite()
                && s.font_size > 0.0
                && !s.text.trim().is_empty()
        })
        .collect();

    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut rows: Vec<(BBox, Vec<Span>)> = Vec::new();
    for span in spans {
        match rows.last_mut() {
            Some((row_box, row_spans)) if shares_row(row_box, &span.bbox, config) => {
                *row_box = row_box.union(&span.bbox);
                row_spans.push(span);
            }
            _ => rows.push((span.bbox, vec![span])),
        }
    }

    rows.into_iter()
        .flat_map(|(_, row_spans)| split_row(row_spans, config))
        .filter_map(Line::from_spans)
        .collect()
}

fn shares_row(row: &BBox, span: &BBox, config: &OutlineConfig) -> bool {
    let overlap = row.vertical_overlap(span);
    let min_height = row.height().min(span.height());
    overlap > 0.0 && overlap >= config.row_overlap_ratio * min_height
}

/// Split one visual row into separate lines at wide horizontal gaps.
fn split_row(mut spans: Vec<Span>, config: &OutlineConfig) -> Vec<Vec<Span>> {
    spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

    let mut groups: Vec<Vec<Span>> = Vec::new();
    let mut right_edge = f32::NEG_INFINITY;

    for span in spans {
        let tolerance = config.span_gap_ratio * span.font_size;
        let gap = span.bbox.x0 - right_edge;

        match groups.last_mut() {
            Some(group) if gap <= tolerance => {
                right_edge = right_edge.max(span.bbox.x1);
                group.push(span);
            }
            _ => {
                right_edge = span.bbox.x1;
                groups.push(vec![span]);
            }
        }
    }

    groups
}
