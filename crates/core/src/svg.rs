//! SVG renderer: positioned rectangles into one self-contained,
//! interactive document.
//!
//! The emitted SVG embeds its own ECMAScript for hover details,
//! click-zoom with breadcrumb ancestors, reset, and regexp search with an
//! aggregate matched percentage. Rendering is deterministic: identical
//! rects and options produce byte-identical output, and nothing
//! time-dependent is embedded unless the caller puts it in `subtitle`.

use std::fmt::Write as _;

use flamefold_protocol::FrameRect;

use crate::color::fill_for;
use crate::options::FlameOptions;

const HEADER: f64 = 42.0;
const SUBTITLE_EXTRA: f64 = 18.0;
const FOOTER: f64 = 28.0;
const LABEL_PAD: f64 = 3.0;
/// Approximate advance width of one glyph relative to the font size.
const GLYPH_RATIO: f64 = 0.59;
/// Below this many characters of room, omit the label entirely.
const MIN_LABEL_CHARS: f64 = 3.0;

/// Render positioned rects as a complete SVG document string.
///
/// `root_total` is the sample count of the synthetic root; zero renders a
/// placeholder document rather than failing.
pub fn render_svg(rects: &[FrameRect], root_total: u64, opts: &FlameOptions) -> String {
    let header = HEADER + opts.subtitle.as_ref().map_or(0.0, |_| SUBTITLE_EXTRA);
    let rows = rects.iter().map(|r| r.depth).max().unwrap_or(0) + 1;
    let height = opts
        .height
        .unwrap_or(header + f64::from(rows) * opts.frame_height + FOOTER);
    let width = opts.width;

    let mut svg = String::with_capacity(rects.len() * 256 + 8 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.0} {height:.0}" width="{width:.0}" height="{height:.0}" data-search-color="{}" onload="init(evt)">"#,
        escape_xml(&opts.search_color),
    );

    let _ = write!(
        svg,
        "<style>text{{font-family:system-ui,-apple-system,sans-serif;font-size:{fs:.0}px;fill:#1a1a2e}}\
         .title{{font-size:{ts:.0}px;font-weight:600}}\
         .subtitle{{fill:#666677}}\
         .button{{fill:#457b9d;cursor:pointer}}\
         .frame rect{{stroke:#f8f9fa;stroke-width:0.4}}\
         .frame:hover rect{{stroke:#1a1a2e;stroke-width:0.8}}\
         .frame text{{pointer-events:none}}</style>",
        fs = opts.font_size,
        ts = opts.font_size + 5.0,
    );

    svg.push_str("<script type=\"ecmascript\"><![CDATA[\n");
    svg.push_str(INTERACTION_JS);
    svg.push_str("]]></script>");

    let _ = write!(
        svg,
        r##"<rect width="{width:.0}" height="{height:.0}" fill="#f8f9fa"/>"##,
    );

    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="24" text-anchor="middle" class="title">{}</text>"#,
        width / 2.0,
        escape_xml(&opts.title),
    );
    if let Some(subtitle) = &opts.subtitle {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="42" text-anchor="middle" class="subtitle">{}</text>"#,
            width / 2.0,
            escape_xml(subtitle),
        );
    }
    let _ = write!(
        svg,
        r#"<text id="unzoom" x="10" y="24" class="button" style="display:none" onclick="unzoom()">Reset Zoom</text>"#,
    );
    let _ = write!(
        svg,
        r#"<text id="search" x="{:.1}" y="24" text-anchor="end" class="button" onclick="search()">Search</text>"#,
        width - 10.0,
    );

    if root_total == 0 {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="subtitle">no stack samples</text>"#,
            width / 2.0,
            height / 2.0,
        );
    } else {
        for rect in rects {
            push_frame(&mut svg, rect, root_total, header, height, opts);
        }
    }

    let _ = write!(
        svg,
        r#"<text id="details" x="10" y="{y:.1}"> </text><text id="matched" x="{mx:.1}" y="{y:.1}" text-anchor="end"> </text>"#,
        y = height - 9.0,
        mx = width - 10.0,
    );

    svg.push_str("</svg>");
    svg
}

fn push_frame(
    svg: &mut String,
    rect: &FrameRect,
    root_total: u64,
    header: f64,
    height: f64,
    opts: &FlameOptions,
) {
    // Flame grows upward from the bottom; icicle hangs from the top.
    let y = if opts.inverted {
        header + f64::from(rect.depth) * opts.frame_height
    } else {
        height - FOOTER - f64::from(rect.depth + 1) * opts.frame_height
    };
    let h = opts.frame_height - 1.0;
    let fill = fill_for(rect, opts.color_mode);

    let _ = write!(
        svg,
        r#"<g class="frame" data-depth="{}" onmouseover="s(this)" onmouseout="c()" onclick="zoom(this)"><title>{} ({} samples, {:.2}%)</title>"#,
        rect.depth,
        escape_xml(&rect.path),
        format_count(rect.total_count),
        rect.percent(root_total),
    );
    let _ = write!(
        svg,
        r#"<rect x="{:.2}" y="{y:.2}" width="{:.2}" height="{h:.2}" fill="{fill}" rx="1"/>"#,
        rect.x, rect.width,
    );

    if !rect.elided
        && let Some(label) = fit_label(rect.name.display(), rect.width, opts.font_size)
    {
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
            rect.x + LABEL_PAD,
            y + h * 0.75,
            escape_xml(&label),
        );
    }
    svg.push_str("</g>");
}

/// Truncate `name` to what fits in `width` pixels, or `None` when even a
/// few characters would not fit. The rect stays hoverable either way.
fn fit_label(name: &str, width: f64, font_size: f64) -> Option<String> {
    let capacity = (width - 2.0 * LABEL_PAD) / (font_size * GLYPH_RATIO);
    if capacity < MIN_LABEL_CHARS {
        return None;
    }
    let chars = name.chars().count();
    if chars as f64 <= capacity {
        return Some(name.to_string());
    }
    let keep = (capacity as usize).saturating_sub(1);
    let truncated: String = name.chars().take(keep).collect();
    Some(format!("{truncated}…"))
}

fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Embedded viewer logic. Reads frame geometry back from the DOM, so the
/// markup stays the single source of truth and the script needs no
/// per-document substitution.
const INTERACTION_JS: &str = r#"
var svgRoot, detailsEl, matchedEl, unzoomEl, frames = [], canvasW = 0;
function init(evt) {
    var doc = evt && evt.target ? evt.target.ownerDocument : document;
    svgRoot = doc.documentElement;
    detailsEl = doc.getElementById('details');
    matchedEl = doc.getElementById('matched');
    unzoomEl = doc.getElementById('unzoom');
    canvasW = parseFloat(svgRoot.getAttribute('width'));
    var gs = doc.getElementsByClassName('frame');
    for (var i = 0; i < gs.length; i++) {
        var g = gs[i];
        var r = g.getElementsByTagName('rect')[0];
        var t = g.getElementsByTagName('text')[0] || null;
        frames.push({
            g: g, rect: r, text: t,
            x: parseFloat(r.getAttribute('x')),
            w: parseFloat(r.getAttribute('width')),
            depth: parseInt(g.getAttribute('data-depth'), 10),
            fill: r.getAttribute('fill')
        });
    }
}
function titleOf(g) {
    var t = g.getElementsByTagName('title')[0];
    return t ? t.textContent : '';
}
function pathOf(g) {
    var t = titleOf(g);
    var cut = t.lastIndexOf(' (');
    return cut >= 0 ? t.substring(0, cut) : t;
}
function s(g) { if (detailsEl) detailsEl.textContent = titleOf(g); }
function c() { if (detailsEl) detailsEl.textContent = ' '; }
function frameOf(g) {
    for (var i = 0; i < frames.length; i++) {
        if (frames[i].g === g) return frames[i];
    }
    return null;
}
function zoom(g) {
    var f = frameOf(g);
    if (!f || f.w <= 0) return;
    var eps = 1e-6;
    for (var i = 0; i < frames.length; i++) {
        var fr = frames[i];
        var nx, nw, crumb = false;
        if (fr.depth >= f.depth && fr.x >= f.x - eps && fr.x + fr.w <= f.x + f.w + eps) {
            nx = (fr.x - f.x) * canvasW / f.w;
            nw = fr.w * canvasW / f.w;
        } else if (fr.depth < f.depth && fr.x <= f.x + eps && fr.x + fr.w >= f.x + f.w - eps) {
            nx = 0; nw = canvasW; crumb = true;
        } else {
            fr.g.style.display = 'none';
            continue;
        }
        fr.g.style.display = '';
        fr.g.setAttribute('opacity', crumb ? '0.5' : '1');
        fr.rect.setAttribute('x', nx);
        fr.rect.setAttribute('width', nw);
        if (fr.text) {
            fr.text.setAttribute('x', nx + 3);
            fr.text.style.display = nw < 35 ? 'none' : '';
        }
    }
    if (unzoomEl) unzoomEl.style.display = '';
}
function unzoom() {
    for (var i = 0; i < frames.length; i++) {
        var fr = frames[i];
        fr.g.style.display = '';
        fr.g.setAttribute('opacity', '1');
        fr.rect.setAttribute('x', fr.x);
        fr.rect.setAttribute('width', fr.w);
        if (fr.text) {
            fr.text.setAttribute('x', fr.x + 3);
            fr.text.style.display = '';
        }
    }
    if (unzoomEl) unzoomEl.style.display = 'none';
}
function clearSearch() {
    for (var i = 0; i < frames.length; i++) {
        frames[i].rect.setAttribute('fill', frames[i].fill);
    }
    if (matchedEl) matchedEl.textContent = ' ';
}
function search() {
    var pattern = prompt('Search (regexp)', '');
    if (pattern === null) return;
    clearSearch();
    if (pattern === '') return;
    var re;
    try { re = new RegExp(pattern); } catch (e) { return; }
    var color = svgRoot.getAttribute('data-search-color');
    var hits = [];
    for (var i = 0; i < frames.length; i++) {
        var fr = frames[i];
        if (fr.depth > 0 && re.test(pathOf(fr.g))) {
            fr.rect.setAttribute('fill', color);
            hits.push([fr.x, fr.x + fr.w]);
        }
    }
    // Sum matched canvas coverage without double-counting nested matches.
    hits.sort(function (a, b) { return a[0] - b[0]; });
    var covered = 0, end = -1;
    for (var j = 0; j < hits.length; j++) {
        var lo = Math.max(hits[j][0], end);
        if (hits[j][1] > lo) { covered += hits[j][1] - lo; end = hits[j][1]; }
    }
    if (matchedEl) {
        matchedEl.textContent = canvasW > 0
            ? 'Matched: ' + (covered * 100 / canvasW).toFixed(1) + '%'
            : ' ';
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CallTree;
    use crate::model::FoldedStacks;
    use crate::views::flame::layout_flame;
    use flamefold_protocol::FrameName;

    fn rects_for(paths: &[(&str, u64)], opts: &FlameOptions) -> (Vec<FrameRect>, u64) {
        let mut s = FoldedStacks::new();
        for (path, count) in paths {
            s.add(path.split(';').map(FrameName::from).collect(), *count);
        }
        let tree = CallTree::build(&s).unwrap();
        let rects = layout_flame(&tree, opts).unwrap();
        (rects, tree.root.total_count)
    }

    #[test]
    fn document_shape() {
        let opts = FlameOptions::default();
        let (rects, total) = rects_for(&[("main;foo;bar", 2), ("main;baz", 1)], &opts);
        let svg = render_svg(&rects, total, &opts);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>all;main;foo;bar (2 samples, 66.67%)</title>"));
        assert!(svg.contains("Reset Zoom"));
        assert!(svg.contains("function zoom"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let opts = FlameOptions::default();
        let (rects, total) = rects_for(&[("main;a", 3), ("main;b;c", 2)], &opts);
        let first = render_svg(&rects, total, &opts);
        let second = render_svg(&rects, total, &opts);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_samples_renders_placeholder() {
        let opts = FlameOptions::default();
        let (rects, total) = rects_for(&[], &opts);
        let svg = render_svg(&rects, total, &opts);
        assert!(svg.contains("no stack samples"));
        assert!(!svg.contains("class=\"frame\""));
    }

    #[test]
    fn escapes_markup_in_frame_names() {
        let opts = FlameOptions::default();
        let (rects, total) = rects_for(&[("main;Vec<T>::push", 1)], &opts);
        let svg = render_svg(&rects, total, &opts);
        assert!(svg.contains("Vec&lt;T&gt;::push"));
        assert!(!svg.contains("Vec<T>"));
    }

    #[test]
    fn elided_rects_get_no_label() {
        let opts = FlameOptions {
            width: 100.0,
            min_width: 2.0,
            ..FlameOptions::default()
        };
        let (rects, total) = rects_for(&[("m;big", 999), ("m;needle_fn", 1)], &opts);
        let svg = render_svg(&rects, total, &opts);
        // Hover title still carries the narrow frame.
        assert!(svg.contains("all;m;needle_fn"));
        // But no visible label was drawn for it.
        assert!(!svg.contains(">needle_fn</text>"));
    }

    #[test]
    fn icicle_puts_root_row_on_top() {
        let flame = FlameOptions::default();
        let icicle = FlameOptions {
            inverted: true,
            ..FlameOptions::default()
        };
        let (rects, total) = rects_for(&[("main;leaf", 1)], &flame);
        let up = render_svg(&rects, total, &flame);
        let down = render_svg(&rects, total, &icicle);
        assert_ne!(up, down);
        // Icicle root row sits right under the header.
        assert!(down.contains(r#"y="42.00""#));
    }

    #[test]
    fn subtitle_is_opt_in() {
        let opts = FlameOptions::default();
        let (rects, total) = rects_for(&[("main", 1)], &opts);
        assert!(!render_svg(&rects, total, &opts).contains("subtitle\">"));

        let with = FlameOptions {
            subtitle: Some("60s @ 99Hz".to_string()),
            ..FlameOptions::default()
        };
        assert!(render_svg(&rects, total, &with).contains("60s @ 99Hz"));
    }

    #[test]
    fn label_fitting() {
        assert_eq!(fit_label("main", 200.0, 12.0), Some("main".to_string()));
        assert_eq!(fit_label("main", 10.0, 12.0), None);
        let truncated = fit_label("a_rather_long_symbol_name", 80.0, 12.0);
        let label = truncated.unwrap_or_default();
        assert!(label.ends_with('…'));
        assert!(label.chars().count() < "a_rather_long_symbol_name".len());
    }

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
