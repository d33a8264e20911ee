use super::*;
use crate::render::text::FallbackFace;

const VERSE: &str = "In the beginning was the Word, and the Word was with God, and the Word was God. ";

fn long_text(chars: usize) -> String {
    VERSE.repeat(chars / VERSE.len() + 1).chars().take(chars).collect()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn geometry_reserves_bands_and_padding() {
    let g = CardGeometry::new(1000, 2000);
    assert!(approx(g.body_top, 300.0));
    assert!(approx(g.body_height, 1200.0));
    assert!(approx(g.body_bottom(), 1500.0));
    assert!(approx(g.safe_left, 100.0));
    assert!(approx(g.safe_width, 800.0));
    assert!(approx(g.max_font, 120.0));
    assert!(approx(g.min_font, 50.0));
}

#[test]
fn empty_text_yields_zero_lines_without_error() {
    let g = CardGeometry::new(1080, 1350);
    let layout = fit_text(&mut FallbackFace, &g, "").unwrap();
    assert!(layout.lines.is_empty());
    assert_eq!(layout.block_height(), 0.0);

    let layout = fit_text(&mut FallbackFace, &g, "  \n\t ").unwrap();
    assert!(layout.lines.is_empty());
}

#[test]
fn one_line_text_keeps_maximum_size() {
    let g = CardGeometry::new(1080, 1350);
    let layout = fit_text(&mut FallbackFace, &g, "Jesus wept.").unwrap();
    assert_eq!(layout.lines, vec!["Jesus wept.".to_owned()]);
    assert_eq!(layout.font_size, g.max_font);
    assert!((layout.line_height - g.max_font * 1.4).abs() < 1e-3);
}

#[test]
fn long_text_never_goes_below_minimum() {
    let g = CardGeometry::new(1080, 1350);
    let layout = fit_text(&mut FallbackFace, &g, &long_text(5_000)).unwrap();
    assert_eq!(layout.font_size, g.min_font);
    // Accepted even though it overflows the band.
    assert!(layout.block_height() > g.body_height);
}

#[test]
fn five_hundred_chars_fit_at_or_above_minimum_within_safe_width() {
    let g = CardGeometry::new(1080, 1350);
    let text = long_text(500);
    let layout = fit_text(&mut FallbackFace, &g, &text).unwrap();
    assert!(layout.font_size >= g.min_font);
    assert!(layout.font_size <= g.max_font);
    for line in &layout.lines {
        let w = FallbackFace.measure(line, layout.font_size).unwrap().width;
        assert!(w <= g.safe_width, "line {line:?} is {w}px wide");
    }
}

#[test]
fn chosen_size_is_a_step_from_max_or_the_floor() {
    let g = CardGeometry::new(1080, 1350);
    let text = long_text(200);
    let layout = fit_text(&mut FallbackFace, &g, &text).unwrap();
    let steps = (g.max_font - layout.font_size) / FONT_STEP_PX;
    assert!(
        (steps - steps.round()).abs() < 1e-3 || layout.font_size == g.min_font,
        "font size {} is off the step grid",
        layout.font_size
    );
    assert!(layout.block_height() <= g.body_height || layout.font_size == g.min_font);

    // The next size up would not have fit.
    if layout.font_size < g.max_font && layout.font_size > g.min_font {
        let bigger = layout.font_size + FONT_STEP_PX;
        let lines = wrap_words(&mut FallbackFace, &text, bigger, g.safe_width).unwrap();
        assert!(lines.len() as f32 * bigger * LINE_HEIGHT_FACTOR > g.body_height);
    }
}

#[test]
fn wrapping_is_idempotent() {
    let text = long_text(400);
    let a = wrap_words(&mut FallbackFace, &text, 40.0, 500.0).unwrap();
    let b = wrap_words(&mut FallbackFace, &text, 40.0, 500.0).unwrap();
    assert_eq!(a, b);
    assert!(a.len() > 1);
}

#[test]
fn wrapping_preserves_words_in_order() {
    let text = long_text(400);
    let lines = wrap_words(&mut FallbackFace, &text, 40.0, 500.0).unwrap();
    let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
    let original: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(rejoined, original);
}

#[test]
fn oversized_word_gets_its_own_unbroken_line() {
    let word = "Mahershalalhashbaz";
    let text = format!("a {word} b");
    let lines = wrap_words(&mut FallbackFace, &text, 20.0, 60.0).unwrap();
    assert_eq!(lines, vec!["a", word, "b"]);
}

#[test]
fn unicode_wraps_by_measured_width() {
    // Each word is four full-width glyphs: 4 em wide.
    let text = "神爱世人 神爱世人 神爱世人";
    // 10px font: a word is 40px, "word word" is 40 + 2.5 + 40 = 82.5px.
    let lines = wrap_words(&mut FallbackFace, text, 10.0, 85.0).unwrap();
    assert_eq!(lines, vec!["神爱世人 神爱世人", "神爱世人"]);

    // Same char count in ASCII is narrower and fits on one line.
    let ascii = "abcd abcd abcd";
    let lines = wrap_words(&mut FallbackFace, ascii, 10.0, 85.0).unwrap();
    assert_eq!(lines.len(), 1);
}

#[test]
fn hard_breaks_start_new_lines() {
    let lines = wrap_words(&mut FallbackFace, "Be still\n\nand know", 10.0, 1_000.0).unwrap();
    assert_eq!(lines, vec!["Be still", "", "and know"]);
}

#[test]
fn plan_places_runs_without_overlap() {
    let g = CardGeometry::new(1080, 1350);
    let plan = plan_card(
        &mut FallbackFace,
        &g,
        "For God so loved the world...",
        "John 3:16",
        "NIV",
        "made with verseart",
    )
    .unwrap();

    assert!(!plan.body_lines.is_empty());
    let first = &plan.body_lines[0];
    let last = plan.body_lines.last().unwrap();
    assert!(first.y >= g.body_top);
    assert!(last.bottom() <= g.body_bottom());

    let reference = plan.reference.as_ref().unwrap();
    let version = plan.version_label.as_ref().unwrap();
    let branding = plan.branding.as_ref().unwrap();
    assert_eq!(reference.weight, FontWeight::Bold);
    assert!((reference.size_px - 1080.0 * 0.06).abs() < 1e-3);
    assert!((version.size_px - 1080.0 * 0.035).abs() < 1e-3);
    assert!((branding.size_px - 1080.0 * 0.03).abs() < 1e-3);

    assert!(reference.y >= g.body_bottom());
    assert_eq!(version.y, reference.bottom());
    assert!(branding.y >= version.bottom());
    assert!(branding.bottom() <= g.height);

    for run in plan.runs() {
        let center = run.x + run.width * 0.5;
        assert!((center - g.width * 0.5).abs() < 1e-2, "{run:?} is not centered");
    }
}

#[test]
fn plan_body_block_is_vertically_centered() {
    let g = CardGeometry::new(1080, 1350);
    let plan = plan_card(&mut FallbackFace, &g, &long_text(200), "", "", "").unwrap();
    let lh = plan.body.line_height;
    assert!(plan.body_lines.len() > 1);

    let first = &plan.body_lines[0];
    let last = plan.body_lines.last().unwrap();
    let block_top = first.y - (lh - first.height) * 0.5;
    let block_bottom = last.y - (lh - last.height) * 0.5 + lh;
    let above = block_top - g.body_top;
    let below = g.body_bottom() - block_bottom;
    assert!((above - below).abs() < 1e-2, "above {above} below {below}");

    assert!(plan.reference.is_none());
    assert!(plan.version_label.is_none());
    assert!(plan.branding.is_none());
}
