use super::*;

#[test]
fn fallback_width_scales_linearly_with_size() {
    let mut face = FallbackFace;
    let a = face.measure("Grace and peace", 10.0).unwrap();
    let b = face.measure("Grace and peace", 20.0).unwrap();
    assert!((b.width - 2.0 * a.width).abs() < 1e-3);
    assert!((b.height - 24.0).abs() < 1e-3);
}

#[test]
fn fallback_measures_glyphs_not_bytes() {
    let mut face = FallbackFace;
    // Four CJK ideographs are 12 UTF-8 bytes but four full-width glyphs.
    let cjk = face.measure("神爱世人", 10.0).unwrap();
    assert!((cjk.width - 40.0).abs() < 1e-3);

    // Combining acute adds no advance.
    let composed = face.measure("e\u{301}", 10.0).unwrap();
    let bare = face.measure("e", 10.0).unwrap();
    assert_eq!(composed.width, bare.width);

    // Narrow glyphs are narrower than wide ones at equal char count.
    let narrow = face.measure("iiii", 10.0).unwrap();
    let wide = face.measure("MMMM", 10.0).unwrap();
    assert!(narrow.width < wide.width);
}

#[test]
fn fallback_rejects_bad_sizes() {
    let mut face = FallbackFace;
    assert!(face.measure("x", 0.0).is_err());
    assert!(face.measure("x", f32::NAN).is_err());
}

#[test]
fn empty_text_has_zero_width() {
    let mut face = FallbackFace;
    assert_eq!(face.measure("", 12.0).unwrap().width, 0.0);
}

#[test]
fn fallback_draw_paints_text_color() {
    let mut ctx = vello_cpu::RenderContext::new(64, 32);
    let mut face = FallbackFace;
    let style = TextStyle {
        size_px: 24.0,
        weight: FontWeight::Bold,
        color: Color::rgb(255, 0, 0),
    };
    face.draw(&mut ctx, "HI", &style, vello_cpu::kurbo::Affine::IDENTITY)
        .unwrap();
    let mut pixmap = vello_cpu::Pixmap::new(64, 32);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    let data = pixmap.data_as_u8_slice();
    assert!(data.chunks_exact(4).any(|p| p[0] > 200 && p[3] > 200));
    assert!(data.chunks_exact(4).all(|p| p[1] == 0 && p[2] == 0));
}

#[test]
fn face_book_without_fonts_uses_fallback_for_every_weight() {
    let mut book = FaceBook::default();
    assert!(!book.has_loaded_fonts());
    let a = book
        .face_mut(FontWeight::Regular)
        .measure("John 3:16", 10.0)
        .unwrap();
    let b = book
        .face_mut(FontWeight::Bold)
        .measure("John 3:16", 10.0)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn face_book_ignores_invalid_font_bytes() {
    let mut book = FaceBook::default();
    book.install(LoadedFonts {
        regular: Some(Arc::new(b"garbage".to_vec())),
        bold: None,
    });
    assert!(!book.has_loaded_fonts());
}

fn dejavu() -> Arc<Vec<u8>> {
    Arc::new(std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap())
}

/// Horizontal and vertical extent of pixels with any coverage.
fn lit_bounds(pixmap: &vello_cpu::Pixmap) -> Option<(u32, u32, u32, u32)> {
    let w = u32::from(pixmap.width());
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in pixmap.data_as_u8_slice().chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let (x, y) = (i as u32 % w, i as u32 / w);
        bounds = Some(match bounds {
            None => (x, x, y, y),
            Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        });
    }
    bounds
}

#[test]
fn loaded_face_lays_glyphs_out_along_the_line() {
    let mut face = ParleyFace::new(&dejavu()).unwrap();
    let text = "WWWWW MMMMM";
    let extent = face.measure(text, 48.0).unwrap();
    assert!(extent.width > 48.0 * 5.0, "measured {extent:?}");

    let mut ctx = vello_cpu::RenderContext::new(500, 120);
    let style = TextStyle {
        size_px: 48.0,
        weight: FontWeight::Regular,
        color: Color::WHITE,
    };
    let origin = vello_cpu::kurbo::Affine::translate((20.0, 30.0));
    face.draw(&mut ctx, text, &style, origin).unwrap();
    let mut pixmap = vello_cpu::Pixmap::new(500, 120);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let (x0, x1, y0, y1) = lit_bounds(&pixmap).expect("glyphs were drawn");
    let span = (x1 - x0 + 1) as f32;
    assert!(
        span > extent.width * 0.8 && span <= extent.width + 4.0,
        "lit span {span} vs measured {}",
        extent.width
    );
    // Glyphs sit inside the line box below the origin, not above it.
    assert!(x0 >= 20 && x0 < 30, "x0 = {x0}");
    assert!(y0 >= 30, "y0 = {y0}");
    assert!((y1 as f32) <= 30.0 + extent.height, "y1 = {y1}");
}

#[test]
fn face_book_installs_valid_font() {
    let mut book = FaceBook::default();
    book.install(LoadedFonts {
        regular: Some(dejavu()),
        bold: None,
    });
    assert!(book.has_loaded_fonts());
    let fallback = FallbackFace.measure("Grace", 20.0).unwrap();
    let loaded = book
        .face_mut(FontWeight::Bold)
        .measure("Grace", 20.0)
        .unwrap();
    assert!(loaded.width > 0.0);
    assert_ne!(loaded, fallback);
}
