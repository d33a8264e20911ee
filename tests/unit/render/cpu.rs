use super::*;
use crate::scene::config::GradientShape;

fn style() -> CardStyle {
    CardStyle {
        branding: "verseart".to_owned(),
        branding_opacity: 0.6,
    }
}

fn config(width: u32, height: u32, text: &str) -> RenderConfig {
    RenderConfig {
        width,
        height,
        text: text.to_owned(),
        reference: "Psalm 46:10".to_owned(),
        version_label: "KJV".to_owned(),
        palette_colors: vec![Color::rgb(20, 30, 90), Color::rgb(200, 80, 40)],
        gradient_shape: GradientShape::Linear,
        text_color: Color::WHITE,
    }
}

fn pixel(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * surface.width() + x) * 4) as usize;
    let d = surface.data();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

#[test]
fn render_fills_surface_with_opaque_gradient() {
    let mut surface = Surface::new(120, 150).unwrap();
    let mut renderer = CardRenderer::default();
    let mut faces = FaceBook::default();
    let summary = renderer
        .render(
            &mut surface,
            &config(120, 150, "Be still, and know that I am God."),
            1.0,
            &mut faces,
            &style(),
        )
        .unwrap();

    assert_eq!((summary.width, summary.height), (120, 150));
    assert!(summary.fallback_glyphs);
    assert!(summary.lines >= 1);
    assert!(summary.font_size >= 120.0 * 0.05 && summary.font_size <= 120.0 * 0.12);
    assert!(surface.data().chunks_exact(4).all(|px| px[3] == 255));
    // Top-left corner is outside every text run and keeps the first stop's color.
    let corner = pixel(&surface, 0, 0);
    for (got, want) in corner.iter().zip([20u8, 30, 90, 255]) {
        assert!(got.abs_diff(want) <= 2, "corner {corner:?}");
    }
}

#[test]
fn text_is_drawn_over_the_gradient() {
    let cfg = config(200, 250, "Jesus wept.");
    let mut surface = Surface::new(200, 250).unwrap();
    CardRenderer::default()
        .render(&mut surface, &cfg, 1.0, &mut FaceBook::default(), &style())
        .unwrap();

    let bare = crate::render::gradient::composite_gradient(
        200,
        250,
        &cfg.palette_colors,
        cfg.gradient_shape,
    )
    .unwrap();
    assert_ne!(surface.data(), bare.as_slice());
}

#[test]
fn renders_are_deterministic() {
    let cfg = config(160, 200, "For God so loved the world");
    let mut a = Surface::new(160, 200).unwrap();
    let mut b = Surface::new(160, 200).unwrap();
    CardRenderer::default()
        .render(&mut a, &cfg, 1.0, &mut FaceBook::default(), &style())
        .unwrap();
    CardRenderer::default()
        .render(&mut b, &cfg, 1.0, &mut FaceBook::default(), &style())
        .unwrap();
    assert_eq!(a.data(), b.data());
}

#[test]
fn resizes_surface_to_requested_dimensions() {
    let mut surface = Surface::new(50, 50).unwrap();
    let mut renderer = CardRenderer::default();
    renderer
        .render(
            &mut surface,
            &config(90, 110, "Grace"),
            1.0,
            &mut FaceBook::default(),
            &style(),
        )
        .unwrap();
    assert_eq!((surface.width(), surface.height()), (90, 110));
}

#[test]
fn pixel_density_scales_backing_buffer() {
    let mut surface = Surface::new(100, 100).unwrap();
    let summary = CardRenderer::default()
        .render(
            &mut surface,
            &config(100, 125, "Grace"),
            1.5,
            &mut FaceBook::default(),
            &style(),
        )
        .unwrap();
    assert_eq!((summary.backing_width, summary.backing_height), (150, 188));
    assert_eq!((surface.width(), surface.height()), (150, 188));
    assert_eq!((summary.width, summary.height), (100, 125));
}

#[test]
fn failed_render_keeps_previous_frame() {
    let mut surface = Surface::new(80, 100).unwrap();
    let mut renderer = CardRenderer::default();
    let mut faces = FaceBook::default();
    renderer
        .render(&mut surface, &config(80, 100, "Amen"), 1.0, &mut faces, &style())
        .unwrap();
    let before = surface.data().to_vec();

    let mut bad = config(80, 100, "Amen");
    bad.palette_colors.clear();
    assert!(renderer
        .render(&mut surface, &bad, 1.0, &mut faces, &style())
        .is_err());
    assert_eq!(surface.data(), before.as_slice());
}

#[test]
fn backing_size_rounds_up_and_rejects_bad_density() {
    assert_eq!(backing_size(1080, 1350, 1.0).unwrap(), (1080, 1350));
    assert_eq!(backing_size(3, 3, 1.5).unwrap(), (5, 5));
    assert!(backing_size(10, 10, 0.0).is_err());
    assert!(backing_size(10, 10, f32::NAN).is_err());
    assert!(backing_size(60_000, 10, 2.0).is_err());
}
