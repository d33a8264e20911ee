use super::*;

fn px(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

#[test]
fn fills_every_pixel_for_many_sizes() {
    for (w, h) in [(1, 1), (1, 7), (7, 1), (13, 5), (64, 80)] {
        for shape in [GradientShape::Linear, GradientShape::Radial] {
            let buf = composite_gradient(w, h, &[RED, BLUE], shape).unwrap();
            assert_eq!(buf.len(), (w * h * 4) as usize);
            assert!(
                buf.chunks_exact(4).all(|p| p[3] == 255),
                "unfilled pixel at {w}x{h} {shape:?}"
            );
        }
    }
}

#[test]
fn identical_inputs_produce_identical_pixels() {
    let colors = [RED, Color::rgb(0, 255, 0), BLUE];
    let a = composite_gradient(33, 21, &colors, GradientShape::Radial).unwrap();
    let b = composite_gradient(33, 21, &colors, GradientShape::Radial).unwrap();
    assert_eq!(a, b);
}

#[test]
fn linear_runs_top_left_to_bottom_right() {
    let (w, h) = (100, 100);
    let buf = composite_gradient(w, h, &[RED, BLUE], GradientShape::Linear).unwrap();
    let tl = px(&buf, w, 0, 0);
    let br = px(&buf, w, w - 1, h - 1);
    assert!(tl[0] > 250 && tl[2] < 5, "top-left {tl:?}");
    assert!(br[2] > 250 && br[0] < 5, "bottom-right {br:?}");

    // Anti-diagonal pixels share the same projection.
    assert_eq!(px(&buf, w, w - 1, 0), px(&buf, w, 0, h - 1));
}

#[test]
fn three_stops_hit_middle_color_at_center_of_axis() {
    let (w, h) = (101, 101);
    let green = Color::rgb(0, 255, 0);
    let buf = composite_gradient(w, h, &[RED, green, BLUE], GradientShape::Linear).unwrap();
    let mid = px(&buf, w, 50, 50);
    assert_eq!(mid, [0, 255, 0, 255]);
}

#[test]
fn radial_center_is_first_stop_and_corners_move_toward_last() {
    let (w, h) = (101, 51);
    let buf = composite_gradient(w, h, &[RED, BLUE], GradientShape::Radial).unwrap();
    assert_eq!(px(&buf, w, 50, 25), [255, 0, 0, 255]);
    let corner = px(&buf, w, 0, 0);
    assert!(corner[2] > corner[0], "corner {corner:?}");
}

#[test]
fn translucent_stops_are_premultiplied() {
    let clear = Color::rgba(255, 255, 255, 0);
    let buf = composite_gradient(4, 4, &[clear, clear], GradientShape::Linear).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn rejects_short_palette_and_bad_buffers() {
    assert!(composite_gradient(4, 4, &[RED], GradientShape::Linear).is_err());
    let mut small = vec![0u8; 8];
    assert!(paint_gradient(&mut small, 4, 4, &[RED, BLUE], GradientShape::Linear).is_err());
}
