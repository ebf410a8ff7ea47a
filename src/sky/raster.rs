use crate::braille::BrailleCanvas;
use glam::DVec2;
use skyproj::tessellate::VertexArray;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Rasterise every segment of a tessellated line buffer.
///
/// Segments are clipped to a box one dot larger than the canvas first, so
/// Bresenham never walks invisible dots and far segments keep their slope.
pub fn draw_vertex_array(canvas: &mut BrailleCanvas, array: &VertexArray) {
    let (w, h) = canvas.dots();
    let min = DVec2::splat(-1.0);
    let max = DVec2::new(w as f64, h as f64);
    for (a, b) in array.topology.segments(array.len()) {
        let (p, q) = (array.vertices[a], array.vertices[b]);
        if !(p.is_finite() && q.is_finite()) {
            continue;
        }
        if let Some((p, q)) = clip_segment(p, q, min, max) {
            draw_line(
                canvas,
                p.x.round() as i32,
                p.y.round() as i32,
                q.x.round() as i32,
                q.y.round() as i32,
            );
        }
    }
}

/// Draw a point marker (small cross)
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set(x + i, y);
        canvas.set(x, y + i);
    }
}

/// Liang-Barsky clip of the segment `p`-`q` against the box `[min, max]`.
fn clip_segment(p: DVec2, q: DVec2, min: DVec2, max: DVec2) -> Option<(DVec2, DVec2)> {
    let d = q - p;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (dir, dist) in [
        (-d.x, p.x - min.x),
        (d.x, max.x - p.x),
        (-d.y, p.y - min.y),
        (d.y, max.y - p.y),
    ] {
        if dir == 0.0 {
            // Parallel to this edge: inside or out for the whole length
            if dist < 0.0 {
                return None;
            }
        } else if dir < 0.0 {
            t0 = t0.max(dist / dir);
        } else {
            t1 = t1.min(dist / dir);
        }
    }
    (t0 <= t1).then(|| (p + d * t0, p + d * t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyproj::tessellate::Topology;

    fn dots(canvas: &BrailleCanvas) -> usize {
        canvas
            .rows()
            .flat_map(|r| r.chars().collect::<Vec<_>>())
            .map(|c| (c as u32 - 0x2800).count_ones() as usize)
            .sum()
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.row(0), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(dots(&canvas), 8);
    }

    #[test]
    fn test_strip_and_loop() {
        let square = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(7.0, 0.0),
            DVec2::new(7.0, 7.0),
            DVec2::new(0.0, 7.0),
        ];
        let mut open = BrailleCanvas::new(4, 2);
        draw_vertex_array(&mut open, &VertexArray::line_strip(square.clone()));
        let mut closed = BrailleCanvas::new(4, 2);
        draw_vertex_array(
            &mut closed,
            &VertexArray {
                topology: Topology::LineLoop,
                vertices: square,
            },
        );
        assert_eq!(dots(&open), 22);
        assert_eq!(dots(&closed), 28);
    }

    #[test]
    fn test_far_segments_are_clipped() {
        let mut canvas = BrailleCanvas::new(2, 2);
        let line = VertexArray::line_strip(vec![DVec2::new(-1e12, 2.0), DVec2::new(1e12, 2.0)]);
        draw_vertex_array(&mut canvas, &line);
        assert_eq!(dots(&canvas), 4);
    }

    #[test]
    fn test_far_diagonal_keeps_its_slope() {
        // y = 3x - 7 enters the clip box at (2, -1) and leaves at (9, 20)
        let mut clipped = BrailleCanvas::new(10, 5);
        let line = VertexArray::line_strip(vec![
            DVec2::new(-1e6, -3e6 - 7.0),
            DVec2::new(1e6, 3e6 - 7.0),
        ]);
        draw_vertex_array(&mut clipped, &line);

        let mut expected = BrailleCanvas::new(10, 5);
        draw_line(&mut expected, 2, -1, 9, 20);
        assert!(!expected.is_blank());
        assert_eq!(clipped.rows().collect::<Vec<_>>(), expected.rows().collect::<Vec<_>>());
    }

    #[test]
    fn test_segment_outside_canvas_draws_nothing() {
        let mut canvas = BrailleCanvas::new(4, 2);
        let lines = [
            VertexArray::line_strip(vec![DVec2::new(-1e12, -5.0), DVec2::new(1e12, -5.0)]),
            VertexArray::line_strip(vec![DVec2::new(-50.0, 40.0), DVec2::new(40.0, -50.0)]),
        ];
        for line in &lines {
            draw_vertex_array(&mut canvas, line);
        }
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_clip_segment() {
        let (min, max) = (DVec2::ZERO, DVec2::splat(10.0));
        let (p, q) = clip_segment(DVec2::new(-10.0, 5.0), DVec2::new(20.0, 5.0), min, max).unwrap();
        assert_eq!((p, q), (DVec2::new(0.0, 5.0), DVec2::new(10.0, 5.0)));
        let inside = (DVec2::new(2.0, 3.0), DVec2::new(4.0, 8.0));
        assert_eq!(clip_segment(inside.0, inside.1, min, max), Some(inside));
        assert_eq!(clip_segment(DVec2::new(11.0, 0.0), DVec2::new(11.0, 10.0), min, max), None);
    }
}
