use super::*;
use crate::template::registry::TemplateRegistry;

#[test]
fn native_size_is_identity() {
    let reg = TemplateRegistry::builtin();
    for t in reg.templates() {
        let g = CanvasGeometry::for_template(t, Some(t.output));
        assert_eq!(g.scale, ScaleFactors::ONE);
        assert_eq!(g.poster, t.poster);
        for layer in t.underlays.iter().chain(&t.overlays) {
            assert_eq!(g.layer_rect(layer, t.output), layer.rect_in(t.output));
        }
        assert_eq!(CanvasGeometry::for_template(t, None), g);
    }
}

#[test]
fn axes_scale_independently() {
    let reg = TemplateRegistry::builtin();
    let t = reg.default_template();
    // 600x1000 -> 300x2000
    let g = CanvasGeometry::for_template(t, Some(Size::new(300, 2000)));
    assert_eq!(g.scale, ScaleFactors { sx: 0.5, sy: 2.0 });
    assert_eq!(g.poster, PxRect::new(20, 240, 260, 1520));
}

#[test]
fn placement_without_jitter_is_exact_slot() {
    let p = PosterPlacement::compute(Size::new(100, 150), &JitterPlan::NONE);
    assert_eq!(p.render, Size::new(100, 150));
    assert_eq!((p.extract_left, p.extract_top), (0, 0));
}

#[test]
fn placement_pads_for_offsets_and_zoom() {
    let plan = JitterPlan {
        active: true,
        vertical_bias: false,
        offset_x: 6,
        offset_y: -4,
        scale: 1.1,
    };
    let p = PosterPlacement::compute(Size::new(100, 150), &plan);
    assert_eq!(p.render, Size::new(110 + 12, 165 + 8));
    // centered (11, 12) shifted against the offset.
    assert_eq!(p.extract_left, 11 - 6);
    assert_eq!(p.extract_top, 12 + 4);
}

#[test]
fn extraction_is_clamped_inside_render() {
    assert_eq!(window_start(120, 100, 50), 0);
    assert_eq!(window_start(120, 100, -50), 20);
    assert_eq!(window_start(100, 100, 7), 0);
}
