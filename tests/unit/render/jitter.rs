use super::*;

fn params() -> PosterJitter {
    PosterJitter {
        chance: 1.0,
        max_offset_x: 20.0,
        max_offset_y: 30.0,
        max_scale_pct: 0.15,
        vertical_bias_chance: 0.5,
        vertical_bias_multiplier: 1.8,
    }
}

#[test]
fn same_seed_same_plan() {
    let p = params();
    for seed in ["1:vhs-classic", "42:black-case-front", "x"] {
        let a = JitterPlan::compute(Some(&p), Some(seed), ScaleFactors::ONE);
        let b = JitterPlan::compute(Some(&p), Some(seed), ScaleFactors::ONE);
        assert_eq!(a, b);
    }
}

#[test]
fn no_seed_means_no_jitter() {
    let p = params();
    assert_eq!(
        JitterPlan::compute(Some(&p), None, ScaleFactors::ONE),
        JitterPlan::NONE
    );
    assert_eq!(
        JitterPlan::compute(None, Some("seed"), ScaleFactors::ONE),
        JitterPlan::NONE
    );
}

#[test]
fn zero_chance_never_activates() {
    let mut p = params();
    p.chance = 0.0;
    for i in 0..200 {
        let plan = JitterPlan::compute(Some(&p), Some(&format!("s{i}")), ScaleFactors::ONE);
        assert_eq!(plan, JitterPlan::NONE);
    }
}

#[test]
fn offsets_and_zoom_respect_bounds() {
    let p = params();
    let scale = ScaleFactors { sx: 0.5, sy: 2.0 };
    let mut saw_bias = false;
    let mut saw_plain = false;
    for i in 0..500 {
        let plan = JitterPlan::compute(Some(&p), Some(&format!("movie-{i}")), scale);
        assert!(plan.active);
        let (bx, by, floor): (f64, f64, f64) = if plan.vertical_bias {
            saw_bias = true;
            (
                20.0 * 0.5 * VERTICAL_BIAS_X_FACTOR,
                30.0 * 2.0 * 1.8,
                VERTICAL_BIAS_SCALE_FLOOR,
            )
        } else {
            saw_plain = true;
            (20.0 * 0.5, 30.0 * 2.0, 0.0)
        };
        assert!(plan.offset_x.abs() as f64 <= bx.round());
        assert!(plan.offset_y.abs() as f64 <= by.round());
        assert!(plan.scale >= 1.0 + 0.15 * floor - 1e-12);
        assert!(plan.scale <= 1.15 + 1e-12);
    }
    assert!(saw_bias && saw_plain);
}
