use super::*;

fn t(c: [f64; 6]) -> Transform {
    Transform::from_coeffs(c)
}

#[test]
fn compose_applies_inner_first() {
    let outer = Transform::translate((10.0, 0.0));
    let inner = Transform::scale(2.0, 2.0);
    let p = Transform::compose(outer, inner).apply(Point::new(1.0, 1.0));
    assert_eq!(p, Point::new(12.0, 2.0));

    let q = Transform::compose(inner, outer).apply(Point::new(1.0, 1.0));
    assert_eq!(q, Point::new(22.0, 2.0));
}

#[test]
fn compose_is_associative() {
    let a = t([2.0, 0.5, -0.25, 1.5, 3.0, -7.0]);
    let b = t([0.5, 0.0, 0.0, -2.0, 400.0, 300.0]);
    let c = t([1.0, 0.2, 0.1, 1.0, -3.0, 4.0]);
    let left = Transform::compose(Transform::compose(a, b), c);
    let right = Transform::compose(a, Transform::compose(b, c));
    assert!(left.approx_eq(right, 1e-12));
}

#[test]
fn identity_is_neutral() {
    let a = t([2.0, 0.5, -0.25, 1.5, 3.0, -7.0]);
    assert!(Transform::compose(Transform::IDENTITY, a).approx_eq(a, 0.0));
    assert!(Transform::compose(a, Transform::IDENTITY).approx_eq(a, 0.0));
    assert_eq!(Transform::default(), Transform::IDENTITY);
}

#[test]
fn double_inversion_recovers_original() {
    let a = t([400.0, 0.0, 0.0, -300.0, 400.0, 300.0]);
    let back = a.invert().unwrap().invert().unwrap();
    assert!(back.approx_eq(a, 1e-9));
}

#[test]
fn inverse_round_trips_points() {
    let a = t([3.0, 1.0, -2.0, 0.5, 12.0, -4.0]);
    let inv = a.invert().unwrap();
    let p = Point::new(0.3, -17.5);
    let q = inv.apply(a.apply(p));
    assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9);
}

#[test]
fn singular_transform_fails_to_invert() {
    let zero_x = Transform::scale(0.0, 2.0);
    let err = zero_x.invert().unwrap_err();
    assert!(matches!(err, ViewError::SingularTransform(_)));

    let nan = t([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert!(nan.invert().is_err());
}

#[test]
fn rect_bbox_handles_y_flip() {
    let flip = t([100.0, 0.0, 0.0, -100.0, 100.0, 100.0]);
    let r = flip.apply_rect_bbox(Rect::new(-1.0, -1.0, 0.0, 1.0));
    assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 200.0));
}

#[test]
fn tiny_uniform_scale_is_still_invertible() {
    let tiny = Transform::scale(1e-6, 1e-6);
    assert!(tiny.is_invertible());
    let inv = tiny.invert().unwrap();
    let p = Point::new(3.0e-6, -1.5e-6);
    let q = tiny.apply(inv.apply(p));
    assert!((p.x - q.x).abs() < 1e-18 && (p.y - q.y).abs() < 1e-18);

    // Rank-deficient at any magnitude.
    let degenerate = t([1e6, 2e6, 0.5e6, 1e6, 0.0, 0.0]);
    assert!(!degenerate.is_invertible());
}
