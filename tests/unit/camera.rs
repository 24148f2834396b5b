use super::*;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

fn vp() -> ViewportSize {
    ViewportSize::new(800.0, 600.0)
}

#[test]
fn ndc_maps_corners_with_y_up() {
    let t = Camera::ndc().to_device_transform(vp());
    assert!(close(t.apply(Point::new(-1.0, -1.0)), Point::new(0.0, 600.0)));
    assert!(close(t.apply(Point::new(1.0, 1.0)), Point::new(800.0, 0.0)));
    assert!(close(t.apply(Point::new(0.0, 0.0)), Point::new(400.0, 300.0)));
}

#[test]
fn pixel_top_left_is_identity_at_unit_scale() {
    let t = Camera::pixel().to_device_transform(vp());
    assert!(t.approx_eq(Transform::IDENTITY, 0.0));
}

#[test]
fn pixel_bottom_left_flips_y() {
    let cam = Camera::Pixel(PixelCamera::default().with_origin(PixelOrigin::BottomLeft));
    let t = cam.to_device_transform(vp());
    assert!(close(t.apply(Point::new(0.0, 0.0)), Point::new(0.0, 600.0)));
    assert!(close(t.apply(Point::new(10.0, 100.0)), Point::new(10.0, 500.0)));
}

#[test]
fn pixel_scale_override_applies_per_axis() {
    let cam = Camera::Pixel(PixelCamera::default().with_scale(2.0, 0.5).unwrap());
    let t = cam.to_device_transform(vp());
    assert!(close(t.apply(Point::new(10.0, 10.0)), Point::new(20.0, 5.0)));
    assert!(PixelCamera::default().with_scale(0.0, 1.0).is_err());
    assert!(PixelCamera::default().with_scale(1.0, f64::NAN).is_err());
}

#[test]
fn twod_default_matches_ndc() {
    let a = Camera::twod().to_device_transform(vp());
    let b = Camera::ndc().to_device_transform(vp());
    assert!(a.approx_eq(b, 1e-12));
}

#[test]
fn twod_pan_moves_center_to_viewport_middle() {
    let mut cam = TwoDCamera::default();
    cam.pan(Vec2::new(0.5, -0.25)).unwrap();
    let t = Camera::TwoD(cam).to_device_transform(vp());
    assert!(close(t.apply(Point::new(0.5, -0.25)), Point::new(400.0, 300.0)));
}

#[test]
fn twod_zoom_keeps_anchor_fixed() {
    let anchor = Point::new(0.4, 0.7);
    let mut cam = TwoDCamera::default();
    let before = Camera::TwoD(cam).to_device_transform(vp()).apply(anchor);
    cam.zoom_by(3.0, Some(anchor)).unwrap();
    let after = Camera::TwoD(cam).to_device_transform(vp()).apply(anchor);
    assert!(close(before, after));
    assert!((cam.zoom() - 3.0).abs() < 1e-12);
}

#[test]
fn twod_rejects_invalid_zoom_without_mutation() {
    let mut cam = TwoDCamera::default();
    assert!(cam.zoom_by(0.0, None).is_err());
    assert!(cam.zoom_by(f64::INFINITY, None).is_err());
    assert!(cam.set_zoom(-1.0).is_err());
    assert_eq!(cam, TwoDCamera::default());
}

#[test]
fn every_camera_round_trips_through_its_inverse() {
    let mut zoomed = TwoDCamera::new(Point::new(3.0, -2.0), 0.125).unwrap();
    zoomed.pan(Vec2::new(1.0, 1.0)).unwrap();
    let cams = [
        Camera::ndc(),
        Camera::pixel(),
        Camera::Pixel(
            PixelCamera::default()
                .with_origin(PixelOrigin::BottomLeft)
                .with_scale(100.0, 100.0)
                .unwrap(),
        ),
        Camera::TwoD(zoomed),
    ];
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(-1.0, 1.0),
        Point::new(123.5, -77.25),
    ];
    for cam in cams {
        let t = cam.to_device_transform(ViewportSize::new(400.0, 300.0));
        let inv = t.invert().unwrap();
        for p in pts {
            assert!(close(inv.apply(t.apply(p)), p), "{cam:?} at {p:?}");
        }
    }
}

#[test]
fn zero_viewport_is_singular() {
    let t = Camera::ndc().to_device_transform(ViewportSize::new(0.0, 300.0));
    assert!(matches!(t.invert(), Err(ViewError::SingularTransform(_))));
}

#[test]
fn camera_kind_names_parse() {
    assert_eq!("ndc".parse::<Camera>().unwrap(), Camera::ndc());
    assert_eq!("Pixel".parse::<Camera>().unwrap(), Camera::pixel());
    assert_eq!("twod".parse::<Camera>().unwrap(), Camera::twod());
    assert!("perspective".parse::<Camera>().is_err());
}

#[test]
fn camera_json_uses_kind_tag() {
    let v = serde_json::to_value(Camera::pixel()).unwrap();
    assert_eq!(v["kind"], "pixel");
    let back: Camera = serde_json::from_str(r#"{"kind":"twod","zoom":2.0}"#).unwrap();
    assert_eq!(back.kind_name(), "twod");
    let bad: Camera = serde_json::from_str(r#"{"kind":"twod","zoom":0.0}"#).unwrap();
    assert!(bad.validate().is_err());
}
