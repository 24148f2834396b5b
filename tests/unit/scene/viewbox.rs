use super::*;

#[test]
fn zero_size_is_rejected_and_rect_unchanged() {
    let mut vb = ViewBox::new("vb1")
        .with_rect((-1.0, -1.0), (1.0, 2.0))
        .unwrap();
    let before = vb.rect();

    let err = vb.set_rect((0.0, 0.0), (0.0, 0.0)).unwrap_err();
    assert!(matches!(err, ViewError::InvalidGeometry(_)));
    assert_eq!(vb.rect(), before);

    assert!(vb.set_rect((0.0, 0.0), (-1.0, 1.0)).is_err());
    assert!(vb.set_rect((0.0, 0.0), (1.0, f64::NAN)).is_err());
    assert!(vb.set_rect((f64::INFINITY, 0.0), (1.0, 1.0)).is_err());
    assert_eq!(vb.rect(), before);
}

#[test]
fn set_rect_updates_footprint() {
    let mut vb = ViewBox::new("vb21");
    vb.set_rect((0.0, 300.0), (400.0, 300.0)).unwrap();
    assert_eq!(vb.rect(), Rect::new(0.0, 300.0, 400.0, 600.0));
}

#[test]
fn clip_method_string_setter_validates() {
    let mut vb = ViewBox::new("vb");
    vb.set_clip_method_str("fbo").unwrap();
    assert_eq!(vb.clip_method(), ClipMethod::Fbo);

    let err = vb.set_clip_method_str("fragment").unwrap_err();
    assert!(matches!(err, ViewError::UnknownClipMethod(_)));
    assert_eq!(vb.clip_method(), ClipMethod::Fbo);
}

#[test]
fn camera_replacement_and_mutation() {
    let mut vb = ViewBox::new("vb").with_camera(Camera::twod());
    vb.camera_mut()
        .as_twod_mut()
        .unwrap()
        .zoom_by(2.0, None)
        .unwrap();
    assert_eq!(vb.camera().kind_name(), "twod");
    vb.set_camera(Camera::pixel());
    assert_eq!(vb.camera(), &Camera::pixel());
}

#[test]
fn invalid_fbo_sizing_is_rejected() {
    let mut vb = ViewBox::new("vb");
    assert!(vb.set_fbo_sizing(FboSizing::Scale { factor: -2.0 }).is_err());
    assert_eq!(vb.fbo_sizing(), FboSizing::MatchDevice);
    vb.set_fbo_sizing(FboSizing::Scale { factor: 0.5 }).unwrap();
    assert_eq!(vb.fbo_sizing(), FboSizing::Scale { factor: 0.5 });
}

#[test]
fn display_names_the_viewbox() {
    let vb = ViewBox::new("vb11")
        .with_rect((-1.0, -1.0), (2.0, 1.0))
        .unwrap()
        .with_camera(Camera::twod());
    let s = vb.to_string();
    assert!(s.contains("'vb11'"));
    assert!(s.contains("camera=twod"));
    assert!(s.contains("clip=viewport"));
}
