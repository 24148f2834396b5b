use super::*;

#[test]
fn clip_method_strings_parse() {
    assert_eq!("none".parse::<ClipMethod>().unwrap(), ClipMethod::None);
    assert_eq!("Viewport".parse::<ClipMethod>().unwrap(), ClipMethod::Viewport);
    assert_eq!(" fbo ".parse::<ClipMethod>().unwrap(), ClipMethod::Fbo);
}

#[test]
fn unknown_and_reserved_methods_are_rejected() {
    let err = "scissor".parse::<ClipMethod>().unwrap_err();
    assert!(matches!(err, ViewError::UnknownClipMethod(ref s) if s == "scissor"));
    let err = "fragment".parse::<ClipMethod>().unwrap_err();
    assert!(matches!(err, ViewError::UnknownClipMethod(_)));
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn display_matches_parse() {
    for m in [ClipMethod::None, ClipMethod::Viewport, ClipMethod::Fbo] {
        assert_eq!(m.to_string().parse::<ClipMethod>().unwrap(), m);
    }
}

#[test]
fn midpoint_belongs_to_exactly_one_half() {
    let left = ClipRegion::new(Rect::new(0.0, 0.0, 400.0, 600.0), ClipMethod::Viewport);
    let right = ClipRegion::new(Rect::new(400.0, 0.0, 800.0, 600.0), ClipMethod::Viewport);
    let mid = Point::new(400.0, 300.0);
    assert!(!left.contains(mid));
    assert!(right.contains(mid));

    let just_left = Point::new(399.999, 300.0);
    assert!(left.contains(just_left));
    assert!(!right.contains(just_left));
}

#[test]
fn viewport_snaps_but_fbo_is_exact() {
    let rect = Rect::new(10.4, 10.4, 20.4, 20.4);
    let vp = ClipRegion::new(rect, ClipMethod::Viewport);
    let fbo = ClipRegion::new(rect, ClipMethod::Fbo);
    assert_eq!(vp.scissor(), PixelRect::new(10, 10, 20, 20));

    let p = Point::new(10.2, 15.0);
    assert!(vp.contains(p));
    assert!(!fbo.contains(p));

    let q = Point::new(20.2, 15.0);
    assert!(!vp.contains(q));
    assert!(fbo.contains(q));
}

#[test]
fn none_contains_everything() {
    let r = ClipRegion::new(Rect::new(0.0, 0.0, 1.0, 1.0), ClipMethod::None);
    assert!(r.contains(Point::new(-1e6, 1e6)));
}

#[test]
fn fbo_sizing_policies() {
    let dev = ViewportSize::new(399.5, 300.0);
    assert_eq!(FboSizing::MatchDevice.buffer_size(dev), (400, 300));
    assert_eq!(
        FboSizing::Scale { factor: 0.5 }.buffer_size(dev),
        (200, 150)
    );
    assert_eq!(
        FboSizing::Fixed {
            width: 64,
            height: 32
        }
        .buffer_size(dev),
        (64, 32)
    );
    assert!(FboSizing::Scale { factor: 0.0 }.validate().is_err());
    assert!(
        FboSizing::Fixed {
            width: 0,
            height: 3
        }
        .validate()
        .is_err()
    );
}

#[test]
fn partial_buffers_keep_the_sizing_density() {
    let dev = ViewportSize::new(1600.0, 1200.0);
    let half = ViewportSize::new(800.0, 600.0);
    assert_eq!(FboSizing::MatchDevice.buffer_size_for(dev, half), (800, 600));
    assert_eq!(
        FboSizing::Scale { factor: 0.5 }.buffer_size_for(dev, half),
        (400, 300)
    );
    let fixed = FboSizing::Fixed {
        width: 64,
        height: 32,
    };
    assert_eq!(fixed.buffer_size_for(dev, half), (32, 16));
    assert_eq!(fixed.buffer_size_for(dev, dev), (64, 32));

    // A huge footprint seen through a small window stays small.
    let huge = ViewportSize::new(160_000.0, 120_000.0);
    assert_eq!(FboSizing::MatchDevice.buffer_size_for(huge, half), (800, 600));
}
