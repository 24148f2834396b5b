use super::*;
use crate::camera::Camera;
use crate::clip::ClipMethod;
use crate::foundation::core::Rgba8Premul;
use crate::render::compositor::Renderer;
use crate::scene::graph::SceneGraph;
use crate::scene::viewbox::ViewBox;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn big_rect(color: Rgba8Premul) -> Visual {
    Visual::rect(Rect::new(-4.0, -4.0, 4.0, 4.0), color).unwrap()
}

fn near(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 2)
}

/// 80x60 NDC frame whose left half is a viewbox holding an oversized red rect.
fn left_half(method: ClipMethod) -> (SceneGraph, NodeId) {
    let mut g = SceneGraph::new(Camera::ndc());
    let root = g.root();
    let vb = g
        .add_viewbox(
            root,
            ViewBox::new("left")
                .with_rect((-1.0, -1.0), (1.0, 2.0))
                .unwrap()
                .with_clip_method(method),
        )
        .unwrap();
    let v = g.add_visual(big_rect(Rgba8Premul::opaque(255, 0, 0))).unwrap();
    g.add(vb, v).unwrap();
    (g, vb)
}

fn render(g: &SceneGraph, backend: &mut CpuBackend) -> FrameRGBA {
    Renderer::new().render(g, (80, 60), backend).unwrap();
    backend.take_frame().unwrap()
}

#[test]
fn viewport_clip_confines_contents() {
    let (g, _) = left_half(ClipMethod::Viewport);
    let f = render(&g, &mut CpuBackend::new(CpuBackendOpts::default()));
    assert_eq!(f.pixel(0, 0), Some(RED));
    assert_eq!(f.pixel(39, 59), Some(RED));
    assert_eq!(f.pixel(40, 0), Some(CLEAR));
    assert_eq!(f.pixel(79, 30), Some(CLEAR));
}

#[test]
fn fbo_clip_confines_contents() {
    let (g, _) = left_half(ClipMethod::Fbo);
    let f = render(&g, &mut CpuBackend::new(CpuBackendOpts::default()));
    assert!(near(f.pixel(20, 30).unwrap(), RED));
    assert!(near(f.pixel(2, 2).unwrap(), RED));
    assert_eq!(f.pixel(45, 30), Some(CLEAR));
    assert_eq!(f.pixel(79, 59), Some(CLEAR));
}

#[test]
fn no_clip_lets_contents_spill() {
    let (g, _) = left_half(ClipMethod::None);
    let f = render(&g, &mut CpuBackend::new(CpuBackendOpts::default()));
    assert_eq!(f.pixel(20, 30), Some(RED));
    assert_eq!(f.pixel(79, 59), Some(RED));
}

#[test]
fn clip_methods_agree_inside_the_viewbox() {
    let frames: Vec<FrameRGBA> = [ClipMethod::None, ClipMethod::Viewport, ClipMethod::Fbo]
        .into_iter()
        .map(|m| {
            let (g, _) = left_half(m);
            render(&g, &mut CpuBackend::new(CpuBackendOpts::default()))
        })
        .collect();
    for (x, y) in [(5, 5), (20, 30), (35, 55)] {
        let a = frames[0].pixel(x, y).unwrap();
        assert!(frames.iter().all(|f| near(f.pixel(x, y).unwrap(), a)));
    }
}

#[test]
fn split_point_belongs_to_the_right_half() {
    let mut g = SceneGraph::new(Camera::ndc());
    let root = g.root();
    for (name, x, color) in [
        ("left", -1.0, Rgba8Premul::opaque(255, 0, 0)),
        ("right", 0.0, Rgba8Premul::opaque(0, 0, 255)),
    ] {
        let vb = g
            .add_viewbox(
                root,
                ViewBox::new(name).with_rect((x, -1.0), (1.0, 2.0)).unwrap(),
            )
            .unwrap();
        let v = g.add_visual(big_rect(color)).unwrap();
        g.add(vb, v).unwrap();
    }
    let f = render(&g, &mut CpuBackend::new(CpuBackendOpts::default()));
    assert_eq!(f.pixel(39, 30), Some(RED));
    assert_eq!(f.pixel(40, 30), Some(BLUE));
}

#[test]
fn clear_color_fills_the_frame() {
    let g = SceneGraph::default();
    let mut b = CpuBackend::new(CpuBackendOpts::default().with_clear_rgba(Some([0, 0, 255, 255])));
    let f = render(&g, &mut b);
    assert!(f.premultiplied);
    assert_eq!(f.pixel(0, 0), Some(BLUE));
    assert_eq!(f.pixel(79, 59), Some(BLUE));
}

#[test]
fn offscreen_buffer_is_kept_then_released_after_detach() {
    let (mut g, vb) = left_half(ClipMethod::Fbo);
    let mut b = CpuBackend::new(CpuBackendOpts::default());
    let mut r = Renderer::new();

    r.render(&g, (80, 60), &mut b).unwrap();
    assert!(b.owns_offscreen(vb));
    r.render(&g, (80, 60), &mut b).unwrap();
    assert_eq!(b.owned_offscreen(), 1);
    let reused = b.pool_stats().reused_surfaces;

    let root = g.root();
    g.detach(root, vb).unwrap();
    r.render(&g, (80, 60), &mut b).unwrap();
    assert_eq!(b.owned_offscreen(), 0);
    assert!(b.pool_stats().retained_surfaces >= 1);
    assert!(b.pool_stats().reused_surfaces >= reused);
}

#[test]
fn mismatched_offscreen_end_is_an_error() {
    let (g, vb) = left_half(ClipMethod::Fbo);
    let other = g.root();
    let mut b = CpuBackend::new(CpuBackendOpts::default());
    let desc = SurfaceDesc::rgba8(8, 8).unwrap();
    b.begin_frame(desc).unwrap();
    b.begin_offscreen(vb, desc).unwrap();
    let err = b
        .end_offscreen(other, Rect::new(0.0, 0.0, 8.0, 8.0), FboFilter::Nearest)
        .unwrap_err();
    assert!(matches!(err, ViewError::Render(_)));
    assert!(b.end_frame().is_err());
}

#[test]
fn draw_without_frame_is_an_error() {
    let mut b = CpuBackend::new(CpuBackendOpts::default());
    assert!(b.pop_scissor().is_err());
    assert!(b.end_frame().is_err());
}

#[test]
fn frame_after_a_failed_frame_renders() {
    let mut g = SceneGraph::new(Camera::ndc());
    let root = g.root();
    let outer = g
        .add_viewbox(root, ViewBox::new("outer").with_clip_method(ClipMethod::Fbo))
        .unwrap();
    let inner = g
        .add_viewbox(
            outer,
            ViewBox::new("inner").with_rect((0.0, 0.0), (1e-12, 1e-12)).unwrap(),
        )
        .unwrap();
    let v = g.add_visual(big_rect(Rgba8Premul::opaque(255, 0, 0))).unwrap();
    g.add(inner, v).unwrap();

    let mut b = CpuBackend::new(CpuBackendOpts::default());
    let mut r = Renderer::new();
    for _ in 0..2 {
        let err = r.render(&g, (80, 60), &mut b).unwrap_err();
        assert!(matches!(err, ViewError::SingularTransform(_)), "{err}");
    }
    assert!(b.take_frame().is_none());

    g.viewbox_mut(inner)
        .unwrap()
        .set_rect((-1.0, -1.0), (1.0, 1.0))
        .unwrap();
    let f = render(&g, &mut b);
    // `inner` is the bottom-left quarter of the frame.
    assert!(near(f.pixel(10, 45).unwrap(), RED));
    assert_eq!(f.pixel(60, 10), Some(CLEAR));
    assert!(b.owns_offscreen(outer));
}

#[test]
fn zoomed_parent_renders_its_offscreen_child() {
    let mut g = SceneGraph::new(Camera::ndc());
    let root = g.root();
    let zoomed = g
        .add_viewbox(
            root,
            ViewBox::new("zoomed").with_camera(Camera::TwoD(
                crate::camera::TwoDCamera::new(Point::ORIGIN, 200.0).unwrap(),
            )),
        )
        .unwrap();
    let child = g
        .add_viewbox(zoomed, ViewBox::new("child").with_clip_method(ClipMethod::Fbo))
        .unwrap();
    let v = g.add_visual(big_rect(Rgba8Premul::opaque(0, 0, 255))).unwrap();
    g.add(child, v).unwrap();

    let mut b = CpuBackend::new(CpuBackendOpts::default());
    let f = render(&g, &mut b);
    for (x, y) in [(0, 0), (40, 30), (79, 59)] {
        assert!(near(f.pixel(x, y).unwrap(), BLUE), "({x}, {y})");
    }
}
