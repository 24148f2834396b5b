use super::*;
use crate::render::compositor::Renderer;
use crate::foundation::core::Rect;
use crate::render::record::RecordingBackend;

#[test]
fn demo_layout_matches_the_stacked_halves() {
    let demo = DemoScene::build(DemoOpts::default()).unwrap();
    let g = &demo.graph;
    let names: Vec<&str> = demo
        .viewboxes
        .iter()
        .map(|&id| g.viewbox(id).unwrap().name())
        .collect();
    assert_eq!(names, ["vb1", "vb11", "vb12", "vb2", "vb21", "vb22"]);
    assert_eq!(g.parents(demo.line_ndc).unwrap().len(), 2);
    assert_eq!(g.parents(demo.line_pixels).unwrap().len(), 2);

    let report = Renderer::new()
        .render(g, DEMO_CANVAS, &mut RecordingBackend::new())
        .unwrap();
    let rect = |name: &str| report.view(name).unwrap().clip.rect;
    assert_eq!(rect("vb1"), Rect::new(0.0, 0.0, 400.0, 600.0));
    assert_eq!(rect("vb2"), Rect::new(400.0, 0.0, 800.0, 600.0));
    assert_eq!(rect("vb11"), Rect::new(0.0, 300.0, 400.0, 600.0));
    assert_eq!(rect("vb12"), Rect::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(rect("vb21"), Rect::new(400.0, 0.0, 800.0, 300.0));
    assert_eq!(rect("vb22"), Rect::new(400.0, 300.0, 800.0, 600.0));

    // Two lines, each drawn twice, plus the two boxes in vb11.
    assert_eq!(report.draws, 6);
    assert_eq!(report.offscreen_passes, 2);
}

#[test]
fn demo_is_owned_by_the_tree() {
    let mut demo = DemoScene::build(DemoOpts::default()).unwrap();
    let root = demo.graph.root();
    let vb1 = demo.viewboxes[0];
    demo.graph.detach(root, vb1).unwrap();

    // vb1, vb11, vb12 and both boxes go; the lines survive through vb21/vb22.
    assert!(!demo.graph.is_alive(vb1));
    assert!(!demo.graph.is_alive(demo.viewboxes[1]));
    assert_eq!(demo.graph.parents(demo.line_ndc).unwrap().len(), 1);
    assert_eq!(demo.graph.len(), 1 + 3 + 2);
}

#[test]
fn demo_fbo_sizing_applies_to_every_fbo_view() {
    let opts = DemoOpts::default()
        .with_methods(ClipMethod::Fbo, ClipMethod::Fbo)
        .with_fbo_sizing(FboSizing::Scale { factor: 0.5 })
        .unwrap();
    let demo = DemoScene::build(opts).unwrap();
    let report = Renderer::new()
        .render(&demo.graph, DEMO_CANVAS, &mut RecordingBackend::new())
        .unwrap();
    assert_eq!(report.offscreen_passes, 6);
    let vb22 = report.view("vb22").unwrap().fbo.unwrap();
    assert_eq!((vb22.width, vb22.height), (200, 150));
}

#[test]
fn too_few_points_are_rejected() {
    let opts = DemoOpts {
        points: 3,
        ..DemoOpts::default()
    };
    assert!(matches!(
        DemoScene::build(opts),
        Err(ViewError::InvalidGeometry(_))
    ));
}
