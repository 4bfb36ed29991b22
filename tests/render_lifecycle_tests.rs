use approx::assert_abs_diff_eq;
use glam::Vec3;
use iced_figure::{
    Figure, PlotId,
    color::{BLACK, RED},
    render::{
        FramePlan, GpuScene, HeadlessBackend, HeadlessMesh, MeshEvent, MeshKey, MeshLedger,
        Topology,
    },
};

fn figure_with_lines(lines: usize) -> (Figure, PlotId) {
    let mut fig = Figure::new(800, 600).expect("figure");
    let id = fig.add_plot().expect("plot");
    let plot = fig.plot_mut(id).expect("plot");
    for i in 0..lines {
        let offset = i as f64 * 0.1;
        plot.plot(&[0.0, 0.5, 1.0], &[offset, 0.5, 1.0 - offset], RED)
            .expect("plot");
    }
    fig.prepare_geometry();
    (fig, id)
}

fn released(ledger: &MeshLedger) -> Vec<MeshKey> {
    ledger
        .events()
        .into_iter()
        .filter_map(|e| match e {
            MeshEvent::Released { key, .. } => Some(key),
            MeshEvent::Uploaded { .. } => None,
        })
        .collect()
}

#[test]
fn every_piece_is_uploaded_once() {
    let (fig, id) = figure_with_lines(2);
    let mut backend = HeadlessBackend::new();
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();

    scene.sync(&mut backend, &fig);
    scene.sync(&mut backend, &fig);

    // frame, grid, axes, ticks and two lines
    assert_eq!(ledger.uploads(), 6);
    assert_eq!(ledger.live(), 6);

    let gpu = scene.plot(id).expect("plot mirrored");
    assert_eq!(gpu.line_count(), 2);
    let frame: &HeadlessMesh = gpu.mesh(MeshKey::Frame).expect("frame loaded");
    assert_eq!(frame.vertices().len(), 4);
    assert_eq!(frame.topology(), Topology::LineLoop);
    assert_eq!(
        gpu.mesh(MeshKey::Grid).expect("grid loaded").topology(),
        Topology::LineList
    );
    assert!(gpu.is_loaded(MeshKey::Line(1)));
}

#[test]
fn teardown_releases_leaves_first_and_exactly_once() {
    let (fig, _) = figure_with_lines(2);
    let mut backend = HeadlessBackend::new();
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);

    drop(scene);
    drop(backend);
    fig.free();

    assert_eq!(ledger.live(), 0);
    assert_eq!(
        released(&ledger),
        vec![
            MeshKey::Line(0),
            MeshKey::Line(1),
            MeshKey::Ticks,
            MeshKey::Axes,
            MeshKey::Grid,
            MeshKey::Frame,
        ]
    );
}

#[test]
fn lines_added_later_are_picked_up() {
    let (mut fig, id) = figure_with_lines(1);
    let mut backend = HeadlessBackend::new();
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);
    assert_eq!(ledger.uploads(), 5);

    fig.plot_mut(id)
        .expect("plot")
        .plot(&[0.0, 1.0], &[1.0, 0.0], BLACK)
        .expect("second line");
    scene.sync(&mut backend, &fig);

    assert_eq!(ledger.uploads(), 6);
    assert!(released(&ledger).is_empty());
}

#[test]
fn failed_upload_is_isolated() {
    let (fig, id) = figure_with_lines(2);
    let mut backend = HeadlessBackend::new().fail_on(MeshKey::Line(0));
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();

    scene.sync(&mut backend, &fig);
    scene.sync(&mut backend, &fig);

    let gpu = scene.plot(id).expect("plot mirrored");
    assert!(!gpu.is_loaded(MeshKey::Line(0)));
    assert!(gpu.is_loaded(MeshKey::Line(1)));
    // failed uploads are not retried
    assert_eq!(ledger.uploads(), 5);

    let plan = FramePlan::build(&fig, &scene, (800, 600));
    let meshes: Vec<MeshKey> = plan.passes[0].draws.iter().map(|d| d.mesh).collect();
    assert!(!meshes.contains(&MeshKey::Line(0)));
    assert!(meshes.contains(&MeshKey::Line(1)));
}

#[test]
fn exhausted_allocations_keep_earlier_meshes() {
    let (mut fig, id) = figure_with_lines(1);
    let mut backend = HeadlessBackend::new().with_upload_budget(5);
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);

    fig.plot_mut(id)
        .expect("plot")
        .plot(&[0.0, 1.0], &[0.0, 1.0], RED)
        .expect("line");
    scene.sync(&mut backend, &fig);

    let gpu = scene.plot(id).expect("plot mirrored");
    assert!(gpu.is_loaded(MeshKey::Line(0)));
    assert!(!gpu.is_loaded(MeshKey::Line(1)));
    assert_eq!(ledger.live(), 5);
    assert_eq!(fig.plot(id).expect("plot").lines().len(), 2);
}

#[test]
fn rebuilt_grid_replaces_its_mesh() {
    let (mut fig, id) = figure_with_lines(0);
    let mut backend = HeadlessBackend::new();
    let ledger = backend.ledger();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);
    let live = ledger.live();

    fig.plot_mut(id).expect("plot").rebuild_grid();
    scene.sync(&mut backend, &fig);

    assert_eq!(ledger.live(), live);
    assert_eq!(released(&ledger), vec![MeshKey::Grid, MeshKey::Ticks]);
}

#[test]
fn draw_order_and_widths() {
    let (mut fig, id) = figure_with_lines(1);
    let plot = fig.plot_mut(id).expect("plot");
    plot.set_line_width(3.0).expect("width");
    plot.set_box_line_width(1.5).expect("width");

    let mut backend = HeadlessBackend::new();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);
    let plan = FramePlan::build(&fig, &scene, (800, 600));

    assert_eq!(plan.clear_color, fig.background_color());
    assert_eq!(plan.passes.len(), 1);
    let draws = &plan.passes[0].draws;
    let keys: Vec<MeshKey> = draws.iter().map(|d| d.mesh).collect();
    assert_eq!(
        keys,
        vec![
            MeshKey::Frame,
            MeshKey::Grid,
            MeshKey::Axes,
            MeshKey::Ticks,
            MeshKey::Line(0)
        ]
    );
    assert_eq!(draws[0].topology, Topology::LineLoop);
    assert_eq!(draws[0].vertex_count, 4);
    assert_eq!(draws[0].line_width, 1.5);
    assert_eq!(draws[1].vertex_count, 44);
    assert_eq!(draws[4].topology, Topology::LineStrip);
    assert_eq!(draws[4].vertex_count, 3);
    assert_eq!(draws[4].line_width, 3.0);

    let viewport = plan.passes[0].viewport;
    assert_eq!((viewport.x, viewport.y), (0.0, 0.0));
    assert_eq!((viewport.width, viewport.height), (800.0, 600.0));
}

#[test]
fn hidden_grid_is_kept_but_not_drawn() {
    let (mut fig, id) = figure_with_lines(0);
    let mut backend = HeadlessBackend::new();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);

    fig.plot_mut(id).expect("plot").show_grid(false);
    let plan = FramePlan::build(&fig, &scene, (800, 600));

    assert!(scene.plot(id).expect("plot").is_loaded(MeshKey::Grid));
    assert!(plan.passes[0].draws.iter().all(|d| d.mesh != MeshKey::Grid));
}

#[test]
fn subplot_passes_use_cell_viewports() {
    let mut fig = Figure::new(800, 600).expect("figure");
    let ids = fig.add_subplots(2, 2).expect("grid");
    fig.prepare_geometry();

    let mut backend = HeadlessBackend::new();
    let mut scene = GpuScene::new();
    scene.sync(&mut backend, &fig);
    assert_eq!(scene.len(), 4);

    for fb in [(800, 600), (1600, 1200)] {
        let plan = FramePlan::build(&fig, &scene, fb);
        assert_eq!(plan.passes.len(), 4);
        for (pass, id) in plan.passes.iter().zip(&ids) {
            assert_eq!(pass.plot, *id);
            let layout = *fig.plot(*id).expect("plot").subplot_layout().expect("layout");
            assert_eq!(pass.viewport, layout.screen.to_pixels(fb.0, fb.1));

            // the box edge sits on the last pixel center, half a pixel inside the clip edge
            let corner = pass
                .projection
                .project_point3(Vec3::new(layout.ndc.right, layout.ndc.top, 0.0));
            let expected_x = 1.0 - 1.0 / (pass.viewport.width + 1.0);
            let expected_y = 1.0 - 1.0 / (pass.viewport.height + 1.0);
            assert_abs_diff_eq!(corner.x, expected_x, epsilon = 1e-5);
            assert_abs_diff_eq!(corner.y, expected_y, epsilon = 1e-5);
            assert!(corner.x < 1.0 && corner.y < 1.0);

            let origin = pass
                .projection
                .project_point3(Vec3::new(layout.ndc.left, layout.ndc.bottom, 0.0));
            assert_abs_diff_eq!(origin.x, -expected_x, epsilon = 1e-5);
            assert_abs_diff_eq!(origin.y, -expected_y, epsilon = 1e-5);
        }
    }
}

#[test]
fn unsynced_plots_are_not_planned() {
    let (mut fig, _) = figure_with_lines(0);
    let scene: GpuScene<HeadlessMesh> = GpuScene::new();
    fig.add_plot().expect("second plot");
    let plan = FramePlan::build(&fig, &scene, (800, 600));
    assert!(plan.passes.is_empty());
    assert_eq!(plan.draw_count(), 0);
}
