use indexmap::IndexMap;

use vizkit::api::{
    AreaChart, AreaChartConfig, BarChart, BarChartConfig, ChartHost, LineChart, LineChartConfig,
    SyncAction,
};
use vizkit::core::{CategoryMap, CategoryStyle};
use vizkit::engine::{DrawableKind, EngineOp, Orientation, RecordingEngine, Surface, SurfaceId};

fn categories() -> CategoryMap {
    CategoryMap::new()
        .with("cpu", CategoryStyle::named("CPU").with_color("#ef4444"))
        .with("mem", CategoryStyle::named("Memory").with_color("#3b82f6"))
}

fn row(cpu: f64, mem: f64) -> IndexMap<String, f64> {
    IndexMap::from([("cpu".to_string(), cpu), ("mem".to_string(), mem)])
}

fn host() -> ChartHost {
    ChartHost::new(Surface::attached(SurfaceId::from_raw(1)))
}

#[test]
fn line_chart_constructs_then_refreshes_in_place() {
    let mut chart = LineChart::new(RecordingEngine::new(), LineChartConfig::new(categories()));

    let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect("first sync");
    assert_eq!(action, SyncAction::Construct);
    let creates = chart
        .engine()
        .ops()
        .iter()
        .filter(|op| matches!(op, EngineOp::CreateDrawable { .. }))
        .count();
    // two lines + two axes
    assert_eq!(creates, 4);
    assert_eq!(
        chart.engine().ops().last(),
        Some(&EngineOp::MountContainer)
    );

    let action = chart.sync(&host(), &[row(3.0, 4.0)]).expect("second sync");
    assert_eq!(action, SyncAction::Refresh);
    let rows = chart
        .engine()
        .container_data(chart.container().expect("container"))
        .expect("data");
    assert_eq!(rows, &[row(3.0, 4.0)]);
    // No new instances appeared.
    assert_eq!(chart.engine().live_drawables(), 4);
    assert_eq!(chart.engine().live_containers(), 1);
}

#[test]
fn rebuild_destroys_every_instance_before_recreating() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");

    let mut config = chart.config().clone();
    config.stacked = true;
    chart.set_config(config);
    let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect("rebuild");
    assert_eq!(action, SyncAction::Rebuild);

    let ops = chart.engine().ops();
    let destroy_container = ops
        .iter()
        .position(|op| matches!(op, EngineOp::DestroyContainer))
        .expect("container destroyed");
    let remount = ops
        .iter()
        .rposition(|op| matches!(op, EngineOp::MountContainer))
        .expect("container remounted");
    assert!(destroy_container < remount);
    // Stacked mode keeps one area + one line + both axes.
    assert_eq!(chart.engine().live_drawables(), 4);
    assert_eq!(chart.engine().live_containers(), 1);
}

#[test]
fn bar_stack_flip_swaps_the_drawable_kind() {
    let config = BarChartConfig::new(categories(), vec!["cpu".into(), "mem".into()]);
    let mut chart = BarChart::new(RecordingEngine::new(), config);
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
    assert!(chart.engine().ops().contains(&EngineOp::CreateDrawable {
        kind: DrawableKind::GroupedBar
    }));

    let mut config = chart.config().clone();
    config.stacked = true;
    chart.set_config(config);
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("rebuild");
    assert!(chart.engine().ops().contains(&EngineOp::DestroyDrawable {
        kind: DrawableKind::GroupedBar
    }));
    assert!(chart.engine().ops().contains(&EngineOp::CreateDrawable {
        kind: DrawableKind::StackedBar
    }));
}

#[test]
fn headless_host_skips_until_a_surface_appears() {
    let mut chart = LineChart::new(RecordingEngine::new(), LineChartConfig::new(categories()));

    let action = chart
        .sync(&ChartHost::headless(), &[row(1.0, 2.0)])
        .expect("headless sync");
    assert_eq!(action, SyncAction::Skip);
    assert!(chart.engine().ops().is_empty());

    let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect("mounted sync");
    assert_eq!(action, SyncAction::Construct);
}

#[test]
fn detached_surface_skips_but_keeps_instances_alive() {
    let mut chart = LineChart::new(RecordingEngine::new(), LineChartConfig::new(categories()));
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
    let live = chart.engine().live_drawables();

    let detached = ChartHost::new(Surface::detached(SurfaceId::from_raw(1)));
    let action = chart.sync(&detached, &[row(3.0, 4.0)]).expect("detached");
    assert_eq!(action, SyncAction::Skip);
    assert_eq!(chart.engine().live_drawables(), live);

    // Reattaching with an unchanged structure refreshes in place.
    let action = chart.sync(&host(), &[row(3.0, 4.0)]).expect("reattached");
    assert_eq!(action, SyncAction::Refresh);
}

#[test]
fn non_interactive_engine_never_builds() {
    let mut chart = LineChart::new(
        RecordingEngine::non_interactive(),
        LineChartConfig::new(categories()),
    );
    let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect("sync");
    assert_eq!(action, SyncAction::Skip);
    assert!(chart.engine().ops().is_empty());
}

#[test]
fn release_is_idempotent_and_final() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
    chart.release().expect("release");
    chart.release().expect("second release");
    assert_eq!(chart.engine().live_drawables(), 0);
    assert_eq!(chart.engine().live_containers(), 0);

    let destroys = chart
        .engine()
        .ops()
        .iter()
        .filter(|op| matches!(op, EngineOp::DestroyDrawable { .. }))
        .count();
    // six drawables from construct, destroyed exactly once
    assert_eq!(destroys, 6);
    let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect("post-release");
    assert_eq!(action, SyncAction::Skip);
}

#[test]
fn every_structural_line_input_forces_a_rebuild() {
    let flips: &[(&str, fn(&mut LineChartConfig))] = &[
        ("categories", |c| {
            c.categories.insert("disk", CategoryStyle::named("Disk"));
        }),
        ("hide_x_axis", |c| c.hide_x_axis = true),
        ("hide_y_axis", |c| c.hide_y_axis = true),
        ("hide_tooltip", |c| c.hide_tooltip = true),
    ];
    for (field, flip) in flips {
        let mut chart = LineChart::new(RecordingEngine::new(), LineChartConfig::new(categories()));
        chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
        let mut config = chart.config().clone();
        flip(&mut config);
        chart.set_config(config);
        let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect(field);
        assert_eq!(action, SyncAction::Rebuild, "{field} flip");
    }

    // Cosmetic inputs refresh.
    let mut chart = LineChart::new(RecordingEngine::new(), LineChartConfig::new(categories()));
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
    let mut config = chart.config().clone();
    config.line_width = 4.0;
    chart.set_config(config);
    assert_eq!(
        chart.sync(&host(), &[row(1.0, 2.0)]).expect("width change"),
        SyncAction::Refresh
    );
}

#[test]
fn every_structural_area_input_forces_a_rebuild() {
    let flips: &[(&str, fn(&mut AreaChartConfig))] = &[
        ("stacked", |c| c.stacked = true),
        ("categories", |c| {
            c.categories.insert("disk", CategoryStyle::named("Disk"));
        }),
        ("hide_x_axis", |c| c.hide_x_axis = true),
        ("hide_y_axis", |c| c.hide_y_axis = true),
        ("hide_tooltip", |c| c.hide_tooltip = true),
    ];
    for (field, flip) in flips {
        let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
        chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
        let mut config = chart.config().clone();
        flip(&mut config);
        chart.set_config(config);
        let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect(field);
        assert_eq!(action, SyncAction::Rebuild, "{field} flip");
    }
}

#[test]
fn every_structural_bar_input_forces_a_rebuild() {
    fn bar_chart() -> BarChart<IndexMap<String, f64>, RecordingEngine<IndexMap<String, f64>>> {
        let config = BarChartConfig::new(categories(), vec!["cpu".into(), "mem".into()]);
        BarChart::new(RecordingEngine::new(), config)
    }

    let flips: &[(&str, fn(&mut BarChartConfig))] = &[
        ("stacked", |c| c.stacked = true),
        ("categories", |c| {
            c.categories.insert("disk", CategoryStyle::named("Disk"));
        }),
        ("value_keys", |c| c.value_keys.push("disk".to_string())),
        ("hide_x_axis", |c| c.hide_x_axis = true),
        ("hide_y_axis", |c| c.hide_y_axis = true),
        ("hide_tooltip", |c| c.hide_tooltip = true),
        ("orientation", |c| c.orientation = Orientation::Horizontal),
    ];
    for (field, flip) in flips {
        let mut chart = bar_chart();
        chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
        let mut config = chart.config().clone();
        flip(&mut config);
        chart.set_config(config);
        let action = chart.sync(&host(), &[row(1.0, 2.0)]).expect(field);
        assert_eq!(action, SyncAction::Rebuild, "{field} flip");
    }

    // Cosmetic inputs refresh in place.
    let mut chart = bar_chart();
    chart.sync(&host(), &[row(1.0, 2.0)]).expect("construct");
    let mut config = chart.config().clone();
    config.corner_radius = 4.0;
    chart.set_config(config);
    assert_eq!(
        chart.sync(&host(), &[row(1.0, 2.0)]).expect("radius change"),
        SyncAction::Refresh
    );
}
