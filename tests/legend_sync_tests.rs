use indexmap::IndexMap;

use vizkit::api::{AreaChart, AreaChartConfig, ChartHost, SyncAction};
use vizkit::core::{CategoryMap, CategoryStyle};
use vizkit::engine::{EngineOp, RecordingEngine, Surface, SurfaceId};

fn categories() -> CategoryMap {
    CategoryMap::new()
        .with("cpu", CategoryStyle::named("CPU").with_color("#ef4444"))
        .with("mem", CategoryStyle::named("Memory").with_color("#3b82f6"))
}

fn row(cpu: f64, mem: f64) -> IndexMap<String, f64> {
    IndexMap::from([("cpu".to_string(), cpu), ("mem".to_string(), mem)])
}

fn host_with_legend() -> ChartHost {
    ChartHost::new(Surface::attached(SurfaceId::from_raw(1)))
        .with_legend(Surface::attached(SurfaceId::from_raw(2)))
}

fn legend_ops(ops: &[EngineOp]) -> (usize, usize, usize) {
    let mounts = ops
        .iter()
        .filter(|op| matches!(op, EngineOp::MountLegend { .. }))
        .count();
    let updates = ops
        .iter()
        .filter(|op| matches!(op, EngineOp::UpdateLegend { .. }))
        .count();
    let destroys = ops
        .iter()
        .filter(|op| matches!(op, EngineOp::DestroyLegend))
        .count();
    (mounts, updates, destroys)
}

#[test]
fn legend_mounts_once_then_updates_in_place() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("first");
    chart.sync(&host_with_legend(), &[row(3.0, 4.0)]).expect("second");
    chart.sync(&host_with_legend(), &[row(5.0, 6.0)]).expect("third");

    let (mounts, updates, destroys) = legend_ops(chart.engine().ops());
    assert_eq!(mounts, 1);
    assert_eq!(updates, 2);
    assert_eq!(destroys, 0);
    assert_eq!(chart.engine().live_legends(), 1);
}

#[test]
fn legend_items_carry_category_names_in_map_order() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("sync");
    let mount = chart
        .engine()
        .ops()
        .iter()
        .find_map(|op| match op {
            EngineOp::MountLegend { items } => Some(items.clone()),
            _ => None,
        })
        .expect("legend mounted");
    assert_eq!(mount, ["CPU", "Memory"]);
}

#[test]
fn hiding_the_legend_destroys_it_without_a_rebuild() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("construct");
    assert_eq!(chart.engine().live_legends(), 1);

    let mut config = chart.config().clone();
    config.hide_legend = true;
    chart.set_config(config);
    let action = chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("hide");
    // Legend visibility is not structural for area charts.
    assert_eq!(action, SyncAction::Refresh);
    assert_eq!(chart.engine().live_legends(), 0);

    // Showing it again mounts a fresh legend.
    let mut config = chart.config().clone();
    config.hide_legend = false;
    chart.set_config(config);
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("show");
    assert_eq!(chart.engine().live_legends(), 1);
}

#[test]
fn missing_legend_surface_skips_the_legend_pass() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    let chart_only = ChartHost::new(Surface::attached(SurfaceId::from_raw(1)));
    chart.sync(&chart_only, &[row(1.0, 2.0)]).expect("sync");
    let (mounts, updates, destroys) = legend_ops(chart.engine().ops());
    assert_eq!((mounts, updates, destroys), (0, 0, 0));
}

#[test]
fn detached_legend_surface_skips_but_does_not_destroy() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("construct");
    assert_eq!(chart.engine().live_legends(), 1);

    let detached_legend = ChartHost::new(Surface::attached(SurfaceId::from_raw(1)))
        .with_legend(Surface::detached(SurfaceId::from_raw(2)));
    chart.sync(&detached_legend, &[row(1.0, 2.0)]).expect("detached");
    assert_eq!(chart.engine().live_legends(), 1);
    let (_, updates, destroys) = legend_ops(chart.engine().ops());
    assert_eq!(updates, 0);
    assert_eq!(destroys, 0);
}

#[test]
fn added_category_rebuilds_and_the_legend_lists_the_new_key() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("construct");

    let mut config = chart.config().clone();
    config
        .categories
        .insert("disk", CategoryStyle::named("Disk").with_color("#22c55e"));
    chart.set_config(config);
    let action = chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("added key");
    assert_eq!(action, SyncAction::Rebuild);

    let last_mount = chart
        .engine()
        .ops()
        .iter()
        .rev()
        .find_map(|op| match op {
            EngineOp::MountLegend { items } => Some(items.clone()),
            _ => None,
        })
        .expect("legend remounted");
    assert_eq!(last_mount, ["CPU", "Memory", "Disk"]);
    // One extra area and line appeared for the new series.
    assert_eq!(chart.engine().live_drawables(), 8);
}

#[test]
fn rebuild_tears_the_legend_down_and_mounts_a_new_one() {
    let mut chart = AreaChart::new(RecordingEngine::new(), AreaChartConfig::new(categories()));
    chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("construct");

    let mut config = chart.config().clone();
    config.stacked = true;
    chart.set_config(config);
    let action = chart.sync(&host_with_legend(), &[row(1.0, 2.0)]).expect("rebuild");
    assert_eq!(action, SyncAction::Rebuild);

    let (mounts, _, destroys) = legend_ops(chart.engine().ops());
    assert_eq!(mounts, 2);
    assert_eq!(destroys, 1);
    assert_eq!(chart.engine().live_legends(), 1);
}
