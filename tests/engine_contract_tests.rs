use std::sync::Arc;

use indexmap::IndexMap;

use vizkit::core::{CategoryMap, CategoryStyle};
use vizkit::engine::config::{
    AxisConfig, AxisKind, ContainerConfig, DonutConfig, DrawableConfig, LegendConfig,
};
use vizkit::engine::{RecordingEngine, Surface, SurfaceId, VisEngine};
use vizkit::{BarChart, BarChartConfig, ChartError, ChartHost, LineChart, LineChartConfig};

fn donut_config() -> DrawableConfig<f64> {
    DrawableConfig::Donut(DonutConfig {
        value: Arc::new(|value: &f64| *value),
        colors: vec!["#ef4444".to_owned()],
        arc_width: 20.0,
        corner_radius: 0.0,
        pad_angle: 0.0,
        angle_range: None,
    })
}

fn axis_config() -> DrawableConfig<f64> {
    DrawableConfig::Axis(AxisConfig::new(AxisKind::X))
}

#[test]
fn updating_an_unknown_drawable_errors() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let id = engine.create_drawable(donut_config()).expect("create");
    engine.destroy_drawable(id).expect("destroy");
    let err = engine.update_drawable(id, donut_config()).unwrap_err();
    assert!(matches!(err, ChartError::UnknownDrawable { .. }));
}

#[test]
fn config_kind_mismatch_is_rejected() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let id = engine.create_drawable(donut_config()).expect("create");
    let err = engine.update_drawable(id, axis_config()).unwrap_err();
    assert!(matches!(err, ChartError::ConfigMismatch { .. }));
    // The drawable survives the rejected update.
    engine.update_drawable(id, donut_config()).expect("update");
}

#[test]
fn mounting_on_a_detached_surface_errors() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let err = engine
        .mount_container(
            Surface::detached(SurfaceId::from_raw(3)),
            ContainerConfig::default(),
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, ChartError::SurfaceDetached { surface: 3 }));
}

#[test]
fn containers_reject_unknown_component_ids() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let id = engine.create_drawable(donut_config()).expect("create");
    engine.destroy_drawable(id).expect("destroy");

    let mut config = ContainerConfig::default();
    config.components.push(id);
    let err = engine
        .mount_container(Surface::attached(SurfaceId::from_raw(1)), config, &[])
        .unwrap_err();
    assert!(matches!(err, ChartError::UnknownDrawable { .. }));
}

#[test]
fn destroyed_containers_reject_further_calls() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let id = engine
        .mount_container(
            Surface::attached(SurfaceId::from_raw(1)),
            ContainerConfig::default(),
            &[1.0, 2.0],
        )
        .expect("mount");
    engine.destroy_container(id).expect("destroy");
    let err = engine.set_data(id, &[3.0]).unwrap_err();
    assert!(matches!(err, ChartError::UnknownContainer { .. }));
}

#[test]
fn legends_follow_the_same_lifecycle_rules() {
    let mut engine: RecordingEngine<f64> = RecordingEngine::new();
    let config = LegendConfig {
        items: Vec::new(),
        alignment: vizkit::core::LegendAlignment::Center,
    };
    let id = engine
        .mount_legend(Surface::attached(SurfaceId::from_raw(2)), config.clone())
        .expect("mount");
    engine.update_legend(id, config.clone()).expect("update");
    engine.destroy_legend(id).expect("destroy");
    let err = engine.update_legend(id, config).unwrap_err();
    assert!(matches!(err, ChartError::UnknownLegend { .. }));
}

#[test]
fn bar_chart_without_value_keys_surfaces_an_invalid_config() {
    let config = BarChartConfig::new(
        CategoryMap::new().with("cpu", CategoryStyle::named("CPU").with_color("#ef4444")),
        Vec::new(),
    );
    let mut chart: BarChart<IndexMap<String, f64>, _> =
        BarChart::new(RecordingEngine::new(), config);
    let host = ChartHost::new(Surface::attached(SurfaceId::from_raw(1)));
    let err = chart.sync(&host, &[]).unwrap_err();
    assert!(matches!(err, ChartError::InvalidConfig(_)));
    // The failed construct left nothing behind.
    assert_eq!(chart.engine().live_drawables(), 0);
    assert_eq!(chart.engine().live_containers(), 0);
}

#[test]
fn error_messages_name_the_offending_instance() {
    let mut chart: LineChart<IndexMap<String, f64>, _> = LineChart::new(
        RecordingEngine::new(),
        LineChartConfig::new(
            CategoryMap::new().with("cpu", CategoryStyle::named("CPU").with_color("#ef4444")),
        ),
    );
    // Releasing an unbuilt view makes no engine calls and cannot fail.
    chart.release().expect("release unbuilt");

    let err = ChartError::UnknownDrawable { id: 42 };
    assert_eq!(err.to_string(), "unknown drawable id 42");
}
