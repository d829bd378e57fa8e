use peermap::{
    core::{
        config::CameraConfig,
        projection,
        viewport::{clamp_camera, wrap_offsets},
    },
    Camera, LatLng, Point, Viewport, ViewportSize,
};

const SIZE: ViewportSize = ViewportSize {
    width: 1280.0,
    height: 720.0,
    bottom_inset: 0.0,
};

#[test]
fn test_forward_inverse_round_trip() {
    for lng in (-180..=180).step_by(15) {
        for lat in (-84..=84).step_by(7) {
            let (u, v) = projection::forward(lng as f64, lat as f64);
            let (back_lng, back_lat) = projection::inverse(u, v);
            assert!((back_lng - lng as f64).abs() < 1e-6, "lng {lng} -> {back_lng}");
            assert!((back_lat - lat as f64).abs() < 1e-6, "lat {lat} -> {back_lat}");
        }
    }
}

#[test]
fn test_screen_world_round_trip() {
    let cameras = [
        Camera::new(0.0, 0.0, 1.0),
        Camera::new(-300.0, 120.0, 3.5),
        Camera::new(512.0, -80.0, 12.0),
        Camera::new(17.25, 3.0, 39.0),
    ];
    for camera in cameras {
        for (lng, lat) in [(-74.0, 40.7), (139.7, 35.7), (0.0, 0.0), (-58.4, -34.6), (151.2, -33.9)] {
            let screen = projection::to_screen(lng, lat, &camera, &SIZE);
            let world = projection::to_world(screen.x, screen.y, &camera, &SIZE);
            assert!((world.lng - lng).abs() < 1e-6, "{camera:?}: lng {lng} -> {}", world.lng);
            assert!((world.lat - lat).abs() < 1e-6, "{camera:?}: lat {lat} -> {}", world.lat);
        }
    }
}

#[test]
fn test_vertical_pan_locked_at_world_zoom() {
    let mut viewport = Viewport::new(SIZE, CameraConfig::default());
    viewport.pan(Point::new(40.0, 300.0));
    viewport.pan(Point::new(0.0, -900.0));
    while viewport.step() {}
    assert_eq!(viewport.current().y, 0.0);
    assert_eq!(viewport.target().y, 0.0);

    let config = CameraConfig {
        min_zoom: 0.5,
        ..CameraConfig::default()
    };
    for zoom in [0.5, 0.75, 1.0] {
        let clamped = clamp_camera(Camera::new(10.0, 250.0, zoom), &SIZE, &config);
        assert_eq!(clamped.y, 0.0, "zoom {zoom}");
    }
}

#[test]
fn test_vertical_pan_stops_at_world_edge() {
    let mut viewport = Viewport::new(SIZE, CameraConfig::default());
    viewport.jump_to(Camera::new(0.0, 0.0, 4.0));
    viewport.pan(Point::new(0.0, 100_000.0));

    // The top edge of the world stays at or above the top of the canvas
    let top = projection::to_screen(0.0, 85.0, viewport.current(), viewport.size());
    assert!(top.y.abs() < 1e-6, "top edge at {}", top.y);
}

#[test]
fn test_wrap_offsets_cover_viewport() {
    let margin = CameraConfig::default().wrap_margin_px;
    let w = SIZE.width;
    for zoom in [1.0, 1.3, 2.0, 5.0, 17.0] {
        for x in [-640.0, -300.0, 0.0, 211.0, 639.0] {
            let camera = Camera::new(x, 0.0, zoom);
            let offsets = wrap_offsets(&camera, &SIZE, margin);
            assert!(!offsets.is_empty());

            let half_view = (w / 2.0) / zoom;
            let first = *offsets.first().unwrap_or(&0) as f64;
            let last = *offsets.last().unwrap_or(&0) as f64;
            assert!((first - 0.5) * w <= x - half_view + 1e-9, "zoom {zoom} x {x}");
            assert!((last + 0.5) * w >= x + half_view - 1e-9, "zoom {zoom} x {x}");
        }
    }
}

#[test]
fn test_wrap_offsets_never_empty_for_degenerate_views() {
    let empty = ViewportSize::new(0.0, 0.0);
    assert_eq!(wrap_offsets(&Camera::new(0.0, 0.0, 1.0), &empty, 64.0), vec![0]);
    assert!(!wrap_offsets(&Camera::new(1e9, 0.0, 40.0), &SIZE, 0.0).is_empty());
}

#[test]
fn test_focus_keeps_target_visible_above_panel() {
    let mut viewport = Viewport::new(SIZE.with_bottom_inset(300.0), CameraConfig::default());
    let tokyo = LatLng::new(35.7, 139.7);
    let zoom = viewport.focus_on(&tokyo);
    assert!(zoom >= CameraConfig::default().min_zoom);
    while viewport.step() {}

    let screen = projection::to_screen(tokyo.lng, tokyo.lat, viewport.current(), viewport.size());
    assert!(screen.y >= 0.0 && screen.y <= SIZE.height - 300.0, "y = {}", screen.y);
    assert!(screen.x >= 0.0 && screen.x <= SIZE.width, "x = {}", screen.x);
}
