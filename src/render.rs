//! Render adapter
//!
//! Stateless drawing of the current simulation state onto a `Surface2D`.
//! The surface contract is the only rendering abstraction: a transform
//! stack plus rect fills and stroked polylines, which is all the demos
//! need. Colors come from an explicit palette value passed in by the host,
//! never from ambient theme state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::maze::{BacktrackerMaze, MazeGenerator, ScatterMaze};
use crate::sim::RaceSim;
use crate::track::{offset_polyline, Track};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Stroke parameters for a polyline. Implementations are expected to use
/// round caps and joins, which is what keeps the naive border mitring
/// invisible at normal curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Rgba,
    /// Dash pattern as (on, off) lengths; `None` strokes solid
    pub dash: Option<(f32, f32)>,
    pub dash_offset: f32,
}

impl StrokeStyle {
    pub fn solid(width: f32, color: Rgba) -> Self {
        Self {
            width,
            color,
            dash: None,
            dash_offset: 0.0,
        }
    }

    pub fn dashed(width: f32, color: Rgba, on: f32, off: f32, offset: f32) -> Self {
        Self {
            width,
            color,
            dash: Some((on, off)),
            dash_offset: offset,
        }
    }
}

/// The single 2D drawing surface contract.
///
/// Implementations maintain a transform stack (push/pop with translate,
/// rotate and uniform scale composed onto the top entry) and apply the
/// current transform to every fill and stroke.
pub trait Surface2D {
    /// Current pixel dimensions of the surface
    fn size(&self) -> Vec2;
    /// Fill the whole surface, ignoring the transform stack
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgba);
    fn stroke_polyline(&mut self, points: &[Vec2], style: &StrokeStyle);
    fn push(&mut self);
    fn pop(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: f32);
}

/// Headless surface that swallows every draw call. Useful for driving the
/// full loop in tests and the demo binary.
#[derive(Debug, Clone, Copy)]
pub struct NullSurface {
    size: Vec2,
}

impl NullSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }
}

impl Surface2D for NullSurface {
    fn size(&self) -> Vec2 {
        self.size
    }
    fn clear(&mut self, _color: Rgba) {}
    fn fill_rect(&mut self, _min: Vec2, _size: Vec2, _color: Rgba) {}
    fn stroke_polyline(&mut self, _points: &[Vec2], _style: &StrokeStyle) {}
    fn push(&mut self) {}
    fn pop(&mut self) {}
    fn translate(&mut self, _offset: Vec2) {}
    fn rotate(&mut self, _radians: f32) {}
    fn scale(&mut self, _factor: f32) {}
}

/// Theme colors, passed in explicitly instead of read from any global
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub grass: Rgba,
    pub road: Rgba,
    pub road_border: Rgba,
    pub lane_marker: Rgba,
    pub shoulder: Rgba,
    pub shoulder_alt: Rgba,
    pub check_light: Rgba,
    pub check_dark: Rgba,
    pub car_body: Rgba,
    pub car_shadow: Rgba,
    pub windshield: Rgba,
    pub roof: Rgba,
    pub headlight: Rgba,
    pub brake_dim: Rgba,
    pub brake_lit: Rgba,
    pub sensor_ray: Rgba,
    pub sensor_blocked: Rgba,
    pub maze_floor: Rgba,
    pub maze_wall: Rgba,
    pub maze_carved: Rgba,
    pub maze_entrance: Rgba,
    pub maze_visited: Rgba,
    pub maze_cursor: Rgba,
    pub maze_outline: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            grass: Rgba::rgb(0x3a, 0x6b, 0x3a),
            road: Rgba::rgb(0x55, 0x55, 0x55),
            road_border: Rgba::rgb(0x00, 0x00, 0x00),
            lane_marker: Rgba::rgb(0xff, 0xff, 0xff),
            shoulder: Rgba::rgb(0xc0, 0x39, 0x2b),
            shoulder_alt: Rgba::rgb(0xec, 0xf0, 0xf1),
            check_light: Rgba::rgb(0xff, 0xff, 0xff),
            check_dark: Rgba::rgb(0x00, 0x00, 0x00),
            car_body: Rgba::rgb(0x34, 0x98, 0xdb),
            car_shadow: Rgba::rgba(0, 0, 0, 128),
            windshield: Rgba::rgb(0xaa, 0xdd, 0xff),
            roof: Rgba::rgb(0x29, 0x80, 0xb9),
            headlight: Rgba::rgb(0xff, 0xff, 0x00),
            brake_dim: Rgba::rgb(0x88, 0x00, 0x00),
            brake_lit: Rgba::rgb(0xff, 0x00, 0x00),
            sensor_ray: Rgba::rgb(0xff, 0xff, 0x00),
            sensor_blocked: Rgba::rgb(0xff, 0x00, 0x00),
            maze_floor: Rgba::rgb(0x2a, 0x2e, 0x37),
            maze_wall: Rgba::rgb(0x16, 0x18, 0x1d),
            maze_carved: Rgba::rgb(0x57, 0x9f, 0xfb),
            maze_entrance: Rgba::rgb(0x37, 0xcd, 0xbe),
            maze_visited: Rgba::rgb(0x57, 0x9f, 0xfb),
            maze_cursor: Rgba::rgb(0x37, 0xcd, 0xbe),
            maze_outline: Rgba::rgb(0xa6, 0xad, 0xbb),
        }
    }
}

/// Draw one full racing frame. Pure function of the sim state; a
/// zero-length track draws only the background.
pub fn draw_race(surface: &mut dyn Surface2D, sim: &RaceSim, palette: &Palette) {
    surface.clear(palette.grass);
    if sim.track.spine.len() < 2 {
        return;
    }

    surface.push();
    let half_viewport = surface.size() / 2.0;
    surface.translate(half_viewport);
    surface.scale(sim.camera.zoom);
    surface.translate(-sim.camera.pos);

    draw_track(surface, &sim.track, sim.config.carriageway_width(), sim.config.lane_count, sim.config.lane_width, palette);
    draw_car(surface, sim, palette);
    if sim.config.show_sensors {
        draw_sensor(surface, sim, palette);
    }

    surface.pop();
}

fn draw_track(
    surface: &mut dyn Surface2D,
    track: &Track,
    total_width: f32,
    lane_count: u32,
    lane_width: f32,
    palette: &Palette,
) {
    let spine = &track.spine;

    // Widest strokes first: alternating shoulder stripes, then the black
    // border band, then the road itself on top
    surface.stroke_polyline(
        spine,
        &StrokeStyle::dashed(total_width + 20.0, palette.shoulder, 40.0, 40.0, 0.0),
    );
    surface.stroke_polyline(
        spine,
        &StrokeStyle::dashed(total_width + 20.0, palette.shoulder_alt, 40.0, 40.0, 40.0),
    );
    surface.stroke_polyline(
        spine,
        &StrokeStyle::solid(total_width + 4.0, palette.road_border),
    );
    surface.stroke_polyline(spine, &StrokeStyle::solid(total_width, palette.road));

    // Dashed lane markers between lanes
    if lane_count > 1 {
        let half_width = total_width / 2.0;
        for lane in 1..lane_count {
            let offset = -half_width + lane as f32 * lane_width;
            let marker = offset_polyline(spine, offset);
            surface.stroke_polyline(
                &marker,
                &StrokeStyle::dashed(2.0, palette.lane_marker, 20.0, 30.0, 0.0),
            );
        }
    }

    // Checkered start and finish bars across the first and last segments
    draw_checkered_bar(surface, spine[0], spine[1], total_width, palette);
    draw_checkered_bar(
        surface,
        spine[spine.len() - 2],
        spine[spine.len() - 1],
        total_width,
        palette,
    );
}

fn draw_checkered_bar(
    surface: &mut dyn Surface2D,
    p1: Vec2,
    p2: Vec2,
    width: f32,
    palette: &Palette,
) {
    surface.push();
    surface.translate(p1);
    surface.rotate((p2.y - p1.y).atan2(p2.x - p1.x));

    let check = width / 8.0;
    surface.fill_rect(
        Vec2::new(0.0, -width / 2.0),
        Vec2::new(20.0, width),
        palette.check_light,
    );
    for row in 0..2 {
        for col in 0..8 {
            if (row + col) % 2 == 0 {
                surface.fill_rect(
                    Vec2::new(row as f32 * 10.0, -width / 2.0 + col as f32 * check),
                    Vec2::new(10.0, check),
                    palette.check_dark,
                );
            }
        }
    }
    surface.pop();
}

fn draw_car(surface: &mut dyn Surface2D, sim: &RaceSim, palette: &Palette) {
    let car = &sim.car;
    surface.push();
    surface.translate(car.pos);
    surface.rotate(car.angle);

    // Body runs along the local x axis (heading); width across y
    let (w, h) = (car.width, car.height);
    surface.fill_rect(
        Vec2::new(-h / 2.0 + 5.0, -w / 2.0 + 5.0),
        Vec2::new(h, w),
        palette.car_shadow,
    );
    surface.fill_rect(Vec2::new(-h / 2.0, -w / 2.0), Vec2::new(h, w), palette.car_body);

    // Windshield and roof
    surface.fill_rect(
        Vec2::new(0.0, -w / 2.0 + 2.0),
        Vec2::new(10.0, w - 4.0),
        palette.windshield,
    );
    surface.fill_rect(
        Vec2::new(-10.0, -w / 2.0 + 2.0),
        Vec2::new(10.0, w - 4.0),
        palette.roof,
    );

    // Headlights
    surface.fill_rect(
        Vec2::new(h / 2.0 - 2.0, -w / 2.0 + 2.0),
        Vec2::new(2.0, 6.0),
        palette.headlight,
    );
    surface.fill_rect(
        Vec2::new(h / 2.0 - 2.0, w / 2.0 - 8.0),
        Vec2::new(2.0, 6.0),
        palette.headlight,
    );

    // Brake lights follow the reverse input
    let brake = if sim.input.down {
        palette.brake_lit
    } else {
        palette.brake_dim
    };
    surface.fill_rect(
        Vec2::new(-h / 2.0, -w / 2.0 + 2.0),
        Vec2::new(2.0, 6.0),
        brake,
    );
    surface.fill_rect(Vec2::new(-h / 2.0, w / 2.0 - 8.0), Vec2::new(2.0, 6.0), brake);

    surface.pop();
}

/// Sensor overlay: the seen part of each ray in the ray color, the part
/// beyond the hit in the blocked color. Rays are world-space, so this
/// draws outside the car's local transform.
fn draw_sensor(surface: &mut dyn Surface2D, sim: &RaceSim, palette: &Palette) {
    for (i, &(start, end)) in sim.sensor.rays.iter().enumerate() {
        let seen_end = sim
            .sensor
            .readings
            .get(i)
            .and_then(|r| r.as_ref())
            .map_or(end, |hit| hit.point);
        surface.stroke_polyline(
            &[start, seen_end],
            &StrokeStyle::solid(2.0, palette.sensor_ray),
        );
        surface.stroke_polyline(
            &[end, seen_end],
            &StrokeStyle::solid(2.0, palette.sensor_blocked),
        );
    }
}

/// Draw the scatter-variant maze as filled cells
pub fn draw_scatter_maze(
    surface: &mut dyn Surface2D,
    maze: &ScatterMaze,
    cell_px: f32,
    palette: &Palette,
) {
    for cell in maze.cells() {
        let mut color = palette.maze_floor;
        if cell.boundary {
            color = if cell.entrance {
                palette.maze_entrance
            } else {
                palette.maze_wall
            };
        }
        if !cell.wall {
            color = palette.maze_carved;
        }
        surface.fill_rect(
            Vec2::new(cell.col as f32 * cell_px, cell.row as f32 * cell_px),
            Vec2::splat(cell_px),
            color,
        );
    }
}

/// Draw the backtracking maze: visited fill, wall strokes and the cursor
pub fn draw_backtracker_maze(
    surface: &mut dyn Surface2D,
    maze: &BacktrackerMaze,
    cell_px: f32,
    palette: &Palette,
) {
    let wall_style = StrokeStyle::solid(cell_px * 0.1, palette.maze_outline);
    for cell in maze.cells() {
        let x1 = cell.col as f32 * cell_px;
        let y1 = cell.row as f32 * cell_px;
        let (x2, y2) = (x1 + cell_px, y1 + cell_px);

        let fill = if cell.visited {
            palette.maze_visited
        } else {
            palette.maze_floor
        };
        surface.fill_rect(Vec2::new(x1, y1), Vec2::splat(cell_px), fill);

        if cell.top {
            surface.stroke_polyline(&[Vec2::new(x1, y1), Vec2::new(x2, y1)], &wall_style);
        }
        if cell.right {
            surface.stroke_polyline(&[Vec2::new(x2, y1), Vec2::new(x2, y2)], &wall_style);
        }
        if cell.bottom {
            surface.stroke_polyline(&[Vec2::new(x2, y2), Vec2::new(x1, y2)], &wall_style);
        }
        if cell.left {
            surface.stroke_polyline(&[Vec2::new(x1, y2), Vec2::new(x1, y1)], &wall_style);
        }
    }
    if let Some((col, row)) = maze.current_cell() {
        surface.fill_rect(
            Vec2::new(col as f32 * cell_px, row as f32 * cell_px),
            Vec2::splat(cell_px),
            palette.maze_cursor,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaceConfig;
    use crate::sim::RaceSim;

    /// Records draw calls so tests can assert on structure
    struct RecordingSurface {
        size: Vec2,
        clears: usize,
        rects: usize,
        strokes: usize,
        depth: i32,
        max_depth: i32,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                size: Vec2::new(800.0, 600.0),
                clears: 0,
                rects: 0,
                strokes: 0,
                depth: 0,
                max_depth: 0,
            }
        }
    }

    impl Surface2D for RecordingSurface {
        fn size(&self) -> Vec2 {
            self.size
        }
        fn clear(&mut self, _color: Rgba) {
            self.clears += 1;
        }
        fn fill_rect(&mut self, _min: Vec2, size: Vec2, _color: Rgba) {
            assert!(size.x.is_finite() && size.y.is_finite());
            self.rects += 1;
        }
        fn stroke_polyline(&mut self, points: &[Vec2], style: &StrokeStyle) {
            assert!(style.width > 0.0);
            assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
            self.strokes += 1;
        }
        fn push(&mut self) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }
        fn pop(&mut self) {
            self.depth -= 1;
            assert!(self.depth >= 0, "unbalanced pop");
        }
        fn translate(&mut self, _offset: Vec2) {}
        fn rotate(&mut self, _radians: f32) {}
        fn scale(&mut self, _factor: f32) {}
    }

    fn sim() -> RaceSim {
        RaceSim::new(RaceConfig::default(), Vec2::new(800.0, 600.0), 5).unwrap()
    }

    #[test]
    fn test_empty_track_draws_only_background() {
        let mut surface = RecordingSurface::new();
        let sim = sim();
        draw_race(&mut surface, &sim, &Palette::default());
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.rects, 0);
        assert_eq!(surface.strokes, 0);
        assert_eq!(surface.depth, 0);
    }

    #[test]
    fn test_full_frame_balances_the_transform_stack() {
        let mut surface = RecordingSurface::new();
        let mut sim = sim();
        sim.generate_track(15);
        sim.tick(0.016); // populate sensor rays
        draw_race(&mut surface, &sim, &Palette::default());
        assert_eq!(surface.depth, 0);
        assert!(surface.max_depth >= 2);
        assert!(surface.strokes > 0);
        assert!(surface.rects > 0);
    }

    #[test]
    fn test_sensor_overlay_respects_config() {
        let palette = Palette::default();
        let mut sim = sim();
        sim.generate_track(0);
        sim.tick(0.016);

        let mut with = RecordingSurface::new();
        draw_race(&mut with, &sim, &palette);

        sim.config.show_sensors = false;
        let mut without = RecordingSurface::new();
        draw_race(&mut without, &sim, &palette);

        assert_eq!(with.strokes, without.strokes + 2 * sim.sensor.ray_count);
    }

    #[test]
    fn test_maze_drawing_covers_every_cell() {
        use crate::maze::{BacktrackerMaze, MazeGenerator};
        let mut maze = BacktrackerMaze::new(4, 3, 1).unwrap();
        maze.start();
        let mut surface = RecordingSurface::new();
        draw_backtracker_maze(&mut surface, &maze, 20.0, &Palette::default());
        // 12 cell fills plus the cursor, all walls still up: 4 strokes each
        assert_eq!(surface.rects, 4 * 3 + 1);
        assert_eq!(surface.strokes, 4 * 3 * 4);
    }
}
