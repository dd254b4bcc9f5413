//! Desktop viewer for the neuron field.
//!
//! Keys: Up/Down neuron count (applied on release), Q/A active ratio,
//! W/S active lighten, E/D cycle spread, R/F curve spread,
//! C/V cycle the base/core color.

use std::path::PathBuf;

use anyhow::Context;
use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::window::{PresentMode, PrimaryWindow};
use clap::Parser;
use neurons_core::{
    CountDebouncer, DrawCommand, FpsReadout, NeuronConfig, ParamEdit, Point, RecordingSurface,
    Rgb, Simulation, SurfaceSize,
};

// --- CONFIGURATION ---
const CURVE_SEGMENTS: usize = 16; // Line strip resolution per link
const CIRCLE_Z_STEP: f32 = 0.01; // Later circles stack on top
const RATIO_STEP: f32 = 0.5;
const LIGHT_STEP: f32 = 5.0;
const CYCLE_STEP: u32 = 25;
const CURVE_STEP: u32 = 5;
const PALETTE: [&str; 6] = [
    "#43b565", "#3fa7d6", "#e0607e", "#f2c14e", "#9b5de5", "#ffffff",
];

#[derive(Parser)]
#[command(name = "neurons-viewer")]
#[command(about = "Interactive neuron field")]
struct Cli {
    #[command(flatten)]
    params: NeuronConfig,

    /// TOML file with neuron parameters (replaces the flags above)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => NeuronConfig::load(path)
            .with_context(|| format!("loading neuron config from {}", path.display()))?,
        None => cli.params.clone(),
    };
    config.validate().context("invalid neuron parameters")?;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Neuron Field".into(),
                resolution: (cli.width, cli.height).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(StartupConfig(config))
        .insert_resource(Controls::default())
        .add_systems(Startup, setup_field)
        .add_systems(
            Update,
            (
                handle_controls, // 1. Apply committed edits
                tick_field,      // 2. Advance and record one frame
                draw_curves,     // 3. Links as gizmo strips
                sync_circles,    // 4. Bodies and cores via the mesh pool
                update_hud,      // 5. Parameters + FPS
            )
                .chain()
                .run_if(resource_exists::<Field>),
        )
        .run();
    Ok(())
}

// --- RESOURCES ---

#[derive(Resource)]
struct StartupConfig(NeuronConfig);

/// The simulation and the frame it last recorded
#[derive(Resource)]
struct Field {
    sim: Simulation,
    surface: RecordingSurface,
}

#[derive(Resource, Default)]
struct Controls {
    count: CountDebouncer,
    base_index: usize,
    core_index: usize,
}

/// Circle entities reused across frames; one material per slot.
#[derive(Resource)]
struct CirclePool {
    mesh: Mesh2dHandle,
    slots: Vec<(Entity, Handle<ColorMaterial>)>,
}

#[derive(Resource)]
struct HudState {
    readout: FpsReadout,
    fps_text: String,
}

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct PooledCircle;

fn to_world(p: Point, size: SurfaceSize) -> Vec2 {
    Vec2::new(p.x - size.width / 2.0, size.height / 2.0 - p.y)
}

fn to_color(c: Rgb) -> Color {
    Color::rgb_u8(c.r, c.g, c.b)
}

fn setup_field(
    mut commands: Commands,
    startup: Res<StartupConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut exit: EventWriter<AppExit>,
) {
    let Ok(window) = windows.get_single() else {
        error!("No primary window");
        exit.send(AppExit);
        return;
    };
    // Read once; resizing the window does not move the field
    let size = SurfaceSize::new(window.width(), window.height());

    let sim = match Simulation::new(startup.0.clone(), size) {
        Ok(sim) => sim,
        Err(e) => {
            error!(error = %e, "Cannot start neuron field");
            exit.send(AppExit);
            return;
        }
    };
    info!(
        neurons = sim.generation().len(),
        width = size.width,
        height = size.height,
        "Viewer ready"
    );

    commands.spawn(Camera2dBundle::default());
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 18.0,
                color: Color::rgba(1.0, 1.0, 1.0, 0.85),
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        HudText,
    ));

    commands.insert_resource(CirclePool {
        mesh: Mesh2dHandle(meshes.add(Circle::new(1.0))),
        slots: Vec::new(),
    });
    commands.insert_resource(HudState {
        readout: FpsReadout::default(),
        fps_text: String::new(),
    });
    commands.insert_resource(Field {
        sim,
        surface: RecordingSurface::default(),
    });
}

/// 1. Keyboard control surface
fn handle_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut controls: ResMut<Controls>,
    mut field: ResMut<Field>,
) {
    let config = field.sim.config().clone();
    let mut edits = Vec::new();

    // Held keys only move the pending count; the rebuild waits for release
    if keyboard.pressed(KeyCode::ArrowUp) {
        controls.count.nudge(config.neuron_count, 1);
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        controls.count.nudge(config.neuron_count, -1);
    }
    if keyboard.just_released(KeyCode::ArrowUp) || keyboard.just_released(KeyCode::ArrowDown) {
        edits.extend(controls.count.commit());
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        edits.push(ParamEdit::ActiveRatio(config.active_ratio + RATIO_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyA) {
        edits.push(ParamEdit::ActiveRatio(config.active_ratio - RATIO_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyW) {
        edits.push(ParamEdit::ActiveLightFactor(config.active_light_factor + LIGHT_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyS) {
        edits.push(ParamEdit::ActiveLightFactor(config.active_light_factor - LIGHT_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        edits.push(ParamEdit::CycleSpread(config.cycle_spread + CYCLE_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyD) {
        edits.push(ParamEdit::CycleSpread(config.cycle_spread.saturating_sub(CYCLE_STEP)));
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        edits.push(ParamEdit::CurveSpread(config.curve_spread + CURVE_STEP));
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        edits.push(ParamEdit::CurveSpread(config.curve_spread.saturating_sub(CURVE_STEP)));
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        controls.base_index = (controls.base_index + 1) % PALETTE.len();
        edits.push(ParamEdit::base_color_from_str(PALETTE[controls.base_index]));
    }
    if keyboard.just_pressed(KeyCode::KeyV) {
        controls.core_index = (controls.core_index + 1) % PALETTE.len();
        edits.push(ParamEdit::core_color_from_str(PALETTE[controls.core_index]));
    }

    for edit in edits {
        if let Err(e) = field.sim.apply(edit.clamped()) {
            warn!(error = %e, "Edit rejected");
        }
    }
}

/// 2. One simulation frame per display refresh
fn tick_field(time: Res<Time>, mut field: ResMut<Field>) {
    let field = &mut *field;
    field.sim.tick(&mut field.surface);
    field.sim.record_frame(time.elapsed_seconds_f64() * 1000.0);
}

/// 3. Sample each quadratic link into a line strip
fn draw_curves(field: Res<Field>, mut gizmos: Gizmos) {
    let size = field.sim.size();
    for command in field.surface.curves() {
        if let DrawCommand::Curve {
            from,
            control,
            to,
            color,
            ..
        } = *command
        {
            let points = (0..=CURVE_SEGMENTS).map(|i| {
                let t = i as f32 / CURVE_SEGMENTS as f32;
                to_world(Point::quadratic(from, control, to, t), size)
            });
            gizmos.linestrip_2d(points, to_color(color));
        }
    }
}

/// 4. Move pooled circles onto this frame's circles; hide the surplus
fn sync_circles(
    mut commands: Commands,
    field: Res<Field>,
    mut pool: ResMut<CirclePool>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut circles: Query<(&mut Transform, &mut Visibility), With<PooledCircle>>,
) {
    let size = field.sim.size();
    let mut used = 0;

    for (i, command) in field.surface.circles().enumerate() {
        let DrawCommand::Circle {
            center,
            radius,
            color,
        } = *command
        else {
            continue;
        };
        let transform = Transform::from_translation(
            to_world(center, size).extend(i as f32 * CIRCLE_Z_STEP),
        )
        .with_scale(Vec3::splat(radius));
        used = i + 1;

        if i < pool.slots.len() {
            let (entity, material) = &pool.slots[i];
            if let Some(material) = materials.get_mut(material) {
                material.color = to_color(color);
            }
            if let Ok((mut slot_transform, mut visibility)) = circles.get_mut(*entity) {
                *slot_transform = transform;
                *visibility = Visibility::Visible;
            }
        } else {
            let material = materials.add(ColorMaterial::from(to_color(color)));
            let entity = commands
                .spawn((
                    MaterialMesh2dBundle {
                        mesh: pool.mesh.clone(),
                        material: material.clone(),
                        transform,
                        ..default()
                    },
                    PooledCircle,
                ))
                .id();
            pool.slots.push((entity, material));
        }
    }

    for (entity, _) in pool.slots.iter().skip(used) {
        if let Ok((_, mut visibility)) = circles.get_mut(*entity) {
            *visibility = Visibility::Hidden;
        }
    }
}

/// 5. Parameter overlay; the FPS line refreshes once per second
fn update_hud(
    time: Res<Time>,
    field: Res<Field>,
    controls: Res<Controls>,
    mut hud: ResMut<HudState>,
    mut text_query: Query<&mut Text, With<HudText>>,
) {
    let now_ms = time.elapsed_seconds_f64() * 1000.0;
    if let Some(text) = hud.readout.poll(now_ms, field.sim.fps_meter()) {
        hud.fps_text = text;
    }

    let config = field.sim.config();
    let pending = controls
        .count
        .pending()
        .map(|n| format!(" -> {}", n))
        .unwrap_or_default();

    for mut text in text_query.iter_mut() {
        text.sections[0].value = format!(
            "Neurons: {}{}  [Up/Down]\n\
             Active ratio: {:.1}  [Q/A]\n\
             Active lighten: {:.0}%  [W/S]\n\
             Cycle spread: {}  [E/D]\n\
             Curve spread: {}  [R/F]\n\
             Colors: {} / {}  [C/V]\n\
             Active: {}\n\
             {}",
            field.sim.generation().len(),
            pending,
            config.active_ratio,
            config.active_light_factor,
            config.cycle_spread,
            config.curve_spread,
            config.base_color,
            config.core_color(),
            field.sim.generation().active_count(),
            hud.fps_text
        );
    }
}
