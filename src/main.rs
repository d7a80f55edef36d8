use glam::Vec3;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use std::rc::Rc;

use crate::abs::{App, Face, Gl, GlowGl};
use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::scene::{Light, Scene, ShadingMode};

mod abs;
mod clock;
mod config;
mod loader;
mod menus;
mod scene;

const CONFIG_FILE: &str = "shadeview.json";

/// Current position in each preset table. The cycling keys advance these;
/// the digit keys overwrite the model slot directly.
#[derive(Debug, Default)]
struct Selections {
    model: usize,
    material: usize,
    env_map: usize,
    light: usize,
    bump: usize,
    decal: usize,
    shader: usize,
}

fn advance(slot: &mut usize, len: usize) -> usize {
    *slot = (*slot + 1) % len;
    *slot
}

fn digit_index(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0),
        Keycode::Num2 => Some(1),
        Keycode::Num3 => Some(2),
        Keycode::Num4 => Some(3),
        Keycode::Num5 => Some(4),
        Keycode::Num6 => Some(5),
        Keycode::Num7 => Some(6),
        Keycode::Num8 => Some(7),
        Keycode::Num9 => Some(8),
        Keycode::Num0 => Some(9),
        _ => None,
    }
}

fn init_logging(verbose: bool) {
    let debug_env = std::env::var("RUST_LOG").is_ok_and(|v| v.eq_ignore_ascii_case("debug"));
    let level = if verbose || debug_env {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .expect("Failed to install the logger");
}

fn switch_mode(scene: &mut Scene, mode: ShadingMode) {
    match scene.model_mut() {
        Some(model) => model.set_mode(mode),
        None => log::warn!("no model loaded, ignoring the mode change"),
    }
}

fn handle_key(code: Keycode, scene: &mut Scene, selections: &mut Selections, config: &ViewerConfig) {
    if let Some(index) = digit_index(code) {
        selections.model = index;
        menus::apply_model(scene, index);
        return;
    }
    match code {
        Keycode::M => {
            menus::apply_model(scene, advance(&mut selections.model, menus::MODELS.len()));
        }
        Keycode::T => {
            menus::apply_decal(scene, advance(&mut selections.decal, menus::DECALS.len()));
        }
        Keycode::B => {
            let index = advance(&mut selections.bump, menus::BUMP_MAPS.len());
            menus::apply_bump_map(scene, index, config.bump_height);
        }
        Keycode::E => {
            menus::apply_env_map(scene, advance(&mut selections.env_map, menus::ENV_MAPS.len()));
        }
        Keycode::C => {
            menus::apply_material(scene, advance(&mut selections.material, menus::MATERIALS.len()));
        }
        Keycode::L => {
            let index = advance(&mut selections.light, menus::LIGHT_COLORS.len());
            menus::apply_light_color(scene, index);
        }
        Keycode::S => {
            let index = advance(&mut selections.shader, menus::SHADER_LOOKS.len());
            menus::apply_shader_look(scene, index);
        }
        Keycode::W => {
            if let Some(model) = scene.model_mut() {
                model.toggle_outline();
            }
        }
        Keycode::N => switch_mode(scene, ShadingMode::Normal),
        Keycode::X => switch_mode(scene, ShadingMode::Explosion),
        Keycode::V => switch_mode(scene, ShadingMode::Explosion2),
        Keycode::R => switch_mode(scene, ShadingMode::Random),
        Keycode::G => switch_mode(scene, ShadingMode::GodRay),
        Keycode::Space => scene.toggle_spinning(),
        Keycode::P => scene.stop_spinning(),
        Keycode::Home => scene.reset_view(),
        Keycode::Left => scene.view_mut().spin_degrees(-5.0),
        Keycode::Right => scene.view_mut().spin_degrees(5.0),
        Keycode::Up => scene.view_mut().lift(0.2),
        Keycode::Down => scene.view_mut().lift(-0.2),
        _ => {}
    }
}

fn main() {
    let (config, config_error) = match std::fs::read_to_string(CONFIG_FILE) {
        Ok(text) => match ViewerConfig::parse(&text) {
            Ok(config) => (config, None),
            Err(err) => (
                ViewerConfig::default(),
                Some(format!("ignoring {CONFIG_FILE}: {err}")),
            ),
        },
        Err(_) => (ViewerConfig::default(), None),
    };
    init_logging(config.verbose);
    if let Some(err) = config_error {
        log::error!("{err}");
    }
    log::debug!("configuration: {config:?}");

    let mut app = App::new(
        "Shadeview",
        config.window_width,
        config.window_height,
        config.fullscreen,
        config.vsync,
    );
    log::debug!("video driver: {}", app.video_subsystem.current_video_driver());

    let gl: Rc<dyn Gl> = Rc::new(GlowGl::new(app.gl.clone()));
    gl.set_depth_test(true);
    gl.set_cull(Some(Face::Back));

    let (width, height) = app.window.size();
    let viewport = (width as i32, height as i32);
    gl.set_viewport(0, 0, viewport.0, viewport.1);

    let mut scene = match Scene::new(
        gl.clone(),
        &config.shader_dir,
        &config.media_dir,
        viewport,
        config.god_ray_offscreen,
    ) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("could not set up the scene: {err}");
            std::process::exit(1);
        }
    };

    // A dim overhead fill. It only shows up as a marker; shading follows
    // the primary light alone.
    let mut fill = Light::new();
    fill.set_color(Vec3::new(0.3, 0.3, 0.4));
    fill.set_center(Vec3::new(0.0, 5.0, 0.0));
    fill.set_radius(6.0);
    scene.add_light(fill);

    let mut selections = Selections::default();
    menus::apply_model(&mut scene, selections.model);

    log::info!("keys: M model, T texture, B bump map, E environment, C material, L light, S shader");
    log::info!("      1-0 pick a model, N/X/V/R/G shading modes, W outline, space/P animation");
    log::info!("      arrows and mouse drag orbit the view, wheel zooms, home resets, escape quits");

    let mut clock = FrameClock::new(config.max_framerate);
    'running: loop {
        clock.begin_frame();

        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::Resized(w, h),
                    ..
                } => {
                    gl.set_viewport(0, 0, w, h);
                    scene.set_viewport(w, h);
                }
                Event::KeyDown {
                    keycode: Some(code),
                    ..
                } => handle_key(code, &mut scene, &mut selections, &config),
                Event::MouseMotion {
                    mousestate,
                    xrel,
                    yrel,
                    ..
                } if mousestate.left() => {
                    scene.view_mut().spin_degrees(xrel as f32 * 0.4);
                    scene.view_mut().lift(yrel as f32 * -0.02);
                }
                Event::MouseWheel { y, .. } => {
                    scene.view_mut().zoom(y as f32 * 0.5);
                }
                _ => {}
            }
        }

        scene.tick(clock.delta());
        gl.clear(0.1, 0.1, 0.15, 1.0);
        scene.draw(clock.time_previous_frame(), clock.time_current_frame());
        app.window.gl_swap_window();

        clock.throttle();
    }
}
