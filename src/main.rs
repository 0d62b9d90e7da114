/// Entry point and game loop.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use sokoterm::config::GameConfig;
use sokoterm::logging;
use sokoterm::sim::event::GameEvent;
use sokoterm::sim::step::{self, FrameInput};
use sokoterm::sim::world::WorldState;
use sokoterm::ui::gamepad::GamepadState;
use sokoterm::ui::input::{self, InputState};
use sokoterm::ui::renderer::Renderer;
use sokoterm::ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Animation and message-bar tick.
const UI_TICK: Duration = Duration::from_millis(100);
const SECOND: Duration = Duration::from_secs(1);

fn main() {
    let (config, config_warning) = GameConfig::load();
    logging::init(&config.log);
    if let Some(w) = config_warning {
        warn!("{}", w.0);
    }
    info!(levels_dir = %config.levels_dir.display(), "sokoterm starting");

    let mut world = WorldState::new(&config);
    world.levels.load_level_names();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        tracing::error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }
    info!("sokoterm exiting");
    println!("Thanks for playing sokoterm!");
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_ui_tick = Instant::now();
    let mut last_second = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        // Keyboard first, one key at a time in press order, then the pad
        // against whatever phase the keys left behind.
        let mut events = input::apply_presses(world, kb.pressed_keys());
        let pad = gp.actions(world.phase);
        if !pad.is_empty() && !events.contains(&GameEvent::Quit) {
            events.extend(step::step(world, FrameInput { actions: pad }));
        }

        if world.sound_fx {
            if let Some(sfx) = sound {
                events.iter().for_each(|e| sfx.play_event(e));
            }
        }
        if events.contains(&GameEvent::Quit) {
            break;
        }

        if last_ui_tick.elapsed() >= UI_TICK {
            step::tick_frame(world);
            last_ui_tick = Instant::now();
        }
        if last_second.elapsed() >= SECOND {
            step::tick_second(world);
            last_second += SECOND;
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
