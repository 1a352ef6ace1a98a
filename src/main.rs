//! NES emulator entry point.
//!
//! Loads a cartridge and runs the emulator in a window. Usage: `nescoil [path/to/game.nes]`

use std::env;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use minifb::{Key, Window, WindowOptions};
use nescoil::cartridge::cartridge::Cartridge;
use nescoil::nes::Nes;

/// NES frame rate ~60.0988 Hz (NTSC). Target one frame per 16.67 ms for ~60 fps display.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

const WINDOW_WIDTH: usize = 256;
const WINDOW_HEIGHT: usize = 224;

/// NES controller 1 bits: 0=A, 1=B, 2=Select, 3=Start, 4=Up, 5=Down, 6=Left, 7=Right.
fn buttons_from_keys(window: &Window) -> u8 {
    let mut buttons = 0u8;
    if window.is_key_down(Key::Z) {
        buttons |= 1 << 0; // A
    }
    if window.is_key_down(Key::X) {
        buttons |= 1 << 1; // B
    }
    if window.is_key_down(Key::RightShift) || window.is_key_down(Key::LeftShift) {
        buttons |= 1 << 2; // Select
    }
    if window.is_key_down(Key::Enter) {
        buttons |= 1 << 3; // Start
    }
    if window.is_key_down(Key::Up) {
        buttons |= 1 << 4;
    }
    if window.is_key_down(Key::Down) {
        buttons |= 1 << 5;
    }
    if window.is_key_down(Key::Left) {
        buttons |= 1 << 6;
    }
    if window.is_key_down(Key::Right) {
        buttons |= 1 << 7;
    }
    buttons
}

/// Convert the emulator's 256×256 RGBA buffer into the 0RGB u32 pixels `minifb` wants, taking
/// only the top 224 visible rows.
fn to_window_buffer(rgba: &[u8]) -> Vec<u32> {
    let mut out = Vec::with_capacity(WINDOW_WIDTH * WINDOW_HEIGHT);
    for row in 0..WINDOW_HEIGHT {
        for col in 0..WINDOW_WIDTH {
            let i = (row * WINDOW_WIDTH + col) * 4;
            let pixel = (rgba[i] as u32) << 16 | (rgba[i + 1] as u32) << 8 | rgba[i + 2] as u32;
            out.push(pixel);
        }
    }
    out
}

fn main() -> ExitCode {
    let path = env::args().nth(1).unwrap_or_else(|| "test/nestest.nes".to_string());

    let cart = match Cartridge::load(&path) {
        Ok(cart) => cart,
        Err(err) => {
            eprintln!("failed to load {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut nes = Nes::new(cart);

    let mut window = Window::new(
        "nescoil",
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        WindowOptions {
            borderless: true,
            resize: true,
            scale: minifb::Scale::FitScreen,
            scale_mode: minifb::ScaleMode::AspectRatioStretch,
            topmost: true,
            title: false,
            transparency: false,
            none: false,
        },
    )
    .expect("failed to create window");

    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        nes.latch_buttons(buttons_from_keys(&window));

        let Some(frame) = nes.step_frame() else {
            break; // CPU hit a JAM/KIL opcode
        };
        window
            .update_with_buffer(&to_window_buffer(&frame), WINDOW_WIDTH, WINDOW_HEIGHT)
            .expect("failed to update window");

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    ExitCode::SUCCESS
}
