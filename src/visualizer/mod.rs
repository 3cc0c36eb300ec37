extern crate sfml;

use crate::config::{keypad_index, Config};
use crate::emulator::audio::SquareWave;
use crate::emulator::basics::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::emulator::display::DisplayBuffer;
use crate::emulator::interface::{
    AudioGate, AudioSink, ControlSignal, InputSampler, Keypad, Palette, Presenter,
};
use sfml::audio::{Sound, SoundBuffer};
use sfml::graphics::{Color, RectangleShape, RenderTarget, RenderWindow, Shape, Transformable};
use sfml::system::{SfBox, Vector2f};
use sfml::window::{ContextSettings, Event, Key, Style, VideoMode};

const TITLE: &str = "CHIP-8 Emulator";

/// Builds one period of the tone so it can be looped by a `Sound`.
pub fn tone_buffer(config: &Config) -> Option<SfBox<SoundBuffer>> {
    let wave = SquareWave::new(
        config.square_wave_frequency,
        config.audio_sample_rate,
        config.volume,
    );
    SoundBuffer::from_samples(&wave.one_period(), 1, config.audio_sample_rate)
}

/// A window that presents the display, reads the keyboard and plays the tone.
pub struct Visualizer<'a> {
    window: RenderWindow,
    pixels: Vec<RectangleShape<'static>>,
    sound: Sound<'a>,
    sounding: bool,
}

impl<'a> Visualizer<'a> {
    pub fn new(config: &Config, tone: &'a SoundBuffer) -> Visualizer<'a> {
        let (width, height) = config.window_size();
        let window = RenderWindow::new(
            VideoMode::new(width, height, 32),
            TITLE,
            Style::CLOSE,
            &ContextSettings::default(),
        );
        let scale = config.scale_factor as f32;
        let mut sound = Sound::with_buffer(tone);
        sound.set_looping(true);
        Visualizer {
            window,
            pixels: init_pixels(scale),
            sound,
            sounding: false,
        }
    }
}

fn init_pixels(scale: f32) -> Vec<RectangleShape<'static>> {
    let mut pixels = Vec::with_capacity(SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize);
    for y in 0..SCREEN_HEIGHT as usize {
        for x in 0..SCREEN_WIDTH as usize {
            let mut pixel = RectangleShape::new();
            pixel.set_size(Vector2f::new(scale, scale));
            pixel.set_position(Vector2f::new(scale * x as f32, scale * y as f32));
            pixels.push(pixel);
        }
    }
    pixels
}

fn color(rgba: u32) -> Color {
    let (r, g, b, a) = Palette::rgba(rgba);
    Color::rgba(r, g, b, a)
}

/// Character on a key, for the keys the keypad layout uses.
fn key_char(code: Key) -> Option<char> {
    Some(match code {
        Key::Num0 => '0',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::Q => 'q',
        Key::W => 'w',
        Key::E => 'e',
        Key::R => 'r',
        Key::A => 'a',
        Key::S => 's',
        Key::D => 'd',
        Key::F => 'f',
        Key::Z => 'z',
        Key::X => 'x',
        Key::C => 'c',
        Key::V => 'v',
        _ => return None,
    })
}

impl<'a> Presenter for Visualizer<'a> {
    fn present(&mut self, display: &DisplayBuffer, palette: &Palette) {
        let foreground = color(palette.foreground);
        let background = color(palette.background);
        // The outline sits inside each cell.
        let outline = if palette.pixelated { -1.0 } else { 0.0 };
        self.window.clear(background);
        for (pixel, lit) in self.pixels.iter_mut().zip(display.pixels()) {
            if *lit {
                pixel.set_fill_color(foreground);
                pixel.set_outline_color(background);
                pixel.set_outline_thickness(outline);
                self.window.draw(&*pixel);
            }
        }
        self.window.display();
    }

    fn clear(&mut self, palette: &Palette) {
        self.window.clear(color(palette.background));
        self.window.display();
    }
}

impl<'a> InputSampler for Visualizer<'a> {
    fn sample(&mut self, keypad: &mut Keypad) -> Vec<ControlSignal> {
        let mut signals = Vec::new();
        while let Some(event) = self.window.poll_event() {
            match event {
                Event::Closed => signals.push(ControlSignal::Quit),
                Event::KeyPressed { code, .. } => match code {
                    Key::Escape => signals.push(ControlSignal::Quit),
                    Key::Space => signals.push(ControlSignal::TogglePause),
                    Key::Equal => signals.push(ControlSignal::Reset),
                    _ => {
                        if let Some(i) = key_char(code).and_then(keypad_index) {
                            keypad[i as usize] = true;
                        }
                    }
                },
                Event::KeyReleased { code, .. } => {
                    if let Some(i) = key_char(code).and_then(keypad_index) {
                        keypad[i as usize] = false;
                    }
                }
                _ => { /* do nothing */ }
            }
        }
        if signals.contains(&ControlSignal::Quit) {
            self.window.close();
        }
        signals
    }
}

impl<'a> AudioSink for Visualizer<'a> {
    fn set_gate(&mut self, gate: AudioGate) {
        match (gate, self.sounding) {
            (AudioGate::On, false) => self.sound.play(),
            (AudioGate::Off, true) => self.sound.pause(),
            _ => return,
        }
        self.sounding = gate.is_on();
    }
}
