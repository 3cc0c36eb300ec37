use chip8::config::{parse_color, Config};
use chip8::emulator::ascii_display::AsciiFrontend;
use chip8::emulator::executor::Executor;
use chip8::emulator::memory::read_image;
use chip8::emulator::vm::MachineState;
use clap::Parser;
use log::{info, LevelFilter};
use std::error::Error;
use std::path::PathBuf;

/// CHIP-8 interpreter
#[derive(Parser, Debug)]
#[command(name = "chip8")]
#[command(about = "Runs a CHIP-8 program image", long_about = None)]
struct Args {
    /// Program image, loaded at 0x200
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = 700)]
    ips: u32,

    /// Host pixels per display cell
    #[arg(long, default_value_t = 20)]
    scale: u32,

    /// Foreground colour as RRGGBBAA
    #[arg(long, default_value = "FFFFFFFF", value_parser = parse_color)]
    fg: u32,

    /// Background colour as RRGGBBAA
    #[arg(long, default_value = "000000FF", value_parser = parse_color)]
    bg: u32,

    /// Draw lit cells without the background outline
    #[arg(long)]
    no_pixelated: bool,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 440)]
    tone: u32,

    /// Tone amplitude
    #[arg(long, default_value_t = 3000)]
    volume: i16,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Print frames to stdout instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            instructions_per_second: self.ips,
            scale_factor: self.scale,
            foreground: self.fg,
            background: self.bg,
            pixelated: !self.no_pixelated,
            square_wave_frequency: self.tone,
            volume: self.volume,
            ..Config::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::new();
    logger.filter_level(LevelFilter::Warn);
    if args.verbose {
        logger.filter_module("chip8", LevelFilter::Debug);
    }
    logger.parse_default_env().init();

    let config = args.config();
    config.validate()?;

    let image = read_image(&args.rom)?;
    info!("loaded {} bytes from {}", image.len(), args.rom.display());
    let vm = match args.seed {
        Some(seed) => MachineState::load_with_seed(&image, seed)?,
        None => MachineState::load(&image)?,
    };
    let mut executor = Executor::new(vm, &config);

    if !args.headless {
        #[cfg(feature = "sfml")]
        return run_window(&mut executor, &config);
        #[cfg(not(feature = "sfml"))]
        log::warn!("built without a window frontend, running headless");
    }

    let mut frontend = AsciiFrontend::stdout();
    let frames = executor.run_frames(&mut frontend, args.frames)?;
    info!("ran {} frames", frames);
    Ok(())
}

#[cfg(feature = "sfml")]
fn run_window(executor: &mut Executor, config: &Config) -> Result<(), Box<dyn Error>> {
    use chip8::visualizer::{tone_buffer, Visualizer};

    let tone = tone_buffer(config).ok_or("could not create the tone buffer")?;
    let mut window = Visualizer::new(config, &tone);
    executor.run(&mut window)?;
    Ok(())
}
