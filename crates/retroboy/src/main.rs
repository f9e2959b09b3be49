use std::path::PathBuf;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!(
            "Usage: retroboy <rom_path> [save_dir] < script\n\
             Script commands: r ADDR | w ADDR DATA | state | save"
        );
        std::process::exit(2);
    });
    let save_dir = args.next().map(PathBuf::from);

    log::info!("Probing ROM path: '{}'", rom_path.display());
    if let Err(err) = retroboy::run(&rom_path, save_dir.as_deref()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
