use gaugeworks::catalog::{InMemoryApi, JsonFilePersistence, MemoryPersistence, Movie, MovieStore};
use gaugeworks::config::WindowConfig;
use gaugeworks::raster::load_font;
use gaugeworks::{Dashboard, DashboardCommand, DashboardStats, Scheduler};
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Options {
    title: Option<String>,
    font: Option<PathBuf>,
    demo: bool,
    catalog: Option<PathBuf>,
    fps: Option<f64>,
    svg: Option<PathBuf>,
}

fn parse_args() -> Options {
    let mut options = Options::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => options.title = args.next(),
            "--font" => options.font = args.next().map(PathBuf::from),
            "--demo" => options.demo = true,
            "--catalog" => options.catalog = args.next().map(PathBuf::from),
            "--fps" => {
                if let Some(fps) = args.next().and_then(|v| v.parse::<f64>().ok()) {
                    options.fps = Some(fps);
                }
            }
            "--svg" => options.svg = args.next().map(PathBuf::from),
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    options
}

fn sample_movies() -> Vec<Movie> {
    [
        ("1", "Heat", 1995, "Warner Bros.", Some(9), true),
        ("2", "Alien", 1979, "20th Century Fox", Some(8), true),
        ("3", "Ran", 1985, "Toho", None, false),
        ("4", "Ikiru", 1952, "Toho", Some(7), false),
        ("5", "Blade Runner", 1982, "Warner Bros.", Some(9), true),
    ]
    .into_iter()
    .map(|(id, title, year, studio, rating, watched)| Movie {
        id: id.to_string(),
        title: title.to_string(),
        year,
        studio: studio.to_string(),
        rating,
        watched,
    })
    .collect()
}

/// Stats and mean rating, from the cached catalog if one was given.
fn load_catalog(dir: Option<&PathBuf>) -> (DashboardStats, Option<f64>) {
    let movies = match dir {
        Some(dir) => {
            let mut store = MovieStore::new(InMemoryApi::new(), JsonFilePersistence::new(dir));
            match store.load() {
                Ok(count) => info!(count, dir = %dir.display(), "catalog cache loaded"),
                Err(err) => warn!(%err, "catalog cache unreadable, starting empty"),
            }
            store.movies().to_vec()
        }
        None => {
            let mut store =
                MovieStore::new(InMemoryApi::with_movies(sample_movies()), MemoryPersistence::new());
            if let Err(err) = store.fetch() {
                warn!(%err, "sample catalog unavailable");
            }
            store.movies().to_vec()
        }
    };
    (
        DashboardStats::from_movies(&movies),
        DashboardStats::average_rating(&movies),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let options = parse_args();

    let mut window = WindowConfig::default();
    if let Some(title) = options.title.clone() {
        window.title = title;
    }
    if let Some(fps) = options.fps {
        window.max_framerate = fps;
    }

    let font = match options.font.as_deref() {
        Some(path) => match load_font(path) {
            Ok(font) => Some(font),
            Err(err) => {
                warn!(%err, "text will not be drawn");
                None
            }
        },
        None => {
            warn!("no --font given, text will not be drawn");
            None
        }
    };

    let (stats, average_rating) = load_catalog(options.catalog.as_ref());
    let scheduler = Scheduler::new();
    let mut dashboard = Dashboard::new(&scheduler, stats, average_rating, options.demo)?
        .with_window(window)
        .with_font(font);

    if let Some(path) = options.svg {
        // Let the animations settle before taking the snapshot.
        for _ in 0..180 {
            dashboard.advance(Duration::from_millis(16));
        }
        fs::write(&path, dashboard.scene().to_svg())?;
        info!(path = %path.display(), "scene written");
        return Ok(());
    }

    // Read commands such as `arc 42` or `demo on` from stdin.
    let (sender, receiver) = mpsc::channel::<DashboardCommand>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "skipping input line"),
            }
        }
    });

    dashboard.show_with_commands(receiver)?;
    Ok(())
}
