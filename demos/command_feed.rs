use gaugeworks::catalog::{InMemoryApi, MemoryPersistence, Movie, MovieStore};
use gaugeworks::config::WindowConfig;
use gaugeworks::{Dashboard, DashboardCommand, DashboardStats, GaugeSlot, Scheduler};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // A small catalog served through the in-memory API seeds the gauges.
    let movies = (1..=8)
        .map(|n| Movie {
            id: n.to_string(),
            title: format!("Feature {n}"),
            year: 1990 + n,
            studio: "Demo Pictures".to_string(),
            rating: Some((n % 10 + 1) as u8),
            watched: n % 3 != 0,
        })
        .collect();
    let mut store = MovieStore::new(InMemoryApi::with_movies(movies), MemoryPersistence::new());
    store.fetch()?;
    let stats = store.stats();
    let average = DashboardStats::average_rating(store.movies());

    let window = WindowConfig {
        title: "Command feed".to_string(),
        ..WindowConfig::default()
    };
    let scheduler = Scheduler::new();
    let dashboard = Dashboard::new(&scheduler, stats, average, false)?.with_window(window);

    // Random commands from a sender thread, drained by the window on each redraw.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut rng = rand::rng();
        let slots = [
            GaugeSlot::Arc,
            GaugeSlot::Torus,
            GaugeSlot::Speedometer,
            GaugeSlot::Bar,
            GaugeSlot::Column,
        ];
        loop {
            let slot = slots[rng.random_range(0..slots.len())];
            let value = match slot {
                GaugeSlot::Speedometer => rng.random_range(0.0..10.0),
                GaugeSlot::Bar | GaugeSlot::Column => rng.random_range(0.0..8.0),
                GaugeSlot::Arc | GaugeSlot::Torus => rng.random_range(0.0..100.0),
            };
            let commands = [
                DashboardCommand::SetValue(slot, value),
                DashboardCommand::Rate(rng.random_range(1..=10)),
            ];

            if commands.iter().any(|command| sender.send(*command).is_err()) {
                break;
            }

            thread::sleep(Duration::from_millis(700));
        }
    });

    println!("Dashboard driven by random commands:");
    println!("- one gauge retargeted every 700 ms");
    println!("- rating widget re-rated alongside it");
    println!("Close the window to exit");

    dashboard.show_with_commands(receiver)?;
    Ok(())
}
