use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};

use zaptv::cache::FileStore;
use zaptv::catalog::{Catalog, Category, Channel, EpgProgram, MediaItem};
use zaptv::config::Settings;
use zaptv::engine::{NavMode, OverlayId, RouterEvent};
use zaptv::Session;

/// Interactive shell for driving the navigation engine and caches from
/// a keyboard standing in for a TV remote. Arrow keys move focus,
/// Enter activates, Esc/Backspace is Back, digits quick-select a
/// channel, `f` toggles favorite on the focused channel, `q` quits.
#[derive(Parser)]
#[command(name = "zaptv")]
struct Cli {
    /// Columns of the home grid
    #[arg(long, default_value_t = 4)]
    columns: u32,

    /// Config file path (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "zaptv.log")]
    log_file: PathBuf,
}

const HOME: &str = "home";
const CHANNELS: &str = "channels";
const FAVORITES: &str = "favorites";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to file so the terminal stays usable for the shell itself.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&cli.log_file)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config_path = cli.config.unwrap_or_else(Settings::config_path);
    let settings = Settings::load(&config_path).unwrap_or_else(|e| {
        warn!("config unusable ({e:#}), falling back to defaults");
        Settings::default()
    });

    let store = Arc::new(FileStore::new(FileStore::default_dir()));
    let mut session: Session<String> = Session::new(
        settings,
        store,
        HOME,
        NavMode::Grid {
            columns: cli.columns,
        },
    );
    info!("starting zaptv shell");

    let home = OverlayId::new(HOME);
    for (position, rail) in ["Live TV", "Movies", "Series", "Favorites"]
        .iter()
        .enumerate()
    {
        session
            .router
            .register_focusable(&home, position as u32, rail.to_string());
    }

    let catalog = session.catalog.get(|| async { Ok(demo_catalog()) }).await?;
    println!(
        "{} {} channels, {} categories — arrows to move, q to quit",
        "ready:".green().bold(),
        catalog.channels.len(),
        catalog.categories.len()
    );

    crossterm::terminal::enable_raw_mode()?;
    let result = run(&mut session, &catalog).await;
    crossterm::terminal::disable_raw_mode()?;
    result
}

async fn run(session: &mut Session<String>, catalog: &Catalog) -> Result<()> {
    loop {
        for event in session.router.poll_timers() {
            print_event(&event);
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let raw = match key.code {
            KeyCode::Up => "ArrowUp",
            KeyCode::Down => "ArrowDown",
            KeyCode::Left => "ArrowLeft",
            KeyCode::Right => "ArrowRight",
            KeyCode::Enter => "Enter",
            KeyCode::Esc => "Escape",
            KeyCode::Backspace => "Backspace",
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('f') => {
                toggle_focused_favorite(session, catalog);
                continue;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let routed = session.router.dispatch(&c.to_string());
                print_event(&routed);
                continue;
            }
            _ => continue,
        };

        let routed = session.router.dispatch(raw);
        print_event(&routed);

        match routed {
            RouterEvent::Activated { overlay, position } => {
                handle_activation(session, catalog, &overlay, position).await;
            }
            RouterEvent::ChannelSelect(num) => match catalog.channel_by_number(num) {
                Some(channel) => {
                    session.recents.record(MediaItem::Channel(channel.clone()));
                    print_now_playing(session, channel).await;
                }
                None => println!("{} no channel #{num}\r", "miss:".red()),
            },
            _ => {}
        }
    }
}

async fn handle_activation(
    session: &mut Session<String>,
    catalog: &Catalog,
    overlay: &OverlayId,
    position: u32,
) {
    match (overlay.as_str(), position) {
        (HOME, 0) => {
            let controller = session
                .router
                .overlays_mut()
                .push(CHANNELS, NavMode::Linear);
            for (i, channel) in catalog.channels.iter().enumerate() {
                controller
                    .registry_mut()
                    .register(i as u32, channel.name.clone());
            }
            println!("{} channel list ({})\r", "open:".cyan(), catalog.channels.len());
        }
        (HOME, 3) => {
            let favorites = session.favorites.all();
            let controller = session
                .router
                .overlays_mut()
                .push(FAVORITES, NavMode::Linear);
            for (i, item) in favorites.iter().enumerate() {
                controller
                    .registry_mut()
                    .register(i as u32, item.display_name().to_string());
            }
            println!("{} favorites ({})\r", "open:".cyan(), favorites.len());
        }
        (HOME, _) => println!("{} rail not wired in the demo\r", "noop:".dimmed()),
        (CHANNELS, position) => {
            if let Some(channel) = catalog.channels.get(position as usize) {
                session.recents.record(MediaItem::Channel(channel.clone()));
                let channel = channel.clone();
                print_now_playing(session, &channel).await;
            }
        }
        _ => {}
    }
}

fn toggle_focused_favorite(session: &mut Session<String>, catalog: &Catalog) {
    let overlays = session.router.overlays();
    if overlays.active_id().as_str() != CHANNELS {
        return;
    }
    let Some(position) = overlays.active().current_position() else {
        return;
    };
    if let Some(channel) = catalog.channels.get(position as usize) {
        let now_favorite = session.favorites.toggle(MediaItem::Channel(channel.clone()));
        let verb = if now_favorite { "added" } else { "removed" };
        println!("{} {verb} {}\r", "favorite:".yellow(), channel.name);
    }
}

async fn print_now_playing(session: &Session<String>, channel: &Channel) {
    let channel_id = channel.epg_channel_id.clone();
    let fetch_id = channel_id.clone();
    let programs = session
        .guide
        .programs(&channel_id, move || async move { Ok(demo_guide(&fetch_id)) })
        .await;
    match programs {
        Ok(_) => {
            let now = session
                .guide
                .current_program(&channel.epg_channel_id)
                .map(|p| p.title)
                .unwrap_or_else(|| "no data".into());
            let next = session
                .guide
                .next_program(&channel.epg_channel_id)
                .map(|p| p.title)
                .unwrap_or_else(|| "no data".into());
            println!(
                "{} {} — now: {now}, next: {next}\r",
                "tune:".green(),
                channel.name
            );
        }
        Err(e) => println!("{} {e}\r", "guide error:".red()),
    }
}

fn print_event(event: &RouterEvent<String>) {
    match event {
        RouterEvent::Ignored => {}
        RouterEvent::Moved { position, scroll_to } => {
            println!("{} {scroll_to} (position {position})\r", "focus:".blue())
        }
        RouterEvent::Activated { overlay, position } => {
            println!("{} {overlay} position {position}\r", "enter:".green())
        }
        RouterEvent::BackPopped(id) => println!("{} closed {id}\r", "back:".magenta()),
        RouterEvent::BackIgnored => println!("{} already home\r", "back:".dimmed()),
        RouterEvent::DigitEntry { value } => println!("{} {value}\r", "digits:".yellow()),
        RouterEvent::ChannelSelect(num) => println!("{} #{num}\r", "select:".yellow()),
        RouterEvent::DigitCancelled => println!("{} cancelled\r", "digits:".dimmed()),
        RouterEvent::DigitExpired => println!("{} timed out\r", "digits:".dimmed()),
        RouterEvent::OverlayDismissed(id) => println!("{} dismissed {id}\r", "timer:".magenta()),
    }
}

fn demo_catalog() -> Catalog {
    let categories = vec![
        Category {
            category_id: "news".into(),
            category_name: "News".into(),
        },
        Category {
            category_id: "sports".into(),
            category_name: "Sports".into(),
        },
    ];
    let names = [
        ("News 24", "news"),
        ("World Report", "news"),
        ("Sport One", "sports"),
        ("Sport Two", "sports"),
        ("Docs HD", "news"),
        ("Kickoff", "sports"),
    ];
    let channels = names
        .iter()
        .enumerate()
        .map(|(i, (name, category))| Channel {
            num: i as u32 + 1,
            name: name.to_string(),
            stream_id: 1000 + i as u64,
            stream_icon: String::new(),
            epg_channel_id: name.to_lowercase().replace(' ', "-"),
            category_id: category.to_string(),
            tv_archive: false,
        })
        .collect();
    Catalog {
        channels,
        categories,
    }
}

fn demo_guide(channel_id: &str) -> Vec<EpgProgram> {
    let now = Utc::now();
    let slot = |i: i64, start: i64, end: i64, title: &str| EpgProgram {
        id: format!("{channel_id}-{i}"),
        title: title.to_string(),
        channel_id: channel_id.to_string(),
        start: now + ChronoDuration::minutes(start),
        end: now + ChronoDuration::minutes(end),
        description: None,
    };
    vec![
        slot(0, -30, 30, "On Air Now"),
        slot(1, 30, 90, "Coming Up"),
        slot(2, 90, 150, "Late Slot"),
    ]
}
