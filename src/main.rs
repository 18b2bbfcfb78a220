use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use trakui::{App, AppConfig, AppEvent, Args, ConfigManager, RowSource, Theme, View, APP_NAME};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

/// Resolve the views to show: the config's `[[views]]` entries, with the
/// positional argument either picking one by name or adding an ad-hoc view
/// for a bare locator.
fn resolve_views(args: &Args, config: &AppConfig) -> Result<(Vec<View>, usize)> {
    let mut views: Vec<View> = config
        .views
        .iter()
        .map(|v| View {
            name: v.name.clone(),
            source: RowSource::parse(&v.source),
        })
        .collect();

    let start = match &args.view {
        Some(wanted) => {
            if let Some(index) = views
                .iter()
                .position(|v| v.name.eq_ignore_ascii_case(wanted))
            {
                index
            } else {
                let source = RowSource::parse(wanted);
                let name = match &source {
                    RowSource::Local(path) => path
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| wanted.clone()),
                    RowSource::Http(_) => wanted.clone(),
                };
                views.push(View { name, source });
                views.len() - 1
            }
        }
        None => 0,
    };

    if views.is_empty() {
        return Err(eyre!(
            "No views configured and no locator given. Add [[views]] to the config \
             (see --write-config) or pass a JSON file path or URL."
        ));
    }

    Ok((views, start))
}

fn run(mut terminal: DefaultTerminal, args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load(APP_NAME)?,
    };
    if let Some(timeout) = args.timeout {
        config.network.timeout_secs = timeout;
    }
    let theme = Theme::from_config(&config.theme)?;
    let (views, start) = resolve_views(args, &config)?;
    let poll_interval = std::time::Duration::from_millis(config.ui.event_poll_interval_ms);

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config, views);
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(start))?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.write_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        match config_manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
