pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result, ShelfError};
use crate::config::Config;
use crate::domain::ItemAction;
use crate::sync::ViewController;

use self::app::{Prompt, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: &AppContext, config: &Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: &AppContext, config: &Config) -> Result<()> {
    let mut controller = ctx.controller(config.view.settings());
    let mut tui_app = TuiApp::new(controller.active_view());
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let update_interval = config
        .view
        .update_interval()
        .map_err(|e| ShelfError::Config(e.to_string()))?;

    // Show the cached snapshot before the first sync completes
    controller.render(&mut tui_app)?;
    terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;
    let view = controller.active_view();
    let result = controller.switch_to(view, &mut tui_app).await;
    report(&mut tui_app, result);
    let mut last_sync = Instant::now();

    loop {
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if tui_app.prompt.is_some() {
                    handle_prompt_key(&mut tui_app, &mut controller, key).await;
                    continue;
                }

                match config.keybindings.get_action(&key) {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::MoveUp => {
                        tui_app.move_up();
                    }
                    Action::MoveDown => {
                        tui_app.move_down();
                    }
                    Action::ToggleMaximize => {
                        tui_app.toggle_maximize();
                    }
                    Action::SwitchView => {
                        let next = controller.active_view().other();
                        tui_app.is_refreshing = true;
                        terminal
                            .draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;
                        let result = controller.switch_to(next, &mut tui_app).await;
                        report(&mut tui_app, result);
                        last_sync = Instant::now();
                    }
                    Action::Refresh => {
                        tui_app.is_refreshing = true;
                        terminal
                            .draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;
                        let result = controller.sync(&mut tui_app).await;
                        report(&mut tui_app, result);
                        last_sync = Instant::now();
                    }
                    Action::ToggleRead => {
                        if let Some(id) = tui_app.selected_id() {
                            let result = controller.toggle_read(&id, &mut tui_app).await;
                            report(&mut tui_app, result);
                        }
                    }
                    Action::ToggleFavorite => {
                        if let Some(id) = tui_app.selected_id() {
                            let result = controller.toggle_favorite(&id, &mut tui_app).await;
                            report(&mut tui_app, result);
                        }
                    }
                    Action::Delete => {
                        tui_app.prompt =
                            tui_app
                                .selected_item()
                                .map(|item| Prompt::ConfirmDelete {
                                    item_id: item.id.clone(),
                                    title: item.display_title().to_string(),
                                });
                    }
                    Action::EditTags => {
                        tui_app.prompt = tui_app.selected_item().map(|item| Prompt::EditTags {
                            item_id: item.id.clone(),
                            input: item.tags_label(),
                        });
                    }
                    Action::AddItem => {
                        tui_app.prompt = Some(Prompt::AddUrl {
                            input: String::new(),
                        });
                    }
                    Action::OpenInBrowser => {
                        if let Some(id) = tui_app.selected_id() {
                            match controller.open(&id, &mut tui_app).await {
                                Ok(url) => {
                                    if let Err(e) = open::that(&url) {
                                        tui_app.set_error(format!("Failed to open browser: {}", e));
                                    }
                                }
                                Err(e) => tui_app.set_error(e.to_string()),
                            }
                        }
                    }
                    Action::None => {}
                }

                controller.on_sentinel(tui_app.at_last_row(), &mut tui_app);
            }
            AppEvent::Tick => {
                if let Some(interval) = update_interval {
                    if last_sync.elapsed() >= interval {
                        tracing::debug!("Periodic refresh of {}", controller.active_view());
                        let result = controller.sync(&mut tui_app).await;
                        report(&mut tui_app, result);
                        last_sync = Instant::now();
                    }
                }
            }
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_prompt_key(tui_app: &mut TuiApp, controller: &mut ViewController, key: KeyEvent) {
    let Some(mut prompt) = tui_app.prompt.take() else {
        return;
    };

    if let Prompt::ConfirmDelete { item_id, .. } = &prompt {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let result = controller
                .perform(item_id, ItemAction::Delete, tui_app)
                .await;
            report(tui_app, result);
        } else {
            tui_app.set_status("Delete cancelled".to_string());
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            tui_app.set_status("Cancelled".to_string());
        }
        KeyCode::Enter => match prompt {
            Prompt::EditTags { item_id, input } => {
                let result = controller.set_tags(&item_id, &input, tui_app).await;
                report(tui_app, result);
            }
            Prompt::AddUrl { input } if !input.trim().is_empty() => {
                let result = controller.create(input.trim(), "", tui_app).await;
                report(tui_app, result);
            }
            _ => {}
        },
        KeyCode::Backspace => {
            if let Some(input) = prompt.input_mut() {
                input.pop();
            }
            tui_app.prompt = Some(prompt);
        }
        KeyCode::Char(c) => {
            if let Some(input) = prompt.input_mut() {
                input.push(c);
            }
            tui_app.prompt = Some(prompt);
        }
        _ => {
            tui_app.prompt = Some(prompt);
        }
    }
}

/// Errors are already announced on the surface; keep the detail in the status bar.
fn report<T>(tui_app: &mut TuiApp, result: Result<T>) {
    if let Err(e) = result {
        tui_app.set_error(e.to_string());
    }
}
