//! Interactive terminal host
//!
//! Raw-mode keyboard input feeds the controller's key binding; every
//! processed activity redraws the snapshot. `q` or Esc quits.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, queue, terminal};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use stepwise::controller::{Activity, Controller};
use stepwise::{ControlPanel, GraphicDocument, Key, KeyPress};

use crate::snapshot::Snapshot;

/// Restores the terminal when dropped
struct RawTerminal;

impl RawTerminal {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

enum Input {
    Key(KeyEvent),
    Resize,
}

/// Translate a terminal key into a walkthrough key
pub fn translate_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Right => Some(Key::ArrowRight),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Home => Some(Key::Home),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Character(c)),
        _ => None,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Read terminal events on a helper thread until the receiver goes away
fn spawn_reader() -> mpsc::UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(Duration::from_millis(100)) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(_) => break,
        }
        let input = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Input::Key(key),
            Ok(Event::Resize(..)) => Input::Resize,
            Ok(_) => continue,
            Err(_) => break,
        };
        if tx.send(input).is_err() {
            break;
        }
    });
    rx
}

fn draw(controller: &Controller<GraphicDocument, ControlPanel>, last: &str) -> Result<()> {
    let (width, _) = terminal::size().unwrap_or((80, 24));
    let mut stdout = io::stdout();
    queue!(
        stdout,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    for line in Snapshot::capture(controller, last).render(width as usize, true) {
        write!(stdout, "{}\r\n", line)?;
    }
    write!(
        stdout,
        "\r\n  <-/-> navigate   Home reset   Space play/pause   q quit\r\n"
    )?;
    stdout.flush()?;
    Ok(())
}

/// Run the interactive walkthrough until the user quits
pub async fn play(mut controller: Controller<GraphicDocument, ControlPanel>) -> Result<()> {
    let binder = controller.subscribe();
    let _guard = RawTerminal::enter()?;
    let mut inputs = spawn_reader();
    let mut last = String::from("start");

    loop {
        draw(&controller, &last)?;

        let input = tokio::select! {
            input = inputs.recv() => input,
            activity = controller.step() => {
                match activity {
                    Some(Activity::Ready) => last = "ready".to_string(),
                    Some(Activity::Tick { .. }) => last = "tick".to_string(),
                    Some(Activity::Command { command, .. }) => last = command.to_string(),
                    None => break,
                }
                continue;
            }
        };

        match input {
            None => break,
            Some(Input::Resize) => {}
            Some(Input::Key(key)) if is_quit(&key) => {
                debug!("Quit requested");
                break;
            }
            Some(Input::Key(key)) => {
                let Some(key) = translate_key(key.code) else {
                    continue;
                };
                let response = binder.key_press(&KeyPress::new(key.clone()));
                trace!(%key, ?response, "Key handled");
                controller.process_pending();
                if let Some(command) = response.command {
                    last = command.to_string();
                }
            }
        }
    }

    controller.unsubscribe();
    Ok(())
}
