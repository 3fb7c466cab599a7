//! OS input injection through `enigo`.
//!
//! The `Enigo` handle is not `Send` on every platform, so it lives on a
//! dedicated thread created here and the sink only holds the sending half of
//! a channel.

use std::sync::mpsc::{self, Sender};
use std::thread;

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use gesture_fsm::{Action, Key};
use tracing::{info, warn};

use crate::ActuationSink;

pub struct EnigoSink {
    tx: Sender<Action>,
}

impl EnigoSink {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Action>();
        thread::Builder::new()
            .name("enigo-sink".into())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = ?e, "cannot open OS input connection, discarding actions");
                        for _ in rx {}
                        return;
                    }
                };
                info!("OS input connection open");
                for action in rx {
                    if let Err(e) = inject(&mut enigo, action) {
                        warn!(?action, error = ?e, "input injection failed");
                    }
                }
            })
            .map(|_| ())
            .unwrap_or_else(|e| warn!(error = %e, "cannot start input thread"));
        EnigoSink { tx }
    }

    fn send(&self, action: Action) {
        // a closed channel means the injector thread is gone; nothing to do
        let _ = self.tx.send(action);
    }
}

fn os_key(key: Key) -> enigo::Key {
    match key {
        Key::W     => enigo::Key::Unicode('w'),
        Key::A     => enigo::Key::Unicode('a'),
        Key::S     => enigo::Key::Unicode('s'),
        Key::D     => enigo::Key::Unicode('d'),
        Key::T     => enigo::Key::Unicode('t'),
        Key::Ctrl  => enigo::Key::Control,
        Key::Space => enigo::Key::Space,
    }
}

fn inject(enigo: &mut Enigo, action: Action) -> enigo::InputResult<()> {
    match action {
        Action::KeyDown(k)           => enigo.key(os_key(k), Direction::Press),
        Action::KeyUp(k)             => enigo.key(os_key(k), Direction::Release),
        Action::MouseMove { dx, dy } => enigo.move_mouse(dx, dy, Coordinate::Rel),
        Action::MouseDown            => enigo.button(Button::Left, Direction::Press),
        Action::MouseUp              => enigo.button(Button::Left, Direction::Release),
    }
}

impl ActuationSink for EnigoSink {
    fn key_down(&mut self, key: Key)          { self.send(Action::KeyDown(key)) }
    fn key_up(&mut self, key: Key)            { self.send(Action::KeyUp(key)) }
    fn mouse_move(&mut self, dx: i32, dy: i32) { self.send(Action::MouseMove { dx, dy }) }
    fn mouse_button_down(&mut self)           { self.send(Action::MouseDown) }
    fn mouse_button_up(&mut self)             { self.send(Action::MouseUp) }
}
