//! End-to-end input scenarios: bytes in through a live screen's input
//! task, events out through `poll_event`.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use wireterm::{
    Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, Screen, ScreenError,
    ScreenOptions,
};

/// One scripted action for the input stream.
enum Step {
    Bytes(Vec<u8>),
    Eof,
}

/// A blocking input source driven from the test thread. `Eof` models a
/// read timeout (no bytes for now); dropping the sender ends the stream
/// with an error, which stops the input task.
struct ScriptedInput {
    rx: mpsc::Receiver<Step>,
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.rx.recv() {
            Ok(Step::Bytes(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Ok(Step::Eof) => Ok(0),
            Err(_) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "script finished")),
        }
    }
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn live_screen(term: &str) -> (Screen, Sender<Step>) {
    let (tx, rx) = mpsc::channel();
    let screen = Screen::new(ScreenOptions {
        input: Box::new(ScriptedInput { rx }),
        output: Box::new(SharedSink::default()),
        term: term.into(),
        width: 80,
        height: 24,
        charset: None,
    })
    .unwrap();
    screen.init().unwrap();
    (screen, tx)
}

fn send(tx: &Sender<Step>, bytes: &[u8]) {
    tx.send(Step::Bytes(bytes.to_vec())).unwrap();
}

fn expire(tx: &Sender<Step>) {
    tx.send(Step::Eof).unwrap();
}

fn rune(ch: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(ch)).with_ch(ch))
}

#[test]
fn plain_ascii_byte() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x41");
    assert_eq!(screen.poll_event(), Some(rune('A')));
    screen.fini();
}

#[test]
fn esc_prefixed_rune_reports_alt() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b\x41");
    expire(&tx);
    assert_eq!(
        screen.poll_event(),
        Some(Event::Key(
            KeyEvent::new(KeyCode::Char('A'))
                .with_ch('A')
                .with_modifiers(Modifiers::ALT)
        ))
    );
    screen.fini();
}

#[test]
fn lone_esc_expires_to_escape() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b");
    expire(&tx);
    assert_eq!(
        screen.poll_event(),
        Some(Event::Key(KeyEvent::new(KeyCode::Escape)))
    );
    screen.fini();
}

#[test]
fn cursor_key_resolves() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b[A");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Key(KeyEvent::new(KeyCode::Up)))
    );
    screen.fini();
}

#[test]
fn cursor_key_split_across_reads() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b[");
    send(&tx, b"A");
    send(&tx, b"B");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Key(KeyEvent::new(KeyCode::Up)))
    );
    assert_eq!(screen.poll_event(), Some(rune('B')));
    screen.fini();
}

#[test]
fn legacy_xterm_mouse_report() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b[M\x20\x21\x21");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Mouse(MouseEvent {
            x: 0,
            y: 0,
            button: MouseButton::Button1,
            modifiers: Modifiers::empty(),
        }))
    );
    screen.fini();
}

#[test]
fn sgr_mouse_press() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b[<0;5;7M");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Mouse(MouseEvent {
            x: 4,
            y: 6,
            button: MouseButton::Button1,
            modifiers: Modifiers::empty(),
        }))
    );
    screen.fini();
}

#[test]
fn sgr_wheel_with_no_button_held() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"\x1b[<64;3;3M");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Mouse(MouseEvent {
            x: 2,
            y: 2,
            button: MouseButton::WheelUp,
            modifiers: Modifiers::empty(),
        }))
    );
    screen.fini();
}

#[test]
fn events_keep_stream_order() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, b"ab\x1b[A");
    assert_eq!(screen.poll_event(), Some(rune('a')));
    assert_eq!(screen.poll_event(), Some(rune('b')));
    assert_eq!(
        screen.poll_event(),
        Some(Event::Key(KeyEvent::new(KeyCode::Up)))
    );
    screen.fini();
}

#[test]
fn utf8_rune_through_stream() {
    let (screen, tx) = live_screen("xterm");
    send(&tx, "é".as_bytes());
    assert_eq!(screen.poll_event(), Some(rune('é')));
    screen.fini();
}

#[test]
fn posted_events_interleave() {
    let (screen, tx) = live_screen("xterm");
    screen.post_event(Event::Interrupt).unwrap();
    send(&tx, b"x");
    assert_eq!(screen.poll_event(), Some(Event::Interrupt));
    assert_eq!(screen.poll_event(), Some(rune('x')));
    screen.fini();
}

#[test]
fn queue_overflow_reports_full() {
    let (screen, _tx) = live_screen("xterm");
    for _ in 0..10 {
        screen.post_event(Event::Interrupt).unwrap();
    }
    assert_eq!(
        screen.post_event(Event::Interrupt),
        Err(ScreenError::EventQueueFull)
    );
    screen.fini();
}

#[test]
fn resize_posts_exactly_one_event_per_change() {
    let (screen, _tx) = live_screen("xterm");
    screen.resize(100, 40);
    assert_eq!(screen.size(), (100, 40));
    // A resize to the current dimensions posts nothing; the marker event
    // must be the very next thing polled.
    screen.resize(100, 40);
    screen.post_event(Event::Interrupt).unwrap();
    assert_eq!(
        screen.poll_event(),
        Some(Event::Resize {
            width: 100,
            height: 40
        })
    );
    assert_eq!(screen.poll_event(), Some(Event::Interrupt));
    screen.fini();
}

#[test]
fn mouse_coordinates_clip_to_screen() {
    let (screen, tx) = live_screen("xterm");
    screen.resize(10, 5);
    assert_eq!(
        screen.poll_event(),
        Some(Event::Resize {
            width: 10,
            height: 5
        })
    );
    send(&tx, b"\x1b[<0;500;500M");
    assert_eq!(
        screen.poll_event(),
        Some(Event::Mouse(MouseEvent {
            x: 9,
            y: 4,
            button: MouseButton::Button1,
            modifiers: Modifiers::empty(),
        }))
    );
    screen.fini();
}

#[test]
fn poll_returns_none_after_fini() {
    let (screen, _tx) = live_screen("xterm");
    screen.fini();
    assert_eq!(screen.poll_event(), None);
    assert_eq!(screen.poll_event(), None);
}

#[test]
fn raw_event_api_is_unsupported() {
    let (screen, _tx) = live_screen("xterm");
    assert_eq!(
        screen.poll_raw_event(),
        Event::Error(ScreenError::NotSupported("no raw events"))
    );
    assert_eq!(
        screen.parse_event(b"\x1b[A"),
        Event::Error(ScreenError::NotSupported("no raw events"))
    );
    screen.fini();
}

#[test]
fn unknown_terminal_fails_construction() {
    let (_tx, rx) = mpsc::channel();
    let err = Screen::new(ScreenOptions {
        input: Box::new(ScriptedInput { rx }),
        output: Box::new(SharedSink::default()),
        term: "adm3a-nonesuch".into(),
        width: 80,
        height: 24,
        charset: None,
    })
    .err()
    .unwrap();
    assert_eq!(err, ScreenError::UnknownTerminal("adm3a-nonesuch".into()));
}

#[test]
fn unresolvable_charset_fails_init() {
    let (_tx, rx) = mpsc::channel();
    let screen = Screen::new(ScreenOptions {
        input: Box::new(ScriptedInput { rx }),
        output: Box::new(SharedSink::default()),
        term: "xterm".into(),
        width: 80,
        height: 24,
        charset: Some("klingon-piqad".into()),
    })
    .unwrap();
    assert_eq!(screen.init(), Err(ScreenError::NoCharset));
}

#[test]
fn key_queries() {
    let (screen, _tx) = live_screen("xterm");
    assert!(screen.has_mouse());
    assert!(screen.has_key(KeyCode::Up));
    assert!(screen.has_key(KeyCode::F(12)));
    assert!(!screen.has_key(KeyCode::F(40)));
    assert!(screen.has_key(KeyCode::Char('q')));
    assert_eq!(screen.character_set(), "UTF-8");
    screen.fini();
}
