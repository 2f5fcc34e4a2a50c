#![forbid(unsafe_code)]

//! Input parser state machine.
//!
//! Turns the raw input byte stream into [`Event`]s. Three prefix matchers
//! plus a rune decoder run in a fixed order over the head of an
//! accumulating buffer:
//!
//! 1. `parse_rune`: printable ASCII and charset-decoded multibyte runes;
//! 2. `parse_function_key`: the key code table;
//! 3. `parse_xterm_mouse`: legacy X11 `ESC [ M b x y` reports;
//! 4. `parse_sgr_mouse`: SGR `ESC [ < b ; x ; y M|m` reports.
//!
//! Mouse matchers only run when the terminfo entry carries a mouse
//! capability. Each matcher reports `Complete` (bytes consumed, one event
//! emitted), `Partial` (could match given more bytes), or `NoMatch`. The
//! coordinator restarts on any completion, waits while something is
//! partial, and otherwise falls back to the ESC-latch / raw-byte path.
//! When the reader signals that no more bytes are coming for now
//! (`expire`), partial matches stop blocking and the buffer drains
//! byte-by-byte.
//!
//! The matcher order is load-bearing: a byte sequence that is both a
//! valid UTF-8 lead and a function-key prefix resolves as a rune.

use std::sync::Arc;

use crate::charset::{Decoded, Encoding};
use crate::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent};
use crate::keymap::KeyMap;

/// Outcome of one matcher attempt against the buffer head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// The head can never match this grammar.
    NoMatch,
    /// The head is a proper prefix of a match; wait for more bytes.
    Partial,
    /// A match was consumed and its event emitted.
    Complete,
}

/// The input parser.
///
/// Holds the key table, the inbound charset decoder, and the small pieces
/// of cross-event state: the ESC latch (a lone ESC converts the next
/// event's modifiers to include Alt) and the mouse debounce latches.
#[derive(Clone)]
pub struct InputParser {
    keymap: KeyMap,
    decoder: Arc<dyn Encoding>,
    /// Mouse grammars enabled (terminfo advertises a mouse).
    mouse: bool,
    /// Lone-ESC seen; the next key or rune event gains Alt.
    escaped: bool,
    /// A button press was seen more recently than a release; wheel codes
    /// arriving while held are reported as button drags (some terminals
    /// misdeliver them during click-drag).
    was_button: bool,
    /// A non-motion press was seen; gates the broken-terminal motion fix.
    button_down: bool,
    width: usize,
    height: usize,
}

impl std::fmt::Debug for InputParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputParser")
            .field("decoder", &self.decoder.name())
            .field("mouse", &self.mouse)
            .field("escaped", &self.escaped)
            .field("size", &(self.width, self.height))
            .finish()
    }
}

impl InputParser {
    /// Create a parser over a key table and charset decoder.
    #[must_use]
    pub fn new(
        keymap: KeyMap,
        decoder: Arc<dyn Encoding>,
        mouse: bool,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            keymap,
            decoder,
            mouse,
            escaped: false,
            was_button: false,
            button_down: false,
            width,
            height,
        }
    }

    /// Update the clip rectangle for mouse coordinates.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Run the matchers over `buf` until it is empty or only partial
    /// matches remain. With `expire`, partial matches no longer block and
    /// every byte is delivered one way or another.
    pub fn scan(&mut self, buf: &mut Vec<u8>, expire: bool, events: &mut Vec<Event>) {
        loop {
            if buf.is_empty() {
                return;
            }

            let mut partials = 0;

            match self.parse_rune(buf, events) {
                Status::Complete => continue,
                Status::Partial => partials += 1,
                Status::NoMatch => {}
            }

            match self.parse_function_key(buf, events) {
                Status::Complete => continue,
                Status::Partial => partials += 1,
                Status::NoMatch => {}
            }

            if self.mouse {
                match self.parse_xterm_mouse(buf, events) {
                    Status::Complete => continue,
                    Status::Partial => partials += 1,
                    Status::NoMatch => {}
                }
                match self.parse_sgr_mouse(buf, events) {
                    Status::Complete => continue,
                    Status::Partial => partials += 1,
                    Status::NoMatch => {}
                }
            }

            if partials == 0 || expire {
                if buf[0] == 0x1B {
                    if buf.len() == 1 {
                        events.push(Event::Key(KeyEvent::new(KeyCode::Escape)));
                        self.escaped = false;
                    } else {
                        self.escaped = true;
                    }
                    buf.remove(0);
                    continue;
                }
                // Nothing is going to match; hand the byte to the
                // application as-is.
                let byte = buf.remove(0);
                let mods = self.take_escape();
                tracing::trace!(byte, "delivering unmatched byte as rune");
                events.push(Event::Key(
                    KeyEvent::new(KeyCode::Char(byte as char))
                        .with_ch(byte as char)
                        .with_modifiers(mods),
                ));
                continue;
            }

            // Partial data; wait for more input.
            return;
        }
    }

    /// Consume the ESC latch into a modifier set.
    fn take_escape(&mut self) -> Modifiers {
        if self.escaped {
            self.escaped = false;
            Modifiers::ALT
        } else {
            Modifiers::empty()
        }
    }

    /// Printable ASCII and charset-decoded multibyte runes.
    fn parse_rune(&mut self, buf: &mut Vec<u8>, events: &mut Vec<Event>) -> Status {
        let b0 = buf[0];
        if (0x20..=0x7E).contains(&b0) {
            let mods = self.take_escape();
            events.push(Event::Key(
                KeyEvent::new(KeyCode::Char(b0 as char))
                    .with_ch(b0 as char)
                    .with_modifiers(mods),
            ));
            buf.remove(0);
            return Status::Complete;
        }

        if b0 < 0x80 {
            // Control codes are not runes.
            return Status::NoMatch;
        }

        for len in 1..=buf.len() {
            match self.decoder.decode(&buf[..len]) {
                Decoded::Incomplete => continue,
                Decoded::Char { ch, consumed } => {
                    let mods = self.take_escape();
                    events.push(Event::Key(
                        KeyEvent::new(KeyCode::Char(ch))
                            .with_ch(ch)
                            .with_modifiers(mods),
                    ));
                    buf.drain(..consumed);
                    return Status::Complete;
                }
                Decoded::Invalid { .. } => {
                    // Not a rune in this charset. Leave the bytes for the
                    // mouse grammars (0x9B introduces a bare CSI) or, once
                    // nothing is partial, verbatim delivery.
                    return Status::NoMatch;
                }
            }
        }
        Status::Partial
    }

    /// Exact-prefix match against the key code table.
    ///
    /// The single-byte ESC entry is skipped so a lone ESC stays ambiguous
    /// until the buffer expires.
    fn parse_function_key(&mut self, buf: &mut Vec<u8>, events: &mut Vec<Event>) -> Status {
        let mut partial = false;
        let mut matched: Option<(usize, KeyCode, Modifiers)> = None;
        for entry in self.keymap.entries() {
            if entry.seq.len() == 1 && entry.seq[0] == 0x1B {
                continue;
            }
            if buf.starts_with(&entry.seq) {
                matched = Some((entry.seq.len(), entry.code, entry.mods));
                break;
            }
            if entry.seq.starts_with(buf) {
                partial = true;
            }
        }
        if let Some((len, code, mods)) = matched {
            let mods = mods | self.take_escape();
            let mut ev = KeyEvent::new(code).with_modifiers(mods);
            if len == 1 {
                ev = ev.with_ch(buf[0] as char);
            }
            events.push(Event::Key(ev));
            buf.drain(..len);
            return Status::Complete;
        }
        if partial {
            Status::Partial
        } else {
            Status::NoMatch
        }
    }

    /// Legacy X11 mouse report: `ESC [ M` then three payload bytes each
    /// offset by 32. A stand-alone CSI (0x9B) replaces `ESC [`.
    fn parse_xterm_mouse(&mut self, buf: &mut Vec<u8>, events: &mut Vec<Event>) -> Status {
        let mut state = 0;
        let mut btn = 0i64;
        let mut x = 0i64;
        for i in 0..buf.len() {
            let b = buf[i];
            match state {
                0 => match b {
                    0x1B => state = 1,
                    0x9B => state = 2,
                    _ => return Status::NoMatch,
                },
                1 => {
                    if b != b'[' {
                        return Status::NoMatch;
                    }
                    state = 2;
                }
                2 => {
                    if b != b'M' {
                        return Status::NoMatch;
                    }
                    state = 3;
                }
                3 => {
                    btn = i64::from(b);
                    state = 4;
                }
                4 => {
                    x = i64::from(b) - 32 - 1;
                    state = 5;
                }
                _ => {
                    let y = i64::from(b) - 32 - 1;
                    buf.drain(..=i);
                    self.post_mouse(x, y, btn, events);
                    return Status::Complete;
                }
            }
        }
        Status::Partial
    }

    /// SGR mouse report: `ESC [ <` then `btn ; x ; y` and `M` (press or
    /// motion) or `m` (release). Coordinates are 1-based and may be
    /// negative on some terminals.
    fn parse_sgr_mouse(&mut self, buf: &mut Vec<u8>, events: &mut Vec<Event>) -> Status {
        let mut state = 0;
        let mut dig = false;
        let mut neg = false;
        let mut val = 0i64;
        let mut btn = 0i64;
        let mut x = 0i64;

        for i in 0..buf.len() {
            let b = buf[i];
            match b {
                0x1B => {
                    if state != 0 {
                        return Status::NoMatch;
                    }
                    state = 1;
                }
                0x9B => {
                    if state != 0 {
                        return Status::NoMatch;
                    }
                    state = 2;
                }
                b'[' => {
                    if state != 1 {
                        return Status::NoMatch;
                    }
                    state = 2;
                }
                b'<' => {
                    if state != 2 {
                        return Status::NoMatch;
                    }
                    val = 0;
                    dig = false;
                    neg = false;
                    state = 3;
                }
                b'-' => {
                    if !(3..=5).contains(&state) || dig || neg {
                        return Status::NoMatch;
                    }
                    neg = true;
                }
                b'0'..=b'9' => {
                    if !(3..=5).contains(&state) {
                        return Status::NoMatch;
                    }
                    val = val.saturating_mul(10).saturating_add(i64::from(b - b'0'));
                    dig = true;
                }
                b';' => {
                    if neg {
                        val = -val;
                    }
                    match state {
                        3 => {
                            btn = val;
                            val = 0;
                            neg = false;
                            dig = false;
                            state = 4;
                        }
                        4 => {
                            x = val - 1;
                            val = 0;
                            neg = false;
                            dig = false;
                            state = 5;
                        }
                        _ => return Status::NoMatch,
                    }
                }
                b'm' | b'M' => {
                    if state != 5 {
                        return Status::NoMatch;
                    }
                    if neg {
                        val = -val;
                    }
                    let y = val - 1;

                    let motion = btn & 32 != 0;
                    btn &= !32;
                    if b == b'm' {
                        // Release: synthesize "no buttons held".
                        btn |= 3;
                        btn &= !0x40;
                        self.button_down = false;
                    } else if motion {
                        // Some terminals send button-one motion instead of
                        // encoding "no buttons" (35); resolve via the most
                        // recent non-motion event.
                        if !self.button_down {
                            btn |= 3;
                            btn &= !0x40;
                        }
                    } else {
                        self.button_down = true;
                    }
                    buf.drain(..=i);
                    self.post_mouse(x, y, btn, events);
                    return Status::Complete;
                }
                // Other bytes neither advance nor kill the match.
                _ => {}
            }
        }
        Status::Partial
    }

    /// Decode a raw button code into an event and push it.
    fn post_mouse(&mut self, x: i64, y: i64, btn: i64, events: &mut Vec<Event>) {
        let button = match btn & 0x43 {
            0 => {
                self.was_button = true;
                MouseButton::Button1
            }
            1 => {
                self.was_button = true;
                MouseButton::Button2
            }
            2 => {
                self.was_button = true;
                MouseButton::Button3
            }
            3 => {
                self.was_button = false;
                MouseButton::None
            }
            0x40 => {
                if self.was_button {
                    MouseButton::Button1
                } else {
                    MouseButton::WheelUp
                }
            }
            0x41 => {
                if self.was_button {
                    MouseButton::Button2
                } else {
                    MouseButton::WheelDown
                }
            }
            _ => MouseButton::None,
        };

        let mut mods = Modifiers::empty();
        if btn & 0x4 != 0 {
            mods |= Modifiers::SHIFT;
        }
        if btn & 0x8 != 0 {
            mods |= Modifiers::ALT;
        }
        if btn & 0x10 != 0 {
            mods |= Modifiers::CTRL;
        }

        // Terminals report out-of-bounds coordinates during click-drag;
        // clip to the screen.
        let (x, y) = self.clip(x, y);
        events.push(Event::Mouse(MouseEvent {
            x,
            y,
            button,
            modifiers: mods,
        }));
    }

    fn clip(&self, x: i64, y: i64) -> (usize, usize) {
        let max_x = self.width.saturating_sub(1) as i64;
        let max_y = self.height.saturating_sub(1) as i64;
        (x.clamp(0, max_x) as usize, y.clamp(0, max_y) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Utf8;
    use wireterm_terminfo::Terminfo;

    fn parser() -> InputParser {
        let ti = Terminfo::lookup("xterm").unwrap();
        InputParser::new(KeyMap::new(&ti), Arc::new(Utf8), true, 80, 24)
    }

    fn scan_all(parser: &mut InputParser, bytes: &[u8], expire: bool) -> Vec<Event> {
        let mut buf = bytes.to_vec();
        let mut events = Vec::new();
        parser.scan(&mut buf, expire, &mut events);
        events
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn rune(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch)).with_ch(ch))
    }

    fn rune_alt(ch: char) -> Event {
        Event::Key(
            KeyEvent::new(KeyCode::Char(ch))
                .with_ch(ch)
                .with_modifiers(Modifiers::ALT),
        )
    }

    #[test]
    fn printable_ascii() {
        let mut p = parser();
        assert_eq!(scan_all(&mut p, b"A", false), vec![rune('A')]);
    }

    #[test]
    fn esc_then_rune_is_alt() {
        let mut p = parser();
        // The ESC stays pending until the parse expires.
        let mut buf = b"\x1bA".to_vec();
        let mut events = Vec::new();
        p.scan(&mut buf, false, &mut events);
        assert!(events.is_empty());
        p.scan(&mut buf, true, &mut events);
        assert_eq!(events, vec![rune_alt('A')]);
    }

    #[test]
    fn lone_esc_expires_to_escape_key() {
        let mut p = parser();
        let mut buf = b"\x1b".to_vec();
        let mut events = Vec::new();
        p.scan(&mut buf, false, &mut events);
        assert!(events.is_empty());
        p.scan(&mut buf, true, &mut events);
        assert_eq!(events, vec![key(KeyCode::Escape)]);
    }

    #[test]
    fn function_key_cursor_up() {
        let mut p = parser();
        assert_eq!(scan_all(&mut p, b"\x1b[A", false), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn function_key_with_esc_prefix_gains_alt() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b\x1b[A", true);
        assert_eq!(
            events,
            vec![Event::Key(
                KeyEvent::new(KeyCode::Up).with_modifiers(Modifiers::ALT)
            )]
        );
        // The latch must not leak into the next event.
        assert_eq!(scan_all(&mut p, b"\x1b[A", false), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn single_byte_table_match_carries_raw_char() {
        let mut p = parser();
        let events = scan_all(&mut p, &[0x01], false);
        assert_eq!(
            events,
            vec![Event::Key(
                KeyEvent::new(KeyCode::Char('a'))
                    .with_ch('\u{1}')
                    .with_modifiers(Modifiers::CTRL)
            )]
        );
    }

    #[test]
    fn utf8_rune() {
        let mut p = parser();
        assert_eq!(
            scan_all(&mut p, "é".as_bytes(), false),
            vec![rune('é')]
        );
    }

    #[test]
    fn utf8_rune_split_across_reads() {
        let mut p = parser();
        let bytes = "世".as_bytes();
        let mut buf = bytes[..1].to_vec();
        let mut events = Vec::new();
        p.scan(&mut buf, false, &mut events);
        assert!(events.is_empty());
        buf.extend_from_slice(&bytes[1..]);
        p.scan(&mut buf, false, &mut events);
        assert_eq!(events, vec![rune('世')]);
    }

    #[test]
    fn invalid_utf8_delivered_verbatim_after_expire() {
        let mut p = parser();
        // 0x80 is not a rune; the SGR matcher keeps the buffer partial
        // (it tolerates unknown bytes), so nothing resolves until expiry.
        let mut buf = vec![0x80, b'A'];
        let mut events = Vec::new();
        p.scan(&mut buf, false, &mut events);
        assert!(events.is_empty());
        p.scan(&mut buf, true, &mut events);
        assert_eq!(events, vec![rune('\u{80}'), rune('A')]);
    }

    #[test]
    fn xterm_mouse_origin() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b[M\x20\x21\x21", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 0,
                y: 0,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn xterm_mouse_partial_waits() {
        let mut p = parser();
        let mut buf = b"\x1b[M\x20\x21".to_vec();
        let mut events = Vec::new();
        p.scan(&mut buf, false, &mut events);
        assert!(events.is_empty());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn sgr_mouse_press() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b[<0;5;7M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 4,
                y: 6,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn sgr_mouse_release_reports_no_buttons() {
        let mut p = parser();
        scan_all(&mut p, b"\x1b[<0;5;7M", false);
        let events = scan_all(&mut p, b"\x1b[<0;5;7m", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 4,
                y: 6,
                button: MouseButton::None,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn sgr_wheel_without_press_is_wheel() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b[<64;3;3M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 2,
                y: 2,
                button: MouseButton::WheelUp,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn sgr_wheel_during_press_debounced_to_button() {
        let mut p = parser();
        scan_all(&mut p, b"\x1b[<0;1;1M", false);
        let events = scan_all(&mut p, b"\x1b[<64;1;1M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 0,
                y: 0,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
        // After release, the wheel reports as a wheel again.
        scan_all(&mut p, b"\x1b[<3;1;1m", false);
        let events = scan_all(&mut p, b"\x1b[<64;1;1M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 0,
                y: 0,
                button: MouseButton::WheelUp,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn sgr_mouse_modifiers() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b[<4;2;2M", false);
        match &events[0] {
            Event::Mouse(m) => assert_eq!(m.modifiers, Modifiers::SHIFT),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn sgr_negative_coordinates_clipped() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x1b[<0;-3;-7M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 0,
                y: 0,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn sgr_out_of_bounds_clipped_to_size() {
        let mut p = parser();
        p.set_size(10, 5);
        let events = scan_all(&mut p, b"\x1b[<0;500;500M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 9,
                y: 4,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn csi_9b_accepted_for_sgr() {
        let mut p = parser();
        let events = scan_all(&mut p, b"\x9b<0;2;2M", false);
        assert_eq!(
            events,
            vec![Event::Mouse(MouseEvent {
                x: 1,
                y: 1,
                button: MouseButton::Button1,
                modifiers: Modifiers::empty(),
            })]
        );
    }

    #[test]
    fn mouse_matchers_skipped_without_capability() {
        let ti = Terminfo::lookup("xterm").unwrap();
        let mut p = InputParser::new(KeyMap::new(&ti), Arc::new(Utf8), false, 80, 24);
        // With no mouse grammar in play the report decays to an Alt-[ rune
        // followed by the payload as runes.
        let events = scan_all(&mut p, b"\x1b[<0;5;7M", true);
        assert!(events.iter().all(|e| matches!(e, Event::Key(_))));
        assert_eq!(events[0], rune_alt('['));
    }

    #[test]
    fn control_byte_delivered_via_table() {
        let mut p = parser();
        let events = scan_all(&mut p, &[0x0D], false);
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent::new(KeyCode::Enter).with_ch('\r'))]
        );
    }

    #[test]
    fn mixed_stream_in_order() {
        let mut p = parser();
        let mut bytes = b"hi\x1b[A".to_vec();
        bytes.extend_from_slice(b"\x1b[<0;1;1M");
        let events = scan_all(&mut p, &bytes, false);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], rune('h'));
        assert_eq!(events[1], rune('i'));
        assert_eq!(events[2], key(KeyCode::Up));
        assert!(matches!(events[3], Event::Mouse(_)));
    }
}
