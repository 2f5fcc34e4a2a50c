#![forbid(unsafe_code)]

//! The screen facade.
//!
//! A [`Screen`] owns the cell grid, the renderer, the input parser, and
//! the event channel, and talks to the outside world through the two byte
//! streams handed over at construction. It never touches a TTY: the input
//! can be a pty master, a socket, or an in-memory pipe, and the output is
//! whatever should receive the terminfo-encoded byte stream.
//!
//! # Lifecycle
//!
//! `new` resolves the terminfo entry and builds the key/ACS tables;
//! `init` resolves the charset, emits the terminal setup sequence, and
//! spawns the input task; `fini` restores the terminal, closes the output
//! stream, and signals shutdown. After `fini` every state mutator is a
//! no-op and [`Screen::poll_event`] returns `None`.
//!
//! # Concurrency
//!
//! One mutex guards all mutable state, including the parser latches and
//! the output sink; the input task takes it for the duration of each
//! scan. The event channel is a bounded FIFO accessed without the lock.
//! The input task holds a clone of the shared handle, not a back-pointer.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use wireterm_render::CellBuffer;
use wireterm_style::{find_color, Attrs, Color, Style};
use wireterm_terminfo::{acs, Param, Terminfo};

use crate::channel::{EventChannel, EVENT_QUEUE_CAPACITY};
use crate::charset::{lookup_encoding, Encoding, DEFAULT_RUNE_FALLBACKS};
use crate::error::ScreenError;
use crate::event::{Event, KeyCode};
use crate::input::InputParser;
use crate::keymap::KeyMap;

/// Read chunk size for the input task.
const INPUT_CHUNK: usize = 128;

/// Construction parameters for a [`Screen`].
///
/// The input stream should block until bytes are available and report
/// `Ok(0)` when none are coming *for now*; that is what lets the parser
/// expire a partial escape sequence. A read error stops the input task
/// for good. To unblock a read pending across `fini`, close the peer end
/// of the stream.
pub struct ScreenOptions {
    /// Source of terminal input bytes.
    pub input: Box<dyn Read + Send>,
    /// Sink for terminfo-encoded output.
    pub output: Box<dyn Write + Send>,
    /// Terminfo entry name, e.g. `"xterm-256color"`.
    pub term: String,
    /// Initial width in columns.
    pub width: usize,
    /// Initial height in rows.
    pub height: usize,
    /// Wire charset; defaults to UTF-8.
    pub charset: Option<String>,
}

/// A terminal screen over generic byte streams.
///
/// Cloning yields another handle to the same screen.
#[derive(Clone)]
pub struct Screen {
    inner: Arc<Inner>,
}

struct Inner {
    ti: Terminfo,
    keymap: KeyMap,
    events: EventChannel,
    quit_rx: Receiver<()>,
    quit_tx: Mutex<Option<Sender<()>>>,
    state: Mutex<ScreenState>,
}

struct ScreenState {
    w: usize,
    h: usize,
    fini: bool,
    init_done: bool,
    forcesize: bool,
    cells: CellBuffer,
    input: Option<Box<dyn Read + Send>>,
    out: Option<Box<dyn Write + Send>>,
    /// Screen default style, substituted for `Style::DEFAULT` cells.
    style: Style,
    /// Style currently active on the wire; `None` forces re-emission.
    cur_style: Option<Style>,
    /// Cursor position the wire is believed to be at; `None` forces a goto.
    cxy: Option<(usize, usize)>,
    /// Logical cursor requested via `show_cursor`.
    cursor: Option<(usize, usize)>,
    /// Cursor state last emitted: shown at a position, or hidden.
    wire_cursor: Option<(usize, usize)>,
    clear: bool,
    truecolor: bool,
    palette: Vec<Color>,
    color_cache: HashMap<Color, Color>,
    acs_map: HashMap<char, String>,
    fallback: HashMap<char, String>,
    encoder: Option<Arc<dyn Encoding>>,
    charset_name: String,
    parser: Option<InputParser>,
    baud: usize,
}

impl Screen {
    /// Create a screen over the given streams.
    ///
    /// # Errors
    ///
    /// [`ScreenError::UnknownTerminal`] when the terminfo name resolves to
    /// nothing.
    pub fn new(opts: ScreenOptions) -> Result<Self, ScreenError> {
        let ti = Terminfo::lookup(&opts.term)?;
        let keymap = KeyMap::new(&ti);
        let acs_map = build_acs_map(&ti);
        let fallback = DEFAULT_RUNE_FALLBACKS
            .iter()
            .map(|&(ch, s)| (ch, s.to_string()))
            .collect();
        let (quit_tx, quit_rx) = bounded::<()>(0);

        let charset_name = opts.charset.unwrap_or_else(|| "UTF-8".to_string());
        let state = ScreenState {
            w: opts.width,
            h: opts.height,
            fini: false,
            init_done: false,
            forcesize: false,
            cells: CellBuffer::new(0, 0),
            input: Some(opts.input),
            out: Some(opts.output),
            style: Style::DEFAULT,
            cur_style: None,
            cxy: None,
            cursor: None,
            wire_cursor: None,
            clear: false,
            truecolor: false,
            palette: Vec::new(),
            color_cache: HashMap::new(),
            acs_map,
            fallback,
            encoder: None,
            charset_name,
            parser: None,
            baud: 0,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                ti,
                keymap,
                events: EventChannel::new(EVENT_QUEUE_CAPACITY),
                quit_rx,
                quit_tx: Mutex::new(Some(quit_tx)),
                state: Mutex::new(state),
            }),
        })
    }

    /// Prepare the terminal and start the input task.
    ///
    /// # Errors
    ///
    /// [`ScreenError::NoCharset`] when the configured charset resolves to
    /// no codec.
    pub fn init(&self) -> Result<(), ScreenError> {
        let ti = &self.inner.ti;
        let input = {
            let mut st = self.inner.state.lock();
            if st.fini || st.init_done {
                return Ok(());
            }
            let encoder =
                lookup_encoding(&st.charset_name).ok_or(ScreenError::NoCharset)?;
            st.charset_name = encoder.name().to_string();
            st.encoder = Some(encoder.clone());

            let (w, h) = (st.w, st.h);
            st.cells.resize(w, h);

            st.truecolor = !ti.set_fg_bg_rgb.is_empty()
                || !ti.set_fg_rgb.is_empty()
                || !ti.set_bg_rgb.is_empty();
            if !st.truecolor {
                let palette: Vec<Color> = (0..ti.colors.min(256))
                    .map(|i| Color::Palette(i as u8))
                    .collect();
                for &c in &palette {
                    st.color_cache.insert(c, c);
                }
                st.palette = palette;
            }

            st.emit(ti, &ti.enter_ca);
            st.emit(ti, &ti.hide_cursor);
            st.emit(ti, &ti.enable_acs);
            st.emit(ti, &ti.clear);

            st.cxy = None;
            st.cur_style = None;
            st.style = Style::DEFAULT;
            st.cursor = None;
            st.wire_cursor = None;
            st.parser = Some(InputParser::new(
                self.inner.keymap.clone(),
                encoder,
                !ti.mouse.is_empty(),
                w,
                h,
            ));
            st.init_done = true;
            st.input.take()
        };

        if let Some(input) = input {
            let inner = Arc::clone(&self.inner);
            std::thread::spawn(move || input_loop(&inner, input));
        }
        tracing::debug!(term = %ti.name, "screen initialized");
        Ok(())
    }

    /// Restore the terminal, close the output stream, and signal the
    /// input task and any poller to stop.
    pub fn fini(&self) {
        let ti = &self.inner.ti;
        {
            let mut st = self.inner.state.lock();
            if st.fini {
                return;
            }
            st.cells.resize(0, 0);
            st.emit(ti, &ti.show_cursor);
            st.emit(ti, &ti.attr_off);
            st.emit(ti, &ti.clear);
            st.emit(ti, &ti.exit_ca);
            st.emit(ti, &ti.exit_keypad);
            let off = ti.tparm(&ti.mouse_mode, &[Param(0)]);
            st.emit(ti, &off);
            st.cur_style = None;
            st.clear = false;
            st.fini = true;
            st.out = None;
            st.input = None;
        }
        *self.inner.quit_tx.lock() = None;
        tracing::debug!("screen finalized");
    }

    /// Set the default style substituted for `Style::DEFAULT` cells.
    pub fn set_style(&self, style: Style) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.style = style;
        }
    }

    /// Fill the screen with spaces in the default style.
    pub fn clear(&self) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            let style = st.style;
            st.cells.fill(' ', style);
        }
    }

    /// Fill the screen with `ch` in `style`.
    pub fn fill(&self, ch: char, style: Style) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.cells.fill(ch, style);
        }
    }

    /// Write one cell. See [`CellBuffer::set_content`] for the edge rules.
    pub fn set_content(&self, x: usize, y: usize, ch: char, comb: &[char], style: Style) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.cells.set_content(x, y, ch, comb, style);
        }
    }

    /// Read one cell back.
    #[must_use]
    pub fn get_content(&self, x: usize, y: usize) -> (char, Vec<char>, Style, usize) {
        self.inner.state.lock().cells.get_content(x, y)
    }

    /// Compatibility helper: first scalar is the primary, the rest are
    /// combining marks. No scalars writes a blank.
    pub fn set_cell(&self, x: usize, y: usize, style: Style, chars: &[char]) {
        match chars.split_first() {
            Some((&main, comb)) => self.set_content(x, y, main, comb, style),
            None => self.set_content(x, y, ' ', &[], style),
        }
    }

    /// Place the visible cursor. Out-of-bounds positions hide it at the
    /// next draw.
    pub fn show_cursor(&self, x: usize, y: usize) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.cursor = Some((x, y));
        }
    }

    /// Hide the cursor.
    pub fn hide_cursor(&self) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.cursor = None;
        }
    }

    /// Render pending changes: reconcile any resize, then emit the
    /// minimal update for every dirty cell.
    pub fn show(&self) {
        let ti = &self.inner.ti;
        let mut st = self.inner.state.lock();
        if st.fini || !st.init_done {
            return;
        }
        if let Some(ev) = reconcile_size(&mut st) {
            // Enqueued while the mutex is held; posting never blocks.
            let _ = self.inner.events.post(ev);
        }
        st.draw(ti);
    }

    /// Force a full repaint, for when something else corrupted the
    /// terminal behind the engine's back.
    pub fn sync(&self) {
        let ti = &self.inner.ti;
        let mut st = self.inner.state.lock();
        st.cxy = None;
        if st.fini || !st.init_done {
            return;
        }
        if let Some(ev) = reconcile_size(&mut st) {
            let _ = self.inner.events.post(ev);
        }
        st.clear = true;
        st.cells.invalidate();
        st.draw(ti);
    }

    /// Update the screen size. One `Resize` event is posted iff the
    /// dimensions changed; the grid reconciliation happens here, outside
    /// the mutation lock, so the event is published promptly.
    pub fn resize(&self, width: usize, height: usize) {
        {
            let mut st = self.inner.state.lock();
            if st.fini {
                return;
            }
            if width != st.w || height != st.h {
                st.forcesize = true;
            }
            st.w = width;
            st.h = height;
        }
        let ev = {
            let mut st = self.inner.state.lock();
            reconcile_size(&mut st)
        };
        if let Some(ev) = ev {
            let _ = self.inner.events.post(ev);
        }
    }

    /// Current size as `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        let st = self.inner.state.lock();
        (st.w, st.h)
    }

    /// Number of colors the terminal supports; `1 << 24` for truecolor.
    #[must_use]
    pub fn colors(&self) -> usize {
        if self.inner.state.lock().truecolor {
            1 << 24
        } else {
            self.inner.ti.colors
        }
    }

    /// Ask the terminal to start reporting mouse events.
    pub fn enable_mouse(&self) {
        self.set_mouse_mode(1);
    }

    /// Ask the terminal to stop reporting mouse events.
    pub fn disable_mouse(&self) {
        self.set_mouse_mode(0);
    }

    fn set_mouse_mode(&self, on: i64) {
        let ti = &self.inner.ti;
        if ti.mouse.is_empty() {
            return;
        }
        let seq = ti.tparm(&ti.mouse_mode, &[Param(on)]);
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.emit(ti, &seq);
        }
    }

    /// Whether the terminfo entry reports a mouse.
    #[must_use]
    pub fn has_mouse(&self) -> bool {
        !self.inner.ti.mouse.is_empty()
    }

    /// Whether the terminal can produce this key at all.
    #[must_use]
    pub fn has_key(&self, code: KeyCode) -> bool {
        self.inner.keymap.has_key(code)
    }

    /// Whether `ch` renders on this terminal: directly in the wire
    /// charset, via the ACS map, or (optionally) via a registered
    /// fallback string.
    #[must_use]
    pub fn can_display(&self, ch: char, check_fallbacks: bool) -> bool {
        let st = self.inner.state.lock();
        if let Some(enc) = &st.encoder {
            let mut tmp = Vec::with_capacity(4);
            if enc.encode(ch, &mut tmp) && !tmp.is_empty() && tmp[0] != 0x1A {
                return true;
            }
        }
        if st.acs_map.contains_key(&ch) {
            return true;
        }
        check_fallbacks && st.fallback.contains_key(&ch)
    }

    /// Replace the fallback text emitted for `ch` when the charset and
    /// ACS map both fail.
    pub fn register_rune_fallback(&self, ch: char, fallback: &str) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.fallback.insert(ch, fallback.to_string());
        }
    }

    /// Remove a fallback registration.
    pub fn unregister_rune_fallback(&self, ch: char) {
        let mut st = self.inner.state.lock();
        if !st.fini {
            st.fallback.remove(&ch);
        }
    }

    /// The resolved wire charset name.
    #[must_use]
    pub fn character_set(&self) -> String {
        self.inner.state.lock().charset_name.clone()
    }

    /// Non-blocking event post.
    ///
    /// # Errors
    ///
    /// [`ScreenError::EventQueueFull`] when the queue is at capacity.
    pub fn post_event(&self, ev: Event) -> Result<(), ScreenError> {
        self.inner.events.post(ev)
    }

    /// Blocking event post.
    pub fn post_event_wait(&self, ev: Event) {
        self.inner.events.post_wait(ev);
    }

    /// Block for the next event; `None` once `fini` has run.
    #[must_use]
    pub fn poll_event(&self) -> Option<Event> {
        self.inner.events.poll(&self.inner.quit_rx)
    }

    /// Raw event pass-through is not provided by this engine.
    #[must_use]
    pub fn poll_raw_event(&self) -> Event {
        Event::Error(ScreenError::NotSupported("no raw events"))
    }

    /// Raw event pass-through is not provided by this engine.
    #[must_use]
    pub fn parse_event(&self, _bytes: &[u8]) -> Event {
        Event::Error(ScreenError::NotSupported("no raw events"))
    }
}

/// Apply a pending size change: regrow the grid, invalidate, retune the
/// parser clip rectangle, and describe the `Resize` event to post.
fn reconcile_size(st: &mut ScreenState) -> Option<Event> {
    if !st.forcesize {
        return None;
    }
    st.forcesize = false;
    st.cxy = None;
    let (w, h) = (st.w, st.h);
    st.cells.resize(w, h);
    st.cells.invalidate();
    if let Some(parser) = st.parser.as_mut() {
        parser.set_size(w, h);
    }
    tracing::debug!(w, h, "screen resized");
    Some(Event::Resize {
        width: w,
        height: h,
    })
}

/// Build the Unicode → ACS-escape map from the `alt_chars` capability.
fn build_acs_map(ti: &Terminfo) -> HashMap<char, String> {
    let mut map = HashMap::new();
    let bytes = ti.alt_chars.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if let Some(glyph) = acs::vt100_glyph(bytes[i]) {
            let dst = bytes[i + 1] as char;
            map.insert(glyph, format!("{}{}{}", ti.enter_acs, dst, ti.exit_acs));
        }
        i += 2;
    }
    map
}

/// The input task: read chunks, accumulate, scan. `Ok(0)` reads flush
/// partial matches and keep going; errors and the quit signal stop the
/// task for good.
fn input_loop(inner: &Arc<Inner>, mut input: Box<dyn Read + Send>) {
    tracing::debug!("input task started");
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; INPUT_CHUNK];
    loop {
        match inner.quit_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => break,
        }
        match input.read(&mut chunk) {
            Ok(0) => {
                if !buf.is_empty() {
                    scan_input(inner, &mut buf, true);
                }
            }
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                scan_input(inner, &mut buf, false);
            }
            Err(err) => {
                tracing::debug!(%err, "input stream error; stopping input task");
                break;
            }
        }
    }
    tracing::debug!("input task stopped");
}

fn scan_input(inner: &Arc<Inner>, buf: &mut Vec<u8>, expire: bool) {
    let mut st = inner.state.lock();
    let mut events = Vec::new();
    if let Some(parser) = st.parser.as_mut() {
        parser.scan(buf, expire, &mut events);
    }
    // Posted with the state lock held so render-side events interleave
    // deterministically with the scan that produced these.
    for ev in events {
        let _ = inner.events.post(ev);
    }
}

impl ScreenState {
    /// Write a capability string straight to the output stream.
    fn emit(&mut self, ti: &Terminfo, s: &str) {
        if s.is_empty() {
            return;
        }
        let mut staged = Vec::with_capacity(s.len());
        let _ = ti.tputs(&mut staged, s, self.baud);
        self.write_out(&staged);
    }

    fn write_out(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if let Some(out) = self.out.as_mut() {
            if out.write_all(bytes).and_then(|()| out.flush()).is_err() {
                tracing::trace!("output stream write failed");
            }
        }
    }

    /// Stage a capability string into the draw buffer.
    fn tputs(&self, ti: &Terminfo, buf: &mut Vec<u8>, s: &str) {
        if s.is_empty() {
            return;
        }
        let _ = ti.tputs(buf, s, self.baud);
    }

    /// The draw pass. Stages everything and writes once; a pass with no
    /// dirty cells and an unchanged cursor writes nothing at all.
    fn draw(&mut self, ti: &Terminfo) {
        self.cxy = None;

        let mut body: Vec<u8> = Vec::new();
        if self.clear {
            self.clear_screen(ti, &mut body);
        }

        let (w, h) = self.cells.size();
        for y in 0..h {
            let mut x = 0;
            while x < w {
                let width = self.draw_cell(ti, &mut body, x, y);
                if width > 1 && x + 1 < w {
                    // Ensures the hidden right half repaints if it is
                    // ever drawn on its own.
                    self.cells.set_dirty(x + 1, y, true);
                }
                x += width.max(1);
            }
        }

        let target = self.cursor.filter(|&(x, y)| x < w && y < h);
        if body.is_empty() && target == self.wire_cursor {
            return;
        }

        let mut frame = Vec::with_capacity(body.len() + 32);
        if !body.is_empty() {
            // Hide the cursor while cells move underneath it.
            self.tputs(ti, &mut frame, &ti.hide_cursor);
            frame.extend_from_slice(&body);
        }
        match target {
            Some((x, y)) => {
                let goto = ti.tgoto(x, y);
                self.tputs(ti, &mut frame, &goto);
                self.tputs(ti, &mut frame, &ti.show_cursor);
                self.cxy = Some((x, y));
            }
            None => self.hide_cursor_seq(ti, &mut frame),
        }
        self.wire_cursor = target;
        self.write_out(&frame);
    }

    /// Emit hide-cursor, or park the cursor past the corner on terminals
    /// that cannot hide it.
    fn hide_cursor_seq(&mut self, ti: &Terminfo, buf: &mut Vec<u8>) {
        if ti.hide_cursor.is_empty() {
            let (w, h) = self.cells.size();
            let goto = ti.tgoto(w, h);
            self.tputs(ti, buf, &goto);
            self.cxy = None;
        } else {
            self.tputs(ti, buf, &ti.hide_cursor);
        }
    }

    fn clear_screen(&mut self, ti: &Terminfo, buf: &mut Vec<u8>) {
        let (fg, bg, _) = self.style.decompose();
        self.send_fg_bg(ti, buf, fg, bg);
        self.tputs(ti, buf, &ti.clear);
        self.clear = false;
    }

    /// Draw one cell if dirty. Returns the width consumed so the caller
    /// can skip the hidden right half of a wide glyph.
    fn draw_cell(&mut self, ti: &Terminfo, buf: &mut Vec<u8>, x: usize, y: usize) -> usize {
        let (ch, comb, style, width) = self.cells.get_content(x, y);
        if !self.cells.dirty(x, y) {
            return width;
        }

        if self.cxy != Some((x, y)) {
            let goto = ti.tgoto(x, y);
            self.tputs(ti, buf, &goto);
            self.cxy = Some((x, y));
        }

        let style = if style == Style::DEFAULT {
            self.style
        } else {
            style
        };
        if self.cur_style != Some(style) {
            let (fg, bg, attrs) = style.decompose();
            self.tputs(ti, buf, &ti.attr_off);
            self.send_fg_bg(ti, buf, fg, bg);
            if attrs.contains(Attrs::BOLD) {
                self.tputs(ti, buf, &ti.bold);
            }
            if attrs.contains(Attrs::UNDERLINE) {
                self.tputs(ti, buf, &ti.underline);
            }
            if attrs.contains(Attrs::REVERSE) {
                self.tputs(ti, buf, &ti.reverse);
            }
            if attrs.contains(Attrs::BLINK) {
                self.tputs(ti, buf, &ti.blink);
            }
            if attrs.contains(Attrs::DIM) {
                self.tputs(ti, buf, &ti.dim);
            }
            self.cur_style = Some(style);
        }

        let mut width = width.max(1);
        let mut glyph: Vec<u8> = Vec::with_capacity(6);
        self.encode_rune(ch, &mut glyph);
        for &c in &comb {
            self.encode_rune(c, &mut glyph);
        }

        let mut desync = false;
        if width > 1 && glyph == b"?" {
            // No double-width replacement glyph; pad and stop trusting
            // the cursor column.
            glyph = b"? ".to_vec();
            desync = true;
        }

        let (w, _) = self.cells.size();
        if x + width > w {
            // Too wide to fit; a single space keeps the row aligned.
            width = 1;
            glyph = b" ".to_vec();
        }

        buf.extend_from_slice(&glyph);
        self.cells.set_dirty(x, y, false);
        if desync || width > 1 {
            // Terminals do not advance predictably over wide glyphs.
            self.cxy = None;
        } else {
            self.cxy = Some((x + width, y));
        }
        width
    }

    /// Encode one scalar into the wire charset, substituting the ACS
    /// entry, then the registered fallback, then `'?'` when it has no
    /// representation. Combining scalars that fail to encode are elided.
    fn encode_rune(&self, ch: char, out: &mut Vec<u8>) {
        let mut tmp = Vec::with_capacity(4);
        let encoded = match self.encoder.as_ref() {
            Some(enc) => enc.encode(ch, &mut tmp),
            None => false,
        };
        if !encoded || tmp.is_empty() || tmp[0] == 0x1A {
            if out.is_empty() {
                if let Some(seq) = self.acs_map.get(&ch) {
                    out.extend_from_slice(seq.as_bytes());
                } else if let Some(fb) = self.fallback.get(&ch) {
                    out.extend_from_slice(fb.as_bytes());
                } else {
                    out.push(b'?');
                }
            }
        } else {
            out.extend_from_slice(&tmp);
        }
    }

    /// Emit foreground/background setters for `fg`/`bg`, resolving
    /// through the palette cache when not in truecolor. Default channels
    /// are skipped.
    fn send_fg_bg(&mut self, ti: &Terminfo, buf: &mut Vec<u8>, mut fg: Color, mut bg: Color) {
        if ti.colors == 0 {
            return;
        }
        if self.truecolor {
            if !ti.set_fg_bg_rgb.is_empty() && !fg.is_default() && !bg.is_default() {
                let (r1, g1, b1) = fg.to_rgb();
                let (r2, g2, b2) = bg.to_rgb();
                let seq = ti.tparm(
                    &ti.set_fg_bg_rgb,
                    &[
                        Param(i64::from(r1)),
                        Param(i64::from(g1)),
                        Param(i64::from(b1)),
                        Param(i64::from(r2)),
                        Param(i64::from(g2)),
                        Param(i64::from(b2)),
                    ],
                );
                self.tputs(ti, buf, &seq);
            } else {
                if !fg.is_default() && !ti.set_fg_rgb.is_empty() {
                    let (r, g, b) = fg.to_rgb();
                    let seq = ti.tparm(
                        &ti.set_fg_rgb,
                        &[Param(i64::from(r)), Param(i64::from(g)), Param(i64::from(b))],
                    );
                    self.tputs(ti, buf, &seq);
                }
                if !bg.is_default() && !ti.set_bg_rgb.is_empty() {
                    let (r, g, b) = bg.to_rgb();
                    let seq = ti.tparm(
                        &ti.set_bg_rgb,
                        &[Param(i64::from(r)), Param(i64::from(g)), Param(i64::from(b))],
                    );
                    self.tputs(ti, buf, &seq);
                }
            }
            return;
        }

        if !fg.is_default() {
            fg = self.lookup_color(fg);
        }
        if !bg.is_default() {
            bg = self.lookup_color(bg);
        }

        let fg_idx = fg.palette_index().map(i64::from);
        let bg_idx = bg.palette_index().map(i64::from);
        match (fg_idx, bg_idx) {
            (Some(f), Some(b)) if !ti.set_fg_bg.is_empty() => {
                let seq = ti.tparm(&ti.set_fg_bg, &[Param(f), Param(b)]);
                self.tputs(ti, buf, &seq);
            }
            _ => {
                if let Some(f) = fg_idx {
                    if !ti.set_fg.is_empty() {
                        let seq = ti.tparm(&ti.set_fg, &[Param(f)]);
                        self.tputs(ti, buf, &seq);
                    }
                }
                if let Some(b) = bg_idx {
                    if !ti.set_bg.is_empty() {
                        let seq = ti.tparm(&ti.set_bg, &[Param(b)]);
                        self.tputs(ti, buf, &seq);
                    }
                }
            }
        }
    }

    /// Palette-resolve a color through the session cache.
    fn lookup_color(&mut self, c: Color) -> Color {
        if let Some(&v) = self.color_cache.get(&c) {
            return v;
        }
        let v = find_color(c, &self.palette);
        self.color_cache.insert(c, v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acs_map_from_xterm() {
        let ti = Terminfo::lookup("xterm").unwrap();
        let map = build_acs_map(&ti);
        // xterm maps each name byte to itself.
        assert_eq!(map.get(&acs::HLINE).unwrap(), "\u{e}q\u{f}");
        assert_eq!(map.get(&acs::ULCORNER).unwrap(), "\u{e}l\u{f}");
        assert_eq!(map.get(&acs::BULLET).unwrap(), "\u{e}~\u{f}");
    }

    #[test]
    fn acs_map_ignores_unknown_names() {
        let mut ti = Terminfo::lookup("xterm").unwrap();
        ti.alt_chars = "Zzqq".into();
        let map = build_acs_map(&ti);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&acs::HLINE));
    }
}
