use std::{
    fmt::Write as _,
    io::{self, Write},
    mem::MaybeUninit,
    os::fd::{AsRawFd, RawFd},
};

use core_arcade::{Cell, FrameBuffer, Rgb};

const ENTER: &[u8] = b"\x1b[?1049h\x1b[?25l\x1b[?1002h\x1b[?1006h\x1b[2J";
const LEAVE: &[u8] = b"\x1b[?1006l\x1b[?1002l\x1b[m\x1b[?25h\x1b[?1049l";

/// Puts the terminal in raw, non-blocking mode until dropped.
pub struct RawMode {
    fd: RawFd,
    saved: libc::termios,
}

impl RawMode {
    pub fn enable(fd: &impl AsRawFd) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let mut termios = MaybeUninit::uninit();

        let saved = unsafe {
            if libc::tcgetattr(fd, termios.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }

            termios.assume_init()
        };

        let mut raw = saved;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;

        unsafe {
            if libc::tcsetattr(fd, libc::TCSADRAIN, &raw) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(Self { fd, saved })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSADRAIN, &self.saved);
        }
    }
}

/// Terminal size as (columns, rows).
pub fn terminal_size(fd: &impl AsRawFd) -> io::Result<(usize, usize)> {
    let mut size = MaybeUninit::<libc::winsize>::uninit();

    let size = unsafe {
        if libc::ioctl(fd.as_raw_fd(), libc::TIOCGWINSZ, size.as_mut_ptr()) != 0 {
            return Err(io::Error::last_os_error());
        }

        size.assume_init()
    };

    Ok((usize::from(size.ws_col), usize::from(size.ws_row)))
}

/// Appends one row of cells as truecolour text, switching colours only
/// where they change.
pub fn encode_row(out: &mut String, cells: &[Cell]) {
    let mut current: Option<(Rgb, Rgb)> = None;

    for cell in cells {
        if current != Some((cell.fg, cell.bg)) {
            let (fg, bg) = (cell.fg, cell.bg);
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{};48;2;{};{};{}m",
                fg.r, fg.g, fg.b, bg.r, bg.g, bg.b
            );
            current = Some((fg, bg));
        }

        out.push(cell.glyph);
    }

    out.push_str("\x1b[m");
}

/// The alternate screen, redrawn row by row. The status line sits on the
/// first row and the frame below it.
pub struct Screen<W: Write> {
    out: W,
    status: String,
    rows: Vec<String>,
}

impl<W: Write> Screen<W> {
    pub fn enter(mut out: W) -> io::Result<Self> {
        out.write_all(ENTER)?;
        out.flush()?;

        Ok(Self {
            out,
            status: String::new(),
            rows: Vec::new(),
        })
    }

    pub fn present(&mut self, status: &str, frame: &FrameBuffer) -> io::Result<()> {
        let mut buf = String::new();

        if self.status != status {
            let _ = write!(buf, "\x1b[1;1H\x1b[2K{status}");
            self.status = status.to_owned();
        }

        self.rows.resize(frame.rows(), String::new());

        for (index, cells) in frame.row_iter().enumerate() {
            let mut row = String::new();
            encode_row(&mut row, cells);

            if self.rows[index] != row {
                let _ = write!(buf, "\x1b[{};1H{row}", index + 2);
                self.rows[index] = row;
            }
        }

        if !buf.is_empty() {
            self.out.write_all(buf.as_bytes())?;
            self.out.flush()?;
        }

        Ok(())
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        let _ = self.out.write_all(LEAVE);
        let _ = self.out.flush();
    }
}
