use crate::buffer::Buffer;

const ESCAPE: &[u8] = b"\x1b[";

/// An ANSI SGR parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attribute {
    Reset = 0,

    FgBlack = 30,
    FgRed,
    FgGreen,
    FgYellow,
    FgBlue,
    FgMagenta,
    FgCyan,
    FgWhite,

    BgBlack = 40,
    BgRed,
    BgGreen,
    BgYellow,
    BgBlue,
    BgMagenta,
    BgCyan,
    BgWhite,

    FgHiBlack = 90,
    FgHiRed,
    FgHiGreen,
    FgHiYellow,
    FgHiBlue,
    FgHiMagenta,
    FgHiCyan,
    FgHiWhite,

    BgHiBlack = 100,
    BgHiRed,
    BgHiGreen,
    BgHiYellow,
    BgHiBlue,
    BgHiMagenta,
    BgHiCyan,
    BgHiWhite,
}

impl Attribute {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Writes `ESC [ a1 ; a2 ; ... m`.
pub fn write_attributes(buf: &mut Buffer, attrs: &[Attribute]) {
    buf.append_bytes(ESCAPE);
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            buf.append_byte(b';');
        }
        buf.append_int(i64::from(attr.code()));
    }
    buf.append_byte(b'm');
}

/// The escape sequence for `attrs` as a string.
pub fn sequence(attrs: &[Attribute]) -> String {
    let mut buf = Buffer::with_capacity(8);
    write_attributes(&mut buf, attrs);
    buf.to_string_lossy()
}
