//! Style roles expressed as an enum + macro mapping logical names to `colored::Color`.
//!
//! Each logical style is a variant of `StyleRole`. Colouring is applied only
//! when the `enabled` flag passed to `paint()` is true, so there is no global
//! colour state. The same roles drive clap's help colours and the cell styles
//! of the summary table.
//!
//! ```
//! use orderstats::core::styles::StyleRole;
//! let plain = StyleRole::Header.paint("Summary", false);
//! assert_eq!(plain, "Summary");
//! let coloured = StyleRole::Header.paint("Summary", true);
//! assert!(coloured.starts_with("\x1b["));
//! assert!(coloured.ends_with("\x1b[0m"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn ansi_code(self) -> Option<&'static str> {
                ansi_code(self.color()?)
            }

            pub fn paint(self, text: &str, enabled: bool) -> String {
                if !enabled { return text.to_string(); }
                if let Some(code) = self.ansi_code() { return format!("\x1b[{}m{}\x1b[0m", code, text); }
                text.to_string()
            }

            /// prettytable `style_spec` for a cell in this role, e.g. `"Fg"`
            pub fn table_spec(self, enabled: bool) -> String {
                let spec = if enabled { self.color().and_then(table_color) } else { None };
                spec.map(|c| format!("F{}", c)).unwrap_or_default()
            }
        }
    }
}

style! {
    Header      => Some(Color::Yellow),
    Label       => Some(Color::BrightGreen),
    Value       => None,
    Success     => Some(Color::Green),
    Warning     => Some(Color::Yellow),
    Failure     => Some(Color::BrightRed),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Invalid     => Some(Color::Red),
}

fn ansi_code(c: Color) -> Option<&'static str> {
    use Color::*;
    Some(match c {
        Black => "30",
        Red => "31",
        Green => "32",
        Yellow => "33",
        Blue => "34",
        Magenta => "35",
        Cyan => "36",
        White => "37",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        BrightYellow => "93",
        BrightBlue => "94",
        BrightMagenta => "95",
        BrightCyan => "96",
        BrightWhite => "97",
        _ => return None,
    })
}

fn table_color(c: Color) -> Option<char> {
    use Color::*;
    Some(match c {
        Black => 'k',
        Red => 'r',
        Green => 'g',
        Yellow => 'y',
        Blue => 'b',
        Magenta => 'm',
        Cyan => 'c',
        White => 'w',
        BrightBlack => 'K',
        BrightRed => 'R',
        BrightGreen => 'G',
        BrightYellow => 'Y',
        BrightBlue => 'B',
        BrightMagenta => 'M',
        BrightCyan => 'C',
        BrightWhite => 'W',
        _ => return None,
    })
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    use self::AnsiColor as A;
    use Color::*;
    Some(match c {
        Black => A::Black,
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Magenta => A::Magenta,
        Cyan => A::Cyan,
        White => A::White,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        BrightYellow => A::BrightYellow,
        BrightBlue => A::BrightBlue,
        BrightMagenta => A::BrightMagenta,
        BrightCyan => A::BrightCyan,
        BrightWhite => A::BrightWhite,
        _ => return None,
    })
}

/// Build clap Styles for help output from the style roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .valid(style(StyleRole::Success, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Failure, true))
}
